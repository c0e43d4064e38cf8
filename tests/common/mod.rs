//! Shared helpers for the integration tests: seeded record generation and
//! a reproducible AWGN channel.
#![allow(dead_code)]

use self::rand_distr_free::gaussian_pair;
use rand::rngs::StdRng;
use rand::Rng;
use tmlink_rs::soqpsk::IqSample;
use tmlink_rs::TelemetryRecord;

/// Box-Muller gaussian pair, so the tests only depend on `rand`'s uniform
/// source and stay reproducible across rand feature sets.
mod rand_distr_free {
    use rand::rngs::StdRng;
    use rand::Rng;

    pub fn gaussian_pair(rng: &mut StdRng) -> (f32, f32) {
        let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
        let u2: f32 = rng.gen_range(0.0..1.0);
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * std::f32::consts::PI * u2;
        (r * theta.cos(), r * theta.sin())
    }
}

/// Deterministic pseudo-random telemetry record.
pub fn random_record(rng: &mut StdRng, counter: u32) -> TelemetryRecord {
    let mut record = TelemetryRecord {
        frame_counter: counter,
        timestamp_us: rng.gen_range(0..u64::MAX / 2),
        flight_mode: rng.gen_range(0..=5),
        latitude_deg: rng.gen_range(-90.0..90.0),
        longitude_deg: rng.gen_range(-180.0..180.0),
        altitude_m: rng.gen_range(0.0..30_000.0),
        battery_voltage: rng.gen_range(9.0..13.0),
        system_status: rng.gen(),
        ..Default::default()
    };
    for v in record.accel_g.iter_mut().chain(record.gyro_dps.iter_mut()) {
        *v = rng.gen_range(-100.0..100.0);
    }
    for v in record
        .pressure_psi
        .iter_mut()
        .chain(record.temperature_c.iter_mut())
        .chain(record.guidance_cmd.iter_mut())
        .chain(record.actuator_pos.iter_mut())
    {
        *v = rng.gen_range(-50.0..50.0);
    }
    record
}

/// Fill in the record's CRC trailer the way the TX assembler will, so a
/// decoded record can be compared field-for-field with what was sent.
pub fn sealed(mut record: TelemetryRecord) -> TelemetryRecord {
    let mut wire = vec![0u8; TelemetryRecord::WIRE_SIZE];
    record.crc16 = tmlink_rs::frame::assemble_record(&record, &mut wire);
    record
}

/// Add complex white gaussian noise for a given Eb/N0 in dB, assuming a
/// unit-envelope signal oversampled by `sps`.
pub fn awgn(samples: &mut [IqSample], ebn0_db: f64, sps: usize, rng: &mut StdRng) {
    let ebn0 = 10f64.powf(ebn0_db / 10.0);
    // Es/N0 per sample = (Eb/N0) / sps; N0 = 2 sigma^2
    let sigma = (sps as f64 / (2.0 * ebn0)).sqrt() as f32;
    for s in samples.iter_mut() {
        let (ni, nq) = gaussian_pair(rng);
        s.i += sigma * ni;
        s.q += sigma * nq;
    }
}
