//! Tests for the telemetry record wire format: schema-derived sizing,
//! packed little-endian layout, nom parse-back and CRC framing.

mod common;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tmlink_rs::frame::{assemble_record, recover_record};
use tmlink_rs::{FlightMode, SystemStatus, TelemetryRecord, TmLinkError};

#[test]
fn test_wire_size_is_schema_sum() {
    // 4 + 8 + 24 + 16 + 32 + 64 + 64 + 1 + 16 + 4 + 4 + 2 + 2
    assert_eq!(TelemetryRecord::WIRE_SIZE, 241);
}

#[test]
fn test_layout_is_little_endian_packed() {
    let record = TelemetryRecord {
        frame_counter: 0x0403_0201,
        timestamp_us: 0x0807_0605_0403_0201,
        ..Default::default()
    };
    let bytes = record.to_bytes();
    assert_eq!(&bytes[..4], &[0x01, 0x02, 0x03, 0x04]);
    assert_eq!(&bytes[4..12], &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
}

#[test]
fn test_flight_mode_offset() {
    // mode byte sits right after the two 16-float vectors
    let record = TelemetryRecord {
        flight_mode: FlightMode::Terminal as u8,
        ..Default::default()
    };
    let bytes = record.to_bytes();
    let mode_offset = 4 + 8 + 24 + 16 + 32 + 64 + 64;
    assert_eq!(bytes[mode_offset], FlightMode::Terminal as u8);
}

#[test]
fn test_assemble_recover_round_trip() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    for counter in 0..20 {
        let record = common::random_record(&mut rng, counter);
        let mut wire = vec![0u8; TelemetryRecord::WIRE_SIZE];
        let crc = assemble_record(&record, &mut wire);

        let back = recover_record(&wire).unwrap();
        assert_eq!(back.frame_counter, record.frame_counter);
        assert_eq!(back.timestamp_us, record.timestamp_us);
        assert_eq!(back.accel_g, record.accel_g);
        assert_eq!(back.guidance_cmd, record.guidance_cmd);
        assert_eq!(back.crc16, crc);
    }
}

#[test]
fn test_corrupted_byte_yields_crc_mismatch() {
    let record = TelemetryRecord::default();
    let mut wire = vec![0u8; TelemetryRecord::WIRE_SIZE];
    assemble_record(&record, &mut wire);
    wire[100] ^= 0x20;
    assert!(matches!(
        recover_record(&wire),
        Err(TmLinkError::CrcMismatch { .. })
    ));
}

#[test]
fn test_status_flags_survive_wire() {
    let status = SystemStatus::ARMED | SystemStatus::TELEMETRY_ACTIVE | SystemStatus::GPS_VALID;
    let record = TelemetryRecord {
        system_status: status.bits(),
        ..Default::default()
    };
    let mut wire = vec![0u8; TelemetryRecord::WIRE_SIZE];
    assemble_record(&record, &mut wire);
    let back = recover_record(&wire).unwrap();
    assert_eq!(back.status(), status);
}

proptest! {
    #[test]
    fn prop_scalar_fields_round_trip(
        counter in any::<u32>(),
        timestamp in any::<u64>(),
        lat in -90.0f64..90.0,
        lon in -180.0f64..180.0,
        battery in 0.0f32..30.0,
        status in any::<u16>(),
    ) {
        let record = TelemetryRecord {
            frame_counter: counter,
            timestamp_us: timestamp,
            latitude_deg: lat,
            longitude_deg: lon,
            battery_voltage: battery,
            system_status: status,
            ..Default::default()
        };
        let mut wire = vec![0u8; TelemetryRecord::WIRE_SIZE];
        assemble_record(&record, &mut wire);
        let back = recover_record(&wire).unwrap();
        prop_assert_eq!(back.frame_counter, counter);
        prop_assert_eq!(back.timestamp_us, timestamp);
        prop_assert_eq!(back.latitude_deg, lat);
        prop_assert_eq!(back.longitude_deg, lon);
        prop_assert_eq!(back.battery_voltage, battery);
        prop_assert_eq!(back.system_status, status);
    }
}
