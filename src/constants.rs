//! IRIG 106-23 Link Constants
//!
//! This module defines the constants used by the telemetry downlink, split
//! into two groups the way the flight software baseline documents them:
//!
//! - **Standard-fixed** values taken from IRIG 106-23 Appendix M (SOQPSK-TG)
//!   and Appendix R (LDPC + frame sync). Changing any of these breaks wire
//!   compatibility with the ground station and requires a major version bump.
//! - **Project tuning defaults**, the initial values of the knobs exposed
//!   through [`crate::config::PipelineConfig`].

// ----------------------------------------------------------------------------
// Standard-fixed: Appendix R (LDPC coding and frame synchronization)
// ----------------------------------------------------------------------------

/// LDPC codeword length in bits (all rates share one block length)
pub const LDPC_N: usize = 8192;

/// Circulant (cyclic permutation block) size of the quasi-cyclic code
pub const LDPC_CIRCULANT_SIZE: usize = 128;

/// Information block length for rate 1/2
pub const LDPC_K_RATE_1_2: usize = 4096;

/// Information block length for rate 2/3
pub const LDPC_K_RATE_2_3: usize = 5461;

/// Information block length for rate 4/5
pub const LDPC_K_RATE_4_5: usize = 6554;

/// Attached Sync Marker, transmitted MSB-first ahead of each codeword.
///
/// Only the upper 32 bits carry the CCSDS pattern; the lower half is zero
/// padding mandated by the 64-bit marker slot.
pub const ASM_PATTERN: u64 = 0x1ACF_FC1D_0000_0000;

/// ASM length in bits
pub const ASM_LENGTH_BITS: usize = 64;

/// Maximum Hamming distance at which the correlator declares ASM lock
pub const ASM_LOCK_THRESHOLD: u32 = 2;

/// Randomizer LFSR width in bits
pub const LFSR_WIDTH: u32 = 16;

/// Randomizer LFSR feedback taps (bit indices into the 16-bit state)
pub const LFSR_TAPS: [u32; 4] = [15, 14, 12, 3];

// ----------------------------------------------------------------------------
// Standard-fixed: Appendix M (SOQPSK-TG modulation)
// ----------------------------------------------------------------------------

/// CPM smoothing factor rho
pub const SOQPSK_RHO: f64 = 0.70;

/// CPM bandwidth factor B
pub const SOQPSK_B: f64 = 1.25;

/// Pulse window flat region, in symbol-pair times
pub const SOQPSK_T1: f64 = 1.5;

/// Pulse window cosine roll-off region, in symbol-pair times
pub const SOQPSK_T2: f64 = 0.50;

/// Frequency pulse span in symbol times: 2 * (T1 + T2) symbol pairs
pub const PULSE_SYMBOLS: usize = 8;

/// Downlink data rate in bits per second
pub const DATA_RATE_BPS: f64 = 10e6;

/// Baseband sample rate in Hz
pub const SAMPLE_RATE_HZ: f64 = 80e6;

/// RF carrier frequency in Hz (S-band telemetry allocation)
pub const CARRIER_FREQ_HZ: f64 = 2.35e9;

/// Oversampling factor of the modulator and demodulator
pub const SAMPLES_PER_SYMBOL: usize = 8;

// ----------------------------------------------------------------------------
// Standard-fixed: CRC-16 record framing
// ----------------------------------------------------------------------------

/// Reflected CCITT polynomial used by the record framer.
///
/// Note this is the 0x8408 telemetry-record CRC, not the 0xA001 CRC-16-IBM
/// used by the ground-control config messages; the two must never share a
/// code path.
pub const CRC16_POLY: u16 = 0x8408;

/// CRC-16 initial value
pub const CRC16_INIT: u16 = 0xFFFF;

// ----------------------------------------------------------------------------
// Standard-fixed: telemetry record channel counts
// ----------------------------------------------------------------------------

/// IMU channels (3-axis accelerometer + 3-axis gyroscope)
pub const NUM_IMU_CHANNELS: usize = 6;

/// Pressure transducer channels
pub const NUM_PRESSURE_CHANNELS: usize = 4;

/// Temperature sensor channels
pub const NUM_TEMP_CHANNELS: usize = 8;

/// Guidance command / actuator feedback channels
pub const NUM_GUIDANCE_CHANNELS: usize = 16;

// ----------------------------------------------------------------------------
// Project tuning defaults
// ----------------------------------------------------------------------------

/// Default carrier-recovery loop bandwidth as a fraction of the symbol rate
pub const DEFAULT_PLL_BANDWIDTH_SCALE: f32 = 0.01;

/// Default carrier-recovery loop damping factor
pub const DEFAULT_PLL_DAMPING: f32 = 0.707;

/// Default timing-loop gain of the Gardner recovery stage
pub const DEFAULT_TIMING_LOOP_GAIN: f32 = 0.1;

/// Default iteration cap of the belief-propagation decoder
pub const DEFAULT_LDPC_MAX_ITER: usize = 50;

/// Default check-to-variable message scaling factor
pub const DEFAULT_LDPC_MSG_SCALE: f32 = 1.0;

/// Default randomizer seed, re-applied at every codeword boundary
pub const DEFAULT_LFSR_SEED: u16 = 0xACE1;

/// Bits the correlator may examine before declaring frame sync lost:
/// two full frame slots of slack on top of one frame
pub const ASM_SEARCH_WINDOW_BITS: usize = 2 * (ASM_LENGTH_BITS + LDPC_N);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_lengths_match_rates() {
        // K is floor(N * rate) for each supported rate
        assert_eq!(LDPC_K_RATE_1_2, LDPC_N / 2);
        assert_eq!(LDPC_K_RATE_2_3, LDPC_N * 2 / 3);
        assert_eq!(LDPC_K_RATE_4_5, (LDPC_N as f64 * 0.8).round() as usize);
    }

    #[test]
    fn pulse_span_matches_window() {
        // window extends T1 + T2 symbol pairs either side of center
        assert_eq!(PULSE_SYMBOLS, (2.0 * (SOQPSK_T1 + SOQPSK_T2) * 2.0) as usize);
    }
}
