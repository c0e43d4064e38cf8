//! # Bit Expansion Utilities
//!
//! This module provides the bit-level conversions the downlink pipeline is
//! built on. Two orderings coexist on the wire and must never be mixed up:
//!
//! - The telemetry record is expanded **LSB-first per byte** ("little-endian
//!   bit-expansion") into the systematic region of the codeword.
//! - The Attached Sync Marker is serialized **MSB-first** ahead of the
//!   scrambled codeword.
//!
//! Bits travel through the pipeline as one `u8` per bit (0 or 1), which
//! keeps the encoder, randomizer and correlator index arithmetic trivial at
//! the cost of memory the orchestrator amortizes in preallocated buffers.

/// Expand bytes LSB-first into `out`, one `u8` per bit.
///
/// `out` must hold exactly `bytes.len() * 8` entries.
pub fn bytes_to_bits_lsb(bytes: &[u8], out: &mut [u8]) {
    debug_assert_eq!(out.len(), bytes.len() * 8);
    for (i, &byte) in bytes.iter().enumerate() {
        for bit in 0..8 {
            out[i * 8 + bit] = (byte >> bit) & 1;
        }
    }
}

/// Pack an LSB-first bit slice back into bytes.
///
/// `bits.len()` must be a multiple of 8 and equal `out.len() * 8`.
pub fn bits_to_bytes_lsb(bits: &[u8], out: &mut [u8]) {
    debug_assert_eq!(bits.len(), out.len() * 8);
    for (i, chunk) in bits.chunks_exact(8).enumerate() {
        let mut byte = 0u8;
        for (bit, &b) in chunk.iter().enumerate() {
            byte |= (b & 1) << bit;
        }
        out[i] = byte;
    }
}

/// Expand a u64 MSB-first into `out[..64]`, one `u8` per bit.
pub fn u64_to_bits_msb(value: u64, out: &mut [u8]) {
    debug_assert!(out.len() >= 64);
    for (i, slot) in out.iter_mut().take(64).enumerate() {
        *slot = ((value >> (63 - i)) & 1) as u8;
    }
}

/// Hamming distance between two equal-length 0/1 slices.
pub fn hamming_distance(a: &[u8], b: &[u8]) -> u32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).filter(|(x, y)| x != y).count() as u32
}
