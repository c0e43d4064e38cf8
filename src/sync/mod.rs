//! # Frame Synchronization
//!
//! Attached Sync Marker handling. On transmit the 64-bit CCSDS marker is
//! prepended, MSB-first and unscrambled, to every scrambled codeword. On
//! receive a sliding correlator measures the Hamming distance between each
//! candidate alignment and the marker, declaring lock at the first offset
//! within threshold — which is what lets the receiver ride through a
//! marker that took bit errors on the channel.

use once_cell::sync::Lazy;

use crate::constants::{ASM_LENGTH_BITS, ASM_LOCK_THRESHOLD, ASM_PATTERN};
use crate::util::bits::u64_to_bits_msb;

/// The marker bit-serialized MSB-first, one byte per bit.
pub static ASM_BITS: Lazy<[u8; ASM_LENGTH_BITS]> = Lazy::new(|| {
    let mut bits = [0u8; ASM_LENGTH_BITS];
    u64_to_bits_msb(ASM_PATTERN, &mut bits);
    bits
});

/// Prepend the ASM to a scrambled codeword.
///
/// `out` must hold exactly `ASM_LENGTH_BITS + codeword.len()` bits.
pub fn frame_with_asm(codeword: &[u8], out: &mut [u8]) {
    assert_eq!(out.len(), ASM_LENGTH_BITS + codeword.len());
    out[..ASM_LENGTH_BITS].copy_from_slice(&ASM_BITS[..]);
    out[ASM_LENGTH_BITS..].copy_from_slice(codeword);
}

/// Hamming distance between the marker and the window at `offset`.
fn distance_at<F: Fn(usize) -> u8>(bit_at: &F, offset: usize, threshold: u32) -> u32 {
    let mut distance = 0u32;
    for (j, &asm_bit) in ASM_BITS.iter().enumerate() {
        if bit_at(offset + j) != asm_bit {
            distance += 1;
            if distance > threshold {
                break;
            }
        }
    }
    distance
}

/// Slide the marker across `len` bits of an arbitrary bit source and return
/// the first offset whose distance is within `threshold`, together with the
/// distance found.
///
/// The bit source is a closure so the pipeline can correlate directly over
/// its streaming soft-bit buffer without copying a search window out.
pub fn correlate<F: Fn(usize) -> u8>(
    bit_at: F,
    len: usize,
    threshold: u32,
) -> Option<(usize, u32)> {
    if len < ASM_LENGTH_BITS {
        return None;
    }
    for offset in 0..=(len - ASM_LENGTH_BITS) {
        let distance = distance_at(&bit_at, offset, threshold);
        if distance <= threshold {
            return Some((offset, distance));
        }
    }
    None
}

/// Convenience correlator over a plain bit slice at the standard threshold.
pub fn find_asm(bits: &[u8]) -> Option<(usize, u32)> {
    correlate(|i| bits[i], bits.len(), ASM_LOCK_THRESHOLD)
}
