//! # Utility Modules
//!
//! Common helpers shared across the pipeline stages: bit expansion and
//! Hamming distance, and the streaming soft-decision buffer sitting between
//! the demodulator and the frame synchronizer.

pub mod bits;
pub mod softbuf;

pub use bits::{bits_to_bytes_lsb, bytes_to_bits_lsb, hamming_distance, u64_to_bits_msb};
pub use softbuf::SoftBitBuffer;
