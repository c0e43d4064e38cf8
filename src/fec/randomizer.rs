//! # Codeword Randomizer
//!
//! Pseudo-random bit scrambler that whitens each codeword before the ASM is
//! attached, so long runs in the payload cannot starve the receiver's
//! symbol-timing loop. The generator is a 16-bit Fibonacci LFSR:
//!
//! - output bit = state LSB
//! - feedback = XOR of state bits {15, 14, 12, 3}
//! - `state = (state >> 1) | (feedback << 15)`
//!
//! Scrambling and descrambling are the same XOR, and the register is
//! re-seeded at every codeword boundary so each frame decodes independently
//! of its predecessors. The state lives in this struct, one per pipeline
//! direction; nothing here is process-global, so concurrent TX and RX
//! pipelines cannot race each other's registers.

use crate::constants::LFSR_TAPS;
use crate::error::TmLinkError;

/// Per-pipeline randomizer with an explicit seed.
#[derive(Debug, Clone)]
pub struct Randomizer {
    seed: u16,
    state: u16,
}

impl Randomizer {
    /// Create a randomizer; an all-zero seed would lock the register and is
    /// rejected at construction.
    pub fn new(seed: u16) -> Result<Self, TmLinkError> {
        if seed == 0 {
            return Err(TmLinkError::Config(
                "randomizer seed must be nonzero".into(),
            ));
        }
        Ok(Self { seed, state: seed })
    }

    /// Configured seed.
    pub fn seed(&self) -> u16 {
        self.seed
    }

    /// Current register contents (observability for tests).
    pub fn state(&self) -> u16 {
        self.state
    }

    /// Rewind the register to the configured seed. Called internally at
    /// every codeword boundary.
    pub fn reseed(&mut self) {
        self.state = self.seed;
    }

    #[inline]
    fn next_bit(&mut self) -> u8 {
        let out = (self.state & 1) as u8;
        let feedback = LFSR_TAPS
            .iter()
            .fold(0u16, |acc, &tap| acc ^ (self.state >> tap));
        self.state = (self.state >> 1) | ((feedback & 1) << 15);
        out
    }

    /// Fill `out` with raw keystream bits from a fresh seed.
    pub fn keystream(&mut self, out: &mut [u8]) {
        self.reseed();
        for slot in out.iter_mut() {
            *slot = self.next_bit();
        }
    }

    /// XOR one codeword's bits with the keystream, re-seeding first.
    /// The same call descrambles.
    pub fn scramble(&mut self, input: &[u8], output: &mut [u8]) {
        debug_assert_eq!(input.len(), output.len());
        self.reseed();
        for (o, &i) in output.iter_mut().zip(input.iter()) {
            *o = i ^ self.next_bit();
        }
    }

    /// In-place variant of [`Self::scramble`].
    pub fn scramble_in_place(&mut self, bits: &mut [u8]) {
        self.reseed();
        for bit in bits.iter_mut() {
            *bit ^= self.next_bit();
        }
    }

    /// Descramble soft decisions: wherever the keystream bit is 1 the
    /// transmitted bit was inverted, so the LLR changes sign.
    pub fn derandomize_llrs(&mut self, llrs: &mut [f32]) {
        self.reseed();
        for llr in llrs.iter_mut() {
            if self.next_bit() == 1 {
                *llr = -*llr;
            }
        }
    }
}
