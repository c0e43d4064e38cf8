//! # SOQPSK-TG Modulation
//!
//! The Appendix-M continuous-phase modulation layer: ternary precoding,
//! frequency-pulse shaping and phase integration on the way out; carrier
//! and timing recovery, phase discrimination and trellis detection on the
//! way back in. Both directions share the pulse table and the precoder
//! transition rule, which is what keeps them bit-exact mirrors of each
//! other.

pub mod demodulator;
pub mod iq;
pub mod modulator;
pub mod precoder;
pub mod pulse;

pub use demodulator::Demodulator;
pub use iq::IqSample;
pub use modulator::Modulator;
pub use precoder::TernaryPrecoder;
