//! # Forward Error Correction
//!
//! The Appendix-R coding layer: quasi-cyclic LDPC encode/decode over the
//! shared protograph expansion, plus the per-codeword randomizer that
//! whitens the bit stream between the encoder and the ASM framer.

pub mod decoder;
pub mod encoder;
pub mod protograph;
pub mod randomizer;

pub use decoder::{DecodeOutcome, DecoderState, LdpcDecoder};
pub use encoder::LdpcEncoder;
pub use protograph::ParityCheckMatrix;
pub use randomizer::Randomizer;
