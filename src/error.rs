//! # Downlink Error Handling
//!
//! This module defines the TmLinkError enum, which represents the different
//! error types that can occur in the tmlink-rs crate.
//!
//! Every kind except `Config` is a per-frame condition: the orchestrator
//! logs it, bumps the matching counter, drops the frame and advances to the
//! next ASM search. `Config` is fatal at pipeline construction.

use thiserror::Error;

/// Represents the different error types that can occur on the downlink.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TmLinkError {
    /// Invalid construction parameters (unknown rate, zero randomizer seed,
    /// malformed protograph).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The ASM correlator could not lock within the search window.
    #[error("Frame sync lost after {searched} bits searched")]
    FrameSyncLost { searched: usize },

    /// The LDPC decoder hit its iteration cap without syndrome satisfaction.
    #[error("Uncorrectable codeword: {iterations} iterations, {unsatisfied} checks unsatisfied")]
    DecodeUncorrectable {
        iterations: usize,
        unsatisfied: usize,
    },

    /// Post-decode CRC verification failed.
    #[error("CRC mismatch: expected {expected:#06x}, computed {computed:#06x}")]
    CrcMismatch { expected: u16, computed: u16 },

    /// Fewer samples (or recovered bits) than needed for one frame.
    #[error("Truncated input: need {needed}, got {got}")]
    TruncatedInput { needed: usize, got: usize },

    /// Malformed telemetry record bytes (wrong length, parse failure).
    #[error("Error parsing telemetry record: {0}")]
    RecordParse(String),
}

impl TmLinkError {
    /// True for the per-frame, recoverable kinds.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TmLinkError::Config(_))
    }
}
