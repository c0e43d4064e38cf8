//! # Pipeline Configuration
//!
//! Typed tuning knobs supplied once at pipeline construction. Everything
//! wire-critical (codeword length, ASM, CRC polynomial, pulse shape) is a
//! compile-time constant in [`crate::constants`]; this struct only carries
//! the values the runtime parameter registry is allowed to hand over.
//!
//! The struct round-trips through serde so the host's parameter registry
//! can persist and restore it alongside its own settings.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::TmLinkError;

/// LDPC code rate selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CodeRate {
    /// Rate 1/2, K = 4096
    Half,
    /// Rate 2/3, K = 5461
    #[default]
    TwoThirds,
    /// Rate 4/5, K = 6554
    FourFifths,
}

impl CodeRate {
    /// Information block length in bits.
    pub fn k(self) -> usize {
        match self {
            CodeRate::Half => LDPC_K_RATE_1_2,
            CodeRate::TwoThirds => LDPC_K_RATE_2_3,
            CodeRate::FourFifths => LDPC_K_RATE_4_5,
        }
    }

    /// Parity length in bits.
    pub fn m(self) -> usize {
        LDPC_N - self.k()
    }

    /// Human-readable rate, e.g. `"2/3"`.
    pub fn as_str(self) -> &'static str {
        match self {
            CodeRate::Half => "1/2",
            CodeRate::TwoThirds => "2/3",
            CodeRate::FourFifths => "4/5",
        }
    }
}

/// Tuning knobs recognised by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// LDPC code rate (selects K)
    pub code_rate: CodeRate,
    /// Randomizer seed, re-applied at each codeword; must be nonzero
    pub lfsr_seed: u16,
    /// Carrier-recovery loop bandwidth as a fraction of the symbol rate
    pub pll_bandwidth_scale: f32,
    /// Carrier-recovery loop damping factor
    pub pll_damping: f32,
    /// Belief-propagation iteration cap
    pub ldpc_max_iter: usize,
    /// Stop iterating as soon as the syndrome is satisfied
    pub ldpc_early_term: bool,
    /// Check-to-variable message scaling factor
    pub ldpc_msg_scale: f32,
    /// Carrier frequency in Hz
    pub carrier_freq_hz: f64,
    /// Baseband sample rate in Hz
    pub sample_rate_hz: f64,
    /// Oversampling factor (samples per symbol)
    pub samples_per_symbol: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            code_rate: CodeRate::default(),
            lfsr_seed: DEFAULT_LFSR_SEED,
            pll_bandwidth_scale: DEFAULT_PLL_BANDWIDTH_SCALE,
            pll_damping: DEFAULT_PLL_DAMPING,
            ldpc_max_iter: DEFAULT_LDPC_MAX_ITER,
            ldpc_early_term: true,
            ldpc_msg_scale: DEFAULT_LDPC_MSG_SCALE,
            carrier_freq_hz: CARRIER_FREQ_HZ,
            sample_rate_hz: SAMPLE_RATE_HZ,
            samples_per_symbol: SAMPLES_PER_SYMBOL,
        }
    }
}

impl PipelineConfig {
    /// Symbol (bit) rate implied by the sampling parameters.
    pub fn symbol_rate_hz(&self) -> f64 {
        self.sample_rate_hz / self.samples_per_symbol as f64
    }

    /// Check construction parameters; all violations are fatal.
    pub fn validate(&self) -> Result<(), TmLinkError> {
        if self.lfsr_seed == 0 {
            return Err(TmLinkError::Config(
                "randomizer seed must be nonzero".into(),
            ));
        }
        if self.sample_rate_hz <= 0.0 {
            return Err(TmLinkError::Config(format!(
                "sample rate must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        if self.samples_per_symbol < 2 || self.samples_per_symbol % 2 != 0 {
            return Err(TmLinkError::Config(format!(
                "samples per symbol must be even and at least 2, got {}",
                self.samples_per_symbol
            )));
        }
        if self.carrier_freq_hz < 0.0 {
            return Err(TmLinkError::Config(format!(
                "carrier frequency must be non-negative, got {}",
                self.carrier_freq_hz
            )));
        }
        if !(self.pll_bandwidth_scale > 0.0) || !(self.pll_damping > 0.0) {
            return Err(TmLinkError::Config(
                "PLL bandwidth scale and damping must be positive".into(),
            ));
        }
        if self.ldpc_max_iter == 0 {
            return Err(TmLinkError::Config(
                "decoder iteration cap must be at least 1".into(),
            ));
        }
        if !(self.ldpc_msg_scale > 0.0) || self.ldpc_msg_scale > 1.0 {
            return Err(TmLinkError::Config(format!(
                "message scaling factor must be in (0, 1], got {}",
                self.ldpc_msg_scale
            )));
        }
        Ok(())
    }
}
