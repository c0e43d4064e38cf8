//! # SOQPSK-TG Frequency Pulse
//!
//! Precomputed shaping table for the partial-response pulse of IRIG 106
//! Appendix M: a spectral-raised-cosine kernel
//!
//! ```text
//! g(t) = cos(pi rho B t/T) * sin(pi B t/T) / [(1 - 4 (rho B t/T)^2) * pi B t/T]
//! ```
//!
//! multiplied by the (T1, T2) cosine taper window that truncates it to
//! eight symbol times. Both 0/0 singularities (t = 0 and rho*B*t/T = 1/2)
//! are filled with their L'Hopital limits; a residual denominator below
//! 1e-10 contributes zero.
//!
//! The table is normalized to unit area so one ternary impulse advances
//! the carrier phase by exactly pi/2 once its whole pulse has drained
//! through the integrator.

use std::f64::consts::PI;

use crate::constants::{PULSE_SYMBOLS, SOQPSK_B, SOQPSK_RHO, SOQPSK_T1, SOQPSK_T2};

const SINGULARITY_EPS: f64 = 1e-10;

/// Unwindowed pulse value at `tau` symbol times from the center.
fn g_raw(tau: f64) -> f64 {
    let rho = SOQPSK_RHO;
    let b = SOQPSK_B;

    if tau.abs() < SINGULARITY_EPS {
        // sin(x)/x -> 1, every other factor -> 1
        return 1.0;
    }

    let rbt = rho * b * tau;
    let denom = (1.0 - 4.0 * rbt * rbt) * (PI * b * tau);
    if (1.0 - 4.0 * rbt * rbt).abs() < SINGULARITY_EPS {
        // 0/0 where the cosine zero meets the vanishing factor
        return (PI * b * tau.abs()).sin() / (8.0 * rho * b * b * tau * tau);
    }
    if denom.abs() < SINGULARITY_EPS {
        return 0.0;
    }
    (PI * rbt).cos() * (PI * b * tau).sin() / denom
}

/// Cosine taper window over `tau` symbol times (T1, T2 are in symbol-pair
/// times; the window reaches zero at the table edge).
fn window(tau: f64) -> f64 {
    let pairs = tau.abs() / 2.0;
    if pairs <= SOQPSK_T1 {
        1.0
    } else if pairs <= SOQPSK_T1 + SOQPSK_T2 {
        0.5 * (1.0 + (PI * (pairs - SOQPSK_T1) / SOQPSK_T2).cos())
    } else {
        0.0
    }
}

/// Build the length `PULSE_SYMBOLS * sps` shaping table, unit-normalized.
pub fn frequency_pulse(sps: usize) -> Vec<f64> {
    let len = PULSE_SYMBOLS * sps;
    let center = (len / 2) as f64;
    let mut pulse: Vec<f64> = (0..len)
        .map(|n| {
            let tau = (n as f64 - center) / sps as f64;
            g_raw(tau) * window(tau)
        })
        .collect();

    let area: f64 = pulse.iter().sum();
    for p in pulse.iter_mut() {
        *p /= area;
    }
    pulse
}

/// Fraction of the pulse area inside the central symbol interval. The
/// sequence detector uses this as the expected per-symbol phase advance of
/// an isolated impulse.
pub fn main_lobe_fraction(pulse: &[f64], sps: usize) -> f64 {
    let center = pulse.len() / 2;
    pulse[center - sps / 2..center + sps / 2].iter().sum()
}
