//! # SOQPSK-TG Demodulator
//!
//! Receive-side mirror of the modulator, organised as four sub-stages that
//! every sample flows through in order:
//!
//! 1. **Down-conversion + carrier-recovery PLL.** The sample is mixed with
//!    the nominal carrier NCO plus a second-order PLL correction
//!    (`Kp = 4*zeta*BW/fs`, `Ki = 4*(BW/fs)^2`). The decision-directed
//!    error is `Im(z) * sign(Re(z))`, phase wrapped to (-pi, pi]. The PLL
//!    only ever tracks the residual offset; expecting it to acquire the
//!    full carrier would put the pull-in range orders of magnitude short.
//! 2. **Phase discriminator.** `dphi[n] = arg(z[n] * conj(z[n-1]))`
//!    recovers the instantaneous frequency; summed over one symbol window
//!    the series telescopes into the per-symbol phase advance.
//! 3. **Gardner-style symbol timing.** Early/mid/late discriminator
//!    samples at +-SPS/2 around the window center form
//!    `err = (late - early) * mid`; `mu += K * err`, the next window
//!    consumes `SPS + floor(mu)` samples and the fractional part carries.
//!    The first window is deferred by the pulse group delay so a stream
//!    that starts at a frame boundary comes up already center-aligned.
//! 4. **Sequence detection.** An 8-state trellis over the precoder memory
//!    (symbol parity x two data bits) with persistent path metrics. This
//!    is the reduced-complexity detector mode: branch metrics use only the
//!    pulse main-lobe advance, and soft outputs are per-symbol max-log
//!    differences rather than traceback decisions. LLRs are scaled by the
//!    running noise estimate (positive favours bit 0).

use std::f64::consts::PI;

use crate::constants::DEFAULT_TIMING_LOOP_GAIN;
use crate::soqpsk::iq::IqSample;
use crate::soqpsk::precoder::precode_step;
use crate::soqpsk::pulse::{frequency_pulse, main_lobe_fraction};

const INFEASIBLE: f32 = 1e30;
const LLR_LIMIT: f32 = 30.0;

/// Streaming SOQPSK-TG demodulator emitting per-bit LLRs.
#[derive(Debug, Clone)]
pub struct Demodulator {
    sps: usize,

    // down-conversion NCO
    carrier_phase: f64,
    carrier_step: f64,

    // carrier-recovery PLL
    pll_phase: f64,
    pll_freq: f64,
    kp: f64,
    ki: f64,

    // discriminator
    prev_baseband: Option<IqSample>,
    disc_ring: Vec<f32>,
    ring_pos: usize,

    // symbol windowing / timing recovery
    startup_skip: usize,
    window_len: usize,
    window_fill: usize,
    phase_acc: f64,
    timing_mu: f32,
    timing_gain: f32,

    // sequence detector
    path_metrics: [f32; 8],
    odd_symbol: bool,
    expected_advance: f32,
    noise_est: f32,
}

impl Demodulator {
    /// Build a demodulator matched to the modulator's pulse and sampling
    /// parameters. `bandwidth_scale` and `damping` set the PLL per the
    /// configured loop design.
    pub fn new(
        carrier_freq: f64,
        sample_rate: f64,
        sps: usize,
        bandwidth_scale: f64,
        damping: f64,
    ) -> Self {
        let symbol_rate = sample_rate / sps as f64;
        let loop_bw = symbol_rate * bandwidth_scale;
        let kp = 4.0 * damping * loop_bw / sample_rate;
        let ki = 4.0 * (loop_bw / sample_rate) * (loop_bw / sample_rate);

        let pulse = frequency_pulse(sps);
        let expected_advance =
            (std::f64::consts::FRAC_PI_2 * main_lobe_fraction(&pulse, sps)) as f32;
        // defer the first window to the pulse group delay so window centers
        // land on pulse peaks for a stream-aligned transmitter
        let startup_skip = pulse.len() / 2 - sps / 2;

        let mut path_metrics = [INFEASIBLE; 8];
        // even bank, d[-1] = d[-2] = +1: the precoder's initial conditions
        path_metrics[0b011] = 0.0;

        Self {
            sps,
            carrier_phase: 0.0,
            carrier_step: 2.0 * PI * carrier_freq / sample_rate,
            pll_phase: 0.0,
            pll_freq: 0.0,
            kp,
            ki,
            prev_baseband: None,
            disc_ring: vec![0.0; 2 * sps],
            ring_pos: 0,
            startup_skip,
            window_len: sps,
            window_fill: 0,
            phase_acc: 0.0,
            timing_mu: 0.0,
            timing_gain: DEFAULT_TIMING_LOOP_GAIN,
            path_metrics,
            odd_symbol: false,
            expected_advance,
            noise_est: 0.5,
        }
    }

    /// Residual carrier phase currently tracked by the PLL.
    pub fn pll_phase(&self) -> f64 {
        self.pll_phase
    }

    /// Fractional timing offset of the symbol windows.
    pub fn timing_mu(&self) -> f32 {
        self.timing_mu
    }

    /// Per-state path metrics of the sequence detector.
    pub fn path_metrics(&self) -> &[f32; 8] {
        &self.path_metrics
    }

    /// Process a block of samples, appending one LLR per recovered bit to
    /// `llrs`. State persists across calls; samples may arrive in chunks
    /// of any size.
    pub fn demodulate(&mut self, samples: &[IqSample], llrs: &mut Vec<f32>) {
        for &rx in samples {
            let dphi = self.front_end(rx);

            self.disc_ring[self.ring_pos] = dphi;
            self.ring_pos = (self.ring_pos + 1) % self.disc_ring.len();

            if self.startup_skip > 0 {
                self.startup_skip -= 1;
                continue;
            }

            self.phase_acc += dphi as f64;
            self.window_fill += 1;
            if self.window_fill >= self.window_len {
                let advance = self.phase_acc as f32;
                self.recover_timing();
                llrs.push(self.detect(advance));
                self.phase_acc = 0.0;
                self.window_fill = 0;
            }
        }
    }

    /// Mix one sample down, run the PLL, and return the discriminator
    /// output (phase advance since the previous sample).
    fn front_end(&mut self, rx: IqSample) -> f32 {
        // modulo keeps the NCO exact even when the carrier aliases far
        // above the sample rate
        self.carrier_phase = (self.carrier_phase + self.carrier_step).rem_euclid(2.0 * PI);
        let osc_phase = (self.carrier_phase + self.pll_phase) as f32;
        let z = rx * IqSample::from_phase(-osc_phase);

        // decision-directed phase error
        let err = (z.q * z.i.signum()) as f64;
        self.pll_freq += self.ki * err;
        self.pll_phase += self.kp * err + self.pll_freq;
        while self.pll_phase > PI {
            self.pll_phase -= 2.0 * PI;
        }
        while self.pll_phase <= -PI {
            self.pll_phase += 2.0 * PI;
        }

        let dphi = match self.prev_baseband {
            Some(prev) => (z * prev.conj()).arg(),
            None => 0.0,
        };
        self.prev_baseband = Some(z);
        dphi
    }

    /// Gardner-style early/late update over the discriminator ring; sets
    /// the length of the next symbol window.
    fn recover_timing(&mut self) {
        let ring_len = self.disc_ring.len();
        let at = |back: usize| {
            self.disc_ring[(self.ring_pos + ring_len - 1 - back) % ring_len]
        };
        let late = at(0);
        let mid = at(self.window_len / 2);
        let early = at(self.window_len - 1);
        let err = (late - early) * mid;

        self.timing_mu += self.timing_gain * err;
        let whole = self.timing_mu.floor();
        self.timing_mu -= whole;
        let next = self.sps as i32 + whole as i32;
        self.window_len = next.clamp((self.sps / 2) as i32, (2 * self.sps - 1) as i32) as usize;
    }

    /// One trellis step over the accumulated phase advance. State index is
    /// `parity * 4 + (d_prev1 > 0) * 2 + (d_prev2 > 0)`.
    fn detect(&mut self, advance: f32) -> f32 {
        let bank = (self.odd_symbol as usize) * 4;
        let mut next_metrics = [INFEASIBLE; 8];
        let mut best_zero = INFEASIBLE;
        let mut best_one = INFEASIBLE;

        for local in 0..4usize {
            let pm = self.path_metrics[bank + local];
            if pm >= INFEASIBLE {
                continue;
            }
            let d_prev1: i8 = if local & 0b10 != 0 { 1 } else { -1 };
            let d_prev2: i8 = if local & 0b01 != 0 { 1 } else { -1 };

            for d in [-1i8, 1] {
                let a = precode_step(d, d_prev1, d_prev2, self.odd_symbol);
                let residual = advance - a as f32 * self.expected_advance;
                let metric = pm + residual * residual;

                if d > 0 {
                    best_one = best_one.min(metric);
                } else {
                    best_zero = best_zero.min(metric);
                }

                let next_bank = (!self.odd_symbol as usize) * 4;
                let next_local = (((d > 0) as usize) << 1) | ((d_prev1 > 0) as usize);
                let slot = next_bank + next_local;
                if metric < next_metrics[slot] {
                    next_metrics[slot] = metric;
                }
            }
        }

        let floor = best_zero.min(best_one);
        self.noise_est = 0.995 * self.noise_est + 0.005 * floor;
        for m in next_metrics.iter_mut() {
            if *m < INFEASIBLE {
                *m -= floor;
            }
        }
        self.path_metrics = next_metrics;
        self.odd_symbol = !self.odd_symbol;

        let scale = 0.5 / self.noise_est.max(1e-3);
        ((best_one - best_zero) * scale).clamp(-LLR_LIMIT, LLR_LIMIT)
    }
}
