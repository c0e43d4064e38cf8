//! # SOQPSK-TG Modulator
//!
//! Continuous-phase modulation of the framed bit stream:
//!
//! 1. differential ternary precoding,
//! 2. upsampling by SPS and convolution with the frequency pulse,
//! 3. phase integration and carrier mixing into complex baseband samples.
//!
//! All three stages are streaming: the precoder memory, the unconsumed
//! convolution tail and both phase accumulators persist across `modulate`
//! calls, so chunking a bit stream arbitrarily yields the same samples as
//! one call and consecutive frames stay phase-continuous on the air.
//! `reset` is the only way to discard phase, and only the orchestrator
//! calls it.

use std::f64::consts::PI;

use crate::constants::PULSE_SYMBOLS;
use crate::soqpsk::iq::IqSample;
use crate::soqpsk::precoder::TernaryPrecoder;
use crate::soqpsk::pulse::frequency_pulse;

/// Streaming SOQPSK-TG modulator.
#[derive(Debug, Clone)]
pub struct Modulator {
    carrier_freq: f64,
    sample_rate: f64,
    sps: usize,
    pulse: Vec<f64>,
    precoder: TernaryPrecoder,
    /// Integrated CPM phase, carried across calls
    phase_accum: f64,
    /// Carrier NCO phase, carried across calls
    carrier_phase: f64,
    carrier_step: f64,
    /// Convolution output not yet emitted (length pulse_len - 1)
    tail: Vec<f64>,
    ternary: Vec<i8>,
    freq: Vec<f64>,
    carry: Vec<f64>,
}

impl Modulator {
    /// Build a modulator; the pulse table is computed once here.
    pub fn new(carrier_freq: f64, sample_rate: f64, sps: usize) -> Self {
        let pulse = frequency_pulse(sps);
        let tail_len = pulse.len() - 1;
        Self {
            carrier_freq,
            sample_rate,
            sps,
            pulse,
            precoder: TernaryPrecoder::new(),
            phase_accum: 0.0,
            carrier_phase: 0.0,
            carrier_step: 2.0 * PI * carrier_freq / sample_rate,
            tail: vec![0.0; tail_len],
            ternary: Vec::new(),
            freq: Vec::new(),
            carry: vec![0.0; tail_len],
        }
    }

    /// Samples emitted per input bit.
    pub fn samples_per_bit(&self) -> usize {
        self.sps
    }

    /// Samples a `flush` call will emit.
    pub fn flush_len(&self) -> usize {
        PULSE_SYMBOLS * self.sps
    }

    /// Integrated CPM phase after the last emitted sample.
    pub fn phase_accum(&self) -> f64 {
        self.phase_accum
    }

    /// Discard all phase and filter state. This breaks phase continuity by
    /// request; between back-to-back frames it must not be called.
    pub fn reset(&mut self) {
        self.phase_accum = 0.0;
        self.carrier_phase = 0.0;
        self.tail.iter_mut().for_each(|t| *t = 0.0);
        self.precoder.reset();
    }

    /// Modulate `bits` into exactly `bits.len() * sps` samples.
    pub fn modulate(&mut self, bits: &[u8], out: &mut [IqSample]) {
        assert_eq!(out.len(), bits.len() * self.sps, "sample buffer mismatch");
        self.ternary.resize(bits.len(), 0);
        let mut ternary = std::mem::take(&mut self.ternary);
        self.precoder.precode(bits, &mut ternary);
        self.shape_and_mix(&ternary, out);
        self.ternary = ternary;
    }

    /// Drain the convolution tail with an idle (all-zero impulse) pulse
    /// span, emitting `flush_len()` samples. Call once at end-of-stream so
    /// an isolated frame's final symbols reach the receiver in full.
    pub fn flush(&mut self, out: &mut [IqSample]) {
        assert_eq!(out.len(), self.flush_len(), "flush buffer mismatch");
        self.ternary.clear();
        self.ternary.resize(PULSE_SYMBOLS, 0);
        let ternary = std::mem::take(&mut self.ternary);
        self.shape_and_mix(&ternary, out);
        self.ternary = ternary;
    }

    /// Upsample the ternary impulses, convolve with the pulse, integrate
    /// the phase and mix onto the carrier.
    fn shape_and_mix(&mut self, ternary: &[i8], out: &mut [IqSample]) {
        let out_len = ternary.len() * self.sps;
        let pulse_len = self.pulse.len();

        self.freq.clear();
        self.freq.resize(out_len, 0.0);
        let mut freq = std::mem::take(&mut self.freq);

        // previous calls' unfinished pulse energy comes first
        self.carry.iter_mut().for_each(|c| *c = 0.0);
        let mut carry = std::mem::take(&mut self.carry);
        debug_assert_eq!(carry.len(), pulse_len - 1);
        for (i, &t) in self.tail.iter().enumerate() {
            if i < out_len {
                freq[i] += t;
            } else {
                carry[i - out_len] += t;
            }
        }

        for (sym, &a) in ternary.iter().enumerate() {
            if a == 0 {
                continue;
            }
            let amp = a as f64;
            let base = sym * self.sps;
            for (j, &g) in self.pulse.iter().enumerate() {
                let idx = base + j;
                if idx < out_len {
                    freq[idx] += amp * g;
                } else {
                    carry[idx - out_len] += amp * g;
                }
            }
        }
        self.tail.copy_from_slice(&carry);
        self.carry = carry;

        // phase integration; theta[0] continues from the stored accumulator
        for (n, sample) in out.iter_mut().enumerate() {
            let f_inst = freq[n] * (0.25 * self.sample_rate);
            self.phase_accum += 2.0 * PI * f_inst / self.sample_rate;
            self.carrier_phase = (self.carrier_phase + self.carrier_step).rem_euclid(2.0 * PI);
            let total = self.carrier_phase + self.phase_accum;
            *sample = IqSample::new(total.cos() as f32, total.sin() as f32);
        }

        self.freq = freq;
    }

    /// Carrier frequency this modulator mixes to.
    pub fn carrier_freq(&self) -> f64 {
        self.carrier_freq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_modulator() -> Modulator {
        // baseband-friendly parameters keep the tests readable
        Modulator::new(0.0, 8_000_000.0, 8)
    }

    fn bits(n: usize) -> Vec<u8> {
        (0..n).map(|i| ((i * 29 + 5) % 3 == 0) as u8).collect()
    }

    #[test]
    fn sample_count_matches_bits() {
        let mut m = test_modulator();
        let b = bits(100);
        let mut out = vec![IqSample::default(); 800];
        m.modulate(&b, &mut out);
        assert_eq!(out.len(), b.len() * 8);
    }

    #[test]
    fn constant_envelope() {
        let mut m = test_modulator();
        let b = bits(200);
        let mut out = vec![IqSample::default(); b.len() * 8];
        m.modulate(&b, &mut out);
        for s in out {
            assert!((s.abs() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn split_call_matches_single_call() {
        let b = bits(1000);

        let mut whole = test_modulator();
        let mut all = vec![IqSample::default(); b.len() * 8];
        whole.modulate(&b, &mut all);

        let mut halves = test_modulator();
        let mut first = vec![IqSample::default(); 500 * 8];
        let mut second = vec![IqSample::default(); 500 * 8];
        halves.modulate(&b[..500], &mut first);
        halves.modulate(&b[500..], &mut second);

        for (n, (a, h)) in all
            .iter()
            .zip(first.iter().chain(second.iter()))
            .enumerate()
        {
            assert!(
                (a.i - h.i).abs() < 1e-6 && (a.q - h.q).abs() < 1e-6,
                "sample {n} diverged"
            );
        }
        assert!((whole.phase_accum() - halves.phase_accum()).abs() < 1e-9);
    }

    #[test]
    fn phase_is_continuous_across_calls() {
        let mut m = test_modulator();
        let b = bits(64);
        let mut first = vec![IqSample::default(); b.len() * 8];
        m.modulate(&b, &mut first);
        let mut second = vec![IqSample::default(); b.len() * 8];
        m.modulate(&b, &mut second);

        // max per-sample phase step of the CPM signal is pi/2 / SPS plus
        // pulse overshoot; a reset would show up as a near-pi jump
        let boundary_step = (second[0] * first.last().unwrap().conj()).arg().abs();
        assert!(boundary_step < 2.0 * std::f32::consts::PI / 8.0);
    }

    #[test]
    fn reset_restarts_phase() {
        let mut m = test_modulator();
        let b = bits(64);
        let mut first = vec![IqSample::default(); b.len() * 8];
        m.modulate(&b, &mut first);
        let phase_after = m.phase_accum();
        assert!(phase_after != 0.0);

        m.reset();
        assert_eq!(m.phase_accum(), 0.0);
        let mut again = vec![IqSample::default(); b.len() * 8];
        m.modulate(&b, &mut again);
        for (a, b) in first.iter().zip(again.iter()) {
            assert!((a.i - b.i).abs() < 1e-6 && (a.q - b.q).abs() < 1e-6);
        }
    }

    #[test]
    fn flush_drains_constant_tail() {
        let mut m = test_modulator();
        let b = bits(32);
        let mut out = vec![IqSample::default(); b.len() * 8];
        m.modulate(&b, &mut out);
        let mut tail_out = vec![IqSample::default(); m.flush_len()];
        m.flush(&mut tail_out);
        // after a flush the filter memory is empty
        assert!(m.tail.iter().all(|&t| t.abs() < 1e-12));
    }
}
