//! # LDPC Belief-Propagation Decoder
//!
//! Sum-product decoding over the expanded protograph. Messages live in one
//! flat per-edge array indexed through per-check offsets; the array is
//! sized by the Tanner graph's true edge count at construction and reused
//! across frames, so steady-state decoding never allocates.
//!
//! Per-frame life cycle: `Idle -> Iterating -> {Converged | MaxIterReached}`,
//! reset at the next `decode` call.

use log::debug;

use crate::config::CodeRate;
use crate::error::TmLinkError;
use crate::fec::protograph::ParityCheckMatrix;

/// Decoder progress for the frame most recently processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    /// No frame decoded since construction
    #[default]
    Idle,
    /// Mid-iteration (only observable from a panic hook)
    Iterating,
    /// Syndrome satisfied
    Converged,
    /// Iteration cap hit with a nonzero syndrome
    MaxIterReached,
}

/// Result of one `decode` call.
///
/// A non-converged outcome is not an error at this layer: the hard decision
/// is still available and the caller decides whether to try the CRC anyway
/// or drop the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOutcome {
    /// Parity checks all satisfied
    pub converged: bool,
    /// Iterations actually run
    pub iterations: usize,
    /// Unsatisfied check count at exit (zero when converged)
    pub unsatisfied: usize,
}

impl DecodeOutcome {
    /// Map a failed outcome onto the pipeline error it signals.
    pub fn into_result(self) -> Result<Self, TmLinkError> {
        if self.converged {
            Ok(self)
        } else {
            Err(TmLinkError::DecodeUncorrectable {
                iterations: self.iterations,
                unsatisfied: self.unsatisfied,
            })
        }
    }
}

/// Sum-product decoder for one code rate.
#[derive(Debug, Clone)]
pub struct LdpcDecoder {
    matrix: ParityCheckMatrix,
    max_iter: usize,
    early_term: bool,
    msg_scale: f32,
    state: DecoderState,

    /// Check-to-variable messages, one slot per Tanner edge
    check_msgs: Vec<f32>,
    /// Edge-array offset of each check's message block
    edge_offsets: Vec<u32>,
    /// Accumulated posterior LLR per variable
    llr_total: Vec<f32>,
    /// Hard-decision scratch
    hard: Vec<u8>,
    /// Per-check forward/backward product scratch
    fwd: Vec<f32>,
    bwd: Vec<f32>,
}

/// Saturation bound of the hyperbolic-tangent domain. Beyond |x| = 3 the
/// true curve is within 1e-2 of its asymptote, and bounding it keeps the
/// inverse finite.
const TANH_BOUND: f32 = 3.0;

/// Largest magnitude a check-to-variable message may take (2 * atanh of the
/// bounded-domain product limit).
const MSG_LIMIT: f32 = 2.0 * TANH_BOUND;

#[inline]
fn bounded_tanh(x: f32) -> f32 {
    x.clamp(-TANH_BOUND, TANH_BOUND).tanh()
}

impl LdpcDecoder {
    /// Build a decoder; `max_iter` bounds worst-case CPU per frame and
    /// `msg_scale` in (0, 1] damps short-cycle bias.
    pub fn new(
        rate: CodeRate,
        max_iter: usize,
        early_term: bool,
        msg_scale: f32,
    ) -> Result<Self, TmLinkError> {
        if max_iter == 0 {
            return Err(TmLinkError::Config(
                "decoder iteration cap must be at least 1".into(),
            ));
        }
        if !(msg_scale > 0.0) || msg_scale > 1.0 {
            return Err(TmLinkError::Config(format!(
                "message scaling factor must be in (0, 1], got {msg_scale}"
            )));
        }
        let matrix = ParityCheckMatrix::for_rate(rate)?;

        let mut edge_offsets = Vec::with_capacity(matrix.m());
        let mut offset = 0u32;
        for c in 0..matrix.m() {
            edge_offsets.push(offset);
            offset += matrix.check(c).len() as u32;
        }
        debug_assert_eq!(offset as usize, matrix.num_edges());

        let scratch = matrix.max_check_degree() + 1;
        Ok(Self {
            check_msgs: vec![0.0; matrix.num_edges()],
            edge_offsets,
            llr_total: vec![0.0; matrix.n()],
            hard: vec![0u8; matrix.n()],
            fwd: vec![0.0; scratch],
            bwd: vec![0.0; scratch],
            matrix,
            max_iter,
            early_term,
            msg_scale,
            state: DecoderState::Idle,
        })
    }

    /// Codeword length N.
    pub fn n(&self) -> usize {
        self.matrix.n()
    }

    /// Information length K.
    pub fn k(&self) -> usize {
        self.matrix.k()
    }

    /// State left behind by the last frame.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Hard decision of the last frame (valid whether or not it converged).
    pub fn hard_bits(&self) -> &[u8] {
        &self.hard
    }

    /// Run belief propagation over one frame of channel LLRs (length N,
    /// positive favours bit 0).
    pub fn decode(&mut self, channel_llrs: &[f32]) -> DecodeOutcome {
        assert_eq!(channel_llrs.len(), self.matrix.n(), "LLR length mismatch");
        self.state = DecoderState::Iterating;
        self.llr_total.copy_from_slice(channel_llrs);
        self.check_msgs.iter_mut().for_each(|m| *m = 0.0);

        let mut iterations = 0;
        let mut unsatisfied = self.matrix.m();

        while iterations < self.max_iter {
            iterations += 1;
            self.update_check_messages();
            self.update_posteriors(channel_llrs);
            self.harden();

            if self.early_term {
                unsatisfied = self.matrix.unsatisfied_checks(&self.hard);
                if unsatisfied == 0 {
                    break;
                }
            }
        }

        if !self.early_term {
            unsatisfied = self.matrix.unsatisfied_checks(&self.hard);
        }

        let converged = unsatisfied == 0;
        self.state = if converged {
            DecoderState::Converged
        } else {
            DecoderState::MaxIterReached
        };
        debug!(
            "ldpc decode: {} iterations, {} unsatisfied checks",
            iterations, unsatisfied
        );
        DecodeOutcome {
            converged,
            iterations,
            unsatisfied,
        }
    }

    /// Tanh-product check-node update with extrinsic exclusion done via
    /// forward/backward partial products (no division, so a zero-confidence
    /// input cannot blow up a whole check).
    fn update_check_messages(&mut self) {
        for c in 0..self.matrix.m() {
            let vars = self.matrix.check(c);
            let degree = vars.len();
            let base = self.edge_offsets[c] as usize;

            self.fwd[0] = 1.0;
            for (j, &v) in vars.iter().enumerate() {
                let extrinsic = self.llr_total[v as usize] - self.check_msgs[base + j];
                let t = bounded_tanh(0.5 * extrinsic);
                self.fwd[j + 1] = self.fwd[j] * t;
                // stash t where the backward pass can pick it up
                self.bwd[j] = t;
            }

            let mut tail = 1.0f32;
            for j in (0..degree).rev() {
                let t = self.bwd[j];
                let product = self.fwd[j] * tail;
                tail *= t;

                let bounded = product.clamp(-0.999_999, 0.999_999);
                let msg = (2.0 * bounded.atanh()).clamp(-MSG_LIMIT, MSG_LIMIT);
                self.check_msgs[base + j] = self.msg_scale * msg;
            }
        }
    }

    /// Variable-node update: posterior = channel + all incident messages.
    fn update_posteriors(&mut self, channel_llrs: &[f32]) {
        self.llr_total.copy_from_slice(channel_llrs);
        for c in 0..self.matrix.m() {
            let base = self.edge_offsets[c] as usize;
            for (j, &v) in self.matrix.check(c).iter().enumerate() {
                self.llr_total[v as usize] += self.check_msgs[base + j];
            }
        }
    }

    fn harden(&mut self) {
        for (bit, &llr) in self.hard.iter_mut().zip(self.llr_total.iter()) {
            *bit = (llr < 0.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fec::encoder::LdpcEncoder;

    const STRONG_LLR: f32 = 8.0;

    fn llrs_from_bits(bits: &[u8]) -> Vec<f32> {
        bits.iter()
            .map(|&b| if b == 0 { STRONG_LLR } else { -STRONG_LLR })
            .collect()
    }

    #[test]
    fn clean_codeword_converges_first_iteration() {
        let enc = LdpcEncoder::new(CodeRate::TwoThirds).unwrap();
        let mut dec = LdpcDecoder::new(CodeRate::TwoThirds, 50, true, 1.0).unwrap();

        let info: Vec<u8> = (0..enc.k()).map(|i| (i % 17 == 0) as u8).collect();
        let mut cw = vec![0u8; enc.n()];
        enc.encode(&info, &mut cw);

        let outcome = dec.decode(&llrs_from_bits(&cw));
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(dec.state(), DecoderState::Converged);
        assert_eq!(dec.hard_bits(), &cw[..]);
    }

    #[test]
    fn corrects_scattered_weak_bits() {
        let enc = LdpcEncoder::new(CodeRate::Half).unwrap();
        let mut dec = LdpcDecoder::new(CodeRate::Half, 50, true, 1.0).unwrap();

        let info: Vec<u8> = (0..enc.k()).map(|i| (i % 5 == 2) as u8).collect();
        let mut cw = vec![0u8; enc.n()];
        enc.encode(&info, &mut cw);

        let mut llrs = llrs_from_bits(&cw);
        // flip a handful of spread-out bits with low confidence
        for &idx in &[3usize, 801, 1777, 2902, 4099, 6500] {
            llrs[idx] = -llrs[idx].signum() * 0.5;
        }

        let outcome = dec.decode(&llrs);
        assert!(outcome.converged);
        assert_eq!(&dec.hard_bits()[..enc.k()], &info[..]);
    }

    #[test]
    fn near_zero_llrs_hit_iteration_cap() {
        let mut dec = LdpcDecoder::new(CodeRate::TwoThirds, 10, true, 1.0).unwrap();
        // near-zero information whose hard word is not a codeword
        let llrs: Vec<f32> = (0..dec.n())
            .map(|i| if i % 3 == 0 { -0.01 } else { 0.01 })
            .collect();

        let outcome = dec.decode(&llrs);
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 10);
        assert!(outcome.unsatisfied > 0);
        assert_eq!(dec.state(), DecoderState::MaxIterReached);
        assert!(matches!(
            outcome.into_result(),
            Err(TmLinkError::DecodeUncorrectable { iterations: 10, .. })
        ));
    }

    #[test]
    fn early_termination_yields_valid_codeword() {
        let enc = LdpcEncoder::new(CodeRate::FourFifths).unwrap();
        let mut dec = LdpcDecoder::new(CodeRate::FourFifths, 50, true, 0.9).unwrap();

        let info: Vec<u8> = (0..enc.k()).map(|i| (i % 7 == 3) as u8).collect();
        let mut cw = vec![0u8; enc.n()];
        enc.encode(&info, &mut cw);

        let outcome = dec.decode(&llrs_from_bits(&cw));
        assert!(outcome.converged);
        assert!(enc.matrix().syndrome_ok(dec.hard_bits()));
    }

    #[test]
    fn zero_iteration_cap_rejected() {
        assert!(LdpcDecoder::new(CodeRate::Half, 0, true, 1.0).is_err());
    }
}
