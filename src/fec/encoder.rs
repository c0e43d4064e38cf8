//! # Systematic LDPC Encoder
//!
//! Maps K information bits onto an N = 8192 codeword. The systematic region
//! is copied verbatim; the parity region is solved by back-substitution on
//! the accumulator:
//!
//! ```text
//! check m:  (XOR of info neighbours)  ^  p[m]  ^  p[m-1]  =  0
//!      =>   p[m] = info_sum(m) ^ p[m-1]
//! ```
//!
//! Encoding is infallible once construction has validated the protograph.

use crate::config::CodeRate;
use crate::error::TmLinkError;
use crate::fec::protograph::ParityCheckMatrix;

/// Quasi-cyclic systematic encoder for one code rate.
#[derive(Debug, Clone)]
pub struct LdpcEncoder {
    rate: CodeRate,
    matrix: ParityCheckMatrix,
}

impl LdpcEncoder {
    /// Build the encoder for `rate`; fails if the rate's protograph table
    /// is malformed.
    pub fn new(rate: CodeRate) -> Result<Self, TmLinkError> {
        let matrix = ParityCheckMatrix::for_rate(rate)?;
        Ok(Self { rate, matrix })
    }

    /// Configured code rate.
    pub fn rate(&self) -> CodeRate {
        self.rate
    }

    /// Information length K in bits.
    pub fn k(&self) -> usize {
        self.matrix.k()
    }

    /// Codeword length N in bits.
    pub fn n(&self) -> usize {
        self.matrix.n()
    }

    /// Shared parity-check structure, used by the paired decoder tests.
    pub fn matrix(&self) -> &ParityCheckMatrix {
        &self.matrix
    }

    /// Encode `info` (one 0/1 byte per bit, length K) into `codeword`
    /// (length N). The first K output bits equal `info` exactly.
    pub fn encode(&self, info: &[u8], codeword: &mut [u8]) {
        let k = self.matrix.k();
        let m = self.matrix.m();
        assert_eq!(info.len(), k, "info length mismatch");
        assert_eq!(codeword.len(), k + m, "codeword length mismatch");

        codeword[..k].copy_from_slice(info);

        let (systematic, parity) = codeword.split_at_mut(k);
        let mut prev = 0u8;
        for (check, p) in parity.iter_mut().enumerate() {
            let mut acc = 0u8;
            for &v in self.matrix.check(check) {
                let v = v as usize;
                if v < k {
                    acc ^= systematic[v];
                }
            }
            *p = acc ^ prev;
            prev = *p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterned_info(k: usize) -> Vec<u8> {
        (0..k).map(|i| ((i * 31 + i / 7) % 5 == 0) as u8).collect()
    }

    #[test]
    fn systematic_region_is_verbatim() {
        for rate in [CodeRate::Half, CodeRate::TwoThirds, CodeRate::FourFifths] {
            let enc = LdpcEncoder::new(rate).unwrap();
            let info = patterned_info(enc.k());
            let mut cw = vec![0u8; enc.n()];
            enc.encode(&info, &mut cw);
            assert_eq!(&cw[..enc.k()], &info[..]);
        }
    }

    #[test]
    fn codewords_satisfy_every_check() {
        for rate in [CodeRate::Half, CodeRate::TwoThirds, CodeRate::FourFifths] {
            let enc = LdpcEncoder::new(rate).unwrap();
            let info = patterned_info(enc.k());
            let mut cw = vec![0u8; enc.n()];
            enc.encode(&info, &mut cw);
            assert!(enc.matrix().syndrome_ok(&cw), "rate {}", rate.as_str());
        }
    }

    #[test]
    fn zero_info_gives_zero_codeword() {
        let enc = LdpcEncoder::new(CodeRate::TwoThirds).unwrap();
        let info = vec![0u8; enc.k()];
        let mut cw = vec![1u8; enc.n()];
        enc.encode(&info, &mut cw);
        assert!(cw.iter().all(|&b| b == 0));
    }

    #[test]
    fn encoding_is_linear() {
        // c(a) ^ c(b) must equal c(a ^ b) for a linear code
        let enc = LdpcEncoder::new(CodeRate::Half).unwrap();
        let a = patterned_info(enc.k());
        let b: Vec<u8> = (0..enc.k()).map(|i| (i % 3 == 1) as u8).collect();
        let ab: Vec<u8> = a.iter().zip(&b).map(|(x, y)| x ^ y).collect();

        let mut ca = vec![0u8; enc.n()];
        let mut cb = vec![0u8; enc.n()];
        let mut cab = vec![0u8; enc.n()];
        enc.encode(&a, &mut ca);
        enc.encode(&b, &mut cb);
        enc.encode(&ab, &mut cab);

        let xored: Vec<u8> = ca.iter().zip(&cb).map(|(x, y)| x ^ y).collect();
        assert_eq!(xored, cab);
    }
}
