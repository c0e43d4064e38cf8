//! # Quasi-Cyclic Protograph Tables
//!
//! Parity-check structure of the Appendix-R LDPC codes. Each rate is
//! described by a sparse protograph: per check-row block, a list of
//! `(info column block, circulant shift)` pairs over Z = 128 circulants.
//! A listed pair expands to the Z edges
//!
//! ```text
//! info position  c*Z + i   <->   check position  r*Z + ((i + shift) % Z)
//! ```
//!
//! truncated at the true K and M boundaries (K is not a circulant multiple
//! for rates 2/3 and 4/5; the trailing partial blocks are shortened).
//! Absent pairs are the all-zero circulants.
//!
//! The parity region is a dual-diagonal accumulator: parity column `m`
//! participates in checks `m` and `m + 1`. That submatrix is lower
//! triangular, which both pins the matrix at full rank and lets the encoder
//! recover the parity bits by back-substitution.

use crate::config::CodeRate;
use crate::constants::LDPC_CIRCULANT_SIZE;
use crate::error::TmLinkError;

/// Circulant size shared by all three rates.
const Z: usize = LDPC_CIRCULANT_SIZE;

// Shift tables, one row per check-row block, entries sorted by column block.
// Info columns carry degree 3 at every rate.

static PROTO_RATE_1_2: &[&[(u8, u8)]] = &[
    &[(0, 6), (11, 125), (22, 93)],
    &[(1, 29), (12, 64), (23, 32)],
    &[(2, 96), (13, 31), (24, 127)],
    &[(3, 63), (14, 74), (25, 42)],
    &[(4, 106), (15, 49), (26, 17)],
    &[(5, 81), (16, 4), (27, 100)],
    &[(6, 36), (17, 51), (28, 19)],
    &[(7, 83), (18, 110), (29, 78)],
    &[(8, 14), (19, 37), (30, 5)],
    &[(9, 69), (20, 8), (31, 104)],
    &[(0, 71), (10, 40), (21, 7)],
    &[(1, 18), (11, 39), (22, 82)],
    &[(2, 25), (12, 114), (23, 89)],
    &[(3, 12), (13, 121), (24, 76)],
    &[(4, 91), (14, 108), (25, 27)],
    &[(5, 54), (15, 59), (26, 118)],
    &[(6, 13), (16, 22), (27, 77)],
    &[(7, 16), (17, 109), (28, 80)],
    &[(8, 47), (18, 112), (29, 111)],
    &[(9, 26), (19, 15), (30, 90)],
    &[(10, 65), (20, 122), (31, 1)],
    &[(0, 116), (11, 84), (21, 33)],
    &[(1, 99), (12, 67), (22, 52)],
    &[(2, 94), (13, 62), (23, 35)],
    &[(3, 85), (14, 53), (24, 30)],
    &[(4, 120), (15, 88), (25, 21)],
    &[(5, 55), (16, 23), (26, 56)],
    &[(6, 66), (17, 34), (27, 119)],
    &[(7, 9), (18, 105), (28, 2)],
    &[(8, 60), (19, 28), (29, 73)],
    &[(9, 75), (20, 43), (30, 124)],
    &[(10, 102), (21, 70), (31, 11)],
];

static PROTO_RATE_2_3: &[&[(u8, u8)]] = &[
    &[(0, 6), (8, 60), (15, 88), (22, 52), (30, 90), (37, 86)],
    &[(1, 29), (9, 75), (16, 23), (23, 35), (31, 1), (38, 45)],
    &[(2, 96), (10, 102), (17, 34), (24, 30), (32, 20), (39, 48)],
    &[(3, 63), (11, 125), (18, 105), (25, 21), (33, 3), (40, 79)],
    &[(4, 106), (12, 64), (19, 28), (26, 56), (34, 126), (41, 58)],
    &[(5, 81), (13, 31), (20, 43), (27, 119), (35, 117), (42, 97)],
    &[(6, 36), (14, 74), (21, 70), (28, 2), (36, 24)],
    &[(0, 71), (7, 83), (15, 49), (22, 93), (29, 73), (37, 87)],
    &[(1, 18), (8, 14), (16, 4), (23, 32), (30, 124), (38, 98)],
    &[(2, 25), (9, 69), (17, 51), (24, 127), (31, 11), (39, 41)],
    &[(3, 12), (10, 40), (18, 110), (25, 42), (32, 38), (40, 92)],
    &[(4, 91), (11, 39), (19, 37), (26, 17), (33, 61), (41, 107)],
    &[(5, 54), (12, 114), (20, 8), (27, 100), (34, 0), (42, 6)],
    &[(6, 13), (13, 121), (21, 7), (28, 19), (35, 95)],
    &[(0, 116), (7, 16), (14, 108), (22, 82), (29, 78), (36, 10)],
    &[(1, 99), (8, 47), (15, 59), (23, 89), (30, 5), (37, 113)],
    &[(2, 94), (9, 26), (16, 22), (24, 76), (31, 104), (38, 68)],
    &[(3, 85), (10, 65), (17, 109), (25, 27), (32, 103), (39, 115)],
    &[(4, 120), (11, 84), (18, 112), (26, 118), (33, 50), (40, 46)],
    &[(5, 55), (12, 67), (19, 15), (27, 77), (34, 57), (41, 101)],
    &[(6, 66), (13, 62), (20, 122), (28, 80), (35, 44), (42, 72)],
    &[(7, 9), (14, 53), (21, 33), (29, 111), (36, 123)],
];

static PROTO_RATE_4_5: &[&[(u8, u8)]] = &[
    &[(0, 6), (5, 55), (9, 26), (13, 121), (18, 110), (22, 93), (26, 56), (31, 1), (35, 44), (39, 115), (44, 96), (48, 55)],
    &[(1, 29), (6, 66), (10, 65), (14, 108), (19, 37), (23, 32), (27, 119), (32, 20), (36, 123), (40, 46), (45, 63), (49, 66)],
    &[(2, 96), (7, 9), (11, 84), (15, 59), (20, 8), (24, 127), (28, 2), (33, 3), (37, 86), (41, 101), (46, 106), (50, 9)],
    &[(3, 63), (8, 60), (12, 67), (16, 22), (21, 7), (25, 42), (29, 73), (34, 126), (38, 45), (42, 72), (47, 81), (51, 60)],
    &[(0, 71), (4, 106), (9, 75), (13, 62), (17, 109), (22, 82), (26, 17), (30, 124), (35, 117), (39, 48), (43, 71), (48, 36)],
    &[(1, 18), (5, 81), (10, 102), (14, 53), (18, 112), (23, 89), (27, 100), (31, 11), (36, 24), (40, 79), (44, 18), (49, 83)],
    &[(2, 25), (6, 36), (11, 125), (15, 88), (19, 15), (24, 76), (28, 19), (32, 38), (37, 87), (41, 58), (45, 25), (50, 14)],
    &[(3, 12), (7, 83), (12, 64), (16, 23), (20, 122), (25, 27), (29, 78), (33, 61), (38, 98), (42, 97), (46, 12), (51, 69)],
    &[(0, 116), (4, 91), (8, 14), (13, 31), (17, 34), (21, 33), (26, 118), (30, 5), (34, 0), (39, 41), (43, 116), (47, 91)],
    &[(1, 99), (5, 54), (9, 69), (14, 74), (18, 105), (22, 52), (27, 77), (31, 104), (35, 95), (40, 92), (44, 99), (48, 54)],
    &[(2, 94), (6, 13), (10, 40), (15, 49), (19, 28), (23, 35), (28, 80), (32, 103), (36, 10), (41, 107), (45, 94), (49, 13)],
    &[(3, 85), (7, 16), (11, 39), (16, 4), (20, 43), (24, 30), (29, 111), (33, 50), (37, 113), (42, 6), (46, 85), (50, 16)],
    &[(4, 120), (8, 47), (12, 114), (17, 51), (21, 70), (25, 21), (30, 90), (34, 57), (38, 68), (43, 29), (47, 120), (51, 47)],
];

fn proto_table(rate: CodeRate) -> &'static [&'static [(u8, u8)]] {
    match rate {
        CodeRate::Half => PROTO_RATE_1_2,
        CodeRate::TwoThirds => PROTO_RATE_2_3,
        CodeRate::FourFifths => PROTO_RATE_4_5,
    }
}

/// Fully expanded parity-check matrix in check-major adjacency form.
///
/// Shared ground truth for the encoder (info sums + back-substitution) and
/// the decoder (message passing and syndrome checks); both sides expanding
/// from one structure is what keeps them consistent bit for bit.
#[derive(Debug, Clone)]
pub struct ParityCheckMatrix {
    k: usize,
    m: usize,
    /// Variable indices per check; info columns first, then the
    /// accumulator parity columns.
    check_vars: Vec<Vec<u32>>,
    num_edges: usize,
    max_check_degree: usize,
}

impl ParityCheckMatrix {
    /// Expand the shift table for `rate` into full adjacency.
    pub fn for_rate(rate: CodeRate) -> Result<Self, TmLinkError> {
        let table = proto_table(rate);
        let k = rate.k();
        let m = rate.m();
        let col_blocks = k.div_ceil(Z);
        let row_blocks = m.div_ceil(Z);

        validate_table(rate, table, row_blocks, col_blocks)?;

        let mut check_vars: Vec<Vec<u32>> = vec![Vec::new(); m];
        for (r, row) in table.iter().enumerate() {
            for &(c, shift) in row.iter() {
                for i in 0..Z {
                    let var = (c as usize) * Z + i;
                    let check = r * Z + ((i + shift as usize) % Z);
                    if var < k && check < m {
                        check_vars[check].push(var as u32);
                    }
                }
            }
        }

        // Dual-diagonal accumulator over the parity columns.
        for (check, vars) in check_vars.iter_mut().enumerate() {
            vars.push((k + check) as u32);
            if check > 0 {
                vars.push((k + check - 1) as u32);
            }
        }

        let num_edges = check_vars.iter().map(Vec::len).sum();
        let max_check_degree = check_vars.iter().map(Vec::len).max().unwrap_or(0);

        Ok(Self {
            k,
            m,
            check_vars,
            num_edges,
            max_check_degree,
        })
    }

    /// Codeword length.
    pub fn n(&self) -> usize {
        self.k + self.m
    }

    /// Information length.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Parity length (number of checks).
    pub fn m(&self) -> usize {
        self.m
    }

    /// Variable adjacency of check `c`.
    pub fn check(&self, c: usize) -> &[u32] {
        &self.check_vars[c]
    }

    /// Total edge count of the Tanner graph.
    ///
    /// Message buffers must be sized by this, not by any assumed maximum
    /// check degree.
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Largest check degree, for per-check scratch sizing.
    pub fn max_check_degree(&self) -> usize {
        self.max_check_degree
    }

    /// Number of parity checks a hard-decision word leaves unsatisfied.
    pub fn unsatisfied_checks(&self, bits: &[u8]) -> usize {
        debug_assert_eq!(bits.len(), self.n());
        self.check_vars
            .iter()
            .filter(|vars| {
                vars.iter().fold(0u8, |acc, &v| acc ^ bits[v as usize]) != 0
            })
            .count()
    }

    /// True when `bits` is a valid codeword (zero syndrome over GF(2)).
    pub fn syndrome_ok(&self, bits: &[u8]) -> bool {
        self.unsatisfied_checks(bits) == 0
    }
}

fn validate_table(
    rate: CodeRate,
    table: &[&[(u8, u8)]],
    row_blocks: usize,
    col_blocks: usize,
) -> Result<(), TmLinkError> {
    if table.len() != row_blocks {
        return Err(TmLinkError::Config(format!(
            "rate {} protograph has {} row blocks, expected {}",
            rate.as_str(),
            table.len(),
            row_blocks
        )));
    }
    let mut col_degree = vec![0usize; col_blocks];
    for (r, row) in table.iter().enumerate() {
        if row.is_empty() {
            return Err(TmLinkError::Config(format!(
                "rate {} protograph row {} is empty",
                rate.as_str(),
                r
            )));
        }
        let mut prev_col: Option<u8> = None;
        for &(c, shift) in row.iter() {
            if (c as usize) >= col_blocks {
                return Err(TmLinkError::Config(format!(
                    "rate {} protograph row {} references column block {} of {}",
                    rate.as_str(),
                    r,
                    c,
                    col_blocks
                )));
            }
            if (shift as usize) >= Z {
                return Err(TmLinkError::Config(format!(
                    "rate {} protograph shift {} exceeds circulant size {}",
                    rate.as_str(),
                    shift,
                    Z
                )));
            }
            // Duplicate circulants in one row block cancel over GF(2)
            if prev_col == Some(c) {
                return Err(TmLinkError::Config(format!(
                    "rate {} protograph row {} lists column block {} twice",
                    rate.as_str(),
                    r,
                    c
                )));
            }
            prev_col = Some(c);
            col_degree[c as usize] += 1;
        }
    }
    // A column block with no circulant would leave K info bits outside the
    // code entirely; the claimed rate would not hold full rank over them.
    if let Some(c) = col_degree.iter().position(|&d| d == 0) {
        return Err(TmLinkError::Config(format!(
            "rate {} protograph leaves column block {} unprotected",
            rate.as_str(),
            c
        )));
    }
    Ok(())
}
