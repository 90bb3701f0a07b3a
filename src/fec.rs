//! Systematic Reed-Solomon erasure code
//!
//! A [`FecCode`] splits input into `required` equal blocks and produces `total`
//! shares. Shares `0..required` are the blocks themselves; the rest are parity.
//! Any `required` distinct shares rebuild the input.
//!
//! ## Generator matrix
//!
//! The `total × required` generator has the identity in its first `required`
//! rows. Parity row `i` is row `i` of the Vandermonde matrix over the points
//! `2^i` multiplied by the inverse of its top square, which keeps every choice
//! of `required` rows invertible.
//!
//! ## Callbacks
//!
//! Encode and decode hand results to a callback as `(index, total, data)`.
//! `data` borrows an internal scratch buffer that is reused for the next call,
//! so a callback that wants to keep a share must copy it (`to_vec()`,
//! [`Share::new`]).

use crate::error::{FecError, Result};
use crate::galois::Gf256;
use crate::matrix::Matrix;
use crate::share::Share;
use crate::simd::addmul;
use log::debug;

/// Largest supported `total`: share indices must fit the 256-element field
pub const MAX_SHARES: usize = 256;

/// Evaluation point of a share in the error-correcting view of the code
///
/// Index 0 maps to 0 and index `i > 0` to `2^(i-1)`. The generator uses the
/// points `2^i`; scaling every point by the same factor describes the same code.
pub(crate) fn evaluation_point(index: usize) -> Gf256 {
    if index == 0 {
        Gf256::ZERO
    } else {
        Gf256::GENERATOR.pow((index - 1) as u32)
    }
}

/// Reed-Solomon code with fixed `required`/`total`
///
/// Immutable once built; share it freely between threads.
#[derive(Debug, Clone)]
pub struct FecCode {
    pub(crate) required: usize,
    pub(crate) total: usize,
    /// `total × required`, identity on top
    generator: Matrix,
    /// `required × total`, `vandermonde[row][col] = point(col)^row`
    pub(crate) vandermonde: Matrix,
    /// Evaluation point of every share index
    pub(crate) points: Vec<Gf256>,
}

impl FecCode {
    /// Build a code that needs `required` of `total` shares to decode
    pub fn new(required: usize, total: usize) -> Result<Self> {
        if required == 0 || required > total || total > MAX_SHARES {
            return Err(FecError::InvalidParameters { required, total });
        }

        let inverted = Matrix::inverted_vandermonde(required);
        let mut generator = Matrix::new(total, required);
        for i in 0..required {
            generator.set(i, i, Gf256::ONE);
        }
        for row in required..total {
            for col in 0..required {
                let value = (0..required).fold(Gf256::ZERO, |acc, t| {
                    acc + Gf256::GENERATOR.pow((row * t) as u32) * inverted.get(t, col)
                });
                generator.set(row, col, value);
            }
        }

        let points: Vec<Gf256> = (0..total).map(evaluation_point).collect();
        let mut vandermonde = Matrix::new(required, total);
        for (col, &x) in points.iter().enumerate() {
            for row in 0..required {
                vandermonde.set(row, col, x.pow(row as u32));
            }
        }

        debug!(
            "Built Reed-Solomon code: {} data shares, {} parity shares",
            required,
            total - required
        );

        Ok(FecCode {
            required,
            total,
            generator,
            vandermonde,
            points,
        })
    }

    /// Number of shares needed to decode
    #[inline]
    pub fn required(&self) -> usize {
        self.required
    }

    /// Number of shares produced by encoding
    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    #[inline]
    pub fn generator(&self) -> &Matrix {
        &self.generator
    }

    fn block_size(&self, input_len: usize) -> Result<usize> {
        if input_len % self.required != 0 {
            return Err(FecError::InputSizeMismatch {
                len: input_len,
                required: self.required,
            });
        }
        Ok(input_len / self.required)
    }

    fn split_blocks<'a>(&self, input: &'a [u8], block_size: usize) -> Vec<&'a [u8]> {
        (0..self.required)
            .map(|i| &input[i * block_size..(i + 1) * block_size])
            .collect()
    }

    /// Compute parity share `index` from the data blocks into `out`
    fn fill_parity(&self, index: usize, blocks: &[&[u8]], out: &mut [u8]) {
        out.fill(0);
        for (block, &coeff) in blocks.iter().zip(self.generator.row(index)) {
            addmul(out, block, coeff.value());
        }
    }

    /// Encode `input` into `total` shares
    ///
    /// `input.len()` must be a multiple of `required`. The callback receives
    /// `(index, total, data)` once per share in ascending index order.
    pub fn encode<F>(&self, input: &[u8], mut output: F) -> Result<()>
    where
        F: FnMut(usize, usize, &[u8]),
    {
        let block_size = self.block_size(input.len())?;
        let blocks = self.split_blocks(input, block_size);

        for (i, block) in blocks.iter().enumerate() {
            output(i, self.total, block);
        }

        let mut parity = vec![0u8; block_size];
        for index in self.required..self.total {
            self.fill_parity(index, &blocks, &mut parity);
            output(index, self.total, &parity);
        }
        Ok(())
    }

    /// Compute only share `index` of `input` into `output`
    ///
    /// `output` must be exactly one block (`input.len() / required` bytes).
    pub fn encode_single(&self, input: &[u8], output: &mut [u8], index: usize) -> Result<()> {
        let block_size = self.block_size(input.len())?;
        if index >= self.total {
            return Err(FecError::InvalidShareIndex {
                index,
                total: self.total,
            });
        }
        if output.len() != block_size {
            return Err(FecError::ShareSizeMismatch {
                expected: block_size,
                got: output.len(),
            });
        }

        let blocks = self.split_blocks(input, block_size);
        if index < self.required {
            output.copy_from_slice(blocks[index]);
        } else {
            self.fill_parity(index, &blocks, output);
        }
        Ok(())
    }

    /// Check indices and sizes; returns the common share size
    pub(crate) fn validate_shares(&self, shares: &[Share]) -> Result<usize> {
        let expected = shares.first().map_or(0, |s| s.data.len());
        for share in shares {
            if share.index >= self.total {
                return Err(FecError::InvalidShareIndex {
                    index: share.index,
                    total: self.total,
                });
            }
            if share.data.len() != expected {
                return Err(FecError::ShareSizeMismatch {
                    expected,
                    got: share.data.len(),
                });
            }
        }
        Ok(expected)
    }

    /// Rebuild the data blocks from at least `required` distinct shares
    ///
    /// Shares are assumed to be byte-correct; use [`decode_with_errors`] when
    /// they may be corrupted. Duplicate indices are ignored after the first
    /// occurrence. The callback receives `(index, required, data)` for blocks
    /// `0..required` in ascending order.
    ///
    /// [`decode_with_errors`]: FecCode::decode_with_errors
    pub fn decode<F>(&self, shares: &[Share], mut output: F) -> Result<()>
    where
        F: FnMut(usize, usize, &[u8]),
    {
        let k = self.required;
        let share_size = self.validate_shares(shares)?;

        let mut sorted: Vec<&Share> = shares.iter().collect();
        sorted.sort_by_key(|s| s.index);
        sorted.dedup_by_key(|s| s.index);
        if sorted.len() < k {
            return Err(FecError::InsufficientShares {
                needed: k,
                got: sorted.len(),
            });
        }

        let mut present: Vec<Option<&Share>> = vec![None; k];
        let mut parity = Vec::new();
        for share in sorted {
            if share.index < k {
                present[share.index] = Some(share);
            } else {
                parity.push(share);
            }
        }

        let missing = present.iter().filter(|s| s.is_none()).count();
        if missing == 0 {
            for (i, share) in present.iter().flatten().enumerate() {
                output(i, k, &share.data);
            }
            return Ok(());
        }

        // Missing rows take parity shares in ascending index order
        let mut spare = parity.into_iter();
        let mut selected = Vec::with_capacity(k);
        for &slot in &present {
            let share = slot.or_else(|| spare.next()).ok_or(FecError::InsufficientShares {
                needed: k,
                got: k - missing,
            })?;
            selected.push(share);
        }

        let mut decode_matrix = Matrix::new(k, k);
        for (row, share) in selected.iter().enumerate() {
            decode_matrix
                .row_mut(row)
                .copy_from_slice(self.generator.row(share.index));
        }
        decode_matrix.invert()?;

        debug!("Rebuilding {} of {} data blocks", missing, k);

        let mut buf = vec![0u8; share_size];
        for (i, slot) in present.iter().enumerate() {
            match slot {
                Some(share) => output(i, k, &share.data),
                None => {
                    buf.fill(0);
                    for (share, &coeff) in selected.iter().zip(decode_matrix.row(i)) {
                        addmul(&mut buf, &share.data, coeff.value());
                    }
                    output(i, k, &buf);
                }
            }
        }
        Ok(())
    }

    /// Correct `shares` in place and return the rebuilt input
    ///
    /// Corruption is handled as in [`correct`](FecCode::correct); the result is
    /// the `required` data blocks concatenated.
    pub fn decode_to_vec(&self, shares: &mut [Share]) -> Result<Vec<u8>> {
        self.correct(shares)?;
        let size = shares.first().map_or(0, |s| s.data.len());
        let mut out = vec![0u8; size * self.required];
        self.decode(shares, |i, _, data| {
            out[i * size..(i + 1) * size].copy_from_slice(data);
        })?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_all(code: &FecCode, input: &[u8]) -> Vec<Share> {
        let mut shares = Vec::new();
        code.encode(input, |index, _, data| shares.push(Share::new(index, data)))
            .unwrap();
        shares
    }

    #[test]
    fn test_invalid_parameters() {
        for (k, n) in [(0, 1), (3, 2), (1, 257), (0, 0)] {
            assert_eq!(
                FecCode::new(k, n).unwrap_err(),
                FecError::InvalidParameters {
                    required: k,
                    total: n
                }
            );
        }
        assert!(FecCode::new(1, 1).is_ok());
        assert!(FecCode::new(256, 256).is_ok());
        assert!(FecCode::new(20, 256).is_ok());
    }

    #[test]
    fn test_known_vector() {
        let code = FecCode::new(3, 7).unwrap();
        let shares = encode_all(&code, &[1, 2, 3]);
        let bytes: Vec<u8> = shares.iter().map(|s| s.data[0]).collect();
        assert_eq!(bytes, vec![1, 2, 3, 0x15, 0x69, 0xcc, 0xf2]);
        assert!(shares.iter().enumerate().all(|(i, s)| s.index == i));
    }

    #[test]
    fn test_generator_is_systematic() {
        let code = FecCode::new(4, 9).unwrap();
        for row in 0..4 {
            for col in 0..4 {
                let expected = if row == col { Gf256::ONE } else { Gf256::ZERO };
                assert_eq!(code.generator().get(row, col), expected);
            }
        }
    }

    #[test]
    fn test_encode_rejects_uneven_input() {
        let code = FecCode::new(3, 5).unwrap();
        let mut calls = 0;
        let err = code.encode(&[1, 2, 3, 4], |_, _, _| calls += 1).unwrap_err();
        assert_eq!(err, FecError::InputSizeMismatch { len: 4, required: 3 });
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_encode_empty_input() {
        let code = FecCode::new(2, 4).unwrap();
        let shares = encode_all(&code, &[]);
        assert_eq!(shares.len(), 4);
        assert!(shares.iter().all(|s| s.data.is_empty()));
    }

    #[test]
    fn test_encode_single_matches_encode() {
        let code = FecCode::new(3, 6).unwrap();
        let input: Vec<u8> = (0..30).collect();
        let shares = encode_all(&code, &input);
        for share in &shares {
            let mut out = vec![0xaau8; 10];
            code.encode_single(&input, &mut out, share.index).unwrap();
            assert_eq!(out, share.data);
        }

        let mut out = vec![0u8; 10];
        assert_eq!(
            code.encode_single(&input, &mut out, 6),
            Err(FecError::InvalidShareIndex { index: 6, total: 6 })
        );
        let mut uneven = vec![0u8; 10];
        assert_eq!(
            code.encode_single(&input[..29], &mut uneven, 4),
            Err(FecError::InputSizeMismatch {
                len: 29,
                required: 3
            })
        );
        let mut short = vec![0u8; 9];
        assert_eq!(
            code.encode_single(&input, &mut short, 4),
            Err(FecError::ShareSizeMismatch {
                expected: 10,
                got: 9
            })
        );
    }

    #[test]
    fn test_decode_from_parity_only() {
        let code = FecCode::new(3, 6).unwrap();
        let input = b"abcdefghi";
        let shares = encode_all(&code, input);

        let mut out = vec![0u8; 9];
        code.decode(&shares[3..], |i, total, data| {
            assert_eq!(total, 3);
            out[i * 3..(i + 1) * 3].copy_from_slice(data);
        })
        .unwrap();
        assert_eq!(&out, input);
    }

    #[test]
    fn test_decode_ignores_duplicates() {
        let code = FecCode::new(2, 4).unwrap();
        let shares = encode_all(&code, &[9, 8, 7, 6]);
        let dupes = vec![shares[3].clone(), shares[3].clone(), shares[3].clone()];
        assert_eq!(
            code.decode(&dupes, |_, _, _| {}),
            Err(FecError::InsufficientShares { needed: 2, got: 1 })
        );

        let with_dupes = vec![shares[3].clone(), shares[1].clone(), shares[3].clone()];
        let mut blocks = Vec::new();
        code.decode(&with_dupes, |_, _, data| blocks.extend_from_slice(data))
            .unwrap();
        assert_eq!(blocks, vec![9, 8, 7, 6]);
    }

    #[test]
    fn test_decode_validation() {
        let code = FecCode::new(2, 4).unwrap();
        let bad_index = vec![Share::new(0, [1u8]), Share::new(4, [1u8])];
        assert_eq!(
            code.decode(&bad_index, |_, _, _| {}),
            Err(FecError::InvalidShareIndex { index: 4, total: 4 })
        );

        let bad_size = vec![Share::new(0, [1u8]), Share::new(1, [1u8, 2])];
        assert_eq!(
            code.decode(&bad_size, |_, _, _| {}),
            Err(FecError::ShareSizeMismatch {
                expected: 1,
                got: 2
            })
        );

        assert_eq!(
            code.decode(&[], |_, _, _| {}),
            Err(FecError::InsufficientShares { needed: 2, got: 0 })
        );
    }

    #[test]
    fn test_evaluation_points_distinct() {
        let mut seen = std::collections::HashSet::new();
        for i in 0..MAX_SHARES {
            assert!(seen.insert(evaluation_point(i)), "point {i} repeats");
        }
    }
}
