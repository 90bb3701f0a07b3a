//! Error correction for possibly-corrupted shares
//!
//! ## Fast path
//!
//! The shares' Vandermonde columns span a `required`-dimensional code; reducing
//! them to `[I | P]` gives the parity-check matrix `[Pᵀ | I]`. Multiplying it
//! against every byte column of the shares yields syndromes, and a column whose
//! syndromes are all zero is a codeword and is left alone.
//!
//! ## Berlekamp–Welch
//!
//! For a column that fails the check, with `e = (r - k) / 2` correctable
//! errors, solve for `Q` (degree `< e + k`) and monic `E` (degree `e`) such
//! that `Q(x_i) = r_i · E(x_i)` for every received byte `r_i`. The message
//! polynomial is `P = Q / E`; evaluating it at every share's point gives the
//! corrected column.

use crate::error::{FecError, Result};
use crate::fec::FecCode;
use crate::galois::Gf256;
use crate::matrix::Matrix;
use crate::poly::Poly;
use crate::share::Share;
use crate::simd::addmul;
use log::{debug, trace};

impl FecCode {
    /// Detect and repair corrupted bytes in place
    ///
    /// Sorts `shares` by index. Needs at least `required` distinct shares; with
    /// `r` shares up to `(r - required) / 2` of them may be corrupted in any
    /// given byte position. On error the shares may already be partially
    /// modified and should not be trusted.
    pub fn correct(&self, shares: &mut [Share]) -> Result<()> {
        if shares.len() < self.required {
            return Err(FecError::InsufficientShares {
                needed: self.required,
                got: shares.len(),
            });
        }
        let share_size = self.validate_shares(shares)?;

        shares.sort_by_key(|s| s.index);
        if let Some(pair) = shares.windows(2).find(|w| w[0].index == w[1].index) {
            return Err(FecError::DuplicateShare(pair[0].index));
        }

        let syndrome = self.syndrome_matrix(shares)?;
        let mut dirty = vec![false; share_size];
        let mut buf = vec![0u8; share_size];
        for row in 0..syndrome.rows() {
            buf.fill(0);
            for (share, &coeff) in shares.iter().zip(syndrome.row(row)) {
                addmul(&mut buf, &share.data, coeff.value());
            }
            for (flag, &byte) in dirty.iter_mut().zip(&buf) {
                *flag |= byte != 0;
            }
        }

        let columns: Vec<usize> = dirty
            .iter()
            .enumerate()
            .filter_map(|(col, &bad)| bad.then_some(col))
            .collect();
        if columns.is_empty() {
            return Ok(());
        }
        debug!(
            "{} of {} byte columns failed the syndrome check",
            columns.len(),
            share_size
        );

        for col in columns {
            let corrected = self.berlekamp_welch(shares, col)?;
            for share in shares.iter_mut() {
                share.data[col] = corrected[share.index];
            }
        }
        Ok(())
    }

    /// Correct errors, then rebuild the data blocks
    ///
    /// Needs at least `required + 2` shares so that one error per byte column
    /// can be corrected. Otherwise behaves like [`decode`](FecCode::decode).
    pub fn decode_with_errors<F>(&self, shares: &mut [Share], output: F) -> Result<()>
    where
        F: FnMut(usize, usize, &[u8]),
    {
        if shares.len() < self.required + 2 {
            return Err(FecError::InsufficientShares {
                needed: self.required + 2,
                got: shares.len(),
            });
        }
        self.correct(shares)?;
        self.decode(shares, output)
    }

    /// Parity-check matrix for the columns of the held shares
    fn syndrome_matrix(&self, shares: &[Share]) -> Result<Matrix> {
        let mut m = Matrix::new(self.required, shares.len());
        for row in 0..self.required {
            for (col, share) in shares.iter().enumerate() {
                m.set(row, col, self.vandermonde.get(row, share.index));
            }
        }
        m.standardize()?;
        Ok(m.parity())
    }

    /// Recover byte column `col` for every share index
    fn berlekamp_welch(&self, shares: &[Share], col: usize) -> Result<Vec<u8>> {
        let k = self.required;
        let r = shares.len();
        let e = (r - k) / 2;
        if e == 0 {
            // Detected, but not enough redundancy to locate the error
            return Err(FecError::InsufficientShares {
                needed: k + 2,
                got: r,
            });
        }
        let q = e + k;
        let dim = q + e;

        // Σ_{j<q} Q_j x^j + r Σ_{j<e} E_j x^j = r x^e
        let mut system = Matrix::new(dim, dim);
        let mut rhs = vec![Gf256::ZERO; dim];
        for (i, share) in shares.iter().take(dim).enumerate() {
            let x = self.points[share.index];
            let received = Gf256::new(share.data[col]);
            let mut power = Gf256::ONE;
            for j in 0..q {
                system.set(i, j, power);
                if j < e {
                    system.set(i, q + j, power * received);
                }
                power *= x;
            }
            rhs[i] = x.pow(e as u32) * received;
        }

        // Fewer than e errors leave the system rank deficient but consistent
        let solution = system
            .solve(&rhs)
            .map_err(|_| FecError::UncorrectableErrors)?;

        let numerator = Poly::new(&solution[..q]);
        let mut locator = solution[q..].to_vec();
        locator.push(Gf256::ONE);
        let locator = Poly::new(&locator);

        let (message, remainder) = numerator.div_rem(&locator)?;
        if !remainder.is_zero() {
            return Err(FecError::UncorrectableErrors);
        }

        let corrected: Vec<u8> = self
            .points
            .iter()
            .map(|&x| message.eval(x).value())
            .collect();

        let disagreements = shares
            .iter()
            .filter(|s| s.data[col] != corrected[s.index])
            .count();
        if disagreements > e {
            return Err(FecError::UncorrectableErrors);
        }
        trace!("Corrected {} bytes in column {}", disagreements, col);

        Ok(corrected)
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
    fn test_clean_shares_untouched() {
        let code = FecCode::new(3, 7).unwrap();
        let shares = encode_all(&code, b"hello world!");
        let mut copy = shares.clone();
        code.correct(&mut copy).unwrap();
        assert_eq!(copy, shares);
    }

    #[test]
    fn test_correct_two_errors() {
        let code = FecCode::new(3, 7).unwrap();
        let original = encode_all(&code, &[1, 2, 3]);
        let mut shares = original.clone();
        shares[1].data[0] ^= 0x5a;
        shares[5].data[0] ^= 0x33;
        code.correct(&mut shares).unwrap();
        assert_eq!(shares, original);
    }

    #[test]
    fn test_correct_single_error_with_spare_redundancy() {
        let code = FecCode::new(3, 7).unwrap();
        let original = encode_all(&code, &[1, 2, 3]);
        let mut shares = original.clone();
        shares[4].data[0] ^= 0xff;
        code.correct(&mut shares).unwrap();
        assert_eq!(shares, original);
    }

    #[test]
    fn test_correct_sorts_input() {
        let code = FecCode::new(2, 5).unwrap();
        let original = encode_all(&code, &[10, 20, 30, 40]);
        let mut shares: Vec<Share> = original.iter().rev().cloned().collect();
        shares[0].data[1] ^= 1;
        code.correct(&mut shares).unwrap();
        assert_eq!(shares, original);
    }

    #[test]
    fn test_detected_but_not_correctable() {
        let code = FecCode::new(3, 4).unwrap();
        let mut shares = encode_all(&code, &[1, 2, 3]);
        shares[0].data[0] ^= 1;
        assert_eq!(
            code.correct(&mut shares),
            Err(FecError::InsufficientShares { needed: 5, got: 4 })
        );
    }

    #[test]
    fn test_three_errors_uncorrectable() {
        let code = FecCode::new(3, 7).unwrap();
        let original = encode_all(&code, &[1, 2, 3]);
        let mut shares = original.clone();
        for (pos, flip) in [(0, 0x10), (1, 0x20), (2, 0x30)] {
            shares[pos].data[0] ^= flip;
        }
        assert_eq!(code.correct(&mut shares), Err(FecError::UncorrectableErrors));
    }

    #[test]
    fn test_duplicate_rejected() {
        let code = FecCode::new(2, 4).unwrap();
        let shares = encode_all(&code, &[1, 2]);
        let mut dupes = vec![shares[0].clone(), shares[2].clone(), shares[0].clone()];
        assert_eq!(code.correct(&mut dupes), Err(FecError::DuplicateShare(0)));
    }

    #[test]
    fn test_decode_with_errors_needs_two_extra() {
        let code = FecCode::new(3, 7).unwrap();
        let mut shares = encode_all(&code, &[1, 2, 3]);
        shares.truncate(4);
        assert_eq!(
            code.decode_with_errors(&mut shares, |_, _, _| {}),
            Err(FecError::InsufficientShares { needed: 5, got: 4 })
        );
    }
}
