//! Dense matrices over GF(2^8)
//!
//! Row-major storage of [`Gf256`] elements. Row operations go through the same
//! multiply-accumulate kernel as share encoding, since a row of `Gf256` is
//! bit-identical to a byte slice.

use crate::error::{FecError, Result};
use crate::galois::Gf256;
use crate::simd::addmul;
use std::ops::Mul;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Gf256>,
}

impl Matrix {
    /// Create a zero matrix
    pub fn new(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![Gf256::ZERO; rows * cols],
        }
    }

    pub fn identity(size: usize) -> Self {
        let mut m = Self::new(size, size);
        for i in 0..size {
            m.set(i, i, Gf256::ONE);
        }
        m
    }

    /// Build from row-major bytes; panics if `bytes.len() != rows * cols`
    pub fn from_bytes(rows: usize, cols: usize, bytes: &[u8]) -> Self {
        assert_eq!(bytes.len(), rows * cols, "matrix data has wrong length");
        Matrix {
            rows,
            cols,
            data: bytes.iter().copied().map(Gf256::new).collect(),
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Gf256 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: Gf256) {
        self.data[row * self.cols + col] = value;
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[Gf256] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [Gf256] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Row as raw bytes
    #[inline]
    pub fn row_bytes(&self, row: usize) -> &[u8] {
        bytemuck::cast_slice(self.row(row))
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let cols = self.cols;
        let (lo, hi) = (a.min(b), a.max(b));
        let (head, tail) = self.data.split_at_mut(hi * cols);
        head[lo * cols..(lo + 1) * cols].swap_with_slice(&mut tail[..cols]);
    }

    pub fn swap_cols(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for row in 0..self.rows {
            self.data.swap(row * self.cols + a, row * self.cols + b);
        }
    }

    pub fn scale_row(&mut self, row: usize, factor: Gf256) {
        for value in self.row_mut(row) {
            *value *= factor;
        }
    }

    /// `row[dst] += factor * row[src]`
    pub fn addmul_row(&mut self, src: usize, dst: usize, factor: Gf256) {
        if factor.is_zero() {
            return;
        }
        if src == dst {
            self.scale_row(dst, factor + Gf256::ONE);
            return;
        }

        let cols = self.cols;
        let (src_row, dst_row) = if src < dst {
            let (head, tail) = self.data.split_at_mut(dst * cols);
            (&head[src * cols..(src + 1) * cols], &mut tail[..cols])
        } else {
            let (head, tail) = self.data.split_at_mut(src * cols);
            (&tail[..cols], &mut head[dst * cols..(dst + 1) * cols])
        };
        addmul(
            bytemuck::cast_slice_mut(dst_row),
            bytemuck::cast_slice(src_row),
            factor.value(),
        );
    }

    /// Matrix-vector product; panics if `v.len() != cols`
    pub fn mul_vec(&self, v: &[Gf256]) -> Vec<Gf256> {
        assert_eq!(v.len(), self.cols, "vector length must match column count");
        (0..self.rows)
            .map(|row| {
                self.row(row)
                    .iter()
                    .zip(v)
                    .fold(Gf256::ZERO, |acc, (&a, &b)| acc + a * b)
            })
            .collect()
    }

    /// First usable pivot for elimination step `col`: the diagonal entry if it
    /// is free and nonzero, otherwise the first nonzero entry over unused rows
    /// and columns.
    fn find_pivot(&self, col: usize, used: &[bool]) -> Option<(usize, usize)> {
        if !used[col] && !self.get(col, col).is_zero() {
            return Some((col, col));
        }
        (0..self.rows)
            .filter(|&row| !used[row])
            .find_map(|row| {
                (0..self.cols)
                    .find(|&c| !used[c] && !self.get(row, c).is_zero())
                    .map(|c| (row, c))
            })
    }

    /// Invert a square matrix in place (Gauss–Jordan with full pivoting)
    ///
    /// Each pivot is moved onto the diagonal by a row swap; the matching column
    /// swaps are undone in reverse order once elimination is complete.
    pub fn invert(&mut self) -> Result<()> {
        if self.rows != self.cols {
            return Err(FecError::SingularMatrix);
        }
        let size = self.rows;
        let mut used = vec![false; size];
        let mut swaps = Vec::with_capacity(size);

        for col in 0..size {
            let (prow, pcol) = self
                .find_pivot(col, &used)
                .ok_or(FecError::SingularMatrix)?;
            used[pcol] = true;
            self.swap_rows(prow, pcol);
            swaps.push((prow, pcol));

            let pivot_inv = self
                .get(pcol, pcol)
                .inv()
                .ok_or(FecError::SingularMatrix)?;
            // The pivot column accumulates the inverse in place
            self.set(pcol, pcol, Gf256::ONE);
            self.scale_row(pcol, pivot_inv);

            for row in 0..size {
                if row == pcol {
                    continue;
                }
                let factor = self.get(row, pcol);
                if factor.is_zero() {
                    continue;
                }
                self.set(row, pcol, Gf256::ZERO);
                self.addmul_row(pcol, row, factor);
            }
        }

        for &(prow, pcol) in swaps.iter().rev() {
            self.swap_cols(prow, pcol);
        }
        Ok(())
    }

    /// Solve `self · x = rhs`
    ///
    /// Rank-deficient systems are accepted as long as they are consistent; free
    /// variables are set to zero. An inconsistent system fails `SingularMatrix`.
    pub fn solve(&self, rhs: &[Gf256]) -> Result<Vec<Gf256>> {
        assert_eq!(rhs.len(), self.rows, "right-hand side must match row count");
        let (rows, cols) = (self.rows, self.cols);

        let mut aug = Matrix::new(rows, cols + 1);
        for row in 0..rows {
            aug.row_mut(row)[..cols].copy_from_slice(self.row(row));
            aug.set(row, cols, rhs[row]);
        }

        let mut pivots = Vec::with_capacity(rows.min(cols));
        let mut next = 0;
        for col in 0..cols {
            if next == rows {
                break;
            }
            let Some(prow) = (next..rows).find(|&row| !aug.get(row, col).is_zero()) else {
                continue;
            };
            aug.swap_rows(prow, next);
            let pivot_inv = aug.get(next, col).inv().ok_or(FecError::SingularMatrix)?;
            aug.scale_row(next, pivot_inv);
            for row in 0..rows {
                if row != next {
                    let factor = aug.get(row, col);
                    aug.addmul_row(next, row, factor);
                }
            }
            pivots.push(col);
            next += 1;
        }

        // Zero rows left over must also have a zero right-hand side
        if (next..rows).any(|row| !aug.get(row, cols).is_zero()) {
            return Err(FecError::SingularMatrix);
        }

        let mut solution = vec![Gf256::ZERO; cols];
        for (row, &col) in pivots.iter().enumerate() {
            solution[col] = aug.get(row, cols);
        }
        Ok(solution)
    }

    /// Row-reduce an r×c matrix (r ≤ c) into `[I_r | P]`
    pub fn standardize(&mut self) -> Result<()> {
        for col in 0..self.rows {
            let prow = (col..self.rows)
                .find(|&row| !self.get(row, col).is_zero())
                .ok_or(FecError::SingularMatrix)?;
            self.swap_rows(prow, col);

            let pivot_inv = self.get(col, col).inv().ok_or(FecError::SingularMatrix)?;
            self.scale_row(col, pivot_inv);
            for row in 0..self.rows {
                if row != col {
                    let factor = self.get(row, col);
                    self.addmul_row(col, row, factor);
                }
            }
        }
        Ok(())
    }

    /// Parity-check matrix `[Pᵀ | I]` of a standardized `[I | P]`
    pub fn parity(&self) -> Matrix {
        let (r, c) = (self.rows, self.cols);
        let extra = c - r;
        let mut out = Matrix::new(extra, c);
        for i in 0..extra {
            for j in 0..r {
                out.set(i, j, self.get(j, r + i));
            }
            out.set(i, r + i, Gf256::ONE);
        }
        out
    }

    /// Inverse of the k×k Vandermonde matrix `V[r][j] = p_r^j` over the points
    /// `p_0 = 0`, `p_r = 2^r`, computed directly in O(k²)
    ///
    /// Works from the coefficients of `Π (x - p_i)` for `i = 1..k`: synthetic
    /// division by `(x - p_r)` gives the numerator of each Lagrange basis
    /// polynomial, and evaluating that quotient at `p_r` gives its normaliser.
    pub fn inverted_vandermonde(k: usize) -> Matrix {
        let mut out = Matrix::new(k, k);
        if k == 0 {
            return out;
        }
        if k == 1 {
            out.set(0, 0, Gf256::ONE);
            return out;
        }

        let point = |i: usize| {
            if i == 0 {
                Gf256::ZERO
            } else {
                Gf256::GENERATOR.pow(i as u32)
            }
        };

        let mut c = vec![Gf256::ZERO; k];
        for i in 1..k {
            let p = point(i);
            for j in (k - i)..(k - 1) {
                let next = c[j + 1];
                c[j] += p * next;
            }
            c[k - 1] += p;
        }

        let mut b = vec![Gf256::ZERO; k];
        for row in 0..k {
            let p = point(row);
            let mut t = Gf256::ONE;
            b[k - 1] = Gf256::ONE;
            for i in (0..k - 1).rev() {
                b[i] = c[i + 1] + p * b[i + 1];
                t = b[i] + p * t;
            }
            // t is the product of (p_row - p_i) over i != row: nonzero for distinct points
            debug_assert!(!t.is_zero(), "repeated Vandermonde point at row {row}");
            let t_inv = t.inv().unwrap_or(Gf256::ZERO);
            for col in 0..k {
                out.set(col, row, t_inv * b[col]);
            }
        }
        out
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    /// Panics if the inner dimensions differ
    fn mul(self, rhs: &Matrix) -> Matrix {
        assert_eq!(self.cols, rhs.rows, "matrix dimensions do not agree");
        let mut out = Matrix::new(self.rows, rhs.cols);
        for i in 0..self.rows {
            for t in 0..self.cols {
                let a = self.get(i, t);
                if a.is_zero() {
                    continue;
                }
                addmul(
                    bytemuck::cast_slice_mut(out.row_mut(i)),
                    rhs.row_bytes(t),
                    a.value(),
                );
            }
        }
        out
    }
}
