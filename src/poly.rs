//! Polynomials over GF(2^8)
//!
//! Used by the Berlekamp–Welch decoder to recover the message polynomial from
//! the error-locator and the combined `Q = P·E` polynomial.

use crate::error::{FecError, Result};
use crate::galois::Gf256;
use smallvec::SmallVec;
use std::ops::{Add, Mul};

type Coeffs = SmallVec<[Gf256; 32]>;

/// Polynomial with coefficients stored low-to-high (`coeffs[i]` multiplies `x^i`)
///
/// Trailing zero coefficients are always stripped, so the zero polynomial has no
/// coefficients and two equal polynomials compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Poly {
    coeffs: Coeffs,
}

impl Poly {
    pub fn new(coeffs: &[Gf256]) -> Self {
        Self::from_coeffs(Coeffs::from_slice(coeffs))
    }

    pub fn from_bytes(coeffs: &[u8]) -> Self {
        Self::from_coeffs(coeffs.iter().copied().map(Gf256::new).collect())
    }

    fn from_coeffs(mut coeffs: Coeffs) -> Self {
        while coeffs.last().is_some_and(|c| c.is_zero()) {
            coeffs.pop();
        }
        Poly { coeffs }
    }

    pub fn zero() -> Self {
        Poly::default()
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degree, `None` for the zero polynomial
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    pub fn coeffs(&self) -> &[Gf256] {
        &self.coeffs
    }

    /// Coefficient of `x^power` (zero beyond the degree)
    pub fn coeff(&self, power: usize) -> Gf256 {
        self.coeffs.get(power).copied().unwrap_or(Gf256::ZERO)
    }

    /// Evaluate at `x` with Horner's method
    pub fn eval(&self, x: Gf256) -> Gf256 {
        self.coeffs
            .iter()
            .rev()
            .fold(Gf256::ZERO, |acc, &c| acc * x + c)
    }

    pub fn scale(&self, factor: Gf256) -> Self {
        Self::from_coeffs(self.coeffs.iter().map(|&c| c * factor).collect())
    }

    /// Long division: returns `(quotient, remainder)` with
    /// `self == quotient * divisor + remainder` and `deg(remainder) < deg(divisor)`
    pub fn div_rem(&self, divisor: &Poly) -> Result<(Poly, Poly)> {
        let div_deg = divisor.degree().ok_or(FecError::ZeroDivisor)?;
        let Some(num_deg) = self.degree() else {
            return Ok((Poly::zero(), Poly::zero()));
        };
        if num_deg < div_deg {
            return Ok((Poly::zero(), self.clone()));
        }

        let lead_inv = divisor.coeffs[div_deg]
            .inv()
            .ok_or(FecError::ZeroDivisor)?;
        let mut rem = self.coeffs.clone();
        let mut quot: Coeffs = SmallVec::from_elem(Gf256::ZERO, num_deg - div_deg + 1);

        for shift in (0..=num_deg - div_deg).rev() {
            let factor = rem[shift + div_deg] * lead_inv;
            if factor.is_zero() {
                continue;
            }
            quot[shift] = factor;
            for (j, &d) in divisor.coeffs.iter().enumerate() {
                rem[shift + j] -= factor * d;
            }
        }

        rem.truncate(div_deg);
        Ok((Self::from_coeffs(quot), Self::from_coeffs(rem)))
    }
}

impl Add for &Poly {
    type Output = Poly;

    fn add(self, rhs: &Poly) -> Poly {
        let len = self.coeffs.len().max(rhs.coeffs.len());
        Poly::from_coeffs((0..len).map(|i| self.coeff(i) + rhs.coeff(i)).collect())
    }
}

impl Mul for &Poly {
    type Output = Poly;

    fn mul(self, rhs: &Poly) -> Poly {
        if self.is_zero() || rhs.is_zero() {
            return Poly::zero();
        }
        let mut out: Coeffs =
            SmallVec::from_elem(Gf256::ZERO, self.coeffs.len() + rhs.coeffs.len() - 1);
        for (i, &a) in self.coeffs.iter().enumerate() {
            for (j, &b) in rhs.coeffs.iter().enumerate() {
                out[i + j] += a * b;
            }
        }
        Poly::from_coeffs(out)
    }
}
