//! Galois Field GF(2^8) arithmetic
//!
//! ## Field
//!
//! Elements are bytes. Addition is XOR; multiplication is carried out modulo the
//! primitive polynomial 0x11D (x⁸ + x⁴ + x³ + x² + 1) with 2 as the generator.
//!
//! ## Tables
//!
//! - `EXP` / `LOG` are computed at compile time. `EXP` is doubled in length so a
//!   sum of two logarithms can index it without a modulo.
//! - `INV` maps every nonzero element to its inverse (entry 0 is unused).
//! - The full 256×256 product table is built once on first use and shared by the
//!   scalar multiply-accumulate loop and the SIMD nibble tables.

use bytemuck::{Pod, Zeroable};
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};
use std::sync::OnceLock;

/// GF(2^8) primitive polynomial: 0x11D (x⁸ + x⁴ + x³ + x² + 1)
const GF8_POLYNOMIAL: u32 = 0x11D;

/// Order of the multiplicative group
const LIMIT: usize = 255;

const fn build_exp_log() -> ([u8; 2 * LIMIT], [u8; 256]) {
    let mut exp = [0u8; 2 * LIMIT];
    let mut log = [0u8; 256];
    let mut b = 1u32;
    let mut l = 0;

    while l < LIMIT {
        exp[l] = b as u8;
        exp[l + LIMIT] = b as u8;
        log[b as usize] = l as u8;

        b <<= 1;
        if b & 0x100 != 0 {
            b ^= GF8_POLYNOMIAL;
        }
        l += 1;
    }

    (exp, log)
}

const EXP_LOG: ([u8; 2 * LIMIT], [u8; 256]) = build_exp_log();

const fn build_inverse() -> [u8; 256] {
    let mut inv = [0u8; 256];
    let mut i = 1;
    while i < 256 {
        inv[i] = EXP_LOG.0[LIMIT - EXP_LOG.1[i] as usize];
        i += 1;
    }
    inv
}

/// Antilog table: `EXP[l] == 2^l` for `l < 510`
pub static EXP: [u8; 2 * LIMIT] = EXP_LOG.0;

/// Log table: `LOG[x]` is the discrete log of `x` (`LOG[0]` is meaningless)
pub static LOG: [u8; 256] = EXP_LOG.1;

/// Multiplicative inverses (`INV[0]` is meaningless)
pub static INV: [u8; 256] = build_inverse();

static MUL_TABLE: OnceLock<Box<[[u8; 256]; 256]>> = OnceLock::new();

fn build_mul_table() -> Box<[[u8; 256]; 256]> {
    let mut table = Box::new([[0u8; 256]; 256]);
    for (a, row) in table.iter_mut().enumerate().skip(1) {
        for (b, product) in row.iter_mut().enumerate().skip(1) {
            *product = EXP[LOG[a] as usize + LOG[b] as usize];
        }
    }
    table
}

/// Full product table, `mul_table()[a][b] == a * b`
#[inline]
pub fn mul_table() -> &'static [[u8; 256]; 256] {
    MUL_TABLE.get_or_init(build_mul_table)
}

/// Row of the product table for a fixed multiplier
#[inline]
pub fn mul_row(y: u8) -> &'static [u8; 256] {
    &mul_table()[y as usize]
}

/// Multiply two raw bytes as field elements
#[inline]
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    EXP[LOG[a as usize] as usize + LOG[b as usize] as usize]
}

/// GF(2^8) element
///
/// `#[repr(transparent)]` over `u8`, so rows of elements can be viewed as byte
/// slices with `bytemuck::cast_slice` and fed to the multiply-accumulate kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct Gf256 {
    value: u8,
}

impl Gf256 {
    pub const ZERO: Gf256 = Gf256 { value: 0 };
    pub const ONE: Gf256 = Gf256 { value: 1 };
    /// Generator of the multiplicative group
    pub const GENERATOR: Gf256 = Gf256 { value: 2 };

    #[inline]
    pub const fn new(value: u8) -> Self {
        Gf256 { value }
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.value
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.value == 0
    }

    /// Raise to a power; `0^0 == 1` and `0^n == 0` for `n > 0`
    pub fn pow(self, exponent: u32) -> Self {
        if exponent == 0 {
            return Self::ONE;
        }
        if self.value == 0 {
            return Self::ZERO;
        }
        let log = LOG[self.value as usize] as u64 * exponent as u64 % LIMIT as u64;
        Gf256::new(EXP[log as usize])
    }

    /// Multiplicative inverse, `None` for zero
    #[inline]
    pub fn inv(self) -> Option<Self> {
        if self.value == 0 {
            None
        } else {
            Some(Gf256::new(INV[self.value as usize]))
        }
    }

    /// Division that reports a zero divisor instead of panicking
    #[inline]
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        rhs.inv().map(|inv| self * inv)
    }
}

impl From<u8> for Gf256 {
    #[inline]
    fn from(value: u8) -> Self {
        Gf256::new(value)
    }
}

impl From<Gf256> for u8 {
    #[inline]
    fn from(value: Gf256) -> Self {
        value.value
    }
}

impl fmt::Display for Gf256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.value)
    }
}

// Addition and subtraction are both XOR in characteristic 2
impl Add for Gf256 {
    type Output = Self;

    #[inline]
    #[allow(clippy::suspicious_arithmetic_impl)]
    fn add(self, rhs: Self) -> Self {
        Gf256::new(self.value ^ rhs.value)
    }
}

impl AddAssign for Gf256 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Gf256 {
    type Output = Self;

    #[inline]
    #[allow(clippy::suspicious_arithmetic_impl)]
    fn sub(self, rhs: Self) -> Self {
        Gf256::new(self.value ^ rhs.value)
    }
}

impl SubAssign for Gf256 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul for Gf256 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Gf256::new(mul(self.value, rhs.value))
    }
}

impl MulAssign for Gf256 {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Div for Gf256 {
    type Output = Self;

    /// Panics on a zero divisor, like integer division
    #[inline]
    fn div(self, rhs: Self) -> Self {
        match self.checked_div(rhs) {
            Some(quotient) => quotient,
            None => panic!("Division by zero in Galois field"),
        }
    }
}

impl DivAssign for Gf256 {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}
