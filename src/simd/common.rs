//! Common SIMD utilities shared across all implementations
//!
//! Nibble tables and the scalar reference loop that every vector kernel falls
//! back to for its tail.

use crate::galois::mul_row;

/// Nibble lookup tables for one multiplier
///
/// In GF(2^8), `y * x == y * (x & 0x0F) ^ y * (x & 0xF0)`, so the product of
/// any byte is two 16-entry lookups. 16 entries is exactly one PSHUFB / TBL
/// register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NibbleTables {
    /// Low nibble (0x0N) → `y * 0x0N`
    pub low: [u8; 16],
    /// High nibble (0xN0) → `y * 0xN0`
    pub high: [u8; 16],
}

/// Build nibble lookup tables for multiplier `y`
pub fn build_nibble_tables(y: u8) -> NibbleTables {
    let row = mul_row(y);
    let mut low = [0u8; 16];
    let mut high = [0u8; 16];

    for nib in 0..16 {
        low[nib] = row[nib];
        high[nib] = row[nib << 4];
    }

    NibbleTables { low, high }
}

/// Scalar multiply-accumulate: `dst[i] ^= y * src[i]` for `i < dst.len()`
///
/// The behavioural reference for every vector kernel. Panics if `src` is
/// shorter than `dst`.
#[inline]
pub fn addmul_scalar(dst: &mut [u8], src: &[u8], y: u8) {
    if y == 0 {
        return;
    }
    let src = &src[..dst.len()];
    let row = mul_row(y);

    // Simple loop - let compiler decide optimal unrolling
    for (d, &s) in dst.iter_mut().zip(src) {
        *d ^= row[s as usize];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galois::mul;

    #[test]
    fn test_nibble_tables_recombine() {
        for y in [1u8, 2, 0x1d, 0x8e, 0xff] {
            let tables = build_nibble_tables(y);
            for x in 0..=255u8 {
                let split = tables.low[(x & 0x0f) as usize] ^ tables.high[(x >> 4) as usize];
                assert_eq!(split, mul(y, x), "y={y:#04x} x={x:#04x}");
            }
        }
    }

    #[test]
    fn test_scalar_addmul() {
        let src = [1u8, 2, 3, 0x80];
        let mut dst = [0xffu8, 0, 7, 1];
        addmul_scalar(&mut dst, &src, 2);
        assert_eq!(dst, [0xff ^ 2, 4, 7 ^ 6, 1 ^ 0x1d]);
    }

    #[test]
    fn test_scalar_zero_multiplier_is_noop() {
        let mut dst = [9u8; 8];
        addmul_scalar(&mut dst, &[0xaa; 8], 0);
        assert_eq!(dst, [9u8; 8]);
        addmul_scalar(&mut [], &[], 0);
    }

    #[test]
    fn test_scalar_ignores_extra_source() {
        let mut dst = [0u8; 2];
        addmul_scalar(&mut dst, &[1, 1, 1, 1], 5);
        assert_eq!(dst, [5, 5]);
    }

    #[test]
    #[should_panic]
    fn test_scalar_short_source_panics() {
        let mut dst = [0u8; 4];
        addmul_scalar(&mut dst, &[1, 2], 3);
    }
}
