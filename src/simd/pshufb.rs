//! PSHUFB-based GF(2^8) multiply-accumulate for x86_64
//!
//! Each source byte is split into nibbles; two PSHUFB lookups against the
//! 16-entry nibble tables give the product, which is XORed into `dst`.
//! SSSE3 handles 16 bytes per step, AVX2 32 bytes (the 128-bit tables are
//! broadcast to both lanes). Tails go through the scalar loop.

use super::common::{addmul_scalar, build_nibble_tables};
use std::arch::x86_64::*;

/// SSSE3 multiply-accumulate: `dst[i] ^= y * src[i]` for `i < dst.len()`
///
/// # Safety
/// The CPU must support SSSE3. `src` must be at least as long as `dst`.
#[target_feature(enable = "ssse3")]
pub unsafe fn addmul_ssse3(dst: &mut [u8], src: &[u8], y: u8) {
    let len = dst.len();
    let src = &src[..len];
    let tables = build_nibble_tables(y);

    let tbl_low = _mm_loadu_si128(tables.low.as_ptr() as *const __m128i);
    let tbl_high = _mm_loadu_si128(tables.high.as_ptr() as *const __m128i);
    let mask = _mm_set1_epi8(0x0F);

    let end = len & !15;
    let mut pos = 0;
    while pos < end {
        let input = _mm_loadu_si128(src.as_ptr().add(pos) as *const __m128i);
        let acc = _mm_loadu_si128(dst.as_ptr().add(pos) as *const __m128i);

        let lo_nib = _mm_and_si128(input, mask);
        let hi_nib = _mm_and_si128(_mm_srli_epi64(input, 4), mask);
        let product = _mm_xor_si128(
            _mm_shuffle_epi8(tbl_low, lo_nib),
            _mm_shuffle_epi8(tbl_high, hi_nib),
        );

        _mm_storeu_si128(
            dst.as_mut_ptr().add(pos) as *mut __m128i,
            _mm_xor_si128(acc, product),
        );
        pos += 16;
    }

    if pos < len {
        addmul_scalar(&mut dst[pos..], &src[pos..], y);
    }
}

/// AVX2 multiply-accumulate: `dst[i] ^= y * src[i]` for `i < dst.len()`
///
/// # Safety
/// The CPU must support AVX2. `src` must be at least as long as `dst`.
#[target_feature(enable = "avx2", enable = "ssse3")]
pub unsafe fn addmul_avx2(dst: &mut [u8], src: &[u8], y: u8) {
    let len = dst.len();
    let src = &src[..len];
    let tables = build_nibble_tables(y);

    let tbl_low =
        _mm256_broadcastsi128_si256(_mm_loadu_si128(tables.low.as_ptr() as *const __m128i));
    let tbl_high =
        _mm256_broadcastsi128_si256(_mm_loadu_si128(tables.high.as_ptr() as *const __m128i));
    let mask = _mm256_set1_epi8(0x0F);

    let end = len & !31;
    let mut pos = 0;
    while pos < end {
        let input = _mm256_loadu_si256(src.as_ptr().add(pos) as *const __m256i);
        let acc = _mm256_loadu_si256(dst.as_ptr().add(pos) as *const __m256i);

        let lo_nib = _mm256_and_si256(input, mask);
        let hi_nib = _mm256_and_si256(_mm256_srli_epi64(input, 4), mask);
        let product = _mm256_xor_si256(
            _mm256_shuffle_epi8(tbl_low, lo_nib),
            _mm256_shuffle_epi8(tbl_high, hi_nib),
        );

        _mm256_storeu_si256(
            dst.as_mut_ptr().add(pos) as *mut __m256i,
            _mm256_xor_si256(acc, product),
        );
        pos += 32;
    }

    if pos < len {
        addmul_scalar(&mut dst[pos..], &src[pos..], y);
    }
}
