//! ARM NEON GF(2^8) multiply-accumulate
//!
//! Same nibble-table technique as the x86 PSHUFB kernels, using the `vqtbl1q_u8`
//! table lookup. 16 bytes per step; the tail goes through the scalar loop.

use super::common::{addmul_scalar, build_nibble_tables};
use std::arch::aarch64::*;

/// NEON multiply-accumulate: `dst[i] ^= y * src[i]` for `i < dst.len()`
///
/// # Safety
/// The CPU must support NEON (all ARM64 CPUs do). `src` must be at least as
/// long as `dst`.
#[target_feature(enable = "neon")]
pub unsafe fn addmul_neon(dst: &mut [u8], src: &[u8], y: u8) {
    let len = dst.len();
    let src = &src[..len];
    let tables = build_nibble_tables(y);

    let tbl_low = vld1q_u8(tables.low.as_ptr());
    let tbl_high = vld1q_u8(tables.high.as_ptr());
    let mask = vdupq_n_u8(0x0F);

    let end = len & !15;
    let mut pos = 0;
    while pos < end {
        let input = vld1q_u8(src.as_ptr().add(pos));
        let acc = vld1q_u8(dst.as_ptr().add(pos));

        let lo_nib = vandq_u8(input, mask);
        let hi_nib = vshrq_n_u8(input, 4);
        let product = veorq_u8(vqtbl1q_u8(tbl_low, lo_nib), vqtbl1q_u8(tbl_high, hi_nib));

        vst1q_u8(dst.as_mut_ptr().add(pos), veorq_u8(acc, product));
        pos += 16;
    }

    if pos < len {
        addmul_scalar(&mut dst[pos..], &src[pos..], y);
    }
}
