//! Tests for the multiply-accumulate kernel variants
//!
//! Verifies that every kernel the CPU supports produces identical results to
//! the scalar reference, on aligned and unaligned sizes and offsets.

use rsfec::galois::mul;
use rsfec::simd::{addmul, addmul_scalar, addmul_with, detect_simd_support, SimdLevel};

fn patterned(size: usize, seed: u8) -> Vec<u8> {
    (0..size)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}

#[test]
fn test_every_level_matches_scalar() {
    // Aligned (16, 32, 64) and unaligned (17, 31, 65) sizes
    let sizes = vec![0, 1, 16, 17, 31, 32, 63, 64, 65, 100, 127, 128, 256, 4097];

    for level in SimdLevel::ALL {
        for &size in &sizes {
            for coef in [1u8, 2, 0x1d, 0x80, 0xc3, 0xff] {
                let input = patterned(size, coef);
                let base = patterned(size, 0x77);

                let mut expected = base.clone();
                addmul_scalar(&mut expected, &input, coef);

                let mut actual = base.clone();
                addmul_with(level, &mut actual, &input, coef);

                assert_eq!(
                    actual, expected,
                    "{level:?} differs from scalar at size {size}, coef {coef:#04x}"
                );
            }
        }
    }
}

#[test]
fn test_unaligned_slices() {
    let input = patterned(300, 3);
    for level in SimdLevel::ALL {
        for offset in 1..8 {
            let src = &input[offset..offset + 200];
            let mut expected = vec![0u8; 200];
            addmul_scalar(&mut expected, src, 0x53);

            let mut backing = vec![0u8; 208];
            let dst = &mut backing[offset..offset + 200];
            addmul_with(level, dst, src, 0x53);
            assert_eq!(dst, &expected[..], "{level:?} offset {offset}");
        }
    }
}

#[test]
fn test_addmul_definition() {
    let src = patterned(97, 11);
    let dst_before = patterned(97, 200);
    let y = 0x8e;

    let mut dst = dst_before.clone();
    addmul(&mut dst, &src, y);
    for i in 0..dst.len() {
        assert_eq!(dst[i], dst_before[i] ^ mul(y, src[i]));
    }
}

#[test]
fn test_addmul_twice_cancels() {
    let src = patterned(64, 5);
    let original = patterned(64, 9);
    let mut dst = original.clone();
    addmul(&mut dst, &src, 0x42);
    assert_ne!(dst, original);
    addmul(&mut dst, &src, 0x42);
    assert_eq!(dst, original);
}

#[test]
fn test_only_dst_len_bytes_touched() {
    let src = patterned(64, 1);
    let mut backing = vec![0xeeu8; 64];
    addmul(&mut backing[..40], &src, 7);
    assert!(backing[40..].iter().all(|&b| b == 0xee));
}

#[test]
#[should_panic]
fn test_short_source_panics() {
    let mut dst = vec![0u8; 32];
    addmul(&mut dst, &[1u8; 16], 3);
}

#[test]
fn test_zero_multiplier_accepts_anything() {
    let mut dst: Vec<u8> = Vec::new();
    addmul(&mut dst, &[], 0);
    let mut dst = vec![1u8; 8];
    addmul(&mut dst, &[], 0);
    assert_eq!(dst, vec![1u8; 8]);
}

#[test]
fn test_detection_is_consistent() {
    let detected = detect_simd_support();
    assert!(detected.is_supported());
    #[cfg(target_arch = "x86_64")]
    assert_ne!(detected, SimdLevel::Neon);
    #[cfg(target_arch = "aarch64")]
    assert_eq!(detected, SimdLevel::Neon);
}
