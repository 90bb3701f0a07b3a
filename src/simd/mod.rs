//! SIMD-optimized GF(2^8) multiply-accumulate
//!
//! Everything the codec does with share data reduces to one primitive:
//! `addmul(dst, src, y)`, i.e. `dst[i] ^= y * src[i]`.
//!
//! Platform dispatch:
//! - x86_64: PSHUFB (AVX2 → SSSE3) → scalar
//! - ARM64: NEON → scalar
//! - Other: scalar
//!
//! Based on the "Screaming Fast Galois Field Arithmetic" paper.
//!
//! The level is probed once on first use. Setting `RSFEC_SIMD` to `scalar`,
//! `ssse3`, `avx2` or `neon` before that point overrides the choice; a level the
//! CPU lacks is ignored with a warning.

pub mod common;
#[cfg(target_arch = "aarch64")]
pub mod neon;
#[cfg(target_arch = "x86_64")]
pub mod pshufb;

pub use common::{addmul_scalar, build_nibble_tables, NibbleTables};

use log::{debug, warn};
use std::sync::OnceLock;

/// Environment variable that overrides kernel selection
pub const SIMD_ENV: &str = "RSFEC_SIMD";

/// Multiply-accumulate kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdLevel {
    /// No SIMD available, use scalar fallback
    None,
    /// x86_64 SSSE3 (128-bit PSHUFB)
    Ssse3,
    /// x86_64 AVX2 (256-bit PSHUFB)
    Avx2,
    /// ARM64 NEON (TBL)
    Neon,
}

impl SimdLevel {
    pub const ALL: [SimdLevel; 4] = [
        SimdLevel::None,
        SimdLevel::Ssse3,
        SimdLevel::Avx2,
        SimdLevel::Neon,
    ];

    /// Whether this kernel can run on the current CPU
    pub fn is_supported(self) -> bool {
        match self {
            SimdLevel::None => true,
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Ssse3 => is_x86_feature_detected!("ssse3"),
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Avx2 => is_x86_feature_detected!("avx2") && is_x86_feature_detected!("ssse3"),
            #[cfg(target_arch = "aarch64")]
            SimdLevel::Neon => std::arch::is_aarch64_feature_detected!("neon"),
            _ => false,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" | "scalar" => Some(SimdLevel::None),
            "ssse3" => Some(SimdLevel::Ssse3),
            "avx2" => Some(SimdLevel::Avx2),
            "neon" => Some(SimdLevel::Neon),
            _ => None,
        }
    }
}

/// Detect the best available kernel for the current CPU
pub fn detect_simd_support() -> SimdLevel {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("ssse3") {
            return SimdLevel::Avx2;
        }
        if is_x86_feature_detected!("ssse3") {
            return SimdLevel::Ssse3;
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if std::arch::is_aarch64_feature_detected!("neon") {
            return SimdLevel::Neon;
        }
    }

    SimdLevel::None
}

static SIMD_LEVEL: OnceLock<SimdLevel> = OnceLock::new();

/// Kernel used by [`addmul`], chosen once per process
pub fn selected_simd_level() -> SimdLevel {
    *SIMD_LEVEL.get_or_init(|| select_simd_level(std::env::var(SIMD_ENV).ok().as_deref()))
}

fn select_simd_level(requested: Option<&str>) -> SimdLevel {
    let detected = detect_simd_support();
    let level = match requested {
        None => detected,
        Some(name) => match SimdLevel::from_name(name) {
            Some(level) if level.is_supported() => level,
            Some(level) => {
                warn!("{SIMD_ENV}={name}: {level:?} is not supported on this CPU, using {detected:?}");
                detected
            }
            None => {
                warn!("{SIMD_ENV}={name}: unknown kernel, using {detected:?}");
                detected
            }
        },
    };
    debug!("GF(2^8) multiply-accumulate kernel: {:?}", level);
    level
}

/// `dst[i] ^= y * src[i]` for every `i < dst.len()`
///
/// `src` must be at least as long as `dst` (panics otherwise, like slice
/// indexing); bytes past `dst.len()` are never read. `y == 0` is a no-op.
#[inline]
pub fn addmul(dst: &mut [u8], src: &[u8], y: u8) {
    if y == 0 {
        return;
    }
    let src = &src[..dst.len()];
    dispatch(selected_simd_level(), dst, src, y);
}

/// [`addmul`] with an explicit kernel; falls back to scalar if the CPU lacks it
pub fn addmul_with(level: SimdLevel, dst: &mut [u8], src: &[u8], y: u8) {
    if y == 0 {
        return;
    }
    let src = &src[..dst.len()];
    let level = if level.is_supported() {
        level
    } else {
        SimdLevel::None
    };
    dispatch(level, dst, src, y);
}

/// `level` must be supported by the current CPU
#[inline]
fn dispatch(level: SimdLevel, dst: &mut [u8], src: &[u8], y: u8) {
    match level {
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => unsafe {
            // SAFETY: callers only pass levels that passed `is_supported`
            pshufb::addmul_avx2(dst, src, y)
        },
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Ssse3 => unsafe {
            // SAFETY: as above
            pshufb::addmul_ssse3(dst, src, y)
        },
        #[cfg(target_arch = "aarch64")]
        SimdLevel::Neon => unsafe {
            // SAFETY: as above
            neon::addmul_neon(dst, src, y)
        },
        _ => addmul_scalar(dst, src, y),
    }
}
