//! Systematic Reed-Solomon forward error correction over GF(2^8)
//!
//! A [`FecCode`] turns input into `total` shares such that any `required` of
//! them rebuild it. The first `required` shares are the input itself. Given
//! more than `required` shares, corrupted bytes can also be located and
//! repaired (Berlekamp–Welch).
//!
//! ```
//! use rsfec::{FecCode, Share};
//!
//! let code = FecCode::new(3, 5)?;
//! let mut shares = Vec::new();
//! code.encode(b"hello, world", |index, _total, data| {
//!     shares.push(Share::new(index, data));
//! })?;
//!
//! // Lose two shares
//! shares.remove(0);
//! shares.remove(2);
//!
//! let mut out = Vec::new();
//! code.decode(&shares, |_index, _total, block| out.extend_from_slice(block))?;
//! assert_eq!(out, b"hello, world");
//! # Ok::<(), rsfec::FecError>(())
//! ```

mod berlekamp_welch;
pub mod error;
pub mod fec;
pub mod galois;
pub mod matrix;
pub mod poly;
pub mod share;
pub mod simd;

pub use error::{FecError, Result};
pub use fec::{FecCode, MAX_SHARES};
pub use galois::Gf256;
pub use matrix::Matrix;
pub use poly::Poly;
pub use share::Share;
pub use simd::{
    addmul, addmul_scalar, addmul_with, detect_simd_support, selected_simd_level, SimdLevel,
};
