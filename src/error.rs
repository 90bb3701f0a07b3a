//! Error types for encoding, decoding and error correction

use thiserror::Error;

/// Errors returned by [`FecCode`](crate::FecCode) and the linear algebra underneath it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FecError {
    /// Code parameters outside `1 <= required <= total <= 256`
    #[error("Invalid code parameters: need 1 <= required ({required}) <= total ({total}) <= 256")]
    InvalidParameters { required: usize, total: usize },

    /// Input length is not a multiple of the number of data blocks
    #[error("Input length {len} is not a multiple of {required}")]
    InputSizeMismatch { len: usize, required: usize },

    /// Not enough distinct shares to decode (or to correct errors)
    #[error("Not enough shares: need {needed}, got {got}")]
    InsufficientShares { needed: usize, got: usize },

    /// Share index does not belong to this code
    #[error("Invalid share index {index}: code has {total} shares")]
    InvalidShareIndex { index: usize, total: usize },

    /// The same share index was supplied twice to the error corrector
    #[error("Share {0} supplied more than once")]
    DuplicateShare(usize),

    /// Share or output buffer length does not match the others
    #[error("Share size mismatch: expected {expected} bytes, got {got}")]
    ShareSizeMismatch { expected: usize, got: usize },

    #[error("Matrix is singular")]
    SingularMatrix,

    #[error("Polynomial division by zero")]
    ZeroDivisor,

    /// More corrupted shares than the redundancy can correct
    #[error("Too many errors to correct")]
    UncorrectableErrors,
}

pub type Result<T> = std::result::Result<T, FecError>;
