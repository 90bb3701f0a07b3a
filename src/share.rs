//! Encoded shares

/// One of the `total` pieces produced by encoding
///
/// Shares `0..required` carry the input data verbatim; the rest are parity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Share {
    /// Position of this share in the code, `0..total`
    pub index: usize,
    pub data: Vec<u8>,
}

impl Share {
    pub fn new(index: usize, data: impl Into<Vec<u8>>) -> Self {
        Share {
            index,
            data: data.into(),
        }
    }

    /// Independent copy whose data no longer aliases any buffer of `self`
    pub fn deep_copy(&self) -> Share {
        Share {
            index: self.index,
            data: self.data.clone(),
        }
    }
}
