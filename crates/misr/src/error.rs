//! Error types for block-stack transforms.

use thiserror::Error;

use crate::resolution::MisrResolution;

/// Errors that can occur while reshaping block-stacked arrays.
#[derive(Error, Debug)]
pub enum MisrError {
    /// The resolution flag is neither low nor high.
    #[error("invalid resolution flag: {0:?}")]
    InvalidResolutionFlag(String),

    /// An array does not match the block layout it was declared with.
    #[error("{what}: expected {expected} elements, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Window dimensions do not divide the block dimensions.
    #[error("{what} of {size} is not a multiple of {factor}")]
    NotDivisible {
        what: &'static str,
        size: usize,
        factor: usize,
    },

    /// A working array could not be allocated.
    #[error("failed to allocate {elements} elements for {what}")]
    AllocationFailure { what: &'static str, elements: usize },

    /// The channel is not available at the requested resolution.
    #[error("{camera} {band} is not available at {requested} resolution")]
    UnsupportedResolution {
        camera: String,
        band: String,
        requested: MisrResolution,
    },

    #[error("unknown camera: {0}")]
    UnknownCamera(String),

    #[error("unknown band: {0}")]
    UnknownBand(String),
}

impl MisrError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            what,
            expected,
            actual,
        }
    }
}

/// Result type for block-stack operations.
pub type Result<T> = std::result::Result<T, MisrError>;

/// Allocate a vector of `len` copies of `value`, reporting failure instead of
/// aborting.
pub(crate) fn filled<T: Clone>(what: &'static str, len: usize, value: T) -> Result<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| MisrError::AllocationFailure {
            what,
            elements: len,
        })?;
    buffer.resize(len, value);
    Ok(buffer)
}
