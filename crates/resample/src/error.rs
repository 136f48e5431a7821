//! Error types for matching and aggregation.

use thiserror::Error;

/// Errors that can occur while resampling.
///
/// Unmatched cells are not errors; they are recorded in the correspondence and
/// value arrays and flow through the pipeline silently.
#[derive(Error, Debug)]
pub enum ResampleError {
    /// A zero-length point or value set reached the matcher or aggregator.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// Parallel arrays disagree in length.
    #[error("{what}: expected {expected} elements, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The search radius is not a positive finite distance.
    #[error("invalid search radius: {0} m")]
    InvalidRadius(f64),

    /// The reference set cannot be addressed by the 32-bit correspondence encoding.
    #[error("too many reference points: {0}")]
    TooManyPoints(usize),

    /// A working array could not be allocated.
    #[error("failed to allocate {elements} elements for {what}")]
    AllocationFailure { what: &'static str, elements: usize },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Point set assembly error.
    #[error(transparent)]
    Grid(#[from] fusion_common::GridError),
}

impl ResampleError {
    /// Create a LengthMismatch error.
    pub fn length_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            what,
            expected,
            actual,
        }
    }

    /// Create a ConfigError.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

/// Result type for resampling operations.
pub type Result<T> = std::result::Result<T, ResampleError>;
