//! Error types for point sets and grid construction.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Errors raised while assembling point sets or user-defined grids.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("latitude and longitude arrays differ in length ({lat} vs {lon})")]
    LengthMismatch { lat: usize, lon: usize },

    #[error("invalid cell size: {0}")]
    InvalidCellSize(f64),

    #[error("invalid grid extent: {0}")]
    InvalidExtent(String),

    #[error("grid of {width} x {height} cells is too large to address")]
    TooManyCells { width: usize, height: usize },

    #[error("failed to allocate {0} grid cells")]
    AllocationFailure(usize),
}
