//! Fallible allocation of working arrays.

use crate::error::{ResampleError, Result};

/// Allocate a vector of `len` copies of `value`, reporting failure instead of
/// aborting.
pub(crate) fn filled<T: Clone>(what: &'static str, len: usize, value: T) -> Result<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| ResampleError::AllocationFailure {
            what,
            elements: len,
        })?;
    buffer.resize(len, value);
    Ok(buffer)
}
