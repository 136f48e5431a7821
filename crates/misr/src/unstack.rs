//! Unstacking block-segmented arrays into one contiguous raster.
//!
//! The imager delivers an orbit as 180 blocks of `rows_per_block ×
//! block_width` samples, each block starting at column 0 of its own array.
//! Unstacking places block `b` at rows `b·rows_per_block..` and shifts it
//! right by the block's offset, so columns line up geographically across
//! block boundaries:
//!
//! ```text
//!  stacked [block][row][col]        unstacked [row][col]
//!  ┌─────────┐                      ┌─────────┐
//!  │ block 0 │                      │ block 0 │
//!  ├─────────┤                      └┬────────┴┐
//!  │ block 1 │          ──►          │ block 1 │
//!  ├─────────┤                       └──┬──────┴──┐
//!  │ block 2 │                          │ block 2 │
//!  └─────────┘                          └─────────┘
//! ```

use rayon::prelude::*;
use std::time::Instant;

use fusion_common::NODATA;

use crate::error::{filled, MisrError, Result};
use crate::offsets::{block_offset, max_offset};
use crate::resolution::{MisrResolution, BLOCK_COUNT};

/// Shape `(rows, cols)` of an unstacked orbit at `resolution`.
pub fn final_image_size(resolution: MisrResolution) -> (usize, usize) {
    let rows = BLOCK_COUNT * resolution.rows_per_block();
    let cols = resolution.block_width() + max_offset(resolution);
    (rows, cols)
}

/// Unstack a full `[180][rows_per_block][block_width]` array.
///
/// Works for any payload (radiance, latitude, longitude, counts); cells no
/// block covers hold `fill`.
pub fn unstack<T>(source: &[T], resolution: MisrResolution, fill: T) -> Result<Vec<T>>
where
    T: Copy + Send + Sync,
{
    let expected = resolution.stack_len();
    if source.len() != expected {
        return Err(MisrError::shape_mismatch(
            "block stack",
            expected,
            source.len(),
        ));
    }

    let start = Instant::now();
    let (rows, cols) = final_image_size(resolution);
    let mut target = filled("unstacked raster", rows * cols, fill)?;

    // Global row g of the output holds native row g of the stack.
    target
        .par_chunks_mut(cols)
        .zip(source.par_chunks(resolution.block_width()))
        .enumerate()
        .for_each(|(row, (out, native))| place_row(out, native, row, resolution));

    tracing::debug!(
        resolution = %resolution,
        rows,
        cols,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Unstacked block array"
    );

    Ok(target)
}

/// Copy native row `global_row` of the stack into its output row.
fn place_row<T: Copy>(out: &mut [T], native: &[T], global_row: usize, resolution: MisrResolution) {
    let width = resolution.block_width();
    let offset = block_offset(global_row / resolution.rows_per_block(), resolution).unwrap_or(0);
    out[offset..offset + width].copy_from_slice(native);
}

/// Unstack a value array, filling uncovered cells with the nodata value.
pub fn unstack_values(source: &[f64], resolution: MisrResolution) -> Result<Vec<f64>> {
    unstack(source, resolution, NODATA)
}

/// Position `(row, col)` in the unstacked raster of stack element
/// `(block, row, col)`.
pub fn unstacked_position(
    block: usize,
    row: usize,
    col: usize,
    resolution: MisrResolution,
) -> Option<(usize, usize)> {
    if row >= resolution.rows_per_block() || col >= resolution.block_width() {
        return None;
    }
    let offset = block_offset(block, resolution)?;
    Some((block * resolution.rows_per_block() + row, col + offset))
}
