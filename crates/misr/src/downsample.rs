//! Downsampling fine-resolution block stacks to coarse resolution.
//!
//! Each coarse sample is derived from the 4×4 window of fine samples it
//! covers, within one block. A window with any negative (missing) sample
//! produces the fill value instead of a partial average, so coarse values
//! never mix valid and missing measurements.

use rayon::prelude::*;

use fusion_common::Sample;

use crate::error::{filled, MisrError, Result};
use crate::resolution::{MisrResolution, BLOCK_COUNT, RESOLUTION_RATIO};

/// Samples in one averaging window.
pub const WINDOW_LEN: usize = RESOLUTION_RATIO * RESOLUTION_RATIO;

/// Average a 4×4 window; missing if any sample is negative or NaN.
#[inline]
pub fn average_window(window: &[f64; WINDOW_LEN]) -> Sample {
    let mut sum = 0.0;
    for &v in window {
        match Sample::from_raw(v) {
            Sample::Valid(v) => sum += v,
            Sample::Missing => return Sample::Missing,
        }
    }
    Sample::Valid(sum / WINDOW_LEN as f64)
}

/// Downsample a `[blocks][rows][cols]` stack by 4 along both axes.
///
/// `rows` and `cols` are per-block dimensions and must be multiples of 4.
/// Returns the `[blocks][rows/4][cols/4]` stack.
pub fn downsample_4x4(data: &[f64], blocks: usize, rows: usize, cols: usize) -> Result<Vec<f64>> {
    if rows % RESOLUTION_RATIO != 0 {
        return Err(MisrError::NotDivisible {
            what: "block rows",
            size: rows,
            factor: RESOLUTION_RATIO,
        });
    }
    if cols % RESOLUTION_RATIO != 0 {
        return Err(MisrError::NotDivisible {
            what: "block columns",
            size: cols,
            factor: RESOLUTION_RATIO,
        });
    }
    let expected = blocks * rows * cols;
    if data.len() != expected {
        return Err(MisrError::shape_mismatch(
            "fine-resolution stack",
            expected,
            data.len(),
        ));
    }

    let out_cols = cols / RESOLUTION_RATIO;
    let out_len = expected / WINDOW_LEN;
    let mut output = filled("downsampled stack", out_len, 0.0)?;
    if out_len == 0 {
        return Ok(output);
    }

    // Rows per block are a multiple of 4, so output row r reads input rows
    // 4r..4r+4 of the flattened stack without crossing a block boundary.
    output
        .par_chunks_mut(out_cols)
        .zip(data.par_chunks(cols * RESOLUTION_RATIO))
        .for_each(|(out_row, band)| {
            let mut window = [0.0; WINDOW_LEN];
            for (out_x, out) in out_row.iter_mut().enumerate() {
                let in_x = out_x * RESOLUTION_RATIO;
                for dy in 0..RESOLUTION_RATIO {
                    let src = &band[dy * cols + in_x..dy * cols + in_x + RESOLUTION_RATIO];
                    window[dy * RESOLUTION_RATIO..(dy + 1) * RESOLUTION_RATIO]
                        .copy_from_slice(src);
                }
                *out = average_window(&window).to_raw();
            }
        });

    Ok(output)
}

/// Downsample a full high-resolution stack to the low-resolution layout.
pub fn downsample_high_to_low(data: &[f64]) -> Result<Vec<f64>> {
    let high = MisrResolution::High;
    downsample_4x4(data, BLOCK_COUNT, high.rows_per_block(), high.block_width())
}
