//! Propagating coverage holes between co-registered resampled arrays.

use rayon::prelude::*;

use fusion_common::nodata::is_nodata;
use fusion_common::NODATA;

use crate::error::{ResampleError, Result};

/// Set `values[i]` to the fill value wherever `mask[i]` is the fill value.
///
/// Other cells are left untouched, so clipping twice with the same mask
/// changes nothing.
pub fn clip(values: &mut [f64], mask: &[f64]) -> Result<()> {
    if values.len() != mask.len() {
        return Err(ResampleError::length_mismatch(
            "clip mask",
            values.len(),
            mask.len(),
        ));
    }

    values
        .par_iter_mut()
        .zip(mask.par_iter())
        .for_each(|(value, &m)| {
            if is_nodata(m) {
                *value = NODATA;
            }
        });
    Ok(())
}

/// Zero `count[i]` wherever `mask[i]` is the fill value, keeping a summary's
/// counts in step with its clipped mean.
pub fn clip_counts(count: &mut [u32], mask: &[f64]) -> Result<()> {
    if count.len() != mask.len() {
        return Err(ResampleError::length_mismatch(
            "clip mask",
            count.len(),
            mask.len(),
        ));
    }

    count
        .par_iter_mut()
        .zip(mask.par_iter())
        .for_each(|(n, &m)| {
            if is_nodata(m) {
                *n = 0;
            }
        });
    Ok(())
}

/// Number of cells `clip` would blank out that currently hold data.
pub fn clipped_cells(values: &[f64], mask: &[f64]) -> usize {
    values
        .iter()
        .zip(mask)
        .filter(|(&v, &m)| is_nodata(m) && !is_nodata(v))
        .count()
}
