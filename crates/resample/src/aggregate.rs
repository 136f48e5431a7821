//! Turning correspondences into resampled values.
//!
//! - [`gather`]: copy the matched source value into every target cell.
//! - [`summarize`] / [`summarize_no_sd`]: reduce many source cells onto the
//!   target cell each one matched, reporting mean, population standard
//!   deviation and contributing count.
//!
//! Reduction runs partition-then-merge: source cells are split into a fixed
//! number of contiguous partitions, each filling its own accumulators, and
//! the partials are merged in partition order. The partition count depends
//! only on the input sizes, so results are bit-identical from run to run.

use rayon::prelude::*;
use std::time::Instant;

use fusion_common::{Sample, NODATA};

use crate::buffer::filled;
use crate::correspondence::Correspondence;
use crate::error::{ResampleError, Result};

/// Upper bound on reduction partitions.
const MAX_PARTITIONS: usize = 16;

/// Smallest number of source cells worth a partition of its own.
const MIN_PARTITION_LEN: usize = 1 << 16;

/// Memory allowed for partial accumulators across all partitions.
const PARTIAL_BUDGET_BYTES: usize = 1 << 30;

/// Output of the statistical reduction, one entry per target cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Mean of contributing values, or the fill value when none contributed.
    pub mean: Vec<f64>,
    /// Population standard deviation; absent from [`summarize_no_sd`].
    pub sd: Option<Vec<f64>>,
    /// Number of contributing source cells.
    pub count: Vec<u32>,
}

impl Summary {
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Number of target cells that received at least one valid source value.
    pub fn covered_cells(&self) -> usize {
        self.count.iter().filter(|&&c| c > 0).count()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    count: u32,
    sum: f64,
    sum_sq: f64,
}

impl Accumulator {
    #[inline]
    fn push<const WITH_SD: bool>(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        if WITH_SD {
            self.sum_sq += value * value;
        }
    }

    #[inline]
    fn merge(&mut self, other: &Accumulator) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
    }

    #[inline]
    fn mean(&self) -> Sample {
        if self.count == 0 {
            Sample::Missing
        } else {
            Sample::Valid(self.sum / self.count as f64)
        }
    }

    #[inline]
    fn sd(&self) -> Sample {
        match self.count {
            0 => Sample::Missing,
            1 => Sample::Valid(0.0),
            n => {
                let n = n as f64;
                let mean = self.sum / n;
                let variance = (self.sum_sq / n - mean * mean).max(0.0);
                Sample::Valid(variance.sqrt())
            }
        }
    }
}

/// Nearest-value assignment.
///
/// `correspondence` maps each target cell to a source cell; the output holds
/// the source value verbatim for matched cells and the fill value otherwise.
pub fn gather(values: &[f64], correspondence: &Correspondence) -> Result<Vec<f64>> {
    if values.is_empty() {
        return Err(ResampleError::EmptyInput("source values"));
    }
    if correspondence.is_empty() {
        return Err(ResampleError::EmptyInput("target correspondence"));
    }
    if correspondence.reference_len() != values.len() {
        return Err(ResampleError::length_mismatch(
            "source values",
            correspondence.reference_len(),
            values.len(),
        ));
    }

    let mut output = filled("gathered values", correspondence.len(), NODATA)?;
    output.par_iter_mut().enumerate().for_each(|(t, out)| {
        if let Some(s) = correspondence.get(t) {
            *out = values[s];
        }
    });
    Ok(output)
}

/// Many-to-one reduction with mean, standard deviation and count.
///
/// `correspondence` maps each *source* cell to the target cell it falls in
/// (the matcher run with the target set as reference). Source values that
/// are negative or NaN do not contribute.
pub fn summarize(
    values: &[f64],
    correspondence: &Correspondence,
    target_len: usize,
) -> Result<Summary> {
    reduce::<true>(values, correspondence, target_len)
}

/// [`summarize`] without the standard deviation.
pub fn summarize_no_sd(
    values: &[f64],
    correspondence: &Correspondence,
    target_len: usize,
) -> Result<Summary> {
    reduce::<false>(values, correspondence, target_len)
}

fn partition_len(source_len: usize, target_len: usize) -> usize {
    let per_partial = target_len.saturating_mul(std::mem::size_of::<Accumulator>()).max(1);
    let by_memory = (PARTIAL_BUDGET_BYTES / per_partial).max(1);
    let by_size = source_len.div_ceil(MIN_PARTITION_LEN).max(1);
    let partitions = MAX_PARTITIONS.min(by_memory).min(by_size);
    source_len.div_ceil(partitions).max(1)
}

fn reduce<const WITH_SD: bool>(
    values: &[f64],
    correspondence: &Correspondence,
    target_len: usize,
) -> Result<Summary> {
    if values.is_empty() {
        return Err(ResampleError::EmptyInput("source values"));
    }
    if target_len == 0 {
        return Err(ResampleError::EmptyInput("target cells"));
    }
    if correspondence.len() != values.len() {
        return Err(ResampleError::length_mismatch(
            "source correspondence",
            values.len(),
            correspondence.len(),
        ));
    }
    if correspondence.reference_len() != target_len {
        return Err(ResampleError::length_mismatch(
            "target cells",
            correspondence.reference_len(),
            target_len,
        ));
    }

    let start = Instant::now();
    let chunk = partition_len(values.len(), target_len);

    let partials = values
        .par_chunks(chunk)
        .zip(correspondence.as_raw().par_chunks(chunk))
        .map(|(vals, targets)| {
            let mut acc = filled("partial accumulators", target_len, Accumulator::default())?;
            for (&value, &target) in vals.iter().zip(targets) {
                if target < 0 {
                    continue;
                }
                if let Sample::Valid(v) = Sample::from_raw(value) {
                    acc[target as usize].push::<WITH_SD>(v);
                }
            }
            Ok(acc)
        })
        .collect::<Result<Vec<_>>>()?;

    let partition_count = partials.len();
    let mut partials = partials.into_iter();
    let mut merged = match partials.next() {
        Some(first) => first,
        None => filled("accumulators", target_len, Accumulator::default())?,
    };
    for partial in partials {
        merged
            .par_iter_mut()
            .zip(partial.par_iter())
            .for_each(|(m, p)| m.merge(p));
    }

    let mut mean = filled("summary mean", target_len, NODATA)?;
    let mut count = filled("summary count", target_len, 0u32)?;
    mean.par_iter_mut()
        .zip(count.par_iter_mut())
        .zip(merged.par_iter())
        .for_each(|((m, c), acc)| {
            *m = acc.mean().to_raw();
            *c = acc.count;
        });

    let sd = if WITH_SD {
        let mut sd = filled("summary sd", target_len, NODATA)?;
        sd.par_iter_mut()
            .zip(merged.par_iter())
            .for_each(|(s, acc)| *s = acc.sd().to_raw());
        Some(sd)
    } else {
        None
    };

    let summary = Summary { mean, sd, count };
    tracing::debug!(
        sources = values.len(),
        targets = target_len,
        covered = summary.covered_cells(),
        partitions = partition_count,
        with_sd = WITH_SD,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Summary aggregation complete"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correspondence::UNMATCHED;

    fn corr(raw: Vec<i32>, reference_len: usize) -> Correspondence {
        Correspondence::from_raw(raw, reference_len)
    }

    #[test]
    fn test_gather_copies_verbatim() {
        let values = [10.0, 20.0, 30.0, NODATA];
        let c = corr(vec![2, UNMATCHED, 0, 3], 4);
        let out = gather(&values, &c).unwrap();
        assert_eq!(out, vec![30.0, NODATA, 10.0, NODATA]);
    }

    #[test]
    fn test_gather_checks_lengths() {
        let c = corr(vec![0], 3);
        assert!(matches!(
            gather(&[1.0, 2.0], &c),
            Err(ResampleError::LengthMismatch { .. })
        ));
        assert!(matches!(
            gather(&[], &c),
            Err(ResampleError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_summarize_excludes_negative_values() {
        let values = [1.0, 2.0, 3.0, NODATA];
        let c = corr(vec![0, 0, 0, 0], 1);
        let s = summarize(&values, &c, 1).unwrap();
        assert_eq!(s.count, vec![3]);
        assert_eq!(s.mean, vec![2.0]);
        let sd = s.sd.unwrap()[0];
        assert!((sd - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_summarize_empty_and_single_bins() {
        let values = [5.0, -1.0, 7.0];
        let c = corr(vec![1, 0, UNMATCHED], 3);
        let s = summarize(&values, &c, 3).unwrap();
        assert_eq!(s.count, vec![0, 1, 0]);
        assert_eq!(s.mean, vec![NODATA, 5.0, NODATA]);
        assert_eq!(s.sd.as_deref(), Some(&[NODATA, 0.0, NODATA][..]));
        assert_eq!(s.covered_cells(), 1);
    }

    #[test]
    fn test_no_sd_variant_matches_mean_and_count() {
        let values: Vec<f64> = (0..1000).map(|i| (i % 17) as f64).collect();
        let raw: Vec<i32> = (0..1000).map(|i| (i % 13) as i32).collect();
        let c = corr(raw, 13);
        let with_sd = summarize(&values, &c, 13).unwrap();
        let without = summarize_no_sd(&values, &c, 13).unwrap();
        assert_eq!(with_sd.mean, without.mean);
        assert_eq!(with_sd.count, without.count);
        assert!(without.sd.is_none());
    }

    #[test]
    fn test_summarize_rejects_mismatched_target_len() {
        let c = corr(vec![0, 1], 2);
        assert!(matches!(
            summarize(&[1.0, 2.0], &c, 3),
            Err(ResampleError::LengthMismatch { .. })
        ));
        assert!(matches!(
            summarize(&[1.0, 2.0], &c, 0),
            Err(ResampleError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_partition_len() {
        assert_eq!(partition_len(10, 10), 10);
        assert_eq!(partition_len(1 << 20, 100), 1 << 16);
        // A huge target set collapses to one partition.
        assert_eq!(partition_len(1 << 20, 1 << 30), 1 << 20);
    }
}
