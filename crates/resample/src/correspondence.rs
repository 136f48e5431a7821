//! Correspondence arrays produced by the matcher.

use fusion_common::NODATA;

/// Entry value for a query cell with no reference cell inside the radius.
pub const UNMATCHED: i32 = -1;

/// For every query cell, the index of its nearest reference cell.
///
/// Stored in the on-disk encoding (`i32`, `-1` for unmatched) so the array can
/// be handed to the writer as-is; [`Correspondence::get`] exposes it as
/// `Option<usize>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Correspondence {
    indices: Vec<i32>,
    distances: Option<Vec<f64>>,
    reference_len: usize,
}

impl Correspondence {
    pub(crate) fn new(indices: Vec<i32>, distances: Option<Vec<f64>>, reference_len: usize) -> Self {
        Self {
            indices,
            distances,
            reference_len,
        }
    }

    /// Rebuild a correspondence from raw indices, e.g. one read back from disk.
    ///
    /// Entries outside `0..reference_len` are treated as unmatched.
    pub fn from_raw(indices: Vec<i32>, reference_len: usize) -> Self {
        let indices = indices
            .into_iter()
            .map(|i| {
                if i >= 0 && (i as usize) < reference_len {
                    i
                } else {
                    UNMATCHED
                }
            })
            .collect();
        Self::new(indices, None, reference_len)
    }

    /// Number of query cells.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of cells in the reference set the indices point into.
    pub fn reference_len(&self) -> usize {
        self.reference_len
    }

    /// Reference index matched to query cell `query`, if any.
    #[inline]
    pub fn get(&self, query: usize) -> Option<usize> {
        match self.indices.get(query) {
            Some(&i) if i >= 0 => Some(i as usize),
            _ => None,
        }
    }

    /// Great-circle distance of the match in meters, when distances were recorded.
    pub fn distance(&self, query: usize) -> Option<f64> {
        self.get(query)?;
        self.distances.as_ref()?.get(query).copied()
    }

    pub fn has_distances(&self) -> bool {
        self.distances.is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<usize>> + '_ {
        self.indices
            .iter()
            .map(|&i| if i >= 0 { Some(i as usize) } else { None })
    }

    /// Raw indices with `-1` for unmatched cells.
    pub fn as_raw(&self) -> &[i32] {
        &self.indices
    }

    /// Raw distances with the fill value for unmatched cells.
    pub fn distances_raw(&self) -> Option<&[f64]> {
        self.distances.as_deref()
    }

    pub fn matched_count(&self) -> usize {
        self.indices.iter().filter(|&&i| i >= 0).count()
    }
}

/// Distance value stored for unmatched cells.
pub(crate) const UNMATCHED_DISTANCE: f64 = NODATA;
