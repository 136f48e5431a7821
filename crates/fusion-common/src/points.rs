//! Point sets: flattened swath geolocation.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// Parallel latitude/longitude arrays for a flattened row-major raster.
///
/// Index `i` names the same physical cell in every array that is parallel to
/// this set (values, counts, correspondences). The raster width is tracked by
/// the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    lat: Vec<f64>,
    lon: Vec<f64>,
}

impl PointSet {
    /// Build a point set from parallel arrays.
    pub fn new(lat: Vec<f64>, lon: Vec<f64>) -> GridResult<Self> {
        if lat.len() != lon.len() {
            return Err(GridError::LengthMismatch {
                lat: lat.len(),
                lon: lon.len(),
            });
        }
        Ok(Self { lat, lon })
    }

    /// Build a point set from `(lat, lon)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let (lat, lon) = pairs.into_iter().unzip();
        Self { lat, lon }
    }

    pub fn len(&self) -> usize {
        self.lat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lat.is_empty()
    }

    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    /// Coordinates of one cell as `(lat, lon)`.
    pub fn get(&self, index: usize) -> Option<(f64, f64)> {
        Some((*self.lat.get(index)?, *self.lon.get(index)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.lat.iter().copied().zip(self.lon.iter().copied())
    }

    /// Split back into `(lat, lon)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.lat, self.lon)
    }
}
