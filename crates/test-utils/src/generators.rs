//! Synthetic swath data.
//!
//! These generators create predictable, verifiable swaths and value arrays
//! that can be used across the test suite and the benchmarks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fusion_common::geo::normalize_longitude;
use fusion_common::{PointSet, NODATA};

/// Geometry of a synthetic swath.
///
/// Rows run along-track in the `heading_deg` direction (0 = due north),
/// columns run cross-track to the right of it. Longitude steps are widened by
/// `1 / cos(origin_lat)` so cells stay roughly square on the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwathSpec {
    pub rows: usize,
    pub cols: usize,
    pub origin_lat: f64,
    pub origin_lon: f64,
    pub spacing_deg: f64,
    pub heading_deg: f64,
}

impl SwathSpec {
    pub fn new(rows: usize, cols: usize, origin: (f64, f64), spacing_deg: f64) -> Self {
        Self {
            rows,
            cols,
            origin_lat: origin.0,
            origin_lon: origin.1,
            spacing_deg,
            heading_deg: 0.0,
        }
    }

    pub fn with_heading(mut self, heading_deg: f64) -> Self {
        self.heading_deg = heading_deg;
        self
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Coordinates of cell `(row, col)` as `(lat, lon)`.
    pub fn cell(&self, row: usize, col: usize) -> (f64, f64) {
        let (sin_h, cos_h) = self.heading_deg.to_radians().sin_cos();
        let along = row as f64 * self.spacing_deg;
        let across = col as f64 * self.spacing_deg;

        let lat = self.origin_lat + along * cos_h - across * sin_h;
        let lon_scale = self.origin_lat.to_radians().cos().max(0.05);
        let lon = self.origin_lon + (along * sin_h + across * cos_h) / lon_scale;
        (lat, normalize_longitude(lon))
    }
}

/// Generate the swath's point set in row-major order.
pub fn swath_points(spec: &SwathSpec) -> PointSet {
    let mut pairs = Vec::with_capacity(spec.len());
    for row in 0..spec.rows {
        for col in 0..spec.cols {
            pairs.push(spec.cell(row, col));
        }
    }
    PointSet::from_pairs(pairs)
}

/// Generate the swath with every coordinate displaced by up to
/// `jitter_deg` in each axis. The same seed always gives the same swath.
pub fn jittered_swath(spec: &SwathSpec, jitter_deg: f64, seed: u64) -> PointSet {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pairs = Vec::with_capacity(spec.len());
    for row in 0..spec.rows {
        for col in 0..spec.cols {
            let (lat, lon) = spec.cell(row, col);
            let dlat = rng.gen_range(-jitter_deg..=jitter_deg);
            let dlon = rng.gen_range(-jitter_deg..=jitter_deg);
            pairs.push(((lat + dlat).clamp(-90.0, 90.0), normalize_longitude(lon + dlon)));
        }
    }
    PointSet::from_pairs(pairs)
}

/// Creates a value array where cell `i` holds `i + 1`.
///
/// Every value is valid and distinct, so a gathered value identifies the
/// source cell it came from.
pub fn ramp_values(len: usize) -> Vec<f64> {
    (0..len).map(|i| (i + 1) as f64).collect()
}

/// Creates a ramp where every `every`-th cell is the fill value.
pub fn values_with_gaps(len: usize, every: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            if every > 0 && i % every == every - 1 {
                NODATA
            } else {
                (i + 1) as f64
            }
        })
        .collect()
}

/// Creates radiance-like values in `[0, max)` from a seeded generator.
pub fn random_values(len: usize, max: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(0.0..max)).collect()
}

/// Creates a `[block][row][col]` stack where every cell encodes its position.
///
/// Each cell value is `block * 1_000_000 + row * 1000 + col`.
pub fn block_stack(blocks: usize, rows: usize, cols: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(blocks * rows * cols);
    for block in 0..blocks {
        for row in 0..rows {
            for col in 0..cols {
                data.push((block * 1_000_000 + row * 1000 + col) as f64);
            }
        }
    }
    data
}
