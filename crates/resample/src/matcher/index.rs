//! Bucketed spatial index over a reference point set.
//!
//! Reference points are sorted by a lat/lon cell key whose cells are at least
//! as large as the search radius. Within one cell row the keys are
//! contiguous, so every column range a query needs is a contiguous slice of
//! the sorted arrays, located with two binary searches. No per-cell table is
//! kept, which keeps memory flat even for very small radii.
//!
//! Longitude columns wrap at the antimeridian. Near the poles a query whose
//! longitude window exceeds the whole circle scans its full cell rows.

use rayon::prelude::*;
use std::ops::Range;

use fusion_common::geo::{
    haversine_distance, is_valid_coordinate, meters_to_degrees, normalize_longitude,
};
use fusion_common::{PointSet, EARTH_RADIUS_M};

use crate::buffer::filled;
use crate::correspondence::{Correspondence, UNMATCHED, UNMATCHED_DISTANCE};
use crate::error::{ResampleError, Result};

/// Smallest cell edge in degrees (about 1 cm); bounds the key space.
const MIN_CELL_DEG: f64 = 1e-7;

/// Key assigned to points that cannot be indexed; sorts after every cell.
const INVALID_KEY: u64 = u64::MAX;

/// Cell geometry derived from the search radius.
#[derive(Debug, Clone, Copy)]
struct CellLayout {
    radius_m: f64,
    radius_deg: f64,
    lat_cell: f64,
    lon_cell: f64,
    n_rows: u64,
    n_cols: u64,
}

impl CellLayout {
    fn new(radius_m: f64) -> Self {
        let radius_deg = meters_to_degrees(radius_m);
        // Slack keeps points exactly on the radius inside the neighbor rows.
        let cell = (radius_deg * (1.0 + 1e-9)).clamp(MIN_CELL_DEG, 180.0);

        let n_rows = (180.0 / cell).ceil().max(1.0) as u64;
        let n_cols = (360.0 / cell).ceil().max(1.0) as u64;

        Self {
            radius_m,
            radius_deg,
            lat_cell: cell,
            // Columns divide the circle evenly so wrapped neighbors have full width.
            lon_cell: 360.0 / n_cols as f64,
            n_rows,
            n_cols,
        }
    }

    #[inline]
    fn row(&self, lat: f64) -> u64 {
        (((lat + 90.0) / self.lat_cell).floor() as u64).min(self.n_rows - 1)
    }

    #[inline]
    fn col(&self, lon: f64) -> u64 {
        (((normalize_longitude(lon) + 180.0) / self.lon_cell).floor() as u64).min(self.n_cols - 1)
    }

    #[inline]
    fn key(&self, lat: f64, lon: f64) -> u64 {
        if !is_valid_coordinate(lat, lon) {
            return INVALID_KEY;
        }
        self.row(lat) * self.n_cols + self.col(lon)
    }

    /// Number of columns on each side of the query column that can hold a
    /// point within the radius, or `None` when the whole row must be scanned.
    fn column_reach(&self, lat: f64) -> Option<u64> {
        if self.radius_m >= std::f64::consts::PI * EARTH_RADIUS_M {
            return None;
        }

        // Any point within the radius lies at |latitude| <= phi_max.
        let phi_max = (lat.abs() + self.radius_deg).min(90.0);
        let cos_phi = phi_max.to_radians().cos();
        if cos_phi <= 0.0 {
            return None;
        }

        // From the haversine formula: sin(d / 2R) >= cos(phi_max) * sin(dlon / 2).
        let ratio = (self.radius_m / (2.0 * EARTH_RADIUS_M)).sin() / cos_phi;
        if ratio >= 1.0 {
            return None;
        }
        let dlon = 2.0 * ratio.asin().to_degrees();
        let reach = (dlon * (1.0 + 1e-9) / self.lon_cell).ceil() as u64;

        if 2 * reach + 1 >= self.n_cols {
            None
        } else {
            Some(reach)
        }
    }

    /// Key ranges (half-open) a query at `(lat, lon)` must scan.
    fn candidate_ranges(&self, lat: f64, lon: f64, out: &mut Vec<Range<u64>>) {
        out.clear();

        let row = self.row(lat);
        let first_row = row.saturating_sub(1);
        let last_row = (row + 1).min(self.n_rows - 1);
        let reach = self.column_reach(lat);
        let col = self.col(lon);

        for r in first_row..=last_row {
            let base = r * self.n_cols;
            match reach {
                None => out.push(base..base + self.n_cols),
                Some(reach) => {
                    let lo = col as i64 - reach as i64;
                    let hi = col + reach;
                    if lo < 0 {
                        out.push(base..base + hi + 1);
                        out.push(base + (self.n_cols as i64 + lo) as u64..base + self.n_cols);
                    } else if hi >= self.n_cols {
                        out.push(base + lo as u64..base + self.n_cols);
                        out.push(base..base + (hi - self.n_cols) + 1);
                    } else {
                        out.push(base + lo as u64..base + hi + 1);
                    }
                }
            }
        }
    }
}

/// A reference point set reordered into spatial buckets.
///
/// Building the index consumes the caller's point set. Correspondences
/// returned by [`SpatialIndex::query`] always refer to the original ordering,
/// and [`SpatialIndex::into_points`] hands the points back in that ordering.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    layout: CellLayout,
    /// Sorted cell keys of the indexable points.
    keys: Vec<u64>,
    /// Latitudes in bucket order; unindexable points trail the indexed ones.
    lat: Vec<f64>,
    /// Longitudes in bucket order, as supplied by the caller.
    lon: Vec<f64>,
    /// Original position of each reordered point.
    original: Vec<u32>,
}

impl SpatialIndex {
    /// Partition `reference` into buckets sized for `max_radius_m`.
    pub fn build(reference: PointSet, max_radius_m: f64) -> Result<Self> {
        if !max_radius_m.is_finite() || max_radius_m <= 0.0 {
            return Err(ResampleError::InvalidRadius(max_radius_m));
        }
        if reference.is_empty() {
            return Err(ResampleError::EmptyInput("reference point set"));
        }
        let n = reference.len();
        if n > i32::MAX as usize {
            return Err(ResampleError::TooManyPoints(n));
        }

        let layout = CellLayout::new(max_radius_m);
        let (src_lat, src_lon) = reference.into_parts();

        let mut all_keys = filled("cell keys", n, INVALID_KEY)?;
        all_keys
            .par_iter_mut()
            .zip(src_lat.par_iter().zip(src_lon.par_iter()))
            .for_each(|(key, (&lat, &lon))| *key = layout.key(lat, lon));

        let mut order = filled("reference ordering", n, 0u32)?;
        order
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, slot)| *slot = i as u32);
        // Stable sort keeps equal-key points in original order.
        order.par_sort_by_key(|&i| all_keys[i as usize]);

        let mut lat = filled("reordered latitudes", n, 0.0f64)?;
        let mut lon = filled("reordered longitudes", n, 0.0f64)?;
        lat.par_iter_mut()
            .zip(lon.par_iter_mut())
            .zip(order.par_iter())
            .for_each(|((la, lo), &i)| {
                *la = src_lat[i as usize];
                *lo = src_lon[i as usize];
            });

        let indexed = order.partition_point(|&i| all_keys[i as usize] != INVALID_KEY);
        let mut keys = filled("sorted cell keys", indexed, 0u64)?;
        keys.par_iter_mut()
            .zip(order[..indexed].par_iter())
            .for_each(|(key, &i)| *key = all_keys[i as usize]);

        tracing::debug!(
            points = n,
            indexed,
            skipped = n - indexed,
            radius_m = max_radius_m,
            rows = layout.n_rows,
            cols = layout.n_cols,
            "Built spatial index"
        );

        Ok(Self {
            layout,
            keys,
            lat,
            lon,
            original: order,
        })
    }

    /// Total number of reference points, indexable or not.
    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    /// Number of points with usable coordinates.
    pub fn indexed_len(&self) -> usize {
        self.keys.len()
    }

    pub fn max_radius_m(&self) -> f64 {
        self.layout.radius_m
    }

    /// Nearest indexed point within the radius of `(lat, lon)`, as
    /// `(original index, distance in meters)`.
    pub fn nearest(&self, lat: f64, lon: f64) -> Option<(usize, f64)> {
        let mut ranges = Vec::with_capacity(6);
        self.nearest_with(lat, lon, &mut ranges)
    }

    fn nearest_with(
        &self,
        lat: f64,
        lon: f64,
        ranges: &mut Vec<Range<u64>>,
    ) -> Option<(usize, f64)> {
        if !is_valid_coordinate(lat, lon) {
            return None;
        }

        self.layout.candidate_ranges(lat, lon, ranges);

        let mut best: Option<(usize, f64)> = None;
        for range in ranges.iter() {
            let start = self.keys.partition_point(|&k| k < range.start);
            let end = start + self.keys[start..].partition_point(|&k| k < range.end);

            for slot in start..end {
                let plat = self.lat[slot];
                if (plat - lat).abs() > self.layout.lat_cell {
                    continue;
                }
                let d = haversine_distance(lat, lon, plat, self.lon[slot]);
                if d > self.layout.radius_m {
                    continue;
                }
                // Equal distances resolve to the lowest original index.
                let index = self.original[slot] as usize;
                if best.map_or(true, |(bi, bd)| d < bd || (d == bd && index < bi)) {
                    best = Some((index, d));
                }
            }
        }
        best
    }

    /// Match every query point against the index.
    pub fn query(&self, queries: &PointSet, with_distances: bool) -> Result<Correspondence> {
        if queries.is_empty() {
            return Err(ResampleError::EmptyInput("query point set"));
        }
        let m = queries.len();
        let mut indices = filled("correspondence", m, UNMATCHED)?;

        let distances = if with_distances {
            let mut distances = filled("match distances", m, UNMATCHED_DISTANCE)?;
            indices
                .par_iter_mut()
                .zip(distances.par_iter_mut())
                .enumerate()
                .for_each_init(
                    || Vec::with_capacity(6),
                    |ranges, (q, (slot, dist))| {
                        let (lat, lon) = (queries.lat()[q], queries.lon()[q]);
                        if let Some((i, d)) = self.nearest_with(lat, lon, ranges) {
                            *slot = i as i32;
                            *dist = d;
                        }
                    },
                );
            Some(distances)
        } else {
            indices.par_iter_mut().enumerate().for_each_init(
                || Vec::with_capacity(6),
                |ranges, (q, slot)| {
                    let (lat, lon) = (queries.lat()[q], queries.lon()[q]);
                    if let Some((i, _)) = self.nearest_with(lat, lon, ranges) {
                        *slot = i as i32;
                    }
                },
            );
            None
        };

        Ok(Correspondence::new(indices, distances, self.len()))
    }

    /// Return the reference points in their original order.
    pub fn into_points(self) -> PointSet {
        let n = self.original.len();
        let mut lat = vec![0.0; n];
        let mut lon = vec![0.0; n];
        for (slot, &i) in self.original.iter().enumerate() {
            lat[i as usize] = self.lat[slot];
            lon[i as usize] = self.lon[slot];
        }
        PointSet::from_pairs(lat.into_iter().zip(lon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_points(n: usize, step: f64) -> PointSet {
        let mut pairs = Vec::new();
        for r in 0..n {
            for c in 0..n {
                pairs.push((r as f64 * step, c as f64 * step));
            }
        }
        PointSet::from_pairs(pairs)
    }

    #[test]
    fn test_layout_covers_radius() {
        let layout = CellLayout::new(1000.0);
        assert!(layout.lat_cell >= layout.radius_deg - 1e-15);
        assert!(layout.lon_cell <= layout.lat_cell + 1e-15);
        assert_eq!(layout.row(-90.0), 0);
        assert_eq!(layout.row(90.0), layout.n_rows - 1);
        assert_eq!(layout.col(180.0), 0);
    }

    #[test]
    fn test_column_reach_grows_toward_pole() {
        let layout = CellLayout::new(1000.0);
        let equator = layout.column_reach(0.0).unwrap();
        let high = layout.column_reach(80.0).unwrap();
        assert!(equator >= 1);
        assert!(high > equator);
        assert_eq!(layout.column_reach(89.999), None);
    }

    #[test]
    fn test_build_rejects_bad_input() {
        assert!(matches!(
            SpatialIndex::build(PointSet::default(), 1000.0),
            Err(ResampleError::EmptyInput(_))
        ));
        assert!(matches!(
            SpatialIndex::build(grid_points(2, 1.0), 0.0),
            Err(ResampleError::InvalidRadius(_))
        ));
        assert!(matches!(
            SpatialIndex::build(grid_points(2, 1.0), f64::NAN),
            Err(ResampleError::InvalidRadius(_))
        ));
    }

    #[test]
    fn test_nearest_returns_original_index() {
        let points = grid_points(10, 0.01);
        let index = SpatialIndex::build(points.clone(), 2000.0).unwrap();
        for (i, (lat, lon)) in points.iter().enumerate() {
            let (found, d) = index.nearest(lat, lon).unwrap();
            assert_eq!(found, i);
            assert_eq!(d, 0.0);
        }
    }

    #[test]
    fn test_invalid_reference_points_are_skipped() {
        let points = PointSet::from_pairs([(-999.0, -999.0), (10.0, 10.0), (f64::NAN, 0.0)]);
        let index = SpatialIndex::build(points, 5000.0).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.indexed_len(), 1);
        assert_eq!(index.nearest(10.0, 10.0).map(|(i, _)| i), Some(1));
        assert_eq!(index.nearest(-999.0, -999.0), None);
    }

    #[test]
    fn test_matches_across_antimeridian() {
        let points = PointSet::from_pairs([(0.0, 179.999), (0.0, 0.0)]);
        let index = SpatialIndex::build(points, 500.0).unwrap();
        let (found, d) = index.nearest(0.0, -179.999).unwrap();
        assert_eq!(found, 0);
        assert!(d < 300.0);
    }

    #[test]
    fn test_matches_near_pole() {
        let points = PointSet::from_pairs([(89.995, 0.0), (89.995, 120.0)]);
        let index = SpatialIndex::build(points, 2000.0).unwrap();
        // Across the pole from the first point, within 1.2 km.
        let (found, _) = index.nearest(89.995, 180.0).unwrap();
        assert!(found == 0 || found == 1);
        assert!(index.nearest(89.0, 0.0).is_none());
    }

    #[test]
    fn test_into_points_restores_order() {
        let points = PointSet::from_pairs([(5.0, 5.0), (-999.0, -999.0), (0.0, 0.0), (5.0, -5.0)]);
        let index = SpatialIndex::build(points.clone(), 1000.0).unwrap();
        assert_eq!(index.into_points(), points);
    }
}
