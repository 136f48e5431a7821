//! Exhaustive nearest-neighbor search.
//!
//! O(N·M) distance evaluations. Suited to single granules or point sets
//! without useful spatial locality; gives the same answers as the index.

use rayon::prelude::*;

use fusion_common::geo::{haversine_distance, is_valid_coordinate, meters_to_degrees};
use fusion_common::PointSet;

use crate::buffer::filled;
use crate::correspondence::{Correspondence, UNMATCHED, UNMATCHED_DISTANCE};
use crate::error::{ResampleError, Result};

fn nearest(reference: &PointSet, lat: f64, lon: f64, radius_m: f64, radius_deg: f64) -> Option<(usize, f64)> {
    if !is_valid_coordinate(lat, lon) {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for (i, (rlat, rlon)) in reference.iter().enumerate() {
        if !is_valid_coordinate(rlat, rlon) || (rlat - lat).abs() > radius_deg {
            continue;
        }
        let d = haversine_distance(lat, lon, rlat, rlon);
        if d <= radius_m && best.map_or(true, |(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best
}

/// Match every query point against every reference point.
pub fn match_points(
    reference: &PointSet,
    queries: &PointSet,
    max_radius_m: f64,
    with_distances: bool,
) -> Result<Correspondence> {
    if !max_radius_m.is_finite() || max_radius_m <= 0.0 {
        return Err(ResampleError::InvalidRadius(max_radius_m));
    }
    if reference.is_empty() {
        return Err(ResampleError::EmptyInput("reference point set"));
    }
    if queries.is_empty() {
        return Err(ResampleError::EmptyInput("query point set"));
    }
    if reference.len() > i32::MAX as usize {
        return Err(ResampleError::TooManyPoints(reference.len()));
    }

    let radius_deg = meters_to_degrees(max_radius_m) * (1.0 + 1e-9);
    let m = queries.len();
    let mut indices = filled("correspondence", m, UNMATCHED)?;

    let distances = if with_distances {
        let mut distances = filled("match distances", m, UNMATCHED_DISTANCE)?;
        indices
            .par_iter_mut()
            .zip(distances.par_iter_mut())
            .enumerate()
            .for_each(|(q, (slot, dist))| {
                let (lat, lon) = (queries.lat()[q], queries.lon()[q]);
                if let Some((i, d)) = nearest(reference, lat, lon, max_radius_m, radius_deg) {
                    *slot = i as i32;
                    *dist = d;
                }
            });
        Some(distances)
    } else {
        indices.par_iter_mut().enumerate().for_each(|(q, slot)| {
            let (lat, lon) = (queries.lat()[q], queries.lon()[q]);
            if let Some((i, _)) = nearest(reference, lat, lon, max_radius_m, radius_deg) {
                *slot = i as i32;
            }
        });
        None
    };

    Ok(Correspondence::new(indices, distances, reference.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_radius_counts_as_within() {
        let reference = PointSet::from_pairs([(0.0, 0.0)]);
        let query = PointSet::from_pairs([(0.0, 0.01)]);
        let d = haversine_distance(0.0, 0.0, 0.0, 0.01);

        let c = match_points(&reference, &query, d, true).unwrap();
        assert_eq!(c.get(0), Some(0));
        assert_eq!(c.distance(0), Some(d));

        let c = match_points(&reference, &query, d * 0.999, false).unwrap();
        assert_eq!(c.get(0), None);
    }

    #[test]
    fn test_empty_sets_are_errors() {
        let points = PointSet::from_pairs([(0.0, 0.0)]);
        assert!(matches!(
            match_points(&PointSet::default(), &points, 10.0, false),
            Err(ResampleError::EmptyInput(_))
        ));
        assert!(matches!(
            match_points(&points, &PointSet::default(), 10.0, false),
            Err(ResampleError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_picks_closest() {
        let reference = PointSet::from_pairs([(0.0, 0.0), (0.0, 0.005), (0.0, 0.02)]);
        let query = PointSet::from_pairs([(0.0, 0.006), (0.0, 0.019), (0.0, 0.5)]);
        let c = match_points(&reference, &query, 5000.0, false).unwrap();
        assert_eq!(c.as_raw(), &[1, 2, UNMATCHED]);
    }
}
