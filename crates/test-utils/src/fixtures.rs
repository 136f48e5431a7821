//! Resampling scenarios with known answers.

use fusion_common::{PointSet, NODATA};

/// Four source cells on the corners of a one-degree square.
pub mod square {
    use super::*;

    /// `(0,0), (0,1), (1,0), (1,1)` as `(lat, lon)`.
    pub fn points() -> PointSet {
        PointSet::from_pairs([(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)])
    }

    pub const VALUES: [f64; 4] = [10.0, 20.0, 30.0, 40.0];

    /// A target near the first corner; matched to index 0 with a large radius.
    pub const NEAR_ORIGIN: (f64, f64) = (0.1, 0.1);

    /// A target far from every corner.
    pub const FAR_AWAY: (f64, f64) = (10.0, 10.0);

    /// Radius that reaches `NEAR_ORIGIN` from `(0, 0)` (about 15.7 km).
    pub const LARGE_RADIUS_M: f64 = 50_000.0;

    pub const SMALL_RADIUS_M: f64 = 1000.0;
}

/// Four source cells clustered on one target cell, one of them missing.
pub mod single_bin {
    use super::*;

    pub fn source_points() -> PointSet {
        PointSet::from_pairs([(0.0, 0.0), (0.0, 0.001), (0.001, 0.0), (0.001, 0.001)])
    }

    pub fn target_points() -> PointSet {
        PointSet::from_pairs([(0.0005, 0.0005)])
    }

    pub const VALUES: [f64; 4] = [1.0, 2.0, 3.0, NODATA];

    pub const RADIUS_M: f64 = 1000.0;

    pub const EXPECTED_COUNT: u32 = 3;
    pub const EXPECTED_MEAN: f64 = 2.0;
    /// Population standard deviation of `[1, 2, 3]`.
    pub const EXPECTED_SD: f64 = 0.816496580927726;
}

/// Clipping one array against a companion with a hole.
pub mod clip {
    use super::*;

    pub const VALUES: [f64; 3] = [1.0, 2.0, 3.0];
    pub const MASK: [f64; 3] = [1.0, NODATA, 3.0];
    pub const EXPECTED: [f64; 3] = [1.0, NODATA, 3.0];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_shapes() {
        assert_eq!(square::points().len(), square::VALUES.len());
        assert_eq!(single_bin::source_points().len(), single_bin::VALUES.len());
        assert_eq!(clip::VALUES.len(), clip::MASK.len());
    }
}
