//! User-defined geographic output grids.
//!
//! Only regular lat/lon grids (EPSG:4326) are generated here. Projected output
//! grids need a coordinate transform and are produced by the caller.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::{GridError, GridResult};
use crate::geo::METERS_PER_DEGREE;
use crate::points::PointSet;

/// Slack for extents that are an exact multiple of the cell size.
const EXTENT_EPSILON: f64 = 1e-9;

/// A regular lat/lon grid covering `bbox` with square cells.
///
/// Cells are laid out row-major starting at the north-west corner: row 0 is
/// the northernmost row and columns increase eastward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserGrid {
    pub bbox: BoundingBox,
    /// Cell edge length in degrees.
    pub cell_size_deg: f64,
}

impl UserGrid {
    pub fn new(bbox: BoundingBox, cell_size_deg: f64) -> GridResult<Self> {
        if !cell_size_deg.is_finite() || cell_size_deg <= 0.0 {
            return Err(GridError::InvalidCellSize(cell_size_deg));
        }
        if !bbox.is_valid() {
            return Err(GridError::InvalidExtent(format!("{:?}", bbox)));
        }
        if bbox.min_y < -90.0 || bbox.max_y > 90.0 {
            return Err(GridError::InvalidExtent(format!(
                "latitude range {}..{} exceeds [-90, 90]",
                bbox.min_y, bbox.max_y
            )));
        }
        Ok(Self {
            bbox,
            cell_size_deg,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        (self.bbox.width() / self.cell_size_deg - EXTENT_EPSILON)
            .ceil()
            .max(1.0) as usize
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        (self.bbox.height() / self.cell_size_deg - EXTENT_EPSILON)
            .ceil()
            .max(1.0) as usize
    }

    /// Total number of cells, or an error when it does not fit in `usize`.
    pub fn cell_count(&self) -> GridResult<usize> {
        let (width, height) = (self.width(), self.height());
        width
            .checked_mul(height)
            .ok_or(GridError::TooManyCells { width, height })
    }

    /// Latitude of the grid's northern edge.
    ///
    /// The row count is rounded up, so the edge sits `height * cell_size_deg`
    /// above `min_y` and may lie north of `bbox.max_y`.
    pub fn top(&self) -> f64 {
        self.bbox.min_y + self.height() as f64 * self.cell_size_deg
    }

    /// Approximate cell size in meters (along a meridian).
    pub fn cell_size_meters(&self) -> f64 {
        self.cell_size_deg * METERS_PER_DEGREE
    }

    /// Center of cell `(col, row)` as `(lat, lon)`.
    pub fn cell_center(&self, col: usize, row: usize) -> Option<(f64, f64)> {
        if col >= self.width() || row >= self.height() {
            return None;
        }
        let lon = self.bbox.min_x + (col as f64 + 0.5) * self.cell_size_deg;
        let lat = self.top() - (row as f64 + 0.5) * self.cell_size_deg;
        Some((lat, lon))
    }

    /// Generate the cell-center point set in row-major order.
    pub fn points(&self) -> GridResult<PointSet> {
        let width = self.width();
        let height = self.height();
        let total = self.cell_count()?;
        let top = self.top();

        let mut lat = Vec::new();
        let mut lon = Vec::new();
        lat.try_reserve_exact(total)
            .map_err(|_| GridError::AllocationFailure(total))?;
        lon.try_reserve_exact(total)
            .map_err(|_| GridError::AllocationFailure(total))?;

        for row in 0..height {
            let cell_lat = top - (row as f64 + 0.5) * self.cell_size_deg;
            for col in 0..width {
                lat.push(cell_lat);
                lon.push(self.bbox.min_x + (col as f64 + 0.5) * self.cell_size_deg);
            }
        }

        PointSet::new(lat, lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_dimensions() {
        let grid = UserGrid::new(BoundingBox::new(-10.0, 0.0, 10.0, 5.0), 0.5).unwrap();
        assert_eq!(grid.width(), 40);
        assert_eq!(grid.height(), 10);
        assert_eq!(grid.cell_count().unwrap(), 400);
    }

    #[test]
    fn test_inexact_extent_rounds_up() {
        let grid = UserGrid::new(BoundingBox::new(0.0, 0.0, 0.7, 0.3), 0.1).unwrap();
        assert_eq!(grid.width(), 7);
        assert_eq!(grid.height(), 3);

        let grid = UserGrid::new(BoundingBox::new(0.0, 0.0, 1.05, 1.0), 0.5).unwrap();
        assert_eq!(grid.width(), 3);
    }

    #[test]
    fn test_inexact_extent_widens_northward() {
        // 0.3 degrees of latitude need two 0.2 degree rows, so the top edge
        // moves up to 0.4.
        let grid = UserGrid::new(BoundingBox::new(0.0, 0.0, 0.2, 0.3), 0.2).unwrap();
        assert_eq!(grid.height(), 2);
        assert!((grid.top() - 0.4).abs() < 1e-12);

        let points = grid.points().unwrap();
        assert!((points.lat()[0] - 0.3).abs() < 1e-12);
        assert!((points.lat()[1] - 0.1).abs() < 1e-12);
        assert_eq!(grid.cell_center(0, 0), points.get(0));
    }

    #[test]
    fn test_cell_count_overflow_is_an_error() {
        let grid = UserGrid::new(BoundingBox::new(-180.0, -90.0, 180.0, 90.0), 1e-9).unwrap();
        assert!(matches!(
            grid.cell_count(),
            Err(GridError::TooManyCells { .. })
        ));
        assert!(matches!(
            grid.points(),
            Err(GridError::TooManyCells { .. })
        ));
    }

    #[test]
    fn test_points_start_north_west() {
        let grid = UserGrid::new(BoundingBox::new(0.0, 0.0, 2.0, 2.0), 1.0).unwrap();
        let points = grid.points().unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(points.get(0), Some((1.5, 0.5)));
        assert_eq!(points.get(1), Some((1.5, 1.5)));
        assert_eq!(points.get(2), Some((0.5, 0.5)));
        assert_eq!(grid.cell_center(1, 1), Some((0.5, 1.5)));
        assert_eq!(grid.cell_center(2, 0), None);
    }

    #[test]
    fn test_rejects_bad_cell_size() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert!(matches!(
            UserGrid::new(bbox, 0.0),
            Err(GridError::InvalidCellSize(_))
        ));
        assert!(UserGrid::new(bbox, f64::NAN).is_err());
    }

    #[test]
    fn test_rejects_latitude_overflow() {
        let bbox = BoundingBox::new(0.0, 80.0, 1.0, 95.0);
        assert!(matches!(
            UserGrid::new(bbox, 1.0),
            Err(GridError::InvalidExtent(_))
        ));
    }
}
