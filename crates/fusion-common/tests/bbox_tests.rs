//! Tests for extent parsing and user-defined grid generation.

use fusion_common::{BboxParseError, BoundingBox, UserGrid};

// ============================================================================
// parse tests
// ============================================================================

#[test]
fn test_parse_integer_extent() {
    let bbox = BoundingBox::parse("0,0,100,80").unwrap();
    assert_eq!(bbox.min_x, 0.0);
    assert_eq!(bbox.min_y, 0.0);
    assert_eq!(bbox.max_x, 100.0);
    assert_eq!(bbox.max_y, 80.0);
}

#[test]
fn test_parse_negative_extent() {
    let bbox = BoundingBox::parse("-180,-90,180,90").unwrap();
    assert_eq!(bbox.width(), 360.0);
    assert_eq!(bbox.height(), 180.0);
}

#[test]
fn test_parse_too_few_parts() {
    let result = BoundingBox::parse("0,0,100");
    assert!(matches!(result, Err(BboxParseError::InvalidFormat(_))));
}

#[test]
fn test_parse_bad_number() {
    let result = BoundingBox::parse("0,abc,100,100");
    assert!(matches!(result, Err(BboxParseError::InvalidNumber(_))));
}

// ============================================================================
// UserGrid tests
// ============================================================================

#[test]
fn test_global_grid_points_stay_in_range() {
    let grid = UserGrid::new(BoundingBox::new(-180.0, -90.0, 180.0, 90.0), 10.0).unwrap();
    assert_eq!(grid.width(), 36);
    assert_eq!(grid.height(), 18);

    let points = grid.points().unwrap();
    assert_eq!(points.len(), 36 * 18);
    for (lat, lon) in points.iter() {
        assert!((-90.0..=90.0).contains(&lat));
        assert!((-180.0..=180.0).contains(&lon));
    }
}

#[test]
fn test_cell_size_meters() {
    let grid = UserGrid::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 0.01).unwrap();
    assert!((grid.cell_size_meters() - 1111.95).abs() < 0.1);
}
