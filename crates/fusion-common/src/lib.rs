//! Common types shared across the swath fusion crates.
//!
//! - [`Sample`] and [`NODATA`]: the nodata convention used by every array
//! - [`PointSet`]: parallel latitude/longitude arrays describing a swath
//! - [`geo`]: great-circle distance helpers
//! - [`BoundingBox`] and [`UserGrid`]: user-defined geographic output grids

pub mod bbox;
pub mod error;
pub mod geo;
pub mod grid;
pub mod nodata;
pub mod points;

pub use bbox::{BboxParseError, BoundingBox};
pub use error::{GridError, GridResult};
pub use geo::{haversine_distance, EARTH_RADIUS_M, METERS_PER_DEGREE};
pub use grid::UserGrid;
pub use nodata::{Sample, NODATA};
pub use points::PointSet;
