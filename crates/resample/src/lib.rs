//! Swath-to-grid resampling.
//!
//! This crate carries values measured on one instrument's swath onto another
//! point set (a second instrument's swath or a user-defined grid). It provides:
//!
//! - **Matching**: nearest source cell within a great-circle radius, through a
//!   bucketed spatial index or exhaustive search
//! - **Aggregation**: single-value gather, or mean / standard deviation /
//!   count reduction when many source cells fall on one target cell
//! - **Clipping**: propagate coverage holes between resampled arrays
//!
//! # Architecture
//!
//! ```text
//! source lat/lon/values      target lat/lon
//!          │                       │
//!          └──────────┬────────────┘
//!                     ▼
//!        matcher::nearest_neighbor(reference, queries, radius)
//!                     │
//!                     ├─► Indexed: sort reference into lat/lon cells,
//!                     │            scan the 3×k neighbourhood per query
//!                     │
//!                     └─► BruteForce: scan every reference point
//!                     │
//!                     ▼
//!               Correspondence (i32, -1 = unmatched)
//!                     │
//!          ┌──────────┴───────────┐
//!          ▼                      ▼
//!   aggregate::gather     aggregate::summarize
//!          │                      │
//!          └──────────┬───────────┘
//!                     ▼
//!            clip::clip (optional)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use resample::{Instrument, ResampleConfig, ResampleMethod, Resampler, SwathField};
//!
//! let config = ResampleConfig {
//!     method: ResampleMethod::Summary,
//!     ..Default::default()
//! }
//! .with_default_radius(Instrument::Misr.default_radius("L")?);
//!
//! let resampler = Resampler::new(config)?;
//! let result = resampler.run(SwathField::new(source_points, radiance)?, target_points)?;
//! ```

mod buffer;

pub mod aggregate;
pub mod clip;
pub mod config;
pub mod correspondence;
pub mod error;
pub mod matcher;
pub mod pipeline;
pub mod radius;

// Re-export commonly used types at crate root
pub use aggregate::{gather, summarize, summarize_no_sd, Summary};
pub use clip::clip;
pub use config::{ResampleConfig, ResampleMethod};
pub use correspondence::{Correspondence, UNMATCHED};
pub use error::{ResampleError, Result};
pub use matcher::{
    nearest_neighbor, MatchOptions, MatchOutcome, MatchStrategy, ReferenceLayout, SpatialIndex,
};
pub use pipeline::{MatchStats, ResamplePlan, ResampleResult, ResampledField, Resampler, SwathField};
pub use radius::{radius_for_cell_size, user_grid_radius, Instrument};
