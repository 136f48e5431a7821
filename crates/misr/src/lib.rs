//! Block-stack transforms for the multi-angle imager.
//!
//! The imager records each orbit as 180 along-track blocks, each block
//! starting at column 0 of its own array even though consecutive blocks drift
//! cross-track. This crate turns those stacks into rasters the resampler can
//! match against:
//!
//! - [`unstack`]: place every block at its lateral offset in one raster
//! - [`downsample_4x4`]: derive 1.1 km values from 275 m channels
//! - [`ChannelPlan`]: decide which of the two a camera/band request needs
//!
//! # Example
//!
//! ```ignore
//! use misr::{unstack_values, Band, Camera, ChannelPlan, MisrResolution};
//!
//! let plan = ChannelPlan::new(Camera::Df, Band::Red, MisrResolution::Low)?;
//! let stack = plan.prepare(native_red)?;
//! let raster = unstack_values(&stack, MisrResolution::Low)?;
//! ```

pub mod channel;
pub mod downsample;
pub mod error;
pub mod offsets;
pub mod resolution;
pub mod unstack;

// Re-export commonly used types at crate root
pub use channel::{native_resolution, Band, Camera, ChannelAction, ChannelPlan};
pub use downsample::{average_window, downsample_4x4, downsample_high_to_low};
pub use error::{MisrError, Result};
pub use offsets::{block_offset, BLOCK_OFFSETS};
pub use resolution::{MisrResolution, BLOCK_COUNT};
pub use unstack::{final_image_size, unstack, unstack_values, unstacked_position};
