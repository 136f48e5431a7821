//! Batch resampling driver.
//!
//! Reads a YAML job describing a source field and a target grid as raw
//! little-endian arrays, runs the resampler, and writes the resampled arrays
//! plus a `summary.json` next to them.

pub mod io;
pub mod job;
pub mod run;

pub use job::JobFile;
pub use run::{run_job, RunSummary};
