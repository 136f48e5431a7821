//! Job files.
//!
//! ```yaml
//! name: misr-onto-modis
//! source:
//!   instrument: misr
//!   resolution: L
//!   geolocation:
//!     lat: misr_lat.f64
//!     lon: misr_lon.f64
//!     unstack: L
//!   values: misr_df_red.f64
//!   channel: { camera: DF, band: Red }
//! target:
//!   kind: swath
//!   instrument: modis
//!   resolution: 1KM
//!   geolocation: { lat: modis_lat.f64, lon: modis_lon.f64, width: 1354 }
//! resample:
//!   method: summary
//! output:
//!   dir: out/
//! ```
//!
//! Relative paths are resolved against the job file's directory.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use fusion_common::{BoundingBox, UserGrid};
use misr::{Band, Camera, MisrResolution};
use resample::{user_grid_radius, Instrument, ResampleConfig};

/// A complete resampling job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFile {
    #[serde(default)]
    pub name: Option<String>,
    pub source: SourceSpec,
    pub target: TargetSpec,
    /// Without a `resample` section the `FUSION_*` environment is used.
    #[serde(default = "ResampleConfig::from_env")]
    pub resample: ResampleConfig,
    /// Companion array on the target grid; resampled cells are blanked
    /// wherever it holds the fill value.
    #[serde(default)]
    pub clip_mask: Option<PathBuf>,
    pub output: OutputSpec,
}

/// Latitude/longitude arrays of a swath.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geolocation {
    pub lat: PathBuf,
    pub lon: PathBuf,
    /// Raster width, recorded in the summary.
    #[serde(default)]
    pub width: Option<usize>,
    /// The arrays are 180-block stacks to unstack first.
    #[serde(default)]
    pub unstack: Option<MisrResolution>,
}

/// Camera and band of a block-stacked radiance channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub camera: Camera,
    pub band: Band,
}

/// The field being resampled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    pub instrument: Instrument,
    #[serde(default)]
    pub resolution: Option<String>,
    pub geolocation: Geolocation,
    pub values: PathBuf,
    /// Values are the channel's native block stack; it is brought to the
    /// geolocation's resolution before unstacking.
    #[serde(default)]
    pub channel: Option<ChannelSpec>,
}

/// The grid values are resampled onto.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetSpec {
    /// Another instrument's swath.
    Swath {
        instrument: Instrument,
        #[serde(default)]
        resolution: Option<String>,
        geolocation: Geolocation,
    },
    /// A regular lat/lon grid.
    Grid {
        /// `min_lon,min_lat,max_lon,max_lat`
        bbox: String,
        cell_size_deg: f64,
    },
}

/// Where results go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSpec {
    pub dir: PathBuf,
    /// Also write the correspondence array.
    #[serde(default)]
    pub write_correspondence: bool,
    /// Also write the target latitude/longitude arrays.
    #[serde(default)]
    pub write_geolocation: bool,
}

impl JobFile {
    /// Load and validate a job from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file: {:?}", path))?;
        let mut job: JobFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse job file: {:?}", path))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        job.resolve_paths(base);
        job.validate()?;
        Ok(job)
    }

    /// Make every relative path relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };

        resolve(&mut self.source.geolocation.lat);
        resolve(&mut self.source.geolocation.lon);
        resolve(&mut self.source.values);
        if let TargetSpec::Swath { geolocation, .. } = &mut self.target {
            resolve(&mut geolocation.lat);
            resolve(&mut geolocation.lon);
        }
        if let Some(mask) = &mut self.clip_mask {
            resolve(mask);
        }
        resolve(&mut self.output.dir);
    }

    /// Check the job for contradictions before any array is read.
    pub fn validate(&self) -> Result<()> {
        if let Some(radius) = self.resample.max_radius_m {
            if !radius.is_finite() || radius <= 0.0 {
                bail!("resample.max_radius_m must be > 0, got {}", radius);
            }
        }

        if let Some(channel) = &self.source.channel {
            let Some(resolution) = self.source.geolocation.unstack else {
                bail!("source.channel requires source.geolocation.unstack");
            };
            misr::ChannelPlan::new(channel.camera, channel.band, resolution)
                .context("source channel cannot be served")?;
        }

        if let Some(grid) = self.user_grid()? {
            grid.cell_count().context("Invalid target grid")?;
        }

        self.radius_m()?;
        Ok(())
    }

    /// The user-defined target grid, if the target is one.
    pub fn user_grid(&self) -> Result<Option<UserGrid>> {
        match &self.target {
            TargetSpec::Grid {
                bbox,
                cell_size_deg,
            } => {
                let bbox = BoundingBox::parse(bbox)
                    .with_context(|| format!("Invalid target bbox: {}", bbox))?;
                let grid = UserGrid::new(bbox, *cell_size_deg).context("Invalid target grid")?;
                Ok(Some(grid))
            }
            TargetSpec::Swath { .. } => Ok(None),
        }
    }

    /// Search radius for this job.
    ///
    /// An explicit `resample.max_radius_m` wins. Otherwise the larger of the
    /// source's and target's default radii is used, so the coarser grid's
    /// footprint sets the cutoff.
    pub fn radius_m(&self) -> Result<f64> {
        if let Some(radius) = self.resample.max_radius_m {
            return Ok(radius);
        }

        let source = default_radius(self.source.instrument, self.source.resolution.as_deref())?;
        let target = match &self.target {
            TargetSpec::Swath {
                instrument,
                resolution,
                ..
            } => default_radius(*instrument, resolution.as_deref())?,
            TargetSpec::Grid { .. } => match self.user_grid()? {
                Some(grid) => Some(user_grid_radius(&grid)?),
                None => None,
            },
        };

        match (source, target) {
            (Some(s), Some(t)) => Ok(s.max(t)),
            (Some(r), None) | (None, Some(r)) => Ok(r),
            (None, None) => bail!(
                "no search radius: set resample.max_radius_m or give an instrument resolution"
            ),
        }
    }

    /// Display name for logs and the summary.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| "unnamed".to_string())
    }
}

fn default_radius(instrument: Instrument, resolution: Option<&str>) -> Result<Option<f64>> {
    match resolution {
        Some(label) => Ok(Some(instrument.default_radius(label)?)),
        None => Ok(None),
    }
}
