//! Executing a job.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use fusion_common::{PointSet, NODATA};
use misr::{final_image_size, unstack_values, ChannelPlan};
use resample::clip::{clip_counts, clipped_cells};
use resample::{clip, MatchStats, ResampleConfig, Resampler, SwathField};

use crate::io::{read_f64, read_f64_exact, write_array};
use crate::job::{Geolocation, JobFile, TargetSpec};

/// Recorded in `summary.json` next to the outputs.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub job: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub fill_value: f64,
    pub radius_m: f64,
    pub source: GridSummary,
    pub target: GridSummary,
    #[serde(rename = "match")]
    pub match_stats: MatchStats,
    /// Target cells holding data after resampling (and clipping).
    pub covered_cells: usize,
    /// Target cells blanked by the clip mask.
    pub clipped_cells: usize,
    pub outputs: Vec<String>,
}

/// Size and shape of one side of the run.
#[derive(Debug, Clone, Serialize)]
pub struct GridSummary {
    pub cells: usize,
    /// `(rows, cols)` when the raster width is known.
    pub shape: Option<(usize, usize)>,
}

impl GridSummary {
    fn new(cells: usize, width: Option<usize>) -> Self {
        let shape = width
            .filter(|&w| w > 0 && cells % w == 0)
            .map(|w| (cells / w, w));
        Self { cells, shape }
    }
}

/// A point set read from disk along with its raster width.
struct LoadedGeolocation {
    points: PointSet,
    width: Option<usize>,
}

fn load_geolocation(geo: &Geolocation) -> Result<LoadedGeolocation> {
    let lat = read_f64(&geo.lat)?;
    let lon = read_f64_exact(&geo.lon, lat.len())?;

    let (lat, lon, width) = match geo.unstack {
        Some(resolution) => {
            let lat = unstack_values(&lat, resolution)
                .with_context(|| format!("Failed to unstack {:?}", geo.lat))?;
            let lon = unstack_values(&lon, resolution)
                .with_context(|| format!("Failed to unstack {:?}", geo.lon))?;
            (lat, lon, Some(final_image_size(resolution).1))
        }
        None => (lat, lon, geo.width),
    };

    let points = PointSet::new(lat, lon).context("Geolocation arrays disagree")?;
    Ok(LoadedGeolocation { points, width })
}

fn load_source_values(job: &JobFile, expected: usize) -> Result<Vec<f64>> {
    let source = &job.source;
    let raw = read_f64(&source.values)?;

    let values = match (source.channel, source.geolocation.unstack) {
        (Some(channel), Some(resolution)) => {
            let plan = ChannelPlan::new(channel.camera, channel.band, resolution)?;
            info!(
                camera = %channel.camera,
                band = %channel.band,
                native = %plan.native,
                requested = %resolution,
                "Preparing block-stacked channel"
            );
            let prepared = plan.prepare(raw)?;
            unstack_values(&prepared, resolution)?
        }
        (None, Some(resolution)) => unstack_values(&raw, resolution)?,
        _ => raw,
    };

    if values.len() != expected {
        anyhow::bail!(
            "{:?}: expected {} values to match the source geolocation, found {}",
            source.values,
            expected,
            values.len()
        );
    }
    Ok(values)
}

fn load_target(job: &JobFile) -> Result<LoadedGeolocation> {
    match &job.target {
        TargetSpec::Swath { geolocation, .. } => load_geolocation(geolocation),
        TargetSpec::Grid { .. } => {
            let grid = job
                .user_grid()?
                .context("Grid target without a grid definition")?;
            info!(
                width = grid.width(),
                height = grid.height(),
                cell_size_deg = grid.cell_size_deg,
                "Generating target grid"
            );
            Ok(LoadedGeolocation {
                points: grid.points()?,
                width: Some(grid.width()),
            })
        }
    }
}

fn output_path(dir: &Path, name: &str, outputs: &mut Vec<String>) -> PathBuf {
    outputs.push(name.to_string());
    dir.join(name)
}

/// Run a job end to end and write its outputs.
pub fn run_job(job: &JobFile) -> Result<RunSummary> {
    let started_at = Utc::now();
    let name = job.display_name();
    let radius_m = job.radius_m()?;
    info!(job = %name, radius_m, method = %job.resample.method, "Starting job");

    let source_geo = load_geolocation(&job.source.geolocation)?;
    let source_values = load_source_values(job, source_geo.points.len())?;
    let target_geo = load_target(job)?;

    let source_summary = GridSummary::new(source_geo.points.len(), source_geo.width);
    let target_summary = GridSummary::new(target_geo.points.len(), target_geo.width);

    let config = ResampleConfig {
        max_radius_m: Some(radius_m),
        ..job.resample.clone()
    };
    let resampler = Resampler::new(config)?;
    let source = SwathField::new(source_geo.points, source_values)?;
    let result = resampler.run(source, target_geo.points)?;

    let mut field = result.field;
    let mut clipped = 0;
    if let Some(mask_path) = &job.clip_mask {
        let mask = read_f64_exact(mask_path, field.len())?;
        clipped = clipped_cells(&field.values, &mask);
        clip(&mut field.values, &mask)?;
        if let Some(sd) = field.sd.as_mut() {
            clip(sd, &mask)?;
        }
        if let Some(count) = field.count.as_mut() {
            clip_counts(count, &mask)?;
        }
        info!(clipped, "Applied clip mask");
    }

    let covered_cells = field.values.iter().filter(|&&v| v != NODATA).count();
    if covered_cells == 0 {
        warn!(job = %name, "No target cell received a value");
    }

    let dir = &job.output.dir;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;

    let mut outputs = Vec::new();
    write_array(&output_path(dir, "values.f64", &mut outputs), &field.values)?;
    if let Some(count) = &field.count {
        write_array(&output_path(dir, "count.u32", &mut outputs), count)?;
    }
    if let Some(sd) = &field.sd {
        write_array(&output_path(dir, "sd.f64", &mut outputs), sd)?;
    }
    if job.output.write_correspondence {
        let correspondence = result.plan.correspondence();
        write_array(
            &output_path(dir, "correspondence.i32", &mut outputs),
            correspondence.as_raw(),
        )?;
        if let Some(distances) = correspondence.distances_raw() {
            write_array(&output_path(dir, "distance.f64", &mut outputs), distances)?;
        }
    }
    if job.output.write_geolocation {
        let target = result.plan.target();
        write_array(&output_path(dir, "target_lat.f64", &mut outputs), target.lat())?;
        write_array(&output_path(dir, "target_lon.f64", &mut outputs), target.lon())?;
    }

    let summary = RunSummary {
        job: name,
        started_at,
        finished_at: Utc::now(),
        fill_value: NODATA,
        radius_m,
        source: source_summary,
        target: target_summary,
        match_stats: result.plan.stats().clone(),
        covered_cells,
        clipped_cells: clipped,
        outputs,
    };

    let summary_path = dir.join("summary.json");
    let json = serde_json::to_string_pretty(&summary).context("Failed to encode summary")?;
    std::fs::write(&summary_path, json)
        .with_context(|| format!("Failed to write: {:?}", summary_path))?;

    info!(
        job = %summary.job,
        covered = summary.covered_cells,
        target_cells = summary.target.cells,
        elapsed_ms = (summary.finished_at - summary.started_at).num_milliseconds(),
        "Job complete"
    );

    Ok(summary)
}
