//! Swath fusion tool
//!
//! Resamples one instrument's swath values onto another swath or a
//! user-defined grid, as described by a YAML job file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use fusion_tool::{run_job, JobFile};

#[derive(Parser, Debug)]
#[command(name = "fusion-tool")]
#[command(about = "Resample swath arrays onto another instrument's grid")]
struct Args {
    /// Job file path
    #[arg(short, long, env = "FUSION_JOB")]
    job: PathBuf,

    /// Override the job's output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit JSON logs
    #[arg(long, env = "FUSION_JSON_LOGS")]
    json_logs: bool,

    /// Number of worker threads (default: one per core)
    #[arg(long, env = "FUSION_THREADS")]
    threads: Option<usize>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);
    if args.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    info!(job = ?args.job, "Starting fusion tool");

    let mut job = JobFile::load(&args.job)?;
    if let Some(dir) = args.output_dir {
        job.output.dir = dir;
    }

    let summary = run_job(&job)?;
    info!(
        job = %summary.job,
        method = %summary.match_stats.method,
        matched = summary.match_stats.matched,
        covered = summary.covered_cells,
        clipped = summary.clipped_cells,
        output = ?job.output.dir,
        "Done"
    );

    Ok(())
}
