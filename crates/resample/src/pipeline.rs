//! Resampling a source field onto a target point set.
//!
//! A run has two halves. Planning matches the geometries once and keeps the
//! correspondence; applying it carries any number of value arrays that share
//! the source geometry (bands, cameras) onto the target grid.
//!
//! ```text
//! Nearest:  target cells ──match──▶ source cells   then gather
//! Summary:  source cells ──match──▶ target cells   then mean / sd / count
//! ```

use serde::Serialize;
use std::time::Instant;

use fusion_common::PointSet;

use crate::aggregate::{gather, summarize, summarize_no_sd};
use crate::config::{ResampleConfig, ResampleMethod};
use crate::correspondence::Correspondence;
use crate::error::{ResampleError, Result};
use crate::matcher::{nearest_neighbor, MatchStrategy};

/// Values on a swath geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct SwathField {
    pub points: PointSet,
    pub values: Vec<f64>,
}

impl SwathField {
    pub fn new(points: PointSet, values: Vec<f64>) -> Result<Self> {
        if points.len() != values.len() {
            return Err(ResampleError::length_mismatch(
                "field values",
                points.len(),
                values.len(),
            ));
        }
        Ok(Self { points, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A field resampled onto the target grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledField {
    pub values: Vec<f64>,
    /// Contributing source cells per target cell (summary only).
    pub count: Option<Vec<u32>>,
    /// Standard deviation per target cell (summary with SD only).
    pub sd: Option<Vec<f64>>,
}

impl ResampledField {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Matching statistics for one plan.
#[derive(Debug, Clone, Serialize)]
pub struct MatchStats {
    pub method: ResampleMethod,
    pub strategy: MatchStrategy,
    pub radius_m: f64,
    pub source_cells: usize,
    pub target_cells: usize,
    /// Query cells that found a reference cell.
    pub matched: usize,
    pub elapsed_ms: u64,
}

impl MatchStats {
    /// Fraction of query cells that were matched.
    pub fn match_rate(&self) -> f64 {
        let queries = match self.method {
            ResampleMethod::Nearest => self.target_cells,
            ResampleMethod::Summary => self.source_cells,
        };
        if queries == 0 {
            0.0
        } else {
            self.matched as f64 / queries as f64
        }
    }
}

/// A matched source/target geometry pair, ready to carry values across.
#[derive(Debug, Clone)]
pub struct ResamplePlan {
    method: ResampleMethod,
    report_sd: bool,
    correspondence: Correspondence,
    source: PointSet,
    target: PointSet,
    stats: MatchStats,
}

impl ResamplePlan {
    pub fn method(&self) -> ResampleMethod {
        self.method
    }

    /// The correspondence: target→source for nearest, source→target for summary.
    pub fn correspondence(&self) -> &Correspondence {
        &self.correspondence
    }

    /// Source points in their original order.
    pub fn source(&self) -> &PointSet {
        &self.source
    }

    /// Target points in their original order.
    pub fn target(&self) -> &PointSet {
        &self.target
    }

    pub fn stats(&self) -> &MatchStats {
        &self.stats
    }

    /// Carry one source value array onto the target grid.
    pub fn apply(&self, values: &[f64]) -> Result<ResampledField> {
        if values.len() != self.source.len() {
            return Err(ResampleError::length_mismatch(
                "source values",
                self.source.len(),
                values.len(),
            ));
        }

        match self.method {
            ResampleMethod::Nearest => Ok(ResampledField {
                values: gather(values, &self.correspondence)?,
                count: None,
                sd: None,
            }),
            ResampleMethod::Summary => {
                let summary = if self.report_sd {
                    summarize(values, &self.correspondence, self.target.len())?
                } else {
                    summarize_no_sd(values, &self.correspondence, self.target.len())?
                };
                Ok(ResampledField {
                    values: summary.mean,
                    count: Some(summary.count),
                    sd: summary.sd,
                })
            }
        }
    }
}

/// Output of [`Resampler::run`].
#[derive(Debug, Clone)]
pub struct ResampleResult {
    pub plan: ResamplePlan,
    pub field: ResampledField,
}

/// Runs the match-then-aggregate pipeline for one configuration.
#[derive(Debug, Clone)]
pub struct Resampler {
    config: ResampleConfig,
    radius_m: f64,
}

impl Resampler {
    pub fn new(config: ResampleConfig) -> Result<Self> {
        config.validate().map_err(ResampleError::config)?;
        let radius_m = config
            .max_radius_m
            .ok_or_else(|| ResampleError::config("max_radius_m must be set"))?;
        Ok(Self { config, radius_m })
    }

    pub fn config(&self) -> &ResampleConfig {
        &self.config
    }

    /// Match the source and target geometries.
    pub fn plan(&self, source: PointSet, target: PointSet) -> Result<ResamplePlan> {
        let start = Instant::now();
        let options = self.config.match_options(self.radius_m);
        let source_cells = source.len();
        let target_cells = target.len();

        let (correspondence, strategy, source, target) = match self.config.method {
            ResampleMethod::Nearest => {
                let outcome = nearest_neighbor(source, &target, &options)?;
                let source = outcome.reference.into_points();
                (outcome.correspondence, outcome.strategy, source, target)
            }
            ResampleMethod::Summary => {
                let outcome = nearest_neighbor(target, &source, &options)?;
                let target = outcome.reference.into_points();
                (outcome.correspondence, outcome.strategy, source, target)
            }
        };

        let stats = MatchStats {
            method: self.config.method,
            strategy,
            radius_m: self.radius_m,
            source_cells,
            target_cells,
            matched: correspondence.matched_count(),
            elapsed_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            method = %stats.method,
            strategy = %stats.strategy,
            source_cells,
            target_cells,
            matched = stats.matched,
            radius_m = self.radius_m,
            elapsed_ms = stats.elapsed_ms,
            "Resample plan ready"
        );

        Ok(ResamplePlan {
            method: self.config.method,
            report_sd: self.config.report_sd,
            correspondence,
            source,
            target,
            stats,
        })
    }

    /// Plan and apply in one step.
    pub fn run(&self, source: SwathField, target: PointSet) -> Result<ResampleResult> {
        let SwathField { points, values } = source;
        let plan = self.plan(points, target)?;
        let field = plan.apply(&values)?;
        Ok(ResampleResult { plan, field })
    }
}
