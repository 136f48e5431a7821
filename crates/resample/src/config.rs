//! Configuration for resampling runs.

use serde::{Deserialize, Serialize};

use crate::matcher::{MatchOptions, MatchStrategy, DEFAULT_BRUTE_FORCE_LIMIT};

/// How source values are carried onto the target grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResampleMethod {
    /// Each target cell takes the value of its nearest source cell.
    #[default]
    #[serde(alias = "nn", alias = "nnInterpolate")]
    Nearest,
    /// Each target cell takes the mean (and spread) of the source cells
    /// nearest to it.
    #[serde(alias = "summaryInterpolate")]
    Summary,
}

impl ResampleMethod {
    /// Parse from string (case-insensitive).
    ///
    /// Accepts the short names and the `nnInterpolate` /
    /// `summaryInterpolate` spellings used in job files.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nearest" | "nn" | "nninterpolate" => Some(Self::Nearest),
            "summary" | "summaryinterpolate" => Some(Self::Summary),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Summary => "summary",
        }
    }
}

impl std::fmt::Display for ResampleMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for the [`Resampler`](crate::Resampler).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResampleConfig {
    pub method: ResampleMethod,

    /// Matching strategy.
    pub strategy: MatchStrategy,

    /// Search radius in meters. Required before running; callers usually
    /// fill it from [`Instrument::default_radius`](crate::Instrument::default_radius).
    pub max_radius_m: Option<f64>,

    /// Report the standard deviation in summary mode.
    pub report_sd: bool,

    /// Record match distances.
    pub with_distances: bool,

    /// Reference × query pairs under which `Auto` uses brute force.
    pub brute_force_limit: u64,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            method: ResampleMethod::Nearest,
            strategy: MatchStrategy::Auto,
            max_radius_m: None,
            report_sd: true,
            with_distances: false,
            brute_force_limit: DEFAULT_BRUTE_FORCE_LIMIT,
        }
    }
}

impl ResampleConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("FUSION_RESAMPLE_METHOD") {
            if let Some(method) = ResampleMethod::from_str(&val) {
                config.method = method;
            }
        }

        if let Ok(val) = std::env::var("FUSION_MATCH_STRATEGY") {
            config.strategy = MatchStrategy::from_str(&val);
        }

        if let Ok(val) = std::env::var("FUSION_MAX_RADIUS_M") {
            if let Ok(radius) = val.parse() {
                config.max_radius_m = Some(radius);
            }
        }

        if let Ok(val) = std::env::var("FUSION_REPORT_SD") {
            config.report_sd = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("FUSION_MATCH_DISTANCES") {
            config.with_distances = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("FUSION_BRUTE_FORCE_LIMIT") {
            if let Ok(limit) = val.parse() {
                config.brute_force_limit = limit;
            }
        }

        config
    }

    /// Set the radius if none was configured.
    pub fn with_default_radius(mut self, radius_m: f64) -> Self {
        if self.max_radius_m.is_none() {
            self.max_radius_m = Some(radius_m);
        }
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        match self.max_radius_m {
            None => return Err("max_radius_m must be set".to_string()),
            Some(r) if !r.is_finite() || r <= 0.0 => {
                return Err(format!("max_radius_m must be > 0, got {}", r));
            }
            _ => {}
        }

        Ok(())
    }

    /// Matcher options for this configuration.
    pub fn match_options(&self, max_radius_m: f64) -> MatchOptions {
        MatchOptions {
            max_radius_m,
            strategy: self.strategy,
            with_distances: self.with_distances,
            brute_force_limit: self.brute_force_limit,
        }
    }
}
