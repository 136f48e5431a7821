//! Nearest-neighbor matching between two point sets.
//!
//! Both strategies share one contract: for every query point, the nearest
//! reference point whose great-circle distance is within the radius (a point
//! exactly on the radius counts), or unmatched. Ties between equidistant
//! reference points are resolved by whichever the strategy meets first.

pub mod brute;
pub mod index;

use serde::{Deserialize, Serialize};
use std::time::Instant;

use fusion_common::PointSet;

use crate::correspondence::Correspondence;
use crate::error::Result;

pub use index::SpatialIndex;

/// Default work limit (reference × query pairs) under which `Auto` picks brute force.
pub const DEFAULT_BRUTE_FORCE_LIMIT: u64 = 1 << 24;

/// How the matcher searches the reference set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Pick by problem size.
    #[default]
    Auto,
    /// Bucketed spatial index, near-linear cost.
    Indexed,
    /// Exhaustive search.
    BruteForce,
}

impl MatchStrategy {
    /// Parse from string (case-insensitive), defaulting to `Auto`.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().replace('-', "_").as_str() {
            "indexed" | "index" | "block_index" => Self::Indexed,
            "brute_force" | "brute" => Self::BruteForce,
            _ => Self::Auto,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Indexed => "indexed",
            Self::BruteForce => "brute_force",
        }
    }

    /// Resolve `Auto` for a concrete problem size.
    pub fn resolve(self, reference_len: usize, query_len: usize, brute_force_limit: u64) -> Self {
        match self {
            Self::Auto => {
                let work = reference_len as u128 * query_len as u128;
                if work <= brute_force_limit as u128 {
                    Self::BruteForce
                } else {
                    Self::Indexed
                }
            }
            other => other,
        }
    }
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameters for one matching call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    pub max_radius_m: f64,
    pub strategy: MatchStrategy,
    /// Record the matched distance for every query point.
    pub with_distances: bool,
    pub brute_force_limit: u64,
}

impl MatchOptions {
    pub fn new(max_radius_m: f64) -> Self {
        Self {
            max_radius_m,
            strategy: MatchStrategy::Auto,
            with_distances: false,
            brute_force_limit: DEFAULT_BRUTE_FORCE_LIMIT,
        }
    }

    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_distances(mut self, with_distances: bool) -> Self {
        self.with_distances = with_distances;
        self
    }
}

/// The reference set after matching.
///
/// The indexed strategy reorders the reference points; either way
/// [`ReferenceLayout::into_points`] returns them in the caller's order.
#[derive(Debug, Clone)]
pub enum ReferenceLayout {
    Original(PointSet),
    Indexed(SpatialIndex),
}

impl ReferenceLayout {
    pub fn into_points(self) -> PointSet {
        match self {
            Self::Original(points) => points,
            Self::Indexed(index) => index.into_points(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Original(points) => points.len(),
            Self::Indexed(index) => index.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of [`nearest_neighbor`].
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub correspondence: Correspondence,
    pub reference: ReferenceLayout,
    /// The strategy actually used.
    pub strategy: MatchStrategy,
}

/// Match every query point to its nearest reference point.
///
/// The reference set is consumed: the indexed strategy reorders it into
/// buckets. Use [`MatchOutcome::reference`] to get it back.
pub fn nearest_neighbor(
    reference: PointSet,
    queries: &PointSet,
    options: &MatchOptions,
) -> Result<MatchOutcome> {
    let strategy =
        options
            .strategy
            .resolve(reference.len(), queries.len(), options.brute_force_limit);
    let start = Instant::now();

    let (correspondence, layout) = match strategy {
        MatchStrategy::BruteForce | MatchStrategy::Auto => {
            let correspondence = brute::match_points(
                &reference,
                queries,
                options.max_radius_m,
                options.with_distances,
            )?;
            (correspondence, ReferenceLayout::Original(reference))
        }
        MatchStrategy::Indexed => {
            let index = SpatialIndex::build(reference, options.max_radius_m)?;
            let correspondence = index.query(queries, options.with_distances)?;
            (correspondence, ReferenceLayout::Indexed(index))
        }
    };

    let matched = correspondence.matched_count();
    tracing::debug!(
        strategy = %strategy,
        reference = layout.len(),
        queries = queries.len(),
        matched,
        radius_m = options.max_radius_m,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Nearest-neighbor matching complete"
    );
    if matched == 0 {
        tracing::warn!(
            queries = queries.len(),
            radius_m = options.max_radius_m,
            "No query point matched a reference point"
        );
    }

    Ok(MatchOutcome {
        correspondence,
        reference: layout,
        strategy,
    })
}
