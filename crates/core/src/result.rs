//! Placement result representation.

use crate::geometry::GeometryId;
use crate::placement::{Placement, PlacementStats};
use crate::Error;
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of a placement run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveResult<G> {
    /// Committed placements, in processing order.
    pub placements: Vec<Placement<G>>,

    /// IDs of shapes excluded because their geometry had no usable centroid.
    pub skipped: Vec<GeometryId>,

    /// IDs of shapes left untouched because the run was cancelled.
    pub unplaced: Vec<GeometryId>,

    /// Target point every shape was pulled toward.
    pub target: Option<(f64, f64)>,

    /// Non-fatal problems encountered during the run.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub warnings: Vec<Error>,

    /// Computation time in milliseconds.
    pub computation_time_ms: u64,

    /// Whether the run was cancelled early.
    pub cancelled: bool,
}

impl<G> SolveResult<G> {
    /// Creates a new empty result.
    pub fn new() -> Self {
        Self {
            placements: Vec::new(),
            skipped: Vec::new(),
            unplaced: Vec::new(),
            target: None,
            warnings: Vec::new(),
            computation_time_ms: 0,
            cancelled: false,
        }
    }

    /// Returns the placement for `id`, if the shape was placed.
    pub fn get(&self, id: &str) -> Option<&Placement<G>> {
        self.placements.iter().find(|p| p.id == id)
    }

    /// Returns true if `id` was excluded for degenerate geometry.
    pub fn is_skipped(&self, id: &str) -> bool {
        self.skipped.iter().any(|s| s == id)
    }

    /// Returns placements keyed by id.
    pub fn by_id(&self) -> HashMap<&str, &Placement<G>> {
        self.placements
            .iter()
            .map(|p| (p.id.as_str(), p))
            .collect()
    }

    /// Consumes the result, returning `id -> (geometry, (dx, dy))`.
    pub fn into_map(self) -> HashMap<GeometryId, (G, (f64, f64))> {
        self.placements
            .into_iter()
            .map(|p| (p.id, (p.geometry, (p.dx, p.dy))))
            .collect()
    }

    /// Returns the number of placed shapes.
    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }

    /// Returns true if every input shape was placed.
    pub fn all_placed(&self) -> bool {
        self.skipped.is_empty() && self.unplaced.is_empty()
    }

    /// Returns true if any warning was recorded.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the warnings of the numerical-instability kind.
    pub fn instabilities(&self) -> impl Iterator<Item = &Error> {
        self.warnings
            .iter()
            .filter(|w| matches!(w, Error::NumericalInstability(_)))
    }

    /// Computes placement statistics.
    pub fn placement_stats(&self) -> PlacementStats {
        PlacementStats::from_placements(&self.placements)
    }
}

impl<G> Default for SolveResult<G> {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary statistics for a placement run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveSummary {
    /// Total shapes requested.
    pub total_requested: usize,
    /// Total shapes placed.
    pub total_placed: usize,
    /// Shapes skipped for degenerate geometry.
    pub total_skipped: usize,
    /// Sum of committed translation lengths.
    pub total_distance: f64,
    /// Number of warnings.
    pub warnings: usize,
    /// Computation time in milliseconds.
    pub time_ms: u64,
}

impl<G> From<&SolveResult<G>> for SolveSummary {
    fn from(result: &SolveResult<G>) -> Self {
        Self {
            total_requested: result.placements.len() + result.skipped.len() + result.unplaced.len(),
            total_placed: result.placements.len(),
            total_skipped: result.skipped.len(),
            total_distance: result.placement_stats().total_distance,
            warnings: result.warnings.len(),
            time_ms: result.computation_time_ms,
        }
    }
}
