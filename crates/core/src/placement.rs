//! Committed placement of a single shape.

use crate::geometry::GeometryId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Translations shorter than this count as no move.
pub const STATIONARY_TOLERANCE: f64 = 1e-9;

/// Where a shape ended up: its scale, its translation and its final geometry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement<G> {
    /// Geometry identifier.
    pub id: GeometryId,
    /// Position in the processing order (0 = placed first).
    pub order: usize,
    /// Scale factor applied about the shape's centroid before placement.
    pub scale: f64,
    /// Committed translation along x.
    pub dx: f64,
    /// Committed translation along y.
    pub dy: f64,
    /// Final geometry after scaling and translation.
    pub geometry: G,
}

impl<G> Placement<G> {
    /// Creates a new placement record.
    pub fn new(id: impl Into<GeometryId>, order: usize, scale: f64, dx: f64, dy: f64, geometry: G) -> Self {
        Self {
            id: id.into(),
            order,
            scale,
            dx,
            dy,
            geometry,
        }
    }

    /// Returns the translation as a tuple.
    pub fn displacement(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }

    /// Returns the length of the committed translation.
    pub fn distance(&self) -> f64 {
        self.dx.hypot(self.dy)
    }

    /// Returns true if the shape was not moved, up to rounding.
    pub fn is_stationary(&self) -> bool {
        self.distance() <= STATIONARY_TOLERANCE
    }
}

/// Aggregate statistics over a set of placements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementStats {
    /// Number of placements.
    pub count: usize,
    /// Number of placements with zero translation.
    pub stationary: usize,
    /// Sum of translation lengths.
    pub total_distance: f64,
    /// Longest single translation.
    pub max_distance: f64,
}

impl PlacementStats {
    /// Computes statistics from a slice of placements.
    pub fn from_placements<G>(placements: &[Placement<G>]) -> Self {
        placements.iter().fold(Self::default(), |mut stats, p| {
            let d = p.distance();
            stats.count += 1;
            if p.is_stationary() {
                stats.stationary += 1;
            }
            stats.total_distance += d;
            stats.max_distance = stats.max_distance.max(d);
            stats
        })
    }

    /// Returns the mean translation length, or 0 when empty.
    pub fn mean_distance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_distance / self.count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_placement_distance() {
        let p = Placement::new("A", 0, 1.0, 3.0, 4.0, ());
        assert_relative_eq!(p.distance(), 5.0);
        assert_eq!(p.displacement(), (3.0, 4.0));
        assert!(!p.is_stationary());
    }

    #[test]
    fn test_stats() {
        let placements = vec![
            Placement::new("A", 0, 1.0, 0.0, 0.0, ()),
            Placement::new("B", 1, 0.5, 3.0, 4.0, ()),
            Placement::new("C", 2, 0.5, -6.0, 8.0, ()),
        ];
        let stats = PlacementStats::from_placements(&placements);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.stationary, 1);
        assert_relative_eq!(stats.total_distance, 15.0);
        assert_relative_eq!(stats.max_distance, 10.0);
        assert_relative_eq!(stats.mean_distance(), 5.0);
    }

    #[test]
    fn test_rounding_noise_is_stationary() {
        let p = Placement::new("A", 0, 1.0, 3e-15, -1e-15, ());
        assert!(p.is_stationary());
    }

    #[test]
    fn test_stats_empty() {
        let stats = PlacementStats::from_placements::<()>(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean_distance(), 0.0);
    }
}
