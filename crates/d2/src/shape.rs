//! Weighted input shapes.

use crate::measure::{centroid_and_area, MeasureOptions};
use crate::path::Path;
use cartopack_core::geometry::{Geometry, GeometryId};
use cartopack_core::{Error, Result, AABB2D};
use geo::Coord;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A shape to be placed: identifier, outline and weight.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Shape {
    /// Unique identifier.
    id: GeometryId,

    /// Outline in input coordinates.
    path: Path,

    /// Value the shape's area should be proportional to.
    weight: f64,

    /// Explicit scale factor, overriding the configured rule.
    scale: Option<f64>,
}

impl Shape {
    /// Creates a new shape.
    pub fn new(id: impl Into<GeometryId>, path: Path, weight: f64) -> Self {
        Self {
            id: id.into(),
            path,
            weight,
            scale: None,
        }
    }

    /// Fixes the scale factor for this shape.
    pub fn with_scale(mut self, factor: f64) -> Self {
        self.scale = Some(factor);
        self
    }

    /// Returns the outline.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the explicit scale factor, if one was set.
    pub fn scale(&self) -> Option<f64> {
        self.scale
    }

    /// Centroid and enclosed area under `options`, or `None` if degenerate.
    ///
    /// The packer measures shapes through this with the run's options.
    pub fn measure_with(&self, options: &MeasureOptions) -> Option<(Coord<f64>, f64)> {
        centroid_and_area(&self.path, options)
    }
}

/// `measure`, `centroid` and `is_measurable` use [`MeasureOptions::default`].
/// Call [`Shape::measure_with`] to measure with a run's settings.
impl Geometry for Shape {
    type Scalar = f64;

    fn id(&self) -> &GeometryId {
        &self.id
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn measure(&self) -> Option<f64> {
        self.measure_with(&MeasureOptions::default()).map(|(_, area)| area)
    }

    fn centroid(&self) -> Option<(f64, f64)> {
        self.measure_with(&MeasureOptions::default()).map(|(c, _)| (c.x, c.y))
    }

    fn aabb_2d(&self) -> Option<AABB2D<f64>> {
        self.path.bounds()
    }

    fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::InvalidInput("shape id must not be empty".into()));
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(Error::InvalidInput(format!(
                "shape '{}': weight must be finite and non-negative, got {}",
                self.id, self.weight
            )));
        }
        if let Some(factor) = self.scale {
            if !factor.is_finite() || factor < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "shape '{}': scale must be finite and non-negative, got {}",
                    self.id, factor
                )));
            }
        }
        Ok(())
    }
}
