//! Core geometry trait for weighted, placeable shapes.

use crate::aabb::AABB2D;
use crate::Result;
use nalgebra::RealField;

/// Unique identifier for a geometry.
pub type GeometryId = String;

/// Trait for shapes that can be scaled by a weight and placed toward a target.
pub trait Geometry: Clone + Send + Sync {
    /// The coordinate type (f32 or f64).
    type Scalar: RealField + Copy;

    /// Returns the unique identifier for this geometry.
    fn id(&self) -> &GeometryId;

    /// Returns the weight the shape's area should be proportional to.
    fn weight(&self) -> Self::Scalar;

    /// Returns the enclosed area, or `None` for degenerate geometry.
    fn measure(&self) -> Option<Self::Scalar>;

    /// Returns the area-weighted centroid, or `None` for degenerate geometry.
    fn centroid(&self) -> Option<(Self::Scalar, Self::Scalar)>;

    /// Returns the 2D AABB, or `None` if the geometry has no points.
    fn aabb_2d(&self) -> Option<AABB2D<Self::Scalar>>;

    /// Validates the geometry and returns an error if invalid.
    fn validate(&self) -> Result<()>;

    /// Returns true if the geometry has a usable area and centroid.
    fn is_measurable(&self) -> bool {
        self.centroid().is_some()
    }
}
