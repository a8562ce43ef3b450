//! Flattened path geometry for exact intersection tests.
//!
//! Closed subpaths become filled polygons and open subpaths become polylines.
//! Two outlines intersect if any pair of parts shares a point, so touching
//! boundaries and full containment both count.

use crate::path::Path;
use cartopack_core::AABB2D;
use geo::{BoundingRect, Intersects, LineString, Polygon, Rect, Translate};

#[derive(Debug, Clone)]
enum PartShape {
    Area(Polygon<f64>),
    Stroke(LineString<f64>),
}

#[derive(Debug, Clone)]
struct Part {
    shape: PartShape,
    rect: Option<Rect<f64>>,
}

impl Part {
    fn new(shape: PartShape) -> Self {
        let rect = match &shape {
            PartShape::Area(p) => p.bounding_rect(),
            PartShape::Stroke(l) => l.bounding_rect(),
        };
        Self { shape, rect }
    }

    fn translated(&self, dx: f64, dy: f64) -> Self {
        let shape = match &self.shape {
            PartShape::Area(p) => PartShape::Area(p.translate(dx, dy)),
            PartShape::Stroke(l) => PartShape::Stroke(l.translate(dx, dy)),
        };
        Self {
            shape,
            rect: self.rect.map(|r| r.translate(dx, dy)),
        }
    }

    fn intersects(&self, other: &Part) -> bool {
        match (self.rect, other.rect) {
            (Some(a), Some(b)) if !a.intersects(&b) => return false,
            (None, _) | (_, None) => return false,
            _ => {}
        }
        match (&self.shape, &other.shape) {
            (PartShape::Area(a), PartShape::Area(b)) => a.intersects(b),
            (PartShape::Area(a), PartShape::Stroke(b)) => a.intersects(b),
            (PartShape::Stroke(a), PartShape::Area(b)) => a.intersects(b),
            (PartShape::Stroke(a), PartShape::Stroke(b)) => a.intersects(b),
        }
    }
}

/// Polygonal approximation of a [`Path`] used by the narrow phase.
#[derive(Debug, Clone, Default)]
pub struct Outline {
    parts: Vec<Part>,
}

impl Outline {
    /// Flattens `path`. Straight segments are kept exact; curved segments get
    /// `curve_steps` points each.
    pub fn from_path(path: &Path, curve_steps: usize, closed_tolerance: f64) -> Self {
        let parts = path
            .subpaths()
            .iter()
            .map(|sub| {
                let closed = sub.is_closed(closed_tolerance);
                let points = sub.flatten(curve_steps, closed);
                if closed {
                    Part::new(PartShape::Area(Polygon::new(LineString::from(points), vec![])))
                } else {
                    Part::new(PartShape::Stroke(LineString::from(points)))
                }
            })
            .collect();
        Self { parts }
    }

    /// Joins several outlines into one multi-part outline.
    pub fn concat<'a, I>(outlines: I) -> Self
    where
        I: IntoIterator<Item = &'a Outline>,
    {
        Self {
            parts: outlines
                .into_iter()
                .flat_map(|o| o.parts.iter().cloned())
                .collect(),
        }
    }

    /// Returns the number of parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns true if the outline has no parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Bounding box over all parts.
    pub fn bounds(&self) -> Option<AABB2D<f64>> {
        let boxes: Vec<AABB2D<f64>> = self
            .parts
            .iter()
            .filter_map(|p| p.rect)
            .map(|r| AABB2D::new(r.min().x, r.min().y, r.max().x, r.max().y))
            .collect();
        AABB2D::merge_all(&boxes).ok()
    }

    /// Returns the outline moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            parts: self.parts.iter().map(|p| p.translated(dx, dy)).collect(),
        }
    }

    /// Returns true if any part of `self` shares a point with any part of `other`.
    pub fn intersects(&self, other: &Outline) -> bool {
        self.parts
            .iter()
            .any(|a| other.parts.iter().any(|b| a.intersects(b)))
    }
}

/// Exact intersection test between two paths.
pub fn paths_intersect(a: &Path, b: &Path, curve_steps: usize, closed_tolerance: f64) -> bool {
    Outline::from_path(a, curve_steps, closed_tolerance)
        .intersects(&Outline::from_path(b, curve_steps, closed_tolerance))
}
