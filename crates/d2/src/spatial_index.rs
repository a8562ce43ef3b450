//! Spatial indexing of placed shapes using an R*-tree.
//!
//! The index only knows bounding boxes. It answers "which placed shapes could
//! the moving shape reach" by querying with the envelope swept by the motion;
//! the swept-box test and the exact test then refine that candidate set.

use cartopack_core::AABB2D;
use rstar::{RTree, RTreeObject, AABB};

/// An entry in the index representing a placed shape.
#[derive(Debug, Clone)]
pub struct SpatialEntry2D {
    /// Index of the shape in the placed list.
    pub index: usize,
    /// Shape ID.
    pub id: String,
    /// Bounding box of the placed shape.
    pub aabb: AABB2D<f64>,
}

impl SpatialEntry2D {
    /// Creates a new spatial entry.
    pub fn new(index: usize, id: impl Into<String>, aabb: AABB2D<f64>) -> Self {
        Self {
            index,
            id: id.into(),
            aabb,
        }
    }
}

impl RTreeObject for SpatialEntry2D {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.aabb.min_x, self.aabb.min_y],
            [self.aabb.max_x, self.aabb.max_y],
        )
    }
}

/// 2D spatial index using R*-tree for broad-phase queries.
#[derive(Debug)]
pub struct SpatialIndex2D {
    tree: RTree<SpatialEntry2D>,
}

impl SpatialIndex2D {
    /// Creates a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Creates a spatial index with the given entries.
    pub fn with_entries(entries: Vec<SpatialEntry2D>) -> Self {
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Inserts a new entry.
    pub fn insert(&mut self, entry: SpatialEntry2D) {
        self.tree.insert(entry);
    }

    /// Returns the number of entries in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Finds all entries whose boxes intersect `query` (touching included).
    pub fn query_aabb(&self, query: &AABB2D<f64>) -> Vec<&SpatialEntry2D> {
        let envelope = AABB::from_corners([query.min_x, query.min_y], [query.max_x, query.max_y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }

    /// Finds all entries a box moving by `(dx, dy)` could touch.
    pub fn query_swept(&self, moving: &AABB2D<f64>, dx: f64, dy: f64) -> Vec<&SpatialEntry2D> {
        self.query_aabb(&moving.swept_envelope(dx, dy))
    }

    /// Returns an iterator over all entries.
    pub fn iter(&self) -> impl Iterator<Item = &SpatialEntry2D> {
        self.tree.iter()
    }
}

impl Default for SpatialIndex2D {
    fn default() -> Self {
        Self::new()
    }
}
