//! # Cartopack 2D
//!
//! Path-based 2D placement for the cartopack engine.
//!
//! Shapes are scaled by a weight, then pulled one at a time toward a common
//! target point. Each shape travels in a straight line and stops just before
//! it would touch a shape that is already placed, giving a packed,
//! non-overlapping layout.
//!
//! ## Features
//!
//! - Multi-part paths with line, quadratic and cubic segments
//! - Sampled area and centroid of closed subpaths
//! - Swept bounding-box broad phase backed by an R*-tree
//! - Bisection against exact outlines in the narrow phase
//! - Weight-proportional scaling about each shape's centroid
//!
//! ## Quick Start
//!
//! ```rust
//! use cartopack_d2::{Config, Packer2D, Path, Placer, Shape};
//!
//! let shapes = vec![
//!     Shape::new("a", Path::square(0.0, 0.0, 1.0), 1.0),
//!     Shape::new("b", Path::square(10.0, 0.0, 1.0), 1.0),
//!     Shape::new("c", Path::square(20.0, 0.0, 1.0), 1.0),
//! ];
//!
//! let config = Config::new()
//!     .with_min_step(0.01)
//!     .with_target_point(20.0, 0.0);
//!
//! let packer = Packer2D::new(config);
//! let result = packer.place(&shapes).unwrap();
//!
//! assert_eq!(result.placements.len(), 3);
//! assert!(result.get("c").unwrap().is_stationary());
//! ```
//!
//! ## Paths
//!
//! ```rust
//! use cartopack_d2::{centroid_and_area, MeasureOptions, PathBuilder};
//!
//! let mut b = PathBuilder::new();
//! b.move_to(0.0, 0.0)
//!     .line_to(4.0, 0.0)
//!     .line_to(4.0, 2.0)
//!     .line_to(0.0, 2.0)
//!     .close();
//! let path = b.build();
//!
//! let (centroid, area) = centroid_and_area(&path, &MeasureOptions::default()).unwrap();
//! assert!((area - 8.0).abs() < 1e-6);
//! assert!((centroid.x - 2.0).abs() < 1e-6);
//! ```

pub mod measure;
pub mod outline;
pub mod packer;
pub mod path;
pub mod refine;
pub mod scale;
pub mod shape;
pub mod spatial_index;

// Re-exports
pub use measure::{centroid_and_area, combined_centroid, total_area, MeasureOptions};
pub use outline::{paths_intersect, Outline};
pub use packer::Packer2D;
pub use path::{Path, PathBuilder, Segment, Subpath};
pub use refine::{resolve_box_motion, resolve_motion, Motion, MotionOptions};
pub use scale::{area_proportional, scale_about, scale_about_centroid, scale_factors};
pub use shape::Shape;
pub use spatial_index::{SpatialEntry2D, SpatialIndex2D};
pub use cartopack_core::{
    Config, Error, Geometry, ObstacleModel, Placement, Placer, ProgressCallback, ProgressInfo,
    Result, Scaling, SolveResult, SolveSummary, Target, AABB2D,
};
