//! # Cartopack Core
//!
//! Core traits and types for the cartopack placement engine.
//!
//! The engine moves weighted 2D shapes toward a common target point, one at a
//! time, never letting a moving shape overlap a shape that is already placed.
//! This crate holds the pieces that do not depend on a concrete path model:
//!
//! - **Error taxonomy**: [`Error`], [`Result`]
//! - **Geometry trait**: [`Geometry`]
//! - **Bounding volumes**: [`AABB2D`] with merge and the swept-box test [`sweep_test`]
//! - **Configuration**: [`Config`], [`Target`], [`Scaling`], [`ObstacleModel`]
//! - **Placer trait**: [`Placer`] with progress reporting
//! - **Results**: [`Placement`], [`SolveResult`], [`SolveSummary`]
//!
//! ## Configuration
//!
//! ```rust
//! use cartopack_core::{Config, Scaling};
//!
//! let config = Config::new()
//!     .with_min_step(2.0)
//!     .with_scaling(Scaling::AreaProportional)
//!     .with_reference("ohio");
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Swept boxes
//!
//! ```rust
//! use cartopack_core::AABB2D;
//!
//! let moving = AABB2D::new(0.0, 0.0, 1.0, 1.0);
//! let wall = AABB2D::new(5.0, 0.0, 6.0, 1.0);
//! assert_eq!(moving.sweep(&wall, 8.0, 0.0), Some(0.5));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod aabb;
pub mod error;
pub mod geometry;
pub mod placement;
pub mod result;
pub mod solver;

// Re-exports
pub use aabb::{sweep_test, AABB2D};
pub use error::{Error, Result};
pub use geometry::{Geometry, GeometryId};
pub use placement::{Placement, PlacementStats};
pub use result::{SolveResult, SolveSummary};
pub use solver::{
    Config, ObstacleModel, Placer, ProgressCallback, ProgressInfo, Scaling, Target,
};
