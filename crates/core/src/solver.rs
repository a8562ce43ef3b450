//! Placer trait and configuration.

use crate::geometry::{Geometry, GeometryId};
use crate::result::SolveResult;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Point every shape is pulled toward.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Target {
    /// Combined area-weighted centroid of all scaled shapes.
    #[default]
    CombinedCentroid,
    /// Centroid of the scaled shape with this id.
    Reference(GeometryId),
    /// Fixed caller-supplied point.
    Point { x: f64, y: f64 },
}

/// How shape weights become scale factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Scaling {
    /// Keep shapes at their input size (explicit per-shape factors still apply).
    #[default]
    None,
    /// Scale by `sqrt(weight / area)`, normalized so the largest factor is 1.
    AreaProportional,
}

/// Geometry used for obstacles when computing a shape's safe motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObstacleModel {
    /// Broad phase on boxes, then bisection against exact outlines.
    #[default]
    ExactPath,
    /// Boxes only: stop at the first swept-box contact.
    BoundingBox,
}

/// Configuration for a placement run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Bisection stops once the bracket is no wider than this.
    pub min_step: f64,

    /// Hard cap on bisection iterations.
    pub max_bisection_iterations: u32,

    /// Samples per closed subpath for area and centroid.
    pub centroid_samples: usize,

    /// Damping term letting tiny subpaths pull the centroid.
    pub centroid_epsilon: f64,

    /// Points per curved segment when flattening for intersection tests.
    pub curve_steps: usize,

    /// Start/end distance under which a subpath counts as closed.
    pub closed_tolerance: f64,

    /// Target point selection.
    pub target: Target,

    /// Weight to scale rule.
    pub scaling: Scaling,

    /// Obstacle model for the motion search.
    pub obstacle_model: ObstacleModel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_step: 10.0,
            max_bisection_iterations: 64,
            centroid_samples: 1000,
            centroid_epsilon: 0.0,
            curve_steps: 32,
            closed_tolerance: 1e-6,
            target: Target::default(),
            scaling: Scaling::default(),
            obstacle_model: ObstacleModel::default(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bisection termination width.
    pub fn with_min_step(mut self, min_step: f64) -> Self {
        self.min_step = min_step;
        self
    }

    /// Sets the bisection iteration cap.
    pub fn with_max_bisection_iterations(mut self, n: u32) -> Self {
        self.max_bisection_iterations = n;
        self
    }

    /// Sets the number of samples per subpath used for measuring.
    pub fn with_centroid_samples(mut self, n: usize) -> Self {
        self.centroid_samples = n;
        self
    }

    /// Sets the centroid damping term.
    pub fn with_centroid_epsilon(mut self, epsilon: f64) -> Self {
        self.centroid_epsilon = epsilon;
        self
    }

    /// Sets the flattening resolution for curved segments.
    pub fn with_curve_steps(mut self, n: usize) -> Self {
        self.curve_steps = n;
        self
    }

    /// Sets the closed-subpath tolerance.
    pub fn with_closed_tolerance(mut self, tolerance: f64) -> Self {
        self.closed_tolerance = tolerance;
        self
    }

    /// Sets the target point selection.
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Uses the centroid of the shape with `id` as the target.
    pub fn with_reference(self, id: impl Into<GeometryId>) -> Self {
        self.with_target(Target::Reference(id.into()))
    }

    /// Uses a fixed point as the target.
    pub fn with_target_point(self, x: f64, y: f64) -> Self {
        self.with_target(Target::Point { x, y })
    }

    /// Sets the weight scaling rule.
    pub fn with_scaling(mut self, scaling: Scaling) -> Self {
        self.scaling = scaling;
        self
    }

    /// Sets the obstacle model.
    pub fn with_obstacle_model(mut self, model: ObstacleModel) -> Self {
        self.obstacle_model = model;
        self
    }

    /// Checks every value is in range.
    pub fn validate(&self) -> Result<()> {
        if !self.min_step.is_finite() || self.min_step <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "min_step must be positive and finite, got {}",
                self.min_step
            )));
        }
        if self.max_bisection_iterations == 0 {
            return Err(Error::InvalidConfig(
                "max_bisection_iterations must be at least 1".into(),
            ));
        }
        if self.centroid_samples < 3 {
            return Err(Error::InvalidConfig(format!(
                "centroid_samples must be at least 3, got {}",
                self.centroid_samples
            )));
        }
        if self.curve_steps == 0 {
            return Err(Error::InvalidConfig("curve_steps must be at least 1".into()));
        }
        if self.centroid_epsilon.is_nan() || self.centroid_epsilon < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "centroid_epsilon must be non-negative, got {}",
                self.centroid_epsilon
            )));
        }
        if self.closed_tolerance.is_nan() || self.closed_tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "closed_tolerance must be non-negative, got {}",
                self.closed_tolerance
            )));
        }
        if let Target::Point { x, y } = self.target {
            if !x.is_finite() || !y.is_finite() {
                return Err(Error::InvalidConfig("target point must be finite".into()));
            }
        }
        Ok(())
    }
}

/// Progress callback for long-running operations.
pub type ProgressCallback = Box<dyn Fn(ProgressInfo) + Send + Sync>;

/// Progress information during placement.
#[derive(Debug, Clone, Default)]
pub struct ProgressInfo {
    /// Number of shapes placed so far.
    pub items_placed: usize,
    /// Number of shapes that will be placed.
    pub total_items: usize,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// Current phase description.
    pub phase: String,
    /// Whether the placer is still running.
    pub running: bool,
}

impl ProgressInfo {
    /// Creates a new progress info with default values.
    pub fn new() -> Self {
        Self {
            running: true,
            ..Default::default()
        }
    }

    /// Sets the items placed info.
    pub fn with_items(mut self, placed: usize, total: usize) -> Self {
        self.items_placed = placed;
        self.total_items = total;
        self
    }

    /// Sets the elapsed time.
    pub fn with_elapsed(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// Sets the phase description.
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    /// Marks the placer as finished.
    pub fn finished(mut self) -> Self {
        self.running = false;
        self
    }

    /// Fraction of shapes placed (0.0 to 1.0).
    pub fn progress_percent(&self) -> f64 {
        if self.total_items > 0 {
            self.items_placed as f64 / self.total_items as f64
        } else {
            0.0
        }
    }
}

/// Trait for incremental placement engines.
pub trait Placer {
    /// The shape type this placer handles.
    type Geometry: Geometry;
    /// The geometry type recorded in each placement.
    type Output;

    /// Places every shape, nearest to the target first.
    fn place(&self, shapes: &[Self::Geometry]) -> Result<SolveResult<Self::Output>>;

    /// Places every shape, reporting progress after each one.
    fn place_with_progress(
        &self,
        shapes: &[Self::Geometry],
        callback: ProgressCallback,
    ) -> Result<SolveResult<Self::Output>>;

    /// Requests that an ongoing run stop before the next shape.
    fn cancel(&self);
}
