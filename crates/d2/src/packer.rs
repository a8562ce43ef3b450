//! Incremental placement of weighted shapes toward a target point.

use crate::measure::{centroid_and_area, combined_centroid, MeasureOptions};
use crate::outline::Outline;
use crate::path::Path;
use crate::refine::{resolve_box_motion, resolve_outline_motion, Motion, MotionOptions};
use crate::scale::{scale_about, scale_factors};
use crate::shape::Shape;
use crate::spatial_index::{SpatialEntry2D, SpatialIndex2D};
use cartopack_core::geometry::{Geometry, GeometryId};
use cartopack_core::solver::{
    Config, ObstacleModel, Placer, ProgressCallback, ProgressInfo, Target,
};
use cartopack_core::{Error, Placement, Result, SolveResult, AABB2D};
use geo::Coord;
use rayon::prelude::*;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A measurable shape after scaling, waiting for its turn.
#[derive(Debug, Clone)]
struct Pending {
    id: GeometryId,
    path: Path,
    centroid: Coord<f64>,
    scale: f64,
    distance: f64,
}

/// Places shapes one at a time, nearest to the target first. Each shape moves
/// in a straight line toward the target and stops before it would touch any
/// shape placed before it. Placed shapes never move again.
pub struct Packer2D {
    config: Config,
    cancelled: Arc<AtomicBool>,
}

impl Packer2D {
    /// Creates a new packer with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a packer with default configuration.
    pub fn default_config() -> Self {
        Self::new(Config::default())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Rejects batches that cannot be placed at all.
    fn validate_batch(&self, shapes: &[Shape]) -> Result<()> {
        if shapes.is_empty() {
            return Err(Error::InvalidInput("shape list is empty".into()));
        }

        let mut seen = HashSet::with_capacity(shapes.len());
        for shape in shapes {
            shape.validate()?;
            if !seen.insert(shape.id().as_str()) {
                return Err(Error::InvalidInput(format!(
                    "duplicate shape id '{}'",
                    shape.id()
                )));
            }
        }

        let total_weight: f64 = shapes.iter().map(|s| s.weight()).sum();
        if total_weight <= 0.0 {
            return Err(Error::InvalidInput("total weight is zero".into()));
        }

        if let Target::Reference(id) = &self.config.target {
            if !seen.contains(id.as_str()) {
                return Err(Error::InvalidInput(format!(
                    "reference shape '{}' is not in the batch",
                    id
                )));
            }
        }
        Ok(())
    }

    /// Scales every shape and measures the result. Degenerate shapes come
    /// back as `Err` holding the warning to record.
    fn prepare(&self, shapes: &[Shape], measure: &MeasureOptions) -> Vec<Result<Pending>> {
        let measured: Vec<Option<(Coord<f64>, f64)>> = shapes
            .par_iter()
            .map(|s| s.measure_with(measure))
            .collect();
        let areas: Vec<Option<f64>> = measured.iter().map(|m| m.map(|(_, area)| area)).collect();
        let factors = scale_factors(shapes, &areas, self.config.scaling);

        shapes
            .par_iter()
            .zip(measured)
            .zip(factors)
            .map(|((shape, measured), factor)| -> Result<Pending> {
                let degenerate = || {
                    Error::DegenerateGeometry(format!("shape '{}' has no enclosed area", shape.id()))
                };
                let (c, _) = measured.ok_or_else(degenerate)?;
                let path = scale_about(shape.path(), c, factor);
                let (centroid, _) = centroid_and_area(&path, measure).ok_or_else(degenerate)?;
                Ok(Pending {
                    id: shape.id().clone(),
                    path,
                    centroid,
                    scale: factor,
                    distance: 0.0,
                })
            })
            .collect()
    }

    /// Target point for the batch.
    fn target(&self, pending: &[Pending], measure: &MeasureOptions) -> Result<Coord<f64>> {
        match &self.config.target {
            Target::Point { x, y } => Ok(Coord { x: *x, y: *y }),
            Target::Reference(id) => pending
                .iter()
                .find(|p| &p.id == id)
                .map(|p| p.centroid)
                .ok_or_else(|| {
                    Error::DegenerateGeometry(format!(
                        "reference shape '{}' has no centroid",
                        id
                    ))
                }),
            Target::CombinedCentroid => {
                let paths: Vec<&Path> = pending.iter().map(|p| &p.path).collect();
                combined_centroid(&paths, measure)
                    .map(|(c, _)| c)
                    .ok_or_else(|| {
                        Error::DegenerateGeometry("no shape has an enclosed area".into())
                    })
            }
        }
    }

    fn run(
        &self,
        shapes: &[Shape],
        callback: Option<&ProgressCallback>,
    ) -> Result<SolveResult<Path>> {
        let start = Instant::now();
        self.config.validate()?;
        self.validate_batch(shapes)?;

        let measure = MeasureOptions::from(&self.config);
        let motion_options = MotionOptions::from(&self.config);
        let mut result = SolveResult::new();

        let mut pending = Vec::with_capacity(shapes.len());
        for (shape, prepared) in shapes.iter().zip(self.prepare(shapes, &measure)) {
            match prepared {
                Ok(p) => pending.push(p),
                Err(e) => {
                    log::warn!("skipping shape '{}': {}", shape.id(), e);
                    result.skipped.push(shape.id().clone());
                    result.warnings.push(e);
                }
            }
        }

        let target = self.target(&pending, &measure)?;
        result.target = Some((target.x, target.y));

        for p in &mut pending {
            let d = target - p.centroid;
            p.distance = d.x.hypot(d.y);
        }
        // Stable: ties keep input order
        pending.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let total = pending.len();
        if let Some(cb) = callback {
            cb(ProgressInfo::new()
                .with_phase("Placement")
                .with_items(0, total)
                .with_elapsed(start.elapsed().as_millis() as u64));
        }

        let mut index = SpatialIndex2D::new();
        let mut outlines: Vec<Outline> = Vec::with_capacity(total);
        let mut remaining = pending.into_iter();

        while let Some(item) = remaining.next() {
            if self.cancelled.load(Ordering::Relaxed) {
                result.cancelled = true;
                result.unplaced.push(item.id);
                result.unplaced.extend(remaining.by_ref().map(|p| p.id));
                break;
            }

            let outline = Outline::from_path(
                &item.path,
                self.config.curve_steps,
                self.config.closed_tolerance,
            );
            let motion = match item.path.bounds() {
                Some(bounds) => self.resolve(
                    &item,
                    &bounds,
                    &outline,
                    target,
                    &index,
                    &outlines,
                    &motion_options,
                ),
                None => Motion::default(),
            };

            if !motion.converged {
                log::warn!(
                    "shape '{}': bisection stopped after {} iterations",
                    item.id,
                    motion.iterations
                );
                result.warnings.push(Error::NumericalInstability(format!(
                    "shape '{}': bisection did not converge within {} iterations",
                    item.id, motion.iterations
                )));
            }

            let d = motion.displacement;
            let order = result.placements.len();
            let path = item.path.translated(d.x, d.y);
            if let Some(bounds) = path.bounds() {
                index.insert(SpatialEntry2D::new(order, item.id.clone(), bounds));
            }
            outlines.push(outline.translated(d.x, d.y));
            result
                .placements
                .push(Placement::new(item.id, order, item.scale, d.x, d.y, path));

            if let Some(cb) = callback {
                cb(ProgressInfo::new()
                    .with_phase("Placement")
                    .with_items(order + 1, total)
                    .with_elapsed(start.elapsed().as_millis() as u64));
            }
        }

        result.computation_time_ms = start.elapsed().as_millis() as u64;
        let stats = result.placement_stats();
        log::info!(
            "placed {} of {} shapes ({} skipped, {} stationary, total travel {:.3}) in {} ms",
            stats.count,
            shapes.len(),
            result.skipped.len(),
            stats.stationary,
            stats.total_distance,
            result.computation_time_ms
        );

        if let Some(cb) = callback {
            cb(ProgressInfo::new()
                .with_phase(if result.cancelled { "Cancelled" } else { "Complete" })
                .with_items(result.placements.len(), total)
                .with_elapsed(result.computation_time_ms)
                .finished());
        }

        Ok(result)
    }

    /// Safe motion of one shape against everything placed so far.
    #[allow(clippy::too_many_arguments)]
    fn resolve(
        &self,
        item: &Pending,
        bounds: &AABB2D<f64>,
        outline: &Outline,
        target: Coord<f64>,
        index: &SpatialIndex2D,
        outlines: &[Outline],
        options: &MotionOptions,
    ) -> Motion {
        let dir = target - item.centroid;
        let candidates = index.query_swept(bounds, dir.x, dir.y);

        match self.config.obstacle_model {
            ObstacleModel::ExactPath => {
                let obstacles: Vec<(AABB2D<f64>, &Outline)> = candidates
                    .iter()
                    .map(|e| (e.aabb, &outlines[e.index]))
                    .collect();
                resolve_outline_motion(outline, bounds, item.centroid, target, &obstacles, options)
            }
            ObstacleModel::BoundingBox => {
                let boxes: Vec<AABB2D<f64>> = candidates.iter().map(|e| e.aabb).collect();
                resolve_box_motion(bounds, item.centroid, target, &boxes)
            }
        }
    }
}

impl Placer for Packer2D {
    type Geometry = Shape;
    type Output = Path;

    fn place(&self, shapes: &[Shape]) -> Result<SolveResult<Path>> {
        self.cancelled.store(false, Ordering::Relaxed);
        self.run(shapes, None)
    }

    fn place_with_progress(
        &self,
        shapes: &[Shape],
        callback: ProgressCallback,
    ) -> Result<SolveResult<Path>> {
        self.cancelled.store(false, Ordering::Relaxed);
        self.run(shapes, Some(&callback))
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::paths_intersect;
    use crate::path::PathBuilder;
    use approx::assert_relative_eq;
    use cartopack_core::Scaling;
    use std::sync::atomic::AtomicUsize;

    fn squares() -> Vec<Shape> {
        vec![
            Shape::new("a", Path::square(0.0, 0.0, 1.0), 1.0),
            Shape::new("b", Path::square(10.0, 0.0, 1.0), 1.0),
            Shape::new("c", Path::square(20.0, 0.0, 1.0), 1.0),
        ]
    }

    fn config() -> Config {
        Config::default().with_min_step(0.01).with_target_point(20.0, 0.0)
    }

    #[test]
    fn test_nearest_first_order() {
        let packer = Packer2D::new(config());
        let result = packer.place(&squares()).unwrap();

        let order: Vec<&str> = result.placements.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
        assert_eq!(result.target, Some((20.0, 0.0)));

        let c = result.get("c").unwrap();
        assert!(c.is_stationary());
        assert_eq!(c.order, 0);
    }

    #[test]
    fn test_squares_stack_against_each_other() {
        let packer = Packer2D::new(config());
        let result = packer.place(&squares()).unwrap();

        let b = result.get("b").unwrap();
        assert!(b.dx < 9.0 && b.dx > 8.99);
        assert_relative_eq!(b.dy, 0.0, epsilon = 1e-9);

        let a = result.get("a").unwrap();
        assert!(a.dx < b.dx + 9.0 && a.dx > b.dx + 8.98);

        let paths: Vec<&Path> = result.placements.iter().map(|p| &p.geometry).collect();
        for i in 0..paths.len() {
            for j in (i + 1)..paths.len() {
                assert!(!paths_intersect(paths[i], paths[j], 32, 1e-6));
            }
        }
    }

    #[test]
    fn test_ties_keep_input_order() {
        let shapes = vec![
            Shape::new("left", Path::square(-5.0, 0.0, 1.0), 1.0),
            Shape::new("right", Path::square(5.0, 0.0, 1.0), 1.0),
        ];
        let packer = Packer2D::new(Config::default().with_min_step(0.01).with_target_point(0.0, 0.0));
        let result = packer.place(&shapes).unwrap();
        assert_eq!(result.placements[0].id, "left");
        assert_eq!(result.placements[1].id, "right");

        // The first reaches the target; the second stops against it
        assert_relative_eq!(result.placements[0].dx, 5.0, epsilon = 1e-9);
        assert!(result.placements[1].dx > -4.0 && result.placements[1].dx < -3.99);
    }

    #[test]
    fn test_degenerate_shape_is_skipped() {
        let mut b = PathBuilder::new();
        b.move_to(0.0, 0.0).line_to(5.0, 5.0);
        let mut shapes = squares();
        shapes.push(Shape::new("line", b.build(), 1.0));

        let result = Packer2D::new(config()).place(&shapes).unwrap();
        assert_eq!(result.skipped, vec!["line".to_string()]);
        assert!(result.get("line").is_none());
        assert_eq!(result.placements.len(), 3);
        assert!(matches!(result.warnings[0], Error::DegenerateGeometry(_)));
    }

    #[test]
    fn test_closed_tolerance_follows_config() {
        // Outline whose end misses its start by 0.001
        let mut b = PathBuilder::new();
        b.move_to(0.0, 0.0)
            .line_to(10.0, 0.0)
            .line_to(10.0, 10.0)
            .line_to(0.0, 10.0)
            .line_to(0.0, 0.001);
        let shapes = vec![
            Shape::new("gap", b.build(), 1.0),
            Shape::new("sq", Path::square(30.0, 5.0, 10.0), 1.0),
        ];

        let strict = Packer2D::default_config().place(&shapes).unwrap();
        assert!(strict.is_skipped("gap"));

        let loose = Packer2D::new(Config::default().with_closed_tolerance(0.01))
            .place(&shapes)
            .unwrap();
        assert!(loose.skipped.is_empty());
        assert!(loose.get("gap").is_some());
    }

    #[test]
    fn test_combined_centroid_target() {
        let shapes = vec![
            Shape::new("a", Path::square(-10.0, 0.0, 2.0), 1.0),
            Shape::new("b", Path::square(10.0, 0.0, 2.0), 1.0),
        ];
        let packer = Packer2D::new(Config::default().with_min_step(0.01));
        let result = packer.place(&shapes).unwrap();
        let (tx, ty) = result.target.unwrap();
        assert_relative_eq!(tx, 0.0, epsilon = 1e-9);
        assert_relative_eq!(ty, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reference_target() {
        let packer = Packer2D::new(Config::default().with_min_step(0.01).with_reference("a"));
        let result = packer.place(&squares()).unwrap();
        let (tx, ty) = result.target.unwrap();
        assert_relative_eq!(tx, 0.0, epsilon = 1e-9);
        assert_relative_eq!(ty, 0.0, epsilon = 1e-9);
        assert_eq!(result.placements[0].id, "a");
    }

    #[test]
    fn test_degenerate_reference_fails() {
        let mut b = PathBuilder::new();
        b.move_to(0.0, 0.0).line_to(5.0, 5.0);
        let shapes = vec![
            Shape::new("line", b.build(), 1.0),
            Shape::new("sq", Path::square(0.0, 0.0, 1.0), 1.0),
        ];
        let packer = Packer2D::new(Config::default().with_reference("line"));
        assert!(matches!(packer.place(&shapes), Err(Error::DegenerateGeometry(_))));
    }

    #[test]
    fn test_batch_validation() {
        let packer = Packer2D::default_config();
        assert!(matches!(packer.place(&[]), Err(Error::InvalidInput(_))));

        let dupes = vec![
            Shape::new("a", Path::square(0.0, 0.0, 1.0), 1.0),
            Shape::new("a", Path::square(5.0, 0.0, 1.0), 1.0),
        ];
        assert!(matches!(packer.place(&dupes), Err(Error::InvalidInput(_))));

        let weightless = vec![Shape::new("a", Path::square(0.0, 0.0, 1.0), 0.0)];
        assert!(matches!(packer.place(&weightless), Err(Error::InvalidInput(_))));

        let unknown = Packer2D::new(Config::default().with_reference("nope"));
        assert!(matches!(unknown.place(&squares()), Err(Error::InvalidInput(_))));

        let bad_config = Packer2D::new(Config::default().with_min_step(0.0));
        assert!(matches!(bad_config.place(&squares()), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_area_proportional_scaling() {
        let shapes = vec![
            Shape::new("big", Path::square(0.0, 0.0, 4.0), 4.0),
            Shape::new("small", Path::square(10.0, 0.0, 4.0), 1.0),
        ];
        let config = config().with_scaling(Scaling::AreaProportional);
        let result = Packer2D::new(config).place(&shapes).unwrap();

        assert_relative_eq!(result.get("big").unwrap().scale, 1.0);
        assert_relative_eq!(result.get("small").unwrap().scale, 0.5, epsilon = 1e-9);
        let small = result.get("small").unwrap().geometry.bounds().unwrap();
        assert_relative_eq!(small.width(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bounding_box_model() {
        let config = config().with_obstacle_model(ObstacleModel::BoundingBox);
        let result = Packer2D::new(config).place(&squares()).unwrap();
        let b = result.get("b").unwrap();
        assert_relative_eq!(b.dx, 9.0, epsilon = 1e-9);
        let a = result.get("a").unwrap();
        assert_relative_eq!(a.dx, 18.0, epsilon = 1e-9);
    }

    #[test]
    fn test_progress_callback() {
        let packer = Packer2D::new(config());
        let calls = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let last_clone = last.clone();

        let callback: ProgressCallback = Box::new(move |info| {
            calls_clone.fetch_add(1, Ordering::Relaxed);
            last_clone.store(info.items_placed, Ordering::Relaxed);
            assert!(info.items_placed <= info.total_items);
        });

        let result = packer.place_with_progress(&squares(), callback).unwrap();
        // initial + one per shape + final
        assert_eq!(calls.load(Ordering::Relaxed), 5);
        assert_eq!(last.load(Ordering::Relaxed), 3);
        assert!(result.all_placed());
    }

    #[test]
    fn test_cancel_stops_before_next_shape() {
        let packer = Arc::new(Packer2D::new(config()));
        let handle = packer.clone();
        let callback: ProgressCallback = Box::new(move |info| {
            if info.items_placed == 1 {
                handle.cancel();
            }
        });

        let result = packer.place_with_progress(&squares(), callback).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.placements.len(), 1);
        assert_eq!(result.unplaced, vec!["b".to_string(), "a".to_string()]);

        // The flag resets on the next run
        let again = packer.place(&squares()).unwrap();
        assert!(!again.cancelled);
        assert_eq!(again.placements.len(), 3);
    }
}
