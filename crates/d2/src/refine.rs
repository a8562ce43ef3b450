//! Narrow-phase motion refinement.
//!
//! A shape moves in a straight line from `start` toward `target`. Obstacles
//! whose boxes the swept box never reaches are dropped first; the largest safe
//! travel distance against the remaining exact outlines is then found by
//! bisection.
//!
//! The bisection assumes that once the shape is blocked it stays blocked
//! further along the line. Concave obstacles can break that assumption and
//! make the result looser or tighter than the true first contact. The final
//! distance is always one that tested intersection-free.

use crate::outline::Outline;
use crate::path::Path;
use cartopack_core::{Config, AABB2D};
use geo::Coord;

/// Parameters for the motion search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionOptions {
    /// Stop once the bracket is no wider than this.
    pub min_step: f64,
    /// Hard cap on bisection iterations.
    pub max_iterations: u32,
    /// Flattening resolution for curves.
    pub curve_steps: usize,
    /// Closed-subpath tolerance.
    pub closed_tolerance: f64,
}

impl Default for MotionOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for MotionOptions {
    fn from(config: &Config) -> Self {
        Self {
            min_step: config.min_step,
            max_iterations: config.max_bisection_iterations,
            curve_steps: config.curve_steps,
            closed_tolerance: config.closed_tolerance,
        }
    }
}

impl MotionOptions {
    /// Sets the termination width.
    pub fn with_min_step(mut self, min_step: f64) -> Self {
        self.min_step = min_step;
        self
    }

    /// Sets the iteration cap.
    pub fn with_max_iterations(mut self, n: u32) -> Self {
        self.max_iterations = n;
        self
    }
}

/// Outcome of a motion search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    /// Committed translation.
    pub displacement: Coord<f64>,
    /// Distance from start to target.
    pub requested: f64,
    /// Distance actually travelled.
    pub travelled: f64,
    /// Obstacles left after the broad phase.
    pub obstacles: usize,
    /// Bisection iterations performed.
    pub iterations: u32,
    /// False if the iteration cap was hit before the bracket closed.
    pub converged: bool,
}

impl Default for Motion {
    fn default() -> Self {
        Self::stationary(0.0)
    }
}

impl Motion {
    fn stationary(requested: f64) -> Self {
        Self {
            displacement: Coord { x: 0.0, y: 0.0 },
            requested,
            travelled: 0.0,
            obstacles: 0,
            iterations: 0,
            converged: true,
        }
    }

    fn along(unit: Coord<f64>, requested: f64, travelled: f64) -> Self {
        Self {
            displacement: unit * travelled,
            travelled,
            ..Self::stationary(requested)
        }
    }

    /// Returns true if the full requested distance was travelled.
    pub fn reached_target(&self) -> bool {
        self.travelled >= self.requested
    }

    /// Fraction of the requested distance travelled.
    pub fn fraction(&self) -> f64 {
        if self.requested > 0.0 {
            self.travelled / self.requested
        } else {
            1.0
        }
    }
}

/// Keeps the items whose box, swept from `moving` by `(dx, dy)`, is hit or
/// touched.
pub fn broad_phase<T, I>(moving: &AABB2D<f64>, dx: f64, dy: f64, candidates: I) -> Vec<T>
where
    I: IntoIterator<Item = (AABB2D<f64>, T)>,
{
    candidates
        .into_iter()
        .filter(|(aabb, _)| moving.sweep_contact(aabb, dx, dy).is_some())
        .map(|(_, item)| item)
        .collect()
}

/// Largest safe travel along `unit` in `[0, dist]` against `obstacles`.
///
/// Returns `(distance, iterations, converged)`.
pub fn bisect(
    moving: &Outline,
    unit: Coord<f64>,
    dist: f64,
    obstacles: &Outline,
    options: &MotionOptions,
) -> (f64, u32, bool) {
    if moving.intersects(obstacles) {
        return (0.0, 0, true);
    }

    let mut low = 0.0;
    let mut high = dist;
    let mut iterations = 0;
    while high - low > options.min_step {
        if iterations >= options.max_iterations {
            return (low, iterations, false);
        }
        iterations += 1;

        let mid = (low + high) / 2.0;
        let probe = moving.translated(unit.x * mid, unit.y * mid);
        if probe.intersects(obstacles) {
            high = mid;
        } else {
            low = mid;
        }
    }
    (low, iterations, true)
}

/// Motion of pre-flattened geometry; the packer calls this with cached outlines.
pub fn resolve_outline_motion(
    moving: &Outline,
    moving_box: &AABB2D<f64>,
    start: Coord<f64>,
    target: Coord<f64>,
    obstacles: &[(AABB2D<f64>, &Outline)],
    options: &MotionOptions,
) -> Motion {
    let dir = target - start;
    let dist = dir.x.hypot(dir.y);
    if dist == 0.0 {
        return Motion::stationary(0.0);
    }
    let unit = dir / dist;

    let relevant: Vec<&Outline> = broad_phase(moving_box, dir.x, dir.y, obstacles.iter().copied());
    if relevant.is_empty() {
        return Motion::along(unit, dist, dist);
    }

    let combined = Outline::concat(relevant.iter().copied());
    let (travelled, iterations, converged) = bisect(moving, unit, dist, &combined, options);

    log::debug!(
        "motion: requested {:.3}, travelled {:.3}, {} obstacles, {} iterations",
        dist,
        travelled,
        relevant.len(),
        iterations
    );

    Motion {
        obstacles: relevant.len(),
        iterations,
        converged,
        ..Motion::along(unit, dist, travelled)
    }
}

/// Largest safe translation of `moving` from `start` toward `target`.
///
/// Never introduces an overlap with `obstacles`. If the shape already touches
/// an obstacle before moving, it stays where it is.
pub fn resolve_motion(
    moving: &Path,
    start: Coord<f64>,
    target: Coord<f64>,
    obstacles: &[&Path],
    options: &MotionOptions,
) -> Motion {
    let Some(moving_box) = moving.bounds() else {
        return Motion::stationary(0.0);
    };
    let moving_outline = Outline::from_path(moving, options.curve_steps, options.closed_tolerance);

    let flattened: Vec<(AABB2D<f64>, Outline)> = obstacles
        .iter()
        .filter_map(|p| {
            p.bounds().map(|b| {
                (
                    b,
                    Outline::from_path(p, options.curve_steps, options.closed_tolerance),
                )
            })
        })
        .collect();
    let refs: Vec<(AABB2D<f64>, &Outline)> = flattened.iter().map(|(b, o)| (*b, o)).collect();

    resolve_outline_motion(&moving_outline, &moving_box, start, target, &refs, options)
}

/// Rectangle-only motion: stop at the first swept-box contact.
pub fn resolve_box_motion(
    moving: &AABB2D<f64>,
    start: Coord<f64>,
    target: Coord<f64>,
    obstacles: &[AABB2D<f64>],
) -> Motion {
    let dir = target - start;
    let dist = dir.x.hypot(dir.y);
    if dist == 0.0 {
        return Motion::stationary(0.0);
    }

    let hits: Vec<f64> = obstacles
        .iter()
        .filter_map(|b| moving.sweep(b, dir.x, dir.y))
        .collect();
    let t = hits.iter().copied().fold(1.0_f64, f64::min);

    Motion {
        obstacles: hits.len(),
        ..Motion::along(dir / dist, dist, dist * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::paths_intersect;
    use approx::assert_relative_eq;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    fn opts() -> MotionOptions {
        MotionOptions::default().with_min_step(0.01)
    }

    #[test]
    fn test_zero_distance() {
        let sq = Path::square(0.0, 0.0, 1.0);
        let motion = resolve_motion(&sq, c(0.0, 0.0), c(0.0, 0.0), &[], &opts());
        assert_eq!(motion.displacement, c(0.0, 0.0));
        assert!(motion.converged);
    }

    #[test]
    fn test_unobstructed_reaches_target() {
        let sq = Path::square(0.0, 0.0, 1.0);
        let side = Path::square(5.0, 5.0, 1.0);
        let motion = resolve_motion(&sq, c(0.0, 0.0), c(10.0, 0.0), &[&side], &opts());
        assert_relative_eq!(motion.displacement.x, 10.0);
        assert_relative_eq!(motion.displacement.y, 0.0);
        assert!(motion.reached_target());
        assert_eq!(motion.obstacles, 0);
    }

    #[test]
    fn test_head_on_stops_before_contact() {
        let moving = Path::square(0.0, 0.0, 1.0);
        let wall = Path::square(2.0, 0.0, 1.0);
        let options = opts();
        let motion = resolve_motion(&moving, c(0.0, 0.0), c(2.0, 0.0), &[&wall], &options);

        // Contact at 1.0; bracket of width 2 / 2^8 below it
        assert_relative_eq!(motion.travelled, 0.992_187_5, epsilon = 1e-12);
        assert!(motion.converged);
        assert_eq!(motion.obstacles, 1);

        let d = motion.displacement;
        let placed = moving.translated(d.x, d.y);
        assert!(!paths_intersect(&placed, &wall, 32, 1e-6));

        let further = moving.translated(d.x + 2.0 * options.min_step, d.y);
        assert!(paths_intersect(&further, &wall, 32, 1e-6));
    }

    #[test]
    fn test_idempotent_second_run() {
        let moving = Path::square(0.0, 0.0, 1.0);
        let wall = Path::square(2.0, 0.0, 1.0);
        let first = resolve_motion(&moving, c(0.0, 0.0), c(2.0, 0.0), &[&wall], &opts());

        let placed = moving.translated(first.displacement.x, first.displacement.y);
        let again = resolve_motion(
            &placed,
            first.displacement,
            c(2.0, 0.0),
            &[&wall],
            &opts(),
        );
        assert_eq!(again.displacement, c(0.0, 0.0));
    }

    #[test]
    fn test_diagonal_motion() {
        let moving = Path::square(0.0, 0.0, 1.0);
        let wall = Path::square(5.0, 5.0, 2.0);
        let motion = resolve_motion(&moving, c(0.0, 0.0), c(5.0, 5.0), &[&wall], &opts());
        // Corners meet after 3.5 along each axis
        let expected = 3.5 * std::f64::consts::SQRT_2;
        assert!(motion.travelled <= expected);
        assert!(motion.travelled > expected - 0.01);
        assert_relative_eq!(motion.displacement.x, motion.displacement.y, epsilon = 1e-12);
    }

    #[test]
    fn test_already_overlapping_stays_put() {
        let moving = Path::square(0.0, 0.0, 1.0);
        let overlapping = Path::square(0.5, 0.0, 1.0);
        let motion = resolve_motion(&moving, c(0.0, 0.0), c(10.0, 0.0), &[&overlapping], &opts());
        assert_eq!(motion.displacement, c(0.0, 0.0));
        assert!(motion.converged);
    }

    #[test]
    fn test_grazing_obstacle_is_not_touched() {
        // The moving square slides along the bottom face of `above`
        let moving = Path::square(0.0, 0.0, 1.0);
        let above = Path::square(5.0, 1.0, 1.0);
        let motion = resolve_motion(&moving, c(0.0, 0.0), c(5.0, 0.0), &[&above], &opts());

        assert_eq!(motion.obstacles, 1);
        assert!(motion.travelled < 4.0 && motion.travelled > 3.99);
        let d = motion.displacement;
        assert!(!paths_intersect(&moving.translated(d.x, d.y), &above, 32, 1e-6));
    }

    #[test]
    fn test_nearest_obstacle_wins() {
        let moving = Path::square(0.0, 0.0, 1.0);
        let near = Path::square(4.0, 0.0, 1.0);
        let far = Path::square(8.0, 0.0, 1.0);
        let motion = resolve_motion(&moving, c(0.0, 0.0), c(10.0, 0.0), &[&far, &near], &opts());
        assert!(motion.travelled < 3.0);
        assert!(motion.travelled > 2.99);
        assert_eq!(motion.obstacles, 2);
    }

    #[test]
    fn test_concave_notch_is_reachable() {
        // U-shaped obstacle opening to the left, moving square slides into the slot
        let u = Path::polygon(&[
            (10.0, -5.0),
            (20.0, -5.0),
            (20.0, 5.0),
            (10.0, 5.0),
            (10.0, 2.0),
            (16.0, 2.0),
            (16.0, -2.0),
            (10.0, -2.0),
        ]);
        let moving = Path::square(0.0, 0.0, 2.0);
        let motion = resolve_motion(&moving, c(0.0, 0.0), c(15.0, 0.0), &[&u], &opts());
        // Blocked by the back wall of the slot at x = 16
        assert!(motion.travelled > 14.9 && motion.travelled < 15.0);
        let d = motion.displacement;
        assert!(!paths_intersect(&moving.translated(d.x, d.y), &u, 32, 1e-6));
    }

    #[test]
    fn test_iteration_cap_reports_instability() {
        let moving = Path::square(0.0, 0.0, 1.0);
        let wall = Path::square(2.0, 0.0, 1.0);
        let options = opts().with_max_iterations(3);
        let motion = resolve_motion(&moving, c(0.0, 0.0), c(2.0, 0.0), &[&wall], &options);
        assert!(!motion.converged);
        assert_eq!(motion.iterations, 3);
        // Still a known-safe distance
        let d = motion.displacement;
        assert!(!paths_intersect(&moving.translated(d.x, d.y), &wall, 32, 1e-6));
    }

    #[test]
    fn test_broad_phase_filters() {
        let moving = AABB2D::new(-0.5, -0.5, 0.5, 0.5);
        let items = vec![
            (AABB2D::new(4.5, -0.5, 5.5, 0.5), "ahead"),
            (AABB2D::new(4.5, 3.0, 5.5, 4.0), "beside"),
            (AABB2D::new(-5.5, -0.5, -4.5, 0.5), "behind"),
            (AABB2D::new(4.5, 0.5, 5.5, 1.5), "grazing"),
        ];
        let kept = broad_phase(&moving, 10.0, 0.0, items);
        assert_eq!(kept, vec!["ahead", "grazing"]);
    }

    #[test]
    fn test_box_motion() {
        let moving = AABB2D::new(-0.5, -0.5, 0.5, 0.5);
        let wall = AABB2D::new(4.5, -0.5, 5.5, 0.5);
        let motion = resolve_box_motion(&moving, c(0.0, 0.0), c(10.0, 0.0), &[wall]);
        assert_relative_eq!(motion.displacement.x, 4.0, epsilon = 1e-12);
        assert_relative_eq!(motion.fraction(), 0.4, epsilon = 1e-12);

        let free = resolve_box_motion(&moving, c(0.0, 0.0), c(10.0, 0.0), &[]);
        assert!(free.reached_target());
    }
}
