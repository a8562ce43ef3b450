//! Area and centroid of multi-part paths.
//!
//! Each closed subpath is approximated by a polygon of uniformly spaced
//! samples. The shoelace formula gives its signed area and, in the same pass,
//! the first moments that locate its centroid. Subpath centroids are then
//! combined by an area-weighted average.

use crate::path::{Path, Subpath};
use cartopack_core::Config;
use geo::Coord;
use rayon::prelude::*;

/// Parameters for measuring paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureOptions {
    /// Samples per closed subpath.
    pub samples: usize,
    /// Damping term: each subpath weighs `|area| + epsilon * max_area`.
    pub epsilon: f64,
    /// Start/end distance under which a subpath counts as closed.
    pub closed_tolerance: f64,
}

impl Default for MeasureOptions {
    fn default() -> Self {
        Self {
            samples: 1000,
            epsilon: 0.0,
            closed_tolerance: 1e-6,
        }
    }
}

impl From<&Config> for MeasureOptions {
    fn from(config: &Config) -> Self {
        Self {
            samples: config.centroid_samples,
            epsilon: config.centroid_epsilon,
            closed_tolerance: config.closed_tolerance,
        }
    }
}

impl MeasureOptions {
    /// Sets the sample count.
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Sets the damping term.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the closed-subpath tolerance.
    pub fn with_closed_tolerance(mut self, tolerance: f64) -> Self {
        self.closed_tolerance = tolerance;
        self
    }
}

/// Signed area and centroid of one closed subpath.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubpathMeasure {
    pub centroid: Coord<f64>,
    /// Positive for counter-clockwise outlines in a y-up frame.
    pub signed_area: f64,
}

/// Shoelace area and centroid of a closed polygon ring.
///
/// Returns `None` when the area is exactly zero.
pub fn polygon_measure(points: &[Coord<f64>]) -> Option<SubpathMeasure> {
    let n = points.len();
    if n < 3 {
        return None;
    }

    let mut twice_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let p0 = points[i];
        let p1 = points[(i + 1) % n];
        let cross = p0.x * p1.y - p1.x * p0.y;
        twice_area += cross;
        cx += (p0.x + p1.x) * cross;
        cy += (p0.y + p1.y) * cross;
    }

    let area = twice_area * 0.5;
    if area == 0.0 || !area.is_finite() {
        return None;
    }

    Some(SubpathMeasure {
        centroid: Coord {
            x: cx / (6.0 * area),
            y: cy / (6.0 * area),
        },
        signed_area: area,
    })
}

/// Measures a subpath, or `None` if it is open or has zero area.
pub fn measure_subpath(subpath: &Subpath, options: &MeasureOptions) -> Option<SubpathMeasure> {
    if !subpath.is_closed(options.closed_tolerance) {
        return None;
    }
    polygon_measure(&subpath.sample(options.samples))
}

fn path_measures(path: &Path, options: &MeasureOptions) -> Vec<SubpathMeasure> {
    path.subpaths()
        .iter()
        .filter_map(|s| measure_subpath(s, options))
        .collect()
}

/// Area-weighted average of subpath centroids.
///
/// Returns the combined centroid and the summed absolute area.
pub fn aggregate(measures: &[SubpathMeasure], epsilon: f64) -> Option<(Coord<f64>, f64)> {
    if measures.is_empty() {
        return None;
    }

    let max_area = measures
        .iter()
        .map(|m| m.signed_area.abs())
        .fold(0.0_f64, f64::max);

    let mut total_weight = 0.0;
    let mut total_area = 0.0;
    let mut wx = 0.0;
    let mut wy = 0.0;
    for m in measures {
        let area = m.signed_area.abs();
        let weight = area + epsilon * max_area;
        wx += m.centroid.x * weight;
        wy += m.centroid.y * weight;
        total_weight += weight;
        total_area += area;
    }

    if total_weight <= 0.0 {
        return None;
    }

    Some((
        Coord {
            x: wx / total_weight,
            y: wy / total_weight,
        },
        total_area,
    ))
}

/// Centroid and total enclosed area of a path.
///
/// Open subpaths and zero-area subpaths are ignored. Returns `None` if nothing
/// is left; callers treat that as "skip this shape".
pub fn centroid_and_area(path: &Path, options: &MeasureOptions) -> Option<(Coord<f64>, f64)> {
    aggregate(&path_measures(path, options), options.epsilon)
}

/// Centroid and total area over many paths, as if their subpaths formed one path.
pub fn combined_centroid(paths: &[&Path], options: &MeasureOptions) -> Option<(Coord<f64>, f64)> {
    let measures: Vec<SubpathMeasure> = paths
        .par_iter()
        .flat_map_iter(|p| path_measures(p, options))
        .collect();
    aggregate(&measures, options.epsilon)
}

/// Sum of absolute areas of the closed subpaths.
pub fn total_area(path: &Path, options: &MeasureOptions) -> f64 {
    path_measures(path, options)
        .iter()
        .map(|m| m.signed_area.abs())
        .sum()
}
