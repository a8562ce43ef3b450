//! Weight-derived scale factors.

use crate::measure::{centroid_and_area, MeasureOptions};
use crate::path::Path;
use crate::shape::Shape;
use cartopack_core::{Geometry, Scaling};
use geo::Coord;

/// Area-proportional factors: `sqrt(weight / area)`, normalized so the
/// largest is 1.
///
/// Entries with no area, or a non-positive area, get `None`.
pub fn area_proportional(weights: &[f64], areas: &[Option<f64>]) -> Vec<Option<f64>> {
    let raw: Vec<Option<f64>> = weights
        .iter()
        .zip(areas)
        .map(|(&w, area)| match area {
            Some(a) if *a > 0.0 => Some((w / a).sqrt()),
            _ => None,
        })
        .collect();

    let max = raw.iter().flatten().copied().fold(0.0_f64, f64::max);
    if max > 0.0 {
        raw.into_iter().map(|f| f.map(|f| f / max)).collect()
    } else {
        raw
    }
}

/// Factor for each shape under `scaling`. Explicit per-shape factors win.
///
/// `areas` holds each shape's unscaled area, `None` for degenerate shapes.
pub fn scale_factors(shapes: &[Shape], areas: &[Option<f64>], scaling: Scaling) -> Vec<f64> {
    let derived = match scaling {
        Scaling::None => vec![None; shapes.len()],
        Scaling::AreaProportional => {
            let weights: Vec<f64> = shapes.iter().map(|s| s.weight()).collect();
            area_proportional(&weights, areas)
        }
    };

    shapes
        .iter()
        .zip(derived)
        .map(|(shape, f)| shape.scale().or(f).unwrap_or(1.0))
        .collect()
}

/// Scales `path` by `factor` about a centroid the caller already measured.
pub fn scale_about(path: &Path, centroid: Coord<f64>, factor: f64) -> Path {
    if factor == 1.0 {
        return path.clone();
    }
    path.scaled(centroid.x, centroid.y, factor)
}

/// Scales `path` by `factor` about its own centroid.
///
/// Returns `None` if the path has no centroid.
pub fn scale_about_centroid(path: &Path, factor: f64, options: &MeasureOptions) -> Option<Path> {
    let (c, _) = centroid_and_area(path, options)?;
    Some(scale_about(path, c, factor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::total_area;
    use approx::assert_relative_eq;

    #[test]
    fn test_area_proportional_normalizes() {
        let factors = area_proportional(&[4.0, 1.0, 2.0], &[Some(1.0), Some(1.0), None]);
        assert_eq!(factors.len(), 3);
        assert_relative_eq!(factors[0].unwrap(), 1.0);
        assert_relative_eq!(factors[1].unwrap(), 0.5);
        assert!(factors[2].is_none());
    }

    #[test]
    fn test_scaled_areas_follow_weights() {
        let shapes = vec![
            Shape::new("big", Path::square(0.0, 0.0, 10.0), 9.0),
            Shape::new("small", Path::square(20.0, 0.0, 10.0), 1.0),
        ];
        let opts = MeasureOptions::default();
        let areas: Vec<Option<f64>> = shapes
            .iter()
            .map(|s| centroid_and_area(s.path(), &opts).map(|(_, a)| a))
            .collect();
        let factors = scale_factors(&shapes, &areas, Scaling::AreaProportional);
        assert_relative_eq!(factors[0], 1.0);
        assert_relative_eq!(factors[1], 1.0 / 3.0, epsilon = 1e-9);

        let a0 = total_area(&scale_about_centroid(shapes[0].path(), factors[0], &opts).unwrap(), &opts);
        let a1 = total_area(&scale_about_centroid(shapes[1].path(), factors[1], &opts).unwrap(), &opts);
        assert_relative_eq!(a0 / a1, 9.0, epsilon = 1e-3);
    }

    #[test]
    fn test_explicit_factor_wins() {
        let shapes = vec![
            Shape::new("a", Path::square(0.0, 0.0, 1.0), 1.0).with_scale(0.25),
            Shape::new("b", Path::square(5.0, 0.0, 1.0), 1.0),
        ];
        let areas = vec![Some(1.0), Some(1.0)];
        assert_eq!(scale_factors(&shapes, &areas, Scaling::None), vec![0.25, 1.0]);
        assert_eq!(
            scale_factors(&shapes, &areas, Scaling::AreaProportional),
            vec![0.25, 1.0]
        );
    }

    #[test]
    fn test_scale_preserves_centroid() {
        let opts = MeasureOptions::default();
        let path = Path::rectangle(2.0, 4.0, 6.0, 2.0);
        let scaled = scale_about_centroid(&path, 0.5, &opts).unwrap();
        let (before, area_before) = centroid_and_area(&path, &opts).unwrap();
        let (after, area_after) = centroid_and_area(&scaled, &opts).unwrap();
        assert_relative_eq!(before.x, after.x, epsilon = 1e-9);
        assert_relative_eq!(before.y, after.y, epsilon = 1e-9);
        assert_relative_eq!(area_after, area_before * 0.25, epsilon = 1e-9);
    }

    #[test]
    fn test_scale_about_given_centroid() {
        let path = Path::square(4.0, 4.0, 2.0);
        let scaled = scale_about(&path, Coord { x: 4.0, y: 4.0 }, 2.0);
        assert_eq!(scaled.bounds(), Some(cartopack_core::AABB2D::new(2.0, 2.0, 6.0, 6.0)));
        assert_eq!(scale_about(&path, Coord { x: 0.0, y: 0.0 }, 1.0), path);
    }

    #[test]
    fn test_scale_open_path_is_none() {
        let mut b = crate::path::PathBuilder::new();
        b.move_to(0.0, 0.0).line_to(1.0, 1.0);
        assert!(scale_about_centroid(&b.build(), 0.5, &MeasureOptions::default()).is_none());
    }
}
