//! Vector path model: segments, subpaths and multi-part paths.
//!
//! Paths are immutable values. Translating or scaling returns a new path, so
//! an obstacle set captured before a move keeps its pre-move geometry.

use cartopack_core::AABB2D;
use geo::Coord;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Circle approximation constant for cubic Bézier quarter arcs.
const KAPPA: f64 = 0.552_284_749_830_793_4;

/// A single curve piece.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Segment {
    /// Straight line.
    Line { from: Coord<f64>, to: Coord<f64> },
    /// Quadratic Bézier curve.
    Quadratic {
        from: Coord<f64>,
        ctrl: Coord<f64>,
        to: Coord<f64>,
    },
    /// Cubic Bézier curve.
    Cubic {
        from: Coord<f64>,
        ctrl1: Coord<f64>,
        ctrl2: Coord<f64>,
        to: Coord<f64>,
    },
}

impl Segment {
    /// Creates a line segment.
    pub fn line(from: (f64, f64), to: (f64, f64)) -> Self {
        Self::Line {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Returns the start point.
    pub fn start(&self) -> Coord<f64> {
        match *self {
            Self::Line { from, .. } | Self::Quadratic { from, .. } | Self::Cubic { from, .. } => {
                from
            }
        }
    }

    /// Returns the end point.
    pub fn end(&self) -> Coord<f64> {
        match *self {
            Self::Line { to, .. } | Self::Quadratic { to, .. } | Self::Cubic { to, .. } => to,
        }
    }

    /// Returns true for straight lines.
    pub fn is_line(&self) -> bool {
        matches!(self, Self::Line { .. })
    }

    /// Evaluates the segment at parameter `t` in `[0, 1]`.
    pub fn point(&self, t: f64) -> Coord<f64> {
        let mt = 1.0 - t;
        match *self {
            Self::Line { from, to } => from + (to - from) * t,
            Self::Quadratic { from, ctrl, to } => {
                from * (mt * mt) + ctrl * (2.0 * mt * t) + to * (t * t)
            }
            Self::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => {
                from * (mt * mt * mt)
                    + ctrl1 * (3.0 * mt * mt * t)
                    + ctrl2 * (3.0 * mt * t * t)
                    + to * (t * t * t)
            }
        }
    }

    /// Applies `f` to every defining point.
    fn map_points(&self, f: impl Fn(Coord<f64>) -> Coord<f64>) -> Self {
        match *self {
            Self::Line { from, to } => Self::Line {
                from: f(from),
                to: f(to),
            },
            Self::Quadratic { from, ctrl, to } => Self::Quadratic {
                from: f(from),
                ctrl: f(ctrl),
                to: f(to),
            },
            Self::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => Self::Cubic {
                from: f(from),
                ctrl1: f(ctrl1),
                ctrl2: f(ctrl2),
                to: f(to),
            },
        }
    }

    /// Returns the segment moved by `offset`.
    pub fn translated(&self, offset: Coord<f64>) -> Self {
        self.map_points(|p| p + offset)
    }

    /// Returns the segment scaled by `factor` about `origin`.
    pub fn scaled(&self, origin: Coord<f64>, factor: f64) -> Self {
        self.map_points(|p| origin + (p - origin) * factor)
    }

    /// Exact bounding box, including curve extrema.
    pub fn bounds(&self) -> AABB2D<f64> {
        let mut ts: Vec<f64> = vec![0.0, 1.0];
        match *self {
            Self::Line { .. } => {}
            Self::Quadratic { from, ctrl, to } => {
                for (p0, p1, p2) in [(from.x, ctrl.x, to.x), (from.y, ctrl.y, to.y)] {
                    let denom = p0 - 2.0 * p1 + p2;
                    if denom.abs() > f64::EPSILON {
                        ts.push((p0 - p1) / denom);
                    }
                }
            }
            Self::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => {
                for (p0, p1, p2, p3) in [
                    (from.x, ctrl1.x, ctrl2.x, to.x),
                    (from.y, ctrl1.y, ctrl2.y, to.y),
                ] {
                    // B'(t)/3 = a t^2 + b t + c
                    let a = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
                    let b = 2.0 * (p0 - 2.0 * p1 + p2);
                    let c = p1 - p0;
                    ts.extend(quadratic_roots(a, b, c));
                }
            }
        }

        let points = ts
            .into_iter()
            .filter(|t| (0.0..=1.0).contains(t))
            .map(|t| {
                let p = self.point(t);
                (p.x, p.y)
            });
        // Always contains t = 0 and t = 1
        AABB2D::from_points(points).unwrap_or_else(|| {
            let s = self.start();
            AABB2D::new(s.x, s.y, s.x, s.y)
        })
    }

    /// Pushes a polyline approximation, excluding the end point.
    fn flatten_into(&self, out: &mut Vec<Coord<f64>>, curve_steps: usize) {
        if self.is_line() {
            out.push(self.start());
            return;
        }
        let steps = curve_steps.max(1);
        out.extend((0..steps).map(|k| self.point(k as f64 / steps as f64)));
    }
}

/// Real roots of `a t^2 + b t + c = 0`.
fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < 1e-12 {
        if b.abs() < 1e-12 {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    let sq = disc.sqrt();
    vec![(-b + sq) / (2.0 * a), (-b - sq) / (2.0 * a)]
}

/// One continuous run of segments.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Subpath {
    segments: Vec<Segment>,
}

impl Subpath {
    /// Creates a subpath from connected segments.
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Returns the segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns true if the subpath has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the start point.
    pub fn start(&self) -> Option<Coord<f64>> {
        self.segments.first().map(Segment::start)
    }

    /// Returns the end point.
    pub fn end(&self) -> Option<Coord<f64>> {
        self.segments.last().map(Segment::end)
    }

    /// Returns true if start and end coincide within `tolerance`.
    pub fn is_closed(&self, tolerance: f64) -> bool {
        match (self.start(), self.end()) {
            (Some(s), Some(e)) => (s.x - e.x).hypot(s.y - e.y) <= tolerance,
            _ => false,
        }
    }

    /// Evaluates the subpath at `t` in `[0, 1]`; each segment covers an equal share.
    pub fn point(&self, t: f64) -> Option<Coord<f64>> {
        let n = self.segments.len();
        if n == 0 {
            return None;
        }
        let scaled = t.clamp(0.0, 1.0) * n as f64;
        let idx = (scaled.floor() as usize).min(n - 1);
        Some(self.segments[idx].point(scaled - idx as f64))
    }

    /// Samples `n` points at `t = i / n` for `i in 0..n`.
    pub fn sample(&self, n: usize) -> Vec<Coord<f64>> {
        (0..n)
            .filter_map(|i| self.point(i as f64 / n as f64))
            .collect()
    }

    /// Polyline approximation: straight segments are exact, curves get
    /// `curve_steps` points each. The end point is included only for open
    /// subpaths.
    pub fn flatten(&self, curve_steps: usize, closed: bool) -> Vec<Coord<f64>> {
        let mut out = Vec::with_capacity(self.segments.len() * 2);
        for segment in &self.segments {
            segment.flatten_into(&mut out, curve_steps);
        }
        if !closed {
            if let Some(end) = self.end() {
                out.push(end);
            }
        }
        out
    }

    /// Exact bounding box.
    pub fn bounds(&self) -> Option<AABB2D<f64>> {
        let boxes: Vec<AABB2D<f64>> = self.segments.iter().map(Segment::bounds).collect();
        AABB2D::merge_all(&boxes).ok()
    }

    /// Returns the subpath moved by `offset`.
    pub fn translated(&self, offset: Coord<f64>) -> Self {
        Self::new(self.segments.iter().map(|s| s.translated(offset)).collect())
    }

    /// Returns the subpath scaled by `factor` about `origin`.
    pub fn scaled(&self, origin: Coord<f64>, factor: f64) -> Self {
        Self::new(
            self.segments
                .iter()
                .map(|s| s.scaled(origin, factor))
                .collect(),
        )
    }
}

/// An ordered collection of subpaths treated as one shape.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Path {
    subpaths: Vec<Subpath>,
}

impl Path {
    /// Creates a path from subpaths. Empty subpaths are dropped.
    pub fn new(subpaths: Vec<Subpath>) -> Self {
        Self {
            subpaths: subpaths.into_iter().filter(|s| !s.is_empty()).collect(),
        }
    }

    /// Splits a flat segment list into continuous subpaths wherever a segment
    /// does not start where the previous one ended.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let mut subpaths = Vec::new();
        let mut current: Vec<Segment> = Vec::new();
        for segment in segments {
            if let Some(last) = current.last() {
                if last.end() != segment.start() {
                    subpaths.push(Subpath::new(std::mem::take(&mut current)));
                }
            }
            current.push(segment);
        }
        if !current.is_empty() {
            subpaths.push(Subpath::new(current));
        }
        Self::new(subpaths)
    }

    /// Creates a closed polygon from vertices.
    pub fn polygon(vertices: &[(f64, f64)]) -> Self {
        let mut builder = PathBuilder::new();
        let mut iter = vertices.iter();
        if let Some(&(x, y)) = iter.next() {
            builder.move_to(x, y);
            for &(x, y) in iter {
                builder.line_to(x, y);
            }
            builder.close();
        }
        builder.build()
    }

    /// Creates an axis-aligned rectangle with its lower-left corner at `(x, y)`.
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::polygon(&[
            (x, y),
            (x + width, y),
            (x + width, y + height),
            (x, y + height),
        ])
    }

    /// Creates a square of side `size` centered on `(cx, cy)`.
    pub fn square(cx: f64, cy: f64, size: f64) -> Self {
        let h = size / 2.0;
        Self::rectangle(cx - h, cy - h, size, size)
    }

    /// Creates a circle from four cubic Bézier quarter arcs.
    pub fn circle(cx: f64, cy: f64, radius: f64) -> Self {
        let k = KAPPA * radius;
        let mut builder = PathBuilder::new();
        builder
            .move_to(cx + radius, cy)
            .cubic_to(cx + radius, cy + k, cx + k, cy + radius, cx, cy + radius)
            .cubic_to(cx - k, cy + radius, cx - radius, cy + k, cx - radius, cy)
            .cubic_to(cx - radius, cy - k, cx - k, cy - radius, cx, cy - radius)
            .cubic_to(cx + k, cy - radius, cx + radius, cy - k, cx + radius, cy)
            .close();
        builder.build()
    }

    /// Concatenates the subpaths of several paths into one multi-part path.
    pub fn concat<'a, I>(paths: I) -> Self
    where
        I: IntoIterator<Item = &'a Path>,
    {
        Self::new(
            paths
                .into_iter()
                .flat_map(|p| p.subpaths.iter().cloned())
                .collect(),
        )
    }

    /// Returns the subpaths.
    pub fn subpaths(&self) -> &[Subpath] {
        &self.subpaths
    }

    /// Returns true if the path has no subpaths.
    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }

    /// Returns the total number of segments.
    pub fn segment_count(&self) -> usize {
        self.subpaths.iter().map(|s| s.segments.len()).sum()
    }

    /// Iterates over the closed subpaths.
    pub fn closed_subpaths(&self, tolerance: f64) -> impl Iterator<Item = &Subpath> {
        self.subpaths.iter().filter(move |s| s.is_closed(tolerance))
    }

    /// Exact bounding box, or `None` for an empty path.
    pub fn bounds(&self) -> Option<AABB2D<f64>> {
        let boxes: Vec<AABB2D<f64>> = self.subpaths.iter().filter_map(Subpath::bounds).collect();
        AABB2D::merge_all(&boxes).ok()
    }

    /// Returns the path moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let offset = Coord { x: dx, y: dy };
        Self {
            subpaths: self.subpaths.iter().map(|s| s.translated(offset)).collect(),
        }
    }

    /// Returns the path scaled by `factor` about `(ox, oy)`.
    pub fn scaled(&self, ox: f64, oy: f64, factor: f64) -> Self {
        let origin = Coord { x: ox, y: oy };
        Self {
            subpaths: self
                .subpaths
                .iter()
                .map(|s| s.scaled(origin, factor))
                .collect(),
        }
    }
}

/// Incremental path construction in absolute coordinates.
///
/// ```rust
/// use cartopack_d2::PathBuilder;
///
/// let mut builder = PathBuilder::new();
/// builder.move_to(0.0, 0.0).line_to(4.0, 0.0).quad_to(6.0, 2.0, 4.0, 4.0).close();
/// let path = builder.build();
/// assert_eq!(path.subpaths().len(), 1);
/// assert!(path.subpaths()[0].is_closed(1e-9));
/// ```
#[derive(Debug, Default)]
pub struct PathBuilder {
    subpaths: Vec<Subpath>,
    current: Vec<Segment>,
    start: Option<Coord<f64>>,
    cursor: Option<Coord<f64>>,
}

impl PathBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn finish_current(&mut self) {
        if !self.current.is_empty() {
            self.subpaths
                .push(Subpath::new(std::mem::take(&mut self.current)));
        }
    }

    fn cursor_or_origin(&mut self) -> Coord<f64> {
        *self.cursor.get_or_insert(Coord { x: 0.0, y: 0.0 })
    }

    /// Starts a new subpath at `(x, y)`.
    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.finish_current();
        let p = Coord { x, y };
        self.start = Some(p);
        self.cursor = Some(p);
        self
    }

    /// Adds a straight line to `(x, y)`.
    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        let from = self.cursor_or_origin();
        let to = Coord { x, y };
        self.start.get_or_insert(from);
        self.current.push(Segment::Line { from, to });
        self.cursor = Some(to);
        self
    }

    /// Adds a quadratic Bézier curve.
    pub fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) -> &mut Self {
        let from = self.cursor_or_origin();
        let to = Coord { x, y };
        self.start.get_or_insert(from);
        self.current.push(Segment::Quadratic {
            from,
            ctrl: Coord { x: cx, y: cy },
            to,
        });
        self.cursor = Some(to);
        self
    }

    /// Adds a cubic Bézier curve.
    pub fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) -> &mut Self {
        let from = self.cursor_or_origin();
        let to = Coord { x, y };
        self.start.get_or_insert(from);
        self.current.push(Segment::Cubic {
            from,
            ctrl1: Coord { x: c1x, y: c1y },
            ctrl2: Coord { x: c2x, y: c2y },
            to,
        });
        self.cursor = Some(to);
        self
    }

    /// Closes the current subpath with a line back to its start if needed.
    pub fn close(&mut self) -> &mut Self {
        if let (Some(start), Some(cursor)) = (self.start, self.cursor) {
            if !self.current.is_empty() && start != cursor {
                self.current.push(Segment::Line {
                    from: cursor,
                    to: start,
                });
            }
            self.cursor = Some(start);
        }
        self.finish_current();
        self
    }

    /// Finishes construction.
    pub fn build(mut self) -> Path {
        self.finish_current();
        Path::new(self.subpaths)
    }
}
