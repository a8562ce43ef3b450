//! Axis-aligned bounding boxes and the swept-box (continuous) collision test.

use crate::{Error, Result};
use nalgebra::RealField;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 2D axis-aligned bounding box.
///
/// Invariant: `min_x <= max_x` and `min_y <= max_y`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AABB2D<S> {
    pub min_x: S,
    pub min_y: S,
    pub max_x: S,
    pub max_y: S,
}

/// Overlap window of two boxes along one axis.
#[derive(Debug, Clone, Copy)]
enum AxisWindow<S> {
    /// The projections never overlap during the motion.
    Never,
    /// The projections overlap for every value of the motion parameter.
    Always,
    /// The projections overlap for `entry <= t <= exit`.
    Between(S, S),
}

fn axis_window<S: RealField + Copy>(
    a_min: S,
    a_max: S,
    b_min: S,
    b_max: S,
    d: S,
    touching: bool,
) -> AxisWindow<S> {
    if d > S::zero() {
        AxisWindow::Between((b_min - a_max) / d, (b_max - a_min) / d)
    } else if d < S::zero() {
        AxisWindow::Between((b_max - a_min) / d, (b_min - a_max) / d)
    } else if touching && (a_max < b_min || a_min > b_max) {
        AxisWindow::Never
    } else if !touching && (a_max <= b_min || a_min >= b_max) {
        AxisWindow::Never
    } else {
        AxisWindow::Always
    }
}

impl<S: RealField + Copy> AABB2D<S> {
    /// Creates a box from two corners, ordering the coordinates as needed.
    pub fn new(x0: S, y0: S, x1: S, y1: S) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// Builds the tightest box around a set of points, or `None` if empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (S, S)>,
    {
        let mut iter = points.into_iter();
        let (x, y) = iter.next()?;
        let mut aabb = Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        };
        for (x, y) in iter {
            aabb.min_x = aabb.min_x.min(x);
            aabb.min_y = aabb.min_y.min(y);
            aabb.max_x = aabb.max_x.max(x);
            aabb.max_y = aabb.max_y.max(y);
        }
        Some(aabb)
    }

    /// Returns the width.
    pub fn width(&self) -> S {
        self.max_x - self.min_x
    }

    /// Returns the height.
    pub fn height(&self) -> S {
        self.max_y - self.min_y
    }

    /// Returns the center point.
    pub fn center(&self) -> (S, S) {
        let two = S::one() + S::one();
        (
            (self.min_x + self.max_x) / two,
            (self.min_y + self.max_y) / two,
        )
    }

    /// Returns the smallest box containing both boxes.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Merges a non-empty collection of boxes.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if the collection is empty.
    pub fn merge_all<'a, I>(boxes: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Self>,
        S: 'a,
    {
        let mut iter = boxes.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| Error::InvalidInput("No bounding boxes to merge".into()))?;
        Ok(iter.fold(*first, |acc, b| acc.merge(b)))
    }

    /// Returns this box moved by `(dx, dy)`.
    pub fn translated(&self, dx: S, dy: S) -> Self {
        Self {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// Returns the box covering every position of `self` along the motion `(dx, dy)`.
    pub fn swept_envelope(&self, dx: S, dy: S) -> Self {
        self.merge(&self.translated(dx, dy))
    }

    /// Returns true if the interiors overlap. Touching edges do not count.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains_point(&self, x: S, y: S) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Swept collision test (slab method).
    ///
    /// Moves `self` by `t * (dx, dy)` for `t` in `[0, 1]` against the static
    /// box `other` and returns the first `t` at which the interiors overlap.
    /// Boxes already overlapping at `t = 0` report `Some(0)` unless they are
    /// separating along the motion.
    pub fn sweep(&self, other: &Self, dx: S, dy: S) -> Option<S> {
        self.sweep_window(other, dx, dy, false)
    }

    /// Like [`sweep`](Self::sweep), but boundary contact counts as a hit.
    ///
    /// A box sliding along a face of `other`, or touching it at either end
    /// of the motion, is reported. Use this to pre-filter obstacles for a
    /// test where touching counts as intersecting.
    pub fn sweep_contact(&self, other: &Self, dx: S, dy: S) -> Option<S> {
        self.sweep_window(other, dx, dy, true)
    }

    fn sweep_window(&self, other: &Self, dx: S, dy: S, touching: bool) -> Option<S> {
        let windows = [
            axis_window(self.min_x, self.max_x, other.min_x, other.max_x, dx, touching),
            axis_window(self.min_y, self.max_y, other.min_y, other.max_y, dy, touching),
        ];

        // `None` stands for -inf (entry) and +inf (exit).
        let mut entry: Option<S> = None;
        let mut exit: Option<S> = None;
        for window in windows {
            match window {
                AxisWindow::Never => return None,
                AxisWindow::Always => {}
                AxisWindow::Between(lo, hi) => {
                    entry = Some(entry.map_or(lo, |e| e.max(lo)));
                    exit = Some(exit.map_or(hi, |x| x.min(hi)));
                }
            }
        }

        if let (Some(e), Some(x)) = (entry, exit) {
            if e > x {
                return None;
            }
        }
        if matches!(entry, Some(e) if e > S::one()) {
            return None;
        }
        match exit {
            Some(x) if touching && x < S::zero() => return None,
            Some(x) if !touching && x <= S::zero() => return None,
            _ => {}
        }

        Some(entry.map_or(S::zero(), |e| e.max(S::zero())))
    }
}

/// Free-function form of [`AABB2D::sweep`].
pub fn sweep_test<S: RealField + Copy>(a: &AABB2D<S>, b: &AABB2D<S>, dx: S, dy: S) -> Option<S> {
    a.sweep(b, dx, dy)
}
