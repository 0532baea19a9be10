use geo::{Rect, coord};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::BoundsError;

/// A closed-open extent `[start, end)` on a single axis.
///
/// `Bounds1D` is the building block for every interval in Spatiq: the time
/// axis of an interval is a `Bounds1D` in seconds, the spatial axes are
/// `Bounds1D` values in the relative unit frame.
///
/// # Examples
///
/// ```
/// use spatiq_types::Bounds1D;
///
/// let a = Bounds1D::new(0.0, 10.0).unwrap();
/// let b = Bounds1D::new(5.0, 20.0).unwrap();
///
/// assert!(a.overlaps(&b));
/// assert_eq!(a.span(&b), Bounds1D::new(0.0, 20.0).unwrap());
/// assert_eq!(a.intersect(&b), Some(Bounds1D::new(5.0, 10.0).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds1D {
    pub start: f64,
    pub end: f64,
}

impl Bounds1D {
    /// Create an extent, validating that `start <= end`.
    pub fn new(start: f64, end: f64) -> Result<Self, BoundsError> {
        if start > end {
            return Err(BoundsError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Create an extent without validating the ordering of the endpoints.
    ///
    /// Callers must guarantee `start <= end`.
    pub fn unchecked(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// A zero-length extent at `at`.
    pub fn point(at: f64) -> Self {
        Self { start: at, end: at }
    }

    /// The unit extent `[0, 1)`, the full axis of the relative frame.
    pub fn unit() -> Self {
        Self {
            start: 0.0,
            end: 1.0,
        }
    }

    /// Length of the extent.
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Smallest extent covering both `self` and `other`.
    pub fn span(&self, other: &Bounds1D) -> Bounds1D {
        Bounds1D {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Overlapping extent of `self` and `other`, if any.
    ///
    /// Extents that merely touch at an endpoint produce a zero-length
    /// intersection rather than `None`.
    pub fn intersect(&self, other: &Bounds1D) -> Option<Bounds1D> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start <= end {
            Some(Bounds1D { start, end })
        } else {
            None
        }
    }

    /// Whether `self` and `other` share any extent (touching counts).
    pub fn overlaps(&self, other: &Bounds1D) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Whether `at` falls inside the extent.
    pub fn contains_point(&self, at: f64) -> bool {
        at >= self.start && at <= self.end
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Bounds1D) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Shift both endpoints by `amount`.
    pub fn translate(&self, amount: f64) -> Bounds1D {
        Bounds1D {
            start: self.start + amount,
            end: self.end + amount,
        }
    }

    /// Scale both endpoints by `factor` (about the origin).
    pub fn scale(&self, factor: f64) -> Bounds1D {
        Bounds1D {
            start: self.start * factor,
            end: self.end * factor,
        }
    }

    /// Grow the extent by `amount` on both sides.
    ///
    /// A negative `amount` shrinks the extent; shrinking past zero length
    /// collapses it to a point at the midpoint instead of inverting.
    ///
    /// # Examples
    ///
    /// ```
    /// use spatiq_types::Bounds1D;
    ///
    /// let b = Bounds1D::new(4.0, 6.0).unwrap();
    /// assert_eq!(b.dilate(1.0), Bounds1D::new(3.0, 7.0).unwrap());
    /// assert_eq!(b.dilate(-2.0), Bounds1D::point(5.0));
    /// ```
    pub fn dilate(&self, amount: f64) -> Bounds1D {
        let start = self.start - amount;
        let end = self.end + amount;
        if start > end {
            let mid = (self.start + self.end) / 2.0;
            Bounds1D::point(mid)
        } else {
            Bounds1D { start, end }
        }
    }

    /// Distance between the extents, zero when they overlap.
    pub fn distance_to(&self, other: &Bounds1D) -> f64 {
        if self.overlaps(other) {
            0.0
        } else if self.end < other.start {
            other.start - self.end
        } else {
            self.start - other.end
        }
    }

    /// Midpoint of the extent.
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    /// Total ordering by `(start, end)` using `f64::total_cmp`.
    pub fn order(&self, other: &Bounds1D) -> Ordering {
        self.start
            .total_cmp(&other.start)
            .then_with(|| self.end.total_cmp(&other.end))
    }
}

/// A spatiotemporal extent: a temporal `Bounds1D` plus an axis-aligned
/// spatial box in the relative unit frame.
///
/// The spatial axes follow image conventions: `x` grows rightward and `y`
/// grows downward, both typically within `[0, 1]`. Intervals that carry no
/// meaningful spatial extent use the full unit frame
/// (see [`Bounds3D::from_temporal`]).
///
/// # Examples
///
/// ```
/// use spatiq_types::{Bounds1D, Bounds3D};
///
/// // A detection from t=1s to t=3s in the upper-left quadrant.
/// let b = Bounds3D::new(
///     Bounds1D::new(1.0, 3.0).unwrap(),
///     Bounds1D::new(0.0, 0.5).unwrap(),
///     Bounds1D::new(0.0, 0.5).unwrap(),
/// );
/// assert_eq!(b.area(), 0.25);
///
/// // A purely temporal interval spans the whole frame.
/// let t = Bounds3D::from_temporal(0.0, 10.0).unwrap();
/// assert_eq!(t.area(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds3D {
    pub t: Bounds1D,
    pub x: Bounds1D,
    pub y: Bounds1D,
}

impl Bounds3D {
    pub fn new(t: Bounds1D, x: Bounds1D, y: Bounds1D) -> Self {
        Self { t, x, y }
    }

    /// A purely temporal extent covering the full spatial frame.
    pub fn from_temporal(t1: f64, t2: f64) -> Result<Self, BoundsError> {
        Ok(Self {
            t: Bounds1D::new(t1, t2)?,
            x: Bounds1D::unit(),
            y: Bounds1D::unit(),
        })
    }

    /// Build from raw coordinates, validating each axis.
    pub fn from_coords(
        t1: f64,
        t2: f64,
        x1: f64,
        x2: f64,
        y1: f64,
        y2: f64,
    ) -> Result<Self, BoundsError> {
        Ok(Self {
            t: Bounds1D::new(t1, t2)?,
            x: Bounds1D::new(x1, x2)?,
            y: Bounds1D::new(y1, y2)?,
        })
    }

    /// Smallest extent covering both operands, combined per axis.
    pub fn span(&self, other: &Bounds3D) -> Bounds3D {
        Bounds3D {
            t: self.t.span(&other.t),
            x: self.x.span(&other.x),
            y: self.y.span(&other.y),
        }
    }

    /// Per-axis intersection; `None` when any axis is disjoint.
    pub fn intersect(&self, other: &Bounds3D) -> Option<Bounds3D> {
        Some(Bounds3D {
            t: self.t.intersect(&other.t)?,
            x: self.x.intersect(&other.x)?,
            y: self.y.intersect(&other.y)?,
        })
    }

    /// Whether the extents overlap on every axis.
    pub fn overlaps(&self, other: &Bounds3D) -> bool {
        self.t.overlaps(&other.t) && self.x.overlaps(&other.x) && self.y.overlaps(&other.y)
    }

    /// Whether the extents overlap on the time axis alone.
    pub fn temporal_overlaps(&self, other: &Bounds3D) -> bool {
        self.t.overlaps(&other.t)
    }

    /// The spatial box as a `geo::Rect` for geometric computations.
    pub fn spatial_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.x.start, y: self.y.start },
            coord! { x: self.x.end, y: self.y.end },
        )
    }

    /// Area of the spatial box.
    pub fn area(&self) -> f64 {
        self.x.length() * self.y.length()
    }

    /// Temporal length times spatial area.
    pub fn volume(&self) -> f64 {
        self.t.length() * self.area()
    }

    /// Temporal length of the extent.
    pub fn length(&self) -> f64 {
        self.t.length()
    }

    /// Reset the spatial axes to the full unit frame, keeping time.
    pub fn expand_to_frame(&self) -> Bounds3D {
        Bounds3D {
            t: self.t,
            x: Bounds1D::unit(),
            y: Bounds1D::unit(),
        }
    }

    /// Dilate the time axis by `amount`, leaving the spatial axes alone.
    pub fn dilate_temporal(&self, amount: f64) -> Bounds3D {
        Bounds3D {
            t: self.t.dilate(amount),
            x: self.x,
            y: self.y,
        }
    }

    /// Lexicographic ordering by `(t, x, y)` endpoints.
    pub fn order(&self, other: &Bounds3D) -> Ordering {
        self.t
            .order(&other.t)
            .then_with(|| self.x.order(&other.x))
            .then_with(|| self.y.order(&other.y))
    }
}
