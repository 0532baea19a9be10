//! Labeled spatiotemporal intervals.
//!
//! An [`Interval`] pairs a [`Bounds3D`] extent with an arbitrary payload.
//! The engine never inspects payloads; they flow through set operations and
//! are combined by user-supplied closures.

use serde::{Deserialize, Serialize};
use spatiq_types::{Bounds1D, Bounds3D};

use crate::error::Result;

/// A spatiotemporal extent carrying a payload.
///
/// # Examples
///
/// ```
/// use spatiq::Interval;
///
/// let a = Interval::from_temporal(0.0, 5.0, "walk")?;
/// let b = Interval::from_temporal(4.0, 9.0, "run")?;
///
/// assert!(a.temporal_overlaps(&b));
/// assert_eq!(a.length(), 5.0);
/// # Ok::<(), spatiq::SpatiqError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval<P> {
    pub bounds: Bounds3D,
    pub payload: P,
}

impl<P> Interval<P> {
    /// Create an interval from explicit bounds.
    pub fn new(bounds: Bounds3D, payload: P) -> Self {
        Self { bounds, payload }
    }

    /// Create a purely temporal interval spanning the full spatial frame.
    pub fn from_temporal(t1: f64, t2: f64, payload: P) -> Result<Self> {
        Ok(Self {
            bounds: Bounds3D::from_temporal(t1, t2)?,
            payload,
        })
    }

    /// Start of the temporal extent.
    #[inline]
    pub fn t1(&self) -> f64 {
        self.bounds.t.start
    }

    /// End of the temporal extent.
    #[inline]
    pub fn t2(&self) -> f64 {
        self.bounds.t.end
    }

    /// Temporal extent as a `Bounds1D`.
    #[inline]
    pub fn temporal(&self) -> Bounds1D {
        self.bounds.t
    }

    /// Temporal length.
    #[inline]
    pub fn length(&self) -> f64 {
        self.bounds.t.length()
    }

    /// Whether the temporal extents overlap (touching counts).
    pub fn temporal_overlaps<Q>(&self, other: &Interval<Q>) -> bool {
        self.bounds.temporal_overlaps(&other.bounds)
    }

    /// Whether the extents overlap on every axis.
    pub fn overlaps<Q>(&self, other: &Interval<Q>) -> bool {
        self.bounds.overlaps(&other.bounds)
    }

    /// Combine with another interval using explicit bounds and payload ops.
    pub fn combine<Q, R>(
        &self,
        other: &Interval<Q>,
        bounds_op: impl FnOnce(&Bounds3D, &Bounds3D) -> Bounds3D,
        payload_op: impl FnOnce(&P, &Q) -> R,
    ) -> Interval<R> {
        Interval {
            bounds: bounds_op(&self.bounds, &other.bounds),
            payload: payload_op(&self.payload, &other.payload),
        }
    }

    /// Combine by spanning bounds.
    pub fn span_with<Q, R>(
        &self,
        other: &Interval<Q>,
        payload_op: impl FnOnce(&P, &Q) -> R,
    ) -> Interval<R> {
        self.combine(other, |a, b| a.span(b), payload_op)
    }

    /// Combine by intersecting bounds; `None` when any axis is disjoint.
    pub fn intersect_with<Q, R>(
        &self,
        other: &Interval<Q>,
        payload_op: impl FnOnce(&P, &Q) -> R,
    ) -> Option<Interval<R>> {
        let bounds = self.bounds.intersect(&other.bounds)?;
        Some(Interval {
            bounds,
            payload: payload_op(&self.payload, &other.payload),
        })
    }

    /// Replace the payload, keeping bounds.
    pub fn map_payload<Q>(&self, f: impl FnOnce(&P) -> Q) -> Interval<Q> {
        Interval {
            bounds: self.bounds,
            payload: f(&self.payload),
        }
    }

    /// Replace the bounds, keeping the payload.
    pub fn with_bounds(self, bounds: Bounds3D) -> Interval<P> {
        Interval {
            bounds,
            payload: self.payload,
        }
    }
}
