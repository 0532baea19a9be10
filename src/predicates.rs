//! Predicate constructors and combinators for interval queries.
//!
//! Predicates are plain closures over interval references, so they compose
//! with ordinary Rust and slot directly into [`IntervalSet::join`],
//! [`IntervalSet::filter_against`] and friends. This module provides the
//! standard temporal relations over the time axis, spatial relations over
//! the unit-frame box (computed with the `geo` crate), and combinators for
//! building compound conditions.
//!
//! Spatial predicates follow image conventions: `x` grows rightward, `y`
//! grows downward, so "above" means smaller `y`.
//!
//! [`IntervalSet::join`]: crate::IntervalSet::join
//! [`IntervalSet::filter_against`]: crate::IntervalSet::filter_against

use geo::{Centroid, Contains, Distance, Euclidean, Intersects};
use spatiq_types::Bounds3D;

use crate::interval::Interval;

// ---------------------------------------------------------------------------
// Combinators
// ---------------------------------------------------------------------------

/// Both predicates must hold.
pub fn both<P, Q>(
    f: impl Fn(&Interval<P>, &Interval<Q>) -> bool,
    g: impl Fn(&Interval<P>, &Interval<Q>) -> bool,
) -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    move |a, b| f(a, b) && g(a, b)
}

/// At least one predicate must hold.
pub fn either<P, Q>(
    f: impl Fn(&Interval<P>, &Interval<Q>) -> bool,
    g: impl Fn(&Interval<P>, &Interval<Q>) -> bool,
) -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    move |a, b| f(a, b) || g(a, b)
}

/// Inverts a predicate.
pub fn negate<P, Q>(
    f: impl Fn(&Interval<P>, &Interval<Q>) -> bool,
) -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    move |a, b| !f(a, b)
}

/// Admits every pair.
pub fn always<P, Q>() -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    |_, _| true
}

/// Rejects every pair.
pub fn never<P, Q>() -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    |_, _| false
}

// ---------------------------------------------------------------------------
// Temporal relations
// ---------------------------------------------------------------------------

/// `a` ends before `b` starts, with a gap of at most `max_gap`.
///
/// Pass `f64::INFINITY` for an unbounded gap.
///
/// # Examples
///
/// ```
/// use spatiq::{Interval, predicates::before};
///
/// let a = Interval::from_temporal(0.0, 2.0, ())?;
/// let b = Interval::from_temporal(3.0, 4.0, ())?;
/// assert!(before(5.0)(&a, &b));
/// assert!(!before(0.5)(&a, &b));
/// # Ok::<(), spatiq::SpatiqError>(())
/// ```
pub fn before<P, Q>(max_gap: f64) -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    move |a, b| {
        let gap = b.t1() - a.t2();
        gap >= 0.0 && gap <= max_gap
    }
}

/// `a` starts after `b` ends, with a gap of at most `max_gap`.
pub fn after<P, Q>(max_gap: f64) -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    move |a, b| {
        let gap = a.t1() - b.t2();
        gap >= 0.0 && gap <= max_gap
    }
}

/// The temporal extents strictly overlap (sharing only an endpoint does
/// not count).
pub fn t_overlaps<P, Q>() -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    |a, b| a.t1() < b.t2() && b.t1() < a.t2()
}

/// `a` starts first and runs into `b` without covering it.
pub fn overlaps_before<P, Q>() -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    |a, b| a.t1() < b.t1() && a.t2() > b.t1() && a.t2() < b.t2()
}

/// `b` starts first and runs into `a` without covering it.
pub fn overlaps_after<P, Q>() -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    |a, b| b.t1() < a.t1() && b.t2() > a.t1() && b.t2() < a.t2()
}

/// The extents start together (within `eps`) and `a` ends first.
pub fn starts<P, Q>(eps: f64) -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    move |a, b| (a.t1() - b.t1()).abs() <= eps && a.t2() < b.t2()
}

/// The extents end together (within `eps`) and `a` starts last.
pub fn finishes<P, Q>(eps: f64) -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    move |a, b| (a.t2() - b.t2()).abs() <= eps && a.t1() > b.t1()
}

/// `a` lies strictly inside `b`.
pub fn during<P, Q>() -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    |a, b| a.t1() > b.t1() && a.t2() < b.t2()
}

/// `b` lies strictly inside `a`.
pub fn contains_t<P, Q>() -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    |a, b| b.t1() > a.t1() && b.t2() < a.t2()
}

/// `a` ends where `b` starts, within `eps`.
pub fn meets_before<P, Q>(eps: f64) -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    move |a, b| (a.t2() - b.t1()).abs() <= eps
}

/// `a` starts where `b` ends, within `eps`.
pub fn meets_after<P, Q>(eps: f64) -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    move |a, b| (a.t1() - b.t2()).abs() <= eps
}

/// Both endpoints coincide within `eps`.
pub fn t_equal<P, Q>(eps: f64) -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    move |a, b| (a.t1() - b.t1()).abs() <= eps && (a.t2() - b.t2()).abs() <= eps
}

// ---------------------------------------------------------------------------
// Spatial relations
// ---------------------------------------------------------------------------

/// `a`'s box sits entirely above `b`'s (smaller `y`).
pub fn above<P, Q>() -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    |a, b| a.bounds.y.end <= b.bounds.y.start
}

/// `a`'s box sits entirely below `b`'s (larger `y`).
pub fn below<P, Q>() -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    |a, b| a.bounds.y.start >= b.bounds.y.end
}

/// `a`'s box sits entirely left of `b`'s.
pub fn left_of<P, Q>() -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    |a, b| a.bounds.x.end <= b.bounds.x.start
}

/// `a`'s box sits entirely right of `b`'s.
pub fn right_of<P, Q>() -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    |a, b| a.bounds.x.start >= b.bounds.x.end
}

/// The boxes overlap on the x axis.
pub fn x_overlaps<P, Q>() -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    |a, b| a.bounds.x.overlaps(&b.bounds.x)
}

/// The boxes overlap on the y axis.
pub fn y_overlaps<P, Q>() -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    |a, b| a.bounds.y.overlaps(&b.bounds.y)
}

/// The boxes intersect in the plane.
pub fn spatial_overlaps<P, Q>() -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    |a, b| a.bounds.spatial_rect().intersects(&b.bounds.spatial_rect())
}

/// `a`'s box contains `b`'s box.
pub fn contains_box<P, Q>() -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    |a, b| a.bounds.spatial_rect().contains(&b.bounds.spatial_rect())
}

/// The box areas differ by at most `eps`.
pub fn same_area<P, Q>(eps: f64) -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    move |a, b| (a.bounds.area() - b.bounds.area()).abs() <= eps
}

/// Intersection-over-union of the boxes is at least `threshold`.
///
/// # Examples
///
/// ```
/// use spatiq::{Interval, predicates::iou_at_least};
/// use spatiq_types::Bounds3D;
///
/// let a = Interval::new(Bounds3D::from_coords(0.0, 1.0, 0.0, 0.5, 0.0, 0.5)?, ());
/// let b = Interval::new(Bounds3D::from_coords(0.0, 1.0, 0.0, 0.5, 0.0, 0.5)?, ());
/// assert!(iou_at_least(0.99)(&a, &b));
/// # Ok::<(), spatiq::SpatiqError>(())
/// ```
pub fn iou_at_least<P, Q>(threshold: f64) -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    move |a, b| iou(&a.bounds, &b.bounds) >= threshold
}

/// The box centroids lie within `max_distance` in the unit frame.
pub fn within_distance<P, Q>(max_distance: f64) -> impl Fn(&Interval<P>, &Interval<Q>) -> bool {
    move |a, b| {
        let ca = a.bounds.spatial_rect().centroid();
        let cb = b.bounds.spatial_rect().centroid();
        Euclidean.distance(ca, cb) <= max_distance
    }
}

/// Intersection-over-union of two spatial boxes.
pub fn iou(a: &Bounds3D, b: &Bounds3D) -> f64 {
    let overlap_x = match a.x.intersect(&b.x) {
        Some(i) => i.length(),
        None => return 0.0,
    };
    let overlap_y = match a.y.intersect(&b.y) {
        Some(i) => i.length(),
        None => return 0.0,
    };
    let intersection = overlap_x * overlap_y;
    let union = a.area() + b.area() - intersection;
    if union <= 0.0 {
        0.0
    } else {
        intersection / union
    }
}

// ---------------------------------------------------------------------------
// Unary helpers
// ---------------------------------------------------------------------------

/// Lift a payload check into an interval predicate.
pub fn payload_satisfies<P>(f: impl Fn(&P) -> bool) -> impl Fn(&Interval<P>) -> bool {
    move |i| f(&i.payload)
}

/// Temporal length is at least `min`.
pub fn length_at_least<P>(min: f64) -> impl Fn(&Interval<P>) -> bool {
    move |i| i.length() >= min
}

/// Temporal length is at most `max`.
pub fn length_at_most<P>(max: f64) -> impl Fn(&Interval<P>) -> bool {
    move |i| i.length() <= max
}

#[cfg(test)]
mod tests {
    use super::*;
    use spatiq_types::Bounds3D;

    fn t(t1: f64, t2: f64) -> Interval<()> {
        Interval::from_temporal(t1, t2, ()).unwrap()
    }

    fn boxed(x1: f64, x2: f64, y1: f64, y2: f64) -> Interval<()> {
        Interval::new(Bounds3D::from_coords(0.0, 1.0, x1, x2, y1, y2).unwrap(), ())
    }

    #[test]
    fn test_before_after() {
        let a = t(0.0, 2.0);
        let b = t(5.0, 6.0);
        assert!(before(3.0)(&a, &b));
        assert!(!before(2.0)(&a, &b));
        assert!(before(f64::INFINITY)(&a, &b));
        assert!(after(3.0)(&b, &a));
        assert!(!before(1.0)(&b, &a));
    }

    #[test]
    fn test_allen_relations() {
        let a = t(0.0, 5.0);
        let b = t(3.0, 8.0);
        assert!(t_overlaps()(&a, &b));
        assert!(overlaps_before()(&a, &b));
        assert!(overlaps_after()(&b, &a));
        assert!(!overlaps_before()(&b, &a));

        let inner = t(4.0, 5.0);
        let outer = t(3.0, 8.0);
        assert!(during()(&inner, &outer));
        assert!(contains_t()(&outer, &inner));
        assert!(!during()(&outer, &inner));

        assert!(starts(0.0)(&t(3.0, 5.0), &outer));
        assert!(finishes(0.0)(&t(6.0, 8.0), &outer));
        assert!(meets_before(0.0)(&t(0.0, 3.0), &outer));
        assert!(meets_after(0.0)(&outer, &t(0.0, 3.0)));
        assert!(t_equal(0.1)(&t(3.0, 8.05), &outer));
    }

    #[test]
    fn test_touching_does_not_overlap() {
        let a = t(0.0, 3.0);
        let b = t(3.0, 5.0);
        assert!(!t_overlaps()(&a, &b));
        assert!(before(0.0)(&a, &b));
        assert!(meets_before(0.0)(&a, &b));
    }

    #[test]
    fn test_spatial_layout() {
        let top_left = boxed(0.0, 0.3, 0.0, 0.3);
        let bottom_right = boxed(0.6, 0.9, 0.6, 0.9);

        assert!(above()(&top_left, &bottom_right));
        assert!(below()(&bottom_right, &top_left));
        assert!(left_of()(&top_left, &bottom_right));
        assert!(right_of()(&bottom_right, &top_left));
        assert!(!x_overlaps()(&top_left, &bottom_right));
        assert!(!spatial_overlaps()(&top_left, &bottom_right));
    }

    #[test]
    fn test_contains_box_and_iou() {
        let outer = boxed(0.0, 1.0, 0.0, 1.0);
        let inner = boxed(0.2, 0.4, 0.2, 0.4);
        assert!(contains_box()(&outer, &inner));
        assert!(!contains_box()(&inner, &outer));

        // Identical boxes have IoU 1.
        assert!((iou(&outer.bounds, &outer.bounds) - 1.0).abs() < 1e-12);
        // Disjoint boxes have IoU 0.
        let far = boxed(0.8, 0.9, 0.8, 0.9);
        assert_eq!(iou(&inner.bounds, &far.bounds), 0.0);

        // Half-overlapping unit squares: intersection 0.5, union 1.5.
        let left = boxed(0.0, 1.0, 0.0, 1.0);
        let shifted = Interval::new(
            Bounds3D::from_coords(0.0, 1.0, 0.5, 1.5, 0.0, 1.0).unwrap(),
            (),
        );
        let value = iou(&left.bounds, &shifted.bounds);
        assert!((value - 1.0 / 3.0).abs() < 1e-12);
        assert!(iou_at_least(0.3)(&left, &shifted));
        assert!(!iou_at_least(0.4)(&left, &shifted));
    }

    #[test]
    fn test_within_distance() {
        let a = boxed(0.0, 0.2, 0.0, 0.2);
        let b = boxed(0.8, 1.0, 0.0, 0.2);
        // Centroids at x=0.1 and x=0.9, same y.
        assert!(within_distance(0.85)(&a, &b));
        assert!(!within_distance(0.5)(&a, &b));
    }

    #[test]
    fn test_combinators() {
        let a = t(0.0, 5.0);
        let b = t(3.0, 8.0);
        assert!(both(t_overlaps(), negate(during()))(&a, &b));
        assert!(either(before(0.0), t_overlaps())(&a, &b));
        assert!(always()(&a, &b));
        assert!(!never()(&a, &b));
    }

    #[test]
    fn test_unary_helpers() {
        let i = Interval::from_temporal(0.0, 4.0, 7u32).unwrap();
        assert!(payload_satisfies(|p: &u32| *p > 5)(&i));
        assert!(length_at_least(4.0)(&i));
        assert!(!length_at_least(4.1)(&i));
        assert!(length_at_most(4.0)(&i));
    }
}
