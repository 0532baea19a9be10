use spatiq::{Bounds1D, Bounds3D, Frame, Interval, IntervalSet, Pattern, predicates};

fn temporal(spans: &[(f64, f64)]) -> IntervalSet<usize> {
    IntervalSet::new(
        spans
            .iter()
            .enumerate()
            .map(|(idx, &(t1, t2))| Interval::from_temporal(t1, t2, idx).unwrap())
            .collect(),
    )
}

#[test]
fn test_zero_length_intervals() {
    let instants = temporal(&[(1.0, 1.0), (1.0, 1.0), (5.0, 5.0)]);
    assert_eq!(instants.len(), 3);

    // Zero-length intervals at the same instant coalesce together.
    let merged = instants.coalesce(0.0, |a, _| *a);
    assert_eq!(merged.len(), 2);

    // They still count as touching for windowed joins.
    let spans = temporal(&[(0.0, 2.0)]);
    let joined = spans.join(
        &instants,
        |a, b| a.temporal().contains_point(b.t1()),
        |a, b| a.span_with(b, |p, _| *p),
        0.0,
    );
    assert_eq!(joined.len(), 2);
}

#[test]
fn test_minus_self_is_empty() {
    let set = temporal(&[(0.0, 5.0), (10.0, 12.0)]);
    assert!(set.minus(&set, 0.0).is_empty());
}

#[test]
fn test_minus_adjacent_holes() {
    let base = temporal(&[(0.0, 10.0)]);
    let holes = temporal(&[(2.0, 4.0), (4.0, 6.0)]);
    let diff = base.minus(&holes, 0.0);
    let spans: Vec<(f64, f64)> = diff.intervals().iter().map(|i| (i.t1(), i.t2())).collect();
    assert_eq!(spans, vec![(0.0, 2.0), (6.0, 10.0)]);
}

#[test]
fn test_negative_dilation_collapses() {
    let set = temporal(&[(0.0, 1.0)]);
    let shrunk = set.dilate(-2.0);
    assert_eq!(shrunk.len(), 1);
    let i = &shrunk.intervals()[0];
    assert_eq!(i.t1(), i.t2());
    assert_eq!(i.t1(), 0.5);
}

#[test]
fn test_dilate_then_coalesce_bridges_gaps() {
    let set = temporal(&[(0.0, 1.0), (2.0, 3.0), (10.0, 11.0)]);
    let bridged = set.dilate(0.75).coalesce(0.0, |a, _| *a).dilate(-0.75);
    assert_eq!(bridged.len(), 2);
    assert_eq!(bridged.intervals()[0].t1(), 0.0);
    assert_eq!(bridged.intervals()[0].t2(), 3.0);
}

#[test]
fn test_join_window_boundary() {
    let a = temporal(&[(0.0, 1.0)]);
    let b = temporal(&[(3.0, 4.0)]);

    // Gap is exactly 2.0; a window of 2.0 admits the pair, anything
    // smaller excludes it.
    let admitted = a.join(
        &b,
        predicates::always(),
        |x, y| x.span_with(y, |_, _| ()),
        2.0,
    );
    assert_eq!(admitted.len(), 1);

    let excluded = a.join(
        &b,
        predicates::always(),
        |x, y| x.span_with(y, |_, _| ()),
        1.9,
    );
    assert!(excluded.is_empty());
}

#[test]
fn test_large_coalesce_chain() {
    let spans: Vec<(f64, f64)> = (0..10_000).map(|i| (f64::from(i), f64::from(i) + 1.5)).collect();
    let set = temporal(&spans);
    let merged = set.coalesce(0.0, |a, _| *a);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged.intervals()[0].t1(), 0.0);
    assert_eq!(merged.intervals()[0].t2(), 10_000.5);
}

#[test]
fn test_unordered_input_is_sorted() {
    let set = temporal(&[(9.0, 10.0), (0.0, 1.0), (4.0, 5.0), (2.0, 3.0)]);
    let starts: Vec<f64> = set.intervals().iter().map(|i| i.t1()).collect();
    assert_eq!(starts, vec![0.0, 2.0, 4.0, 9.0]);
}

#[test]
fn test_pattern_on_empty_set() {
    let set: IntervalSet<&str> = IntervalSet::empty();
    let pattern = Pattern::new().variable("a");
    let solutions = set.match_pattern(&pattern, true).unwrap();
    assert!(solutions.is_empty());
}

#[test]
fn test_frame_projection_of_query_output() {
    let frame = Frame::new(1920, 1080).unwrap();
    let set = IntervalSet::new(vec![Interval::new(
        Bounds3D::new(
            Bounds1D::new(0.0, 1.0).unwrap(),
            Bounds1D::new(0.5, 1.0).unwrap(),
            Bounds1D::new(0.0, 0.5).unwrap(),
        ),
        "corner",
    )]);

    let boxes: Vec<_> = set
        .intervals()
        .iter()
        .map(|i| frame.to_absolute(&i.bounds))
        .collect();
    assert_eq!(boxes[0].x1, 960.0);
    assert_eq!(boxes[0].y2, 540.0);
}

#[test]
fn test_extreme_windows() {
    let a = temporal(&[(0.0, 1.0)]);
    let b = temporal(&[(1_000_000.0, 1_000_001.0)]);
    let joined = a.join(
        &b,
        predicates::always(),
        |x, y| x.span_with(y, |_, _| ()),
        f64::INFINITY,
    );
    assert_eq!(joined.len(), 1);
}
