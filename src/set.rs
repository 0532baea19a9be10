//! Interval set algebra.
//!
//! [`IntervalSet`] is the core collection of the engine: a list of
//! [`Interval`]s held sorted by their bounds. Every operation is pure and
//! produces a new set, so queries compose without mutating inputs. Binary
//! operations that scan for temporal neighbors (`join`, `minus`,
//! `filter_against`, `collect_by_interval`) take a `window` argument and
//! prune candidates using the sort order: sets are sorted by start time, so
//! a scan can stop as soon as a candidate starts past the window, and the
//! left cursor only advances past candidates whose *end* precedes the
//! window (ends are not monotone after sorting by start).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use spatiq_types::{Bounds1D, Bounds3D};
use std::hash::Hash;

use crate::error::Result;
use crate::interval::Interval;

/// An immutable collection of intervals, sorted by bounds.
///
/// # Examples
///
/// ```
/// use spatiq::{Interval, IntervalSet, predicates};
///
/// let walks = IntervalSet::new(vec![
///     Interval::from_temporal(0.0, 10.0, "walk")?,
///     Interval::from_temporal(30.0, 40.0, "walk")?,
/// ]);
/// let runs = IntervalSet::new(vec![Interval::from_temporal(9.0, 20.0, "run")?]);
///
/// // Walks sharing screen time with a run, merged into one span.
/// let transitions = walks.join(
///     &runs,
///     predicates::t_overlaps(),
///     |a, b| a.span_with(b, |x, y| (*x, *y)),
///     0.0,
/// );
/// assert_eq!(transitions.len(), 1);
/// # Ok::<(), spatiq::SpatiqError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalSet<P> {
    intervals: Vec<Interval<P>>,
}

impl<P> Default for IntervalSet<P> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<P> IntervalSet<P> {
    /// Build a set from intervals in any order.
    pub fn new(mut intervals: Vec<Interval<P>>) -> Self {
        intervals.sort_by(|a, b| a.bounds.order(&b.bounds));
        Self { intervals }
    }

    /// The empty set.
    pub fn empty() -> Self {
        Self {
            intervals: Vec::new(),
        }
    }

    /// Member intervals in sorted order.
    pub fn intervals(&self) -> &[Interval<P>] {
        &self.intervals
    }

    /// Consume the set, yielding its sorted members.
    pub fn into_vec(self) -> Vec<Interval<P>> {
        self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Smallest extent covering every member, `None` for the empty set.
    pub fn extent(&self) -> Option<Bounds3D> {
        let mut iter = self.intervals.iter();
        let first = iter.next()?.bounds;
        Some(iter.fold(first, |acc, i| acc.span(&i.bounds)))
    }

    /// Transform every member. The result is re-sorted.
    pub fn map<Q>(&self, f: impl FnMut(&Interval<P>) -> Interval<Q>) -> IntervalSet<Q> {
        IntervalSet::new(self.intervals.iter().map(f).collect())
    }

    /// Replace payloads, keeping bounds (and therefore order).
    pub fn map_payload<Q>(&self, mut f: impl FnMut(&Interval<P>) -> Q) -> IntervalSet<Q> {
        IntervalSet {
            intervals: self
                .intervals
                .iter()
                .map(|i| Interval::new(i.bounds, f(i)))
                .collect(),
        }
    }

    /// Keep members admitted by the predicate.
    pub fn filter(&self, mut pred: impl FnMut(&Interval<P>) -> bool) -> Self
    where
        P: Clone,
    {
        IntervalSet {
            intervals: self
                .intervals
                .iter()
                .filter(|i| pred(i))
                .cloned()
                .collect(),
        }
    }

    /// Keep members whose temporal length is within `[min, max]`.
    ///
    /// Pass `None` for `max` to leave the upper end open.
    pub fn filter_length(&self, min: f64, max: Option<f64>) -> Self
    where
        P: Clone,
    {
        self.filter(|i| {
            let len = i.length();
            len >= min && max.is_none_or(|m| len <= m)
        })
    }

    /// Dilate the temporal extent of every member by `window`.
    pub fn dilate(&self, window: f64) -> Self
    where
        P: Clone,
    {
        IntervalSet::new(
            self.intervals
                .iter()
                .map(|i| Interval::new(i.bounds.dilate_temporal(window), i.payload.clone()))
                .collect(),
        )
    }

    /// Map every member to a set and union the results.
    pub fn split<Q>(&self, mut f: impl FnMut(&Interval<P>) -> IntervalSet<Q>) -> IntervalSet<Q> {
        let mut out = Vec::new();
        for interval in &self.intervals {
            out.extend(f(interval).into_vec());
        }
        IntervalSet::new(out)
    }

    /// Fold over members in sorted order.
    pub fn fold<A>(&self, init: A, mut f: impl FnMut(A, &Interval<P>) -> A) -> A {
        self.intervals.iter().fold(init, |acc, i| f(acc, i))
    }

    /// Fold to a list of intervals, producing a new set.
    pub fn fold_to_set<Q>(
        &self,
        init: Vec<Interval<Q>>,
        f: impl FnMut(Vec<Interval<Q>>, &Interval<P>) -> Vec<Interval<Q>>,
    ) -> IntervalSet<Q> {
        IntervalSet::new(self.fold(init, f))
    }

    /// Sorted merge of two sets.
    pub fn union(&self, other: &Self) -> Self
    where
        P: Clone,
    {
        let mut merged = Vec::with_capacity(self.len() + other.len());
        let (mut i, mut j) = (0, 0);
        while i < self.intervals.len() && j < other.intervals.len() {
            let a = &self.intervals[i];
            let b = &other.intervals[j];
            if a.bounds.order(&b.bounds).is_le() {
                merged.push(a.clone());
                i += 1;
            } else {
                merged.push(b.clone());
                j += 1;
            }
        }
        merged.extend_from_slice(&self.intervals[i..]);
        merged.extend_from_slice(&other.intervals[j..]);
        IntervalSet { intervals: merged }
    }

    /// Merge temporally adjacent members.
    ///
    /// Sweeps the set in time order, merging any member whose start is
    /// within `epsilon` of the accumulated end. Bounds merge by span,
    /// payloads by `payload_merge`.
    pub fn coalesce(&self, epsilon: f64, payload_merge: impl Fn(&P, &P) -> P) -> Self
    where
        P: Clone,
    {
        self.coalesce_if(epsilon, |_, _| true, payload_merge)
    }

    /// [`coalesce`](Self::coalesce) gated by a predicate.
    ///
    /// A candidate within `epsilon` is only merged when
    /// `predicate(accumulated, candidate)` holds; a rejected candidate ends
    /// the current run and starts a new one.
    pub fn coalesce_if(
        &self,
        epsilon: f64,
        predicate: impl Fn(&Interval<P>, &Interval<P>) -> bool,
        payload_merge: impl Fn(&P, &P) -> P,
    ) -> Self
    where
        P: Clone,
    {
        let mut out: Vec<Interval<P>> = Vec::new();
        let mut current: Option<Interval<P>> = None;
        for next in &self.intervals {
            current = Some(match current.take() {
                None => next.clone(),
                Some(acc) => {
                    if next.t1() <= acc.t2() + epsilon && predicate(&acc, next) {
                        acc.span_with(next, |a, b| payload_merge(a, b))
                    } else {
                        out.push(acc);
                        next.clone()
                    }
                }
            });
        }
        if let Some(acc) = current {
            out.push(acc);
        }
        IntervalSet::new(out)
    }

    /// Windowed join: test pairs within `window` on the time axis and merge
    /// the matches.
    ///
    /// Only pairs whose temporal distance is at most `window` reach the
    /// predicate; `window` of `0.0` restricts candidates to pairs that
    /// overlap or touch.
    pub fn join<Q, R>(
        &self,
        other: &IntervalSet<Q>,
        predicate: impl Fn(&Interval<P>, &Interval<Q>) -> bool,
        merge: impl Fn(&Interval<P>, &Interval<Q>) -> Interval<R>,
        window: f64,
    ) -> IntervalSet<R> {
        let mut out = Vec::new();
        self.for_each_windowed_pair(other, window, |a, b| {
            if predicate(a, b) {
                out.push(merge(a, b));
            }
        });
        IntervalSet::new(out)
    }

    /// Semi-join: keep members of `self` with at least one windowed match
    /// in `other` admitted by the predicate.
    pub fn filter_against<Q>(
        &self,
        other: &IntervalSet<Q>,
        predicate: impl Fn(&Interval<P>, &Interval<Q>) -> bool,
        window: f64,
    ) -> Self
    where
        P: Clone,
    {
        let mut lo = 0usize;
        let mut out = Vec::new();
        for a in &self.intervals {
            while lo < other.intervals.len() && other.intervals[lo].t2() < a.t1() - window {
                lo += 1;
            }
            for b in &other.intervals[lo..] {
                if b.t1() > a.t2() + window {
                    break;
                }
                if b.t2() < a.t1() - window {
                    continue;
                }
                if predicate(a, b) {
                    out.push(a.clone());
                    break;
                }
            }
        }
        IntervalSet { intervals: out }
    }

    /// Temporal anti-difference.
    ///
    /// Each member of `self` is fragmented by subtracting the temporal
    /// extents of strictly overlapping members of `other`. Fragments keep
    /// the member's payload and spatial axes; zero-length fragments are
    /// dropped, and members with no overlap pass through unchanged.
    pub fn minus<Q>(&self, other: &IntervalSet<Q>, window: f64) -> Self
    where
        P: Clone,
    {
        let mut lo = 0usize;
        let mut out = Vec::new();
        for a in &self.intervals {
            while lo < other.intervals.len() && other.intervals[lo].t2() < a.t1() - window {
                lo += 1;
            }
            let mut holes: SmallVec<[Bounds1D; 8]> = SmallVec::new();
            for b in &other.intervals[lo..] {
                if b.t1() > a.t2() + window {
                    break;
                }
                // Strict overlap; touching extents remove nothing.
                if b.t1() < a.t2() && b.t2() > a.t1() {
                    holes.push(b.temporal());
                }
            }
            if holes.is_empty() {
                out.push(a.clone());
                continue;
            }
            holes.sort_by(|l, r| l.order(r));
            let mut cursor = a.t1();
            for hole in &holes {
                if hole.start > cursor {
                    out.push(fragment_of(a, cursor, hole.start));
                }
                cursor = cursor.max(hole.end);
                if cursor >= a.t2() {
                    break;
                }
            }
            if cursor < a.t2() {
                out.push(fragment_of(a, cursor, a.t2()));
            }
        }
        IntervalSet::new(out)
    }

    /// For each member of `self`, gather its windowed matches in `other`.
    ///
    /// The output keeps `self`'s bounds; the payload becomes the original
    /// payload paired with the set of admitted matches. With `filter_empty`
    /// set, members with no matches are dropped instead of carrying an
    /// empty set.
    pub fn collect_by_interval<Q>(
        &self,
        other: &IntervalSet<Q>,
        predicate: impl Fn(&Interval<P>, &Interval<Q>) -> bool,
        filter_empty: bool,
        window: f64,
    ) -> IntervalSet<(P, IntervalSet<Q>)>
    where
        P: Clone,
        Q: Clone,
    {
        let mut lo = 0usize;
        let mut out = Vec::new();
        for a in &self.intervals {
            while lo < other.intervals.len() && other.intervals[lo].t2() < a.t1() - window {
                lo += 1;
            }
            let mut matched = Vec::new();
            for b in &other.intervals[lo..] {
                if b.t1() > a.t2() + window {
                    break;
                }
                if b.t2() < a.t1() - window {
                    continue;
                }
                if predicate(a, b) {
                    matched.push(b.clone());
                }
            }
            if matched.is_empty() && filter_empty {
                continue;
            }
            out.push(Interval::new(
                a.bounds,
                (a.payload.clone(), IntervalSet { intervals: matched }),
            ));
        }
        IntervalSet { intervals: out }
    }

    /// Partition members by key and merge each group into one interval.
    pub fn group_by<K: Eq + Hash>(
        &self,
        mut key: impl FnMut(&Interval<P>) -> K,
        mut merge: impl FnMut(&K, IntervalSet<P>) -> Interval<P>,
    ) -> Self
    where
        P: Clone,
    {
        let mut groups: rustc_hash::FxHashMap<K, Vec<Interval<P>>> =
            rustc_hash::FxHashMap::default();
        for interval in &self.intervals {
            groups
                .entry(key(interval))
                .or_default()
                .push(interval.clone());
        }
        IntervalSet::new(
            groups
                .into_iter()
                .map(|(k, members)| merge(&k, IntervalSet { intervals: members }))
                .collect(),
        )
    }

    /// Shared windowed pair scan for the binary operations above.
    fn for_each_windowed_pair<Q>(
        &self,
        other: &IntervalSet<Q>,
        window: f64,
        mut visit: impl FnMut(&Interval<P>, &Interval<Q>),
    ) {
        let mut lo = 0usize;
        for a in &self.intervals {
            while lo < other.intervals.len() && other.intervals[lo].t2() < a.t1() - window {
                lo += 1;
            }
            for b in &other.intervals[lo..] {
                if b.t1() > a.t2() + window {
                    break;
                }
                if b.t2() < a.t1() - window {
                    continue;
                }
                visit(a, b);
            }
        }
    }
}

impl<P: Serialize> IntervalSet<P> {
    /// Serialize the members as a JSON array.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.intervals)?)
    }
}

impl<P: DeserializeOwned> IntervalSet<P> {
    /// Parse a JSON array of intervals; the result is re-sorted.
    pub fn from_json(json: &str) -> Result<Self> {
        let intervals: Vec<Interval<P>> = serde_json::from_str(json)?;
        Ok(Self::new(intervals))
    }
}

impl<P> FromIterator<Interval<P>> for IntervalSet<P> {
    fn from_iter<T: IntoIterator<Item = Interval<P>>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<P: Serialize> Serialize for IntervalSet<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.intervals.serialize(serializer)
    }
}

// Deserialization goes through the sorting constructor so the ordering
// invariant survives untrusted input.
impl<'de, P: Deserialize<'de>> Deserialize<'de> for IntervalSet<P> {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let intervals = Vec::<Interval<P>>::deserialize(deserializer)?;
        Ok(Self::new(intervals))
    }
}

fn fragment_of<P: Clone>(source: &Interval<P>, t1: f64, t2: f64) -> Interval<P> {
    let mut bounds = source.bounds;
    bounds.t = Bounds1D::unchecked(t1, t2);
    Interval::new(bounds, source.payload.clone())
}
