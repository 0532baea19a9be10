//! Keyed families of interval sets.
//!
//! Query corpora are usually partitioned by a domain key (a video id, a
//! sensor id, a shard). [`IntervalSetMapping`] holds one [`IntervalSet`]
//! per key and lifts the set algebra over matching keys, so a query written
//! against one set applies to a whole corpus unchanged. The runtime's
//! combiners ([`union_combine`], [`disjoint_combine`]) merge mappings
//! produced by independent chunks of a domain.

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{Result, SpatiqError};
use crate::interval::Interval;
use crate::set::IntervalSet;

/// A mapping from domain keys to interval sets.
///
/// # Examples
///
/// ```
/// use spatiq::{Interval, IntervalSetMapping};
///
/// let mapping = IntervalSetMapping::from_intervals(vec![
///     ("video1", Interval::from_temporal(0.0, 5.0, "person")?),
///     ("video1", Interval::from_temporal(8.0, 9.0, "person")?),
///     ("video2", Interval::from_temporal(1.0, 2.0, "person")?),
/// ]);
///
/// assert_eq!(mapping.len(), 2);
/// assert_eq!(mapping.get(&"video1").unwrap().len(), 2);
/// # Ok::<(), spatiq::SpatiqError>(())
/// ```
#[derive(Debug, Clone)]
pub struct IntervalSetMapping<K, P> {
    sets: FxHashMap<K, IntervalSet<P>>,
}

impl<K: Eq + Hash, P: PartialEq> PartialEq for IntervalSetMapping<K, P> {
    fn eq(&self, other: &Self) -> bool {
        self.sets == other.sets
    }
}

impl<K: Eq + Hash, P> Default for IntervalSetMapping<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, P> IntervalSetMapping<K, P> {
    pub fn new() -> Self {
        Self {
            sets: FxHashMap::default(),
        }
    }

    /// Group labeled intervals by key.
    pub fn from_intervals(pairs: impl IntoIterator<Item = (K, Interval<P>)>) -> Self {
        let mut grouped: FxHashMap<K, Vec<Interval<P>>> = FxHashMap::default();
        for (key, interval) in pairs {
            grouped.entry(key).or_default().push(interval);
        }
        Self {
            sets: grouped
                .into_iter()
                .map(|(k, v)| (k, IntervalSet::new(v)))
                .collect(),
        }
    }

    /// Insert a set for a key, replacing any existing set.
    pub fn insert(&mut self, key: K, set: IntervalSet<P>) -> Option<IntervalSet<P>> {
        self.sets.insert(key, set)
    }

    /// Add one interval to a key's set, creating the set if needed.
    pub fn add_interval(&mut self, key: K, interval: Interval<P>) {
        let mut members = self
            .sets
            .remove(&key)
            .map(IntervalSet::into_vec)
            .unwrap_or_default();
        members.push(interval);
        self.sets.insert(key, IntervalSet::new(members));
    }

    pub fn get(&self, key: &K) -> Option<&IntervalSet<P>> {
        self.sets.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.sets.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &IntervalSet<P>)> {
        self.sets.iter()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Total interval count across every key.
    pub fn total_intervals(&self) -> usize {
        self.sets.values().map(IntervalSet::len).sum()
    }
}

impl<K: Eq + Hash + Clone, P> IntervalSetMapping<K, P> {
    /// Transform each key's set.
    pub fn map_sets<Q>(
        &self,
        mut f: impl FnMut(&K, &IntervalSet<P>) -> IntervalSet<Q>,
    ) -> IntervalSetMapping<K, Q> {
        IntervalSetMapping {
            sets: self
                .sets
                .iter()
                .map(|(k, set)| (k.clone(), f(k, set)))
                .collect(),
        }
    }

    /// Keep intervals admitted by the predicate, per key.
    pub fn filter(&self, pred: impl Fn(&Interval<P>) -> bool) -> Self
    where
        P: Clone,
    {
        self.map_sets(|_, set| set.filter(&pred))
    }

    /// Coalesce each key's set. See [`IntervalSet::coalesce`].
    pub fn coalesce(&self, epsilon: f64, payload_merge: impl Fn(&P, &P) -> P) -> Self
    where
        P: Clone,
    {
        self.map_sets(|_, set| set.coalesce(epsilon, &payload_merge))
    }

    /// Dilate each key's set. See [`IntervalSet::dilate`].
    pub fn dilate(&self, window: f64) -> Self
    where
        P: Clone,
    {
        self.map_sets(|_, set| set.dilate(window))
    }

    /// Per-key windowed join; keys missing from either side drop out.
    pub fn join<Q, R>(
        &self,
        other: &IntervalSetMapping<K, Q>,
        predicate: impl Fn(&Interval<P>, &Interval<Q>) -> bool,
        merge: impl Fn(&Interval<P>, &Interval<Q>) -> Interval<R>,
        window: f64,
    ) -> IntervalSetMapping<K, R> {
        let mut sets = FxHashMap::default();
        for (key, left) in &self.sets {
            if let Some(right) = other.sets.get(key) {
                sets.insert(key.clone(), left.join(right, &predicate, &merge, window));
            }
        }
        IntervalSetMapping { sets }
    }

    /// Per-key anti-difference; keys missing from `other` pass through.
    pub fn minus<Q>(&self, other: &IntervalSetMapping<K, Q>, window: f64) -> Self
    where
        P: Clone,
    {
        self.map_sets(|key, set| match other.sets.get(key) {
            Some(right) => set.minus(right, window),
            None => set.clone(),
        })
    }

    /// Per-key semi-join; keys missing from `other` drop every interval.
    pub fn filter_against<Q>(
        &self,
        other: &IntervalSetMapping<K, Q>,
        predicate: impl Fn(&Interval<P>, &Interval<Q>) -> bool,
        window: f64,
    ) -> Self
    where
        P: Clone,
    {
        self.map_sets(|key, set| match other.sets.get(key) {
            Some(right) => set.filter_against(right, &predicate, window),
            None => IntervalSet::empty(),
        })
    }

    /// Outer union: keys present on either side, sets merged where shared.
    pub fn union(&self, other: &Self) -> Self
    where
        P: Clone,
    {
        let mut sets = self.sets.clone();
        for (key, right) in &other.sets {
            match sets.get_mut(key) {
                Some(left) => *left = left.union(right),
                None => {
                    sets.insert(key.clone(), right.clone());
                }
            }
        }
        IntervalSetMapping { sets }
    }
}

/// Merge two mappings by unioning the sets of shared keys.
pub fn union_combine<K, P>(
    a: IntervalSetMapping<K, P>,
    b: IntervalSetMapping<K, P>,
) -> Result<IntervalSetMapping<K, P>>
where
    K: Eq + Hash + Clone,
    P: Clone,
{
    Ok(a.union(&b))
}

/// Merge two mappings whose key sets must be disjoint.
///
/// Chunked runs over a partitioned domain produce disjoint keys by
/// construction; a collision means the partitioning is wrong, so it is
/// reported as an error rather than silently merged.
pub fn disjoint_combine<K, P>(
    a: IntervalSetMapping<K, P>,
    mut b: IntervalSetMapping<K, P>,
) -> Result<IntervalSetMapping<K, P>>
where
    K: Eq + Hash + Debug,
{
    let mut sets = a.sets;
    for (key, set) in b.sets.drain() {
        if sets.contains_key(&key) {
            return Err(SpatiqError::KeyCollision(format!("{key:?}")));
        }
        sets.insert(key, set);
    }
    Ok(IntervalSetMapping { sets })
}

impl<K: Eq + Hash + Serialize, P: Serialize> IntervalSetMapping<K, P> {
    /// Serialize as a JSON array of `[key, intervals]` pairs.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<K: Eq + Hash + DeserializeOwned, P: DeserializeOwned> IntervalSetMapping<K, P> {
    /// Parse a JSON array of `[key, intervals]` pairs.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// Keyed sets serialize as a sequence of pairs rather than a map, so
// non-string keys survive JSON and the binary snapshot format alike.
impl<K: Serialize, P: Serialize> Serialize for IntervalSetMapping<K, P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.sets.iter())
    }
}

impl<'de, K, P> Deserialize<'de> for IntervalSetMapping<K, P>
where
    K: Deserialize<'de> + Eq + Hash,
    P: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let pairs = Vec::<(K, IntervalSet<P>)>::deserialize(deserializer)?;
        Ok(Self {
            sets: pairs.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates;

    fn sample() -> IntervalSetMapping<&'static str, &'static str> {
        IntervalSetMapping::from_intervals(vec![
            ("v1", Interval::from_temporal(0.0, 5.0, "person").unwrap()),
            ("v1", Interval::from_temporal(4.0, 9.0, "car").unwrap()),
            ("v2", Interval::from_temporal(1.0, 2.0, "person").unwrap()),
        ])
    }

    #[test]
    fn test_grouping() {
        let mapping = sample();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.total_intervals(), 3);
        assert_eq!(mapping.get(&"v1").unwrap().len(), 2);
        assert!(mapping.get(&"v3").is_none());
    }

    #[test]
    fn test_add_interval_keeps_sorted() {
        let mut mapping = sample();
        mapping.add_interval("v1", Interval::from_temporal(-1.0, 0.5, "bike").unwrap());
        let set = mapping.get(&"v1").unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.intervals()[0].payload, "bike");
    }

    #[test]
    fn test_join_inner_on_keys() {
        let people = sample().filter(|i| i.payload == "person");
        let cars = sample().filter(|i| i.payload == "car");
        let joined = people.join(
            &cars,
            predicates::t_overlaps(),
            |a, b| a.span_with(b, |p, q| (*p, *q)),
            0.0,
        );
        // v1 has an overlapping person/car pair; v2 has no cars but its key
        // survives filter() with an empty set, so the join emits an empty
        // set for it.
        assert_eq!(joined.get(&"v1").unwrap().len(), 1);
        assert!(joined.get(&"v2").unwrap().is_empty());
    }

    #[test]
    fn test_minus_missing_key_passes_through() {
        let left = IntervalSetMapping::from_intervals(vec![
            ("a", Interval::from_temporal(0.0, 10.0, ()).unwrap()),
            ("b", Interval::from_temporal(0.0, 10.0, ()).unwrap()),
        ]);
        let right = IntervalSetMapping::from_intervals(vec![(
            "a",
            Interval::from_temporal(2.0, 3.0, ()).unwrap(),
        )]);
        let diff = left.minus(&right, 0.0);
        assert_eq!(diff.get(&"a").unwrap().len(), 2);
        assert_eq!(diff.get(&"b").unwrap().len(), 1);
    }

    #[test]
    fn test_union_outer() {
        let left = IntervalSetMapping::from_intervals(vec![(
            "a",
            Interval::from_temporal(0.0, 1.0, ()).unwrap(),
        )]);
        let right = IntervalSetMapping::from_intervals(vec![
            ("a", Interval::from_temporal(2.0, 3.0, ()).unwrap()),
            ("b", Interval::from_temporal(0.0, 1.0, ()).unwrap()),
        ]);
        let merged = left.union(&right);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get(&"a").unwrap().len(), 2);
    }

    #[test]
    fn test_combiners() {
        let left = IntervalSetMapping::from_intervals(vec![(
            "a",
            Interval::from_temporal(0.0, 1.0, ()).unwrap(),
        )]);
        let right = IntervalSetMapping::from_intervals(vec![(
            "b",
            Interval::from_temporal(0.0, 1.0, ()).unwrap(),
        )]);
        let disjoint = disjoint_combine(left.clone(), right.clone()).unwrap();
        assert_eq!(disjoint.len(), 2);

        let colliding = disjoint_combine(left.clone(), left.clone());
        assert!(matches!(colliding, Err(SpatiqError::KeyCollision(_))));

        let unioned = union_combine(left.clone(), left).unwrap();
        assert_eq!(unioned.len(), 1);
        assert_eq!(unioned.get(&"a").unwrap().len(), 2);
    }

    #[test]
    fn test_filter_against_missing_key_empties() {
        let left = IntervalSetMapping::from_intervals(vec![(
            "a",
            Interval::from_temporal(0.0, 1.0, ()).unwrap(),
        )]);
        let right: IntervalSetMapping<&str, ()> = IntervalSetMapping::new();
        let kept = left.filter_against(&right, predicates::t_overlaps(), 0.0);
        assert!(kept.get(&"a").unwrap().is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let mapping = sample();
        let json = mapping.to_json().unwrap();
        let back: IntervalSetMapping<String, String> =
            IntervalSetMapping::from_json(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.get(&"v1".to_string()).unwrap().len(), 2);
    }
}
