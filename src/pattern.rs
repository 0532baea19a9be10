//! Constraint-based pattern matching over interval sets.
//!
//! A [`Pattern`] declares named variables, each restricted by optional
//! unary predicates, and binary constraints between pairs of variables.
//! [`IntervalSet::match_pattern`] searches the set for assignments of
//! intervals to variables satisfying every constraint, using backtracking
//! with variables ordered by ascending domain size. Distinct variables
//! always bind distinct intervals.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Result, SpatiqError};
use crate::interval::Interval;
use crate::set::IntervalSet;

type UnaryPred<P> = Box<dyn Fn(&Interval<P>) -> bool>;
type BinaryPred<P> = Box<dyn Fn(&Interval<P>, &Interval<P>) -> bool>;

struct Variable<P> {
    name: String,
    predicates: Vec<UnaryPred<P>>,
}

struct Constraint<P> {
    left: String,
    right: String,
    predicate: BinaryPred<P>,
}

/// A declarative description of an interval arrangement.
///
/// # Examples
///
/// ```
/// use spatiq::{Interval, IntervalSet, Pattern, predicates};
///
/// let set = IntervalSet::new(vec![
///     Interval::from_temporal(0.0, 1.0, "open")?,
///     Interval::from_temporal(2.0, 3.0, "close")?,
/// ]);
///
/// let pattern = Pattern::new()
///     .variable_where("open", |i: &spatiq::Interval<&str>| i.payload == "open")
///     .variable_where("close", |i: &spatiq::Interval<&str>| i.payload == "close")
///     .constraint("open", "close", predicates::before(f64::INFINITY));
///
/// let solutions = set.match_pattern(&pattern, true)?;
/// assert_eq!(solutions.len(), 1);
/// assert_eq!(solutions[0]["open"].payload, "open");
/// # Ok::<(), spatiq::SpatiqError>(())
/// ```
pub struct Pattern<P> {
    variables: Vec<Variable<P>>,
    constraints: Vec<Constraint<P>>,
}

impl<P> Default for Pattern<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Pattern<P> {
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Declare an unconstrained variable.
    pub fn variable(self, name: impl Into<String>) -> Self {
        self.push_variable(name.into(), None)
    }

    /// Declare a variable whose domain is restricted by a unary predicate.
    ///
    /// Declaring the same name again adds a further restriction to the
    /// existing variable.
    pub fn variable_where(
        self,
        name: impl Into<String>,
        predicate: impl Fn(&Interval<P>) -> bool + 'static,
    ) -> Self {
        self.push_variable(name.into(), Some(Box::new(predicate)))
    }

    fn push_variable(mut self, name: String, predicate: Option<UnaryPred<P>>) -> Self {
        if let Some(existing) = self.variables.iter_mut().find(|v| v.name == name) {
            existing.predicates.extend(predicate);
        } else {
            self.variables.push(Variable {
                name,
                predicates: predicate.into_iter().collect(),
            });
        }
        self
    }

    /// Relate two declared variables with a binary predicate.
    ///
    /// The predicate receives the intervals bound to `left` and `right`,
    /// in that order.
    pub fn constraint(
        mut self,
        left: impl Into<String>,
        right: impl Into<String>,
        predicate: impl Fn(&Interval<P>, &Interval<P>) -> bool + 'static,
    ) -> Self {
        self.constraints.push(Constraint {
            left: left.into(),
            right: right.into(),
            predicate: Box::new(predicate),
        });
        self
    }

    fn validate(&self) -> Result<()> {
        if self.variables.is_empty() {
            return Err(SpatiqError::EmptyPattern);
        }
        let declared: FxHashSet<&str> = self.variables.iter().map(|v| v.name.as_str()).collect();
        for constraint in &self.constraints {
            for name in [&constraint.left, &constraint.right] {
                if !declared.contains(name.as_str()) {
                    return Err(SpatiqError::UnknownVariable(name.clone()));
                }
            }
        }
        Ok(())
    }
}

/// One assignment of intervals to pattern variable names.
pub type PatternSolution<P> = FxHashMap<String, Interval<P>>;

impl<P: Clone> IntervalSet<P> {
    /// Search the set for arrangements matching `pattern`.
    ///
    /// Returns every solution when `exhaustive`, otherwise at most one.
    /// See [`Pattern`] for the declaration API.
    pub fn match_pattern(
        &self,
        pattern: &Pattern<P>,
        exhaustive: bool,
    ) -> Result<Vec<PatternSolution<P>>> {
        pattern.validate()?;

        let intervals = self.intervals();
        let var_count = pattern.variables.len();

        let index_of: FxHashMap<&str, usize> = pattern
            .variables
            .iter()
            .enumerate()
            .map(|(idx, v)| (v.name.as_str(), idx))
            .collect();

        // Domains are the members passing each variable's unary predicates.
        let domains: Vec<Vec<usize>> = pattern
            .variables
            .iter()
            .map(|v| {
                (0..intervals.len())
                    .filter(|&i| v.predicates.iter().all(|p| p(&intervals[i])))
                    .collect()
            })
            .collect();

        // Constraints touching each variable, with endpoints resolved.
        let mut constraints_of: Vec<Vec<(usize, usize, &BinaryPred<P>)>> =
            vec![Vec::new(); var_count];
        for c in &pattern.constraints {
            let l = index_of[c.left.as_str()];
            let r = index_of[c.right.as_str()];
            constraints_of[l].push((l, r, &c.predicate));
            if l != r {
                constraints_of[r].push((l, r, &c.predicate));
            }
        }

        // Small domains first keeps the search tree narrow.
        let mut order: Vec<usize> = (0..var_count).collect();
        order.sort_by_key(|&v| domains[v].len());

        let mut search = Search {
            intervals,
            domains: &domains,
            constraints_of: &constraints_of,
            order: &order,
            exhaustive,
            assignment: vec![None; var_count],
            used: FxHashSet::default(),
            solutions: Vec::new(),
        };
        search.run(0);

        let solutions = search
            .solutions
            .into_iter()
            .map(|assignment| {
                pattern
                    .variables
                    .iter()
                    .enumerate()
                    .map(|(idx, v)| (v.name.clone(), intervals[assignment[idx]].clone()))
                    .collect()
            })
            .collect();
        Ok(solutions)
    }
}

struct Search<'a, P> {
    intervals: &'a [Interval<P>],
    domains: &'a [Vec<usize>],
    constraints_of: &'a [Vec<(usize, usize, &'a BinaryPred<P>)>],
    order: &'a [usize],
    exhaustive: bool,
    assignment: Vec<Option<usize>>,
    used: FxHashSet<usize>,
    solutions: Vec<Vec<usize>>,
}

impl<P> Search<'_, P> {
    /// Returns `true` when the search should stop.
    fn run(&mut self, depth: usize) -> bool {
        if depth == self.order.len() {
            // Every slot is bound once the ordering is exhausted.
            let solution = self.assignment.iter().copied().flatten().collect();
            self.solutions.push(solution);
            return !self.exhaustive;
        }
        let var = self.order[depth];
        for candidate_pos in 0..self.domains[var].len() {
            let candidate = self.domains[var][candidate_pos];
            if self.used.contains(&candidate) {
                continue;
            }
            self.assignment[var] = Some(candidate);
            if self.consistent(var) {
                self.used.insert(candidate);
                let stop = self.run(depth + 1);
                self.used.remove(&candidate);
                if stop {
                    self.assignment[var] = None;
                    return true;
                }
            }
            self.assignment[var] = None;
        }
        false
    }

    /// Check every constraint touching `var` whose endpoints are bound.
    fn consistent(&self, var: usize) -> bool {
        for &(l, r, predicate) in &self.constraints_of[var] {
            if let (Some(li), Some(ri)) = (self.assignment[l], self.assignment[r])
                && !predicate(&self.intervals[li], &self.intervals[ri])
            {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates;

    fn labeled(spans: &[(f64, f64, &'static str)]) -> IntervalSet<&'static str> {
        IntervalSet::new(
            spans
                .iter()
                .map(|&(t1, t2, label)| Interval::from_temporal(t1, t2, label).unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_finds_sequence() {
        let set = labeled(&[
            (0.0, 1.0, "a"),
            (2.0, 3.0, "b"),
            (4.0, 5.0, "c"),
            (6.0, 7.0, "a"),
        ]);
        let pattern = Pattern::new()
            .variable_where("first", |i: &Interval<&str>| i.payload == "a")
            .variable_where("second", |i: &Interval<&str>| i.payload == "b")
            .constraint("first", "second", predicates::before(f64::INFINITY));

        let solutions = set.match_pattern(&pattern, true).unwrap();
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0]["first"].t1(), 0.0);
        assert_eq!(solutions[0]["second"].t1(), 2.0);
    }

    #[test]
    fn test_exhaustive_vs_first() {
        let set = labeled(&[(0.0, 1.0, "x"), (2.0, 3.0, "x"), (4.0, 5.0, "x")]);
        let pattern = Pattern::new()
            .variable("a")
            .variable("b")
            .constraint("a", "b", predicates::before(f64::INFINITY));

        // Ordered pairs of distinct intervals: 3 choose 2 = 3.
        let all = set.match_pattern(&pattern, true).unwrap();
        assert_eq!(all.len(), 3);

        let first = set.match_pattern(&pattern, false).unwrap();
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_distinct_bindings() {
        let set = labeled(&[(0.0, 1.0, "x"), (2.0, 3.0, "x")]);
        let pattern = Pattern::new().variable("a").variable("b");
        let all = set.match_pattern(&pattern, true).unwrap();
        // Two unconstrained variables over two intervals: both orderings,
        // never the same interval twice.
        assert_eq!(all.len(), 2);
        for solution in &all {
            assert_ne!(solution["a"], solution["b"]);
        }
    }

    #[test]
    fn test_repeat_declaration_narrows_domain() {
        let set = labeled(&[(0.0, 1.0, "x"), (2.0, 10.0, "x")]);
        let pattern = Pattern::new()
            .variable_where("a", |i: &Interval<&str>| i.length() > 1.0)
            .variable_where("a", |i: &Interval<&str>| i.t1() >= 2.0);
        let all = set.match_pattern(&pattern, true).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["a"].t1(), 2.0);
    }

    #[test]
    fn test_no_solution() {
        let set = labeled(&[(0.0, 1.0, "x")]);
        let pattern = Pattern::new()
            .variable("a")
            .variable("b")
            .constraint("a", "b", predicates::t_overlaps());
        let all = set.match_pattern(&pattern, true).unwrap();
        assert!(all.is_empty());
    }

    #[test]
    fn test_validation_errors() {
        let set = labeled(&[(0.0, 1.0, "x")]);

        let empty: Pattern<&str> = Pattern::new();
        assert!(matches!(
            set.match_pattern(&empty, false),
            Err(SpatiqError::EmptyPattern)
        ));

        let unknown = Pattern::new()
            .variable("a")
            .constraint("a", "ghost", predicates::t_overlaps());
        assert!(matches!(
            set.match_pattern(&unknown, false),
            Err(SpatiqError::UnknownVariable(name)) if name == "ghost"
        ));
    }

    #[test]
    fn test_three_variable_chain() {
        let set = labeled(&[
            (0.0, 2.0, "walk"),
            (2.0, 4.0, "run"),
            (4.0, 6.0, "walk"),
            (10.0, 12.0, "run"),
        ]);
        // walk meets run meets walk, all adjacent.
        let pattern = Pattern::new()
            .variable_where("w1", |i: &Interval<&str>| i.payload == "walk")
            .variable_where("r", |i: &Interval<&str>| i.payload == "run")
            .variable_where("w2", |i: &Interval<&str>| i.payload == "walk")
            .constraint("w1", "r", predicates::meets_before(0.0))
            .constraint("r", "w2", predicates::meets_before(0.0));

        let all = set.match_pattern(&pattern, true).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["w1"].t1(), 0.0);
        assert_eq!(all[0]["r"].t1(), 2.0);
        assert_eq!(all[0]["w2"].t1(), 4.0);
    }
}
