//! Automaton algebra: union, difference, intersection and containment
//!
//! All operations run a product construction over the range partitions of
//! both operands. The state ceiling is checked whenever a new product state
//! is discovered, so pathological inputs abort early instead of being built
//! and then rejected.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::automaton::{boundaries, interval_end, push_merged, Automaton, State};
use crate::error::{AutomatonError, Result};
use crate::minimize::minimize;
use crate::settings::max_determinized_states;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combine {
    Union,
    Intersection,
    Difference,
}

impl Combine {
    fn accepts(self, a: bool, b: bool) -> bool {
        match self {
            Self::Union => a || b,
            Self::Intersection => a && b,
            Self::Difference => a && !b,
        }
    }

    /// Whether a product state can still lead to acceptance
    fn viable(self, a: Option<u32>, b: Option<u32>) -> bool {
        match self {
            Self::Union => a.is_some() || b.is_some(),
            Self::Intersection => a.is_some() && b.is_some(),
            Self::Difference => a.is_some(),
        }
    }
}

type Pair = (Option<u32>, Option<u32>);

fn product(a: &Automaton, b: &Automaton, op: Combine, limit: usize) -> Result<Automaton> {
    let mut ids: HashMap<Pair, u32> = HashMap::new();
    let mut queue: VecDeque<Pair> = VecDeque::new();
    let mut states: Vec<State> = Vec::new();

    let accepts = |(pa, pb): Pair| {
        op.accepts(
            pa.map_or(false, |s| a.state(s).accept),
            pb.map_or(false, |s| b.state(s).accept),
        )
    };

    let start: Pair = (Some(0), Some(0));
    states.push(State::new(accepts(start)));
    ids.insert(start, 0);
    queue.push_back(start);

    while let Some(pair) = queue.pop_front() {
        let id = ids[&pair];
        let (pa, pb) = pair;
        let ta = pa.map_or(&[][..], |s| a.state(s).transitions());
        let tb = pb.map_or(&[][..], |s| b.state(s).transitions());
        let points = boundaries(ta.iter().chain(tb.iter()));

        let mut transitions = Vec::new();
        for (idx, &lo) in points.iter().enumerate() {
            let next: Pair = (
                pa.and_then(|s| a.step(s, lo)),
                pb.and_then(|s| b.step(s, lo)),
            );
            if !op.viable(next.0, next.1) {
                continue;
            }

            let to = match ids.get(&next) {
                Some(&to) => to,
                None => {
                    if states.len() >= limit {
                        return Err(AutomatonError::too_complex(limit));
                    }
                    let to = states.len() as u32;
                    states.push(State::new(accepts(next)));
                    ids.insert(next, to);
                    queue.push_back(next);
                    to
                }
            };
            push_merged(&mut transitions, lo, interval_end(&points, idx), to);
        }
        states[id as usize].transitions = transitions;
    }

    let result = minimize(states);
    debug!(
        "{:?} of {} and {} states produced {} states",
        op,
        a.num_states(),
        b.num_states(),
        result.num_states()
    );
    Ok(result)
}

/// L(a) ∪ L(b), using the process-wide state ceiling
pub fn union_and_determinize(a: &Automaton, b: &Automaton) -> Result<Automaton> {
    union_and_determinize_with_limit(a, b, max_determinized_states())
}

/// L(a) ∪ L(b), failing if more than `limit` states would be needed
pub fn union_and_determinize_with_limit(
    a: &Automaton,
    b: &Automaton,
    limit: usize,
) -> Result<Automaton> {
    if a.is_empty() || b.is_total() {
        return Ok(b.clone());
    }
    if b.is_empty() || a.is_total() {
        return Ok(a.clone());
    }
    product(a, b, Combine::Union, limit)
}

/// Union of any number of automata; no operands yields the empty language
pub fn union_all<'a, I>(automata: I) -> Result<Automaton>
where
    I: IntoIterator<Item = &'a Automaton>,
{
    let limit = max_determinized_states();
    let mut result = Automaton::empty();
    for automaton in automata {
        result = union_and_determinize_with_limit(&result, automaton, limit)?;
    }
    Ok(result)
}

/// L(a) \ L(b), using the process-wide state ceiling
pub fn minus_and_determinize(a: &Automaton, b: &Automaton) -> Result<Automaton> {
    minus_and_determinize_with_limit(a, b, max_determinized_states())
}

/// L(a) \ L(b), failing if more than `limit` states would be needed
pub fn minus_and_determinize_with_limit(
    a: &Automaton,
    b: &Automaton,
    limit: usize,
) -> Result<Automaton> {
    if b.is_empty() {
        return Ok(a.clone());
    }
    product(a, b, Combine::Difference, limit)
}

/// L(a) ∩ L(b), using the process-wide state ceiling
pub fn intersect_and_determinize(a: &Automaton, b: &Automaton) -> Result<Automaton> {
    intersect_and_determinize_with_limit(a, b, max_determinized_states())
}

/// L(a) ∩ L(b), failing if more than `limit` states would be needed
pub fn intersect_and_determinize_with_limit(
    a: &Automaton,
    b: &Automaton,
    limit: usize,
) -> Result<Automaton> {
    if a.is_total() {
        return Ok(b.clone());
    }
    if b.is_total() {
        return Ok(a.clone());
    }
    product(a, b, Combine::Intersection, limit)
}

/// Returns true iff L(a) ⊆ L(b)
///
/// Explores the product lazily and stops at the first string accepted by `a`
/// but not by `b`. Nothing is materialized, so no ceiling applies.
pub fn subset_of(a: &Automaton, b: &Automaton) -> bool {
    if a == b || b.is_total() {
        return true;
    }

    let mut seen: HashSet<(u32, Option<u32>)> = HashSet::new();
    let mut queue: VecDeque<(u32, Option<u32>)> = VecDeque::new();
    seen.insert((0, Some(0)));
    queue.push_back((0, Some(0)));

    while let Some((pa, pb)) = queue.pop_front() {
        let sa = a.state(pa);
        if sa.accept && !pb.map_or(false, |s| b.state(s).accept) {
            return false;
        }

        let tb = pb.map_or(&[][..], |s| b.state(s).transitions());
        let points = boundaries(sa.transitions().iter().chain(tb.iter()));
        for &lo in &points {
            let na = match sa.step(lo) {
                Some(na) => na,
                None => continue,
            };
            let next = (na, pb.and_then(|s| b.step(s, lo)));
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }

    true
}
