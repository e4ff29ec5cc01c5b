//! Deterministic finite automaton over Unicode scalar values
//!
//! States live in an arena and are addressed by `u32` index. State 0 is the
//! initial state. Every state keeps its outgoing transitions sorted by range
//! start and non-overlapping; a character with no transition goes to an
//! implicit dead state.
//!
//! Automata handed out by this crate are always trimmed, minimal and
//! canonically numbered, so two automata compare equal exactly when they
//! accept the same language.

use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use crate::error::AutomatonError;
use crate::minimize::minimize;

/// Largest Unicode scalar value
pub const MAX_CODE_POINT: u32 = char::MAX as u32;

/// Inclusive ranges of Unicode scalar values (everything but surrogates)
pub const SCALAR_RANGES: [(u32, u32); 2] = [(0, 0xD7FF), (0xE000, MAX_CODE_POINT)];

/// A transition on the inclusive character range `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Transition {
    /// First code point of the range
    pub min: u32,
    /// Last code point of the range (inclusive)
    pub max: u32,
    /// Target state index
    pub to: u32,
}

impl Transition {
    /// Creates a new transition
    pub fn new(min: u32, max: u32, to: u32) -> Self {
        Self { min, max, to }
    }

    /// Returns true if `code` falls inside this transition's range
    pub fn contains(&self, code: u32) -> bool {
        self.min <= code && code <= self.max
    }
}

/// A single automaton state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct State {
    pub(crate) accept: bool,
    pub(crate) transitions: Vec<Transition>,
}

impl State {
    pub(crate) fn new(accept: bool) -> Self {
        Self {
            accept,
            transitions: Vec::new(),
        }
    }

    /// Whether reaching this state at end of input accepts
    pub fn is_accept(&self) -> bool {
        self.accept
    }

    /// Outgoing transitions, sorted by range start
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Follows the transition for `code`, if any
    pub(crate) fn step(&self, code: u32) -> Option<u32> {
        let idx = self.transitions.partition_point(|t| t.max < code);
        self.transitions
            .get(idx)
            .filter(|t| t.min <= code)
            .map(|t| t.to)
    }
}

/// A deterministic finite automaton
///
/// Cloning is cheap: the state arena is shared. Deserialized arenas are
/// validated and brought back to canonical form.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAutomaton")]
pub struct Automaton {
    states: Arc<[State]>,
}

/// Serialized form of an automaton before validation
#[derive(Deserialize)]
struct RawAutomaton {
    states: Vec<State>,
}

impl TryFrom<RawAutomaton> for Automaton {
    type Error = AutomatonError;

    fn try_from(raw: RawAutomaton) -> Result<Self, Self::Error> {
        let count = raw.states.len();
        if count == 0 {
            return Err(AutomatonError::invalid("automaton has no initial state"));
        }

        let surrogates = SCALAR_RANGES[0].1 + 1..SCALAR_RANGES[1].0;
        for (id, state) in raw.states.iter().enumerate() {
            let mut previous: Option<&Transition> = None;
            for t in &state.transitions {
                if t.to as usize >= count {
                    return Err(AutomatonError::invalid(format!(
                        "state {} has a transition to missing state {}",
                        id, t.to
                    )));
                }
                if t.min > t.max || t.max > MAX_CODE_POINT {
                    return Err(AutomatonError::invalid(format!(
                        "state {} has an invalid range {:#x}..={:#x}",
                        id, t.min, t.max
                    )));
                }
                if t.min < surrogates.end && t.max >= surrogates.start {
                    return Err(AutomatonError::invalid(format!(
                        "state {} has a range {:#x}..={:#x} covering surrogates",
                        id, t.min, t.max
                    )));
                }
                if previous.is_some_and(|p| p.max >= t.min) {
                    return Err(AutomatonError::invalid(format!(
                        "state {} has unsorted or overlapping ranges",
                        id
                    )));
                }
                previous = Some(t);
            }
        }

        Ok(minimize(raw.states))
    }
}

impl Automaton {
    /// Automaton accepting nothing
    pub fn empty() -> Self {
        Self::from_states(vec![State::new(false)])
    }

    /// Automaton accepting only the empty string
    pub fn empty_string() -> Self {
        Self::from_states(vec![State::new(true)])
    }

    /// Automaton accepting every string, including the empty string
    pub fn any_string() -> Self {
        let mut state = State::new(true);
        for (min, max) in SCALAR_RANGES {
            state.transitions.push(Transition::new(min, max, 0));
        }
        Self::from_states(vec![state])
    }

    pub(crate) fn from_states(states: Vec<State>) -> Self {
        Self {
            states: states.into(),
        }
    }

    /// Number of states (the implicit dead state is not counted)
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Total number of range transitions across all states
    pub fn num_transitions(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    /// All states, indexed by state id
    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub(crate) fn state(&self, id: u32) -> &State {
        &self.states[id as usize]
    }

    pub(crate) fn step(&self, state: u32, code: u32) -> Option<u32> {
        self.state(state).step(code)
    }

    /// Runs the automaton over `input`
    ///
    /// Prefer [`MatchPredicate`](crate::MatchPredicate) on hot paths.
    pub fn run(&self, input: &str) -> bool {
        let mut state = 0u32;
        for c in input.chars() {
            match self.step(state, c as u32) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.state(state).accept
    }

    /// Returns true if the language is empty
    pub fn is_empty(&self) -> bool {
        !self.reachable().any(|id| self.state(id).accept)
    }

    /// Returns true if every string is accepted
    pub fn is_total(&self) -> bool {
        self.reachable().all(|id| {
            let state = self.state(id);
            state.accept && covers_alphabet(&state.transitions)
        })
    }

    /// Iterates state ids reachable from the initial state
    fn reachable(&self) -> impl Iterator<Item = u32> + '_ {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([0u32]);
        seen.insert(0u32);
        std::iter::from_fn(move || {
            let id = queue.pop_front()?;
            for t in &self.state(id).transitions {
                if seen.insert(t.to) {
                    queue.push_back(t.to);
                }
            }
            Some(id)
        })
    }
}

impl Default for Automaton {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Automaton")
            .field("states", &self.num_states())
            .field("transitions", &self.num_transitions())
            .finish()
    }
}

/// Whether the transitions cover every Unicode scalar value
fn covers_alphabet(transitions: &[Transition]) -> bool {
    let surrogates = SCALAR_RANGES[0].1 + 1..SCALAR_RANGES[1].0;
    let mut next = 0u32;
    for t in transitions {
        if t.min > next && !(next == surrogates.start && t.min <= surrogates.end) {
            return false;
        }
        next = next.max(t.max + 1);
    }
    next == MAX_CODE_POINT + 1
}

/// Collects the sorted range boundaries of a set of transitions
///
/// Every returned point starts an interval on which each input transition is
/// either fully on or fully off; the last interval runs to
/// [`MAX_CODE_POINT`].
pub(crate) fn boundaries<'a, I>(transitions: I) -> Vec<u32>
where
    I: IntoIterator<Item = &'a Transition>,
{
    let mut points = Vec::new();
    for t in transitions {
        points.push(t.min);
        if t.max < MAX_CODE_POINT {
            points.push(t.max + 1);
        }
    }
    points.sort_unstable();
    points.dedup();
    points
}

/// Appends `[min, max] -> to`, merging with the previous range when contiguous
pub(crate) fn push_merged(transitions: &mut Vec<Transition>, min: u32, max: u32, to: u32) {
    if let Some(last) = transitions.last_mut() {
        if last.to == to && last.max + 1 == min {
            last.max = max;
            return;
        }
    }
    transitions.push(Transition::new(min, max, to));
}

/// End of the interval starting at `points[idx]`
pub(crate) fn interval_end(points: &[u32], idx: usize) -> u32 {
    points
        .get(idx + 1)
        .map(|next| next - 1)
        .unwrap_or(MAX_CODE_POINT)
}
