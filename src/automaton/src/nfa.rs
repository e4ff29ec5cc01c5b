//! Thompson-style NFA used while compiling patterns
//!
//! Patterns are first assembled as fragments of one shared epsilon-NFA and
//! then determinized by subset construction. The subset construction checks
//! the state ceiling every time it discovers a new state, so pathological
//! patterns abort before the full powerset is materialized.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::automaton::{
    boundaries, interval_end, push_merged, Automaton, State, Transition, SCALAR_RANGES,
};
use crate::error::{AutomatonError, Result};
use crate::minimize::minimize;

/// NFA states allowed per determinized state before construction gives up
const NFA_STATES_PER_DFA_STATE: usize = 16;

#[derive(Debug, Default, Clone)]
struct NfaState {
    epsilons: Vec<u32>,
    transitions: Vec<Transition>,
}

/// A sub-automaton with a single entry and a single exit state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fragment {
    pub start: u32,
    pub end: u32,
}

#[derive(Debug)]
pub(crate) struct Nfa {
    states: Vec<NfaState>,
    limit: usize,
}

impl Nfa {
    /// Creates an empty NFA for a determinized ceiling of `limit` states
    pub fn new(limit: usize) -> Self {
        Self {
            states: Vec::new(),
            limit,
        }
    }

    fn add_state(&mut self) -> Result<u32> {
        if self.states.len() >= self.limit.saturating_mul(NFA_STATES_PER_DFA_STATE) {
            return Err(AutomatonError::too_complex(self.limit));
        }
        self.states.push(NfaState::default());
        Ok(self.states.len() as u32 - 1)
    }

    fn epsilon(&mut self, from: u32, to: u32) {
        self.states[from as usize].epsilons.push(to);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.states.len()
    }

    /// Matches only the empty string
    pub fn empty_string(&mut self) -> Result<Fragment> {
        let s = self.add_state()?;
        Ok(Fragment { start: s, end: s })
    }

    /// Matches one character from any of the given inclusive ranges
    pub fn ranges<I>(&mut self, ranges: I) -> Result<Fragment>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let start = self.add_state()?;
        let end = self.add_state()?;
        let mut transitions: Vec<Transition> = ranges
            .into_iter()
            .map(|(min, max)| Transition::new(min, max, end))
            .collect();
        transitions.sort_unstable();
        self.states[start as usize].transitions = transitions;
        Ok(Fragment { start, end })
    }

    pub fn char(&mut self, c: char) -> Result<Fragment> {
        self.ranges([(c as u32, c as u32)])
    }

    pub fn any_char(&mut self) -> Result<Fragment> {
        self.ranges(SCALAR_RANGES)
    }

    /// Matches any run of characters, including none
    pub fn any_string(&mut self) -> Result<Fragment> {
        let s = self.add_state()?;
        self.states[s as usize].transitions = SCALAR_RANGES
            .iter()
            .map(|&(min, max)| Transition::new(min, max, s))
            .collect();
        Ok(Fragment { start: s, end: s })
    }

    /// Sequence of fragments in order; empty input matches the empty string
    pub fn concat(&mut self, parts: Vec<Fragment>) -> Result<Fragment> {
        let mut iter = parts.into_iter();
        let first = match iter.next() {
            Some(first) => first,
            None => return self.empty_string(),
        };

        let mut end = first.end;
        for part in iter {
            self.epsilon(end, part.start);
            end = part.end;
        }
        Ok(Fragment {
            start: first.start,
            end,
        })
    }

    /// Any one of the fragments; empty input matches nothing
    pub fn alternate(&mut self, parts: Vec<Fragment>) -> Result<Fragment> {
        if parts.len() == 1 {
            return Ok(parts[0]);
        }

        let start = self.add_state()?;
        let end = self.add_state()?;
        for part in parts {
            self.epsilon(start, part.start);
            self.epsilon(part.end, end);
        }
        Ok(Fragment { start, end })
    }

    /// Zero or one occurrence
    pub fn optional(&mut self, body: Fragment) -> Result<Fragment> {
        let start = self.add_state()?;
        let end = self.add_state()?;
        self.epsilon(start, body.start);
        self.epsilon(body.end, end);
        self.epsilon(start, end);
        Ok(Fragment { start, end })
    }

    /// Zero or more occurrences
    pub fn star(&mut self, body: Fragment) -> Result<Fragment> {
        let start = self.add_state()?;
        let end = self.add_state()?;
        self.epsilon(start, body.start);
        self.epsilon(body.end, start);
        self.epsilon(start, end);
        Ok(Fragment { start, end })
    }

    /// Sorted epsilon closure of `seeds`
    fn closure(&self, seeds: &[u32]) -> Vec<u32> {
        let mut seen: HashSet<u32> = seeds.iter().copied().collect();
        let mut stack: Vec<u32> = seeds.to_vec();
        while let Some(id) = stack.pop() {
            for &next in &self.states[id as usize].epsilons {
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        let mut closure: Vec<u32> = seen.into_iter().collect();
        closure.sort_unstable();
        closure
    }

    /// Subset construction followed by minimization
    ///
    /// Fails with [`AutomatonError::TooComplex`] as soon as more than `limit`
    /// determinized states would be needed.
    pub fn determinize(&self, root: Fragment, limit: usize) -> Result<Automaton> {
        let accept = root.end;
        let mut ids: HashMap<Vec<u32>, u32> = HashMap::new();
        let mut queue: VecDeque<Vec<u32>> = VecDeque::new();
        let mut states: Vec<State> = Vec::new();

        let initial = self.closure(&[root.start]);
        states.push(State::new(initial.binary_search(&accept).is_ok()));
        ids.insert(initial.clone(), 0);
        queue.push_back(initial);

        while let Some(set) = queue.pop_front() {
            let id = ids[&set];
            let mut moves: Vec<&Transition> = set
                .iter()
                .flat_map(|&s| self.states[s as usize].transitions.iter())
                .collect();
            moves.sort_unstable_by_key(|t| t.min);
            let points = boundaries(moves.iter().copied());

            // Sweep the intervals left to right, keeping the moves covering `lo`
            let mut pending = moves.iter().copied().peekable();
            let mut active: Vec<&Transition> = Vec::new();
            let mut transitions = Vec::new();
            for (idx, &lo) in points.iter().enumerate() {
                while let Some(t) = pending.next_if(|t| t.min <= lo) {
                    active.push(t);
                }
                active.retain(|t| t.max >= lo);
                if active.is_empty() {
                    continue;
                }

                let targets: Vec<u32> = active.iter().map(|t| t.to).collect();

                let target = self.closure(&targets);
                let to = match ids.get(&target) {
                    Some(&to) => to,
                    None => {
                        if states.len() >= limit {
                            return Err(AutomatonError::too_complex(limit));
                        }
                        let to = states.len() as u32;
                        states.push(State::new(target.binary_search(&accept).is_ok()));
                        ids.insert(target.clone(), to);
                        queue.push_back(target);
                        to
                    }
                };
                push_merged(&mut transitions, lo, interval_end(&points, idx), to);
            }
            states[id as usize].transitions = transitions;
        }

        Ok(minimize(states))
    }
}
