//! Compiled match predicate for the authorization hot path

use std::fmt;

use crate::automaton::{Automaton, Transition};

const NO_STATE: u32 = u32::MAX;
const ASCII: usize = 128;

/// Automata up to this many states get a direct ASCII lookup table
const ASCII_TABLE_MAX_STATES: usize = 4096;

/// Whole-string matcher over a compiled automaton
///
/// Each input character costs one table lookup (ASCII) or one binary search
/// over the current state's sorted ranges. There is no backtracking and no
/// interior mutability, so a predicate can be shared across threads and
/// tested concurrently without locking.
#[derive(Clone)]
pub struct MatchPredicate {
    accept: Box<[bool]>,
    /// `offsets[s]..offsets[s + 1]` indexes the ranges of state `s`
    offsets: Box<[u32]>,
    ranges: Box<[Transition]>,
    ascii: Option<Box<[u32]>>,
}

impl MatchPredicate {
    pub fn new(automaton: &Automaton) -> Self {
        let states = automaton.states();

        let accept = states.iter().map(|s| s.is_accept()).collect();

        let mut offsets = Vec::with_capacity(states.len() + 1);
        let mut ranges = Vec::with_capacity(automaton.num_transitions());
        offsets.push(0);
        for state in states {
            ranges.extend_from_slice(state.transitions());
            offsets.push(ranges.len() as u32);
        }

        let ascii = (states.len() <= ASCII_TABLE_MAX_STATES).then(|| {
            let mut table = vec![NO_STATE; states.len() * ASCII];
            for (id, state) in states.iter().enumerate() {
                for t in state.transitions() {
                    if t.min as usize >= ASCII {
                        break;
                    }
                    let hi = (t.max as usize).min(ASCII - 1);
                    for code in t.min as usize..=hi {
                        table[id * ASCII + code] = t.to;
                    }
                }
            }
            table.into_boxed_slice()
        });

        Self {
            accept,
            offsets: offsets.into_boxed_slice(),
            ranges: ranges.into_boxed_slice(),
            ascii,
        }
    }

    /// Returns true if the whole of `candidate` is accepted
    pub fn test(&self, candidate: &str) -> bool {
        let mut state = 0u32;
        for c in candidate.chars() {
            match self.step(state, c as u32) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.accept[state as usize]
    }

    /// Number of states in the underlying automaton
    pub fn num_states(&self) -> usize {
        self.accept.len()
    }

    #[inline]
    fn step(&self, state: u32, code: u32) -> Option<u32> {
        if let Some(table) = &self.ascii {
            if (code as usize) < ASCII {
                let next = table[state as usize * ASCII + code as usize];
                return (next != NO_STATE).then_some(next);
            }
        }

        let lo = self.offsets[state as usize] as usize;
        let hi = self.offsets[state as usize + 1] as usize;
        let ranges = &self.ranges[lo..hi];
        let idx = ranges.partition_point(|t| t.max < code);
        ranges
            .get(idx)
            .filter(|t| t.min <= code)
            .map(|t| t.to)
    }
}

impl From<&Automaton> for MatchPredicate {
    fn from(automaton: &Automaton) -> Self {
        Self::new(automaton)
    }
}

impl fmt::Debug for MatchPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchPredicate")
            .field("states", &self.num_states())
            .field("ranges", &self.ranges.len())
            .field("ascii_table", &self.ascii.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::PatternCompiler;

    fn predicate(patterns: &[&str]) -> MatchPredicate {
        PatternCompiler::new().predicate(patterns).unwrap()
    }

    #[test]
    fn test_full_string_match() {
        let p = predicate(&["index-*"]);
        assert!(p.test("index-"));
        assert!(p.test("index-prod"));
        assert!(!p.test("my-index-prod"));
        assert!(!p.test("index"));
    }

    #[test]
    fn test_empty_language_rejects_everything() {
        let p = MatchPredicate::new(&Automaton::empty());
        assert!(!p.test(""));
        assert!(!p.test("a"));
    }

    #[test]
    fn test_any_string() {
        let p = MatchPredicate::from(&Automaton::any_string());
        assert!(p.test(""));
        assert!(p.test("ascii"));
        assert!(p.test("ünïcødé ✓ 𝄞"));
    }

    #[test]
    fn test_non_ascii_ranges() {
        let p = predicate(&["café-?", "/[α-ω]+/"]);
        assert!(p.test("café-1"));
        assert!(p.test("café-é"));
        assert!(!p.test("cafe-1"));
        assert!(!p.test("λόγος"));
        assert!(p.test("λογος"));
    }

    #[test]
    fn test_matches_automaton_run() {
        let automaton = PatternCompiler::new()
            .compile_set(&["a*b?c", "/x(yz)*/"])
            .unwrap();
        let p = MatchPredicate::new(&automaton);
        for candidate in ["abc", "aXXbQc", "ac", "abbc", "x", "xyzyz", "xy", ""] {
            assert_eq!(p.test(candidate), automaton.run(candidate), "{}", candidate);
        }
    }

    #[test]
    fn test_concurrent_use() {
        use std::sync::Arc;
        use std::thread;

        let p = Arc::new(predicate(&["logs-*"]));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let p = Arc::clone(&p);
                thread::spawn(move || p.test(&format!("logs-{}", i)))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
