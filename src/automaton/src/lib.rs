//! # CretoAI Permission Automata
//!
//! Compiles permission patterns into minimal deterministic automata and
//! provides the automaton algebra used to merge, subtract and compare
//! privileges.
//!
//! ## Features
//!
//! - **Two pattern dialects**: wildcards (`*`, `?`, `\`) and `/regex/`
//! - **Bounded construction**: every determinization enforces a state ceiling
//!   and aborts early on pathological input
//! - **Canonical automata**: equal languages produce equal automata
//! - **Algebra**: union, difference, intersection, subset containment
//! - **Match predicates**: allocation-free whole-string matching, shareable
//!   across threads
//! - **Pattern cache**: DashMap-backed cache of compiled pattern sets
//!
//! ## Example
//!
//! ```rust
//! use cretoai_automaton::{algebra, PatternCompiler, MatchPredicate};
//!
//! let compiler = PatternCompiler::new();
//! let logs = compiler.compile("logs-*").unwrap();
//! let metrics = compiler.compile("/metrics-20[0-9]{2}/").unwrap();
//!
//! let both = algebra::union_and_determinize(&logs, &metrics).unwrap();
//! assert!(algebra::subset_of(&logs, &both));
//!
//! let predicate = MatchPredicate::new(&both);
//! assert!(predicate.test("metrics-2020"));
//! assert!(!predicate.test("metrics-latest"));
//! ```

pub mod algebra;
pub mod automaton;
pub mod cache;
pub mod compiler;
pub mod error;
pub mod predicate;
pub mod settings;

mod minimize;
mod nfa;

pub use automaton::{Automaton, State, Transition};
pub use cache::{AutomatonCache, CacheStats};
pub use compiler::{default_compiler, pattern, patterns, PatternCompiler};
pub use error::{AutomatonError, Result};
pub use predicate::MatchPredicate;
pub use settings::{max_determinized_states, AutomataSettings, CacheSettings};
