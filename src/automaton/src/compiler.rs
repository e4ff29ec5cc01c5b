//! Permission pattern compiler
//!
//! Two dialects are understood:
//!
//! - **Wildcard** (default): `*` matches any run of characters, `?` matches
//!   exactly one character and `\` escapes the next character. A trailing
//!   lone `\` is taken as a literal backslash.
//! - **Regex**: a pattern wrapped in `/…/`. The interior is a regular
//!   expression that must match the whole candidate string.
//!
//! # Examples
//!
//! ```
//! use cretoai_automaton::PatternCompiler;
//!
//! let compiler = PatternCompiler::new();
//! let automaton = compiler.compile_set(&["logs-*", "/metrics-20[0-9]{2}/"]).unwrap();
//!
//! assert!(automaton.run("logs-app1"));
//! assert!(automaton.run("metrics-2020"));
//! assert!(!automaton.run("metrics-latest"));
//! ```

use once_cell::sync::Lazy;
use regex_syntax::hir::{Class, Hir, HirKind};
use regex_syntax::ParserBuilder;
use tracing::{debug, warn};

use crate::automaton::Automaton;
use crate::cache::AutomatonCache;
use crate::error::{AutomatonError, Result};
use crate::nfa::{Fragment, Nfa};
use crate::predicate::MatchPredicate;
use crate::settings::{self, AutomataSettings, CacheSettings};

/// Matches any run of characters
pub const WILDCARD_STRING: char = '*';
/// Matches exactly one character
pub const WILDCARD_CHAR: char = '?';
/// Escapes the following character
pub const WILDCARD_ESCAPE: char = '\\';
/// Delimits regex-dialect patterns
pub const REGEX_DELIMITER: char = '/';

/// Compiles permission patterns into minimal deterministic automata
#[derive(Debug, Clone, Default)]
pub struct PatternCompiler {
    max_states: Option<usize>,
    cache: Option<AutomatonCache>,
}

impl PatternCompiler {
    /// Compiler using the process-wide state ceiling and no cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiler configured from settings
    pub fn from_settings(settings: &AutomataSettings) -> Self {
        Self {
            max_states: Some(settings.max_determinized_states),
            cache: AutomatonCache::from_settings(&settings.cache),
        }
    }

    /// Pins the state ceiling instead of reading the process-wide value
    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = Some(max_states);
        self
    }

    pub fn with_cache(mut self, cache: AutomatonCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Effective state ceiling
    pub fn max_states(&self) -> usize {
        self.max_states
            .unwrap_or_else(settings::max_determinized_states)
    }

    pub fn cache(&self) -> Option<&AutomatonCache> {
        self.cache.as_ref()
    }

    /// Compiles a single pattern
    pub fn compile(&self, pattern: &str) -> Result<Automaton> {
        self.compile_set(&[pattern])
    }

    /// Compiles the union of all `patterns`
    ///
    /// An empty set compiles to the empty language.
    pub fn compile_set<S: AsRef<str>>(&self, patterns: &[S]) -> Result<Automaton> {
        if patterns.is_empty() {
            return Ok(Automaton::empty());
        }

        let limit = self.max_states();
        match &self.cache {
            Some(cache) => cache
                .get_or_try_insert_with(AutomatonCache::key_for(patterns, limit), || {
                    self.build(patterns, limit)
                }),
            None => self.build(patterns, limit),
        }
    }

    /// Compiles `patterns` into a ready-to-use predicate
    pub fn predicate<S: AsRef<str>>(&self, patterns: &[S]) -> Result<MatchPredicate> {
        self.compile_set(patterns).map(|a| MatchPredicate::new(&a))
    }

    fn build<S: AsRef<str>>(&self, patterns: &[S], limit: usize) -> Result<Automaton> {
        let mut nfa = Nfa::new(limit);

        let mut branches = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            branches.push(parse(&mut nfa, pattern.as_ref())?);
        }

        let root = nfa.alternate(branches)?;
        let automaton = nfa.determinize(root, limit).map_err(|e| {
            warn!(
                "Rejecting {} pattern(s) starting with [{}]: {}",
                patterns.len(),
                patterns[0].as_ref(),
                e
            );
            e
        })?;

        debug!(
            "Compiled {} pattern(s) into automaton with {} states",
            patterns.len(),
            automaton.num_states()
        );
        Ok(automaton)
    }
}

fn parse(nfa: &mut Nfa, pattern: &str) -> Result<Fragment> {
    if pattern.len() > 1 {
        if let Some(rest) = pattern.strip_prefix(REGEX_DELIMITER) {
            return match rest.strip_suffix(REGEX_DELIMITER) {
                Some(interior) => regex(nfa, pattern, interior),
                None => Err(AutomatonError::syntax(
                    pattern,
                    "regular expression patterns must start and end with '/'",
                )),
            };
        }
    }
    wildcard(nfa, pattern)
}

fn wildcard(nfa: &mut Nfa, pattern: &str) -> Result<Fragment> {
    let mut parts = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        let part = match c {
            WILDCARD_STRING => nfa.any_string()?,
            WILDCARD_CHAR => nfa.any_char()?,
            WILDCARD_ESCAPE => match chars.next() {
                Some(escaped) => nfa.char(escaped)?,
                // trailing escape is read leniently as a literal backslash
                None => nfa.char(WILDCARD_ESCAPE)?,
            },
            literal => nfa.char(literal)?,
        };
        parts.push(part);
    }

    nfa.concat(parts)
}

fn regex(nfa: &mut Nfa, pattern: &str, interior: &str) -> Result<Fragment> {
    let hir = ParserBuilder::new()
        .dot_matches_new_line(true)
        .build()
        .parse(interior)
        .map_err(|e| AutomatonError::syntax(pattern, e.to_string()))?;

    from_hir(nfa, pattern, &hir)
}

fn from_hir(nfa: &mut Nfa, pattern: &str, hir: &Hir) -> Result<Fragment> {
    match hir.kind() {
        HirKind::Empty => nfa.empty_string(),
        HirKind::Literal(literal) => {
            let text = std::str::from_utf8(&literal.0)
                .map_err(|_| AutomatonError::syntax(pattern, "literal is not valid UTF-8"))?;
            let mut parts = Vec::with_capacity(text.len());
            for c in text.chars() {
                parts.push(nfa.char(c)?);
            }
            nfa.concat(parts)
        }
        HirKind::Class(Class::Unicode(class)) => {
            nfa.ranges(class.iter().map(|r| (r.start() as u32, r.end() as u32)))
        }
        HirKind::Class(Class::Bytes(class)) => {
            nfa.ranges(class.iter().map(|r| (r.start() as u32, r.end() as u32)))
        }
        HirKind::Look(look) => Err(AutomatonError::syntax(
            pattern,
            format!(
                "assertion {:?} is not supported, patterns always match the whole string",
                look
            ),
        )),
        HirKind::Repetition(rep) => repeat(nfa, pattern, &rep.sub, rep.min, rep.max),
        HirKind::Capture(capture) => from_hir(nfa, pattern, &capture.sub),
        HirKind::Concat(subs) => {
            let mut parts = Vec::with_capacity(subs.len());
            for sub in subs {
                parts.push(from_hir(nfa, pattern, sub)?);
            }
            nfa.concat(parts)
        }
        HirKind::Alternation(subs) => {
            let mut parts = Vec::with_capacity(subs.len());
            for sub in subs {
                parts.push(from_hir(nfa, pattern, sub)?);
            }
            nfa.alternate(parts)
        }
    }
}

/// Expands `sub{min,max}`; each copy is built afresh since fragments are single-use
fn repeat(nfa: &mut Nfa, pattern: &str, sub: &Hir, min: u32, max: Option<u32>) -> Result<Fragment> {
    let mut parts = Vec::new();
    for _ in 0..min {
        parts.push(from_hir(nfa, pattern, sub)?);
    }

    match max {
        None => {
            let body = from_hir(nfa, pattern, sub)?;
            parts.push(nfa.star(body)?);
        }
        Some(max) => {
            for _ in min..max {
                let body = from_hir(nfa, pattern, sub)?;
                parts.push(nfa.optional(body)?);
            }
        }
    }

    nfa.concat(parts)
}

static DEFAULT_COMPILER: Lazy<PatternCompiler> = Lazy::new(|| {
    let mut compiler = PatternCompiler::new();
    compiler.cache = AutomatonCache::from_settings(&CacheSettings::default());
    compiler
});

/// Process-wide compiler: process-wide state ceiling and a shared cache
pub fn default_compiler() -> &'static PatternCompiler {
    &DEFAULT_COMPILER
}

pub(crate) fn clear_default_cache() {
    if let Some(cache) = Lazy::get(&DEFAULT_COMPILER).and_then(|c| c.cache()) {
        cache.clear();
    }
}

/// Compiles a single pattern with the process-wide compiler
pub fn pattern(pattern: &str) -> Result<Automaton> {
    default_compiler().compile(pattern)
}

/// Compiles a pattern set with the process-wide compiler
pub fn patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Automaton> {
    default_compiler().compile_set(patterns)
}

/// Builds a match predicate for a pattern set with the process-wide compiler
pub fn predicate<S: AsRef<str>>(patterns: &[S]) -> Result<MatchPredicate> {
    default_compiler().predicate(patterns)
}
