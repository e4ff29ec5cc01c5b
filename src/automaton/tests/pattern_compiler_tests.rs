//! Integration tests for pattern compilation and match predicates
//!
//! Covers:
//! - Wildcard dialect (`*`, `?`, `\`)
//! - Regex dialect and its syntax errors
//! - Pattern sets and the empty set
//! - State ceiling enforcement
//! - Process-wide compiler helpers

use std::time::{Duration, Instant};

use cretoai_automaton::{
    algebra, patterns, AutomatonCache, AutomatonError, MatchPredicate, PatternCompiler,
};

fn predicate(pattern: &str) -> MatchPredicate {
    PatternCompiler::new().predicate(&[pattern]).unwrap()
}

// ============================================================================
// Wildcard Dialect
// ============================================================================

#[test]
fn test_literal_patterns_match_exactly() {
    for literal in ["index-prod", "cluster:monitor/health", "a", "ünïcødé"] {
        let p = predicate(literal);
        assert!(p.test(literal), "{} should match itself", literal);
        assert!(!p.test(&format!("{}x", literal)));
        assert!(!p.test(&format!("x{}", literal)));
    }
}

#[test]
fn test_star_matches_everything() {
    let p = predicate("*");
    for s in ["", "a", "index-prod", "with spaces", "日本語", "\n\t"] {
        assert!(p.test(s), "* should match {:?}", s);
    }
}

#[test]
fn test_star_in_the_middle() {
    let p = predicate("a*b");
    assert!(p.test("aXXb"));
    assert!(p.test("ab"));
    assert!(p.test("abab"));
    assert!(!p.test("a"));
    assert!(!p.test("ba"));
}

#[test]
fn test_question_mark_matches_one_char() {
    let p = predicate("a?c");
    assert!(p.test("abc"));
    assert!(p.test("a?c"));
    assert!(!p.test("ac"));
    assert!(!p.test("abbc"));
}

#[test]
fn test_escaped_metacharacters() {
    let p = predicate("logs\\*\\?");
    assert!(p.test("logs*?"));
    assert!(!p.test("logs-a?"));
    assert!(!p.test("logs*x"));
}

#[test]
fn test_trailing_backslash_is_literal() {
    let p = predicate("dir\\");
    assert!(p.test("dir\\"));
    assert!(!p.test("dir"));
}

// ============================================================================
// Regex Dialect
// ============================================================================

#[test]
fn test_regex_pattern() {
    let p = predicate("/ab+c/");
    assert!(p.test("abbbc"));
    assert!(p.test("abc"));
    assert!(!p.test("ac"));
}

#[test]
fn test_regex_alternation_and_groups() {
    let p = predicate("/(logs|metrics)-[0-9]{4}(\\.[a-z]+)?/");
    assert!(p.test("logs-2020"));
    assert!(p.test("metrics-1999.eu"));
    assert!(!p.test("traces-2020"));
    assert!(!p.test("logs-20"));
}

#[test]
fn test_regex_inline_flags() {
    let p = predicate("/(?i)admin/");
    assert!(p.test("ADMIN"));
    assert!(p.test("Admin"));
    assert!(!p.test("admins"));
}

#[test]
fn test_regex_unicode_classes() {
    let p = predicate("/(\\p{L}|\\p{N}){1,12}/");
    assert!(p.test("héllo123"));
    assert!(p.test("日本語"));
    assert!(!p.test("a-b"));
    assert!(!p.test(""));
    assert!(!p.test("abcdefghijklm"));
}

#[test]
fn test_malformed_regex_is_rejected() {
    let err = PatternCompiler::new().compile("/ab(").unwrap_err();
    assert!(matches!(err, AutomatonError::PatternSyntax { .. }));
    assert!(err.to_string().contains("/ab("));
}

#[test]
fn test_unterminated_regex_is_rejected() {
    let err = PatternCompiler::new().compile("/logs-.*").unwrap_err();
    match err {
        AutomatonError::PatternSyntax { pattern, reason } => {
            assert_eq!(pattern, "/logs-.*");
            assert!(reason.contains("start and end"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_bad_pattern_fails_whole_set() {
    let result = PatternCompiler::new().compile_set(&["logs-*", "/[/"]);
    assert!(matches!(result, Err(AutomatonError::PatternSyntax { .. })));
}

// ============================================================================
// Pattern Sets
// ============================================================================

#[test]
fn test_pattern_set_union() {
    let p = PatternCompiler::new()
        .predicate(&["logs-*", "metrics-2020"])
        .unwrap();
    assert!(p.test("logs-app1"));
    assert!(p.test("metrics-2020"));
    assert!(!p.test("metrics-2021"));
}

#[test]
fn test_empty_set_grants_nothing() {
    let empty: [&str; 0] = [];
    let automaton = PatternCompiler::new().compile_set(&empty).unwrap();
    assert!(automaton.is_empty());
    let p = MatchPredicate::new(&automaton);
    assert!(!p.test(""));
    assert!(!p.test("anything"));
}

#[test]
fn test_mixed_dialects_in_one_set() {
    let compiler = PatternCompiler::new();
    let set = compiler.compile_set(&["index-?", "/index-[0-9]+/"]).unwrap();
    let wildcard = compiler.compile("index-?").unwrap();
    let regex = compiler.compile("/index-[0-9]+/").unwrap();

    assert!(algebra::subset_of(&wildcard, &set));
    assert!(algebra::subset_of(&regex, &set));
    assert!(set.run("index-x"));
    assert!(set.run("index-123"));
    assert!(!set.run("index-xy"));
}

// ============================================================================
// State Ceiling
// ============================================================================

#[test]
fn test_ceiling_rejects_instead_of_truncating() {
    let names: Vec<String> = (0..200).map(|i| format!("user-{:04}", i * 7)).collect();

    let strict = PatternCompiler::new().with_max_states(50);
    assert_eq!(
        strict.compile_set(&names).unwrap_err(),
        AutomatonError::TooComplex { limit: 50 }
    );

    let relaxed = PatternCompiler::new().with_max_states(10_000);
    let automaton = relaxed.compile_set(&names).unwrap();
    assert!(automaton.run("user-0007"));
    assert!(!automaton.run("user-0001"));
}

#[test]
fn test_long_literal_compiles_in_linear_time() {
    let literal: String = (0..50_000u32)
        .map(|i| char::from(b'a' + (i % 26) as u8))
        .collect();

    let started = Instant::now();
    let automaton = PatternCompiler::new().compile(&literal).unwrap();
    let elapsed = started.elapsed();

    assert_eq!(automaton.num_states(), literal.chars().count() + 1);
    assert!(automaton.run(&literal));
    assert!(!automaton.run(&literal[..literal.len() - 1]));
    assert!(elapsed < Duration::from_secs(5), "took {:?}", elapsed);
}

#[test]
fn test_exponential_blowup_is_bounded() {
    // (a|b)*a(a|b){n} needs 2^n determinized states
    let compiler = PatternCompiler::new().with_max_states(1_000);
    let err = compiler.compile("/[ab]*a[ab]{16}/").unwrap_err();
    assert_eq!(err, AutomatonError::TooComplex { limit: 1_000 });

    assert!(compiler.compile("/[ab]*a[ab]{4}/").is_ok());
}

#[test]
fn test_shared_cache_respects_each_ceiling() {
    let words = ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot"];
    let cache = AutomatonCache::new(100, Duration::from_secs(60));

    let relaxed = PatternCompiler::new()
        .with_max_states(1_000)
        .with_cache(cache.clone());
    assert!(relaxed.compile_set(&words).is_ok());

    let strict = PatternCompiler::new()
        .with_max_states(8)
        .with_cache(cache.clone());
    assert_eq!(
        strict.compile_set(&words).unwrap_err(),
        AutomatonError::TooComplex { limit: 8 }
    );
    assert_eq!(cache.len(), 1);
}

// ============================================================================
// Process-wide Helpers
// ============================================================================

#[test]
fn test_process_wide_helpers() {
    let automaton = patterns(&["cluster:monitor/*"]).unwrap();
    assert!(automaton.run("cluster:monitor/health"));

    let again = cretoai_automaton::pattern("cluster:monitor/*").unwrap();
    assert_eq!(automaton, again);

    let p = cretoai_automaton::compiler::predicate(&["indices:data/read/*"]).unwrap();
    assert!(p.test("indices:data/read/search"));
    assert!(!p.test("indices:data/write/index"));
}
