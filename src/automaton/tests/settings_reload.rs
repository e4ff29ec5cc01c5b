//! Reloading the process-wide state ceiling
//!
//! Lives in its own test binary so the global ceiling is not shared with
//! other tests.

use std::time::Duration;

use cretoai_automaton::{AutomataSettings, AutomatonCache, AutomatonError, PatternCompiler};

#[test]
fn test_user_cache_follows_applied_ceiling() {
    // Needs 2^14 determinized states
    let pattern = "/[ab]*a[ab]{13}/";
    let cache = AutomatonCache::new(10, Duration::from_secs(60));
    let compiler = PatternCompiler::new().with_cache(cache.clone());

    AutomataSettings::default().apply();
    let automaton = compiler.compile(pattern).unwrap();
    assert!(automaton.run(&format!("a{}", "b".repeat(13))));
    assert_eq!(cache.len(), 1);

    AutomataSettings {
        max_determinized_states: 10_000,
        ..AutomataSettings::default()
    }
    .apply();
    assert_eq!(compiler.max_states(), 10_000);
    assert_eq!(
        compiler.compile(pattern).unwrap_err(),
        AutomatonError::TooComplex { limit: 10_000 }
    );

    AutomataSettings::default().apply();
    assert_eq!(compiler.compile(pattern).unwrap(), automaton);
    assert_eq!(cache.stats().hits, 1);
}
