//! Resolution memo across a reload of the process-wide state ceiling
//!
//! Lives in its own test binary so the global ceiling is not shared with
//! other tests.

use std::ptr;

use cretoai_automaton::AutomataSettings;
use cretoai_privilege::{ClusterPrivilege, IndexPrivilege, PrivilegeName};

#[test]
fn test_memo_is_rebuilt_after_ceiling_change() {
    let name = PrivilegeName::from("read,monitor");
    AutomataSettings::default().apply();

    let first = IndexPrivilege::resolve(&name).unwrap();
    let memoized = IndexPrivilege::resolve(&name).unwrap();
    assert!(ptr::eq(first.automaton(), memoized.automaton()));

    AutomataSettings {
        max_determinized_states: 20_000,
        ..AutomataSettings::default()
    }
    .apply();

    let rebuilt = IndexPrivilege::resolve(&name).unwrap();
    assert_eq!(rebuilt, first);
    assert_eq!(rebuilt.automaton(), first.automaton());
    assert!(!ptr::eq(first.automaton(), rebuilt.automaton()));

    let again = IndexPrivilege::resolve(&name).unwrap();
    assert!(ptr::eq(rebuilt.automaton(), again.automaton()));

    AutomataSettings::default().apply();
}

#[test]
fn test_cluster_memo_follows_ceiling() {
    let name = PrivilegeName::from("monitor,cluster:admin/reroute");
    AutomataSettings::default().apply();
    let first = ClusterPrivilege::resolve(&name).unwrap();

    AutomataSettings {
        max_determinized_states: 30_000,
        ..AutomataSettings::default()
    }
    .apply();
    let rebuilt = ClusterPrivilege::resolve(&name).unwrap();
    assert!(!ptr::eq(first.automaton(), rebuilt.automaton()));
    assert!(rebuilt.predicate().test("cluster:admin/reroute"));

    AutomataSettings::default().apply();
}
