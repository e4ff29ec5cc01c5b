//! Built-in privilege tables and name resolution
//!
//! Domains with a fixed set of named privileges (index, cluster) resolve a
//! [`PrivilegeName`] by combining built-ins with raw action patterns:
//! `read,indices:admin/refresh` grants everything `read` grants plus every
//! action starting with `indices:admin/refresh`.

use std::collections::BTreeMap;

use cretoai_automaton::{algebra, compiler, max_determinized_states, Automaton};
use dashmap::DashMap;
use tracing::{debug, error};

use crate::error::{PrivilegeError, Result};
use crate::name::PrivilegeName;
use crate::privilege::{Privilege, PrivilegeDomain};

/// Resolved privileges keyed by lowercased name, tagged with their ceiling
pub type ResolvedPrivileges<D> = DashMap<PrivilegeName, (usize, Privilege<D>)>;

/// A domain with named built-in privileges
pub trait BuiltinPrivileges: PrivilegeDomain {
    /// Built-in privileges keyed by name
    fn builtins() -> &'static BTreeMap<&'static str, Privilege<Self>>;

    /// Memo of privileges resolved from composite names
    ///
    /// Each entry is tagged with the state ceiling it was built under.
    fn resolved() -> &'static ResolvedPrivileges<Self>;

    /// Whether `part` names an action rather than a built-in
    ///
    /// Actions are whatever the domain's `all` privilege grants.
    fn is_action(part: &str) -> bool {
        Self::builtins()
            .get("all")
            .map_or(false, |all| all.predicate().test(part))
    }
}

/// Compiles a built-in definition, failing closed
///
/// A definition that does not compile grants nothing; the error is logged
/// since built-ins are never expected to fail.
pub(crate) fn define<D: PrivilegeDomain>(name: &str, patterns: &[&str]) -> Privilege<D> {
    let automaton = compiler::patterns(patterns).unwrap_or_else(|e| {
        error!(
            "Failed to build {} privilege [{}], it will grant nothing: {}",
            D::KIND,
            name,
            e
        );
        Automaton::empty()
    });
    Privilege::new(PrivilegeName::from(name), automaton)
}

/// Builds a built-in as the difference of two others, failing closed
pub(crate) fn define_difference<D: PrivilegeDomain>(
    name: &str,
    base: &Privilege<D>,
    excluded: &Privilege<D>,
) -> Privilege<D> {
    let automaton = algebra::minus_and_determinize(base.automaton(), excluded.automaton())
        .unwrap_or_else(|e| {
            error!(
                "Failed to build {} privilege [{}], it will grant nothing: {}",
                D::KIND,
                name,
                e
            );
            Automaton::empty()
        });
    Privilege::new(PrivilegeName::from(name), automaton)
}

/// Turns an action name into the pattern granting it and its sub-actions
fn action_to_pattern(action: &str) -> String {
    format!("{}*", action)
}

impl<D: BuiltinPrivileges> Privilege<D> {
    /// Looks up a built-in privilege by exact name
    pub fn builtin(name: &str) -> Option<Self> {
        D::builtins().get(name).cloned()
    }

    /// Names of all built-in privileges, sorted
    pub fn builtin_names() -> impl Iterator<Item = &'static str> {
        D::builtins().keys().copied()
    }

    /// Resolves a (possibly composite) privilege name
    ///
    /// Parts are matched case-insensitively. A name made of a single
    /// built-in returns that built-in; otherwise the built-ins and action
    /// patterns named are unioned into a new privilege, which is memoized.
    /// A memoized entry built under a different process-wide state ceiling is
    /// rebuilt.
    pub fn resolve(name: &PrivilegeName) -> Result<Self> {
        let name = name.to_lowercase();
        let ceiling = max_determinized_states();
        if let Some(entry) = D::resolved().get(&name) {
            let (built_under, resolved) = entry.value();
            if *built_under == ceiling {
                debug!("Resolved {} privilege [{}] from memo", D::KIND, name);
                return Ok(resolved.clone());
            }
            debug!(
                "Rebuilding {} privilege [{}], state ceiling changed from {} to {}",
                D::KIND,
                name,
                built_under,
                ceiling
            );
        }

        let builtins = D::builtins();
        let mut automata = Vec::new();
        let mut actions = Vec::new();

        for part in name.parts() {
            if D::is_action(part) {
                actions.push(action_to_pattern(part));
                continue;
            }
            match builtins.get(part) {
                Some(builtin) if name.len() == 1 => return Ok(builtin.clone()),
                Some(builtin) => automata.push(builtin.automaton().clone()),
                None => {
                    return Err(PrivilegeError::UnknownPrivilege {
                        domain: D::KIND,
                        name: name.to_string(),
                        known: builtins.keys().copied().collect::<Vec<_>>().join(","),
                    })
                }
            }
        }

        if !actions.is_empty() {
            automata.push(compiler::patterns(&actions)?);
        }

        let automaton = algebra::union_all(automata.iter())?;
        let privilege = D::create(name.clone(), automaton);
        debug!(
            "Resolved {} privilege [{}] into {} states",
            D::KIND,
            name,
            privilege.automaton().num_states()
        );
        D::resolved().insert(name, (ceiling, privilege.clone()));
        Ok(privilege)
    }

    /// Drops all memoized resolutions of this domain
    ///
    /// Not needed after a settings reload: entries built under an older
    /// ceiling are rebuilt on their next lookup.
    pub fn clear_resolved() {
        D::resolved().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Bad {}

    impl PrivilegeDomain for Bad {
        const KIND: &'static str = "bad";

        fn none() -> Privilege<Self> {
            Privilege::new(PrivilegeName::none(), Automaton::empty())
        }
    }

    #[test]
    fn test_define_fails_closed() {
        let broken: Privilege<Bad> = define("broken", &["/unterminated"]);
        assert_eq!(broken.name().to_string(), "broken");
        assert!(broken.automaton().is_empty());
        assert!(!broken.predicate().test("/unterminated"));
    }

    #[test]
    fn test_define_difference() {
        let base: Privilege<Bad> = define("base", &["a*"]);
        let excluded: Privilege<Bad> = define("excluded", &["ab*"]);
        let rest = define_difference("rest", &base, &excluded);
        assert!(rest.predicate().test("ac"));
        assert!(!rest.predicate().test("abc"));
    }

    #[test]
    fn test_action_to_pattern() {
        assert_eq!(action_to_pattern("indices:data/read/search"), "indices:data/read/search*");
    }
}
