//! Error types for privilege construction and resolution

use cretoai_automaton::AutomatonError;
use thiserror::Error;

/// Privilege errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrivilegeError {
    /// Pattern compilation or automaton algebra failed
    #[error("Automaton error: {0}")]
    Automaton(#[from] AutomatonError),

    /// Name is neither a built-in privilege nor an action pattern
    #[error(
        "Unknown {domain} privilege [{name}]. A privilege must be either one of the \
         predefined {domain} privileges [{known}] or a pattern over one of the available \
         {domain} actions"
    )]
    UnknownPrivilege {
        domain: &'static str,
        name: String,
        known: String,
    },
}

/// Result type for privilege operations
pub type Result<T> = std::result::Result<T, PrivilegeError>;
