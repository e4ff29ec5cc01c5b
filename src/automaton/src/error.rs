//! Error types for pattern compilation and automaton algebra

use thiserror::Error;

/// Result type alias for automaton operations
pub type Result<T> = std::result::Result<T, AutomatonError>;

/// Errors raised while building automata
///
/// Compilation errors are raised at configuration-load time. Callers reject
/// the whole privilege definition rather than keep a partial automaton.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    /// Malformed regex-dialect pattern
    #[error("Invalid pattern [{pattern}]: {reason}")]
    PatternSyntax {
        /// The offending pattern as written
        pattern: String,
        /// Parser diagnostic
        reason: String,
    },

    /// Determinization would exceed the configured state ceiling
    #[error("Automaton too complex: construction would exceed {limit} determinized states")]
    TooComplex {
        /// The ceiling that was hit
        limit: usize,
    },

    /// Deserialized state arena is malformed
    #[error("Invalid automaton: {reason}")]
    InvalidAutomaton {
        /// What the arena violates
        reason: String,
    },
}

impl AutomatonError {
    pub(crate) fn syntax(pattern: &str, reason: impl Into<String>) -> Self {
        Self::PatternSyntax {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn too_complex(limit: usize) -> Self {
        Self::TooComplex { limit }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidAutomaton {
            reason: reason.into(),
        }
    }
}
