//! General privileges
//!
//! Privileges with no built-in vocabulary, defined directly by a name and
//! the patterns they grant (e.g. the user names a principal may run as).

use cretoai_automaton::{compiler, Automaton};
use once_cell::sync::Lazy;

use crate::error::Result;
use crate::name::PrivilegeName;
use crate::privilege::{Privilege, PrivilegeDomain};

/// General privilege domain
#[derive(Debug)]
pub enum General {}

pub type GeneralPrivilege = Privilege<General>;

static NONE: Lazy<GeneralPrivilege> =
    Lazy::new(|| Privilege::new(PrivilegeName::none(), Automaton::empty()));

impl PrivilegeDomain for General {
    const KIND: &'static str = "general";

    fn none() -> GeneralPrivilege {
        NONE.clone()
    }
}

impl Privilege<General> {
    /// Compiles `patterns` into a privilege called `name`
    ///
    /// No patterns yields a privilege that grants nothing.
    pub fn from_patterns<S: AsRef<str>>(
        name: impl Into<PrivilegeName>,
        patterns: &[S],
    ) -> Result<Self> {
        let automaton = compiler::patterns(patterns)?;
        Ok(General::create(name.into(), automaton))
    }
}
