//! Privilege names
//!
//! A privilege name is an unordered set of parts, e.g. `read,write`. Names
//! follow the same algebra as the automata they label, so a merged or
//! reduced privilege still renders a meaningful name in audit output.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Name of the privilege granting nothing
pub static NONE: Lazy<PrivilegeName> = Lazy::new(|| PrivilegeName::single("none"));

/// Name of the privilege granting everything
pub static ALL: Lazy<PrivilegeName> = Lazy::new(|| PrivilegeName::single("all"));

/// Separator used when rendering and parsing names
const SEPARATOR: char = ',';

/// Deduplicated set of name parts; never empty
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "BTreeSet<String>", into = "BTreeSet<String>")]
pub struct PrivilegeName {
    parts: BTreeSet<String>,
}

impl PrivilegeName {
    /// Creates a name from its parts; no parts yields [`NONE`]
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from(parts.into_iter().map(Into::into).collect::<BTreeSet<String>>())
    }

    fn single(part: &str) -> Self {
        Self {
            parts: BTreeSet::from([part.to_string()]),
        }
    }

    pub fn none() -> Self {
        NONE.clone()
    }

    pub fn all() -> Self {
        ALL.clone()
    }

    /// Union of both part sets
    pub fn add(&self, other: &PrivilegeName) -> Self {
        Self {
            parts: self.parts.union(&other.parts).cloned().collect(),
        }
    }

    /// Parts of `self` not in `other`; an empty result collapses to [`NONE`]
    pub fn remove(&self, other: &PrivilegeName) -> Self {
        Self::from(
            self.parts
                .difference(&other.parts)
                .cloned()
                .collect::<BTreeSet<String>>(),
        )
    }

    /// Parts in sorted order
    pub fn parts(&self) -> impl Iterator<Item = &str> + '_ {
        self.parts.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Always false: an empty name is represented by [`NONE`]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn contains(&self, part: &str) -> bool {
        self.parts.contains(part)
    }

    pub fn is_none(&self) -> bool {
        *self == *NONE
    }

    /// Lower-cases every part
    pub fn to_lowercase(&self) -> Self {
        Self::new(self.parts.iter().map(|p| p.to_lowercase()))
    }
}

impl From<BTreeSet<String>> for PrivilegeName {
    fn from(parts: BTreeSet<String>) -> Self {
        if parts.is_empty() {
            Self::none()
        } else {
            Self { parts }
        }
    }
}

impl From<PrivilegeName> for BTreeSet<String> {
    fn from(name: PrivilegeName) -> Self {
        name.parts
    }
}

impl From<&str> for PrivilegeName {
    fn from(s: &str) -> Self {
        Self::new(
            s.split(SEPARATOR)
                .map(str::trim)
                .filter(|part| !part.is_empty()),
        )
    }
}

impl FromStr for PrivilegeName {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for PrivilegeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, part) in self.parts.iter().enumerate() {
            if idx > 0 {
                write!(f, "{}", SEPARATOR)?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let name: PrivilegeName = " write , read,read ".parse().unwrap();
        assert_eq!(name.len(), 2);
        assert_eq!(name.to_string(), "read,write");
    }

    #[test]
    fn test_equality_ignores_order() {
        assert_eq!(
            PrivilegeName::new(["write", "read"]),
            PrivilegeName::from("read,write")
        );
    }

    #[test]
    fn test_add() {
        let name = PrivilegeName::from("read").add(&PrivilegeName::from("write,read"));
        assert_eq!(name.to_string(), "read,write");
    }

    #[test]
    fn test_remove() {
        let name = PrivilegeName::from("read,write,monitor");
        assert_eq!(
            name.remove(&PrivilegeName::from("write")).to_string(),
            "monitor,read"
        );
        assert_eq!(name.remove(&PrivilegeName::from("unrelated")), name);
    }

    #[test]
    fn test_remove_everything_is_none() {
        let name = PrivilegeName::from("read,write");
        let removed = name.remove(&name);
        assert_eq!(removed, *NONE);
        assert!(removed.is_none());
        assert!(!removed.is_empty());
    }

    #[test]
    fn test_empty_inputs_are_none() {
        assert!(PrivilegeName::from("").is_none());
        assert!(PrivilegeName::new(Vec::<String>::new()).is_none());
        assert!(!PrivilegeName::all().is_none());
    }

    #[test]
    fn test_lowercase() {
        assert_eq!(
            PrivilegeName::from("Read,WRITE").to_lowercase(),
            PrivilegeName::from("read,write")
        );
    }

    #[test]
    fn test_serde_uses_part_list() {
        let name = PrivilegeName::from("write,read");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, r#"["read","write"]"#);

        let back: PrivilegeName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);

        let empty: PrivilegeName = serde_json::from_str("[]").unwrap();
        assert!(empty.is_none());
    }
}
