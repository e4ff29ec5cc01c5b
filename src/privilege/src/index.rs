//! Index privileges
//!
//! Grant actions over indices (`indices:*`). Besides the built-ins below, a
//! privilege name may list raw index actions, each granting that action and
//! its sub-actions.

use std::collections::BTreeMap;

use cretoai_automaton::Automaton;
use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::name::PrivilegeName;
use crate::privilege::{Privilege, PrivilegeDomain};
use crate::resolver::{define, BuiltinPrivileges, ResolvedPrivileges};

/// Index privilege domain
#[derive(Debug)]
pub enum Index {}

pub type IndexPrivilege = Privilege<Index>;

const DEFINITIONS: &[(&str, &[&str])] = &[
    ("all", &["indices:*"]),
    ("manage", &["indices:monitor/*", "indices:admin/*"]),
    ("create_index", &["indices:admin/create"]),
    ("monitor", &["indices:monitor/*"]),
    ("read", &["indices:data/read/*"]),
    (
        "index",
        &[
            "indices:data/write/index*",
            "indices:data/write/update*",
            "indices:data/write/bulk*",
        ],
    ),
    (
        "delete",
        &["indices:data/write/delete*", "indices:data/write/bulk*"],
    ),
    ("write", &["indices:data/write/*"]),
    ("delete_index", &["indices:admin/delete"]),
    (
        "view_index_metadata",
        &[
            "indices:admin/aliases/get",
            "indices:admin/aliases/exists",
            "indices:admin/get",
            "indices:admin/exists",
            "indices:admin/mappings/fields/get*",
            "indices:admin/mappings/get",
            "indices:admin/shards/search_shards",
            "indices:admin/validate/query*",
            "indices:admin/settings/get",
        ],
    ),
];

static NONE: Lazy<IndexPrivilege> =
    Lazy::new(|| Privilege::new(PrivilegeName::none(), Automaton::empty()));

static BUILTINS: Lazy<BTreeMap<&'static str, IndexPrivilege>> = Lazy::new(|| {
    let mut builtins: BTreeMap<_, _> = DEFINITIONS
        .iter()
        .map(|&(name, patterns)| (name, define::<Index>(name, patterns)))
        .collect();
    builtins.insert("none", NONE.clone());
    builtins
});

static RESOLVED: Lazy<ResolvedPrivileges<Index>> = Lazy::new(DashMap::new);

impl PrivilegeDomain for Index {
    const KIND: &'static str = "index";

    fn none() -> IndexPrivilege {
        NONE.clone()
    }
}

impl BuiltinPrivileges for Index {
    fn builtins() -> &'static BTreeMap<&'static str, IndexPrivilege> {
        &BUILTINS
    }

    fn resolved() -> &'static ResolvedPrivileges<Index> {
        &RESOLVED
    }
}
