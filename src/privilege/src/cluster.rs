//! Cluster privileges
//!
//! Grant cluster-level actions (`cluster:*`) and index template
//! management. `manage` is everything except security administration.

use std::collections::BTreeMap;

use cretoai_automaton::Automaton;
use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::name::PrivilegeName;
use crate::privilege::{Privilege, PrivilegeDomain};
use crate::resolver::{define, define_difference, BuiltinPrivileges, ResolvedPrivileges};

/// Cluster privilege domain
#[derive(Debug)]
pub enum Cluster {}

pub type ClusterPrivilege = Privilege<Cluster>;

const DEFINITIONS: &[(&str, &[&str])] = &[
    ("all", &["cluster:*", "indices:admin/template/*"]),
    ("monitor", &["cluster:monitor/*"]),
    ("manage_security", &["cluster:admin/xpack/security/*"]),
    ("manage_pipeline", &["cluster:admin/ingest/pipeline/*"]),
    ("manage_index_templates", &["indices:admin/template/*"]),
    (
        "transport_client",
        &["cluster:monitor/nodes/liveness", "cluster:monitor/state"],
    ),
];

static NONE: Lazy<ClusterPrivilege> =
    Lazy::new(|| Privilege::new(PrivilegeName::none(), Automaton::empty()));

static BUILTINS: Lazy<BTreeMap<&'static str, ClusterPrivilege>> = Lazy::new(|| {
    let mut builtins: BTreeMap<_, _> = DEFINITIONS
        .iter()
        .map(|&(name, patterns)| (name, define::<Cluster>(name, patterns)))
        .collect();

    if let (Some(all), Some(security)) = (builtins.get("all"), builtins.get("manage_security")) {
        let manage = define_difference("manage", all, security);
        builtins.insert("manage", manage);
    }
    builtins.insert("none", NONE.clone());
    builtins
});

static RESOLVED: Lazy<ResolvedPrivileges<Cluster>> = Lazy::new(DashMap::new);

impl PrivilegeDomain for Cluster {
    const KIND: &'static str = "cluster";

    fn none() -> ClusterPrivilege {
        NONE.clone()
    }
}

impl BuiltinPrivileges for Cluster {
    fn builtins() -> &'static BTreeMap<&'static str, ClusterPrivilege> {
        &BUILTINS
    }

    fn resolved() -> &'static ResolvedPrivileges<Cluster> {
        &RESOLVED
    }
}
