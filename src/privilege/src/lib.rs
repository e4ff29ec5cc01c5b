//! # CretoAI Privileges
//!
//! Named privileges backed by permission automata, with the algebra used to
//! merge role definitions for a principal.
//!
//! ## Domains
//!
//! - **Index** ([`IndexPrivilege`]): actions over indices, e.g. `read`, `write`
//! - **Cluster** ([`ClusterPrivilege`]): cluster actions, e.g. `monitor`, `manage`
//! - **General** ([`GeneralPrivilege`]): ad-hoc pattern sets such as run-as users
//!
//! Privileges of different domains are distinct types and never mix.
//!
//! ## Example
//!
//! ```rust
//! use cretoai_privilege::{IndexPrivilege, PrivilegeName};
//!
//! let read = IndexPrivilege::resolve(&PrivilegeName::from("read")).unwrap();
//! let read_write = IndexPrivilege::resolve(&PrivilegeName::from("read,write")).unwrap();
//!
//! assert!(read_write.implies(&read));
//! assert!(read_write.predicate().test("indices:data/write/index"));
//! assert!(!read.predicate().test("indices:data/write/index"));
//! ```

pub mod cluster;
pub mod error;
pub mod general;
pub mod index;
pub mod name;
pub mod privilege;
pub mod resolver;

pub use cluster::{Cluster, ClusterPrivilege};
pub use error::{PrivilegeError, Result};
pub use general::{General, GeneralPrivilege};
pub use index::{Index, IndexPrivilege};
pub use name::{PrivilegeName, ALL, NONE};
pub use privilege::{Privilege, PrivilegeDomain};
pub use resolver::{BuiltinPrivileges, ResolvedPrivileges};
