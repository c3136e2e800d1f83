//! Resolution of operation permissions.
//!
//! A user receives operation permissions through several independent paths: roles bound to
//! their project member row, roles bound to the member groups they belong to, permissions bound
//! directly to either of those, and roles or permissions bound to the user itself, which apply
//! across the whole instance. [GrantResolver] walks the paths and [consolidate] merges what it
//! finds into an [EffectivePermissionSet]. [PermissionQuery] and [PermissionService] are the
//! entry points for callers.

mod error;
mod grant;
mod memory;
mod pg;
mod query;
mod resolve;
mod scope;
mod service;
pub mod store;

pub use error::*;
pub use grant::*;
pub use memory::MemoryGrantStore;
pub use query::{MemberPermissions, PermissionQuery};
pub use resolve::GrantResolver;
pub use scope::{consolidate, consolidate_by_project, EffectivePermissionSet, EffectiveScope};
pub use service::{PermissionService, DEFAULT_QUERY_TIMEOUT};
pub use store::{GrantStore, Page};
