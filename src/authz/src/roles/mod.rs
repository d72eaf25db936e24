//! Authorization roles module
//!
//! Provides the role catalog, the hierarchy-walking role resolver and the
//! TTL cache in front of it.
//!
//! # Features
//!
//! - **Fixed catalog**: built-in roles with explicit capability lists
//! - **Hierarchy walk**: roles assigned in a group apply to all descendants
//! - **Thread-safe caching**: DashMap keyed by (entity, group) with lazy expiry
//!
//! # Example
//!
//! ```rust
//! use idm_authz::roles::{RoleCache, RoleCatalog, RoleResolver, USER_ROLE};
//! use idm_authz::store::InMemoryAttributeStore;
//! use idm_authz::group::GroupPath;
//! use idm_authz::ROLE_ATTRIBUTE;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryAttributeStore::new());
//! store.set_attribute(42, &GroupPath::root(), ROLE_ATTRIBUTE, vec![USER_ROLE.into()]).await?;
//!
//! let resolver = RoleResolver::new(Arc::new(RoleCatalog::builtin()), store);
//! let cache = RoleCache::new(resolver, 2000);
//!
//! let roles = cache.get(42, &GroupPath::new("/org/finance")?).await?;
//! assert_eq!(roles.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod catalog;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod tests;

pub use cache::{CacheStats, RoleCache};
pub use catalog::{
    RoleCatalog, ANONYMOUS_ROLE, CONTENTS_MANAGER_ROLE, INSPECTOR_ROLE,
    PRIVILEGED_INSPECTOR_ROLE, SYSTEM_MANAGER_ROLE, USER_ROLE,
};
pub use resolver::RoleResolver;
pub use types::{capabilities_of, AuthzRole, RoleSet};
