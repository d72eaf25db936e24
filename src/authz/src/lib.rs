//! # IDM Authorization Engine
//!
//! Capability-based authorization for an identity-management platform.
//! Every privileged operation consults the engine before acting.
//!
//! ## Features
//!
//! - **Fixed role catalog** mapping role names to capability sets
//! - **Group hierarchy**: roles assigned in a group apply to its descendants
//! - **Self-access** extras for operations targeting the caller
//! - **Outdated-credential lockdown** restricting sessions to credential update
//! - **Privilege-escalation guard** for role attribute writes
//! - **TTL role cache** with explicit invalidation
//!
//! ## Example
//!
//! ```rust
//! use idm_authz::{
//!     AuthzConfig, AuthzEngine, Capability, CapabilityCheck, GroupPath, InMemoryAttributeStore,
//!     InvocationContext, LoginSession, RoleCatalog, ROLE_ATTRIBUTE,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryAttributeStore::new());
//!     store
//!         .set_attribute(42, &GroupPath::root(), ROLE_ATTRIBUTE, vec!["Inspector".into()])
//!         .await?;
//!
//!     let engine = AuthzEngine::new(Arc::new(RoleCatalog::builtin()), store, AuthzConfig::default())?;
//!     let ctx = InvocationContext::authenticated(LoginSession::new("session-1", 42));
//!
//!     let check = CapabilityCheck::new("getGroupContents", [Capability::Read]).in_group("/org");
//!     engine.check_authorization(&ctx, &check).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod group;
pub mod roles;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::AuthzConfig;
pub use engine::{AuditEntry, AuditSink, AuthzEngine, EngineMetrics};
pub use error::{AuthzError, ErrorClass, Result};
pub use group::GroupPath;
pub use roles::{AuthzRole, CacheStats, RoleCatalog, RoleSet};
pub use store::{AttributeStore, InMemoryAttributeStore, StoreError};
pub use types::{
    Attribute, Capability, CapabilityCheck, CapabilitySet, EntityId, InvocationContext,
    InvocationMaterial, LoginSession, ROLE_ATTRIBUTE,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
