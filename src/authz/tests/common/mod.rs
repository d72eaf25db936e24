//! Shared fixtures for integration tests

#![allow(dead_code)]

use idm_authz::{
    AuthzConfig, AuthzEngine, EntityId, GroupPath, InMemoryAttributeStore, InvocationContext,
    LoginSession, RoleCatalog, ROLE_ATTRIBUTE,
};
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

/// Install a test subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn,idm_authz=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Engine with the built-in catalog over a fresh in-memory store
pub struct Fixture {
    pub store: Arc<InMemoryAttributeStore>,
    pub engine: AuthzEngine,
}

impl Fixture {
    pub async fn new(ttl_ms: i64) -> Self {
        init_tracing();

        let store = Arc::new(InMemoryAttributeStore::new());
        for path in ["/org/finance", "/org/sales", "/partners"] {
            store.add_group(&group(path)).await;
        }

        let config = AuthzConfig {
            role_cache_ttl_ms: ttl_ms,
            ..Default::default()
        };
        let engine =
            AuthzEngine::new(Arc::new(RoleCatalog::builtin()), store.clone(), config).unwrap();

        Self { store, engine }
    }

    /// Assign roles directly to an entity in a group
    pub async fn assign(&self, entity: EntityId, path: &str, roles: &[&str]) {
        self.store
            .set_attribute(
                entity,
                &group(path),
                ROLE_ATTRIBUTE,
                roles.iter().map(|r| r.to_string()).collect(),
            )
            .await
            .unwrap();
    }
}

pub fn group(path: &str) -> GroupPath {
    GroupPath::new(path).unwrap()
}

pub fn session(entity: EntityId) -> InvocationContext {
    InvocationContext::authenticated(LoginSession::new(format!("session-{}", entity), entity))
}

pub fn outdated_session(entity: EntityId) -> InvocationContext {
    InvocationContext::authenticated(
        LoginSession::new(format!("session-{}", entity), entity).with_outdated_credential(),
    )
}
