//! Authorization engine
//!
//! Orchestrates session lookup, the outdated-credential lockdown, role
//! resolution through the cache, capability aggregation and the
//! privilege-escalation guard, with metrics and audit logging.

pub mod audit;
pub mod metrics;

pub use audit::{AuditEntry, AuditOutcome, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use metrics::{EngineMetrics, MetricsCollector};

use crate::config::AuthzConfig;
use crate::error::{AuthzError, Result};
use crate::group::GroupPath;
use crate::roles::{capabilities_of, CacheStats, RoleCache, RoleCatalog, RoleResolver, RoleSet};
use crate::store::AttributeStore;
use crate::types::{
    Attribute, Capability, CapabilityCheck, CapabilitySet, EntityId, InvocationContext,
    LoginSession,
};

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Main authorization engine
///
/// # Architecture
///
/// ```text
/// CapabilityCheck → session → lockdown → RoleCache → RoleResolver → AttributeStore
///                                            ↓
///                         capability union → compare → Ok / AuthzError
///                                                          ↓
///                                                 [Metrics] [Audit]
/// ```
///
/// One instance is shared (`Arc`) by every protected operation.
pub struct AuthzEngine {
    /// Role definitions
    catalog: Arc<RoleCatalog>,

    /// Cached role resolution
    roles: RoleCache,

    /// Decision counters
    metrics: Option<Arc<MetricsCollector>>,

    /// Destination of denial records
    audit: Option<Arc<dyn AuditSink>>,

    /// Engine configuration
    config: AuthzConfig,
}

impl AuthzEngine {
    /// Create a new engine
    ///
    /// # Errors
    ///
    /// [`AuthzError::Config`] if the configuration is invalid.
    pub fn new(
        catalog: Arc<RoleCatalog>,
        store: Arc<dyn AttributeStore>,
        config: AuthzConfig,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| AuthzError::Config(e.to_string()))?;

        let resolver = RoleResolver::new(Arc::clone(&catalog), store);
        let roles = RoleCache::with_capacity(
            resolver,
            config.role_cache_ttl_ms,
            config.role_cache_max_entries,
        );

        let metrics = config.enable_metrics.then(|| Arc::new(MetricsCollector::new()));
        let audit = config
            .enable_audit
            .then(|| Arc::new(TracingAuditSink) as Arc<dyn AuditSink>);

        info!(
            "AuthzEngine initialized with {} roles, role_cache_ttl_ms={}, metrics={}, audit={}",
            catalog.len(),
            config.role_cache_ttl_ms,
            config.enable_metrics,
            config.enable_audit
        );

        Ok(Self {
            catalog,
            roles,
            metrics,
            audit,
            config,
        })
    }

    /// Replace the audit sink (enables auditing)
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Check that the caller holds every required capability
    ///
    /// # Pipeline
    ///
    /// 1. Require a login session
    /// 2. Apply the outdated-credential lockdown
    /// 3. Resolve the caller's roles in the group (root by default)
    /// 4. Union the roles' capabilities, with self-access extras if requested
    /// 5. Fail on the first required capability not in the union
    pub async fn check_authorization(
        &self,
        ctx: &InvocationContext,
        check: &CapabilityCheck,
    ) -> Result<()> {
        let group_label = check.group.as_deref().unwrap_or("/");
        let result = self.check_authorization_internal(ctx, check).await;
        self.observe(ctx, &check.operation, group_label, &result);
        result
    }

    async fn check_authorization_internal(
        &self,
        ctx: &InvocationContext,
        check: &CapabilityCheck,
    ) -> Result<()> {
        let session = Self::verified_session(ctx, &check.required)?;
        let group = GroupPath::or_root(check.group.as_deref())?;

        let capabilities = self
            .capabilities_in(session.entity_id, &group, check.self_access)
            .await?;

        for required in &check.required {
            if !capabilities.contains(required) {
                return Err(AuthzError::InsufficientCapability {
                    operation: check.operation.clone(),
                    capability: *required,
                });
            }
        }

        debug!(
            entity = session.entity_id,
            operation = %check.operation,
            group = %group,
            "Authorization granted"
        );
        Ok(())
    }

    /// Capabilities of the caller in a group (root by default)
    ///
    /// Never fails for lack of capabilities; used by front ends to decide
    /// which affordances to expose.
    pub async fn get_capabilities(
        &self,
        ctx: &InvocationContext,
        self_access: bool,
        group: Option<&str>,
    ) -> Result<CapabilitySet> {
        let result = self.get_capabilities_internal(ctx, self_access, group).await;
        if let Err(err) = &result {
            self.observe_failure(ctx, "getCapabilities", group.unwrap_or("/"), err);
        }
        result
    }

    async fn get_capabilities_internal(
        &self,
        ctx: &InvocationContext,
        self_access: bool,
        group: Option<&str>,
    ) -> Result<CapabilitySet> {
        let session = Self::verified_session(ctx, &[])?;
        let group = GroupPath::or_root(group)?;
        self.capabilities_in(session.entity_id, &group, self_access).await
    }

    /// Guard against privilege escalation through a role attribute write
    ///
    /// The caller may only assign roles whose capabilities it already holds
    /// in the attribute's group, and needs `attributeModify` there. A
    /// requested role exceeding the caller's capabilities is reported as an
    /// escalation attempt even when `attributeModify` is missing too. Applies
    /// equally when the target entity is the caller itself.
    pub async fn check_role_attribute_change_authorization(
        &self,
        ctx: &InvocationContext,
        operation: &str,
        self_access: bool,
        attribute: &Attribute,
    ) -> Result<()> {
        let result = self
            .check_role_attribute_change_internal(ctx, operation, self_access, attribute)
            .await;
        self.observe(ctx, operation, &attribute.group_path, &result);
        result
    }

    async fn check_role_attribute_change_internal(
        &self,
        ctx: &InvocationContext,
        operation: &str,
        self_access: bool,
        attribute: &Attribute,
    ) -> Result<()> {
        let session = Self::verified_session(ctx, &[Capability::AttributeModify])?;
        let group = GroupPath::new(&attribute.group_path)?;

        let current = self
            .capabilities_in(session.entity_id, &group, self_access)
            .await?;

        let requested = self
            .catalog
            .capabilities_of_values(&attribute.values, self_access)?;
        if !requested.is_subset(&current) {
            let exceeding: Vec<_> = requested.difference(&current).collect();
            warn!(
                entity = session.entity_id,
                operation,
                group = %group,
                ?exceeding,
                "Role assignment exceeds the caller's own capabilities"
            );
            return Err(AuthzError::PrivilegeEscalationAttempt);
        }

        if !current.contains(&Capability::AttributeModify) {
            return Err(AuthzError::InsufficientCapability {
                operation: operation.to_string(),
                capability: Capability::AttributeModify,
            });
        }

        Ok(())
    }

    /// Whether the caller is the given entity
    ///
    /// `false` when there is no login session.
    pub fn is_self(&self, ctx: &InvocationContext, subject: EntityId) -> bool {
        ctx.login_session
            .as_ref()
            .is_some_and(|session| session.entity_id == subject)
    }

    /// Roles of the caller in the root group
    pub async fn get_roles(&self, ctx: &InvocationContext) -> Result<RoleSet> {
        let result = match ctx.login_session.as_ref() {
            Some(session) => self.roles.get(session.entity_id, &GroupPath::root()).await,
            None => Err(AuthzError::NotAuthenticated),
        };
        if let Err(err) = &result {
            self.observe_failure(ctx, "getRoles", "/", err);
        }
        result
    }

    /// Run `op` only if `check` passes
    ///
    /// The wrapper a protected operation uses to name itself.
    pub async fn guarded<F, Fut, T>(
        &self,
        ctx: &InvocationContext,
        check: &CapabilityCheck,
        op: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.check_authorization(ctx, check).await?;
        Ok(op().await)
    }

    /// Drop every cached role set
    ///
    /// Call after any role attribute change to make it visible immediately.
    pub fn clear_cache(&self) {
        self.roles.clear_all();
        info!("Role cache cleared");
    }

    /// Names of all defined roles
    pub fn role_names(&self) -> Vec<String> {
        self.catalog.names()
    }

    /// Human readable description of all roles
    pub fn roles_description(&self) -> String {
        self.catalog.description_text()
    }

    /// The role catalog
    pub fn catalog(&self) -> &Arc<RoleCatalog> {
        &self.catalog
    }

    /// Engine configuration
    pub fn config(&self) -> &AuthzConfig {
        &self.config
    }

    /// Get role cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.roles.stats()
    }

    /// Get engine metrics
    pub fn metrics(&self) -> Option<EngineMetrics> {
        self.metrics
            .as_ref()
            .map(|metrics| metrics.snapshot(&self.roles.stats()))
    }

    // Private helper methods

    /// Session of the caller, after the outdated-credential lockdown
    ///
    /// With an outdated credential the only allowed operations are the
    /// credential update and reading, the latter needed to present the
    /// credential update options. Zero required capabilities also pass.
    fn verified_session<'a>(
        ctx: &'a InvocationContext,
        required: &[Capability],
    ) -> Result<&'a LoginSession> {
        let session = ctx
            .login_session
            .as_ref()
            .ok_or(AuthzError::NotAuthenticated)?;

        if session.used_outdated_credential {
            let permitted = match required {
                [] => true,
                [only] => only.allowed_with_outdated_credential(),
                _ => false,
            };
            if !permitted {
                return Err(AuthzError::CredentialOutdated);
            }
        }

        Ok(session)
    }

    async fn capabilities_in(
        &self,
        entity: EntityId,
        group: &GroupPath,
        self_access: bool,
    ) -> Result<CapabilitySet> {
        let roles = self.roles.get(entity, group).await?;
        Ok(capabilities_of(&roles, self_access))
    }

    fn observe(&self, ctx: &InvocationContext, operation: &str, group: &str, result: &Result<()>) {
        match result {
            Ok(()) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_allowed();
                }
            }
            Err(err) => self.observe_failure(ctx, operation, group, err),
        }
    }

    /// Count, log and audit a failed call
    fn observe_failure(
        &self,
        ctx: &InvocationContext,
        operation: &str,
        group: &str,
        err: &AuthzError,
    ) {
        if let Some(metrics) = &self.metrics {
            metrics.record_error(err);
        }

        let entity = ctx.login_session.as_ref().map(|s| s.entity_id);
        if err.is_denial() {
            debug!(?entity, operation, group, error = %err, "Authorization denied");
        } else if !err.is_defect() {
            warn!(?entity, operation, group, error = %err, "Authorization check failed");
        }

        if let Some(audit) = &self.audit {
            if let Some(entry) = AuditEntry::from_error(entity, operation, group, err) {
                audit.record(entry);
            }
        }
    }
}
