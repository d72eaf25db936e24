//! Audit records for denied and failed authorization checks

use crate::error::{AuthzError, ErrorClass};
use crate::types::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use tracing::{error, warn};
use uuid::Uuid;

/// Outcome recorded in an audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Ordinary policy denial
    Denied,
    /// Role attribute write exceeding the caller's privileges
    EscalationBlocked,
    /// Stored data inconsistent with the role catalog
    Defect,
}

/// Audit entry for a single failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry identifier
    pub id: Uuid,

    /// When the check failed
    pub timestamp: DateTime<Utc>,

    /// Caller entity, if authenticated
    pub entity_id: Option<EntityId>,

    /// Protected operation
    pub operation: String,

    /// Group the check was scoped to
    pub group: String,

    /// Outcome category
    pub outcome: AuditOutcome,

    /// Full error text, including capability names. For operators only.
    pub detail: String,
}

impl AuditEntry {
    /// Build an entry from a failed check; `None` for errors not audited
    pub fn from_error(
        entity_id: Option<EntityId>,
        operation: &str,
        group: &str,
        err: &AuthzError,
    ) -> Option<Self> {
        let outcome = match (err, err.class()) {
            (AuthzError::PrivilegeEscalationAttempt, _) => AuditOutcome::EscalationBlocked,
            (_, ErrorClass::PolicyDenial) => AuditOutcome::Denied,
            (_, ErrorClass::Defect) => AuditOutcome::Defect,
            _ => return None,
        };

        Some(Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            entity_id,
            operation: operation.to_string(),
            group: group.to_string(),
            outcome,
            detail: err.to_string(),
        })
    }
}

/// Destination of audit entries
pub trait AuditSink: Send + Sync {
    /// Record an entry
    fn record(&self, entry: AuditEntry);
}

/// Writes audit entries as structured `tracing` events
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: AuditEntry) {
        let record = serde_json::to_string(&entry).unwrap_or_default();
        match entry.outcome {
            AuditOutcome::Defect => error!(
                target: "idm_authz::audit",
                entity = ?entry.entity_id,
                operation = %entry.operation,
                group = %entry.group,
                %record,
                "Authorization defect"
            ),
            _ => warn!(
                target: "idm_authz::audit",
                entity = ?entry.entity_id,
                operation = %entry.operation,
                group = %entry.group,
                %record,
                "Authorization denied"
            ),
        }
    }
}

/// Keeps audit entries in memory
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries recorded so far
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, entry: AuditEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}
