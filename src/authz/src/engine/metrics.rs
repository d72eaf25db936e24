//! Decision counters for engine observability
//!
//! Policy denials and defects are counted separately so corrupt role data
//! can be alerted on without being buried in ordinary denials.

use crate::error::AuthzError;
use crate::roles::CacheStats;
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of engine metrics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineMetrics {
    /// Total number of capability checks
    pub total_checks: u64,

    /// Checks that succeeded
    pub allowed: u64,

    /// Checks denied by policy
    pub denied: u64,

    /// Denials without a login session
    pub unauthenticated: u64,

    /// Denials caused by the outdated-credential lockdown
    pub credential_outdated: u64,

    /// Denials for a missing capability
    pub insufficient_capability: u64,

    /// Blocked role-attribute writes exceeding the caller's privileges
    pub escalation_attempts: u64,

    /// Stored role values missing from the catalog
    pub corrupt_role_data: u64,

    /// Store and other internal failures
    pub errors: u64,

    /// Role cache hits
    pub cache_hits: u64,

    /// Role cache misses
    pub cache_misses: u64,
}

impl EngineMetrics {
    /// Calculate cache hit rate
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }

    /// Calculate allow rate
    pub fn allow_rate(&self) -> f64 {
        let total = self.allowed + self.denied;
        if total == 0 {
            0.0
        } else {
            self.allowed as f64 / total as f64
        }
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus_text(&self) -> String {
        let mut output = String::new();

        let counters = [
            ("authz_checks_total", "Total capability checks", self.total_checks),
            ("authz_allowed_total", "Checks allowed", self.allowed),
            ("authz_denied_total", "Checks denied by policy", self.denied),
            ("authz_unauthenticated_total", "Denials without a session", self.unauthenticated),
            ("authz_credential_outdated_total", "Outdated credential lockdowns", self.credential_outdated),
            ("authz_insufficient_capability_total", "Denials for a missing capability", self.insufficient_capability),
            ("authz_escalation_attempts_total", "Blocked privilege escalations", self.escalation_attempts),
            ("authz_corrupt_role_data_total", "Undefined roles found in stored data", self.corrupt_role_data),
            ("authz_errors_total", "Internal failures", self.errors),
            ("authz_role_cache_hits_total", "Role cache hits", self.cache_hits),
            ("authz_role_cache_misses_total", "Role cache misses", self.cache_misses),
        ];

        for (name, help, value) in counters {
            output.push_str(&format!("# HELP {} {}\n", name, help));
            output.push_str(&format!("# TYPE {} counter\n", name));
            output.push_str(&format!("{} {}\n", name, value));
        }

        output
    }
}

/// Lock-free collector of decision counters
#[derive(Debug, Default)]
pub struct MetricsCollector {
    total_checks: AtomicU64,
    allowed: AtomicU64,
    unauthenticated: AtomicU64,
    credential_outdated: AtomicU64,
    insufficient_capability: AtomicU64,
    escalation_attempts: AtomicU64,
    corrupt_role_data: AtomicU64,
    errors: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful check
    pub fn record_allowed(&self) {
        self.total_checks.fetch_add(1, Ordering::Relaxed);
        self.allowed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed check
    pub fn record_error(&self, error: &AuthzError) {
        self.total_checks.fetch_add(1, Ordering::Relaxed);

        let counter = match error {
            AuthzError::NotAuthenticated => &self.unauthenticated,
            AuthzError::CredentialOutdated => &self.credential_outdated,
            AuthzError::InsufficientCapability { .. } => &self.insufficient_capability,
            AuthzError::PrivilegeEscalationAttempt => &self.escalation_attempts,
            AuthzError::CorruptRoleData(_) => &self.corrupt_role_data,
            AuthzError::InvalidGroupPath(_) | AuthzError::Store(_) | AuthzError::Config(_) => {
                &self.errors
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Current counter values merged with cache statistics
    pub fn snapshot(&self, cache: &CacheStats) -> EngineMetrics {
        let unauthenticated = self.unauthenticated.load(Ordering::Relaxed);
        let credential_outdated = self.credential_outdated.load(Ordering::Relaxed);
        let insufficient_capability = self.insufficient_capability.load(Ordering::Relaxed);
        let escalation_attempts = self.escalation_attempts.load(Ordering::Relaxed);

        EngineMetrics {
            total_checks: self.total_checks.load(Ordering::Relaxed),
            allowed: self.allowed.load(Ordering::Relaxed),
            denied: unauthenticated + credential_outdated + insufficient_capability + escalation_attempts,
            unauthenticated,
            credential_outdated,
            insufficient_capability,
            escalation_attempts,
            corrupt_role_data: self.corrupt_role_data.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            cache_hits: cache.hits,
            cache_misses: cache.misses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Capability;

    #[test]
    fn test_counts_by_kind() {
        let metrics = MetricsCollector::new();
        metrics.record_allowed();
        metrics.record_allowed();
        metrics.record_error(&AuthzError::CredentialOutdated);
        metrics.record_error(&AuthzError::InsufficientCapability {
            operation: "op".into(),
            capability: Capability::Read,
        });
        metrics.record_error(&AuthzError::CorruptRoleData("X".into()));

        let snapshot = metrics.snapshot(&CacheStats::default());
        assert_eq!(snapshot.total_checks, 5);
        assert_eq!(snapshot.allowed, 2);
        assert_eq!(snapshot.denied, 2);
        assert_eq!(snapshot.corrupt_role_data, 1);
        assert!((snapshot.allow_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cache_stats_merged() {
        let metrics = MetricsCollector::new();
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        let snapshot = metrics.snapshot(&stats);
        assert_eq!(snapshot.cache_hits, 3);
        assert!((snapshot.cache_hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_prometheus_export() {
        let metrics = MetricsCollector::new();
        metrics.record_error(&AuthzError::PrivilegeEscalationAttempt);

        let text = metrics.snapshot(&CacheStats::default()).export_prometheus_text();
        assert!(text.contains("# TYPE authz_escalation_attempts_total counter"));
        assert!(text.contains("authz_escalation_attempts_total 1\n"));
        assert!(text.contains("authz_checks_total 1\n"));
    }
}
