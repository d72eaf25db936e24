//! TTL cache in front of the role resolver

use super::resolver::RoleResolver;
use super::types::RoleSet;
use crate::error::Result;
use crate::group::GroupPath;
use crate::types::EntityId;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default maximum number of cached (entity, group) pairs
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

type CacheKey = (EntityId, GroupPath);

/// Cached resolution result
#[derive(Debug, Clone)]
struct CachedRoles {
    roles: RoleSet,
    computed_at: Instant,
    /// Cache generation the value was computed in
    generation: u64,
}

impl CachedRoles {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.computed_at.elapsed() >= ttl
    }
}

/// Statistics about cache performance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses (including expired and stale entries)
    pub misses: u64,
    /// Number of expired entries encountered
    pub expirations: u64,
    /// Current number of entries
    pub entries: usize,
    /// Configured TTL in milliseconds; zero or less means disabled
    pub ttl_ms: i64,
}

impl CacheStats {
    /// Calculates the cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Memoizes [`RoleResolver::resolve`] per (entity, group)
///
/// Entries expire lazily once their TTL has elapsed. A TTL of zero or
/// less disables caching: every call goes to the resolver.
///
/// # Thread Safety
///
/// Backed by `DashMap`. Concurrent misses for the same key may both
/// recompute; the resolver is idempotent so this only costs time.
pub struct RoleCache {
    resolver: RoleResolver,

    /// Cached role sets
    entries: Arc<DashMap<CacheKey, CachedRoles>>,

    /// TTL in milliseconds as configured
    ttl_ms: i64,

    /// Maximum number of entries
    max_entries: usize,

    /// Bumped by `clear_all`; entries from older generations are stale
    generation: AtomicU64,

    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
}

impl RoleCache {
    /// Create a cache with the given TTL in milliseconds
    pub fn new(resolver: RoleResolver, ttl_ms: i64) -> Self {
        Self::with_capacity(resolver, ttl_ms, DEFAULT_MAX_ENTRIES)
    }

    /// Create a cache with a custom maximum size
    pub fn with_capacity(resolver: RoleResolver, ttl_ms: i64, max_entries: usize) -> Self {
        Self {
            resolver,
            entries: Arc::new(DashMap::new()),
            ttl_ms,
            max_entries,
            generation: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
        }
    }

    /// Whether caching is enabled
    pub fn is_enabled(&self) -> bool {
        self.ttl_ms > 0
    }

    fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms.max(0) as u64)
    }

    /// Roles of `entity` in `group`, from cache when fresh
    pub async fn get(&self, entity: EntityId, group: &GroupPath) -> Result<RoleSet> {
        if !self.is_enabled() {
            return self.resolver.resolve(entity, group).await;
        }

        let key = (entity, group.clone());
        let generation = self.generation.load(Ordering::Acquire);

        if let Some(entry) = self.entries.get(&key) {
            if entry.generation == generation && !entry.is_expired(self.ttl()) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(entity, group = %group, "Role cache hit");
                return Ok(entry.roles.clone());
            }
            if entry.is_expired(self.ttl()) {
                self.expirations.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let roles = self.resolver.resolve(entity, group).await?;
        self.store(key, roles.clone(), generation);
        Ok(roles)
    }

    fn store(&self, key: CacheKey, roles: RoleSet, generation: u64) {
        // A clear happened while resolving: the value must not outlive it
        if generation != self.generation.load(Ordering::Acquire) {
            return;
        }

        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            self.cleanup_expired();
            if self.entries.len() >= self.max_entries {
                debug!(max_entries = self.max_entries, "Role cache full, not caching");
                return;
            }
        }

        self.entries.insert(
            key,
            CachedRoles {
                roles,
                computed_at: Instant::now(),
                generation,
            },
        );
    }

    /// Drop every cached entry
    ///
    /// Calls to [`get`](Self::get) made after this returns recompute from
    /// the store.
    pub fn clear_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.entries.clear();
    }

    /// Remove expired and stale entries
    pub fn cleanup_expired(&self) {
        let ttl = self.ttl();
        let generation = self.generation.load(Ordering::Acquire);
        self.entries
            .retain(|_, entry| entry.generation == generation && !entry.is_expired(ttl));
    }

    /// Returns cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            entries: self.entries.len(),
            ttl_ms: self.ttl_ms,
        }
    }

    /// The wrapped resolver
    pub fn resolver(&self) -> &RoleResolver {
        &self.resolver
    }
}
