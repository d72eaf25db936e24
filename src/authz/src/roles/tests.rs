//! Tests for the roles module
//!
//! Covers built-in catalog relationships, hierarchy resolution through the
//! cache and concurrent cache access.

use super::*;
use crate::group::GroupPath;
use crate::store::InMemoryAttributeStore;
use crate::types::{Capability, ROLE_ATTRIBUTE};
use std::sync::Arc;

// ============================================================================
// Catalog Tests
// ============================================================================

#[test]
fn test_self_access_never_removes_capabilities() {
    let catalog = RoleCatalog::builtin();
    for role in catalog.iter() {
        let without = role.capabilities(false);
        let with = role.capabilities(true);
        assert!(
            with.is_superset(&without),
            "role '{}' loses capabilities on self-access",
            role.name
        );
    }
}

#[test]
fn test_builtin_roles_are_ordered_by_privilege() {
    let catalog = RoleCatalog::builtin();
    let caps = |name: &str| catalog.lookup(name).unwrap().capabilities(false);

    assert!(caps(SYSTEM_MANAGER_ROLE).is_superset(&caps(CONTENTS_MANAGER_ROLE)));
    assert!(caps(CONTENTS_MANAGER_ROLE).is_superset(&caps(PRIVILEGED_INSPECTOR_ROLE)));
    assert!(caps(PRIVILEGED_INSPECTOR_ROLE).is_superset(&caps(INSPECTOR_ROLE)));
    assert!(caps(INSPECTOR_ROLE).is_superset(&caps(USER_ROLE)));
    assert_eq!(caps(USER_ROLE), caps(ANONYMOUS_ROLE));
}

#[test]
fn test_anonymous_self_access_is_read_only() {
    let catalog = RoleCatalog::builtin();
    let anonymous = catalog.lookup(ANONYMOUS_ROLE).unwrap();
    let caps = anonymous.capabilities(true);
    assert!(caps.contains(&Capability::Read));
    assert!(!caps.contains(&Capability::CredentialModify));
}

// ============================================================================
// Resolution Tests
// ============================================================================

async fn cache_with(ttl_ms: i64) -> (Arc<InMemoryAttributeStore>, RoleCache) {
    let store = Arc::new(InMemoryAttributeStore::new());
    store.add_group(&GroupPath::new("/org/finance").unwrap()).await;
    store.add_group(&GroupPath::new("/org/sales").unwrap()).await;
    let resolver = RoleResolver::new(Arc::new(RoleCatalog::builtin()), store.clone());
    (store, RoleCache::new(resolver, ttl_ms))
}

#[tokio::test]
async fn test_ancestor_change_visible_in_descendants_only() {
    let (store, cache) = cache_with(0).await;
    let org = GroupPath::new("/org").unwrap();
    let finance = GroupPath::new("/org/finance").unwrap();

    store
        .set_attribute(11, &org, ROLE_ATTRIBUTE, vec![INSPECTOR_ROLE.into()])
        .await
        .unwrap();

    let in_finance = cache.get(11, &finance).await.unwrap();
    let at_root = cache.get(11, &GroupPath::root()).await.unwrap();

    assert_eq!(in_finance.len(), 1);
    assert!(at_root.is_empty());
}

#[tokio::test]
async fn test_cached_entries_are_per_group() {
    let (store, cache) = cache_with(60_000).await;
    store
        .set_attribute(12, &GroupPath::new("/org/finance").unwrap(), ROLE_ATTRIBUTE, vec![INSPECTOR_ROLE.into()])
        .await
        .unwrap();

    let finance = cache.get(12, &GroupPath::new("/org/finance").unwrap()).await.unwrap();
    let sales = cache.get(12, &GroupPath::new("/org/sales").unwrap()).await.unwrap();

    assert_eq!(finance.len(), 1);
    assert!(sales.is_empty());
    assert_eq!(cache.stats().entries, 2);
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_access() {
    let (store, cache) = cache_with(60_000).await;
    store
        .set_attribute(1, &GroupPath::root(), ROLE_ATTRIBUTE, vec![USER_ROLE.into()])
        .await
        .unwrap();
    let cache = Arc::new(cache);

    let mut handles = vec![];
    for i in 0..10u64 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            let group = GroupPath::new(if i % 2 == 0 { "/org/finance" } else { "/org/sales" }).unwrap();
            cache.get(1, &group).await.unwrap()
        }));
    }

    for handle in handles {
        let roles = handle.await.unwrap();
        assert_eq!(roles.len(), 1);
    }

    let stats = cache.stats();
    assert_eq!(stats.hits + stats.misses, 10);
    assert_eq!(stats.entries, 2);
}
