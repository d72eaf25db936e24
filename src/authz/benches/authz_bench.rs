//! Authorization engine benchmarks
//!
//! Cached vs uncached capability checks across group depths.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use idm_authz::roles::{CONTENTS_MANAGER_ROLE, INSPECTOR_ROLE, USER_ROLE};
use idm_authz::{
    AuthzConfig, AuthzEngine, Capability, CapabilityCheck, GroupPath, InMemoryAttributeStore,
    InvocationContext, LoginSession, RoleCatalog, ROLE_ATTRIBUTE,
};
use std::sync::Arc;
use tokio::runtime::Runtime;

fn nested_path(depth: usize) -> String {
    if depth == 0 {
        return "/".to_string();
    }
    (0..depth).map(|i| format!("/level{}", i)).collect()
}

async fn create_engine(ttl_ms: i64, depth: usize) -> AuthzEngine {
    let store = Arc::new(InMemoryAttributeStore::new());
    let leaf = GroupPath::new(&nested_path(depth)).unwrap();
    store.add_group(&leaf).await;

    store
        .set_attribute(1, &GroupPath::root(), ROLE_ATTRIBUTE, vec![USER_ROLE.into()])
        .await
        .unwrap();
    if let Some(parent) = leaf.parent() {
        store
            .set_attribute(1, &parent, ROLE_ATTRIBUTE, vec![INSPECTOR_ROLE.into()])
            .await
            .unwrap();
    }
    store
        .set_attribute(1, &leaf, ROLE_ATTRIBUTE, vec![CONTENTS_MANAGER_ROLE.into()])
        .await
        .unwrap();

    let config = AuthzConfig {
        role_cache_ttl_ms: ttl_ms,
        enable_audit: false,
        ..Default::default()
    };
    AuthzEngine::new(Arc::new(RoleCatalog::builtin()), store, config).unwrap()
}

fn bench_check_without_cache(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let ctx = InvocationContext::authenticated(LoginSession::new("bench", 1));

    let mut group = c.benchmark_group("check_without_cache");

    for depth in [0usize, 2, 5, 10] {
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            let engine = rt.block_on(create_engine(0, depth));
            let check = CapabilityCheck::new("addMember", [Capability::GroupModify])
                .in_group(nested_path(depth));

            b.to_async(&rt).iter(|| async {
                let result = engine.check_authorization(black_box(&ctx), black_box(&check)).await;
                black_box(result).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_check_with_cache(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let ctx = InvocationContext::authenticated(LoginSession::new("bench", 1));

    let mut group = c.benchmark_group("check_with_cache");

    for depth in [0usize, 2, 5, 10] {
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            let engine = rt.block_on(create_engine(60_000, depth));
            let check = CapabilityCheck::new("addMember", [Capability::GroupModify])
                .in_group(nested_path(depth));

            // Warm up cache
            rt.block_on(engine.check_authorization(&ctx, &check)).unwrap();

            b.to_async(&rt).iter(|| async {
                let result = engine.check_authorization(black_box(&ctx), black_box(&check)).await;
                black_box(result).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_concurrent_checks(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let engine = Arc::new(rt.block_on(create_engine(60_000, 3)));

    let mut group = c.benchmark_group("concurrent_checks");

    for concurrency in [10usize, 100] {
        group.bench_with_input(
            BenchmarkId::new("tasks", concurrency),
            &concurrency,
            |b, &concurrency| {
                b.to_async(&rt).iter(|| {
                    let engine = Arc::clone(&engine);
                    async move {
                        let checks = (0..concurrency).map(|_| {
                            let engine = Arc::clone(&engine);
                            async move {
                                let ctx =
                                    InvocationContext::authenticated(LoginSession::new("bench", 1));
                                let check = CapabilityCheck::new("getEntity", [Capability::Read])
                                    .in_group(nested_path(3));
                                engine.check_authorization(&ctx, &check).await
                            }
                        });
                        let results = futures::future::join_all(checks).await;
                        black_box(results);
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_check_without_cache,
    bench_check_with_cache,
    bench_concurrent_checks
);
criterion_main!(benches);
