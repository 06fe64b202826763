//! # Tiered State Persistence Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | Backup codec encode/decode | < 1ms per token |
//! | Save across all tiers | < 10ms |
//! | Load from volatile tier | < 1ms |
//! | Self-repair from backup | < 10ms |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_types::CriticalProjection;
use state_persistence::test_utils::{make_test_state, test_keys, TestHarness, TEST_SESSION_ID};
use state_persistence::{PersistenceApi, SecureCodec};
use std::time::Duration;
use tokio::runtime::Runtime;

// ============================================================================
// Backup codec
// ============================================================================

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("backup-codec");
    group.measurement_time(Duration::from_secs(5));

    let codec = SecureCodec::new(test_keys(), 1024, 3);
    let projection = CriticalProjection::derive(&make_test_state(TEST_SESSION_ID), 0, "1.0.0");
    let small = serde_json::to_vec(&projection).unwrap();

    // Above the compression threshold
    let mut large_state = make_test_state(TEST_SESSION_ID);
    large_state.player_stats.last_activity_id = Some("activity-".repeat(200));
    let large = serde_json::to_vec(&CriticalProjection::derive(&large_state, 0, "1.0.0")).unwrap();

    for (label, plaintext) in [("projection", &small), ("compressible", &large)] {
        group.throughput(Throughput::Bytes(plaintext.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", label), plaintext, |b, p| {
            b.iter(|| black_box(codec.encode(p).unwrap()))
        });

        let encoded = codec.encode(plaintext).unwrap();
        group.bench_with_input(BenchmarkId::new("decode", label), &encoded, |b, e| {
            b.iter(|| black_box(codec.decode(&e.token, e.compressed).unwrap()))
        });
    }

    group.finish();
}

// ============================================================================
// Orchestrated operations
// ============================================================================

fn bench_operations(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("orchestrator");
    group.measurement_time(Duration::from_secs(5));

    let state = make_test_state(TEST_SESSION_ID);

    let h = TestHarness::new();
    group.bench_function("save_all_tiers", |b| {
        b.iter(|| rt.block_on(async { black_box(h.service.save(state.clone()).await) }))
    });

    rt.block_on(h.service.save(state.clone()));
    group.bench_function("load_volatile_hit", |b| {
        b.iter(|| rt.block_on(async { black_box(h.service.load().await) }))
    });

    group.bench_function("load_large_hit", |b| {
        b.iter(|| rt.block_on(async { black_box(h.restart().load().await) }))
    });

    group.bench_function("load_self_repair", |b| {
        b.iter(|| {
            h.large.wipe();
            rt.block_on(async { black_box(h.restart().load().await) })
        })
    });

    group.finish();
}

criterion_group!(benches, bench_codec, bench_operations);
criterion_main!(benches);
