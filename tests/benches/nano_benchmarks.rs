//! # Nano MCP Benchmarks
//!
//! | Group | Measures |
//! |-------|----------|
//! | units | raw <-> XNO string conversion |
//! | signing | state block hash + ed25519 sign, and verification |
//! | work-cache | consume/invalidate under the store lock |
//! | work | local nonce search at the test-network receive threshold |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nm_02_work_cache::domain::{CacheStore, ConsumeOutcome, WorkKey};
use nm_compute::backends::cpu::CpuEngine;
use nm_compute::ComputeEngine;
use nm_tests::fixtures::{keypair, RECEIVE_THRESHOLD};
use shared_crypto::{sign_state_block, verify_state_block, BalanceDelta, BlockTemplate};
use shared_types::{decimal_to_raw, raw_to_decimal, BlockHash, BlockKind, Link, Raw, WorkToken};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

fn bench_units(c: &mut Criterion) {
    let mut group = c.benchmark_group("units");

    for raw in ["1", "1000000000000000000000000000000", "340282366920938463463374607431768211455"] {
        group.bench_with_input(BenchmarkId::new("raw_to_decimal", raw.len()), raw, |b, raw| {
            b.iter(|| raw_to_decimal(black_box(raw)))
        });
    }
    group.bench_function("decimal_to_raw", |b| {
        b.iter(|| decimal_to_raw(black_box("1234.567890123456789012345678901")))
    });
    group.bench_function("raw_from_decimal", |b| {
        b.iter(|| Raw::from_decimal(black_box("0.000001")))
    });

    group.finish();
}

fn bench_signing(c: &mut Criterion) {
    let mut group = c.benchmark_group("signing");
    let keys = keypair(1);
    let template = BlockTemplate {
        account: keys.account(),
        previous: BlockHash::from_bytes([3; 32]),
        representative: keys.account(),
        wallet_balance: Raw::new(1_000_000),
        delta: BalanceDelta::Debit(Raw::new(1)),
        link: Link::from(keypair(2).public_key()),
        work: WorkToken::new(0),
    };

    group.bench_function("sign_state_block", |b| {
        b.iter(|| sign_state_block(black_box(&template), &keys))
    });

    if let Ok(signed) = sign_state_block(&template, &keys) {
        group.bench_function("verify_state_block", |b| {
            b.iter(|| verify_state_block(black_box(&signed.block)))
        });
    }

    group.finish();
}

fn bench_work_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("work-cache");
    let ttl_ms = 300_000;

    for size in [16usize, 256, 4096] {
        let keys: Vec<WorkKey> = (0..size)
            .map(|i| {
                let mut bytes = [0u8; 32];
                bytes[..8].copy_from_slice(&(i as u64).to_be_bytes());
                WorkKey::new(BlockHash::from_bytes(bytes), BlockKind::Send)
            })
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::new("fill_consume_invalidate", size),
            &keys,
            |b, keys| {
                b.iter(|| {
                    let mut store = CacheStore::new(keys.len());
                    for (i, key) in keys.iter().enumerate() {
                        store.insert(*key, WorkToken::new(i as u64), 0, ttl_ms);
                    }
                    let mut acquired = 0u32;
                    for key in keys {
                        if let ConsumeOutcome::Acquired(_) = store.consume(key, 1) {
                            acquired += 1;
                        }
                        store.invalidate(key);
                    }
                    black_box(acquired)
                })
            },
        );
    }

    group.finish();
}

fn bench_local_work(c: &mut Criterion) {
    let mut group = c.benchmark_group("work");
    group.measurement_time(Duration::from_secs(10));
    let engine = CpuEngine::new();
    let cancel = AtomicBool::new(false);
    let mut seed = 0u8;

    group.bench_function("cpu_find_work_receive", |b| {
        b.iter(|| {
            seed = seed.wrapping_add(1);
            let root = BlockHash::from_bytes([seed; 32]);
            engine.find_work(&root, RECEIVE_THRESHOLD, 0, u64::MAX, &cancel)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_units,
    bench_signing,
    bench_work_cache,
    bench_local_work
);
criterion_main!(benches);
