use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::BTreeSet;

use sorted_forest::{DuplicateHandling, RandomizedSet, ScapegoatSet, WeightBalancedSet};

const N: usize = 10_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn reverse_ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).rev().collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

macro_rules! build {
    ($tree:ident, $keys:expr) => {{
        let mut tree: $tree<i64> = $tree::new();
        for &k in $keys {
            let _ = tree.insert(k, DuplicateHandling::KeepFirst);
        }
        tree
    }};
}

// ─── Insert Benchmarks ──────────────────────────────────────────────────────

fn bench_insert(c: &mut Criterion, name: &str, keys: &[i64]) {
    let mut group = c.benchmark_group(name);

    group.bench_function(BenchmarkId::new("WeightBalancedSet", N), |b| {
        b.iter(|| build!(WeightBalancedSet, keys));
    });

    group.bench_function(BenchmarkId::new("ScapegoatSet", N), |b| {
        b.iter(|| build!(ScapegoatSet, keys));
    });

    group.bench_function(BenchmarkId::new("RandomizedSet", N), |b| {
        b.iter(|| build!(RandomizedSet, keys));
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| {
            let mut set = BTreeSet::new();
            for &k in keys {
                set.insert(k);
            }
            set
        });
    });

    group.finish();
}

fn bench_insert_ordered(c: &mut Criterion) {
    bench_insert(c, "set_insert_ordered", &ordered_keys(N));
}

fn bench_insert_reverse(c: &mut Criterion) {
    bench_insert(c, "set_insert_reverse", &reverse_ordered_keys(N));
}

fn bench_insert_random(c: &mut Criterion) {
    bench_insert(c, "set_insert_random", &random_keys(N));
}

// ─── Contains Benchmarks ────────────────────────────────────────────────────

fn bench_contains_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let wb_set = build!(WeightBalancedSet, &keys);
    let sg_set = build!(ScapegoatSet, &keys);
    let rb_set = build!(RandomizedSet, &keys);
    let bt_set: BTreeSet<i64> = keys.iter().copied().collect();

    let mut group = c.benchmark_group("set_contains_random");

    group.bench_function(BenchmarkId::new("WeightBalancedSet", N), |b| {
        b.iter(|| keys.iter().filter(|k| wb_set.contains_key(k)).count());
    });

    group.bench_function(BenchmarkId::new("ScapegoatSet", N), |b| {
        b.iter(|| keys.iter().filter(|k| sg_set.contains_key(k)).count());
    });

    group.bench_function(BenchmarkId::new("RandomizedSet", N), |b| {
        b.iter(|| keys.iter().filter(|k| rb_set.contains_key(k)).count());
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| keys.iter().filter(|k| bt_set.contains(k)).count());
    });

    group.finish();
}

// ─── Indexed-access Benchmarks (no BTreeSet counterpart) ────────────────────

fn bench_get_by_index(c: &mut Criterion) {
    let keys = random_keys(N);
    let wb_set = build!(WeightBalancedSet, &keys);
    let sg_set = build!(ScapegoatSet, &keys);
    let rb_set = build!(RandomizedSet, &keys);

    let mut group = c.benchmark_group("set_get_by_index");

    group.bench_function(BenchmarkId::new("WeightBalancedSet", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for i in 0..wb_set.len() {
                sum = sum.wrapping_add(*wb_set.at(i).unwrap());
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("ScapegoatSet", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for i in 0..sg_set.len() {
                sum = sum.wrapping_add(*sg_set.at(i).unwrap());
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("RandomizedSet", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for i in 0..rb_set.len() {
                sum = sum.wrapping_add(*rb_set.at(i).unwrap());
            }
            sum
        });
    });

    group.finish();
}

// ─── Remove Benchmarks ──────────────────────────────────────────────────────

fn bench_remove_random(c: &mut Criterion) {
    let keys = random_keys(N);

    let mut group = c.benchmark_group("set_remove_random");

    group.bench_function(BenchmarkId::new("WeightBalancedSet", N), |b| {
        b.iter_batched(
            || build!(WeightBalancedSet, &keys),
            |mut set| {
                for k in &keys {
                    set.remove(k);
                }
                set
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("ScapegoatSet", N), |b| {
        b.iter_batched(
            || build!(ScapegoatSet, &keys),
            |mut set| {
                for k in &keys {
                    set.remove(k);
                }
                set
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("RandomizedSet", N), |b| {
        b.iter_batched(
            || build!(RandomizedSet, &keys),
            |mut set| {
                for k in &keys {
                    set.remove(k);
                }
                set
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter_batched(
            || keys.iter().copied().collect::<BTreeSet<i64>>(),
            |mut set| {
                for k in &keys {
                    set.remove(k);
                }
                set
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ─── Bulk-construction Benchmarks ───────────────────────────────────────────

fn bench_bulk_build(c: &mut Criterion) {
    let keys = random_keys(N);

    let mut group = c.benchmark_group("set_bulk_build");

    group.bench_function(BenchmarkId::new("WeightBalancedSet", N), |b| {
        b.iter(|| {
            WeightBalancedSet::<i64>::from_items(keys.clone(), DuplicateHandling::KeepFirst)
        });
    });

    group.bench_function(BenchmarkId::new("ScapegoatSet", N), |b| {
        b.iter(|| ScapegoatSet::<i64>::from_items(keys.clone(), DuplicateHandling::KeepFirst));
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| keys.iter().copied().collect::<BTreeSet<i64>>());
    });

    group.finish();
}

// ─── Criterion Groups ───────────────────────────────────────────────────────

criterion_group!(insert_benches, bench_insert_ordered, bench_insert_reverse, bench_insert_random,);

criterion_group!(lookup_benches, bench_contains_random, bench_get_by_index,);

criterion_group!(remove_benches, bench_remove_random,);

criterion_group!(bulk_benches, bench_bulk_build,);

criterion_main!(insert_benches, lookup_benches, remove_benches, bulk_benches,);
