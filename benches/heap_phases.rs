//! Phase Benchmarks
//!
//! Times the three phases of the classic heap workload (insert-all, find-min,
//! extract-all) for each engine, plus a decrease-key heavy workload.
//!
//! ## Running
//!
//! ```bash
//! cargo bench --bench heap_phases
//!
//! # Only one engine
//! cargo bench --bench heap_phases -- 'fibonacci/'
//! ```
//!
//! Keys come from a fixed-seed generator so every run sees the same dataset.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use mergeable_heaps::binomial::BinomialHeap;
use mergeable_heaps::fibonacci::FibonacciHeap;
use mergeable_heaps::skiplist::{SkipList, SkipListConfig};
use mergeable_heaps::MergeableHeap;
use std::hint::black_box;

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

/// Deterministic keys in `[0, 2^31)`
fn dataset(n: usize) -> Vec<i64> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) as i64
        })
        .collect()
}

fn filled<H: MergeableHeap<i64>>(keys: &[i64]) -> H {
    let mut heap = H::new();
    for &k in keys {
        heap.insert(k);
    }
    heap
}

fn bench_phases<H: MergeableHeap<i64>>(c: &mut Criterion, name: &str) {
    let mut group = c.benchmark_group(name);
    group.sample_size(20);

    for n in SIZES {
        let keys = dataset(n);

        group.bench_with_input(BenchmarkId::new("insert_all", n), &keys, |b, keys| {
            b.iter(|| black_box(filled::<H>(keys)))
        });

        let heap = filled::<H>(&keys);
        group.bench_with_input(BenchmarkId::new("find_min", n), &heap, |b, heap| {
            b.iter(|| black_box(heap.find_min()))
        });

        group.bench_with_input(BenchmarkId::new("extract_all", n), &keys, |b, keys| {
            b.iter_batched(
                || filled::<H>(keys),
                |mut heap| {
                    while let Some(k) = heap.extract_min() {
                        black_box(k);
                    }
                },
                BatchSize::LargeInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("decrease_key", n), &keys, |b, keys| {
            b.iter_batched(
                || {
                    let mut heap = H::new();
                    let handles: Vec<_> = keys.iter().map(|&k| heap.insert(k)).collect();
                    // One extraction so the decreases land inside trees
                    heap.extract_min();
                    (heap, handles)
                },
                |(mut heap, handles)| {
                    for (i, h) in handles.iter().enumerate() {
                        if let Some(&k) = heap.get(h) {
                            heap.decrease_key(h, k - (i as i64 % 1024)).unwrap();
                        }
                    }
                    black_box(heap.extract_min())
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_fibonacci(c: &mut Criterion) {
    bench_phases::<FibonacciHeap<i64>>(c, "fibonacci");
}

fn bench_binomial(c: &mut Criterion) {
    bench_phases::<BinomialHeap<i64>>(c, "binomial");
}

fn bench_skiplist(c: &mut Criterion) {
    let mut group = c.benchmark_group("skiplist");
    group.sample_size(20);

    for n in SIZES {
        let keys = dataset(n);
        let config = SkipListConfig {
            max_level: 16,
            seed: Some(1),
            ..SkipListConfig::default()
        };

        group.bench_with_input(BenchmarkId::new("insert_all", n), &keys, |b, keys| {
            b.iter(|| {
                let mut list = SkipList::with_config(config.clone()).unwrap();
                list.extend(keys.iter().copied());
                black_box(list)
            })
        });

        group.bench_with_input(BenchmarkId::new("extract_all", n), &keys, |b, keys| {
            b.iter_batched(
                || {
                    let mut list = SkipList::with_config(config.clone()).unwrap();
                    list.extend(keys.iter().copied());
                    list
                },
                |mut list| {
                    while let Some(k) = list.pop_min() {
                        black_box(k);
                    }
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fibonacci, bench_binomial, bench_skiplist);
criterion_main!(benches);
