#![allow(missing_docs)]
//! Benchmarks for the xoroshiro128++ source.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use steel_utils::random::{PositionalRandom, Random, xoroshiro::Xoroshiro};

const SEED: u64 = 12345;

fn bench_next(c: &mut Criterion) {
    let mut random = Xoroshiro::from_seed(SEED);

    let mut group = c.benchmark_group("xoroshiro");
    group.bench_function("next_i64", |b| b.iter(|| black_box(random.next_i64())));
    group.bench_function("next_i32_bounded", |b| {
        b.iter(|| black_box(random.next_i32_bounded(black_box(100))));
    });
    group.bench_function("next_f64", |b| b.iter(|| black_box(random.next_f64())));
    group.bench_function("next_gaussian", |b| {
        b.iter(|| black_box(random.next_gaussian()));
    });
    group.finish();
}

fn bench_positional(c: &mut Criterion) {
    let splitter = Xoroshiro::from_seed(SEED).next_positional();

    let mut group = c.benchmark_group("xoroshiro_positional");
    group.bench_function("at", |b| {
        b.iter(|| {
            let mut random = splitter.at(black_box(16), black_box(-12), black_box(48));
            black_box(random.next_i32_bounded(10));
        });
    });
    group.bench_function("with_hash_of", |b| {
        b.iter(|| black_box(splitter.with_hash_of(black_box("minecraft:aquifer"))));
    });
    group.finish();
}

criterion_group!(benches, bench_next, bench_positional);
criterion_main!(benches);
