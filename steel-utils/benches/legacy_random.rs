#![allow(missing_docs)]
//! Benchmarks for the Java LCG source.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use steel_utils::random::{PositionalRandom, Random, legacy_random::LegacyRandom};

const SEED: u64 = 12345;

fn bench_next(c: &mut Criterion) {
    let mut random = LegacyRandom::from_seed(SEED);

    let mut group = c.benchmark_group("legacy_random");
    group.bench_function("next_i32", |b| b.iter(|| black_box(random.next_i32())));
    group.bench_function("next_i32_bounded", |b| {
        b.iter(|| black_box(random.next_i32_bounded(black_box(100))));
    });
    group.bench_function("next_f64", |b| b.iter(|| black_box(random.next_f64())));
    group.bench_function("consume_count", |b| {
        b.iter(|| random.consume_count(black_box(262)));
    });
    group.finish();
}

fn bench_positional(c: &mut Criterion) {
    let splitter = LegacyRandom::from_seed(SEED).next_positional();

    c.bench_function("legacy_random_at", |b| {
        b.iter(|| {
            let mut random = splitter.at(black_box(16), black_box(-12), black_box(48));
            black_box(random.next_i32());
        });
    });
}

criterion_group!(benches, bench_next, bench_positional);
criterion_main!(benches);
