#![allow(missing_docs)]
//! Benchmarks for chunk generation.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::{hint::black_box, sync::Arc};

use steel_core::{
    NoiseGeneratorSettings,
    biome::BiomeSource,
    chunk::{ChunkGenerator, HeightRange, NoiseBasedChunkGenerator, ProtoChunk},
};
use steel_utils::{ChunkPos, density::FunctionContext, noise_router::OverworldPreset};

const SEED: u64 = 12345;
const LEVEL: HeightRange = HeightRange::new(-64, 384);

fn generator() -> NoiseBasedChunkGenerator {
    let settings = NoiseGeneratorSettings::overworld(OverworldPreset::Normal)
        .expect("vanilla settings should build");
    NoiseBasedChunkGenerator::new(Arc::new(settings), BiomeSource::overworld(), SEED)
        .expect("vanilla settings should seed")
}

fn bench_sample_cell_corners(c: &mut Criterion) {
    let generator = generator();
    let state = generator.random_state();
    let graph = state.graph();
    let final_density = state.router().final_density;

    c.bench_function("single_density_sample", |b| {
        b.iter(|| {
            black_box(graph.compute(final_density, &FunctionContext::new(0, black_box(64), 0)));
        });
    });

    // 5x5x49 corners per chunk, sampled without any cache.
    let mut group = c.benchmark_group("cell_corner_sampling");
    for (x, z) in [(0, 0), (100, 100), (1000, 1000)] {
        group.bench_with_input(
            BenchmarkId::new("chunk", format!("({x},{z})")),
            &(x, z),
            |b, &(x, z)| {
                b.iter(|| {
                    let mut total = 0.0;
                    for cx in 0..5 {
                        for cz in 0..5 {
                            for cy in 0..49 {
                                let context = FunctionContext::new(
                                    x * 16 + cx * 4,
                                    -64 + cy * 8,
                                    z * 16 + cz * 4,
                                );
                                total += graph.compute(final_density, black_box(&context));
                            }
                        }
                    }
                    black_box(total);
                });
            },
        );
    }
    group.finish();
}

fn bench_fill_chunk(c: &mut Criterion) {
    let generator = generator();
    let mut group = c.benchmark_group("fill_from_noise");
    for (x, z) in [(0, 0), (100, 100), (1000, 1000)] {
        group.bench_with_input(
            BenchmarkId::new("chunk", format!("({x},{z})")),
            &(x, z),
            |b, &(x, z)| {
                b.iter(|| {
                    let mut chunk = ProtoChunk::new(ChunkPos::new(x, z), &LEVEL, None);
                    generator.fill_from_noise(black_box(&mut chunk));
                    black_box(chunk);
                });
            },
        );
    }
    group.finish();
}

fn bench_generate_chunk(c: &mut Criterion) {
    let generator = generator();
    c.bench_function("generate_chunk", |b| {
        b.iter(|| {
            let mut chunk = ProtoChunk::new(ChunkPos::new(3, -7), &LEVEL, None);
            generator.generate(black_box(&mut chunk));
            black_box(chunk);
        });
    });
}

criterion_group!(
    benches,
    bench_sample_cell_corners,
    bench_fill_chunk,
    bench_generate_chunk,
);
criterion_main!(benches);
