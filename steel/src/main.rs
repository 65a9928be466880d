//! # Steel
//!
//! Generates a square of overworld chunks around the origin and reports what
//! ended up in them.

use std::{path::Path, sync::Arc, time::Instant};

use anyhow::{Context, Result};
use rayon::{ThreadPoolBuilder, prelude::*};
use steel_core::{
    NoiseGeneratorSettings,
    blocks,
    chunk::{ChunkGenerator, HeightRange, HeightmapType, NoiseBasedChunkGenerator, ProtoChunk},
    config::WorldgenConfig,
};
use steel_utils::{BlockStateId, ChunkPos, noise_router::OverworldPreset};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[cfg(feature = "dev-build")]
const CONFIG_PATH: &str = "config/worldgen_config.json5";
#[cfg(not(feature = "dev-build"))]
const CONFIG_PATH: &str = "worldgen_config.json5";

const LEVEL: HeightRange = HeightRange::new(-64, 384);

/// What a batch of generated chunks contains.
#[derive(Default)]
struct Summary {
    chunks: usize,
    columns: u64,
    surface_sum: i64,
    surface_min: Option<i32>,
    surface_max: Option<i32>,
    fluid_updates: usize,
    blocks: Vec<u64>,
}

impl Summary {
    fn of(chunk: &ProtoChunk) -> Self {
        let mut summary = Self {
            chunks: 1,
            blocks: vec![0; blocks::count()],
            ..Self::default()
        };
        for x in 0..16 {
            for z in 0..16 {
                let height = chunk.get_height(HeightmapType::WorldSurfaceWg, x, z);
                summary.columns += 1;
                summary.surface_sum += i64::from(height);
                summary.surface_min = Some(summary.surface_min.map_or(height, |min| min.min(height)));
                summary.surface_max = Some(summary.surface_max.map_or(height, |max| max.max(height)));
                for y in LEVEL.min_y..LEVEL.min_y + LEVEL.height {
                    summary.blocks[usize::from(chunk.get_block_state(x, y, z).0)] += 1;
                }
            }
        }
        summary.fluid_updates = chunk.postprocessing().iter().map(Vec::len).sum();
        summary
    }

    fn merge(mut self, other: Self) -> Self {
        self.chunks += other.chunks;
        self.columns += other.columns;
        self.surface_sum += other.surface_sum;
        self.surface_min = self.surface_min.into_iter().chain(other.surface_min).min();
        self.surface_max = self.surface_max.into_iter().chain(other.surface_max).max();
        self.fluid_updates += other.fluid_updates;
        if self.blocks.len() < other.blocks.len() {
            self.blocks.resize(other.blocks.len(), 0);
        }
        for (total, count) in self.blocks.iter_mut().zip(other.blocks) {
            *total += count;
        }
        self
    }

    fn report(&self, seconds: f64) {
        log::info!(
            "Generated {} chunks in {seconds:.2}s ({:.1} chunks/s)",
            self.chunks,
            self.chunks as f64 / seconds.max(f64::EPSILON)
        );
        if self.columns > 0 {
            log::info!(
                "Surface height: min {}, max {}, mean {:.1}",
                self.surface_min.unwrap_or_default(),
                self.surface_max.unwrap_or_default(),
                self.surface_sum as f64 / self.columns as f64
            );
        }
        log::info!("Fluid updates scheduled: {}", self.fluid_updates);

        let total: u64 = self.blocks.iter().sum();
        let mut counts: Vec<(usize, u64)> = self
            .blocks
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, count)| count > 0)
            .collect();
        counts.sort_unstable_by(|a, b| b.1.cmp(&a.1));
        for (id, count) in counts {
            let state = blocks::state(BlockStateId(id as u16));
            log::info!(
                "{:>28} {count:>12} ({:.3}%)",
                state.key,
                count as f64 * 100.0 / total as f64
            );
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    init_logging();

    let config = WorldgenConfig::load_or_create(Path::new(CONFIG_PATH))
        .with_context(|| format!("failed to load {CONFIG_PATH}"))?;
    if config.threads > 0 {
        ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build_global()
            .context("failed to build the worker pool")?;
    }

    let mut settings = NoiseGeneratorSettings::overworld(OverworldPreset::Normal)
        .context("failed to build overworld settings")?;
    settings.aquifers_enabled = config.aquifers_enabled;
    settings.ore_veins_enabled = config.ore_veins_enabled;
    settings.use_legacy_random_source = config.legacy_random_source;

    let seed = config.seed();
    let generator = NoiseBasedChunkGenerator::new(Arc::new(settings), config.biome_source()?, seed)
        .context("failed to seed the generator")?;

    let radius = config.radius;
    let positions: Vec<ChunkPos> = (-radius..=radius)
        .flat_map(|x| (-radius..=radius).map(move |z| ChunkPos::new(x, z)))
        .collect();
    log::info!(
        "Generating {} chunks with seed {seed} on {} threads",
        positions.len(),
        rayon::current_num_threads()
    );

    let start = Instant::now();
    let summary = positions
        .par_iter()
        .map(|&pos| {
            let mut chunk = ProtoChunk::new(pos, &LEVEL, None);
            generator.generate(&mut chunk);
            Summary::of(&chunk)
        })
        .reduce(Summary::default, Summary::merge);
    summary.report(start.elapsed().as_secs_f64());
    Ok(())
}
