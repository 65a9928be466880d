//! This module contains the `ChunkGenerator` trait and the noise-based
//! generator behind the overworld.

use std::sync::Arc;

use enum_dispatch::enum_dispatch;
use steel_utils::{
    WorldgenError,
    density::DensityEvaluator,
    noise_router::{FluidPicker, OverworldFluidPicker, SurfaceHeightEstimator},
};
use tracing::debug_span;

use crate::{
    biome::BiomeSource, blocks::vanilla::LAVA, random_state::RandomState,
    settings::NoiseGeneratorSettings,
};

use super::{
    BelowZeroRetrogen, ChunkStatus, WorldGenerationContext,
    noise_chunk::{NoiseChunk, NoiseSampler},
    proto_chunk::ProtoChunk,
};

/// A trait for generating chunks.
#[enum_dispatch]
pub trait ChunkGenerator: Send + Sync {
    /// Samples the biomes of every section in the chunk's generation range.
    fn create_biomes(&self, chunk: &mut ProtoChunk);

    /// Fills the chunk with the default block, fluids and ore veins.
    fn fill_from_noise(&self, chunk: &mut ProtoChunk);

    /// Replaces the top layers of the chunk according to the surface rules.
    fn build_surface(&self, chunk: &mut ProtoChunk);

    /// Runs every step above in order.
    fn generate(&self, chunk: &mut ProtoChunk) {
        self.create_biomes(chunk);
        self.fill_from_noise(chunk);
        self.build_surface(chunk);
    }
}

/// Every chunk generator a world can be configured with.
#[allow(missing_docs)]
#[enum_dispatch(ChunkGenerator)]
pub enum ChunkGeneratorType {
    Noise(NoiseBasedChunkGenerator),
}

/// Generates terrain from a seeded noise router.
pub struct NoiseBasedChunkGenerator {
    settings: Arc<NoiseGeneratorSettings>,
    random_state: Arc<RandomState>,
    biome_source: BiomeSource,
    fluid_picker: FluidPicker,
}

impl NoiseBasedChunkGenerator {
    /// Seeds `settings` for `seed`. Fails when the router or surface rules
    /// name something unknown.
    pub fn new(
        settings: Arc<NoiseGeneratorSettings>,
        biome_source: BiomeSource,
        seed: u64,
    ) -> Result<Self, WorldgenError> {
        let random_state = Arc::new(RandomState::new(&settings, seed)?);
        Ok(Self::with_random_state(settings, random_state, biome_source))
    }

    /// A generator over an already seeded state.
    #[must_use]
    pub fn with_random_state(
        settings: Arc<NoiseGeneratorSettings>,
        random_state: Arc<RandomState>,
        biome_source: BiomeSource,
    ) -> Self {
        let fluid_picker =
            OverworldFluidPicker::new(settings.sea_level, settings.default_fluid, LAVA).into();
        Self {
            settings,
            random_state,
            biome_source,
            fluid_picker,
        }
    }

    /// The settings the generator was built from.
    #[must_use]
    pub fn settings(&self) -> &NoiseGeneratorSettings {
        &self.settings
    }

    /// The seeded noises and router.
    #[must_use]
    pub fn random_state(&self) -> &RandomState {
        &self.random_state
    }

    /// Where biomes come from.
    #[must_use]
    pub const fn biome_source(&self) -> &BiomeSource {
        &self.biome_source
    }
}

impl ChunkGenerator for NoiseBasedChunkGenerator {
    fn create_biomes(&self, chunk: &mut ProtoChunk) {
        let _span = debug_span!("create_biomes", x = chunk.pos().x, z = chunk.pos().z).entered();
        chunk.fill_biomes_from_noise(&self.biome_source, self.random_state.sampler());
        chunk.set_status(ChunkStatus::Biomes);
    }

    fn fill_from_noise(&self, chunk: &mut ProtoChunk) {
        NoiseChunk::new(
            chunk,
            &self.random_state,
            &self.settings,
            self.fluid_picker.clone(),
        )
        .fill(chunk);

        if let Some(retrogen) = chunk.below_zero_retrogen().cloned() {
            BelowZeroRetrogen::replace_old_bedrock(chunk);
            if retrogen.has_bedrock_holes() {
                retrogen.apply_bedrock_mask(chunk);
            }
        }
        chunk.set_status(ChunkStatus::Noise);
    }

    fn build_surface(&self, chunk: &mut ProtoChunk) {
        let _span = debug_span!("build_surface", x = chunk.pos().x, z = chunk.pos().z).entered();
        let noise = self.settings.noise;
        let router = self.random_state.router();
        let mut evaluator = DensityEvaluator::new(self.random_state.graph());
        let mut surface_height = SurfaceHeightEstimator::new(
            router.initial_density_without_jaggedness,
            noise.min_y,
            noise.height,
            noise.cell_height(),
        );
        let mut sampler = NoiseSampler::new(&mut evaluator, &mut surface_height);
        let generation = WorldGenerationContext::new(&*chunk, noise.min_y, noise.height);

        self.random_state.surface_system().build_surface(
            self.random_state.surface_rule(),
            chunk,
            &mut sampler,
            generation,
            self.settings.use_legacy_random_source,
        );
        chunk.set_status(ChunkStatus::Surface);
    }
}

#[cfg(test)]
mod tests {
    use steel_utils::{
        BitSet, ChunkPos,
        density::{DensityGraph, FunctionContext},
        noise_router::{NoiseRouter, OverworldPreset},
    };

    use super::*;
    use crate::{
        biome::vanilla::{DEEP_DARK, PLAINS},
        blocks::{
            self,
            vanilla::{AIR, BEDROCK, DEEPSLATE, GRASS_BLOCK, STONE, WATER},
        },
        chunk::{HeightRange, HeightmapType, LevelHeightAccessor},
    };

    const LEVEL: HeightRange = HeightRange::new(-64, 384);

    /// Overworld settings with the terrain replaced by a density of y alone.
    fn flat_settings(surface_y: i32) -> NoiseGeneratorSettings {
        let mut settings =
            NoiseGeneratorSettings::overworld(OverworldPreset::Normal).expect("vanilla data");
        let mut graph = DensityGraph::new();
        let gradient =
            graph.y_clamped_gradient(surface_y - 64, surface_y + 64, 1.0, -1.0);
        let density = graph.interpolated(gradient);
        let zero = graph.zero();
        let mut router = NoiseRouter::from_roots([zero; NoiseRouter::ROOT_COUNT]);
        router.final_density = density;
        router.initial_density_without_jaggedness = gradient;
        settings.graph = graph;
        settings.noise_router = router;
        settings.aquifers_enabled = false;
        settings.ore_veins_enabled = false;
        settings
    }

    fn generator(settings: NoiseGeneratorSettings) -> NoiseBasedChunkGenerator {
        NoiseBasedChunkGenerator::new(Arc::new(settings), BiomeSource::Fixed(&PLAINS), 42)
            .expect("seeded")
    }

    #[test]
    fn flat_terrain_gets_a_grass_surface_and_bedrock_floor() {
        let generator = generator(flat_settings(80));
        let mut chunk = ProtoChunk::new(ChunkPos::new(2, 5), &LEVEL, None);
        generator.generate(&mut chunk);

        assert_eq!(chunk.status(), ChunkStatus::Surface);
        for x in 0..16 {
            for z in 0..16 {
                assert_eq!(chunk.get_height(HeightmapType::WorldSurfaceWg, x, z), 79);
                assert_eq!(chunk.get_block_state(x, 79, z), GRASS_BLOCK);
                assert_eq!(chunk.get_block_state(x, 80, z), AIR);
                assert_eq!(chunk.get_block_state(x, -64, z), BEDROCK);
                assert_eq!(chunk.get_block_state(x, -40, z), DEEPSLATE);
                assert_eq!(chunk.get_block_state(x, 40, z), STONE);
            }
        }
    }

    #[test]
    fn terrain_below_sea_level_is_flooded() {
        let generator = generator(flat_settings(40));
        let mut chunk = ProtoChunk::new(ChunkPos::new(0, 0), &LEVEL, None);
        generator.create_biomes(&mut chunk);
        generator.fill_from_noise(&mut chunk);

        assert_eq!(chunk.get_block_state(3, 62, 3), WATER);
        assert_eq!(chunk.get_block_state(3, 63, 3), AIR);
        assert_eq!(chunk.get_height(HeightmapType::OceanFloorWg, 3, 3), 39);
        assert_eq!(chunk.get_height(HeightmapType::WorldSurfaceWg, 3, 3), 62);
    }

    #[test]
    fn heightmaps_agree_with_the_blocks() {
        let generator = generator(flat_settings(70));
        let mut chunk = ProtoChunk::new(ChunkPos::new(-3, 1), &LEVEL, None);
        generator.generate(&mut chunk);
        for kind in HeightmapType::WORLDGEN {
            for (x, z) in [(0, 0), (15, 15), (7, 9)] {
                let top = chunk.get_height(kind, x, z);
                assert!(kind.is_opaque(blocks::state(chunk.get_block_state(x, top, z))));
                for y in top + 1..=chunk.max_y() {
                    assert!(!kind.is_opaque(blocks::state(chunk.get_block_state(x, y, z))));
                }
            }
        }
    }

    #[test]
    fn upgrading_chunks_are_extended_downwards() {
        let generator = generator(flat_settings(80));
        let mut holes = BitSet::with_capacity(256);
        holes.set(0, true);
        let retrogen = BelowZeroRetrogen::new(ChunkStatus::Full, holes);
        let mut chunk = ProtoChunk::new(ChunkPos::new(0, 0), &LEVEL, retrogen);
        for x in 0..16 {
            for z in 0..16 {
                chunk.set_block_state(x, 0, z, BEDROCK);
                chunk.set_block_state(x, 10, z, GRASS_BLOCK);
            }
        }
        generator.fill_from_noise(&mut chunk);

        assert_eq!(chunk.get_block_state(5, 0, 5), DEEPSLATE);
        assert_eq!(chunk.get_block_state(5, 10, 5), GRASS_BLOCK);
        assert_eq!(chunk.get_block_state(5, -10, 5), STONE);
        assert_eq!(chunk.get_block_state(0, -10, 0), AIR);
    }

    #[test]
    fn upgrading_chunks_keep_old_biomes_above_caves() {
        let settings = flat_settings(80);
        let generator =
            NoiseBasedChunkGenerator::new(Arc::new(settings), BiomeSource::Fixed(&DEEP_DARK), 42)
                .expect("seeded");
        let retrogen = BelowZeroRetrogen::new(ChunkStatus::Full, BitSet::default());
        let mut chunk = ProtoChunk::new(ChunkPos::new(0, 0), &LEVEL, retrogen);
        generator.create_biomes(&mut chunk);
        assert!(chunk.get_noise_biome(0, -8, 0).is(&DEEP_DARK));
    }

    #[test]
    fn vanilla_terrain_is_deterministic() {
        let settings = Arc::new(
            NoiseGeneratorSettings::overworld(OverworldPreset::Normal).expect("vanilla data"),
        );
        let a = NoiseBasedChunkGenerator::new(settings.clone(), BiomeSource::overworld(), 7)
            .expect("seeded");
        let b = NoiseBasedChunkGenerator::new(settings, BiomeSource::overworld(), 7)
            .expect("seeded");
        let mut first = ProtoChunk::new(ChunkPos::new(1, -1), &LEVEL, None);
        let mut second = ProtoChunk::new(ChunkPos::new(1, -1), &LEVEL, None);
        a.generate(&mut first);
        b.generate(&mut second);

        for x in (0..16).step_by(5) {
            for z in (0..16).step_by(5) {
                assert_eq!(
                    first.get_height(HeightmapType::OceanFloorWg, x, z),
                    second.get_height(HeightmapType::OceanFloorWg, x, z)
                );
                for y in (-64..320).step_by(7) {
                    assert_eq!(first.get_block_state(x, y, z), second.get_block_state(x, y, z));
                }
            }
        }
    }

    #[test]
    fn chunk_fill_matches_direct_density() {
        let settings = Arc::new(
            NoiseGeneratorSettings::overworld(OverworldPreset::Normal).expect("vanilla data"),
        );
        let mut flat = (*settings).clone();
        flat.aquifers_enabled = false;
        flat.ore_veins_enabled = false;
        let generator = generator(flat);
        let mut chunk = ProtoChunk::new(ChunkPos::new(4, 4), &LEVEL, None);
        generator.fill_from_noise(&mut chunk);

        // Interpolated and direct density agree at cell corners.
        let state = generator.random_state();
        for y in (-64..320).step_by(8) {
            let density =
                state.graph().compute(state.router().final_density, &FunctionContext::new(64, y, 64));
            let block = chunk.get_block_state(0, y, 0);
            if density > 0.0 {
                assert_eq!(block, STONE, "y = {y}");
            } else {
                assert!(!blocks::state(block).blocks_motion(), "y = {y}");
            }
        }
    }
}
