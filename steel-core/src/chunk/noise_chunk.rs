//! Per-chunk density sampling: the cell loop, the aquifer and ore veins.
//!
//! A [`NoiseChunk`] owns a chunk-scoped [`DensityEvaluator`] over the seeded
//! graph. Filling walks the chunk in 4x8x4 cells, x slices first, then z,
//! then cells top down, and asks the material rules for a block at every
//! position: the aquifer first, then ore veins, then the default block.

// Uses coordinate variables (cell_x, cell_y, cell_z)
#![allow(clippy::similar_names)]

use steel_utils::{
    BlockStateId,
    density::{CellGeometry, DensityEvaluator, FunctionContext, NodeId},
    noise::floor_div,
    noise_router::{
        Aquifer, AquiferBlocks, AquiferImpl, AquiferNoise, DisabledAquifer, FluidPicker,
        NoiseBasedAquifer, NoiseRouter, SurfaceHeightEstimator,
    },
};
use tracing::debug_span;

use crate::{
    blocks::{self, vanilla::AIR},
    random_state::RandomState,
    settings::{NoiseGeneratorSettings, NoiseSettings},
    surface::PreliminarySurface,
};

use super::{
    height_accessor::LevelHeightAccessor, ore_veinifier::OreVeinifier, proto_chunk::ProtoChunk,
};

/// Density and surface estimates outside the cell loop, for the aquifer and
/// the surface rules.
pub struct NoiseSampler<'s, 'g> {
    evaluator: &'s mut DensityEvaluator<'g>,
    surface_height: &'s mut SurfaceHeightEstimator,
}

impl<'s, 'g> NoiseSampler<'s, 'g> {
    /// Wraps an evaluator and a surface estimator for out-of-cell sampling.
    pub fn new(
        evaluator: &'s mut DensityEvaluator<'g>,
        surface_height: &'s mut SurfaceHeightEstimator,
    ) -> Self {
        Self {
            evaluator,
            surface_height,
        }
    }
}

impl AquiferNoise for NoiseSampler<'_, '_> {
    fn sample(&mut self, node: NodeId, x: i32, y: i32, z: i32) -> f64 {
        self.evaluator.compute(node, &FunctionContext::new(x, y, z))
    }

    fn preliminary_surface_level(&mut self, x: i32, z: i32) -> i32 {
        self.surface_height
            .preliminary_surface_level(self.evaluator, x, z)
    }
}

impl PreliminarySurface for NoiseSampler<'_, '_> {
    fn preliminary_surface_level(&mut self, block_x: i32, block_z: i32) -> i32 {
        AquiferNoise::preliminary_surface_level(self, block_x, block_z)
    }
}

/// The sampling state of one chunk being filled.
pub struct NoiseChunk<'g> {
    evaluator: DensityEvaluator<'g>,
    router: NoiseRouter,
    noise: NoiseSettings,
    geometry: CellGeometry,
    surface_height: SurfaceHeightEstimator,
    aquifer: Aquifer,
    ore_veinifier: Option<OreVeinifier>,
    default_block: BlockStateId,
}

impl<'g> NoiseChunk<'g> {
    /// Sets up sampling for `chunk`, clamped to its generation height range.
    #[must_use]
    pub fn new(
        chunk: &ProtoChunk,
        random_state: &'g RandomState,
        settings: &NoiseGeneratorSettings,
        fluid_picker: FluidPicker,
    ) -> Self {
        let noise = settings
            .noise
            .clamp_to_height_accessor(&chunk.height_accessor_for_generation());
        let pos = chunk.pos();
        let router = *random_state.router();
        let geometry = CellGeometry::new(
            pos.min_block_x(),
            pos.min_block_z(),
            noise.min_y,
            noise.height,
            noise.cell_width(),
            noise.cell_height(),
        );
        let evaluator = DensityEvaluator::for_chunk(random_state.graph(), &router.roots(), geometry);
        let surface_height = SurfaceHeightEstimator::new(
            router.initial_density_without_jaggedness,
            noise.min_y,
            noise.height,
            noise.cell_height(),
        );

        let aquifer = if settings.aquifers_enabled {
            Aquifer::from(NoiseBasedAquifer::new(
                pos,
                &router,
                random_state.aquifer_random().clone(),
                noise.min_y,
                noise.height,
                fluid_picker,
                AquiferBlocks {
                    water: settings.default_fluid,
                    lava: blocks::vanilla::LAVA,
                    air: AIR,
                },
            ))
        } else {
            Aquifer::from(DisabledAquifer::new(fluid_picker, AIR))
        };
        let ore_veinifier = settings
            .ore_veins_enabled
            .then(|| OreVeinifier::new(&router, random_state.ore_random().clone()));

        Self {
            evaluator,
            router,
            noise,
            geometry,
            surface_height,
            aquifer,
            ore_veinifier,
            default_block: settings.default_block,
        }
    }

    /// Cell sizes and vertical range of the pass.
    #[must_use]
    pub const fn noise_settings(&self) -> &NoiseSettings {
        &self.noise
    }

    /// Fills `chunk` with the default block, fluids and ores. Air is never
    /// written, so sections above the terrain stay empty.
    pub fn fill(&mut self, chunk: &mut ProtoChunk) {
        let _span = debug_span!("fill_from_noise", x = chunk.pos().x, z = chunk.pos().z).entered();
        let geometry = self.geometry;
        let cell_width = geometry.cell_width;
        let cell_height = geometry.cell_height;
        let min_block_x = chunk.pos().min_block_x();
        let min_block_z = chunk.pos().min_block_z();

        self.evaluator.initialize_for_first_cell_x();
        for cell_x in 0..geometry.cell_count_xz {
            self.evaluator.advance_cell_x(cell_x);
            for cell_z in 0..geometry.cell_count_xz {
                for cell_y in (0..geometry.cell_count_y).rev() {
                    self.evaluator.select_cell_yz(cell_y, cell_z);
                    for y_in_cell in (0..cell_height).rev() {
                        let y = (geometry.cell_noise_min_y + cell_y) * cell_height + y_in_cell;
                        self.evaluator
                            .update_for_y(y, f64::from(y_in_cell) / f64::from(cell_height));
                        for x_in_cell in 0..cell_width {
                            let x = min_block_x + cell_x * cell_width + x_in_cell;
                            self.evaluator
                                .update_for_x(x, f64::from(x_in_cell) / f64::from(cell_width));
                            for z_in_cell in 0..cell_width {
                                let z = min_block_z + cell_z * cell_width + z_in_cell;
                                self.evaluator
                                    .update_for_z(z, f64::from(z_in_cell) / f64::from(cell_width));
                                let state = self.interpolated_state().unwrap_or(self.default_block);
                                if state == AIR {
                                    continue;
                                }
                                chunk.set_block_state(x, y, z, state);
                                if self.aquifer.should_schedule_fluid_update()
                                    && blocks::state(state).has_fluid()
                                {
                                    chunk.mark_pos_for_postprocessing(x, y, z);
                                }
                            }
                        }
                    }
                }
            }
            self.evaluator.swap_slices();
        }
        self.evaluator.stop_interpolation();
    }

    /// The material at the evaluator's current block, or `None` for the
    /// default block.
    fn interpolated_state(&mut self) -> Option<BlockStateId> {
        let context = self.evaluator.block_context();
        let density = self.evaluator.compute(self.router.final_density, &context);
        let mut sampler = NoiseSampler::new(&mut self.evaluator, &mut self.surface_height);
        let fluid = self.aquifer.compute_substance(
            &mut sampler,
            context.block_x,
            context.block_y,
            context.block_z,
            density,
        );
        if fluid.is_some() {
            return fluid;
        }
        self.ore_veinifier
            .as_ref()
            .and_then(|ore| ore.compute(&mut self.evaluator, &context))
    }

    /// Number of whole cells in the clamped height range.
    #[must_use]
    pub fn cell_count_y(&self) -> i32 {
        floor_div(self.noise.height, self.noise.cell_height())
    }
}

impl PreliminarySurface for NoiseChunk<'_> {
    fn preliminary_surface_level(&mut self, block_x: i32, block_z: i32) -> i32 {
        self.surface_height
            .preliminary_surface_level(&mut self.evaluator, block_x, block_z)
    }
}

impl LevelHeightAccessor for NoiseChunk<'_> {
    fn height(&self) -> i32 {
        self.noise.height
    }

    fn min_y(&self) -> i32 {
        self.noise.min_y
    }
}

#[cfg(test)]
mod tests {
    use steel_utils::{
        ChunkPos,
        density::DensityGraph,
        noise_router::{FluidStatus, OverworldFluidPicker, StaticFluidPicker},
    };

    use super::*;
    use crate::{
        blocks::vanilla::{STONE, WATER},
        chunk::{height_accessor::HeightRange, heightmap::HeightmapType},
    };

    /// Settings whose router is a single density function of y.
    fn settings(build: impl FnOnce(&mut DensityGraph) -> NodeId) -> NoiseGeneratorSettings {
        let mut settings =
            NoiseGeneratorSettings::overworld(steel_utils::noise_router::OverworldPreset::Normal)
                .expect("vanilla data");
        let mut graph = DensityGraph::new();
        let density = build(&mut graph);
        let zero = graph.zero();
        let mut router = NoiseRouter::from_roots([zero; NoiseRouter::ROOT_COUNT]);
        router.final_density = density;
        router.initial_density_without_jaggedness = density;
        settings.graph = graph;
        settings.noise_router = router;
        settings.aquifers_enabled = false;
        settings.ore_veins_enabled = false;
        settings
    }

    fn fill(settings: &NoiseGeneratorSettings, picker: FluidPicker) -> ProtoChunk {
        let random_state = RandomState::new(settings, 1).expect("seeded");
        let mut chunk = ProtoChunk::new(ChunkPos::new(3, -2), &HeightRange::new(-64, 384), None);
        NoiseChunk::new(&chunk, &random_state, settings, picker).fill(&mut chunk);
        chunk
    }

    #[test]
    fn solid_density_fills_with_the_default_block() {
        let settings = settings(|graph| graph.constant(1.0));
        let chunk = fill(&settings, OverworldFluidPicker::new(63, WATER, blocks::vanilla::LAVA).into());
        for (x, y, z) in [(0, -64, 0), (15, 319, 15), (7, 63, 3)] {
            assert_eq!(chunk.get_block_state(x, y, z), STONE);
        }
        assert_eq!(chunk.get_height(HeightmapType::WorldSurfaceWg, 4, 4), 319);
    }

    #[test]
    fn open_density_takes_the_picker_fluid() {
        let settings = settings(|graph| graph.constant(-1.0));
        let chunk = fill(
            &settings,
            StaticFluidPicker::new(FluidStatus::new(10, WATER)).into(),
        );
        assert_eq!(chunk.get_block_state(5, 9, 5), WATER);
        assert_eq!(chunk.get_block_state(5, -64, 5), WATER);
        assert_eq!(chunk.get_block_state(5, 10, 5), AIR);
        assert_eq!(chunk.get_height(HeightmapType::OceanFloorWg, 5, 5), -65);
        assert_eq!(chunk.get_height(HeightmapType::WorldSurfaceWg, 5, 5), 9);
    }

    #[test]
    fn interpolated_gradient_matches_direct_evaluation() {
        // Solid below y = 40, open above.
        let settings = settings(|graph| {
            let gradient = graph.y_clamped_gradient(0, 80, 1.0, -1.0);
            graph.interpolated(gradient)
        });
        let chunk = fill(&settings, StaticFluidPicker::new(FluidStatus::new(-64, WATER)).into());
        for x in 0..16 {
            for z in 0..16 {
                assert_eq!(chunk.get_height(HeightmapType::WorldSurfaceWg, x, z), 39);
            }
        }
    }

    #[test]
    fn upgrading_chunks_only_fill_below_zero() {
        let settings = settings(|graph| graph.constant(1.0));
        let random_state = RandomState::new(&settings, 1).expect("seeded");
        let retrogen = crate::chunk::BelowZeroRetrogen::new(
            crate::chunk::ChunkStatus::Full,
            steel_utils::BitSet::default(),
        );
        let mut chunk = ProtoChunk::new(ChunkPos::new(0, 0), &HeightRange::new(-64, 384), retrogen);
        let mut noise = NoiseChunk::new(
            &chunk,
            &random_state,
            &settings,
            OverworldFluidPicker::new(63, WATER, blocks::vanilla::LAVA).into(),
        );
        assert_eq!((noise.min_y(), noise.height()), (-64, 64));
        assert_eq!(noise.cell_count_y(), 8);
        noise.fill(&mut chunk);
        assert_eq!(chunk.get_block_state(0, -1, 0), STONE);
        assert_eq!(chunk.get_block_state(0, 0, 0), AIR);
    }

    #[test]
    fn preliminary_surface_reads_initial_density() {
        let settings = settings(|graph| graph.y_clamped_gradient(0, 80, 1.0, -1.0));
        let random_state = RandomState::new(&settings, 1).expect("seeded");
        let chunk = ProtoChunk::new(ChunkPos::new(0, 0), &HeightRange::new(-64, 384), None);
        let mut noise = NoiseChunk::new(
            &chunk,
            &random_state,
            &settings,
            StaticFluidPicker::new(FluidStatus::new(-64, WATER)).into(),
        );
        let level = PreliminarySurface::preliminary_surface_level(&mut noise, 5, 9);
        assert_eq!(level % 8, 0);
        assert!((0..40).contains(&level));
    }
}
