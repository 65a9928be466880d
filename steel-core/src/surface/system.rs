//! Replaces the default block near the surface of a noise-filled chunk.

use std::sync::Arc;

use steel_utils::{
    BlockPos, BlockStateId, ResourceLocation, WorldgenError,
    noise::{NormalNoise, floor},
    noise_router::aquifer::WAY_BELOW_MIN_Y,
    random::{PositionalRandom, Random, RandomSource, RandomSplitter},
};

use crate::{
    biome::{BiomeRef, vanilla as biomes},
    blocks::{
        self,
        vanilla::{
            BROWN_TERRACOTTA, LIGHT_GRAY_TERRACOTTA, ORANGE_TERRACOTTA, PACKED_ICE, RED_TERRACOTTA,
            SNOW_BLOCK, TERRACOTTA, WATER, WHITE_TERRACOTTA, YELLOW_TERRACOTTA,
        },
    },
    chunk::{
        height_accessor::{LevelHeightAccessor, WorldGenerationContext},
        heightmap::HeightmapType,
        proto_chunk::ProtoChunk,
    },
    random_state::NoiseCache,
};

use super::rules::{PreliminarySurface, SurfaceContext, SurfaceRule};

const CLAY_BAND_COUNT: usize = 192;

const fn noise_key(path: &'static str) -> ResourceLocation {
    ResourceLocation::vanilla_static(path)
}

/// Seeded surface noises and the badlands terracotta bands.
pub struct SurfaceSystem {
    default_block: BlockStateId,
    sea_level: i32,
    random: RandomSplitter,
    clay_bands: [BlockStateId; CLAY_BAND_COUNT],
    clay_bands_offset: Arc<NormalNoise>,
    surface: Arc<NormalNoise>,
    surface_secondary: Arc<NormalNoise>,
    badlands_pillar: Arc<NormalNoise>,
    badlands_pillar_roof: Arc<NormalNoise>,
    badlands_surface: Arc<NormalNoise>,
    iceberg_pillar: Arc<NormalNoise>,
    iceberg_pillar_roof: Arc<NormalNoise>,
    iceberg_surface: Arc<NormalNoise>,
}

impl SurfaceSystem {
    /// Creates the system, fetching its noises from `noises` and seeding the clay bands.
    pub fn new(
        noises: &NoiseCache,
        default_block: BlockStateId,
        sea_level: i32,
        random: &RandomSplitter,
    ) -> Result<Self, WorldgenError> {
        let noise = |path| noises.get_or_create_noise(&noise_key(path));
        Ok(Self {
            default_block,
            sea_level,
            random: random.clone(),
            clay_bands: generate_bands(&mut random.with_hash_of("minecraft:clay_bands")),
            clay_bands_offset: noise("clay_bands_offset")?,
            surface: noise("surface")?,
            surface_secondary: noise("surface_secondary")?,
            badlands_pillar: noise("badlands_pillar")?,
            badlands_pillar_roof: noise("badlands_pillar_roof")?,
            badlands_surface: noise("badlands_surface")?,
            iceberg_pillar: noise("iceberg_pillar")?,
            iceberg_pillar_roof: noise("iceberg_pillar_roof")?,
            iceberg_surface: noise("iceberg_surface")?,
        })
    }

    /// The world sea level.
    #[must_use]
    pub const fn sea_level(&self) -> i32 {
        self.sea_level
    }

    /// The block surface rules replace.
    #[must_use]
    pub const fn default_block(&self) -> BlockStateId {
        self.default_block
    }

    /// The terracotta band palette.
    #[must_use]
    pub const fn clay_bands(&self) -> &[BlockStateId; CLAY_BAND_COUNT] {
        &self.clay_bands
    }

    /// Runs `rule` over every column of `chunk`, top down.
    ///
    /// Only blocks still equal to the default block are replaced. Water and
    /// air reset the stone depth counters.
    pub fn build_surface<P: PreliminarySurface>(
        &self,
        rule: &SurfaceRule,
        chunk: &mut ProtoChunk,
        preliminary: &mut P,
        generation: WorldGenerationContext,
        use_legacy_random: bool,
    ) {
        let min_block_x = chunk.pos().min_block_x();
        let min_block_z = chunk.pos().min_block_z();
        let min_y = chunk.min_y();
        let mut context = SurfaceContext::new(self, rule, preliminary, generation);

        for x in 0..16 {
            for z in 0..16 {
                let block_x = min_block_x + x;
                let block_z = min_block_z + z;
                let starting_height = chunk.get_height(HeightmapType::WorldSurfaceWg, x, z) + 1;
                let biome_y = if use_legacy_random { 0 } else { starting_height };
                let biome = chunk.get_noise_biome(block_x >> 2, biome_y >> 2, block_z >> 2);
                if biome.is(&biomes::ERODED_BADLANDS) {
                    self.eroded_badlands_extension(chunk, block_x, block_z, starting_height);
                }

                let height = chunk.get_height(HeightmapType::WorldSurfaceWg, x, z) + 1;
                context.update_xz(block_x, block_z);
                let mut stone_above = 0;
                let mut water_height = i32::MIN;
                let mut next_ceiling_stone_y = i32::MAX;

                for y in (min_y..=height).rev() {
                    let old = chunk.get_block_state(x, y, z);
                    let state = blocks::state(old);
                    if state.is_air() {
                        stone_above = 0;
                        water_height = i32::MIN;
                        continue;
                    }
                    if state.has_fluid() {
                        if water_height == i32::MIN {
                            water_height = y + 1;
                        }
                        continue;
                    }
                    if next_ceiling_stone_y >= y {
                        next_ceiling_stone_y = ((min_y - 1)..y)
                            .rev()
                            .find(|&below| !is_stone(chunk.get_block_state(x, below, z)))
                            .map_or(WAY_BELOW_MIN_Y, |below| below + 1);
                    }
                    stone_above += 1;
                    let stone_below = y - next_ceiling_stone_y + 1;
                    context.update_y(stone_above, stone_below, water_height, block_x, y, block_z);
                    if old == self.default_block {
                        if let Some(replacement) = rule.try_apply(&mut context, chunk) {
                            place(chunk, x, y, z, replacement);
                        }
                    }
                }

                if biome.is_any(&[&biomes::FROZEN_OCEAN, &biomes::DEEP_FROZEN_OCEAN]) {
                    let min_surface_level = context.min_surface_level();
                    self.frozen_ocean_extension(
                        chunk,
                        min_surface_level,
                        biome,
                        block_x,
                        block_z,
                        starting_height,
                    );
                }
            }
        }
    }

    /// Surface depth of a column, usually between 3 and 6.
    #[must_use]
    pub fn surface_depth(&self, block_x: i32, block_z: i32) -> i32 {
        let noise = self
            .surface
            .get_value(f64::from(block_x), 0.0, f64::from(block_z));
        let jitter = self.random.at(block_x, 0, block_z).next_f64() * 0.25;
        (noise * 2.75 + 3.0 + jitter) as i32
    }

    /// The secondary surface noise at a column.
    #[must_use]
    pub fn surface_secondary(&self, block_x: i32, block_z: i32) -> f64 {
        self.surface_secondary
            .get_value(f64::from(block_x), 0.0, f64::from(block_z))
    }

    /// The terracotta band at a position, shifted per column by a noise.
    #[must_use]
    pub fn get_band(&self, block_x: i32, y: i32, block_z: i32) -> BlockStateId {
        let offset = round_half_up(
            self.clay_bands_offset
                .get_value(f64::from(block_x), 0.0, f64::from(block_z))
                * 4.0,
        );
        let index = (y + offset).rem_euclid(CLAY_BAND_COUNT as i32);
        self.clay_bands[index as usize]
    }

    fn eroded_badlands_extension(
        &self,
        chunk: &mut ProtoChunk,
        block_x: i32,
        block_z: i32,
        height: i32,
    ) {
        let (x, z) = (f64::from(block_x), f64::from(block_z));
        let pillar = (self.badlands_surface.get_value(x, 0.0, z) * 8.25)
            .abs()
            .min(self.badlands_pillar.get_value(x * 0.2, 0.0, z * 0.2) * 15.0);
        if pillar <= 0.0 {
            return;
        }
        let roof = (self.badlands_pillar_roof.get_value(x * 0.75, 0.0, z * 0.75) * 1.5).abs();
        let top = 64.0 + (pillar * pillar * 2.5).min((roof * 50.0).ceil() + 24.0);
        let start_y = floor(top);
        if height > start_y {
            return;
        }
        let min_y = chunk.min_y();
        for y in (min_y..=start_y).rev() {
            let state = chunk.get_block_state(block_x, y, block_z);
            if state == self.default_block {
                break;
            }
            if state == WATER {
                return;
            }
        }
        for y in (min_y..=start_y).rev() {
            if !blocks::state(chunk.get_block_state(block_x, y, block_z)).is_air() {
                break;
            }
            place(chunk, block_x, y, block_z, self.default_block);
        }
    }

    fn frozen_ocean_extension(
        &self,
        chunk: &mut ProtoChunk,
        min_surface_level: i32,
        biome: BiomeRef,
        block_x: i32,
        block_z: i32,
        height: i32,
    ) {
        let (x, z) = (f64::from(block_x), f64::from(block_z));
        let iceberg = (self.iceberg_surface.get_value(x, 0.0, z) * 8.25)
            .abs()
            .min(self.iceberg_pillar.get_value(x * 1.28, 0.0, z * 1.28) * 15.0);
        if iceberg <= 1.8 {
            return;
        }
        let roof = (self.iceberg_pillar_roof.get_value(x * 1.17, 0.0, z * 1.17) * 1.5).abs();
        let mut top = (iceberg * iceberg * 1.2).min((roof * 40.0).ceil() + 14.0);
        let sea_level = self.sea_level;
        if biome.should_melt_frozen_ocean_iceberg_slightly(
            BlockPos::new(block_x, sea_level, block_z),
            sea_level,
        ) {
            top -= 2.0;
        }
        let bottom;
        if top > 2.0 {
            bottom = f64::from(sea_level) - top - 7.0;
            top += f64::from(sea_level);
        } else {
            top = 0.0;
            bottom = 0.0;
        }

        let mut random = self.random.at(block_x, 0, block_z);
        let max_snow_blocks = 2 + random.next_i32_bounded(4);
        let min_snow_block_y = sea_level + 18 + random.next_i32_bounded(10);
        let mut snow_blocks = 0;
        let top_y = top as i32;
        let bottom_y = bottom as i32;

        for y in (min_surface_level..=height.max(top_y + 1)).rev() {
            let state = chunk.get_block_state(block_x, y, block_z);
            let in_air = blocks::state(state).is_air() && y < top_y && random.next_f64() > 0.01;
            let in_water = !in_air
                && state == WATER
                && y > bottom_y
                && y < sea_level
                && bottom != 0.0
                && random.next_f64() > 0.15;
            if in_air || in_water {
                if snow_blocks <= max_snow_blocks && y > min_snow_block_y {
                    place(chunk, block_x, y, block_z, SNOW_BLOCK);
                    snow_blocks += 1;
                } else {
                    place(chunk, block_x, y, block_z, PACKED_ICE);
                }
            }
        }
    }
}

/// Writes a surface block. Fluids are scheduled for a tick.
fn place(chunk: &mut ProtoChunk, x: i32, y: i32, z: i32, state: BlockStateId) {
    chunk.set_block_state(x, y, z, state);
    if blocks::state(state).has_fluid() {
        chunk.mark_pos_for_postprocessing(x, y, z);
    }
}

/// Rounds halves towards positive infinity.
fn round_half_up(value: f64) -> i32 {
    floor(value + 0.5)
}

fn is_stone(state: BlockStateId) -> bool {
    let state = blocks::state(state);
    !state.is_air() && !state.has_fluid()
}

/// The 192 terracotta bands of badlands cliffs.
fn generate_bands(random: &mut RandomSource) -> [BlockStateId; CLAY_BAND_COUNT] {
    let mut bands = [TERRACOTTA; CLAY_BAND_COUNT];
    let mut i = 0;
    while i < CLAY_BAND_COUNT {
        i += random.next_i32_bounded(5) as usize + 1;
        if i < CLAY_BAND_COUNT {
            bands[i] = ORANGE_TERRACOTTA;
        }
        i += 1;
    }
    make_bands(random, &mut bands, 1, YELLOW_TERRACOTTA);
    make_bands(random, &mut bands, 2, BROWN_TERRACOTTA);
    make_bands(random, &mut bands, 1, RED_TERRACOTTA);

    let white_bands = random.next_i32_between(9, 15);
    let mut start = 0;
    let mut placed = 0;
    while placed < white_bands && start < CLAY_BAND_COUNT {
        bands[start] = WHITE_TERRACOTTA;
        if start > 1 && random.next_bool() {
            bands[start - 1] = LIGHT_GRAY_TERRACOTTA;
        }
        if start + 1 < CLAY_BAND_COUNT && random.next_bool() {
            bands[start + 1] = LIGHT_GRAY_TERRACOTTA;
        }
        placed += 1;
        start += random.next_i32_bounded(16) as usize + 4;
    }
    bands
}

fn make_bands(
    random: &mut RandomSource,
    bands: &mut [BlockStateId; CLAY_BAND_COUNT],
    base_width: usize,
    state: BlockStateId,
) {
    let count = random.next_i32_between(6, 15);
    for _ in 0..count {
        let width = base_width + random.next_i32_bounded(3) as usize;
        let start = random.next_i32_bounded(CLAY_BAND_COUNT as i32) as usize;
        for band in bands.iter_mut().skip(start).take(width) {
            *band = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use steel_utils::{ChunkPos, noise::NoiseParameterRegistry};

    use super::*;
    use crate::{
        biome::{BiomeSource, ClimateSampler},
        blocks::vanilla::{AIR, DIRT, GRASS_BLOCK, STONE},
        chunk::height_accessor::HeightRange,
        surface::RuleSource,
    };

    struct FlatSurface(i32);

    impl PreliminarySurface for FlatSurface {
        fn preliminary_surface_level(&mut self, _block_x: i32, _block_z: i32) -> i32 {
            self.0
        }
    }

    fn system(seed: u64) -> (NoiseCache, SurfaceSystem) {
        let random = RandomSource::create(seed, false).next_positional();
        let noises = NoiseCache::new(NoiseParameterRegistry::vanilla(), random.clone());
        let system = SurfaceSystem::new(&noises, STONE, 63, &random).expect("vanilla noises");
        (noises, system)
    }

    fn plains_chunk(top: i32) -> ProtoChunk {
        let range = HeightRange::new(-64, 384);
        let mut chunk = ProtoChunk::new(ChunkPos::new(0, 0), &range, None);
        let mut graph = steel_utils::density::DensityGraph::new();
        let zero = graph.constant(0.0);
        let sampler = ClimateSampler::new(Arc::new(graph), zero, zero, zero, zero, zero, zero);
        chunk.fill_biomes_from_noise(&BiomeSource::Fixed(&biomes::PLAINS), &sampler);
        for x in 0..16 {
            for z in 0..16 {
                for y in -64..=top {
                    chunk.set_block_state(x, y, z, STONE);
                }
            }
        }
        chunk
    }

    #[test]
    fn clay_bands_are_deterministic() {
        let (_, a) = system(3);
        let (_, b) = system(3);
        let (_, c) = system(4);
        assert_eq!(a.clay_bands().len(), 192);
        assert_eq!(a.clay_bands(), b.clay_bands());
        assert_ne!(a.clay_bands(), c.clay_bands());
        assert!(a.clay_bands().contains(&WHITE_TERRACOTTA));
        assert!(a.clay_bands().contains(&ORANGE_TERRACOTTA));
    }

    #[test]
    fn bands_wrap_below_zero() {
        let (_, system) = system(3);
        for y in [-10_000, -193, -1, 0, 191, 192, 10_000] {
            assert!(system.clay_bands().contains(&system.get_band(17, y, -5)));
        }
    }

    #[test]
    fn surface_depth_is_stable() {
        let (_, system) = system(11);
        assert_eq!(system.surface_depth(100, -7), system.surface_depth(100, -7));
        assert!((0..16).all(|x| (-2..=12).contains(&system.surface_depth(x, 0))));
    }

    #[test]
    fn only_the_default_block_is_replaced() {
        let (noises, system) = system(5);
        let rule = RuleSource::from_json(
            r#"{"type":"condition","if_true":{"type":"stone_depth","offset":0,"add_surface_depth":false,
                "secondary_depth_range":0,"surface_type":"floor"},
                "then_run":{"type":"block","result_state":{"Name":"grass_block"}}}"#,
        )
        .expect("valid rule")
        .bind(&noises)
        .expect("known names");
        let mut chunk = plains_chunk(70);
        chunk.set_block_state(4, 70, 4, DIRT);
        let generation = WorldGenerationContext::new(&chunk, -64, 384);

        system.build_surface(&rule, &mut chunk, &mut FlatSurface(70), generation, false);

        assert_eq!(chunk.get_block_state(0, 70, 0), GRASS_BLOCK);
        assert_eq!(chunk.get_block_state(0, 69, 0), STONE);
        assert_eq!(chunk.get_block_state(4, 70, 4), DIRT);
        assert_eq!(chunk.get_block_state(4, 69, 4), STONE);
        assert_eq!(chunk.get_block_state(0, 71, 0), AIR);
        assert!(chunk.postprocessing().iter().all(Vec::is_empty));
    }

    #[test]
    fn fluid_surfaces_are_scheduled() {
        let (noises, system) = system(5);
        let rule = RuleSource::from_json(
            r#"{"type":"condition","if_true":{"type":"stone_depth","offset":0,"add_surface_depth":false,
                "secondary_depth_range":0,"surface_type":"floor"},
                "then_run":{"type":"block","result_state":{"Name":"water"}}}"#,
        )
        .expect("valid rule")
        .bind(&noises)
        .expect("known names");
        let mut chunk = plains_chunk(70);
        let generation = WorldGenerationContext::new(&chunk, -64, 384);

        system.build_surface(&rule, &mut chunk, &mut FlatSurface(70), generation, false);

        assert_eq!(chunk.get_block_state(9, 70, 3), WATER);
        // Section 8 spans y 64..80; y = 70 packs as 6 << 4.
        let marks = &chunk.postprocessing()[8];
        assert_eq!(marks.len(), 256);
        assert!(marks.contains(&((6 << 4) | 9 | (3 << 8))));
        let total: usize = chunk.postprocessing().iter().map(Vec::len).sum();
        assert_eq!(total, 256);
    }

    #[test]
    fn band_offsets_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-0.5), 0);
        assert_eq!(round_half_up(-0.51), -1);
        assert_eq!(round_half_up(1.49), 1);
    }

    #[test]
    fn water_resets_stone_depth() {
        let (noises, system) = system(5);
        let rule = RuleSource::from_json(
            r#"{"type":"condition","if_true":{"type":"water","offset":-1,"surface_depth_multiplier":0,
                "add_stone_depth":false},
                "then_run":{"type":"block","result_state":{"Name":"grass_block"}}}"#,
        )
        .expect("valid rule")
        .bind(&noises)
        .expect("known names");
        let mut chunk = plains_chunk(50);
        for y in 51..=60 {
            chunk.set_block_state(2, y, 2, WATER);
        }
        let generation = WorldGenerationContext::new(&chunk, -64, 384);

        system.build_surface(&rule, &mut chunk, &mut FlatSurface(50), generation, false);

        assert_eq!(chunk.get_block_state(2, 50, 2), STONE);
        assert_eq!(chunk.get_block_state(3, 50, 3), GRASS_BLOCK);
    }
}
