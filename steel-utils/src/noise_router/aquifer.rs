//! Underground water and lava placement.
//!
//! The noise based aquifer scatters one fluid source per grid cell of
//! 16 x 12 x 16 blocks. Each source picks a fluid level and type from the
//! router noises. An open position takes the fluid of its nearest source,
//! and pressure between differing neighbours turns boundaries into stone.

// Aquifer code follows the game's single-letter math closely
#![allow(clippy::many_single_char_names)]

use enum_dispatch::enum_dispatch;

use crate::{
    density::NodeId,
    noise::{clamp, clamped_map, floor_div, map},
    random::{PositionalRandom, Random, RandomSplitter},
    types::{BlockPos, BlockStateId, ChunkPos},
};

use super::{
    NoiseRouter,
    fluid_level::{FluidPicker, FluidPickerImpl, FluidStatus},
};

const X_RANGE: i32 = 10;
const Y_RANGE: i32 = 9;
const Z_RANGE: i32 = 10;
const X_SPACING: i32 = 16;
const Y_SPACING: i32 = 12;
const Z_SPACING: i32 = 16;

/// Level of an aquifer with no fluid, far below any world.
pub const WAY_BELOW_MIN_Y: i32 = -2032 << 4;

/// Similarity of sources 10 and 12 blocks away; closer pairs may flow.
const FLOWING_UPDATE_SIMILARITY: f64 = 1.0 - (12.0 * 12.0 - 10.0 * 10.0) / 25.0;

/// Chunk offsets whose surface is sampled around an aquifer source.
const SURFACE_SAMPLING_OFFSETS_IN_CHUNKS: [(i32, i32); 13] = [
    (0, 0),
    (-2, -1),
    (-1, -1),
    (0, -1),
    (1, -1),
    (-3, 0),
    (-2, 0),
    (-1, 0),
    (1, 0),
    (-2, 1),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Blocks the aquifer can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AquiferBlocks {
    /// Placed below water levels.
    pub water: BlockStateId,
    /// Placed below levels picked as lava.
    pub lava: BlockStateId,
    /// Placed in open positions above the level.
    pub air: BlockStateId,
}

/// What an aquifer samples from the chunk being generated.
pub trait AquiferNoise {
    /// Evaluates `node` at a block position.
    fn sample(&mut self, node: NodeId, x: i32, y: i32, z: i32) -> f64;

    /// Estimated terrain surface of the column at `(x, z)`.
    fn preliminary_surface_level(&mut self, x: i32, z: i32) -> i32;
}

/// Picks the block for a position once its density is known.
#[enum_dispatch]
pub trait AquiferImpl {
    /// The block for an open or solid position of the given density.
    /// `None` keeps the default solid block.
    fn compute_substance(
        &mut self,
        noise: &mut impl AquiferNoise,
        x: i32,
        y: i32,
        z: i32,
        density: f64,
    ) -> Option<BlockStateId>;

    /// Whether the last placed fluid borders a different fluid body and
    /// needs a fluid tick.
    fn should_schedule_fluid_update(&self) -> bool;
}

/// The aquifer variants a chunk can use.
#[enum_dispatch(AquiferImpl)]
pub enum Aquifer {
    /// Fills every open position from the global picker.
    Disabled(DisabledAquifer),
    /// Places fluid bodies from the aquifer noises.
    NoiseBased(NoiseBasedAquifer),
}

/// Fills open positions from the global fluid picker alone.
pub struct DisabledAquifer {
    picker: FluidPicker,
    air: BlockStateId,
}

impl DisabledAquifer {
    /// Creates an aquifer that defers to `picker`.
    #[must_use]
    pub const fn new(picker: FluidPicker, air: BlockStateId) -> Self {
        Self { picker, air }
    }
}

impl AquiferImpl for DisabledAquifer {
    fn compute_substance(
        &mut self,
        _noise: &mut impl AquiferNoise,
        x: i32,
        y: i32,
        z: i32,
        density: f64,
    ) -> Option<BlockStateId> {
        if density > 0.0 {
            None
        } else {
            Some(self.picker.compute_fluid(x, y, z).at(y, self.air))
        }
    }

    fn should_schedule_fluid_update(&self) -> bool {
        false
    }
}

/// Nodes the aquifer reads from the router.
#[derive(Debug, Clone, Copy)]
struct AquiferNodes {
    barrier: NodeId,
    floodedness: NodeId,
    spread: NodeId,
    lava: NodeId,
    erosion: NodeId,
    depth: NodeId,
}

/// Separate fluid bodies on a jittered grid of sources, walled off by a barrier noise.
pub struct NoiseBasedAquifer {
    nodes: AquiferNodes,
    positional: RandomSplitter,
    picker: FluidPicker,
    blocks: AquiferBlocks,
    min_grid_x: i32,
    min_grid_y: i32,
    min_grid_z: i32,
    grid_size_x: i32,
    grid_size_z: i32,
    location_cache: Vec<i64>,
    status_cache: Vec<Option<FluidStatus>>,
    should_schedule_fluid_update: bool,
}

const fn grid_x(x: i32) -> i32 {
    x >> 4
}

const fn grid_y(y: i32) -> i32 {
    y.div_euclid(Y_SPACING)
}

const fn grid_z(z: i32) -> i32 {
    z >> 4
}

/// 1 for coincident sources, 0 at a squared distance gap of 25.
fn similarity(first_distance: i32, second_distance: i32) -> f64 {
    1.0 - f64::from((second_distance - first_distance).abs()) / 25.0
}

impl NoiseBasedAquifer {
    /// Creates the aquifer for `chunk`, sized to cover its block range.
    #[must_use]
    pub fn new(
        chunk: ChunkPos,
        router: &NoiseRouter,
        positional: RandomSplitter,
        min_y: i32,
        height: i32,
        picker: FluidPicker,
        blocks: AquiferBlocks,
    ) -> Self {
        let min_grid_x = grid_x(chunk.min_block_x()) - 1;
        let grid_size_x = grid_x(chunk.max_block_x()) + 1 - min_grid_x + 1;
        let min_grid_y = grid_y(min_y) - 1;
        let grid_size_y = grid_y(min_y + height) + 1 - min_grid_y + 1;
        let min_grid_z = grid_z(chunk.min_block_z()) - 1;
        let grid_size_z = grid_z(chunk.max_block_z()) + 1 - min_grid_z + 1;
        let size = (grid_size_x * grid_size_y * grid_size_z) as usize;

        Self {
            nodes: AquiferNodes {
                barrier: router.barrier_noise,
                floodedness: router.fluid_level_floodedness_noise,
                spread: router.fluid_level_spread_noise,
                lava: router.lava_noise,
                erosion: router.erosion,
                depth: router.depth,
            },
            positional,
            picker,
            blocks,
            min_grid_x,
            min_grid_y,
            min_grid_z,
            grid_size_x,
            grid_size_z,
            location_cache: vec![i64::MAX; size],
            status_cache: vec![None; size],
            should_schedule_fluid_update: false,
        }
    }

    fn index(&self, gx: i32, gy: i32, gz: i32) -> usize {
        let x = gx - self.min_grid_x;
        let y = gy - self.min_grid_y;
        let z = gz - self.min_grid_z;
        ((y * self.grid_size_z + z) * self.grid_size_x + x) as usize
    }

    /// The packed source position of a grid cell, generated on first use.
    fn source_location(&mut self, gx: i32, gy: i32, gz: i32) -> i64 {
        let index = self.index(gx, gy, gz);
        let cached = self.location_cache[index];
        if cached != i64::MAX {
            return cached;
        }
        let mut random = self.positional.at(gx, gy, gz);
        let location = BlockPos::new(
            gx * X_SPACING + random.next_i32_bounded(X_RANGE),
            gy * Y_SPACING + random.next_i32_bounded(Y_RANGE),
            gz * Z_SPACING + random.next_i32_bounded(Z_RANGE),
        )
        .as_long();
        self.location_cache[index] = location;
        location
    }

    fn aquifer_status(&mut self, noise: &mut impl AquiferNoise, location: i64) -> FluidStatus {
        let pos = BlockPos::from_long(location);
        let index = self.index(grid_x(pos.x), grid_y(pos.y), grid_z(pos.z));
        if let Some(status) = self.status_cache[index] {
            return status;
        }
        let status = self.compute_fluid(noise, pos.x, pos.y, pos.z);
        self.status_cache[index] = Some(status);
        status
    }

    fn compute_fluid(&self, noise: &mut impl AquiferNoise, x: i32, y: i32, z: i32) -> FluidStatus {
        let global = self.picker.compute_fluid(x, y, z);
        let mut min_surface = i32::MAX;
        let above = y + 12;
        let below = y - 12;
        let mut fluid_present = false;

        for (dx, dz) in SURFACE_SAMPLING_OFFSETS_IN_CHUNKS {
            let sx = x + (dx << 4);
            let sz = z + (dz << 4);
            let surface = noise.preliminary_surface_level(sx, sz);
            let check_y = surface.wrapping_add(8);
            let center = dx == 0 && dz == 0;
            if center && below > check_y {
                return global;
            }
            let reaches_check_y = above > check_y;
            if (reaches_check_y || center)
                && self.picker.compute_fluid(sx, check_y, sz).at(check_y, self.blocks.air)
                    != self.blocks.air
            {
                if center {
                    fluid_present = true;
                }
                if reaches_check_y {
                    return self.picker.compute_fluid(sx, check_y, sz);
                }
            }
            min_surface = min_surface.min(surface);
        }

        let level = self.compute_surface_level(noise, x, y, z, global, min_surface, fluid_present);
        FluidStatus::new(level, self.compute_fluid_type(noise, x, y, z, global, level))
    }

    #[allow(clippy::too_many_arguments)]
    fn compute_surface_level(
        &self,
        noise: &mut impl AquiferNoise,
        x: i32,
        y: i32,
        z: i32,
        global: FluidStatus,
        max_surface_level: i32,
        fluid_present: bool,
    ) -> i32 {
        let erosion = noise.sample(self.nodes.erosion, x, y, z);
        let depth = noise.sample(self.nodes.depth, x, y, z);
        let deep_dark = erosion < f64::from(-0.225_f32) && depth > f64::from(0.9_f32);

        let (flooded, filled) = if deep_dark {
            (-1.0, -1.0)
        } else {
            let distance_below_surface = max_surface_level.wrapping_add(8).wrapping_sub(y);
            let f = if fluid_present {
                clamped_map(f64::from(distance_below_surface), 0.0, 64.0, 1.0, 0.0)
            } else {
                0.0
            };
            let floodedness = clamp(noise.sample(self.nodes.floodedness, x, y, z), -1.0, 1.0);
            let full_threshold = map(f, 1.0, 0.0, -0.3, 0.8);
            let flooded_threshold = map(f, 1.0, 0.0, -0.8, 0.4);
            (floodedness - flooded_threshold, floodedness - full_threshold)
        };

        if filled > 0.0 {
            global.fluid_level
        } else if flooded > 0.0 {
            self.compute_randomized_fluid_surface_level(noise, x, y, z, max_surface_level)
        } else {
            WAY_BELOW_MIN_Y
        }
    }

    fn compute_randomized_fluid_surface_level(
        &self,
        noise: &mut impl AquiferNoise,
        x: i32,
        y: i32,
        z: i32,
        max_surface_level: i32,
    ) -> i32 {
        let gx = floor_div(x, 16);
        let gy = floor_div(y, 40);
        let gz = floor_div(z, 16);
        let base = gy * 40 + 20;
        let spread = noise.sample(self.nodes.spread, gx, gy, gz) * 10.0;
        let quantized = (spread / 3.0).floor() as i32 * 3;
        max_surface_level.min(base + quantized)
    }

    fn compute_fluid_type(
        &self,
        noise: &mut impl AquiferNoise,
        x: i32,
        y: i32,
        z: i32,
        global: FluidStatus,
        level: i32,
    ) -> BlockStateId {
        if level <= -10 && level != WAY_BELOW_MIN_Y && global.fluid_type != self.blocks.lava {
            let lava = noise.sample(
                self.nodes.lava,
                floor_div(x, 64),
                floor_div(y, 40),
                floor_div(z, 64),
            );
            if lava.abs() > 0.3 {
                return self.blocks.lava;
            }
        }
        global.fluid_type
    }

    /// Pushes density up where two different fluid bodies meet.
    #[allow(clippy::too_many_arguments)]
    fn calculate_pressure(
        &self,
        noise: &mut impl AquiferNoise,
        x: i32,
        y: i32,
        z: i32,
        barrier: &mut Option<f64>,
        first: FluidStatus,
        second: FluidStatus,
    ) -> f64 {
        let a = first.at(y, self.blocks.air);
        let b = second.at(y, self.blocks.air);
        let (water, lava) = (self.blocks.water, self.blocks.lava);
        if (a == lava && b == water) || (a == water && b == lava) {
            return 2.0;
        }

        let level_gap = (first.fluid_level - second.fluid_level).abs();
        if level_gap == 0 {
            return 0.0;
        }
        let mid_level = 0.5 * f64::from(first.fluid_level + second.fluid_level);
        let offset = f64::from(y) + 0.5 - mid_level;
        let half_gap = f64::from(level_gap) / 2.0;
        let o = half_gap - offset.abs();
        let q = if offset > 0.0 {
            if o > 0.0 { o / 1.5 } else { o / 2.5 }
        } else {
            let p = 3.0 + o;
            if p > 0.0 { p / 3.0 } else { p / 10.0 }
        };

        let r = if (-2.0..=2.0).contains(&q) {
            *barrier.get_or_insert_with(|| noise.sample(self.nodes.barrier, x, y, z))
        } else {
            0.0
        };
        2.0 * (r + q)
    }
}

impl AquiferImpl for NoiseBasedAquifer {
    fn compute_substance(
        &mut self,
        noise: &mut impl AquiferNoise,
        x: i32,
        y: i32,
        z: i32,
        density: f64,
    ) -> Option<BlockStateId> {
        if density > 0.0 {
            self.should_schedule_fluid_update = false;
            return None;
        }
        if self.picker.compute_fluid(x, y, z).at(y, self.blocks.air) == self.blocks.lava {
            self.should_schedule_fluid_update = false;
            return Some(self.blocks.lava);
        }

        let gx = floor_div(x - 5, X_SPACING);
        let gy = floor_div(y + 1, Y_SPACING);
        let gz = floor_div(z - 5, Z_SPACING);

        // The three nearest sources, closest first.
        let mut distances = [i32::MAX; 3];
        let mut locations = [0i64; 3];
        for ox in 0..=1 {
            for oy in -1..=1 {
                for oz in 0..=1 {
                    let location = self.source_location(gx + ox, gy + oy, gz + oz);
                    let pos = BlockPos::from_long(location);
                    let (dx, dy, dz) = (pos.x - x, pos.y - y, pos.z - z);
                    let distance = dx * dx + dy * dy + dz * dz;
                    if distances[0] >= distance {
                        distances = [distance, distances[0], distances[1]];
                        locations = [location, locations[0], locations[1]];
                    } else if distances[1] >= distance {
                        distances = [distances[0], distance, distances[1]];
                        locations = [locations[0], location, locations[1]];
                    } else if distances[2] >= distance {
                        distances[2] = distance;
                        locations[2] = location;
                    }
                }
            }
        }

        let closest = self.aquifer_status(noise, locations[0]);
        let d = similarity(distances[0], distances[1]);
        let block = closest.at(y, self.blocks.air);

        if d <= 0.0 {
            self.should_schedule_fluid_update = d >= FLOWING_UPDATE_SIMILARITY
                && closest != self.aquifer_status(noise, locations[1]);
            return Some(block);
        }
        if block == self.blocks.water
            && self.picker.compute_fluid(x, y - 1, z).at(y - 1, self.blocks.air) == self.blocks.lava
        {
            self.should_schedule_fluid_update = true;
            return Some(block);
        }

        let mut barrier = None;
        let second = self.aquifer_status(noise, locations[1]);
        let pressure = d * self.calculate_pressure(noise, x, y, z, &mut barrier, closest, second);
        if density + pressure > 0.0 {
            self.should_schedule_fluid_update = false;
            return None;
        }

        let third = self.aquifer_status(noise, locations[2]);
        let f = similarity(distances[0], distances[2]);
        if f > 0.0 {
            let pressure =
                d * f * self.calculate_pressure(noise, x, y, z, &mut barrier, closest, third);
            if density + pressure > 0.0 {
                self.should_schedule_fluid_update = false;
                return None;
            }
        }
        let g = similarity(distances[1], distances[2]);
        if g > 0.0 {
            let pressure =
                d * g * self.calculate_pressure(noise, x, y, z, &mut barrier, second, third);
            if density + pressure > 0.0 {
                self.should_schedule_fluid_update = false;
                return None;
            }
        }

        self.should_schedule_fluid_update = closest != second
            || (g >= FLOWING_UPDATE_SIMILARITY && second != third)
            || (f >= FLOWING_UPDATE_SIMILARITY && closest != third);
        Some(block)
    }

    fn should_schedule_fluid_update(&self) -> bool {
        self.should_schedule_fluid_update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        density::DensityGraph,
        noise_router::{OverworldFluidPicker, StaticFluidPicker},
        random::RandomSource,
    };

    const AIR: BlockStateId = BlockStateId(0);
    const WATER: BlockStateId = BlockStateId(1);
    const LAVA: BlockStateId = BlockStateId(2);
    const BLOCKS: AquiferBlocks = AquiferBlocks {
        water: WATER,
        lava: LAVA,
        air: AIR,
    };

    /// Constant noises and a flat surface.
    struct FlatNoise {
        graph: DensityGraph,
        surface: i32,
    }

    impl AquiferNoise for FlatNoise {
        fn sample(&mut self, node: NodeId, x: i32, y: i32, z: i32) -> f64 {
            self.graph
                .compute(node, &crate::density::FunctionContext::new(x, y, z))
        }

        fn preliminary_surface_level(&mut self, _x: i32, _z: i32) -> i32 {
            self.surface
        }
    }

    /// Values of the constant router noises the aquifer reads.
    #[derive(Clone, Copy)]
    struct Noises {
        floodedness: f64,
        spread: f64,
        lava: f64,
        erosion: f64,
        depth: f64,
    }

    impl Default for Noises {
        fn default() -> Self {
            Self {
                floodedness: 1.0,
                spread: 0.0,
                lava: 0.0,
                erosion: 0.0,
                depth: 0.0,
            }
        }
    }

    fn constant_router(graph: &mut DensityGraph, noises: Noises) -> NoiseRouter {
        let zero = graph.zero();
        let mut router = NoiseRouter::from_roots([zero; NoiseRouter::ROOT_COUNT]);
        router.fluid_level_floodedness_noise = graph.constant(noises.floodedness);
        router.fluid_level_spread_noise = graph.constant(noises.spread);
        router.lava_noise = graph.constant(noises.lava);
        router.erosion = graph.constant(noises.erosion);
        router.depth = graph.constant(noises.depth);
        router
    }

    fn router(graph: &mut DensityGraph, floodedness: f64) -> NoiseRouter {
        constant_router(
            graph,
            Noises {
                floodedness,
                ..Noises::default()
            },
        )
    }

    fn positional() -> RandomSplitter {
        RandomSource::create(42, false).next_positional()
    }

    /// A sea-level aquifer for `chunk` under a flat surface at y = 64.
    fn overworld(chunk: ChunkPos, noises: Noises) -> (NoiseBasedAquifer, FlatNoise) {
        let mut graph = DensityGraph::new();
        let router = constant_router(&mut graph, noises);
        let aquifer = NoiseBasedAquifer::new(
            chunk,
            &router,
            positional(),
            -64,
            384,
            OverworldFluidPicker::new(63, WATER, LAVA).into(),
            BLOCKS,
        );
        (aquifer, FlatNoise { graph, surface: 64 })
    }

    /// Floodedness that skips the global level but still floods.
    const PARTLY_FLOODED: f64 = 0.5;

    #[test]
    fn disabled_aquifer_follows_the_picker() {
        let mut aquifer = Aquifer::from(DisabledAquifer::new(
            StaticFluidPicker::new(FluidStatus::new(10, WATER)).into(),
            AIR,
        ));
        let mut noise = FlatNoise {
            graph: DensityGraph::new(),
            surface: 0,
        };
        assert_eq!(aquifer.compute_substance(&mut noise, 0, 5, 0, 1.0), None);
        assert_eq!(aquifer.compute_substance(&mut noise, 0, 5, 0, -1.0), Some(WATER));
        assert_eq!(aquifer.compute_substance(&mut noise, 0, 10, 0, -1.0), Some(AIR));
        assert!(!aquifer.should_schedule_fluid_update());
    }

    #[test]
    fn solid_density_is_never_replaced() {
        let mut graph = DensityGraph::new();
        let router = router(&mut graph, 1.0);
        let mut aquifer = NoiseBasedAquifer::new(
            ChunkPos::new(0, 0),
            &router,
            positional(),
            -64,
            384,
            OverworldFluidPicker::new(63, WATER, LAVA).into(),
            BLOCKS,
        );
        let mut noise = FlatNoise { graph, surface: 64 };
        for y in [-60, -20, 0, 40, 100] {
            assert_eq!(aquifer.compute_substance(&mut noise, 3, y, 9, 1.0), None);
            assert!(!aquifer.should_schedule_fluid_update());
        }
    }

    #[test]
    fn uniform_water_fills_below_its_level() {
        let mut graph = DensityGraph::new();
        let router = router(&mut graph, 1.0);
        let mut aquifer = NoiseBasedAquifer::new(
            ChunkPos::new(0, 0),
            &router,
            positional(),
            -64,
            384,
            StaticFluidPicker::new(FluidStatus::new(10, WATER)).into(),
            BLOCKS,
        );
        // Every source is flooded to the global level, so all sources agree.
        let mut noise = FlatNoise { graph, surface: 200 };
        for y in [-40, 0, 9] {
            assert_eq!(
                aquifer.compute_substance(&mut noise, 7, y, 7, -1.0),
                Some(WATER),
                "y = {y}"
            );
        }
        for y in [10, 30] {
            assert_eq!(aquifer.compute_substance(&mut noise, 7, y, 7, -1.0), Some(AIR));
        }
    }

    #[test]
    fn lava_floor_wins_over_aquifers() {
        let mut graph = DensityGraph::new();
        let router = router(&mut graph, 1.0);
        let mut aquifer = NoiseBasedAquifer::new(
            ChunkPos::new(2, -3),
            &router,
            positional(),
            -64,
            384,
            OverworldFluidPicker::new(63, WATER, LAVA).into(),
            BLOCKS,
        );
        let mut noise = FlatNoise { graph, surface: 64 };
        assert_eq!(
            aquifer.compute_substance(&mut noise, 40, -60, -40, -0.5),
            Some(LAVA)
        );
        assert!(!aquifer.should_schedule_fluid_update());
    }

    #[test]
    fn source_locations_are_stable_and_inside_their_cell() {
        let mut graph = DensityGraph::new();
        let router = router(&mut graph, 1.0);
        let mut aquifer = NoiseBasedAquifer::new(
            ChunkPos::new(0, 0),
            &router,
            positional(),
            -64,
            384,
            OverworldFluidPicker::new(63, WATER, LAVA).into(),
            BLOCKS,
        );
        for (gx, gy, gz) in [(0, 0, 0), (-1, -5, 1), (1, 3, -1)] {
            let first = aquifer.source_location(gx, gy, gz);
            assert_eq!(aquifer.source_location(gx, gy, gz), first);
            let pos = BlockPos::from_long(first);
            assert!((gx * 16..gx * 16 + 10).contains(&pos.x));
            assert!((gy * 12..gy * 12 + 9).contains(&pos.y));
            assert!((gz * 16..gz * 16 + 10).contains(&pos.z));
        }
    }

    #[test]
    fn neighbouring_chunks_agree_on_shared_sources() {
        let noises = Noises {
            floodedness: PARTLY_FLOODED,
            ..Noises::default()
        };
        let (mut west, mut west_noise) = overworld(ChunkPos::new(0, 0), noises);
        let (mut east, mut east_noise) = overworld(ChunkPos::new(1, 0), noises);

        // The west chunk reaches the shared cells from its low edge first, the
        // east chunk from its high edge.
        for (x_west, x_east) in [(2, 30), (14, 16)] {
            for y in [-30, 10, 40] {
                for z in [3, 7, 12] {
                    west.compute_substance(&mut west_noise, x_west, y, z, -0.1);
                    east.compute_substance(&mut east_noise, x_east, y, z, -0.1);
                }
            }
        }

        for y in [-30, 10, 40] {
            for z in [3, 7, 12] {
                assert_eq!(
                    west.compute_substance(&mut west_noise, 15, y, z, -0.1),
                    east.compute_substance(&mut east_noise, 15, y, z, -0.1),
                    "at (15, {y}, {z})"
                );
                assert_eq!(
                    west.should_schedule_fluid_update(),
                    east.should_schedule_fluid_update()
                );
            }
        }
        for gx in 0..=1 {
            for gy in -4..=4 {
                for gz in -1..=1 {
                    let location = west.source_location(gx, gy, gz);
                    assert_eq!(location, east.source_location(gx, gy, gz));
                    assert_eq!(
                        west.aquifer_status(&mut west_noise, location),
                        east.aquifer_status(&mut east_noise, location),
                        "grid ({gx}, {gy}, {gz})"
                    );
                }
            }
        }
    }

    #[test]
    fn deep_dark_sources_stay_dry() {
        let (aquifer, mut noise) = overworld(
            ChunkPos::new(0, 0),
            Noises {
                erosion: -0.3,
                depth: 1.0,
                ..Noises::default()
            },
        );
        assert_eq!(
            aquifer.compute_fluid(&mut noise, 5, 0, 5),
            FluidStatus::new(WAY_BELOW_MIN_Y, WATER)
        );

        // Thresholds are the game's floats, and both comparisons are strict.
        let (aquifer, mut noise) = overworld(
            ChunkPos::new(0, 0),
            Noises {
                erosion: f64::from(-0.225_f32),
                depth: 1.0,
                ..Noises::default()
            },
        );
        assert_eq!(
            aquifer.compute_fluid(&mut noise, 5, 0, 5),
            FluidStatus::new(63, WATER)
        );
    }

    #[test]
    fn randomized_levels_step_by_three() {
        let level = |spread: f64, y: i32| {
            let (aquifer, mut noise) = overworld(
                ChunkPos::new(0, 0),
                Noises {
                    floodedness: PARTLY_FLOODED,
                    spread,
                    ..Noises::default()
                },
            );
            aquifer.compute_fluid(&mut noise, 5, y, 5).fluid_level
        };
        // Base 20 for the vertical band 0..40, plus floor(spread * 10 / 3) * 3.
        assert_eq!(level(0.0, 0), 20);
        assert_eq!(level(0.25, 0), 20);
        assert_eq!(level(0.35, 0), 23);
        assert_eq!(level(-0.05, 0), 17);
        assert_eq!(level(0.0, -40), -20);
        // Capped by the lowest nearby surface.
        assert_eq!(level(0.7, 60), 64);
    }

    #[test]
    fn deep_sources_turn_to_lava_past_the_threshold() {
        let fluid = |lava: f64| {
            let (aquifer, mut noise) = overworld(
                ChunkPos::new(0, 0),
                Noises {
                    floodedness: PARTLY_FLOODED,
                    lava,
                    ..Noises::default()
                },
            );
            aquifer.compute_fluid(&mut noise, 5, -40, 5)
        };
        assert_eq!(fluid(0.31), FluidStatus::new(-20, LAVA));
        assert_eq!(fluid(-0.31), FluidStatus::new(-20, LAVA));
        assert_eq!(fluid(0.3), FluidStatus::new(-20, WATER));
        assert_eq!(fluid(0.0), FluidStatus::new(-20, WATER));

        // Shallow sources never roll for lava.
        let (aquifer, mut noise) = overworld(
            ChunkPos::new(0, 0),
            Noises {
                floodedness: PARTLY_FLOODED,
                lava: 1.0,
                ..Noises::default()
            },
        );
        assert_eq!(aquifer.compute_fluid(&mut noise, 5, 0, 5).fluid_type, WATER);
    }

    #[test]
    fn similarity_bounds() {
        assert_eq!(similarity(100, 100), 1.0);
        assert_eq!(similarity(100, 125), 0.0);
        assert!(similarity(0, 1000) < 0.0);
        assert!((FLOWING_UPDATE_SIMILARITY + 0.76).abs() < 1e-12);
    }

    #[test]
    fn pressure_between_water_and_lava_is_maximal() {
        let mut graph = DensityGraph::new();
        let router = router(&mut graph, 1.0);
        let aquifer = NoiseBasedAquifer::new(
            ChunkPos::new(0, 0),
            &router,
            positional(),
            -64,
            384,
            OverworldFluidPicker::new(63, WATER, LAVA).into(),
            BLOCKS,
        );
        let mut noise = FlatNoise { graph, surface: 64 };
        let mut barrier = None;
        let water = FluidStatus::new(20, WATER);
        let lava = FluidStatus::new(20, LAVA);
        assert_eq!(
            aquifer.calculate_pressure(&mut noise, 0, 0, 0, &mut barrier, water, lava),
            2.0
        );
        let same = FluidStatus::new(20, WATER);
        assert_eq!(
            aquifer.calculate_pressure(&mut noise, 0, 0, 0, &mut barrier, water, same),
            0.0
        );
        assert!(barrier.is_none());
    }
}
