//! Per-column height tracking.
//!
//! A heightmap stores, for each of the 256 columns of a chunk, the lowest y
//! above every block matching its predicate. Columns without a match hold the
//! chunk's minimum y.

use log::warn;
use serde::{Deserialize, Serialize};
use steel_utils::{BlockStateId, ChunkPos, noise::ceil_log2};

use crate::blocks::{self, BlockState};

use super::{bit_storage::SimpleBitStorage, height_accessor::LevelHeightAccessor};

/// Block reads a heightmap needs from its chunk.
pub trait BlockGetter: LevelHeightAccessor {
    /// State at chunk-relative `x`, `z` and absolute `y`. Air outside the chunk.
    fn block_state(&self, x: i32, y: i32, z: i32) -> BlockStateId;

    /// Bottom y of the highest section holding a non-air block, or the
    /// minimum y when every section is empty.
    fn highest_section_position(&self) -> i32;
}

/// The tracked heightmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeightmapType {
    /// Highest non-air block, during generation.
    WorldSurfaceWg,
    /// Highest non-air block.
    WorldSurface,
    /// Highest motion-blocking block, during generation.
    OceanFloorWg,
    /// Highest motion-blocking block.
    OceanFloor,
    /// Highest block that blocks motion or holds fluid.
    MotionBlocking,
    /// As `MotionBlocking`, skipping leaves.
    MotionBlockingNoLeaves,
}

impl HeightmapType {
    /// Maps maintained while terrain is generated.
    pub const WORLDGEN: [Self; 2] = [Self::OceanFloorWg, Self::WorldSurfaceWg];

    /// Maps a finished chunk carries.
    pub const FINAL: [Self; 4] = [
        Self::OceanFloor,
        Self::WorldSurface,
        Self::MotionBlocking,
        Self::MotionBlockingNoLeaves,
    ];

    /// Whether `state` counts as filled for this map.
    #[must_use]
    pub const fn is_opaque(self, state: &BlockState) -> bool {
        match self {
            Self::WorldSurfaceWg | Self::WorldSurface => !state.is_air(),
            Self::OceanFloorWg | Self::OceanFloor => state.blocks_motion(),
            Self::MotionBlocking => state.blocks_motion() || state.has_fluid(),
            Self::MotionBlockingNoLeaves => {
                (state.blocks_motion() || state.has_fluid()) && !state.is_leaves()
            }
        }
    }

    /// The key the map is saved under.
    #[must_use]
    pub const fn serialization_key(self) -> &'static str {
        match self {
            Self::WorldSurfaceWg => "WORLD_SURFACE_WG",
            Self::WorldSurface => "WORLD_SURFACE",
            Self::OceanFloorWg => "OCEAN_FLOOR_WG",
            Self::OceanFloor => "OCEAN_FLOOR",
            Self::MotionBlocking => "MOTION_BLOCKING",
            Self::MotionBlockingNoLeaves => "MOTION_BLOCKING_NO_LEAVES",
        }
    }
}

/// Highest block of each column matching a [`HeightmapType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heightmap {
    kind: HeightmapType,
    min_y: i32,
    data: SimpleBitStorage,
}

const fn index(x: i32, z: i32) -> usize {
    (x + z * 16) as usize
}

impl Heightmap {
    /// An unprimed map: every column at the minimum y.
    #[must_use]
    pub fn new(kind: HeightmapType, chunk: &impl LevelHeightAccessor) -> Self {
        let bits = ceil_log2((chunk.height() + 1) as u32).max(1);
        Self {
            kind,
            min_y: chunk.min_y(),
            data: SimpleBitStorage::new(bits, 256),
        }
    }

    /// Which blocks the map tracks.
    #[must_use]
    pub const fn kind(&self) -> HeightmapType {
        self.kind
    }

    /// Updates the column after `state` was placed at `(x, y, z)`. Returns
    /// whether the stored height changed.
    pub fn update(
        &mut self,
        chunk: &impl BlockGetter,
        x: i32,
        y: i32,
        z: i32,
        state: BlockStateId,
    ) -> bool {
        let first_available = self.get_first_available(x, z);
        if y <= first_available - 2 {
            return false;
        }

        if self.kind.is_opaque(blocks::state(state)) {
            if y >= first_available {
                self.set_height(x, z, y + 1);
                return true;
            }
        } else if first_available - 1 == y {
            for below in (self.min_y..y).rev() {
                if self.kind.is_opaque(blocks::state(chunk.block_state(x, below, z))) {
                    self.set_height(x, z, below + 1);
                    return true;
                }
            }
            self.set_height(x, z, self.min_y);
            return true;
        }
        false
    }

    /// Lowest y above every matching block of the column.
    #[must_use]
    pub fn get_first_available(&self, x: i32, z: i32) -> i32 {
        self.data.get(index(x & 15, z & 15)) as i32 + self.min_y
    }

    /// Y of the highest matching block, or one below the minimum y.
    #[must_use]
    pub fn get_highest_taken(&self, x: i32, z: i32) -> i32 {
        self.get_first_available(x, z) - 1
    }

    fn set_height(&mut self, x: i32, z: i32, y: i32) {
        self.data.set(index(x & 15, z & 15), (y - self.min_y) as u32);
    }

    /// The packed column heights.
    #[must_use]
    pub fn raw_data(&self) -> &[i64] {
        self.data.raw()
    }

    /// Loads saved words. Data of the wrong length is dropped with a warning
    /// and the map is rebuilt from the chunk.
    pub fn set_raw_data(&mut self, chunk: &impl BlockGetter, pos: ChunkPos, data: &[i64]) {
        let raw = self.data.raw_mut();
        if raw.len() == data.len() {
            raw.copy_from_slice(data);
            return;
        }
        warn!(
            "Ignoring heightmap data for chunk [{}, {}], size does not match; expected: {}, got: {}",
            pos.x,
            pos.z,
            raw.len(),
            data.len()
        );
        Self::prime(chunk, &mut [self]);
    }

    /// Rebuilds `heightmaps` from the blocks of `chunk`, one downward scan
    /// per column shared by all maps.
    pub fn prime(chunk: &impl BlockGetter, heightmaps: &mut [&mut Heightmap]) {
        if heightmaps.is_empty() {
            return;
        }
        let top = chunk.highest_section_position() + 16;
        let min_y = chunk.min_y();
        let mut pending = Vec::with_capacity(heightmaps.len());

        for x in 0..16 {
            for z in 0..16 {
                for heightmap in heightmaps.iter_mut() {
                    heightmap.set_height(x, z, min_y);
                }
                pending.clear();
                pending.extend(0..heightmaps.len());

                for y in (min_y..top).rev() {
                    let state_id = chunk.block_state(x, y, z);
                    if state_id == blocks::vanilla::AIR {
                        continue;
                    }
                    let state = blocks::state(state_id);
                    pending.retain(|&i| {
                        let heightmap = &mut heightmaps[i];
                        if heightmap.kind.is_opaque(state) {
                            heightmap.set_height(x, z, y + 1);
                            false
                        } else {
                            true
                        }
                    });
                    if pending.is_empty() {
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use steel_utils::random::{Random, RandomSource};

    use super::*;
    use crate::blocks::vanilla;

    struct Column {
        blocks: Vec<BlockStateId>,
    }

    impl Column {
        fn new() -> Self {
            Self {
                blocks: vec![vanilla::AIR; 16 * 16 * 64],
            }
        }

        fn set(&mut self, x: i32, y: i32, z: i32, state: BlockStateId) {
            let index = ((y - self.min_y()) * 256 + z * 16 + x) as usize;
            self.blocks[index] = state;
        }
    }

    impl LevelHeightAccessor for Column {
        fn height(&self) -> i32 {
            64
        }

        fn min_y(&self) -> i32 {
            -16
        }
    }

    impl BlockGetter for Column {
        fn block_state(&self, x: i32, y: i32, z: i32) -> BlockStateId {
            if self.is_outside_build_height(y) {
                return vanilla::AIR;
            }
            self.blocks[((y - self.min_y()) * 256 + z * 16 + x) as usize]
        }

        fn highest_section_position(&self) -> i32 {
            32
        }
    }

    fn expected(column: &Column, kind: HeightmapType, x: i32, z: i32) -> i32 {
        (column.min_y()..=column.max_y())
            .rev()
            .find(|&y| kind.is_opaque(blocks::state(column.block_state(x, y, z))))
            .map_or(column.min_y(), |y| y + 1)
    }

    #[test]
    fn updates_keep_the_column_invariant() {
        let palette = [
            vanilla::AIR,
            vanilla::AIR,
            vanilla::STONE,
            vanilla::WATER,
            vanilla::OAK_LEAVES,
            vanilla::POWDER_SNOW,
        ];
        let mut column = Column::new();
        let mut maps: Vec<Heightmap> = HeightmapType::WORLDGEN
            .iter()
            .chain(&HeightmapType::FINAL)
            .map(|&kind| Heightmap::new(kind, &column))
            .collect();
        let mut random = RandomSource::create(42, false);

        for _ in 0..4000 {
            let x = random.next_i32_bounded(16);
            let z = random.next_i32_bounded(16);
            let y = random.next_i32_between(column.min_y(), column.max_y());
            let state = palette[random.next_i32_bounded(palette.len() as i32) as usize];
            column.set(x, y, z, state);
            for map in &mut maps {
                map.update(&column, x, y, z, state);
            }
        }

        for map in &maps {
            for x in 0..16 {
                for z in 0..16 {
                    assert_eq!(
                        map.get_first_available(x, z),
                        expected(&column, map.kind(), x, z),
                        "{:?} at {x} {z}",
                        map.kind()
                    );
                }
            }
        }
    }

    #[test]
    fn priming_matches_a_full_scan() {
        let mut column = Column::new();
        for x in 0..16 {
            for z in 0..16 {
                for y in -16..(x + z) {
                    column.set(x, y, z, vanilla::STONE);
                }
                column.set(x, x + z, z, vanilla::WATER);
                if x == 0 {
                    column.set(x, x + z + 3, z, vanilla::OAK_LEAVES);
                }
            }
        }
        let mut surface = Heightmap::new(HeightmapType::WorldSurface, &column);
        let mut ocean_floor = Heightmap::new(HeightmapType::OceanFloor, &column);
        let mut no_leaves = Heightmap::new(HeightmapType::MotionBlockingNoLeaves, &column);
        Heightmap::prime(&column, &mut [&mut surface, &mut ocean_floor, &mut no_leaves]);

        assert_eq!(surface.get_first_available(2, 3), 6);
        assert_eq!(ocean_floor.get_first_available(2, 3), 5);
        assert_eq!(no_leaves.get_first_available(2, 3), 6);
        assert_eq!(surface.get_highest_taken(0, 0), 3);
        assert_eq!(ocean_floor.get_first_available(0, 0), 4);
        assert_eq!(no_leaves.get_first_available(0, 0), 1);
    }

    #[test]
    fn mismatched_raw_data_reprimes() {
        let mut column = Column::new();
        column.set(4, 10, 4, vanilla::STONE);
        let mut map = Heightmap::new(HeightmapType::WorldSurfaceWg, &column);
        map.set_raw_data(&column, ChunkPos::new(0, 0), &[1, 2, 3]);
        assert_eq!(map.get_first_available(4, 4), 11);
        assert_eq!(map.get_first_available(0, 0), -16);

        let words = map.raw_data().to_vec();
        let mut copy = Heightmap::new(HeightmapType::WorldSurfaceWg, &column);
        copy.set_raw_data(&column, ChunkPos::new(0, 0), &words);
        assert_eq!(copy, map);
    }
}
