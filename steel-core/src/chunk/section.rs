//! Chunk sections: 16x16x16 blocks and 4x4x4 biomes each.

use steel_utils::BlockStateId;

use crate::{
    biome::{BiomeRef, vanilla::PLAINS},
    blocks::{self, vanilla::AIR},
};

use super::{heightmap::BlockGetter, height_accessor::LevelHeightAccessor};

const SECTION_VOLUME: usize = 16 * 16 * 16;

/// Block states of a section. Stays a single value until a second state is
/// written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockStorage {
    /// Every block holds this state.
    Homogeneous(BlockStateId),
    /// One state per block, indexed `y << 8 | z << 4 | x`.
    Full(Box<[BlockStateId]>),
}

impl BlockStorage {
    const fn index(x: usize, y: usize, z: usize) -> usize {
        (y << 8) | (z << 4) | x
    }

    /// The state at section-relative coordinates.
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockStateId {
        match self {
            Self::Homogeneous(state) => *state,
            Self::Full(states) => states[Self::index(x, y, z)],
        }
    }

    /// Writes `state` and returns the previous one.
    pub fn set(&mut self, x: usize, y: usize, z: usize, state: BlockStateId) -> BlockStateId {
        match self {
            Self::Homogeneous(current) if *current == state => state,
            Self::Homogeneous(current) => {
                let previous = *current;
                let mut states = vec![previous; SECTION_VOLUME].into_boxed_slice();
                states[Self::index(x, y, z)] = state;
                *self = Self::Full(states);
                previous
            }
            Self::Full(states) => std::mem::replace(&mut states[Self::index(x, y, z)], state),
        }
    }
}

/// One 16x16x16 slice of a chunk.
#[derive(Debug, Clone)]
pub struct ChunkSection {
    /// Block states of the section.
    pub states: BlockStorage,
    non_air_count: u16,
    /// Indexed `(y * 4 + z) * 4 + x`.
    biomes: [BiomeRef; 64],
}

impl Default for ChunkSection {
    fn default() -> Self {
        Self::new_empty()
    }
}

impl ChunkSection {
    /// An all-air section of plains.
    #[must_use]
    pub fn new_empty() -> Self {
        Self {
            states: BlockStorage::Homogeneous(AIR),
            non_air_count: 0,
            biomes: [&PLAINS; 64],
        }
    }

    /// Whether every block is air.
    #[must_use]
    pub fn has_only_air(&self) -> bool {
        self.non_air_count == 0
    }

    /// The state at section-relative coordinates.
    #[must_use]
    pub fn get_block_state(&self, x: usize, y: usize, z: usize) -> BlockStateId {
        self.states.get(x, y, z)
    }

    /// Replaces a state and returns the previous one.
    pub fn set_block_state(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        state: BlockStateId,
    ) -> BlockStateId {
        let previous = self.states.set(x, y, z, state);
        if !blocks::state(previous).is_air() {
            self.non_air_count -= 1;
        }
        if !blocks::state(state).is_air() {
            self.non_air_count += 1;
        }
        previous
    }

    /// Biome of the quart cell at section-relative quart coordinates.
    #[must_use]
    pub fn get_noise_biome(&self, x: usize, y: usize, z: usize) -> BiomeRef {
        self.biomes[(y * 4 + z) * 4 + x]
    }

    /// Replaces all 64 quart biomes.
    pub fn set_noise_biomes(&mut self, biomes: [BiomeRef; 64]) {
        self.biomes = biomes;
    }

    /// Resolves the 64 biomes of a section whose first quart cell is
    /// `(quart_x, quart_y, quart_z)`, in x, y, z order.
    pub fn resolve_biomes(
        quart_x: i32,
        quart_y: i32,
        quart_z: i32,
        mut resolver: impl FnMut(i32, i32, i32) -> BiomeRef,
    ) -> [BiomeRef; 64] {
        let mut biomes: [BiomeRef; 64] = [&PLAINS; 64];
        for x in 0..4 {
            for y in 0..4 {
                for z in 0..4 {
                    biomes[(y * 4 + z) * 4 + x] =
                        resolver(quart_x + x as i32, quart_y + y as i32, quart_z + z as i32);
                }
            }
        }
        biomes
    }
}

/// The sections of one chunk, lowest first.
#[derive(Debug, Clone)]
pub struct ChunkSections {
    min_y: i32,
    /// The sections, lowest first.
    pub sections: Box<[ChunkSection]>,
}

impl ChunkSections {
    /// Empty sections covering `level`.
    #[must_use]
    pub fn new(level: &impl LevelHeightAccessor) -> Self {
        let count = level.section_count().max(0) as usize;
        Self {
            min_y: level.min_section_y() << 4,
            sections: (0..count).map(|_| ChunkSection::new_empty()).collect(),
        }
    }

    /// The section holding absolute `y`, if any.
    #[must_use]
    pub fn section(&self, y: i32) -> Option<&ChunkSection> {
        if self.is_outside_build_height(y) {
            return None;
        }
        self.sections.get(self.section_index(y) as usize)
    }

    /// Mutable access to the section holding absolute `y`, if any.
    pub fn section_mut(&mut self, y: i32) -> Option<&mut ChunkSection> {
        if self.is_outside_build_height(y) {
            return None;
        }
        let index = self.section_index(y) as usize;
        self.sections.get_mut(index)
    }
}

impl LevelHeightAccessor for ChunkSections {
    fn height(&self) -> i32 {
        self.sections.len() as i32 * 16
    }

    fn min_y(&self) -> i32 {
        self.min_y
    }
}

impl BlockGetter for ChunkSections {
    fn block_state(&self, x: i32, y: i32, z: i32) -> BlockStateId {
        self.section(y).map_or(AIR, |section| {
            section.get_block_state((x & 15) as usize, (y & 15) as usize, (z & 15) as usize)
        })
    }

    fn highest_section_position(&self) -> i32 {
        self.sections
            .iter()
            .rposition(|section| !section.has_only_air())
            .map_or(self.min_y, |index| self.min_y + index as i32 * 16)
    }
}
