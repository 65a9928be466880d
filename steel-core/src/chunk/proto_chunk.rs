//! A chunk while it is being generated.

use rustc_hash::FxHashMap;
use steel_utils::{BlockStateId, ChunkPos};

use crate::{
    biome::{BiomeRef, BiomeSource, ClimateSampler},
    blocks::{self, vanilla::AIR},
};

use super::{
    below_zero_retrogen::{self, BelowZeroRetrogen},
    height_accessor::{HeightRange, LevelHeightAccessor},
    heightmap::{BlockGetter, Heightmap, HeightmapType},
    section::{ChunkSection, ChunkSections},
    status::ChunkStatus,
};

/// A chunk that has not reached [`ChunkStatus::Full`] yet.
#[derive(Debug, Clone)]
pub struct ProtoChunk {
    pos: ChunkPos,
    sections: ChunkSections,
    heightmaps: FxHashMap<HeightmapType, Heightmap>,
    /// Section-relative packed positions that need a fluid tick, per section.
    postprocessing: Box<[Vec<u16>]>,
    status: ChunkStatus,
    below_zero_retrogen: Option<BelowZeroRetrogen>,
}

impl ProtoChunk {
    /// An empty chunk covering `level`.
    #[must_use]
    pub fn new(
        pos: ChunkPos,
        level: &impl LevelHeightAccessor,
        below_zero_retrogen: Option<BelowZeroRetrogen>,
    ) -> Self {
        let sections = ChunkSections::new(level);
        let heightmaps = HeightmapType::WORLDGEN
            .iter()
            .map(|&kind| (kind, Heightmap::new(kind, &sections)))
            .collect();
        Self {
            pos,
            postprocessing: vec![Vec::new(); sections.sections.len()].into_boxed_slice(),
            sections,
            heightmaps,
            status: ChunkStatus::Empty,
            below_zero_retrogen,
        }
    }

    /// Position of the chunk.
    #[must_use]
    pub const fn pos(&self) -> ChunkPos {
        self.pos
    }

    /// How far generation has progressed.
    #[must_use]
    pub const fn status(&self) -> ChunkStatus {
        self.status
    }

    /// Records a finished generation step.
    pub fn set_status(&mut self, status: ChunkStatus) {
        self.status = status;
    }

    /// The block sections, lowest first.
    #[must_use]
    pub const fn sections(&self) -> &ChunkSections {
        &self.sections
    }

    /// State at absolute or chunk-relative `x`/`z` (only the low four bits
    /// are used) and absolute `y`.
    #[must_use]
    pub fn get_block_state(&self, x: i32, y: i32, z: i32) -> BlockStateId {
        self.sections.block_state(x & 15, y, z & 15)
    }

    /// Writes `state` and updates the heightmaps of the current status.
    /// Returns the previous state, or air when `y` is outside the chunk.
    pub fn set_block_state(&mut self, x: i32, y: i32, z: i32, state: BlockStateId) -> BlockStateId {
        let (x, z) = (x & 15, z & 15);
        let Some(section) = self.sections.section_mut(y) else {
            return AIR;
        };
        if section.has_only_air() && blocks::state(state).is_air() {
            return state;
        }
        let previous = section.set_block_state(x as usize, (y & 15) as usize, z as usize, state);

        let kinds = self.status.heightmaps_after();
        let mut missing: Vec<Heightmap> = kinds
            .iter()
            .filter(|kind| !self.heightmaps.contains_key(*kind))
            .map(|&kind| Heightmap::new(kind, &self.sections))
            .collect();
        if !missing.is_empty() {
            let mut refs: Vec<&mut Heightmap> = missing.iter_mut().collect();
            Heightmap::prime(&self.sections, &mut refs);
            self.heightmaps
                .extend(missing.into_iter().map(|heightmap| (heightmap.kind(), heightmap)));
        }
        for kind in kinds {
            if let Some(heightmap) = self.heightmaps.get_mut(kind) {
                heightmap.update(&self.sections, x, y, z, state);
            }
        }
        previous
    }

    /// The heightmap of `kind`, if the chunk tracks it.
    #[must_use]
    pub fn heightmap(&self, kind: HeightmapType) -> Option<&Heightmap> {
        self.heightmaps.get(&kind)
    }

    /// The y of the highest block matching `kind` in the column, or one
    /// below the minimum y when there is none.
    #[must_use]
    pub fn get_height(&self, kind: HeightmapType, x: i32, z: i32) -> i32 {
        let (x, z) = (x & 15, z & 15);
        if let Some(heightmap) = self.heightmaps.get(&kind) {
            return heightmap.get_first_available(x, z) - 1;
        }
        let top = self.sections.highest_section_position() + 16;
        (self.min_y()..top)
            .rev()
            .find(|&y| kind.is_opaque(blocks::state(self.sections.block_state(x, y, z))))
            .unwrap_or(self.min_y() - 1)
    }

    /// Queues `(x, y, z)` for a fluid tick once the chunk is placed.
    pub fn mark_pos_for_postprocessing(&mut self, x: i32, y: i32, z: i32) {
        if self.is_outside_build_height(y) {
            return;
        }
        let index = self.section_index(y) as usize;
        let packed = ((x & 15) | ((y & 15) << 4) | ((z & 15) << 8)) as u16;
        if let Some(list) = self.postprocessing.get_mut(index) {
            list.push(packed);
        }
    }

    /// Packed in-section positions that need a block or fluid update, per section.
    #[must_use]
    pub fn postprocessing(&self) -> &[Vec<u16>] {
        &self.postprocessing
    }

    /// The stored biome at quart coordinates. `quart_y` is clamped to the
    /// chunk.
    #[must_use]
    pub fn get_noise_biome(&self, quart_x: i32, quart_y: i32, quart_z: i32) -> BiomeRef {
        let min_quart_y = self.min_y() >> 2;
        let max_quart_y = min_quart_y + (self.height() >> 2) - 1;
        let quart_y = quart_y.clamp(min_quart_y, max_quart_y);
        let index = self.section_index_from_section_y(quart_y >> 2) as usize;
        self.sections.sections[index].get_noise_biome(
            (quart_x & 3) as usize,
            (quart_y & 3) as usize,
            (quart_z & 3) as usize,
        )
    }

    /// Samples the biomes of every section in the generation height range.
    pub fn fill_biomes_from_noise(&mut self, source: &BiomeSource, sampler: &ClimateSampler) {
        let range = self.height_accessor_for_generation();
        let quart_x = self.pos.min_block_x() >> 2;
        let quart_z = self.pos.min_block_z() >> 2;
        for section_y in range.min_section_y()..=range.max_section_y() {
            if self.is_outside_build_height(section_y << 4) {
                continue;
            }
            let biomes = ChunkSection::resolve_biomes(quart_x, section_y << 2, quart_z, |x, y, z| {
                let biome = source.get_noise_biome(x, y, z, sampler);
                if self.is_upgrading() {
                    below_zero_retrogen::retained_biome(self, biome, x, z)
                } else {
                    biome
                }
            });
            let index = self.section_index_from_section_y(section_y) as usize;
            self.sections.sections[index].set_noise_biomes(biomes);
        }
    }

    /// Upgrade state for chunks saved before the world extended below y = 0.
    #[must_use]
    pub const fn below_zero_retrogen(&self) -> Option<&BelowZeroRetrogen> {
        self.below_zero_retrogen.as_ref()
    }

    /// Whether the chunk predates the deeper world and is being extended
    /// downwards.
    #[must_use]
    pub const fn is_upgrading(&self) -> bool {
        self.below_zero_retrogen.is_some()
    }

    /// The vertical range generation writes to.
    #[must_use]
    pub fn height_accessor_for_generation(&self) -> HeightRange {
        if self.is_upgrading() {
            below_zero_retrogen::UPGRADE_HEIGHT_ACCESSOR
        } else {
            HeightRange::new(self.min_y(), self.height())
        }
    }
}

impl LevelHeightAccessor for ProtoChunk {
    fn height(&self) -> i32 {
        self.sections.height()
    }

    fn min_y(&self) -> i32 {
        self.sections.min_y()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        biome::vanilla,
        blocks::vanilla::{STONE, WATER},
    };

    fn chunk() -> ProtoChunk {
        ProtoChunk::new(ChunkPos::new(2, -3), &HeightRange::new(-64, 384), None)
    }

    #[test]
    fn writes_outside_the_chunk_are_dropped() {
        let mut chunk = chunk();
        assert_eq!(chunk.set_block_state(0, 320, 0, STONE), AIR);
        assert_eq!(chunk.set_block_state(0, -65, 0, STONE), AIR);
        assert_eq!(chunk.get_block_state(0, 320, 0), AIR);
    }

    #[test]
    fn writes_update_worldgen_heightmaps() {
        let mut chunk = chunk();
        assert_eq!(chunk.get_height(HeightmapType::WorldSurfaceWg, 5, 7), -65);

        chunk.set_block_state(37, 10, 55, STONE);
        chunk.set_block_state(37, 11, 55, WATER);
        assert_eq!(chunk.get_block_state(5, 10, 7), STONE);
        assert_eq!(chunk.get_height(HeightmapType::WorldSurfaceWg, 5, 7), 11);
        assert_eq!(chunk.get_height(HeightmapType::OceanFloorWg, 5, 7), 10);
        assert!(chunk.heightmap(HeightmapType::OceanFloor).is_none());
        assert_eq!(chunk.get_height(HeightmapType::MotionBlocking, 5, 7), 11);
    }

    #[test]
    fn later_statuses_prime_final_heightmaps() {
        let mut chunk = chunk();
        chunk.set_block_state(0, 40, 0, STONE);
        chunk.set_status(ChunkStatus::Features);
        chunk.set_block_state(1, 0, 1, STONE);
        assert_eq!(chunk.get_height(HeightmapType::OceanFloor, 0, 0), 40);
        assert_eq!(chunk.get_height(HeightmapType::OceanFloor, 1, 1), 0);
    }

    #[test]
    fn postprocessing_is_packed_per_section() {
        let mut chunk = chunk();
        chunk.mark_pos_for_postprocessing(17, -63, 3);
        chunk.mark_pos_for_postprocessing(0, 1000, 0);
        assert_eq!(chunk.postprocessing()[0], vec![1 | (1 << 4) | (3 << 8)]);
        assert_eq!(chunk.postprocessing().iter().map(Vec::len).sum::<usize>(), 1);
    }

    #[test]
    fn noise_biome_clamps_vertically() {
        let mut chunk = chunk();
        chunk.fill_biomes_from_noise(&BiomeSource::Fixed(&vanilla::DESERT), &dummy_sampler());
        assert!(chunk.get_noise_biome(8, 10_000, -12).is(&vanilla::DESERT));
        assert!(chunk.get_noise_biome(8, -10_000, -12).is(&vanilla::DESERT));
    }

    fn dummy_sampler() -> ClimateSampler {
        use std::sync::Arc;
        use steel_utils::density::DensityGraph;

        let mut graph = DensityGraph::new();
        let zero = graph.constant(0.0);
        ClimateSampler::new(Arc::new(graph), zero, zero, zero, zero, zero, zero)
    }
}
