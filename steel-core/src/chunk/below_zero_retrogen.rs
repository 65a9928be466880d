//! Extending chunks saved before the world reached y = -64.
//!
//! Such chunks are regenerated in the 64 layers below y = 0 only. Their old
//! bedrock floor turns into deepslate, and columns that had no bedrock are
//! cleared so player-dug holes stay open.

use serde::{Deserialize, Serialize};
use steel_utils::BitSet;

use crate::{
    biome::{
        BiomeRef,
        vanilla::{DEEP_DARK, DRIPSTONE_CAVES, LUSH_CAVES},
    },
    blocks::vanilla::{AIR, BEDROCK, DEEPSLATE},
};

use super::{
    height_accessor::{HeightRange, LevelHeightAccessor},
    proto_chunk::ProtoChunk,
    status::ChunkStatus,
};

/// The range regenerated for an upgrading chunk.
pub const UPGRADE_HEIGHT_ACCESSOR: HeightRange = HeightRange::new(-64, 64);

/// Cave biomes an upgrading chunk takes from the new generator. Every other
/// biome is copied up from the chunk's existing y = 0 biome.
pub static RETAINED_RETROGEN_BIOMES: [BiomeRef; 3] = [&LUSH_CAVES, &DRIPSTONE_CAVES, &DEEP_DARK];

/// Upgrade state of a chunk saved before the world extended below y = 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RetrogenData")]
pub struct BelowZeroRetrogen {
    target_status: ChunkStatus,
    /// Bit `z * 16 + x` is set for columns without bedrock at y = 0.
    #[serde(default, skip_serializing_if = "BitSet::is_empty")]
    missing_bedrock: BitSet,
}

#[derive(Deserialize)]
struct RetrogenData {
    target_status: ChunkStatus,
    #[serde(default)]
    missing_bedrock: BitSet,
}

impl TryFrom<RetrogenData> for BelowZeroRetrogen {
    type Error = String;

    fn try_from(data: RetrogenData) -> Result<Self, Self::Error> {
        Self::new(data.target_status, data.missing_bedrock)
            .ok_or_else(|| "target_status cannot be empty".to_owned())
    }
}

impl BelowZeroRetrogen {
    /// `None` when `target_status` is [`ChunkStatus::Empty`].
    #[must_use]
    pub fn new(target_status: ChunkStatus, missing_bedrock: BitSet) -> Option<Self> {
        (target_status != ChunkStatus::Empty).then_some(Self {
            target_status,
            missing_bedrock,
        })
    }

    /// The status the chunk had when it was saved.
    #[must_use]
    pub const fn target_status(&self) -> ChunkStatus {
        self.target_status
    }

    /// Whether any column lacks bedrock.
    #[must_use]
    pub fn has_bedrock_holes(&self) -> bool {
        !self.missing_bedrock.is_empty()
    }

    /// Whether the column at `(x, z)` lacks bedrock.
    #[must_use]
    pub fn has_bedrock_hole(&self, x: i32, z: i32) -> bool {
        self.missing_bedrock.get(((z & 15) * 16 + (x & 15)) as usize)
    }

    /// Turns the old bedrock floor in `0..=4` into deepslate.
    pub fn replace_old_bedrock(chunk: &mut ProtoChunk) {
        for x in 0..16 {
            for z in 0..16 {
                for y in 0..=4 {
                    if chunk.get_block_state(x, y, z) == BEDROCK {
                        chunk.set_block_state(x, y, z, DEEPSLATE);
                    }
                }
            }
        }
    }

    /// Clears the generated range of every column that had a bedrock hole.
    pub fn apply_bedrock_mask(&self, chunk: &mut ProtoChunk) {
        let range = chunk.height_accessor_for_generation();
        for x in 0..16 {
            for z in 0..16 {
                if self.has_bedrock_hole(x, z) {
                    for y in range.min_y()..=range.max_y() {
                        chunk.set_block_state(x, y, z, AIR);
                    }
                }
            }
        }
    }
}

/// The biome an upgrading chunk keeps at quart `(x, z)` given the freshly
/// sampled `biome`.
#[must_use]
pub fn retained_biome(chunk: &ProtoChunk, biome: BiomeRef, quart_x: i32, quart_z: i32) -> BiomeRef {
    if biome.is_any(&RETAINED_RETROGEN_BIOMES) {
        biome
    } else {
        chunk.get_noise_biome(quart_x, 0, quart_z)
    }
}
