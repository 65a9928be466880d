//! The block states terrain generation places.
//!
//! Ids are indices into a fixed table. Only the properties generation reads
//! are tracked: whether a state is air, blocks motion, holds a fluid or is a
//! leaves block.

use std::sync::LazyLock;

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use steel_utils::{BlockStateId, ResourceLocation, WorldgenError};

bitflags! {
    /// Properties of a block state that generation reads.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BlockFlags: u8 {
        const AIR = 1;
        const BLOCKS_MOTION = 1 << 1;
        const WATER = 1 << 2;
        const LAVA = 1 << 3;
        const LEAVES = 1 << 4;
    }
}

/// One entry of the block table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockState {
    /// The block id.
    pub key: ResourceLocation,
    /// Physical traits used by heightmaps and fluids.
    pub flags: BlockFlags,
}

impl BlockState {
    const fn new(path: &'static str, flags: BlockFlags) -> Self {
        Self {
            key: ResourceLocation::vanilla_static(path),
            flags,
        }
    }

    /// Whether the state is air.
    #[must_use]
    pub const fn is_air(&self) -> bool {
        self.flags.contains(BlockFlags::AIR)
    }

    /// Whether the state blocks entity motion.
    #[must_use]
    pub const fn blocks_motion(&self) -> bool {
        self.flags.contains(BlockFlags::BLOCKS_MOTION)
    }

    /// Whether the state carries water or lava.
    #[must_use]
    pub const fn has_fluid(&self) -> bool {
        self.flags.intersects(BlockFlags::WATER.union(BlockFlags::LAVA))
    }

    /// Whether the state is a leaf block.
    #[must_use]
    pub const fn is_leaves(&self) -> bool {
        self.flags.contains(BlockFlags::LEAVES)
    }
}

const SOLID: BlockFlags = BlockFlags::BLOCKS_MOTION;
const NONE: BlockFlags = BlockFlags::empty();

static BLOCK_STATES: [BlockState; 39] = [
    BlockState::new("air", BlockFlags::AIR),
    BlockState::new("stone", SOLID),
    BlockState::new("deepslate", SOLID),
    BlockState::new("bedrock", SOLID),
    BlockState::new("water", BlockFlags::WATER),
    BlockState::new("lava", BlockFlags::LAVA),
    BlockState::new("grass_block", SOLID),
    BlockState::new("dirt", SOLID),
    BlockState::new("coarse_dirt", SOLID),
    BlockState::new("podzol", SOLID),
    BlockState::new("mycelium", SOLID),
    BlockState::new("mud", SOLID),
    BlockState::new("sand", SOLID),
    BlockState::new("red_sand", SOLID),
    BlockState::new("sandstone", SOLID),
    BlockState::new("red_sandstone", SOLID),
    BlockState::new("gravel", SOLID),
    BlockState::new("clay", SOLID),
    BlockState::new("calcite", SOLID),
    BlockState::new("snow_block", SOLID),
    BlockState::new("powder_snow", NONE),
    BlockState::new("ice", SOLID),
    BlockState::new("packed_ice", SOLID),
    BlockState::new("terracotta", SOLID),
    BlockState::new("white_terracotta", SOLID),
    BlockState::new("orange_terracotta", SOLID),
    BlockState::new("yellow_terracotta", SOLID),
    BlockState::new("brown_terracotta", SOLID),
    BlockState::new("red_terracotta", SOLID),
    BlockState::new("light_gray_terracotta", SOLID),
    BlockState::new("copper_ore", SOLID),
    BlockState::new("deepslate_copper_ore", SOLID),
    BlockState::new("raw_copper_block", SOLID),
    BlockState::new("granite", SOLID),
    BlockState::new("iron_ore", SOLID),
    BlockState::new("deepslate_iron_ore", SOLID),
    BlockState::new("raw_iron_block", SOLID),
    BlockState::new("tuff", SOLID),
    BlockState::new("oak_leaves", BlockFlags::BLOCKS_MOTION.union(BlockFlags::LEAVES)),
];

/// Ids of the default state of every known block.
#[allow(missing_docs)]
pub mod vanilla {
    use steel_utils::BlockStateId;

    pub const AIR: BlockStateId = BlockStateId(0);
    pub const STONE: BlockStateId = BlockStateId(1);
    pub const DEEPSLATE: BlockStateId = BlockStateId(2);
    pub const BEDROCK: BlockStateId = BlockStateId(3);
    pub const WATER: BlockStateId = BlockStateId(4);
    pub const LAVA: BlockStateId = BlockStateId(5);
    pub const GRASS_BLOCK: BlockStateId = BlockStateId(6);
    pub const DIRT: BlockStateId = BlockStateId(7);
    pub const COARSE_DIRT: BlockStateId = BlockStateId(8);
    pub const PODZOL: BlockStateId = BlockStateId(9);
    pub const MYCELIUM: BlockStateId = BlockStateId(10);
    pub const MUD: BlockStateId = BlockStateId(11);
    pub const SAND: BlockStateId = BlockStateId(12);
    pub const RED_SAND: BlockStateId = BlockStateId(13);
    pub const SANDSTONE: BlockStateId = BlockStateId(14);
    pub const RED_SANDSTONE: BlockStateId = BlockStateId(15);
    pub const GRAVEL: BlockStateId = BlockStateId(16);
    pub const CLAY: BlockStateId = BlockStateId(17);
    pub const CALCITE: BlockStateId = BlockStateId(18);
    pub const SNOW_BLOCK: BlockStateId = BlockStateId(19);
    pub const POWDER_SNOW: BlockStateId = BlockStateId(20);
    pub const ICE: BlockStateId = BlockStateId(21);
    pub const PACKED_ICE: BlockStateId = BlockStateId(22);
    pub const TERRACOTTA: BlockStateId = BlockStateId(23);
    pub const WHITE_TERRACOTTA: BlockStateId = BlockStateId(24);
    pub const ORANGE_TERRACOTTA: BlockStateId = BlockStateId(25);
    pub const YELLOW_TERRACOTTA: BlockStateId = BlockStateId(26);
    pub const BROWN_TERRACOTTA: BlockStateId = BlockStateId(27);
    pub const RED_TERRACOTTA: BlockStateId = BlockStateId(28);
    pub const LIGHT_GRAY_TERRACOTTA: BlockStateId = BlockStateId(29);
    pub const COPPER_ORE: BlockStateId = BlockStateId(30);
    pub const DEEPSLATE_COPPER_ORE: BlockStateId = BlockStateId(31);
    pub const RAW_COPPER_BLOCK: BlockStateId = BlockStateId(32);
    pub const GRANITE: BlockStateId = BlockStateId(33);
    pub const IRON_ORE: BlockStateId = BlockStateId(34);
    pub const DEEPSLATE_IRON_ORE: BlockStateId = BlockStateId(35);
    pub const RAW_IRON_BLOCK: BlockStateId = BlockStateId(36);
    pub const TUFF: BlockStateId = BlockStateId(37);
    pub const OAK_LEAVES: BlockStateId = BlockStateId(38);
}

static BY_NAME: LazyLock<FxHashMap<ResourceLocation, BlockStateId>> = LazyLock::new(|| {
    BLOCK_STATES
        .iter()
        .enumerate()
        .map(|(id, state)| (state.key.clone(), BlockStateId(id as u16)))
        .collect()
});

/// The table entry for `id`. Unknown ids read as air.
#[must_use]
pub fn state(id: BlockStateId) -> &'static BlockState {
    BLOCK_STATES
        .get(usize::from(id.0))
        .unwrap_or(&BLOCK_STATES[0])
}

/// Looks up the default state of the block named `key`.
pub fn by_name(key: &ResourceLocation) -> Result<BlockStateId, WorldgenError> {
    BY_NAME
        .get(key)
        .copied()
        .ok_or_else(|| WorldgenError::UnknownBlock(key.clone()))
}

/// Number of known block states.
#[must_use]
pub fn count() -> usize {
    BLOCK_STATES.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_to_table_ids() {
        let key: ResourceLocation = "minecraft:deepslate_iron_ore".parse().expect("valid key");
        assert_eq!(by_name(&key).expect("known block"), vanilla::DEEPSLATE_IRON_ORE);
        let bare: ResourceLocation = "grass_block".parse().expect("valid key");
        assert_eq!(by_name(&bare).expect("known block"), vanilla::GRASS_BLOCK);
    }

    #[test]
    fn unknown_names_fail() {
        let key: ResourceLocation = "minecraft:netherite_block".parse().expect("valid key");
        assert!(matches!(by_name(&key), Err(WorldgenError::UnknownBlock(_))));
    }

    #[test]
    fn flags_match_block_kinds() {
        assert!(state(vanilla::AIR).is_air());
        assert!(state(vanilla::WATER).has_fluid());
        assert!(!state(vanilla::WATER).blocks_motion());
        assert!(state(vanilla::OAK_LEAVES).is_leaves());
        assert!(state(vanilla::STONE).blocks_motion());
        assert!(state(BlockStateId(9999)).is_air());
    }

    #[test]
    fn constants_follow_table_order() {
        for (id, entry) in BLOCK_STATES.iter().enumerate() {
            assert_eq!(by_name(&entry.key).expect("listed"), BlockStateId(id as u16));
        }
        assert_eq!(count(), 39);
    }
}
