//! Dimension generation settings: vertical bounds, cell size, default blocks
//! and the noise router.

use steel_utils::{
    BlockStateId, WorldgenError,
    density::DensityGraph,
    noise::NoiseParameterRegistry,
    noise_router::{
        NoiseRouter, OverworldPreset,
        data,
    },
};

use crate::{
    blocks::vanilla::{STONE, WATER},
    chunk::height_accessor::LevelHeightAccessor,
    surface::{RuleSource, data as surface_data},
};

/// Vertical bounds and cell size of the noise grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseSettings {
    /// Lowest y of the noise grid.
    pub min_y: i32,
    /// Height of the noise grid in blocks.
    pub height: i32,
    /// Cell width in quarts.
    pub size_horizontal: i32,
    /// Cell height in quarts.
    pub size_vertical: i32,
}

impl NoiseSettings {
    /// The overworld grid: 384 blocks from -64, cells 4 wide and 8 tall.
    pub const OVERWORLD: Self = Self {
        min_y: -64,
        height: 384,
        size_horizontal: 1,
        size_vertical: 2,
    };

    /// Cell width in blocks.
    #[must_use]
    pub const fn cell_width(&self) -> i32 {
        self.size_horizontal << 2
    }

    /// Cell height in blocks.
    #[must_use]
    pub const fn cell_height(&self) -> i32 {
        self.size_vertical << 2
    }

    /// The overlap of these bounds with `accessor`.
    #[must_use]
    pub fn clamp_to_height_accessor(&self, accessor: &impl LevelHeightAccessor) -> Self {
        let min_y = self.min_y.max(accessor.min_y());
        let max_y = (self.min_y + self.height).min(accessor.max_y() + 1);
        Self {
            min_y,
            height: max_y - min_y,
            ..*self
        }
    }
}

/// Everything a noise-based generator needs to know about a dimension.
#[derive(Debug, Clone)]
pub struct NoiseGeneratorSettings {
    /// The noise grid.
    pub noise: NoiseSettings,
    /// Solid block placed where density is positive.
    pub default_block: BlockStateId,
    /// Fluid filling open space below sea level.
    pub default_fluid: BlockStateId,
    /// Unseeded density graph the router points into.
    pub graph: DensityGraph,
    /// Roots into `graph`.
    pub noise_router: NoiseRouter,
    /// Surface rules of the dimension.
    pub surface_rule: RuleSource,
    /// Top of the default fluid.
    pub sea_level: i32,
    /// Fills caves and oceans from the aquifer noises.
    pub aquifers_enabled: bool,
    /// Places copper and iron veins.
    pub ore_veins_enabled: bool,
    /// Seeds noises from the Java LCG instead of xoroshiro.
    pub use_legacy_random_source: bool,
}

impl NoiseGeneratorSettings {
    /// The vanilla overworld settings for `preset`.
    pub fn overworld(preset: OverworldPreset) -> Result<Self, WorldgenError> {
        let mut registry = data::bootstrap(NoiseParameterRegistry::vanilla())?;
        let noise_router = data::overworld(&mut registry, preset)?;
        Ok(Self {
            noise: NoiseSettings::OVERWORLD,
            default_block: STONE,
            default_fluid: WATER,
            graph: registry.graph().clone(),
            noise_router,
            surface_rule: surface_data::overworld(),
            sea_level: 63,
            aquifers_enabled: true,
            ore_veins_enabled: true,
            use_legacy_random_source: false,
        })
    }
}
