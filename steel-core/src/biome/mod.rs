//! Overworld biomes and the climate that places them.
//!
//! Biomes are static table entries; terrain generation only reads their key
//! and temperature. [`climate`] holds the parameter space, [`source`] the
//! biome sources and [`overworld`] the builder of the vanilla parameter list.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;
use steel_utils::{
    BlockPos, ResourceLocation, WorldgenError,
    noise::PerlinSimplexNoise,
    random::{RandomSource, legacy_random::LegacyRandom},
};

pub mod climate;
pub mod overworld;
pub mod source;

pub use climate::{ClimateSampler, Parameter, ParameterList, ParameterPoint, TargetPoint};
pub use source::BiomeSource;

/// A reference to a biome of the static table.
pub type BiomeRef = &'static Biome;

/// Adjusts the base temperature by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureModifier {
    /// Uses the base temperature.
    None,
    /// Patches of warmer water in frozen oceans.
    Frozen,
}

/// A biome and the climate values surface rules read from it.
#[derive(Debug, PartialEq)]
pub struct Biome {
    /// Position in the biome table.
    pub id: u16,
    /// The biome id.
    pub key: ResourceLocation,
    /// Base temperature.
    pub temperature: f32,
    /// Positional temperature adjustment.
    pub temperature_modifier: TemperatureModifier,
}

static TEMPERATURE_NOISE: LazyLock<PerlinSimplexNoise> = LazyLock::new(|| legacy_simplex(1234, &[0]));
static FROZEN_TEMPERATURE_NOISE: LazyLock<PerlinSimplexNoise> =
    LazyLock::new(|| legacy_simplex(3456, &[-2, -1, 0]));
static BIOME_INFO_NOISE: LazyLock<PerlinSimplexNoise> = LazyLock::new(|| legacy_simplex(2345, &[0]));

fn legacy_simplex(seed: u64, octaves: &[i32]) -> PerlinSimplexNoise {
    PerlinSimplexNoise::new(&mut RandomSource::Legacy(LegacyRandom::from_seed(seed)), octaves)
}

impl TemperatureModifier {
    fn modify(self, pos: BlockPos, temperature: f32) -> f32 {
        match self {
            Self::None => temperature,
            Self::Frozen => {
                let x = f64::from(pos.x);
                let z = f64::from(pos.z);
                let frozen = FROZEN_TEMPERATURE_NOISE.get_value(x * 0.05, z * 0.05, false) * 7.0;
                let info = BIOME_INFO_NOISE.get_value(x * 0.2, z * 0.2, false);
                if frozen + info < 0.3 && BIOME_INFO_NOISE.get_value(x * 0.09, z * 0.09, false) < 0.8 {
                    0.2
                } else {
                    temperature
                }
            }
        }
    }
}

impl Biome {
    const fn new(id: u16, path: &'static str, temperature: f32, modifier: TemperatureModifier) -> Self {
        Self {
            id,
            key: ResourceLocation::vanilla_static(path),
            temperature,
            temperature_modifier: modifier,
        }
    }

    /// Temperature at `pos`, cooling with height above `sea_level + 17`.
    #[must_use]
    pub fn temperature_at(&self, pos: BlockPos, sea_level: i32) -> f32 {
        let temperature = self.temperature_modifier.modify(pos, self.temperature);
        let snow_line = sea_level + 17;
        if pos.y > snow_line {
            let noise = (TEMPERATURE_NOISE.get_value(
                f64::from(pos.x as f32 / 8.0),
                f64::from(pos.z as f32 / 8.0),
                false,
            ) * 8.0) as f32;
            temperature - (noise + pos.y as f32 - snow_line as f32) * 0.05 / 40.0
        } else {
            temperature
        }
    }

    /// Whether precipitation falls as snow at `pos`.
    #[must_use]
    pub fn cold_enough_to_snow(&self, pos: BlockPos, sea_level: i32) -> bool {
        self.temperature_at(pos, sea_level) < 0.15
    }

    /// Whether an iceberg at `pos` is warm enough to thin out.
    #[must_use]
    pub fn should_melt_frozen_ocean_iceberg_slightly(&self, pos: BlockPos, sea_level: i32) -> bool {
        self.temperature_at(pos, sea_level) > 0.1
    }

    /// Whether both refer to the same biome.
    #[must_use]
    pub fn is(&self, other: BiomeRef) -> bool {
        self.id == other.id
    }

    /// Whether this is one of `others`.
    #[must_use]
    pub fn is_any(&self, others: &[BiomeRef]) -> bool {
        others.iter().any(|other| self.is(other))
    }
}

macro_rules! biomes {
    ($($name:ident = $id:literal, $path:literal, $temperature:literal $(, $modifier:ident)?;)*) => {
        /// The overworld biomes.
        #[allow(missing_docs)]
        pub mod vanilla {
            use super::{Biome, TemperatureModifier};

            $(
                pub static $name: Biome = Biome::new(
                    $id,
                    $path,
                    $temperature,
                    biomes!(@modifier $($modifier)?),
                );
            )*

            /// Every biome, indexed by id.
            pub static ALL: &[&Biome] = &[$(&$name),*];
        }
    };
    (@modifier) => { TemperatureModifier::None };
    (@modifier $modifier:ident) => { TemperatureModifier::$modifier };
}

biomes! {
    PLAINS = 0, "plains", 0.8;
    SUNFLOWER_PLAINS = 1, "sunflower_plains", 0.8;
    SNOWY_PLAINS = 2, "snowy_plains", 0.0;
    ICE_SPIKES = 3, "ice_spikes", 0.0;
    DESERT = 4, "desert", 2.0;
    SWAMP = 5, "swamp", 0.8;
    MANGROVE_SWAMP = 6, "mangrove_swamp", 0.8;
    FOREST = 7, "forest", 0.7;
    FLOWER_FOREST = 8, "flower_forest", 0.7;
    BIRCH_FOREST = 9, "birch_forest", 0.6;
    DARK_FOREST = 10, "dark_forest", 0.7;
    OLD_GROWTH_BIRCH_FOREST = 11, "old_growth_birch_forest", 0.6;
    OLD_GROWTH_PINE_TAIGA = 12, "old_growth_pine_taiga", 0.3;
    OLD_GROWTH_SPRUCE_TAIGA = 13, "old_growth_spruce_taiga", 0.25;
    TAIGA = 14, "taiga", 0.25;
    SNOWY_TAIGA = 15, "snowy_taiga", -0.5;
    SAVANNA = 16, "savanna", 2.0;
    SAVANNA_PLATEAU = 17, "savanna_plateau", 2.0;
    WINDSWEPT_HILLS = 18, "windswept_hills", 0.2;
    WINDSWEPT_GRAVELLY_HILLS = 19, "windswept_gravelly_hills", 0.2;
    WINDSWEPT_FOREST = 20, "windswept_forest", 0.2;
    WINDSWEPT_SAVANNA = 21, "windswept_savanna", 2.0;
    JUNGLE = 22, "jungle", 0.95;
    SPARSE_JUNGLE = 23, "sparse_jungle", 0.95;
    BAMBOO_JUNGLE = 24, "bamboo_jungle", 0.95;
    BADLANDS = 25, "badlands", 2.0;
    ERODED_BADLANDS = 26, "eroded_badlands", 2.0;
    WOODED_BADLANDS = 27, "wooded_badlands", 2.0;
    MEADOW = 28, "meadow", 0.5;
    CHERRY_GROVE = 29, "cherry_grove", 0.5;
    GROVE = 30, "grove", -0.2;
    SNOWY_SLOPES = 31, "snowy_slopes", -0.3;
    FROZEN_PEAKS = 32, "frozen_peaks", -0.7;
    JAGGED_PEAKS = 33, "jagged_peaks", -0.7;
    STONY_PEAKS = 34, "stony_peaks", 1.0;
    RIVER = 35, "river", 0.5;
    FROZEN_RIVER = 36, "frozen_river", 0.0;
    BEACH = 37, "beach", 0.8;
    SNOWY_BEACH = 38, "snowy_beach", 0.05;
    STONY_SHORE = 39, "stony_shore", 0.2;
    WARM_OCEAN = 40, "warm_ocean", 0.5;
    LUKEWARM_OCEAN = 41, "lukewarm_ocean", 0.5;
    DEEP_LUKEWARM_OCEAN = 42, "deep_lukewarm_ocean", 0.5;
    OCEAN = 43, "ocean", 0.5;
    DEEP_OCEAN = 44, "deep_ocean", 0.5;
    COLD_OCEAN = 45, "cold_ocean", 0.5;
    DEEP_COLD_OCEAN = 46, "deep_cold_ocean", 0.5;
    FROZEN_OCEAN = 47, "frozen_ocean", 0.0, Frozen;
    DEEP_FROZEN_OCEAN = 48, "deep_frozen_ocean", 0.5, Frozen;
    MUSHROOM_FIELDS = 49, "mushroom_fields", 0.9;
    DRIPSTONE_CAVES = 50, "dripstone_caves", 0.8;
    LUSH_CAVES = 51, "lush_caves", 0.5;
    DEEP_DARK = 52, "deep_dark", 0.8;
}

static BY_KEY: LazyLock<FxHashMap<&'static ResourceLocation, BiomeRef>> =
    LazyLock::new(|| vanilla::ALL.iter().map(|&biome| (&biome.key, biome)).collect());

/// Looks up a biome by key.
pub fn by_key(key: &ResourceLocation) -> Result<BiomeRef, WorldgenError> {
    BY_KEY
        .get(key)
        .copied()
        .ok_or_else(|| WorldgenError::UnknownBiome(key.clone()))
}
