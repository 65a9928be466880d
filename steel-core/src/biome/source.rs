//! Where a chunk's biomes come from.

use std::sync::Arc;

use serde::Deserialize;
use steel_utils::{ResourceLocation, WorldgenError};

use super::{
    BiomeRef, by_key,
    climate::{ClimateSampler, ParameterList, ParameterPoint},
    overworld::OverworldBiomeBuilder,
};

/// Picks the biome of a quart position.
#[derive(Debug, Clone)]
pub enum BiomeSource {
    /// One biome everywhere.
    Fixed(BiomeRef),
    /// The biome whose climate region is closest to the sampled climate.
    MultiNoise(Arc<ParameterList<BiomeRef>>),
}

#[derive(Deserialize)]
struct MultiNoiseEntry {
    biome: ResourceLocation,
    parameters: ParameterPoint,
}

#[derive(Deserialize)]
struct MultiNoiseDefinition {
    biomes: Vec<MultiNoiseEntry>,
}

impl BiomeSource {
    /// The vanilla overworld multi-noise source.
    #[must_use]
    pub fn overworld() -> Self {
        Self::MultiNoise(Arc::new(OverworldBiomeBuilder::new().build()))
    }

    /// Parses a data-pack multi-noise source:
    /// `{"biomes": [{"biome": "minecraft:plains", "parameters": {...}}]}`.
    pub fn from_json(json: &str) -> Result<Self, WorldgenError> {
        let definition: MultiNoiseDefinition = serde_json::from_str(json)
            .map_err(|err| WorldgenError::InvalidDefinition(err.to_string()))?;
        if definition.biomes.is_empty() {
            return Err(WorldgenError::InvalidDefinition(
                "multi-noise source without biomes".to_owned(),
            ));
        }
        let values = definition
            .biomes
            .into_iter()
            .map(|entry| Ok((entry.parameters, by_key(&entry.biome)?)))
            .collect::<Result<Vec<_>, WorldgenError>>()?;
        Ok(Self::MultiNoise(Arc::new(ParameterList::new(values))))
    }

    /// The biome at a quart position.
    #[must_use]
    pub fn get_noise_biome(
        &self,
        quart_x: i32,
        quart_y: i32,
        quart_z: i32,
        sampler: &ClimateSampler,
    ) -> BiomeRef {
        match self {
            Self::Fixed(biome) => biome,
            Self::MultiNoise(parameters) => {
                parameters.find_value(&sampler.sample(quart_x, quart_y, quart_z))
            }
        }
    }

    /// Every biome this source can return.
    #[must_use]
    pub fn possible_biomes(&self) -> Vec<BiomeRef> {
        match self {
            Self::Fixed(biome) => vec![*biome],
            Self::MultiNoise(parameters) => {
                let mut biomes: Vec<BiomeRef> =
                    parameters.values().iter().map(|(_, biome)| *biome).collect();
                biomes.sort_by_key(|biome| biome.id);
                biomes.dedup_by_key(|biome| biome.id);
                biomes
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::vanilla;

    #[test]
    fn parses_a_data_pack_source() {
        let source = BiomeSource::from_json(
            r#"{"biomes": [
                {"biome": "minecraft:desert", "parameters": {"temperature": [0.55, 1.0], "humidity": 0.0,
                 "continentalness": 0.0, "erosion": 0.0, "depth": 0.0, "weirdness": 0.0, "offset": 0.0}},
                {"biome": "minecraft:snowy_plains", "parameters": {"temperature": [-1.0, -0.45], "humidity": 0.0,
                 "continentalness": 0.0, "erosion": 0.0, "depth": 0.0, "weirdness": 0.0, "offset": 0.0}}
            ]}"#,
        )
        .expect("valid source");
        let biomes = source.possible_biomes();
        assert_eq!(biomes.len(), 2);
        assert!(biomes[0].is(&vanilla::DESERT));
        assert!(biomes[1].is(&vanilla::SNOWY_PLAINS));
    }

    #[test]
    fn unknown_biomes_fail() {
        let result = BiomeSource::from_json(
            r#"{"biomes": [{"biome": "minecraft:basalt_deltas", "parameters": {"temperature": 0.0,
                "humidity": 0.0, "continentalness": 0.0, "erosion": 0.0, "depth": 0.0,
                "weirdness": 0.0, "offset": 0.0}}]}"#,
        );
        assert!(matches!(result, Err(WorldgenError::UnknownBiome(_))));
        assert!(BiomeSource::from_json(r#"{"biomes": []}"#).is_err());
    }

    #[test]
    fn overworld_reaches_the_cave_biomes() {
        let biomes = BiomeSource::overworld().possible_biomes();
        for cave in [&vanilla::LUSH_CAVES, &vanilla::DRIPSTONE_CAVES, &vanilla::DEEP_DARK] {
            assert!(biomes.iter().any(|biome| biome.is(cave)), "{}", cave.key);
        }
        assert_eq!(biomes.len(), vanilla::ALL.len());
    }
}
