//! Named noise parameters.

use rustc_hash::FxHashMap;

use crate::{error::WorldgenError, types::ResourceLocation};

use super::NoiseParameters;

/// Octave layouts keyed by noise name.
#[derive(Debug, Clone, Default)]
pub struct NoiseParameterRegistry {
    entries: FxHashMap<ResourceLocation, NoiseParameters>,
}

impl NoiseParameterRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces `key`.
    pub fn register(&mut self, key: ResourceLocation, parameters: NoiseParameters) {
        self.entries.insert(key, parameters);
    }

    /// Looks up `key`, failing when it was never registered.
    pub fn get(&self, key: &ResourceLocation) -> Result<&NoiseParameters, WorldgenError> {
        self.entries
            .get(key)
            .ok_or_else(|| WorldgenError::MissingNoise(key.clone()))
    }

    /// Whether `key` is registered.
    #[must_use]
    pub fn contains(&self, key: &ResourceLocation) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of registered noises.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The overworld noises shipped with the game.
    #[must_use]
    pub fn vanilla() -> Self {
        let mut registry = Self::new();
        for (path, first_octave, amplitudes) in VANILLA_NOISES {
            registry.register(
                ResourceLocation::vanilla_static(path),
                NoiseParameters::new(*first_octave, amplitudes.to_vec()),
            );
        }
        registry
    }
}

const ONE: &[f64] = &[1.0];
const FOUR_ONES: &[f64] = &[1.0, 1.0, 1.0, 1.0];
const THREE_ONES: &[f64] = &[1.0, 1.0, 1.0];

#[rustfmt::skip]
const VANILLA_NOISES: &[(&str, i32, &[f64])] = &[
    ("temperature", -10, &[1.5, 0.0, 1.0, 0.0, 0.0, 0.0]),
    ("vegetation", -8, &[1.0, 1.0, 0.0, 0.0, 0.0, 0.0]),
    ("continentalness", -9, &[1.0, 1.0, 2.0, 2.0, 2.0, 1.0, 1.0, 1.0, 1.0]),
    ("erosion", -9, &[1.0, 1.0, 0.0, 1.0, 1.0]),
    ("temperature_large", -12, &[1.5, 0.0, 1.0, 0.0, 0.0, 0.0]),
    ("vegetation_large", -10, &[1.0, 1.0, 0.0, 0.0, 0.0, 0.0]),
    ("continentalness_large", -11, &[1.0, 1.0, 2.0, 2.0, 2.0, 1.0, 1.0, 1.0, 1.0]),
    ("erosion_large", -11, &[1.0, 1.0, 0.0, 1.0, 1.0]),
    ("ridge", -7, &[1.0, 2.0, 1.0, 0.0, 0.0, 0.0]),
    ("offset", -3, &[1.0, 1.0, 1.0, 0.0]),
    ("aquifer_barrier", -3, ONE),
    ("aquifer_fluid_level_floodedness", -7, ONE),
    ("aquifer_lava", -1, ONE),
    ("aquifer_fluid_level_spread", -5, ONE),
    ("pillar", -7, &[1.0, 1.0]),
    ("pillar_rareness", -8, ONE),
    ("pillar_thickness", -8, ONE),
    ("spaghetti_2d", -7, ONE),
    ("spaghetti_2d_elevation", -8, ONE),
    ("spaghetti_2d_modulator", -11, ONE),
    ("spaghetti_2d_thickness", -11, ONE),
    ("spaghetti_3d_1", -7, ONE),
    ("spaghetti_3d_2", -7, ONE),
    ("spaghetti_3d_rarity", -11, ONE),
    ("spaghetti_3d_thickness", -8, ONE),
    ("spaghetti_roughness", -5, ONE),
    ("spaghetti_roughness_modulator", -8, ONE),
    ("cave_entrance", -7, &[0.4, 0.5, 1.0]),
    ("cave_layer", -8, ONE),
    ("cave_cheese", -8, &[0.5, 1.0, 2.0, 1.0, 2.0, 1.0, 0.0, 2.0, 0.0]),
    ("ore_veininess", -8, ONE),
    ("ore_vein_a", -7, ONE),
    ("ore_vein_b", -7, ONE),
    ("ore_gap", -5, ONE),
    ("noodle", -8, ONE),
    ("noodle_thickness", -8, ONE),
    ("noodle_ridge_a", -7, ONE),
    ("noodle_ridge_b", -7, ONE),
    ("jagged", -16, &[1.0; 16]),
    ("surface", -6, THREE_ONES),
    ("surface_secondary", -6, &[1.0, 1.0, 0.0, 1.0]),
    ("clay_bands_offset", -8, ONE),
    ("badlands_pillar", -2, FOUR_ONES),
    ("badlands_pillar_roof", -8, ONE),
    ("badlands_surface", -6, THREE_ONES),
    ("iceberg_pillar", -6, FOUR_ONES),
    ("iceberg_pillar_roof", -3, ONE),
    ("iceberg_surface", -6, THREE_ONES),
    ("surface_swamp", -2, ONE),
    ("calcite", -9, FOUR_ONES),
    ("gravel", -8, FOUR_ONES),
    ("powder_snow", -6, FOUR_ONES),
    ("packed_ice", -7, FOUR_ONES),
    ("ice", -4, FOUR_ONES),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vanilla_registry_has_router_noises() {
        let registry = NoiseParameterRegistry::vanilla();
        let continentalness = registry
            .get(&ResourceLocation::vanilla_static("continentalness"))
            .expect("registered");
        assert_eq!(continentalness.first_octave, -9);
        assert_eq!(continentalness.amplitudes.len(), 9);
        assert_eq!(
            registry
                .get(&ResourceLocation::vanilla_static("jagged"))
                .expect("registered")
                .amplitudes
                .len(),
            16
        );
    }

    #[test]
    fn missing_noise_fails() {
        let registry = NoiseParameterRegistry::vanilla();
        let err = registry
            .get(&ResourceLocation::vanilla_static("does_not_exist"))
            .unwrap_err();
        assert!(matches!(err, WorldgenError::MissingNoise(_)));
    }
}
