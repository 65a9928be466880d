//! Two offset octave fields averaged into one roughly normal distribution.

// Noise code uses mathematical single-letter variables (x, y, z, i, j, k)
#![allow(clippy::many_single_char_names)]

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

use super::PerlinNoise;

/// The second field is sampled at slightly stretched coordinates.
const INPUT_FACTOR: f64 = 1.018_126_888_217_522_7;

/// Target deviation of the combined output is `1/3`, halved for the sum of two fields.
const VALUE_FACTOR_NUMERATOR: f64 = 0.166_666_666_666_666_66;

/// Octave layout of a named noise, as found in `worldgen/noise/*.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoiseParameters {
    /// The first (lowest frequency) octave.
    pub first_octave: i32,
    /// Amplitude per octave, starting at `first_octave`.
    pub amplitudes: Vec<f64>,
}

impl NoiseParameters {
    /// Creates parameters from an octave offset and amplitudes.
    #[must_use]
    pub fn new(first_octave: i32, amplitudes: Vec<f64>) -> Self {
        Self {
            first_octave,
            amplitudes,
        }
    }

    /// Shorthand mirroring the registry bootstrap: one mandatory amplitude and the rest.
    #[must_use]
    pub fn with_amplitudes(first_octave: i32, first_amplitude: f64, rest: &[f64]) -> Self {
        let mut amplitudes = vec![first_amplitude];
        amplitudes.extend_from_slice(rest);
        Self {
            first_octave,
            amplitudes,
        }
    }
}

/// Normal noise: the sum of two independently seeded [`PerlinNoise`] fields.
pub struct NormalNoise {
    first: PerlinNoise,
    second: PerlinNoise,
    value_factor: f64,
    max_value: f64,
    parameters: NoiseParameters,
}

impl NormalNoise {
    /// Builds both fields from `random`, one after the other.
    pub fn create(random: &mut RandomSource, parameters: NoiseParameters) -> Self {
        let first = PerlinNoise::create(random, parameters.first_octave, &parameters.amplitudes);
        let second = PerlinNoise::create(random, parameters.first_octave, &parameters.amplitudes);
        Self::new_internal(first, second, parameters)
    }

    /// Legacy nether biome variant. Octaves are drawn straight from `random`.
    pub fn create_legacy_nether_biome(
        random: &mut RandomSource,
        parameters: NoiseParameters,
    ) -> Self {
        let first = PerlinNoise::create_legacy_for_legacy_nether_biome(
            random,
            parameters.first_octave,
            &parameters.amplitudes,
        );
        let second = PerlinNoise::create_legacy_for_legacy_nether_biome(
            random,
            parameters.first_octave,
            &parameters.amplitudes,
        );
        Self::new_internal(first, second, parameters)
    }

    fn new_internal(first: PerlinNoise, second: PerlinNoise, parameters: NoiseParameters) -> Self {
        let active = parameters
            .amplitudes
            .iter()
            .enumerate()
            .filter(|(_, amplitude)| **amplitude != 0.0)
            .map(|(i, _)| i as i32);
        let (min_octave, max_octave) = active.fold((i32::MAX, i32::MIN), |(lo, hi), i| {
            (lo.min(i), hi.max(i))
        });

        let value_factor =
            VALUE_FACTOR_NUMERATOR / expected_deviation(max_octave.wrapping_sub(min_octave));
        let max_value = (first.max_value() + second.max_value()) * value_factor;

        Self {
            first,
            second,
            value_factor,
            max_value,
            parameters,
        }
    }

    /// Samples the noise at `(x, y, z)`.
    #[must_use]
    pub fn get_value(&self, x: f64, y: f64, z: f64) -> f64 {
        let d = x * INPUT_FACTOR;
        let e = y * INPUT_FACTOR;
        let f = z * INPUT_FACTOR;

        (self.first.get_value(x, y, z) + self.second.get_value(d, e, f)) * self.value_factor
    }

    /// Upper bound on the absolute value of a sample.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    /// The parameters the noise was built from.
    #[must_use]
    pub fn parameters(&self) -> &NoiseParameters {
        &self.parameters
    }
}

fn expected_deviation(octaves: i32) -> f64 {
    0.1 * (1.0 + 1.0 / f64::from(octaves + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::xoroshiro::Xoroshiro;

    fn source(seed: u64) -> RandomSource {
        RandomSource::Xoroshiro(Xoroshiro::from_seed(seed))
    }

    #[test]
    fn same_seed_same_field() {
        let params = NoiseParameters::new(-4, vec![1.0, 1.0, 1.0, 1.0]);
        let noise1 = NormalNoise::create(&mut source(12345), params.clone());
        let noise2 = NormalNoise::create(&mut source(12345), params);

        for (x, y, z) in [(0.5, 0.5, 0.5), (-120.25, 64.0, 999.5)] {
            assert_eq!(
                noise1.get_value(x, y, z).to_bits(),
                noise2.get_value(x, y, z).to_bits()
            );
        }
    }

    #[test]
    fn output_stays_within_max_value() {
        let noise = NormalNoise::create(
            &mut source(7),
            NoiseParameters::with_amplitudes(-7, 1.0, &[1.0, 0.0, 2.0]),
        );
        for i in 0..200 {
            let p = f64::from(i) * 13.37;
            let v = noise.get_value(p, -p * 0.5, p * 2.0);
            assert!(v.abs() <= noise.max_value(), "{v} exceeds {}", noise.max_value());
        }
    }

    #[test]
    fn test_expected_deviation() {
        assert!((expected_deviation(0) - 0.2).abs() < 1e-10);
        assert!((expected_deviation(1) - 0.15).abs() < 1e-10);
        assert!((expected_deviation(3) - 0.125).abs() < 1e-10);
    }

    #[test]
    fn parameters_deserialize_from_registry_json() {
        let params: NoiseParameters =
            serde_json::from_str(r#"{"firstOctave": -9, "amplitudes": [1.5, 0.0, 1.0]}"#)
                .expect("valid noise json");
        assert_eq!(params, NoiseParameters::new(-9, vec![1.5, 0.0, 1.0]));
    }
}
