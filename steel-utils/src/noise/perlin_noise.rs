//! Multi-octave Perlin noise.
//!
//! Octaves are stored from the lowest frequency to the highest. The modern
//! constructor seeds every octave from a named positional stream, the legacy one
//! draws them one after another from a single generator.

// Noise code uses mathematical single-letter variables (x, y, z, i, j, k)
#![allow(clippy::many_single_char_names)]

use crate::random::{PositionalRandom, Random, RandomSource};

use super::{ImprovedNoise, lfloor};

/// Vanilla uses `3.3554432E7F` cast to double.
const ROUND_OFF: f64 = 3.355_443_2E7;

/// Wraps a coordinate to keep large worlds away from precision loss:
/// `x - lfloor(x / 3.3554432E7 + 0.5) * 3.3554432E7`.
#[inline]
#[must_use]
pub fn wrap(value: f64) -> f64 {
    value - (lfloor(value / ROUND_OFF + 0.5) as f64) * ROUND_OFF
}

/// Multi-octave Perlin noise generator.
pub struct PerlinNoise {
    /// One sampler per octave, `None` where the amplitude is zero.
    noise_levels: Vec<Option<ImprovedNoise>>,
    first_octave: i32,
    amplitudes: Vec<f64>,
    lowest_freq_input_factor: f64,
    lowest_freq_value_factor: f64,
    max_value: f64,
}

impl PerlinNoise {
    /// Creates octaves from a positional stream forked off `random`, each seeded
    /// by the name `octave_<n>`.
    pub fn create(random: &mut RandomSource, first_octave: i32, amplitudes: &[f64]) -> Self {
        let positional = random.next_positional();

        let noise_levels = amplitudes
            .iter()
            .enumerate()
            .map(|(i, &amplitude)| {
                (amplitude != 0.0).then(|| {
                    let octave = first_octave + i as i32;
                    ImprovedNoise::new(&mut positional.with_hash_of(&format!("octave_{octave}")))
                })
            })
            .collect();

        Self::new_internal(noise_levels, first_octave, amplitudes.to_vec())
    }

    /// Creates the sixteen or eight octave fields used by blended terrain noise.
    /// `octaves` must be non-empty and must not contain positive octaves.
    pub fn create_legacy_for_blended_noise(random: &mut RandomSource, octaves: &[i32]) -> Self {
        let low = octaves.iter().copied().min().unwrap_or(0);
        let high = octaves.iter().copied().max().unwrap_or(0);
        let low_freq_octaves = -low;
        let total_octaves = (low_freq_octaves + high + 1) as usize;

        let mut amplitudes = vec![0.0; total_octaves];
        for &octave in octaves {
            amplitudes[(octave + low_freq_octaves) as usize] = 1.0;
        }

        Self::create_legacy_internal(random, -low_freq_octaves, amplitudes)
    }

    /// Creates octaves straight from `random`, the way legacy nether biome noise does.
    pub fn create_legacy_for_legacy_nether_biome(
        random: &mut RandomSource,
        first_octave: i32,
        amplitudes: &[f64],
    ) -> Self {
        Self::create_legacy_internal(random, first_octave, amplitudes.to_vec())
    }

    fn create_legacy_internal(
        random: &mut RandomSource,
        first_octave: i32,
        amplitudes: Vec<f64>,
    ) -> Self {
        let octave_count = amplitudes.len();
        let zero_octave_index = (-first_octave) as usize;
        debug_assert!(
            zero_octave_index + 1 >= octave_count,
            "positive octaves are not supported"
        );

        let mut noise_levels: Vec<Option<ImprovedNoise>> =
            (0..octave_count).map(|_| None).collect();

        let zero_octave = ImprovedNoise::new(random);
        if zero_octave_index < octave_count && amplitudes[zero_octave_index] != 0.0 {
            noise_levels[zero_octave_index] = Some(zero_octave);
        }

        for i in (0..zero_octave_index).rev() {
            if i < octave_count && amplitudes[i] != 0.0 {
                noise_levels[i] = Some(ImprovedNoise::new(random));
            } else {
                random.consume_count(262);
            }
        }

        Self::new_internal(noise_levels, first_octave, amplitudes)
    }

    fn new_internal(
        noise_levels: Vec<Option<ImprovedNoise>>,
        first_octave: i32,
        amplitudes: Vec<f64>,
    ) -> Self {
        let octave_count = amplitudes.len() as i32;
        let lowest_freq_input_factor = 2.0_f64.powi(first_octave);
        let lowest_freq_value_factor =
            2.0_f64.powi(octave_count - 1) / (2.0_f64.powi(octave_count) - 1.0);

        let mut result = Self {
            noise_levels,
            first_octave,
            amplitudes,
            lowest_freq_input_factor,
            lowest_freq_value_factor,
            max_value: 0.0,
        };
        result.max_value = result.edge_value(2.0);
        result
    }

    /// Samples the noise.
    #[inline]
    #[must_use]
    pub fn get_value(&self, x: f64, y: f64, z: f64) -> f64 {
        self.get_value_with_y_params(x, y, z, 0.0, 0.0, false)
    }

    /// Samples the noise with vertical smearing. With `use_fixed_y` every octave
    /// is sampled at its own y origin.
    #[inline]
    #[must_use]
    pub fn get_value_with_y_params(
        &self,
        x: f64,
        y: f64,
        z: f64,
        y_scale: f64,
        y_max: f64,
        use_fixed_y: bool,
    ) -> f64 {
        let mut value = 0.0;
        let mut input_factor = self.lowest_freq_input_factor;
        let mut value_factor = self.lowest_freq_value_factor;

        for (noise, amplitude) in self.noise_levels.iter().zip(&self.amplitudes) {
            if let Some(noise) = noise {
                let sample = noise.noise_with_y_params(
                    wrap(x * input_factor),
                    if use_fixed_y {
                        -noise.origin()[1]
                    } else {
                        wrap(y * input_factor)
                    },
                    wrap(z * input_factor),
                    y_scale * input_factor,
                    y_max * input_factor,
                );
                value += amplitude * sample * value_factor;
            }

            input_factor *= 2.0;
            value_factor /= 2.0;
        }

        value
    }

    /// Returns the sampler for an octave counted from the highest frequency.
    #[must_use]
    pub fn get_octave_noise(&self, octave: i32) -> Option<&ImprovedNoise> {
        let index = self.noise_levels.len() as i32 - 1 - octave;
        usize::try_from(index)
            .ok()
            .and_then(|index| self.noise_levels.get(index))
            .and_then(Option::as_ref)
    }

    /// Upper bound of the noise when vertical smearing of `y_multiplier` is used.
    #[must_use]
    pub fn max_broken_value(&self, y_multiplier: f64) -> f64 {
        self.edge_value(y_multiplier + 2.0)
    }

    fn edge_value(&self, multiplier: f64) -> f64 {
        let mut value = 0.0;
        let mut value_factor = self.lowest_freq_value_factor;

        for (noise, amplitude) in self.noise_levels.iter().zip(&self.amplitudes) {
            if noise.is_some() {
                value += amplitude * multiplier * value_factor;
            }
            value_factor /= 2.0;
        }

        value
    }

    /// Upper bound of [`Self::get_value`].
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    /// The first octave.
    #[must_use]
    pub fn first_octave(&self) -> i32 {
        self.first_octave
    }

    /// Per-octave amplitudes.
    #[must_use]
    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }
}
