//! Octaves of 2D simplex noise, used by biome temperature and the surface
//! decorations (badlands pillars, icebergs).

use crate::random::{Random, RandomSource, legacy_random::LegacyRandom};

use super::SimplexNoise;

/// Stacked 2D simplex octaves.
///
/// Octave `0` is the base frequency, negative octaves are lower frequencies.
/// Levels are stored from the highest frequency to the lowest.
pub struct PerlinSimplexNoise {
    noise_levels: Vec<Option<SimplexNoise>>,
    highest_freq_value_factor: f64,
    highest_freq_input_factor: f64,
}

impl PerlinSimplexNoise {
    /// Builds the octaves from `random`. An empty octave list yields a noise that
    /// always samples zero.
    pub fn new(random: &mut RandomSource, octaves: &[i32]) -> Self {
        let low = octaves.iter().copied().min().unwrap_or(0);
        let high = octaves.iter().copied().max().unwrap_or(0);
        let total = (high - low + 1).max(1);
        let contains = |octave: i32| octaves.contains(&octave);

        let mut noise_levels: Vec<Option<SimplexNoise>> =
            (0..total).map(|_| None).collect();

        // Level `high` is octave zero; level `m` holds octave `high - m`.
        let zero = SimplexNoise::new(random);
        let zero_index = high;

        for m in (zero_index + 1)..total {
            if m >= 0 && contains(zero_index - m) {
                noise_levels[m as usize] = Some(SimplexNoise::new(random));
            } else {
                random.consume_count(262);
            }
        }

        if high > 0 {
            // Higher octaves come from a legacy generator seeded off the zero octave.
            let [xo, yo, zo] = zero.origin();
            let seed = (zero.get_value_3d(xo, yo, zo)
                * f64::from(9.223_372E18_f32)) as i64;
            let mut upper = RandomSource::Legacy(LegacyRandom::from_seed(seed as u64));
            for o in (0..zero_index).rev() {
                if o < total && contains(zero_index - o) {
                    noise_levels[o as usize] = Some(SimplexNoise::new(&mut upper));
                } else {
                    upper.consume_count(262);
                }
            }
        }

        if zero_index >= 0 && zero_index < total && contains(0) {
            noise_levels[zero_index as usize] = Some(zero);
        }

        Self {
            noise_levels,
            highest_freq_value_factor: 1.0 / (2.0_f64.powi(total) - 1.0),
            highest_freq_input_factor: 2.0_f64.powi(high),
        }
    }

    /// Samples the octaves at `(x, y)`. With `use_offsets` each octave is shifted
    /// by its own origin.
    #[must_use]
    pub fn get_value(&self, x: f64, y: f64, use_offsets: bool) -> f64 {
        let mut value = 0.0;
        let mut input_factor = self.highest_freq_input_factor;
        let mut value_factor = self.highest_freq_value_factor;

        for noise in &self.noise_levels {
            if let Some(noise) = noise {
                let (ox, oy) = if use_offsets {
                    let [xo, yo, _] = noise.origin();
                    (xo, yo)
                } else {
                    (0.0, 0.0)
                };
                value += noise.get_value_2d(x * input_factor + ox, y * input_factor + oy)
                    * value_factor;
            }
            input_factor /= 2.0;
            value_factor *= 2.0;
        }

        value
    }
}
