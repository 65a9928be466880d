//! The legacy "old blended noise" terrain field: two limit fields mixed by a
//! third selector field.

// Noise code uses mathematical single-letter variables (x, y, z, i, j, k)
#![allow(clippy::many_single_char_names)]

use crate::random::{RandomSource, xoroshiro::Xoroshiro};

use super::{PerlinNoise, clamped_lerp, perlin_noise::wrap};

/// Coordinate multiplier for terrain scale.
const XZ_MULTIPLIER_BASE: f64 = 684.412;

/// Blended noise generator for terrain density.
///
/// Combines three Perlin noise samplers (min limit, max limit, and main)
/// to create smooth terrain density values used for basic terrain shape.
pub struct BlendedNoise {
    /// Noise for minimum density limit.
    min_limit_noise: PerlinNoise,
    /// Noise for maximum density limit.
    max_limit_noise: PerlinNoise,
    /// Noise for blending between min and max limits.
    main_noise: PerlinNoise,
    /// Horizontal coordinate multiplier.
    xz_multiplier: f64,
    /// Vertical coordinate multiplier.
    y_multiplier: f64,
    /// Horizontal scale factor.
    xz_factor: f64,
    /// Vertical scale factor.
    y_factor: f64,
    /// Vertical smearing multiplier.
    smear_scale_multiplier: f64,
    /// Maximum output value.
    max_value: f64,
    /// Horizontal scale (stored for serialization).
    xz_scale: f64,
    /// Vertical scale (stored for serialization).
    y_scale: f64,
}

impl BlendedNoise {
    /// Creates the field with the octave generators drawn straight from `random`.
    pub fn new(
        random: &mut RandomSource,
        xz_scale: f64,
        y_scale: f64,
        xz_factor: f64,
        y_factor: f64,
        smear_scale_multiplier: f64,
    ) -> Self {
        let limit_octaves: Vec<i32> = (-15..=0).collect();
        let blend_octaves: Vec<i32> = (-7..=0).collect();

        let min_limit_noise = PerlinNoise::create_legacy_for_blended_noise(random, &limit_octaves);
        let max_limit_noise = PerlinNoise::create_legacy_for_blended_noise(random, &limit_octaves);
        let main_noise = PerlinNoise::create_legacy_for_blended_noise(random, &blend_octaves);

        Self::new_with_noises(
            min_limit_noise,
            max_limit_noise,
            main_noise,
            xz_scale,
            y_scale,
            xz_factor,
            y_factor,
            smear_scale_multiplier,
        )
    }

    /// Placeholder instance used before a world seed is known. Seeded with zero.
    #[must_use]
    pub fn create_unseeded(
        xz_scale: f64,
        y_scale: f64,
        xz_factor: f64,
        y_factor: f64,
        smear_scale_multiplier: f64,
    ) -> Self {
        Self::new(
            &mut RandomSource::Xoroshiro(Xoroshiro::from_seed(0)),
            xz_scale,
            y_scale,
            xz_factor,
            y_factor,
            smear_scale_multiplier,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn new_with_noises(
        min_limit_noise: PerlinNoise,
        max_limit_noise: PerlinNoise,
        main_noise: PerlinNoise,
        xz_scale: f64,
        y_scale: f64,
        xz_factor: f64,
        y_factor: f64,
        smear_scale_multiplier: f64,
    ) -> Self {
        let xz_multiplier = XZ_MULTIPLIER_BASE * xz_scale;
        let y_multiplier = XZ_MULTIPLIER_BASE * y_scale;
        let max_value = min_limit_noise.max_broken_value(y_multiplier);

        Self {
            min_limit_noise,
            max_limit_noise,
            main_noise,
            xz_multiplier,
            y_multiplier,
            xz_factor,
            y_factor,
            smear_scale_multiplier,
            max_value,
            xz_scale,
            y_scale,
        }
    }

    /// Same scales and factors, fresh octaves from `random`.
    #[must_use]
    pub fn with_new_random(&self, random: &mut RandomSource) -> Self {
        Self::new(
            random,
            self.xz_scale,
            self.y_scale,
            self.xz_factor,
            self.y_factor,
            self.smear_scale_multiplier,
        )
    }

    /// Density at a block position.
    #[must_use]
    pub fn compute(&self, block_x: i32, block_y: i32, block_z: i32) -> f64 {
        let d = f64::from(block_x) * self.xz_multiplier;
        let e = f64::from(block_y) * self.y_multiplier;
        let f = f64::from(block_z) * self.xz_multiplier;

        let g = d / self.xz_factor;
        let h = e / self.y_factor;
        let i = f / self.xz_factor;

        let j = self.y_multiplier * self.smear_scale_multiplier;
        let k = j / self.y_factor;

        let mut n = 0.0;
        let mut o = 1.0;

        for p in 0..8 {
            if let Some(improved_noise) = self.main_noise.get_octave_noise(p) {
                n += improved_noise.noise_with_y_params(
                    wrap(g * o),
                    wrap(h * o),
                    wrap(i * o),
                    k * o,
                    h * o,
                ) / o;
            }
            o /= 2.0;
        }

        let q = f64::midpoint(n / 10.0, 1.0);
        let is_max = q >= 1.0;
        let is_min = q <= 0.0;

        // A saturated selector makes one of the limit fields irrelevant.
        let mut l = 0.0;
        let mut m = 0.0;
        o = 1.0;

        for r in 0..16 {
            let s = wrap(d * o);
            let t = wrap(e * o);
            let u = wrap(f * o);
            let v = j * o;

            if !is_max && let Some(min_noise) = self.min_limit_noise.get_octave_noise(r) {
                l += min_noise.noise_with_y_params(s, t, u, v, e * o) / o;
            }

            if !is_min && let Some(max_noise) = self.max_limit_noise.get_octave_noise(r) {
                m += max_noise.noise_with_y_params(s, t, u, v, e * o) / o;
            }

            o /= 2.0;
        }

        clamped_lerp(l / 512.0, m / 512.0, q) / 128.0
    }

    /// Get the minimum value this noise can produce.
    #[must_use]
    pub fn min_value(&self) -> f64 {
        -self.max_value()
    }

    /// Get the maximum value this noise can produce.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    /// Get the horizontal scale.
    #[must_use]
    pub fn xz_scale(&self) -> f64 {
        self.xz_scale
    }

    /// Get the vertical scale.
    #[must_use]
    pub fn y_scale(&self) -> f64 {
        self.y_scale
    }

    /// Get the horizontal factor.
    #[must_use]
    pub fn xz_factor(&self) -> f64 {
        self.xz_factor
    }

    /// Get the vertical factor.
    #[must_use]
    pub fn y_factor(&self) -> f64 {
        self.y_factor
    }

    /// Get the smear scale multiplier.
    #[must_use]
    pub fn smear_scale_multiplier(&self) -> f64 {
        self.smear_scale_multiplier
    }
}
