//! Seeded noise samplers.
//!
//! Every sampler reproduces the game's output bit for bit for the same seed, so
//! constants and operation order here are load-bearing.

mod blended_noise;
mod improved_noise;
mod lattice;
mod math;
mod normal_noise;
mod perlin_noise;
mod perlin_simplex_noise;
mod registry;
mod simplex_noise;

pub use blended_noise::BlendedNoise;
pub use improved_noise::ImprovedNoise;
pub use math::{
    binary_search, ceil_log2, clamp, clamped_lerp, clamped_map, floor, floor_div, floor_mod,
    inverse_lerp, inverse_lerp_f32, lerp, lerp_f32, lerp2, lerp3, lfloor, map,
    smallest_encompassing_power_of_two, smoothstep,
};
pub use normal_noise::{NoiseParameters, NormalNoise};
pub use perlin_noise::{PerlinNoise, wrap};
pub use perlin_simplex_noise::PerlinSimplexNoise;
pub use registry::NoiseParameterRegistry;
pub use simplex_noise::SimplexNoise;
