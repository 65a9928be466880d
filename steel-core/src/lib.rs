//! # Steel Core
//!
//! Seeded terrain generation for the overworld: world random state, biome
//! placement, chunk filling, surface rules and heightmaps.
#![allow(clippy::module_name_repetitions)]

pub mod biome;
pub mod blocks;
pub mod chunk;
pub mod config;
pub mod random_state;
pub mod settings;
pub mod surface;

pub use random_state::RandomState;
pub use settings::NoiseGeneratorSettings;
