//! Errors raised while assembling world generation data.
//!
//! All of these are configuration problems. They surface while a world is being
//! set up, never while a chunk is generating.

use thiserror::Error;

use crate::types::ResourceLocation;

/// A world generation configuration error.
#[derive(Error, Debug)]
pub enum WorldgenError {
    /// A density function key is not registered.
    #[error("Unknown density function {0}")]
    MissingDensityFunction(ResourceLocation),
    /// A noise key has no parameters.
    #[error("Unknown noise {0}")]
    MissingNoise(ResourceLocation),
    /// Spline points were added out of order.
    #[error("Spline points must be in ascending order: {location} follows {previous}")]
    UnorderedSplinePoints {
        /// The offending location.
        location: f32,
        /// The location registered before it.
        previous: f32,
    },
    /// A spline was built without points.
    #[error("A spline needs at least one point")]
    EmptySpline,
    /// A block name does not match any known block.
    #[error("Unknown block {0}")]
    UnknownBlock(ResourceLocation),
    /// A biome key does not match any known biome.
    #[error("Unknown biome {0}")]
    UnknownBiome(ResourceLocation),
    /// A data-driven definition could not be turned into a function.
    #[error("Invalid density function definition: {0}")]
    InvalidDefinition(String),
}
