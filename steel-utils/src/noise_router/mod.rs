//! Noise routers and the fluid systems that read them.
//!
//! [`data`] registers the vanilla density functions and assembles overworld
//! routers from them. [`aquifer`] decides what fills open space below the
//! surface.

pub mod aquifer;
pub mod data;
mod fluid_level;
mod router;
mod surface_height;

pub use aquifer::{
    Aquifer, AquiferBlocks, AquiferImpl, AquiferNoise, DisabledAquifer, NoiseBasedAquifer,
};
pub use data::OverworldPreset;
pub use fluid_level::{
    FluidPicker, FluidPickerImpl, FluidStatus, OverworldFluidPicker, StaticFluidPicker,
};
pub use router::NoiseRouter;
pub use surface_height::SurfaceHeightEstimator;
