//! # Steel Utils
//!
//! Registry independent building blocks of terrain generation: random
//! sources, noise samplers, the density function graph, noise routers and
//! aquifers.
#![allow(clippy::module_name_repetitions)]

/// Compact containers shared with chunk storage.
pub mod codec;
pub mod density;
pub mod error;
pub mod noise;
pub mod noise_router;
pub mod random;
/// Wrapper types for positions, keys and block states.
pub mod types;

pub use codec::BitSet;
pub use error::WorldgenError;
pub use types::{BlockPos, BlockStateId, ChunkPos, ResourceLocation};
