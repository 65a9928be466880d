//! Chunks under generation and the generator that fills them.

pub mod below_zero_retrogen;
pub mod bit_storage;
pub mod generator;
pub mod height_accessor;
pub mod heightmap;
pub mod noise_chunk;
pub mod ore_veinifier;
pub mod proto_chunk;
pub mod section;
pub mod status;

pub use below_zero_retrogen::BelowZeroRetrogen;
pub use generator::{ChunkGenerator, ChunkGeneratorType, NoiseBasedChunkGenerator};
pub use height_accessor::{HeightRange, LevelHeightAccessor, WorldGenerationContext};
pub use heightmap::{Heightmap, HeightmapType};
pub use proto_chunk::ProtoChunk;
pub use status::ChunkStatus;
