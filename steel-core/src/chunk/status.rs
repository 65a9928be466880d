//! Generation steps a chunk passes through.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::heightmap::HeightmapType;

/// The generation status of a chunk, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChunkStatus {
    /// Nothing generated yet.
    #[serde(rename = "minecraft:empty")]
    Empty,
    /// Structure starts placed.
    #[serde(rename = "minecraft:structure_starts")]
    StructureStarts,
    /// Structure references gathered.
    #[serde(rename = "minecraft:structure_references")]
    StructureReferences,
    /// Biomes filled.
    #[serde(rename = "minecraft:biomes")]
    Biomes,
    /// Terrain and aquifers filled.
    #[serde(rename = "minecraft:noise")]
    Noise,
    /// Surface rules applied.
    #[serde(rename = "minecraft:surface")]
    Surface,
    /// Carvers run.
    #[serde(rename = "minecraft:carvers")]
    Carvers,
    /// Features placed.
    #[serde(rename = "minecraft:features")]
    Features,
    /// Light engine initialized.
    #[serde(rename = "minecraft:initialize_light")]
    InitializeLight,
    /// Light computed.
    #[serde(rename = "minecraft:light")]
    Light,
    /// Mobs spawned.
    #[serde(rename = "minecraft:spawn")]
    Spawn,
    /// Fully generated.
    #[serde(rename = "minecraft:full")]
    Full,
}

impl ChunkStatus {
    /// Whether `self` is `other` or a later step.
    #[must_use]
    pub fn is_or_after(self, other: Self) -> bool {
        self >= other
    }

    /// Heightmaps a chunk at this status keeps up to date.
    #[must_use]
    pub fn heightmaps_after(self) -> &'static [HeightmapType] {
        if self.is_or_after(Self::Features) {
            &HeightmapType::FINAL
        } else {
            &HeightmapType::WORLDGEN
        }
    }

    /// The status id without its namespace.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::StructureStarts => "structure_starts",
            Self::StructureReferences => "structure_references",
            Self::Biomes => "biomes",
            Self::Noise => "noise",
            Self::Surface => "surface",
            Self::Carvers => "carvers",
            Self::Features => "features",
            Self::InitializeLight => "initialize_light",
            Self::Light => "light",
            Self::Spawn => "spawn",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for ChunkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "minecraft:{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_are_ordered() {
        assert!(ChunkStatus::Surface.is_or_after(ChunkStatus::Noise));
        assert!(ChunkStatus::Noise.is_or_after(ChunkStatus::Noise));
        assert!(!ChunkStatus::Biomes.is_or_after(ChunkStatus::Noise));
        assert_eq!(ChunkStatus::Carvers.heightmaps_after(), &HeightmapType::WORLDGEN);
        assert_eq!(ChunkStatus::Full.heightmaps_after(), &HeightmapType::FINAL);
    }

    #[test]
    fn serializes_with_namespace() {
        let json = serde_json::to_string(&ChunkStatus::InitializeLight).expect("serializable");
        assert_eq!(json, "\"minecraft:initialize_light\"");
        let status: ChunkStatus = serde_json::from_str("\"minecraft:spawn\"").expect("known status");
        assert_eq!(status, ChunkStatus::Spawn);
        assert_eq!(status.to_string(), "minecraft:spawn");
    }
}
