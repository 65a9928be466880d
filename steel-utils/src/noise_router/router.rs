//! The fifteen density roots a generator samples.

use crate::{
    density::{DensityGraph, NodeId, Visitor, map_all},
    error::WorldgenError,
};

/// Roots into a [`DensityGraph`] for every quantity terrain generation reads.
///
/// The router does not own its graph. After seeding, the ids point into the
/// seeded graph rather than the registry's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseRouter {
    /// Walls between neighbouring fluid bodies.
    pub barrier_noise: NodeId,
    /// How likely an aquifer source is flooded.
    pub fluid_level_floodedness_noise: NodeId,
    /// Vertical jitter of randomized fluid levels.
    pub fluid_level_spread_noise: NodeId,
    /// Picks lava over water for deep sources.
    pub lava_noise: NodeId,
    /// Climate temperature.
    pub temperature: NodeId,
    /// Climate humidity.
    pub vegetation: NodeId,
    /// Climate continentalness.
    pub continents: NodeId,
    /// Climate erosion.
    pub erosion: NodeId,
    /// Climate depth below the surface.
    pub depth: NodeId,
    /// Climate weirdness.
    pub ridges: NodeId,
    /// Density used to estimate the preliminary surface.
    pub initial_density_without_jaggedness: NodeId,
    /// Solid where positive, open otherwise.
    pub final_density: NodeId,
    /// Picks copper or iron by sign.
    pub vein_toggle: NodeId,
    /// Positive outside ore veins.
    pub vein_ridged: NodeId,
    /// Chance of an ore block inside a vein.
    pub vein_gap: NodeId,
}

impl NoiseRouter {
    /// Number of roots.
    pub const ROOT_COUNT: usize = 15;

    /// Every root, in declaration order.
    #[must_use]
    pub const fn roots(&self) -> [NodeId; Self::ROOT_COUNT] {
        [
            self.barrier_noise,
            self.fluid_level_floodedness_noise,
            self.fluid_level_spread_noise,
            self.lava_noise,
            self.temperature,
            self.vegetation,
            self.continents,
            self.erosion,
            self.depth,
            self.ridges,
            self.initial_density_without_jaggedness,
            self.final_density,
            self.vein_toggle,
            self.vein_ridged,
            self.vein_gap,
        ]
    }

    /// Inverse of [`NoiseRouter::roots`].
    #[must_use]
    pub const fn from_roots(roots: [NodeId; Self::ROOT_COUNT]) -> Self {
        let [
            barrier_noise,
            fluid_level_floodedness_noise,
            fluid_level_spread_noise,
            lava_noise,
            temperature,
            vegetation,
            continents,
            erosion,
            depth,
            ridges,
            initial_density_without_jaggedness,
            final_density,
            vein_toggle,
            vein_ridged,
            vein_gap,
        ] = roots;
        Self {
            barrier_noise,
            fluid_level_floodedness_noise,
            fluid_level_spread_noise,
            lava_noise,
            temperature,
            vegetation,
            continents,
            erosion,
            depth,
            ridges,
            initial_density_without_jaggedness,
            final_density,
            vein_toggle,
            vein_ridged,
            vein_gap,
        }
    }

    /// Rewrites every root of `source` into `target` in one pass, so
    /// subgraphs shared between roots stay shared.
    pub fn map_all(
        &self,
        source: &DensityGraph,
        target: &mut DensityGraph,
        visitor: &mut impl Visitor,
    ) -> Result<Self, WorldgenError> {
        let mapped = map_all(source, &self.roots(), target, visitor)?;
        let roots: [NodeId; Self::ROOT_COUNT] = mapped.try_into().map_err(|v: Vec<NodeId>| {
            WorldgenError::InvalidDefinition(format!(
                "router rewrite produced {} roots instead of {}",
                v.len(),
                Self::ROOT_COUNT
            ))
        })?;
        Ok(Self::from_roots(roots))
    }
}
