//! Named density functions sharing one graph.

use rustc_hash::FxHashMap;

use crate::{error::WorldgenError, noise::NoiseParameterRegistry, types::ResourceLocation};

use super::{DensityGraph, NodeId, function::NoiseHolder};

/// The density function registry of a world: one graph, a name for some of
/// its nodes, and the noise parameters those nodes may sample.
///
/// Lookups fail with an error instead of substituting anything, so a typo in
/// a key aborts world setup.
#[derive(Debug, Clone)]
pub struct DensityFunctionRegistry {
    graph: DensityGraph,
    functions: FxHashMap<ResourceLocation, NodeId>,
    noises: NoiseParameterRegistry,
}

impl DensityFunctionRegistry {
    /// An empty registry resolving noises against `noises`.
    #[must_use]
    pub fn new(noises: NoiseParameterRegistry) -> Self {
        Self {
            graph: DensityGraph::new(),
            functions: FxHashMap::default(),
            noises,
        }
    }

    /// The graph holding every registered node.
    #[must_use]
    pub fn graph(&self) -> &DensityGraph {
        &self.graph
    }

    /// Mutable access for building new nodes.
    pub fn graph_mut(&mut self) -> &mut DensityGraph {
        &mut self.graph
    }

    /// The noise parameters functions may name.
    #[must_use]
    pub fn noises(&self) -> &NoiseParameterRegistry {
        &self.noises
    }

    /// Names `node` and returns a reference node pointing at it.
    pub fn register(&mut self, key: ResourceLocation, node: NodeId) -> NodeId {
        if self.functions.insert(key.clone(), node).is_some() {
            log::warn!("Density function {key} registered twice, keeping the latest");
        }
        self.graph.reference(key, node)
    }

    /// The node registered under `key`.
    pub fn get(&self, key: &ResourceLocation) -> Result<NodeId, WorldgenError> {
        self.functions
            .get(key)
            .copied()
            .ok_or_else(|| WorldgenError::MissingDensityFunction(key.clone()))
    }

    /// A reference node to the function registered under `key`.
    pub fn reference(&mut self, key: &ResourceLocation) -> Result<NodeId, WorldgenError> {
        let target = self.get(key)?;
        Ok(self.graph.reference(key.clone(), target))
    }

    /// An unbound holder for the noise `key`, checked against the noise registry.
    pub fn noise(&self, key: &ResourceLocation) -> Result<NoiseHolder, WorldgenError> {
        self.noises.get(key)?;
        Ok(NoiseHolder::unbound(key.clone()))
    }

    /// Iterates over every registered name.
    pub fn keys(&self) -> impl Iterator<Item = &ResourceLocation> {
        self.functions.keys()
    }

    /// Number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::DensityFunction;

    #[test]
    fn register_and_resolve() {
        let mut registry = DensityFunctionRegistry::new(NoiseParameterRegistry::vanilla());
        let key = ResourceLocation::vanilla_static("test/half");
        let half = registry.graph_mut().constant(0.5);
        let wrapped = registry.register(key.clone(), half);

        assert_eq!(registry.get(&key).expect("registered"), half);
        assert_eq!(registry.reference(&key).expect("registered"), wrapped);
        assert!(matches!(
            registry.graph().node(wrapped),
            DensityFunction::Reference { .. }
        ));
    }

    #[test]
    fn unknown_keys_fail_fast() {
        let mut registry = DensityFunctionRegistry::new(NoiseParameterRegistry::vanilla());
        let missing = ResourceLocation::vanilla_static("overworld/missing");
        assert!(matches!(
            registry.reference(&missing),
            Err(WorldgenError::MissingDensityFunction(_))
        ));
        assert!(matches!(
            registry.noise(&missing),
            Err(WorldgenError::MissingNoise(_))
        ));
    }
}
