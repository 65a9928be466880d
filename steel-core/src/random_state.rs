//! Per-world random state: the seeded density graph, noise instances and
//! the random factories every generation step draws from.

use std::sync::Arc;

use log::info;
use steel_utils::{
    ResourceLocation, WorldgenError,
    density::{
        DensityGraph, NodeId, Rewrite, Visitor,
        function::{BlendedNoiseHolder, DensityFunction, NoiseHolder},
        map_all,
    },
    noise::{NoiseParameterRegistry, NoiseParameters, NormalNoise},
    noise_router::{NoiseRouter, data::noises},
    random::{PositionalRandom, Random, RandomSource, RandomSplitter, legacy_random::LegacyRandom},
};

use crate::{
    biome::ClimateSampler,
    settings::NoiseGeneratorSettings,
    surface::{SurfaceRule, SurfaceSystem},
};

/// Seeded noises and random factories, created on first use and shared
/// between threads.
pub struct NoiseCache {
    parameters: NoiseParameterRegistry,
    random: RandomSplitter,
    noises: scc::HashMap<ResourceLocation, Arc<NormalNoise>>,
    random_factories: scc::HashMap<ResourceLocation, RandomSplitter>,
}

impl NoiseCache {
    /// A cache creating noises from `parameters` seeded off `random`.
    #[must_use]
    pub fn new(parameters: NoiseParameterRegistry, random: RandomSplitter) -> Self {
        Self {
            parameters,
            random,
            noises: scc::HashMap::new(),
            random_factories: scc::HashMap::new(),
        }
    }

    /// The noise registered as `key`, seeded from the hash of its name.
    pub fn get_or_create_noise(
        &self,
        key: &ResourceLocation,
    ) -> Result<Arc<NormalNoise>, WorldgenError> {
        if let Some(noise) = self.noises.read_sync(key, |_, noise| noise.clone()) {
            return Ok(noise);
        }
        let parameters = self.parameters.get(key)?.clone();
        let noise = Arc::new(NormalNoise::create(
            &mut self.random.with_hash_of(&key.to_string()),
            parameters,
        ));
        // Another thread may have won the race; both instances are identical.
        let _ = self.noises.insert_sync(key.clone(), noise.clone());
        Ok(noise)
    }

    /// A positional factory seeded from the hash of `key`.
    pub fn get_or_create_random_factory(&self, key: &ResourceLocation) -> RandomSplitter {
        if let Some(random) = self.random_factories.read_sync(key, |_, random| random.clone()) {
            return random;
        }
        let random = self.random.with_hash_of(&key.to_string()).next_positional();
        let _ = self.random_factories.insert_sync(key.clone(), random.clone());
        random
    }
}

/// Binds every noise of an unseeded graph to the world seed.
struct NoiseWiring<'a> {
    seed: u64,
    legacy: bool,
    random: &'a RandomSplitter,
    noises: &'a NoiseCache,
}

impl NoiseWiring<'_> {
    fn legacy_noise(&self, key: &ResourceLocation) -> Option<NormalNoise> {
        if !self.legacy {
            return None;
        }
        let nether_biome = |seed: u64| {
            NormalNoise::create_legacy_nether_biome(
                &mut RandomSource::Legacy(LegacyRandom::from_seed(seed)),
                NoiseParameters::new(-7, vec![1.0, 1.0]),
            )
        };
        if *key == noises::TEMPERATURE {
            Some(nether_biome(self.seed))
        } else if *key == noises::VEGETATION {
            Some(nether_biome(self.seed.wrapping_add(1)))
        } else if *key == noises::SHIFT {
            Some(NormalNoise::create(
                &mut self.random.with_hash_of(&noises::SHIFT.to_string()),
                NoiseParameters::new(0, vec![0.0]),
            ))
        } else {
            None
        }
    }
}

impl Visitor for NoiseWiring<'_> {
    fn visit_noise(&mut self, noise: &NoiseHolder) -> Result<NoiseHolder, WorldgenError> {
        let seeded = match self.legacy_noise(&noise.key) {
            Some(legacy) => Arc::new(legacy),
            None => self.noises.get_or_create_noise(&noise.key)?,
        };
        Ok(NoiseHolder {
            key: noise.key.clone(),
            noise: Some(seeded),
        })
    }

    fn visit_blended_noise(
        &mut self,
        noise: &BlendedNoiseHolder,
    ) -> Result<BlendedNoiseHolder, WorldgenError> {
        let mut random = if self.legacy {
            RandomSource::Legacy(LegacyRandom::from_seed(self.seed))
        } else {
            self.random.with_hash_of("minecraft:terrain")
        };
        Ok(BlendedNoiseHolder {
            settings: noise.settings,
            noise: Arc::new(noise.noise.with_new_random(&mut random)),
        })
    }
}

/// Drops cache markers and named references so the graph can be sampled
/// outside a chunk.
struct StripMarkers;

impl Visitor for StripMarkers {
    fn apply(
        &mut self,
        _target: &mut DensityGraph,
        node: DensityFunction,
    ) -> Result<Rewrite, WorldgenError> {
        Ok(match node {
            DensityFunction::Marker { input, .. } => Rewrite::Existing(input),
            DensityFunction::Reference { target, .. } => Rewrite::Existing(target),
            other => Rewrite::Node(other),
        })
    }
}

/// Everything derived from the world seed for one dimension.
pub struct RandomState {
    seed: u64,
    random: RandomSplitter,
    aquifer_random: RandomSplitter,
    ore_random: RandomSplitter,
    noises: NoiseCache,
    graph: Arc<DensityGraph>,
    router: NoiseRouter,
    sampler: ClimateSampler,
    surface_system: SurfaceSystem,
    surface_rule: SurfaceRule,
}

impl RandomState {
    /// Seeds `settings` with `seed`.
    pub fn new(settings: &NoiseGeneratorSettings, seed: u64) -> Result<Self, WorldgenError> {
        let legacy = settings.use_legacy_random_source;
        let random = RandomSource::create(seed, legacy).next_positional();
        let noises = NoiseCache::new(NoiseParameterRegistry::vanilla(), random.clone());

        let mut graph = DensityGraph::new();
        let router = settings.noise_router.map_all(
            &settings.graph,
            &mut graph,
            &mut NoiseWiring {
                seed,
                legacy,
                random: &random,
                noises: &noises,
            },
        )?;

        let mut climate = DensityGraph::new();
        let roots = [
            router.temperature,
            router.vegetation,
            router.continents,
            router.erosion,
            router.depth,
            router.ridges,
        ];
        let climate_roots: Vec<NodeId> = map_all(&graph, &roots, &mut climate, &mut StripMarkers)?;
        let [temperature, humidity, continentalness, erosion, depth, weirdness] = climate_roots[..]
        else {
            return Err(WorldgenError::InvalidDefinition(
                "climate rewrite lost a root".to_owned(),
            ));
        };
        let sampler = ClimateSampler::new(
            Arc::new(climate),
            temperature,
            humidity,
            continentalness,
            erosion,
            depth,
            weirdness,
        );

        let surface_system =
            SurfaceSystem::new(&noises, settings.default_block, settings.sea_level, &random)?;
        let surface_rule = settings.surface_rule.bind(&noises)?;

        info!(
            "Seeded world generation with seed {seed} ({} density nodes)",
            graph.len()
        );
        Ok(Self {
            seed,
            aquifer_random: random.with_hash_of("minecraft:aquifer").next_positional(),
            ore_random: random.with_hash_of("minecraft:ore").next_positional(),
            random,
            noises,
            graph: Arc::new(graph),
            router,
            sampler,
            surface_system,
            surface_rule,
        })
    }

    /// The world seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// The root positional random.
    #[must_use]
    pub const fn random(&self) -> &RandomSplitter {
        &self.random
    }

    /// Positional random for aquifer sources.
    #[must_use]
    pub const fn aquifer_random(&self) -> &RandomSplitter {
        &self.aquifer_random
    }

    /// Positional random for ore veins.
    #[must_use]
    pub const fn ore_random(&self) -> &RandomSplitter {
        &self.ore_random
    }

    /// Lazily created noises by name.
    #[must_use]
    pub const fn noises(&self) -> &NoiseCache {
        &self.noises
    }

    /// The seeded graph the router points into.
    #[must_use]
    pub fn graph(&self) -> &Arc<DensityGraph> {
        &self.graph
    }

    /// The seeded router.
    #[must_use]
    pub const fn router(&self) -> &NoiseRouter {
        &self.router
    }

    /// Climate sampler over the seeded graph.
    #[must_use]
    pub const fn sampler(&self) -> &ClimateSampler {
        &self.sampler
    }

    /// Noises and bands for surface placement.
    #[must_use]
    pub const fn surface_system(&self) -> &SurfaceSystem {
        &self.surface_system
    }

    /// The bound surface rule tree.
    #[must_use]
    pub const fn surface_rule(&self) -> &SurfaceRule {
        &self.surface_rule
    }
}

#[cfg(test)]
mod tests {
    use steel_utils::{density::FunctionContext, noise_router::OverworldPreset};

    use super::*;

    fn key(path: &'static str) -> ResourceLocation {
        ResourceLocation::vanilla_static(path)
    }

    fn cache(seed: u64) -> NoiseCache {
        NoiseCache::new(
            NoiseParameterRegistry::vanilla(),
            RandomSource::create(seed, false).next_positional(),
        )
    }

    #[test]
    fn noises_are_created_once() {
        let cache = cache(1);
        let first = cache.get_or_create_noise(&key("surface")).expect("registered");
        let second = cache.get_or_create_noise(&key("surface")).expect("registered");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(matches!(
            cache.get_or_create_noise(&key("not_a_noise")),
            Err(WorldgenError::MissingNoise(_))
        ));
    }

    #[test]
    fn noises_depend_on_seed_and_name() {
        let (a, b) = (cache(1), cache(2));
        let sample = |cache: &NoiseCache, name| {
            cache
                .get_or_create_noise(&key(name))
                .expect("registered")
                .get_value(120.5, 0.0, -33.25)
        };
        assert_eq!(sample(&a, "surface"), sample(&cache(1), "surface"));
        assert_ne!(sample(&a, "surface"), sample(&b, "surface"));
        assert_ne!(sample(&a, "surface"), sample(&a, "gravel"));
    }

    #[test]
    fn random_factories_are_stable() {
        let cache = cache(7);
        let mut first = cache.get_or_create_random_factory(&key("bedrock_floor")).at(1, 2, 3);
        let mut second = cache.get_or_create_random_factory(&key("bedrock_floor")).at(1, 2, 3);
        assert_eq!(first.next_i64(), second.next_i64());
    }

    #[test]
    fn same_seed_same_climate() {
        let settings = NoiseGeneratorSettings::overworld(OverworldPreset::Normal).expect("vanilla data");
        let a = RandomState::new(&settings, 12345).expect("seeded");
        let b = RandomState::new(&settings, 12345).expect("seeded");
        let c = RandomState::new(&settings, 54321).expect("seeded");
        assert_eq!(a.sampler().sample(10, 16, -40), b.sampler().sample(10, 16, -40));
        assert_ne!(a.sampler().sample(10, 16, -40), c.sampler().sample(10, 16, -40));

        let context = FunctionContext::new(40, 64, -160);
        let density = |state: &RandomState| state.graph().compute(state.router().final_density, &context);
        assert_eq!(density(&a), density(&b));
    }

    #[test]
    fn legacy_sources_seed_differently() {
        let mut settings = NoiseGeneratorSettings::overworld(OverworldPreset::Normal).expect("vanilla data");
        let modern = RandomState::new(&settings, 99).expect("seeded");
        settings.use_legacy_random_source = true;
        let legacy = RandomState::new(&settings, 99).expect("seeded");
        assert_ne!(
            modern.sampler().sample(0, 0, 0),
            legacy.sampler().sample(0, 0, 0)
        );
    }
}
