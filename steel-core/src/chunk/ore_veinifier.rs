//! Large copper and iron veins placed while filling from noise.

use steel_utils::{
    BlockStateId,
    density::{DensityEvaluator, FunctionContext, NodeId},
    noise::clamped_map,
    noise_router::NoiseRouter,
    random::{PositionalRandom, Random, RandomSplitter},
};

use crate::blocks::vanilla::{
    COPPER_ORE, DEEPSLATE_IRON_ORE, GRANITE, RAW_COPPER_BLOCK, RAW_IRON_BLOCK, TUFF,
};

const VEININESS_THRESHOLD: f64 = 0.4;
const EDGE_ROUNDOFF_BEGIN: f64 = 20.0;
const MAX_EDGE_ROUNDOFF: f64 = 0.2;
const VEIN_SOLIDNESS: f32 = 0.7;
const MIN_RICHNESS: f64 = 0.1;
const MAX_RICHNESS: f64 = 0.3;
const MAX_RICHNESS_THRESHOLD: f64 = 0.6;
const CHANCE_OF_RAW_ORE_BLOCK: f32 = 0.02;
const SKIP_ORE_IF_GAP_NOISE_IS_BELOW: f64 = -0.3;

/// The blocks and vertical range of one vein kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VeinType {
    /// Most vein blocks.
    pub ore: BlockStateId,
    /// Occasional solid block of raw ore.
    pub raw_ore: BlockStateId,
    /// Stone between ore blocks.
    pub filler: BlockStateId,
    /// Lowest y of the vein.
    pub min_y: i32,
    /// Highest y of the vein.
    pub max_y: i32,
}

impl VeinType {
    /// Copper in granite, from 0 to 50.
    pub const COPPER: Self = Self {
        ore: COPPER_ORE,
        raw_ore: RAW_COPPER_BLOCK,
        filler: GRANITE,
        min_y: 0,
        max_y: 50,
    };

    /// Iron in tuff, from -60 to -8.
    pub const IRON: Self = Self {
        ore: DEEPSLATE_IRON_ORE,
        raw_ore: RAW_IRON_BLOCK,
        filler: TUFF,
        min_y: -60,
        max_y: -8,
    };
}

/// Picks ore vein blocks from the router's vein functions.
///
/// The toggle chooses copper above zero and iron below; its magnitude
/// decides how deep inside a vein a position is. Veins fade out over the
/// last twenty blocks of their range.
pub struct OreVeinifier {
    toggle: NodeId,
    ridged: NodeId,
    gap: NodeId,
    random: RandomSplitter,
}

impl OreVeinifier {
    /// A veinifier reading the vein roots of `router`.
    #[must_use]
    pub const fn new(router: &NoiseRouter, random: RandomSplitter) -> Self {
        Self {
            toggle: router.vein_toggle,
            ridged: router.vein_ridged,
            gap: router.vein_gap,
            random,
        }
    }

    /// The vein block at `context`, or `None` outside every vein.
    pub fn compute(
        &self,
        evaluator: &mut DensityEvaluator<'_>,
        context: &FunctionContext,
    ) -> Option<BlockStateId> {
        let toggle = evaluator.compute(self.toggle, context);
        let y = context.block_y;
        let vein = if toggle > 0.0 {
            VeinType::COPPER
        } else {
            VeinType::IRON
        };
        let strength = toggle.abs();
        let to_top = vein.max_y - y;
        let to_bottom = y - vein.min_y;
        if to_top < 0 || to_bottom < 0 {
            return None;
        }
        let edge = clamped_map(
            f64::from(to_top.min(to_bottom)),
            0.0,
            EDGE_ROUNDOFF_BEGIN,
            -MAX_EDGE_ROUNDOFF,
            0.0,
        );
        if strength + edge < VEININESS_THRESHOLD {
            return None;
        }

        let mut random = self.random.at(context.block_x, y, context.block_z);
        if random.next_f32() > VEIN_SOLIDNESS {
            return None;
        }
        if evaluator.compute(self.ridged, context) >= 0.0 {
            return None;
        }

        let richness = clamped_map(
            strength,
            VEININESS_THRESHOLD,
            MAX_RICHNESS_THRESHOLD,
            MIN_RICHNESS,
            MAX_RICHNESS,
        );
        if f64::from(random.next_f32()) < richness
            && evaluator.compute(self.gap, context) > SKIP_ORE_IF_GAP_NOISE_IS_BELOW
        {
            return Some(if random.next_f32() < CHANCE_OF_RAW_ORE_BLOCK {
                vein.raw_ore
            } else {
                vein.ore
            });
        }
        Some(vein.filler)
    }
}

#[cfg(test)]
mod tests {
    use steel_utils::{density::DensityGraph, random::RandomSource};

    use super::*;

    fn build(toggle: f64, ridged: f64, gap: f64) -> (DensityGraph, OreVeinifier) {
        let mut graph = DensityGraph::new();
        let zero = graph.zero();
        let mut router = NoiseRouter::from_roots([zero; NoiseRouter::ROOT_COUNT]);
        router.vein_toggle = graph.constant(toggle);
        router.vein_ridged = graph.constant(ridged);
        router.vein_gap = graph.constant(gap);
        let random = RandomSource::create(5, false).next_positional();
        (graph, OreVeinifier::new(&router, random))
    }

    fn sample(graph: &DensityGraph, veinifier: &OreVeinifier, y: i32) -> Vec<Option<BlockStateId>> {
        let mut evaluator = DensityEvaluator::new(graph);
        (0..64)
            .map(|x| veinifier.compute(&mut evaluator, &FunctionContext::new(x, y, 7)))
            .collect()
    }

    #[test]
    fn weak_toggle_places_nothing() {
        let (graph, veinifier) = build(0.3, -1.0, 1.0);
        assert!(sample(&graph, &veinifier, 25).iter().all(Option::is_none));
    }

    #[test]
    fn positions_outside_the_range_are_skipped() {
        let (graph, veinifier) = build(1.0, -1.0, 1.0);
        assert!(sample(&graph, &veinifier, 51).iter().all(Option::is_none));
        assert!(sample(&graph, &veinifier, -1).iter().all(Option::is_none));
    }

    #[test]
    fn strong_copper_veins_mix_ore_and_granite() {
        let (graph, veinifier) = build(1.0, -1.0, 1.0);
        let blocks = sample(&graph, &veinifier, 25);
        let allowed = [Some(COPPER_ORE), Some(RAW_COPPER_BLOCK), Some(GRANITE), None];
        assert!(blocks.iter().all(|block| allowed.contains(block)));
        assert!(blocks.contains(&Some(COPPER_ORE)));
        assert!(blocks.contains(&Some(GRANITE)));
        // Roughly 30% of positions fail the solidness roll.
        assert!(blocks.contains(&None));
    }

    #[test]
    fn negative_toggle_places_iron() {
        let (graph, veinifier) = build(-1.0, -1.0, 1.0);
        let blocks = sample(&graph, &veinifier, -30);
        assert!(blocks.contains(&Some(DEEPSLATE_IRON_ORE)));
        assert!(blocks.contains(&Some(TUFF)));
        assert!(!blocks.contains(&Some(COPPER_ORE)));
    }

    #[test]
    fn ridges_and_gaps_suppress_ore() {
        let (graph, veinifier) = build(1.0, 0.5, 1.0);
        assert!(sample(&graph, &veinifier, 25).iter().all(Option::is_none));

        let (graph, veinifier) = build(1.0, -1.0, -1.0);
        let blocks = sample(&graph, &veinifier, 25);
        assert!(blocks.iter().all(|block| matches!(block, Some(GRANITE) | None)));
    }

    #[test]
    fn edges_fade_out() {
        // At the top of the copper range the edge roundoff is -0.2.
        let (graph, veinifier) = build(0.55, -1.0, 1.0);
        assert!(sample(&graph, &veinifier, 50).iter().all(Option::is_none));
        assert!(sample(&graph, &veinifier, 25).iter().any(Option::is_some));
    }

    #[test]
    fn placement_is_positional() {
        let (graph, veinifier) = build(1.0, -1.0, 1.0);
        assert_eq!(sample(&graph, &veinifier, 10), sample(&graph, &veinifier, 10));
    }
}
