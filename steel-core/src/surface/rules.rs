//! Surface rules: a tree of conditions and block choices that repaints the
//! default block near the surface.
//!
//! [`RuleSource`] and [`ConditionSource`] are the data form, readable from
//! vanilla surface-rule JSON. Binding them against a [`NoiseCache`] yields a
//! [`SurfaceRule`], which is evaluated against a [`SurfaceContext`] while
//! the surface system walks each column top down.
//!
//! Most conditions are cached per column or per block, keyed by the
//! context's update counters, so a condition shared by many rules is
//! computed once per position.

use std::{collections::BTreeMap, fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use steel_utils::{
    BlockPos, BlockStateId, ResourceLocation, WorldgenError,
    noise::{NormalNoise, floor, lerp2, map},
    random::{PositionalRandom, Random, RandomSplitter},
};

use crate::{
    biome::{self, BiomeRef},
    blocks,
    chunk::{height_accessor::WorldGenerationContext, heightmap::HeightmapType, proto_chunk::ProtoChunk},
    random_state::NoiseCache,
};

use super::system::SurfaceSystem;

/// Supplies the estimated terrain height of a column before the final
/// density is known.
pub trait PreliminarySurface {
    /// Estimated surface y of the column holding `(block_x, block_z)`.
    fn preliminary_surface_level(&mut self, block_x: i32, block_z: i32) -> i32;
}

/// A y coordinate relative to the generation range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAnchor {
    /// A fixed y.
    Absolute(i32),
    /// Blocks above the minimum y.
    AboveBottom(i32),
    /// Blocks below the top of the generation range.
    BelowTop(i32),
}

impl VerticalAnchor {
    /// The lowest y of the generation range.
    pub const BOTTOM: Self = Self::AboveBottom(0);
    /// The highest y of the generation range.
    pub const TOP: Self = Self::BelowTop(0);

    /// The absolute y of the anchor.
    #[must_use]
    pub const fn resolve_y(self, context: &WorldGenerationContext) -> i32 {
        match self {
            Self::Absolute(y) => y,
            Self::AboveBottom(offset) => context.min_gen_y() + offset,
            Self::BelowTop(offset) => context.gen_depth() - 1 + context.min_gen_y() - offset,
        }
    }
}

/// Which side of a cave a stone depth check measures from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaveSurface {
    /// Depth counted up from the ceiling above.
    Ceiling,
    /// Depth counted down from the floor surface.
    Floor,
}

/// A block state as written in data files. Properties are kept but not
/// interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockResult {
    /// The block id.
    #[serde(rename = "Name")]
    pub name: ResourceLocation,
    /// Block state properties, unparsed.
    #[serde(rename = "Properties", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

/// The data form of a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RuleSource {
    /// The terracotta band at the current position.
    #[serde(rename = "minecraft:bandlands", alias = "bandlands")]
    Bandlands,
    /// Always places `result_state`.
    #[serde(rename = "minecraft:block", alias = "block")]
    Block { result_state: BlockResult },
    /// The first rule with an opinion wins.
    #[serde(rename = "minecraft:sequence", alias = "sequence")]
    Sequence { sequence: Vec<RuleSource> },
    /// Runs `then_run` where `if_true` holds.
    #[serde(rename = "minecraft:condition", alias = "condition")]
    Condition {
        if_true: ConditionSource,
        then_run: Box<RuleSource>,
    },
}

/// The data form of a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConditionSource {
    /// The biome at the position is one of `biome_is`.
    #[serde(rename = "minecraft:biome", alias = "biome")]
    Biome { biome_is: Vec<ResourceLocation> },
    /// A 2D noise sample at the column lies in `min..=max`.
    #[serde(rename = "minecraft:noise_threshold", alias = "noise_threshold")]
    NoiseThreshold {
        noise: ResourceLocation,
        min_threshold: f64,
        max_threshold: f64,
    },
    /// Always true at and below the first anchor, never at and above the
    /// second, random in between.
    #[serde(rename = "minecraft:vertical_gradient", alias = "vertical_gradient")]
    VerticalGradient {
        random_name: ResourceLocation,
        true_at_and_below: VerticalAnchor,
        false_at_and_above: VerticalAnchor,
    },
    /// The y, plus stone depth when asked, reaches the anchor plus scaled surface depth.
    #[serde(rename = "minecraft:y_above", alias = "y_above")]
    YAbove {
        anchor: VerticalAnchor,
        surface_depth_multiplier: i32,
        add_stone_depth: bool,
    },
    /// No fluid above, or the position sits at or above the fluid level plus `offset`.
    #[serde(rename = "minecraft:water", alias = "water")]
    Water {
        offset: i32,
        surface_depth_multiplier: i32,
        add_stone_depth: bool,
    },
    /// Cold enough to snow at the position.
    #[serde(rename = "minecraft:temperature", alias = "temperature")]
    Temperature,
    /// The column is on a steep north or east face.
    #[serde(rename = "minecraft:steep", alias = "steep")]
    Steep,
    /// Inverts another condition.
    #[serde(rename = "minecraft:not", alias = "not")]
    Not { invert: Box<ConditionSource> },
    /// The surface depth at the column is zero or less.
    #[serde(rename = "minecraft:hole", alias = "hole")]
    Hole,
    /// At or above the preliminary surface estimate.
    #[serde(rename = "minecraft:above_preliminary_surface", alias = "above_preliminary_surface")]
    AbovePreliminarySurface,
    /// Stone depth from the surface lies within the offset and optional ranges.
    #[serde(rename = "minecraft:stone_depth", alias = "stone_depth")]
    StoneDepth {
        offset: i32,
        add_surface_depth: bool,
        secondary_depth_range: i32,
        surface_type: CaveSurface,
    },
}

impl RuleSource {
    /// Parses vanilla surface-rule JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Resolves block, biome and noise names. Fails on the first unknown
    /// name.
    pub fn bind(&self, noises: &NoiseCache) -> Result<SurfaceRule, WorldgenError> {
        let mut conditions = Vec::new();
        let root = self.bind_rule(noises, &mut conditions)?;
        Ok(SurfaceRule { conditions, root })
    }

    fn bind_rule(
        &self,
        noises: &NoiseCache,
        conditions: &mut Vec<Condition>,
    ) -> Result<Rule, WorldgenError> {
        Ok(match self {
            Self::Bandlands => Rule::Bandlands,
            Self::Block { result_state } => Rule::Block(blocks::by_name(&result_state.name)?),
            Self::Sequence { sequence } => {
                let mut rules = sequence
                    .iter()
                    .map(|rule| rule.bind_rule(noises, conditions))
                    .collect::<Result<Vec<_>, _>>()?;
                if rules.len() == 1 {
                    rules.swap_remove(0)
                } else {
                    Rule::Sequence(rules.into_boxed_slice())
                }
            }
            Self::Condition { if_true, then_run } => Rule::Test {
                condition: if_true.bind(noises, conditions)?,
                then: Box::new(then_run.bind_rule(noises, conditions)?),
            },
        })
    }
}

impl ConditionSource {
    fn bind(
        &self,
        noises: &NoiseCache,
        conditions: &mut Vec<Condition>,
    ) -> Result<usize, WorldgenError> {
        let condition = match self {
            Self::Biome { biome_is } => Condition::Biome(
                biome_is
                    .iter()
                    .map(biome::by_key)
                    .collect::<Result<_, _>>()?,
            ),
            Self::NoiseThreshold {
                noise,
                min_threshold,
                max_threshold,
            } => Condition::NoiseThreshold {
                noise: noises.get_or_create_noise(noise)?,
                min: *min_threshold,
                max: *max_threshold,
            },
            Self::VerticalGradient {
                random_name,
                true_at_and_below,
                false_at_and_above,
            } => Condition::VerticalGradient {
                random: noises.get_or_create_random_factory(random_name),
                true_at_and_below: *true_at_and_below,
                false_at_and_above: *false_at_and_above,
            },
            Self::YAbove {
                anchor,
                surface_depth_multiplier,
                add_stone_depth,
            } => Condition::YAbove {
                anchor: *anchor,
                surface_depth_multiplier: *surface_depth_multiplier,
                add_stone_depth: *add_stone_depth,
            },
            Self::Water {
                offset,
                surface_depth_multiplier,
                add_stone_depth,
            } => Condition::Water {
                offset: *offset,
                surface_depth_multiplier: *surface_depth_multiplier,
                add_stone_depth: *add_stone_depth,
            },
            Self::Temperature => Condition::Temperature,
            Self::Steep => Condition::Steep,
            Self::Not { invert } => Condition::Not(invert.bind(noises, conditions)?),
            Self::Hole => Condition::Hole,
            Self::AbovePreliminarySurface => Condition::AbovePreliminarySurface,
            Self::StoneDepth {
                offset,
                add_surface_depth,
                secondary_depth_range,
                surface_type,
            } => Condition::StoneDepth {
                offset: *offset,
                add_surface_depth: *add_surface_depth,
                secondary_depth_range: *secondary_depth_range,
                surface_type: *surface_type,
            },
        };
        conditions.push(condition);
        Ok(conditions.len() - 1)
    }
}

enum Rule {
    Block(BlockStateId),
    Sequence(Box<[Rule]>),
    Test { condition: usize, then: Box<Rule> },
    Bandlands,
}

enum Condition {
    Biome(Box<[BiomeRef]>),
    NoiseThreshold {
        noise: Arc<NormalNoise>,
        min: f64,
        max: f64,
    },
    VerticalGradient {
        random: RandomSplitter,
        true_at_and_below: VerticalAnchor,
        false_at_and_above: VerticalAnchor,
    },
    YAbove {
        anchor: VerticalAnchor,
        surface_depth_multiplier: i32,
        add_stone_depth: bool,
    },
    Water {
        offset: i32,
        surface_depth_multiplier: i32,
        add_stone_depth: bool,
    },
    Temperature,
    Steep,
    Not(usize),
    Hole,
    AbovePreliminarySurface,
    StoneDepth {
        offset: i32,
        add_surface_depth: bool,
        secondary_depth_range: i32,
        surface_type: CaveSurface,
    },
}

/// How long a condition result stays valid.
enum Laziness {
    /// Until the scan moves to another column.
    Column,
    /// Until the scan moves to another block.
    Block,
    Never,
}

impl Condition {
    const fn laziness(&self) -> Laziness {
        match self {
            Self::NoiseThreshold { .. } | Self::Steep | Self::Hole => Laziness::Column,
            Self::Biome(_)
            | Self::VerticalGradient { .. }
            | Self::YAbove { .. }
            | Self::Water { .. }
            | Self::Temperature
            | Self::StoneDepth { .. } => Laziness::Block,
            Self::Not(_) | Self::AbovePreliminarySurface => Laziness::Never,
        }
    }
}

/// A bound rule tree. Shared by every chunk of a world.
pub struct SurfaceRule {
    conditions: Vec<Condition>,
    root: Rule,
}

impl fmt::Debug for SurfaceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceRule")
            .field("conditions", &self.conditions.len())
            .finish_non_exhaustive()
    }
}

impl SurfaceRule {
    /// Number of distinct conditions the rule evaluates.
    #[must_use]
    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    /// The replacement for the block at the context's position, if any rule
    /// has one.
    pub fn try_apply<P: PreliminarySurface>(
        &self,
        context: &mut SurfaceContext<'_, P>,
        chunk: &ProtoChunk,
    ) -> Option<BlockStateId> {
        self.apply(&self.root, context, chunk)
    }

    fn apply<P: PreliminarySurface>(
        &self,
        rule: &Rule,
        context: &mut SurfaceContext<'_, P>,
        chunk: &ProtoChunk,
    ) -> Option<BlockStateId> {
        match rule {
            Rule::Block(state) => Some(*state),
            Rule::Bandlands => Some(context.system.get_band(
                context.block_x,
                context.block_y,
                context.block_z,
            )),
            Rule::Sequence(rules) => rules
                .iter()
                .find_map(|rule| self.apply(rule, context, chunk)),
            Rule::Test { condition, then } => {
                if self.test(*condition, context, chunk) {
                    self.apply(then, context, chunk)
                } else {
                    None
                }
            }
        }
    }

    fn test<P: PreliminarySurface>(
        &self,
        index: usize,
        context: &mut SurfaceContext<'_, P>,
        chunk: &ProtoChunk,
    ) -> bool {
        let condition = &self.conditions[index];
        let stamp = match condition.laziness() {
            Laziness::Column => context.last_update_xz,
            Laziness::Block => context.last_update_y,
            Laziness::Never => return self.compute(condition, context, chunk),
        };
        if let Some((last, result)) = context.condition_cache[index] {
            if last == stamp {
                return result;
            }
        }
        let result = self.compute(condition, context, chunk);
        context.condition_cache[index] = Some((stamp, result));
        result
    }

    fn compute<P: PreliminarySurface>(
        &self,
        condition: &Condition,
        context: &mut SurfaceContext<'_, P>,
        chunk: &ProtoChunk,
    ) -> bool {
        #[cfg(test)]
        {
            context.computations += 1;
        }
        match condition {
            Condition::Biome(biomes) => context.biome(chunk).is_any(biomes),
            Condition::NoiseThreshold { noise, min, max } => {
                let value = noise.get_value(
                    f64::from(context.block_x),
                    0.0,
                    f64::from(context.block_z),
                );
                value >= *min && value <= *max
            }
            Condition::VerticalGradient {
                random,
                true_at_and_below,
                false_at_and_above,
            } => {
                let true_y = true_at_and_below.resolve_y(&context.generation);
                let false_y = false_at_and_above.resolve_y(&context.generation);
                let y = context.block_y;
                if y <= true_y {
                    return true;
                }
                if y >= false_y {
                    return false;
                }
                let chance = map(
                    f64::from(y),
                    f64::from(true_y),
                    f64::from(false_y),
                    1.0,
                    0.0,
                );
                let mut random = random.at(context.block_x, y, context.block_z);
                f64::from(random.next_f32()) < chance
            }
            Condition::YAbove {
                anchor,
                surface_depth_multiplier,
                add_stone_depth,
            } => {
                let stone = if *add_stone_depth { context.stone_depth_above } else { 0 };
                context.block_y + stone
                    >= anchor.resolve_y(&context.generation)
                        + context.surface_depth * surface_depth_multiplier
            }
            Condition::Water {
                offset,
                surface_depth_multiplier,
                add_stone_depth,
            } => {
                let stone = if *add_stone_depth { context.stone_depth_above } else { 0 };
                context.water_height == i32::MIN
                    || context.block_y + stone
                        >= context.water_height + offset + context.surface_depth * surface_depth_multiplier
            }
            Condition::Temperature => {
                let pos = BlockPos::new(context.block_x, context.block_y, context.block_z);
                let sea_level = context.system.sea_level();
                context.biome(chunk).cold_enough_to_snow(pos, sea_level)
            }
            Condition::Steep => {
                let x = context.block_x & 15;
                let z = context.block_z & 15;
                let height = |x: i32, z: i32| chunk.get_height(HeightmapType::WorldSurfaceWg, x, z);
                let north = height(x, (z - 1).max(0));
                let south = height(x, (z + 1).min(15));
                if south >= north + 4 {
                    return true;
                }
                let west = height((x - 1).max(0), z);
                let east = height((x + 1).min(15), z);
                west >= east + 4
            }
            Condition::Not(inner) => !self.test(*inner, context, chunk),
            Condition::Hole => context.surface_depth <= 0,
            Condition::AbovePreliminarySurface => context.block_y >= context.min_surface_level(),
            Condition::StoneDepth {
                offset,
                add_surface_depth,
                secondary_depth_range,
                surface_type,
            } => {
                let depth = match surface_type {
                    CaveSurface::Ceiling => context.stone_depth_below,
                    CaveSurface::Floor => context.stone_depth_above,
                };
                let surface = if *add_surface_depth { context.surface_depth } else { 0 };
                let secondary = if *secondary_depth_range == 0 {
                    0
                } else {
                    map(
                        context.surface_secondary(),
                        -1.0,
                        1.0,
                        0.0,
                        f64::from(*secondary_depth_range),
                    ) as i32
                };
                depth <= 1 + offset + surface + secondary
            }
        }
    }
}

/// Per-chunk cursor the surface system moves through the chunk while rules
/// are evaluated.
pub struct SurfaceContext<'a, P> {
    system: &'a SurfaceSystem,
    preliminary: &'a mut P,
    generation: WorldGenerationContext,
    condition_cache: Vec<Option<(u64, bool)>>,
    last_update_xz: u64,
    last_update_y: u64,
    block_x: i32,
    block_y: i32,
    block_z: i32,
    surface_depth: i32,
    last_surface_secondary_update: u64,
    surface_secondary: f64,
    last_min_surface_level_update: u64,
    min_surface_level: i32,
    last_preliminary_cell: Option<(i32, i32)>,
    preliminary_corners: [i32; 4],
    water_height: i32,
    stone_depth_below: i32,
    stone_depth_above: i32,
    biome: Option<BiomeRef>,
    #[cfg(test)]
    computations: u64,
}

impl<'a, P: PreliminarySurface> SurfaceContext<'a, P> {
    pub fn new(
        system: &'a SurfaceSystem,
        rule: &SurfaceRule,
        preliminary: &'a mut P,
        generation: WorldGenerationContext,
    ) -> Self {
        Self {
            system,
            preliminary,
            generation,
            condition_cache: vec![None; rule.condition_count()],
            last_update_xz: 0,
            last_update_y: 0,
            block_x: 0,
            block_y: 0,
            block_z: 0,
            surface_depth: 0,
            last_surface_secondary_update: u64::MAX,
            surface_secondary: 0.0,
            last_min_surface_level_update: u64::MAX,
            min_surface_level: 0,
            last_preliminary_cell: None,
            preliminary_corners: [0; 4],
            water_height: i32::MIN,
            stone_depth_below: 0,
            stone_depth_above: 0,
            biome: None,
            #[cfg(test)]
            computations: 0,
        }
    }

    /// Moves to a new column.
    pub fn update_xz(&mut self, block_x: i32, block_z: i32) {
        self.last_update_xz += 1;
        self.last_update_y += 1;
        self.block_x = block_x;
        self.block_z = block_z;
        self.surface_depth = self.system.surface_depth(block_x, block_z);
    }

    /// Moves to a new block of the current column.
    pub fn update_y(
        &mut self,
        stone_depth_above: i32,
        stone_depth_below: i32,
        water_height: i32,
        block_x: i32,
        block_y: i32,
        block_z: i32,
    ) {
        self.last_update_y += 1;
        self.biome = None;
        self.block_x = block_x;
        self.block_y = block_y;
        self.block_z = block_z;
        self.water_height = water_height;
        self.stone_depth_below = stone_depth_below;
        self.stone_depth_above = stone_depth_above;
    }

    #[must_use]
    pub const fn surface_depth(&self) -> i32 {
        self.surface_depth
    }

    /// Biome at the current block, looked up once per block.
    pub fn biome(&mut self, chunk: &ProtoChunk) -> BiomeRef {
        if let Some(biome) = self.biome {
            return biome;
        }
        let biome = chunk.get_noise_biome(self.block_x >> 2, self.block_y >> 2, self.block_z >> 2);
        self.biome = Some(biome);
        biome
    }

    fn surface_secondary(&mut self) -> f64 {
        if self.last_surface_secondary_update != self.last_update_xz {
            self.last_surface_secondary_update = self.last_update_xz;
            self.surface_secondary = self.system.surface_secondary(self.block_x, self.block_z);
        }
        self.surface_secondary
    }

    /// Lowest y the surface may start at in this column: the preliminary
    /// surface interpolated between section corners, lowered by 8 and raised
    /// by the surface depth.
    pub fn min_surface_level(&mut self) -> i32 {
        if self.last_min_surface_level_update != self.last_update_xz {
            self.last_min_surface_level_update = self.last_update_xz;
            let cell_x = self.block_x >> 4;
            let cell_z = self.block_z >> 4;
            if self.last_preliminary_cell != Some((cell_x, cell_z)) {
                self.last_preliminary_cell = Some((cell_x, cell_z));
                let mut level = |x: i32, z: i32| self.preliminary.preliminary_surface_level(x << 4, z << 4);
                self.preliminary_corners = [
                    level(cell_x, cell_z),
                    level(cell_x + 1, cell_z),
                    level(cell_x, cell_z + 1),
                    level(cell_x + 1, cell_z + 1),
                ];
            }
            let [c00, c10, c01, c11] = self.preliminary_corners.map(f64::from);
            let level = floor(lerp2(
                f64::from((self.block_x & 15) as f32 / 16.0),
                f64::from((self.block_z & 15) as f32 / 16.0),
                c00,
                c10,
                c01,
                c11,
            ));
            self.min_surface_level = level.saturating_add(self.surface_depth).saturating_sub(8);
        }
        self.min_surface_level
    }
}

#[cfg(test)]
mod tests {
    use steel_utils::{ChunkPos, noise::NoiseParameterRegistry, random::RandomSource};

    use super::*;
    use crate::{
        blocks::vanilla::{DIRT, GRASS_BLOCK, STONE},
        chunk::height_accessor::HeightRange,
    };

    struct FlatSurface(i32);

    impl PreliminarySurface for FlatSurface {
        fn preliminary_surface_level(&mut self, _block_x: i32, _block_z: i32) -> i32 {
            self.0
        }
    }

    fn noises() -> NoiseCache {
        let random = RandomSource::create(42, false).next_positional();
        NoiseCache::new(NoiseParameterRegistry::vanilla(), random)
    }

    fn system(noises: &NoiseCache) -> SurfaceSystem {
        let random = RandomSource::create(42, false).next_positional();
        SurfaceSystem::new(noises, STONE, 63, &random).expect("vanilla noises")
    }

    fn chunk() -> ProtoChunk {
        ProtoChunk::new(ChunkPos::new(0, 0), &HeightRange::new(-64, 384), None)
    }

    fn generation() -> WorldGenerationContext {
        WorldGenerationContext::new(&HeightRange::new(-64, 384), -64, 384)
    }

    fn parse(json: &str) -> RuleSource {
        RuleSource::from_json(json).expect("valid rule")
    }

    #[test]
    fn parses_vanilla_json() {
        let rule = parse(
            r#"{"type":"minecraft:sequence","sequence":[
                {"type":"minecraft:condition",
                 "if_true":{"type":"minecraft:vertical_gradient","random_name":"minecraft:bedrock_floor",
                            "true_at_and_below":{"above_bottom":0},"false_at_and_above":{"above_bottom":5}},
                 "then_run":{"type":"minecraft:block","result_state":{"Name":"minecraft:bedrock"}}},
                {"type":"condition","if_true":{"type":"not","invert":{"type":"hole"}},
                 "then_run":{"type":"block","result_state":{"Name":"water","Properties":{"level":"0"}}}}
            ]}"#,
        );
        let RuleSource::Sequence { sequence } = &rule else {
            panic!("expected a sequence");
        };
        assert_eq!(sequence.len(), 2);
        assert!(matches!(
            &sequence[0],
            RuleSource::Condition {
                if_true: ConditionSource::VerticalGradient {
                    true_at_and_below: VerticalAnchor::AboveBottom(0),
                    ..
                },
                ..
            }
        ));
        assert_eq!(rule.bind(&noises()).expect("known names").condition_count(), 3);
    }

    #[test]
    fn unknown_names_fail_to_bind() {
        let noises = noises();
        let block = parse(r#"{"type":"block","result_state":{"Name":"minecraft:netherrack"}}"#);
        assert!(matches!(block.bind(&noises), Err(WorldgenError::UnknownBlock(_))));

        let noise = parse(
            r#"{"type":"condition","if_true":{"type":"noise_threshold","noise":"minecraft:nope",
                "min_threshold":0.0,"max_threshold":1.0},
                "then_run":{"type":"block","result_state":{"Name":"stone"}}}"#,
        );
        assert!(matches!(noise.bind(&noises), Err(WorldgenError::MissingNoise(_))));
    }

    #[test]
    fn anchors_resolve_against_the_generation_range() {
        let generation = generation();
        assert_eq!(VerticalAnchor::BOTTOM.resolve_y(&generation), -64);
        assert_eq!(VerticalAnchor::AboveBottom(5).resolve_y(&generation), -59);
        assert_eq!(VerticalAnchor::TOP.resolve_y(&generation), 319);
        assert_eq!(VerticalAnchor::Absolute(63).resolve_y(&generation), 63);
    }

    #[test]
    fn sequences_stop_at_the_first_opinion() {
        let noises = noises();
        let system = system(&noises);
        let rule = parse(
            r#"{"type":"sequence","sequence":[
                {"type":"block","result_state":{"Name":"grass_block"}},
                {"type":"condition","if_true":{"type":"noise_threshold","noise":"surface",
                    "min_threshold":-10.0,"max_threshold":10.0},
                 "then_run":{"type":"block","result_state":{"Name":"dirt"}}},
                {"type":"condition","if_true":{"type":"steep"},
                 "then_run":{"type":"block","result_state":{"Name":"dirt"}}}
            ]}"#,
        )
        .bind(&noises)
        .expect("known names");
        let chunk = chunk();
        let mut preliminary = FlatSurface(64);
        let mut context = SurfaceContext::new(&system, &rule, &mut preliminary, generation());
        context.update_xz(3, 4);
        context.update_y(0, 5, i32::MIN, 3, 70, 4);

        assert_eq!(rule.try_apply(&mut context, &chunk), Some(GRASS_BLOCK));
        assert_eq!(context.computations, 0);
    }

    #[test]
    fn block_conditions_recompute_once_per_update() {
        let noises = noises();
        let system = system(&noises);
        let rule = parse(
            r#"{"type":"condition","if_true":{"type":"y_above","anchor":{"absolute":60},
                "surface_depth_multiplier":0,"add_stone_depth":false},
                "then_run":{"type":"block","result_state":{"Name":"dirt"}}}"#,
        )
        .bind(&noises)
        .expect("known names");
        let chunk = chunk();
        let mut preliminary = FlatSurface(64);
        let mut context = SurfaceContext::new(&system, &rule, &mut preliminary, generation());
        context.update_xz(0, 0);
        context.update_y(0, 1, i32::MIN, 0, 70, 0);

        assert_eq!(rule.try_apply(&mut context, &chunk), Some(DIRT));
        assert_eq!(rule.try_apply(&mut context, &chunk), Some(DIRT));
        assert_eq!(context.computations, 1);

        context.update_y(0, 1, i32::MIN, 0, 50, 0);
        assert_eq!(rule.try_apply(&mut context, &chunk), None);
        assert_eq!(rule.try_apply(&mut context, &chunk), None);
        assert_eq!(context.computations, 2);
    }

    #[test]
    fn column_conditions_survive_block_updates() {
        let noises = noises();
        let system = system(&noises);
        let rule = parse(
            r#"{"type":"condition","if_true":{"type":"hole"},
                "then_run":{"type":"block","result_state":{"Name":"dirt"}}}"#,
        )
        .bind(&noises)
        .expect("known names");
        let chunk = chunk();
        let mut preliminary = FlatSurface(64);
        let mut context = SurfaceContext::new(&system, &rule, &mut preliminary, generation());
        context.update_xz(0, 0);
        for y in (0..10).rev() {
            context.update_y(0, 1, i32::MIN, 0, y, 0);
            let _ = rule.try_apply(&mut context, &chunk);
        }
        assert_eq!(context.computations, 1);

        context.update_xz(1, 0);
        let _ = rule.try_apply(&mut context, &chunk);
        assert_eq!(context.computations, 2);
    }

    #[test]
    fn water_and_stone_depth_checks() {
        let noises = noises();
        let system = system(&noises);
        let rule = parse(
            r#"{"type":"condition","if_true":{"type":"stone_depth","offset":0,"add_surface_depth":false,
                "secondary_depth_range":0,"surface_type":"floor"},
                "then_run":{"type":"sequence","sequence":[
                    {"type":"condition","if_true":{"type":"water","offset":0,"surface_depth_multiplier":0,
                        "add_stone_depth":false},
                     "then_run":{"type":"block","result_state":{"Name":"grass_block"}}},
                    {"type":"block","result_state":{"Name":"dirt"}}]}}"#,
        )
        .bind(&noises)
        .expect("known names");
        let chunk = chunk();
        let mut preliminary = FlatSurface(64);
        let mut context = SurfaceContext::new(&system, &rule, &mut preliminary, generation());
        context.update_xz(0, 0);

        context.update_y(1, 10, i32::MIN, 0, 70, 0);
        assert_eq!(rule.try_apply(&mut context, &chunk), Some(GRASS_BLOCK));

        context.update_y(1, 10, 75, 0, 70, 0);
        assert_eq!(rule.try_apply(&mut context, &chunk), Some(DIRT));

        context.update_y(2, 10, i32::MIN, 0, 69, 0);
        assert_eq!(rule.try_apply(&mut context, &chunk), None);
    }

    #[test]
    fn open_columns_do_not_overflow_the_surface_level() {
        let noises = noises();
        let system = system(&noises);
        let rule = parse(r#"{"type":"sequence","sequence":[]}"#).bind(&noises).expect("empty");
        let mut preliminary = FlatSurface(i32::MAX);
        let mut context = SurfaceContext::new(&system, &rule, &mut preliminary, generation());
        context.update_xz(5, 5);
        assert!(context.min_surface_level() > 1_000_000);

        let mut preliminary = FlatSurface(64);
        let mut context = SurfaceContext::new(&system, &rule, &mut preliminary, generation());
        context.update_xz(5, 5);
        assert_eq!(context.min_surface_level(), 64 + context.surface_depth() - 8);
    }
}
