//! The built-in overworld surface rules.

use std::collections::BTreeMap;

use steel_utils::ResourceLocation;

use super::rules::{BlockResult, CaveSurface, ConditionSource, RuleSource, VerticalAnchor};

fn key(path: &'static str) -> ResourceLocation {
    ResourceLocation::vanilla_static(path)
}

fn block(name: &'static str) -> RuleSource {
    RuleSource::Block {
        result_state: BlockResult {
            name: key(name),
            properties: BTreeMap::new(),
        },
    }
}

fn sequence(rules: impl IntoIterator<Item = RuleSource>) -> RuleSource {
    RuleSource::Sequence {
        sequence: rules.into_iter().collect(),
    }
}

fn if_true(condition: ConditionSource, rule: RuleSource) -> RuleSource {
    RuleSource::Condition {
        if_true: condition,
        then_run: Box::new(rule),
    }
}

fn not(condition: ConditionSource) -> ConditionSource {
    ConditionSource::Not {
        invert: Box::new(condition),
    }
}

fn biome(names: &[&'static str]) -> ConditionSource {
    ConditionSource::Biome {
        biome_is: names.iter().map(|&name| key(name)).collect(),
    }
}

fn noise(name: &'static str, min: f64, max: f64) -> ConditionSource {
    ConditionSource::NoiseThreshold {
        noise: key(name),
        min_threshold: min,
        max_threshold: max,
    }
}

fn noise_above(name: &'static str, min: f64) -> ConditionSource {
    noise(name, min, f64::MAX)
}

fn surface_noise_above(value: f64) -> ConditionSource {
    noise_above("surface", value / 8.25)
}

fn y_above(y: i32, surface_depth_multiplier: i32, add_stone_depth: bool) -> ConditionSource {
    ConditionSource::YAbove {
        anchor: VerticalAnchor::Absolute(y),
        surface_depth_multiplier,
        add_stone_depth,
    }
}

fn water(offset: i32, surface_depth_multiplier: i32, add_stone_depth: bool) -> ConditionSource {
    ConditionSource::Water {
        offset,
        surface_depth_multiplier,
        add_stone_depth,
    }
}

fn stone_depth(add_surface_depth: bool, secondary_depth_range: i32, surface_type: CaveSurface) -> ConditionSource {
    ConditionSource::StoneDepth {
        offset: 0,
        add_surface_depth,
        secondary_depth_range,
        surface_type,
    }
}

fn vertical_gradient(name: &'static str, below: VerticalAnchor, above: VerticalAnchor) -> ConditionSource {
    ConditionSource::VerticalGradient {
        random_name: key(name),
        true_at_and_below: below,
        false_at_and_above: above,
    }
}

/// Surface rules of the default overworld: a bedrock floor, biome surfaces
/// above the preliminary surface and a deepslate transition around y = 0.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn overworld() -> RuleSource {
    let on_floor = || stone_depth(false, 0, CaveSurface::Floor);
    let under_floor = || stone_depth(true, 0, CaveSurface::Floor);
    let deep_under_floor = || stone_depth(true, 6, CaveSurface::Floor);
    let very_deep_under_floor = || stone_depth(true, 30, CaveSurface::Floor);
    let on_ceiling = || stone_depth(false, 0, CaveSurface::Ceiling);

    let y97 = || y_above(97, 2, false);
    let y256 = || y_above(256, 0, false);
    let y63_start = || y_above(63, -1, true);
    let y74_start = || y_above(74, 1, true);
    let y60 = || y_above(60, 0, false);
    let y62 = || y_above(62, 0, false);
    let y63 = || y_above(63, 0, false);
    let above_water = || water(-1, 0, false);
    let at_water = || water(0, 0, false);
    let near_water = || water(-6, -1, true);
    let frozen_ocean = || biome(&["frozen_ocean", "deep_frozen_ocean"]);
    let warm_ocean = || biome(&["warm_ocean", "beach", "snowy_beach"]);
    let desert = || biome(&["desert"]);

    let grass_or_dirt = || sequence([if_true(at_water(), block("grass_block")), block("dirt")]);
    let sand = || sequence([if_true(on_ceiling(), block("sandstone")), block("sand")]);
    let gravel = || sequence([if_true(on_ceiling(), block("stone")), block("gravel")]);

    let stony = || {
        sequence([
            if_true(
                biome(&["stony_peaks"]),
                sequence([
                    if_true(noise("calcite", -0.0125, 0.0125), block("calcite")),
                    block("stone"),
                ]),
            ),
            if_true(
                biome(&["stony_shore"]),
                sequence([if_true(noise("gravel", -0.05, 0.05), gravel()), block("stone")]),
            ),
            if_true(
                biome(&["windswept_hills"]),
                if_true(surface_noise_above(1.0), block("stone")),
            ),
            if_true(warm_ocean(), sand()),
            if_true(desert(), sand()),
            if_true(biome(&["dripstone_caves"]), block("stone")),
        ])
    };
    let powder_snow = |min, max| {
        if_true(
            noise("powder_snow", min, max),
            if_true(at_water(), block("powder_snow")),
        )
    };

    let under_surface = sequence([
        if_true(
            biome(&["frozen_peaks"]),
            sequence([
                if_true(ConditionSource::Steep, block("packed_ice")),
                if_true(noise("packed_ice", -0.5, 0.2), block("packed_ice")),
                if_true(noise("ice", -0.0625, 0.025), block("ice")),
                if_true(at_water(), block("snow_block")),
            ]),
        ),
        if_true(
            biome(&["snowy_slopes"]),
            sequence([
                if_true(ConditionSource::Steep, block("stone")),
                powder_snow(0.35, 0.6),
                if_true(at_water(), block("snow_block")),
            ]),
        ),
        if_true(biome(&["jagged_peaks"]), block("stone")),
        if_true(
            biome(&["grove"]),
            sequence([powder_snow(0.35, 0.6), block("dirt")]),
        ),
        stony(),
        if_true(
            biome(&["windswept_savanna"]),
            if_true(surface_noise_above(1.75), block("stone")),
        ),
        if_true(
            biome(&["windswept_gravelly_hills"]),
            sequence([
                if_true(surface_noise_above(2.0), gravel()),
                if_true(surface_noise_above(1.0), block("stone")),
                if_true(surface_noise_above(-1.0), block("dirt")),
                gravel(),
            ]),
        ),
        if_true(biome(&["mangrove_swamp"]), block("mud")),
        block("dirt"),
    ]);

    let top_surface = sequence([
        if_true(
            biome(&["frozen_peaks"]),
            sequence([
                if_true(ConditionSource::Steep, block("packed_ice")),
                if_true(noise("packed_ice", 0.0, 0.2), block("packed_ice")),
                if_true(noise("ice", 0.0, 0.025), block("ice")),
                if_true(at_water(), block("snow_block")),
            ]),
        ),
        if_true(
            biome(&["snowy_slopes"]),
            sequence([
                if_true(ConditionSource::Steep, block("stone")),
                powder_snow(0.45, 0.58),
                if_true(at_water(), block("snow_block")),
            ]),
        ),
        if_true(
            biome(&["jagged_peaks"]),
            sequence([
                if_true(ConditionSource::Steep, block("stone")),
                if_true(at_water(), block("snow_block")),
            ]),
        ),
        if_true(
            biome(&["grove"]),
            sequence([
                powder_snow(0.45, 0.58),
                if_true(at_water(), block("snow_block")),
            ]),
        ),
        stony(),
        if_true(
            biome(&["windswept_savanna"]),
            sequence([
                if_true(surface_noise_above(1.75), block("stone")),
                if_true(surface_noise_above(-0.5), block("coarse_dirt")),
            ]),
        ),
        if_true(
            biome(&["windswept_gravelly_hills"]),
            sequence([
                if_true(surface_noise_above(2.0), gravel()),
                if_true(surface_noise_above(1.0), block("stone")),
                if_true(surface_noise_above(-1.0), grass_or_dirt()),
                gravel(),
            ]),
        ),
        if_true(
            biome(&["old_growth_pine_taiga", "old_growth_spruce_taiga"]),
            sequence([
                if_true(surface_noise_above(1.75), block("coarse_dirt")),
                if_true(surface_noise_above(-0.95), block("podzol")),
            ]),
        ),
        if_true(
            biome(&["ice_spikes"]),
            if_true(at_water(), block("snow_block")),
        ),
        if_true(biome(&["mangrove_swamp"]), block("mud")),
        if_true(biome(&["mushroom_fields"]), block("mycelium")),
        grass_or_dirt(),
    ]);

    let coarse_patches = || noise("surface", -0.909, -0.5454);
    let middle_patches = || noise("surface", -0.1818, 0.1818);
    let fine_patches = || noise("surface", 0.5454, 0.909);
    let patches = |rule: fn() -> RuleSource, rest: RuleSource| {
        sequence([
            if_true(coarse_patches(), rule()),
            if_true(middle_patches(), rule()),
            if_true(fine_patches(), rule()),
            rest,
        ])
    };

    let surface = sequence([
        if_true(
            on_floor(),
            sequence([
                if_true(
                    biome(&["wooded_badlands"]),
                    if_true(y97(), patches(|| block("coarse_dirt"), grass_or_dirt())),
                ),
                if_true(
                    biome(&["swamp"]),
                    if_true(
                        y62(),
                        if_true(
                            not(y63()),
                            if_true(noise_above("surface_swamp", 0.0), block("water")),
                        ),
                    ),
                ),
                if_true(
                    biome(&["mangrove_swamp"]),
                    if_true(
                        y60(),
                        if_true(
                            not(y63()),
                            if_true(noise_above("surface_swamp", 0.0), block("water")),
                        ),
                    ),
                ),
            ]),
        ),
        if_true(
            biome(&["badlands", "eroded_badlands", "wooded_badlands"]),
            sequence([
                if_true(
                    on_floor(),
                    sequence([
                        if_true(y256(), block("orange_terracotta")),
                        if_true(
                            y74_start(),
                            patches(|| block("terracotta"), RuleSource::Bandlands),
                        ),
                        if_true(
                            above_water(),
                            sequence([
                                if_true(on_ceiling(), block("red_sandstone")),
                                block("red_sand"),
                            ]),
                        ),
                        if_true(not(ConditionSource::Hole), block("orange_terracotta")),
                        if_true(near_water(), block("white_terracotta")),
                        gravel(),
                    ]),
                ),
                if_true(
                    y63_start(),
                    sequence([
                        if_true(
                            y63(),
                            if_true(not(y74_start()), block("orange_terracotta")),
                        ),
                        RuleSource::Bandlands,
                    ]),
                ),
                if_true(under_floor(), if_true(near_water(), block("white_terracotta"))),
            ]),
        ),
        if_true(
            on_floor(),
            if_true(
                above_water(),
                sequence([
                    if_true(
                        frozen_ocean(),
                        if_true(
                            ConditionSource::Hole,
                            sequence([
                                if_true(at_water(), block("air")),
                                if_true(ConditionSource::Temperature, block("ice")),
                                block("water"),
                            ]),
                        ),
                    ),
                    top_surface,
                ]),
            ),
        ),
        if_true(
            near_water(),
            sequence([
                if_true(
                    on_floor(),
                    if_true(frozen_ocean(), if_true(ConditionSource::Hole, block("water"))),
                ),
                if_true(under_floor(), under_surface),
                if_true(warm_ocean(), if_true(deep_under_floor(), block("sandstone"))),
                if_true(desert(), if_true(very_deep_under_floor(), block("sandstone"))),
            ]),
        ),
        if_true(
            on_floor(),
            sequence([
                if_true(biome(&["frozen_peaks", "jagged_peaks"]), block("stone")),
                if_true(
                    biome(&["warm_ocean", "lukewarm_ocean", "deep_lukewarm_ocean"]),
                    sand(),
                ),
                gravel(),
            ]),
        ),
    ]);

    sequence([
        if_true(
            vertical_gradient("bedrock_floor", VerticalAnchor::BOTTOM, VerticalAnchor::AboveBottom(5)),
            block("bedrock"),
        ),
        if_true(ConditionSource::AbovePreliminarySurface, surface),
        if_true(
            vertical_gradient("deepslate", VerticalAnchor::Absolute(0), VerticalAnchor::Absolute(8)),
            block("deepslate"),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use steel_utils::{
        noise::NoiseParameterRegistry,
        random::{Random, RandomSource},
    };

    use super::*;
    use crate::random_state::NoiseCache;

    #[test]
    fn every_name_binds() {
        let noises = NoiseCache::new(
            NoiseParameterRegistry::vanilla(),
            RandomSource::create(0, false).next_positional(),
        );
        let rule = overworld().bind(&noises).expect("vanilla names");
        assert!(rule.condition_count() > 100);
    }

    #[test]
    fn survives_a_json_round_trip() {
        let rule = overworld();
        let json = serde_json::to_string(&rule).expect("serializable");
        assert!(json.starts_with(r#"{"type":"minecraft:sequence""#));
        assert_eq!(RuleSource::from_json(&json).expect("parses back"), rule);
    }
}
