//! The vanilla density function registry and the overworld routers built on it.
//!
//! Everything here is assembled from [`DensityGraph`] builders, so constant
//! folding and deduplication match what loading the same functions from data
//! files would produce.

use serde::{Deserialize, Serialize};

use crate::{
    density::{
        BlendedNoiseSettings, DensityFunctionRegistry, DensityGraph, NodeId, RarityMapper,
        ShiftKind, function::Value, terrain_shaper,
    },
    error::WorldgenError,
    noise::NoiseParameterRegistry,
    types::ResourceLocation,
};

use super::NoiseRouter;

/// Added to the offset spline so sea level terrain sits at density zero.
pub const GLOBAL_OFFSET: f32 = -0.503_75;
const ORE_THICKNESS: f32 = 0.08;
const VEININESS_FREQUENCY: f64 = 1.5;
const NOODLE_SPACING_AND_STRAIGHTNESS: f64 = 1.5;
const SURFACE_DENSITY_THRESHOLD: f64 = 1.5625;
const CHEESE_NOISE_TARGET: f64 = -0.703_125;
const BLENDING_FACTOR: f64 = 10.0;
const BLENDING_JAGGEDNESS: f64 = 0.0;

/// Lowest and highest y any dimension may use.
const DIMENSION_MIN_Y: i32 = -2032;
const DIMENSION_MAX_Y: i32 = 2031;

/// Lowest y of iron veins.
pub const VEIN_MIN_Y: i32 = -60;
/// Highest y of copper veins.
pub const VEIN_MAX_Y: i32 = 50;

/// Which overworld flavour a router is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverworldPreset {
    /// The default overworld.
    #[default]
    Normal,
    /// Climate noises stretched four times wider.
    LargeBiomes,
    /// Exaggerated terrain heights.
    Amplified,
}

impl OverworldPreset {
    /// Whether the climate noises use the wide variants.
    #[must_use]
    pub const fn is_large(self) -> bool {
        matches!(self, Self::LargeBiomes)
    }

    /// Whether terrain uses the amplified shaping splines.
    #[must_use]
    pub const fn is_amplified(self) -> bool {
        matches!(self, Self::Amplified)
    }
}

/// Names of the registered density functions.
#[allow(missing_docs)]
pub mod keys {
    use crate::types::ResourceLocation;

    const fn key(path: &'static str) -> ResourceLocation {
        ResourceLocation::vanilla_static(path)
    }

    pub const ZERO: ResourceLocation = key("zero");
    pub const Y: ResourceLocation = key("y");
    pub const SHIFT_X: ResourceLocation = key("shift_x");
    pub const SHIFT_Z: ResourceLocation = key("shift_z");
    pub const BASE_3D_NOISE_OVERWORLD: ResourceLocation = key("overworld/base_3d_noise");
    pub const CONTINENTS: ResourceLocation = key("overworld/continents");
    pub const EROSION: ResourceLocation = key("overworld/erosion");
    pub const RIDGES: ResourceLocation = key("overworld/ridges");
    pub const RIDGES_FOLDED: ResourceLocation = key("overworld/ridges_folded");
    pub const OFFSET: ResourceLocation = key("overworld/offset");
    pub const FACTOR: ResourceLocation = key("overworld/factor");
    pub const JAGGEDNESS: ResourceLocation = key("overworld/jaggedness");
    pub const DEPTH: ResourceLocation = key("overworld/depth");
    pub const SLOPED_CHEESE: ResourceLocation = key("overworld/sloped_cheese");
    pub const CONTINENTS_LARGE: ResourceLocation = key("overworld_large_biomes/continents");
    pub const EROSION_LARGE: ResourceLocation = key("overworld_large_biomes/erosion");
    pub const FACTOR_LARGE: ResourceLocation = key("overworld_large_biomes/factor");
    pub const OFFSET_LARGE: ResourceLocation = key("overworld_large_biomes/offset");
    pub const JAGGEDNESS_LARGE: ResourceLocation = key("overworld_large_biomes/jaggedness");
    pub const DEPTH_LARGE: ResourceLocation = key("overworld_large_biomes/depth");
    pub const SLOPED_CHEESE_LARGE: ResourceLocation = key("overworld_large_biomes/sloped_cheese");
    pub const OFFSET_AMPLIFIED: ResourceLocation = key("overworld_amplified/offset");
    pub const FACTOR_AMPLIFIED: ResourceLocation = key("overworld_amplified/factor");
    pub const JAGGEDNESS_AMPLIFIED: ResourceLocation = key("overworld_amplified/jaggedness");
    pub const DEPTH_AMPLIFIED: ResourceLocation = key("overworld_amplified/depth");
    pub const SLOPED_CHEESE_AMPLIFIED: ResourceLocation = key("overworld_amplified/sloped_cheese");
    pub const SPAGHETTI_ROUGHNESS_FUNCTION: ResourceLocation =
        key("overworld/caves/spaghetti_roughness_function");
    pub const ENTRANCES: ResourceLocation = key("overworld/caves/entrances");
    pub const NOODLE: ResourceLocation = key("overworld/caves/noodle");
    pub const PILLARS: ResourceLocation = key("overworld/caves/pillars");
    pub const SPAGHETTI_2D_THICKNESS_MODULATOR: ResourceLocation =
        key("overworld/caves/spaghetti_2d_thickness_modulator");
    pub const SPAGHETTI_2D: ResourceLocation = key("overworld/caves/spaghetti_2d");
}

/// Names of the noises the overworld samples.
#[allow(missing_docs)]
pub mod noises {
    use crate::types::ResourceLocation;

    const fn key(path: &'static str) -> ResourceLocation {
        ResourceLocation::vanilla_static(path)
    }

    pub const TEMPERATURE: ResourceLocation = key("temperature");
    pub const VEGETATION: ResourceLocation = key("vegetation");
    pub const CONTINENTALNESS: ResourceLocation = key("continentalness");
    pub const EROSION: ResourceLocation = key("erosion");
    pub const TEMPERATURE_LARGE: ResourceLocation = key("temperature_large");
    pub const VEGETATION_LARGE: ResourceLocation = key("vegetation_large");
    pub const CONTINENTALNESS_LARGE: ResourceLocation = key("continentalness_large");
    pub const EROSION_LARGE: ResourceLocation = key("erosion_large");
    pub const RIDGE: ResourceLocation = key("ridge");
    pub const SHIFT: ResourceLocation = key("offset");
    pub const AQUIFER_BARRIER: ResourceLocation = key("aquifer_barrier");
    pub const AQUIFER_FLUID_LEVEL_FLOODEDNESS: ResourceLocation =
        key("aquifer_fluid_level_floodedness");
    pub const AQUIFER_LAVA: ResourceLocation = key("aquifer_lava");
    pub const AQUIFER_FLUID_LEVEL_SPREAD: ResourceLocation = key("aquifer_fluid_level_spread");
    pub const PILLAR: ResourceLocation = key("pillar");
    pub const PILLAR_RARENESS: ResourceLocation = key("pillar_rareness");
    pub const PILLAR_THICKNESS: ResourceLocation = key("pillar_thickness");
    pub const SPAGHETTI_2D: ResourceLocation = key("spaghetti_2d");
    pub const SPAGHETTI_2D_ELEVATION: ResourceLocation = key("spaghetti_2d_elevation");
    pub const SPAGHETTI_2D_MODULATOR: ResourceLocation = key("spaghetti_2d_modulator");
    pub const SPAGHETTI_2D_THICKNESS: ResourceLocation = key("spaghetti_2d_thickness");
    pub const SPAGHETTI_3D_1: ResourceLocation = key("spaghetti_3d_1");
    pub const SPAGHETTI_3D_2: ResourceLocation = key("spaghetti_3d_2");
    pub const SPAGHETTI_3D_RARITY: ResourceLocation = key("spaghetti_3d_rarity");
    pub const SPAGHETTI_3D_THICKNESS: ResourceLocation = key("spaghetti_3d_thickness");
    pub const SPAGHETTI_ROUGHNESS: ResourceLocation = key("spaghetti_roughness");
    pub const SPAGHETTI_ROUGHNESS_MODULATOR: ResourceLocation =
        key("spaghetti_roughness_modulator");
    pub const CAVE_ENTRANCE: ResourceLocation = key("cave_entrance");
    pub const CAVE_LAYER: ResourceLocation = key("cave_layer");
    pub const CAVE_CHEESE: ResourceLocation = key("cave_cheese");
    pub const ORE_VEININESS: ResourceLocation = key("ore_veininess");
    pub const ORE_VEIN_A: ResourceLocation = key("ore_vein_a");
    pub const ORE_VEIN_B: ResourceLocation = key("ore_vein_b");
    pub const ORE_GAP: ResourceLocation = key("ore_gap");
    pub const NOODLE: ResourceLocation = key("noodle");
    pub const NOODLE_THICKNESS: ResourceLocation = key("noodle_thickness");
    pub const NOODLE_RIDGE_A: ResourceLocation = key("noodle_ridge_a");
    pub const NOODLE_RIDGE_B: ResourceLocation = key("noodle_ridge_b");
    pub const JAGGED: ResourceLocation = key("jagged");
}

const fn blended_settings(
    xz_scale: f64,
    y_scale: f64,
    xz_factor: f64,
    y_factor: f64,
    smear_scale_multiplier: f64,
) -> BlendedNoiseSettings {
    BlendedNoiseSettings {
        xz_scale: Value(xz_scale),
        y_scale: Value(y_scale),
        xz_factor: Value(xz_factor),
        y_factor: Value(y_factor),
        smear_scale_multiplier: Value(smear_scale_multiplier),
    }
}

/// Registers every named overworld density function.
pub fn bootstrap(noise_registry: NoiseParameterRegistry) -> Result<DensityFunctionRegistry, WorldgenError> {
    let mut r = DensityFunctionRegistry::new(noise_registry);

    let zero = r.graph_mut().zero();
    r.register(keys::ZERO, zero);
    let (min_y, max_y) = (DIMENSION_MIN_Y * 2, DIMENSION_MAX_Y * 2);
    let y = r
        .graph_mut()
        .y_clamped_gradient(min_y, max_y, f64::from(min_y), f64::from(max_y));
    r.register(keys::Y, y);

    let shift_noise = r.noise(&noises::SHIFT)?;
    let g = r.graph_mut();
    let shift_a = g.shift(ShiftKind::A, shift_noise.clone());
    let shift_a = g.cache_2d(shift_a);
    let shift_a = g.flat_cache(shift_a);
    let shift_b = g.shift(ShiftKind::B, shift_noise);
    let shift_b = g.cache_2d(shift_b);
    let shift_b = g.flat_cache(shift_b);
    let shift_x = r.register(keys::SHIFT_X, shift_a);
    let shift_z = r.register(keys::SHIFT_Z, shift_b);

    let base = r
        .graph_mut()
        .blended_noise(blended_settings(0.25, 0.125, 80.0, 160.0, 8.0));
    r.register(keys::BASE_3D_NOISE_OVERWORLD, base);

    let continents = shifted_climate(&mut r, shift_x, shift_z, &noises::CONTINENTALNESS)?;
    let continents = r.register(keys::CONTINENTS, continents);
    let erosion = shifted_climate(&mut r, shift_x, shift_z, &noises::EROSION)?;
    let erosion = r.register(keys::EROSION, erosion);
    let ridges = shifted_climate(&mut r, shift_x, shift_z, &noises::RIDGE)?;
    let ridges = r.register(keys::RIDGES, ridges);
    let folded = peaks_and_valleys(r.graph_mut(), ridges);
    r.register(keys::RIDGES_FOLDED, folded);

    let jagged_noise = r.noise(&noises::JAGGED)?;
    let jagged = r.graph_mut().noise(jagged_noise, 1500.0, 0.0);

    register_terrain_noises(
        &mut r,
        jagged,
        continents,
        erosion,
        &TerrainKeys::NORMAL,
        false,
    )?;

    let continents_large =
        shifted_climate(&mut r, shift_x, shift_z, &noises::CONTINENTALNESS_LARGE)?;
    let continents_large = r.register(keys::CONTINENTS_LARGE, continents_large);
    let erosion_large = shifted_climate(&mut r, shift_x, shift_z, &noises::EROSION_LARGE)?;
    let erosion_large = r.register(keys::EROSION_LARGE, erosion_large);
    register_terrain_noises(
        &mut r,
        jagged,
        continents_large,
        erosion_large,
        &TerrainKeys::LARGE,
        false,
    )?;
    register_terrain_noises(
        &mut r,
        jagged,
        continents,
        erosion,
        &TerrainKeys::AMPLIFIED,
        true,
    )?;

    let roughness = spaghetti_roughness_function(&mut r)?;
    r.register(keys::SPAGHETTI_ROUGHNESS_FUNCTION, roughness);
    let modulator_noise = r.noise(&noises::SPAGHETTI_2D_THICKNESS)?;
    let g = r.graph_mut();
    let modulator = g.mapped_noise(modulator_noise, 2.0, 1.0, -0.6, -1.3);
    let modulator = g.cache_once(modulator);
    r.register(keys::SPAGHETTI_2D_THICKNESS_MODULATOR, modulator);
    let spaghetti = spaghetti_2d(&mut r)?;
    r.register(keys::SPAGHETTI_2D, spaghetti);
    let entrances = entrances(&mut r)?;
    r.register(keys::ENTRANCES, entrances);
    let noodle = noodle(&mut r)?;
    r.register(keys::NOODLE, noodle);
    let pillars = pillars(&mut r)?;
    r.register(keys::PILLARS, pillars);

    log::debug!(
        "Registered {} density functions in {} nodes",
        r.len(),
        r.graph().len()
    );
    Ok(r)
}

fn shifted_climate(
    r: &mut DensityFunctionRegistry,
    shift_x: NodeId,
    shift_z: NodeId,
    noise: &ResourceLocation,
) -> Result<NodeId, WorldgenError> {
    let noise = r.noise(noise)?;
    let g = r.graph_mut();
    let sampled = g.shifted_noise_2d(shift_x, shift_z, 0.25, noise);
    Ok(g.flat_cache(sampled))
}

/// `-3 * (| |r| - 2/3 | - 1/3)`
fn peaks_and_valleys(g: &mut DensityGraph, ridges: NodeId) -> NodeId {
    let abs = g.abs(ridges);
    let two_thirds = g.constant(-0.666_666_666_666_666_6);
    let shifted = g.add_fn(abs, two_thirds);
    let folded = g.abs(shifted);
    let third = g.constant(-0.333_333_333_333_333_3);
    let centered = g.add_fn(folded, third);
    let scale = g.constant(-3.0);
    g.mul(centered, scale)
}

struct TerrainKeys {
    offset: ResourceLocation,
    factor: ResourceLocation,
    jaggedness: ResourceLocation,
    depth: ResourceLocation,
    sloped_cheese: ResourceLocation,
}

impl TerrainKeys {
    const NORMAL: Self = Self {
        offset: keys::OFFSET,
        factor: keys::FACTOR,
        jaggedness: keys::JAGGEDNESS,
        depth: keys::DEPTH,
        sloped_cheese: keys::SLOPED_CHEESE,
    };
    const LARGE: Self = Self {
        offset: keys::OFFSET_LARGE,
        factor: keys::FACTOR_LARGE,
        jaggedness: keys::JAGGEDNESS_LARGE,
        depth: keys::DEPTH_LARGE,
        sloped_cheese: keys::SLOPED_CHEESE_LARGE,
    };
    const AMPLIFIED: Self = Self {
        offset: keys::OFFSET_AMPLIFIED,
        factor: keys::FACTOR_AMPLIFIED,
        jaggedness: keys::JAGGEDNESS_AMPLIFIED,
        depth: keys::DEPTH_AMPLIFIED,
        sloped_cheese: keys::SLOPED_CHEESE_AMPLIFIED,
    };
}

fn register_terrain_noises(
    r: &mut DensityFunctionRegistry,
    jagged: NodeId,
    continents: NodeId,
    erosion: NodeId,
    keys: &TerrainKeys,
    amplified: bool,
) -> Result<(), WorldgenError> {
    let ridges = r.reference(&keys::RIDGES)?;
    let folded = r.reference(&keys::RIDGES_FOLDED)?;
    let g = r.graph();
    let c = g.spline_coordinate(continents);
    let e = g.spline_coordinate(erosion);
    let w = g.spline_coordinate(ridges);
    let pv = g.spline_coordinate(folded);

    let offset_spline = terrain_shaper::overworld_offset(c, e, pv, amplified)?;
    let factor_spline = terrain_shaper::overworld_factor(c, e, w, pv, amplified)?;
    let jaggedness_spline = terrain_shaper::overworld_jaggedness(c, e, w, pv, amplified)?;

    let g = r.graph_mut();
    let global_offset = g.constant(f64::from(GLOBAL_OFFSET));
    let offset = g.spline(offset_spline);
    let offset = g.add_fn(global_offset, offset);
    let blend_offset = g.blend_offset();
    let offset = spline_with_blending(g, offset, blend_offset);
    let offset = r.register(keys.offset.clone(), offset);

    let g = r.graph_mut();
    let factor = g.spline(factor_spline);
    let blending_factor = g.constant(BLENDING_FACTOR);
    let factor = spline_with_blending(g, factor, blending_factor);
    let factor = r.register(keys.factor.clone(), factor);

    let g = r.graph_mut();
    let gradient = g.y_clamped_gradient(-64, 320, 1.5, -1.5);
    let depth = g.add_fn(gradient, offset);
    let depth = r.register(keys.depth.clone(), depth);

    let g = r.graph_mut();
    let jaggedness = g.spline(jaggedness_spline);
    let blending_jaggedness = g.constant(BLENDING_JAGGEDNESS);
    let jaggedness = spline_with_blending(g, jaggedness, blending_jaggedness);
    let jaggedness = r.register(keys.jaggedness.clone(), jaggedness);

    let g = r.graph_mut();
    let half_negative = g.half_negative(jagged);
    let jagged_depth = g.mul(jaggedness, half_negative);
    let depth_with_jaggedness = g.add_fn(depth, jagged_depth);
    let gradient_density = noise_gradient_density(g, factor, depth_with_jaggedness);
    let base = r.reference(&keys::BASE_3D_NOISE_OVERWORLD)?;
    let sloped_cheese = r.graph_mut().add_fn(gradient_density, base);
    r.register(keys.sloped_cheese.clone(), sloped_cheese);
    Ok(())
}

fn spline_with_blending(g: &mut DensityGraph, spline: NodeId, blending_target: NodeId) -> NodeId {
    let alpha = g.blend_alpha();
    let blended = g.lerp(alpha, blending_target, spline);
    let cached = g.cache_2d(blended);
    g.flat_cache(cached)
}

fn noise_gradient_density(g: &mut DensityGraph, factor: NodeId, depth: NodeId) -> NodeId {
    let product = g.mul(depth, factor);
    let four = g.constant(4.0);
    let quarter_negative = g.quarter_negative(product);
    g.mul(four, quarter_negative)
}

fn spaghetti_roughness_function(r: &mut DensityFunctionRegistry) -> Result<NodeId, WorldgenError> {
    let roughness_noise = r.noise(&noises::SPAGHETTI_ROUGHNESS)?;
    let modulator_noise = r.noise(&noises::SPAGHETTI_ROUGHNESS_MODULATOR)?;
    let g = r.graph_mut();
    let roughness = g.noise(roughness_noise, 1.0, 1.0);
    let modulator = g.mapped_noise(modulator_noise, 1.0, 1.0, 0.0, -0.1);
    let abs = g.abs(roughness);
    let offset = g.constant(-0.4);
    let shifted = g.add_fn(abs, offset);
    let product = g.mul(modulator, shifted);
    Ok(g.cache_once(product))
}

fn entrances(r: &mut DensityFunctionRegistry) -> Result<NodeId, WorldgenError> {
    let rarity_noise = r.noise(&noises::SPAGHETTI_3D_RARITY)?;
    let thickness_noise = r.noise(&noises::SPAGHETTI_3D_THICKNESS)?;
    let first_noise = r.noise(&noises::SPAGHETTI_3D_1)?;
    let second_noise = r.noise(&noises::SPAGHETTI_3D_2)?;
    let entrance_noise = r.noise(&noises::CAVE_ENTRANCE)?;
    let roughness = r.reference(&keys::SPAGHETTI_ROUGHNESS_FUNCTION)?;

    let g = r.graph_mut();
    let rarity = g.noise(rarity_noise, 2.0, 1.0);
    let rarity = g.cache_once(rarity);
    let thickness = g.mapped_noise(thickness_noise, 1.0, 1.0, -0.065, -0.088);
    let first = g.weird_scaled_sampler(rarity, first_noise, RarityMapper::Tunnels);
    let second = g.weird_scaled_sampler(rarity, second_noise, RarityMapper::Tunnels);
    let tunnels = g.max(first, second);
    let tunnels = g.add_fn(tunnels, thickness);
    let tunnels = g.clamp(tunnels, -1.0, 1.0);

    let entrance = g.noise(entrance_noise, 0.75, 0.5);
    let offset = g.constant(0.37);
    let entrance = g.add_fn(entrance, offset);
    let gradient = g.y_clamped_gradient(-10, 30, 0.3, 0.0);
    let entrance = g.add_fn(entrance, gradient);

    let rough_tunnels = g.add_fn(roughness, tunnels);
    let combined = g.min(entrance, rough_tunnels);
    Ok(g.cache_once(combined))
}

fn y_limited_interpolatable(
    g: &mut DensityGraph,
    y: NodeId,
    when_in_range: NodeId,
    min_y: i32,
    max_y: i32,
    when_out_of_range: i32,
) -> NodeId {
    let out_of_range = g.constant(f64::from(when_out_of_range));
    let choice = g.range_choice(
        y,
        f64::from(min_y),
        f64::from(max_y + 1),
        when_in_range,
        out_of_range,
    );
    g.interpolated(choice)
}

fn noodle(r: &mut DensityFunctionRegistry) -> Result<NodeId, WorldgenError> {
    let y = r.reference(&keys::Y)?;
    let noodle_noise = r.noise(&noises::NOODLE)?;
    let thickness_noise = r.noise(&noises::NOODLE_THICKNESS)?;
    let ridge_a_noise = r.noise(&noises::NOODLE_RIDGE_A)?;
    let ridge_b_noise = r.noise(&noises::NOODLE_RIDGE_B)?;

    let g = r.graph_mut();
    let (min_y, max_y) = (-60, 320);
    let toggle = g.noise(noodle_noise, 1.0, 1.0);
    let toggle = y_limited_interpolatable(g, y, toggle, min_y, max_y, -1);
    let thickness = g.mapped_noise(thickness_noise, 1.0, 1.0, -0.05, -0.1);
    let thickness = y_limited_interpolatable(g, y, thickness, min_y, max_y, 0);
    let ridge_scale = 2.666_666_666_666_666_5;
    let ridge_a = g.noise(ridge_a_noise, ridge_scale, ridge_scale);
    let ridge_a = y_limited_interpolatable(g, y, ridge_a, min_y, max_y, 0);
    let ridge_b = g.noise(ridge_b_noise, ridge_scale, ridge_scale);
    let ridge_b = y_limited_interpolatable(g, y, ridge_b, min_y, max_y, 0);

    let spacing = g.constant(NOODLE_SPACING_AND_STRAIGHTNESS);
    let abs_a = g.abs(ridge_a);
    let abs_b = g.abs(ridge_b);
    let ridges = g.max(abs_a, abs_b);
    let ridges = g.mul(spacing, ridges);
    let solid = g.constant(64.0);
    let tunnel = g.add_fn(thickness, ridges);
    Ok(g.range_choice(toggle, -1_000_000.0, 0.0, solid, tunnel))
}

fn pillars(r: &mut DensityFunctionRegistry) -> Result<NodeId, WorldgenError> {
    let pillar_noise = r.noise(&noises::PILLAR)?;
    let rareness_noise = r.noise(&noises::PILLAR_RARENESS)?;
    let thickness_noise = r.noise(&noises::PILLAR_THICKNESS)?;

    let g = r.graph_mut();
    let pillar = g.noise(pillar_noise, 25.0, 0.3);
    let rareness = g.mapped_noise(rareness_noise, 1.0, 1.0, 0.0, -2.0);
    let thickness = g.mapped_noise(thickness_noise, 1.0, 1.0, 0.0, 1.1);
    let two = g.constant(2.0);
    let doubled = g.mul(pillar, two);
    let shape = g.add_fn(doubled, rareness);
    let cubed = g.cube(thickness);
    let product = g.mul(shape, cubed);
    Ok(g.cache_once(product))
}

fn spaghetti_2d(r: &mut DensityFunctionRegistry) -> Result<NodeId, WorldgenError> {
    let modulator_noise = r.noise(&noises::SPAGHETTI_2D_MODULATOR)?;
    let spaghetti_noise = r.noise(&noises::SPAGHETTI_2D)?;
    let elevation_noise = r.noise(&noises::SPAGHETTI_2D_ELEVATION)?;
    let thickness_modulator = r.reference(&keys::SPAGHETTI_2D_THICKNESS_MODULATOR)?;

    let g = r.graph_mut();
    let modulator = g.noise(modulator_noise, 2.0, 1.0);
    let spaghetti = g.weird_scaled_sampler(modulator, spaghetti_noise, RarityMapper::Caves);
    let elevation =
        g.mapped_noise(elevation_noise, 1.0, 0.0, f64::from((-64i32).div_euclid(8)), 8.0);
    let gradient = g.y_clamped_gradient(-64, 320, 8.0, -40.0);
    let elevation = g.add_fn(elevation, gradient);
    let elevation = g.abs(elevation);
    let walls = g.add_fn(elevation, thickness_modulator);
    let walls = g.cube(walls);
    let scale = g.constant(0.083);
    let scaled_modulator = g.mul(scale, thickness_modulator);
    let tunnels = g.add_fn(spaghetti, scaled_modulator);
    let combined = g.max(tunnels, walls);
    Ok(g.clamp(combined, -1.0, 1.0))
}

fn underground(r: &mut DensityFunctionRegistry, sloped_cheese: NodeId) -> Result<NodeId, WorldgenError> {
    let spaghetti = r.reference(&keys::SPAGHETTI_2D)?;
    let roughness = r.reference(&keys::SPAGHETTI_ROUGHNESS_FUNCTION)?;
    let entrances = r.reference(&keys::ENTRANCES)?;
    let pillars = r.reference(&keys::PILLARS)?;
    let layer_noise = r.noise(&noises::CAVE_LAYER)?;
    let cheese_noise = r.noise(&noises::CAVE_CHEESE)?;

    let g = r.graph_mut();
    let layer = g.noise(layer_noise, 1.0, 8.0);
    let layer = g.square(layer);
    let four = g.constant(4.0);
    let layers = g.mul(four, layer);

    let cheese = g.noise(cheese_noise, 1.0, 0.666_666_666_666_666_6);
    let cheese_offset = g.constant(0.27);
    let cheese = g.add_fn(cheese_offset, cheese);
    let cheese = g.clamp(cheese, -1.0, 1.0);
    let base = g.constant(1.5);
    let slope = g.constant(-0.64);
    let sloped = g.mul(slope, sloped_cheese);
    let sloped = g.add_fn(base, sloped);
    let sloped = g.clamp(sloped, 0.0, 0.5);
    let cheese = g.add_fn(cheese, sloped);

    let caves = g.add_fn(layers, cheese);
    let caves = g.min(caves, entrances);
    let spaghetti = g.add_fn(spaghetti, roughness);
    let caves = g.min(caves, spaghetti);

    let no_pillar = g.constant(-1_000_000.0);
    let pillars = g.range_choice(pillars, -1_000_000.0, 0.03, no_pillar, pillars);
    Ok(g.max(caves, pillars))
}

fn post_process(g: &mut DensityGraph, density: NodeId) -> NodeId {
    let blended = g.blend_density(density);
    let interpolated = g.interpolated(blended);
    let scale = g.constant(0.64);
    let scaled = g.mul(interpolated, scale);
    g.squeeze(scaled)
}

/// Fades density towards fixed values at the top and bottom of the world.
#[allow(clippy::too_many_arguments)]
fn slide(
    g: &mut DensityGraph,
    input: NodeId,
    min_y: i32,
    height: i32,
    top_start_offset: i32,
    top_end_offset: i32,
    top_delta: f64,
    bottom_start_offset: i32,
    bottom_end_offset: i32,
    bottom_delta: f64,
) -> NodeId {
    let top = g.y_clamped_gradient(
        min_y + height - top_start_offset,
        min_y + height - top_end_offset,
        1.0,
        0.0,
    );
    let faded = g.lerp_from_constant(top, top_delta, input);
    let bottom = g.y_clamped_gradient(min_y + bottom_start_offset, min_y + bottom_end_offset, 0.0, 1.0);
    g.lerp_from_constant(bottom, bottom_delta, faded)
}

fn slide_overworld(g: &mut DensityGraph, amplified: bool, input: NodeId) -> NodeId {
    slide(
        g,
        input,
        -64,
        384,
        if amplified { 16 } else { 80 },
        if amplified { 0 } else { 64 },
        -0.078_125,
        0,
        24,
        if amplified { 0.4 } else { 0.117_187_5 },
    )
}

/// Builds the router for `preset` from a bootstrapped registry.
pub fn overworld(
    r: &mut DensityFunctionRegistry,
    preset: OverworldPreset,
) -> Result<NoiseRouter, WorldgenError> {
    let large = preset.is_large();
    let amplified = preset.is_amplified();
    let pick = |normal: ResourceLocation, large_key: ResourceLocation, amplified_key: ResourceLocation| {
        if large {
            large_key
        } else if amplified {
            amplified_key
        } else {
            normal
        }
    };

    let barrier_noise = r.noise(&noises::AQUIFER_BARRIER)?;
    let floodedness_noise = r.noise(&noises::AQUIFER_FLUID_LEVEL_FLOODEDNESS)?;
    let spread_noise = r.noise(&noises::AQUIFER_FLUID_LEVEL_SPREAD)?;
    let lava_noise = r.noise(&noises::AQUIFER_LAVA)?;
    let temperature_noise = r.noise(&if large {
        noises::TEMPERATURE_LARGE
    } else {
        noises::TEMPERATURE
    })?;
    let vegetation_noise = r.noise(&if large {
        noises::VEGETATION_LARGE
    } else {
        noises::VEGETATION
    })?;
    let veininess_noise = r.noise(&noises::ORE_VEININESS)?;
    let vein_a_noise = r.noise(&noises::ORE_VEIN_A)?;
    let vein_b_noise = r.noise(&noises::ORE_VEIN_B)?;
    let gap_noise = r.noise(&noises::ORE_GAP)?;

    let shift_x = r.reference(&keys::SHIFT_X)?;
    let shift_z = r.reference(&keys::SHIFT_Z)?;
    let factor = r.reference(&pick(keys::FACTOR, keys::FACTOR_LARGE, keys::FACTOR_AMPLIFIED))?;
    let depth = r.reference(&pick(keys::DEPTH, keys::DEPTH_LARGE, keys::DEPTH_AMPLIFIED))?;
    let sloped_cheese = r.reference(&pick(
        keys::SLOPED_CHEESE,
        keys::SLOPED_CHEESE_LARGE,
        keys::SLOPED_CHEESE_AMPLIFIED,
    ))?;
    let entrances = r.reference(&keys::ENTRANCES)?;
    let noodle = r.reference(&keys::NOODLE)?;
    let y = r.reference(&keys::Y)?;
    let continents = r.reference(&if large {
        keys::CONTINENTS_LARGE
    } else {
        keys::CONTINENTS
    })?;
    let erosion = r.reference(&if large {
        keys::EROSION_LARGE
    } else {
        keys::EROSION
    })?;
    let ridges = r.reference(&keys::RIDGES)?;
    let underground = underground(r, sloped_cheese)?;

    let g = r.graph_mut();
    let barrier = g.noise(barrier_noise, 1.0, 0.5);
    let floodedness = g.noise(floodedness_noise, 1.0, 0.67);
    let spread = g.noise(spread_noise, 1.0, 0.714_285_714_285_714_3);
    let lava = g.noise(lava_noise, 1.0, 1.0);
    let temperature = g.shifted_noise_2d(shift_x, shift_z, 0.25, temperature_noise);
    let vegetation = g.shifted_noise_2d(shift_x, shift_z, 0.25, vegetation_noise);

    let cached_factor = g.cache_2d(factor);
    let initial = noise_gradient_density(g, cached_factor, depth);

    let five = g.constant(5.0);
    let scaled_entrances = g.mul(five, entrances);
    let surface = g.min(sloped_cheese, scaled_entrances);
    let density = g.range_choice(
        sloped_cheese,
        -1_000_000.0,
        SURFACE_DENSITY_THRESHOLD,
        surface,
        underground,
    );
    let density = slide_overworld(g, amplified, density);
    let density = post_process(g, density);
    let final_density = g.min(density, noodle);

    let veininess = g.noise(veininess_noise, VEININESS_FREQUENCY, VEININESS_FREQUENCY);
    let vein_toggle = y_limited_interpolatable(g, y, veininess, VEIN_MIN_Y, VEIN_MAX_Y, 0);
    let vein_a = g.noise(vein_a_noise, 4.0, 4.0);
    let vein_a = y_limited_interpolatable(g, y, vein_a, VEIN_MIN_Y, VEIN_MAX_Y, 0);
    let vein_a = g.abs(vein_a);
    let vein_b = g.noise(vein_b_noise, 4.0, 4.0);
    let vein_b = y_limited_interpolatable(g, y, vein_b, VEIN_MIN_Y, VEIN_MAX_Y, 0);
    let vein_b = g.abs(vein_b);
    let thickness = g.constant(f64::from(-ORE_THICKNESS));
    let widest = g.max(vein_a, vein_b);
    let vein_ridged = g.add_fn(thickness, widest);
    let vein_gap = g.noise(gap_noise, 1.0, 1.0);

    let cheese_target = g.constant(CHEESE_NOISE_TARGET);
    let initial = g.add_fn(initial, cheese_target);
    let initial = g.clamp(initial, -64.0, 64.0);
    let initial_density_without_jaggedness = slide_overworld(g, amplified, initial);

    Ok(NoiseRouter {
        barrier_noise: barrier,
        fluid_level_floodedness_noise: floodedness,
        fluid_level_spread_noise: spread,
        lava_noise: lava,
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
    })
}

/// A router whose every root is the constant zero.
pub fn none(g: &mut DensityGraph) -> NoiseRouter {
    let zero = g.zero();
    NoiseRouter::from_roots([zero; NoiseRouter::ROOT_COUNT])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::{DensityFunction, FunctionContext};

    fn vanilla() -> DensityFunctionRegistry {
        bootstrap(NoiseParameterRegistry::vanilla()).expect("vanilla bootstrap")
    }

    #[test]
    fn bootstrap_registers_every_key() {
        let r = vanilla();
        for key in [
            keys::ZERO,
            keys::Y,
            keys::SHIFT_X,
            keys::CONTINENTS,
            keys::RIDGES_FOLDED,
            keys::SLOPED_CHEESE,
            keys::SLOPED_CHEESE_LARGE,
            keys::SLOPED_CHEESE_AMPLIFIED,
            keys::ENTRANCES,
            keys::NOODLE,
            keys::PILLARS,
            keys::SPAGHETTI_2D,
        ] {
            assert!(r.get(&key).is_ok(), "{key} missing");
        }
    }

    #[test]
    fn missing_noise_fails_bootstrap() {
        let mut noises = NoiseParameterRegistry::new();
        noises.register(
            noises::SHIFT,
            crate::noise::NoiseParameters::new(-3, vec![1.0, 1.0, 1.0, 0.0]),
        );
        assert!(matches!(
            bootstrap(noises),
            Err(WorldgenError::MissingNoise(_))
        ));
    }

    #[test]
    fn y_gradient_is_identity() {
        let r = vanilla();
        let y = r.get(&keys::Y).expect("registered");
        for block_y in [-64, 0, 100, 319] {
            let value = r.graph().compute(y, &FunctionContext::new(0, block_y, 0));
            assert_eq!(value, f64::from(block_y));
        }
    }

    #[test]
    fn routers_build_for_every_preset() {
        for preset in [
            OverworldPreset::Normal,
            OverworldPreset::LargeBiomes,
            OverworldPreset::Amplified,
        ] {
            let mut r = vanilla();
            let router = overworld(&mut r, preset).expect("router");
            assert!(matches!(
                r.graph().node(router.continents),
                DensityFunction::Reference { .. }
            ));
        }
    }

    #[test]
    fn final_density_is_squeezed_and_slid() {
        let mut r = vanilla();
        let router = overworld(&mut r, OverworldPreset::Normal).expect("router");
        let graph = r.graph();
        // Unbound noises sample zero, so the top slide dominates.
        let top = graph.compute(router.final_density, &FunctionContext::new(0, 319, 0));
        assert!(top < 0.0);
        let bounds = graph.bounds(router.initial_density_without_jaggedness);
        assert!(bounds.min >= -64.0 - 1.0 && bounds.max <= 64.0 + 1.0);
    }

    #[test]
    fn shared_functions_are_stored_once() {
        let mut r = vanilla();
        let before = r.graph().len();
        overworld(&mut r, OverworldPreset::Normal).expect("router");
        let after_first = r.graph().len();
        overworld(&mut r, OverworldPreset::Normal).expect("router");
        assert_eq!(r.graph().len(), after_first);
        assert!(after_first > before);
    }
}
