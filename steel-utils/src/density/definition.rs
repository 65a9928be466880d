//! Data-driven density functions in the `worldgen/density_function` JSON shape.
//!
//! A number is a constant, a string names a registered function, and an
//! object carries its kind in a `type` field.

use serde::Deserialize;

use crate::{error::WorldgenError, types::ResourceLocation};

use super::{
    CubicSpline, NodeId,
    function::{BlendedNoiseSettings, MappedOp, MarkerKind, RarityMapper, ShiftKind, Value},
    registry::DensityFunctionRegistry,
};

/// A density function as written in data files.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DensityFunctionDefinition {
    /// A bare number.
    Constant(f64),
    /// The id of a registered function.
    Reference(ResourceLocation),
    /// An object with a `type` field.
    Inline(Box<InlineDefinition>),
}

/// An object-form density function.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum InlineDefinition {
    /// A fixed value.
    #[serde(rename = "minecraft:constant")]
    Constant { argument: f64 },
    /// `argument1 + argument2`.
    #[serde(rename = "minecraft:add")]
    Add {
        argument1: DensityFunctionDefinition,
        argument2: DensityFunctionDefinition,
    },
    /// `argument1 * argument2`.
    #[serde(rename = "minecraft:mul")]
    Mul {
        argument1: DensityFunctionDefinition,
        argument2: DensityFunctionDefinition,
    },
    /// The smaller argument.
    #[serde(rename = "minecraft:min")]
    Min {
        argument1: DensityFunctionDefinition,
        argument2: DensityFunctionDefinition,
    },
    /// The larger argument.
    #[serde(rename = "minecraft:max")]
    Max {
        argument1: DensityFunctionDefinition,
        argument2: DensityFunctionDefinition,
    },
    /// `|argument|`.
    #[serde(rename = "minecraft:abs")]
    Abs { argument: DensityFunctionDefinition },
    /// `argument * argument`.
    #[serde(rename = "minecraft:square")]
    Square { argument: DensityFunctionDefinition },
    /// `argument` cubed.
    #[serde(rename = "minecraft:cube")]
    Cube { argument: DensityFunctionDefinition },
    /// Halves negative values.
    #[serde(rename = "minecraft:half_negative")]
    HalfNegative { argument: DensityFunctionDefinition },
    /// Quarters negative values.
    #[serde(rename = "minecraft:quarter_negative")]
    QuarterNegative { argument: DensityFunctionDefinition },
    /// Clamped to `[-1, 1]`, then `x / 2 - x^3 / 24`.
    #[serde(rename = "minecraft:squeeze")]
    Squeeze { argument: DensityFunctionDefinition },
    /// `input` clamped to `min..=max`.
    #[serde(rename = "minecraft:clamp")]
    Clamp {
        input: DensityFunctionDefinition,
        min: f64,
        max: f64,
    },
    /// A linear ramp in y.
    #[serde(rename = "minecraft:y_clamped_gradient")]
    YClampedGradient {
        from_y: i32,
        to_y: i32,
        from_value: f64,
        to_value: f64,
    },
    /// A noise at scaled block coordinates.
    #[serde(rename = "minecraft:noise")]
    Noise {
        noise: ResourceLocation,
        xz_scale: f64,
        y_scale: f64,
    },
    /// A noise at coordinates offset by three functions.
    #[serde(rename = "minecraft:shifted_noise")]
    ShiftedNoise {
        shift_x: DensityFunctionDefinition,
        shift_y: DensityFunctionDefinition,
        shift_z: DensityFunctionDefinition,
        xz_scale: f64,
        y_scale: f64,
        noise: ResourceLocation,
    },
    /// Offset sampled at `(x, 0, z)`.
    #[serde(rename = "minecraft:shift_a")]
    ShiftA { argument: ResourceLocation },
    /// Offset sampled at `(z, x, 0)`.
    #[serde(rename = "minecraft:shift_b")]
    ShiftB { argument: ResourceLocation },
    /// Offset sampled at `(x, y, z)`.
    #[serde(rename = "minecraft:shift")]
    Shift { argument: ResourceLocation },
    /// Picks a branch by whether `input` lies in range.
    #[serde(rename = "minecraft:range_choice")]
    RangeChoice {
        input: DensityFunctionDefinition,
        min_inclusive: f64,
        max_exclusive: f64,
        when_in_range: DensityFunctionDefinition,
        when_out_of_range: DensityFunctionDefinition,
    },
    /// Trilinearly interpolated across a noise cell.
    #[serde(rename = "minecraft:interpolated")]
    Interpolated { argument: DensityFunctionDefinition },
    /// Cached per column at quarter resolution.
    #[serde(rename = "minecraft:flat_cache")]
    FlatCache { argument: DensityFunctionDefinition },
    /// Cached per column.
    #[serde(rename = "minecraft:cache_2d")]
    Cache2d { argument: DensityFunctionDefinition },
    /// Cached per position.
    #[serde(rename = "minecraft:cache_once")]
    CacheOnce { argument: DensityFunctionDefinition },
    /// Precomputed for every block of a noise cell.
    #[serde(rename = "minecraft:cache_all_in_cell")]
    CacheAllInCell { argument: DensityFunctionDefinition },
    /// The blending weight.
    #[serde(rename = "minecraft:blend_alpha")]
    BlendAlpha,
    /// The blending offset.
    #[serde(rename = "minecraft:blend_offset")]
    BlendOffset,
    /// `argument` blended with old terrain.
    #[serde(rename = "minecraft:blend_density")]
    BlendDensity { argument: DensityFunctionDefinition },
    /// A cave noise at a scale picked from `input`.
    #[serde(rename = "minecraft:weird_scaled_sampler")]
    WeirdScaledSampler {
        input: DensityFunctionDefinition,
        noise: ResourceLocation,
        rarity_value_mapper: RarityMapper,
    },
    /// The legacy interpolated terrain noise.
    #[serde(rename = "minecraft:old_blended_noise")]
    OldBlendedNoise {
        xz_scale: f64,
        y_scale: f64,
        xz_factor: f64,
        y_factor: f64,
        smear_scale_multiplier: f64,
    },
    /// A cubic spline.
    #[serde(rename = "minecraft:spline")]
    Spline { spline: SplineDefinition },
}

/// A spline as written in data files: a constant or a list of points.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SplineDefinition {
    /// A fixed value.
    Constant(f32),
    /// Points over a coordinate function.
    Multipoint {
        coordinate: DensityFunctionDefinition,
        points: Vec<SplinePointDefinition>,
    },
}

/// One point of a multipoint spline.
#[derive(Debug, Clone, Deserialize)]
pub struct SplinePointDefinition {
    /// Coordinate value at which the point applies.
    pub location: f32,
    /// Value at the location.
    pub value: SplineDefinition,
    /// Slope at the location.
    pub derivative: f32,
}

fn identity(value: f32) -> f32 {
    value
}

impl DensityFunctionDefinition {
    /// Parses a definition from JSON text.
    pub fn from_json(json: &str) -> Result<Self, WorldgenError> {
        serde_json::from_str(json).map_err(|e| WorldgenError::InvalidDefinition(e.to_string()))
    }

    /// Adds the function to the registry's graph and returns its root.
    ///
    /// Named functions must already be registered.
    pub fn build(&self, registry: &mut DensityFunctionRegistry) -> Result<NodeId, WorldgenError> {
        match self {
            Self::Constant(value) => Ok(registry.graph_mut().constant(*value)),
            Self::Reference(key) => registry.reference(key),
            Self::Inline(inline) => inline.build(registry),
        }
    }
}

impl InlineDefinition {
    fn build(&self, registry: &mut DensityFunctionRegistry) -> Result<NodeId, WorldgenError> {
        let node = match self {
            Self::Constant { argument } => registry.graph_mut().constant(*argument),
            Self::Add {
                argument1,
                argument2,
            } => {
                let (a, b) = (argument1.build(registry)?, argument2.build(registry)?);
                registry.graph_mut().add_fn(a, b)
            }
            Self::Mul {
                argument1,
                argument2,
            } => {
                let (a, b) = (argument1.build(registry)?, argument2.build(registry)?);
                registry.graph_mut().mul(a, b)
            }
            Self::Min {
                argument1,
                argument2,
            } => {
                let (a, b) = (argument1.build(registry)?, argument2.build(registry)?);
                registry.graph_mut().min(a, b)
            }
            Self::Max {
                argument1,
                argument2,
            } => {
                let (a, b) = (argument1.build(registry)?, argument2.build(registry)?);
                registry.graph_mut().max(a, b)
            }
            Self::Abs { argument } => mapped(registry, MappedOp::Abs, argument)?,
            Self::Square { argument } => mapped(registry, MappedOp::Square, argument)?,
            Self::Cube { argument } => mapped(registry, MappedOp::Cube, argument)?,
            Self::HalfNegative { argument } => {
                mapped(registry, MappedOp::HalfNegative, argument)?
            }
            Self::QuarterNegative { argument } => {
                mapped(registry, MappedOp::QuarterNegative, argument)?
            }
            Self::Squeeze { argument } => mapped(registry, MappedOp::Squeeze, argument)?,
            Self::Clamp { input, min, max } => {
                if min > max {
                    return Err(WorldgenError::InvalidDefinition(format!(
                        "clamp min {min} is above max {max}"
                    )));
                }
                let input = input.build(registry)?;
                registry.graph_mut().clamp(input, *min, *max)
            }
            Self::YClampedGradient {
                from_y,
                to_y,
                from_value,
                to_value,
            } => registry
                .graph_mut()
                .y_clamped_gradient(*from_y, *to_y, *from_value, *to_value),
            Self::Noise {
                noise,
                xz_scale,
                y_scale,
            } => {
                let noise = registry.noise(noise)?;
                registry.graph_mut().noise(noise, *xz_scale, *y_scale)
            }
            Self::ShiftedNoise {
                shift_x,
                shift_y,
                shift_z,
                xz_scale,
                y_scale,
                noise,
            } => {
                let shift_x = shift_x.build(registry)?;
                let shift_y = shift_y.build(registry)?;
                let shift_z = shift_z.build(registry)?;
                let noise = registry.noise(noise)?;
                registry
                    .graph_mut()
                    .shifted_noise(shift_x, shift_y, shift_z, *xz_scale, *y_scale, noise)
            }
            Self::ShiftA { argument } => shift(registry, ShiftKind::A, argument)?,
            Self::ShiftB { argument } => shift(registry, ShiftKind::B, argument)?,
            Self::Shift { argument } => shift(registry, ShiftKind::Full, argument)?,
            Self::RangeChoice {
                input,
                min_inclusive,
                max_exclusive,
                when_in_range,
                when_out_of_range,
            } => {
                let input = input.build(registry)?;
                let in_range = when_in_range.build(registry)?;
                let out_of_range = when_out_of_range.build(registry)?;
                registry.graph_mut().range_choice(
                    input,
                    *min_inclusive,
                    *max_exclusive,
                    in_range,
                    out_of_range,
                )
            }
            Self::Interpolated { argument } => marker(registry, MarkerKind::Interpolated, argument)?,
            Self::FlatCache { argument } => marker(registry, MarkerKind::FlatCache, argument)?,
            Self::Cache2d { argument } => marker(registry, MarkerKind::Cache2d, argument)?,
            Self::CacheOnce { argument } => marker(registry, MarkerKind::CacheOnce, argument)?,
            Self::CacheAllInCell { argument } => {
                marker(registry, MarkerKind::CacheAllInCell, argument)?
            }
            Self::BlendAlpha => registry.graph_mut().blend_alpha(),
            Self::BlendOffset => registry.graph_mut().blend_offset(),
            Self::BlendDensity { argument } => {
                let input = argument.build(registry)?;
                registry.graph_mut().blend_density(input)
            }
            Self::WeirdScaledSampler {
                input,
                noise,
                rarity_value_mapper,
            } => {
                let input = input.build(registry)?;
                let noise = registry.noise(noise)?;
                registry
                    .graph_mut()
                    .weird_scaled_sampler(input, noise, *rarity_value_mapper)
            }
            Self::OldBlendedNoise {
                xz_scale,
                y_scale,
                xz_factor,
                y_factor,
                smear_scale_multiplier,
            } => registry.graph_mut().blended_noise(BlendedNoiseSettings {
                xz_scale: Value(*xz_scale),
                y_scale: Value(*y_scale),
                xz_factor: Value(*xz_factor),
                y_factor: Value(*y_factor),
                smear_scale_multiplier: Value(*smear_scale_multiplier),
            }),
            Self::Spline { spline } => {
                let spline = spline.build(registry)?;
                registry.graph_mut().spline(spline)
            }
        };
        Ok(node)
    }
}

fn mapped(
    registry: &mut DensityFunctionRegistry,
    op: MappedOp,
    argument: &DensityFunctionDefinition,
) -> Result<NodeId, WorldgenError> {
    let input = argument.build(registry)?;
    Ok(registry.graph_mut().mapped(op, input))
}

fn marker(
    registry: &mut DensityFunctionRegistry,
    kind: MarkerKind,
    argument: &DensityFunctionDefinition,
) -> Result<NodeId, WorldgenError> {
    let input = argument.build(registry)?;
    Ok(registry.graph_mut().marker(kind, input))
}

fn shift(
    registry: &mut DensityFunctionRegistry,
    kind: ShiftKind,
    noise: &ResourceLocation,
) -> Result<NodeId, WorldgenError> {
    let noise = registry.noise(noise)?;
    Ok(registry.graph_mut().shift(kind, noise))
}

impl SplineDefinition {
    fn build(&self, registry: &mut DensityFunctionRegistry) -> Result<CubicSpline, WorldgenError> {
        match self {
            Self::Constant(value) => Ok(CubicSpline::constant(*value)),
            Self::Multipoint { coordinate, points } => {
                let node = coordinate.build(registry)?;
                let coordinate = registry.graph().spline_coordinate(node);
                let mut builder = CubicSpline::builder(coordinate, identity);
                for point in points {
                    let value = point.value.build(registry)?;
                    builder = builder.spline_with_derivative(point.location, value, point.derivative)?;
                }
                builder.build()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        density::{DensityFunction, FunctionContext},
        noise::NoiseParameterRegistry,
    };

    fn registry() -> DensityFunctionRegistry {
        DensityFunctionRegistry::new(NoiseParameterRegistry::vanilla())
    }

    #[test]
    fn parses_nested_arithmetic() {
        let json = r#"{
            "type": "minecraft:add",
            "argument1": 0.5,
            "argument2": {
                "type": "minecraft:mul",
                "argument1": { "type": "minecraft:y_clamped_gradient", "from_y": 0, "to_y": 10, "from_value": 0.0, "to_value": 1.0 },
                "argument2": 2.0
            }
        }"#;
        let mut registry = registry();
        let root = DensityFunctionDefinition::from_json(json)
            .expect("valid json")
            .build(&mut registry)
            .expect("valid function");
        let value = registry.graph().compute(root, &FunctionContext::new(0, 5, 0));
        assert!((value - 1.5).abs() < 1e-12);
    }

    #[test]
    fn references_resolve_through_the_registry() {
        let mut registry = registry();
        let key = ResourceLocation::vanilla_static("test/three");
        let three = registry.graph_mut().constant(3.0);
        registry.register(key, three);

        let root = DensityFunctionDefinition::from_json(r#""minecraft:test/three""#)
            .expect("valid json")
            .build(&mut registry)
            .expect("registered");
        assert!(matches!(
            registry.graph().node(root),
            DensityFunction::Reference { .. }
        ));
        assert_eq!(registry.graph().compute(root, &FunctionContext::new(0, 0, 0)), 3.0);
    }

    #[test]
    fn missing_reference_is_an_error() {
        let mut registry = registry();
        let result = DensityFunctionDefinition::from_json(r#""minecraft:overworld/nope""#)
            .expect("valid json")
            .build(&mut registry);
        assert!(matches!(
            result,
            Err(WorldgenError::MissingDensityFunction(_))
        ));
    }

    #[test]
    fn unknown_noise_is_an_error() {
        let json = r#"{ "type": "minecraft:noise", "noise": "minecraft:nope", "xz_scale": 1.0, "y_scale": 1.0 }"#;
        let mut registry = registry();
        let result = DensityFunctionDefinition::from_json(json)
            .expect("valid json")
            .build(&mut registry);
        assert!(matches!(result, Err(WorldgenError::MissingNoise(_))));
    }

    #[test]
    fn parses_splines() {
        let json = r#"{
            "type": "minecraft:spline",
            "spline": {
                "coordinate": { "type": "minecraft:y_clamped_gradient", "from_y": 0, "to_y": 10, "from_value": 0.0, "to_value": 1.0 },
                "points": [
                    { "location": 0.0, "value": 0.0, "derivative": 0.0 },
                    { "location": 1.0, "value": 4.0, "derivative": 0.0 }
                ]
            }
        }"#;
        let mut registry = registry();
        let root = DensityFunctionDefinition::from_json(json)
            .expect("valid json")
            .build(&mut registry)
            .expect("valid spline");
        let graph = registry.graph();
        assert_eq!(graph.compute(root, &FunctionContext::new(0, 0, 0)), 0.0);
        assert_eq!(graph.compute(root, &FunctionContext::new(0, 10, 0)), 4.0);
    }

    #[test]
    fn unordered_spline_points_are_rejected() {
        let json = r#"{
            "type": "minecraft:spline",
            "spline": {
                "coordinate": 0.0,
                "points": [
                    { "location": 1.0, "value": 0.0, "derivative": 0.0 },
                    { "location": 0.0, "value": 4.0, "derivative": 0.0 }
                ]
            }
        }"#;
        let mut registry = registry();
        let result = DensityFunctionDefinition::from_json(json)
            .expect("valid json")
            .build(&mut registry);
        assert!(matches!(
            result,
            Err(WorldgenError::UnorderedSplinePoints { .. })
        ));
    }
}
