//! Node kinds of the density graph.

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use serde::{Deserialize, Serialize};

use crate::{
    noise::{BlendedNoise, NormalNoise},
    types::ResourceLocation,
};

use super::{NodeId, cubic_spline::CubicSpline};

/// An `f64` compared and hashed by its bit pattern, so nodes can be deduplicated.
#[derive(Debug, Clone, Copy)]
pub struct Value(pub f64);

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

/// A named noise, optionally bound to a seeded instance.
///
/// Unbound holders sample zero and report a max value of 2.
#[derive(Clone)]
pub struct NoiseHolder {
    /// Registry key of the noise parameters.
    pub key: ResourceLocation,
    /// The seeded noise once bound.
    pub noise: Option<Arc<NormalNoise>>,
}

impl NoiseHolder {
    /// An unbound holder for `key`.
    #[must_use]
    pub fn unbound(key: ResourceLocation) -> Self {
        Self { key, noise: None }
    }

    /// Samples the bound noise.
    #[inline]
    #[must_use]
    pub fn get_value(&self, x: f64, y: f64, z: f64) -> f64 {
        self.noise.as_ref().map_or(0.0, |noise| noise.get_value(x, y, z))
    }

    /// Upper bound on the absolute value of a sample. 2 when unbound.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.noise.as_ref().map_or(2.0, |noise| noise.max_value())
    }
}

impl PartialEq for NoiseHolder {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && match (&self.noise, &other.noise) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

impl Eq for NoiseHolder {}

impl Hash for NoiseHolder {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.noise.as_ref().map(Arc::as_ptr).hash(state);
    }
}

impl fmt::Debug for NoiseHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseHolder")
            .field("key", &self.key.to_string())
            .field("bound", &self.noise.is_some())
            .finish()
    }
}

/// Scales of the legacy blended terrain noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendedNoiseSettings {
    /// Horizontal scale.
    pub xz_scale: Value,
    /// Vertical scale.
    pub y_scale: Value,
    /// Horizontal frequency divisor.
    pub xz_factor: Value,
    /// Vertical frequency divisor.
    pub y_factor: Value,
    /// Vertical smearing multiplier.
    pub smear_scale_multiplier: Value,
}

impl Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Value)
    }
}

/// The blended terrain noise with its settings and, once bound, its octaves.
#[derive(Clone)]
pub struct BlendedNoiseHolder {
    /// Scales the noise was configured with.
    pub settings: BlendedNoiseSettings,
    /// Seeded instance.
    pub noise: Arc<BlendedNoise>,
}

impl BlendedNoiseHolder {
    /// A zero-seeded placeholder, the state before a world seed is applied.
    #[must_use]
    pub fn unseeded(settings: BlendedNoiseSettings) -> Self {
        Self {
            noise: Arc::new(BlendedNoise::create_unseeded(
                settings.xz_scale.0,
                settings.y_scale.0,
                settings.xz_factor.0,
                settings.y_factor.0,
                settings.smear_scale_multiplier.0,
            )),
            settings,
        }
    }
}

impl PartialEq for BlendedNoiseHolder {
    fn eq(&self, other: &Self) -> bool {
        self.settings == other.settings && Arc::ptr_eq(&self.noise, &other.noise)
    }
}

impl Eq for BlendedNoiseHolder {}

impl Hash for BlendedNoiseHolder {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.settings.hash(state);
        Arc::as_ptr(&self.noise).hash(state);
    }
}

impl fmt::Debug for BlendedNoiseHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BlendedNoiseHolder")
            .field(&self.settings)
            .finish()
    }
}

/// Operators of two-input nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwoArgOp {
    /// `a + b`.
    Add,
    /// `a * b`. Skips `b` where `a` is zero.
    Mul,
    /// `min(a, b)`. Skips `b` where `a` lies below the range of `b`.
    Min,
    /// `max(a, b)`. Skips `b` where `a` lies above the range of `b`.
    Max,
}

/// A two-input operator where one side folded to a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MulOrAddOp {
    /// `input * argument`.
    Mul,
    /// `input + argument`.
    Add,
}

/// Single-input shaping functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappedOp {
    /// `|x|`.
    Abs,
    /// `x * x`.
    Square,
    /// `x * x * x`.
    Cube,
    /// Halves negative values.
    HalfNegative,
    /// Quarters negative values.
    QuarterNegative,
    /// Clamps to `[-1, 1]`, then `x / 2 - x^3 / 24`.
    Squeeze,
}

impl MappedOp {
    /// Applies the shaping function.
    #[inline]
    #[must_use]
    pub fn apply(self, d: f64) -> f64 {
        match self {
            Self::Abs => d.abs(),
            Self::Square => d * d,
            Self::Cube => d * d * d,
            Self::HalfNegative => {
                if d > 0.0 {
                    d
                } else {
                    d * 0.5
                }
            }
            Self::QuarterNegative => {
                if d > 0.0 {
                    d
                } else {
                    d * 0.25
                }
            }
            Self::Squeeze => {
                let e = d.clamp(-1.0, 1.0);
                e / 2.0 - e * e * e / 24.0
            }
        }
    }
}

/// Chunk-scoped caching and interpolation markers. Outside a chunk pass they
/// are transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// Trilinear interpolation between cell corners.
    Interpolated,
    /// One value per quart column, sampled at y = 0.
    FlatCache,
    /// Last (x, z) column.
    Cache2d,
    /// Last position.
    CacheOnce,
    /// Every block of the current cell.
    CacheAllInCell,
}

/// Rarity curves of the cave "weird scaled" sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RarityMapper {
    /// Spaghetti tunnels. Scales between 0.75 and 2.
    #[serde(rename = "type_1")]
    Tunnels,
    /// Spaghetti caves. Scales between 0.5 and 3.
    #[serde(rename = "type_2")]
    Caves,
}

impl RarityMapper {
    /// Largest scale the mapper can pick.
    #[inline]
    #[must_use]
    pub fn max_rarity(self) -> f64 {
        match self {
            Self::Tunnels => 2.0,
            Self::Caves => 3.0,
        }
    }

    /// Sampling scale for a rarity value.
    #[inline]
    #[must_use]
    pub fn scale(self, value: f64) -> f64 {
        match self {
            Self::Tunnels => {
                if value < -0.5 {
                    0.75
                } else if value < 0.0 {
                    1.0
                } else if value < 0.5 {
                    1.5
                } else {
                    2.0
                }
            }
            Self::Caves => {
                if value < -0.75 {
                    0.5
                } else if value < -0.5 {
                    0.75
                } else if value < 0.5 {
                    1.0
                } else if value < 0.75 {
                    2.0
                } else {
                    3.0
                }
            }
        }
    }
}

/// Which axis pair a shift noise samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftKind {
    /// `(x, 0, z)`
    A,
    /// `(z, x, 0)`
    B,
    /// `(x, y, z)`
    Full,
}

/// One node of the density graph. Children are referenced by [`NodeId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DensityFunction {
    /// A fixed value.
    Constant(Value),
    /// A normal noise sampled at scaled block coordinates.
    Noise {
        noise: NoiseHolder,
        xz_scale: Value,
        y_scale: Value,
    },
    /// A normal noise sampled at coordinates offset by three inputs.
    ShiftedNoise {
        shift_x: NodeId,
        shift_y: NodeId,
        shift_z: NodeId,
        xz_scale: Value,
        y_scale: Value,
        noise: NoiseHolder,
    },
    /// A coordinate offset read from a noise at quarter resolution.
    Shift {
        kind: ShiftKind,
        noise: NoiseHolder,
    },
    /// The legacy interpolated terrain noise.
    BlendedNoise(BlendedNoiseHolder),
    /// A noise sampled at a scale chosen from its input, for cave shapes.
    WeirdScaledSampler {
        input: NodeId,
        noise: NoiseHolder,
        mapper: RarityMapper,
    },
    /// A linear ramp in y, clamped outside `from_y..=to_y`.
    YClampedGradient {
        from_y: i32,
        to_y: i32,
        from_value: Value,
        to_value: Value,
    },
    /// A binary operator over two inputs.
    TwoArg {
        op: TwoArgOp,
        a: NodeId,
        b: NodeId,
    },
    /// A binary operator whose second side folded to a constant.
    MulOrAdd {
        op: MulOrAddOp,
        input: NodeId,
        argument: Value,
    },
    /// A shaping function over one input.
    Mapped {
        op: MappedOp,
        input: NodeId,
    },
    /// Clamps its input to `min..=max`.
    Clamp {
        input: NodeId,
        min: Value,
        max: Value,
    },
    /// Picks one of two branches by whether the input lies in a range.
    RangeChoice {
        input: NodeId,
        min_inclusive: Value,
        max_exclusive: Value,
        when_in_range: NodeId,
        when_out_of_range: NodeId,
    },
    /// A cubic spline over other density functions.
    Spline(Arc<CubicSpline>),
    /// A caching or interpolation wrapper around its input.
    Marker {
        kind: MarkerKind,
        input: NodeId,
    },
    /// Always 1 without pre-existing chunks to blend with.
    BlendAlpha,
    /// Always 0 without pre-existing chunks to blend with.
    BlendOffset,
    /// Identity without pre-existing chunks to blend with.
    BlendDensity(NodeId),
    /// A named function from the registry.
    Reference {
        key: ResourceLocation,
        target: NodeId,
    },
}

impl DensityFunction {
    /// Direct children in evaluation order.
    #[must_use]
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Self::Constant(_)
            | Self::Noise { .. }
            | Self::Shift { .. }
            | Self::BlendedNoise(_)
            | Self::YClampedGradient { .. }
            | Self::BlendAlpha
            | Self::BlendOffset => Vec::new(),
            Self::ShiftedNoise {
                shift_x,
                shift_y,
                shift_z,
                ..
            } => vec![*shift_x, *shift_y, *shift_z],
            Self::WeirdScaledSampler { input, .. }
            | Self::MulOrAdd { input, .. }
            | Self::Mapped { input, .. }
            | Self::Clamp { input, .. }
            | Self::Marker { input, .. }
            | Self::BlendDensity(input) => vec![*input],
            Self::Reference { target, .. } => vec![*target],
            Self::TwoArg { a, b, .. } => vec![*a, *b],
            Self::RangeChoice {
                input,
                when_in_range,
                when_out_of_range,
                ..
            } => vec![*input, *when_in_range, *when_out_of_range],
            Self::Spline(spline) => {
                let mut coordinates = Vec::new();
                spline.collect_coordinates(&mut coordinates);
                coordinates
            }
        }
    }
}
