//! The six-dimensional climate space biomes are placed in.
//!
//! Coordinates are quantized to integers (`value * 10000`) so fitness sums
//! compare exactly.

use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use steel_utils::density::{DensityGraph, FunctionContext, NodeId};

/// Quantizes a climate coordinate.
#[must_use]
pub fn quantize(value: f32) -> i64 {
    (value * 10000.0) as i64
}

/// Inverse of [`quantize`], up to rounding.
#[must_use]
pub fn unquantize(value: i64) -> f32 {
    value as f32 / 10000.0
}

/// A sampled climate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetPoint {
    /// Quantized temperature.
    pub temperature: i64,
    /// Quantized humidity.
    pub humidity: i64,
    /// Quantized continentalness.
    pub continentalness: i64,
    /// Quantized erosion.
    pub erosion: i64,
    /// Quantized depth.
    pub depth: i64,
    /// Quantized weirdness.
    pub weirdness: i64,
}

impl TargetPoint {
    /// Quantizes six raw climate samples.
    #[must_use]
    pub fn new(
        temperature: f32,
        humidity: f32,
        continentalness: f32,
        erosion: f32,
        depth: f32,
        weirdness: f32,
    ) -> Self {
        Self {
            temperature: quantize(temperature),
            humidity: quantize(humidity),
            continentalness: quantize(continentalness),
            erosion: quantize(erosion),
            depth: quantize(depth),
            weirdness: quantize(weirdness),
        }
    }
}

/// An inclusive interval of one climate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Parameter {
    /// Lower bound, quantized.
    pub min: i64,
    /// Upper bound, quantized.
    pub max: i64,
}

impl Parameter {
    /// An interval holding a single value.
    #[must_use]
    pub fn point(value: f32) -> Self {
        Self::span(value, value)
    }

    /// An interval from `min` to `max`.
    #[must_use]
    pub fn span(min: f32, max: f32) -> Self {
        debug_assert!(min <= max, "min > max: {min} {max}");
        Self {
            min: quantize(min),
            max: quantize(max),
        }
    }

    /// The interval from the start of `from` to the end of `to`.
    #[must_use]
    pub const fn spanning(from: Self, to: Self) -> Self {
        Self {
            min: from.min,
            max: to.max,
        }
    }

    /// Distance from `value` to the interval, zero inside it.
    #[must_use]
    pub const fn distance(&self, value: i64) -> i64 {
        let above = value - self.max;
        let below = self.min - value;
        if above > 0 {
            above
        } else if below > 0 {
            below
        } else {
            0
        }
    }
}

impl<'de> Deserialize<'de> for Parameter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Point(f32),
            Span([f32; 2]),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Point(value) => Ok(Self::point(value)),
            Repr::Span([min, max]) if min <= max => Ok(Self::span(min, max)),
            Repr::Span([min, max]) => Err(serde::de::Error::custom(format!(
                "min > max: {min} {max}"
            ))),
        }
    }
}

/// The climate region a biome claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParameterPoint {
    /// Temperature interval.
    pub temperature: Parameter,
    /// Humidity interval.
    pub humidity: Parameter,
    /// Continentalness interval.
    pub continentalness: Parameter,
    /// Erosion interval.
    pub erosion: Parameter,
    /// Depth interval.
    pub depth: Parameter,
    /// Weirdness interval.
    pub weirdness: Parameter,
    /// Quantized penalty added to every fitness.
    pub offset: i64,
}

impl ParameterPoint {
    /// A region from six intervals and a raw offset.
    #[must_use]
    pub fn new(
        temperature: Parameter,
        humidity: Parameter,
        continentalness: Parameter,
        erosion: Parameter,
        depth: Parameter,
        weirdness: Parameter,
        offset: f32,
    ) -> Self {
        Self {
            temperature,
            humidity,
            continentalness,
            erosion,
            depth,
            weirdness,
            offset: quantize(offset),
        }
    }

    /// Squared distance from `target`; lower is a better match.
    #[must_use]
    pub const fn fitness(&self, target: &TargetPoint) -> i64 {
        let t = self.temperature.distance(target.temperature);
        let h = self.humidity.distance(target.humidity);
        let c = self.continentalness.distance(target.continentalness);
        let e = self.erosion.distance(target.erosion);
        let d = self.depth.distance(target.depth);
        let w = self.weirdness.distance(target.weirdness);
        t * t + h * h + c * c + e * e + d * d + w * w + self.offset * self.offset
    }
}

impl<'de> Deserialize<'de> for ParameterPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Repr {
            temperature: Parameter,
            humidity: Parameter,
            continentalness: Parameter,
            erosion: Parameter,
            depth: Parameter,
            weirdness: Parameter,
            offset: f32,
        }

        let repr = Repr::deserialize(deserializer)?;
        if !(0.0..=1.0).contains(&repr.offset) {
            return Err(serde::de::Error::custom(format!(
                "offset {} outside 0..1",
                repr.offset
            )));
        }
        Ok(Self::new(
            repr.temperature,
            repr.humidity,
            repr.continentalness,
            repr.erosion,
            repr.depth,
            repr.weirdness,
            repr.offset,
        ))
    }
}

/// Climate regions and their values, searched for the closest region.
#[derive(Debug, Clone)]
pub struct ParameterList<T> {
    values: Vec<(ParameterPoint, T)>,
}

impl<T> ParameterList<T> {
    /// # Panics
    /// Panics when `values` is empty.
    #[must_use]
    pub fn new(values: Vec<(ParameterPoint, T)>) -> Self {
        assert!(!values.is_empty(), "a parameter list needs at least one value");
        Self { values }
    }

    /// Every region and its value, in listed order.
    #[must_use]
    pub fn values(&self) -> &[(ParameterPoint, T)] {
        &self.values
    }

    /// The value whose region is closest to `target`. Ties go to the value
    /// listed first.
    #[must_use]
    pub fn find_value(&self, target: &TargetPoint) -> &T {
        let mut best = &self.values[0];
        let mut best_fitness = best.0.fitness(target);
        for entry in &self.values[1..] {
            let fitness = entry.0.fitness(target);
            if fitness < best_fitness {
                best = entry;
                best_fitness = fitness;
            }
        }
        &best.1
    }
}

/// Samples the six climate axes from a density graph.
///
/// The roots live in a graph without cache markers, so sampling needs no
/// chunk state.
#[derive(Debug, Clone)]
pub struct ClimateSampler {
    graph: Arc<DensityGraph>,
    temperature: NodeId,
    humidity: NodeId,
    continentalness: NodeId,
    erosion: NodeId,
    depth: NodeId,
    weirdness: NodeId,
}

impl ClimateSampler {
    /// A sampler reading the six roots out of `graph`.
    #[must_use]
    pub fn new(
        graph: Arc<DensityGraph>,
        temperature: NodeId,
        humidity: NodeId,
        continentalness: NodeId,
        erosion: NodeId,
        depth: NodeId,
        weirdness: NodeId,
    ) -> Self {
        Self {
            graph,
            temperature,
            humidity,
            continentalness,
            erosion,
            depth,
            weirdness,
        }
    }

    /// Samples the climate at quart coordinates.
    #[must_use]
    pub fn sample(&self, quart_x: i32, quart_y: i32, quart_z: i32) -> TargetPoint {
        let context = FunctionContext::new(quart_x << 2, quart_y << 2, quart_z << 2);
        let value = |id: NodeId| self.graph.compute(id, &context) as f32;
        TargetPoint::new(
            value(self.temperature),
            value(self.humidity),
            value(self.continentalness),
            value(self.erosion),
            value(self.depth),
            value(self.weirdness),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> Parameter {
        Parameter::span(-1.0, 1.0)
    }

    #[test]
    fn distance_is_zero_inside() {
        let parameter = Parameter::span(-0.5, 0.25);
        assert_eq!(parameter.distance(0), 0);
        assert_eq!(parameter.distance(quantize(0.5)), 2500);
        assert_eq!(parameter.distance(quantize(-1.0)), 5000);
    }

    #[test]
    fn closest_region_wins() {
        let cold = ParameterPoint::new(
            Parameter::span(-1.0, -0.45),
            full(),
            full(),
            full(),
            Parameter::point(0.0),
            full(),
            0.0,
        );
        let warm = ParameterPoint::new(
            Parameter::span(0.55, 1.0),
            full(),
            full(),
            full(),
            Parameter::point(0.0),
            full(),
            0.0,
        );
        let list = ParameterList::new(vec![(cold, "cold"), (warm, "warm")]);
        assert_eq!(*list.find_value(&TargetPoint::new(-0.8, 0.0, 0.0, 0.0, 0.0, 0.0)), "cold");
        assert_eq!(*list.find_value(&TargetPoint::new(0.3, 0.0, 0.0, 0.0, 0.0, 0.0)), "warm");
    }

    #[test]
    fn ties_go_to_the_first_value() {
        let point = ParameterPoint::new(full(), full(), full(), full(), full(), full(), 0.0);
        let list = ParameterList::new(vec![(point, 1), (point, 2)]);
        assert_eq!(*list.find_value(&TargetPoint::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0)), 1);
    }

    #[test]
    fn parameters_parse_points_and_spans() {
        let point: ParameterPoint = serde_json::from_str(
            r#"{"temperature":[-1.0,-0.45],"humidity":0.5,"continentalness":[-0.11,0.55],
                "erosion":[-1.0,1.0],"depth":0.0,"weirdness":[-1.0,1.0],"offset":0.0}"#,
        )
        .expect("valid point");
        assert_eq!(point.temperature, Parameter::span(-1.0, -0.45));
        assert_eq!(point.humidity, Parameter::point(0.5));

        let inverted = serde_json::from_str::<Parameter>("[0.5, -0.5]");
        assert!(inverted.is_err());
    }
}
