//! Nested piecewise cubic splines in single precision.
//!
//! Coordinates are graph nodes. A spline is evaluated by sampling its
//! coordinate, locating the segment and blending the two neighbouring values
//! with their derivatives. Values are either constants or further splines.

use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

use crate::{
    error::WorldgenError,
    noise::{binary_search, lerp_f32},
};

use super::NodeId;

/// An `f32` compared and hashed by bits.
#[derive(Debug, Clone, Copy)]
pub struct SplineFloat(pub f32);

impl PartialEq for SplineFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for SplineFloat {}

impl Hash for SplineFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// A coordinate together with the bounds of the node it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SplineCoordinate {
    /// Node sampled for the spline input.
    pub node: NodeId,
    /// Lower bound of the node, narrowed to `f32`.
    pub min: SplineFloat,
    /// Upper bound of the node, narrowed to `f32`.
    pub max: SplineFloat,
}

/// A spline or a constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CubicSpline {
    /// A fixed value.
    Constant(SplineFloat),
    /// Hermite segments between locations, extended linearly past the ends.
    Multipoint {
        coordinate: SplineCoordinate,
        locations: Vec<SplineFloat>,
        values: Vec<CubicSpline>,
        derivatives: Vec<SplineFloat>,
        min: SplineFloat,
        max: SplineFloat,
    },
}

impl CubicSpline {
    /// A spline that always returns `value`.
    #[must_use]
    pub fn constant(value: f32) -> Self {
        Self::Constant(SplineFloat(value))
    }

    /// Starts a spline over `coordinate`. `transform` is applied to every
    /// constant value added through the builder.
    #[must_use]
    pub fn builder(coordinate: SplineCoordinate, transform: fn(f32) -> f32) -> SplineBuilder {
        SplineBuilder {
            coordinate,
            transform,
            locations: SmallVec::new(),
            values: Vec::new(),
            derivatives: SmallVec::new(),
        }
    }

    /// Lowest value the spline can return.
    #[must_use]
    pub fn min_value(&self) -> f32 {
        match self {
            Self::Constant(v) => v.0,
            Self::Multipoint { min, .. } => min.0,
        }
    }

    /// Highest value the spline can return.
    #[must_use]
    pub fn max_value(&self) -> f32 {
        match self {
            Self::Constant(v) => v.0,
            Self::Multipoint { max, .. } => max.0,
        }
    }

    /// Evaluates the spline, sampling coordinates through `sample`.
    pub fn apply(&self, sample: &mut impl FnMut(NodeId) -> f64) -> f32 {
        match self {
            Self::Constant(v) => v.0,
            Self::Multipoint {
                coordinate,
                locations,
                values,
                derivatives,
                ..
            } => {
                let point = sample(coordinate.node) as f32;
                let start = find_interval_start(locations, point);
                let last = locations.len() as i32 - 1;

                if start < 0 {
                    let value = values[0].apply(sample);
                    return linear_extend(point, locations, value, derivatives, 0);
                }
                let start = start as usize;
                if start as i32 == last {
                    let value = values[start].apply(sample);
                    return linear_extend(point, locations, value, derivatives, start);
                }

                let loc0 = locations[start].0;
                let loc1 = locations[start + 1].0;
                let t = (point - loc0) / (loc1 - loc0);
                let der0 = derivatives[start].0;
                let der1 = derivatives[start + 1].0;
                let v0 = values[start].apply(sample);
                let v1 = values[start + 1].apply(sample);
                let p = der0 * (loc1 - loc0) - (v1 - v0);
                let q = -der1 * (loc1 - loc0) + (v1 - v0);
                lerp_f32(t, v0, v1) + t * (1.0 - t) * lerp_f32(t, p, q)
            }
        }
    }

    /// Rebuilds the spline with every coordinate rewritten by `map`, which
    /// returns the new node and its bounds. Bounds are recomputed.
    pub fn map_coordinates(
        &self,
        map: &mut impl FnMut(NodeId) -> Result<SplineCoordinate, WorldgenError>,
    ) -> Result<Self, WorldgenError> {
        match self {
            Self::Constant(v) => Ok(Self::Constant(*v)),
            Self::Multipoint {
                coordinate,
                locations,
                values,
                derivatives,
                ..
            } => {
                let coordinate = map(coordinate.node)?;
                let values = values
                    .iter()
                    .map(|value| value.map_coordinates(map))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::multipoint(
                    coordinate,
                    locations.clone(),
                    values,
                    derivatives.clone(),
                ))
            }
        }
    }

    pub(crate) fn collect_coordinates(&self, out: &mut Vec<NodeId>) {
        if let Self::Multipoint {
            coordinate, values, ..
        } = self
        {
            out.push(coordinate.node);
            for value in values {
                value.collect_coordinates(out);
            }
        }
    }

    fn multipoint(
        coordinate: SplineCoordinate,
        locations: Vec<SplineFloat>,
        values: Vec<CubicSpline>,
        derivatives: Vec<SplineFloat>,
    ) -> Self {
        let last = locations.len() - 1;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let coordinate_min = coordinate.min.0;
        let coordinate_max = coordinate.max.0;

        if coordinate_min < locations[0].0 {
            let a = linear_extend(coordinate_min, &locations, values[0].min_value(), &derivatives, 0);
            let b = linear_extend(coordinate_min, &locations, values[0].max_value(), &derivatives, 0);
            min = min.min(a.min(b));
            max = max.max(a.max(b));
        }

        if coordinate_max > locations[last].0 {
            let a = linear_extend(
                coordinate_max,
                &locations,
                values[last].min_value(),
                &derivatives,
                last,
            );
            let b = linear_extend(
                coordinate_max,
                &locations,
                values[last].max_value(),
                &derivatives,
                last,
            );
            min = min.min(a.min(b));
            max = max.max(a.max(b));
        }

        for value in &values {
            min = min.min(value.min_value());
            max = max.max(value.max_value());
        }

        for i in 0..last {
            let span = locations[i + 1].0 - locations[i].0;
            let (lo0, hi0) = (values[i].min_value(), values[i].max_value());
            let (lo1, hi1) = (values[i + 1].min_value(), values[i + 1].max_value());
            let der0 = derivatives[i].0;
            let der1 = derivatives[i + 1].0;

            if der0 != 0.0 || der1 != 0.0 {
                let p = der0 * span;
                let q = der1 * span;
                let lowest = lo0.min(lo1);
                let highest = hi0.max(hi1);
                let a = p - hi1 + lo0;
                let b = p - lo1 + hi0;
                let c = -q + lo1 - hi0;
                let d = -q + hi1 - lo0;
                min = min.min(lowest + 0.25 * a.min(c));
                max = max.max(highest + 0.25 * b.max(d));
            }
        }

        Self::Multipoint {
            coordinate,
            locations,
            values,
            derivatives,
            min: SplineFloat(min),
            max: SplineFloat(max),
        }
    }
}

fn find_interval_start(locations: &[SplineFloat], point: f32) -> i32 {
    binary_search(0, locations.len() as i32, |i| point < locations[i as usize].0) - 1
}

fn linear_extend(
    point: f32,
    locations: &[SplineFloat],
    value: f32,
    derivatives: &[SplineFloat],
    index: usize,
) -> f32 {
    let derivative = derivatives[index].0;
    if derivative == 0.0 {
        value
    } else {
        value + derivative * (point - locations[index].0)
    }
}

/// Collects spline points in ascending location order.
pub struct SplineBuilder {
    coordinate: SplineCoordinate,
    transform: fn(f32) -> f32,
    locations: SmallVec<[SplineFloat; 8]>,
    values: Vec<CubicSpline>,
    derivatives: SmallVec<[SplineFloat; 8]>,
}

impl SplineBuilder {
    /// Adds a constant point with zero derivative.
    pub fn point(self, location: f32, value: f32) -> Result<Self, WorldgenError> {
        self.point_with_derivative(location, value, 0.0)
    }

    /// Adds a constant point.
    pub fn point_with_derivative(
        self,
        location: f32,
        value: f32,
        derivative: f32,
    ) -> Result<Self, WorldgenError> {
        let value = CubicSpline::constant((self.transform)(value));
        self.spline_with_derivative(location, value, derivative)
    }

    /// Adds a nested spline point with zero derivative.
    pub fn spline(self, location: f32, value: CubicSpline) -> Result<Self, WorldgenError> {
        self.spline_with_derivative(location, value, 0.0)
    }

    /// Adds a nested spline point.
    pub fn spline_with_derivative(
        mut self,
        location: f32,
        value: CubicSpline,
        derivative: f32,
    ) -> Result<Self, WorldgenError> {
        if let Some(previous) = self.locations.last()
            && location <= previous.0
        {
            return Err(WorldgenError::UnorderedSplinePoints {
                location,
                previous: previous.0,
            });
        }
        self.locations.push(SplineFloat(location));
        self.values.push(value);
        self.derivatives.push(SplineFloat(derivative));
        Ok(self)
    }

    /// Finishes the spline, computing its bounds.
    pub fn build(self) -> Result<CubicSpline, WorldgenError> {
        if self.locations.is_empty() {
            return Err(WorldgenError::EmptySpline);
        }
        Ok(CubicSpline::multipoint(
            self.coordinate,
            self.locations.into_vec(),
            self.values,
            self.derivatives.into_vec(),
        ))
    }
}
