//! The node arena and its builder helpers.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::types::ResourceLocation;

use super::{
    DensityEvaluator, FunctionContext, NodeId,
    cubic_spline::{CubicSpline, SplineCoordinate, SplineFloat},
    function::{
        BlendedNoiseHolder, BlendedNoiseSettings, DensityFunction, MappedOp, MarkerKind,
        MulOrAddOp, NoiseHolder, RarityMapper, ShiftKind, TwoArgOp, Value,
    },
};

/// Declared output range of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Lowest value the node can produce.
    pub min: f64,
    /// Highest value the node can produce.
    pub max: f64,
}

/// An append-only arena of density nodes.
///
/// Structurally equal nodes are stored once, so a [`NodeId`] doubles as a
/// structural identity. Bounds are computed when a node is inserted.
#[derive(Debug, Default, Clone)]
pub struct DensityGraph {
    nodes: Vec<DensityFunction>,
    bounds: Vec<Bounds>,
    index: FxHashMap<DensityFunction, NodeId>,
}

impl DensityGraph {
    /// An empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node has been added yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node stored under `id`.
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &DensityFunction {
        &self.nodes[id.index()]
    }

    /// Output range of `id`.
    #[inline]
    #[must_use]
    pub fn bounds(&self, id: NodeId) -> Bounds {
        self.bounds[id.index()]
    }

    /// Lower bound of `id`.
    #[inline]
    #[must_use]
    pub fn min_value(&self, id: NodeId) -> f64 {
        self.bounds[id.index()].min
    }

    /// Upper bound of `id`.
    #[inline]
    #[must_use]
    pub fn max_value(&self, id: NodeId) -> f64 {
        self.bounds[id.index()].max
    }

    /// Evaluates `id` at a single position with every cache disabled.
    #[must_use]
    pub fn compute(&self, id: NodeId, context: &FunctionContext) -> f64 {
        DensityEvaluator::new(self).compute(id, context)
    }

    /// Inserts a node, returning the id of an equal node if one exists.
    pub fn add(&mut self, node: DensityFunction) -> NodeId {
        if let Some(&id) = self.index.get(&node) {
            return id;
        }
        let bounds = self.compute_bounds(&node);
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node.clone());
        self.bounds.push(bounds);
        self.index.insert(node, id);
        id
    }

    fn compute_bounds(&self, node: &DensityFunction) -> Bounds {
        let of = |id: NodeId| self.bounds(id);
        let (min, max) = match node {
            DensityFunction::Constant(v) => (v.0, v.0),
            DensityFunction::Noise { noise, .. }
            | DensityFunction::ShiftedNoise { noise, .. } => {
                (-noise.max_value(), noise.max_value())
            }
            DensityFunction::Shift { noise, .. } => {
                (-noise.max_value() * 4.0, noise.max_value() * 4.0)
            }
            DensityFunction::BlendedNoise(blended) => {
                (blended.noise.min_value(), blended.noise.max_value())
            }
            DensityFunction::WeirdScaledSampler { noise, mapper, .. } => {
                (0.0, mapper.max_rarity() * noise.max_value())
            }
            DensityFunction::YClampedGradient {
                from_value,
                to_value,
                ..
            } => (from_value.0.min(to_value.0), from_value.0.max(to_value.0)),
            DensityFunction::TwoArg { op, a, b } => two_arg_bounds(*op, of(*a), of(*b)),
            DensityFunction::MulOrAdd {
                op,
                input,
                argument,
            } => {
                let Bounds { min, max } = of(*input);
                let c = argument.0;
                match op {
                    MulOrAddOp::Add => (min + c, max + c),
                    MulOrAddOp::Mul if c >= 0.0 => (min * c, max * c),
                    MulOrAddOp::Mul => (max * c, min * c),
                }
            }
            DensityFunction::Mapped { op, input } => {
                let Bounds { min, max } = of(*input);
                let lo = op.apply(min);
                let hi = op.apply(max);
                match op {
                    // Both ends can map above zero, the floor is the input floor.
                    MappedOp::Abs | MappedOp::Square => (min.max(0.0), lo.max(hi)),
                    _ => (lo, hi),
                }
            }
            DensityFunction::Clamp { min, max, .. } => (min.0, max.0),
            DensityFunction::RangeChoice {
                when_in_range,
                when_out_of_range,
                ..
            } => {
                let a = of(*when_in_range);
                let b = of(*when_out_of_range);
                (a.min.min(b.min), a.max.max(b.max))
            }
            DensityFunction::Spline(spline) => (
                f64::from(spline.min_value()),
                f64::from(spline.max_value()),
            ),
            DensityFunction::Marker { input, .. } | DensityFunction::Reference { target: input, .. } => {
                let b = of(*input);
                (b.min, b.max)
            }
            DensityFunction::BlendAlpha => (1.0, 1.0),
            DensityFunction::BlendOffset => (0.0, 0.0),
            DensityFunction::BlendDensity(_) => (f64::NEG_INFINITY, f64::INFINITY),
        };
        Bounds { min, max }
    }

    /// Every node reachable from `roots`, children before parents.
    #[must_use]
    pub fn reachable(&self, roots: &[NodeId]) -> Vec<NodeId> {
        let mut seen = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        let mut stack: Vec<(NodeId, bool)> = roots.iter().rev().map(|&id| (id, false)).collect();

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            if seen[id.index()] {
                continue;
            }
            seen[id.index()] = true;
            stack.push((id, true));
            for child in self.node(id).children().into_iter().rev() {
                if !seen[child.index()] {
                    stack.push((child, false));
                }
            }
        }

        order
    }

    // Builders. These fold constants and pick specialised nodes the same way
    // the game's factory functions do.

    /// A node returning `value` everywhere.
    pub fn constant(&mut self, value: f64) -> NodeId {
        self.add(DensityFunction::Constant(Value(value)))
    }

    /// The constant `0`.
    pub fn zero(&mut self) -> NodeId {
        self.constant(0.0)
    }

    fn two_arg(&mut self, op: TwoArgOp, a: NodeId, b: NodeId) -> NodeId {
        if matches!(op, TwoArgOp::Min | TwoArgOp::Max) {
            let (ba, bb) = (self.bounds(a), self.bounds(b));
            if ba.min >= bb.max || bb.min >= ba.max {
                log::warn!(
                    "Creating a {op:?} function between two non-overlapping inputs: {:?} and {:?}",
                    self.node(a),
                    self.node(b)
                );
            }
        }

        let node = self.simplify_two_arg(op, a, b);
        self.add(node)
    }

    /// The node a two-input operation folds to: a constant operand turns
    /// `Add` and `Mul` into a [`DensityFunction::MulOrAdd`].
    #[must_use]
    pub fn simplify_two_arg(&self, op: TwoArgOp, a: NodeId, b: NodeId) -> DensityFunction {
        let mul_or_add = match op {
            TwoArgOp::Add => MulOrAddOp::Add,
            TwoArgOp::Mul => MulOrAddOp::Mul,
            _ => return DensityFunction::TwoArg { op, a, b },
        };
        if let DensityFunction::Constant(argument) = *self.node(a) {
            return DensityFunction::MulOrAdd {
                op: mul_or_add,
                input: b,
                argument,
            };
        }
        if let DensityFunction::Constant(argument) = *self.node(b) {
            return DensityFunction::MulOrAdd {
                op: mul_or_add,
                input: a,
                argument,
            };
        }
        DensityFunction::TwoArg { op, a, b }
    }

    /// `a + b`.
    pub fn add_fn(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.two_arg(TwoArgOp::Add, a, b)
    }

    /// `a * b`. Skips `b` where `a` is zero.
    pub fn mul(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.two_arg(TwoArgOp::Mul, a, b)
    }

    /// `min(a, b)`.
    pub fn min(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.two_arg(TwoArgOp::Min, a, b)
    }

    /// `max(a, b)`.
    pub fn max(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.two_arg(TwoArgOp::Max, a, b)
    }

    /// Applies a pointwise transform to `input`.
    pub fn mapped(&mut self, op: MappedOp, input: NodeId) -> NodeId {
        self.add(DensityFunction::Mapped { op, input })
    }

    /// `|input|`.
    pub fn abs(&mut self, input: NodeId) -> NodeId {
        self.mapped(MappedOp::Abs, input)
    }

    /// `input²`.
    pub fn square(&mut self, input: NodeId) -> NodeId {
        self.mapped(MappedOp::Square, input)
    }

    /// `input³`.
    pub fn cube(&mut self, input: NodeId) -> NodeId {
        self.mapped(MappedOp::Cube, input)
    }

    /// Halves negative values.
    pub fn half_negative(&mut self, input: NodeId) -> NodeId {
        self.mapped(MappedOp::HalfNegative, input)
    }

    /// Quarters negative values.
    pub fn quarter_negative(&mut self, input: NodeId) -> NodeId {
        self.mapped(MappedOp::QuarterNegative, input)
    }

    /// Clamps to `[-1, 1]`, then `x / 2 - x³ / 24`.
    pub fn squeeze(&mut self, input: NodeId) -> NodeId {
        self.mapped(MappedOp::Squeeze, input)
    }

    /// Clamps `input` to `[min, max]`.
    pub fn clamp(&mut self, input: NodeId, min: f64, max: f64) -> NodeId {
        self.add(DensityFunction::Clamp {
            input,
            min: Value(min),
            max: Value(max),
        })
    }

    /// Linear in y between `from_y` and `to_y`, constant outside.
    pub fn y_clamped_gradient(
        &mut self,
        from_y: i32,
        to_y: i32,
        from_value: f64,
        to_value: f64,
    ) -> NodeId {
        self.add(DensityFunction::YClampedGradient {
            from_y,
            to_y,
            from_value: Value(from_value),
            to_value: Value(to_value),
        })
    }

    /// Picks `when_in_range` where `input` lies in `[min_inclusive, max_exclusive)`.
    pub fn range_choice(
        &mut self,
        input: NodeId,
        min_inclusive: f64,
        max_exclusive: f64,
        when_in_range: NodeId,
        when_out_of_range: NodeId,
    ) -> NodeId {
        self.add(DensityFunction::RangeChoice {
            input,
            min_inclusive: Value(min_inclusive),
            max_exclusive: Value(max_exclusive),
            when_in_range,
            when_out_of_range,
        })
    }

    /// Samples `noise` at the scaled block position.
    pub fn noise(&mut self, noise: NoiseHolder, xz_scale: f64, y_scale: f64) -> NodeId {
        self.add(DensityFunction::Noise {
            noise,
            xz_scale: Value(xz_scale),
            y_scale: Value(y_scale),
        })
    }

    /// A noise remapped from `[-1, 1]` to `[from, to]`.
    pub fn mapped_noise(
        &mut self,
        noise: NoiseHolder,
        xz_scale: f64,
        y_scale: f64,
        from: f64,
        to: f64,
    ) -> NodeId {
        let sampled = self.noise(noise, xz_scale, y_scale);
        let center = self.constant((from + to) * 0.5);
        let half_range = self.constant((to - from) * 0.5);
        let scaled = self.mul(half_range, sampled);
        self.add_fn(center, scaled)
    }

    /// Samples `noise` at a position offset by three shift nodes.
    pub fn shifted_noise(
        &mut self,
        shift_x: NodeId,
        shift_y: NodeId,
        shift_z: NodeId,
        xz_scale: f64,
        y_scale: f64,
        noise: NoiseHolder,
    ) -> NodeId {
        self.add(DensityFunction::ShiftedNoise {
            shift_x,
            shift_y,
            shift_z,
            xz_scale: Value(xz_scale),
            y_scale: Value(y_scale),
            noise,
        })
    }

    /// A horizontally warped noise with no vertical component.
    pub fn shifted_noise_2d(
        &mut self,
        shift_x: NodeId,
        shift_z: NodeId,
        xz_scale: f64,
        noise: NoiseHolder,
    ) -> NodeId {
        let zero = self.zero();
        self.shifted_noise(shift_x, zero, shift_z, xz_scale, 0.0, noise)
    }

    /// A coordinate warp read from `noise`, scaled by four.
    pub fn shift(&mut self, kind: ShiftKind, noise: NoiseHolder) -> NodeId {
        self.add(DensityFunction::Shift { kind, noise })
    }

    /// The legacy terrain noise, seeded later.
    pub fn blended_noise(&mut self, settings: BlendedNoiseSettings) -> NodeId {
        self.add(DensityFunction::BlendedNoise(BlendedNoiseHolder::unseeded(
            settings,
        )))
    }

    /// Samples `noise` with a frequency picked from `input` by `mapper`.
    pub fn weird_scaled_sampler(
        &mut self,
        input: NodeId,
        noise: NoiseHolder,
        mapper: RarityMapper,
    ) -> NodeId {
        self.add(DensityFunction::WeirdScaledSampler {
            input,
            noise,
            mapper,
        })
    }

    /// Evaluates a cubic spline.
    pub fn spline(&mut self, spline: CubicSpline) -> NodeId {
        self.add(DensityFunction::Spline(Arc::new(spline)))
    }

    /// Coordinate handle for spline building, carrying the node's bounds.
    #[must_use]
    pub fn spline_coordinate(&self, node: NodeId) -> SplineCoordinate {
        let bounds = self.bounds(node);
        SplineCoordinate {
            node,
            min: SplineFloat(bounds.min as f32),
            max: SplineFloat(bounds.max as f32),
        }
    }

    /// Wraps `input` in a cache or interpolation marker.
    pub fn marker(&mut self, kind: MarkerKind, input: NodeId) -> NodeId {
        self.add(DensityFunction::Marker { kind, input })
    }

    /// Trilinearly interpolated across a noise cell.
    pub fn interpolated(&mut self, input: NodeId) -> NodeId {
        self.marker(MarkerKind::Interpolated, input)
    }

    /// Cached per quart column of the chunk.
    pub fn flat_cache(&mut self, input: NodeId) -> NodeId {
        self.marker(MarkerKind::FlatCache, input)
    }

    /// Cached for the last column.
    pub fn cache_2d(&mut self, input: NodeId) -> NodeId {
        self.marker(MarkerKind::Cache2d, input)
    }

    /// Cached for the last position or fill.
    pub fn cache_once(&mut self, input: NodeId) -> NodeId {
        self.marker(MarkerKind::CacheOnce, input)
    }

    /// Filled once per noise cell.
    pub fn cache_all_in_cell(&mut self, input: NodeId) -> NodeId {
        self.marker(MarkerKind::CacheAllInCell, input)
    }

    /// Blending weight against old chunks, always `1`.
    pub fn blend_alpha(&mut self) -> NodeId {
        self.add(DensityFunction::BlendAlpha)
    }

    /// Blending offset against old chunks, always `0`.
    pub fn blend_offset(&mut self) -> NodeId {
        self.add(DensityFunction::BlendOffset)
    }

    /// Blended density of `input`, which is `input` itself.
    pub fn blend_density(&mut self, input: NodeId) -> NodeId {
        self.add(DensityFunction::BlendDensity(input))
    }

    /// A named reference to `target`, kept for lookups by key.
    pub fn reference(&mut self, key: ResourceLocation, target: NodeId) -> NodeId {
        self.add(DensityFunction::Reference { key, target })
    }

    /// `lerp(delta, min, max)` with the delta cached per position.
    pub fn lerp(&mut self, delta: NodeId, min: NodeId, max: NodeId) -> NodeId {
        if let DensityFunction::Constant(min) = *self.node(min) {
            return self.lerp_from_constant(delta, min.0, max);
        }
        let delta = self.cache_once(delta);
        let minus_one = self.constant(-1.0);
        let negated = self.mul(delta, minus_one);
        let one = self.constant(1.0);
        let inverse = self.add_fn(negated, one);
        let low = self.mul(min, inverse);
        let high = self.mul(max, delta);
        self.add_fn(low, high)
    }

    /// `lerp(delta, min, max)` for a constant `min`.
    pub fn lerp_from_constant(&mut self, delta: NodeId, min: f64, max: NodeId) -> NodeId {
        let negated_min = self.constant(-min);
        let range = self.add_fn(max, negated_min);
        let scaled = self.mul(delta, range);
        let min = self.constant(min);
        self.add_fn(scaled, min)
    }
}

fn two_arg_bounds(op: TwoArgOp, a: Bounds, b: Bounds) -> (f64, f64) {
    let (d, f) = (a.min, a.max);
    let (e, g) = (b.min, b.max);
    match op {
        TwoArgOp::Add => (d + e, f + g),
        TwoArgOp::Mul => {
            let min = if d > 0.0 && e > 0.0 {
                d * e
            } else if f < 0.0 && g < 0.0 {
                f * g
            } else {
                (d * g).min(f * e)
            };
            let max = if d > 0.0 && e > 0.0 {
                f * g
            } else if f < 0.0 && g < 0.0 {
                d * e
            } else {
                (d * e).max(f * g)
            };
            (min, max)
        }
        TwoArgOp::Min => (d.min(e), f.min(g)),
        TwoArgOp::Max => (d.max(e), f.max(g)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structurally_equal_nodes_share_an_id() {
        let mut graph = DensityGraph::new();
        let a = graph.y_clamped_gradient(-64, 320, 1.0, -1.0);
        let b = graph.y_clamped_gradient(-64, 320, 1.0, -1.0);
        let c = graph.y_clamped_gradient(-64, 320, 1.0, -0.5);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let sum1 = graph.add_fn(a, c);
        let sum2 = graph.add_fn(b, c);
        assert_eq!(sum1, sum2);
    }

    #[test]
    fn constants_fold_into_mul_or_add() {
        let mut graph = DensityGraph::new();
        let y = graph.y_clamped_gradient(0, 10, 0.0, 10.0);
        let two = graph.constant(2.0);
        let product = graph.mul(two, y);
        assert!(matches!(
            graph.node(product),
            DensityFunction::MulOrAdd {
                op: MulOrAddOp::Mul,
                ..
            }
        ));
        assert_eq!(graph.bounds(product), Bounds { min: 0.0, max: 20.0 });

        let minus = graph.constant(-1.0);
        let negated = graph.mul(y, minus);
        assert_eq!(graph.bounds(negated), Bounds { min: -10.0, max: 0.0 });
    }

    #[test]
    fn abs_and_square_floor_at_input_min() {
        let mut graph = DensityGraph::new();
        let y = graph.y_clamped_gradient(0, 10, -3.0, 2.0);
        let abs = graph.abs(y);
        assert_eq!(graph.bounds(abs), Bounds { min: 0.0, max: 3.0 });

        let positive = graph.y_clamped_gradient(0, 10, 0.5, 2.0);
        let square = graph.square(positive);
        assert_eq!(graph.bounds(square), Bounds { min: 0.5, max: 4.0 });
    }

    #[test]
    fn mul_bounds_cover_sign_mixes() {
        let a = Bounds { min: -2.0, max: 3.0 };
        let b = Bounds { min: -1.0, max: 4.0 };
        assert_eq!(two_arg_bounds(TwoArgOp::Mul, a, b), (-8.0, 12.0));
    }

    #[test]
    fn blend_density_is_unbounded() {
        let mut graph = DensityGraph::new();
        let one = graph.constant(1.0);
        let blended = graph.blend_density(one);
        assert_eq!(graph.min_value(blended), f64::NEG_INFINITY);
        assert_eq!(graph.max_value(blended), f64::INFINITY);
        assert_eq!(
            graph.compute(blended, &FunctionContext::new(0, 0, 0)).to_bits(),
            1.0_f64.to_bits()
        );
    }

    #[test]
    fn reachable_lists_children_first() {
        let mut graph = DensityGraph::new();
        let y = graph.y_clamped_gradient(0, 10, 0.0, 1.0);
        let abs = graph.abs(y);
        let cached = graph.cache_once(abs);
        let order = graph.reachable(&[cached]);
        assert_eq!(order, vec![y, abs, cached]);
    }
}
