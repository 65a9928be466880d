//! Structural rewriting of density graphs.

use rustc_hash::FxHashMap;

use crate::error::WorldgenError;

use super::{
    DensityGraph, NodeId,
    function::{BlendedNoiseHolder, DensityFunction, NoiseHolder},
};

/// Result of visiting one rebuilt node.
#[derive(Debug, Clone)]
pub enum Rewrite {
    /// Insert this node into the target graph.
    Node(DensityFunction),
    /// Replace the node by one already in the target graph.
    Existing(NodeId),
}

/// Hooks called while [`map_all`] copies a graph.
///
/// Children are rewritten before their parents, so `apply` always sees a
/// node whose children already live in `target`.
pub trait Visitor {
    /// Rewrites a noise holder. Keeps it by default.
    fn visit_noise(&mut self, noise: &NoiseHolder) -> Result<NoiseHolder, WorldgenError> {
        Ok(noise.clone())
    }

    /// Rewrites a blended noise holder. Keeps it by default.
    fn visit_blended_noise(
        &mut self,
        noise: &BlendedNoiseHolder,
    ) -> Result<BlendedNoiseHolder, WorldgenError> {
        Ok(noise.clone())
    }

    /// Rewrites a node whose children already live in `target`. Keeps it by default.
    fn apply(
        &mut self,
        target: &mut DensityGraph,
        node: DensityFunction,
    ) -> Result<Rewrite, WorldgenError> {
        let _ = target;
        Ok(Rewrite::Node(node))
    }
}

/// Copies everything reachable from `roots` into `target`, passing each node
/// through `visitor`. Returns the new ids of `roots`, in order.
///
/// Shared subgraphs are rewritten once.
pub fn map_all(
    source: &DensityGraph,
    roots: &[NodeId],
    target: &mut DensityGraph,
    visitor: &mut impl Visitor,
) -> Result<Vec<NodeId>, WorldgenError> {
    let mut memo: FxHashMap<NodeId, NodeId> = FxHashMap::default();

    for id in source.reachable(roots) {
        let mapped = |child: NodeId| memo.get(&child).copied();
        let rebuilt = rebuild(source.node(id), &mapped, target, visitor)?;
        let new_id = match visitor.apply(target, rebuilt)? {
            Rewrite::Node(node) => target.add(node),
            Rewrite::Existing(existing) => existing,
        };
        memo.insert(id, new_id);
    }

    roots
        .iter()
        .map(|root| {
            memo.get(root).copied().ok_or_else(|| {
                WorldgenError::InvalidDefinition(format!("root {root:?} was not rewritten"))
            })
        })
        .collect()
}

fn rebuild(
    node: &DensityFunction,
    mapped: &impl Fn(NodeId) -> Option<NodeId>,
    target: &DensityGraph,
    visitor: &mut impl Visitor,
) -> Result<DensityFunction, WorldgenError> {
    let child = |id: NodeId| {
        mapped(id).ok_or_else(|| {
            WorldgenError::InvalidDefinition(format!("child {id:?} visited after its parent"))
        })
    };

    Ok(match node {
        DensityFunction::Constant(_)
        | DensityFunction::YClampedGradient { .. }
        | DensityFunction::BlendAlpha
        | DensityFunction::BlendOffset => node.clone(),
        DensityFunction::Noise {
            noise,
            xz_scale,
            y_scale,
        } => DensityFunction::Noise {
            noise: visitor.visit_noise(noise)?,
            xz_scale: *xz_scale,
            y_scale: *y_scale,
        },
        DensityFunction::ShiftedNoise {
            shift_x,
            shift_y,
            shift_z,
            xz_scale,
            y_scale,
            noise,
        } => DensityFunction::ShiftedNoise {
            shift_x: child(*shift_x)?,
            shift_y: child(*shift_y)?,
            shift_z: child(*shift_z)?,
            xz_scale: *xz_scale,
            y_scale: *y_scale,
            noise: visitor.visit_noise(noise)?,
        },
        DensityFunction::Shift { kind, noise } => DensityFunction::Shift {
            kind: *kind,
            noise: visitor.visit_noise(noise)?,
        },
        DensityFunction::BlendedNoise(blended) => {
            DensityFunction::BlendedNoise(visitor.visit_blended_noise(blended)?)
        }
        DensityFunction::WeirdScaledSampler {
            input,
            noise,
            mapper,
        } => DensityFunction::WeirdScaledSampler {
            input: child(*input)?,
            noise: visitor.visit_noise(noise)?,
            mapper: *mapper,
        },
        DensityFunction::TwoArg { op, a, b } => {
            target.simplify_two_arg(*op, child(*a)?, child(*b)?)
        }
        DensityFunction::MulOrAdd {
            op,
            input,
            argument,
        } => DensityFunction::MulOrAdd {
            op: *op,
            input: child(*input)?,
            argument: *argument,
        },
        DensityFunction::Mapped { op, input } => DensityFunction::Mapped {
            op: *op,
            input: child(*input)?,
        },
        DensityFunction::Clamp { input, min, max } => DensityFunction::Clamp {
            input: child(*input)?,
            min: *min,
            max: *max,
        },
        DensityFunction::RangeChoice {
            input,
            min_inclusive,
            max_exclusive,
            when_in_range,
            when_out_of_range,
        } => DensityFunction::RangeChoice {
            input: child(*input)?,
            min_inclusive: *min_inclusive,
            max_exclusive: *max_exclusive,
            when_in_range: child(*when_in_range)?,
            when_out_of_range: child(*when_out_of_range)?,
        },
        DensityFunction::Spline(spline) => {
            let remapped =
                spline.map_coordinates(&mut |node| Ok(target.spline_coordinate(child(node)?)))?;
            DensityFunction::Spline(std::sync::Arc::new(remapped))
        }
        DensityFunction::Marker { kind, input } => DensityFunction::Marker {
            kind: *kind,
            input: child(*input)?,
        },
        DensityFunction::BlendDensity(input) => DensityFunction::BlendDensity(child(*input)?),
        DensityFunction::Reference { key, target: inner } => DensityFunction::Reference {
            key: key.clone(),
            target: child(*inner)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::{FunctionContext, MarkerKind};

    struct StripMarkers;

    impl Visitor for StripMarkers {
        fn apply(
            &mut self,
            _target: &mut DensityGraph,
            node: DensityFunction,
        ) -> Result<Rewrite, WorldgenError> {
            Ok(match node {
                DensityFunction::Marker { input, .. } => Rewrite::Existing(input),
                other => Rewrite::Node(other),
            })
        }
    }

    #[test]
    fn identity_copy_preserves_values() {
        let mut source = DensityGraph::new();
        let y = source.y_clamped_gradient(-64, 320, 1.0, -1.0);
        let cached = source.cache_2d(y);
        let squared = source.square(cached);
        let sum = source.add_fn(squared, y);

        struct Identity;
        impl Visitor for Identity {}

        let mut target = DensityGraph::new();
        let roots = map_all(&source, &[sum], &mut target, &mut Identity).expect("rewrite");
        let ctx = FunctionContext::new(0, 40, 0);
        assert_eq!(
            source.compute(sum, &ctx).to_bits(),
            target.compute(roots[0], &ctx).to_bits()
        );
        assert_eq!(target.len(), source.len());
    }

    #[test]
    fn shared_subgraphs_are_rewritten_once() {
        let mut source = DensityGraph::new();
        let y = source.y_clamped_gradient(0, 10, 0.0, 1.0);
        let a = source.abs(y);
        let b = source.square(y);

        struct Counting(usize);
        impl Visitor for Counting {
            fn apply(
                &mut self,
                _target: &mut DensityGraph,
                node: DensityFunction,
            ) -> Result<Rewrite, WorldgenError> {
                if matches!(node, DensityFunction::YClampedGradient { .. }) {
                    self.0 += 1;
                }
                Ok(Rewrite::Node(node))
            }
        }

        let mut visitor = Counting(0);
        let mut target = DensityGraph::new();
        let roots = map_all(&source, &[a, b], &mut target, &mut visitor).expect("rewrite");
        assert_eq!(visitor.0, 1);
        assert_eq!(roots.len(), 2);
    }

    #[test]
    fn markers_can_be_flattened_away() {
        let mut source = DensityGraph::new();
        let y = source.y_clamped_gradient(0, 10, 0.0, 1.0);
        let once = source.cache_once(y);
        let interpolated = source.interpolated(once);
        let root = source.abs(interpolated);

        let mut target = DensityGraph::new();
        let roots = map_all(&source, &[root], &mut target, &mut StripMarkers).expect("rewrite");
        let DensityFunction::Mapped { input, .. } = target.node(roots[0]) else {
            panic!("expected mapped root");
        };
        assert!(matches!(
            target.node(*input),
            DensityFunction::YClampedGradient { .. }
        ));
        assert!(
            (0..target.len() as u32)
                .all(|i| !matches!(target.node(NodeId(i)), DensityFunction::Marker { kind: MarkerKind::CacheOnce, .. }))
        );
    }

    #[test]
    fn spline_coordinates_follow_the_rewrite() {
        use crate::density::CubicSpline;

        let mut source = DensityGraph::new();
        let y = source.y_clamped_gradient(0, 10, 0.0, 1.0);
        let cached = source.cache_2d(y);
        let coordinate = source.spline_coordinate(cached);
        let spline = CubicSpline::builder(coordinate, |v| v)
            .point(0.0, 0.0)
            .and_then(|b| b.point(1.0, 2.0))
            .and_then(|b| b.build())
            .expect("valid spline");
        let root = source.spline(spline);

        let mut target = DensityGraph::new();
        let roots = map_all(&source, &[root], &mut target, &mut StripMarkers).expect("rewrite");
        let DensityFunction::Spline(spline) = target.node(roots[0]) else {
            panic!("expected spline root");
        };
        let mut coordinates = Vec::new();
        spline.collect_coordinates(&mut coordinates);
        assert!(matches!(
            target.node(coordinates[0]),
            DensityFunction::YClampedGradient { .. }
        ));

        let ctx = FunctionContext::new(0, 5, 0);
        assert_eq!(
            source.compute(root, &ctx).to_bits(),
            target.compute(roots[0], &ctx).to_bits()
        );
    }
}
