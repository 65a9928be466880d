//! Density function system for vanilla-accurate terrain generation.
//!
//! Functions form a DAG stored in a [`DensityGraph`] arena. A node is a
//! closed [`DensityFunction`] variant whose children are [`NodeId`]s, which
//! makes structural rewrites ([`map_all`]) and per-chunk cache state
//! ([`DensityEvaluator`]) plain data keyed by id.
//!
//! Density values:
//! - Positive values = solid (stone, etc.)
//! - Negative values = air
//! - Zero = surface boundary

pub mod cubic_spline;
pub mod definition;
mod evaluator;
pub mod function;
mod graph;
mod registry;
/// Full vanilla terrain shaper splines.
pub mod terrain_shaper;
mod visitor;

pub use cubic_spline::{CubicSpline, SplineCoordinate};
pub use definition::DensityFunctionDefinition;
pub use evaluator::{CellGeometry, DensityEvaluator};
pub use function::{
    BlendedNoiseHolder, BlendedNoiseSettings, DensityFunction, MappedOp, MarkerKind, MulOrAddOp,
    NoiseHolder, RarityMapper, ShiftKind, TwoArgOp,
};
pub use graph::{Bounds, DensityGraph};
pub use registry::DensityFunctionRegistry;
pub use visitor::{Rewrite, Visitor, map_all};

/// Index of a node inside a [`DensityGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The node index as a `usize`.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which part of a chunk pass a sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellPhase {
    /// Filling the corner slices of interpolated nodes.
    SliceFill,
    /// Filling the per-cell caches at the start of a cell.
    CellFill,
    /// Sampling an individual block inside a cell.
    Block,
}

/// Where inside the current noise cell a sample is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCursor {
    /// Part of the pass the sample belongs to.
    pub phase: CellPhase,
    /// Block x offset inside the cell.
    pub in_cell_x: i32,
    /// Block y offset inside the cell.
    pub in_cell_y: i32,
    /// Block z offset inside the cell.
    pub in_cell_z: i32,
    /// Position in the array being filled, if any.
    pub array_index: usize,
}

/// Context providing position information for density function evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionContext {
    /// X coordinate in block space.
    pub block_x: i32,
    /// Y coordinate in block space.
    pub block_y: i32,
    /// Z coordinate in block space.
    pub block_z: i32,
    /// Set when sampling inside a chunk pass, where chunk caches apply.
    pub cursor: Option<CellCursor>,
}

impl FunctionContext {
    /// Creates a new function context for the given block position.
    #[must_use]
    pub const fn new(block_x: i32, block_y: i32, block_z: i32) -> Self {
        Self {
            block_x,
            block_y,
            block_z,
            cursor: None,
        }
    }
}

/// Maps array indices to sample positions for batch evaluation.
pub trait ContextProvider {
    /// Context of the `index`-th element.
    fn for_index(&self, index: usize) -> FunctionContext;

    /// Fills `values` by evaluating `node` at every index.
    fn fill_all_directly(
        &self,
        evaluator: &mut DensityEvaluator<'_>,
        node: NodeId,
        values: &mut [f64],
    ) {
        for (i, value) in values.iter_mut().enumerate() {
            *value = evaluator.compute(node, &self.for_index(i));
        }
    }
}

impl ContextProvider for &[FunctionContext] {
    fn for_index(&self, index: usize) -> FunctionContext {
        self[index]
    }
}
