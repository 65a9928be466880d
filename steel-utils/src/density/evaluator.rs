//! Evaluation of density graphs, with the per-chunk cache and interpolation
//! state used while filling a chunk.

use rustc_hash::FxHashMap;

use crate::{
    noise::{clamped_map, floor_div, lerp, lerp3},
    types::pack_column,
};

use super::{
    CellCursor, CellPhase, ContextProvider, DensityGraph, FunctionContext, NodeId,
    function::{DensityFunction, MarkerKind, MulOrAddOp, ShiftKind, TwoArgOp},
};

/// Cell layout of one chunk pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGeometry {
    /// Horizontal cell size in blocks.
    pub cell_width: i32,
    /// Vertical cell size in blocks.
    pub cell_height: i32,
    /// Cells per chunk along x and z.
    pub cell_count_xz: i32,
    /// Cells in the generated height range.
    pub cell_count_y: i32,
    /// Lowest cell index along y.
    pub cell_noise_min_y: i32,
    /// Cell index of the chunk's first cell along x.
    pub first_cell_x: i32,
    /// Cell index of the chunk's first cell along z.
    pub first_cell_z: i32,
    /// Quart index of the chunk's first column along x.
    pub first_quart_x: i32,
    /// Quart index of the chunk's first column along z.
    pub first_quart_z: i32,
}

impl CellGeometry {
    /// Layout for the 16 block wide chunk starting at `(min_block_x, min_block_z)`.
    #[must_use]
    pub fn new(
        min_block_x: i32,
        min_block_z: i32,
        min_y: i32,
        height: i32,
        cell_width: i32,
        cell_height: i32,
    ) -> Self {
        Self {
            cell_width,
            cell_height,
            cell_count_xz: 16 / cell_width,
            cell_count_y: floor_div(height, cell_height),
            cell_noise_min_y: floor_div(min_y, cell_height),
            first_cell_x: floor_div(min_block_x, cell_width),
            first_cell_z: floor_div(min_block_z, cell_width),
            first_quart_x: min_block_x >> 2,
            first_quart_z: min_block_z >> 2,
        }
    }

    /// Side length of the quart grid of a flat cache.
    #[must_use]
    pub fn flat_cache_size(&self) -> usize {
        (((self.cell_count_xz * self.cell_width) >> 2) + 1) as usize
    }

    /// Blocks in one noise cell.
    #[must_use]
    pub fn cell_volume(&self) -> usize {
        (self.cell_width * self.cell_width * self.cell_height) as usize
    }
}

#[derive(Debug)]
struct FlatCache {
    size: usize,
    values: Vec<f64>,
}

#[derive(Debug, Default)]
struct CacheOnce {
    last: Option<(i32, i32, i32, CellPhase)>,
    value: f64,
    array_counter: Option<u64>,
    array: Vec<f64>,
}

/// Corners are indexed `x << 2 | y << 1 | z`.
#[derive(Debug)]
struct Interpolator {
    input: NodeId,
    slice0: Vec<Vec<f64>>,
    slice1: Vec<Vec<f64>>,
    corners: [f64; 8],
    lerped_y: [f64; 4],
    lerped_x: [f64; 2],
    value: f64,
}

impl Interpolator {
    fn new(input: NodeId, geometry: &CellGeometry) -> Self {
        let slice = vec![
            vec![0.0; (geometry.cell_count_y + 1) as usize];
            (geometry.cell_count_xz + 1) as usize
        ];
        Self {
            input,
            slice0: slice.clone(),
            slice1: slice,
            corners: [0.0; 8],
            lerped_y: [0.0; 4],
            lerped_x: [0.0; 2],
            value: 0.0,
        }
    }

    fn select_cell_yz(&mut self, y: usize, z: usize) {
        self.corners = [
            self.slice0[z][y],
            self.slice0[z + 1][y],
            self.slice0[z][y + 1],
            self.slice0[z + 1][y + 1],
            self.slice1[z][y],
            self.slice1[z + 1][y],
            self.slice1[z][y + 1],
            self.slice1[z + 1][y + 1],
        ];
    }

    fn update_for_y(&mut self, t: f64) {
        let c = &self.corners;
        self.lerped_y = [
            lerp(t, c[0b000], c[0b010]),
            lerp(t, c[0b001], c[0b011]),
            lerp(t, c[0b100], c[0b110]),
            lerp(t, c[0b101], c[0b111]),
        ];
    }

    fn update_for_x(&mut self, t: f64) {
        let y = &self.lerped_y;
        self.lerped_x = [lerp(t, y[0], y[2]), lerp(t, y[1], y[3])];
    }

    fn update_for_z(&mut self, t: f64) {
        self.value = lerp(t, self.lerped_x[0], self.lerped_x[1]);
    }

    fn lerp_in_cell(&self, cursor: &CellCursor, geometry: &CellGeometry) -> f64 {
        let c = &self.corners;
        lerp3(
            f64::from(cursor.in_cell_x) / f64::from(geometry.cell_width),
            f64::from(cursor.in_cell_y) / f64::from(geometry.cell_height),
            f64::from(cursor.in_cell_z) / f64::from(geometry.cell_width),
            c[0b000],
            c[0b100],
            c[0b010],
            c[0b110],
            c[0b001],
            c[0b101],
            c[0b011],
            c[0b111],
        )
    }
}

#[derive(Debug)]
struct CellCache {
    input: NodeId,
    values: Vec<f64>,
}

#[derive(Debug)]
struct ChunkState {
    geometry: CellGeometry,
    flat_caches: FxHashMap<NodeId, FlatCache>,
    cache_2d: FxHashMap<NodeId, (i64, f64)>,
    cache_once: FxHashMap<NodeId, CacheOnce>,
    interpolators: Vec<Interpolator>,
    interpolator_index: FxHashMap<NodeId, usize>,
    cell_caches: Vec<CellCache>,
    cell_cache_index: FxHashMap<NodeId, usize>,
    array_counter: u64,
    interpolating: bool,
    filling_cell: bool,
    cell_start_x: i32,
    cell_start_y: i32,
    cell_start_z: i32,
    in_cell_x: i32,
    in_cell_y: i32,
    in_cell_z: i32,
}

impl ChunkState {
    fn cell_index(&self, cursor: &CellCursor) -> Option<usize> {
        let g = &self.geometry;
        let (x, y, z) = (cursor.in_cell_x, cursor.in_cell_y, cursor.in_cell_z);
        if x < 0 || y < 0 || z < 0 || x >= g.cell_width || y >= g.cell_height || z >= g.cell_width
        {
            return None;
        }
        Some((((g.cell_height - 1 - y) * g.cell_width + x) * g.cell_width + z) as usize)
    }
}

/// Fills one column of interpolator corners, bottom to top.
struct SliceProvider {
    block_x: i32,
    block_z: i32,
    cell_noise_min_y: i32,
    cell_height: i32,
}

impl ContextProvider for SliceProvider {
    fn for_index(&self, index: usize) -> FunctionContext {
        FunctionContext {
            block_x: self.block_x,
            block_y: (index as i32 + self.cell_noise_min_y) * self.cell_height,
            block_z: self.block_z,
            cursor: Some(CellCursor {
                phase: CellPhase::SliceFill,
                in_cell_x: 0,
                in_cell_y: 0,
                in_cell_z: 0,
                array_index: index,
            }),
        }
    }
}

/// Fills every block of a cell, top layer first, then x, then z.
struct CellProvider {
    start_x: i32,
    start_y: i32,
    start_z: i32,
    cell_width: i32,
    cell_height: i32,
}

impl ContextProvider for CellProvider {
    fn for_index(&self, index: usize) -> FunctionContext {
        let index_i = index as i32;
        let in_cell_z = index_i.rem_euclid(self.cell_width);
        let column = index_i.div_euclid(self.cell_width);
        let in_cell_x = column.rem_euclid(self.cell_width);
        let in_cell_y = self.cell_height - 1 - column.div_euclid(self.cell_width);
        FunctionContext {
            block_x: self.start_x + in_cell_x,
            block_y: self.start_y + in_cell_y,
            block_z: self.start_z + in_cell_z,
            cursor: Some(CellCursor {
                phase: CellPhase::CellFill,
                in_cell_x,
                in_cell_y,
                in_cell_z,
                array_index: index,
            }),
        }
    }
}

/// Evaluates nodes of a [`DensityGraph`].
///
/// Without chunk state every marker is transparent. A chunk evaluator created
/// by [`DensityEvaluator::for_chunk`] owns the cache and interpolation state of
/// every marker reachable from its roots and must be driven through the cell
/// loop (`initialize_for_first_cell_x`, `advance_cell_x`, `select_cell_yz`,
/// `update_for_*`, `swap_slices`).
pub struct DensityEvaluator<'g> {
    graph: &'g DensityGraph,
    chunk: Option<ChunkState>,
}

impl<'g> DensityEvaluator<'g> {
    /// A cache-free evaluator.
    #[must_use]
    pub fn new(graph: &'g DensityGraph) -> Self {
        Self { graph, chunk: None }
    }

    /// An evaluator with chunk state for every marker reachable from `roots`.
    /// Flat caches are filled immediately.
    #[must_use]
    pub fn for_chunk(graph: &'g DensityGraph, roots: &[NodeId], geometry: CellGeometry) -> Self {
        let mut state = ChunkState {
            geometry,
            flat_caches: FxHashMap::default(),
            cache_2d: FxHashMap::default(),
            cache_once: FxHashMap::default(),
            interpolators: Vec::new(),
            interpolator_index: FxHashMap::default(),
            cell_caches: Vec::new(),
            cell_cache_index: FxHashMap::default(),
            array_counter: 0,
            interpolating: false,
            filling_cell: false,
            cell_start_x: 0,
            cell_start_y: 0,
            cell_start_z: 0,
            in_cell_x: 0,
            in_cell_y: 0,
            in_cell_z: 0,
        };

        let mut flat = Vec::new();
        for id in graph.reachable(roots) {
            let DensityFunction::Marker { kind, input } = *graph.node(id) else {
                continue;
            };
            match kind {
                MarkerKind::Interpolated => {
                    state
                        .interpolator_index
                        .insert(id, state.interpolators.len());
                    state.interpolators.push(Interpolator::new(input, &geometry));
                }
                MarkerKind::CacheAllInCell => {
                    state.cell_cache_index.insert(id, state.cell_caches.len());
                    state.cell_caches.push(CellCache {
                        input,
                        values: vec![0.0; geometry.cell_volume()],
                    });
                }
                MarkerKind::FlatCache => flat.push((id, input)),
                MarkerKind::Cache2d | MarkerKind::CacheOnce => {}
            }
        }

        let mut evaluator = Self {
            graph,
            chunk: Some(state),
        };

        // Children come first, so nested flat caches are already filled.
        let size = geometry.flat_cache_size();
        for (id, input) in flat {
            let mut values = vec![0.0; size * size];
            for qx in 0..size {
                let block_x = (geometry.first_quart_x + qx as i32) << 2;
                for qz in 0..size {
                    let block_z = (geometry.first_quart_z + qz as i32) << 2;
                    values[qx * size + qz] =
                        evaluator.compute(input, &FunctionContext::new(block_x, 0, block_z));
                }
            }
            if let Some(state) = evaluator.chunk.as_mut() {
                state.flat_caches.insert(id, FlatCache { size, values });
            }
        }

        evaluator
    }

    /// The graph being evaluated.
    #[must_use]
    pub fn graph(&self) -> &'g DensityGraph {
        self.graph
    }

    /// Evaluates `id` at `context`.
    pub fn compute(&mut self, id: NodeId, context: &FunctionContext) -> f64 {
        let graph = self.graph;
        let x = f64::from(context.block_x);
        let y = f64::from(context.block_y);
        let z = f64::from(context.block_z);

        match graph.node(id) {
            DensityFunction::Constant(value) => value.0,
            DensityFunction::Noise {
                noise,
                xz_scale,
                y_scale,
            } => noise.get_value(x * xz_scale.0, y * y_scale.0, z * xz_scale.0),
            DensityFunction::ShiftedNoise {
                shift_x,
                shift_y,
                shift_z,
                xz_scale,
                y_scale,
                noise,
            } => {
                let sx = x * xz_scale.0 + self.compute(*shift_x, context);
                let sy = y * y_scale.0 + self.compute(*shift_y, context);
                let sz = z * xz_scale.0 + self.compute(*shift_z, context);
                noise.get_value(sx, sy, sz)
            }
            DensityFunction::Shift { kind, noise } => {
                let (a, b, c) = match kind {
                    ShiftKind::A => (x, 0.0, z),
                    ShiftKind::B => (z, x, 0.0),
                    ShiftKind::Full => (x, y, z),
                };
                noise.get_value(a * 0.25, b * 0.25, c * 0.25) * 4.0
            }
            DensityFunction::BlendedNoise(blended) => {
                blended
                    .noise
                    .compute(context.block_x, context.block_y, context.block_z)
            }
            DensityFunction::WeirdScaledSampler {
                input,
                noise,
                mapper,
            } => {
                let scale = mapper.scale(self.compute(*input, context));
                scale * noise.get_value(x / scale, y / scale, z / scale).abs()
            }
            DensityFunction::YClampedGradient {
                from_y,
                to_y,
                from_value,
                to_value,
            } => clamped_map(
                y,
                f64::from(*from_y),
                f64::from(*to_y),
                from_value.0,
                to_value.0,
            ),
            DensityFunction::TwoArg { op, a, b } => {
                let d = self.compute(*a, context);
                match op {
                    TwoArgOp::Add => d + self.compute(*b, context),
                    TwoArgOp::Mul => {
                        if d == 0.0 {
                            0.0
                        } else {
                            d * self.compute(*b, context)
                        }
                    }
                    TwoArgOp::Min => {
                        if d < graph.min_value(*b) {
                            d
                        } else {
                            d.min(self.compute(*b, context))
                        }
                    }
                    TwoArgOp::Max => {
                        if d > graph.max_value(*b) {
                            d
                        } else {
                            d.max(self.compute(*b, context))
                        }
                    }
                }
            }
            DensityFunction::MulOrAdd {
                op,
                input,
                argument,
            } => {
                let d = self.compute(*input, context);
                match op {
                    MulOrAddOp::Mul => d * argument.0,
                    MulOrAddOp::Add => d + argument.0,
                }
            }
            DensityFunction::Mapped { op, input } => op.apply(self.compute(*input, context)),
            DensityFunction::Clamp { input, min, max } => {
                clamp_value(self.compute(*input, context), min.0, max.0)
            }
            DensityFunction::RangeChoice {
                input,
                min_inclusive,
                max_exclusive,
                when_in_range,
                when_out_of_range,
            } => {
                let d = self.compute(*input, context);
                if d >= min_inclusive.0 && d < max_exclusive.0 {
                    self.compute(*when_in_range, context)
                } else {
                    self.compute(*when_out_of_range, context)
                }
            }
            DensityFunction::Spline(spline) => {
                f64::from(spline.apply(&mut |coordinate| self.compute(coordinate, context)))
            }
            DensityFunction::Marker { kind, input } => {
                self.compute_marker(id, *kind, *input, context)
            }
            DensityFunction::BlendAlpha => 1.0,
            DensityFunction::BlendOffset => 0.0,
            DensityFunction::BlendDensity(input) | DensityFunction::Reference { target: input, .. } => {
                self.compute(*input, context)
            }
        }
    }

    fn compute_marker(
        &mut self,
        id: NodeId,
        kind: MarkerKind,
        input: NodeId,
        context: &FunctionContext,
    ) -> f64 {
        let Some(state) = self.chunk.as_mut() else {
            return self.compute(input, context);
        };

        match kind {
            MarkerKind::FlatCache => {
                if let Some(cache) = state.flat_caches.get(&id) {
                    let qx = (context.block_x >> 2) - state.geometry.first_quart_x;
                    let qz = (context.block_z >> 2) - state.geometry.first_quart_z;
                    let size = cache.size as i32;
                    if qx >= 0 && qz >= 0 && qx < size && qz < size {
                        return cache.values[qx as usize * cache.size + qz as usize];
                    }
                }
                self.compute(input, context)
            }
            MarkerKind::Cache2d => {
                let key = pack_column(context.block_x, context.block_z);
                if let Some(&(last, value)) = state.cache_2d.get(&id)
                    && last == key
                {
                    return value;
                }
                let value = self.compute(input, context);
                if let Some(state) = self.chunk.as_mut() {
                    state.cache_2d.insert(id, (key, value));
                }
                value
            }
            MarkerKind::CacheOnce => {
                let Some(cursor) = context.cursor else {
                    return self.compute(input, context);
                };
                let key = (
                    context.block_x,
                    context.block_y,
                    context.block_z,
                    cursor.phase,
                );
                if let Some(cache) = state.cache_once.get(&id) {
                    if cache.array_counter == Some(state.array_counter)
                        && let Some(&value) = cache.array.get(cursor.array_index)
                    {
                        return value;
                    }
                    if cache.last == Some(key) {
                        return cache.value;
                    }
                }
                let value = self.compute(input, context);
                if let Some(state) = self.chunk.as_mut() {
                    let cache = state.cache_once.entry(id).or_default();
                    cache.last = Some(key);
                    cache.value = value;
                }
                value
            }
            MarkerKind::Interpolated => {
                let Some(&index) = state.interpolator_index.get(&id) else {
                    return self.compute(input, context);
                };
                match context.cursor {
                    Some(cursor) if cursor.phase == CellPhase::CellFill => {
                        state.interpolators[index].lerp_in_cell(&cursor, &state.geometry)
                    }
                    Some(cursor) if cursor.phase == CellPhase::Block => {
                        state.interpolators[index].value
                    }
                    _ => self.compute(input, context),
                }
            }
            MarkerKind::CacheAllInCell => {
                if let Some(cursor) = context.cursor
                    && cursor.phase != CellPhase::SliceFill
                    && let Some(&index) = state.cell_cache_index.get(&id)
                    && let Some(slot) = state.cell_index(&cursor)
                {
                    return state.cell_caches[index].values[slot];
                }
                self.compute(input, context)
            }
        }
    }

    /// Evaluates `id` for every context `provider` yields.
    pub fn fill_array(&mut self, id: NodeId, values: &mut [f64], provider: &dyn ContextProvider) {
        let graph = self.graph;
        match graph.node(id) {
            DensityFunction::Constant(value) => values.fill(value.0),
            DensityFunction::TwoArg { op, a, b } => {
                self.fill_array(*a, values, provider);
                match op {
                    TwoArgOp::Add => {
                        let mut other = vec![0.0; values.len()];
                        self.fill_array(*b, &mut other, provider);
                        for (value, o) in values.iter_mut().zip(other) {
                            *value += o;
                        }
                    }
                    TwoArgOp::Mul => {
                        for (i, value) in values.iter_mut().enumerate() {
                            let d = *value;
                            *value = if d == 0.0 {
                                0.0
                            } else {
                                d * self.compute(*b, &provider.for_index(i))
                            };
                        }
                    }
                    TwoArgOp::Min => {
                        let floor = graph.min_value(*b);
                        for (i, value) in values.iter_mut().enumerate() {
                            let d = *value;
                            *value = if d < floor {
                                d
                            } else {
                                d.min(self.compute(*b, &provider.for_index(i)))
                            };
                        }
                    }
                    TwoArgOp::Max => {
                        let ceiling = graph.max_value(*b);
                        for (i, value) in values.iter_mut().enumerate() {
                            let d = *value;
                            *value = if d > ceiling {
                                d
                            } else {
                                d.max(self.compute(*b, &provider.for_index(i)))
                            };
                        }
                    }
                }
            }
            DensityFunction::MulOrAdd {
                op,
                input,
                argument,
            } => {
                self.fill_array(*input, values, provider);
                for value in values.iter_mut() {
                    *value = match op {
                        MulOrAddOp::Mul => *value * argument.0,
                        MulOrAddOp::Add => *value + argument.0,
                    };
                }
            }
            DensityFunction::Mapped { op, input } => {
                self.fill_array(*input, values, provider);
                for value in values.iter_mut() {
                    *value = op.apply(*value);
                }
            }
            DensityFunction::Clamp { input, min, max } => {
                self.fill_array(*input, values, provider);
                for value in values.iter_mut() {
                    *value = clamp_value(*value, min.0, max.0);
                }
            }
            DensityFunction::RangeChoice {
                input,
                min_inclusive,
                max_exclusive,
                when_in_range,
                when_out_of_range,
            } => {
                self.fill_array(*input, values, provider);
                for (i, value) in values.iter_mut().enumerate() {
                    let d = *value;
                    let branch = if d >= min_inclusive.0 && d < max_exclusive.0 {
                        *when_in_range
                    } else {
                        *when_out_of_range
                    };
                    *value = self.compute(branch, &provider.for_index(i));
                }
            }
            DensityFunction::BlendDensity(input) | DensityFunction::Reference { target: input, .. } => {
                self.fill_array(*input, values, provider);
            }
            DensityFunction::Marker { kind, input } => {
                self.fill_marker(id, *kind, *input, values, provider);
            }
            _ => provider.fill_all_directly(self, id, values),
        }
    }

    fn fill_marker(
        &mut self,
        id: NodeId,
        kind: MarkerKind,
        input: NodeId,
        values: &mut [f64],
        provider: &dyn ContextProvider,
    ) {
        let Some(state) = self.chunk.as_ref() else {
            self.fill_array(input, values, provider);
            return;
        };

        match kind {
            MarkerKind::CacheOnce => {
                let counter = state.array_counter;
                if let Some(cache) = state.cache_once.get(&id)
                    && cache.array_counter == Some(counter)
                    && cache.array.len() == values.len()
                {
                    values.copy_from_slice(&cache.array);
                    return;
                }
                self.fill_array(input, values, provider);
                if let Some(state) = self.chunk.as_mut() {
                    let cache = state.cache_once.entry(id).or_default();
                    cache.array.clear();
                    cache.array.extend_from_slice(values);
                    cache.array_counter = Some(counter);
                }
            }
            MarkerKind::Interpolated if !state.filling_cell => {
                self.fill_array(input, values, provider);
            }
            _ => provider.fill_all_directly(self, id, values),
        }
    }

    /// Context of the block the cell loop currently points at.
    #[must_use]
    pub fn block_context(&self) -> FunctionContext {
        let Some(state) = self.chunk.as_ref() else {
            return FunctionContext::new(0, 0, 0);
        };
        FunctionContext {
            block_x: state.cell_start_x + state.in_cell_x,
            block_y: state.cell_start_y + state.in_cell_y,
            block_z: state.cell_start_z + state.in_cell_z,
            cursor: Some(CellCursor {
                phase: CellPhase::Block,
                in_cell_x: state.in_cell_x,
                in_cell_y: state.in_cell_y,
                in_cell_z: state.in_cell_z,
                array_index: 0,
            }),
        }
    }

    /// Cell layout of the chunk pass, if one is active.
    #[must_use]
    pub fn geometry(&self) -> Option<&CellGeometry> {
        self.chunk.as_ref().map(|state| &state.geometry)
    }

    fn fill_slice(&mut self, first: bool, cell_x: i32) {
        let Some(state) = self.chunk.as_mut() else {
            return;
        };
        let geometry = state.geometry;
        state.cell_start_x = cell_x * geometry.cell_width;
        state.in_cell_x = 0;

        for z in 0..=geometry.cell_count_xz {
            let block_z = (geometry.first_cell_z + z) * geometry.cell_width;
            let provider = SliceProvider {
                block_x: cell_x * geometry.cell_width,
                block_z,
                cell_noise_min_y: geometry.cell_noise_min_y,
                cell_height: geometry.cell_height,
            };
            let interpolator_count = match self.chunk.as_mut() {
                Some(state) => {
                    state.cell_start_z = block_z;
                    state.in_cell_z = 0;
                    state.array_counter += 1;
                    state.interpolators.len()
                }
                None => return,
            };

            for i in 0..interpolator_count {
                let Some((input, mut column)) = self.chunk.as_mut().map(|state| {
                    let interpolator = &mut state.interpolators[i];
                    let slice = if first {
                        &mut interpolator.slice0
                    } else {
                        &mut interpolator.slice1
                    };
                    (interpolator.input, std::mem::take(&mut slice[z as usize]))
                }) else {
                    return;
                };
                self.fill_array(input, &mut column, &provider);
                if let Some(state) = self.chunk.as_mut() {
                    let interpolator = &mut state.interpolators[i];
                    let slice = if first {
                        &mut interpolator.slice0
                    } else {
                        &mut interpolator.slice1
                    };
                    slice[z as usize] = column;
                }
            }
        }

        if let Some(state) = self.chunk.as_mut() {
            state.array_counter += 1;
        }
    }

    /// Starts the cell loop by filling the first x slice.
    pub fn initialize_for_first_cell_x(&mut self) {
        let Some(state) = self.chunk.as_mut() else {
            return;
        };
        state.interpolating = true;
        let first_cell_x = state.geometry.first_cell_x;
        self.fill_slice(true, first_cell_x);
    }

    /// Fills the far x slice for cell column `cell_x` (relative to the chunk).
    pub fn advance_cell_x(&mut self, cell_x: i32) {
        let Some(first_cell_x) = self.chunk.as_ref().map(|s| s.geometry.first_cell_x) else {
            return;
        };
        self.fill_slice(false, first_cell_x + cell_x + 1);
        if let Some(state) = self.chunk.as_mut() {
            state.cell_start_x = (first_cell_x + cell_x) * state.geometry.cell_width;
        }
    }

    /// Selects the cell at `(cell_y, cell_z)` of the current x column and
    /// fills the per-cell caches.
    pub fn select_cell_yz(&mut self, cell_y: i32, cell_z: i32) {
        let Some(state) = self.chunk.as_mut() else {
            return;
        };
        for interpolator in &mut state.interpolators {
            interpolator.select_cell_yz(cell_y as usize, cell_z as usize);
        }
        let geometry = state.geometry;
        state.filling_cell = true;
        state.cell_start_y = (cell_y + geometry.cell_noise_min_y) * geometry.cell_height;
        state.cell_start_z = (geometry.first_cell_z + cell_z) * geometry.cell_width;
        state.array_counter += 1;

        let provider = CellProvider {
            start_x: state.cell_start_x,
            start_y: state.cell_start_y,
            start_z: state.cell_start_z,
            cell_width: geometry.cell_width,
            cell_height: geometry.cell_height,
        };
        let cache_count = state.cell_caches.len();
        for i in 0..cache_count {
            let Some((input, mut values)) = self.chunk.as_mut().map(|state| {
                let cache = &mut state.cell_caches[i];
                (cache.input, std::mem::take(&mut cache.values))
            }) else {
                return;
            };
            self.fill_array(input, &mut values, &provider);
            if let Some(state) = self.chunk.as_mut() {
                state.cell_caches[i].values = values;
            }
        }

        if let Some(state) = self.chunk.as_mut() {
            state.array_counter += 1;
            state.filling_cell = false;
        }
    }

    /// Moves to `block_y` inside the cell, at fraction `t` between its corners.
    pub fn update_for_y(&mut self, block_y: i32, t: f64) {
        if let Some(state) = self.chunk.as_mut() {
            state.in_cell_y = block_y - state.cell_start_y;
            for interpolator in &mut state.interpolators {
                interpolator.update_for_y(t);
            }
        }
    }

    /// Moves to `block_x` inside the cell, at fraction `t` between its corners.
    pub fn update_for_x(&mut self, block_x: i32, t: f64) {
        if let Some(state) = self.chunk.as_mut() {
            state.in_cell_x = block_x - state.cell_start_x;
            for interpolator in &mut state.interpolators {
                interpolator.update_for_x(t);
            }
        }
    }

    /// Moves to `block_z` inside the cell, at fraction `t` between its corners.
    pub fn update_for_z(&mut self, block_z: i32, t: f64) {
        if let Some(state) = self.chunk.as_mut() {
            state.in_cell_z = block_z - state.cell_start_z;
            for interpolator in &mut state.interpolators {
                interpolator.update_for_z(t);
            }
        }
    }

    /// Makes the far slice the near one, ready for the next `advance_cell_x`.
    pub fn swap_slices(&mut self) {
        if let Some(state) = self.chunk.as_mut() {
            for interpolator in &mut state.interpolators {
                std::mem::swap(&mut interpolator.slice0, &mut interpolator.slice1);
            }
        }
    }

    /// Ends the interpolation phase of the chunk pass.
    pub fn stop_interpolation(&mut self) {
        if let Some(state) = self.chunk.as_mut() {
            state.interpolating = false;
        }
    }

    /// Whether a chunk pass is interpolating.
    #[must_use]
    pub fn is_interpolating(&self) -> bool {
        self.chunk.as_ref().is_some_and(|state| state.interpolating)
    }
}

#[inline]
fn clamp_value(value: f64, min: f64, max: f64) -> f64 {
    if value < min { min } else { value.min(max) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> CellGeometry {
        CellGeometry::new(0, 0, -64, 384, 4, 8)
    }

    #[test]
    fn geometry_matches_overworld_layout() {
        let g = geometry();
        assert_eq!(g.cell_count_xz, 4);
        assert_eq!(g.cell_count_y, 48);
        assert_eq!(g.cell_noise_min_y, -8);
        assert_eq!(g.flat_cache_size(), 5);
        assert_eq!(g.cell_volume(), 128);

        let negative = CellGeometry::new(-16, -32, -64, 384, 4, 8);
        assert_eq!(negative.first_cell_x, -4);
        assert_eq!(negative.first_cell_z, -8);
        assert_eq!(negative.first_quart_x, -4);
    }

    #[test]
    fn markers_are_transparent_without_chunk_state() {
        let mut graph = DensityGraph::new();
        let gradient = graph.y_clamped_gradient(-64, 320, 1.0, -1.0);
        let interpolated = graph.interpolated(gradient);
        let cached = graph.cache_2d(interpolated);
        let once = graph.cache_once(cached);

        for y in [-64, 0, 100, 320] {
            let ctx = FunctionContext::new(3, y, 9);
            assert_eq!(
                graph.compute(once, &ctx).to_bits(),
                graph.compute(gradient, &ctx).to_bits()
            );
        }
    }

    #[test]
    fn fill_array_matches_compute() {
        let mut graph = DensityGraph::new();
        let gradient = graph.y_clamped_gradient(-64, 320, 1.0, -1.0);
        let squared = graph.square(gradient);
        let half = graph.constant(0.5);
        let shifted = graph.add_fn(squared, half);
        let other = graph.y_clamped_gradient(0, 64, -2.0, 2.0);
        let product = graph.mul(shifted, other);
        let minimum = graph.min(product, gradient);
        let root = graph.range_choice(minimum, -0.5, 0.5, other, gradient);

        let contexts: Vec<FunctionContext> = (-64..320)
            .step_by(7)
            .map(|y| FunctionContext::new(1, y, 2))
            .collect();
        let mut values = vec![0.0; contexts.len()];
        let mut evaluator = DensityEvaluator::new(&graph);
        evaluator.fill_array(root, &mut values, &contexts.as_slice());

        for (ctx, value) in contexts.iter().zip(values) {
            assert_eq!(value.to_bits(), graph.compute(root, ctx).to_bits());
        }
    }

    #[test]
    fn flat_cache_samples_quart_corners_at_y_zero() {
        let mut graph = DensityGraph::new();
        let gradient = graph.y_clamped_gradient(-10, 10, -1.0, 1.0);
        let flat = graph.flat_cache(gradient);
        let mut evaluator = DensityEvaluator::for_chunk(&graph, &[flat], geometry());

        // Inside the chunk every y reads the y = 0 sample.
        let inside = FunctionContext::new(5, 200, 6);
        assert_eq!(evaluator.compute(flat, &inside).to_bits(), 0.0_f64.to_bits());

        // Outside the cached grid the input is evaluated directly.
        let outside = FunctionContext::new(100, 10, 100);
        assert_eq!(evaluator.compute(flat, &outside).to_bits(), 1.0_f64.to_bits());
    }

    #[test]
    fn interpolation_reproduces_linear_input_exactly_at_corners() {
        let mut graph = DensityGraph::new();
        let gradient = graph.y_clamped_gradient(-64, 320, 1.0, -1.0);
        let interpolated = graph.interpolated(gradient);
        let g = geometry();
        let mut evaluator = DensityEvaluator::for_chunk(&graph, &[interpolated], g);

        evaluator.initialize_for_first_cell_x();
        evaluator.advance_cell_x(0);
        evaluator.select_cell_yz(8, 0);
        let cell_start_y = (8 + g.cell_noise_min_y) * g.cell_height;
        assert_eq!(cell_start_y, 0);

        for in_y in (0..g.cell_height).rev() {
            let block_y = cell_start_y + in_y;
            evaluator.update_for_y(block_y, f64::from(in_y) / f64::from(g.cell_height));
            evaluator.update_for_x(0, 0.0);
            evaluator.update_for_z(0, 0.0);
            let ctx = evaluator.block_context();
            assert_eq!(ctx.block_y, block_y);
            let expected = graph.compute(gradient, &FunctionContext::new(0, block_y, 0));
            let actual = evaluator.compute(interpolated, &ctx);
            assert!((expected - actual).abs() < 1e-12, "{expected} != {actual}");
        }
        evaluator.swap_slices();
        evaluator.stop_interpolation();
        assert!(!evaluator.is_interpolating());
    }

    #[test]
    fn cell_cache_matches_direct_evaluation() {
        let mut graph = DensityGraph::new();
        let gradient = graph.y_clamped_gradient(-64, 320, 1.0, -1.0);
        let interpolated = graph.interpolated(gradient);
        let cached = graph.cache_all_in_cell(interpolated);
        let g = geometry();
        let mut evaluator = DensityEvaluator::for_chunk(&graph, &[cached], g);

        evaluator.initialize_for_first_cell_x();
        evaluator.advance_cell_x(0);
        evaluator.select_cell_yz(10, 1);
        let start_y = (10 + g.cell_noise_min_y) * g.cell_height;
        for in_y in (0..g.cell_height).rev() {
            evaluator.update_for_y(start_y + in_y, f64::from(in_y) / 8.0);
            for in_x in 0..g.cell_width {
                evaluator.update_for_x(in_x, f64::from(in_x) / 4.0);
                for in_z in 0..g.cell_width {
                    evaluator.update_for_z(4 + in_z, f64::from(in_z) / 4.0);
                    let ctx = evaluator.block_context();
                    let expected = evaluator.compute(interpolated, &ctx);
                    let actual = evaluator.compute(cached, &ctx);
                    assert!((expected - actual).abs() < 1e-12);
                }
            }
        }
    }
}
