//! Surface height estimation for aquifer placement.

use rustc_hash::FxHashMap;

use crate::{
    density::{DensityEvaluator, FunctionContext, NodeId},
    types::pack_column,
};

/// Density the initial terrain must exceed to count as ground.
const SURFACE_DENSITY_CUTOFF: f64 = 0.390_625;

/// Finds the rough terrain surface of a column from the initial density,
/// stepping down one noise cell at a time. Results are cached per quart column.
#[derive(Debug, Clone)]
pub struct SurfaceHeightEstimator {
    initial_density: NodeId,
    min_y: i32,
    height: i32,
    cell_height: i32,
    cache: FxHashMap<i64, i32>,
}

impl SurfaceHeightEstimator {
    /// An estimator scanning `initial_density` down from the top of `min_y..min_y + height`.
    #[must_use]
    pub fn new(initial_density: NodeId, min_y: i32, height: i32, cell_height: i32) -> Self {
        Self {
            initial_density,
            min_y,
            height,
            cell_height,
            cache: FxHashMap::default(),
        }
    }

    /// The estimated surface y of the column holding `(x, z)`, or
    /// `i32::MAX` when the whole column is open.
    pub fn preliminary_surface_level(
        &mut self,
        evaluator: &mut DensityEvaluator<'_>,
        x: i32,
        z: i32,
    ) -> i32 {
        let x = (x >> 2) << 2;
        let z = (z >> 2) << 2;
        let key = pack_column(x, z);
        if let Some(&level) = self.cache.get(&key) {
            return level;
        }
        let level = self.compute(evaluator, x, z);
        self.cache.insert(key, level);
        level
    }

    fn compute(&self, evaluator: &mut DensityEvaluator<'_>, x: i32, z: i32) -> i32 {
        let mut y = self.min_y + self.height;
        while y >= self.min_y {
            let density = evaluator.compute(self.initial_density, &FunctionContext::new(x, y, z));
            if density > SURFACE_DENSITY_CUTOFF {
                return y;
            }
            y -= self.cell_height;
        }
        i32::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::DensityGraph;

    #[test]
    fn finds_first_solid_cell_from_the_top() {
        let mut graph = DensityGraph::new();
        // Solid below y = 40.
        let density = graph.y_clamped_gradient(0, 80, 1.0, -1.0);
        let mut evaluator = DensityEvaluator::new(&graph);
        let mut estimator = SurfaceHeightEstimator::new(density, -64, 384, 8);

        let level = estimator.preliminary_surface_level(&mut evaluator, 5, 7);
        // 0.390625 is crossed just below y = 24.4, the first 8 aligned step under it is 24.
        assert_eq!(level, 24);
        assert_eq!(estimator.preliminary_surface_level(&mut evaluator, 4, 4), 24);
    }

    #[test]
    fn open_columns_report_max() {
        let mut graph = DensityGraph::new();
        let density = graph.constant(-1.0);
        let mut evaluator = DensityEvaluator::new(&graph);
        let mut estimator = SurfaceHeightEstimator::new(density, -64, 384, 8);
        assert_eq!(
            estimator.preliminary_surface_level(&mut evaluator, 0, 0),
            i32::MAX
        );
    }
}
