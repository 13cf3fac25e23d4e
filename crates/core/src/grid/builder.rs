//! Grid builder: places every cell in world space
//!
//! `local = coord * edge_length - extent / 2 + offset`, then the grid's
//! affine transform takes it to world space. Each index is independent, so
//! the layout runs as a parallel map over the cell array.

use crate::geometry::to_grid_coord;
use crate::grid::voxel::Voxel;
use crate::grid::voxel_grid::VoxelGrid;
use crate::solver::profiler::ProfilerScope;
use nalgebra::Point3;
use rayon::prelude::*;
use tracing::info;

impl VoxelGrid {
    /// Resize the cell array to `count` if needed and recompute positions.
    ///
    /// Velocities survive when the array is reused; fresh cells start at
    /// rest. Every cell comes out active.
    pub(crate) fn layout_cells(&mut self, count: usize) {
        let _scope = ProfilerScope::new("grid_layout");

        let reused = self.cells.len() == count;
        if !reused {
            self.cells = vec![Voxel::default(); count];
        }

        let density = self.density;
        let edge_length = self.config.edge_length;
        let half_extent = self.config.extent * 0.5;
        let offset = self.config.offset;
        let transform = self.config.transform;

        self.cells
            .par_iter_mut()
            .enumerate()
            .for_each(|(index, cell)| {
                let coord = to_grid_coord(index, density);
                let local = coord.as_vec3() * edge_length - half_extent + offset;
                let position = transform.transform_point(&Point3::from(local)).coords;
                *cell = Voxel::new(position, coord, edge_length, cell.velocity);
            });

        info!(
            "Built voxel grid {}x{}x{} ({} cells, edge {:.3}, generation {}, velocities {})",
            density.x,
            density.y,
            density.z,
            count,
            edge_length,
            self.generation,
            if reused { "kept" } else { "reset" }
        );
    }
}
