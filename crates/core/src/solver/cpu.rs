//! CPU field updater
//!
//! One independent unit of work per cell, run as a rayon parallel map from
//! the committed cell array into a fresh one:
//!
//! 1. Backtrace along the cell's own velocity and trilinearly sample the
//!    previous field there, then damp by [`DECAY_FACTOR`].
//! 2. Global sources, each followed by the obstacle shadow.
//! 3. Local sources in order.
//! 4. Obstacle push.
//! 5. Occluded cells relax toward their neighbourhood average.

use crate::core_types::noise::SimplexNoise;
use crate::grid::sampling::trilinear;
use crate::grid::voxel::Voxel;
use crate::grid::voxel_grid::VoxelGrid;
use crate::solver::diffusion::{neighborhood_average, relax, DIFFUSION_PASSES};
use crate::solver::obstacles::apply_push;
use crate::solver::profiler::ProfilerScope;
use crate::solver::r#trait::FieldUpdater;
use crate::solver::winds::{apply_global_sources, apply_local_sources};
use crate::sources::aggregator::SourceSnapshot;
use rayon::prelude::*;
use tracing::debug;

/// Damping applied to the advected velocity each tick
pub const DECAY_FACTOR: f32 = 0.3;

/// Rayon-backed implementation of [`FieldUpdater`].
#[derive(Debug, Clone, Default)]
pub struct CpuFieldUpdater {
    noise: SimplexNoise,
}

impl CpuFieldUpdater {
    pub fn new(noise: SimplexNoise) -> Self {
        Self { noise }
    }

    /// Turbulence noise used by this updater.
    pub fn noise(&self) -> &SimplexNoise {
        &self.noise
    }

    /// Next state of the cell at `index`.
    ///
    /// Reads only from `grid`, never from the output buffer.
    pub fn update_cell(&self, grid: &VoxelGrid, index: usize, sources: &SourceSnapshot, time: f32, dt: f32) -> Voxel {
        let cells = grid.cells();
        let density = grid.density();
        let cell = &cells[index];

        let backtraced = cell.position - cell.velocity * dt;
        let advected = trilinear(cells, density, &grid.world_to_grid(&backtraced)) * DECAY_FACTOR;

        let global = apply_global_sources(
            &cell.position,
            advected,
            &sources.globals,
            &sources.obstacles,
            &self.noise,
            time,
        );
        let velocity = apply_local_sources(&cell.position, global.velocity, &sources.locals);
        let mut velocity = apply_push(&cell.position, velocity, cell.edge_length, &sources.obstacles);

        if global.occluded {
            let average = neighborhood_average(cells, density, cell.coord);
            velocity = relax(velocity, &average, DIFFUSION_PASSES);
        }

        cell.with_velocity(velocity, !global.occluded)
    }
}

impl FieldUpdater for CpuFieldUpdater {
    fn update(&self, grid: &VoxelGrid, sources: &SourceSnapshot, time: f32, dt: f32) -> Vec<Voxel> {
        let _scope = ProfilerScope::new("field_update");

        let updated: Vec<Voxel> = (0..grid.count())
            .into_par_iter()
            .map(|index| self.update_cell(grid, index, sources, time, dt))
            .collect();

        debug!(
            "Updated {} cells with {} global, {} local sources and {} obstacles",
            updated.len(),
            sources.globals.len(),
            sources.locals.len(),
            sources.obstacles.len()
        );

        updated
    }

    fn name(&self) -> &'static str {
        "cpu"
    }
}
