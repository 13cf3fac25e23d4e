//! Field updater trait definition
//!
//! The zone drives the per-tick update through this trait so hosts can swap
//! in another backend (for example a GPU dispatch) that produces the same
//! per-cell data.

use crate::grid::voxel::Voxel;
use crate::grid::voxel_grid::VoxelGrid;
use crate::sources::aggregator::SourceSnapshot;

/// Backend-agnostic field update.
pub trait FieldUpdater: Send + Sync {
    /// Compute the next cell array from `grid` and a source snapshot.
    ///
    /// Must not mutate `grid`. The returned array has `grid.count()` cells
    /// in addressing order with positions, coordinates and edge lengths
    /// unchanged.
    ///
    /// # Arguments
    ///
    /// * `grid` - Current committed grid (read only)
    /// * `sources` - Source and obstacle snapshot for this tick
    /// * `time` - Simulation time in seconds
    /// * `dt` - Timestep in seconds
    fn update(&self, grid: &VoxelGrid, sources: &SourceSnapshot, time: f32, dt: f32) -> Vec<Voxel>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
