//! Voxel wind zone: one grid, its configuration and the tick state machine
//!
//! A zone is either dirty (its defining parameters changed since the last
//! build) or clean. A dirty tick rebuilds cell positions; a clean tick runs
//! the field updater and commits the result. Rebuild and update never mix in
//! one tick.
//!
//! Hosts that compute the update off-thread use the split-phase API:
//! [`VoxelWindZone::prepare_update`] reads the committed grid and returns a
//! [`PendingUpdate`] tagged with the grid generation; [`VoxelWindZone::commit`]
//! publishes it only if no rebuild happened in between.

use crate::core_types::noise::DEFAULT_NOISE_SEED;
use crate::core_types::vec3::{Mat4, Vec3};
use crate::grid::config::{GridConfig, GridConfigError};
use crate::grid::voxel::Voxel;
use crate::grid::voxel_grid::{FieldStats, VoxelGrid};
use crate::grid::volume::WindFieldSink;
use crate::solver::profiler::{FrameTimer, ProfilerScope};
use crate::solver::{create_field_updater, FieldUpdater};
use crate::sources::aggregator::SourceSnapshot;
use tracing::{debug, warn};

/// What a successful tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Cell positions were recomputed; velocities were not advanced
    Rebuilt,
    /// The field advanced one step
    Updated,
}

/// A computed but not yet committed field update.
#[derive(Debug, Clone)]
pub struct PendingUpdate {
    generation: u64,
    cells: Vec<Voxel>,
}

impl PendingUpdate {
    /// Grid generation the update was computed against.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cells(&self) -> &[Voxel] {
        &self.cells
    }
}

/// Owns a grid configuration and the live voxel grid built from it.
pub struct VoxelWindZone {
    config: GridConfig,
    grid: Option<VoxelGrid>,
    dirty: bool,
    updater: Box<dyn FieldUpdater>,
    timer: FrameTimer,
}

impl VoxelWindZone {
    /// Zone with the default CPU updater. The grid is built on the first tick.
    pub fn new(config: GridConfig) -> Self {
        Self::with_updater(config, create_field_updater(DEFAULT_NOISE_SEED))
    }

    /// Zone driven by a custom updater backend.
    pub fn with_updater(config: GridConfig, updater: Box<dyn FieldUpdater>) -> Self {
        Self {
            config,
            grid: None,
            dirty: true,
            updater,
            timer: FrameTimer::new(),
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// The committed grid, `None` until the first successful build.
    pub fn grid(&self) -> Option<&VoxelGrid> {
        self.grid.as_ref()
    }

    /// Mutable access to the committed grid (for seeding velocities).
    pub fn grid_mut(&mut self) -> Option<&mut VoxelGrid> {
        self.grid.as_mut()
    }

    /// Committed cells in addressing order; empty before the first build.
    pub fn cells(&self) -> &[Voxel] {
        self.grid.as_ref().map(VoxelGrid::cells).unwrap_or_default()
    }

    /// True when the next tick will rebuild.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn frame_timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn updater_name(&self) -> &'static str {
        self.updater.name()
    }

    pub fn set_config(&mut self, config: GridConfig) {
        if config != self.config {
            self.config = config;
            self.dirty = true;
        }
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        if transform != self.config.transform {
            self.config.transform = transform;
            self.dirty = true;
        }
    }

    pub fn set_edge_length(&mut self, edge_length: f32) {
        if edge_length != self.config.edge_length {
            self.config.edge_length = edge_length;
            self.dirty = true;
        }
    }

    pub fn set_extent(&mut self, extent: Vec3) {
        if extent != self.config.extent {
            self.config.extent = extent;
            self.dirty = true;
        }
    }

    pub fn set_offset(&mut self, offset: Vec3) {
        if offset != self.config.offset {
            self.config.offset = offset;
            self.dirty = true;
        }
    }

    /// Advance the zone by one tick.
    ///
    /// # Errors
    ///
    /// Returns the [`GridConfigError`] when a pending rebuild fails. The
    /// previous grid stays live and the rebuild is retried on the next tick.
    pub fn tick(&mut self, sources: &SourceSnapshot, time: f32, dt: f32) -> Result<TickOutcome, GridConfigError> {
        let scope = ProfilerScope::new("zone_tick");

        let outcome = if self.dirty || self.grid.is_none() {
            self.rebuild()?;
            TickOutcome::Rebuilt
        } else {
            if let Some(pending) = self.prepare_update(sources, time, dt) {
                self.commit(pending);
            }
            TickOutcome::Updated
        };

        self.timer.record(scope.elapsed_ms());
        Ok(outcome)
    }

    /// Rebuild the grid from the current configuration now.
    ///
    /// # Errors
    ///
    /// Returns the [`GridConfigError`] if the configuration is invalid; the
    /// previous grid is kept and the zone stays dirty.
    pub fn rebuild(&mut self) -> Result<(), GridConfigError> {
        let result = match self.grid.as_mut() {
            Some(grid) => grid.rebuild(self.config.clone()),
            None => VoxelGrid::build(self.config.clone()).map(|grid| {
                self.grid = Some(grid);
            }),
        };

        match result {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                warn!("Rejected grid configuration, keeping previous grid: {}", err);
                Err(err)
            }
        }
    }

    /// Compute the next field from the committed grid without publishing it.
    ///
    /// Returns `None` when there is no grid yet or a rebuild is pending.
    /// Non-finite `time` or `dt` are treated as 0.
    pub fn prepare_update(&self, sources: &SourceSnapshot, time: f32, dt: f32) -> Option<PendingUpdate> {
        if self.dirty {
            return None;
        }
        let grid = self.grid.as_ref()?;

        let time = if time.is_finite() { time } else { 0.0 };
        let dt = if dt.is_finite() { dt } else { 0.0 };

        Some(PendingUpdate {
            generation: grid.generation(),
            cells: self.updater.update(grid, sources, time, dt),
        })
    }

    /// Publish a pending update as the live field.
    ///
    /// Updates computed against an older grid generation (or with a wrong
    /// cell count) are discarded and `false` is returned.
    pub fn commit(&mut self, pending: PendingUpdate) -> bool {
        let Some(grid) = self.grid.as_mut() else {
            warn!("Discarding field update: zone has no grid");
            return false;
        };

        if pending.generation != grid.generation() || pending.cells.len() != grid.count() {
            warn!(
                "Discarding stale field update (generation {}, live generation {})",
                pending.generation,
                grid.generation()
            );
            return false;
        }

        grid.replace_cells(pending.cells);
        debug!("Committed field update for generation {}", grid.generation());
        true
    }

    /// Hand the committed grid to a sink. Returns false before the first build.
    pub fn publish(&self, sink: &mut dyn WindFieldSink) -> bool {
        match self.grid.as_ref() {
            Some(grid) => {
                sink.publish(grid);
                true
            }
            None => false,
        }
    }

    /// Interpolated velocity at a world position; zero before the first build.
    pub fn sample(&self, world: &Vec3) -> Vec3 {
        self.grid.as_ref().map_or_else(Vec3::zeros, |grid| grid.sample(world))
    }

    pub fn stats(&self) -> FieldStats {
        self.grid.as_ref().map(VoxelGrid::stats).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone() -> VoxelWindZone {
        VoxelWindZone::new(GridConfig::new(1.0, Vec3::new(2.0, 2.0, 2.0)))
    }

    #[test]
    fn test_first_tick_builds() {
        let mut zone = zone();
        assert!(zone.is_dirty());
        assert!(zone.cells().is_empty());
        assert_eq!(zone.tick(&SourceSnapshot::default(), 0.0, 0.1), Ok(TickOutcome::Rebuilt));
        assert_eq!(zone.cells().len(), 8);
        assert_eq!(zone.tick(&SourceSnapshot::default(), 0.1, 0.1), Ok(TickOutcome::Updated));
        assert_eq!(zone.frame_timer().frames(), 2);
    }

    #[test]
    fn test_setters_only_dirty_on_change() {
        let mut zone = zone();
        zone.tick(&SourceSnapshot::default(), 0.0, 0.1).unwrap();

        zone.set_edge_length(1.0);
        zone.set_extent(Vec3::new(2.0, 2.0, 2.0));
        assert!(!zone.is_dirty());

        zone.set_offset(Vec3::new(0.0, 1.0, 0.0));
        assert!(zone.is_dirty());
    }

    #[test]
    fn test_prepare_update_requires_clean_grid() {
        let mut zone = zone();
        assert!(zone.prepare_update(&SourceSnapshot::default(), 0.0, 0.1).is_none());
        zone.tick(&SourceSnapshot::default(), 0.0, 0.1).unwrap();
        assert!(zone.prepare_update(&SourceSnapshot::default(), 0.0, 0.1).is_some());
        zone.set_transform(Mat4::new_translation(&Vec3::x()));
        assert!(zone.prepare_update(&SourceSnapshot::default(), 0.0, 0.1).is_none());
    }

    #[test]
    fn test_publish_before_build() {
        let zone = zone();
        let mut volume = crate::grid::volume::VelocityVolume::new();
        assert!(!zone.publish(&mut volume));
        assert_eq!(zone.sample(&Vec3::zeros()), Vec3::zeros());
        assert_eq!(zone.stats(), FieldStats::default());
    }
}
