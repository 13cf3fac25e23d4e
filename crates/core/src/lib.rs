//! Voxel Wind Simulation Core Library
//!
//! Maintains a volumetric wind field over a rectangular, arbitrarily
//! transformed region and evolves it every tick in response to wind sources
//! and moving obstacles. It is a lightweight source-driven advection and
//! blend model for real-time effects, not a fluid solver: there is no
//! pressure projection and no divergence-free enforcement.
//!
//! ## Per-tick flow
//!
//! - If the zone's grid parameters changed, the grid is rebuilt (cell
//!   positions recomputed in parallel, velocities kept when the cell count is
//!   unchanged).
//! - Otherwise every cell is updated in parallel from the committed field and
//!   a snapshot of the sources: semi-Lagrangian backtrace, global sources with
//!   obstacle shadows, local sources, obstacle push, and neighbourhood
//!   diffusion for occluded cells.
//! - The new cell array is committed and can be handed to a
//!   [`WindFieldSink`] such as [`VelocityVolume`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use voxel_wind_core::{GlobalWindEmitter, GridConfig, SourceAggregator, Vec3, VoxelWindZone};
//!
//! let mut zone = VoxelWindZone::new(GridConfig::new(0.5, Vec3::new(16.0, 8.0, 16.0)));
//! let mut sources = SourceAggregator::new();
//! sources.add_global(GlobalWindEmitter::directional(Vec3::x(), 1.0, 2.0));
//!
//! let snapshot = sources.snapshot(dt);
//! zone.tick(&snapshot, time, dt)?;
//! let wind = zone.sample(&Vec3::new(1.0, 2.0, 3.0));
//! ```

// Core types and utilities
pub mod core_types;
pub mod geometry;

// Grid model, builder, sampling and packing
pub mod grid;

// Wind sources, obstacles and the per-tick snapshot
pub mod sources;

// Field updater
pub mod solver;

// Zones and the multi-zone manager
pub mod simulation;

// Re-export core types
pub use core_types::{safe_normalize, saturate, Mat4, SimplexNoise, Vec3, DEFAULT_NOISE_SEED};
pub use geometry::{inside_cylinder, inside_sphere, to_grid_coord, to_linear_index, Density, GridCoord};

// Re-export grid types
pub use grid::{
    FieldStats, GridConfig, GridConfigError, VelocityVolume, Voxel, VoxelGrid, WindFieldSink, DEFAULT_MAX_CELLS,
};

// Re-export sources
pub use sources::{
    GlobalWindEmitter, GlobalWindId, GlobalWindKind, GlobalWindSource, LocalWindEmitter, LocalWindId,
    LocalWindKind, LocalWindSource, Obstacle, ObstacleId, SourceAggregator, SourceSnapshot, SphereObstacle,
};

// Re-export solver and simulation types
pub use simulation::{PendingUpdate, TickOutcome, VoxelWindZone, WindManager, ZoneId};
pub use solver::{create_field_updater, CpuFieldUpdater, FieldUpdater};
