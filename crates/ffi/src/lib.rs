//! C ABI for the voxel wind simulation.
//!
//! Hosts hold an opaque [`VoxelWindInstance`] pointer. Every fallible call
//! returns a [`VoxelWindErrorCode`] and records a message retrievable with
//! [`voxel_wind_get_last_error`] on the calling thread. The header
//! `VoxelWindFFI.h` is generated by `cbindgen` at build time.
//!
//! Typical frame:
//!
//! ```cpp
//! voxel_wind_update_obstacle(wind, player_id, player_desc);
//! voxel_wind_tick(wind, elapsed, dt);
//! voxel_wind_copy_cells(wind, cells, capacity, &written);
//! ```

mod error;
mod helpers;
mod instance;
mod queries;
mod simulation;
mod sources;

pub use error::{voxel_wind_get_last_error, voxel_wind_get_last_error_code, VoxelWindErrorCode};
pub use instance::{voxel_wind_configure, voxel_wind_destroy, voxel_wind_new, GridDesc, VoxelWindInstance, WindVec3};
pub use queries::{
    voxel_wind_cell_count, voxel_wind_copy_cells, voxel_wind_get_stats, voxel_wind_sample, FieldStatsC, VoxelCell,
};
pub use simulation::voxel_wind_tick;
pub use sources::{
    voxel_wind_add_global, voxel_wind_add_local, voxel_wind_add_obstacle, voxel_wind_remove_global,
    voxel_wind_remove_local, voxel_wind_remove_obstacle, voxel_wind_update_global, voxel_wind_update_local,
    voxel_wind_update_obstacle, GlobalWindDesc, LocalWindDesc, ObstacleDesc, VOXEL_WIND_GLOBAL_DIRECTIONAL,
    VOXEL_WIND_GLOBAL_TURBULENT, VOXEL_WIND_LOCAL_DIRECTIONAL, VOXEL_WIND_LOCAL_OMNI, VOXEL_WIND_LOCAL_VORTEX,
};
