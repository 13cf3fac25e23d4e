//! Grid model: configuration, cells, layout, sampling and packing

pub mod builder;
pub mod config;
pub mod sampling;
pub mod voxel;
pub mod voxel_grid;
pub mod volume;

pub use config::{GridConfig, GridConfigError, ValidatedGrid, DEFAULT_MAX_CELLS};
pub use voxel::Voxel;
pub use voxel_grid::{FieldStats, VoxelGrid};
pub use volume::{VelocityVolume, WindFieldSink};
