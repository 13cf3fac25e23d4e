//! Field update solver
//!
//! The per-cell kernel lives in [`CpuFieldUpdater`]; the building blocks
//! (source passes, obstacle interaction, diffusion) are exposed separately
//! so they can be tested and reused by other backends.
//!
//! # Example
//!
//! ```rust,ignore
//! use voxel_wind_core::solver::{create_field_updater, FieldUpdater};
//!
//! let updater = create_field_updater(42);
//! let next = updater.update(&grid, &snapshot, time, dt);
//! ```

mod cpu;
pub mod diffusion;
pub mod obstacles;
pub mod profiler;
mod r#trait;
pub mod winds;

pub use cpu::{CpuFieldUpdater, DECAY_FACTOR};
pub use diffusion::{neighborhood_average, relax, DIFFUSION_PASSES, DIFFUSION_RATE};
pub use obstacles::{apply_push, apply_shadow, ShadowResult};
pub use profiler::{FrameTimer, ProfilerScope};
pub use r#trait::FieldUpdater;
pub use winds::{apply_global_sources, apply_local_sources, local_contribution, GlobalPass};

use crate::core_types::noise::SimplexNoise;
use tracing::info;

/// Create the default field updater with a seeded turbulence field.
pub fn create_field_updater(noise_seed: u64) -> Box<dyn FieldUpdater> {
    let updater = CpuFieldUpdater::new(SimplexNoise::new(noise_seed));
    info!("Using {} field updater (noise seed {:#x})", updater.name(), noise_seed);
    Box::new(updater)
}
