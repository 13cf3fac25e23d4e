//! Zone state machine and the multi-zone manager

pub mod manager;
pub mod zone;

pub use manager::{WindManager, ZoneId, ZoneTickResult};
pub use zone::{PendingUpdate, TickOutcome, VoxelWindZone};
