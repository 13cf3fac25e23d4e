//! Shared setup for the integration tests
#![allow(dead_code)]

use tracing_subscriber::EnvFilter;
use voxel_wind_core::{GridConfig, SourceSnapshot, TickOutcome, Vec3, VoxelWindZone};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Zone over `extent` with unit cells, already built.
pub fn built_zone(extent: Vec3) -> VoxelWindZone {
    built_zone_with(GridConfig::new(1.0, extent))
}

pub fn built_zone_with(config: GridConfig) -> VoxelWindZone {
    let mut zone = VoxelWindZone::new(config);
    let outcome = zone.tick(&SourceSnapshot::default(), 0.0, 0.0);
    assert_eq!(outcome, Ok(TickOutcome::Rebuilt));
    zone
}

/// Fill every cell with `velocity`.
pub fn fill(zone: &mut VoxelWindZone, velocity: Vec3) {
    for cell in zone.grid_mut().expect("zone is built").cells_mut() {
        cell.velocity = velocity;
    }
}
