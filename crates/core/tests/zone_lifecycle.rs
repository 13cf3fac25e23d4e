//! Rebuild, commit and publish behaviour of zones and the manager

mod common;

use common::{built_zone, fill};
use voxel_wind_core::{
    GlobalWindEmitter, GridConfig, GridConfigError, LocalWindEmitter, LocalWindKind, Mat4, SourceAggregator,
    SourceSnapshot, TickOutcome, Vec3, VelocityVolume, WindFieldSink, WindManager,
};

#[test]
fn transform_change_rebuilds_and_keeps_velocities() {
    let mut zone = built_zone(Vec3::new(3.0, 3.0, 3.0));
    fill(&mut zone, Vec3::new(0.0, 2.0, 0.0));
    let before: Vec<Vec3> = zone.cells().iter().map(|c| c.position).collect();

    zone.set_transform(Mat4::new_translation(&Vec3::new(10.0, 0.0, 0.0)));
    assert!(zone.is_dirty());
    assert_eq!(zone.tick(&SourceSnapshot::default(), 0.0, 0.1), Ok(TickOutcome::Rebuilt));

    for (cell, old) in zone.cells().iter().zip(&before) {
        assert_eq!(cell.position, old + Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(cell.velocity, Vec3::new(0.0, 2.0, 0.0));
    }
    assert_eq!(zone.grid().unwrap().generation(), 1);
}

#[test]
fn resize_rebuild_zeroes_velocities() {
    let mut zone = built_zone(Vec3::new(2.0, 2.0, 2.0));
    fill(&mut zone, Vec3::new(1.0, 1.0, 1.0));

    zone.set_extent(Vec3::new(4.0, 2.0, 2.0));
    zone.tick(&SourceSnapshot::default(), 0.0, 0.1).unwrap();

    let grid = zone.grid().unwrap();
    assert_eq!(grid.count(), 16);
    let density = grid.density();
    assert_eq!(grid.count(), density.x * density.y * density.z);
    assert!(zone.cells().iter().all(|c| c.velocity == Vec3::zeros()));
}

#[test]
fn failed_rebuild_keeps_previous_grid_and_retries() {
    let mut zone = built_zone(Vec3::new(2.0, 2.0, 2.0));
    fill(&mut zone, Vec3::new(0.5, 0.0, 0.0));
    let before = zone.cells().to_vec();

    zone.set_edge_length(-1.0);
    let result = zone.tick(&SourceSnapshot::default(), 0.0, 0.1);
    assert!(matches!(result, Err(GridConfigError::InvalidEdgeLength(_))));
    assert!(zone.is_dirty());
    assert_eq!(zone.cells(), before.as_slice());

    // Still failing: nothing changes, the update is not run either
    assert!(zone.tick(&SourceSnapshot::default(), 0.1, 0.1).is_err());
    assert_eq!(zone.cells(), before.as_slice());

    zone.set_edge_length(1.0);
    assert_eq!(zone.tick(&SourceSnapshot::default(), 0.2, 0.1), Ok(TickOutcome::Rebuilt));
    assert!(!zone.is_dirty());
    assert!(zone.cells().iter().all(|c| c.velocity == Vec3::new(0.5, 0.0, 0.0)));
}

#[test]
fn empty_axis_is_rejected() {
    let mut zone = voxel_wind_core::VoxelWindZone::new(GridConfig::new(2.0, Vec3::new(4.0, 1.0, 4.0)));
    let result = zone.tick(&SourceSnapshot::default(), 0.0, 0.1);
    assert!(matches!(result, Err(GridConfigError::EmptyAxis { axis: 'y', .. })));
    assert!(zone.grid().is_none());
}

#[test]
fn stale_pending_update_is_discarded() {
    let mut zone = built_zone(Vec3::new(2.0, 2.0, 2.0));
    let mut sources = SourceAggregator::new();
    sources.add_global(GlobalWindEmitter::directional(Vec3::x(), 1.0, 1.0));
    let snapshot = sources.snapshot(0.1);

    let pending = zone.prepare_update(&snapshot, 0.0, 0.1).expect("grid is clean");
    assert_eq!(pending.generation(), 0);

    // Same cell count, new generation
    zone.set_offset(Vec3::new(0.0, 0.0, 1.0));
    zone.tick(&snapshot, 0.0, 0.1).unwrap();

    assert!(!zone.commit(pending));
    assert!(zone.cells().iter().all(|c| c.velocity == Vec3::zeros()));

    let fresh = zone.prepare_update(&snapshot, 0.0, 0.1).unwrap();
    assert!(zone.commit(fresh));
    assert!(zone.cells().iter().all(|c| c.velocity == Vec3::new(1.0, 0.0, 0.0)));
}

#[test]
fn publish_packs_committed_field() {
    let mut zone = built_zone(Vec3::new(2.0, 2.0, 2.0));
    let mut sources = SourceAggregator::new();
    sources.add_global(GlobalWindEmitter::directional(Vec3::y(), 3.0, 1.0));
    zone.tick(&sources.snapshot(0.0), 0.0, 0.0).unwrap();

    let mut volume = VelocityVolume::new();
    assert!(zone.publish(&mut volume));
    assert_eq!(volume.texels().len(), 8);
    assert!(volume.texels().iter().all(|t| *t == [0.0, 3.0, 0.0, 1.0]));

    // A custom sink sees the same grid
    struct CountingSink(usize);
    impl WindFieldSink for CountingSink {
        fn publish(&mut self, grid: &voxel_wind_core::VoxelGrid) {
            self.0 += grid.cells().iter().filter(|c| c.active).count();
        }
    }
    let mut sink = CountingSink(0);
    zone.publish(&mut sink);
    assert_eq!(sink.0, 8);
}

#[test]
fn manager_applies_shared_locals_after_zone_locals() {
    let mut manager = WindManager::new();
    let id = manager.add_zone(GridConfig::new(1.0, Vec3::new(2.0, 2.0, 2.0)));

    // Zone-local additive wind, then a shared overwriting wind: the shared one wins
    manager.sources_mut(id).unwrap().add_local(LocalWindEmitter::new(
        LocalWindKind::Omni,
        Vec3::new(-0.5, -0.5, -0.5),
        Vec3::z(),
        5.0,
        100.0,
    ));
    manager.add_constant_local(
        LocalWindEmitter::new(LocalWindKind::Directional, Vec3::new(-0.5, -0.5, -10.0), Vec3::z(), 20.0, 10.0)
            .overwriting(),
    );

    let first = manager.tick(0.0, 0.0);
    assert_eq!(first[0].1, Ok(TickOutcome::Rebuilt));
    manager.tick(0.0, 0.0);

    for cell in manager.zone(id).unwrap().cells() {
        assert_eq!(cell.velocity.x, 0.0);
        assert_eq!(cell.velocity.y, 0.0);
        assert!(cell.velocity.z > 0.0);
    }
}
