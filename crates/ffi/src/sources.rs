use voxel_wind_core::{
    GlobalWindEmitter, GlobalWindId, GlobalWindKind, LocalWindEmitter, LocalWindId, LocalWindKind, ObstacleId,
    SourceAggregator, SphereObstacle,
};

use crate::error::{DefaultVoxelWindError, VoxelWindErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, track_error, with_state_mut};
use crate::instance::{VoxelWindInstance, WindVec3};

/// `GlobalWindDesc::kind`: constant push along `forward`.
pub const VOXEL_WIND_GLOBAL_DIRECTIONAL: u32 = 0;
/// `GlobalWindDesc::kind`: noise-gradient gust field scrolled along `forward`.
pub const VOXEL_WIND_GLOBAL_TURBULENT: u32 = 1;

/// `LocalWindDesc::kind`: cylinder along `forward`, length `speed`.
pub const VOXEL_WIND_LOCAL_DIRECTIONAL: u32 = 0;
/// `LocalWindDesc::kind`: radial blast from `position`.
pub const VOXEL_WIND_LOCAL_OMNI: u32 = 1;
/// `LocalWindDesc::kind`: swirl around `forward`.
pub const VOXEL_WIND_LOCAL_VORTEX: u32 = 2;

/// Global wind emitter parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct GlobalWindDesc {
    pub enabled: bool,
    /// One of the `VOXEL_WIND_GLOBAL_*` constants.
    pub kind: u32,
    pub forward: WindVec3,
    pub strength: f32,
    pub speed: f32,
    /// Spatial frequency of the turbulence noise.
    pub noise_scale: f32,
}

/// Local wind emitter parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct LocalWindDesc {
    pub enabled: bool,
    /// One of the `VOXEL_WIND_LOCAL_*` constants.
    pub kind: u32,
    /// Replace the cell velocity instead of adding to it.
    pub overwrite: bool,
    pub position: WindVec3,
    pub forward: WindVec3,
    pub speed: f32,
    pub radius: f32,
}

/// Spherical obstacle parameters. Velocity is derived from how far the
/// position moves between ticks.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ObstacleDesc {
    pub position: WindVec3,
    pub radius: f32,
    pub push_strength: f32,
    pub shadow_strength: f32,
    pub shadow_distance: f32,
}

/// Reject a descriptor field that is NaN or infinite.
fn require_finite(field: &str, values: &[f32]) -> Result<(), DefaultVoxelWindError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(DefaultVoxelWindError::invalid_parameter(format!(
            "{field} must be finite, got {values:?}"
        )))
    }
}

fn require_finite_vec(field: &str, v: WindVec3) -> Result<(), DefaultVoxelWindError> {
    require_finite(field, &[v.x, v.y, v.z])
}

pub(crate) fn global_emitter_from_desc(desc: &GlobalWindDesc) -> Result<GlobalWindEmitter, DefaultVoxelWindError> {
    let kind = match desc.kind {
        VOXEL_WIND_GLOBAL_DIRECTIONAL => GlobalWindKind::Directional,
        VOXEL_WIND_GLOBAL_TURBULENT => GlobalWindKind::Turbulent,
        other => {
            return Err(DefaultVoxelWindError::invalid_parameter(format!(
                "Unknown global wind kind {other}"
            )))
        }
    };
    require_finite_vec("forward", desc.forward)?;
    require_finite("strength", &[desc.strength])?;
    require_finite("speed", &[desc.speed])?;
    require_finite("noise_scale", &[desc.noise_scale])?;

    Ok(GlobalWindEmitter {
        enabled: desc.enabled,
        kind,
        forward: desc.forward.into(),
        strength: desc.strength,
        speed: desc.speed,
        noise_scale: desc.noise_scale,
    })
}

pub(crate) fn local_emitter_from_desc(desc: &LocalWindDesc) -> Result<LocalWindEmitter, DefaultVoxelWindError> {
    let kind = match desc.kind {
        VOXEL_WIND_LOCAL_DIRECTIONAL => LocalWindKind::Directional,
        VOXEL_WIND_LOCAL_OMNI => LocalWindKind::Omni,
        VOXEL_WIND_LOCAL_VORTEX => LocalWindKind::Vortex,
        other => {
            return Err(DefaultVoxelWindError::invalid_parameter(format!(
                "Unknown local wind kind {other}"
            )))
        }
    };
    require_finite_vec("position", desc.position)?;
    require_finite_vec("forward", desc.forward)?;
    require_finite("speed", &[desc.speed])?;
    require_finite("radius", &[desc.radius])?;

    Ok(LocalWindEmitter {
        enabled: desc.enabled,
        kind,
        overwrite: desc.overwrite,
        position: desc.position.into(),
        forward: desc.forward.into(),
        speed: desc.speed,
        radius: desc.radius,
    })
}

impl ObstacleDesc {
    fn validate(&self) -> Result<(), DefaultVoxelWindError> {
        require_finite_vec("position", self.position)?;
        require_finite("radius", &[self.radius])?;
        require_finite("push_strength", &[self.push_strength])?;
        require_finite("shadow_strength", &[self.shadow_strength])?;
        require_finite("shadow_distance", &[self.shadow_distance])
    }

    /// Copy the parameters onto an obstacle, keeping its previous position.
    fn apply_to(&self, obstacle: &mut SphereObstacle) {
        obstacle.set_position(self.position.into());
        obstacle.radius = self.radius;
        obstacle.push_strength = self.push_strength;
        obstacle.shadow_strength = self.shadow_strength;
        obstacle.shadow_distance = self.shadow_distance;
    }
}

/// Run `register` under the write lock and store the new id in `out_id`.
unsafe fn add_source<F>(ptr: *const VoxelWindInstance, out_id: *mut u64, register: F) -> VoxelWindErrorCode
where
    F: FnOnce(&mut SourceAggregator) -> Result<u64, DefaultVoxelWindError>,
{
    if out_id.is_null() {
        return track_error(&DefaultVoxelWindError::null_pointer("out_id"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let id = with_state_mut(instance, |state| register(&mut state.sources))??;
        unsafe {
            *out_id = id;
        }
        Ok(())
    })
}

/// Run `edit` against the aggregator under the write lock.
unsafe fn edit_sources<F>(ptr: *const VoxelWindInstance, edit: F) -> VoxelWindErrorCode
where
    F: FnOnce(&mut SourceAggregator) -> Result<(), DefaultVoxelWindError>,
{
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_state_mut(instance, |state| edit(&mut state.sources))?
    })
}

/// Register a global wind emitter; its id is written to `out_id`.
///
/// Returns `Ok`, `NullPointer`, `InvalidParameter` (unknown kind or a
/// non-finite field) or `LockPoisoned`.
///
/// # Safety
///
/// `ptr` must be null or a live instance; `out_id` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn voxel_wind_add_global(
    ptr: *const VoxelWindInstance,
    desc: GlobalWindDesc,
    out_id: *mut u64,
) -> VoxelWindErrorCode {
    unsafe {
        add_source(ptr, out_id, |sources| {
            let emitter = global_emitter_from_desc(&desc)?;
            Ok(sources.add_global(emitter).raw())
        })
    }
}

/// Replace the parameters of a registered global wind emitter.
///
/// # Safety
///
/// `ptr` must be null or a live instance.
#[no_mangle]
pub unsafe extern "C" fn voxel_wind_update_global(
    ptr: *const VoxelWindInstance,
    id: u64,
    desc: GlobalWindDesc,
) -> VoxelWindErrorCode {
    unsafe {
        edit_sources(ptr, |sources| {
            let emitter = global_emitter_from_desc(&desc)?;
            let slot = sources
                .global_mut(GlobalWindId(id))
                .ok_or_else(|| DefaultVoxelWindError::unknown_handle("global wind", id))?;
            *slot = emitter;
            Ok(())
        })
    }
}

/// Unregister a global wind emitter.
///
/// # Safety
///
/// `ptr` must be null or a live instance.
#[no_mangle]
pub unsafe extern "C" fn voxel_wind_remove_global(ptr: *const VoxelWindInstance, id: u64) -> VoxelWindErrorCode {
    unsafe {
        edit_sources(ptr, |sources| {
            sources
                .remove_global(GlobalWindId(id))
                .map(drop)
                .ok_or_else(|| DefaultVoxelWindError::unknown_handle("global wind", id))
        })
    }
}

/// Register a local wind emitter; its id is written to `out_id`.
///
/// # Safety
///
/// `ptr` must be null or a live instance; `out_id` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn voxel_wind_add_local(
    ptr: *const VoxelWindInstance,
    desc: LocalWindDesc,
    out_id: *mut u64,
) -> VoxelWindErrorCode {
    unsafe {
        add_source(ptr, out_id, |sources| {
            let emitter = local_emitter_from_desc(&desc)?;
            Ok(sources.add_local(emitter).raw())
        })
    }
}

/// Replace the parameters of a registered local wind emitter.
///
/// # Safety
///
/// `ptr` must be null or a live instance.
#[no_mangle]
pub unsafe extern "C" fn voxel_wind_update_local(
    ptr: *const VoxelWindInstance,
    id: u64,
    desc: LocalWindDesc,
) -> VoxelWindErrorCode {
    unsafe {
        edit_sources(ptr, |sources| {
            let emitter = local_emitter_from_desc(&desc)?;
            let slot = sources
                .local_mut(LocalWindId(id))
                .ok_or_else(|| DefaultVoxelWindError::unknown_handle("local wind", id))?;
            *slot = emitter;
            Ok(())
        })
    }
}

/// Unregister a local wind emitter.
///
/// # Safety
///
/// `ptr` must be null or a live instance.
#[no_mangle]
pub unsafe extern "C" fn voxel_wind_remove_local(ptr: *const VoxelWindInstance, id: u64) -> VoxelWindErrorCode {
    unsafe {
        edit_sources(ptr, |sources| {
            sources
                .remove_local(LocalWindId(id))
                .map(drop)
                .ok_or_else(|| DefaultVoxelWindError::unknown_handle("local wind", id))
        })
    }
}

/// Register a spherical obstacle; its id is written to `out_id`.
///
/// # Safety
///
/// `ptr` must be null or a live instance; `out_id` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn voxel_wind_add_obstacle(
    ptr: *const VoxelWindInstance,
    desc: ObstacleDesc,
    out_id: *mut u64,
) -> VoxelWindErrorCode {
    unsafe {
        add_source(ptr, out_id, |sources| {
            desc.validate()?;
            let mut obstacle = SphereObstacle::new(desc.position.into(), desc.radius);
            desc.apply_to(&mut obstacle);
            Ok(sources.add_obstacle(obstacle).raw())
        })
    }
}

/// Move or reshape a registered obstacle.
///
/// The displacement since the previous tick becomes the obstacle velocity
/// used for pushing air.
///
/// # Safety
///
/// `ptr` must be null or a live instance.
#[no_mangle]
pub unsafe extern "C" fn voxel_wind_update_obstacle(
    ptr: *const VoxelWindInstance,
    id: u64,
    desc: ObstacleDesc,
) -> VoxelWindErrorCode {
    unsafe {
        edit_sources(ptr, |sources| {
            desc.validate()?;
            let obstacle = sources
                .obstacle_mut(ObstacleId(id))
                .ok_or_else(|| DefaultVoxelWindError::unknown_handle("obstacle", id))?;
            desc.apply_to(obstacle);
            Ok(())
        })
    }
}

/// Unregister an obstacle.
///
/// # Safety
///
/// `ptr` must be null or a live instance.
#[no_mangle]
pub unsafe extern "C" fn voxel_wind_remove_obstacle(ptr: *const VoxelWindInstance, id: u64) -> VoxelWindErrorCode {
    unsafe {
        edit_sources(ptr, |sources| {
            sources
                .remove_obstacle(ObstacleId(id))
                .map(drop)
                .ok_or_else(|| DefaultVoxelWindError::unknown_handle("obstacle", id))
        })
    }
}
