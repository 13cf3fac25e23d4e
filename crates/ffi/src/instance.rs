use std::ptr;
use std::sync::RwLock;

use voxel_wind_core::{GridConfig, Mat4, SourceAggregator, Vec3, VoxelWindZone};

use crate::error::{DefaultVoxelWindError, VoxelWindErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, track_error, track_result, with_state_mut};

/// C-compatible 3D vector.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindVec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<WindVec3> for Vec3 {
    fn from(v: WindVec3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for WindVec3 {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

/// Grid description passed from the host.
///
/// Cells are placed at `coord * edge_length - extent / 2 + offset` in grid
/// space, then moved to world space by `transform`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct GridDesc {
    /// Grid-local to world transform, 16 floats in column-major order.
    pub transform: [f32; 16],
    /// Cell edge length in world units.
    pub edge_length: f32,
    /// Size of the box to fill with cells.
    pub extent: WindVec3,
    /// Grid-space offset added to every cell position.
    pub offset: WindVec3,
}

impl GridDesc {
    /// Validated core configuration for this description.
    pub(crate) fn validated_config(&self) -> Result<GridConfig, DefaultVoxelWindError> {
        let config = GridConfig::new(self.edge_length, self.extent.into())
            .with_transform(Mat4::from_column_slice(&self.transform))
            .with_offset(self.offset.into());
        config
            .validate()
            .map_err(|err| DefaultVoxelWindError::invalid_grid(&err))?;
        Ok(config)
    }
}

/// Zone plus the sources registered against it.
pub(crate) struct InstanceState {
    pub(crate) zone: VoxelWindZone,
    pub(crate) sources: SourceAggregator,
}

/// Opaque wind zone handle.
///
/// # Thread Safety
/// The zone and its sources sit behind one `RwLock`: queries take a read
/// lock and may run concurrently; `voxel_wind_tick`, `voxel_wind_configure`
/// and the source functions take the write lock.
pub struct VoxelWindInstance {
    pub(crate) state: RwLock<InstanceState>,
}

impl VoxelWindInstance {
    /// Build the zone and its grid immediately so cell queries work before
    /// the first tick.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGridParameters` if the description is rejected.
    pub(crate) fn new(desc: &GridDesc) -> Result<Self, DefaultVoxelWindError> {
        let mut zone = VoxelWindZone::new(desc.validated_config()?);
        zone.rebuild()
            .map_err(|err| DefaultVoxelWindError::invalid_grid(&err))?;

        Ok(Self {
            state: RwLock::new(InstanceState {
                zone,
                sources: SourceAggregator::new(),
            }),
        })
    }
}

/// Create a wind zone and return it via out-parameter.
///
/// Returns
/// - `VoxelWindErrorCode::Ok` (0), `out_instance` holds a valid pointer
/// - `VoxelWindErrorCode::NullPointer` if `out_instance` is null
/// - `VoxelWindErrorCode::InvalidGridParameters` if `desc` is rejected;
///   `out_instance` is set to null
///
/// Call `voxel_wind_get_last_error()` for a description of the failure.
///
/// # Safety
///
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller owns the returned instance and MUST call `voxel_wind_destroy`
///   exactly once.
///
/// Example (C++)
/// ```cpp
/// GridDesc desc = {};
/// desc.transform[0] = desc.transform[5] = desc.transform[10] = desc.transform[15] = 1.0f;
/// desc.edge_length = 0.5f;
/// desc.extent = { 16.0f, 8.0f, 16.0f };
///
/// VoxelWindInstance* wind = nullptr;
/// if (voxel_wind_new(desc, &wind) != VoxelWindErrorCode::Ok) {
///     fprintf(stderr, "%s\n", voxel_wind_get_last_error());
///     return;
/// }
/// // ... use wind ...
/// voxel_wind_destroy(wind);
/// ```
#[no_mangle]
pub unsafe extern "C" fn voxel_wind_new(
    desc: GridDesc,
    out_instance: *mut *mut VoxelWindInstance,
) -> VoxelWindErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultVoxelWindError::null_pointer("out_instance"));
    }

    match track_result(VoxelWindInstance::new(&desc)) {
        Ok(instance) => {
            unsafe {
                *out_instance = Box::into_raw(Box::new(instance));
            }
            VoxelWindErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                *out_instance = ptr::null_mut();
            }
            code
        }
    }
}

/// Destroy an instance created by `voxel_wind_new`. Null is a no-op.
///
/// # Safety
///
/// - `ptr` must come from `voxel_wind_new` and must not have been destroyed.
/// - The pointer must not be used after this call.
#[no_mangle]
pub unsafe extern "C" fn voxel_wind_destroy(ptr: *mut VoxelWindInstance) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: `ptr` was produced by `Box::into_raw` in `voxel_wind_new`.
    unsafe {
        drop(Box::from_raw(ptr));
    }
}

/// Replace the zone's grid parameters.
///
/// The description is validated immediately; on success the grid is rebuilt
/// on the next `voxel_wind_tick`. Velocities survive the rebuild when the
/// cell count is unchanged. On failure the zone keeps its current
/// parameters.
///
/// Returns
/// - `VoxelWindErrorCode::Ok` (0) on success
/// - `VoxelWindErrorCode::NullPointer` if `ptr` is null
/// - `VoxelWindErrorCode::InvalidGridParameters` if `desc` is rejected
/// - `VoxelWindErrorCode::LockPoisoned` if the internal lock is poisoned
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by `voxel_wind_new`.
#[no_mangle]
pub unsafe extern "C" fn voxel_wind_configure(ptr: *const VoxelWindInstance, desc: GridDesc) -> VoxelWindErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let config = desc.validated_config()?;
        with_state_mut(instance, |state| state.zone.set_config(config))
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::voxel_wind_get_last_error_code;

    pub(crate) fn identity_desc(edge_length: f32, extent: [f32; 3]) -> GridDesc {
        let mut transform = [0.0; 16];
        for i in 0..4 {
            transform[i * 5] = 1.0;
        }
        GridDesc {
            transform,
            edge_length,
            extent: WindVec3 {
                x: extent[0],
                y: extent[1],
                z: extent[2],
            },
            offset: WindVec3::default(),
        }
    }

    pub(crate) fn new_instance(desc: GridDesc) -> *mut VoxelWindInstance {
        let mut ptr = ptr::null_mut();
        let code = unsafe { voxel_wind_new(desc, &mut ptr) };
        assert_eq!(code, VoxelWindErrorCode::Ok);
        assert!(!ptr.is_null());
        ptr
    }

    #[test]
    fn test_new_builds_grid_immediately() {
        let ptr = new_instance(identity_desc(1.0, [3.0, 2.0, 2.0]));
        let instance = unsafe { &*ptr };
        let state = instance.state.read().unwrap();
        assert_eq!(state.zone.cells().len(), 12);
        assert!(!state.zone.is_dirty());
        drop(state);
        unsafe { voxel_wind_destroy(ptr) };
    }

    #[test]
    fn test_new_rejects_invalid_grid() {
        let mut ptr = ptr::NonNull::dangling().as_ptr();
        let code = unsafe { voxel_wind_new(identity_desc(0.0, [2.0, 2.0, 2.0]), &mut ptr) };
        assert_eq!(code, VoxelWindErrorCode::InvalidGridParameters);
        assert!(ptr.is_null());
        assert_eq!(voxel_wind_get_last_error_code(), VoxelWindErrorCode::InvalidGridParameters);
    }

    #[test]
    fn test_new_rejects_null_out_pointer() {
        let code = unsafe { voxel_wind_new(identity_desc(1.0, [2.0, 2.0, 2.0]), ptr::null_mut()) };
        assert_eq!(code, VoxelWindErrorCode::NullPointer);
    }

    #[test]
    fn test_configure_validates_before_applying() {
        let ptr = new_instance(identity_desc(1.0, [2.0, 2.0, 2.0]));

        let bad = identity_desc(1.0, [0.5, 2.0, 2.0]);
        assert_eq!(
            unsafe { voxel_wind_configure(ptr, bad) },
            VoxelWindErrorCode::InvalidGridParameters
        );
        {
            let state = unsafe { &*ptr }.state.read().unwrap();
            assert!(!state.zone.is_dirty());
        }

        let good = identity_desc(1.0, [4.0, 2.0, 2.0]);
        assert_eq!(unsafe { voxel_wind_configure(ptr, good) }, VoxelWindErrorCode::Ok);
        {
            let state = unsafe { &*ptr }.state.read().unwrap();
            assert!(state.zone.is_dirty());
        }

        unsafe { voxel_wind_destroy(ptr) };
    }

    #[test]
    fn test_configure_null_instance() {
        let code = unsafe { voxel_wind_configure(ptr::null(), identity_desc(1.0, [2.0, 2.0, 2.0])) };
        assert_eq!(code, VoxelWindErrorCode::NullPointer);
    }
}
