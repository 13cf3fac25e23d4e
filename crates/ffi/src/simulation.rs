use crate::error::{DefaultVoxelWindError, VoxelWindErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, with_state_mut};
use crate::instance::VoxelWindInstance;

/// Advance the zone by one tick.
///
/// Snapshots every registered source, then either rebuilds the grid (after
/// `voxel_wind_configure`) or advances the field by `dt` seconds. `time` is
/// the host's running clock and drives the turbulence scroll.
///
/// Thread-safe: takes the instance's write lock for the duration of the tick.
///
/// Returns
/// - `VoxelWindErrorCode::Ok` (0) on success
/// - `VoxelWindErrorCode::NullPointer` if `ptr` is null
/// - `VoxelWindErrorCode::InvalidParameter` if `time` or `dt` is not finite
///   or `dt` is negative
/// - `VoxelWindErrorCode::InvalidGridParameters` if a pending rebuild failed;
///   the previous grid stays live
/// - `VoxelWindErrorCode::LockPoisoned` if the internal lock is poisoned
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by `voxel_wind_new`.
///
/// Example (C++)
/// ```cpp
/// void AWindZone::Tick(float DeltaTime) {
///     Elapsed += DeltaTime;
///     voxel_wind_tick(Wind, Elapsed, DeltaTime);
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn voxel_wind_tick(ptr: *const VoxelWindInstance, time: f32, dt: f32) -> VoxelWindErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        if !time.is_finite() || !dt.is_finite() || dt < 0.0 {
            return Err(DefaultVoxelWindError::invalid_parameter(format!(
                "time and dt must be finite with dt >= 0, got time {time}, dt {dt}"
            )));
        }

        with_state_mut(instance, |state| {
            let snapshot = state.sources.snapshot(dt);
            state
                .zone
                .tick(&snapshot, time, dt)
                .map(drop)
                .map_err(|err| DefaultVoxelWindError::invalid_grid(&err))
        })?
    })
}
