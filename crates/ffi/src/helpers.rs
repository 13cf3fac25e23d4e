use crate::error::{with_last_error_mut, DefaultVoxelWindError, VoxelWindError, VoxelWindErrorCode};
use crate::instance::{InstanceState, VoxelWindInstance};
use std::ffi::CString;

/// Record an error in thread-local storage.
pub(crate) fn set_last_error(error: &impl VoxelWindError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Record an error and return its code.
#[inline]
pub(crate) fn track_error(error: &impl VoxelWindError) -> VoxelWindErrorCode {
    set_last_error(error);
    error.code()
}

/// Pass `Ok` through, record and convert `Err` to its code.
pub(crate) fn track_result<T>(result: Result<T, DefaultVoxelWindError>) -> Result<T, VoxelWindErrorCode> {
    result.map_err(|error| track_error(&error))
}

/// Run `f` and collapse its result into an error code.
pub(crate) fn handle_ffi_result_error<F>(f: F) -> VoxelWindErrorCode
where
    F: FnOnce() -> Result<(), DefaultVoxelWindError>,
{
    match track_result(f()) {
        Ok(()) => VoxelWindErrorCode::Ok,
        Err(code) => code,
    }
}

/// Borrow the instance behind a raw pointer, rejecting null.
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by `voxel_wind_new`.
pub(crate) unsafe fn instance_from_ptr<'a>(
    ptr: *const VoxelWindInstance,
) -> Result<&'a VoxelWindInstance, DefaultVoxelWindError> {
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultVoxelWindError::null_pointer("ptr"))
}

/// Shared access to the zone and its sources.
pub(crate) fn with_state<F, R>(instance: &VoxelWindInstance, f: F) -> Result<R, DefaultVoxelWindError>
where
    F: FnOnce(&InstanceState) -> R,
{
    let state = instance
        .state
        .read()
        .map_err(|_| DefaultVoxelWindError::lock_poisoned("RwLock"))?;
    Ok(f(&state))
}

/// Exclusive access to the zone and its sources.
pub(crate) fn with_state_mut<F, R>(instance: &VoxelWindInstance, f: F) -> Result<R, DefaultVoxelWindError>
where
    F: FnOnce(&mut InstanceState) -> R,
{
    let mut state = instance
        .state
        .write()
        .map_err(|_| DefaultVoxelWindError::lock_poisoned("RwLock"))?;
    Ok(f(&mut state))
}
