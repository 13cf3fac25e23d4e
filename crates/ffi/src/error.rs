use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use voxel_wind_core::GridConfigError;

/// Common interface for errors crossing the FFI boundary.
///
/// - `code()` is what the C caller receives as the return value
/// - `msg()` is stored thread-locally for `voxel_wind_get_last_error`
pub(crate) trait VoxelWindError {
    fn code(&self) -> VoxelWindErrorCode;

    fn msg(&self) -> &str;
}

/// Error code plus a formatted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultVoxelWindError {
    code: VoxelWindErrorCode,
    msg: String,
}

impl DefaultVoxelWindError {
    /// Null pointer passed where non-null is required.
    ///
    /// # Arguments
    /// * `param_name` - The parameter that was null (e.g. `"out_instance"`, `"ptr"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: VoxelWindErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Lock poisoned by a panic on another thread.
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: VoxelWindErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    pub fn invalid_grid(error: &GridConfigError) -> Self {
        Self {
            code: VoxelWindErrorCode::InvalidGridParameters,
            msg: format!("Grid parameters rejected: {error}"),
        }
    }

    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: VoxelWindErrorCode::InvalidParameter,
            msg: message,
        }
    }

    /// Source handle that was never issued or was already removed.
    pub fn unknown_handle(kind: &str, id: u64) -> Self {
        Self {
            code: VoxelWindErrorCode::InvalidHandle,
            msg: format!("No {kind} registered with id {id}"),
        }
    }
}

impl VoxelWindError for DefaultVoxelWindError {
    fn code(&self) -> VoxelWindErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes. 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoxelWindErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Null pointer passed where non-null required.
    NullPointer = 1,

    /// Internal lock was poisoned by a panic.
    LockPoisoned = 2,

    /// Grid description rejected: edge length, extent, offset or transform
    /// invalid, an axis holds no cell, or the cell limit was exceeded.
    InvalidGridParameters = 3,

    /// Invalid parameter passed to function.
    InvalidParameter = 4,

    /// Unknown source or obstacle id.
    InvalidHandle = 5,
}

impl From<DefaultVoxelWindError> for VoxelWindErrorCode {
    fn from(error: DefaultVoxelWindError) -> Self {
        error.code
    }
}

thread_local! {
    /// Most recent FFI error on this thread (message, code).
    /// The `CString` is kept here so the pointer handed to C stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, VoxelWindErrorCode)> = const { RefCell::new((None, VoxelWindErrorCode::Ok)) };
}

pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, VoxelWindErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, VoxelWindErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Most recent FFI error message on this thread as a null-terminated C string.
///
/// Returns null if no error has been recorded. Error state is per thread.
///
/// The pointer stays valid until the next failing call on this thread.
/// **DO NOT FREE THIS POINTER**.
///
/// Example:
/// ```cpp
/// VoxelWindInstance* wind = nullptr;
/// VoxelWindErrorCode err = voxel_wind_new(desc, &wind);
/// if (err != VoxelWindErrorCode::Ok) {
///     const char* error = voxel_wind_get_last_error();
///     if (error) {
///         printf("Wind zone creation failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn voxel_wind_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Most recent FFI error code on this thread, `Ok` if none.
#[no_mangle]
pub extern "C" fn voxel_wind_get_last_error_code() -> VoxelWindErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
