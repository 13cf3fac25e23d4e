use std::ptr;

use voxel_wind_core::Vec3;

use crate::error::{DefaultVoxelWindError, VoxelWindErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, track_error, with_state};
use crate::instance::{VoxelWindInstance, WindVec3};

/// One cell of the committed field. Keep this layout stable for C/C++/C#
/// consumers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VoxelCell {
    /// World-space lattice point of the cell: `coord * edge_length -
    /// extent / 2 + offset`, moved through the grid transform.
    pub position: WindVec3,
    /// Wind velocity in world units per second.
    pub velocity: WindVec3,
    /// Integer grid coordinate (x, y, z).
    pub coord: [u32; 3],
    /// Edge length the cell was built with.
    pub edge_length: f32,
    /// False while the cell sits in an obstacle's full shadow.
    pub active: bool,
}

/// Field summary for debug overlays.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FieldStatsC {
    pub cell_count: u32,
    pub active_cells: u32,
    pub max_speed: f32,
    pub mean_speed: f32,
    /// Duration of the last tick in milliseconds.
    pub last_tick_ms: f32,
}

fn count_to_u32(count: usize) -> Result<u32, DefaultVoxelWindError> {
    u32::try_from(count)
        .map_err(|_| DefaultVoxelWindError::invalid_parameter(format!("cell count {count} does not fit in u32")))
}

/// Number of cells in the committed grid.
///
/// # Safety
///
/// `ptr` must be null or a live instance; `out_count` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn voxel_wind_cell_count(ptr: *const VoxelWindInstance, out_count: *mut u32) -> VoxelWindErrorCode {
    if out_count.is_null() {
        return track_error(&DefaultVoxelWindError::null_pointer("out_count"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let count = with_state(instance, |state| state.zone.cells().len())?;
        let count = count_to_u32(count)?;
        unsafe {
            *out_count = count;
        }
        Ok(())
    })
}

/// Copy up to `capacity` cells, in linear addressing order
/// (`x + y * nx + z * nx * ny`), into `out_cells`.
///
/// `out_written` receives the number of cells copied. Call
/// `voxel_wind_cell_count` first to size the buffer.
///
/// Thread-safe: takes the read lock, so several threads may copy at once.
///
/// # Safety
///
/// - `ptr` must be null or a live instance.
/// - `out_cells` must point to at least `capacity` writable `VoxelCell`s
///   (it may be null when `capacity` is 0).
/// - `out_written` must be null or writable.
///
/// Example (C++)
/// ```cpp
/// uint32_t count = 0;
/// voxel_wind_cell_count(wind, &count);
/// std::vector<VoxelCell> cells(count);
/// uint32_t written = 0;
/// voxel_wind_copy_cells(wind, cells.data(), count, &written);
/// ```
#[no_mangle]
pub unsafe extern "C" fn voxel_wind_copy_cells(
    ptr: *const VoxelWindInstance,
    out_cells: *mut VoxelCell,
    capacity: u32,
    out_written: *mut u32,
) -> VoxelWindErrorCode {
    if out_written.is_null() {
        return track_error(&DefaultVoxelWindError::null_pointer("out_written"));
    }
    unsafe {
        *out_written = 0;
    }
    if out_cells.is_null() && capacity > 0 {
        return track_error(&DefaultVoxelWindError::null_pointer("out_cells"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let written = with_state(instance, |state| {
            let cells = state.zone.cells();
            let written = cells.len().min(capacity as usize);
            for (i, cell) in cells.iter().take(written).enumerate() {
                let converted = VoxelCell {
                    position: cell.position.into(),
                    velocity: cell.velocity.into(),
                    coord: [cell.coord.x as u32, cell.coord.y as u32, cell.coord.z as u32],
                    edge_length: cell.edge_length,
                    active: cell.active,
                };
                // SAFETY: i < written <= capacity, the caller's buffer size.
                unsafe {
                    out_cells.add(i).write(converted);
                }
            }
            written
        })?;

        let written = count_to_u32(written)?;
        unsafe {
            *out_written = written;
        }
        Ok(())
    })
}

/// Trilinearly interpolated wind velocity at a world position, written as
/// three floats to `out_velocity`.
///
/// Positions outside the grid return the nearest boundary value.
///
/// # Safety
///
/// - `ptr` must be null or a live instance.
/// - `out_velocity` must be null or point to 3 writable floats.
#[no_mangle]
pub unsafe extern "C" fn voxel_wind_sample(
    ptr: *const VoxelWindInstance,
    x: f32,
    y: f32,
    z: f32,
    out_velocity: *mut f32,
) -> VoxelWindErrorCode {
    if out_velocity.is_null() {
        return track_error(&DefaultVoxelWindError::null_pointer("out_velocity"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let v = with_state(instance, |state| state.zone.sample(&Vec3::new(x, y, z)))?;
        unsafe {
            ptr::copy_nonoverlapping([v.x, v.y, v.z].as_ptr(), out_velocity, 3);
        }
        Ok(())
    })
}

/// Cell count, active cells, speed statistics and last tick time.
///
/// # Safety
///
/// `ptr` must be null or a live instance; `out_stats` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn voxel_wind_get_stats(
    ptr: *const VoxelWindInstance,
    out_stats: *mut FieldStatsC,
) -> VoxelWindErrorCode {
    if out_stats.is_null() {
        return track_error(&DefaultVoxelWindError::null_pointer("out_stats"));
    }

    let result = handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let (stats, last_tick_ms) = with_state(instance, |state| {
            (state.zone.stats(), state.zone.frame_timer().last_frame_time_ms())
        })?;

        let converted = FieldStatsC {
            cell_count: count_to_u32(stats.cell_count)?,
            active_cells: count_to_u32(stats.active_cells)?,
            max_speed: stats.max_speed,
            mean_speed: stats.mean_speed,
            last_tick_ms: last_tick_ms as f32,
        };
        unsafe {
            *out_stats = converted;
        }
        Ok(())
    });

    if result != VoxelWindErrorCode::Ok {
        unsafe {
            *out_stats = FieldStatsC::default();
        }
    }

    result
}
