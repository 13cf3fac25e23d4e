//! Neighbourhood relaxation used to smooth occlusion artifacts

use crate::core_types::vec3::Vec3;
use crate::geometry::{to_linear_index, Density, GridCoord};
use crate::grid::voxel::Voxel;

/// Relaxation passes applied to an occluded cell
pub const DIFFUSION_PASSES: usize = 5;

/// Fraction of the gap to the neighbourhood average closed per pass
pub const DIFFUSION_RATE: f32 = 0.3;

/// Mean velocity over the in-bounds 3x3x3 block around `coord` (the cell included).
///
/// Neighbours outside the grid are skipped, so corner cells average 8
/// values and interior cells 27.
pub fn neighborhood_average(cells: &[Voxel], density: Density, coord: GridCoord) -> Vec3 {
    let lo = |c: usize| c.saturating_sub(1);
    let hi = |c: usize, n: usize| (c + 1).min(n - 1);

    let mut sum = Vec3::zeros();
    let mut count = 0_u32;
    for z in lo(coord.z)..=hi(coord.z, density.z) {
        for y in lo(coord.y)..=hi(coord.y, density.y) {
            for x in lo(coord.x)..=hi(coord.x, density.x) {
                sum += cells[to_linear_index(GridCoord::new(x, y, z), density)].velocity;
                count += 1;
            }
        }
    }

    sum / count as f32
}

/// Blend `velocity` toward `average` `passes` times.
#[inline]
pub fn relax(velocity: Vec3, average: &Vec3, passes: usize) -> Vec3 {
    let mut v = velocity;
    for _ in 0..passes {
        v += (average - v) * DIFFUSION_RATE;
    }
    v
}
