//! Trilinear sampling of the cell array
//!
//! Fractional grid coordinates are split per axis into a lower and upper
//! corner, each clamped to `[0, density - 1]` independently. When clamping
//! folds both corners onto the same index the pair has collapsed and its
//! weight is forced to 0, so sampling outside the grid returns the nearest
//! boundary value rather than extrapolating.

use crate::core_types::vec3::Vec3;
use crate::geometry::{to_linear_index, Density, GridCoord};
use crate::grid::voxel::Voxel;

/// Lower corner, upper corner and the weight of the upper corner along one axis.
#[inline]
fn axis_corners(g: f32, cells: usize) -> (usize, usize, f32) {
    if g.is_nan() {
        return (0, 0, 0.0);
    }

    let max = cells.saturating_sub(1) as i64;
    let base = g.floor();
    // Saturating casts keep infinite coordinates on the boundary
    let lower = (base as i64).clamp(0, max);
    let upper = (base as i64).saturating_add(1).clamp(0, max);

    let weight = if lower == upper { 0.0 } else { g - base };
    (lower as usize, upper as usize, weight)
}

#[inline]
fn lerp(a: &Vec3, b: &Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

/// Sample the velocity field at fractional grid coordinate `g`.
///
/// Blends along x, then y, then z. At integer coordinates inside the grid
/// every weight is 0 and the stored velocity is returned exactly.
pub fn trilinear(cells: &[Voxel], density: Density, g: &Vec3) -> Vec3 {
    let (x0, x1, wx) = axis_corners(g.x, density.x);
    let (y0, y1, wy) = axis_corners(g.y, density.y);
    let (z0, z1, wz) = axis_corners(g.z, density.z);

    let at = |ix, iy, iz| cells[to_linear_index(GridCoord::new(ix, iy, iz), density)].velocity;

    let c00 = lerp(&at(x0, y0, z0), &at(x1, y0, z0), wx);
    let c10 = lerp(&at(x0, y1, z0), &at(x1, y1, z0), wx);
    let c01 = lerp(&at(x0, y0, z1), &at(x1, y0, z1), wx);
    let c11 = lerp(&at(x0, y1, z1), &at(x1, y1, z1), wx);

    let c0 = lerp(&c00, &c10, wy);
    let c1 = lerp(&c01, &c11, wy);

    lerp(&c0, &c1, wz)
}
