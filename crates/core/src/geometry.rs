//! Containment tests and grid addressing shared by the builder and the updater.
//!
//! Every cell array in the crate is laid out with x varying fastest:
//!
//! ```text
//! index = x + y * density.x + z * density.x * density.y
//! ```
//!
//! `to_grid_coord` and `to_linear_index` are the only place that law is
//! written down; interpolation and diffusion go through them.

use crate::core_types::vec3::{safe_normalize, Vec3};
use serde::{Deserialize, Serialize};

/// Integer coordinate of a cell inside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl GridCoord {
    #[must_use]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Coordinate as a float vector (used for positions and interpolation).
    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

/// Number of cells along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Density {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Density {
    #[must_use]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Total cell count, `None` on overflow.
    pub fn checked_count(&self) -> Option<usize> {
        self.x.checked_mul(self.y)?.checked_mul(self.z)
    }

    /// Total cell count. Callers must have validated the density.
    pub fn count(&self) -> usize {
        self.x * self.y * self.z
    }

    /// True if `coord` lies inside the grid.
    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.x < self.x && coord.y < self.y && coord.z < self.z
    }

    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

/// Decode a linear index into its grid coordinate.
#[inline]
pub fn to_grid_coord(index: usize, density: Density) -> GridCoord {
    GridCoord {
        x: index % density.x,
        y: (index / density.x) % density.y,
        z: index / (density.x * density.y),
    }
}

/// Encode a grid coordinate as a linear index.
#[inline]
pub fn to_linear_index(coord: GridCoord, density: Density) -> usize {
    coord.x + coord.y * density.x + coord.z * density.x * density.y
}

/// Result of a containment test: `Some(t)` with `t` in `[0, 1]` when inside.
pub type Containment = Option<f32>;

/// Test whether `point` lies inside a (possibly tapered) cylinder.
///
/// The cylinder starts at `base` and extends `height` along `axis`. Its radius
/// varies linearly from `lower_radius` at the base to `upper_radius` at the
/// top. On acceptance returns `t = projection / height`.
///
/// A non-positive height or a zero-length axis contains nothing.
pub fn inside_cylinder(
    point: &Vec3,
    base: &Vec3,
    axis: &Vec3,
    lower_radius: f32,
    upper_radius: f32,
    height: f32,
) -> Containment {
    let axis = safe_normalize(axis);
    if height <= 0.0 || axis == Vec3::zeros() {
        return None;
    }

    let base_to_point = point - base;
    let projection = base_to_point.dot(&axis);
    if !(0.0..=height).contains(&projection) {
        return None;
    }

    let t = projection / height;
    let effective_radius = lower_radius + (upper_radius - lower_radius) * t;

    let on_axis = base + axis * projection;
    let distance_to_axis = (point - on_axis).norm();
    if distance_to_axis > effective_radius {
        return None;
    }

    Some(t)
}

/// Test whether `point` lies inside a sphere.
///
/// On acceptance returns `t = distance / radius`. A non-positive radius
/// contains nothing.
pub fn inside_sphere(point: &Vec3, center: &Vec3, radius: f32) -> Containment {
    if radius <= 0.0 {
        return None;
    }

    let distance = (point - center).norm();
    if distance > radius {
        return None;
    }

    Some(distance / radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addressing_bijection() {
        let densities = [
            Density::new(1, 1, 1),
            Density::new(2, 2, 2),
            Density::new(5, 3, 4),
            Density::new(7, 1, 9),
        ];

        for density in densities {
            for z in 0..density.z {
                for y in 0..density.y {
                    for x in 0..density.x {
                        let coord = GridCoord::new(x, y, z);
                        let index = to_linear_index(coord, density);
                        assert!(index < density.count());
                        assert_eq!(to_grid_coord(index, density), coord);
                    }
                }
            }
        }
    }

    #[test]
    fn test_x_varies_fastest() {
        let density = Density::new(4, 3, 2);
        assert_eq!(to_linear_index(GridCoord::new(1, 0, 0), density), 1);
        assert_eq!(to_linear_index(GridCoord::new(0, 1, 0), density), 4);
        assert_eq!(to_linear_index(GridCoord::new(0, 0, 1), density), 12);
        assert_eq!(to_grid_coord(23, density), GridCoord::new(3, 2, 1));
    }

    #[test]
    fn test_checked_count_overflow() {
        assert_eq!(Density::new(2, 3, 4).checked_count(), Some(24));
        assert_eq!(Density::new(usize::MAX, 2, 1).checked_count(), None);
    }

    #[test]
    fn test_sphere_center_and_boundary() {
        let center = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(inside_sphere(&center, &center, 2.0), Some(0.0));

        let boundary = center + Vec3::new(2.0, 0.0, 0.0);
        assert_eq!(inside_sphere(&boundary, &center, 2.0), Some(1.0));

        let beyond = center + Vec3::new(2.001, 0.0, 0.0);
        assert_eq!(inside_sphere(&beyond, &center, 2.0), None);
    }

    #[test]
    fn test_sphere_zero_radius_contains_nothing() {
        let p = Vec3::zeros();
        assert_eq!(inside_sphere(&p, &p, 0.0), None);
    }

    #[test]
    fn test_cylinder_projection_fraction() {
        let base = Vec3::zeros();
        let axis = Vec3::new(0.0, 0.0, 2.0); // not normalized on purpose
        let t = inside_cylinder(&Vec3::new(0.5, 0.0, 1.0), &base, &axis, 1.0, 1.0, 4.0);
        assert_eq!(t, Some(0.25));
    }

    #[test]
    fn test_cylinder_rejects_outside_height() {
        let base = Vec3::zeros();
        let axis = Vec3::z();
        assert_eq!(inside_cylinder(&Vec3::new(0.0, 0.0, -0.1), &base, &axis, 1.0, 1.0, 4.0), None);
        assert_eq!(inside_cylinder(&Vec3::new(0.0, 0.0, 4.1), &base, &axis, 1.0, 1.0, 4.0), None);
        assert_eq!(inside_cylinder(&Vec3::new(0.0, 0.0, 4.0), &base, &axis, 1.0, 1.0, 4.0), Some(1.0));
    }

    #[test]
    fn test_cylinder_tapered_radius() {
        let base = Vec3::zeros();
        let axis = Vec3::z();
        // Radius grows from 1 at the base to 3 at the top (2 halfway up)
        let point = Vec3::new(1.5, 0.0, 2.0);
        assert_eq!(inside_cylinder(&point, &base, &axis, 1.0, 3.0, 4.0), Some(0.5));
        let point = Vec3::new(1.5, 0.0, 0.5);
        assert_eq!(inside_cylinder(&point, &base, &axis, 1.0, 3.0, 4.0), None);
    }

    #[test]
    fn test_cylinder_degenerate_inputs() {
        let p = Vec3::zeros();
        assert_eq!(inside_cylinder(&p, &p, &Vec3::x(), 1.0, 1.0, 0.0), None);
        assert_eq!(inside_cylinder(&p, &p, &Vec3::zeros(), 1.0, 1.0, 1.0), None);
    }
}
