//! Vector and matrix aliases for positions, velocities, and grid transforms.

use nalgebra::{Matrix4, Vector3};

/// 3D vector type for positions, velocities, and directions.
///
/// This is a simple alias for `nalgebra::Vector3<f32>`, used throughout
/// the simulation for world positions, wind vectors, and source directions.
pub type Vec3 = Vector3<f32>;

/// Affine 4x4 transform (grid-local to world space).
pub type Mat4 = Matrix4<f32>;

/// Vectors shorter than this are treated as having no direction.
pub const NORMALIZE_EPSILON: f32 = 1.0e-6;

/// Normalize `v`, falling back to the zero vector for degenerate input.
///
/// Keeps NaN out of the field when a source direction or a cell-to-source
/// offset collapses to zero length.
#[inline]
pub fn safe_normalize(v: &Vec3) -> Vec3 {
    v.try_normalize(NORMALIZE_EPSILON).unwrap_or_else(Vec3::zeros)
}

/// Clamp to `[0, 1]`; NaN maps to 0.
#[inline]
pub fn saturate(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_normalize_zero_vector() {
        assert_eq!(safe_normalize(&Vec3::zeros()), Vec3::zeros());
        assert_eq!(safe_normalize(&Vec3::new(1.0e-9, 0.0, 0.0)), Vec3::zeros());
    }

    #[test]
    fn test_safe_normalize_unit_length() {
        let n = safe_normalize(&Vec3::new(3.0, 0.0, 4.0));
        assert!((n.norm() - 1.0).abs() < 1e-6);
        assert!((n.x - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_saturate() {
        assert_eq!(saturate(-2.0), 0.0);
        assert_eq!(saturate(0.25), 0.25);
        assert_eq!(saturate(7.0), 1.0);
        assert_eq!(saturate(f32::NAN), 0.0);
        assert_eq!(saturate(f32::INFINITY), 1.0);
    }
}
