//! Grid configuration and validation
//!
//! The zone's defining parameters. Density is derived from extent and edge
//! length (`floor(extent / edge_length)` per axis) and everything is checked
//! before a build so that a bad configuration never produces an empty or
//! unbounded grid.

use crate::core_types::vec3::{Mat4, Vec3};
use crate::geometry::Density;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on cells per grid unless the caller raises it.
pub const DEFAULT_MAX_CELLS: usize = 1 << 24;

/// Defining parameters of a voxel wind grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Grid-local to world transform (affine)
    pub transform: Mat4,

    /// Cell edge length (world units before transform)
    pub edge_length: f32,

    /// Physical extent of the grid along each local axis
    pub extent: Vec3,

    /// Offset of the grid centre in local space
    pub offset: Vec3,

    /// Refuse to build grids with more cells than this
    pub max_cells: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            transform: Mat4::identity(),
            edge_length: 1.0,
            extent: Vec3::new(10.0, 10.0, 10.0),
            offset: Vec3::zeros(),
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

impl GridConfig {
    /// Config with an identity transform and no offset.
    #[must_use]
    pub fn new(edge_length: f32, extent: Vec3) -> Self {
        Self {
            edge_length,
            extent,
            ..Default::default()
        }
    }

    /// Set the grid-local to world transform.
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Set the grid-space offset added to every lattice point.
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Cells per axis implied by extent and edge length.
    ///
    /// Only meaningful after [`GridConfig::validate`] succeeded.
    pub fn density(&self) -> Density {
        Density::new(
            axis_cells(self.extent.x, self.edge_length),
            axis_cells(self.extent.y, self.edge_length),
            axis_cells(self.extent.z, self.edge_length),
        )
    }

    /// Check every parameter and return the derived density and inverse transform.
    ///
    /// # Errors
    ///
    /// Returns a [`GridConfigError`] describing the first invalid parameter.
    pub fn validate(&self) -> Result<ValidatedGrid, GridConfigError> {
        if !self.edge_length.is_finite() || self.edge_length <= 0.0 {
            return Err(GridConfigError::InvalidEdgeLength(self.edge_length));
        }

        for (axis, value) in AXES.iter().zip(self.extent.iter()) {
            if !value.is_finite() || *value <= 0.0 {
                return Err(GridConfigError::InvalidExtent {
                    axis: *axis,
                    value: *value,
                });
            }
        }

        for (axis, value) in AXES.iter().zip(self.offset.iter()) {
            if !value.is_finite() {
                return Err(GridConfigError::InvalidOffset {
                    axis: *axis,
                    value: *value,
                });
            }
        }

        if self.transform.iter().any(|v| !v.is_finite()) {
            return Err(GridConfigError::SingularTransform);
        }
        let bottom = self.transform.row(3);
        if bottom[0] != 0.0 || bottom[1] != 0.0 || bottom[2] != 0.0 || bottom[3] != 1.0 {
            return Err(GridConfigError::NonAffineTransform);
        }
        let inverse_transform = self
            .transform
            .try_inverse()
            .ok_or(GridConfigError::SingularTransform)?;

        let density = self.density();
        let axis_counts = [density.x, density.y, density.z];
        for ((axis, count), extent) in AXES.iter().zip(axis_counts).zip(self.extent.iter()) {
            if count == 0 {
                return Err(GridConfigError::EmptyAxis {
                    axis: *axis,
                    extent: *extent,
                    edge_length: self.edge_length,
                });
            }
        }

        let count = density
            .checked_count()
            .ok_or(GridConfigError::TooManyCells {
                limit: self.max_cells,
            })?;
        if count > self.max_cells {
            return Err(GridConfigError::TooManyCells {
                limit: self.max_cells,
            });
        }

        Ok(ValidatedGrid {
            density,
            count,
            inverse_transform,
        })
    }
}

/// Values derived while validating a [`GridConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedGrid {
    pub density: Density,
    pub count: usize,
    pub inverse_transform: Mat4,
}

const AXES: [char; 3] = ['x', 'y', 'z'];

/// `floor(extent / edge)` clamped into `usize`; NaN and negatives become 0.
fn axis_cells(extent: f32, edge_length: f32) -> usize {
    let cells = (extent / edge_length).floor();
    if cells.is_nan() || cells < 1.0 {
        0
    } else {
        // Saturating cast; oversized grids are rejected by the cell limit
        cells as usize
    }
}

/// Reasons a grid configuration is refused.
#[derive(Debug, Clone, PartialEq)]
pub enum GridConfigError {
    /// Edge length must be finite and positive
    InvalidEdgeLength(f32),
    /// Extent components must be finite and positive
    InvalidExtent { axis: char, value: f32 },
    /// Offset components must be finite
    InvalidOffset { axis: char, value: f32 },
    /// Transform has non-finite entries or cannot be inverted
    SingularTransform,
    /// Bottom row of the transform is not `(0, 0, 0, 1)`
    NonAffineTransform,
    /// Extent is smaller than one cell along an axis
    EmptyAxis {
        axis: char,
        extent: f32,
        edge_length: f32,
    },
    /// Cell count overflows or exceeds the configured limit
    TooManyCells { limit: usize },
    /// Stored grid layout disagrees with its configuration
    LayoutMismatch {
        density: Density,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for GridConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEdgeLength(value) => {
                write!(f, "edge length must be finite and positive, got {value}")
            }
            Self::InvalidExtent { axis, value } => {
                write!(f, "extent.{axis} must be finite and positive, got {value}")
            }
            Self::InvalidOffset { axis, value } => {
                write!(f, "offset.{axis} must be finite, got {value}")
            }
            Self::SingularTransform => {
                write!(f, "grid transform must be finite and invertible")
            }
            Self::NonAffineTransform => {
                write!(f, "grid transform must be affine (bottom row 0, 0, 0, 1)")
            }
            Self::EmptyAxis {
                axis,
                extent,
                edge_length,
            } => write!(
                f,
                "extent.{axis} = {extent} holds no cell of edge length {edge_length}"
            ),
            Self::TooManyCells { limit } => {
                write!(f, "grid would exceed the limit of {limit} cells")
            }
            Self::LayoutMismatch {
                density,
                expected,
                found,
            } => write!(
                f,
                "grid of {}x{}x{} cells needs {expected} cells, found {found}",
                density.x, density.y, density.z
            ),
        }
    }
}

impl std::error::Error for GridConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let validated = GridConfig::default().validate().unwrap();
        assert_eq!(validated.density, Density::new(10, 10, 10));
        assert_eq!(validated.count, 1000);
    }

    #[test]
    fn test_density_floors_partial_cells() {
        let config = GridConfig::new(1.5, Vec3::new(4.0, 3.0, 1.6));
        assert_eq!(config.density(), Density::new(2, 2, 1));
    }

    #[test]
    fn test_rejects_non_positive_edge_length() {
        for edge in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = GridConfig::new(edge, Vec3::new(2.0, 2.0, 2.0));
            assert!(matches!(
                config.validate(),
                Err(GridConfigError::InvalidEdgeLength(_))
            ));
        }
    }

    #[test]
    fn test_rejects_non_positive_extent() {
        let config = GridConfig::new(1.0, Vec3::new(2.0, 0.0, 2.0));
        assert!(matches!(
            config.validate(),
            Err(GridConfigError::InvalidExtent { axis: 'y', .. })
        ));

        let config = GridConfig::new(1.0, Vec3::new(2.0, 2.0, -3.0));
        assert!(matches!(
            config.validate(),
            Err(GridConfigError::InvalidExtent { axis: 'z', .. })
        ));
    }

    #[test]
    fn test_rejects_extent_smaller_than_cell() {
        let config = GridConfig::new(2.0, Vec3::new(4.0, 1.0, 4.0));
        assert!(matches!(
            config.validate(),
            Err(GridConfigError::EmptyAxis { axis: 'y', .. })
        ));
    }

    #[test]
    fn test_rejects_singular_transform() {
        let config = GridConfig::default().with_transform(Mat4::zeros());
        assert_eq!(config.validate(), Err(GridConfigError::SingularTransform));
    }

    #[test]
    fn test_rejects_projective_transform() {
        let mut transform = Mat4::identity();
        transform[(3, 0)] = 0.5;
        let config = GridConfig::default().with_transform(transform);
        assert_eq!(config.validate(), Err(GridConfigError::NonAffineTransform));

        let mut scaled_w = Mat4::identity();
        scaled_w[(3, 3)] = 2.0;
        let config = GridConfig::default().with_transform(scaled_w);
        assert_eq!(config.validate(), Err(GridConfigError::NonAffineTransform));
    }

    #[test]
    fn test_rejects_too_many_cells() {
        let config = GridConfig {
            max_cells: 100,
            ..GridConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(GridConfigError::TooManyCells { limit: 100 })
        );
    }

    #[test]
    fn test_error_messages_name_parameter() {
        let err = GridConfig::new(1.0, Vec3::new(2.0, 0.0, 2.0))
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "extent.y must be finite and positive, got 0");
    }
}
