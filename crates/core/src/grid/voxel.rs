//! A single sample point of the wind field

use crate::core_types::vec3::Vec3;
use crate::geometry::GridCoord;
use serde::{Deserialize, Serialize};

/// One cell of the voxel grid.
///
/// Cells are value types: the updater never mutates the array it reads,
/// it writes a fresh `Voxel` per index into a new buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Voxel {
    /// World-space lattice point: `coord * edge_length - extent / 2 + offset`
    /// moved through the grid transform
    pub position: Vec3,
    /// Integer coordinate inside the grid
    pub coord: GridCoord,
    /// Edge length the cell was built with
    pub edge_length: f32,
    /// Wind velocity
    pub velocity: Vec3,
    /// False when an obstacle fully occluded the cell on the last update
    pub active: bool,
}

impl Voxel {
    #[must_use]
    pub fn new(position: Vec3, coord: GridCoord, edge_length: f32, velocity: Vec3) -> Self {
        Self {
            position,
            coord,
            edge_length,
            velocity,
            active: true,
        }
    }

    /// Copy of this cell carrying a new velocity and activity flag.
    #[inline]
    pub fn with_velocity(&self, velocity: Vec3, active: bool) -> Self {
        Self {
            velocity,
            active,
            ..*self
        }
    }

    /// Magnitude of the cell's velocity.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.norm()
    }
}

impl Default for Voxel {
    fn default() -> Self {
        Self::new(Vec3::zeros(), GridCoord::default(), 0.0, Vec3::zeros())
    }
}
