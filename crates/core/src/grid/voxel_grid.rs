//! The voxelized region and its cells

use crate::core_types::vec3::{Mat4, Vec3};
use crate::geometry::{to_linear_index, Density, GridCoord};
use crate::grid::config::{GridConfig, GridConfigError};
use crate::grid::sampling::trilinear;
use crate::grid::voxel::Voxel;
use nalgebra::Point3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Voxel grid: a flat, linearly addressed array of cells plus the
/// parameters it was built from.
///
/// `cells.len() == density.count()` always holds. The generation is bumped
/// on every rebuild so that updates computed against an older layout can be
/// recognised and dropped.
///
/// Deserialization re-validates the configuration and rejects a cell array
/// that does not match it; the inverse transform is always recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "StoredGrid")]
pub struct VoxelGrid {
    pub(crate) config: GridConfig,
    pub(crate) inverse_transform: Mat4,
    pub(crate) density: Density,
    pub(crate) cells: Vec<Voxel>,
    pub(crate) generation: u64,
}

/// Serialized form of [`VoxelGrid`], checked before it becomes one.
#[derive(Deserialize)]
struct StoredGrid {
    config: GridConfig,
    density: Density,
    cells: Vec<Voxel>,
    generation: u64,
}

impl TryFrom<StoredGrid> for VoxelGrid {
    type Error = GridConfigError;

    fn try_from(stored: StoredGrid) -> Result<Self, Self::Error> {
        let validated = stored.config.validate()?;
        if stored.density != validated.density || stored.cells.len() != validated.count {
            return Err(GridConfigError::LayoutMismatch {
                density: validated.density,
                expected: validated.count,
                found: stored.cells.len(),
            });
        }

        Ok(Self {
            config: stored.config,
            inverse_transform: validated.inverse_transform,
            density: validated.density,
            cells: stored.cells,
            generation: stored.generation,
        })
    }
}

/// Summary of the field, computed with a parallel reduction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldStats {
    pub cell_count: usize,
    pub active_cells: usize,
    pub max_speed: f32,
    pub mean_speed: f32,
}

impl VoxelGrid {
    /// Build a grid from scratch. All velocities start at zero.
    ///
    /// # Errors
    ///
    /// Returns the [`GridConfigError`] found while validating `config`.
    pub fn build(config: GridConfig) -> Result<Self, GridConfigError> {
        let validated = config.validate()?;
        let mut grid = Self {
            config,
            inverse_transform: validated.inverse_transform,
            density: validated.density,
            cells: Vec::new(),
            generation: 0,
        };
        grid.layout_cells(validated.count);
        Ok(grid)
    }

    /// Rebuild cell positions for a new configuration.
    ///
    /// The cell array is reused when the count is unchanged, which keeps
    /// velocities; otherwise it is reallocated and velocities start at zero.
    /// On error the grid is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the [`GridConfigError`] found while validating `config`.
    pub fn rebuild(&mut self, config: GridConfig) -> Result<(), GridConfigError> {
        let validated = config.validate()?;
        self.config = config;
        self.inverse_transform = validated.inverse_transform;
        self.density = validated.density;
        self.generation += 1;
        self.layout_cells(validated.count);
        Ok(())
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn cells(&self) -> &[Voxel] {
        &self.cells
    }

    /// Mutable access to the cells. The slice cannot change the cell count.
    pub fn cells_mut(&mut self) -> &mut [Voxel] {
        &mut self.cells
    }

    pub fn density(&self) -> Density {
        self.density
    }

    pub fn count(&self) -> usize {
        self.cells.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn transform(&self) -> &Mat4 {
        &self.config.transform
    }

    /// World to grid-local transform.
    pub fn inverse_transform(&self) -> &Mat4 {
        &self.inverse_transform
    }

    pub fn edge_length(&self) -> f32 {
        self.config.edge_length
    }

    pub fn extent(&self) -> Vec3 {
        self.config.extent
    }

    pub fn offset(&self) -> Vec3 {
        self.config.offset
    }

    /// Cell at `coord`, `None` outside the grid.
    pub fn cell(&self, coord: GridCoord) -> Option<&Voxel> {
        if self.density.contains(coord) {
            Some(&self.cells[to_linear_index(coord, self.density)])
        } else {
            None
        }
    }

    /// Overwrite the velocity at `coord`. Returns false outside the grid.
    pub fn set_velocity(&mut self, coord: GridCoord, velocity: Vec3) -> bool {
        if !self.density.contains(coord) {
            return false;
        }
        let index = to_linear_index(coord, self.density);
        self.cells[index].velocity = velocity;
        true
    }

    /// Fractional grid coordinate of a world position.
    ///
    /// Exact inverse of the builder's placement: a cell's lattice point maps
    /// to its integer coordinate.
    pub fn world_to_grid(&self, world: &Vec3) -> Vec3 {
        let local = self
            .inverse_transform
            .transform_point(&Point3::from(*world))
            .coords;
        (local - self.config.offset + self.config.extent * 0.5) / self.config.edge_length
    }

    /// Trilinearly interpolated velocity at a world position.
    pub fn sample(&self, world: &Vec3) -> Vec3 {
        trilinear(&self.cells, self.density, &self.world_to_grid(world))
    }

    /// Cell count, active cells and speed statistics.
    pub fn stats(&self) -> FieldStats {
        let (active_cells, max_speed, speed_sum) = self
            .cells
            .par_iter()
            .map(|cell| {
                let speed = cell.speed();
                (usize::from(cell.active), speed, f64::from(speed))
            })
            .reduce(
                || (0, 0.0_f32, 0.0_f64),
                |a, b| (a.0 + b.0, a.1.max(b.1), a.2 + b.2),
            );

        let cell_count = self.cells.len();
        let mean_speed = if cell_count == 0 {
            0.0
        } else {
            (speed_sum / cell_count as f64) as f32
        };

        FieldStats {
            cell_count,
            active_cells,
            max_speed,
            mean_speed,
        }
    }

    /// Swap in a freshly computed cell array of the same length.
    pub(crate) fn replace_cells(&mut self, cells: Vec<Voxel>) {
        debug_assert_eq!(cells.len(), self.cells.len());
        self.cells = cells;
    }
}
