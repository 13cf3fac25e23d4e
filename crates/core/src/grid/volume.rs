//! Packing the committed field for external samplers
//!
//! Hosts usually upload the field into a 3D RGBA float texture. The
//! [`VelocityVolume`] sink produces exactly that layout on the CPU side:
//! one `[f32; 4]` per cell in addressing order, `xyz` the velocity and `w`
//! the activity flag.

use crate::geometry::Density;
use crate::grid::voxel_grid::VoxelGrid;
use rayon::prelude::*;

/// Receives the grid after every committed tick.
pub trait WindFieldSink {
    fn publish(&mut self, grid: &VoxelGrid);
}

/// Flat RGBA volume mirroring the grid's cell array.
#[derive(Debug, Clone, Default)]
pub struct VelocityVolume {
    dimensions: Option<Density>,
    texels: Vec<[f32; 4]>,
    generation: u64,
    publish_count: u64,
}

impl VelocityVolume {
    pub fn new() -> Self {
        Self::default()
    }

    /// Volume dimensions, `None` before the first publish.
    pub fn dimensions(&self) -> Option<Density> {
        self.dimensions
    }

    pub fn texels(&self) -> &[[f32; 4]] {
        &self.texels
    }

    /// Grid generation of the last published field.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of times the volume has been written.
    pub fn publish_count(&self) -> u64 {
        self.publish_count
    }
}

impl WindFieldSink for VelocityVolume {
    fn publish(&mut self, grid: &VoxelGrid) {
        let density = grid.density();
        if self.dimensions != Some(density) || self.texels.len() != grid.count() {
            self.texels = vec![[0.0; 4]; grid.count()];
            self.dimensions = Some(density);
        }

        self.texels
            .par_iter_mut()
            .zip(grid.cells().par_iter())
            .for_each(|(texel, cell)| {
                let v = cell.velocity;
                *texel = [v.x, v.y, v.z, if cell.active { 1.0 } else { 0.0 }];
            });

        self.generation = grid.generation();
        self.publish_count += 1;
    }
}
