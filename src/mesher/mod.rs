//! Particle surface reconstruction
//!
//! [`Mesher`] turns a particle cloud into a closed triangle mesh in two
//! phases: a kernel-weighted implicit field is sampled at every grid vertex
//! (see [`sampling`]), then [`marching_cubes`] extracts its zero level set.

pub mod marching_cubes;
pub mod sampling;
pub mod tables;

pub use marching_cubes::marching_cubes;
pub use sampling::{SampleParams, SamplingOps};

use crate::float_types::Real;
use crate::grid::{Grid3, GridFrame};
use crate::mesh::SurfaceMesh;
use crate::spatial_hash::SpatialHash;
use nalgebra::{Point3, Vector3};

#[cfg(not(feature = "parallel"))]
use sampling::SerialSamplingOps;

#[cfg(feature = "parallel")]
use sampling::ParallelSamplingOps;

/// Tunables for reconstructing a fluid surface on top of a simulation grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MesherSettings {
    /// Kernel support radius in world units
    pub particle_extent: Real,
    /// Hash cells searched around each field vertex
    pub cell_radius: usize,
    /// Radius assigned to every particle
    pub particle_radius: Real,
    /// Mesher cells per simulation cell along each axis
    pub refinement: usize,
}

impl Default for MesherSettings {
    fn default() -> Self {
        Self {
            particle_extent: 2.0,
            cell_radius: 3,
            particle_radius: 0.5,
            refinement: 2,
        }
    }
}

impl MesherSettings {
    /// Build a mesher covering a simulation grid, `refinement` times finer.
    pub fn mesher_for_grid(
        &self,
        grid_offset: Point3<Real>,
        cell_size: Real,
        grid_size: Vector3<usize>,
    ) -> Mesher {
        let refinement = self.refinement.max(1);
        let mut mesher = Mesher::new(self.particle_extent, self.cell_radius);
        mesher.frame = GridFrame::new(grid_offset, cell_size / refinement as Real);
        mesher.resize(grid_size * refinement);
        mesher
    }
}

/// Reusable reconstruction state: the sampled field and the particle hash are
/// kept between calls so their allocations survive from frame to frame.
#[derive(Debug, Clone)]
pub struct Mesher {
    /// Kernel support radius in world units
    pub particle_extent: Real,
    /// Hash cells searched around each field vertex
    pub cell_radius: usize,
    /// Placement of the mesher grid; field vertex `v` sits at
    /// `frame.vertex_position(v)`
    pub frame: GridFrame,
    field: Grid3<Real>,
    hash: SpatialHash<usize>,
}

impl Default for Mesher {
    fn default() -> Self {
        let settings = MesherSettings::default();
        Self::new(settings.particle_extent, settings.cell_radius)
    }
}

impl Mesher {
    pub fn new(particle_extent: Real, cell_radius: usize) -> Self {
        Self {
            particle_extent,
            cell_radius,
            frame: GridFrame::new(Point3::origin(), 1.0),
            field: Grid3::default(),
            hash: SpatialHash::default(),
        }
    }

    /// Allocate for a grid of `size` cells: the field gets `size + 1` vertices
    /// per axis and the hash one bucket per cell.
    pub fn resize(&mut self, size: Vector3<usize>) {
        self.field = Grid3::new(size.add_scalar(1), 0.0);
        self.hash.resize(size);
        log::debug!("mesher resized to {} x {} x {} cells", size.x, size.y, size.z);
    }

    /// Number of cells (one less than field vertices) per axis.
    pub fn grid_size(&self) -> Vector3<usize> {
        self.hash.size()
    }

    /// The field sampled by the last [`Mesher::generate_mesh`] call.
    pub const fn field(&self) -> &Grid3<Real> {
        &self.field
    }

    /// Reconstruct the surface of `particles`, each with radius `r`.
    ///
    /// Particles outside the mesher grid are ignored. With no particle in
    /// range every field value is positive and the mesh is empty.
    pub fn generate_mesh(&mut self, particles: &[Point3<Real>], r: Real) -> SurfaceMesh {
        self.hash.clear();
        let mut dropped = 0usize;
        for (i, p) in particles.iter().enumerate() {
            let cell = self.frame.cell_of(p);
            let inserted = cell.iter().all(|&c| c >= 0)
                && self.hash.add_object_at(cell.map(|c| c as usize), i);
            if !inserted {
                dropped += 1;
            }
        }
        if dropped > 0 {
            log::trace!("{dropped} of {} particles outside the mesher grid", particles.len());
        }

        let params = SampleParams {
            frame: self.frame,
            particle_extent: self.particle_extent,
            cell_radius: self.cell_radius,
            particle_radius: r,
        };

        #[cfg(not(feature = "parallel"))]
        let ops = SerialSamplingOps::new();
        #[cfg(feature = "parallel")]
        let ops = ParallelSamplingOps::new();

        ops.sample(&mut self.field, &self.hash, particles, &params);
        marching_cubes(&self.field, &self.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_allocates_vertex_centered_field() {
        let mut mesher = Mesher::default();
        mesher.resize(Vector3::new(4, 5, 6));
        assert_eq!(mesher.field().size(), Vector3::new(5, 6, 7));
        assert_eq!(mesher.grid_size(), Vector3::new(4, 5, 6));
    }

    #[test]
    fn no_particles_give_empty_mesh_and_default_field() {
        let mut mesher = Mesher::default();
        mesher.resize(Vector3::new(3, 3, 3));
        let mesh = mesher.generate_mesh(&[], 0.5);
        assert!(mesh.is_empty());
        assert!(mesh.positions.is_empty());
        assert!(mesher.field().as_slice().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn settings_refine_the_simulation_grid() {
        let settings = MesherSettings::default();
        let mesher = settings.mesher_for_grid(Point3::new(1.0, 2.0, 3.0), 1.0, Vector3::new(4, 4, 2));
        assert_eq!(mesher.frame.cell_size, 0.5);
        assert_eq!(mesher.frame.offset, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(mesher.grid_size(), Vector3::new(8, 8, 4));
    }

    #[test]
    fn single_particle_gives_closed_blob() {
        let mut mesher = Mesher::new(2.0, 3);
        mesher.frame = GridFrame::new(Point3::origin(), 0.5);
        mesher.resize(Vector3::new(8, 8, 8));
        let mut mesh = mesher.generate_mesh(&[Point3::new(2.03, 1.98, 2.01)], 0.5);
        assert!(!mesh.is_empty());
        let analysis = mesh.analyze_edges();
        assert!(analysis.is_closed(), "{analysis:?}");
        assert_eq!(analysis.duplicate_positions, 0);
        mesh.generate_normals();
        assert!(mesh.is_structurally_complete());
    }

    #[test]
    fn particles_outside_grid_are_ignored() {
        let mut mesher = Mesher::new(2.0, 3);
        mesher.resize(Vector3::new(4, 4, 4));
        let mesh = mesher.generate_mesh(&[Point3::new(-3.0, 1.0, 1.0), Point3::new(9.0, 1.0, 1.0)], 0.5);
        assert!(mesh.is_empty());
    }
}
