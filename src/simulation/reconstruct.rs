//! Surface reconstruction run by the mesher thread.

use super::config::GridGeometry;
use crate::float_types::Real;
use crate::mesh::SurfaceMesh;
use crate::mesher::{Mesher, MesherSettings};
use nalgebra::Point3;

/// Turns a particle position snapshot into a finished mesh.
pub trait SurfaceReconstructor: Send {
    fn reconstruct(&mut self, positions: &[Point3<Real>]) -> SurfaceMesh;
}

/// The default reconstructor: [`Mesher::generate_mesh`] followed by
/// [`SurfaceMesh::generate_normals`].
#[derive(Debug, Clone)]
pub struct ParticleMesher {
    mesher: Mesher,
    particle_radius: Real,
}

impl ParticleMesher {
    /// A mesher over `grid`, refined as `settings` asks.
    pub fn new(settings: &MesherSettings, grid: &GridGeometry) -> Self {
        Self {
            mesher: settings.mesher_for_grid(grid.offset, grid.cell_size, grid.size),
            particle_radius: settings.particle_radius,
        }
    }

    pub const fn mesher(&self) -> &Mesher {
        &self.mesher
    }
}

impl SurfaceReconstructor for ParticleMesher {
    fn reconstruct(&mut self, positions: &[Point3<Real>]) -> SurfaceMesh {
        let mut mesh = self.mesher.generate_mesh(positions, self.particle_radius);
        mesh.generate_normals();
        mesh
    }
}

impl<F> SurfaceReconstructor for F
where
    F: FnMut(&[Point3<Real>]) -> SurfaceMesh + Send,
{
    fn reconstruct(&mut self, positions: &[Point3<Real>]) -> SurfaceMesh {
        self(positions)
    }
}
