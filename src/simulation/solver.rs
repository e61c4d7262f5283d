//! The boundary between the pipeline and an external particle/grid solver.

use crate::float_types::Real;
use nalgebra::{Point3, Vector3};

/// One simulated particle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Particle {
    pub position: Point3<Real>,
    pub velocity: Vector3<Real>,
}

impl Particle {
    pub const fn new(position: Point3<Real>, velocity: Vector3<Real>) -> Self {
        Self { position, velocity }
    }
}

/// A grid based liquid solver driven by the simulation thread.
///
/// The pipeline never looks inside the solver: it resets cells to air or
/// solid, seeds particles, steps time and reads particles and per-cell
/// velocities back out.
pub trait FluidSolver: Send {
    /// Cells per axis of the solver grid.
    fn grid_size(&self) -> Vector3<usize>;

    /// Edge length of one solver cell.
    fn cell_size(&self) -> Real;

    /// World position of the solver grid's `(0, 0, 0)` corner.
    fn grid_offset(&self) -> Point3<Real>;

    /// Remove every particle and turn every cell into air.
    fn clear(&mut self);

    /// Mark one cell as solid.
    fn set_solid(&mut self, cell: Vector3<usize>);

    /// Drop every source and drain region.
    fn clear_sources_and_drains(&mut self);

    /// Seed particles in the cells whose positions satisfy `inside`.
    fn seed(&mut self, inside: &dyn Fn(&Point3<Real>) -> bool);

    /// Advance the simulation by one frame of length `dt`, in as many internal
    /// time steps as the solver needs.
    fn update(&mut self, dt: Real);

    /// Take exactly one internal time step.
    fn time_step(&mut self);

    fn particles(&self) -> &[Particle];

    /// Velocity stored on the positive faces of `cell`.
    fn cell_velocity(&self, cell: Vector3<usize>) -> Vector3<Real>;

    /// Simulated time since the solver was created.
    fn total_time(&self) -> Real;
}
