//! Test support library
//! Provides helper functions, mesh builders and mock solvers for tests.
#![allow(dead_code)]

use fluidsurf::{
    float_types::Real,
    grid::{Grid3, GridFrame},
    mesh::SurfaceMesh,
    simulation::{FluidSolver, GridGeometry, Particle},
};
use nalgebra::{Point3, Vector3};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Field grid of `n` samples per axis holding the signed distance to a sphere.
pub fn sphere_field(n: usize, center: Point3<Real>, radius: Real) -> Grid3<Real> {
    Grid3::from_fn(Vector3::new(n, n, n), |v| {
        (v.map(|c| c as Real) - center.coords).norm() - radius
    })
}

/// A solver grid spanning `[0, extent]` with one padding cell on every side.
pub fn padded_grid(extent: Vector3<Real>, cell_size: Real) -> GridGeometry {
    GridGeometry::enclosing(Point3::origin(), Point3::from(extent), cell_size)
}

/// A closed box room whose walls sit a quarter cell inside `grid`'s padding,
/// so no wall lies on a cell boundary.
pub fn room_for(grid: &GridGeometry) -> SurfaceMesh {
    let inset = grid.cell_size * 1.25;
    SurfaceMesh::cuboid(
        grid.min_corner() + Vector3::repeat(inset),
        grid.max_corner() - Vector3::repeat(inset),
    )
}

/// Counters the tests read while a [`MockSolver`] runs on the pipeline thread.
#[derive(Debug, Default)]
pub struct SolverStats {
    pub updates: AtomicUsize,
    pub time_steps: AtomicUsize,
    pub resets: AtomicUsize,
    pub solid_cells: AtomicUsize,
}

impl SolverStats {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Deterministic stand-in for a liquid solver.
///
/// Seeding places one particle at every accepted cell center. With `grow`
/// set, every `update` appends one more particle, so the particle count
/// identifies the snapshot a reconstruction worked on. `cell_velocity`
/// returns `(x, y, z)` of the cell as a vector.
pub struct MockSolver {
    pub grid: GridGeometry,
    pub grow: bool,
    pub step_delay: Duration,
    pub stats: Arc<SolverStats>,
    solid: Grid3<bool>,
    particles: Vec<Particle>,
    time: Real,
}

impl MockSolver {
    pub const STEP: Real = 0.001;

    pub fn new(grid: GridGeometry) -> Self {
        Self {
            grid,
            grow: false,
            step_delay: Duration::from_millis(1),
            stats: Arc::new(SolverStats::default()),
            solid: Grid3::new(grid.size, false),
            particles: Vec::new(),
            time: 0.0,
        }
    }

    pub fn growing(mut self) -> Self {
        self.grow = true;
        self
    }
}

impl FluidSolver for MockSolver {
    fn grid_size(&self) -> Vector3<usize> {
        self.grid.size
    }

    fn cell_size(&self) -> Real {
        self.grid.cell_size
    }

    fn grid_offset(&self) -> Point3<Real> {
        self.grid.offset
    }

    fn clear(&mut self) {
        self.particles.clear();
        self.solid.fill(false);
        self.stats.solid_cells.store(0, Ordering::SeqCst);
        self.stats.resets.fetch_add(1, Ordering::SeqCst);
    }

    fn set_solid(&mut self, cell: Vector3<usize>) {
        self.solid[cell] = true;
        self.stats.solid_cells.fetch_add(1, Ordering::SeqCst);
    }

    fn clear_sources_and_drains(&mut self) {}

    fn seed(&mut self, inside: &dyn Fn(&Point3<Real>) -> bool) {
        let frame = GridFrame::new(self.grid.offset, self.grid.cell_size);
        for (cell, &solid) in self.solid.iter() {
            let center = frame.cell_center(cell);
            if !solid && inside(&center) {
                self.particles.push(Particle::new(center, Vector3::zeros()));
            }
        }
    }

    fn update(&mut self, dt: Real) {
        std::thread::sleep(self.step_delay);
        if self.grow {
            let position = self.particles.first().map_or_else(|| self.grid.center(), |p| p.position);
            self.particles.push(Particle::new(position, Vector3::zeros()));
        }
        self.time += dt;
        self.stats.updates.fetch_add(1, Ordering::SeqCst);
    }

    fn time_step(&mut self) {
        self.time += Self::STEP;
        self.stats.time_steps.fetch_add(1, Ordering::SeqCst);
    }

    fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn cell_velocity(&self, cell: Vector3<usize>) -> Vector3<Real> {
        cell.map(|c| c as Real)
    }

    fn total_time(&self) -> Real {
        self.time
    }
}
