// main.rs
//
// Runs the pipeline on a box-shaped room with a toy ballistic particle solver
// and writes the resulting liquid surface to ./out.

use fluidsurf::float_types::Real;
use fluidsurf::grid::{Grid3, GridFrame};
use fluidsurf::simulation::{FluidPipeline, FluidSolver, GridGeometry, Particle, PipelineConfig, RenderBuffer};
use fluidsurf::SurfaceMesh;
use nalgebra::{Point3, Vector3};
use std::error::Error;
use std::fs;
use std::time::Duration;

/// Particles fall under gravity and bounce off solid cells. No pressure, no
/// incompressibility: just enough motion to exercise the pipeline.
struct BallisticSolver {
    grid: GridGeometry,
    solid: Grid3<bool>,
    velocities: Grid3<Vector3<Real>>,
    particles: Vec<Particle>,
    gravity: Vector3<Real>,
    step: Real,
    time: Real,
}

impl BallisticSolver {
    fn new(grid: GridGeometry, gravity: Vector3<Real>) -> Self {
        Self {
            grid,
            solid: Grid3::new(grid.size, false),
            velocities: Grid3::new(grid.size, Vector3::zeros()),
            particles: Vec::new(),
            gravity,
            step: 1.0 / 240.0,
            time: 0.0,
        }
    }

    fn frame(&self) -> GridFrame {
        GridFrame::new(self.grid.offset, self.grid.cell_size)
    }

    fn is_blocked(&self, pos: &Point3<Real>) -> bool {
        self.solid
            .get_signed(self.frame().cell_of(pos))
            .is_none_or(|&solid| solid)
    }

    fn advance_by(&mut self, dt: Real) {
        let mut sums = Grid3::new(self.grid.size, (Vector3::zeros(), 0usize));
        let frame = self.frame();
        for i in 0..self.particles.len() {
            let mut p = self.particles[i];
            p.velocity += self.gravity * dt;
            let mut next = p.position + p.velocity * dt;
            // Bounce axis by axis so particles slide along walls.
            for axis in 0..3 {
                let mut probe = p.position;
                probe[axis] = next[axis];
                if self.is_blocked(&probe) {
                    next[axis] = p.position[axis];
                    p.velocity[axis] *= -0.4;
                }
            }
            p.position = next;
            self.particles[i] = p;

            let cell = frame.cell_of(&p.position);
            if sums.contains_signed(cell) {
                let entry = &mut sums[cell.map(|c| c as usize)];
                entry.0 += p.velocity;
                entry.1 += 1;
            }
        }
        self.velocities = Grid3::from_fn(self.grid.size, |cell| {
            let (sum, count) = sums[cell];
            if count > 0 { sum / count as Real } else { Vector3::zeros() }
        });
        self.time += dt;
    }
}

impl FluidSolver for BallisticSolver {
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
    }

    fn set_solid(&mut self, cell: Vector3<usize>) {
        if let Some(solid) = self.solid.get_mut(cell) {
            *solid = true;
        }
    }

    fn clear_sources_and_drains(&mut self) {}

    fn seed(&mut self, inside: &dyn Fn(&Point3<Real>) -> bool) {
        // 2x2x2 particles per fluid cell
        let frame = self.frame();
        let half = 0.5 * self.grid.cell_size;
        for (cell, &solid) in self.solid.iter() {
            if solid {
                continue;
            }
            let corner = frame.vertex_position(cell);
            for k in 0..8 {
                let jitter = Vector3::new(k & 1, (k >> 1) & 1, (k >> 2) & 1).map(|c| (c as Real + 0.5) * half);
                let position = corner + jitter;
                if inside(&position) {
                    self.particles.push(Particle::new(position, Vector3::zeros()));
                }
            }
        }
    }

    fn update(&mut self, dt: Real) {
        let steps = (dt / self.step).ceil().max(1.0) as usize;
        for _ in 0..steps {
            self.advance_by(dt / steps as Real);
        }
    }

    fn time_step(&mut self) {
        self.advance_by(self.step);
    }

    fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn cell_velocity(&self, cell: Vector3<usize>) -> Vector3<Real> {
        self.velocities.get(cell).copied().unwrap_or_else(Vector3::zeros)
    }

    fn total_time(&self) -> Real {
        self.time
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    fs::create_dir_all("out")?;

    // Room walls sit a quarter cell inside the solver domain so that no wall
    // lies on a cell boundary.
    let grid = GridGeometry::enclosing(Point3::origin(), Point3::new(16.0, 10.0, 10.0), 1.0);
    let room = SurfaceMesh::cuboid(Point3::new(0.25, 0.25, 0.25), Point3::new(15.75, 9.75, 9.75));
    let solver = BallisticSolver::new(grid, Vector3::new(-9.81, 0.0, 0.0));

    let mut pipeline = FluidPipeline::spawn(solver, room, PipelineConfig::default())?;
    let buffer = RenderBuffer::shared();
    pipeline.bind_mesh(buffer.clone());

    let mut generation = pipeline.mesh_generation();
    for _ in 0..10 {
        match pipeline.wait_for_mesh(generation, Duration::from_secs(10)) {
            Some(g) => generation = g,
            None => return Err("mesher produced no mesh within 10 s".into()),
        }
    }
    pipeline.set_paused(true);

    let mesh = pipeline.mesh();
    println!(
        "t = {:.3}s: {} particles, mesh generation {generation} with {} vertices and {} triangles",
        pipeline.sim_time(),
        pipeline.particles().len(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    let analysis = mesh.analyze_edges();
    println!("surface edges: {analysis:?}");
    if let Ok(buffer) = buffer.lock() {
        println!("render buffer holds {} vertices after {} updates", buffer.vertex_count(), buffer.updates);
    }

    pipeline.save_mesh_obj("out/fluid_mesh.obj")?;
    pipeline.save_points("out/points.txt")?;
    #[cfg(feature = "stl-io")]
    {
        fs::write("out/fluid_mesh.stl", mesh.to_stl_binary("fluid")?)?;
        fs::write("out/room.stl", pipeline.room_mesh().to_stl_ascii("room"))?;
    }

    pipeline.shutdown();
    Ok(())
}
