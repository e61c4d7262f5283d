//! The two-thread simulate/reconstruct pipeline.

use super::config::{FluidSetup, GridGeometry, PipelineConfig};
use super::reconstruct::{ParticleMesher, SurfaceReconstructor};
use super::render::MeshSink;
use super::semaphore::Semaphore;
use super::signal::FrameSignal;
use super::solver::{FluidSolver, Particle};
use crate::errors::PipelineError;
use crate::float_types::Real;
use crate::grid::{Grid3, GridFrame};
use crate::io::IoError;
use crate::mesh::SurfaceMesh;
use crate::obstacle::Obstacle;
use nalgebra::{Point3, Vector3};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Latest state published by the simulation thread.
#[derive(Debug)]
struct Snapshot {
    particles: Vec<Particle>,
    /// Particles per solver cell
    occupation: Grid3<usize>,
    velocities: Grid3<Vector3<Real>>,
    /// The mesher already took these particles
    mesh_valid: bool,
    sim_time: Real,
}

struct MeshSlot {
    mesh: SurfaceMesh,
    sink: Option<Box<dyn MeshSink>>,
    autosave: Option<PathBuf>,
}

struct Shared {
    snapshot: Mutex<Snapshot>,
    mesh: Mutex<MeshSlot>,
    sema: Semaphore,
    snapshots: FrameSignal,
    meshes: FrameSignal,
    paused: AtomicBool,
    reset: AtomicBool,
    advance: AtomicBool,
    stop: AtomicBool,
}

impl Shared {
    fn snapshot(&self) -> MutexGuard<'_, Snapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mesh(&self) -> MutexGuard<'_, MeshSlot> {
        self.mesh.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs a [`FluidSolver`] on a simulation thread and rebuilds the liquid
/// surface from its particles on a mesher thread.
///
/// The simulation thread never waits for meshing. Every step it publishes a
/// particle snapshot under the snapshot lock, marks the mesh stale and signals
/// the mesher. The mesher always reconstructs the *latest* snapshot: bursts of
/// publishes collapse into one reconstruction, so intermediate frames are
/// dropped rather than queued. Finished meshes replace the shared mesh whole,
/// under the mesh lock, so readers only ever see complete meshes.
///
/// Dropping the pipeline stops and joins both threads.
pub struct FluidPipeline {
    shared: Arc<Shared>,
    grid: GridGeometry,
    room: Arc<Obstacle>,
    sim_thread: Option<JoinHandle<()>>,
    mesh_thread: Option<JoinHandle<()>>,
}

impl FluidPipeline {
    /// Start the pipeline with the default [`ParticleMesher`].
    ///
    /// `room` is voxelized against the solver grid; its surface cells become
    /// solid and its interior is where the basin is filled.
    pub fn spawn<S>(solver: S, room: SurfaceMesh, config: PipelineConfig) -> Result<Self, PipelineError>
    where
        S: FluidSolver + 'static,
    {
        let grid = GridGeometry::new(solver.grid_offset(), solver.cell_size(), solver.grid_size());
        let reconstructor = ParticleMesher::new(&config.mesher, &grid);
        Self::spawn_with_reconstructor(solver, room, reconstructor, config)
    }

    /// Start the pipeline with a custom surface reconstructor.
    pub fn spawn_with_reconstructor<S, R>(
        solver: S,
        room: SurfaceMesh,
        reconstructor: R,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError>
    where
        S: FluidSolver + 'static,
        R: SurfaceReconstructor + 'static,
    {
        let grid = GridGeometry::new(solver.grid_offset(), solver.cell_size(), solver.grid_size());
        if grid.size.iter().any(|&c| c == 0) {
            return Err(PipelineError::EmptyGrid(grid.size.into()));
        }
        let room = Arc::new(Obstacle::new(room, grid.cell_size, grid.offset, grid.size)?);

        let shared = Arc::new(Shared {
            snapshot: Mutex::new(Snapshot {
                particles: Vec::new(),
                occupation: Grid3::new(grid.size, 0),
                velocities: Grid3::new(grid.size, Vector3::zeros()),
                mesh_valid: true,
                sim_time: solver.total_time(),
            }),
            mesh: Mutex::new(MeshSlot {
                mesh: SurfaceMesh::new(),
                sink: None,
                autosave: config.autosave_obj.clone(),
            }),
            sema: Semaphore::new(),
            snapshots: FrameSignal::new(),
            meshes: FrameSignal::new(),
            paused: AtomicBool::new(config.start_paused),
            reset: AtomicBool::new(true),
            advance: AtomicBool::new(false),
            stop: AtomicBool::new(false),
        });

        let worker = SimWorker {
            solver,
            room: Arc::clone(&room),
            shared: Arc::clone(&shared),
            grid,
            dt: config.dt,
            setup: config.setup,
            idle_wait: config.idle_wait,
        };
        let sim_thread = thread::Builder::new()
            .name("fluid-sim".into())
            .spawn(move || worker.run())
            .map_err(|source| PipelineError::Spawn {
                name: "simulation",
                source,
            })?;

        let mesher_shared = Arc::clone(&shared);
        let mesh_thread = thread::Builder::new()
            .name("fluid-mesher".into())
            .spawn(move || run_mesher(mesher_shared, reconstructor));
        let mesh_thread = match mesh_thread {
            Ok(handle) => handle,
            Err(source) => {
                shared.stop.store(true, Ordering::Release);
                sim_thread.thread().unpark();
                if sim_thread.join().is_err() {
                    log::error!("simulation thread panicked");
                }
                return Err(PipelineError::Spawn {
                    name: "mesher",
                    source,
                });
            },
        };

        log::info!(
            "pipeline started: grid {:?} cells of {} at {:?}",
            grid.size,
            grid.cell_size,
            grid.offset
        );
        Ok(Self {
            shared,
            grid,
            room,
            sim_thread: Some(sim_thread),
            mesh_thread: Some(mesh_thread),
        })
    }

    fn wake_simulation(&self) {
        if let Some(handle) = &self.sim_thread {
            handle.thread().unpark();
        }
    }

    /// Pause a running simulation or resume a paused one. Returns whether the
    /// simulation is now paused.
    pub fn toggle_pause(&self) -> bool {
        let paused = !self.shared.paused.fetch_xor(true, Ordering::AcqRel);
        log::info!("{} fluid simulation", if paused { "pausing" } else { "resuming" });
        self.wake_simulation();
        paused
    }

    pub fn set_paused(&self, paused: bool) {
        self.shared.paused.store(paused, Ordering::Release);
        self.wake_simulation();
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Acquire)
    }

    /// Re-run the initial setup (solid cells and basin fill) on the next
    /// iteration of the simulation thread.
    pub fn reset(&self) {
        log::info!("resetting fluid simulation");
        self.shared.reset.store(true, Ordering::Release);
        self.wake_simulation();
    }

    /// Take one solver time step while paused.
    pub fn advance(&self) {
        log::info!("advancing fluid simulation one step");
        self.shared.advance.store(true, Ordering::Release);
        self.wake_simulation();
    }

    /// Receive every future mesh in `sink`, replacing any previously bound sink.
    pub fn bind_mesh<M: MeshSink + 'static>(&self, sink: M) {
        self.shared.mesh().sink = Some(Box::new(sink));
        log::info!("render mesh bound");
    }

    /// Stop pushing meshes to the bound sink and hand it back.
    pub fn unbind_mesh(&self) -> Option<Box<dyn MeshSink>> {
        let sink = self.shared.mesh().sink.take();
        if sink.is_some() {
            log::info!("render mesh unbound");
        }
        sink
    }

    /// Copy of the latest particle snapshot.
    pub fn particles(&self) -> Vec<Particle> {
        self.shared.snapshot().particles.clone()
    }

    /// Particles per solver cell in the latest snapshot.
    pub fn grid_occupation(&self) -> Grid3<usize> {
        self.shared.snapshot().occupation.clone()
    }

    /// Positive-face velocities of every solver cell in the latest snapshot.
    pub fn grid_velocities(&self) -> Grid3<Vector3<Real>> {
        self.shared.snapshot().velocities.clone()
    }

    /// Simulated time of the latest snapshot.
    pub fn sim_time(&self) -> Real {
        self.shared.snapshot().sim_time
    }

    /// Copy of the latest mesh.
    pub fn mesh(&self) -> SurfaceMesh {
        self.shared.mesh().mesh.clone()
    }

    /// Run `f` on the latest mesh while holding the mesh lock.
    pub fn with_mesh<T>(&self, f: impl FnOnce(&SurfaceMesh) -> T) -> T {
        f(&self.shared.mesh().mesh)
    }

    pub fn room(&self) -> &Obstacle {
        &self.room
    }

    pub fn room_mesh(&self) -> &SurfaceMesh {
        self.room.mesh()
    }

    pub const fn grid(&self) -> &GridGeometry {
        &self.grid
    }

    pub const fn grid_offset(&self) -> Point3<Real> {
        self.grid.offset
    }

    pub const fn grid_size(&self) -> Vector3<usize> {
        self.grid.size
    }

    pub const fn cell_size(&self) -> Real {
        self.grid.cell_size
    }

    pub fn grid_center(&self) -> Point3<Real> {
        self.grid.center()
    }

    pub fn min_corner(&self) -> Point3<Real> {
        self.grid.min_corner()
    }

    pub fn max_corner(&self) -> Point3<Real> {
        self.grid.max_corner()
    }

    /// Write the latest mesh to an OBJ file.
    pub fn save_mesh_obj(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let path = path.as_ref();
        self.shared.mesh().mesh.save_obj(path)?;
        log::info!("exported mesh to {}", path.display());
        Ok(())
    }

    /// Write the latest particle positions to a point list file.
    pub fn save_points(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let path = path.as_ref();
        let points: Vec<Point3<Real>> = self.shared.snapshot().particles.iter().map(|p| p.position).collect();
        crate::io::save_points(&points, path)?;
        log::info!("exported {} particles to {}", points.len(), path.display());
        Ok(())
    }

    /// Number of snapshots published so far.
    pub fn snapshot_generation(&self) -> u64 {
        self.shared.snapshots.current()
    }

    /// Number of meshes published so far.
    pub fn mesh_generation(&self) -> u64 {
        self.shared.meshes.current()
    }

    /// Block until a snapshot newer than generation `after` is published.
    pub fn wait_for_snapshot(&self, after: u64, timeout: Duration) -> Option<u64> {
        self.shared.snapshots.wait_past(after, timeout)
    }

    /// Block until a mesh newer than generation `after` is published.
    pub fn wait_for_mesh(&self, after: u64, timeout: Duration) -> Option<u64> {
        self.shared.meshes.wait_past(after, timeout)
    }

    /// Stop both threads and wait for them to finish. A reconstruction in
    /// progress is completed first. Calling this more than once is harmless.
    pub fn shutdown(&mut self) {
        if self.sim_thread.is_none() && self.mesh_thread.is_none() {
            return;
        }
        self.shared.stop.store(true, Ordering::Release);
        self.shared.sema.close();
        self.wake_simulation();
        for (name, handle) in [("simulation", self.sim_thread.take()), ("mesher", self.mesh_thread.take())] {
            if let Some(handle) = handle {
                if handle.join().is_err() {
                    log::error!("{name} thread panicked");
                }
            }
        }
        log::info!("pipeline stopped");
    }
}

impl Drop for FluidPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct SimWorker<S> {
    solver: S,
    room: Arc<Obstacle>,
    shared: Arc<Shared>,
    grid: GridGeometry,
    dt: Real,
    setup: FluidSetup,
    idle_wait: Duration,
}

impl<S: FluidSolver> SimWorker<S> {
    fn run(mut self) {
        log::info!("simulation thread started");
        while !self.shared.stop.load(Ordering::Acquire) {
            if self.shared.reset.swap(false, Ordering::AcqRel) {
                self.apply_setup();
                self.publish();
            }

            if !self.shared.paused.load(Ordering::Acquire) {
                self.solver.update(self.dt);
                self.publish();
            } else if self.shared.advance.swap(false, Ordering::AcqRel) {
                self.solver.time_step();
                self.publish();
            } else {
                thread::park_timeout(self.idle_wait);
            }
        }
        log::info!("simulation thread stopped at t = {}", self.solver.total_time());
    }

    /// Clear the solver, make the room's surface cells solid and fill the basin.
    fn apply_setup(&mut self) {
        self.solver.clear();

        let size = self.grid.size;
        let mut solid = 0usize;
        for z in 0..size.z {
            for y in 0..size.y {
                for x in 0..size.x {
                    let cell = Vector3::new(x, y, z);
                    if self.room.is_grid_cell_on_surface(cell) {
                        self.solver.set_solid(cell);
                        solid += 1;
                    }
                }
            }
        }
        log::info!("reset: {solid} solid cells of {}", size.x * size.y * size.z);
        self.solver.clear_sources_and_drains();

        let axis = self.setup.fill_axis.min(2);
        let height = self.setup.fill_height(&self.grid);
        let room = &self.room;
        self.solver
            .seed(&|p: &Point3<Real>| p[axis] <= height && room.is_cell_inside(p));
        log::info!("reset: seeded {} particles", self.solver.particles().len());
    }

    /// Move a fresh snapshot into the shared state and wake the mesher.
    fn publish(&self) {
        let particles = self.solver.particles().to_vec();
        let frame = GridFrame::new(self.grid.offset, self.grid.cell_size);

        let mut occupation = Grid3::new(self.grid.size, 0usize);
        let mut kinetic: Real = 0.0;
        let mut max_speed_sq: Real = 0.0;
        for p in &particles {
            let cell = frame.cell_of(&p.position);
            if occupation.contains_signed(cell) {
                occupation[cell.map(|c| c as usize)] += 1;
            }
            let speed_sq = p.velocity.norm_squared();
            kinetic += 0.5 * speed_sq;
            max_speed_sq = max_speed_sq.max(speed_sq);
        }
        let velocities = Grid3::from_fn(self.grid.size, |cell| self.solver.cell_velocity(cell));
        let sim_time = self.solver.total_time();
        log::debug!(
            "publish t = {sim_time}: {} particles, kinetic energy {kinetic}, max speed {}",
            particles.len(),
            max_speed_sq.sqrt()
        );

        {
            let mut snapshot = self.shared.snapshot();
            snapshot.particles = particles;
            snapshot.occupation = occupation;
            snapshot.velocities = velocities;
            snapshot.mesh_valid = false;
            snapshot.sim_time = sim_time;
        }
        self.shared.sema.notify();
        self.shared.snapshots.advance();
    }
}

fn run_mesher<R: SurfaceReconstructor>(shared: Arc<Shared>, mut reconstructor: R) {
    log::info!("mesher thread started");
    while shared.sema.wait() {
        let positions: Vec<Point3<Real>> = {
            let mut snapshot = shared.snapshot();
            if snapshot.mesh_valid {
                continue;
            }
            snapshot.mesh_valid = true;
            snapshot.particles.iter().map(|p| p.position).collect()
        };

        let mesh = reconstructor.reconstruct(&positions);
        log::debug!(
            "mesh from {} particles: {} vertices, {} triangles",
            positions.len(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );

        {
            let mut guard = shared.mesh();
            let slot = &mut *guard;
            slot.mesh = mesh;
            if let Some(sink) = slot.sink.as_mut() {
                sink.update(&slot.mesh);
            }
            if let Some(path) = &slot.autosave {
                if let Err(e) = slot.mesh.save_obj(path) {
                    log::warn!("autosave to {} failed: {e}", path.display());
                }
            }
        }
        shared.meshes.advance();
    }
    log::info!("mesher thread stopped");
}
