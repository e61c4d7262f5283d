mod support;

use fluidsurf::{
    FluidPipeline, PipelineConfig, SurfaceMesh,
    float_types::Real,
    simulation::{FluidSetup, RenderBuffer},
};
use nalgebra::{Point3, Vector3};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use support::{MockSolver, SolverStats};

const WAIT: Duration = Duration::from_secs(10);

fn paused_config() -> PipelineConfig {
    PipelineConfig {
        start_paused: true,
        ..PipelineConfig::default()
    }
}

/// A mesh whose size depends on the particle count: `n` disjoint triangles.
fn triangle_fan(positions: &[Point3<Real>]) -> SurfaceMesh {
    let n = positions.len().min(200);
    let mut mesh = SurfaceMesh::new();
    for i in 0..n {
        let base = Point3::new(i as Real, 0.0, 0.0);
        mesh.positions.extend([base, base + Vector3::x(), base + Vector3::y()]);
        mesh.indices.extend([3 * i, 3 * i + 1, 3 * i + 2]);
    }
    mesh.generate_normals();
    mesh
}

#[test]
fn reset_fills_the_basin_inside_the_room() {
    let grid = support::padded_grid(Vector3::new(6.0, 6.0, 6.0), 1.0);
    let room = support::room_for(&grid);
    let solver = MockSolver::new(grid);
    let stats = Arc::clone(&solver.stats);

    let pipeline = FluidPipeline::spawn(solver, room, paused_config()).expect("pipeline starts");
    assert_eq!(pipeline.wait_for_snapshot(0, WAIT), Some(1));

    // Room walls at 0.25 and 5.75: surface cells 1..=6 on each axis.
    assert_eq!(SolverStats::get(&stats.resets), 1);
    assert_eq!(SolverStats::get(&stats.solid_cells), 6 * 6 * 6 - 4 * 4 * 4);

    // Fill height along x: -1 + 8 * 0.35 = 1.8, so only the x = 2 layer of the
    // 4^3 interior is seeded.
    let height = FluidSetup::default().fill_height(pipeline.grid());
    assert!(support::approx_eq(height, 1.8, 1e-9));
    let particles = pipeline.particles();
    assert_eq!(particles.len(), 16);
    for p in &particles {
        assert!(p.position.x <= height);
        assert!(pipeline.room().is_cell_inside(&p.position));
    }

    let occupation = pipeline.grid_occupation();
    assert_eq!(occupation.size(), pipeline.grid_size());
    assert_eq!(occupation.as_slice().iter().sum::<usize>(), 16);
    assert_eq!(occupation[Vector3::new(2, 3, 4)], 1);

    let velocities = pipeline.grid_velocities();
    assert_eq!(velocities[Vector3::new(1, 2, 3)], Vector3::new(1.0, 2.0, 3.0));
}

#[test]
fn default_mesher_reconstructs_the_basin() {
    let grid = support::padded_grid(Vector3::new(6.0, 6.0, 6.0), 1.0);
    let room = support::room_for(&grid);
    let pipeline = FluidPipeline::spawn(MockSolver::new(grid), room, paused_config()).expect("pipeline starts");

    assert!(pipeline.wait_for_mesh(0, WAIT).is_some());
    let mesh = pipeline.mesh();
    assert!(!mesh.is_empty());
    assert!(mesh.is_structurally_complete());
    assert_eq!(mesh.normals.len(), mesh.vertex_count());

    // The surface stays within the seeded slab (particles at x = 1.5).
    let (min, max) = mesh.bounding_box().expect("non-empty");
    assert!(min.x > 0.0 && max.x < 3.0, "{min:?}..{max:?}");
}

#[test]
fn paused_pipeline_advances_one_step_at_a_time() {
    let grid = support::padded_grid(Vector3::new(4.0, 4.0, 4.0), 1.0);
    let solver = MockSolver::new(grid);
    let stats = Arc::clone(&solver.stats);
    let pipeline = FluidPipeline::spawn_with_reconstructor(
        solver,
        support::room_for(&grid),
        triangle_fan,
        paused_config(),
    )
    .expect("pipeline starts");

    assert!(pipeline.is_paused());
    assert_eq!(pipeline.wait_for_snapshot(0, WAIT), Some(1));
    assert_eq!(pipeline.wait_for_snapshot(1, Duration::from_millis(50)), None);
    assert_eq!(SolverStats::get(&stats.updates), 0);

    pipeline.advance();
    assert_eq!(pipeline.wait_for_snapshot(1, WAIT), Some(2));
    assert_eq!(SolverStats::get(&stats.time_steps), 1);
    assert!(support::approx_eq(pipeline.sim_time(), MockSolver::STEP, 1e-12));

    assert!(!pipeline.toggle_pause());
    assert!(pipeline.wait_for_snapshot(5, WAIT).is_some());
    assert!(SolverStats::get(&stats.updates) >= 3);

    pipeline.set_paused(true);
    pipeline.reset();
    let resets_done = Instant::now();
    while SolverStats::get(&stats.resets) < 2 {
        assert!(resets_done.elapsed() < WAIT, "reset never ran");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn mesher_skips_stale_snapshots() {
    let grid = support::padded_grid(Vector3::new(4.0, 4.0, 4.0), 1.0);
    let solver = MockSolver::new(grid).growing();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = {
        let seen = Arc::clone(&seen);
        move |positions: &[Point3<Real>]| {
            // Much slower than the solver's publish rate.
            thread::sleep(Duration::from_millis(25));
            seen.lock().expect("recorder lock").push(positions.len());
            SurfaceMesh::new()
        }
    };
    let pipeline = FluidPipeline::spawn_with_reconstructor(
        solver,
        support::room_for(&grid),
        recorder,
        PipelineConfig::default(),
    )
    .expect("pipeline starts");

    assert!(pipeline.wait_for_mesh(4, WAIT).is_some());
    pipeline.set_paused(true);
    // Let the last published snapshot drain through the mesher.
    let mut generation = pipeline.mesh_generation();
    while let Some(g) = pipeline.wait_for_mesh(generation, Duration::from_millis(300)) {
        generation = g;
    }

    let published = pipeline.snapshot_generation();
    let seen = seen.lock().expect("recorder lock").clone();
    println!("{published} snapshots, {} reconstructions: {seen:?}", seen.len());

    // Each reconstruction worked on a strictly newer snapshot than the last.
    assert!(seen.windows(2).all(|w| w[0] < w[1]), "{seen:?}");
    // Bursts collapsed instead of queueing.
    assert!((seen.len() as u64) < published);
    // The newest snapshot was reconstructed.
    assert_eq!(seen.last().copied(), Some(pipeline.particles().len()));
}

#[test]
fn readers_never_see_a_partial_mesh() {
    let grid = support::padded_grid(Vector3::new(4.0, 4.0, 4.0), 1.0);
    let solver = MockSolver::new(grid).growing();
    let pipeline = FluidPipeline::spawn_with_reconstructor(
        solver,
        support::room_for(&grid),
        triangle_fan,
        PipelineConfig::default(),
    )
    .expect("pipeline starts");

    let reads = thread::scope(|scope| {
        let readers: Vec<_> = (0..3)
            .map(|_| {
                scope.spawn(|| {
                    let mut reads = 0;
                    let start = Instant::now();
                    while start.elapsed() < Duration::from_millis(300) {
                        let mesh = pipeline.mesh();
                        assert!(mesh.is_structurally_complete());
                        assert_eq!(mesh.normals.len(), mesh.vertex_count());
                        assert!(pipeline.with_mesh(|m| m.indices.len() == 3 * m.triangle_count()));
                        reads += 1;
                    }
                    reads
                })
            })
            .collect();
        readers
            .into_iter()
            .map(|r| r.join().expect("reader thread"))
            .sum::<usize>()
    });
    assert!(reads > 0);
    assert!(pipeline.mesh_generation() > 1, "mesher never replaced the mesh");
}

#[test]
fn bound_buffer_tracks_published_meshes() {
    let grid = support::padded_grid(Vector3::new(4.0, 4.0, 4.0), 1.0);
    let pipeline = FluidPipeline::spawn_with_reconstructor(
        MockSolver::new(grid).growing(),
        support::room_for(&grid),
        triangle_fan,
        paused_config(),
    )
    .expect("pipeline starts");

    // The reset mesh is published before binding.
    assert!(pipeline.wait_for_mesh(0, WAIT).is_some());
    let buffer = RenderBuffer::shared();
    pipeline.bind_mesh(Arc::clone(&buffer));
    let bound_at = pipeline.mesh_generation();
    pipeline.advance();
    assert!(pipeline.wait_for_mesh(bound_at, WAIT).is_some());

    pipeline.with_mesh(|mesh| {
        let buffer = buffer.lock().expect("buffer lock");
        assert!(buffer.updates >= 1);
        assert_eq!(buffer.vertex_count(), mesh.vertex_count());
        assert_eq!(buffer.indices.len(), mesh.indices.len());
        assert_eq!(buffer.normals.len(), mesh.vertex_count());
    });

    assert!(pipeline.unbind_mesh().is_some());
    assert!(pipeline.unbind_mesh().is_none());
}

#[test]
fn autosave_and_exports_write_files() {
    let dir = std::env::temp_dir().join(format!("fluidsurf-pipeline-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let autosave = dir.join("autosave.obj");

    let grid = support::padded_grid(Vector3::new(6.0, 6.0, 6.0), 1.0);
    let config = PipelineConfig {
        autosave_obj: Some(autosave.clone()),
        ..paused_config()
    };
    let mut pipeline =
        FluidPipeline::spawn(MockSolver::new(grid), support::room_for(&grid), config).expect("pipeline starts");
    assert!(pipeline.wait_for_mesh(0, WAIT).is_some());

    let text = std::fs::read_to_string(&autosave).expect("autosaved mesh");
    assert!(text.lines().any(|l| l.starts_with("f ")));

    let points = dir.join("points.txt");
    pipeline.save_points(&points).expect("points export");
    let lines = std::fs::read_to_string(&points).expect("points file");
    assert_eq!(lines.lines().count(), pipeline.particles().len());

    let obj = dir.join("mesh.obj");
    pipeline.save_mesh_obj(&obj).expect("mesh export");
    assert_eq!(std::fs::read_to_string(&obj).expect("mesh file"), pipeline.mesh().to_obj().expect("obj"));

    pipeline.shutdown();
    pipeline.shutdown();
    let _ = std::fs::remove_dir_all(&dir);
}
