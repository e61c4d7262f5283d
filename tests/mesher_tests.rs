mod support;

use fluidsurf::{
    Mesher,
    float_types::Real,
    grid::GridFrame,
    mesher::marching_cubes,
};
use nalgebra::{Point3, Vector3};

#[test]
fn sphere_field_gives_watertight_mesh() {
    let center = Point3::new(4.02, 3.97, 4.01);
    let field = support::sphere_field(9, center, 3.0);
    let mut mesh = marching_cubes(&field, &GridFrame::new(Point3::origin(), 1.0));

    let analysis = mesh.analyze_edges();
    println!("sphere: {} vertices, {} triangles, {analysis:?}", mesh.vertex_count(), mesh.triangle_count());
    assert!(!mesh.is_empty());
    assert_eq!(analysis.boundary_edges, 0, "open edges");
    assert_eq!(analysis.non_manifold_edges, 0);
    assert_eq!(analysis.duplicate_positions, 0, "a crossing was emitted twice");
    assert_eq!(analysis.unreferenced_vertices, 0);
    // closed genus-0 surface
    let euler = mesh.vertex_count() as i64 - analysis.edges as i64 + mesh.triangle_count() as i64;
    assert_eq!(euler, 2);

    for p in &mesh.positions {
        let r = (p - center).norm();
        assert!(support::approx_eq(r, 3.0, 0.15), "vertex at radius {r}");
    }

    mesh.generate_normals();
    assert!(mesh.is_structurally_complete());
    for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
        assert!(support::approx_eq(n.norm(), 1.0, 1e-9));
        // Normals face the negative (inside) side of the field.
        assert!(n.dot(&(p - center)) < 0.0);
    }
}

#[test]
fn world_placement_scales_and_offsets() {
    let field = support::sphere_field(9, Point3::new(4.02, 3.97, 4.01), 3.0);
    let unit = marching_cubes(&field, &GridFrame::new(Point3::origin(), 1.0));
    let offset = Point3::new(-2.0, 1.0, 0.5);
    let placed = marching_cubes(&field, &GridFrame::new(offset, 0.25));
    assert_eq!(unit.indices, placed.indices);
    for (a, b) in unit.positions.iter().zip(&placed.positions) {
        let expected = offset + a.coords * 0.25;
        assert!((expected - b).norm() < 1e-12);
    }
}

#[test]
fn no_particles_give_empty_mesh() {
    let mut mesher = Mesher::default();
    mesher.frame = GridFrame::new(Point3::new(-1.0, -1.0, -1.0), 0.5);
    mesher.resize(Vector3::new(10, 10, 10));
    let mesh = mesher.generate_mesh(&[], 0.5);
    assert!(mesh.is_empty());
    assert_eq!(mesh.vertex_count(), 0);
    assert!(mesher.field().as_slice().iter().all(|&v| v == 1.0));
}

#[test]
fn particle_cluster_mesh_encloses_particles() {
    let mut mesher = Mesher::new(2.0, 3);
    mesher.frame = GridFrame::new(Point3::origin(), 0.5);
    mesher.resize(Vector3::new(16, 16, 16));

    let mut particles = Vec::new();
    for z in 0..3 {
        for y in 0..3 {
            for x in 0..3 {
                particles.push(Point3::new(3.1 + x as Real * 0.5, 2.9 + y as Real * 0.5, 3.05 + z as Real * 0.5));
            }
        }
    }
    let mut mesh = mesher.generate_mesh(&particles, 0.5);
    mesh.generate_normals();
    assert!(!mesh.is_empty());
    assert!(mesh.is_structurally_complete());

    // The kernel centroid pulls the surface inward, but the cluster core stays inside.
    let core = Vector3::new(7, 7, 7);
    assert_eq!(mesher.frame.vertex_position(core), Point3::new(3.5, 3.5, 3.5));
    assert!(mesher.field()[core] < 0.0, "field at the core is {}", mesher.field()[core]);
    let (min, max) = mesh.bounding_box().expect("non-empty mesh");
    for axis in 0..3 {
        assert!(min[axis] < 3.5 && 3.5 < max[axis], "core outside {min:?}..{max:?}");
    }
    // Nothing is reconstructed far from the particles.
    assert!(min.iter().all(|&c| c > 1.5) && max.iter().all(|&c| c < 5.5));
}
