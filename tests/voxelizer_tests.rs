mod support;

use fluidsurf::{
    CellType, Obstacle, SurfaceMesh, VoxelizeError, Voxelizer,
    float_types::Real,
    grid::GridFrame,
};
use nalgebra::{Point3, Vector3};

fn count(vox: &Voxelizer, kind: CellType) -> usize {
    vox.grid().as_slice().iter().filter(|&&c| c == kind).count()
}

fn voxelized_box(min: Point3<Real>, max: Point3<Real>, cell_size: Real) -> Voxelizer {
    let mesh = SurfaceMesh::cuboid(min, max);
    let mut vox = Voxelizer::new(cell_size);
    let (bmin, bmax) = mesh.bounding_box().expect("box has vertices");
    vox.resize_reposition_grid(bmin, bmax);
    vox.voxelize_mesh_surface(&mesh);
    vox.mark_exterior().expect("seed is outside the box");
    vox
}

#[test]
fn classification_is_complete_for_a_box() {
    let vox = voxelized_box(Point3::origin(), Point3::new(6.5, 6.5, 6.5), 1.0);
    let size = vox.grid_size();
    println!("grid {size:?} at {:?}", vox.grid_offset());
    assert_eq!(size, Vector3::new(9, 9, 9));

    let interior = count(&vox, CellType::Interior);
    let surface = count(&vox, CellType::Surface);
    let exterior = count(&vox, CellType::Exterior);
    assert_eq!(interior + surface + exterior, 9 * 9 * 9);
    // A 7^3 shell of surface cells around a 5^3 core.
    assert_eq!(interior, 125, "interior cells");
    assert_eq!(surface, 218, "surface cells");
    assert_eq!(exterior, 386, "exterior cells");

    // No interior cell touches an exterior one.
    for (pos, &cell) in vox.grid().iter() {
        if cell != CellType::Interior {
            continue;
        }
        for axis in 0..3 {
            for delta in [-1isize, 1] {
                let mut n = pos.map(|c| c as isize);
                n[axis] += delta;
                assert_ne!(
                    vox.grid().get_signed(n).copied(),
                    Some(CellType::Exterior),
                    "interior {pos:?} borders exterior {n:?}"
                );
            }
        }
    }
}

#[test]
fn world_queries_follow_cells() {
    let vox = voxelized_box(Point3::origin(), Point3::new(6.5, 6.5, 6.5), 1.0);
    assert!(vox.is_interior(&Point3::new(3.2, 3.2, 3.2)));
    assert!(vox.is_surface(&Point3::new(0.0, 3.0, 3.0)));
    assert!(vox.is_exterior(&Point3::new(-1.0, -1.0, -1.0)));
    // Outside the allocated grid is always exterior.
    let far = Point3::new(100.0, 3.0, 3.0);
    assert!(vox.is_exterior(&far));
    assert!(!vox.is_interior(&far));
    assert!(!vox.is_surface(&far));
    assert!(vox.is_exterior_cell(Vector3::new(9, 0, 0)));
    assert!(!vox.is_surface_cell(Vector3::new(0, 90, 0)));
}

#[test]
fn constrained_grid_aligns_exactly() {
    let ref_offset = Point3::new(-1.3, 0.7, 2.9);
    let cell_size = 0.37;
    let mut vox = Voxelizer::new(1.0);
    let offset = vox.resize_reposition_grid_constrained(
        Point3::new(-0.61, 1.93, 3.3),
        Point3::new(2.27, 4.4, 5.05),
        cell_size,
        ref_offset,
    );
    // Bit-exact: the grid offset is derived from the integer offset.
    let expected = ref_offset + offset.map(|c| c as Real) * cell_size;
    assert_eq!(vox.grid_offset(), expected);
    assert_eq!(vox.cell_size(), cell_size);

    let reference = GridFrame::new(ref_offset, cell_size);
    for cell in [Vector3::new(0usize, 0, 0), Vector3::new(3, 1, 4), Vector3::new(5, 5, 2)] {
        let local = vox.frame().cell_center(cell);
        let in_ref = (cell.map(|c| c as isize) + offset).map(|c| c as usize);
        let world = reference.cell_center(in_ref);
        assert!((local - world).norm() < 1e-9, "{local:?} vs {world:?}");
    }
}

#[test]
fn voxelization_is_idempotent() {
    let mesh = SurfaceMesh::octahedron(Point3::new(2.1, 1.9, 2.05), 1.6);
    let mut vox = Voxelizer::new(0.5);
    let (min, max) = mesh.bounding_box().expect("vertices");
    vox.resize_reposition_grid(min, max);
    vox.voxelize_mesh_surface(&mesh);
    let once = vox.grid().clone();
    vox.voxelize_mesh_surface(&mesh);
    assert_eq!(&once, vox.grid(), "second surface pass changed the grid");

    let marked = vox.mark_exterior().expect("seed outside");
    assert!(marked > 0);
    let filled = vox.grid().clone();
    assert_eq!(vox.mark_exterior(), Ok(0));
    assert_eq!(&filled, vox.grid(), "second fill changed the grid");
    assert!(vox.grid().as_slice().contains(&CellType::Interior));
}

#[test]
fn seed_on_surface_leaves_grid_untouched() {
    let mut vox = Voxelizer::new(1.0);
    vox.resize_reposition_grid(Point3::origin(), Point3::new(3.0, 3.0, 3.0));
    let offset = vox.grid_offset();
    // A triangle through the seed cell's center.
    let c = offset + Vector3::repeat(0.5);
    vox.voxelize_triangle(
        &(c + Vector3::new(-1.0, -1.0, 0.0)),
        &(c + Vector3::new(1.0, -1.0, 0.0)),
        &(c + Vector3::new(0.0, 1.0, 0.0)),
    );
    assert!(vox.is_surface_cell(Vector3::zeros()));

    let before = vox.grid().clone();
    assert_eq!(vox.mark_exterior(), Err(VoxelizeError::SeedOnSurface));
    assert_eq!(&before, vox.grid());
}

#[test]
fn room_obstacle_marks_a_hollow_shell() {
    let grid = support::padded_grid(Vector3::new(6.0, 5.0, 4.0), 1.0);
    let room = support::room_for(&grid);
    let obstacle = Obstacle::new(room, grid.cell_size, grid.offset, grid.size).expect("room");

    let mut surface = 0;
    let mut inside = 0;
    for z in 0..grid.size.z {
        for y in 0..grid.size.y {
            for x in 0..grid.size.x {
                let cell = Vector3::new(x, y, z);
                let kinds = [
                    obstacle.is_grid_cell_inside(cell),
                    obstacle.is_grid_cell_on_surface(cell),
                    obstacle.is_grid_cell_outside(cell),
                ];
                assert_eq!(kinds.iter().filter(|&&k| k).count(), 1, "{cell:?} has one class");
                surface += kinds[1] as usize;
                inside += kinds[0] as usize;
            }
        }
    }
    // walls at 0.25 and extent - 0.25: surface cells 1..=extent, interior 2..extent
    assert_eq!(inside, 4 * 3 * 2);
    assert_eq!(surface, 6 * 5 * 4 - inside);
    assert_eq!(obstacle.interior_cells().len(), inside);
}
