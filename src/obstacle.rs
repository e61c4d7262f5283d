//! Static solid obstacles aligned to a simulation grid.

use crate::errors::VoxelizeError;
use crate::float_types::Real;
use crate::mesh::SurfaceMesh;
use crate::voxelizer::{CellType, Voxelizer};
use nalgebra::{Point3, Vector3};

/// A closed mesh voxelized onto cells that coincide exactly with the cells of a
/// reference (simulation) grid.
///
/// World-space queries classify the cell containing a position. Grid-space
/// queries take *reference grid* cell indices; cells the obstacle grid does not
/// cover are outside.
#[derive(Debug, Clone)]
pub struct Obstacle {
    mesh: SurfaceMesh,
    vox: Voxelizer,
    cell_offset: Vector3<isize>,
    ref_grid_size: Vector3<usize>,
}

impl Obstacle {
    /// Voxelize `mesh` against a reference grid with origin `ref_grid_offset`,
    /// `ref_grid_size` cells and cubic cells of `cell_size`.
    ///
    /// The mesh is expected to be closed; an open mesh simply has no interior
    /// since the exterior fill leaks through it.
    pub fn new(
        mesh: SurfaceMesh,
        cell_size: Real,
        ref_grid_offset: Point3<Real>,
        ref_grid_size: Vector3<usize>,
    ) -> Result<Self, VoxelizeError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(VoxelizeError::InvalidCellSize(cell_size));
        }
        let (min, max) = mesh.bounding_box().ok_or(VoxelizeError::EmptyMesh)?;

        let mut vox = Voxelizer::new(cell_size);
        let cell_offset = vox.resize_reposition_grid_constrained(min, max, cell_size, ref_grid_offset);
        vox.voxelize_mesh_surface(&mesh);
        let exterior = vox.mark_exterior()?;

        let obstacle = Self {
            mesh,
            vox,
            cell_offset,
            ref_grid_size,
        };
        log::info!(
            "obstacle voxelized: {} triangles, {} exterior cells, {} interior cells in the reference grid",
            obstacle.mesh.triangle_count(),
            exterior,
            obstacle.interior_cells().len()
        );
        Ok(obstacle)
    }

    /// The mesh the obstacle was built from.
    pub const fn mesh(&self) -> &SurfaceMesh {
        &self.mesh
    }

    pub const fn voxelizer(&self) -> &Voxelizer {
        &self.vox
    }

    /// Index of the obstacle grid's `(0, 0, 0)` cell in the reference grid.
    pub const fn cell_offset(&self) -> Vector3<isize> {
        self.cell_offset
    }

    /// Map a reference grid cell to an obstacle grid cell, if covered.
    fn local_cell(&self, cell: Vector3<usize>) -> Option<Vector3<usize>> {
        let local = cell.map(|c| c as isize) - self.cell_offset;
        if local.iter().all(|&c| c >= 0) {
            Some(local.map(|c| c as usize))
        } else {
            None
        }
    }

    fn classify_cell(&self, cell: Vector3<usize>) -> Option<CellType> {
        self.local_cell(cell).and_then(|local| self.vox.cell(local))
    }

    pub fn is_cell_inside(&self, pos: &Point3<Real>) -> bool {
        self.vox.is_interior(pos)
    }

    pub fn is_cell_on_surface(&self, pos: &Point3<Real>) -> bool {
        self.vox.is_surface(pos)
    }

    pub fn is_cell_outside(&self, pos: &Point3<Real>) -> bool {
        self.vox.is_exterior(pos)
    }

    /// Reference grid cell `cell` lies strictly inside the obstacle.
    pub fn is_grid_cell_inside(&self, cell: Vector3<usize>) -> bool {
        self.classify_cell(cell) == Some(CellType::Interior)
    }

    /// Reference grid cell `cell` intersects the obstacle's surface.
    pub fn is_grid_cell_on_surface(&self, cell: Vector3<usize>) -> bool {
        self.classify_cell(cell) == Some(CellType::Surface)
    }

    /// Reference grid cell `cell` is outside the obstacle (or not covered by it).
    pub fn is_grid_cell_outside(&self, cell: Vector3<usize>) -> bool {
        matches!(self.classify_cell(cell), None | Some(CellType::Exterior))
    }

    /// Reference grid cells strictly inside the obstacle, in x-fastest order.
    pub fn interior_cells(&self) -> Vec<Vector3<usize>> {
        let (min, max) = self.vox.overlapping_cell_range(self.cell_offset, self.ref_grid_size);
        let mut cells = Vec::new();
        self.vox.grid().for_each_in_range(min, max, |pos, &cell| {
            if cell == CellType::Interior {
                cells.push((pos.map(|c| c as isize) + self.cell_offset).map(|c| c as usize));
            }
        });
        cells
    }
}
