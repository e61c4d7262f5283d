//! Classification of a regular grid against a closed triangle mesh.
//!
//! Every cell starts [`CellType::Interior`]. [`Voxelizer::voxelize_triangle`]
//! promotes cells touched by a triangle to [`CellType::Surface`], and
//! [`Voxelizer::mark_exterior`] flood fills [`CellType::Exterior`] from the
//! corner cell. Surface cells are never reclassified, so what remains interior
//! is the enclosed volume.

use crate::errors::VoxelizeError;
use crate::float_types::Real;
use crate::grid::{Grid3, GridFrame};
use crate::intersection::triangle_aabb_overlap;
use crate::mesh::SurfaceMesh;
use nalgebra::{Point3, Vector3};

/// Classification of one voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellType {
    /// Not (yet) reached from outside
    #[default]
    Interior,
    /// Overlapped by at least one triangle
    Surface,
    /// Reachable from the grid corner without crossing a surface cell
    Exterior,
}

/// Owns a [`Grid3<CellType>`] and the frame placing it in world space.
#[derive(Debug, Clone)]
pub struct Voxelizer {
    frame: GridFrame,
    voxels: Grid3<CellType>,
}

impl Default for Voxelizer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Voxelizer {
    /// An empty voxelizer with the given cell size. Call one of the resize
    /// functions before voxelizing.
    pub fn new(cell_size: Real) -> Self {
        Self {
            frame: GridFrame::new(Point3::origin(), cell_size),
            voxels: Grid3::default(),
        }
    }

    pub const fn frame(&self) -> &GridFrame {
        &self.frame
    }

    pub const fn cell_size(&self) -> Real {
        self.frame.cell_size
    }

    pub const fn grid_offset(&self) -> Point3<Real> {
        self.frame.offset
    }

    pub const fn grid_size(&self) -> Vector3<usize> {
        self.voxels.size()
    }

    /// Read access to the classification grid.
    pub const fn grid(&self) -> &Grid3<CellType> {
        &self.voxels
    }

    /// Axis-aligned bounding box of a point set, or `None` when it is empty.
    pub fn bounding_box<'a, I>(points: I) -> Option<(Point3<Real>, Point3<Real>)>
    where
        I: IntoIterator<Item = &'a Point3<Real>>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| (min.inf(p), max.sup(p))))
    }

    /// Cover the box `[min, max]` with cells of the current size plus one cell
    /// of padding on every side. The residual slack from rounding up is split
    /// evenly between both sides. All cells are reset to interior.
    pub fn resize_reposition_grid(&mut self, min: Point3<Real>, max: Point3<Real>) {
        let cell_size = self.frame.cell_size;
        let extent = max - min;
        let cells = (extent / cell_size).map(|c| c.ceil().max(0.0));
        self.frame.offset = min
            - (cells * cell_size - extent) * 0.5
            - Vector3::repeat(cell_size);
        let size = cells.map(|c| c as usize).add_scalar(2);
        self.voxels = Grid3::new(size, CellType::Interior);

        log::debug!(
            "voxel grid resized: offset {:?}, size {:?}",
            self.frame.offset,
            size
        );
    }

    /// Like [`Voxelizer::resize_reposition_grid`], but the cells line up exactly
    /// with those of a reference grid of cell size `ref_cell_size` whose origin
    /// is `ref_grid_offset`.
    ///
    /// Returns the index of this grid's `(0, 0, 0)` cell in the reference grid, so
    /// that `ref_grid_offset + offset * ref_cell_size == self.grid_offset()`
    /// holds exactly.
    pub fn resize_reposition_grid_constrained(
        &mut self,
        min: Point3<Real>,
        max: Point3<Real>,
        ref_cell_size: Real,
        ref_grid_offset: Point3<Real>,
    ) -> Vector3<isize> {
        self.frame.cell_size = ref_cell_size;
        let grid_min = ((min - ref_grid_offset) / ref_cell_size)
            .map(|c| c.floor() as isize)
            .add_scalar(-1);
        let grid_max = ((max - ref_grid_offset) / ref_cell_size)
            .map(|c| c.ceil() as isize)
            .add_scalar(1);

        self.frame.offset = ref_grid_offset + grid_min.map(|c| c as Real) * ref_cell_size;
        let size = (grid_max - grid_min).map(|c| c.max(0) as usize);
        self.voxels = Grid3::new(size, CellType::Interior);

        log::debug!(
            "voxel grid aligned to reference: cell offset {:?}, grid offset {:?}, size {:?}",
            grid_min,
            self.frame.offset,
            size
        );
        grid_min
    }

    /// Voxel-local half-open range `[min, max)` of cells that fall inside a
    /// reference grid of `ref_grid_size` cells, given the cell offset returned
    /// by [`Voxelizer::resize_reposition_grid_constrained`].
    pub fn overlapping_cell_range(
        &self,
        offset: Vector3<isize>,
        ref_grid_size: Vector3<usize>,
    ) -> (Vector3<usize>, Vector3<usize>) {
        let min = offset.map(|c| if c < 0 { c.unsigned_abs() } else { 0 });
        let size = self.voxels.size().map(|c| c as isize);
        let max = (offset + size).zip_map(&ref_grid_size, |end, ref_size| {
            (end.max(0) as usize).min(ref_size)
        });
        // Convert the reference-space end back to voxel-local coordinates.
        let max = max.zip_map(&offset, |end, o| (end as isize - o).max(0) as usize);
        (min, max.zip_map(&min, |end, start| end.max(start)))
    }

    /// Mark every cell overlapped by the triangle `(p1, p2, p3)` as surface.
    ///
    /// Only the cells covered by the triangle's bounding box are tested. Parts of
    /// the triangle outside the grid are ignored.
    pub fn voxelize_triangle(&mut self, p1: &Point3<Real>, p2: &Point3<Real>, p3: &Point3<Real>) {
        if self.voxels.is_empty() {
            return;
        }
        let min = p1.inf(p2).inf(p3);
        let max = p1.sup(p2).sup(p3);

        let upper = self.voxels.size().map(|c| c as isize - 1);
        let min_id = self.frame.cell_of(&min);
        let max_id = self.frame.cell_of(&max);
        if (0..3).any(|i| max_id[i] < 0 || min_id[i] > upper[i]) {
            return;
        }
        let min_id = min_id.zip_map(&upper, |c, u| c.clamp(0, u) as usize);
        let max_id = max_id.zip_map(&upper, |c, u| c.clamp(0, u) as usize);

        let half = 0.5 * self.frame.cell_size;
        let half_extents = Vector3::repeat(half);
        for z in min_id.z..=max_id.z {
            for y in min_id.y..=max_id.y {
                for x in min_id.x..=max_id.x {
                    let cell = Vector3::new(x, y, z);
                    if self.voxels[cell] == CellType::Surface {
                        continue;
                    }
                    let center = self.frame.cell_center(cell);
                    if triangle_aabb_overlap(&center, &half_extents, p1, p2, p3) {
                        self.voxels[cell] = CellType::Surface;
                    }
                }
            }
        }
    }

    /// Voxelize every triangle of `mesh`.
    pub fn voxelize_mesh_surface(&mut self, mesh: &SurfaceMesh) {
        for [a, b, c] in mesh.triangles() {
            self.voxelize_triangle(&mesh.positions[a], &mesh.positions[b], &mesh.positions[c]);
        }
    }

    /// Flood fill (6-connected, explicit stack) from cell `(0, 0, 0)`, turning
    /// every reachable interior cell exterior. Surface cells block the fill.
    ///
    /// Returns the number of cells that became exterior. Fails with
    /// [`VoxelizeError::SeedOnSurface`] when the seed cell is a surface cell, in
    /// which case nothing is changed.
    pub fn mark_exterior(&mut self) -> Result<usize, VoxelizeError> {
        if self.voxels.is_empty() {
            return Err(VoxelizeError::EmptyGrid);
        }
        let seed = Vector3::zeros();
        match self.voxels[seed] {
            CellType::Surface => return Err(VoxelizeError::SeedOnSurface),
            CellType::Exterior => return Ok(0),
            CellType::Interior => {},
        }

        let size = self.voxels.size();
        self.voxels[seed] = CellType::Exterior;
        let mut marked = 1;
        let mut stack = vec![seed];

        while let Some(cur) = stack.pop() {
            for axis in 0..3 {
                for forward in [false, true] {
                    let mut n = cur;
                    if forward && cur[axis] + 1 < size[axis] {
                        n[axis] += 1;
                    } else if !forward && cur[axis] > 0 {
                        n[axis] -= 1;
                    } else {
                        continue;
                    }
                    let cell = &mut self.voxels[n];
                    if *cell == CellType::Interior {
                        *cell = CellType::Exterior;
                        marked += 1;
                        stack.push(n);
                    }
                }
            }
        }

        log::debug!("flood fill marked {marked} exterior cells");
        Ok(marked)
    }

    /// Classification of the cell containing a world position; `None` outside the grid.
    pub fn cell_at(&self, pos: &Point3<Real>) -> Option<CellType> {
        self.voxels.get_signed(self.frame.cell_of(pos)).copied()
    }

    /// Classification of a grid cell; `None` outside the grid.
    pub fn cell(&self, pos: Vector3<usize>) -> Option<CellType> {
        self.voxels.get(pos).copied()
    }

    pub fn is_interior(&self, pos: &Point3<Real>) -> bool {
        self.cell_at(pos) == Some(CellType::Interior)
    }

    pub fn is_interior_cell(&self, pos: Vector3<usize>) -> bool {
        self.cell(pos) == Some(CellType::Interior)
    }

    pub fn is_surface(&self, pos: &Point3<Real>) -> bool {
        self.cell_at(pos) == Some(CellType::Surface)
    }

    pub fn is_surface_cell(&self, pos: Vector3<usize>) -> bool {
        self.cell(pos) == Some(CellType::Surface)
    }

    /// Positions outside the grid count as exterior.
    pub fn is_exterior(&self, pos: &Point3<Real>) -> bool {
        matches!(self.cell_at(pos), None | Some(CellType::Exterior))
    }

    /// Cells outside the grid count as exterior.
    pub fn is_exterior_cell(&self, pos: Vector3<usize>) -> bool {
        matches!(self.cell(pos), None | Some(CellType::Exterior))
    }
}
