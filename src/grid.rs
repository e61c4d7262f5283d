//! Dense regular grids and the mapping between world space and grid space.
//!
//! Every grid in the crate (voxel classification, scalar field samples, particle
//! buckets, occupation counts) is a [`Grid3`]. Cells are stored x-fastest:
//! `index = (z * ny + y) * nx + x`.

use crate::float_types::Real;
use nalgebra::{Point3, Vector2, Vector3};
use std::ops::{Index, IndexMut};

/// An owned, dense 3-D array addressed by integer `(x, y, z)` coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid3<T> {
    size: Vector3<usize>,
    cells: Vec<T>,
}

impl<T: Clone> Grid3<T> {
    /// Allocate a grid of `size` cells, every cell set to `value`.
    pub fn new(size: Vector3<usize>, value: T) -> Self {
        Self {
            size,
            cells: vec![value; size.x * size.y * size.z],
        }
    }

    /// Overwrite every cell with `value`.
    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

impl<T: Clone + Default> Grid3<T> {
    /// Allocate a grid of `size` default-valued cells.
    pub fn with_default(size: Vector3<usize>) -> Self {
        Self::new(size, T::default())
    }
}

impl<T> Default for Grid3<T> {
    fn default() -> Self {
        Self {
            size: Vector3::zeros(),
            cells: Vec::new(),
        }
    }
}

impl<T> Grid3<T> {
    /// Allocate a grid whose cells are produced by `f(coordinate)`.
    pub fn from_fn<F>(size: Vector3<usize>, mut f: F) -> Self
    where
        F: FnMut(Vector3<usize>) -> T,
    {
        let mut cells = Vec::with_capacity(size.x * size.y * size.z);
        for z in 0..size.z {
            for y in 0..size.y {
                for x in 0..size.x {
                    cells.push(f(Vector3::new(x, y, z)));
                }
            }
        }
        Self { size, cells }
    }

    /// Number of cells along each axis.
    #[inline]
    pub const fn size(&self) -> Vector3<usize> {
        self.size
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of cells in one z-layer.
    #[inline]
    pub fn layer_len(&self) -> usize {
        self.size.x * self.size.y
    }

    /// Whether `pos` addresses a cell of this grid.
    #[inline]
    pub fn contains(&self, pos: Vector3<usize>) -> bool {
        pos.x < self.size.x && pos.y < self.size.y && pos.z < self.size.z
    }

    /// Signed variant of [`Grid3::contains`]; negative coordinates are never inside.
    #[inline]
    pub fn contains_signed(&self, pos: Vector3<isize>) -> bool {
        pos.iter().all(|&c| c >= 0) && self.contains(pos.map(|c| c as usize))
    }

    #[inline]
    fn linearize(&self, pos: Vector3<usize>) -> usize {
        (pos.z * self.size.y + pos.y) * self.size.x + pos.x
    }

    /// Inverse of the x-fastest flattening.
    #[inline]
    pub fn delinearize(&self, index: usize) -> Vector3<usize> {
        let x = index % self.size.x;
        let yz = index / self.size.x;
        Vector3::new(x, yz % self.size.y, yz / self.size.y)
    }

    /// Bounds-checked access.
    #[inline]
    pub fn get(&self, pos: Vector3<usize>) -> Option<&T> {
        if self.contains(pos) {
            Some(&self.cells[self.linearize(pos)])
        } else {
            None
        }
    }

    /// Bounds-checked mutable access.
    #[inline]
    pub fn get_mut(&mut self, pos: Vector3<usize>) -> Option<&mut T> {
        if self.contains(pos) {
            let index = self.linearize(pos);
            Some(&mut self.cells[index])
        } else {
            None
        }
    }

    /// Bounds-checked access with signed coordinates.
    #[inline]
    pub fn get_signed(&self, pos: Vector3<isize>) -> Option<&T> {
        if self.contains_signed(pos) {
            self.get(pos.map(|c| c as usize))
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Iterate over `(coordinate, cell)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Vector3<usize>, &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (self.delinearize(i), cell))
    }

    /// Visit every cell of the half-open box `[min, max)` in x-fastest order.
    /// `max` is clamped to the grid size.
    pub fn for_each_in_range<F>(&self, min: Vector3<usize>, max: Vector3<usize>, mut f: F)
    where
        F: FnMut(Vector3<usize>, &T),
    {
        let max = max.zip_map(&self.size, |m, s| m.min(s));
        for z in min.z..max.z {
            for y in min.y..max.y {
                for x in min.x..max.x {
                    let pos = Vector3::new(x, y, z);
                    f(pos, &self.cells[self.linearize(pos)]);
                }
            }
        }
    }
}

impl<T> Index<Vector3<usize>> for Grid3<T> {
    type Output = T;

    #[inline]
    fn index(&self, pos: Vector3<usize>) -> &T {
        debug_assert!(self.contains(pos), "grid index {pos:?} out of range {:?}", self.size);
        &self.cells[self.linearize(pos)]
    }
}

impl<T> IndexMut<Vector3<usize>> for Grid3<T> {
    #[inline]
    fn index_mut(&mut self, pos: Vector3<usize>) -> &mut T {
        debug_assert!(self.contains(pos), "grid index {pos:?} out of range {:?}", self.size);
        let index = self.linearize(pos);
        &mut self.cells[index]
    }
}

/// An owned, dense 2-D array, used for per-layer caches.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2<T> {
    size: Vector2<usize>,
    cells: Vec<T>,
}

impl<T: Clone> Grid2<T> {
    pub fn new(size: Vector2<usize>, value: T) -> Self {
        Self {
            size,
            cells: vec![value; size.x * size.y],
        }
    }
}

impl<T> Grid2<T> {
    #[inline]
    pub const fn size(&self) -> Vector2<usize> {
        self.size
    }
}

impl<T> Index<[usize; 2]> for Grid2<T> {
    type Output = T;

    #[inline]
    fn index(&self, [x, y]: [usize; 2]) -> &T {
        &self.cells[y * self.size.x + x]
    }
}

impl<T> IndexMut<[usize; 2]> for Grid2<T> {
    #[inline]
    fn index_mut(&mut self, [x, y]: [usize; 2]) -> &mut T {
        &mut self.cells[y * self.size.x + x]
    }
}

/// Placement of a regular grid in world space.
///
/// `grid_coord = floor((world_pos - offset) / cell_size)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridFrame {
    /// World position of the grid's `(0, 0, 0)` corner
    pub offset: Point3<Real>,
    /// Edge length of one cubic cell
    pub cell_size: Real,
}

impl GridFrame {
    pub const fn new(offset: Point3<Real>, cell_size: Real) -> Self {
        Self { offset, cell_size }
    }

    /// Continuous grid-space coordinates of a world position.
    #[inline]
    pub fn grid_coords(&self, pos: &Point3<Real>) -> Vector3<Real> {
        (pos - self.offset) / self.cell_size
    }

    /// Index of the cell containing `pos`; may be negative or beyond any grid.
    #[inline]
    pub fn cell_of(&self, pos: &Point3<Real>) -> Vector3<isize> {
        self.grid_coords(pos).map(|c| c.floor() as isize)
    }

    /// World position of grid vertex `index` (the minimum corner of cell `index`).
    #[inline]
    pub fn vertex_position(&self, index: Vector3<usize>) -> Point3<Real> {
        self.offset + index.map(|c| c as Real) * self.cell_size
    }

    /// World position of the center of cell `index`.
    #[inline]
    pub fn cell_center(&self, index: Vector3<usize>) -> Point3<Real> {
        self.offset + (index.map(|c| c as Real).add_scalar(0.5)) * self.cell_size
    }
}
