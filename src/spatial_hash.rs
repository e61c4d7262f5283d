//! Dense spatial hash: one bucket of objects per grid cell.

use crate::grid::Grid3;
use nalgebra::Vector3;

/// Buckets objects by the grid cell that contains them, so that neighbors
/// within a fixed cell radius can be found without scanning every object.
#[derive(Debug, Clone)]
pub struct SpatialHash<T> {
    buckets: Grid3<Vec<T>>,
}

impl<T> Default for SpatialHash<T> {
    fn default() -> Self {
        Self {
            buckets: Grid3::default(),
        }
    }
}

impl<T> SpatialHash<T> {
    pub fn new(size: Vector3<usize>) -> Self {
        Self {
            buckets: Grid3::from_fn(size, |_| Vec::new()),
        }
    }

    /// Reallocate for `size` cells, dropping every stored object.
    pub fn resize(&mut self, size: Vector3<usize>) {
        self.buckets = Grid3::from_fn(size, |_| Vec::new());
    }

    pub const fn size(&self) -> Vector3<usize> {
        self.buckets.size()
    }

    /// Remove every object but keep the bucket allocations.
    pub fn clear(&mut self) {
        for bucket in self.buckets.as_mut_slice() {
            bucket.clear();
        }
    }

    /// Store `object` in `cell`. Returns `false` (and drops the object) when
    /// the cell lies outside the hash.
    pub fn add_object_at(&mut self, cell: Vector3<usize>, object: T) -> bool {
        match self.buckets.get_mut(cell) {
            Some(bucket) => {
                bucket.push(object);
                true
            },
            None => false,
        }
    }

    /// Objects stored in exactly `cell`.
    pub fn objects_at(&self, cell: Vector3<usize>) -> &[T] {
        self.buckets.get(cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Visit every object in the cells `center - min_offset ..= center + max_offset`
    /// (per axis, clamped to the hash).
    pub fn for_all_nearby_objects<F>(
        &self,
        center: Vector3<usize>,
        min_offset: usize,
        max_offset: usize,
        mut f: F,
    ) where
        F: FnMut(&T),
    {
        let size = self.buckets.size();
        if size.iter().any(|&s| s == 0) {
            return;
        }
        let min = center.map(|c| c.saturating_sub(min_offset));
        let max = center.zip_map(&size, |c, s| (c + max_offset).min(s - 1));
        for z in min.z..=max.z {
            for y in min.y..=max.y {
                for x in min.x..=max.x {
                    for object in &self.buckets[Vector3::new(x, y, z)] {
                        f(object);
                    }
                }
            }
        }
    }
}
