//! `SurfaceMesh`: the indexed triangle mesh produced by the mesher and consumed
//! by the voxelizer, the renderer binding and the exporters.

use crate::float_types::{Real, tolerance};
use nalgebra::{Point3, Vector3};

/// Edge topology checks for indexed meshes
pub mod analysis;

/// Closed primitive meshes
pub mod shapes;

pub use analysis::EdgeAnalysis;

/// An indexed triangle list.
///
/// Each reconstruction produces a fresh `SurfaceMesh`; consumers replace whole
/// meshes rather than editing one in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceMesh {
    /// Vertex positions
    pub positions: Vec<Point3<Real>>,
    /// Per-vertex normals; empty until [`SurfaceMesh::generate_normals`] runs
    pub normals: Vec<Vector3<Real>>,
    /// Triangle list, three indices per face
    pub indices: Vec<usize>,
}

impl SurfaceMesh {
    pub const fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Build a mesh from positions and a flat triangle index list.
    pub const fn from_parts(positions: Vec<Point3<Real>>, indices: Vec<usize>) -> Self {
        Self {
            positions,
            normals: Vec::new(),
            indices,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate over the index triples of every triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Axis-aligned bounding box of the vertex positions.
    pub fn bounding_box(&self) -> Option<(Point3<Real>, Point3<Real>)> {
        crate::voxelizer::Voxelizer::bounding_box(&self.positions)
    }

    /// Array sizes agree: whole triangles, every index in range, and normals
    /// either absent or one per vertex.
    pub fn is_structurally_complete(&self) -> bool {
        self.indices.len() % 3 == 0
            && self.indices.iter().all(|&i| i < self.positions.len())
            && (self.normals.is_empty() || self.normals.len() == self.positions.len())
    }

    /// Compute one normal per vertex by accumulating the area-weighted normals
    /// of the adjacent triangles and renormalizing.
    ///
    /// The unnormalized cross product of two triangle edges has length twice the
    /// triangle area, so summing raw cross products is the area weighting.
    /// Vertices without a non-degenerate adjacent triangle get a zero normal.
    pub fn generate_normals(&mut self) {
        let mut normals = vec![Vector3::zeros(); self.positions.len()];
        for [a, b, c] in self.triangles() {
            let (pa, pb, pc) = (self.positions[a], self.positions[b], self.positions[c]);
            let face = (pb - pa).cross(&(pc - pa));
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        let eps = tolerance();
        for n in &mut normals {
            *n = n.try_normalize(eps).unwrap_or_else(Vector3::zeros);
        }
        self.normals = normals;
    }
}
