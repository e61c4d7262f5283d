//! Marching Cubes over a vertex-centered scalar field, with vertex sharing.
//!
//! Cubes are visited x-fastest, then y, then z. Every edge crossing is
//! interpolated exactly once: the cube that visits an edge first creates the
//! vertex and records its index in one of three layer caches, and every later
//! cube touching the same edge reads the index back. The caches are only
//! consulted for edges the current cube actually crosses, and a crossed edge is
//! crossed for every cube sharing it, so the cached index is always fresh.
//!
//! Cube-local edge ownership (`(x, y, z)` is the cube's minimum corner):
//!
//! | edges      | lie on            | created by                 | cached in            |
//! |------------|-------------------|----------------------------|----------------------|
//! | 0, 1, 2, 3 | bottom face (`z`) | the layer below, or `z==0` | `prev` (`mid0/mid3`) |
//! | 4, 5, 6, 7 | top face (`z+1`)  | this layer                 | `cur` (`mid0/mid3`)  |
//! | 8, 9, 10, 11 | vertical        | this layer                 | `mid8`               |
//!
//! `prev` and `cur` are swapped after every z-layer, so the top face of one
//! layer becomes the bottom face of the next.

use super::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, END, TRI_TABLE};
use crate::float_types::Real;
use crate::grid::{Grid2, Grid3, GridFrame};
use crate::mesh::SurfaceMesh;
use nalgebra::{Point3, Vector2, Vector3};

/// Indices of the vertices on the two edges of a layer vertex that run along
/// `+x` (`mid0`) and `+y` (`mid3`).
#[derive(Debug, Clone, Copy, Default)]
struct EdgeMidpoints {
    mid0: usize,
    mid3: usize,
}

/// Extract the zero level set of `field`, whose sample `(x, y, z)` sits at
/// `frame.vertex_position((x, y, z))`.
///
/// A corner is inside when its value is negative. Triangles follow the winding
/// of the classic lookup tables, so [`SurfaceMesh::generate_normals`] yields
/// normals pointing toward the negative side. A field with fewer than two
/// samples along any axis produces an empty mesh.
pub fn marching_cubes(field: &Grid3<Real>, frame: &GridFrame) -> SurfaceMesh {
    let size = field.size();
    let mut positions: Vec<Point3<Real>> = Vec::new();
    let mut indices: Vec<usize> = Vec::new();
    if size.iter().any(|&s| s < 2) {
        return SurfaceMesh::from_parts(positions, indices);
    }

    let layer_size = Vector2::new(size.x, size.y);
    let mut prev = Grid2::new(layer_size, EdgeMidpoints::default());
    let mut cur = Grid2::new(layer_size, EdgeMidpoints::default());
    let mut mid8 = Grid2::new(layer_size, 0usize);

    for z in 0..size.z - 1 {
        for y in 0..size.y - 1 {
            for x in 0..size.x - 1 {
                let cell = Vector3::new(x, y, z);
                let mut values = [0.0; 8];
                let mut occupation = 0usize;
                for (i, offset) in CORNER_OFFSETS.iter().enumerate() {
                    let value = field[cell + Vector3::from(*offset)];
                    values[i] = value;
                    if value < 0.0 {
                        occupation |= 1 << i;
                    }
                }

                let edge_list = EDGE_TABLE[occupation];
                if edge_list == 0 {
                    continue;
                }
                let crossed = |edge: usize| edge_list & (1 << edge) != 0;
                let mut add = |edge: usize| -> usize {
                    let [a, b] = EDGE_CORNERS[edge];
                    let (v1, v2) = (values[a], values[b]);
                    let t = v1 / (v1 - v2);
                    let ca = (cell + Vector3::from(CORNER_OFFSETS[a])).map(|c| c as Real);
                    let cb = (cell + Vector3::from(CORNER_OFFSETS[b])).map(|c| c as Real);
                    positions.push(frame.offset + ca.lerp(&cb, t) * frame.cell_size);
                    positions.len() - 1
                };

                let mut ids = [0usize; 12];

                if z == 0 {
                    if y == 0 && crossed(0) {
                        prev[[x, y]].mid0 = add(0);
                    }
                    if crossed(1) {
                        prev[[x + 1, y]].mid3 = add(1);
                    }
                    if crossed(2) {
                        prev[[x, y + 1]].mid0 = add(2);
                    }
                    if x == 0 && crossed(3) {
                        prev[[x, y]].mid3 = add(3);
                    }
                }
                ids[0] = prev[[x, y]].mid0;
                ids[1] = prev[[x + 1, y]].mid3;
                ids[2] = prev[[x, y + 1]].mid0;
                ids[3] = prev[[x, y]].mid3;

                if y == 0 && crossed(4) {
                    cur[[x, y]].mid0 = add(4);
                }
                ids[4] = cur[[x, y]].mid0;
                if x == 0 && crossed(7) {
                    cur[[x, y]].mid3 = add(7);
                }
                ids[7] = cur[[x, y]].mid3;

                if x == 0 && y == 0 && crossed(8) {
                    mid8[[x, y]] = add(8);
                }
                ids[8] = mid8[[x, y]];
                if y == 0 && crossed(9) {
                    mid8[[x + 1, y]] = add(9);
                }
                ids[9] = mid8[[x + 1, y]];
                if x == 0 && crossed(11) {
                    mid8[[x, y + 1]] = add(11);
                }
                ids[11] = mid8[[x, y + 1]];

                for edge in [5, 6, 10] {
                    if crossed(edge) {
                        ids[edge] = add(edge);
                    }
                }
                cur[[x + 1, y]].mid3 = ids[5];
                cur[[x, y + 1]].mid0 = ids[6];
                mid8[[x + 1, y + 1]] = ids[10];

                for tri in TRI_TABLE[occupation].chunks_exact(3) {
                    if tri[0] == END {
                        break;
                    }
                    indices.extend(tri.iter().map(|&edge| ids[edge as usize]));
                }
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    SurfaceMesh::from_parts(positions, indices)
}
