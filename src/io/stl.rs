use crate::float_types::Real;
use crate::mesh::SurfaceMesh;
use core2::io::Cursor;
use nalgebra::{Point3, Vector3};
use stl_io;

/// Facet normal of a triangle, zero for degenerate faces.
fn facet_normal(tri: &[Point3<Real>; 3]) -> Vector3<Real> {
    (tri[1] - tri[0])
        .cross(&(tri[2] - tri[0]))
        .try_normalize(crate::float_types::tolerance())
        .unwrap_or_else(Vector3::zeros)
}

fn facets(mesh: &SurfaceMesh) -> impl Iterator<Item = [Point3<Real>; 3]> + '_ {
    mesh.triangles().map(|t| t.map(|i| mesh.positions[i]))
}

/// Export to ASCII STL
/// Convert a mesh to an **ASCII STL** string with the given `name`.
///
/// ```rust
/// # use fluidsurf::mesh::SurfaceMesh;
/// # use nalgebra::Point3;
/// let mesh = SurfaceMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
/// let text = mesh.to_stl_ascii("room");
/// assert!(text.starts_with("solid room"));
/// ```
pub fn to_stl_ascii(mesh: &SurfaceMesh, name: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("solid {name}\n"));

    for tri in facets(mesh) {
        let n = facet_normal(&tri);
        out.push_str(&format!("  facet normal {:.6} {:.6} {:.6}\n", n.x, n.y, n.z));
        out.push_str("    outer loop\n");
        for p in &tri {
            out.push_str(&format!("      vertex {:.6} {:.6} {:.6}\n", p.x, p.y, p.z));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }

    out.push_str(&format!("endsolid {name}\n"));
    out
}

/// Export to BINARY STL (returns `Vec<u8>`)
///
/// The name is not stored; binary STL headers are left blank.
pub fn to_stl_binary(mesh: &SurfaceMesh, _name: &str) -> std::io::Result<Vec<u8>> {
    use stl_io::{Normal, Triangle, Vertex, write_stl};

    #[allow(clippy::unnecessary_cast)]
    let triangles: Vec<Triangle> = facets(mesh)
        .map(|tri| {
            let n = facet_normal(&tri);
            Triangle {
                normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: tri.map(|p| Vertex::new([p.x as f32, p.y as f32, p.z as f32])),
            }
        })
        .collect();

    let mut cursor = Cursor::new(Vec::new());
    write_stl(&mut cursor, triangles.iter())?;
    Ok(cursor.into_inner())
}

impl SurfaceMesh {
    pub fn to_stl_ascii(&self, name: &str) -> String {
        self::to_stl_ascii(self, name)
    }
    pub fn to_stl_binary(&self, name: &str) -> std::io::Result<Vec<u8>> {
        self::to_stl_binary(self, name)
    }
}
