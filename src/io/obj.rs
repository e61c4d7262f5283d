//! Wavefront OBJ export

use super::IoError;
use crate::mesh::SurfaceMesh;
use std::io::Write;
use std::path::Path;

/// Write `mesh` as Wavefront OBJ: one `v` line per position, one `vn` line per
/// normal when the mesh has a complete normal set, then one `f` line per
/// triangle with 1-based indices.
pub fn write_obj<W: Write>(mesh: &SurfaceMesh, out: &mut W) -> Result<(), IoError> {
    if !mesh.is_structurally_complete() {
        return Err(IoError::MalformedMesh(format!(
            "{} positions, {} normals, {} indices",
            mesh.positions.len(),
            mesh.normals.len(),
            mesh.indices.len()
        )));
    }
    for p in &mesh.positions {
        writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
    }
    let with_normals = !mesh.normals.is_empty();
    for n in &mesh.normals {
        writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
    }
    for [a, b, c] in mesh.triangles() {
        let (a, b, c) = (a + 1, b + 1, c + 1);
        if with_normals {
            writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
        } else {
            writeln!(out, "f {a} {b} {c}")?;
        }
    }
    Ok(())
}

impl SurfaceMesh {
    /// Render the mesh as an OBJ document.
    pub fn to_obj(&self) -> Result<String, IoError> {
        let mut out = Vec::new();
        write_obj(self, &mut out)?;
        String::from_utf8(out).map_err(|e| IoError::MalformedMesh(e.to_string()))
    }

    /// Write the mesh to an OBJ file at `path`.
    pub fn save_obj(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        super::write_file(path.as_ref(), |out| write_obj(self, out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn obj_lists_vertices_then_faces() {
        let mesh = SurfaceMesh::from_parts(
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.5, 0.0)],
            vec![0, 1, 2],
        );
        let text = mesh.to_obj().expect("valid mesh");
        assert_eq!(text, "v 0 0 0\nv 1 0 0\nv 0 1.5 0\nf 1 2 3\n");
    }

    #[test]
    fn obj_references_normals_when_present() {
        let mut mesh = SurfaceMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        mesh.generate_normals();
        let text = mesh.to_obj().expect("valid mesh");
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 8);
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 8);
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 12);
        assert!(text.contains("f 1//1 4//4 3//3"));
    }

    #[test]
    fn malformed_mesh_is_rejected() {
        let mesh = SurfaceMesh::from_parts(vec![Point3::origin()], vec![0, 1, 2]);
        assert!(matches!(mesh.to_obj(), Err(IoError::MalformedMesh(_))));
    }
}
