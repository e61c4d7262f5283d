//! Closed primitive meshes, mostly useful as obstacles.

use super::SurfaceMesh;
use crate::float_types::Real;
use nalgebra::Point3;

impl SurfaceMesh {
    /// Axis-aligned box spanning `min..max`, 8 shared vertices and 12
    /// outward-facing (counter-clockwise) triangles.
    pub fn cuboid(min: Point3<Real>, max: Point3<Real>) -> Self {
        let positions = vec![
            Point3::new(min.x, min.y, min.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(min.x, max.y, min.z),
            Point3::new(min.x, min.y, max.z),
            Point3::new(max.x, min.y, max.z),
            Point3::new(max.x, max.y, max.z),
            Point3::new(min.x, max.y, max.z),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 3, 2,  0, 2, 1, // -z
            4, 5, 6,  4, 6, 7, // +z
            0, 1, 5,  0, 5, 4, // -y
            3, 7, 6,  3, 6, 2, // +y
            0, 4, 7,  0, 7, 3, // -x
            1, 2, 6,  1, 6, 5, // +x
        ];
        Self::from_parts(positions, indices)
    }

    /// Regular octahedron with the given center and vertex distance.
    pub fn octahedron(center: Point3<Real>, radius: Real) -> Self {
        let positions = vec![
            center + nalgebra::Vector3::new(radius, 0.0, 0.0),
            center + nalgebra::Vector3::new(-radius, 0.0, 0.0),
            center + nalgebra::Vector3::new(0.0, radius, 0.0),
            center + nalgebra::Vector3::new(0.0, -radius, 0.0),
            center + nalgebra::Vector3::new(0.0, 0.0, radius),
            center + nalgebra::Vector3::new(0.0, 0.0, -radius),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 4,  2, 1, 4,  1, 3, 4,  3, 0, 4,
            2, 0, 5,  1, 2, 5,  3, 1, 5,  0, 3, 5,
        ];
        Self::from_parts(positions, indices)
    }
}
