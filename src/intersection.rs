//! Exact triangle / axis-aligned box overlap.

use crate::float_types::{Real, tolerance};
use nalgebra::{Point3, Vector3};

/// Separating axis test between the box `center ± half_extents` and the
/// triangle `(p1, p2, p3)`.
///
/// Thirteen candidate axes are tested: the three box face normals, the triangle
/// normal and the nine cross products of box axes with triangle edges. Touching
/// counts as overlapping. Axes that degenerate (parallel edges, zero-area
/// triangles) are skipped, so a degenerate triangle overlaps exactly the boxes
/// its segment or point touches.
pub fn triangle_aabb_overlap(
    center: &Point3<Real>,
    half_extents: &Vector3<Real>,
    p1: &Point3<Real>,
    p2: &Point3<Real>,
    p3: &Point3<Real>,
) -> bool {
    let v = [p1 - center, p2 - center, p3 - center];
    let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];

    let separated_on = |axis: &Vector3<Real>| -> bool {
        let (mut min, mut max) = (Real::MAX, Real::MIN);
        for vertex in &v {
            let d = vertex.dot(axis);
            min = min.min(d);
            max = max.max(d);
        }
        let radius = half_extents.x * axis.x.abs()
            + half_extents.y * axis.y.abs()
            + half_extents.z * axis.z.abs();
        min > radius || max < -radius
    };

    // Box face normals reduce to an interval check.
    for axis in [Vector3::x(), Vector3::y(), Vector3::z()] {
        if separated_on(&axis) {
            return false;
        }
    }

    let eps = tolerance();
    let normal = edges[0].cross(&edges[1]);
    if normal.norm_squared() > eps * eps && separated_on(&normal) {
        return false;
    }

    for box_axis in [Vector3::x(), Vector3::y(), Vector3::z()] {
        for edge in &edges {
            let axis = box_axis.cross(edge);
            if axis.norm_squared() > eps * eps && separated_on(&axis) {
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> (Point3<Real>, Vector3<Real>) {
        (Point3::origin(), Vector3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn triangle_through_box_overlaps() {
        let (c, h) = unit_box();
        assert!(triangle_aabb_overlap(
            &c,
            &h,
            &Point3::new(-2.0, -2.0, 0.0),
            &Point3::new(2.0, -2.0, 0.0),
            &Point3::new(0.0, 2.0, 0.0),
        ));
    }

    #[test]
    fn triangle_beside_box_is_separated() {
        let (c, h) = unit_box();
        assert!(!triangle_aabb_overlap(
            &c,
            &h,
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
            &Point3::new(1.0, 1.0, 0.0),
        ));
    }

    #[test]
    fn diagonal_plane_misses_the_corner() {
        // Bounding boxes overlap, but the triangle's plane x + y + z = 2 passes
        // outside the corner (0.5, 0.5, 0.5).
        let (c, h) = unit_box();
        assert!(!triangle_aabb_overlap(
            &c,
            &h,
            &Point3::new(2.0, 0.0, 0.0),
            &Point3::new(0.0, 2.0, 0.0),
            &Point3::new(0.0, 0.0, 2.0),
        ));
        assert!(triangle_aabb_overlap(
            &c,
            &h,
            &Point3::new(1.4, 0.0, 0.0),
            &Point3::new(0.0, 1.4, 0.0),
            &Point3::new(0.0, 0.0, 1.4),
        ));
    }

    #[test]
    fn degenerate_triangle_behaves_like_a_segment() {
        let (c, h) = unit_box();
        let a = Point3::new(-1.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        assert!(triangle_aabb_overlap(&c, &h, &a, &b, &b));
        let far = Point3::new(3.0, 3.0, 3.0);
        assert!(!triangle_aabb_overlap(&c, &h, &far, &far, &far));
    }
}
