//! Scalar field sampling from particles
//!
//! The field is sampled at every grid vertex with the same kernel-weighted
//! formula; the serial and parallel implementations only differ in how the
//! z-layers of the field are scheduled.

pub mod traits;

pub mod serial;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use traits::SamplingOps;

pub use serial::SerialSamplingOps;

#[cfg(feature = "parallel")]
pub use parallel::ParallelSamplingOps;

use crate::float_types::Real;
use crate::grid::GridFrame;
use crate::spatial_hash::SpatialHash;
use nalgebra::{Point3, Vector3};

/// Field value at vertices with no particle in range: positive, i.e. outside.
pub const EMPTY_VALUE: Real = 1.0;

/// Inputs shared by every field sample of one reconstruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleParams {
    /// Placement of the field's vertex lattice
    pub frame: GridFrame,
    /// Kernel support radius, in world units
    pub particle_extent: Real,
    /// Hash cells searched around a vertex: `v - cell_radius ..= v + cell_radius - 1`
    pub cell_radius: usize,
    /// Radius assigned to every particle
    pub particle_radius: Real,
}

/// Smoothing kernel `(1 - s)^3` for `s < 1`, zero beyond.
/// `sqr_dist` is the squared distance divided by the squared kernel extent.
#[inline]
pub fn kernel(sqr_dist: Real) -> Real {
    let t = 1.0 - sqr_dist;
    if t > 0.0 { t * t * t } else { 0.0 }
}

/// Sample the field at grid vertex `vertex`.
///
/// The value is the distance from the vertex to the kernel-weighted centroid
/// of the nearby particles minus the weighted particle radius, so it is
/// negative inside the fluid. Vertices whose neighborhood holds no particle,
/// or whose particles all carry zero weight, get [`EMPTY_VALUE`].
pub fn sample_vertex(
    vertex: Vector3<usize>,
    hash: &SpatialHash<usize>,
    particles: &[Point3<Real>],
    params: &SampleParams,
) -> Real {
    let grid_pos = params.frame.vertex_position(vertex);
    let inv_extent_sq = 1.0 / (params.particle_extent * params.particle_extent);

    let mut tot_weight: Real = 0.0;
    let mut tot_rad: Real = 0.0;
    let mut tot_pos = Vector3::zeros();
    hash.for_all_nearby_objects(
        vertex,
        params.cell_radius,
        params.cell_radius.saturating_sub(1),
        |&i| {
            let p = particles[i];
            let w = kernel((p - grid_pos).norm_squared() * inv_extent_sq);
            tot_weight += w;
            tot_rad += w * params.particle_radius;
            tot_pos += p.coords * w;
        },
    );

    if tot_weight > 0.0 {
        let centroid = Point3::from(tot_pos / tot_weight);
        (centroid - grid_pos).norm() - tot_rad / tot_weight
    } else {
        EMPTY_VALUE
    }
}

/// Fill one z-layer of the field (`layer.len() == size.x * size.y`).
pub(crate) fn sample_layer(
    layer: &mut [Real],
    z: usize,
    size: Vector3<usize>,
    hash: &SpatialHash<usize>,
    particles: &[Point3<Real>],
    params: &SampleParams,
) {
    for (i, value) in layer.iter_mut().enumerate() {
        let vertex = Vector3::new(i % size.x, i / size.x, z);
        *value = sample_vertex(vertex, hash, particles, params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid3;

    fn params() -> SampleParams {
        SampleParams {
            frame: GridFrame::new(Point3::origin(), 0.5),
            particle_extent: 2.0,
            cell_radius: 3,
            particle_radius: 0.5,
        }
    }

    #[test]
    fn kernel_has_compact_support() {
        assert_eq!(kernel(0.0), 1.0);
        assert_eq!(kernel(1.0), 0.0);
        assert_eq!(kernel(4.0), 0.0);
        assert!((kernel(0.5) - 0.125).abs() < 1e-12);
    }

    #[test]
    fn single_particle_field_is_a_sphere() {
        let params = params();
        let particles = vec![Point3::new(2.1, 2.1, 2.1)];
        let mut hash = SpatialHash::new(Vector3::new(8, 8, 8));
        hash.add_object_at(Vector3::new(4, 4, 4), 0);

        // With one particle the centroid is the particle itself.
        let v = sample_vertex(Vector3::new(4, 4, 4), &hash, &particles, &params);
        let expected = (Point3::new(2.0, 2.0, 2.0) - particles[0]).norm() - 0.5;
        assert!((v - expected).abs() < 1e-9, "{v} vs {expected}");
        assert!(v < 0.0);

        // Far vertices see no particle at all.
        let far = sample_vertex(Vector3::new(0, 0, 0), &hash, &particles, &params);
        assert_eq!(far, EMPTY_VALUE);
    }

    #[test]
    fn zero_weight_neighborhood_is_empty() {
        let params = SampleParams {
            particle_extent: 0.1,
            ..params()
        };
        let particles = vec![Point3::new(2.45, 2.45, 2.45)];
        let mut hash = SpatialHash::new(Vector3::new(8, 8, 8));
        hash.add_object_at(Vector3::new(4, 4, 4), 0);
        let v = sample_vertex(Vector3::new(3, 3, 3), &hash, &particles, &params);
        assert_eq!(v, EMPTY_VALUE);
    }

    #[test]
    fn serial_fill_matches_per_vertex_sampling() {
        let params = params();
        let particles = vec![Point3::new(1.3, 1.1, 0.9), Point3::new(1.6, 1.2, 1.0)];
        let mut hash = SpatialHash::new(Vector3::new(5, 5, 5));
        for (i, p) in particles.iter().enumerate() {
            let cell = params.frame.cell_of(p).map(|c| c as usize);
            assert!(hash.add_object_at(cell, i));
        }
        let mut field = Grid3::new(Vector3::new(6, 6, 6), 0.0);
        SerialSamplingOps::new().sample(&mut field, &hash, &particles, &params);
        for (v, &value) in field.iter() {
            assert_eq!(value, sample_vertex(v, &hash, &particles, &params));
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_fill_matches_serial() {
        let params = params();
        let particles: Vec<_> = (0..20)
            .map(|i| Point3::new(0.3 + 0.1 * i as Real, 1.2, 1.1 + 0.05 * i as Real))
            .collect();
        let mut hash = SpatialHash::new(Vector3::new(7, 7, 7));
        for (i, p) in particles.iter().enumerate() {
            hash.add_object_at(params.frame.cell_of(p).map(|c| c as usize), i);
        }
        let mut serial = Grid3::new(Vector3::new(8, 8, 8), 0.0);
        let mut parallel = serial.clone();
        SerialSamplingOps::new().sample(&mut serial, &hash, &particles, &params);
        ParallelSamplingOps::new().sample(&mut parallel, &hash, &particles, &params);
        assert_eq!(serial, parallel);
    }
}
