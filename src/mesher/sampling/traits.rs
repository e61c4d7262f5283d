//! Traits defining scalar field sampling for dependency inversion

use super::SampleParams;
use crate::float_types::Real;
use crate::grid::Grid3;
use crate::spatial_hash::SpatialHash;
use nalgebra::Point3;

/// Fills a vertex-centered scalar field from particles bucketed in a spatial hash.
pub trait SamplingOps {
    /// Overwrite every sample of `field`. `hash` stores indices into `particles`.
    fn sample(
        &self,
        field: &mut Grid3<Real>,
        hash: &SpatialHash<usize>,
        particles: &[Point3<Real>],
        params: &SampleParams,
    );
}
