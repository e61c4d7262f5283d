//! Serial implementation of field sampling

use super::{SampleParams, sample_layer};
use crate::float_types::Real;
use crate::grid::Grid3;
use crate::mesher::sampling::traits::SamplingOps;
use crate::spatial_hash::SpatialHash;
use nalgebra::Point3;

/// Serial implementation of `SamplingOps`
pub struct SerialSamplingOps;

impl SerialSamplingOps {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for SerialSamplingOps {
    fn default() -> Self {
        Self::new()
    }
}

impl SamplingOps for SerialSamplingOps {
    fn sample(
        &self,
        field: &mut Grid3<Real>,
        hash: &SpatialHash<usize>,
        particles: &[Point3<Real>],
        params: &SampleParams,
    ) {
        let size = field.size();
        let layer_len = field.layer_len();
        if layer_len == 0 {
            return;
        }
        field
            .as_mut_slice()
            .chunks_mut(layer_len)
            .enumerate()
            .for_each(|(z, layer)| sample_layer(layer, z, size, hash, particles, params));
    }
}
