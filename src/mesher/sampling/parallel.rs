//! Parallel implementation of field sampling

use super::{SampleParams, sample_layer};
use crate::float_types::Real;
use crate::grid::Grid3;
use crate::mesher::sampling::traits::SamplingOps;
use crate::spatial_hash::SpatialHash;
use nalgebra::Point3;
use rayon::prelude::*;

/// Parallel implementation of `SamplingOps`.
///
/// Each z-layer of the field is an independent task: a vertex only reads the
/// hash and writes its own sample.
pub struct ParallelSamplingOps;

impl ParallelSamplingOps {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for ParallelSamplingOps {
    fn default() -> Self {
        Self::new()
    }
}

impl SamplingOps for ParallelSamplingOps {
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
            .par_chunks_mut(layer_len)
            .enumerate()
            .for_each(|(z, layer)| sample_layer(layer, z, size, hash, particles, params));
    }
}
