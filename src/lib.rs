//! Obstacle voxelization and liquid **surface reconstruction** for grid based
//! particle simulations.
//!
//! - [`voxelizer`] classifies the cells of a grid as *surface*, *interior* or
//!   *exterior* with respect to a closed triangle mesh.
//! - [`obstacle`] voxelizes a static room mesh onto cells that coincide exactly
//!   with a simulation grid.
//! - [`mesher`] samples a kernel-weighted implicit field from a particle cloud
//!   and extracts its zero level set with Marching Cubes.
//! - [`simulation`] runs a solver and the mesher on two threads, exchanging
//!   particle snapshots and finished meshes under two locks.
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//! - **parallel**: use rayon to sample the implicit field
//! - [**stl-io**](https://en.wikipedia.org/wiki/STL_(file_format)): `.stl` export
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod errors;
pub mod float_types;
pub mod grid;
pub mod intersection;
pub mod io;
pub mod mesh;
pub mod mesher;
pub mod obstacle;
pub mod simulation;
pub mod spatial_hash;
pub mod voxelizer;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use errors::{PipelineError, VoxelizeError};
pub use float_types::Real;
pub use mesh::SurfaceMesh;
pub use mesher::{Mesher, MesherSettings};
pub use obstacle::Obstacle;
pub use simulation::{FluidPipeline, FluidSolver, Particle, PipelineConfig};
pub use voxelizer::{CellType, Voxelizer};
