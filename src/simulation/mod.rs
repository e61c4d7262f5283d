//! Concurrent simulation and surface reconstruction.
//!
//! A [`FluidPipeline`] owns two threads: one drives a [`FluidSolver`] and
//! publishes particle snapshots, the other turns the latest snapshot into a
//! [`SurfaceMesh`](crate::mesh::SurfaceMesh) with a [`SurfaceReconstructor`].

pub mod config;
pub mod pipeline;
pub mod reconstruct;
pub mod render;
pub mod semaphore;
pub mod signal;
pub mod solver;

pub use config::{FluidSetup, GridGeometry, PipelineConfig};
pub use pipeline::FluidPipeline;
pub use reconstruct::{ParticleMesher, SurfaceReconstructor};
pub use render::{MeshSink, RenderBuffer};
pub use semaphore::Semaphore;
pub use signal::FrameSignal;
pub use solver::{FluidSolver, Particle};
