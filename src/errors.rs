//! Voxelization and pipeline errors

use crate::float_types::Real;

/// Everything that can go wrong while building an obstacle classification grid.
///
/// Geometry problems (degenerate triangles, empty particle sets) are never errors;
/// they simply contribute nothing. The variants here are configuration mistakes
/// made by the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VoxelizeError {
    /// (SeedOnSurface) The flood fill seed cell `(0, 0, 0)` is a surface cell,
    /// meaning the mesh touches the grid boundary. The grid is left untouched.
    #[error("(SeedOnSurface) flood fill seed cell (0, 0, 0) lies on the mesh surface")]
    SeedOnSurface,
    /// (EmptyGrid) The classification grid has no cells
    #[error("(EmptyGrid) the voxel grid has no cells")]
    EmptyGrid,
    /// (InvalidCellSize) Cell size must be finite and strictly positive
    #[error("(InvalidCellSize) cell size {0} must be finite and positive")]
    InvalidCellSize(Real),
    /// (EmptyMesh) The obstacle mesh has no vertices to bound
    #[error("(EmptyMesh) the obstacle mesh has no vertices")]
    EmptyMesh,
}

/// Failures while starting a [`FluidPipeline`](crate::simulation::FluidPipeline).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The room mesh could not be turned into an obstacle
    #[error("room obstacle: {0}")]
    Obstacle(#[from] VoxelizeError),
    /// The solver grid cannot hold a simulation
    #[error("(EmptyGrid) solver grid {0:?} has no cells")]
    EmptyGrid([usize; 3]),
    /// A worker thread could not be spawned
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}
