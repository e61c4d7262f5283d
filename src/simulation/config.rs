//! Pipeline configuration.

use crate::float_types::Real;
use crate::mesher::MesherSettings;
use nalgebra::{Point3, Vector3};
use std::path::PathBuf;
use std::time::Duration;

/// Placement and resolution of the solver grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    /// World position of cell `(0, 0, 0)`'s minimum corner
    pub offset: Point3<Real>,
    pub cell_size: Real,
    /// Cells per axis
    pub size: Vector3<usize>,
}

impl GridGeometry {
    pub const fn new(offset: Point3<Real>, cell_size: Real, size: Vector3<usize>) -> Self {
        Self {
            offset,
            cell_size,
            size,
        }
    }

    /// A grid covering `[min, max]` with one cell of padding on every side.
    pub fn enclosing(min: Point3<Real>, max: Point3<Real>, cell_size: Real) -> Self {
        let cells = ((max - min) / cell_size).map(|c| c.ceil().max(0.0) as usize);
        Self {
            offset: min - Vector3::repeat(cell_size),
            cell_size,
            size: cells.add_scalar(2),
        }
    }

    pub fn min_corner(&self) -> Point3<Real> {
        self.offset
    }

    pub fn max_corner(&self) -> Point3<Real> {
        self.offset + self.size.map(|c| c as Real) * self.cell_size
    }

    pub fn center(&self) -> Point3<Real> {
        self.offset + self.size.map(|c| c as Real) * (0.5 * self.cell_size)
    }
}

/// How the solver is filled after every reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidSetup {
    /// Axis (0 = x, 1 = y, 2 = z) the water level is measured along
    pub fill_axis: usize,
    /// Fraction of the grid, along `fill_axis`, that starts filled
    pub water_level: Real,
}

impl Default for FluidSetup {
    fn default() -> Self {
        Self {
            fill_axis: 0,
            water_level: 0.35,
        }
    }
}

impl FluidSetup {
    /// World-space coordinate along `fill_axis` below which the basin is filled.
    pub fn fill_height(&self, grid: &GridGeometry) -> Real {
        let axis = self.fill_axis.min(2);
        grid.offset[axis] + grid.size[axis] as Real * grid.cell_size * self.water_level
    }
}

/// Everything [`FluidPipeline`](super::FluidPipeline) needs besides the solver
/// and the room mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Frame length passed to [`FluidSolver::update`](super::FluidSolver::update)
    pub dt: Real,
    pub mesher: MesherSettings,
    pub setup: FluidSetup,
    /// How long the paused simulation thread sleeps between control checks
    pub idle_wait: Duration,
    /// Write every published mesh to this OBJ file
    pub autosave_obj: Option<PathBuf>,
    /// Start with the simulation paused; the initial reset still runs
    pub start_paused: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            mesher: MesherSettings::default(),
            setup: FluidSetup::default(),
            idle_wait: Duration::from_millis(5),
            autosave_obj: None,
            start_paused: false,
        }
    }
}
