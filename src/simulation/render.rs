//! Handing finished meshes to a renderer.

use crate::mesh::SurfaceMesh;
use std::sync::{Arc, Mutex, PoisonError};

/// Receives every mesh the pipeline publishes, while the pipeline holds its
/// mesh lock. Implementations must not block on the pipeline.
pub trait MeshSink: Send {
    fn update(&mut self, mesh: &SurfaceMesh);
}

/// GPU-ready copy of a mesh: `f32` positions and normals, `u32` indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderBuffer {
    pub positions: Vec<[f32; 3]>,
    /// One per position; zero where the mesh has no normal
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    /// Number of meshes received so far
    pub updates: u64,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share the buffer between the pipeline and a renderer.
    pub fn shared() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

impl MeshSink for RenderBuffer {
    #[allow(clippy::unnecessary_cast)]
    fn update(&mut self, mesh: &SurfaceMesh) {
        log::trace!(
            "render buffer before update: {} vertices, {} indices",
            self.positions.len(),
            self.indices.len()
        );
        self.positions.clear();
        self.normals.clear();
        self.indices.clear();

        self.positions
            .extend(mesh.positions.iter().map(|p| [p.x as f32, p.y as f32, p.z as f32]));
        self.normals.extend((0..mesh.positions.len()).map(|i| {
            mesh.normals
                .get(i)
                .map_or([0.0; 3], |n| [n.x as f32, n.y as f32, n.z as f32])
        }));
        self.indices.extend(mesh.indices.iter().map(|&i| i as u32));
        self.updates += 1;
    }
}

impl MeshSink for Arc<Mutex<RenderBuffer>> {
    fn update(&mut self, mesh: &SurfaceMesh) {
        self.lock().unwrap_or_else(PoisonError::into_inner).update(mesh);
    }
}
