//! Edge topology analysis for `SurfaceMesh`

use super::SurfaceMesh;
use hashbrown::{HashMap, HashSet};

/// Counts describing how the triangles of a mesh share their edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeAnalysis {
    /// Number of distinct undirected edges
    pub edges: usize,
    /// Edges referenced by exactly one triangle (0 for closed surfaces)
    pub boundary_edges: usize,
    /// Edges referenced by more than two triangles
    pub non_manifold_edges: usize,
    /// Vertices no triangle refers to
    pub unreferenced_vertices: usize,
    /// Distinct vertex positions shared by more than one vertex index
    pub duplicate_positions: usize,
}

impl EdgeAnalysis {
    /// Every edge is shared by exactly two triangles.
    pub const fn is_closed(&self) -> bool {
        self.boundary_edges == 0 && self.non_manifold_edges == 0
    }
}

impl SurfaceMesh {
    /// Count boundary and non-manifold edges, unreferenced vertices and
    /// duplicated vertex positions.
    pub fn analyze_edges(&self) -> EdgeAnalysis {
        let mut edge_faces: HashMap<(usize, usize), usize> = HashMap::new();
        let mut referenced = vec![false; self.positions.len()];

        for tri in self.triangles() {
            for i in 0..3 {
                let (v1, v2) = (tri[i], tri[(i + 1) % 3]);
                // Canonical edge representation (smaller index first)
                let edge = if v1 < v2 { (v1, v2) } else { (v2, v1) };
                *edge_faces.entry(edge).or_default() += 1;
                if let Some(r) = referenced.get_mut(v1) {
                    *r = true;
                }
            }
        }

        let mut boundary_edges = 0;
        let mut non_manifold_edges = 0;
        for &count in edge_faces.values() {
            match count {
                1 => boundary_edges += 1,
                2 => {},
                _ => non_manifold_edges += 1,
            }
        }

        let mut seen = HashSet::with_capacity(self.positions.len());
        let mut duplicates = HashSet::new();
        for p in &self.positions {
            let key = [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()];
            if !seen.insert(key) {
                duplicates.insert(key);
            }
        }

        EdgeAnalysis {
            edges: edge_faces.len(),
            boundary_edges,
            non_manifold_edges,
            unreferenced_vertices: referenced.iter().filter(|&&r| !r).count(),
            duplicate_positions: duplicates.len(),
        }
    }
}
