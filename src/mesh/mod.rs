//! Mesh module - CPU-side triangle geometry
//!
//! This module provides:
//! - `MeshData`: vertex positions plus a triangle index list
//! - `generate`: procedural geometry for every built-in primitive
//! - `triangulate`: fan triangulation of packed polygon faces
//! - `convert`: scene face data / OBJ files to meshes and models

pub mod convert;
pub mod generate;
pub mod triangulate;

use nalgebra::Point3;

pub use convert::{ImportError, ImportOptions, SceneGeometry, SceneMesh};
pub use triangulate::{count_triangles, triangulate, triangulate_bounded, Faces, Triangulation};

/// Triangle mesh: positions plus three indices per triangle
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions
    pub vertices: Vec<Point3<f32>>,
    /// Triangle list, three entries per triangle
    pub indices: Vec<u32>,
    /// Name of the mesh
    pub name: String,
}

impl MeshData {
    /// Create a new empty mesh
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            name: name.into(),
        }
    }

    /// Create a mesh from vertices and a triangle list
    pub fn from_data(
        vertices: Vec<Point3<f32>>,
        indices: Vec<u32>,
        name: impl Into<String>,
    ) -> Self {
        debug_assert!(indices.len() % 3 == 0, "index list is not a triangle list");
        Self {
            vertices,
            indices,
            name: name.into(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// A mesh with no vertices or no triangles cannot be drawn
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.len() < 3
    }

    /// Iterate over triangles as index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Unique undirected edges of all triangles, sorted
    pub fn edges(&self) -> Vec<(u32, u32)> {
        let mut edges = Vec::with_capacity(self.indices.len());
        for [a, b, c] in self.triangles() {
            for (v1, v2) in [(a, b), (b, c), (c, a)] {
                // Avoid duplicate edges by storing (low, high)
                if v1 < v2 {
                    edges.push((v1, v2));
                } else if v1 > v2 {
                    edges.push((v2, v1));
                }
            }
        }
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// Get bounding box of mesh
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        if self.vertices.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = self.vertices[0];
        let mut max = self.vertices[0];

        for v in &self.vertices {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }

        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshData {
        MeshData::from_data(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
            "quad",
        )
    }

    #[test]
    fn test_counts() {
        let mesh = quad();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(!mesh.is_empty());
        assert!(MeshData::new("empty").is_empty());
    }

    #[test]
    fn test_edges_are_unique() {
        // 4 outer edges plus the shared diagonal
        assert_eq!(quad().edges(), vec![(0, 1), (0, 2), (0, 3), (1, 2), (2, 3)]);
    }

    #[test]
    fn test_bounds() {
        let (min, max) = quad().bounds();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 0.0));
    }
}
