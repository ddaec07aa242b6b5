//! Scene geometry to renderable meshes
//!
//! Scene files hand over raw geometry: a flat `[x, y, z, x, y, z, ..]`
//! position buffer plus packed polygon faces (see [`super::triangulate`]).
//! [`SceneMesh::from_raw`] turns that into a triangle [`MeshData`], and
//! [`SceneMesh::load_model`] uploads it to a backend.
//!
//! OBJ files are read through `tobj` without triangulation, so the face
//! arities survive and go through the same fan triangulation as any other
//! scene data.

use std::io::Cursor;
use std::path::Path;

use log::{debug, info};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::triangulate::triangulate;
use super::MeshData;
use crate::render::{RenderBackend, RenderModel};

/// Errors that can occur while importing scene geometry
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse OBJ file: {0}")]
    Parse(String),

    #[error("No geometry found in file")]
    NoGeometry,

    #[error("Geometry has no faces")]
    NoFaces,
}

/// How imported geometry is adjusted before use
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Swap Y and Z for files authored with Z pointing up
    pub z_up_to_y_up: bool,
    /// Center on the origin and scale to fit a 2-unit cube
    pub normalize: bool,
    /// Swap the winding of every triangle
    pub reverse_winding: bool,
}

impl ImportOptions {
    /// Winding flag to triangulate with
    ///
    /// Swapping two axes mirrors the geometry, which flips every triangle,
    /// so the axis conversion toggles the requested winding.
    pub fn effective_reverse_winding(&self) -> bool {
        self.reverse_winding ^ self.z_up_to_y_up
    }
}

/// Triangle mesh built from raw scene data
#[derive(Clone, Debug, PartialEq)]
pub struct SceneMesh {
    mesh: MeshData,
}

impl SceneMesh {
    /// Convert a position buffer and packed faces into a triangle mesh
    ///
    /// Returns `None` when there are no vertices, when `positions` is not a
    /// multiple of three, or when the faces produce no triangles. Triangles
    /// referencing vertices past the end of the buffer are dropped.
    pub fn from_raw(
        positions: &[f32],
        faces: &[u32],
        n_faces: usize,
        reverse_winding: bool,
    ) -> Option<Self> {
        if positions.is_empty() || positions.len() % 3 != 0 {
            return None;
        }

        let vertices: Vec<Point3<f32>> = positions
            .chunks_exact(3)
            .map(|p| Point3::new(p[0], p[1], p[2]))
            .collect();

        let triangulation = triangulate(faces, n_faces, reverse_winding)?;
        let vertex_count = vertices.len() as u32;
        let mut indices = Vec::with_capacity(triangulation.indices().len());
        let mut dropped = 0usize;
        for triangle in triangulation.triangles() {
            if triangle.iter().all(|&i| i < vertex_count) {
                indices.extend_from_slice(&triangle);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            debug!("dropped {} triangles with out-of-range indices", dropped);
        }
        if indices.is_empty() {
            return None;
        }

        Some(Self {
            mesh: MeshData::from_data(vertices, indices, "scene"),
        })
    }

    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    pub fn into_mesh(self) -> MeshData {
        self.mesh
    }

    /// Upload the mesh and build a model from it
    pub fn load_model(&self, backend: &mut dyn RenderBackend) -> Option<RenderModel> {
        RenderModel::build(backend, &self.mesh)
    }
}

/// Raw geometry as it comes out of a scene file
///
/// Positions are flat `f32` triples, faces use the packed
/// `[count, indices..]` layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneGeometry {
    pub name: String,
    pub positions: Vec<f32>,
    pub faces: Vec<u32>,
    pub face_count: usize,
    pub reverse_winding: bool,
}

impl SceneGeometry {
    /// Load geometry from an OBJ file
    pub fn from_obj(path: impl AsRef<Path>, options: &ImportOptions) -> Result<Self, ImportError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let mut geometry = Self::parse_obj(&source, options)?;

        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            geometry.name = stem.to_string();
        }
        info!(
            "Imported {} ({} vertices, {} faces)",
            geometry.name,
            geometry.vertex_count(),
            geometry.face_count
        );
        Ok(geometry)
    }

    /// Parse OBJ source text. Material libraries are ignored.
    pub fn parse_obj(source: &str, options: &ImportOptions) -> Result<Self, ImportError> {
        let mut reader = Cursor::new(source.as_bytes());
        let (models, _materials) = tobj::load_obj_buf(
            &mut reader,
            &tobj::LoadOptions {
                triangulate: false,
                single_index: true,
                ..Default::default()
            },
            |_| Err(tobj::LoadError::OpenFileFailed),
        )
        .map_err(|e| ImportError::Parse(e.to_string()))?;

        if models.is_empty() {
            return Err(ImportError::NoGeometry);
        }

        // Combine all models into one buffer
        let mut geometry = Self {
            name: models[0].name.clone(),
            reverse_winding: options.effective_reverse_winding(),
            ..Default::default()
        };
        for model in &models {
            let mesh = &model.mesh;
            let offset = (geometry.positions.len() / 3) as u32;
            geometry.positions.extend_from_slice(&mesh.positions);

            // Empty arities means every face is a triangle
            let arities: Vec<u32> = if mesh.face_arities.is_empty() {
                vec![3; mesh.indices.len() / 3]
            } else {
                mesh.face_arities.clone()
            };

            let mut idx = 0;
            for arity in arities {
                let end = idx + arity as usize;
                let Some(face) = mesh.indices.get(idx..end) else {
                    break;
                };
                geometry.faces.push(arity);
                geometry.faces.extend(face.iter().map(|&i| i + offset));
                geometry.face_count += 1;
                idx = end;
            }
        }

        if geometry.positions.is_empty() {
            return Err(ImportError::NoGeometry);
        }
        if geometry.face_count == 0 {
            return Err(ImportError::NoFaces);
        }

        if options.z_up_to_y_up {
            for p in geometry.positions.chunks_exact_mut(3) {
                p.swap(1, 2);
            }
        }
        if options.normalize {
            geometry.normalize();
        }

        Ok(geometry)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Axis-aligned bounding box as (min, max)
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        let mut points = self.positions.chunks_exact(3);
        let Some(first) = points.next() else {
            return (Point3::origin(), Point3::origin());
        };

        let mut min = Point3::new(first[0], first[1], first[2]);
        let mut max = min;
        for p in points {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        (min, max)
    }

    /// Center at the origin and scale the largest side to 2 units
    pub fn normalize(&mut self) {
        if self.positions.is_empty() {
            return;
        }

        let (min, max) = self.bounds();
        let center = nalgebra::center(&min, &max);
        let size = (max - min).max();
        let scale = if size > 0.0 { 2.0 / size } else { 1.0 };

        for p in self.positions.chunks_exact_mut(3) {
            for axis in 0..3 {
                p[axis] = (p[axis] - center[axis]) * scale;
            }
        }
    }

    /// Triangulate into a mesh carrying this geometry's name
    pub fn to_mesh(&self) -> Option<MeshData> {
        let mut mesh = SceneMesh::from_raw(
            &self.positions,
            &self.faces,
            self.face_count,
            self.reverse_winding,
        )?
        .into_mesh();
        mesh.name = self.name.clone();
        Some(mesh)
    }

    pub fn load_model(&self, backend: &mut dyn RenderBackend) -> Option<RenderModel> {
        RenderModel::build(backend, &self.to_mesh()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingBackend;

    const QUAD_POSITIONS: [f32; 12] = [
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        1.0, 1.0, 0.0, //
        0.0, 1.0, 0.0,
    ];

    const PYRAMID_OBJ: &str = "\
o pyramid
v 0 0 0
v 2 0 0
v 2 0 2
v 0 0 2
v 1 2 1
f 1 2 3 4
f 1 5 2
f 2 5 3
f 3 5 4
f 4 5 1
";

    #[test]
    fn test_from_raw() {
        let mesh = SceneMesh::from_raw(&QUAD_POSITIONS, &[4, 0, 1, 2, 3], 1, false).unwrap();
        assert_eq!(mesh.mesh().vertex_count(), 4);
        assert_eq!(mesh.mesh().indices, vec![0, 1, 2, 0, 2, 3]);

        let reversed = SceneMesh::from_raw(&QUAD_POSITIONS, &[4, 0, 1, 2, 3], 1, true).unwrap();
        assert_eq!(reversed.mesh().indices, vec![0, 2, 1, 0, 3, 2]);
    }

    #[test]
    fn test_from_raw_rejects_bad_input() {
        assert!(SceneMesh::from_raw(&[], &[3, 0, 1, 2], 1, false).is_none());
        assert!(SceneMesh::from_raw(&[0.0, 1.0], &[3, 0, 1, 2], 1, false).is_none());
        assert!(SceneMesh::from_raw(&QUAD_POSITIONS, &[2, 0, 1], 1, false).is_none());
    }

    #[test]
    fn test_from_raw_drops_out_of_range_triangles() {
        let faces = [3, 0, 1, 2, 3, 0, 2, 9];
        let mesh = SceneMesh::from_raw(&QUAD_POSITIONS, &faces, 2, false).unwrap();
        assert_eq!(mesh.mesh().triangle_count(), 1);

        assert!(SceneMesh::from_raw(&QUAD_POSITIONS, &[3, 7, 8, 9], 1, false).is_none());
    }

    #[test]
    fn test_load_model() {
        let mut backend = RecordingBackend::new();
        let mesh = SceneMesh::from_raw(&QUAD_POSITIONS, &[4, 0, 1, 2, 3], 1, false).unwrap();
        let model = mesh.load_model(&mut backend).unwrap();
        assert_eq!(model.mesh().triangle_count(), 2);

        backend.set_fail_uploads(true);
        assert!(mesh.load_model(&mut backend).is_none());
    }

    #[test]
    fn test_parse_obj_keeps_polygons() {
        let geometry = SceneGeometry::parse_obj(PYRAMID_OBJ, &ImportOptions::default()).unwrap();
        assert_eq!(geometry.vertex_count(), 5);
        assert_eq!(geometry.face_count, 5);
        assert_eq!(&geometry.faces[..5], &[4, 0, 1, 2, 3]);
        assert_eq!(geometry.faces.len(), 5 + 4 * 4);

        let mesh = geometry.to_mesh().unwrap();
        assert_eq!(mesh.triangle_count(), 2 + 4);
    }

    #[test]
    fn test_z_up_reverses_winding() {
        let options = ImportOptions {
            z_up_to_y_up: true,
            ..Default::default()
        };
        assert!(options.effective_reverse_winding());

        let geometry = SceneGeometry::parse_obj(PYRAMID_OBJ, &options).unwrap();
        assert!(geometry.reverse_winding);
        // apex (1, 2, 1) becomes (1, 1, 2)
        assert_eq!(&geometry.positions[12..15], &[1.0, 1.0, 2.0]);

        let both = ImportOptions {
            z_up_to_y_up: true,
            reverse_winding: true,
            ..Default::default()
        };
        assert!(!both.effective_reverse_winding());
    }

    #[test]
    fn test_normalize() {
        let options = ImportOptions {
            normalize: true,
            ..Default::default()
        };
        let geometry = SceneGeometry::parse_obj(PYRAMID_OBJ, &options).unwrap();
        let (min, max) = geometry.bounds();
        assert!((min.x + 1.0).abs() < 0.001);
        assert!((max.x - 1.0).abs() < 0.001);
        assert!((max.y - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_empty_obj() {
        let result = SceneGeometry::parse_obj("# nothing here\n", &ImportOptions::default());
        assert!(matches!(
            result,
            Err(ImportError::NoGeometry) | Err(ImportError::NoFaces)
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = SceneGeometry::from_obj("/nonexistent/model.obj", &ImportOptions::default());
        assert!(matches!(result, Err(ImportError::Io(_))));
    }
}
