//! Mesh-backed shapes - IcoSphere3D, Torus3D
//!
//! These shapes draw an uploaded model instead of a backend primitive. The
//! model is cached in a [`MeshCache`] and rebuilt lazily:
//!
//! ```text
//!            geometry setter changed a value
//!   clean ----------------------------------> dirty
//!     ^                                         |
//!     +----- draw: release, generate, upload ---+
//! ```
//!
//! New shapes start dirty, so the first draw builds the model. Setting
//! several parameters between frames costs one rebuild.
//!
//! When a rebuild produces no model (empty geometry or the backend refused
//! the upload) the cache is still marked clean and the shape draws nothing
//! until the next geometry change.

use log::{debug, warn};
use nalgebra::Vector3;

use super::common::{in_range, non_negative, set_property, ShapeCommon, ShapeError, Spatial};
use super::traits::{impl_shape3d, shape_common, Shape, Shape3D};
use crate::color::Color;
use crate::mesh::{generate, MeshData};
use crate::render::{RenderBackend, RenderModel, TransformScope};

/// Cached model plus dirty flag
#[derive(Debug)]
pub struct MeshCache {
    model: Option<RenderModel>,
    dirty: bool,
    rebuilds: u32,
}

impl Default for MeshCache {
    fn default() -> Self {
        Self {
            model: None,
            dirty: true,
            rebuilds: 0,
        }
    }
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the cached model stale. Nothing is rebuilt until `refresh`.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn model(&self) -> Option<&RenderModel> {
        self.model.as_ref()
    }

    /// Number of rebuilds so far
    pub fn rebuilds(&self) -> u32 {
        self.rebuilds
    }

    /// Rebuild the model if dirty, then return it
    pub fn refresh(
        &mut self,
        backend: &mut dyn RenderBackend,
        generate: impl FnOnce() -> MeshData,
    ) -> Option<&RenderModel> {
        if self.dirty {
            // Model before mesh, see RenderModel
            self.model = None;

            let mesh = generate();
            self.model = RenderModel::build(backend, &mesh);
            self.rebuilds += 1;
            self.dirty = false;

            match &self.model {
                Some(model) => debug!(
                    "rebuilt {} mesh: {} vertices, {} triangles",
                    mesh.name,
                    model.mesh().vertex_count(),
                    model.mesh().triangle_count()
                ),
                None => warn!(
                    "failed to build {} mesh ({} vertices), drawing nothing until it changes",
                    mesh.name,
                    mesh.vertex_count()
                ),
            }
        }
        self.model.as_ref()
    }
}

/// Sphere whose tessellation is set by a subdivision level
#[derive(Debug)]
pub struct IcoSphere3D {
    common: ShapeCommon,
    spatial: Spatial,
    radius: f32,
    subdivisions: u32,
    cache: MeshCache,
}

impl Default for IcoSphere3D {
    fn default() -> Self {
        Self {
            common: ShapeCommon::new(),
            spatial: Spatial::default(),
            radius: 1.0,
            subdivisions: 2,
            cache: MeshCache::new(),
        }
    }
}

impl IcoSphere3D {
    pub const MIN_SUBDIVISIONS: u32 = 1;
    pub const MAX_SUBDIVISIONS: u32 = 6;

    /// Ring and slice count for a subdivision level: 4 * 2^subdivisions
    ///
    /// Levels outside `MIN_SUBDIVISIONS..=MAX_SUBDIVISIONS` are clamped.
    pub fn segments_for(subdivisions: u32) -> u32 {
        4 << subdivisions.clamp(Self::MIN_SUBDIVISIONS, Self::MAX_SUBDIVISIONS)
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_at(position: Vector3<f32>, radius: f32) -> Result<Self, ShapeError> {
        let mut sphere = Self {
            spatial: Spatial::at(position),
            ..Self::default()
        };
        sphere.set_radius(radius)?;
        Ok(sphere)
    }

    pub fn new_full(
        position: Vector3<f32>,
        radius: f32,
        subdivisions: u32,
        color: Color,
    ) -> Result<Self, ShapeError> {
        let mut sphere = Self::new_at(position, radius)?;
        sphere.set_subdivisions(subdivisions)?;
        sphere.common = ShapeCommon::with_color(color);
        Ok(sphere)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn subdivisions(&self) -> u32 {
        self.subdivisions
    }

    pub fn segments(&self) -> u32 {
        Self::segments_for(self.subdivisions)
    }

    pub fn set_radius(&mut self, radius: f32) -> Result<(), ShapeError> {
        let radius = non_negative("radius", radius)?;
        if set_property(&mut self.radius, radius, self.common.observers_mut(), "radius") {
            self.cache.invalidate();
        }
        Ok(())
    }

    pub fn set_subdivisions(&mut self, subdivisions: u32) -> Result<(), ShapeError> {
        let subdivisions = in_range(
            "subdivisions",
            subdivisions,
            Self::MIN_SUBDIVISIONS,
            Self::MAX_SUBDIVISIONS,
        )?;
        if set_property(&mut self.subdivisions, subdivisions, self.common.observers_mut(), "subdivisions") {
            self.cache.invalidate();
        }
        Ok(())
    }

    pub fn mesh_cache(&self) -> &MeshCache {
        &self.cache
    }

    pub fn is_mesh_dirty(&self) -> bool {
        self.cache.is_dirty()
    }
}

impl Shape for IcoSphere3D {
    shape_common!();

    fn name(&self) -> &str {
        "IcoSphere3D"
    }

    fn render(&mut self, backend: &mut dyn RenderBackend, _delta: f32) {
        let transform = *self.transform();
        let (style, color) = (self.draw_style(), self.color());
        let (radius, segments) = (self.radius, self.segments());

        let Some(model) = self.cache.refresh(backend, || {
            let mut mesh = generate::sphere(radius, segments, segments);
            mesh.name = "IcoSphere3D".to_string();
            mesh
        }) else {
            return;
        };

        let mut scope = TransformScope::push(backend);
        scope.apply(&transform);
        model.draw(&mut *scope, style, color);
    }
}

impl_shape3d!(IcoSphere3D);

/// Ring torus lying on the local XZ plane
#[derive(Debug)]
pub struct Torus3D {
    common: ShapeCommon,
    spatial: Spatial,
    major_radius: f32,
    minor_radius: f32,
    major_segments: u32,
    minor_segments: u32,
    cache: MeshCache,
}

impl Default for Torus3D {
    fn default() -> Self {
        Self {
            common: ShapeCommon::new(),
            spatial: Spatial::default(),
            major_radius: 1.0,
            minor_radius: 0.25,
            major_segments: 32,
            minor_segments: 16,
            cache: MeshCache::new(),
        }
    }
}

impl Torus3D {
    pub const MIN_SEGMENTS: u32 = 3;
    pub const MAX_SEGMENTS: u32 = generate::MAX_SEGMENTS;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_at(position: Vector3<f32>, major_radius: f32, minor_radius: f32) -> Result<Self, ShapeError> {
        let mut torus = Self {
            spatial: Spatial::at(position),
            ..Self::default()
        };
        torus.set_major_radius(major_radius)?;
        torus.set_minor_radius(minor_radius)?;
        Ok(torus)
    }

    pub fn new_full(
        position: Vector3<f32>,
        major_radius: f32,
        minor_radius: f32,
        major_segments: u32,
        minor_segments: u32,
        color: Color,
    ) -> Result<Self, ShapeError> {
        let mut torus = Self::new_at(position, major_radius, minor_radius)?;
        torus.set_major_segments(major_segments)?;
        torus.set_minor_segments(minor_segments)?;
        torus.common = ShapeCommon::with_color(color);
        Ok(torus)
    }

    /// Center to tube center
    pub fn major_radius(&self) -> f32 {
        self.major_radius
    }

    /// Tube radius
    pub fn minor_radius(&self) -> f32 {
        self.minor_radius
    }

    pub fn major_segments(&self) -> u32 {
        self.major_segments
    }

    pub fn minor_segments(&self) -> u32 {
        self.minor_segments
    }

    pub fn set_major_radius(&mut self, radius: f32) -> Result<(), ShapeError> {
        let radius = non_negative("major-radius", radius)?;
        if set_property(&mut self.major_radius, radius, self.common.observers_mut(), "major-radius") {
            self.cache.invalidate();
        }
        Ok(())
    }

    pub fn set_minor_radius(&mut self, radius: f32) -> Result<(), ShapeError> {
        let radius = non_negative("minor-radius", radius)?;
        if set_property(&mut self.minor_radius, radius, self.common.observers_mut(), "minor-radius") {
            self.cache.invalidate();
        }
        Ok(())
    }

    pub fn set_major_segments(&mut self, segments: u32) -> Result<(), ShapeError> {
        let segments = in_range("major-segments", segments, Self::MIN_SEGMENTS, Self::MAX_SEGMENTS)?;
        if set_property(&mut self.major_segments, segments, self.common.observers_mut(), "major-segments") {
            self.cache.invalidate();
        }
        Ok(())
    }

    pub fn set_minor_segments(&mut self, segments: u32) -> Result<(), ShapeError> {
        let segments = in_range("minor-segments", segments, Self::MIN_SEGMENTS, Self::MAX_SEGMENTS)?;
        if set_property(&mut self.minor_segments, segments, self.common.observers_mut(), "minor-segments") {
            self.cache.invalidate();
        }
        Ok(())
    }

    pub fn mesh_cache(&self) -> &MeshCache {
        &self.cache
    }

    pub fn is_mesh_dirty(&self) -> bool {
        self.cache.is_dirty()
    }
}

impl Shape for Torus3D {
    shape_common!();

    fn name(&self) -> &str {
        "Torus3D"
    }

    fn render(&mut self, backend: &mut dyn RenderBackend, _delta: f32) {
        let transform = *self.transform();
        let (style, color) = (self.draw_style(), self.color());
        let (major, minor) = (self.major_radius, self.minor_radius);
        let (major_segments, minor_segments) = (self.major_segments, self.minor_segments);

        let Some(model) = self.cache.refresh(backend, || {
            generate::torus(major, minor, major_segments, minor_segments)
        }) else {
            return;
        };

        let mut scope = TransformScope::push(backend);
        scope.apply(&transform);
        model.draw(&mut *scope, style, color);
    }
}

impl_shape3d!(Torus3D);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, RecordingBackend, Released, ResourceKind};
    use crate::shapes::Drawable;

    fn model_draws(backend: &RecordingBackend) -> usize {
        backend
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::DrawModel { .. }))
            .count()
    }

    #[test]
    fn test_segment_mapping() {
        assert_eq!(IcoSphere3D::segments_for(1), 8);
        assert_eq!(IcoSphere3D::segments_for(2), 16);
        assert_eq!(IcoSphere3D::segments_for(3), 32);
        assert_eq!(IcoSphere3D::segments_for(6), 256);
        assert_eq!(IcoSphere3D::new().segments(), 16);
    }

    #[test]
    fn test_segment_mapping_clamps_out_of_range_levels() {
        assert_eq!(IcoSphere3D::segments_for(0), 8);
        assert_eq!(IcoSphere3D::segments_for(7), 256);
        assert_eq!(IcoSphere3D::segments_for(40), 256);
        assert_eq!(IcoSphere3D::segments_for(u32::MAX), 256);
    }

    #[test]
    fn test_torus_segment_upper_bound() {
        let mut torus = Torus3D::new();
        assert_eq!(
            torus.set_major_segments(u32::MAX),
            Err(ShapeError::OutOfRange {
                property: "major-segments",
                value: u32::MAX,
                min: Torus3D::MIN_SEGMENTS,
                max: Torus3D::MAX_SEGMENTS,
            })
        );
        assert!(torus.set_minor_segments(Torus3D::MAX_SEGMENTS + 1).is_err());
        assert_eq!((torus.major_segments(), torus.minor_segments()), (32, 16));
        assert!(torus.set_minor_segments(2).is_err());

        // Rejected values never reach the draw path
        let mut backend = RecordingBackend::new();
        torus.draw(&mut backend, 0.0);
        assert_eq!(model_draws(&backend), 1);
        assert!(torus.set_major_segments(Torus3D::MAX_SEGMENTS).is_ok());
    }

    #[test]
    fn test_subdivision_range() {
        let mut sphere = IcoSphere3D::new();
        assert!(sphere.set_subdivisions(0).is_err());
        assert!(sphere.set_subdivisions(7).is_err());
        assert_eq!(sphere.subdivisions(), 2);
        assert!(sphere.set_subdivisions(6).is_ok());
        assert_eq!(sphere.segments(), 256);
    }

    #[test]
    fn test_dirty_state_machine() {
        let mut backend = RecordingBackend::new();
        let mut sphere = IcoSphere3D::new();
        assert!(sphere.is_mesh_dirty());

        sphere.draw(&mut backend, 0.016);
        assert!(!sphere.is_mesh_dirty());
        assert_eq!(sphere.mesh_cache().rebuilds(), 1);
        assert_eq!(model_draws(&backend), 1);

        // Clean frames reuse the model
        sphere.draw(&mut backend, 0.016);
        assert_eq!(sphere.mesh_cache().rebuilds(), 1);

        // Same value: no change, stays clean
        sphere.set_radius(1.0).unwrap();
        assert!(!sphere.is_mesh_dirty());

        sphere.set_radius(2.0).unwrap();
        assert!(sphere.is_mesh_dirty());
        sphere.set_subdivisions(3).unwrap();
        assert!(sphere.is_mesh_dirty());

        sphere.draw(&mut backend, 0.016);
        assert!(!sphere.is_mesh_dirty());
        assert_eq!(sphere.mesh_cache().rebuilds(), 2);
        assert_eq!(model_draws(&backend), 3);
        assert_eq!(backend.matrix_depth(), 0);
    }

    #[test]
    fn test_rebuild_releases_model_before_mesh() {
        let mut backend = RecordingBackend::new();
        let mut torus = Torus3D::new();
        torus.draw(&mut backend, 0.0);

        let first = torus.mesh_cache().model().unwrap();
        let (model_id, mesh_id) = (first.model().id(), first.mesh().id());

        torus.set_minor_radius(0.5).unwrap();
        torus.draw(&mut backend, 0.0);
        backend.collect_garbage();

        assert_eq!(
            backend.released(),
            &[
                Released {
                    kind: ResourceKind::Model,
                    id: model_id
                },
                Released {
                    kind: ResourceKind::Mesh,
                    id: mesh_id
                },
            ]
        );
        assert_eq!(backend.live_models(), 1);
    }

    #[test]
    fn test_failed_build_is_clean_and_retries_on_change() {
        let mut backend = RecordingBackend::new();
        backend.set_fail_uploads(true);

        let mut torus = Torus3D::new();
        torus.draw(&mut backend, 0.0);
        assert!(!torus.is_mesh_dirty());
        assert!(torus.mesh_cache().model().is_none());
        assert_eq!(model_draws(&backend), 0);

        // No retry every frame
        torus.draw(&mut backend, 0.0);
        assert_eq!(torus.mesh_cache().rebuilds(), 1);

        backend.set_fail_uploads(false);
        torus.set_major_segments(12).unwrap();
        torus.draw(&mut backend, 0.0);
        assert_eq!(torus.mesh_cache().rebuilds(), 2);
        assert_eq!(model_draws(&backend), 1);
    }

    #[test]
    fn test_invisible_shape_stays_dirty() {
        let mut backend = RecordingBackend::new();
        let mut sphere = IcoSphere3D::new();
        sphere.set_visible(false);
        sphere.draw(&mut backend, 0.0);
        assert!(sphere.is_mesh_dirty());
        assert!(backend.commands().is_empty());
    }

    #[test]
    fn test_drop_releases_resources() {
        let mut backend = RecordingBackend::new();
        let mut sphere = IcoSphere3D::new();
        sphere.draw(&mut backend, 0.0);
        assert_eq!(backend.live_meshes(), 1);

        drop(sphere);
        backend.collect_garbage();
        assert_eq!(backend.live_meshes(), 0);
        assert_eq!(backend.live_models(), 0);
        assert_eq!(backend.released()[0].kind, ResourceKind::Model);
    }

    #[test]
    fn test_torus_mesh_size() {
        let mut backend = RecordingBackend::new();
        let mut torus = Torus3D::new_full(Vector3::zeros(), 2.0, 0.5, 8, 4, Color::ORANGE).unwrap();
        torus.draw(&mut backend, 0.0);

        assert!(backend.commands().contains(&DrawCommand::UploadMesh {
            id: torus.mesh_cache().model().unwrap().mesh().id(),
            vertices: 9 * 5,
            triangles: 8 * 4 * 2,
        }));
    }

    #[test]
    fn test_invalid_values_keep_previous() {
        let mut torus = Torus3D::new();
        assert!(torus.set_major_radius(-1.0).is_err());
        assert!(torus.set_minor_segments(2).is_err());
        assert_eq!(torus.major_radius(), 1.0);
        assert_eq!(torus.minor_segments(), 16);

        let p = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(Torus3D::new_at(p, 1.0, 0.2).unwrap().position(), p);
        assert_eq!(IcoSphere3D::new_at(p, 0.5).unwrap().position(), p);
    }
}
