//! Render module - the drawing backend seen by shapes
//!
//! This module provides:
//! - `RenderBackend` trait: primitive draw calls, a matrix stack, and mesh
//!   upload, modelled on an immediate-mode drawing library
//! - `TransformScope`: pushes a matrix frame and pops it on drop
//! - `RecordingBackend`: headless backend that records every call
//! - `PainterBackend`: projects everything onto an egui painter
//! - `Camera`: perspective camera used by the painter backend

mod camera;
mod painter;
mod recorder;
mod resources;

use std::ops::{Deref, DerefMut};

use nalgebra::{Point3, Unit, Vector2, Vector3};

pub use camera::Camera;
pub use painter::{PainterBackend, PainterSettings};
pub use recorder::{DrawCommand, RecordingBackend};
pub use resources::{
    GpuMesh, Model, ReleaseQueue, Released, RenderModel, ResourceId, ResourceKind,
};

use crate::color::Color;
use crate::math::{Axis, Rect, Transform3D};
use crate::mesh::MeshData;
use crate::shapes::Font;

/// Solid fill or wire outline for 3D primitives
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrawStyle {
    #[default]
    Solid,
    Wires,
}

impl DrawStyle {
    pub fn from_wireframe(wireframe: bool) -> Self {
        if wireframe {
            DrawStyle::Wires
        } else {
            DrawStyle::Solid
        }
    }
}

/// A 3D primitive, always described at the local origin
///
/// The backend's current matrix places it in the world.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive3D {
    /// Axis-aligned box centered on the origin
    Cube { size: Vector3<f32> },
    /// UV sphere centered on the origin
    Sphere { radius: f32, rings: u32, slices: u32 },
    /// Cylinder or cone standing on the XZ plane, extending up +Y
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        slices: u32,
        caps: bool,
    },
    /// Plane on XZ, `size.x` along X and `size.y` along Z
    Plane { size: Vector2<f32> },
    /// Circle in the XY plane
    Circle {
        radius: f32,
        vertices: u32,
        filled: bool,
    },
    /// Grid of lines on XZ, `slices` cells across
    Grid { slices: u32, spacing: f32 },
    Line { start: Point3<f32>, end: Point3<f32> },
}

/// Fill mode for 2D primitives
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fill2D {
    Solid,
    Outline { thickness: f32 },
}

/// A 2D primitive in screen coordinates
#[derive(Clone, Debug)]
pub enum Primitive2D<'a> {
    Rectangle {
        rect: Rect,
        /// 0 = sharp corners
        corner_radius: f32,
        fill: Fill2D,
    },
    Circle {
        center: Vector2<f32>,
        radius: f32,
        fill: Fill2D,
    },
    Text {
        text: &'a str,
        x: f32,
        y: f32,
        font_size: f32,
        spacing: f32,
        /// `None` = backend default font
        font: Option<&'a Font>,
    },
}

/// The drawing library as seen by shapes
///
/// Matrix calls post-multiply the current matrix, so a sequence
/// `translate, rotate, scale` maps local points through scale first.
pub trait RenderBackend {
    fn push_matrix(&mut self);
    fn pop_matrix(&mut self);
    fn translate(&mut self, offset: Vector3<f32>);
    /// Rotate by `angle` radians about `axis`
    fn rotate(&mut self, axis: Unit<Vector3<f32>>, angle: f32);
    fn scale(&mut self, factors: Vector3<f32>);

    fn draw_3d(&mut self, primitive: &Primitive3D, style: DrawStyle, color: Color);
    fn draw_2d(&mut self, primitive: &Primitive2D<'_>, color: Color);

    /// Upload geometry. `None` means the backend could not take it.
    fn upload_mesh(&mut self, mesh: &MeshData) -> Option<GpuMesh>;
    /// Build a model from an uploaded mesh. `None` on failure.
    fn load_model(&mut self, mesh: &GpuMesh) -> Option<Model>;
    fn draw_model(&mut self, model: &Model, style: DrawStyle, color: Color);

    /// Free resources whose handles were dropped
    fn collect_garbage(&mut self) {}
}

/// A pushed matrix frame, popped when the scope drops
///
/// Derefs to the backend, so draw calls go through the scope:
///
/// ```ignore
/// let mut scope = TransformScope::push(backend);
/// scope.apply(&transform);
/// scope.draw_3d(&primitive, style, color);
/// // popped here, also on early return
/// ```
pub struct TransformScope<'a> {
    backend: &'a mut dyn RenderBackend,
}

impl<'a> TransformScope<'a> {
    pub fn push(backend: &'a mut dyn RenderBackend) -> Self {
        backend.push_matrix();
        Self { backend }
    }

    /// Translate, rotate X, rotate Y, rotate Z, scale
    pub fn apply(&mut self, transform: &Transform3D) {
        self.backend.translate(transform.position);
        self.apply_rotation_and_scale(transform);
    }

    /// Same as [`apply`](Self::apply) without the translation
    pub fn apply_rotation_and_scale(&mut self, transform: &Transform3D) {
        for axis in Axis::ROTATION_ORDER {
            self.backend
                .rotate(axis.unit(), axis.component(&transform.rotation));
        }
        self.backend.scale(transform.scale);
    }
}

impl<'a> Deref for TransformScope<'a> {
    type Target = dyn RenderBackend + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.backend
    }
}

impl<'a> DerefMut for TransformScope<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.backend
    }
}

impl Drop for TransformScope<'_> {
    fn drop(&mut self) {
        self.backend.pop_matrix();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_pops_on_drop() {
        let mut backend = RecordingBackend::new();
        {
            let mut scope = TransformScope::push(&mut backend);
            scope.apply(&Transform3D::default());
        }
        assert_eq!(backend.matrix_depth(), 0);
        assert_eq!(backend.commands().first(), Some(&DrawCommand::PushMatrix));
        assert_eq!(backend.commands().last(), Some(&DrawCommand::PopMatrix));
    }

    #[test]
    fn test_scope_pops_on_early_return() {
        fn draw_or_bail(backend: &mut dyn RenderBackend, bail: bool) -> Option<()> {
            let mut scope = TransformScope::push(backend);
            scope.translate(Vector3::new(1.0, 0.0, 0.0));
            if bail {
                return None;
            }
            scope.draw_3d(
                &Primitive3D::Cube {
                    size: Vector3::new(1.0, 1.0, 1.0),
                },
                DrawStyle::Solid,
                Color::WHITE,
            );
            Some(())
        }

        let mut backend = RecordingBackend::new();
        assert!(draw_or_bail(&mut backend, true).is_none());
        assert_eq!(backend.matrix_depth(), 0);
        assert_eq!(backend.draw_count(), 0);
    }

    #[test]
    fn test_apply_order() {
        let mut backend = RecordingBackend::new();
        let transform = Transform3D {
            position: Vector3::new(1.0, 2.0, 3.0),
            rotation: Vector3::new(0.1, 0.2, 0.3),
            scale: Vector3::new(4.0, 5.0, 6.0),
        };
        TransformScope::push(&mut backend).apply(&transform);

        assert_eq!(
            backend.commands(),
            &[
                DrawCommand::PushMatrix,
                DrawCommand::Translate(Vector3::new(1.0, 2.0, 3.0)),
                DrawCommand::Rotate {
                    axis: Vector3::x(),
                    angle: 0.1
                },
                DrawCommand::Rotate {
                    axis: Vector3::y(),
                    angle: 0.2
                },
                DrawCommand::Rotate {
                    axis: Vector3::z(),
                    angle: 0.3
                },
                DrawCommand::Scale(Vector3::new(4.0, 5.0, 6.0)),
                DrawCommand::PopMatrix,
            ]
        );
    }
}
