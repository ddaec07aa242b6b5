//! Headless backend that records every call
//!
//! Useful for tests and for inspecting what a frame would draw without a
//! window. Mesh uploads can be made to fail on demand to exercise the
//! degraded paths of mesh-backed shapes.

use std::collections::HashMap;

use nalgebra::{Unit, Vector2, Vector3};

use super::resources::{GpuMesh, Model, ReleaseQueue, Released, ResourceId, ResourceKind};
use super::{DrawStyle, Fill2D, Primitive2D, Primitive3D, RenderBackend};
use crate::color::Color;
use crate::math::Rect;
use crate::mesh::MeshData;

/// One recorded backend call
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    PushMatrix,
    PopMatrix,
    Translate(Vector3<f32>),
    Rotate { axis: Vector3<f32>, angle: f32 },
    Scale(Vector3<f32>),
    Draw3D {
        primitive: Primitive3D,
        style: DrawStyle,
        color: Color,
    },
    Rectangle {
        rect: Rect,
        corner_radius: f32,
        fill: Fill2D,
        color: Color,
    },
    Circle2D {
        center: Vector2<f32>,
        radius: f32,
        fill: Fill2D,
        color: Color,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        font_size: f32,
        spacing: f32,
        custom_font: bool,
        color: Color,
    },
    UploadMesh {
        id: ResourceId,
        vertices: usize,
        triangles: usize,
    },
    LoadModel { id: ResourceId, mesh: ResourceId },
    DrawModel {
        id: ResourceId,
        style: DrawStyle,
        color: Color,
    },
}

impl DrawCommand {
    /// True for commands that put pixels on screen
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            DrawCommand::Draw3D { .. }
                | DrawCommand::Rectangle { .. }
                | DrawCommand::Circle2D { .. }
                | DrawCommand::Text { .. }
                | DrawCommand::DrawModel { .. }
        )
    }
}

/// Backend that keeps a log of calls instead of drawing
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<DrawCommand>,
    depth: usize,
    max_depth: usize,
    queue: ReleaseQueue,
    released: Vec<Released>,
    /// Live meshes: id -> (vertices, triangles)
    meshes: HashMap<ResourceId, (usize, usize)>,
    /// Live models: id -> mesh id
    models: HashMap<ResourceId, ResourceId>,
    fail_uploads: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Forget recorded commands, keep resources
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Number of commands that actually draw something
    pub fn draw_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_draw()).count()
    }

    /// Current matrix stack depth (0 when balanced)
    pub fn matrix_depth(&self) -> usize {
        self.depth
    }

    pub fn max_matrix_depth(&self) -> usize {
        self.max_depth
    }

    /// Make every subsequent `upload_mesh` fail
    pub fn set_fail_uploads(&mut self, fail: bool) {
        self.fail_uploads = fail;
    }

    /// Every release collected so far, in release order
    pub fn released(&self) -> &[Released] {
        &self.released
    }

    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    pub fn live_models(&self) -> usize {
        self.models.len()
    }

    pub fn queue(&self) -> &ReleaseQueue {
        &self.queue
    }
}

impl RenderBackend for RecordingBackend {
    fn push_matrix(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        self.commands.push(DrawCommand::PushMatrix);
    }

    fn pop_matrix(&mut self) {
        debug_assert!(self.depth > 0, "pop_matrix without push_matrix");
        self.depth = self.depth.saturating_sub(1);
        self.commands.push(DrawCommand::PopMatrix);
    }

    fn translate(&mut self, offset: Vector3<f32>) {
        self.commands.push(DrawCommand::Translate(offset));
    }

    fn rotate(&mut self, axis: Unit<Vector3<f32>>, angle: f32) {
        self.commands.push(DrawCommand::Rotate {
            axis: axis.into_inner(),
            angle,
        });
    }

    fn scale(&mut self, factors: Vector3<f32>) {
        self.commands.push(DrawCommand::Scale(factors));
    }

    fn draw_3d(&mut self, primitive: &Primitive3D, style: DrawStyle, color: Color) {
        self.commands.push(DrawCommand::Draw3D {
            primitive: primitive.clone(),
            style,
            color,
        });
    }

    fn draw_2d(&mut self, primitive: &Primitive2D<'_>, color: Color) {
        let command = match *primitive {
            Primitive2D::Rectangle {
                rect,
                corner_radius,
                fill,
            } => DrawCommand::Rectangle {
                rect,
                corner_radius,
                fill,
                color,
            },
            Primitive2D::Circle {
                center,
                radius,
                fill,
            } => DrawCommand::Circle2D {
                center,
                radius,
                fill,
                color,
            },
            Primitive2D::Text {
                text,
                x,
                y,
                font_size,
                spacing,
                font,
            } => DrawCommand::Text {
                text: text.to_string(),
                x,
                y,
                font_size,
                spacing,
                custom_font: font.is_some(),
                color,
            },
        };
        self.commands.push(command);
    }

    fn upload_mesh(&mut self, mesh: &MeshData) -> Option<GpuMesh> {
        if self.fail_uploads || mesh.is_empty() {
            return None;
        }
        let handle = GpuMesh::new(&self.queue, mesh.vertex_count(), mesh.triangle_count());
        self.meshes.insert(
            handle.id(),
            (handle.vertex_count(), handle.triangle_count()),
        );
        self.commands.push(DrawCommand::UploadMesh {
            id: handle.id(),
            vertices: handle.vertex_count(),
            triangles: handle.triangle_count(),
        });
        Some(handle)
    }

    fn load_model(&mut self, mesh: &GpuMesh) -> Option<Model> {
        if !self.meshes.contains_key(&mesh.id()) {
            return None;
        }
        let model = Model::new(&self.queue, mesh);
        self.models.insert(model.id(), mesh.id());
        self.commands.push(DrawCommand::LoadModel {
            id: model.id(),
            mesh: mesh.id(),
        });
        Some(model)
    }

    fn draw_model(&mut self, model: &Model, style: DrawStyle, color: Color) {
        debug_assert!(self.models.contains_key(&model.id()), "drawing unknown model");
        self.commands.push(DrawCommand::DrawModel {
            id: model.id(),
            style,
            color,
        });
    }

    fn collect_garbage(&mut self) {
        for released in self.queue.drain() {
            match released.kind {
                ResourceKind::Mesh => {
                    self.meshes.remove(&released.id);
                }
                ResourceKind::Model => {
                    self.models.remove(&released.id);
                }
            }
            self.released.push(released);
        }
    }
}
