//! egui painter backend
//!
//! Renders shapes into an egui widget rect:
//! - 3D primitives are generated on the CPU, projected through the
//!   [`Camera`] and the current matrix, and drawn as flat triangles (solid)
//!   or line segments (wires)
//! - 2D primitives are drawn in widget coordinates, origin at the top-left
//!   corner of the rect
//!
//! ## Frame flow
//!
//! ```text
//! begin_frame(rect) -> shapes draw through RenderBackend -> finish(painter)
//! ```
//!
//! Drawing only collects geometry. `finish` sorts triangles back to front
//! and hands everything to the painter, 3D first, then the 2D overlay.
//!
//! ## Coordinate System
//!
//! Normalized device coordinates range from -1.0 to 1.0
//! - X: -1.0 = left edge, +1.0 = right edge
//! - Y: -1.0 = bottom edge, +1.0 = top edge

use std::collections::HashMap;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Stroke};
use nalgebra::{Matrix4, Point3, Unit, Vector3};

use super::camera::Camera;
use super::resources::{GpuMesh, Model, ReleaseQueue, ResourceId, ResourceKind};
use super::{DrawStyle, Fill2D, Primitive2D, Primitive3D, RenderBackend};
use crate::color::Color;
use crate::mesh::{generate, MeshData};

/// Display settings for the painter backend
#[derive(Clone, Debug)]
pub struct PainterSettings {
    /// Background color
    pub background: Color32,

    /// Wire and line thickness in pixels
    pub line_width: f32,

    /// Outline solid triangles with a darker edge
    pub outline_solids: bool,

    /// Brightness of the solid outline (0.0 = black, 1.0 = fill color)
    pub outline_brightness: f32,
}

impl Default for PainterSettings {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(24, 24, 28),
            line_width: 1.5,
            outline_solids: true,
            outline_brightness: 0.6,
        }
    }
}

/// Projected triangle waiting for the depth sort
struct DepthTriangle {
    depth: f32,
    points: [Pos2; 3],
    color: Color32,
}

struct PendingText {
    text: String,
    pos: Pos2,
    font_size: f32,
    spacing: f32,
    color: Color32,
}

/// Backend that draws onto an egui painter
pub struct PainterBackend {
    /// Camera used for the 3D projection
    pub camera: Camera,

    /// Display settings
    pub settings: PainterSettings,

    rect: egui::Rect,
    view_projection: Matrix4<f32>,
    current: Matrix4<f32>,
    stack: Vec<Matrix4<f32>>,

    triangles: Vec<DepthTriangle>,
    lines: Vec<([Pos2; 2], Color32)>,
    overlay: Vec<egui::Shape>,
    texts: Vec<PendingText>,

    queue: ReleaseQueue,
    meshes: HashMap<ResourceId, MeshData>,
    /// Live models: id -> mesh id
    models: HashMap<ResourceId, ResourceId>,
}

impl Default for PainterBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PainterBackend {
    /// Create a new painter backend with default settings
    pub fn new() -> Self {
        Self::with_settings(PainterSettings::default())
    }

    /// Create a new painter backend with custom settings
    pub fn with_settings(settings: PainterSettings) -> Self {
        Self {
            camera: Camera::default(),
            settings,
            rect: egui::Rect::from_min_size(Pos2::ZERO, egui::vec2(1.0, 1.0)),
            view_projection: Matrix4::identity(),
            current: Matrix4::identity(),
            stack: Vec::new(),
            triangles: Vec::with_capacity(4096),
            lines: Vec::with_capacity(1024),
            overlay: Vec::new(),
            texts: Vec::new(),
            queue: ReleaseQueue::new(),
            meshes: HashMap::new(),
            models: HashMap::new(),
        }
    }

    /// Start a frame drawn into `rect`
    pub fn begin_frame(&mut self, rect: egui::Rect) {
        self.collect_garbage();

        self.rect = rect;
        let aspect = if rect.height() > 0.0 {
            rect.width() / rect.height()
        } else {
            1.0
        };
        self.view_projection = self.camera.view_projection(aspect);

        debug_assert!(self.stack.is_empty(), "unbalanced matrix stack");
        self.stack.clear();
        self.current = Matrix4::identity();
        self.triangles.clear();
        self.lines.clear();
        self.overlay.clear();
        self.texts.clear();
    }

    /// Paint everything collected since `begin_frame`
    pub fn finish(&mut self, painter: &egui::Painter) {
        painter.rect_filled(self.rect, 4.0, self.settings.background);

        // Back to front
        self.triangles
            .sort_by(|a, b| b.depth.total_cmp(&a.depth));

        let mut mesh = egui::Mesh::default();
        let mut edges = Vec::new();
        for triangle in &self.triangles {
            let base = mesh.vertices.len() as u32;
            for point in triangle.points {
                mesh.colored_vertex(point, triangle.color);
            }
            mesh.add_triangle(base, base + 1, base + 2);

            if self.settings.outline_solids {
                let edge = darken(triangle.color, self.settings.outline_brightness);
                let [a, b, c] = triangle.points;
                edges.push(egui::Shape::closed_line(vec![a, b, c], Stroke::new(0.5, edge)));
            }
        }
        painter.add(egui::Shape::mesh(mesh));
        painter.extend(edges);

        for ([a, b], color) in &self.lines {
            painter.line_segment([*a, *b], Stroke::new(self.settings.line_width, *color));
        }

        painter.extend(self.overlay.drain(..));

        // Letter by letter so spacing can be applied between glyphs
        for text in self.texts.drain(..) {
            let font = FontId::proportional(text.font_size);
            let mut x = text.pos.x;
            for ch in text.text.chars() {
                let glyph = painter.text(
                    Pos2::new(x, text.pos.y),
                    Align2::LEFT_TOP,
                    ch,
                    font.clone(),
                    text.color,
                );
                x += glyph.width() + text.spacing;
            }
        }
    }

    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    pub fn live_models(&self) -> usize {
        self.models.len()
    }

    /// Triangles collected in the current frame
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Screen mapping under the current transform
    fn projection(&self) -> Projection {
        Projection {
            rect: self.rect,
            clip_from_local: self.view_projection * self.current,
        }
    }

    fn project(&self, point: &Point3<f32>) -> Option<(Pos2, f32)> {
        self.projection().project(point)
    }

    fn push_line(&mut self, start: &Point3<f32>, end: &Point3<f32>, color: Color32) {
        if let (Some((a, _)), Some((b, _))) = (self.project(start), self.project(end)) {
            self.lines.push(([a, b], color));
        }
    }

    fn to_screen(&self, x: f32, y: f32) -> Pos2 {
        self.rect.min + egui::vec2(x, y)
    }
}

/// Local space to screen space for one frame and transform
#[derive(Clone, Copy)]
struct Projection {
    rect: egui::Rect,
    clip_from_local: Matrix4<f32>,
}

impl Projection {
    /// Convert a local point to screen coordinates and NDC depth
    ///
    /// Returns `None` for points behind the camera.
    fn project(&self, point: &Point3<f32>) -> Option<(Pos2, f32)> {
        let clip = self.clip_from_local * point.to_homogeneous();
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.xyz() / clip.w;

        // Note: Y is inverted (screen Y increases downward)
        let center = self.rect.center();
        let pos = Pos2::new(
            center.x + ndc.x * self.rect.width() / 2.0,
            center.y - ndc.y * self.rect.height() / 2.0,
        );
        Some((pos, ndc.z))
    }
}

/// Queue `mesh` as depth-sorted triangles or as screen lines
///
/// Takes the output buffers separately so cached meshes can be drawn
/// while the backend still borrows them.
fn push_mesh(
    projection: Projection,
    triangles: &mut Vec<DepthTriangle>,
    lines: &mut Vec<([Pos2; 2], Color32)>,
    mesh: &MeshData,
    style: DrawStyle,
    color: Color32,
) {
    match style {
        DrawStyle::Wires => {
            for (a, b) in mesh.edges() {
                let start = projection.project(&mesh.vertices[a as usize]);
                let end = projection.project(&mesh.vertices[b as usize]);
                if let (Some((a, _)), Some((b, _))) = (start, end) {
                    lines.push(([a, b], color));
                }
            }
        }
        DrawStyle::Solid => {
            for [a, b, c] in mesh.triangles() {
                let projected = [a, b, c].map(|i| projection.project(&mesh.vertices[i as usize]));
                if let [Some(pa), Some(pb), Some(pc)] = projected {
                    triangles.push(DepthTriangle {
                        depth: (pa.1 + pb.1 + pc.1) / 3.0,
                        points: [pa.0, pb.0, pc.0],
                        color,
                    });
                }
            }
        }
    }
}

fn darken(color: Color32, brightness: f32) -> Color32 {
    let scale = |c: u8| (c as f32 * brightness.clamp(0.0, 1.0)) as u8;
    Color32::from_rgba_unmultiplied(scale(color.r()), scale(color.g()), scale(color.b()), color.a())
}

impl RenderBackend for PainterBackend {
    fn push_matrix(&mut self) {
        self.stack.push(self.current);
    }

    fn pop_matrix(&mut self) {
        debug_assert!(!self.stack.is_empty(), "pop_matrix without push_matrix");
        self.current = self.stack.pop().unwrap_or_else(Matrix4::identity);
    }

    fn translate(&mut self, offset: Vector3<f32>) {
        self.current *= Matrix4::new_translation(&offset);
    }

    fn rotate(&mut self, axis: Unit<Vector3<f32>>, angle: f32) {
        self.current *= Matrix4::from_axis_angle(&axis, angle);
    }

    fn scale(&mut self, factors: Vector3<f32>) {
        self.current *= Matrix4::new_nonuniform_scaling(&factors);
    }

    fn draw_3d(&mut self, primitive: &Primitive3D, style: DrawStyle, color: Color) {
        let color = Color32::from(color);
        let mesh = match *primitive {
            Primitive3D::Cube { size } => generate::cube(size),
            Primitive3D::Sphere {
                radius,
                rings,
                slices,
            } => generate::sphere(radius, rings, slices),
            Primitive3D::Cylinder {
                radius_top,
                radius_bottom,
                height,
                slices,
                caps,
            } => generate::cylinder(radius_top, radius_bottom, height, slices, caps),
            Primitive3D::Plane { size } => generate::plane(size.x, size.y),
            Primitive3D::Circle {
                radius,
                vertices,
                filled: true,
            } => generate::disc(radius, vertices),
            Primitive3D::Circle {
                radius,
                vertices,
                filled: false,
            } => {
                let rim = generate::circle_outline(radius, vertices);
                for (i, start) in rim.iter().enumerate() {
                    self.push_line(start, &rim[(i + 1) % rim.len()], color);
                }
                return;
            }
            Primitive3D::Grid { slices, spacing } => {
                for (start, end) in generate::grid_lines(slices, spacing) {
                    self.push_line(&start, &end, color);
                }
                return;
            }
            Primitive3D::Line { start, end } => {
                self.push_line(&start, &end, color);
                return;
            }
        };
        push_mesh(self.projection(), &mut self.triangles, &mut self.lines, &mesh, style, color);
    }

    fn draw_2d(&mut self, primitive: &Primitive2D<'_>, color: Color) {
        let color = Color32::from(color);
        match *primitive {
            Primitive2D::Rectangle {
                rect,
                corner_radius,
                fill,
            } => {
                let area = egui::Rect::from_min_size(
                    self.to_screen(rect.x, rect.y),
                    egui::vec2(rect.width, rect.height),
                );
                self.overlay.push(match fill {
                    Fill2D::Solid => egui::Shape::rect_filled(area, corner_radius, color),
                    Fill2D::Outline { thickness } => {
                        egui::Shape::rect_stroke(area, corner_radius, Stroke::new(thickness, color))
                    }
                });
            }
            Primitive2D::Circle {
                center,
                radius,
                fill,
            } => {
                let center = self.to_screen(center.x, center.y);
                self.overlay.push(match fill {
                    Fill2D::Solid => egui::Shape::circle_filled(center, radius, color),
                    Fill2D::Outline { thickness } => {
                        egui::Shape::circle_stroke(center, radius, Stroke::new(thickness, color))
                    }
                });
            }
            Primitive2D::Text {
                text,
                x,
                y,
                font_size,
                spacing,
                ..
            } => {
                // Custom fonts only drive measurement; egui draws with its own
                self.texts.push(PendingText {
                    text: text.to_string(),
                    pos: self.to_screen(x, y),
                    font_size,
                    spacing,
                    color,
                });
            }
        }
    }

    fn upload_mesh(&mut self, mesh: &MeshData) -> Option<GpuMesh> {
        if mesh.is_empty() {
            return None;
        }
        let handle = GpuMesh::new(&self.queue, mesh.vertex_count(), mesh.triangle_count());
        self.meshes.insert(handle.id(), mesh.clone());
        Some(handle)
    }

    fn load_model(&mut self, mesh: &GpuMesh) -> Option<Model> {
        if !self.meshes.contains_key(&mesh.id()) {
            return None;
        }
        let model = Model::new(&self.queue, mesh);
        self.models.insert(model.id(), mesh.id());
        Some(model)
    }

    fn draw_model(&mut self, model: &Model, style: DrawStyle, color: Color) {
        let projection = self.projection();
        let Some(mesh) = self
            .models
            .get(&model.id())
            .and_then(|mesh_id| self.meshes.get(mesh_id))
        else {
            return;
        };
        push_mesh(
            projection,
            &mut self.triangles,
            &mut self.lines,
            mesh,
            style,
            Color32::from(color),
        );
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
        }
    }
}
