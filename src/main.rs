//! shapekit viewer
//!
//! Renders a demo scene of every built-in shape through the egui painter
//! backend. Drag to orbit, scroll to zoom. Wavefront OBJ files can be
//! opened and are drawn in the middle of the scene.

use std::path::{Path, PathBuf};

use eframe::egui;
use log::{info, warn};
use nalgebra::Vector3;

use shapekit::color::Color;
use shapekit::math::Transform3D;
use shapekit::mesh::{ImportOptions, MeshData, SceneGeometry};
use shapekit::render::{DrawStyle, PainterBackend, RenderBackend, TransformScope};
use shapekit::shapes::{
    Circle2D, Circle3D, Cone3D, Cube3D, Cylinder3D, Drawable, FillType, Grid3D, IcoSphere3D, Line3D,
    MeshCache, Plane3D, Rectangle2D, Shape, Shape3D, ShapeError, ShapeLayer, Sphere3D, Text2D, Torus3D,
};

mod settings;

use settings::ViewerSettings;

/// Radians per pixel of mouse drag
const ORBIT_SPEED: f32 = 0.01;

fn main() -> eframe::Result<()> {
    env_logger::init();
    info!("Starting shapekit viewer");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 750.0])
            .with_title("shapekit"),
        ..Default::default()
    };

    eframe::run_native(
        "shapekit",
        options,
        Box::new(|cc| Ok(Box::new(ViewerApp::new(cc)))),
    )
}

/// Parameters of the mesh-backed shapes, edited with sliders
struct ShapeParams {
    ico_radius: f32,
    ico_subdivisions: u32,
    torus_major_radius: f32,
    torus_minor_radius: f32,
    torus_major_segments: u32,
    torus_minor_segments: u32,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            ico_radius: 1.0,
            ico_subdivisions: 2,
            torus_major_radius: 1.0,
            torus_minor_radius: 0.25,
            torus_major_segments: 32,
            torus_minor_segments: 16,
        }
    }
}

/// An OBJ file opened by the user
struct ImportedModel {
    name: String,
    mesh: MeshData,
    cache: MeshCache,
}

impl ImportedModel {
    fn load(path: &Path, options: &ImportOptions) -> Result<Self, String> {
        let geometry = SceneGeometry::from_obj(path, options).map_err(|e| e.to_string())?;
        let mesh = geometry
            .to_mesh()
            .ok_or_else(|| format!("{} has no drawable triangles", path.display()))?;
        Ok(Self {
            name: geometry.name,
            mesh,
            cache: MeshCache::new(),
        })
    }

    fn draw(&mut self, backend: &mut dyn RenderBackend, transform: &Transform3D, style: DrawStyle) {
        let mesh = &self.mesh;
        let Some(model) = self.cache.refresh(backend, || mesh.clone()) else {
            return;
        };
        let mut scope = TransformScope::push(backend);
        scope.apply(transform);
        model.draw(&mut *scope, style, Color::ORANGE);
    }
}

/// Box a 3D shape for the demo layer
fn solid<S: Shape3D + 'static>(mut shape: S, wireframe: bool) -> Box<dyn Shape> {
    shape.set_wireframe(wireframe);
    Box::new(shape)
}

/// Static part of the demo scene
fn build_scene(wireframe: bool) -> Result<ShapeLayer, ShapeError> {
    let mut layer = ShapeLayer::new("demo");
    layer.add(Grid3D::new_full(Vector3::zeros(), 10, 1.0, Color::DARK_GRAY)?);
    layer.add(Line3D::new_full(Vector3::zeros(), Vector3::new(2.0, 0.0, 0.0), Color::RED)?);
    layer.add(Line3D::new_full(Vector3::zeros(), Vector3::new(0.0, 2.0, 0.0), Color::GREEN)?);
    layer.add(Line3D::new_full(Vector3::zeros(), Vector3::new(0.0, 0.0, 2.0), Color::BLUE)?);

    layer
        .add_boxed(solid(
            Cube3D::new_full(Vector3::new(-3.0, 0.5, -3.0), Vector3::repeat(1.0), Color::RED)?,
            wireframe,
        ))
        .add_boxed(solid(
            Sphere3D::new_full(Vector3::new(0.0, 0.75, -3.0), 0.75, 16, 16, Color::GREEN)?,
            wireframe,
        ))
        .add_boxed(solid(
            Cylinder3D::new_full(Vector3::new(3.0, 0.0, -3.0), 0.5, 1.5, 16, true, Color::BLUE)?,
            wireframe,
        ))
        .add_boxed(solid(
            Cone3D::new_full(Vector3::new(-3.0, 0.0, 3.0), 0.7, 0.0, 1.5, 16, Color::PURPLE)?,
            wireframe,
        ))
        .add_boxed(solid(
            Plane3D::new_full(Vector3::new(3.0, 0.01, 3.0), 1.5, 1.5, Color::GRAY)?,
            wireframe,
        ))
        .add_boxed(solid(
            Circle3D::new_full(Vector3::new(0.0, 1.0, 3.0), 0.8, 32, FillType::None, Color::YELLOW)?,
            wireframe,
        ));

    // Overlay drawn after the 3D content
    let mut hud = ShapeLayer::new("hud");
    hud.set_z_index(1);
    let mut panel = Rectangle2D::new_full(12.0, 12.0, 180.0, 40.0, false, Color::GRAY)?;
    panel.set_corner_radius(4.0)?;
    hud.add(panel);
    hud.add(Circle2D::new_full(30.0, 32.0, 8.0, true, Color::GREEN)?);
    hud.add(Text2D::new_full(46.0, 22.0, "shapekit", 18.0, Color::WHITE)?);
    layer.add(hud);

    Ok(layer)
}

pub struct ViewerApp {
    backend: PainterBackend,
    scene: ShapeLayer,
    ico: IcoSphere3D,
    torus: Torus3D,
    imported: Option<ImportedModel>,

    show_settings: bool,
    params: ShapeParams,
    shapes_need_update: bool,

    wireframe: bool,
    spin: bool,
    spin_speed: f32,
    angle: f32,

    import_options: ImportOptions,
    last_directory: Option<PathBuf>,
    status: String,
}

impl ViewerApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut app = Self {
            backend: PainterBackend::new(),
            scene: ShapeLayer::new("demo"),
            ico: IcoSphere3D::new(),
            torus: Torus3D::new(),
            imported: None,

            show_settings: true,
            params: ShapeParams::default(),
            shapes_need_update: true,

            wireframe: false,
            spin: true,
            spin_speed: 0.5,
            angle: 0.0,

            import_options: ImportOptions::default(),
            last_directory: None,
            status: String::new(),
        };
        ViewerSettings::load().apply(&mut app);
        app.ico.set_color(Color::GREEN);
        app.torus.set_color(Color::ORANGE);
        app
    }

    /// Push slider values and the wireframe toggle into the shapes
    fn update_shapes(&mut self) {
        match build_scene(self.wireframe) {
            Ok(scene) => self.scene = scene,
            Err(e) => warn!("Failed to build demo scene: {}", e),
        }

        let results = [
            self.ico.set_radius(self.params.ico_radius),
            self.ico.set_subdivisions(self.params.ico_subdivisions),
            self.torus.set_major_radius(self.params.torus_major_radius),
            self.torus.set_minor_radius(self.params.torus_minor_radius),
            self.torus.set_major_segments(self.params.torus_major_segments),
            self.torus.set_minor_segments(self.params.torus_minor_segments),
        ];
        for e in results.into_iter().filter_map(Result::err) {
            warn!("Rejected shape parameter: {}", e);
            self.status = e.to_string();
        }

        self.ico.set_wireframe(self.wireframe);
        self.torus.set_wireframe(self.wireframe);
        self.shapes_need_update = false;
    }

    fn open_obj(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("Wavefront OBJ", &["obj"]);
        if let Some(dir) = &self.last_directory {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.pick_file() else {
            return;
        };
        self.last_directory = path.parent().map(Path::to_path_buf);

        match ImportedModel::load(&path, &self.import_options) {
            Ok(model) => {
                self.status = format!(
                    "Loaded {}: {} vertices, {} triangles",
                    model.name,
                    model.mesh.vertex_count(),
                    model.mesh.triangle_count()
                );
                info!("{}", self.status);
                self.imported = Some(model);
            }
            Err(e) => {
                warn!("Failed to import {}: {}", path.display(), e);
                self.status = format!("Import failed: {}", e);
            }
        }
    }

    fn settings_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Shapes");
        ui.separator();

        if ui.checkbox(&mut self.wireframe, "Wireframe").changed() {
            self.shapes_need_update = true;
        }
        ui.checkbox(&mut self.spin, "Spin");
        ui.add_enabled(
            self.spin,
            egui::Slider::new(&mut self.spin_speed, 0.0..=3.0).text("Speed"),
        );

        ui.separator();
        ui.label("IcoSphere:");
        let p = &mut self.params;
        let mut changed = false;
        changed |= ui
            .add(egui::Slider::new(&mut p.ico_radius, 0.1..=3.0).text("Radius"))
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(
                    &mut p.ico_subdivisions,
                    IcoSphere3D::MIN_SUBDIVISIONS..=IcoSphere3D::MAX_SUBDIVISIONS,
                )
                .text("Subdivisions"),
            )
            .changed();

        ui.label("Torus:");
        changed |= ui
            .add(egui::Slider::new(&mut p.torus_major_radius, 0.1..=3.0).text("Major radius"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut p.torus_minor_radius, 0.05..=1.5).text("Minor radius"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut p.torus_major_segments, Torus3D::MIN_SEGMENTS..=64).text("Rings"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut p.torus_minor_segments, Torus3D::MIN_SEGMENTS..=32).text("Sides"))
            .changed();
        if changed {
            self.shapes_need_update = true;
        }

        ui.separator();
        ui.heading("Import");
        ui.checkbox(&mut self.import_options.z_up_to_y_up, "Z-up source");
        ui.checkbox(&mut self.import_options.normalize, "Normalize size");
        ui.checkbox(&mut self.import_options.reverse_winding, "Reverse winding");
        ui.horizontal(|ui| {
            if ui.button("Open OBJ...").clicked() {
                self.open_obj();
            }
            if self.imported.is_some() && ui.button("Clear").clicked() {
                self.imported = None;
            }
        });

        ui.separator();
        ui.collapsing("Display", |ui| {
            let settings = &mut self.backend.settings;
            ui.add(egui::Slider::new(&mut settings.line_width, 0.5..=5.0).text("Line width"));
            ui.checkbox(&mut settings.outline_solids, "Outline solids");
            ui.add_enabled(
                settings.outline_solids,
                egui::Slider::new(&mut settings.outline_brightness, 0.0..=1.0).text("Outline"),
            );
            ui.horizontal(|ui| {
                ui.label("Background");
                ui.color_edit_button_srgba(&mut settings.background);
            });
            let mut fov = self.backend.camera.fov_degrees();
            if ui
                .add(egui::Slider::new(&mut fov, 20.0..=100.0).text("FOV"))
                .changed()
            {
                self.backend.camera.set_fov_degrees(fov);
            }
        });
    }

    fn viewport(&mut self, ui: &mut egui::Ui) {
        let size = ui.available_size();
        let (response, painter) = ui.allocate_painter(size, egui::Sense::drag());

        if response.dragged() {
            let drag = response.drag_delta();
            self.backend.camera.orbit(drag.x * ORBIT_SPEED, drag.y * ORBIT_SPEED);
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                self.backend.camera.zoom((-scroll * 0.002).exp());
            }
        }

        let delta = ui.input(|i| i.stable_dt);
        if self.spin {
            self.angle = (self.angle + self.spin_speed * delta) % std::f32::consts::TAU;
        }
        self.ico.set_position(Vector3::new(-1.5, 1.5, 0.0));
        self.ico.set_rotation_xyz(0.0, self.angle, 0.0);
        self.torus.set_position(Vector3::new(1.5, 1.5, 0.0));
        self.torus.set_rotation_xyz(self.angle, 0.0, self.angle * 0.5);

        self.backend.begin_frame(response.rect);
        self.scene.draw(&mut self.backend, delta);
        self.ico.draw(&mut self.backend, delta);
        self.torus.draw(&mut self.backend, delta);
        if let Some(imported) = &mut self.imported {
            let transform = Transform3D {
                position: Vector3::new(0.0, 1.0, 0.0),
                rotation: Vector3::new(0.0, self.angle, 0.0),
                ..Default::default()
            };
            imported.draw(
                &mut self.backend,
                &transform,
                DrawStyle::from_wireframe(self.wireframe),
            );
        }
        self.backend.finish(&painter);
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint();

        if self.shapes_need_update {
            self.update_shapes();
        }

        // Top panel
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("shapekit");
                ui.separator();
                ui.toggle_value(&mut self.show_settings, "⚙ Settings");
                ui.separator();
                ui.label(&self.status);
            });
        });

        if self.show_settings {
            egui::SidePanel::left("settings_panel")
                .min_width(240.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| self.settings_panel(ui));
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.viewport(ui);

            ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                ui.horizontal(|ui| {
                    ui.small(format!("Shapes: {}", self.scene.len() + 2));
                    ui.separator();
                    ui.small(format!("Triangles: {}", self.backend.triangle_count()));
                    ui.separator();
                    ui.small(format!(
                        "Meshes: {} / Models: {}",
                        self.backend.live_meshes(),
                        self.backend.live_models()
                    ));
                });
            });
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        ViewerSettings::from_app(self).save();
    }
}
