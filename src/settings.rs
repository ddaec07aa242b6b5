use std::path::PathBuf;

use eframe::egui;
use serde::{Deserialize, Serialize};

use shapekit::mesh::ImportOptions;

use crate::ViewerApp;

/// Returns the path to the settings file: `~/.config/shapekit/settings.json`
fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("shapekit");
    path.push("settings.json");
    path
}

/// Persisted viewer settings.
///
/// Serialized as JSON to the platform config directory.
/// Fields use `#[serde(default)]` so that adding new settings
/// won't break existing config files.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub show_settings: bool,

    // Shape params
    pub ico_radius: f32,
    pub ico_subdivisions: u32,
    pub torus_major_radius: f32,
    pub torus_minor_radius: f32,
    pub torus_major_segments: u32,
    pub torus_minor_segments: u32,

    // Scene
    pub wireframe: bool,
    pub spin: bool,
    pub spin_speed: f32,

    // Camera
    pub camera_distance: f32,
    pub camera_fov: f32,

    // Display
    pub line_width: f32,
    pub outline_solids: bool,
    pub background_r: u8,
    pub background_g: u8,
    pub background_b: u8,

    // Import
    pub import: ImportOptions,
    pub last_directory: Option<PathBuf>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            show_settings: true,

            ico_radius: 1.0,
            ico_subdivisions: 2,
            torus_major_radius: 1.0,
            torus_minor_radius: 0.25,
            torus_major_segments: 32,
            torus_minor_segments: 16,

            wireframe: false,
            spin: true,
            spin_speed: 0.5,

            camera_distance: 10.0,
            camera_fov: 45.0,

            line_width: 1.5,
            outline_solids: true,
            background_r: 24,
            background_g: 24,
            background_b: 28,

            import: ImportOptions {
                normalize: true,
                ..ImportOptions::default()
            },
            last_directory: None,
        }
    }
}

impl ViewerSettings {
    /// Load settings from disk, falling back to defaults on any error.
    pub fn load() -> Self {
        let path = settings_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Failed to parse settings ({}), using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("No settings file found ({}), using defaults", e);
                Self::default()
            }
        }
    }

    fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str(contents)
    }

    /// Save settings to disk as pretty JSON.
    pub fn save(&self) {
        let path = settings_path();
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::warn!("Failed to create config directory: {}", e);
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => match std::fs::write(&path, json) {
                Ok(()) => log::info!("Saved settings to {}", path.display()),
                Err(e) => log::warn!("Failed to write settings: {}", e),
            },
            Err(e) => {
                log::warn!("Failed to serialize settings: {}", e);
            }
        }
    }

    /// Extract current settings from the running viewer.
    pub fn from_app(app: &ViewerApp) -> Self {
        let background = app.backend.settings.background;
        Self {
            show_settings: app.show_settings,

            ico_radius: app.params.ico_radius,
            ico_subdivisions: app.params.ico_subdivisions,
            torus_major_radius: app.params.torus_major_radius,
            torus_minor_radius: app.params.torus_minor_radius,
            torus_major_segments: app.params.torus_major_segments,
            torus_minor_segments: app.params.torus_minor_segments,

            wireframe: app.wireframe,
            spin: app.spin,
            spin_speed: app.spin_speed,

            camera_distance: app.backend.camera.distance(),
            camera_fov: app.backend.camera.fov_degrees(),

            line_width: app.backend.settings.line_width,
            outline_solids: app.backend.settings.outline_solids,
            background_r: background.r(),
            background_g: background.g(),
            background_b: background.b(),

            import: app.import_options,
            last_directory: app.last_directory.clone(),
        }
    }

    /// Apply loaded settings to the running viewer.
    pub fn apply(&self, app: &mut ViewerApp) {
        app.show_settings = self.show_settings;

        app.params.ico_radius = self.ico_radius;
        app.params.ico_subdivisions = self.ico_subdivisions;
        app.params.torus_major_radius = self.torus_major_radius;
        app.params.torus_minor_radius = self.torus_minor_radius;
        app.params.torus_major_segments = self.torus_major_segments;
        app.params.torus_minor_segments = self.torus_minor_segments;

        app.wireframe = self.wireframe;
        app.spin = self.spin;
        app.spin_speed = self.spin_speed;

        app.backend.camera.set_distance(self.camera_distance);
        app.backend.camera.set_fov_degrees(self.camera_fov);

        app.backend.settings.line_width = self.line_width;
        app.backend.settings.outline_solids = self.outline_solids;
        app.backend.settings.background =
            egui::Color32::from_rgb(self.background_r, self.background_g, self.background_b);

        app.import_options = self.import;
        app.last_directory = self.last_directory.clone();

        app.shapes_need_update = true;
    }
}
