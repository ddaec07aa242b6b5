//! RGBA8 color value used by every shape
//!
//! Colors are plain `Copy` values. Assigning a color to a shape always
//! copies it, so two shapes can never observe each other's mutations.

use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel RGBA color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const BLANK: Color = Color::rgba(0, 0, 0, 0);
    pub const RED: Color = Color::rgba(230, 41, 55, 255);
    pub const GREEN: Color = Color::rgba(0, 228, 48, 255);
    pub const BLUE: Color = Color::rgba(0, 121, 241, 255);
    pub const YELLOW: Color = Color::rgba(253, 249, 0, 255);
    pub const ORANGE: Color = Color::rgba(255, 161, 0, 255);
    pub const PURPLE: Color = Color::rgba(200, 122, 255, 255);
    pub const GRAY: Color = Color::rgba(130, 130, 130, 255);
    pub const DARK_GRAY: Color = Color::rgba(80, 80, 80, 255);

    /// Create a color from all four channels
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Same color with a different alpha
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Scale the alpha channel by `factor` (clamped to 0..=1)
    pub fn fade(self, factor: f32) -> Self {
        let alpha = (self.a as f32 * factor.clamp(0.0, 1.0)).round() as u8;
        self.with_alpha(alpha)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::rgba(r, g, b, a)
    }
}

impl From<Color> for eframe::egui::Color32 {
    fn from(color: Color) -> Self {
        eframe::egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
    }
}
