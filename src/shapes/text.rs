//! Text2D - a line of text at a screen position
//!
//! This module handles:
//! - Loading font files (TTF, OTF) for measurement
//! - Text layout metrics (advance width, line height, letter spacing)
//! - Drawing through the backend's text primitive
//!
//! Without a font the bounds are estimated at half the font size per
//! character, which is close enough for layout in most proportional fonts.

use std::fmt;
use std::path::Path;
use std::rc::Rc;

use ab_glyph::{Font as _, FontArc, PxScale, ScaleFont};
use nalgebra::Vector2;
use thiserror::Error;

use super::common::{at_least, non_negative, set_property, ShapeCommon, ShapeError};
use super::traits::{shape_common, Shape, Shape2D};
use crate::color::Color;
use crate::math::Rect;
use crate::render::{Primitive2D, RenderBackend};

/// Errors that can occur while loading a font
#[derive(Error, Debug)]
pub enum FontError {
    #[error("Failed to read font file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse font: {0}")]
    Parse(String),
}

/// A loaded font, cheap to clone
///
/// Two `Font`s are equal when they share the same loaded data.
#[derive(Clone)]
pub struct Font {
    inner: Rc<FontArc>,
}

impl Font {
    /// Parse font data bytes
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, FontError> {
        let font = FontArc::try_from_vec(data).map_err(|e| FontError::Parse(e.to_string()))?;
        Ok(Self {
            inner: Rc::new(font),
        })
    }

    /// Load a font file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Width and height of `text` at `size` pixels with `spacing` between glyphs
    pub fn measure(&self, text: &str, size: f32, spacing: f32) -> (f32, f32) {
        let scaled = self.inner.as_scaled(PxScale::from(size));

        let mut width = 0.0;
        let mut glyphs = 0usize;
        for ch in text.chars() {
            width += scaled.h_advance(self.inner.glyph_id(ch));
            glyphs += 1;
        }
        if glyphs > 1 {
            width += spacing * (glyphs - 1) as f32;
        }

        (width, scaled.height())
    }
}

impl PartialEq for Font {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("glyphs", &self.inner.glyph_count())
            .finish()
    }
}

/// Estimated size of `text` when no font is available
fn approximate_size(text: &str, size: f32, spacing: f32) -> (f32, f32) {
    let chars = text.chars().count();
    if chars == 0 {
        return (0.0, size);
    }
    let width = chars as f32 * size * 0.5 + spacing * (chars - 1) as f32;
    (width, size)
}

/// A line of text with its top-left corner at (x, y)
#[derive(Debug)]
pub struct Text2D {
    common: ShapeCommon,
    location: Vector2<f32>,
    text: String,
    font_size: f32,
    spacing: f32,
    font: Option<Font>,
}

impl Default for Text2D {
    fn default() -> Self {
        Self {
            common: ShapeCommon::new(),
            location: Vector2::zeros(),
            text: String::new(),
            font_size: 20.0,
            spacing: 1.0,
            font: None,
        }
    }
}

impl Text2D {
    pub const MIN_FONT_SIZE: f32 = 1.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_at(x: f32, y: f32, text: impl Into<String>) -> Self {
        Self {
            location: Vector2::new(x, y),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn new_full(
        x: f32,
        y: f32,
        text: impl Into<String>,
        font_size: f32,
        color: Color,
    ) -> Result<Self, ShapeError> {
        let mut label = Self::new_at(x, y, text);
        label.set_font_size(font_size)?;
        label.common = ShapeCommon::with_color(color);
        Ok(label)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Extra pixels between glyphs
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// `None` means the backend's default font
    pub fn font(&self) -> Option<&Font> {
        self.font.as_ref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        set_property(&mut self.text, text, self.common.observers_mut(), "text");
    }

    pub fn set_font_size(&mut self, size: f32) -> Result<(), ShapeError> {
        let size = at_least("font-size", size, Self::MIN_FONT_SIZE)?;
        set_property(&mut self.font_size, size, self.common.observers_mut(), "font-size");
        Ok(())
    }

    pub fn set_spacing(&mut self, spacing: f32) -> Result<(), ShapeError> {
        let spacing = non_negative("spacing", spacing)?;
        set_property(&mut self.spacing, spacing, self.common.observers_mut(), "spacing");
        Ok(())
    }

    pub fn set_font(&mut self, font: Option<Font>) {
        set_property(&mut self.font, font, self.common.observers_mut(), "font");
    }

    /// Rendered size in pixels
    pub fn measure(&self) -> (f32, f32) {
        match &self.font {
            Some(font) => font.measure(&self.text, self.font_size, self.spacing),
            None => approximate_size(&self.text, self.font_size, self.spacing),
        }
    }
}

impl Shape for Text2D {
    shape_common!();

    fn name(&self) -> &str {
        "Text2D"
    }

    fn render(&mut self, backend: &mut dyn RenderBackend, _delta: f32) {
        if self.text.is_empty() {
            return;
        }
        backend.draw_2d(
            &Primitive2D::Text {
                text: &self.text,
                x: self.location.x,
                y: self.location.y,
                font_size: self.font_size,
                spacing: self.spacing,
                font: self.font.as_ref(),
            },
            self.color(),
        );
    }

    fn compute_bounds(&self) -> Rect {
        let (width, height) = self.measure();
        Rect::new(self.location.x, self.location.y, width, height)
    }
}

impl Shape2D for Text2D {
    fn location(&self) -> Vector2<f32> {
        self.location
    }

    fn location_mut(&mut self) -> &mut Vector2<f32> {
        &mut self.location
    }
}
