//! Primitive 2D shapes - Rectangle, Circle
//!
//! Drawn straight at their screen coordinates, no transform stack.
//! Screen space has its origin at the top-left corner, Y pointing down.

use nalgebra::Vector2;

use super::common::{non_negative, set_property, ShapeCommon, ShapeError};
use super::traits::{shape_common, Shape, Shape2D};
use crate::color::Color;
use crate::math::Rect;
use crate::render::{Fill2D, Primitive2D, RenderBackend};

fn fill_for(filled: bool, line_thickness: f32) -> Fill2D {
    if filled {
        Fill2D::Solid
    } else {
        Fill2D::Outline {
            thickness: line_thickness,
        }
    }
}

/// A rectangle with its top-left corner at (x, y)
#[derive(Debug)]
pub struct Rectangle2D {
    common: ShapeCommon,
    location: Vector2<f32>,
    width: f32,
    height: f32,
    filled: bool,
    line_thickness: f32,
    corner_radius: f32,
}

impl Default for Rectangle2D {
    fn default() -> Self {
        Self {
            common: ShapeCommon::new(),
            location: Vector2::zeros(),
            width: 100.0,
            height: 100.0,
            filled: true,
            line_thickness: 1.0,
            corner_radius: 0.0,
        }
    }
}

impl Rectangle2D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_at(x: f32, y: f32, width: f32, height: f32) -> Result<Self, ShapeError> {
        let mut rect = Self {
            location: Vector2::new(x, y),
            ..Self::default()
        };
        rect.set_width(width)?;
        rect.set_height(height)?;
        Ok(rect)
    }

    pub fn new_full(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        filled: bool,
        color: Color,
    ) -> Result<Self, ShapeError> {
        let mut rect = Self::new_at(x, y, width, height)?;
        rect.filled = filled;
        rect.common = ShapeCommon::with_color(color);
        Ok(rect)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn is_filled(&self) -> bool {
        self.filled
    }

    pub fn line_thickness(&self) -> f32 {
        self.line_thickness
    }

    /// 0 = sharp corners
    pub fn corner_radius(&self) -> f32 {
        self.corner_radius
    }

    pub fn set_width(&mut self, width: f32) -> Result<(), ShapeError> {
        let width = non_negative("width", width)?;
        set_property(&mut self.width, width, self.common.observers_mut(), "width");
        Ok(())
    }

    pub fn set_height(&mut self, height: f32) -> Result<(), ShapeError> {
        let height = non_negative("height", height)?;
        set_property(&mut self.height, height, self.common.observers_mut(), "height");
        Ok(())
    }

    pub fn set_filled(&mut self, filled: bool) {
        set_property(&mut self.filled, filled, self.common.observers_mut(), "filled");
    }

    pub fn set_line_thickness(&mut self, thickness: f32) -> Result<(), ShapeError> {
        let thickness = non_negative("line-thickness", thickness)?;
        set_property(&mut self.line_thickness, thickness, self.common.observers_mut(), "line-thickness");
        Ok(())
    }

    pub fn set_corner_radius(&mut self, radius: f32) -> Result<(), ShapeError> {
        let radius = non_negative("corner-radius", radius)?;
        set_property(&mut self.corner_radius, radius, self.common.observers_mut(), "corner-radius");
        Ok(())
    }

    fn rect(&self) -> Rect {
        Rect::new(self.location.x, self.location.y, self.width, self.height)
    }
}

impl Shape for Rectangle2D {
    shape_common!();

    fn name(&self) -> &str {
        "Rectangle2D"
    }

    fn render(&mut self, backend: &mut dyn RenderBackend, _delta: f32) {
        backend.draw_2d(
            &Primitive2D::Rectangle {
                rect: self.rect(),
                corner_radius: self.corner_radius,
                fill: fill_for(self.filled, self.line_thickness),
            },
            self.color(),
        );
    }

    fn compute_bounds(&self) -> Rect {
        self.rect()
    }
}

impl Shape2D for Rectangle2D {
    fn location(&self) -> Vector2<f32> {
        self.location
    }

    fn location_mut(&mut self) -> &mut Vector2<f32> {
        &mut self.location
    }
}

/// A circle centered at (x, y)
#[derive(Debug)]
pub struct Circle2D {
    common: ShapeCommon,
    location: Vector2<f32>,
    radius: f32,
    filled: bool,
    line_thickness: f32,
}

impl Default for Circle2D {
    fn default() -> Self {
        Self {
            common: ShapeCommon::new(),
            location: Vector2::zeros(),
            radius: 10.0,
            filled: true,
            line_thickness: 1.0,
        }
    }
}

impl Circle2D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_at(x: f32, y: f32, radius: f32) -> Result<Self, ShapeError> {
        let mut circle = Self {
            location: Vector2::new(x, y),
            ..Self::default()
        };
        circle.set_radius(radius)?;
        Ok(circle)
    }

    pub fn new_full(x: f32, y: f32, radius: f32, filled: bool, color: Color) -> Result<Self, ShapeError> {
        let mut circle = Self::new_at(x, y, radius)?;
        circle.filled = filled;
        circle.common = ShapeCommon::with_color(color);
        Ok(circle)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_filled(&self) -> bool {
        self.filled
    }

    pub fn line_thickness(&self) -> f32 {
        self.line_thickness
    }

    pub fn set_radius(&mut self, radius: f32) -> Result<(), ShapeError> {
        let radius = non_negative("radius", radius)?;
        set_property(&mut self.radius, radius, self.common.observers_mut(), "radius");
        Ok(())
    }

    pub fn set_filled(&mut self, filled: bool) {
        set_property(&mut self.filled, filled, self.common.observers_mut(), "filled");
    }

    pub fn set_line_thickness(&mut self, thickness: f32) -> Result<(), ShapeError> {
        let thickness = non_negative("line-thickness", thickness)?;
        set_property(&mut self.line_thickness, thickness, self.common.observers_mut(), "line-thickness");
        Ok(())
    }
}

impl Shape for Circle2D {
    shape_common!();

    fn name(&self) -> &str {
        "Circle2D"
    }

    fn render(&mut self, backend: &mut dyn RenderBackend, _delta: f32) {
        backend.draw_2d(
            &Primitive2D::Circle {
                center: self.location,
                radius: self.radius,
                fill: fill_for(self.filled, self.line_thickness),
            },
            self.color(),
        );
    }

    fn compute_bounds(&self) -> Rect {
        Rect::new(
            self.location.x - self.radius,
            self.location.y - self.radius,
            self.radius * 2.0,
            self.radius * 2.0,
        )
    }
}

impl Shape2D for Circle2D {
    fn location(&self) -> Vector2<f32> {
        self.location
    }

    fn location_mut(&mut self) -> &mut Vector2<f32> {
        &mut self.location
    }
}
