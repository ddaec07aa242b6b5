//! ShapeLayer - composition of multiple shapes
//!
//! A layer owns boxed shapes and is itself a shape, so layers nest.
//! Children are drawn by ascending z-index; equal z-indices keep
//! insertion order.

use super::common::ShapeCommon;
use super::traits::{shape_common, Drawable, Shape};
use crate::math::Rect;
use crate::render::RenderBackend;

/// An ordered group of shapes drawn as one
#[derive(Default)]
pub struct ShapeLayer {
    common: ShapeCommon,
    shapes: Vec<Box<dyn Shape>>,
    name: String,
}

impl ShapeLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: ShapeCommon::new(),
            shapes: Vec::new(),
            name: name.into(),
        }
    }

    /// Add a shape on top of the existing ones with the same z-index
    pub fn add<S: Shape + 'static>(&mut self, shape: S) -> &mut Self {
        self.shapes.push(Box::new(shape));
        self
    }

    pub fn add_boxed(&mut self, shape: Box<dyn Shape>) -> &mut Self {
        self.shapes.push(shape);
        self
    }

    /// Remove a shape by insertion index
    pub fn remove(&mut self, index: usize) -> Option<Box<dyn Shape>> {
        if index < self.shapes.len() {
            Some(self.shapes.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn Shape> {
        self.shapes.get(index).map(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut (dyn Shape + 'static)> {
        self.shapes.get_mut(index).map(|s| s.as_mut())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Shape> {
        self.shapes.iter().map(|s| s.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut (dyn Shape + 'static)> {
        self.shapes.iter_mut().map(|s| s.as_mut())
    }

    /// Insertion indices in draw order
    pub fn draw_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.shapes.len()).collect();
        // sort_by_key is stable
        order.sort_by_key(|&i| self.shapes[i].z_index());
        order
    }
}

impl Shape for ShapeLayer {
    shape_common!();

    fn name(&self) -> &str {
        if self.name.is_empty() {
            "ShapeLayer"
        } else {
            &self.name
        }
    }

    fn render(&mut self, backend: &mut dyn RenderBackend, delta: f32) {
        for index in self.draw_order() {
            self.shapes[index].draw(backend, delta);
        }
    }

    /// Union of the visible children's bounds
    fn compute_bounds(&self) -> Rect {
        self.shapes
            .iter()
            .filter(|s| s.is_visible())
            .fold(Rect::ZERO, |acc, s| acc.union(&s.bounds()))
    }
}
