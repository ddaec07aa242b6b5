//! Shape trait definitions
//!
//! The traits layer like this:
//!
//! ```text
//! Drawable            draw(backend, delta), bounds()
//!   ^ blanket impl
//! Shape               visibility, color, z-index, observers, render()
//!   ^           ^
//! Shape2D     Shape3D x/y position | transform + wireframe
//! ```
//!
//! Concrete shapes implement `Shape` plus one of `Shape2D` / `Shape3D`.
//! They never implement `Drawable` themselves: the blanket impl is what
//! guarantees an invisible shape never reaches its `render` routine.
//!
//! ## Trait objects
//!
//! `Shape` is object safe, so mixed collections use `Box<dyn Shape>`.
//! Methods taking closures or returning guards are `where Self: Sized` and
//! are only available on concrete types.

use std::ops::{Deref, DerefMut};

use nalgebra::{Vector2, Vector3};

use super::common::{ShapeCommon, Spatial};
use crate::color::Color;
use crate::math::{Rect, Transform3D};
use crate::property::{ChangeSet, ObserverId};
use crate::render::{DrawStyle, Primitive3D, RenderBackend, TransformScope};

/// Something that can be drawn once per frame
pub trait Drawable {
    /// Draw with the frame delta in seconds
    fn draw(&mut self, backend: &mut dyn RenderBackend, delta: f32);

    /// Screen-space bounding rectangle
    fn bounds(&self) -> Rect {
        Rect::ZERO
    }
}

/// Base of every shape
pub trait Shape {
    fn common(&self) -> &ShapeCommon;
    fn common_mut(&mut self) -> &mut ShapeCommon;

    /// Get the name of this shape (for UI display)
    fn name(&self) -> &str;

    /// Emit draw calls. Only called while the shape is visible.
    fn render(&mut self, backend: &mut dyn RenderBackend, delta: f32);

    /// Bounding rectangle; zero unless the shape knows better
    fn compute_bounds(&self) -> Rect {
        Rect::ZERO
    }

    fn is_visible(&self) -> bool {
        self.common().visible()
    }

    fn set_visible(&mut self, visible: bool) {
        self.common_mut().set_visible(visible);
    }

    fn color(&self) -> Color {
        self.common().color()
    }

    fn set_color(&mut self, color: Color) {
        self.common_mut().set_color(color);
    }

    fn z_index(&self) -> i32 {
        self.common().z_index()
    }

    fn set_z_index(&mut self, z_index: i32) {
        self.common_mut().set_z_index(z_index);
    }

    /// Run `callback` with the names of changed properties
    fn connect(&mut self, callback: impl FnMut(&ChangeSet) + 'static) -> ObserverId
    where
        Self: Sized,
    {
        self.common_mut().observers_mut().connect(callback)
    }

    fn disconnect(&mut self, id: ObserverId) -> bool {
        self.common_mut().observers_mut().disconnect(id)
    }

    /// Hold back notifications until the returned guard drops
    ///
    /// ```ignore
    /// let mut cube = shape.begin_batch();
    /// cube.set_position(p);
    /// cube.set_color(c);
    /// // observers see one ChangeSet with both properties here
    /// ```
    fn begin_batch(&mut self) -> Batch<'_, Self>
    where
        Self: Sized,
    {
        Batch::new(self)
    }
}

impl<S: Shape + ?Sized> Drawable for S {
    fn draw(&mut self, backend: &mut dyn RenderBackend, delta: f32) {
        if !self.is_visible() {
            return;
        }
        self.render(backend, delta);
    }

    fn bounds(&self) -> Rect {
        self.compute_bounds()
    }
}

/// Batched update of a shape, see [`Shape::begin_batch`]
pub struct Batch<'a, S: Shape + ?Sized> {
    shape: &'a mut S,
}

impl<'a, S: Shape + ?Sized> Batch<'a, S> {
    pub fn new(shape: &'a mut S) -> Self {
        shape.common_mut().observers_mut().freeze();
        Self { shape }
    }
}

impl<S: Shape + ?Sized> Deref for Batch<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.shape
    }
}

impl<S: Shape + ?Sized> DerefMut for Batch<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.shape
    }
}

impl<S: Shape + ?Sized> Drop for Batch<'_, S> {
    fn drop(&mut self) {
        self.shape.common_mut().observers_mut().thaw();
    }
}

/// A shape positioned in screen space
pub trait Shape2D: Shape {
    fn location(&self) -> Vector2<f32>;
    fn location_mut(&mut self) -> &mut Vector2<f32>;

    fn x(&self) -> f32 {
        self.location().x
    }

    fn y(&self) -> f32 {
        self.location().y
    }

    fn set_x(&mut self, x: f32) {
        if self.location().x != x {
            self.location_mut().x = x;
            self.common_mut().observers_mut().notify("x");
        }
    }

    fn set_y(&mut self, y: f32) {
        if self.location().y != y {
            self.location_mut().y = y;
            self.common_mut().observers_mut().notify("y");
        }
    }

    /// Set both coordinates with a single notification
    fn set_position(&mut self, x: f32, y: f32) {
        self.common_mut().observers_mut().freeze();
        self.set_x(x);
        self.set_y(y);
        self.common_mut().observers_mut().thaw();
    }
}

/// A shape placed in the world by a transform
///
/// The transform is always applied as translate, rotate X, rotate Y,
/// rotate Z, scale.
pub trait Shape3D: Shape {
    fn spatial(&self) -> &Spatial;
    fn spatial_mut(&mut self) -> &mut Spatial;

    fn transform(&self) -> &Transform3D {
        &self.spatial().transform
    }

    fn position(&self) -> Vector3<f32> {
        self.transform().position
    }

    /// Euler angles in radians (x = pitch, y = yaw, z = roll)
    fn rotation(&self) -> Vector3<f32> {
        self.transform().rotation
    }

    fn scale(&self) -> Vector3<f32> {
        self.transform().scale
    }

    fn set_position(&mut self, position: Vector3<f32>) {
        if self.position() != position {
            self.spatial_mut().transform.position = position;
            self.common_mut().observers_mut().notify("position");
        }
    }

    fn set_position_xyz(&mut self, x: f32, y: f32, z: f32) {
        self.set_position(Vector3::new(x, y, z));
    }

    fn set_rotation(&mut self, rotation: Vector3<f32>) {
        if self.rotation() != rotation {
            self.spatial_mut().transform.rotation = rotation;
            self.common_mut().observers_mut().notify("rotation");
        }
    }

    fn set_rotation_xyz(&mut self, x: f32, y: f32, z: f32) {
        self.set_rotation(Vector3::new(x, y, z));
    }

    fn set_scale(&mut self, scale: Vector3<f32>) {
        if self.scale() != scale {
            self.spatial_mut().transform.scale = scale;
            self.common_mut().observers_mut().notify("scale");
        }
    }

    fn set_scale_xyz(&mut self, x: f32, y: f32, z: f32) {
        self.set_scale(Vector3::new(x, y, z));
    }

    fn set_uniform_scale(&mut self, scale: f32) {
        self.set_scale(Vector3::repeat(scale));
    }

    /// Replace position, rotation and scale with a single notification
    fn set_transform(&mut self, position: Vector3<f32>, rotation: Vector3<f32>, scale: Vector3<f32>) {
        self.common_mut().observers_mut().freeze();
        self.set_position(position);
        self.set_rotation(rotation);
        self.set_scale(scale);
        self.common_mut().observers_mut().thaw();
    }

    fn is_wireframe(&self) -> bool {
        self.spatial().wireframe
    }

    fn set_wireframe(&mut self, wireframe: bool) {
        if self.is_wireframe() != wireframe {
            self.spatial_mut().wireframe = wireframe;
            self.common_mut().observers_mut().notify("wireframe");
        }
    }

    fn draw_style(&self) -> DrawStyle {
        DrawStyle::from_wireframe(self.is_wireframe())
    }

    /// Draw `primitive` at the local origin under this shape's transform
    fn draw_transformed(&self, backend: &mut dyn RenderBackend, primitive: &Primitive3D) {
        let mut scope = TransformScope::push(backend);
        scope.apply(self.transform());
        scope.draw_3d(primitive, self.draw_style(), self.color());
    }
}

/// Implements the `Shape3D` accessors for a type with a `spatial` field
macro_rules! impl_shape3d {
    ($ty:ty) => {
        impl $crate::shapes::Shape3D for $ty {
            fn spatial(&self) -> &$crate::shapes::Spatial {
                &self.spatial
            }

            fn spatial_mut(&mut self) -> &mut $crate::shapes::Spatial {
                &mut self.spatial
            }
        }
    };
}

/// Implements the `Shape` state accessors for a type with a `common` field
macro_rules! shape_common {
    () => {
        fn common(&self) -> &$crate::shapes::ShapeCommon {
            &self.common
        }

        fn common_mut(&mut self) -> &mut $crate::shapes::ShapeCommon {
            &mut self.common
        }
    };
}

pub(crate) use {impl_shape3d, shape_common};
