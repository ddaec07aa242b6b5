//! Math helpers shared by shapes and backends
//!
//! - `Rect` for 2D bounds
//! - `Axis` for the three rotation axes
//! - `Transform3D`, the fixed-order position/rotation/scale transform
//!
//! ## Transform order
//!
//! Every 3D shape composes its transform the same way:
//!
//! ```text
//! M = T(position) * Rx(rotation.x) * Ry(rotation.y) * Rz(rotation.z) * S(scale)
//! ```
//!
//! A local point is scaled first, then rotated about Z, Y and X, then
//! translated. Backends receive the same sequence as matrix-stack calls.

use nalgebra::{Matrix4, Point3, Unit, Vector3};

/// Axis-aligned rectangle in screen space
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Rect = Rect::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Smallest rectangle containing both; empty rectangles are ignored
    pub fn union(&self, other: &Rect) -> Rect {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Rect::new(x, y, right - x, bottom - y)
    }
}

/// One of the three rotation axes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Rotation order used by every 3D shape
    pub const ROTATION_ORDER: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn unit(self) -> Unit<Vector3<f32>> {
        match self {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        }
    }

    /// Component of an Euler-angle vector for this axis
    pub fn component(self, v: &Vector3<f32>) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }
}

/// Position, Euler rotation (radians) and non-uniform scale
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3D {
    pub position: Vector3<f32>,
    /// x = pitch, y = yaw, z = roll
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform3D {
    /// Identity transform placed at `position`
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Rotation part only: Rx * Ry * Rz
    pub fn rotation_matrix(&self) -> Matrix4<f32> {
        Axis::ROTATION_ORDER
            .iter()
            .fold(Matrix4::identity(), |acc, &axis| {
                acc * Matrix4::from_axis_angle(&axis.unit(), axis.component(&self.rotation))
            })
    }

    /// Full model matrix: T * Rx * Ry * Rz * S
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.position)
            * self.rotation_matrix()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }

    /// Map a local-space point to world space
    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        self.matrix().transform_point(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: &Point3<f32>, b: &Point3<f32>) -> bool {
        (a - b).norm() < 0.001
    }

    #[test]
    fn test_identity() {
        let t = Transform3D::default();
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!(close(&t.transform_point(&p), &p));
    }

    #[test]
    fn test_scale_before_translate() {
        let t = Transform3D {
            position: Vector3::new(10.0, 0.0, 0.0),
            scale: Vector3::new(2.0, 2.0, 2.0),
            ..Default::default()
        };
        let p = t.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(close(&p, &Point3::new(12.0, 0.0, 0.0)));
    }

    #[test]
    fn test_rotation_order_x_then_y_then_z() {
        // Rx * Ry * Rz applied to a point means Z acts first
        let t = Transform3D {
            rotation: Vector3::new(FRAC_PI_2, 0.0, FRAC_PI_2),
            ..Default::default()
        };
        // Rz(90) maps +X to +Y, then Rx(90) maps +Y to +Z
        let p = t.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(close(&p, &Point3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(10.0, 10.0, 5.0, 5.0);
        assert!(r.contains(12.0, 12.0));
        assert!(!r.contains(2.0, 12.0));
        assert!(Rect::ZERO.is_empty());
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -5.0, 10.0, 10.0);
        assert_eq!(a.union(&b), Rect::new(0.0, -5.0, 15.0, 15.0));
        assert_eq!(Rect::ZERO.union(&b), b);
        assert_eq!(a.union(&Rect::ZERO), a);
    }
}
