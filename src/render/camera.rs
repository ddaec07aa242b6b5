//! Perspective camera for the painter backend
//!
//! Right-handed coordinates: X right, Y up, Z towards the viewer.
//! The default camera sits on a diagonal looking at the origin.

use std::f32::consts::FRAC_PI_2;

use nalgebra::{Matrix4, Point3, Rotation3, Unit, Vector3};

/// Closest the camera may get to its target
const MIN_DISTANCE: f32 = 0.5;

/// Keeps orbiting away from the poles, where the up vector degenerates
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.1;

/// Camera orbiting a target point
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Point3::new(6.0, 5.0, 6.0),
            target: Point3::origin(),
            up: Vector3::y(),
            fov: 45f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn new(position: Point3<f32>, target: Point3<f32>) -> Self {
        Self {
            position,
            target,
            ..Default::default()
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        Matrix4::new_perspective(aspect, self.fov, self.near, self.far)
    }

    /// Projection times view, world space to clip space
    pub fn view_projection(&self, aspect: f32) -> Matrix4<f32> {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov.to_degrees()
    }

    pub fn set_fov_degrees(&mut self, degrees: f32) {
        self.fov = degrees.to_radians();
    }

    /// Distance from the camera to its target
    pub fn distance(&self) -> f32 {
        (self.position - self.target).magnitude()
    }

    /// Move along the view direction to sit `distance` away from the target
    pub fn set_distance(&mut self, distance: f32) {
        let offset = self.position - self.target;
        if let Some(direction) = offset.try_normalize(f32::EPSILON) {
            self.position = self.target + direction * distance.max(MIN_DISTANCE);
        }
    }

    /// Turn `yaw` radians around the up axis and `pitch` radians towards it
    ///
    /// The distance to the target is kept. Pitch stops short of straight
    /// up or down.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let offset = self.position - self.target;
        let (Some(up), Some(direction)) = (
            Unit::try_new(self.up, f32::EPSILON),
            offset.try_normalize(f32::EPSILON),
        ) else {
            return;
        };

        // Current elevation above the plane orthogonal to up
        let elevation = direction.dot(&up).clamp(-1.0, 1.0).asin();
        let pitch = (elevation + pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT) - elevation;

        let offset = Rotation3::from_axis_angle(&up, -yaw) * offset;
        let offset = match Unit::try_new(offset.cross(&up), f32::EPSILON) {
            Some(right) => Rotation3::from_axis_angle(&right, pitch) * offset,
            None => offset,
        };
        self.position = self.target + offset;
    }

    /// Scale the distance to the target by `factor`
    pub fn zoom(&mut self, factor: f32) {
        self.set_distance(self.distance() * factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_keeps_distance() {
        let mut cam = Camera::default();
        let before = cam.distance();
        cam.orbit(0.7, 0.2);
        assert!((cam.distance() - before).abs() < 0.001);
    }

    #[test]
    fn test_orbit_pitch_is_clamped() {
        let mut cam = Camera::default();
        cam.orbit(0.0, 10.0);
        let direction = (cam.position - cam.target).normalize();
        let elevation = direction.dot(&cam.up).asin();
        assert!((elevation - PITCH_LIMIT).abs() < 0.001);
    }

    #[test]
    fn test_orbit_pitch_moves_towards_up() {
        let mut cam = Camera::new(Point3::new(0.0, 0.0, 5.0), Point3::origin());
        cam.orbit(0.0, 0.3);
        assert!(cam.position.y > 0.0);
        assert!((cam.distance() - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_zoom_clamps() {
        let mut cam = Camera::default();
        cam.zoom(0.0);
        assert!((cam.distance() - MIN_DISTANCE).abs() < 0.001);
    }
}
