//! Flat and line-based 3D primitives - Plane, Circle, Grid, Line

use nalgebra::{Point3, Unit, Vector2, Vector3};

use super::common::{in_range, non_negative, set_property, ShapeCommon, ShapeError, Spatial};
use super::traits::{impl_shape3d, shape_common, Shape, Shape3D};
use crate::color::Color;
use crate::mesh::generate::MAX_SEGMENTS;
use crate::render::{Primitive3D, RenderBackend, TransformScope};

/// Rectangle on the local XZ plane, facing +Y
#[derive(Debug)]
pub struct Plane3D {
    common: ShapeCommon,
    spatial: Spatial,
    width: f32,
    length: f32,
}

impl Default for Plane3D {
    fn default() -> Self {
        Self {
            common: ShapeCommon::new(),
            spatial: Spatial::default(),
            width: 1.0,
            length: 1.0,
        }
    }
}

impl Plane3D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_at(position: Vector3<f32>, width: f32, length: f32) -> Result<Self, ShapeError> {
        let mut plane = Self {
            spatial: Spatial::at(position),
            ..Self::default()
        };
        plane.set_width(width)?;
        plane.set_length(length)?;
        Ok(plane)
    }

    pub fn new_full(position: Vector3<f32>, width: f32, length: f32, color: Color) -> Result<Self, ShapeError> {
        let mut plane = Self::new_at(position, width, length)?;
        plane.common = ShapeCommon::with_color(color);
        Ok(plane)
    }

    /// Extent along X
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Extent along Z
    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn set_width(&mut self, width: f32) -> Result<(), ShapeError> {
        let width = non_negative("width", width)?;
        set_property(&mut self.width, width, self.common.observers_mut(), "width");
        Ok(())
    }

    pub fn set_length(&mut self, length: f32) -> Result<(), ShapeError> {
        let length = non_negative("length", length)?;
        set_property(&mut self.length, length, self.common.observers_mut(), "length");
        Ok(())
    }
}

impl Shape for Plane3D {
    shape_common!();

    fn name(&self) -> &str {
        "Plane3D"
    }

    fn render(&mut self, backend: &mut dyn RenderBackend, _delta: f32) {
        self.draw_transformed(
            backend,
            &Primitive3D::Plane {
                size: Vector2::new(self.width, self.length),
            },
        );
    }
}

impl_shape3d!(Plane3D);

/// How a circle's interior is drawn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillType {
    /// Rim only
    #[default]
    None,
    Solid,
}

/// Circle with its own plane orientation
///
/// The circle primitive lies in the XY plane. `rotation_axis` and
/// `rotation_angle` turn it into place on top of the shape's transform; the
/// default tips it over onto the XZ plane.
#[derive(Debug)]
pub struct Circle3D {
    common: ShapeCommon,
    spatial: Spatial,
    radius: f32,
    vertices: u32,
    fill_type: FillType,
    rotation_axis: Vector3<f32>,
    rotation_angle: f32,
}

impl Default for Circle3D {
    fn default() -> Self {
        Self {
            common: ShapeCommon::new(),
            spatial: Spatial::default(),
            radius: 1.0,
            vertices: 32,
            fill_type: FillType::None,
            rotation_axis: Vector3::x(),
            rotation_angle: 90f32.to_radians(),
        }
    }
}

impl Circle3D {
    pub const MIN_VERTICES: u32 = 3;
    pub const MAX_VERTICES: u32 = MAX_SEGMENTS;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_at(position: Vector3<f32>, radius: f32) -> Result<Self, ShapeError> {
        let mut circle = Self {
            spatial: Spatial::at(position),
            ..Self::default()
        };
        circle.set_radius(radius)?;
        Ok(circle)
    }

    pub fn new_full(
        position: Vector3<f32>,
        radius: f32,
        vertices: u32,
        fill_type: FillType,
        color: Color,
    ) -> Result<Self, ShapeError> {
        let mut circle = Self::new_at(position, radius)?;
        circle.set_vertices(vertices)?;
        circle.fill_type = fill_type;
        circle.common = ShapeCommon::with_color(color);
        Ok(circle)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn vertices(&self) -> u32 {
        self.vertices
    }

    pub fn fill_type(&self) -> FillType {
        self.fill_type
    }

    pub fn rotation_axis(&self) -> Vector3<f32> {
        self.rotation_axis
    }

    /// Radians
    pub fn rotation_angle(&self) -> f32 {
        self.rotation_angle
    }

    pub fn set_radius(&mut self, radius: f32) -> Result<(), ShapeError> {
        let radius = non_negative("radius", radius)?;
        set_property(&mut self.radius, radius, self.common.observers_mut(), "radius");
        Ok(())
    }

    pub fn set_vertices(&mut self, vertices: u32) -> Result<(), ShapeError> {
        let vertices = in_range("vertices", vertices, Self::MIN_VERTICES, Self::MAX_VERTICES)?;
        set_property(&mut self.vertices, vertices, self.common.observers_mut(), "vertices");
        Ok(())
    }

    pub fn set_fill_type(&mut self, fill_type: FillType) {
        set_property(&mut self.fill_type, fill_type, self.common.observers_mut(), "fill-type");
    }

    /// A zero axis disables the extra rotation
    pub fn set_rotation_axis(&mut self, axis: Vector3<f32>) {
        set_property(&mut self.rotation_axis, axis, self.common.observers_mut(), "rotation-axis");
    }

    pub fn set_rotation_angle(&mut self, angle: f32) {
        set_property(&mut self.rotation_angle, angle, self.common.observers_mut(), "rotation-angle");
    }
}

impl Shape for Circle3D {
    shape_common!();

    fn name(&self) -> &str {
        "Circle3D"
    }

    fn render(&mut self, backend: &mut dyn RenderBackend, _delta: f32) {
        let mut scope = TransformScope::push(backend);
        scope.apply(self.transform());
        if let Some(axis) = Unit::try_new(self.rotation_axis, f32::EPSILON) {
            scope.rotate(axis, self.rotation_angle);
        }

        // Wireframe always shows the rim
        let filled = self.fill_type == FillType::Solid && !self.is_wireframe();
        scope.draw_3d(
            &Primitive3D::Circle {
                radius: self.radius,
                vertices: self.vertices,
                filled,
            },
            self.draw_style(),
            self.color(),
        );
    }
}

impl_shape3d!(Circle3D);

/// Line grid on the XZ plane
///
/// The grid is always centered on the local origin: its position is stored
/// and reported like any other shape's but never applied when drawing.
/// Rotation and scale still apply.
#[derive(Debug)]
pub struct Grid3D {
    common: ShapeCommon,
    spatial: Spatial,
    slices: u32,
    spacing: f32,
}

impl Default for Grid3D {
    fn default() -> Self {
        Self {
            common: ShapeCommon::new(),
            spatial: Spatial::default(),
            slices: 10,
            spacing: 1.0,
        }
    }
}

impl Grid3D {
    pub const MIN_SLICES: u32 = 1;
    pub const MAX_SLICES: u32 = MAX_SEGMENTS;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_at(position: Vector3<f32>, slices: u32, spacing: f32) -> Result<Self, ShapeError> {
        let mut grid = Self {
            spatial: Spatial::at(position),
            ..Self::default()
        };
        grid.set_slices(slices)?;
        grid.set_spacing(spacing)?;
        Ok(grid)
    }

    pub fn new_full(position: Vector3<f32>, slices: u32, spacing: f32, color: Color) -> Result<Self, ShapeError> {
        let mut grid = Self::new_at(position, slices, spacing)?;
        grid.common = ShapeCommon::with_color(color);
        Ok(grid)
    }

    pub fn slices(&self) -> u32 {
        self.slices
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn set_slices(&mut self, slices: u32) -> Result<(), ShapeError> {
        let slices = in_range("slices", slices, Self::MIN_SLICES, Self::MAX_SLICES)?;
        set_property(&mut self.slices, slices, self.common.observers_mut(), "slices");
        Ok(())
    }

    pub fn set_spacing(&mut self, spacing: f32) -> Result<(), ShapeError> {
        let spacing = non_negative("spacing", spacing)?;
        set_property(&mut self.spacing, spacing, self.common.observers_mut(), "spacing");
        Ok(())
    }
}

impl Shape for Grid3D {
    shape_common!();

    fn name(&self) -> &str {
        "Grid3D"
    }

    fn render(&mut self, backend: &mut dyn RenderBackend, _delta: f32) {
        let mut scope = TransformScope::push(backend);
        scope.apply_rotation_and_scale(self.transform());
        scope.draw_3d(
            &Primitive3D::Grid {
                slices: self.slices,
                spacing: self.spacing,
            },
            self.draw_style(),
            self.color(),
        );
    }
}

impl_shape3d!(Grid3D);

/// Line segment from the shape's position to `end`
#[derive(Debug)]
pub struct Line3D {
    common: ShapeCommon,
    spatial: Spatial,
    end: Vector3<f32>,
}

impl Default for Line3D {
    fn default() -> Self {
        Self {
            common: ShapeCommon::new(),
            spatial: Spatial::default(),
            end: Vector3::x(),
        }
    }
}

impl Line3D {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line from `start` to `end`, both in world space
    pub fn new_at(start: Vector3<f32>, end: Vector3<f32>) -> Result<Self, ShapeError> {
        Ok(Self {
            spatial: Spatial::at(start),
            end,
            ..Self::default()
        })
    }

    pub fn new_full(start: Vector3<f32>, end: Vector3<f32>, color: Color) -> Result<Self, ShapeError> {
        let mut line = Self::new_at(start, end)?;
        line.common = ShapeCommon::with_color(color);
        Ok(line)
    }

    /// Same as the position
    pub fn start(&self) -> Vector3<f32> {
        self.position()
    }

    pub fn end(&self) -> Vector3<f32> {
        self.end
    }

    pub fn set_end(&mut self, end: Vector3<f32>) {
        set_property(&mut self.end, end, self.common.observers_mut(), "end");
    }

    pub fn length(&self) -> f32 {
        (self.end - self.position()).norm()
    }
}

impl Shape for Line3D {
    shape_common!();

    fn name(&self) -> &str {
        "Line3D"
    }

    fn render(&mut self, backend: &mut dyn RenderBackend, _delta: f32) {
        self.draw_transformed(
            backend,
            &Primitive3D::Line {
                start: Point3::origin(),
                end: Point3::from(self.end - self.position()),
            },
        );
    }
}

impl_shape3d!(Line3D);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, DrawStyle, RecordingBackend};
    use crate::shapes::Drawable;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_defaults() {
        let plane = Plane3D::new();
        assert_eq!((plane.width(), plane.length()), (1.0, 1.0));

        let circle = Circle3D::new();
        assert_eq!(circle.radius(), 1.0);
        assert_eq!(circle.vertices(), 32);
        assert_eq!(circle.fill_type(), FillType::None);
        assert_eq!(circle.rotation_axis(), Vector3::x());
        assert!((circle.rotation_angle() - std::f32::consts::FRAC_PI_2).abs() < 0.0001);

        let grid = Grid3D::new();
        assert_eq!((grid.slices(), grid.spacing()), (10, 1.0));

        let line = Line3D::new();
        assert_eq!(line.end(), Vector3::x());
        assert!((line.length() - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_new_at_round_trips_position() {
        let p = Vector3::new(3.0, -2.0, 0.5);
        assert_eq!(Plane3D::new_at(p, 2.0, 3.0).unwrap().position(), p);
        assert_eq!(Circle3D::new_at(p, 2.0).unwrap().position(), p);
        assert_eq!(Grid3D::new_at(p, 4, 0.5).unwrap().position(), p);
        assert_eq!(Line3D::new_at(p, Vector3::zeros()).unwrap().position(), p);
    }

    #[test]
    fn test_invalid_values_keep_previous() {
        let mut plane = Plane3D::new();
        assert!(plane.set_length(-3.0).is_err());
        assert_eq!(plane.length(), 1.0);

        let mut circle = Circle3D::new();
        assert!(circle.set_vertices(2).is_err());
        assert!(circle.set_radius(-1.0).is_err());
        assert_eq!((circle.vertices(), circle.radius()), (32, 1.0));

        let mut grid = Grid3D::new();
        assert!(grid.set_slices(0).is_err());
        assert!(grid.set_spacing(-0.5).is_err());
        assert_eq!((grid.slices(), grid.spacing()), (10, 1.0));
    }

    #[test]
    fn test_counts_above_maximum_rejected() {
        let mut circle = Circle3D::new();
        assert!(matches!(
            circle.set_vertices(Circle3D::MAX_VERTICES + 1),
            Err(ShapeError::OutOfRange { property: "vertices", .. })
        ));
        assert_eq!(circle.vertices(), 32);
        assert!(circle.set_vertices(Circle3D::MAX_VERTICES).is_ok());

        let mut grid = Grid3D::new();
        assert!(matches!(
            grid.set_slices(u32::MAX),
            Err(ShapeError::OutOfRange { property: "slices", .. })
        ));
        assert_eq!(grid.slices(), 10);

        assert!(Grid3D::new_at(Vector3::zeros(), u32::MAX, 1.0).is_err());
        assert!(Circle3D::new_full(Vector3::zeros(), 1.0, u32::MAX, FillType::Solid, Color::RED).is_err());
    }

    #[test]
    fn test_setting_current_value_is_silent() {
        let mut circle = Circle3D::new();
        let mut grid = Grid3D::new();
        let mut line = Line3D::new();

        let notified = Rc::new(Cell::new(0));
        let counter = Rc::clone(&notified);
        circle.connect(move |_| counter.set(counter.get() + 1));
        let counter = Rc::clone(&notified);
        grid.connect(move |_| counter.set(counter.get() + 1));
        let counter = Rc::clone(&notified);
        line.connect(move |_| counter.set(counter.get() + 1));

        circle.set_fill_type(FillType::None);
        circle.set_vertices(32).unwrap();
        circle.set_rotation_axis(Vector3::x());
        grid.set_slices(10).unwrap();
        grid.set_spacing(1.0).unwrap();
        line.set_end(Vector3::x());
        line.set_position(Vector3::zeros());
        assert_eq!(notified.get(), 0);

        line.set_end(Vector3::y());
        assert_eq!(notified.get(), 1);
    }

    #[test]
    fn test_grid_ignores_translation() {
        let mut grid = Grid3D::new_at(Vector3::new(5.0, 5.0, 5.0), 4, 2.0).unwrap();
        grid.set_uniform_scale(2.0);

        let mut backend = RecordingBackend::new();
        grid.draw(&mut backend, 0.0);

        let commands = backend.commands();
        assert!(!commands.iter().any(|c| matches!(c, DrawCommand::Translate(_))));
        assert!(commands.contains(&DrawCommand::Scale(Vector3::repeat(2.0))));
        assert_eq!(backend.matrix_depth(), 0);
    }

    #[test]
    fn test_circle_extra_rotation_follows_transform() {
        let mut circle = Circle3D::new_at(Vector3::new(0.0, 1.0, 0.0), 2.0).unwrap();
        let mut backend = RecordingBackend::new();
        circle.draw(&mut backend, 0.0);

        let commands = backend.commands();
        let scale = commands
            .iter()
            .position(|c| matches!(c, DrawCommand::Scale(_)))
            .unwrap();
        assert!(matches!(
            commands[scale + 1],
            DrawCommand::Rotate { axis, .. } if axis == Vector3::x()
        ));

        // A zero axis skips the extra rotation
        circle.set_rotation_axis(Vector3::zeros());
        backend.clear();
        circle.draw(&mut backend, 0.0);
        let rotations = backend
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rotate { .. }))
            .count();
        assert_eq!(rotations, 3);
    }

    #[test]
    fn test_circle_wireframe_draws_rim() {
        let mut circle = Circle3D::new();
        circle.set_fill_type(FillType::Solid);
        circle.set_wireframe(true);

        let mut backend = RecordingBackend::new();
        circle.draw(&mut backend, 0.0);
        assert!(backend.commands().iter().any(|c| matches!(
            c,
            DrawCommand::Draw3D {
                primitive: Primitive3D::Circle { filled: false, .. },
                style: DrawStyle::Wires,
                ..
            }
        )));
    }

    #[test]
    fn test_line_spans_start_to_end() {
        let mut line = Line3D::new_at(Vector3::new(1.0, 1.0, 1.0), Vector3::new(4.0, 5.0, 1.0)).unwrap();
        assert!((line.length() - 5.0).abs() < 0.0001);

        let mut backend = RecordingBackend::new();
        line.draw(&mut backend, 0.0);
        assert!(backend.commands().contains(&DrawCommand::Draw3D {
            primitive: Primitive3D::Line {
                start: Point3::origin(),
                end: Point3::new(3.0, 4.0, 0.0),
            },
            style: DrawStyle::Solid,
            color: Color::WHITE,
        }));
    }
}
