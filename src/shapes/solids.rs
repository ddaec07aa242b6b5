//! Solid 3D primitives - Cube, Sphere, Cylinder, Cone
//!
//! Each shape is drawn at its local origin under its own transform. The
//! cylinder and cone stand on the XZ plane and extend up +Y.

use nalgebra::Vector3;

use super::common::{in_range, non_negative, set_property, ShapeCommon, ShapeError, Spatial};
use super::traits::{impl_shape3d, shape_common, Shape, Shape3D};
use crate::color::Color;
use crate::mesh::generate::MAX_SEGMENTS;
use crate::render::{Primitive3D, RenderBackend};

/// Axis-aligned box centered on its position
#[derive(Debug)]
pub struct Cube3D {
    common: ShapeCommon,
    spatial: Spatial,
    size: Vector3<f32>,
}

impl Default for Cube3D {
    fn default() -> Self {
        Self {
            common: ShapeCommon::new(),
            spatial: Spatial::default(),
            size: Vector3::repeat(1.0),
        }
    }
}

impl Cube3D {
    /// Unit cube at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Cube at `position` with `size` = (width, height, depth)
    pub fn new_at(position: Vector3<f32>, size: Vector3<f32>) -> Result<Self, ShapeError> {
        let mut cube = Self {
            spatial: Spatial::at(position),
            ..Self::default()
        };
        cube.set_size(size)?;
        Ok(cube)
    }

    pub fn new_full(position: Vector3<f32>, size: Vector3<f32>, color: Color) -> Result<Self, ShapeError> {
        let mut cube = Self::new_at(position, size)?;
        cube.common = ShapeCommon::with_color(color);
        Ok(cube)
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn depth(&self) -> f32 {
        self.size.z
    }

    pub fn size(&self) -> Vector3<f32> {
        self.size
    }

    pub fn set_width(&mut self, width: f32) -> Result<(), ShapeError> {
        let width = non_negative("width", width)?;
        set_property(&mut self.size.x, width, self.common.observers_mut(), "width");
        Ok(())
    }

    pub fn set_height(&mut self, height: f32) -> Result<(), ShapeError> {
        let height = non_negative("height", height)?;
        set_property(&mut self.size.y, height, self.common.observers_mut(), "height");
        Ok(())
    }

    pub fn set_depth(&mut self, depth: f32) -> Result<(), ShapeError> {
        let depth = non_negative("depth", depth)?;
        set_property(&mut self.size.z, depth, self.common.observers_mut(), "depth");
        Ok(())
    }

    /// Set all three dimensions; nothing changes if any of them is invalid
    pub fn set_size(&mut self, size: Vector3<f32>) -> Result<(), ShapeError> {
        non_negative("width", size.x)?;
        non_negative("height", size.y)?;
        non_negative("depth", size.z)?;

        let mut cube = self.begin_batch();
        cube.set_width(size.x)?;
        cube.set_height(size.y)?;
        cube.set_depth(size.z)
    }
}

impl Shape for Cube3D {
    shape_common!();

    fn name(&self) -> &str {
        "Cube3D"
    }

    fn render(&mut self, backend: &mut dyn RenderBackend, _delta: f32) {
        self.draw_transformed(backend, &Primitive3D::Cube { size: self.size });
    }
}

impl_shape3d!(Cube3D);

/// UV sphere centered on its position
#[derive(Debug)]
pub struct Sphere3D {
    common: ShapeCommon,
    spatial: Spatial,
    radius: f32,
    rings: u32,
    slices: u32,
}

impl Default for Sphere3D {
    fn default() -> Self {
        Self {
            common: ShapeCommon::new(),
            spatial: Spatial::default(),
            radius: 1.0,
            rings: 16,
            slices: 16,
        }
    }
}

impl Sphere3D {
    pub const MIN_RINGS: u32 = 1;
    /// One band more than rings is generated
    pub const MAX_RINGS: u32 = MAX_SEGMENTS - 1;
    pub const MIN_SLICES: u32 = 2;
    pub const MAX_SLICES: u32 = MAX_SEGMENTS;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_at(position: Vector3<f32>, radius: f32) -> Result<Self, ShapeError> {
        let mut sphere = Self {
            spatial: Spatial::at(position),
            ..Self::default()
        };
        sphere.set_radius(radius)?;
        Ok(sphere)
    }

    pub fn new_full(
        position: Vector3<f32>,
        radius: f32,
        rings: u32,
        slices: u32,
        color: Color,
    ) -> Result<Self, ShapeError> {
        let mut sphere = Self::new_at(position, radius)?;
        sphere.set_rings(rings)?;
        sphere.set_slices(slices)?;
        sphere.common = ShapeCommon::with_color(color);
        Ok(sphere)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn rings(&self) -> u32 {
        self.rings
    }

    pub fn slices(&self) -> u32 {
        self.slices
    }

    pub fn set_radius(&mut self, radius: f32) -> Result<(), ShapeError> {
        let radius = non_negative("radius", radius)?;
        set_property(&mut self.radius, radius, self.common.observers_mut(), "radius");
        Ok(())
    }

    pub fn set_rings(&mut self, rings: u32) -> Result<(), ShapeError> {
        let rings = in_range("rings", rings, Self::MIN_RINGS, Self::MAX_RINGS)?;
        set_property(&mut self.rings, rings, self.common.observers_mut(), "rings");
        Ok(())
    }

    pub fn set_slices(&mut self, slices: u32) -> Result<(), ShapeError> {
        let slices = in_range("slices", slices, Self::MIN_SLICES, Self::MAX_SLICES)?;
        set_property(&mut self.slices, slices, self.common.observers_mut(), "slices");
        Ok(())
    }
}

impl Shape for Sphere3D {
    shape_common!();

    fn name(&self) -> &str {
        "Sphere3D"
    }

    fn render(&mut self, backend: &mut dyn RenderBackend, _delta: f32) {
        self.draw_transformed(
            backend,
            &Primitive3D::Sphere {
                radius: self.radius,
                rings: self.rings,
                slices: self.slices,
            },
        );
    }
}

impl_shape3d!(Sphere3D);

/// Straight cylinder, optionally without end caps
#[derive(Debug)]
pub struct Cylinder3D {
    common: ShapeCommon,
    spatial: Spatial,
    radius: f32,
    height: f32,
    slices: u32,
    cap_ends: bool,
}

impl Default for Cylinder3D {
    fn default() -> Self {
        Self {
            common: ShapeCommon::new(),
            spatial: Spatial::default(),
            radius: 1.0,
            height: 2.0,
            slices: 16,
            cap_ends: true,
        }
    }
}

impl Cylinder3D {
    pub const MIN_SLICES: u32 = 3;
    pub const MAX_SLICES: u32 = MAX_SEGMENTS;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_at(position: Vector3<f32>, radius: f32, height: f32) -> Result<Self, ShapeError> {
        let mut cylinder = Self {
            spatial: Spatial::at(position),
            ..Self::default()
        };
        cylinder.set_radius(radius)?;
        cylinder.set_height(height)?;
        Ok(cylinder)
    }

    pub fn new_full(
        position: Vector3<f32>,
        radius: f32,
        height: f32,
        slices: u32,
        cap_ends: bool,
        color: Color,
    ) -> Result<Self, ShapeError> {
        let mut cylinder = Self::new_at(position, radius, height)?;
        cylinder.set_slices(slices)?;
        cylinder.cap_ends = cap_ends;
        cylinder.common = ShapeCommon::with_color(color);
        Ok(cylinder)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn slices(&self) -> u32 {
        self.slices
    }

    pub fn cap_ends(&self) -> bool {
        self.cap_ends
    }

    pub fn set_radius(&mut self, radius: f32) -> Result<(), ShapeError> {
        let radius = non_negative("radius", radius)?;
        set_property(&mut self.radius, radius, self.common.observers_mut(), "radius");
        Ok(())
    }

    pub fn set_height(&mut self, height: f32) -> Result<(), ShapeError> {
        let height = non_negative("height", height)?;
        set_property(&mut self.height, height, self.common.observers_mut(), "height");
        Ok(())
    }

    pub fn set_slices(&mut self, slices: u32) -> Result<(), ShapeError> {
        let slices = in_range("slices", slices, Self::MIN_SLICES, Self::MAX_SLICES)?;
        set_property(&mut self.slices, slices, self.common.observers_mut(), "slices");
        Ok(())
    }

    pub fn set_cap_ends(&mut self, cap_ends: bool) {
        set_property(&mut self.cap_ends, cap_ends, self.common.observers_mut(), "cap-ends");
    }
}

impl Shape for Cylinder3D {
    shape_common!();

    fn name(&self) -> &str {
        "Cylinder3D"
    }

    fn render(&mut self, backend: &mut dyn RenderBackend, _delta: f32) {
        self.draw_transformed(
            backend,
            &Primitive3D::Cylinder {
                radius_top: self.radius,
                radius_bottom: self.radius,
                height: self.height,
                slices: self.slices,
                caps: self.cap_ends,
            },
        );
    }
}

impl_shape3d!(Cylinder3D);

/// Cone or truncated cone; `radius_top == 0` gives a point
#[derive(Debug)]
pub struct Cone3D {
    common: ShapeCommon,
    spatial: Spatial,
    radius_bottom: f32,
    radius_top: f32,
    height: f32,
    slices: u32,
}

impl Default for Cone3D {
    fn default() -> Self {
        Self {
            common: ShapeCommon::new(),
            spatial: Spatial::default(),
            radius_bottom: 1.0,
            radius_top: 0.0,
            height: 2.0,
            slices: 16,
        }
    }
}

impl Cone3D {
    pub const MIN_SLICES: u32 = 3;
    pub const MAX_SLICES: u32 = MAX_SEGMENTS;

    pub fn new() -> Self {
        Self::default()
    }

    /// Pointed cone at `position`
    pub fn new_at(position: Vector3<f32>, radius_bottom: f32, height: f32) -> Result<Self, ShapeError> {
        let mut cone = Self {
            spatial: Spatial::at(position),
            ..Self::default()
        };
        cone.set_radius_bottom(radius_bottom)?;
        cone.set_height(height)?;
        Ok(cone)
    }

    pub fn new_full(
        position: Vector3<f32>,
        radius_bottom: f32,
        radius_top: f32,
        height: f32,
        slices: u32,
        color: Color,
    ) -> Result<Self, ShapeError> {
        let mut cone = Self::new_at(position, radius_bottom, height)?;
        cone.set_radius_top(radius_top)?;
        cone.set_slices(slices)?;
        cone.common = ShapeCommon::with_color(color);
        Ok(cone)
    }

    pub fn radius_bottom(&self) -> f32 {
        self.radius_bottom
    }

    pub fn radius_top(&self) -> f32 {
        self.radius_top
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn slices(&self) -> u32 {
        self.slices
    }

    pub fn is_pointed(&self) -> bool {
        self.radius_top == 0.0
    }

    pub fn set_radius_bottom(&mut self, radius: f32) -> Result<(), ShapeError> {
        let radius = non_negative("radius-bottom", radius)?;
        set_property(&mut self.radius_bottom, radius, self.common.observers_mut(), "radius-bottom");
        Ok(())
    }

    pub fn set_radius_top(&mut self, radius: f32) -> Result<(), ShapeError> {
        let radius = non_negative("radius-top", radius)?;
        set_property(&mut self.radius_top, radius, self.common.observers_mut(), "radius-top");
        Ok(())
    }

    pub fn set_height(&mut self, height: f32) -> Result<(), ShapeError> {
        let height = non_negative("height", height)?;
        set_property(&mut self.height, height, self.common.observers_mut(), "height");
        Ok(())
    }

    pub fn set_slices(&mut self, slices: u32) -> Result<(), ShapeError> {
        let slices = in_range("slices", slices, Self::MIN_SLICES, Self::MAX_SLICES)?;
        set_property(&mut self.slices, slices, self.common.observers_mut(), "slices");
        Ok(())
    }
}

impl Shape for Cone3D {
    shape_common!();

    fn name(&self) -> &str {
        "Cone3D"
    }

    fn render(&mut self, backend: &mut dyn RenderBackend, _delta: f32) {
        self.draw_transformed(
            backend,
            &Primitive3D::Cylinder {
                radius_top: self.radius_top,
                radius_bottom: self.radius_bottom,
                height: self.height,
                slices: self.slices,
                caps: true,
            },
        );
    }
}

impl_shape3d!(Cone3D);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, DrawStyle, RecordingBackend};
    use crate::shapes::Drawable;
    use std::cell::Cell;
    use std::rc::Rc;

    fn drawn(backend: &RecordingBackend) -> Vec<(Primitive3D, DrawStyle)> {
        backend
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Draw3D {
                    primitive, style, ..
                } => Some((primitive.clone(), *style)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_cube_end_to_end() {
        let mut cube = Cube3D::new_at(Vector3::new(1.0, 2.0, 3.0), Vector3::new(4.0, 5.0, 6.0)).unwrap();
        assert_eq!(cube.position(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(cube.width(), 4.0);
        assert_eq!(cube.height(), 5.0);
        assert_eq!(cube.depth(), 6.0);

        let notified = Rc::new(Cell::new(0));
        let counter = Rc::clone(&notified);
        cube.connect(move |_| counter.set(counter.get() + 1));

        cube.set_wireframe(true);
        cube.set_wireframe(false);
        assert!(!cube.is_wireframe());
        assert_eq!(notified.get(), 2);

        let mut backend = RecordingBackend::new();
        cube.draw(&mut backend, 0.016);
        assert_eq!(
            drawn(&backend),
            vec![(
                Primitive3D::Cube {
                    size: Vector3::new(4.0, 5.0, 6.0)
                },
                DrawStyle::Solid
            )]
        );
        assert_eq!(backend.matrix_depth(), 0);
    }

    #[test]
    fn test_defaults() {
        let cube = Cube3D::new();
        assert_eq!(cube.size(), Vector3::repeat(1.0));
        assert_eq!(cube.position(), Vector3::zeros());
        assert_eq!(cube.scale(), Vector3::repeat(1.0));

        let sphere = Sphere3D::new();
        assert_eq!((sphere.radius(), sphere.rings(), sphere.slices()), (1.0, 16, 16));

        let cylinder = Cylinder3D::new();
        assert_eq!((cylinder.radius(), cylinder.height(), cylinder.slices()), (1.0, 2.0, 16));
        assert!(cylinder.cap_ends());

        let cone = Cone3D::new();
        assert!(cone.is_pointed());
        assert_eq!(cone.radius_bottom(), 1.0);
    }

    #[test]
    fn test_new_at_round_trips_position() {
        let p = Vector3::new(-1.5, 0.25, 8.0);
        assert_eq!(Cube3D::new_at(p, Vector3::repeat(1.0)).unwrap().position(), p);
        assert_eq!(Sphere3D::new_at(p, 2.0).unwrap().position(), p);
        assert_eq!(Cylinder3D::new_at(p, 1.0, 3.0).unwrap().position(), p);
        assert_eq!(Cone3D::new_at(p, 1.0, 3.0).unwrap().position(), p);
    }

    #[test]
    fn test_invalid_values_keep_previous() {
        let mut cube = Cube3D::new();
        assert!(cube.set_width(-1.0).is_err());
        assert_eq!(cube.width(), 1.0);
        // One bad component leaves all three untouched
        assert!(cube.set_size(Vector3::new(2.0, 2.0, -2.0)).is_err());
        assert_eq!(cube.size(), Vector3::repeat(1.0));

        let mut sphere = Sphere3D::new();
        assert!(sphere.set_radius(-0.1).is_err());
        assert!(sphere.set_rings(0).is_err());
        assert!(sphere.set_slices(1).is_err());
        assert_eq!((sphere.radius(), sphere.rings(), sphere.slices()), (1.0, 16, 16));
        assert!(sphere.set_slices(2).is_ok());

        let mut cylinder = Cylinder3D::new();
        assert!(cylinder.set_slices(2).is_err());
        assert!(cylinder.set_height(f32::NAN).is_err());
        assert_eq!(cylinder.slices(), 16);
        assert_eq!(cylinder.height(), 2.0);

        let mut cone = Cone3D::new();
        assert!(cone.set_radius_top(-1.0).is_err());
        assert!(cone.set_slices(0).is_err());
        assert!(cone.is_pointed());

        assert!(Sphere3D::new_at(Vector3::zeros(), -1.0).is_err());
    }

    #[test]
    fn test_counts_above_maximum_rejected() {
        let mut sphere = Sphere3D::new();
        assert!(matches!(
            sphere.set_rings(Sphere3D::MAX_RINGS + 1),
            Err(ShapeError::OutOfRange { property: "rings", .. })
        ));
        assert!(matches!(
            sphere.set_slices(u32::MAX),
            Err(ShapeError::OutOfRange { property: "slices", .. })
        ));
        assert_eq!((sphere.rings(), sphere.slices()), (16, 16));
        assert!(sphere.set_rings(Sphere3D::MAX_RINGS).is_ok());
        assert!(sphere.set_slices(Sphere3D::MAX_SLICES).is_ok());

        let mut cylinder = Cylinder3D::new();
        assert!(cylinder.set_slices(Cylinder3D::MAX_SLICES + 1).is_err());
        assert_eq!(cylinder.slices(), 16);

        let mut cone = Cone3D::new();
        assert!(cone.set_slices(u32::MAX).is_err());
        assert_eq!(cone.slices(), 16);

        assert!(Sphere3D::new_full(Vector3::zeros(), 1.0, u32::MAX, 8, Color::RED).is_err());
    }

    #[test]
    fn test_setting_current_value_is_silent() {
        let mut cube = Cube3D::new();
        let mut sphere = Sphere3D::new();
        let mut cylinder = Cylinder3D::new();
        let mut cone = Cone3D::new();

        let notified = Rc::new(Cell::new(0));
        let counter = Rc::clone(&notified);
        cube.connect(move |_| counter.set(counter.get() + 1));
        let counter = Rc::clone(&notified);
        sphere.connect(move |_| counter.set(counter.get() + 1));
        let counter = Rc::clone(&notified);
        cylinder.connect(move |_| counter.set(counter.get() + 1));
        let counter = Rc::clone(&notified);
        cone.connect(move |_| counter.set(counter.get() + 1));

        cube.set_width(1.0).unwrap();
        cube.set_size(Vector3::repeat(1.0)).unwrap();
        sphere.set_radius(1.0).unwrap();
        sphere.set_rings(16).unwrap();
        sphere.set_slices(16).unwrap();
        cylinder.set_height(2.0).unwrap();
        cylinder.set_cap_ends(true);
        cone.set_radius_bottom(1.0).unwrap();
        cone.set_slices(16).unwrap();
        cone.set_wireframe(false);
        assert_eq!(notified.get(), 0);

        sphere.set_radius(2.0).unwrap();
        assert_eq!(notified.get(), 1);
    }

    #[test]
    fn test_set_size_notifies_once() {
        let mut cube = Cube3D::new();
        let notified = Rc::new(Cell::new(0));
        let counter = Rc::clone(&notified);
        cube.connect(move |changes| {
            assert_eq!(changes.len(), 3);
            counter.set(counter.get() + 1);
        });

        cube.set_size(Vector3::new(2.0, 3.0, 4.0)).unwrap();
        assert_eq!(notified.get(), 1);
    }

    #[test]
    fn test_new_full() {
        let sphere = Sphere3D::new_full(Vector3::zeros(), 2.0, 8, 12, Color::RED).unwrap();
        assert_eq!(sphere.color(), Color::RED);
        assert_eq!((sphere.rings(), sphere.slices()), (8, 12));

        let cylinder = Cylinder3D::new_full(Vector3::zeros(), 1.0, 1.0, 6, false, Color::BLUE).unwrap();
        assert!(!cylinder.cap_ends());

        assert!(Cone3D::new_full(Vector3::zeros(), 1.0, 0.5, 1.0, 2, Color::GREEN).is_err());
    }

    #[test]
    fn test_open_cylinder_and_wire_cone() {
        let mut backend = RecordingBackend::new();

        let mut cylinder = Cylinder3D::new();
        cylinder.set_cap_ends(false);
        cylinder.draw(&mut backend, 0.0);

        let mut cone = Cone3D::new();
        cone.set_wireframe(true);
        cone.draw(&mut backend, 0.0);

        let drawn = drawn(&backend);
        assert!(matches!(
            drawn[0],
            (Primitive3D::Cylinder { caps: false, .. }, DrawStyle::Solid)
        ));
        assert!(matches!(
            drawn[1],
            (
                Primitive3D::Cylinder {
                    radius_top,
                    ..
                },
                DrawStyle::Wires
            ) if radius_top == 0.0
        ));
    }
}
