//! State shared by every shape, plus parameter validation

use nalgebra::Vector3;
use thiserror::Error;

use crate::color::Color;
use crate::math::Transform3D;
use crate::property::Observers;

/// Rejected shape parameter
///
/// The shape keeps its previous value when a setter returns one of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("{property} must not be negative, got {value}")]
    Negative { property: &'static str, value: f32 },

    #[error("{property} must be at least {minimum}, got {value}")]
    BelowMinimum {
        property: &'static str,
        value: f64,
        minimum: f64,
    },

    #[error("{property} must be between {min} and {max}, got {value}")]
    OutOfRange {
        property: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Sizes, radii and thicknesses: zero or more, NaN rejected
pub(crate) fn non_negative(property: &'static str, value: f32) -> Result<f32, ShapeError> {
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(ShapeError::Negative { property, value })
    }
}

pub(crate) fn at_least(property: &'static str, value: f32, minimum: f32) -> Result<f32, ShapeError> {
    if value >= minimum {
        Ok(value)
    } else {
        Err(ShapeError::BelowMinimum {
            property,
            value: value as f64,
            minimum: minimum as f64,
        })
    }
}

pub(crate) fn in_range(property: &'static str, value: u32, min: u32, max: u32) -> Result<u32, ShapeError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ShapeError::OutOfRange {
            property,
            value,
            min,
            max,
        })
    }
}

/// Store `value` and notify if it differs from the current one
///
/// Returns true when the field changed.
pub(crate) fn set_property<T: PartialEq>(
    field: &mut T,
    value: T,
    observers: &mut Observers,
    property: &'static str,
) -> bool {
    if *field == value {
        return false;
    }
    *field = value;
    observers.notify(property);
    true
}

/// Visibility, color, draw order and observers
#[derive(Debug)]
pub struct ShapeCommon {
    visible: bool,
    color: Color,
    z_index: i32,
    observers: Observers,
}

impl Default for ShapeCommon {
    fn default() -> Self {
        Self {
            visible: true,
            color: Color::WHITE,
            z_index: 0,
            observers: Observers::new(),
        }
    }
}

impl ShapeCommon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        set_property(&mut self.visible, visible, &mut self.observers, "visible");
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        set_property(&mut self.color, color, &mut self.observers, "color");
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn set_z_index(&mut self, z_index: i32) {
        set_property(&mut self.z_index, z_index, &mut self.observers, "z-index");
    }

    pub fn observers(&self) -> &Observers {
        &self.observers
    }

    pub fn observers_mut(&mut self) -> &mut Observers {
        &mut self.observers
    }
}

/// Transform and wireframe flag of a 3D shape
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spatial {
    pub transform: Transform3D,
    pub wireframe: bool,
}

impl Spatial {
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            transform: Transform3D::at(position),
            wireframe: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative("radius", 0.0), Ok(0.0));
        assert_eq!(non_negative("radius", 2.5), Ok(2.5));
        assert!(matches!(
            non_negative("radius", -1.0),
            Err(ShapeError::Negative { property: "radius", .. })
        ));
        assert!(non_negative("radius", f32::NAN).is_err());
    }

    #[test]
    fn test_counts_and_ranges() {
        assert_eq!(in_range("slices", 3, 3, 1024), Ok(3));
        assert!(in_range("slices", u32::MAX, 3, 1024).is_err());
        assert_eq!(in_range("subdivisions", 6, 1, 6), Ok(6));
        assert!(in_range("subdivisions", 0, 1, 6).is_err());
        assert!(in_range("subdivisions", 7, 1, 6).is_err());
    }

    #[test]
    fn test_error_message() {
        let err = at_least("font-size", 0.5, 1.0).unwrap_err();
        assert_eq!(err.to_string(), "font-size must be at least 1, got 0.5");
        let err = in_range("slices", 2000, 3, 1024).unwrap_err();
        assert_eq!(err.to_string(), "slices must be between 3 and 1024, got 2000");
    }

    #[test]
    fn test_common_defaults() {
        let common = ShapeCommon::new();
        assert!(common.visible());
        assert_eq!(common.color(), Color::WHITE);
        assert_eq!(common.z_index(), 0);
    }
}
