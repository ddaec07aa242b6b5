//! Shapes module - the drawable shape hierarchy
//!
//! This module provides:
//! - `Shape` trait with visibility, color, z-index and change observers
//! - `Shape2D` shapes in screen space: Rectangle2D, Circle2D, Text2D
//! - `Shape3D` shapes placed by a transform: Cube3D, Sphere3D, Cylinder3D,
//!   Cone3D, Plane3D, Circle3D, Grid3D, Line3D
//! - Mesh-backed shapes rebuilt lazily when a parameter changes:
//!   IcoSphere3D, Torus3D
//! - `ShapeLayer` for drawing groups of shapes in z-index order

mod common;
mod flat;
mod layer;
mod primitives;
mod procedural;
mod solids;
mod text;
mod traits;

pub use common::{ShapeCommon, ShapeError, Spatial};
pub use flat::{Circle3D, FillType, Grid3D, Line3D, Plane3D};
pub use layer::ShapeLayer;
pub use primitives::{Circle2D, Rectangle2D};
pub use procedural::{IcoSphere3D, MeshCache, Torus3D};
pub use solids::{Cone3D, Cube3D, Cylinder3D, Sphere3D};
pub use text::{Font, FontError, Text2D};
pub use traits::{Batch, Drawable, Shape, Shape2D, Shape3D};
