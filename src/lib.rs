//! shapekit - shapes for a frame-driven 2D/3D renderer
//!
//! Shapes hold their parameters, notify observers when those change, and
//! once per frame turn themselves into draw calls on a [`render::RenderBackend`].
//!
//! - [`shapes`]: the `Shape` / `Shape2D` / `Shape3D` hierarchy and layers
//! - [`render`]: the backend trait, a recording backend and an egui painter
//! - [`mesh`]: mesh data, primitive generators, fan triangulation, OBJ import
//! - [`math`], [`color`], [`property`]: shared value types

pub mod color;
pub mod math;
pub mod mesh;
pub mod property;
pub mod render;
pub mod shapes;
