//! Drawable scene entities.
//!
//! Responsibilities:
//! - the `Shape` contract and the `ShapeBase` state shared by all shapes
//! - concrete shapes under `scene::shapes`, each owning its vertex buffer
//!
//! Adding a shape:
//! - add a module under `scene::shapes::*`
//! - embed a `ShapeBase` and implement `Shape`
//! - write vertices in `on_update_vertices` and colors in `on_update_color`

mod shape;

pub mod shapes;

pub use shape::{Shape, ShapeBase, ShapeOptions};
