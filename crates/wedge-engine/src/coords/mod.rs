//! Coordinate and geometry types.
//!
//! Canonical CPU space:
//! - scene units, origin top-left
//! - +X right, +Y down
//! - rotations in degrees, clockwise on screen
//!
//! Shapes keep their vertices in local space; `Transform2d` maps them into the scene.

mod rect;
mod transform;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use transform::Transform2d;
pub use vec2::Vec2;
pub use viewport::Viewport;
