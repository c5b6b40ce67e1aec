//! Concrete shapes.

pub mod right_triangle;

pub use right_triangle::{Orientation, RightTriangle};
