//! Fill colors and their GPU vertex encoding.

pub mod color;

pub use color::Color;
