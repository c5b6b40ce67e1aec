//! Wedge engine crate.
//!
//! Buffer-backed 2D shapes and the host contracts they draw through:
//! - `scene`: the `Shape` trait and concrete shapes such as `RightTriangle`
//! - `render`: buffers, shader programs, the `RenderContext` trait and a wgpu adapter
//! - `coords` / `paint`: geometry, transforms and colors

pub mod coords;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
