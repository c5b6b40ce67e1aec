use anyhow::Result;

use crate::coords::{Rect, Transform2d, Viewport};

use super::{ShaderProgram, VertexBuffer};

/// Primitive assembly mode for a draw call.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PrimitiveType {
    TriangleList,
    TriangleStrip,
    LineList,
    LineStrip,
    PointList,
}

impl PrimitiveType {
    #[inline]
    pub fn topology(self) -> wgpu::PrimitiveTopology {
        match self {
            PrimitiveType::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            PrimitiveType::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
            PrimitiveType::LineList => wgpu::PrimitiveTopology::LineList,
            PrimitiveType::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            PrimitiveType::PointList => wgpu::PrimitiveTopology::PointList,
        }
    }
}

/// Per-draw state supplied by the shape at bind time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawState {
    /// Local-to-scene transform of the bound geometry.
    pub transform: Transform2d,
    /// Straight-alpha blending on/off.
    pub blending: bool,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Transform2d::identity(),
            blending: false,
        }
    }
}

/// Host rendering contract used by shapes.
///
/// A draw is always `bind` → one or more `draw` → `unbind`. Implementations
/// upload a dirty buffer inside `bind`; errors are returned unchanged to the shape.
pub trait RenderContext {
    /// Visible scene area, when the host wants shapes to cull themselves.
    fn view_bounds(&self) -> Option<Rect> {
        None
    }

    fn bind(
        &mut self,
        buffer: &mut VertexBuffer,
        program: &ShaderProgram,
        state: &DrawState,
    ) -> Result<()>;

    fn draw(&mut self, primitive: PrimitiveType, vertex_count: u32) -> Result<()>;

    fn unbind(&mut self, buffer: &VertexBuffer, program: &ShaderProgram);
}

/// wgpu handles needed to build a [`WgpuRenderContext`](super::WgpuRenderContext).
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub viewport: Viewport, // scene units
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        viewport: Viewport,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            viewport,
        }
    }
}

/// Target for drawing (encoder + color view).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }
}
