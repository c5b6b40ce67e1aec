//! Rendering contracts and the wgpu host adapter.
//!
//! Shapes own their vertex data and talk to the host only through
//! [`RenderContext`] and [`BufferManager`]. [`GpuRenderer`] provides a wgpu
//! implementation of the context.
//!
//! Convention:
//! - vertex positions are shape-local scene units (top-left origin, +Y down)
//! - the shape's `Transform2d` travels with each bind as the model matrix

mod attributes;
mod buffer;
mod ctx;
mod gpu;
mod manager;
mod shader;

#[cfg(test)]
pub(crate) mod testing;

pub use attributes::{ComponentType, VertexAttribute, VertexAttributes, VertexAttributesBuilder};
pub use buffer::{BufferId, BufferState, DrawType, VertexBuffer};
pub use ctx::{DrawState, PrimitiveType, RenderContext, RenderCtx, RenderTarget};
pub use gpu::{GpuRenderer, GpuRendererConfig, WgpuRenderContext};
pub use manager::{BufferManager, BufferManagerConfig, VertexBufferManager};
pub use shader::{ShaderProgram, ShaderRegistry};
