use anyhow::{ensure, Result};

use super::{BufferId, DrawType, VertexAttributes, VertexBuffer};

/// Allocates vertex buffers for shapes.
///
/// Shapes own the buffers they receive; the manager only hands them out.
pub trait BufferManager {
    fn allocate(
        &mut self,
        label: &str,
        capacity: usize,
        draw_type: DrawType,
        attributes: VertexAttributes,
    ) -> Result<VertexBuffer>;
}

/// Allocation limits for [`VertexBufferManager`].
#[derive(Debug, Clone)]
pub struct BufferManagerConfig {
    /// Largest single buffer accepted, in bytes.
    pub max_buffer_bytes: u64,
}

impl Default for BufferManagerConfig {
    fn default() -> Self {
        Self {
            max_buffer_bytes: wgpu::Limits::default().max_buffer_size,
        }
    }
}

/// Default [`BufferManager`]: assigns ids, validates sizes and keeps totals.
///
/// GPU storage is created later, on first sync, by the render context.
#[derive(Debug, Default)]
pub struct VertexBufferManager {
    config: BufferManagerConfig,
    next_id: u64,
    allocations: u64,
    allocated_bytes: u64,
}

impl VertexBufferManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BufferManagerConfig) -> Self {
        Self { config, ..Self::default() }
    }

    /// Number of buffers handed out so far.
    #[inline]
    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    /// Total CPU-side bytes handed out so far.
    #[inline]
    pub fn allocated_bytes(&self) -> u64 {
        self.allocated_bytes
    }
}

impl BufferManager for VertexBufferManager {
    fn allocate(
        &mut self,
        label: &str,
        capacity: usize,
        draw_type: DrawType,
        attributes: VertexAttributes,
    ) -> Result<VertexBuffer> {
        ensure!(capacity > 0, "vertex buffer `{label}`: capacity must be non-zero");

        let bytes = (capacity * std::mem::size_of::<f32>()) as u64;
        ensure!(
            bytes <= self.config.max_buffer_bytes,
            "vertex buffer `{label}`: {bytes} bytes exceeds limit of {}",
            self.config.max_buffer_bytes
        );

        let id = BufferId(self.next_id);
        self.next_id += 1;
        self.allocations += 1;
        self.allocated_bytes += bytes;

        log::debug!("allocated vertex buffer `{label}` ({id:?}, {capacity} floats, {draw_type:?})");

        Ok(VertexBuffer::new(id, label, capacity, draw_type, attributes))
    }
}
