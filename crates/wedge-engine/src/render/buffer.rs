use wgpu::util::DeviceExt;

use super::VertexAttributes;

/// Identifier handed out by a [`BufferManager`](super::BufferManager).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

/// How often the CPU side of a buffer is expected to change.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum DrawType {
    /// Rarely updated. Every upload re-creates the GPU buffer.
    #[default]
    Static,
    /// Updated now and then. Uploads are written in place.
    Dynamic,
    /// Updated every frame. Uploads are written in place.
    Stream,
}

/// Whether GPU memory matches the CPU-side data.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferState {
    Clean,
    Dirty,
}

/// CPU-side vertex data plus its (lazily created) GPU buffer.
///
/// The CPU data is the source of truth. Writers mutate it through
/// [`data_mut`](Self::data_mut) and then call
/// [`set_dirty_on_hardware`](Self::set_dirty_on_hardware). The host render
/// context uploads dirty buffers right before binding them.
#[derive(Debug)]
pub struct VertexBuffer {
    id: BufferId,
    label: String,
    data: Vec<f32>,
    draw_type: DrawType,
    attributes: VertexAttributes,
    state: BufferState,
    hardware: Option<wgpu::Buffer>,
    sync_count: u64,
}

impl VertexBuffer {
    /// Creates a zero-filled buffer of `capacity` floats.
    ///
    /// New buffers start dirty: nothing has been uploaded yet.
    pub fn new(
        id: BufferId,
        label: impl Into<String>,
        capacity: usize,
        draw_type: DrawType,
        attributes: VertexAttributes,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            data: vec![0.0; capacity],
            draw_type,
            attributes,
            state: BufferState::Dirty,
            hardware: None,
            sync_count: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> BufferId {
        self.id
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn draw_type(&self) -> DrawType {
        self.draw_type
    }

    #[inline]
    pub fn attributes(&self) -> &VertexAttributes {
        &self.attributes
    }

    /// Capacity in floats.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn byte_size(&self) -> u64 {
        std::mem::size_of_val(self.data.as_slice()) as u64
    }

    /// Number of whole vertices the buffer holds under its attribute layout.
    pub fn vertex_capacity(&self) -> u32 {
        match self.attributes.stride() {
            0 => 0,
            stride => (self.byte_size() / stride) as u32,
        }
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable access to the CPU data. Does not change the buffer state.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    #[inline]
    pub fn state(&self) -> BufferState {
        self.state
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.state == BufferState::Dirty
    }

    /// Flags the CPU data as changed so the next bind re-uploads it.
    #[inline]
    pub fn set_dirty_on_hardware(&mut self) {
        self.state = BufferState::Dirty;
    }

    /// Number of successful uploads so far.
    #[inline]
    pub fn sync_count(&self) -> u64 {
        self.sync_count
    }

    #[inline]
    pub fn hardware(&self) -> Option<&wgpu::Buffer> {
        self.hardware.as_ref()
    }

    /// Forgets the GPU buffer, e.g. after the device was lost.
    ///
    /// The CPU data is kept and will be uploaded again on the next bind.
    pub fn invalidate_hardware(&mut self) {
        if self.hardware.take().is_some() {
            log::debug!("vertex buffer `{}` lost its GPU storage", self.label);
        }
        self.state = BufferState::Dirty;
    }

    /// Uploads the data through `upload` if the buffer is dirty.
    ///
    /// Returns `Ok(true)` when an upload happened. On error the buffer stays dirty
    /// and the error is returned unchanged.
    pub fn sync_with<E, F>(&mut self, upload: F) -> Result<bool, E>
    where
        F: FnOnce(&[u8]) -> Result<(), E>,
    {
        if !self.is_dirty() {
            return Ok(false);
        }
        upload(bytemuck::cast_slice(&self.data))?;
        self.mark_synced();
        Ok(true)
    }

    /// Uploads the data to a wgpu buffer if the buffer is dirty.
    ///
    /// Returns `true` when an upload happened.
    pub fn sync_to_gpu(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> bool {
        if !self.is_dirty() {
            return false;
        }

        let contents: &[u8] = bytemuck::cast_slice(&self.data);
        let in_place = self.draw_type != DrawType::Static;
        if let Some(buffer) = self.hardware.as_ref().filter(|_| in_place) {
            queue.write_buffer(buffer, 0, contents);
        } else {
            let mut usage = wgpu::BufferUsages::VERTEX;
            if in_place {
                usage |= wgpu::BufferUsages::COPY_DST;
            }
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(self.label.as_str()),
                contents,
                usage,
            });
            self.hardware = Some(buffer);
        }

        self.mark_synced();
        true
    }

    fn mark_synced(&mut self) {
        self.state = BufferState::Clean;
        self.sync_count += 1;
        log::trace!(
            "vertex buffer `{}` synced ({} bytes, upload #{})",
            self.label,
            self.byte_size(),
            self.sync_count
        );
    }
}
