//! Test double for [`RenderContext`] that records every call.

use anyhow::{bail, Result};

use crate::coords::Rect;

use super::{BufferId, DrawState, PrimitiveType, RenderContext, ShaderProgram, VertexBuffer};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Bind {
        buffer: BufferId,
        program: String,
        state: DrawState,
        /// Whether this bind uploaded the buffer.
        synced: bool,
    },
    Draw(PrimitiveType, u32),
    Unbind(BufferId),
}

#[derive(Debug, Default)]
pub(crate) struct RecordingContext {
    pub calls: Vec<Call>,
    pub uploads: Vec<Vec<u8>>,
    pub view: Option<Rect>,
    pub fail_bind: bool,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync_count(&self) -> usize {
        self.uploads.len()
    }
}

impl RenderContext for RecordingContext {
    fn view_bounds(&self) -> Option<Rect> {
        self.view
    }

    fn bind(
        &mut self,
        buffer: &mut VertexBuffer,
        program: &ShaderProgram,
        state: &DrawState,
    ) -> Result<()> {
        if self.fail_bind {
            bail!("context lost");
        }
        let uploads = &mut self.uploads;
        let synced = buffer.sync_with(|bytes| {
            uploads.push(bytes.to_vec());
            Ok::<_, anyhow::Error>(())
        })?;
        self.calls.push(Call::Bind {
            buffer: buffer.id(),
            program: program.name.to_string(),
            state: *state,
            synced,
        });
        Ok(())
    }

    fn draw(&mut self, primitive: PrimitiveType, vertex_count: u32) -> Result<()> {
        self.calls.push(Call::Draw(primitive, vertex_count));
        Ok(())
    }

    fn unbind(&mut self, buffer: &VertexBuffer, _program: &ShaderProgram) {
        self.calls.push(Call::Unbind(buffer.id()));
    }
}
