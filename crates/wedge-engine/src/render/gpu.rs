//! wgpu implementation of [`RenderContext`].
//!
//! `GpuRenderer` lives across frames and caches pipelines. Each frame the host
//! calls [`GpuRenderer::begin`] to open a render pass and gets back a
//! [`WgpuRenderContext`] that shapes draw through.

use std::collections::HashMap;

use anyhow::{bail, ensure, Context, Result};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::{Rect, Viewport};

use super::{
    BufferId, DrawState, PrimitiveType, RenderContext, RenderCtx, RenderTarget, ShaderProgram,
    VertexBuffer,
};

/// Settings for [`GpuRenderer`].
#[derive(Debug, Clone)]
pub struct GpuRendererConfig {
    /// Prefix for wgpu debug labels.
    pub label_prefix: String,
    /// Report the viewport as view bounds so shapes outside it are skipped.
    pub cull_to_viewport: bool,
}

impl Default for GpuRendererConfig {
    fn default() -> Self {
        Self {
            label_prefix: "wedge".to_owned(),
            cull_to_viewport: true,
        }
    }
}

/// Uniform block shared by every program: viewport + model matrix.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Globals {
    viewport: [f32; 2],
    _pad: [f32; 2], // 16-byte alignment
    model: [[f32; 4]; 3],
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
struct PipelineKey {
    program: ShaderProgram,
    format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
    blending: bool,
}

/// Long-lived GPU state: the globals layout and one pipeline per
/// (program, surface format, topology, blending) combination.
#[derive(Default)]
pub struct GpuRenderer {
    config: GpuRendererConfig,
    globals_layout: Option<wgpu::BindGroupLayout>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl GpuRenderer {
    pub fn new(config: GpuRendererConfig) -> Self {
        Self { config, ..Self::default() }
    }

    /// Number of compiled pipelines.
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    /// Drops every cached pipeline, e.g. after the device was recreated.
    pub fn clear_pipelines(&mut self) {
        self.pipelines.clear();
        self.globals_layout = None;
    }

    /// Opens a render pass on `target` that loads the existing contents.
    pub fn begin<'a>(
        &'a mut self,
        ctx: &RenderCtx<'a>,
        target: &'a mut RenderTarget<'_>,
    ) -> WgpuRenderContext<'a> {
        let label = format!("{} shape pass", self.config.label_prefix);
        let pass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        WgpuRenderContext {
            device: ctx.device,
            queue: ctx.queue,
            surface_format: ctx.surface_format,
            viewport: ctx.viewport,
            renderer: self,
            pass,
            bound: None,
        }
    }

    fn pipeline(
        &mut self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        program: &ShaderProgram,
        primitive: PrimitiveType,
        blending: bool,
    ) -> Result<&wgpu::RenderPipeline> {
        let key = PipelineKey {
            program: program.clone(),
            format,
            topology: primitive.topology(),
            blending,
        };

        if !self.pipelines.contains_key(&key) {
            let prefix = &self.config.label_prefix;
            let layout = globals_layout(&mut self.globals_layout, device, prefix);
            let pipeline = create_pipeline(device, layout, prefix, &key)?;
            log::debug!(
                "created pipeline for `{}` ({:?}, {:?}, blending: {})",
                key.program.name,
                key.format,
                key.topology,
                key.blending
            );
            self.pipelines.insert(key.clone(), pipeline);
        }

        self.pipelines
            .get(&key)
            .context("pipeline cache lost an entry it just inserted")
    }
}

fn globals_layout<'s>(
    slot: &'s mut Option<wgpu::BindGroupLayout>,
    device: &wgpu::Device,
    prefix: &str,
) -> &'s wgpu::BindGroupLayout {
    slot.get_or_insert_with(|| {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{prefix} globals bgl")),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<Globals>() as u64,
                    ),
                },
                count: None,
            }],
        })
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    globals_layout: &wgpu::BindGroupLayout,
    prefix: &str,
    key: &PipelineKey,
) -> Result<wgpu::RenderPipeline> {
    let program = &key.program;
    let attributes = program
        .attributes
        .to_wgpu()
        .with_context(|| format!("shader program `{}` has an unusable layout", program.name))?;

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{prefix} {} shader", program.name)),
        source: wgpu::ShaderSource::Wgsl(program.source.clone()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{prefix} {} pipeline layout", program.name)),
        bind_group_layouts: &[globals_layout],
        immediate_size: 0,
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{prefix} {} pipeline", program.name)),
        layout: Some(&pipeline_layout),

        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some(program.vertex_entry),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: program.attributes.stride(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &attributes,
            }],
        },

        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some(program.fragment_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: key.format,
                blend: key.blending.then_some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: key.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    Ok(pipeline)
}

struct Bound {
    buffer: BufferId,
    buffer_label: String,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: u32,
    globals: wgpu::BindGroup,
    program: ShaderProgram,
    blending: bool,
}

/// Buffers are matched by id; labels are shared between shapes of one kind.
fn unbind_matches(bound: BufferId, unbinding: BufferId) -> bool {
    bound == unbinding
}

/// Per-frame [`RenderContext`] recording into one wgpu render pass.
pub struct WgpuRenderContext<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    viewport: Viewport,
    renderer: &'a mut GpuRenderer,
    pass: wgpu::RenderPass<'a>,
    bound: Option<Bound>,
}

impl RenderContext for WgpuRenderContext<'_> {
    fn view_bounds(&self) -> Option<Rect> {
        self.renderer
            .config
            .cull_to_viewport
            .then(|| Rect::new(0.0, 0.0, self.viewport.width, self.viewport.height))
    }

    fn bind(
        &mut self,
        buffer: &mut VertexBuffer,
        program: &ShaderProgram,
        state: &DrawState,
    ) -> Result<()> {
        ensure!(
            buffer.attributes() == &program.attributes,
            "vertex buffer `{}` layout does not match shader program `{}`",
            buffer.label(),
            program.name
        );

        buffer.sync_to_gpu(self.device, self.queue);
        let vertex_buffer = buffer
            .hardware()
            .cloned()
            .with_context(|| format!("vertex buffer `{}` has no GPU storage", buffer.label()))?;

        let globals = Globals {
            viewport: self.viewport.clamped_size(),
            _pad: [0.0; 2],
            model: state.transform.to_padded_columns(),
        };
        // One small uniform buffer and bind group per bind. Each draw carries its
        // own model matrix, and a frame draws few shapes.
        // TODO: pool these behind one buffer with dynamic offsets if a frame
        // ever draws enough shapes for the allocations to show up in a profile.
        let prefix = &self.renderer.config.label_prefix;
        let ubo = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{prefix} globals ubo")),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let layout = globals_layout(&mut self.renderer.globals_layout, self.device, prefix);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{prefix} globals bind group")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        if let Some(previous) = self.bound.take() {
            log::warn!(
                "vertex buffer `{}` bound while `{}` was still bound",
                buffer.label(),
                previous.buffer_label
            );
        }

        self.bound = Some(Bound {
            buffer: buffer.id(),
            buffer_label: buffer.label().to_owned(),
            vertex_buffer,
            vertex_capacity: buffer.vertex_capacity(),
            globals: bind_group,
            program: program.clone(),
            blending: state.blending,
        });
        Ok(())
    }

    fn draw(&mut self, primitive: PrimitiveType, vertex_count: u32) -> Result<()> {
        let Some(bound) = self.bound.as_ref() else {
            bail!("draw({primitive:?}, {vertex_count}) issued with no bound vertex buffer");
        };
        ensure!(
            vertex_count <= bound.vertex_capacity,
            "draw of {vertex_count} vertices exceeds `{}` capacity of {}",
            bound.buffer_label,
            bound.vertex_capacity
        );

        let pipeline = self.renderer.pipeline(
            self.device,
            self.surface_format,
            &bound.program,
            primitive,
            bound.blending,
        )?;

        self.pass.set_pipeline(pipeline);
        self.pass.set_bind_group(0, &bound.globals, &[]);
        self.pass.set_vertex_buffer(0, bound.vertex_buffer.slice(..));
        self.pass.draw(0..vertex_count, 0..1);
        Ok(())
    }

    fn unbind(&mut self, buffer: &VertexBuffer, _program: &ShaderProgram) {
        match self.bound.take() {
            Some(bound) if unbind_matches(bound.buffer, buffer.id()) => {}
            Some(bound) => log::warn!(
                "unbind of `{}` ({:?}) while `{}` ({:?}) was bound",
                buffer.label(),
                buffer.id(),
                bound.buffer_label,
                bound.buffer
            ),
            None => log::warn!("unbind of `{}` with nothing bound", buffer.label()),
        }
    }
}
