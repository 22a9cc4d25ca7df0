use crate::buffer::{self, VertexBuffer};
use crate::config::RendererConfig;
use crate::context::GpuContext;
use crate::error::Result;
use crate::model::{self, Vertex};
use crate::pipeline::{self, CellPipeline};
use crate::target::RenderTarget;

/// Owns every GPU object needed to draw the cell square into `T`.
///
/// Fields drop in declaration order, so the buffer and pipeline are released
/// before the target and the device that created them.
pub struct FrameRenderer<T: RenderTarget> {
    vertex_buffer: VertexBuffer,
    pipeline: CellPipeline,
    clear_color: wgpu::Color,
    target: T,
    context: GpuContext,
}

impl<T: RenderTarget> FrameRenderer<T> {
    /// Builds the pipeline for the target's format and uploads the static square.
    pub async fn new(context: GpuContext, target: T, config: &RendererConfig) -> Result<Self> {
        Self::with_vertices(context, target, config, model::VERTICES).await
    }

    pub async fn with_vertices(
        context: GpuContext,
        target: T,
        config: &RendererConfig,
        vertices: &[Vertex],
    ) -> Result<Self> {
        buffer::vertex_payload(vertices)?;
        let pipeline =
            pipeline::build_pipeline(&context.device, target.format(), &config.shader).await?;
        let vertex_buffer = buffer::upload_vertices(&context.device, &context.queue, vertices)?;

        Ok(Self {
            vertex_buffer,
            pipeline,
            clear_color: config.clear_color,
            target,
            context,
        })
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Splits out the device alongside the target, for operations needing both.
    pub fn target_and_device(&mut self) -> (&mut T, &wgpu::Device) {
        (&mut self.target, &self.context.device)
    }

    pub fn pipeline(&self) -> &CellPipeline {
        &self.pipeline
    }

    pub fn vertex_buffer(&self) -> &VertexBuffer {
        &self.vertex_buffer
    }

    /// Replaces the vertex buffer wholesale with `vertices`.
    ///
    /// Empty input is rejected and the current buffer is kept.
    pub fn upload_vertices(&mut self, vertices: &[Vertex]) -> Result<()> {
        self.vertex_buffer =
            buffer::upload_vertices(&self.context.device, &self.context.queue, vertices)?;
        Ok(())
    }

    /// Clears the target, draws the square and submits without waiting for the GPU.
    pub fn render_frame(&mut self) -> std::result::Result<(), wgpu::SurfaceError> {
        let frame = self.target.acquire()?;

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Cell encoder"),
                });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Cell render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: frame.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline.pipeline);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.buffer().slice(..));
            render_pass.draw(0..self.vertex_buffer.vertex_count(), 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }
}
