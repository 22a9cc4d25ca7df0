use crate::error::{Error, Result};
use crate::model::Vertex;
use crate::shader::{ModuleLayout, ShaderConfig};

/// Static description of the cell pipeline.
///
/// Two pipelines built from equal descriptors are configured identically.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineDescriptor {
    pub vertex_entry: String,
    pub fragment_entry: String,
    pub module_layout: ModuleLayout,
    pub array_stride: wgpu::BufferAddress,
    pub attributes: Vec<wgpu::VertexAttribute>,
    pub target_format: wgpu::TextureFormat,
    pub topology: wgpu::PrimitiveTopology,
}

impl PipelineDescriptor {
    pub fn new(target_format: wgpu::TextureFormat, shader: &ShaderConfig) -> Self {
        let layout = Vertex::desc();
        Self {
            vertex_entry: shader.vertex_entry.to_string(),
            fragment_entry: shader.fragment_entry.to_string(),
            module_layout: shader.layout,
            array_stride: layout.array_stride,
            attributes: layout.attributes.to_vec(),
            target_format,
            topology: wgpu::PrimitiveTopology::TriangleList,
        }
    }

    fn vertex_buffer_layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.array_stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

/// Checks the shader without a device and describes the pipeline it will build.
pub fn prepare(target_format: wgpu::TextureFormat, shader: &ShaderConfig) -> Result<PipelineDescriptor> {
    shader.validate()?;
    Ok(PipelineDescriptor::new(target_format, shader))
}

pub struct CellPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub descriptor: PipelineDescriptor,
}

/// Compiles `shader` and builds the render pipeline drawing into `target_format`.
pub async fn build_pipeline(
    device: &wgpu::Device,
    target_format: wgpu::TextureFormat,
    shader: &ShaderConfig,
) -> Result<CellPipeline> {
    let descriptor = prepare(target_format, shader)?;
    let modules = shader.create_modules(device).await?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Cell pipeline"),
        layout: None,
        vertex: wgpu::VertexState {
            module: modules.vertex(),
            entry_point: Some(descriptor.vertex_entry.as_str()),
            buffers: &[descriptor.vertex_buffer_layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: modules.fragment(),
            entry_point: Some(descriptor.fragment_entry.as_str()),
            targets: &[Some(wgpu::ColorTargetState {
                format: descriptor.target_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: descriptor.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    });
    if let Some(err) = device.pop_error_scope().await {
        return Err(Error::Pipeline(err.to_string()));
    }

    log::debug!(
        "built cell pipeline for {:?} from {} shader module(s)",
        descriptor.target_format,
        modules.module_count()
    );

    Ok(CellPipeline {
        pipeline,
        descriptor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_matches_vertex_layout() {
        let descriptor =
            PipelineDescriptor::new(wgpu::TextureFormat::Bgra8Unorm, &ShaderConfig::default());
        assert_eq!(descriptor.array_stride, 8);
        assert_eq!(descriptor.attributes.len(), 1);
        assert_eq!(
            descriptor.attributes[0].format,
            wgpu::VertexFormat::Float32x2
        );
        assert_eq!(descriptor.vertex_entry, "vertexMain");
        assert_eq!(descriptor.fragment_entry, "fragmentMain");
        assert_eq!(descriptor.target_format, wgpu::TextureFormat::Bgra8Unorm);
    }

    #[test]
    fn same_inputs_give_equal_descriptors() {
        let shader = ShaderConfig::default();
        let a = PipelineDescriptor::new(wgpu::TextureFormat::Rgba8Unorm, &shader);
        let b = PipelineDescriptor::new(wgpu::TextureFormat::Rgba8Unorm, &shader);
        assert_eq!(a, b);
    }

    #[test]
    fn format_and_layout_are_part_of_the_descriptor() {
        let shader = ShaderConfig::default();
        let a = PipelineDescriptor::new(wgpu::TextureFormat::Rgba8Unorm, &shader);
        let b = PipelineDescriptor::new(wgpu::TextureFormat::Bgra8Unorm, &shader);
        let c = PipelineDescriptor::new(
            wgpu::TextureFormat::Rgba8Unorm,
            &shader.clone().with_layout(ModuleLayout::Split),
        );
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn prepare_accepts_default_shader() {
        let descriptor =
            prepare(wgpu::TextureFormat::Rgba8Unorm, &ShaderConfig::default()).unwrap();
        assert_eq!(
            descriptor,
            PipelineDescriptor::new(wgpu::TextureFormat::Rgba8Unorm, &ShaderConfig::default())
        );
    }

    #[test]
    fn prepare_fails_the_same_way_every_time() {
        let shader = ShaderConfig::default().with_entry_points("vertexMain", "fs_main");
        for _ in 0..2 {
            match prepare(wgpu::TextureFormat::Rgba8Unorm, &shader) {
                Err(Error::MissingEntryPoint { stage, name }) => {
                    assert_eq!(stage, crate::error::Stage::Fragment);
                    assert_eq!(name, "fs_main");
                }
                Err(other) => panic!("unexpected error: {other}"),
                Ok(descriptor) => panic!("prepared {descriptor:?} without a fragment entry"),
            }
        }
    }

    #[test]
    fn prepare_rejects_malformed_split_source() {
        let shader = ShaderConfig {
            fragment_source: "@fragment fn fragmentMain( {".into(),
            ..ShaderConfig::default()
        }
        .with_layout(ModuleLayout::Split);
        match prepare(wgpu::TextureFormat::Rgba8Unorm, &shader) {
            Err(Error::ShaderCompile { label, .. }) => assert_eq!(label, "Cell fragment shader"),
            other => panic!("expected a compile error, got {other:?}"),
        }
    }
}
