use std::borrow::Cow;

use crate::error::{Error, Result, Stage};

pub const VERTEX_SOURCE: &str = include_str!("shaders/cell.vert.wgsl");
pub const FRAGMENT_SOURCE: &str = include_str!("shaders/cell.frag.wgsl");

pub const VERTEX_ENTRY: &str = "vertexMain";
pub const FRAGMENT_ENTRY: &str = "fragmentMain";

/// How the vertex and fragment sources are turned into shader modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleLayout {
    /// Vertex source followed by fragment source, compiled as one module.
    #[default]
    Combined,
    /// Each source compiled into its own module.
    Split,
}

/// Shader sources plus the entry point names the pipeline binds.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderConfig {
    pub vertex_source: Cow<'static, str>,
    pub fragment_source: Cow<'static, str>,
    pub vertex_entry: Cow<'static, str>,
    pub fragment_entry: Cow<'static, str>,
    pub layout: ModuleLayout,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            vertex_source: Cow::Borrowed(VERTEX_SOURCE),
            fragment_source: Cow::Borrowed(FRAGMENT_SOURCE),
            vertex_entry: Cow::Borrowed(VERTEX_ENTRY),
            fragment_entry: Cow::Borrowed(FRAGMENT_ENTRY),
            layout: ModuleLayout::Combined,
        }
    }
}

/// Compiled shader modules, ready to be referenced by a pipeline.
pub struct ShaderModules {
    modules: Vec<wgpu::ShaderModule>,
}

impl ShaderModules {
    pub fn vertex(&self) -> &wgpu::ShaderModule {
        &self.modules[0]
    }

    pub fn fragment(&self) -> &wgpu::ShaderModule {
        &self.modules[self.modules.len() - 1]
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

impl ShaderConfig {
    pub fn with_layout(mut self, layout: ModuleLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_entry_points(
        mut self,
        vertex: impl Into<Cow<'static, str>>,
        fragment: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.vertex_entry = vertex.into();
        self.fragment_entry = fragment.into();
        self
    }

    /// Returns `(label, source)` for each module this layout produces.
    pub fn module_sources(&self) -> Vec<(&'static str, Cow<'_, str>)> {
        match self.layout {
            ModuleLayout::Combined => vec![(
                "Cell shader",
                Cow::Owned(format!("{}\n{}", self.vertex_source, self.fragment_source)),
            )],
            ModuleLayout::Split => vec![
                ("Cell vertex shader", Cow::Borrowed(&*self.vertex_source)),
                ("Cell fragment shader", Cow::Borrowed(&*self.fragment_source)),
            ],
        }
    }

    /// Parses and validates the sources with naga, without touching a GPU.
    ///
    /// Fails on malformed WGSL, on validation errors, and when a configured entry
    /// point is missing or belongs to another stage.
    pub fn validate(&self) -> Result<()> {
        let modules = self
            .module_sources()
            .into_iter()
            .map(|(label, source)| parse_and_validate(label, &source))
            .collect::<Result<Vec<_>>>()?;

        let vertex_module = &modules[0];
        let fragment_module = &modules[modules.len() - 1];

        require_entry_point(vertex_module, Stage::Vertex, &self.vertex_entry)?;
        require_entry_point(fragment_module, Stage::Fragment, &self.fragment_entry)?;
        Ok(())
    }

    /// Creates the GPU shader modules, capturing compiler diagnostics from wgpu.
    pub async fn create_modules(&self, device: &wgpu::Device) -> Result<ShaderModules> {
        let mut modules = Vec::with_capacity(2);

        for (label, source) in self.module_sources() {
            device.push_error_scope(wgpu::ErrorFilter::Validation);
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(Cow::Owned(source.into_owned())),
            });
            if let Some(err) = device.pop_error_scope().await {
                return Err(Error::ShaderCompile {
                    label: label.to_string(),
                    message: err.to_string(),
                });
            }
            log::debug!("compiled shader module {label:?}");
            modules.push(module);
        }

        Ok(ShaderModules { modules })
    }
}

fn parse_and_validate(label: &str, source: &str) -> Result<naga::Module> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| Error::ShaderCompile {
        label: label.to_string(),
        message: e.emit_to_string(source),
    })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| Error::ShaderCompile {
            label: label.to_string(),
            message: e.to_string(),
        })?;

    Ok(module)
}

fn require_entry_point(module: &naga::Module, stage: Stage, name: &str) -> Result<()> {
    let wanted = match stage {
        Stage::Vertex => naga::ShaderStage::Vertex,
        Stage::Fragment => naga::ShaderStage::Fragment,
    };

    if module
        .entry_points
        .iter()
        .any(|ep| ep.name == name && ep.stage == wanted)
    {
        Ok(())
    } else {
        Err(Error::MissingEntryPoint {
            stage,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shaders_validate() {
        ShaderConfig::default().validate().unwrap();
        ShaderConfig::default()
            .with_layout(ModuleLayout::Split)
            .validate()
            .unwrap();
    }

    #[test]
    fn combined_layout_concatenates_sources() {
        let config = ShaderConfig::default();
        let sources = config.module_sources();
        assert_eq!(sources.len(), 1);
        assert!(sources[0].1.contains("fn vertexMain"));
        assert!(sources[0].1.contains("fn fragmentMain"));
    }

    #[test]
    fn split_layout_keeps_sources_apart() {
        let config = ShaderConfig::default().with_layout(ModuleLayout::Split);
        let sources = config.module_sources();
        assert_eq!(sources.len(), 2);
        assert!(!sources[0].1.contains("fragmentMain"));
        assert!(!sources[1].1.contains("vertexMain"));
    }

    #[test]
    fn renamed_vertex_entry_is_missing() {
        let err = ShaderConfig::default()
            .with_entry_points("vs_main", FRAGMENT_ENTRY)
            .validate()
            .unwrap_err();
        match err {
            Error::MissingEntryPoint { stage, name } => {
                assert_eq!(stage, Stage::Vertex);
                assert_eq!(name, "vs_main");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fragment_entry_must_be_a_fragment_stage() {
        // vertexMain exists, but as a vertex entry point.
        let err = ShaderConfig::default()
            .with_entry_points(VERTEX_ENTRY, VERTEX_ENTRY)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingEntryPoint {
                stage: Stage::Fragment,
                ..
            }
        ));
    }

    #[test]
    fn split_layout_looks_in_the_right_module() {
        let config = ShaderConfig {
            vertex_source: Cow::Borrowed(FRAGMENT_SOURCE),
            fragment_source: Cow::Borrowed(VERTEX_SOURCE),
            ..ShaderConfig::default()
        }
        .with_layout(ModuleLayout::Split);
        assert!(matches!(
            config.validate(),
            Err(Error::MissingEntryPoint {
                stage: Stage::Vertex,
                ..
            })
        ));
    }

    #[test]
    fn malformed_source_fails_to_compile() {
        let config = ShaderConfig {
            vertex_source: Cow::Borrowed("@vertex fn vertexMain( -> {"),
            ..ShaderConfig::default()
        };
        match config.validate() {
            Err(Error::ShaderCompile { label, .. }) => assert_eq!(label, "Cell shader"),
            other => panic!("expected a compile error, got {other:?}"),
        }
    }

    #[test]
    fn validation_is_deterministic() {
        let config = ShaderConfig::default().with_entry_points("nope", "fragmentMain");
        let first = config.validate().unwrap_err().to_string();
        let second = config.validate().unwrap_err().to_string();
        assert_eq!(first, second);
    }
}
