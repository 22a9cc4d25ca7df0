use std::sync::Arc;

use winit::window::Window;

use crate::config::RendererConfig;
use crate::error::{Error, Result};
use crate::target::{OffscreenTarget, WindowTarget};

/// Adapter, device and queue shared by every GPU resource the renderer creates.
pub struct GpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

pub fn create_instance(config: &RendererConfig) -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: config.backends,
        ..Default::default()
    })
}

/// Reports whether this environment exposes GPU rendering for `config`'s backends.
pub async fn is_supported(config: &RendererConfig) -> bool {
    has_adapter(&create_instance(config), config.backends).await
}

async fn has_adapter(instance: &wgpu::Instance, backends: wgpu::Backends) -> bool {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            let _ = (instance, backends);
            wgpu::util::is_browser_webgpu_supported().await
        } else {
            !instance.enumerate_adapters(backends).is_empty()
        }
    }
}

/// Acquires a device for `window` and configures its surface with the preferred format.
pub async fn initialize(
    window: Arc<Window>,
    config: &RendererConfig,
) -> Result<(GpuContext, WindowTarget)> {
    let instance = create_instance(config);
    ensure_supported(&instance, config).await?;

    let surface = instance.create_surface(window.clone())?;
    let context = GpuContext::request(instance, Some(&surface), config).await?;
    let target = WindowTarget::new(surface, window, &context, config)?;

    Ok((context, target))
}

/// Acquires a device without a window and renders into an offscreen texture.
pub async fn initialize_headless(
    config: &RendererConfig,
    width: u32,
    height: u32,
) -> Result<(GpuContext, OffscreenTarget)> {
    let instance = create_instance(config);
    ensure_supported(&instance, config).await?;

    let context = GpuContext::request(instance, None, config).await?;
    let target = OffscreenTarget::new(&context.device, width, height)?;

    Ok((context, target))
}

async fn ensure_supported(instance: &wgpu::Instance, config: &RendererConfig) -> Result<()> {
    if has_adapter(instance, config.backends).await {
        Ok(())
    } else {
        Err(Error::UnsupportedPlatform(format!(
            "no adapter available for backends {:?}",
            config.backends
        )))
    }
}

impl GpuContext {
    async fn request(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
        config: &RendererConfig,
    ) -> Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: config.power_preference,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await?;

        let info = adapter.get_info();
        log::info!(
            "using adapter {} ({:?}, {:?})",
            info.name,
            info.backend,
            info.device_type
        );

        let base_limits = if cfg!(target_arch = "wasm32") {
            wgpu::Limits::downlevel_webgl2_defaults()
        } else {
            wgpu::Limits::downlevel_defaults()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Cell device"),
                required_features: wgpu::Features::empty(),
                required_limits: base_limits.using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }
}
