use crate::shader::ShaderConfig;

/// Background color the render pass clears to: dark blue.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.4,
    a: 1.0,
};

pub const WINDOW_SIZE: (u32, u32) = (1000, 1000);

#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,
    /// Prefer an sRGB surface format when the surface offers one.
    pub prefer_srgb: bool,
    pub present_mode: wgpu::PresentMode,
    pub clear_color: wgpu::Color,
    pub shader: ShaderConfig,
    pub title: String,
    pub window_size: (u32, u32),
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backends: default_backends(),
            power_preference: wgpu::PowerPreference::default(),
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            clear_color: CLEAR_COLOR,
            shader: ShaderConfig::default(),
            title: env!("CARGO_PKG_NAME").to_string(),
            window_size: WINDOW_SIZE,
        }
    }
}

impl RendererConfig {
    /// Defaults, with `WGPU_BACKEND` and `WGPU_POWER_PREF` applied when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(backends) = wgpu::Backends::from_env() {
            log::info!("using backends from WGPU_BACKEND: {backends:?}");
            config.backends = backends;
        }
        if let Some(power_preference) = wgpu::PowerPreference::from_env() {
            config.power_preference = power_preference;
        }
        config
    }

    pub fn with_shader(mut self, shader: ShaderConfig) -> Self {
        self.shader = shader;
        self
    }

    pub fn with_backends(mut self, backends: wgpu::Backends) -> Self {
        self.backends = backends;
        self
    }
}

fn default_backends() -> wgpu::Backends {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL
        } else {
            wgpu::Backends::PRIMARY
        }
    }
}

/// Converts a linear clear color into the 8-bit value a `*8Unorm` target stores.
pub fn color_to_rgba8(color: wgpu::Color) -> [u8; 4] {
    let quantize = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [
        quantize(color.r),
        quantize(color.g),
        quantize(color.b),
        quantize(color.a),
    ]
}
