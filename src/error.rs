use std::fmt;

/// Shader stage an entry point is looked up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Vertex => f.write_str("vertex"),
            Stage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Errors that can occur while setting up or driving the renderer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("GPU rendering is not supported on this platform: {0}")]
    UnsupportedPlatform(String),

    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,

    #[error("shader compilation failed for {label}: {message}")]
    ShaderCompile { label: String, message: String },

    #[error("{stage} entry point `{name}` not found in shader")]
    MissingEntryPoint { stage: Stage, name: String },

    #[error("vertex data is empty")]
    EmptyVertices,

    #[error("invalid target size {width}x{height} (max {max})")]
    InvalidTargetSize { width: u32, height: u32, max: u32 },

    #[error("pipeline creation failed: {0}")]
    Pipeline(String),

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("readback failed: {0}")]
    Readback(String),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
}

impl From<wgpu::RequestAdapterError> for Error {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        Error::UnsupportedPlatform(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
