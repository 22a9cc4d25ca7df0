// Great thanks to https://github.com/sotrh/learn-wgpu
// This code is modified

pub mod app;
pub mod buffer;
pub mod config;
pub mod context;
pub mod error;
pub mod input;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod renderer;
pub mod shader;
pub mod target;

pub use buffer::{VertexBuffer, upload_vertices};
pub use config::RendererConfig;
pub use context::{GpuContext, initialize, initialize_headless, is_supported};
pub use error::{Error, Result};
pub use pipeline::{CellPipeline, PipelineDescriptor, build_pipeline};
pub use renderer::FrameRenderer;
pub use shader::{ModuleLayout, ShaderConfig};
pub use target::{OffscreenTarget, RenderTarget, WindowTarget};

use winit::event_loop::{ControlFlow, EventLoop};

/// Opens the window and renders the cell square until the window is closed.
pub fn run() -> Result<()> {
    logging::init_logging(None);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = app::App::new(RendererConfig::from_env());
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
