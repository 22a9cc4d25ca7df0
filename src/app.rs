use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use crate::config::RendererConfig;
use crate::context;
use crate::error::{Error, Result};
use crate::input::{self, InputAction};
use crate::renderer::FrameRenderer;
use crate::target::{RenderTarget, SurfaceErrorAction, WindowTarget};

/// Windowed driver: creates the renderer once the event loop is running and
/// draws whenever the window asks for a redraw.
pub struct App {
    config: RendererConfig,
    renderer: Option<FrameRenderer<WindowTarget>>,
    error: Option<Error>,
}

impl App {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            renderer: None,
            error: None,
        }
    }

    /// The fatal error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    fn create_renderer(&self, event_loop: &ActiveEventLoop) -> Result<FrameRenderer<WindowTarget>> {
        let (width, height) = self.config.window_size;
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(width, height));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let (context, target) = pollster::block_on(context::initialize(window, &self.config))?;
        pollster::block_on(FrameRenderer::new(context, target, &self.config))
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
        self.error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }

        match self.create_renderer(event_loop) {
            Ok(renderer) => {
                log::info!("renderer ready, target format {:?}", renderer.target().format());
                renderer.target().window().request_redraw();
                self.renderer = Some(renderer);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if window_id != renderer.target().window().id() {
            return;
        }

        match input::handle_input(&event) {
            Some(InputAction::Exit) => {
                event_loop.exit();
                return;
            }
            Some(InputAction::Redraw) => {
                renderer.target().window().request_redraw();
                return;
            }
            None => {}
        }

        match event {
            WindowEvent::Resized(physical_size) => {
                let (target, device) = renderer.target_and_device();
                target.resize(device, physical_size);
                target.window().request_redraw();
            }
            WindowEvent::RedrawRequested => {
                let Err(err) = renderer.render_frame() else {
                    return;
                };

                let (target, device) = renderer.target_and_device();
                let action = target.handle_surface_error(device, &err);

                match action {
                    SurfaceErrorAction::Reconfigured => renderer.target().window().request_redraw(),
                    SurfaceErrorAction::SkipFrame => log::warn!("skipping frame: {err}"),
                    SurfaceErrorAction::Fatal => self.fail(event_loop, Error::Surface(err)),
                }
            }
            _ => {}
        }
    }
}
