use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::config::RendererConfig;
use crate::context::GpuContext;
use crate::error::{Error, Result};

/// Format used for offscreen rendering and pixel readback.
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// One acquired image to render into.
///
/// Window frames are shown on `present`; offscreen frames keep their contents in
/// the target texture.
pub struct Frame {
    view: wgpu::TextureView,
    surface_texture: Option<wgpu::SurfaceTexture>,
}

impl Frame {
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn present(self) {
        if let Some(surface_texture) = self.surface_texture {
            surface_texture.present();
        }
    }
}

/// Something the renderer can draw into.
pub trait RenderTarget {
    fn format(&self) -> wgpu::TextureFormat;

    fn size(&self) -> (u32, u32);

    fn acquire(&mut self) -> std::result::Result<Frame, wgpu::SurfaceError>;
}

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate.
    Fatal,
}

/// A window surface, configured once with the platform's preferred format.
pub struct WindowTarget {
    surface: wgpu::Surface<'static>,
    window: Arc<Window>,
    config: wgpu::SurfaceConfiguration,
}

impl WindowTarget {
    pub fn new(
        surface: wgpu::Surface<'static>,
        window: Arc<Window>,
        context: &GpuContext,
        renderer_config: &RendererConfig,
    ) -> Result<Self> {
        let size = window.inner_size();
        let caps = surface.get_capabilities(&context.adapter);
        let format = choose_surface_format(&caps.formats, renderer_config.prefer_srgb)
            .ok_or(Error::NoSurfaceFormat)?;

        let present_mode = if caps.present_modes.contains(&renderer_config.present_mode) {
            renderer_config.present_mode
        } else {
            wgpu::PresentMode::Fifo
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&context.device, &config);
        log::info!(
            "configured surface {}x{} as {:?}",
            config.width,
            config.height,
            config.format
        );

        Ok(Self {
            surface,
            window,
            config,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn resize(&mut self, device: &wgpu::Device, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(device, &self.config);
        }
    }

    pub fn handle_surface_error(
        &mut self,
        device: &wgpu::Device,
        err: &wgpu::SurfaceError,
    ) -> SurfaceErrorAction {
        let action = surface_error_action(err);
        if action == SurfaceErrorAction::Reconfigured {
            self.surface.configure(device, &self.config);
        }
        action
    }
}

/// Maps a surface error to what the caller should do about it. Lost or outdated
/// surfaces are reconfigured by [`WindowTarget::handle_surface_error`].
pub fn surface_error_action(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

impl RenderTarget for WindowTarget {
    fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn acquire(&mut self) -> std::result::Result<Frame, wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Frame {
            view,
            surface_texture: Some(surface_texture),
        })
    }
}

/// A texture target for rendering without a window.
pub struct OffscreenTarget {
    texture: wgpu::Texture,
    width: u32,
    height: u32,
}

impl OffscreenTarget {
    /// Fails with `InvalidTargetSize` when a side is zero or beyond the device limit.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Result<Self> {
        check_target_size(width, height, device.limits().max_texture_dimension_2d)?;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        Ok(Self {
            texture,
            width,
            height,
        })
    }

    /// Reads the target back as tightly packed RGBA8 rows.
    ///
    /// Blocks until the GPU has finished all submitted work.
    pub fn read_pixels(&self, context: &GpuContext) -> Result<Vec<u8>> {
        let unpadded = self.width as usize * 4;
        let padded = padded_bytes_per_row(self.width);

        let staging = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback staging buffer"),
            size: padded as wgpu::BufferAddress * self.height as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback encoder"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );

        context.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        context
            .device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| Error::Readback(e.to_string()))?;

        rx.recv()
            .map_err(|e| Error::Readback(e.to_string()))?
            .map_err(|e| Error::Readback(e.to_string()))?;

        let mapped = slice.get_mapped_range();
        let pixels = strip_row_padding(&mapped, unpadded, padded as usize, self.height as usize);
        drop(mapped);
        staging.unmap();

        Ok(pixels)
    }
}

impl RenderTarget for OffscreenTarget {
    fn format(&self) -> wgpu::TextureFormat {
        OFFSCREEN_FORMAT
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn acquire(&mut self) -> std::result::Result<Frame, wgpu::SurfaceError> {
        Ok(Frame {
            view: self
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default()),
            surface_texture: None,
        })
    }
}

/// Picks an sRGB format when preferred and available, else the surface's first format.
pub fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if prefer_srgb {
        if let Some(format) = formats.iter().copied().find(|f| f.is_srgb()) {
            return Some(format);
        }
    }
    formats.first().copied()
}

/// Offscreen sides must be non-zero and within the device's 2D texture limit.
pub fn check_target_size(width: u32, height: u32, max: u32) -> Result<()> {
    if width == 0 || height == 0 || width > max || height > max {
        return Err(Error::InvalidTargetSize { width, height, max });
    }
    Ok(())
}

/// Row pitch for texture copies, aligned to `COPY_BYTES_PER_ROW_ALIGNMENT`.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64;
    (width as u64 * 4).div_ceil(align) as u32 * align as u32
}

fn strip_row_padding(data: &[u8], unpadded: usize, padded: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(unpadded * height);
    for row in 0..height {
        let start = row * padded;
        pixels.extend_from_slice(&data[start..start + unpadded]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_padded_to_copy_alignment() {
        assert_eq!(padded_bytes_per_row(1), 256);
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(1000), 4096);
        assert_eq!(padded_bytes_per_row(32768), 131072);
    }

    #[test]
    fn zero_or_oversized_targets_are_rejected() {
        for (width, height) in [(0, 64), (64, 0), (0, 0), (8193, 64), (64, 8193)] {
            match check_target_size(width, height, 8192) {
                Err(Error::InvalidTargetSize { max, .. }) => assert_eq!(max, 8192),
                other => panic!("{width}x{height} accepted: {other:?}"),
            }
        }
        check_target_size(1, 1, 8192).unwrap();
        check_target_size(8192, 8192, 8192).unwrap();
    }

    #[test]
    fn staging_size_does_not_wrap_at_max_resolution() {
        let padded = padded_bytes_per_row(32768) as wgpu::BufferAddress;
        assert_eq!(padded * 32768, 1 << 32);
    }

    #[test]
    fn padding_is_stripped_per_row() {
        let mut data = vec![0u8; 512];
        data[..4].copy_from_slice(&[1, 2, 3, 4]);
        data[256..260].copy_from_slice(&[5, 6, 7, 8]);
        let pixels = strip_row_padding(&data, 4, 256, 2);
        assert_eq!(pixels, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn srgb_is_preferred_when_offered() {
        let formats = [
            wgpu::TextureFormat::Bgra8Unorm,
            wgpu::TextureFormat::Bgra8UnormSrgb,
        ];
        assert_eq!(
            choose_surface_format(&formats, true),
            Some(wgpu::TextureFormat::Bgra8UnormSrgb)
        );
        assert_eq!(
            choose_surface_format(&formats, false),
            Some(wgpu::TextureFormat::Bgra8Unorm)
        );
    }

    #[test]
    fn surface_errors_map_to_actions() {
        use wgpu::SurfaceError;
        assert_eq!(surface_error_action(&SurfaceError::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(surface_error_action(&SurfaceError::Outdated), SurfaceErrorAction::Reconfigured);
        assert_eq!(surface_error_action(&SurfaceError::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(surface_error_action(&SurfaceError::Other), SurfaceErrorAction::SkipFrame);
        assert_eq!(surface_error_action(&SurfaceError::OutOfMemory), SurfaceErrorAction::Fatal);
    }

    #[test]
    fn no_formats_means_no_choice() {
        assert_eq!(choose_surface_format(&[], true), None);
    }
}
