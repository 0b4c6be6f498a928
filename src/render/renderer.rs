//! Owning color and depth buffers.
//!
//! Provides the [`Renderer`] struct which owns the per-frame buffers, clears
//! them, hands out [`FrameBuffer`] views to the rasterizer and exports the
//! finished image.

use std::path::Path;

use log::info;

use super::framebuffer::FrameBuffer;
use crate::colors::{self, ColorRgb};

pub struct Renderer {
    color_buffer: Vec<u32>,
    depth_buffer: Vec<f32>,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width * height) as usize;
        Self {
            color_buffer: vec![colors::BACKGROUND; size],
            depth_buffer: vec![f32::INFINITY; size],
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let size = (width * height) as usize;
        self.color_buffer = vec![colors::BACKGROUND; size];
        self.depth_buffer = vec![f32::INFINITY; size];
        self.width = width;
        self.height = height;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, color: u32) {
        self.color_buffer.fill(color);
    }

    /// Clear the depth buffer to prepare for a new frame.
    /// Sets all depths to +inf so the first surface always passes.
    #[inline]
    pub fn clear_depth(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
    }

    /// Row-major ARGB8888 pixels.
    pub fn pixels(&self) -> &[u32] {
        &self.color_buffer
    }

    pub fn depths(&self) -> &[f32] {
        &self.depth_buffer
    }

    /// The color buffer as raw bytes, in native-endian ARGB8888 order as SDL
    /// expects for streaming textures.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: u32 has no padding and a stricter alignment than u8, and the
        // byte length covers exactly the initialized pixels.
        unsafe {
            std::slice::from_raw_parts(
                self.color_buffer.as_ptr() as *const u8,
                self.color_buffer.len() * 4,
            )
        }
    }

    /// Get a mutable FrameBuffer view into the color and depth buffers.
    pub fn as_framebuffer(&mut self) -> FrameBuffer<'_> {
        FrameBuffer::new(
            &mut self.color_buffer,
            &mut self.depth_buffer,
            self.width,
            self.height,
        )
    }

    /// Writes the color buffer to an image file; the format follows the
    /// extension.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        let path = path.as_ref();
        let image = image::RgbImage::from_fn(self.width, self.height, |x, y| {
            let pixel = self.color_buffer[(y * self.width + x) as usize];
            let ColorRgb { r, g, b } = ColorRgb::from_argb(pixel);
            image::Rgb([
                (r * 255.0).round() as u8,
                (g * 255.0).round() as u8,
                (b * 255.0).round() as u8,
            ])
        });
        image.save(path)?;
        info!("Saved frame to {}", path.display());
        Ok(())
    }
}
