//! Frame buffer abstraction for 2D pixel access.
//!
//! Provides a view into the color and depth buffers with bounds-checked access.
//! The depth buffer enables hidden surface removal via the z-buffer algorithm.

/// A view into color and depth buffers.
///
/// Wraps 1D slices with width/height metadata to enable 2D pixel access.
/// This is a borrowed view, not an owning type. It is created once per frame
/// by the renderer and handed to the rasterizer.
///
/// # Depth Buffer
///
/// The depth buffer stores the interpolated NDC z of the nearest surface seen
/// so far. Smaller values are closer to the camera; a cleared buffer holds
/// `f32::INFINITY` so the first surface always wins.
pub struct FrameBuffer<'a> {
    color_buffer: &'a mut [u32],
    depth_buffer: &'a mut [f32],
    width: u32,
    height: u32,
}

impl<'a> FrameBuffer<'a> {
    /// Create a new FrameBuffer view from buffer slices and dimensions.
    ///
    /// # Panics
    /// Panics in debug builds if buffer lengths don't match width * height
    pub fn new(
        color_buffer: &'a mut [u32],
        depth_buffer: &'a mut [f32],
        width: u32,
        height: u32,
    ) -> Self {
        debug_assert_eq!(
            color_buffer.len(),
            (width * height) as usize,
            "Color buffer size doesn't match dimensions"
        );
        debug_assert_eq!(
            depth_buffer.len(),
            (width * height) as usize,
            "Depth buffer size doesn't match dimensions"
        );
        Self {
            color_buffer,
            depth_buffer,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    /// Depth test with write-on-pass.
    ///
    /// The test fails only when the stored depth is strictly smaller than
    /// `depth`; equal depths pass, so the later triangle wins ties. On pass the
    /// new depth is stored and `true` is returned. Out-of-bounds coordinates
    /// always fail, and so does a NaN depth.
    #[inline]
    pub fn test_and_set_depth(&mut self, x: u32, y: u32, depth: f32) -> bool {
        let Some(idx) = self.index(x, y) else {
            return false;
        };
        if depth.is_nan() || self.depth_buffer[idx] < depth {
            return false;
        }
        self.depth_buffer[idx] = depth;
        true
    }

    /// Set a pixel without depth testing.
    /// Silently ignores out-of-bounds coordinates.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: u32) {
        if let Some(idx) = self.index(x, y) {
            self.color_buffer[idx] = color;
        }
    }

    /// Get the color at (x, y), or None if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y).map(|idx| self.color_buffer[idx])
    }

    /// Get the stored depth at (x, y), or None if out of bounds.
    #[inline]
    pub fn get_depth(&self, x: u32, y: u32) -> Option<f32> {
        self.index(x, y).map(|idx| self.depth_buffer[idx])
    }
}
