//! Floating-point RGB color and packing into the ARGB8888 output format.

use std::ops::{Add, AddAssign, Div, Mul, Sub};

/// Background the color buffer is cleared to every frame (RGB 100, 100, 100).
pub const BACKGROUND: u32 = 0xFF64_6464;

/// Linear RGB color with `f32` channels, nominally in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColorRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl ColorRgb {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// The same value in all three channels.
    pub const fn gray(value: f32) -> Self {
        Self::new(value, value, value)
    }

    /// Rescales the color so its largest channel is at most 1.
    ///
    /// Channel ratios are preserved: when the maximum exceeds 1 every channel
    /// is divided by it, otherwise the color is returned unchanged.
    pub fn max_to_one(self) -> Self {
        let max = self.r.max(self.g).max(self.b);
        if max > 1.0 {
            self / max
        } else {
            self
        }
    }

    /// Quantizes to 8 bits per channel and packs as `0xFF_RR_GG_BB`.
    ///
    /// The float to `u8` conversion saturates, so out-of-range channels clamp
    /// to 0 or 255 independently.
    #[inline]
    pub fn to_argb(self) -> u32 {
        let r = (self.r * 255.0) as u8;
        let g = (self.g * 255.0) as u8;
        let b = (self.b * 255.0) as u8;
        0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32
    }

    /// Unpacks an ARGB8888 pixel, dropping alpha.
    pub fn from_argb(pixel: u32) -> Self {
        Self::new(
            ((pixel >> 16) & 0xFF) as f32 / 255.0,
            ((pixel >> 8) & 0xFF) as f32 / 255.0,
            (pixel & 0xFF) as f32 / 255.0,
        )
    }
}

impl Add for ColorRgb {
    type Output = ColorRgb;

    fn add(self, rhs: ColorRgb) -> Self::Output {
        Self::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for ColorRgb {
    fn add_assign(&mut self, rhs: ColorRgb) {
        *self = *self + rhs;
    }
}

impl Sub for ColorRgb {
    type Output = ColorRgb;

    fn sub(self, rhs: ColorRgb) -> Self::Output {
        Self::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}

/// Component-wise product.
impl Mul for ColorRgb {
    type Output = ColorRgb;

    fn mul(self, rhs: ColorRgb) -> Self::Output {
        Self::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl Mul<f32> for ColorRgb {
    type Output = ColorRgb;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

impl Div<f32> for ColorRgb {
    type Output = ColorRgb;

    fn div(self, rhs: f32) -> Self::Output {
        Self::new(self.r / rhs, self.g / rhs, self.b / rhs)
    }
}
