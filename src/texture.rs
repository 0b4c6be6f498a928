//! Decoded texture surfaces and the material that groups them.

use std::fmt;
use std::path::{Path, PathBuf};

use log::info;

use crate::colors::ColorRgb;
use crate::math::vec2::Vec2;

/// Represents a 2D texture for texture mapping.
pub struct Texture {
    data: Vec<u32>, // The pixel data of the texture in ARGB format.
    width: u32,     // The width of the texture in pixels.
    height: u32,    // The height of the texture in pixels.
}

impl Texture {
    // Load a texture from an image file (PNG, JPG, etc.)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, image::ImageError> {
        let img = image::open(path.as_ref())?.to_rgb8();
        let (width, height) = img.dimensions();

        let data: Vec<u32> = img
            .pixels()
            .map(|p| {
                let [r, g, b] = p.0;
                0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
            })
            .collect();

        info!(
            "Loaded texture {} ({}x{})",
            path.as_ref().display(),
            width,
            height
        );

        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Builds a texture from already decoded ARGB8888 texels, row-major.
    ///
    /// # Panics
    /// Panics if `data.len() != width * height` or either dimension is zero.
    pub fn from_pixels(width: u32, height: u32, data: Vec<u32>) -> Self {
        assert!(width > 0 && height > 0, "texture dimensions must be non-zero");
        assert_eq!(
            data.len(),
            (width * height) as usize,
            "texel count doesn't match dimensions"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// A 1x1 texture of a single color.
    pub fn solid(color: ColorRgb) -> Self {
        Self::from_pixels(1, 1, vec![color.to_argb()])
    }

    /// Sample the texture at UV coordinates using nearest-neighbor filtering.
    ///
    /// Both coordinates are clamped to `[0, 1]`; `(0, 0)` is the top-left texel.
    #[inline]
    pub fn sample(&self, uv: Vec2) -> ColorRgb {
        let u = uv.x.clamp(0.0, 1.0);
        let v = uv.y.clamp(0.0, 1.0);

        // u == 1.0 lands one past the last texel; pin it to the edge
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);

        ColorRgb::from_argb(self.data[(y * self.width + x) as usize])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Error raised when one of a material's texture files can't be decoded.
#[derive(Debug)]
pub struct MaterialError {
    path: PathBuf,
    source: image::ImageError,
}

impl MaterialError {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for MaterialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load texture '{}': {}", self.path.display(), self.source)
    }
}

impl std::error::Error for MaterialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// The texture set a mesh is shaded with.
///
/// Only the diffuse map is mandatory. Lighting modes that need the gloss and
/// specular maps check for them before shading starts.
pub struct Material {
    pub diffuse: Texture,
    pub normal: Option<Texture>,
    pub gloss: Option<Texture>,
    pub specular: Option<Texture>,
}

impl Material {
    pub fn new(diffuse: Texture) -> Self {
        Self {
            diffuse,
            normal: None,
            gloss: None,
            specular: None,
        }
    }

    /// Loads every configured map. Any decode failure is fatal for the material.
    pub fn load(
        diffuse: &Path,
        normal: Option<&Path>,
        gloss: Option<&Path>,
        specular: Option<&Path>,
    ) -> Result<Self, MaterialError> {
        let load = |path: &Path| {
            Texture::from_file(path).map_err(|source| MaterialError {
                path: path.to_path_buf(),
                source,
            })
        };

        Ok(Self {
            diffuse: load(diffuse)?,
            normal: normal.map(load).transpose()?,
            gloss: gloss.map(load).transpose()?,
            specular: specular.map(load).transpose()?,
        })
    }

    pub fn with_normal(mut self, texture: Texture) -> Self {
        self.normal = Some(texture);
        self
    }

    pub fn with_gloss(mut self, texture: Texture) -> Self {
        self.gloss = Some(texture);
        self
    }

    pub fn with_specular(mut self, texture: Texture) -> Self {
        self.specular = Some(texture);
        self
    }

    /// Gloss and specular maps together, if both are present.
    pub fn specular_maps(&self) -> Option<(&Texture, &Texture)> {
        self.gloss.as_ref().zip(self.specular.as_ref())
    }
}
