//! Pixel shaders for triangle rasterization.
//!
//! This module provides a trait-based abstraction for per-pixel shading computations,
//! similar to how GPUs separate the fixed-function rasterizer from programmable
//! fragment/pixel shaders.
//!
//! # Architecture
//!
//! The rasterizer handles:
//! - Bounding box computation
//! - Edge function evaluation and the depth test
//! - Perspective-correct attribute interpolation
//!
//! The shader handles:
//! - Normal mapping
//! - Texture sampling
//! - Lighting
//!
//! Shaders return linear, unclamped color. Tone mapping into `[0, 1]` and
//! quantization happen in the rasterizer.

use std::f32::consts::PI;

use crate::colors::ColorRgb;
use crate::engine::LightingMode;
use crate::light::DirectionalLight;
use crate::math::vec3::Vec3;
use crate::mesh::VertexOut;
use crate::texture::{Material, Texture};

/// Trait for per-pixel shading computations.
///
/// The rasterizer calls `shade()` for each pixel that survives the depth test,
/// passing the interpolated attributes of that pixel.
pub trait PixelShader {
    /// Compute the linear color of a pixel.
    fn shade(&self, pixel: &VertexOut) -> ColorRgb;
}

/// Flat shader - returns a constant color for all pixels.
pub struct FlatShader {
    color: ColorRgb,
}

impl FlatShader {
    pub fn new(color: ColorRgb) -> Self {
        Self { color }
    }
}

impl PixelShader for FlatShader {
    #[inline]
    fn shade(&self, _pixel: &VertexOut) -> ColorRgb {
        self.color
    }
}

/// Textured surface lit by a single directional light.
///
/// The [`LightingMode`] selects which terms end up in the output:
///
/// | mode         | output                                              |
/// |--------------|-----------------------------------------------------|
/// | ObservedArea | `cos θ` as gray                                     |
/// | Diffuse      | `intensity * albedo / π * cos θ`                    |
/// | Specular     | `specular * phong(shininess * gloss) * cos θ`       |
/// | Combined     | `(intensity * albedo / π + specular term) * cos θ`  |
///
/// where `cos θ` is the observed area of the (possibly normal-mapped) normal.
pub struct SurfaceShader<'a> {
    material: &'a Material,
    light: DirectionalLight,
    lighting_mode: LightingMode,
    normal_mapping: bool,
}

impl<'a> SurfaceShader<'a> {
    /// # Panics
    ///
    /// Panics if `lighting_mode` needs a specular term and the material lacks
    /// either the gloss or the specular map.
    pub fn new(
        material: &'a Material,
        light: DirectionalLight,
        lighting_mode: LightingMode,
        normal_mapping: bool,
    ) -> Self {
        assert!(
            !lighting_mode.uses_specular() || material.specular_maps().is_some(),
            "{lighting_mode:?} lighting requires gloss and specular maps"
        );
        Self {
            material,
            light,
            lighting_mode,
            normal_mapping,
        }
    }

    /// The shading normal, perturbed by the tangent-space normal map when
    /// normal mapping is on and the material has one.
    fn surface_normal(&self, pixel: &VertexOut) -> Vec3 {
        match (&self.material.normal, self.normal_mapping) {
            (Some(normal_map), true) => perturb_normal(normal_map, pixel),
            _ => pixel.normal,
        }
    }

    #[inline]
    fn diffuse(&self, pixel: &VertexOut) -> ColorRgb {
        self.material.diffuse.sample(pixel.uv) * self.light.intensity / PI
    }

    fn specular(&self, pixel: &VertexOut, normal: Vec3) -> ColorRgb {
        // Presence is checked in the constructor for every mode that gets here
        let Some((gloss, specular)) = self.material.specular_maps() else {
            return ColorRgb::BLACK;
        };
        let exponent = self.light.shininess * gloss.sample(pixel.uv).r;
        specular.sample(pixel.uv) * self.light.phong(exponent, normal, pixel.view_direction)
    }
}

impl PixelShader for SurfaceShader<'_> {
    fn shade(&self, pixel: &VertexOut) -> ColorRgb {
        let normal = self.surface_normal(pixel).normalize();
        let observed_area = self.light.observed_area(normal);

        match self.lighting_mode {
            LightingMode::ObservedArea => ColorRgb::gray(observed_area),
            LightingMode::Diffuse => self.diffuse(pixel) * observed_area,
            LightingMode::Specular => self.specular(pixel, normal) * observed_area,
            LightingMode::Combined => {
                (self.diffuse(pixel) + self.specular(pixel, normal)) * observed_area
            }
        }
    }
}

/// Decodes a tangent-space normal map sample into world space.
///
/// The texel is expanded from `[0, 1]` to `[-1, 1]` and used as coordinates in
/// the (tangent, binormal, normal) frame, with `binormal = normal × tangent`.
fn perturb_normal(normal_map: &Texture, pixel: &VertexOut) -> Vec3 {
    let texel = normal_map.sample(pixel.uv) * 2.0 - ColorRgb::WHITE;
    let binormal = pixel.normal.cross(pixel.tangent);

    pixel.tangent * texel.r + binormal * texel.g + pixel.normal * texel.b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use approx::assert_relative_eq;

    /// A pixel facing straight into the default light.
    fn lit_pixel() -> VertexOut {
        let light = DirectionalLight::default();
        VertexOut {
            normal: -light.direction,
            tangent: light.direction.cross(Vec3::UP).normalize(),
            view_direction: Vec3::FORWARD,
            uv: Vec2::new(0.5, 0.5),
            ..Default::default()
        }
    }

    fn material(diffuse: ColorRgb) -> Material {
        Material::new(Texture::solid(diffuse))
    }

    #[test]
    fn flat_shader_ignores_attributes() {
        let shader = FlatShader::new(ColorRgb::new(0.2, 0.4, 0.6));
        assert_eq!(shader.shade(&lit_pixel()), ColorRgb::new(0.2, 0.4, 0.6));
    }

    #[test]
    fn observed_area_is_gray_cosine() {
        let material = material(ColorRgb::WHITE);
        let shader = SurfaceShader::new(
            &material,
            DirectionalLight::default(),
            LightingMode::ObservedArea,
            false,
        );
        let color = shader.shade(&lit_pixel());
        assert_relative_eq!(color.r, 1.0, epsilon = 1e-5);
        assert_eq!(color.r, color.g);
        assert_eq!(color.g, color.b);
    }

    #[test]
    fn surfaces_facing_away_are_black() {
        let material = material(ColorRgb::WHITE);
        let shader = SurfaceShader::new(
            &material,
            DirectionalLight::default(),
            LightingMode::Diffuse,
            false,
        );
        let mut pixel = lit_pixel();
        pixel.normal = -pixel.normal;
        assert_eq!(shader.shade(&pixel), ColorRgb::BLACK);
    }

    #[test]
    fn diffuse_is_lambertian() {
        let material = material(ColorRgb::new(1.0, 0.0, 0.0));
        let light = DirectionalLight::default();
        let shader = SurfaceShader::new(&material, light, LightingMode::Diffuse, false);

        let color = shader.shade(&lit_pixel());
        assert_relative_eq!(color.r, light.intensity / PI, epsilon = 1e-4);
        assert_eq!(color.g, 0.0);
        assert_eq!(color.b, 0.0);
    }

    #[test]
    fn flat_normal_map_keeps_geometric_normal() {
        // (0.5, 0.5, 1.0) decodes to the unperturbed +Z tangent-space normal.
        // 0x80 / 255 is slightly above 0.5, hence the tolerance.
        let flat = Texture::from_pixels(1, 1, vec![0xFF80_80FF]);
        let material = material(ColorRgb::WHITE).with_normal(flat);
        let light = DirectionalLight::default();

        let mapped = SurfaceShader::new(&material, light, LightingMode::ObservedArea, true);
        let plain = SurfaceShader::new(&material, light, LightingMode::ObservedArea, false);

        let pixel = lit_pixel();
        assert_relative_eq!(
            mapped.shade(&pixel).r,
            plain.shade(&pixel).r,
            epsilon = 1e-3
        );
    }

    #[test]
    fn normal_map_is_ignored_when_disabled() {
        // Points the tangent-space normal fully along the tangent.
        let sideways = Texture::from_pixels(1, 1, vec![0xFFFF_8080]);
        let material = material(ColorRgb::WHITE).with_normal(sideways);
        let light = DirectionalLight::default();

        let off = SurfaceShader::new(&material, light, LightingMode::ObservedArea, false);
        let on = SurfaceShader::new(&material, light, LightingMode::ObservedArea, true);

        let pixel = lit_pixel();
        assert_relative_eq!(off.shade(&pixel).r, 1.0, epsilon = 1e-5);
        assert!(on.shade(&pixel).r < 0.1);
    }

    #[test]
    fn combined_adds_specular_to_diffuse() {
        let material = material(ColorRgb::new(0.5, 0.5, 0.5))
            .with_gloss(Texture::solid(ColorRgb::WHITE))
            .with_specular(Texture::solid(ColorRgb::WHITE));
        let light = DirectionalLight::default();

        // View ray mirrored about the normal: the highlight is at its peak.
        let mut pixel = lit_pixel();
        pixel.view_direction = (-light.direction).reflect(pixel.normal);

        let diffuse = SurfaceShader::new(&material, light, LightingMode::Diffuse, false);
        let specular = SurfaceShader::new(&material, light, LightingMode::Specular, false);
        let combined = SurfaceShader::new(&material, light, LightingMode::Combined, false);

        let d = diffuse.shade(&pixel);
        let s = specular.shade(&pixel);
        let c = combined.shade(&pixel);
        assert_relative_eq!(s.r, 1.0, epsilon = 1e-3);
        assert_relative_eq!(c.r, d.r + s.r, epsilon = 1e-4);
    }

    #[test]
    #[should_panic(expected = "requires gloss and specular maps")]
    fn specular_without_maps_panics() {
        let material = material(ColorRgb::WHITE);
        SurfaceShader::new(
            &material,
            DirectionalLight::default(),
            LightingMode::Specular,
            false,
        );
    }
}
