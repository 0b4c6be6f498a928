//! Depth and attribute interpolation across a triangle.
//!
//! Barycentric weights come from raster space, which is a perspective
//! projection of the triangle. Attributes that vary linearly in view space are
//! interpolated as `attr / w` and rescaled by the interpolated `1 / w`.

use crate::math::Vec4;
use crate::mesh::VertexOut;

/// Lower end of the depth range the depth visualization stretches to black.
const DEPTH_REMAP_MIN: f32 = 0.985;

/// Perspective-correct NDC depth: `1 / Σ(weight_i / z_i)`.
///
/// Zero-weight vertices are left out of the sum, so a vertex on the near
/// plane (`z == 0`) only matters where it actually contributes.
#[inline]
pub fn interpolate_depth(weights: [f32; 3], depths: [f32; 3]) -> f32 {
    let term = |weight: f32, depth: f32| if weight == 0.0 { 0.0 } else { weight / depth };
    1.0 / (term(weights[0], depths[0]) + term(weights[1], depths[1]) + term(weights[2], depths[2]))
}

/// Converts screen-space barycentric weights into view-space ones.
///
/// Returns the corrected weights `weight_i / w_i * w_depth` together with
/// `w_depth = 1 / Σ(weight_i / w_i)`.
#[inline]
pub fn perspective_weights(weights: [f32; 3], w: [f32; 3]) -> ([f32; 3], f32) {
    let scaled = [weights[0] / w[0], weights[1] / w[1], weights[2] / w[2]];
    let w_depth = 1.0 / (scaled[0] + scaled[1] + scaled[2]);
    (
        [scaled[0] * w_depth, scaled[1] * w_depth, scaled[2] * w_depth],
        w_depth,
    )
}

/// Builds the per-pixel attributes of a covered pixel.
///
/// UVs and colors are blended as-is; normal, tangent and view direction are
/// renormalized afterwards. The resulting position carries the interpolated
/// NDC depth in z and `w_depth` in w.
pub fn interpolate_vertex(weights: [f32; 3], vertices: [&VertexOut; 3], depth: f32) -> VertexOut {
    let w = [
        vertices[0].position.w,
        vertices[1].position.w,
        vertices[2].position.w,
    ];
    let ([k0, k1, k2], w_depth) = perspective_weights(weights, w);
    let [a, b, c] = vertices;

    VertexOut {
        position: Vec4::new(0.0, 0.0, depth, w_depth),
        color: a.color * k0 + b.color * k1 + c.color * k2,
        uv: a.uv * k0 + b.uv * k1 + c.uv * k2,
        normal: (a.normal * k0 + b.normal * k1 + c.normal * k2).normalize(),
        tangent: (a.tangent * k0 + b.tangent * k1 + c.tangent * k2).normalize(),
        view_direction: (a.view_direction * k0 + b.view_direction * k1 + c.view_direction * k2)
            .normalize(),
    }
}

/// Stretches `[0.985, 1]` to `[0, 1]` for the depth visualization.
///
/// Depths outside that range are clamped first.
#[inline]
pub fn remap_depth(depth: f32) -> f32 {
    (depth.clamp(DEPTH_REMAP_MIN, 1.0) - DEPTH_REMAP_MIN) / (1.0 - DEPTH_REMAP_MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Vec2, Vec3};
    use approx::assert_relative_eq;

    fn vertex(uv: Vec2, w: f32) -> VertexOut {
        VertexOut {
            position: Vec4::new(0.0, 0.0, 0.5, w),
            uv,
            normal: Vec3::UP,
            tangent: Vec3::RIGHT,
            view_direction: Vec3::FORWARD,
            ..Default::default()
        }
    }

    #[test]
    fn equal_w_reduces_to_affine_interpolation() {
        let weights = [0.2, 0.3, 0.5];
        let a = vertex(Vec2::new(0.0, 0.0), 4.0);
        let b = vertex(Vec2::new(1.0, 0.0), 4.0);
        let c = vertex(Vec2::new(0.0, 1.0), 4.0);

        let pixel = interpolate_vertex(weights, [&a, &b, &c], 0.5);
        assert_relative_eq!(pixel.uv.x, 0.3, epsilon = 1e-6);
        assert_relative_eq!(pixel.uv.y, 0.5, epsilon = 1e-6);
        assert_relative_eq!(pixel.position.w, 4.0, epsilon = 1e-6);
    }

    #[test]
    fn nearer_vertices_pull_harder() {
        // Halfway between a near and a far vertex in screen space sits closer
        // to the near one in view space.
        let ([near, far, _], w_depth) = perspective_weights([0.5, 0.5, 0.0], [1.0, 3.0, 2.0]);
        assert_relative_eq!(near, 0.75, epsilon = 1e-6);
        assert_relative_eq!(far, 0.25, epsilon = 1e-6);
        assert_relative_eq!(w_depth, 1.5, epsilon = 1e-6);
    }

    #[test]
    fn corrected_weights_sum_to_one() {
        let (k, _) = perspective_weights([0.1, 0.6, 0.3], [2.0, 7.5, 0.4]);
        assert_relative_eq!(k[0] + k[1] + k[2], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn depth_at_a_vertex_is_that_vertex_depth() {
        assert_relative_eq!(interpolate_depth([1.0, 0.0, 0.0], [0.99, 0.5, 0.7]), 0.99);
        assert_relative_eq!(
            interpolate_depth([0.25, 0.25, 0.5], [0.9, 0.9, 0.9]),
            0.9,
            epsilon = 1e-6
        );
    }

    #[test]
    fn near_plane_vertex_with_zero_weight_is_ignored() {
        let depth = interpolate_depth([0.0, 0.25, 0.75], [0.0, 0.5, 0.5]);
        assert_relative_eq!(depth, 0.5, epsilon = 1e-6);

        let depth = interpolate_depth([-0.0, 0.5, 0.5], [0.0, 0.4, 0.4]);
        assert_relative_eq!(depth, 0.4, epsilon = 1e-6);
    }

    #[test]
    fn near_plane_vertex_with_weight_pins_depth_to_zero() {
        assert_eq!(interpolate_depth([0.5, 0.25, 0.25], [0.0, 0.5, 0.5]), 0.0);
    }

    #[test]
    fn interpolated_directions_are_unit_length() {
        let mut a = vertex(Vec2::ZERO, 1.0);
        let mut b = vertex(Vec2::ZERO, 2.0);
        let c = vertex(Vec2::ZERO, 3.0);
        a.normal = Vec3::RIGHT;
        b.normal = Vec3::UP;

        let pixel = interpolate_vertex([0.4, 0.4, 0.2], [&a, &b, &c], 0.5);
        assert_relative_eq!(pixel.normal.magnitude(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(pixel.view_direction.magnitude(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn depth_remap_endpoints_and_clamping() {
        assert_eq!(remap_depth(0.985), 0.0);
        assert_eq!(remap_depth(1.0), 1.0);
        assert_eq!(remap_depth(0.5), 0.0);
        assert_eq!(remap_depth(1.7), 1.0);
        assert_relative_eq!(remap_depth(0.9925), 0.5, epsilon = 1e-3);
    }
}
