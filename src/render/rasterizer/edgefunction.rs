//! Edge function-based triangle rasterization.
//!
//! This module implements triangle rasterization using the edge function algorithm,
//! which is the foundation of modern GPU rasterization. The algorithm tests each
//! pixel against three edge equations to determine triangle coverage.
//!
//! # Algorithm Overview
//!
//! 1. Reject triangles with repeated indices or a vertex outside the frustum
//! 2. Compute the signed area and cull back-facing or zero-area triangles
//! 3. Compute a bounding box around the triangle
//! 4. For each pixel in the bounding box, evaluate three edge functions
//! 5. A pixel is covered if all edge functions are non-negative
//!
//! # Edge Function
//!
//! For an edge from point A to point B, the edge function at point P is the
//! 2D cross product `(B - A) × (P - A)`. In raster space (Y down) it is
//! positive when P lies on the inner side of a clockwise triangle.
//!
//! # Barycentric Coordinates
//!
//! Each edge function divided by the signed area is the barycentric weight of
//! the vertex opposite that edge:
//!
//! ```text
//! w0 = E12(P) / area,  w1 = E20(P) / area,  w2 = E01(P) / area
//! ```
//!
//! # References
//!
//! - Juan Pineda, "A Parallel Algorithm for Polygon Rasterization" (1988)
//! - Scratchapixel: <https://www.scratchapixel.com/lessons/3d-basic-rendering/rasterization-practical-implementation>

use super::interpolation::{interpolate_depth, interpolate_vertex, remap_depth};
use super::shader::PixelShader;
use crate::camera::Camera;
use crate::colors::ColorRgb;
use crate::engine::RenderMode;
use crate::math::Vec2;
use crate::mesh::VertexOut;
use crate::render::framebuffer::FrameBuffer;

/// What happened to a triangle handed to the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleOutcome {
    /// The triangle reached the pixel loop. It may still cover no pixels.
    Rasterized,
    /// Two indices were equal or an index was out of range.
    Degenerate,
    /// At least one vertex lies outside the view frustum.
    OutsideFrustum,
    /// Back-facing or zero area in raster space.
    BackFacing,
}

/// Pixel rectangle a triangle can touch, clamped to the buffer.
///
/// The minimum corner is inclusive and the maximum corner exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl BoundingBox {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    /// Every pixel coordinate inside the box, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> {
        let (min_x, max_x) = (self.min_x, self.max_x);
        (self.min_y..self.max_y).flat_map(move |y| (min_x..max_x).map(move |x| (x, y)))
    }
}

/// Per-triangle constants for the edge function test.
#[derive(Debug, Clone, Copy)]
pub struct TriangleSetup {
    points: [Vec2; 3],
    /// `v1 - v0`, `v2 - v1`, `v0 - v2`
    edges: [Vec2; 3],
    area: f32,
}

impl TriangleSetup {
    /// Returns `None` for back-facing triangles and triangles whose signed
    /// area is below `f32::EPSILON`.
    pub fn new(v0: Vec2, v1: Vec2, v2: Vec2) -> Option<Self> {
        let edges = [v1 - v0, v2 - v1, v0 - v2];
        let area = edges[0].cross(edges[1]);
        if area < f32::EPSILON {
            return None;
        }
        Some(Self {
            points: [v0, v1, v2],
            edges,
            area,
        })
    }

    /// Signed area of the parallelogram spanned by the first two edges.
    pub fn area(&self) -> f32 {
        self.area
    }

    /// Bounding box padded by one pixel on each side, clamped to
    /// `[0, width] x [0, height]`.
    pub fn bounding_box(&self, width: u32, height: u32) -> BoundingBox {
        let [v0, v1, v2] = self.points;
        let min = v0.min(v1).min(v2);
        let max = v0.max(v1).max(v2);

        let clamp = |value: f32, limit: u32| (value as i32).clamp(0, limit as i32) as u32;
        BoundingBox {
            min_x: clamp(min.x - 1.0, width),
            min_y: clamp(min.y - 1.0, height),
            max_x: clamp(max.x + 1.0, width),
            max_y: clamp(max.y + 1.0, height),
        }
    }

    /// Barycentric weights of `p`, or `None` if `p` is not covered.
    ///
    /// Points exactly on an edge are covered.
    #[inline]
    pub fn barycentric(&self, p: Vec2) -> Option<[f32; 3]> {
        let e01 = self.edges[0].cross(p - self.points[0]);
        let e12 = self.edges[1].cross(p - self.points[1]);
        let e20 = self.edges[2].cross(p - self.points[2]);

        if e01 < 0.0 || e12 < 0.0 || e20 < 0.0 {
            return None;
        }
        Some([e12 / self.area, e20 / self.area, e01 / self.area])
    }
}

/// Triangle rasterizer using the edge function algorithm.
///
/// Iterates over the pixels in the triangle's bounding box, sampling at pixel
/// centers, and writes depth-tested colors produced by a [`PixelShader`].
#[derive(Debug, Default, Clone, Copy)]
pub struct EdgeFunctionRasterizer;

impl EdgeFunctionRasterizer {
    /// Creates a new edge function rasterizer instance.
    pub fn new() -> Self {
        EdgeFunctionRasterizer
    }

    /// Rasterizes one indexed triangle into `buffer`.
    ///
    /// `vertices` are the transformed vertices of the mesh and `raster` their
    /// screen positions, index-aligned. Colors go through
    /// [`ColorRgb::max_to_one`] before quantization.
    ///
    /// In [`RenderMode::BoundingBox`] every pixel of the padded bounding box is
    /// painted white with no coverage or depth test.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_triangle<S: PixelShader>(
        &self,
        indices: [u32; 3],
        vertices: &[VertexOut],
        raster: &[Vec2],
        camera: &Camera,
        mode: RenderMode,
        shader: &S,
        buffer: &mut FrameBuffer,
    ) -> TriangleOutcome {
        let [i0, i1, i2] = indices;
        if i0 == i1 || i1 == i2 || i0 == i2 {
            return TriangleOutcome::Degenerate;
        }

        let fetch = |index: u32| {
            let index = index as usize;
            Some((vertices.get(index)?, *raster.get(index)?))
        };
        let (Some((a, p0)), Some((b, p1)), Some((c, p2))) = (fetch(i0), fetch(i1), fetch(i2))
        else {
            return TriangleOutcome::Degenerate;
        };

        if [a, b, c]
            .iter()
            .any(|vertex| camera.is_outside_frustum(vertex.position))
        {
            return TriangleOutcome::OutsideFrustum;
        }

        let Some(setup) = TriangleSetup::new(p0, p1, p2) else {
            return TriangleOutcome::BackFacing;
        };
        let bbox = setup.bounding_box(buffer.width(), buffer.height());

        if mode == RenderMode::BoundingBox {
            let white = ColorRgb::WHITE.to_argb();
            for (x, y) in bbox.pixels() {
                buffer.set_pixel(x, y, white);
            }
            return TriangleOutcome::Rasterized;
        }

        let depths = [a.position.z, b.position.z, c.position.z];

        for (x, y) in bbox.pixels() {
            let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let Some(weights) = setup.barycentric(center) else {
                continue;
            };

            let depth = interpolate_depth(weights, depths);
            if !buffer.test_and_set_depth(x, y, depth) {
                continue;
            }

            let color = if mode == RenderMode::DepthBuffer {
                ColorRgb::gray(remap_depth(depth))
            } else {
                shader.shade(&interpolate_vertex(weights, [a, b, c], depth))
            };
            buffer.set_pixel(x, y, color.max_to_one().to_argb());
        }

        TriangleOutcome::Rasterized
    }
}
