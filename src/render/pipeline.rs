//! Per-vertex stages: model space to NDC, then NDC to raster coordinates.

use crate::math::{Mat4, Vec2, Vec4};
use crate::mesh::{Vertex, VertexOut};

/// Transforms every vertex into NDC and derives its per-frame attributes.
///
/// `out` is cleared and refilled so its allocation is reused across frames.
/// Entries are index-aligned with `vertices`.
pub fn transform_vertices(
    vertices: &[Vertex],
    world: Mat4,
    view: Mat4,
    projection: Mat4,
    out: &mut Vec<VertexOut>,
) {
    let world_view_projection = projection * view * world;

    out.clear();
    out.extend(vertices.iter().map(|vertex| {
        let clip = world_view_projection * Vec4::point(vertex.position);

        VertexOut {
            // View vector: direction of the undivided clip position
            view_direction: clip.xyz().normalize(),
            position: clip.perspective_divide(),
            color: vertex.color,
            uv: vertex.uv,
            normal: world.transform_vector(vertex.normal),
            tangent: world.transform_vector(vertex.tangent),
        }
    }));
}

/// Maps NDC x/y to pixel coordinates, flipping Y so rows grow downward.
pub fn ndc_to_raster(vertices: &[VertexOut], width: u32, height: u32, out: &mut Vec<Vec2>) {
    let (width, height) = (width as f32, height as f32);

    out.clear();
    out.extend(vertices.iter().map(|vertex| {
        Vec2::new(
            (vertex.position.x + 1.0) / 2.0 * width,
            (1.0 - vertex.position.y) / 2.0 * height,
        )
    }));
}
