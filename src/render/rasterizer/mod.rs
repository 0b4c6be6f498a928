//! Triangle rasterization.
//!
//! - [`primitives`]: groups an index buffer into triangles per topology
//! - [`EdgeFunctionRasterizer`]: bounding box iteration with edge function tests
//! - [`PixelShader`]: per-pixel color computation
//!
//! Depth and attribute interpolation live in [`interpolation`].

mod edgefunction;
pub mod interpolation;
mod shader;

pub use edgefunction::{BoundingBox, EdgeFunctionRasterizer, TriangleOutcome, TriangleSetup};
pub use shader::{FlatShader, PixelShader, SurfaceShader};

use crate::mesh::PrimitiveTopology;

/// Splits an index buffer into triangles.
///
/// A triangle list yields consecutive triples and ignores a trailing partial
/// triple. A triangle strip yields every window of three indices, swapping the
/// last two of odd windows so all triangles share one winding. Fewer than three
/// indices yield nothing.
pub fn primitives(
    indices: &[u32],
    topology: PrimitiveTopology,
) -> Box<dyn Iterator<Item = [u32; 3]> + '_> {
    match topology {
        PrimitiveTopology::TriangleList => Box::new(
            indices
                .chunks_exact(3)
                .map(|triangle| [triangle[0], triangle[1], triangle[2]]),
        ),
        PrimitiveTopology::TriangleStrip => {
            Box::new(indices.windows(3).enumerate().map(|(i, window)| {
                if i % 2 == 1 {
                    [window[0], window[2], window[1]]
                } else {
                    [window[0], window[1], window[2]]
                }
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(indices: &[u32], topology: PrimitiveTopology) -> Vec<[u32; 3]> {
        primitives(indices, topology).collect()
    }

    #[test]
    fn list_ignores_trailing_partial_triangle() {
        assert_eq!(
            collect(&[0, 1, 2, 3, 4, 5, 6, 7], PrimitiveTopology::TriangleList),
            vec![[0, 1, 2], [3, 4, 5]]
        );
    }

    #[test]
    fn strip_swaps_odd_windows() {
        assert_eq!(
            collect(&[0, 1, 2, 3, 4], PrimitiveTopology::TriangleStrip),
            vec![[0, 1, 2], [1, 3, 2], [2, 3, 4]]
        );
    }

    #[test]
    fn short_buffers_yield_nothing() {
        for topology in [PrimitiveTopology::TriangleList, PrimitiveTopology::TriangleStrip] {
            assert!(collect(&[], topology).is_empty());
            assert!(collect(&[0, 1], topology).is_empty());
        }
    }

    #[test]
    fn strip_degenerates_pass_through_for_the_rasterizer_to_reject() {
        // Repeated indices stitch strips together; they still come out as
        // triangles and are dropped later.
        let triangles = collect(&[0, 1, 2, 2, 3, 4], PrimitiveTopology::TriangleStrip);
        assert_eq!(triangles.len(), 4);
        assert_eq!(triangles[1], [1, 2, 2]);
    }
}
