//! The per-frame rendering pipeline below the engine.
//!
//! [`pipeline`] runs the vertex stages, [`rasterizer`] turns triangles into
//! pixels, and [`Renderer`] owns the buffers they end up in.

mod framebuffer;
pub mod pipeline;
pub mod rasterizer;
mod renderer;

pub use framebuffer::FrameBuffer;
pub use rasterizer::{
    primitives, EdgeFunctionRasterizer, FlatShader, PixelShader, SurfaceShader, TriangleOutcome,
};
pub use renderer::Renderer;
