//! A CPU software rasterizer for textured, normal-mapped meshes.
//!
//! The crate implements the whole graphics pipeline on the CPU: vertex
//! transform to NDC, raster mapping, edge-function rasterization with
//! perspective-correct interpolation, depth testing, and per-pixel shading
//! with several lighting modes. SDL2 is used only for the window and input.
//!
//! # Quick Start
//!
//! ```ignore
//! use softrast::prelude::*;
//!
//! let camera = Camera::new(60.0, Vec3::new(0.0, 0.0, -10.0), 640.0 / 480.0);
//! let mesh = Mesh::from_obj("resources/vehicle.obj", ObjOptions::default())?;
//! let material = Material::new(Texture::from_file("resources/vehicle_diffuse.png")?);
//!
//! let mut engine = Engine::new(640, 480, camera, mesh, material);
//! engine.update(0.0, &CameraInput::default());
//! engine.render();
//! engine.save_frame("frame.png")?;
//! ```

// Public API - exposed to library consumers
pub mod camera;
pub mod colors;
pub mod config;
pub mod engine;
pub mod light;
pub mod math;
pub mod mesh;
pub mod render;
pub mod texture;
pub mod window;

// Re-export commonly needed types at crate root for convenience
pub use engine::{Engine, FrameStats, LightingMode, RenderMode, RenderState, Toggle};
pub use mesh::{LoadError, Mesh};

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use softrast::prelude::*;
/// ```
pub mod prelude {
    // Camera
    pub use crate::camera::{Camera, CameraInput, CameraSpeeds};

    // Engine
    pub use crate::engine::{
        Engine, FrameStats, LightingMode, RenderMode, RenderState, Toggle,
    };

    // Scene
    pub use crate::colors::ColorRgb;
    pub use crate::light::DirectionalLight;
    pub use crate::mesh::{Mesh, ObjOptions, PrimitiveTopology, Vertex};
    pub use crate::texture::{Material, Texture};

    // Math
    pub use crate::math::mat4::Mat4;
    pub use crate::math::vec2::Vec2;
    pub use crate::math::vec3::Vec3;
    pub use crate::math::vec4::Vec4;

    // Window & Input
    pub use crate::window::{FpsCounter, FrameLimiter, InputState, Window, WindowEvent};
}
