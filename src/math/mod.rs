//! Minimal linear algebra for the pipeline: 2/3/4D vectors and a 4x4 matrix.

pub mod mat4;
pub mod vec2;
pub mod vec3;
pub mod vec4;

pub use mat4::Mat4;
pub use vec2::Vec2;
pub use vec3::Vec3;
pub use vec4::Vec4;
