//! Free-flying perspective camera
//!
//! # Coordinate System
//!
//! Uses a **left-handed** coordinate system:
//! - X: positive right
//! - Y: positive up
//! - Z: positive forward (into screen)
//!
//! # Orientation
//!
//! Orientation is accumulated as pitch/yaw angles. Every update rotates the
//! reference +Z axis by pitch (X) and then yaw (Y) to get `forward`, and the
//! rest of the basis is rebuilt from `forward` with cross products. `forward`
//! is the only orientation state the matrices are derived from.

use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;

/// Near clipping plane distance.
pub const NEAR_PLANE: f32 = 0.1;
/// Far clipping plane distance.
pub const FAR_PLANE: f32 = 500.0;
/// Pitch limit in radians, a hair short of straight up or down. At exactly
/// ±90° `forward` is parallel to world up and `right` would flip sign.
pub const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 1.0e-3;

/// Per-frame movement and look signals, already decoupled from any device.
///
/// Movement components are signed and unit-less; the camera scales them by its
/// speed and the elapsed time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraInput {
    /// Positive moves along `forward`.
    pub forward: f32,
    /// Positive moves along `right`.
    pub strafe: f32,
    /// Positive moves along world +Y.
    pub vertical: f32,
    /// Positive turns right.
    pub yaw: f32,
    /// Positive tips the view down.
    pub pitch: f32,
}

/// Movement tuning: translation speed and angular speed per input unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSpeeds {
    /// Units per second per input unit.
    pub movement: f32,
    /// Radians per second per input unit.
    pub angular: f32,
}

impl Default for CameraSpeeds {
    fn default() -> Self {
        Self {
            movement: 8.0,
            angular: 5.0_f32.to_radians(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    fov_angle: f32, // Degrees
    fov: f32,       // tan(fov_angle / 2)
    aspect_ratio: f32,

    // Values the projection matrix was last built with; 0 until the first update
    cached_fov: f32,
    cached_aspect_ratio: f32,

    forward: Vec3,
    up: Vec3,
    right: Vec3,

    total_pitch: f32,
    total_yaw: f32,

    inv_view_matrix: Mat4,
    view_matrix: Mat4,
    projection_matrix: Mat4,

    speeds: CameraSpeeds,
}

impl Camera {
    /// Creates a camera at `origin` looking along +Z.
    ///
    /// Matrices are built by the first [`Camera::update`].
    pub fn new(fov_angle_degrees: f32, origin: Vec3, aspect_ratio: f32) -> Self {
        Self {
            origin,
            fov_angle: fov_angle_degrees,
            fov: Self::half_angle_tangent(fov_angle_degrees),
            aspect_ratio,
            cached_fov: 0.0,
            cached_aspect_ratio: 0.0,
            forward: Vec3::FORWARD,
            up: Vec3::UP,
            right: Vec3::RIGHT,
            total_pitch: 0.0,
            total_yaw: 0.0,
            inv_view_matrix: Mat4::identity(),
            view_matrix: Mat4::identity(),
            projection_matrix: Mat4::identity(),
            speeds: CameraSpeeds::default(),
        }
    }

    pub fn with_speeds(mut self, speeds: CameraSpeeds) -> Self {
        self.speeds = speeds;
        self
    }

    fn half_angle_tangent(fov_angle_degrees: f32) -> f32 {
        (fov_angle_degrees.to_radians() / 2.0).tan()
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Applies one frame of input and refreshes the matrices.
    ///
    /// The view matrix is rebuilt every call. The projection matrix is rebuilt
    /// only when the field of view or aspect ratio changed since it was last
    /// built (always on the first call).
    pub fn update(&mut self, elapsed_seconds: f32, input: &CameraInput) {
        let step = self.speeds.movement * elapsed_seconds;
        self.origin += self.forward * (input.forward * step);
        self.origin += self.right * (input.strafe * step);
        self.origin.y += input.vertical * step;

        let turn = self.speeds.angular * elapsed_seconds;
        self.total_yaw += input.yaw * turn;
        self.total_pitch += input.pitch * turn;
        self.total_pitch = self.total_pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let rotation = Mat4::rotation_y(self.total_yaw) * Mat4::rotation_x(self.total_pitch);
        self.forward = rotation.transform_vector(Vec3::FORWARD);

        self.calculate_view_matrix();

        if self.projection_is_stale() {
            self.calculate_projection_matrix();
        }
    }

    fn projection_is_stale(&self) -> bool {
        self.cached_fov != self.fov || self.cached_aspect_ratio != self.aspect_ratio
    }

    /// Rebuilds the orthonormal basis from `forward` and derives both view matrices.
    pub fn calculate_view_matrix(&mut self) {
        self.right = Vec3::UP.cross(self.forward).normalize();
        self.up = self.forward.cross(self.right);

        self.inv_view_matrix = Mat4::from_basis(self.right, self.up, self.forward, self.origin);

        // An orthonormal basis is always invertible; keep the last good view
        // matrix if numerical noise says otherwise.
        match self.inv_view_matrix.inverse() {
            Some(view) => self.view_matrix = view,
            None => log::warn!("Camera basis is singular, keeping previous view matrix"),
        }
    }

    pub fn calculate_projection_matrix(&mut self) {
        self.projection_matrix =
            Mat4::perspective_fov_lh(self.fov, self.aspect_ratio, NEAR_PLANE, FAR_PLANE);
        self.cached_fov = self.fov;
        self.cached_aspect_ratio = self.aspect_ratio;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// True if any of x, y, z of an NDC position lies outside `[-1, 1]`.
    ///
    /// Boundary values are inside.
    pub fn is_outside_frustum(&self, position: Vec4) -> bool {
        let outside = |value: f32| !(-1.0..=1.0).contains(&value);
        outside(position.x) || outside(position.y) || outside(position.z)
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn pitch(&self) -> f32 {
        self.total_pitch
    }

    pub fn yaw(&self) -> f32 {
        self.total_yaw
    }

    /// Field of view angle in degrees.
    pub fn fov_angle(&self) -> f32 {
        self.fov_angle
    }

    /// Tangent of half the field of view.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    pub fn inv_view_matrix(&self) -> Mat4 {
        self.inv_view_matrix
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    // =========================================================================
    // Setters (picked up by the next update)
    // =========================================================================

    pub fn set_fov_angle(&mut self, fov_angle_degrees: f32) {
        self.fov_angle = fov_angle_degrees;
        self.fov = Self::half_angle_tangent(fov_angle_degrees);
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }
}

// =============================================================================
// Tests
// =============================================================================
