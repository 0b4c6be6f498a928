//! 4x4 transformation matrix using column-vector convention.
//!
//! # Convention
//! - Vectors are **column vectors** on the right: `Mat4 * Vec`
//! - Translation is stored in the **last column**
//! - Transforms chain **right-to-left**: `A * B * v` applies B first, then A
//!
//! # Example
//! ```ignore
//! let world_view_projection = projection * view * world;
//! let clip = world_view_projection * Vec4::point(position);
//! ```

use std::ops::Mul;

use super::vec3::Vec3;
use super::vec4::Vec4;

/// 4x4 matrix stored as `data[row][col]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    data: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    pub fn new(data: [[f32; 4]; 4]) -> Self {
        Mat4 { data }
    }

    pub fn identity() -> Self {
        Mat4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a translation matrix.
    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Mat4::new([
            [1.0, 0.0, 0.0, x],
            [0.0, 1.0, 0.0, y],
            [0.0, 0.0, 1.0, z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a scale matrix.
    pub fn scaling(x: f32, y: f32, z: f32) -> Self {
        Mat4::new([
            [x, 0.0, 0.0, 0.0],
            [0.0, y, 0.0, 0.0],
            [0.0, 0.0, z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation around the X axis. Positive angles tip +Z toward -Y.
    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation around the Y axis. Positive angles turn +Z toward +X.
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation around the Z axis. Positive angles turn +X toward +Y.
    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Left-handed perspective projection mapping view depth `near..far`
    /// to NDC z `0..1`.
    ///
    /// `fov` is the tangent of half the vertical field of view, not an angle.
    pub fn perspective_fov_lh(fov: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        let depth_scale = far / (far - near);
        Mat4::new([
            [1.0 / (aspect_ratio * fov), 0.0, 0.0, 0.0],
            [0.0, 1.0 / fov, 0.0, 0.0],
            [0.0, 0.0, depth_scale, -near * depth_scale],
            [0.0, 0.0, 1.0, 0.0],
        ])
    }

    /// Builds a local-to-world matrix from an orthonormal basis and an origin.
    ///
    /// The basis vectors become the first three columns, the origin the last.
    pub fn from_basis(right: Vec3, up: Vec3, forward: Vec3, origin: Vec3) -> Self {
        Mat4::new([
            [right.x, up.x, forward.x, origin.x],
            [right.y, up.y, forward.y, origin.y],
            [right.z, up.z, forward.z, origin.z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn transpose(&self) -> Self {
        let mut data = [[0.0f32; 4]; 4];
        for (row, values) in data.iter_mut().enumerate() {
            for (col, value) in values.iter_mut().enumerate() {
                *value = self.data[col][row];
            }
        }
        Mat4::new(data)
    }

    /// Computes the inverse of the matrix, if it exists.
    /// Returns `None` if the matrix is singular (determinant is zero).
    ///
    /// Uses the 2x2 sub-determinant expansion (Laplace expansion over the
    /// top and bottom row pairs).
    pub fn inverse(&self) -> Option<Mat4> {
        let m = &self.data;

        let s0 = m[0][0] * m[1][1] - m[1][0] * m[0][1];
        let s1 = m[0][0] * m[1][2] - m[1][0] * m[0][2];
        let s2 = m[0][0] * m[1][3] - m[1][0] * m[0][3];
        let s3 = m[0][1] * m[1][2] - m[1][1] * m[0][2];
        let s4 = m[0][1] * m[1][3] - m[1][1] * m[0][3];
        let s5 = m[0][2] * m[1][3] - m[1][2] * m[0][3];

        let c5 = m[2][2] * m[3][3] - m[3][2] * m[2][3];
        let c4 = m[2][1] * m[3][3] - m[3][1] * m[2][3];
        let c3 = m[2][1] * m[3][2] - m[3][1] * m[2][2];
        let c2 = m[2][0] * m[3][3] - m[3][0] * m[2][3];
        let c1 = m[2][0] * m[3][2] - m[3][0] * m[2][2];
        let c0 = m[2][0] * m[3][1] - m[3][0] * m[2][1];

        let det = s0 * c5 - s1 * c4 + s2 * c3 + s3 * c2 - s4 * c1 + s5 * c0;
        if det.abs() < f32::EPSILON {
            return None;
        }
        let inv = 1.0 / det;

        Some(Mat4::new([
            [
                (m[1][1] * c5 - m[1][2] * c4 + m[1][3] * c3) * inv,
                (-m[0][1] * c5 + m[0][2] * c4 - m[0][3] * c3) * inv,
                (m[3][1] * s5 - m[3][2] * s4 + m[3][3] * s3) * inv,
                (-m[2][1] * s5 + m[2][2] * s4 - m[2][3] * s3) * inv,
            ],
            [
                (-m[1][0] * c5 + m[1][2] * c2 - m[1][3] * c1) * inv,
                (m[0][0] * c5 - m[0][2] * c2 + m[0][3] * c1) * inv,
                (-m[3][0] * s5 + m[3][2] * s2 - m[3][3] * s1) * inv,
                (m[2][0] * s5 - m[2][2] * s2 + m[2][3] * s1) * inv,
            ],
            [
                (m[1][0] * c4 - m[1][1] * c2 + m[1][3] * c0) * inv,
                (-m[0][0] * c4 + m[0][1] * c2 - m[0][3] * c0) * inv,
                (m[3][0] * s4 - m[3][1] * s2 + m[3][3] * s0) * inv,
                (-m[2][0] * s4 + m[2][1] * s2 - m[2][3] * s0) * inv,
            ],
            [
                (-m[1][0] * c3 + m[1][1] * c1 - m[1][2] * c0) * inv,
                (m[0][0] * c3 - m[0][1] * c1 + m[0][2] * c0) * inv,
                (-m[3][0] * s3 + m[3][1] * s1 - m[3][2] * s0) * inv,
                (m[2][0] * s3 - m[2][1] * s1 + m[2][2] * s0) * inv,
            ],
        ]))
    }

    /// Transforms a direction: applies the upper 3x3 block, ignoring translation.
    #[inline]
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let m = &self.data;
        Vec3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    /// Access element at [row][col].
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row][col]
    }
}

/// Matrix multiplication: `A * B` applies B first, then A.
impl Mul<Mat4> for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Self::Output {
        let mut result = [[0.0f32; 4]; 4];

        for (row, values) in result.iter_mut().enumerate() {
            for (col, value) in values.iter_mut().enumerate() {
                *value = (0..4).map(|k| self.data[row][k] * rhs.data[k][col]).sum();
            }
        }

        Mat4::new(result)
    }
}

/// Transform a Vec4 by a matrix: Mat4 * Vec4 (column vector).
impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, v: Vec4) -> Self::Output {
        let row = |r: [f32; 4]| r[0] * v.x + r[1] * v.y + r[2] * v.z + r[3] * v.w;
        Vec4::new(
            row(self.data[0]),
            row(self.data[1]),
            row(self.data[2]),
            row(self.data[3]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn assert_mat_eq(a: Mat4, b: Mat4) {
        for row in 0..4 {
            for col in 0..4 {
                assert_relative_eq!(a.get(row, col), b.get(row, col), epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn inverse_of_translation_negates_offset() {
        let m = Mat4::translation(1.0, -2.0, 3.0);
        let inv = m.inverse().expect("translation is invertible");
        assert_mat_eq(inv, Mat4::translation(-1.0, 2.0, -3.0));
    }

    #[test]
    fn inverse_times_matrix_is_identity() {
        let m = Mat4::translation(0.5, 4.0, -7.0)
            * Mat4::rotation_y(0.7)
            * Mat4::rotation_x(-0.3)
            * Mat4::scaling(2.0, 3.0, 0.5);
        let inv = m.inverse().expect("invertible");
        assert_mat_eq(m * inv, Mat4::identity());
        assert_mat_eq(inv * m, Mat4::identity());
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        assert!(Mat4::scaling(1.0, 0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn rotation_y_turns_forward_to_right() {
        let v = Mat4::rotation_y(FRAC_PI_2).transform_vector(Vec3::FORWARD);
        assert_relative_eq!(v.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(v.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn transform_vector_ignores_translation() {
        let m = Mat4::translation(10.0, 10.0, 10.0);
        assert_eq!(m.transform_vector(Vec3::UP), Vec3::UP);
    }

    #[test]
    fn perspective_maps_near_and_far_to_unit_depth_range() {
        let fov = (30.0_f32).to_radians().tan();
        let projection = Mat4::perspective_fov_lh(fov, 4.0 / 3.0, 0.1, 500.0);

        let near = (projection * Vec4::new(0.0, 0.0, 0.1, 1.0)).perspective_divide();
        let far = (projection * Vec4::new(0.0, 0.0, 500.0, 1.0)).perspective_divide();
        assert_relative_eq!(near.z, 0.0, epsilon = 1e-5);
        assert_relative_eq!(far.z, 1.0, epsilon = 1e-5);
        // w carries the view-space depth
        assert_relative_eq!(far.w, 500.0);
    }

    #[test]
    fn transpose_swaps_rows_and_columns() {
        let m = Mat4::translation(1.0, 2.0, 3.0).transpose();
        assert_eq!(m.get(3, 0), 1.0);
        assert_eq!(m.get(3, 2), 3.0);
        assert_eq!(m.get(0, 3), 0.0);
    }
}
