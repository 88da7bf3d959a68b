//! Math utilities and types
//!
//! Provides the vector and matrix aliases used across the engine, plus the
//! classic fixed-function matrix builders (frustum, ortho, perspective,
//! look-at, axis rotation) that the drawing backends compose.

pub use nalgebra::{Matrix4, Point3, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// RGBA colour with components in `0.0..=1.0`
pub type Color = [f32; 4];

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }
}

/// Extension trait for Mat4 with the fixed-function matrix builders
pub trait Mat4Ext {
    /// Rotation of `angle_degrees` around `axis` (normalized internally).
    ///
    /// A zero-length axis yields the identity.
    fn rotation_degrees(angle_degrees: f32, axis: Vec3) -> Mat4;

    /// Perspective frustum bounded by the given clip planes
    fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4;

    /// Orthographic projection bounded by the given clip planes
    fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4;

    /// Symmetric perspective projection from a vertical field of view in degrees
    fn perspective_degrees(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Right-handed view matrix looking from `eye` towards `center`
    fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_degrees(angle_degrees: f32, axis: Vec3) -> Mat4 {
        if axis.norm_squared() <= f32::EPSILON {
            return Mat4::identity();
        }
        Mat4::from_axis_angle(&Unit::new_normalize(axis), utils::deg_to_rad(angle_degrees))
    }

    fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        let width = right - left;
        let height = top - bottom;
        let depth = far - near;

        Mat4::new(
            2.0 * near / width, 0.0, (right + left) / width, 0.0,
            0.0, 2.0 * near / height, (top + bottom) / height, 0.0,
            0.0, 0.0, -(far + near) / depth, -2.0 * far * near / depth,
            0.0, 0.0, -1.0, 0.0,
        )
    }

    fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        let width = right - left;
        let height = top - bottom;
        let depth = far - near;

        Mat4::new(
            2.0 / width, 0.0, 0.0, -(right + left) / width,
            0.0, 2.0 / height, 0.0, -(top + bottom) / height,
            0.0, 0.0, -2.0 / depth, -(far + near) / depth,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    fn perspective_degrees(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (utils::deg_to_rad(fov_y_degrees) * 0.5).tan();
        let depth = near - far;

        Mat4::new(
            f / aspect, 0.0, 0.0, 0.0,
            0.0, f, 0.0, 0.0,
            0.0, 0.0, (far + near) / depth, 2.0 * far * near / depth,
            0.0, 0.0, -1.0, 0.0,
        )
    }

    fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(center), &up)
    }
}
