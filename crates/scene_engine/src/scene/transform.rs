//! Euler-angle transform with a cached orthonormal basis
//!
//! Rotation is stored as accumulated Euler angles in degrees: X is pitch,
//! Y is yaw, Z is roll. The forward/up/right vectors are derived from those
//! angles and recomputed on every rotation change, so reads never see a
//! stale basis.
//!
//! [`Transform::rotate`] adds `angle * axis` to the stored angles. This is
//! not a true axis-angle composition: it only matches a real rotation for
//! single, axis-aligned calls, and multi-axis sequences depend on call
//! order. Callers rely on the additive behaviour, so it is kept.

use crate::foundation::math::{utils, Vec3};
use crate::render::api::DrawApi;

/// Position, Euler rotation and scale of a scene object
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
    forward: Vec3,
    up: Vec3,
    right: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }
}

impl Transform {
    /// Create from position, rotation (degrees) and scale
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        let (forward, up, right) = basis_from_rotation(&rotation);
        Self {
            position,
            rotation,
            scale,
            forward,
            up,
            right,
        }
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }

    /// World position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Replace the position
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Euler angles in degrees `(pitch, yaw, roll)`
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Replace the Euler angles and recompute the basis
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
        self.refresh_basis();
    }

    /// Per-axis scale factors
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Replace the scale factors
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Move by `delta`
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Multiply the scale component-wise by `factors`
    pub fn scale_by(&mut self, factors: Vec3) {
        self.scale.component_mul_assign(&factors);
    }

    /// Add `angle_degrees * axis` to the Euler angles and recompute the basis
    pub fn rotate(&mut self, angle_degrees: f32, axis: Vec3) {
        self.rotation += axis * angle_degrees;
        self.refresh_basis();
    }

    /// Unit vector the object faces
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Unit vector pointing up from the object
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Unit vector to the object's right
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Negated forward
    pub fn backward(&self) -> Vec3 {
        -self.forward
    }

    /// Negated up
    pub fn down(&self) -> Vec3 {
        -self.up
    }

    /// Negated right
    pub fn left(&self) -> Vec3 {
        -self.right
    }

    /// Multiply the current backend matrix by this transform
    ///
    /// The order translate, rotate X, rotate Y, rotate Z, scale is
    /// load-bearing: the scale is applied to vertices first, the translation
    /// last.
    pub fn apply_transformations(&self, api: &mut dyn DrawApi) {
        api.translate(self.position);
        api.rotate(self.rotation.x, Vec3::x());
        api.rotate(self.rotation.y, Vec3::y());
        api.rotate(self.rotation.z, Vec3::z());
        api.scale(self.scale);
    }

    fn refresh_basis(&mut self) {
        let (forward, up, right) = basis_from_rotation(&self.rotation);
        self.forward = forward;
        self.up = up;
        self.right = right;
    }
}

/// Forward, up and right for Euler angles `(pitch, yaw, roll)` in degrees
///
/// Forward is `(-cos P sin Y, sin P, cos P cos Y)`. Right and up complete a
/// right-handed orthonormal frame with `right x up = forward`, rolled about
/// forward by the roll angle.
fn basis_from_rotation(rotation: &Vec3) -> (Vec3, Vec3, Vec3) {
    let (sp, cp) = utils::deg_to_rad(rotation.x).sin_cos();
    let (sy, cy) = utils::deg_to_rad(rotation.y).sin_cos();
    let (sr, cr) = utils::deg_to_rad(rotation.z).sin_cos();

    let forward = Vec3::new(-cp * sy, sp, cp * cy);
    let right = Vec3::new(cr * cy + sr * sp * sy, cp * sr, cr * sy - sr * sp * cy);
    let up = Vec3::new(-sr * cy + cr * sp * sy, cp * cr, -sr * sy - cr * sp * cy);

    (forward, up, right)
}
