//! Math types for scenepack
//!
//! POD (Plain Old Data) transform types that serialize as plain arrays, so
//! crates consuming the scene graph do not need glam in their public API.
//! Composition goes through real 4×4 TRS matrices (glam) so rotated and
//! non-uniformly scaled ancestors are handled correctly.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Absolute tolerance used when comparing transform components to identity
pub const TRANSFORM_EPSILON: f32 = 1e-6;

/// Local placement of a node relative to its parent
///
/// Rotation is a unit quaternion stored as `[x, y, z, w]`. Encoders never
/// renormalize it; callers are responsible for keeping it unit length.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Identity transform (no translation, no rotation, unit scale)
    pub const IDENTITY: Self = Self {
        position: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [1.0, 1.0, 1.0],
    };

    /// Create a transform with only a translation
    pub const fn from_position(position: [f32; 3]) -> Self {
        Self {
            position,
            rotation: Self::IDENTITY.rotation,
            scale: Self::IDENTITY.scale,
        }
    }

    /// Create a transform from Euler angles in degrees (XYZ order)
    pub fn from_euler_degrees(position: [f32; 3], euler: [f32; 3], scale: [f32; 3]) -> Self {
        Self {
            position,
            rotation: euler_degrees_to_quat(euler),
            scale,
        }
    }

    pub fn has_translation(&self) -> bool {
        !approx_eq_slice(&self.position, &Self::IDENTITY.position)
    }

    pub fn has_rotation(&self) -> bool {
        !approx_eq_slice(&self.rotation, &Self::IDENTITY.rotation)
    }

    pub fn has_scale(&self) -> bool {
        !approx_eq_slice(&self.scale, &Self::IDENTITY.scale)
    }

    /// True when every component matches identity within [`TRANSFORM_EPSILON`]
    pub fn is_identity(&self) -> bool {
        !self.has_translation() && !self.has_rotation() && !self.has_scale()
    }

    /// Local TRS matrix as a glam matrix
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::from_array(self.scale),
            Quat::from_array(self.rotation),
            Vec3::from_array(self.position),
        )
    }

    /// Local TRS matrix, column-major (glTF layout)
    pub fn to_matrix(&self) -> [f32; 16] {
        self.to_mat4().to_cols_array()
    }

    /// Decompose a column-major affine matrix into translation, rotation and scale
    ///
    /// Shear cannot be represented and is lost.
    pub fn from_matrix(matrix: &[f32; 16]) -> Self {
        Self::from_mat4(&Mat4::from_cols_array(matrix))
    }

    fn from_mat4(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            position: translation.to_array(),
            rotation: rotation.to_array(),
            scale: scale.to_array(),
        }
    }

    /// Compose `child` under `self`: the result maps child-local space to
    /// the space `self` is expressed in
    pub fn mul(&self, child: &Transform) -> Transform {
        Self::from_mat4(&(self.to_mat4() * child.to_mat4()))
    }
}

/// Convert XYZ Euler angles in degrees to a unit quaternion `[x, y, z, w]`
pub fn euler_degrees_to_quat(euler: [f32; 3]) -> [f32; 4] {
    Quat::from_euler(
        EulerRot::XYZ,
        euler[0].to_radians(),
        euler[1].to_radians(),
        euler[2].to_radians(),
    )
    .to_array()
}

fn approx_eq_slice(a: &[f32], b: &[f32]) -> bool {
    a.iter()
        .zip(b)
        .all(|(x, y)| (x - y).abs() <= TRANSFORM_EPSILON)
}
