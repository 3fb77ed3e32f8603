/// Placement of a model instance: translation, rotation and scale.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use crate::modified::ApproxEq;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::IDENTITY }
    }

    /// Scale, then rotate, then translate
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ApproxEq for Transform {
    fn approx_eq(&self, other: &Self) -> bool {
        self.translation.approx_eq(&other.translation)
            && self.rotation.approx_eq(&other.rotation)
            && self.scale.approx_eq(&other.scale)
    }
}
