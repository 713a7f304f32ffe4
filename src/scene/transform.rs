use glam::{Mat4, Quat, Vec3};

use crate::scene::ids::TransformId;

/// Translation, rotation and scale, composed as `T * R * S`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    id: TransformId,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn new(id: TransformId) -> Self {
        Self {
            id,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn id(&self) -> TransformId {
        self.id
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}
