use glam::Vec3;

use crate::scene::ids::{MaterialId, SphereId};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere {
    id: SphereId,
    pub center: Vec3,
    pub radius: f32,
    pub material: MaterialId,
}

impl Sphere {
    pub fn new(id: SphereId, center: Vec3, radius: f32, material: MaterialId) -> Self {
        Self {
            id,
            center,
            radius,
            material,
        }
    }

    pub fn id(&self) -> SphereId {
        self.id
    }
}
