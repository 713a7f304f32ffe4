use glam::Vec3;

use crate::scene::ids::MaterialId;
use crate::scene::layout::GpuMaterial;

pub const LAMBERTIAN: u32 = 0;
pub const METAL: u32 = 1;
pub const DIELECTRIC: u32 = 2;
pub const EMISSIVE: u32 = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MaterialKind {
    Lambertian,
    Metal,
    Dielectric,
    Emissive,
}

impl MaterialKind {
    pub fn flag(self) -> u32 {
        match self {
            MaterialKind::Lambertian => LAMBERTIAN,
            MaterialKind::Metal => METAL,
            MaterialKind::Dielectric => DIELECTRIC,
            MaterialKind::Emissive => EMISSIVE,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    id: MaterialId,
    pub kind: MaterialKind,
    pub attenuation: Vec3,
    pub metallic_fuzz: f32,
    pub emissive_color: Vec3,
    pub emissive_strength: f32,
    pub refractive_index: f32,
}

impl Material {
    fn new(id: MaterialId, kind: MaterialKind, attenuation: Vec3) -> Self {
        Self {
            id,
            kind,
            attenuation,
            metallic_fuzz: 0.0,
            emissive_color: Vec3::ZERO,
            emissive_strength: 0.0,
            refractive_index: 1.0,
        }
    }

    pub fn new_lambertian(id: MaterialId, color: Vec3) -> Self {
        Self::new(id, MaterialKind::Lambertian, color)
    }

    pub fn new_metal(id: MaterialId, color: Vec3, fuzzy: f32) -> Self {
        Self {
            metallic_fuzz: fuzzy,
            ..Self::new(id, MaterialKind::Metal, color)
        }
    }

    pub fn new_dielectric(id: MaterialId, ir: f32) -> Self {
        Self {
            refractive_index: ir,
            ..Self::new(id, MaterialKind::Dielectric, Vec3::ONE)
        }
    }

    pub fn new_emissive(id: MaterialId, color: Vec3, strength: f32) -> Self {
        Self {
            emissive_color: color,
            emissive_strength: strength,
            ..Self::new(id, MaterialKind::Emissive, Vec3::ONE)
        }
    }

    pub fn id(&self) -> MaterialId {
        self.id
    }

    pub(crate) fn serialize(&self) -> GpuMaterial {
        GpuMaterial {
            attenuation: self.attenuation.to_array(),
            metallic_fuzz: self.metallic_fuzz,
            emissive_color: self.emissive_color.to_array(),
            emissive_strength: self.emissive_strength,
            material_flag: self.kind.flag(),
            refractive_index: self.refractive_index,
        }
    }
}
