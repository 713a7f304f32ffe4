pub mod bvh;
mod ids;
pub mod layout;
mod material;
mod packer;
mod renderable;
mod sphere;
mod transform;
pub use ids::{EntityId, IdAllocator, MaterialId, MeshId, RenderableId, SphereId, TransformId};
pub use material::{Material, MaterialKind, DIELECTRIC, EMISSIVE, LAMBERTIAN, METAL};
pub use packer::{BufferSizes, Region, SceneBuffers};
pub use renderable::Renderable;
pub use sphere::Sphere;
pub use transform::Transform;

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::geometry::Mesh;
use crate::scene::layout::GpuSceneSummary;

/// Entities in registration order plus a lookup from id to position,
/// which is also the entity's index in its packed buffer.
#[derive(Debug)]
struct Registry<I, T> {
    items: Vec<T>,
    index: HashMap<I, u32>,
}

impl<I: EntityId, T> Registry<I, T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Returns `Ok(false)` when `id` is already registered to an entity
    /// that `same` accepts, and an error when it belongs to another one.
    fn insert(&mut self, id: I, item: T, same: impl FnOnce(&T, &T) -> bool) -> Result<bool> {
        if let Some(&position) = self.index.get(&id) {
            if same(&self.items[position as usize], &item) {
                log::debug!("{id:?} already registered");
                return Ok(false);
            }
            return Err(Error::DuplicateId {
                kind: I::KIND,
                id: id.get(),
            });
        }
        self.index.insert(id, self.items.len() as u32);
        self.items.push(item);
        Ok(true)
    }

    fn position(&self, id: I) -> Option<u32> {
        self.index.get(&id).copied()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// A set of meshes, materials, transforms, spheres and renderables that
/// packs itself into flat GPU buffers.
#[derive(Debug)]
pub struct Scene {
    ids: IdAllocator,
    meshes: Registry<MeshId, Mesh>,
    materials: Registry<MaterialId, Material>,
    transforms: Registry<TransformId, Transform>,
    spheres: Registry<SphereId, Sphere>,
    renderables: Registry<RenderableId, Renderable>,
    sizes: BufferSizes,
    buffers: Option<SceneBuffers>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            ids: IdAllocator::new(),
            meshes: Registry::new(),
            materials: Registry::new(),
            transforms: Registry::new(),
            spheres: Registry::new(),
            renderables: Registry::new(),
            sizes: BufferSizes::default(),
            buffers: None,
        }
    }

    /// Id source for entities that will be added to this scene.
    pub fn ids(&mut self) -> &mut IdAllocator {
        &mut self.ids
    }

    /// Meshes are moved in, so a second mesh under a registered id is
    /// always a different mesh and is rejected.
    pub fn add_mesh(&mut self, mesh: Mesh) -> Result<MeshId> {
        let id = mesh.id();
        let footprint = packer::MeshFootprint::of(&mesh);
        if self.meshes.insert(id, mesh, |_, _| false)? {
            self.sizes.add_mesh(footprint);
            self.buffers = None;
        }
        Ok(id)
    }

    /// Re-adding an identical material is a no-op.
    pub fn add_material(&mut self, material: Material) -> Result<MaterialId> {
        let id = material.id();
        if self.materials.insert(id, material, PartialEq::eq)? {
            self.sizes.materials += 1;
            self.buffers = None;
        }
        Ok(id)
    }

    pub fn add_transform(&mut self, transform: Transform) -> Result<TransformId> {
        let id = transform.id();
        if self.transforms.insert(id, transform, PartialEq::eq)? {
            self.sizes.transforms += 1;
            self.buffers = None;
        }
        Ok(id)
    }

    pub fn add_sphere(&mut self, sphere: Sphere) -> Result<SphereId> {
        self.require_material(sphere.material)?;
        let id = sphere.id();
        if self.spheres.insert(id, sphere, PartialEq::eq)? {
            self.sizes.spheres += 1;
            self.buffers = None;
        }
        Ok(id)
    }

    /// Registers a renderable. Its mesh, material and transform must
    /// already be part of the scene.
    pub fn add_renderable(&mut self, renderable: Renderable) -> Result<RenderableId> {
        if self.meshes.position(renderable.mesh).is_none() {
            return Err(Error::UnknownMesh(renderable.mesh));
        }
        self.require_material(renderable.material)?;
        if self.transforms.position(renderable.transform).is_none() {
            return Err(Error::UnknownTransform(renderable.transform));
        }
        let id = renderable.id();
        if self.renderables.insert(id, renderable, PartialEq::eq)? {
            self.sizes.renderables += 1;
            self.buffers = None;
        }
        Ok(id)
    }

    fn require_material(&self, id: MaterialId) -> Result<()> {
        match self.materials.position(id) {
            Some(_) => Ok(()),
            None => Err(Error::UnknownMaterial(id)),
        }
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes.items
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes
            .position(id)
            .map(|i| &self.meshes.items[i as usize])
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials.items
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms.items
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres.items
    }

    pub fn renderables(&self) -> &[Renderable] {
        &self.renderables.items
    }

    pub fn sizes(&self) -> &BufferSizes {
        &self.sizes
    }

    pub fn summary(&self) -> GpuSceneSummary {
        GpuSceneSummary {
            sphere_count: self.spheres.len() as u32,
            mesh_count: self.meshes.len() as u32,
            triangle_count: self.sizes.triangles,
            renderable_count: self.renderables.len() as u32,
        }
    }

    pub fn is_packed(&self) -> bool {
        self.buffers.is_some()
    }

    /// Packs the scene into flat buffers. The first call bakes every mesh
    /// into world space; the result is cached until something new is
    /// registered, so repeated calls return the same bytes.
    pub fn pack(&mut self) -> &SceneBuffers {
        let buffers = match self.buffers.take() {
            Some(buffers) => buffers,
            None => {
                self.bake_meshes();
                self.write_buffers()
            }
        };
        self.buffers.insert(buffers)
    }

    fn bake_meshes(&mut self) {
        for mesh in self.meshes.items.iter_mut() {
            if mesh.is_baked() {
                continue;
            }
            let before = packer::MeshFootprint::of(mesh);
            mesh.bake_world_space();
            // the rebuilt tree may have a different shape
            self.sizes.replace_mesh(before, packer::MeshFootprint::of(mesh));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn identical_registration_is_ignored() {
        let mut scene = Scene::new();
        let material = Material::new_lambertian(scene.ids().next(), Vec3::ONE);
        let first = scene.add_material(material).unwrap();
        let again = scene.add_material(material).unwrap();
        assert_eq!(first, again);
        assert_eq!(scene.materials().len(), 1);
        assert_eq!(scene.sizes().materials, 1);

        let transform = Transform::new(scene.ids().next());
        scene.add_transform(transform).unwrap();
        scene.add_transform(transform).unwrap();
        assert_eq!(scene.transforms().len(), 1);
    }

    #[test]
    fn different_entity_under_taken_id_is_rejected() {
        let mut scene = Scene::new();
        let cube = Mesh::cube(scene.ids().next(), 1, 1, 1);
        let cube_id = scene.add_mesh(cube).unwrap();

        // a second allocator hands out the same raw ids
        let mut other_ids = IdAllocator::new();
        let plane = Mesh::plane(other_ids.next(), 4, 4);
        assert_eq!(plane.id(), cube_id);
        assert!(matches!(
            scene.add_mesh(plane),
            Err(Error::DuplicateId { kind: "mesh", id: 0 })
        ));
        assert_eq!(scene.meshes().len(), 1);
        assert_eq!(scene.sizes().triangles, 12);

        let material_id = scene.ids().next();
        scene
            .add_material(Material::new_lambertian(material_id, Vec3::ONE))
            .unwrap();
        let err = scene
            .add_material(Material::new_metal(material_id, Vec3::ONE, 0.3))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateId { kind: "material", .. }));
        assert_eq!(scene.materials().len(), 1);
        assert_eq!(scene.materials()[0], Material::new_lambertian(material_id, Vec3::ONE));
    }

    #[test]
    fn renderable_with_unregistered_handles_is_rejected() {
        let mut scene = Scene::new();
        let mesh = Mesh::cube(scene.ids().next(), 1, 1, 1);
        let material = Material::new_lambertian(scene.ids().next(), Vec3::ONE);
        let transform = Transform::new(scene.ids().next());

        let id = scene.ids().next();
        let renderable = Renderable::new(id, mesh.id(), material.id(), transform.id());
        assert!(matches!(
            scene.add_renderable(renderable),
            Err(Error::UnknownMesh(_))
        ));
        scene.add_mesh(mesh).unwrap();
        assert!(matches!(
            scene.add_renderable(renderable),
            Err(Error::UnknownMaterial(_))
        ));
        scene.add_material(material).unwrap();
        assert!(matches!(
            scene.add_renderable(renderable),
            Err(Error::UnknownTransform(_))
        ));
        scene.add_transform(transform).unwrap();
        assert_eq!(scene.add_renderable(renderable).unwrap(), renderable.id());
        assert!(scene.renderables().len() == 1);
    }

    #[test]
    fn sphere_needs_its_material() {
        let mut scene = Scene::new();
        let material_id = scene.ids().next();
        let sphere = Sphere::new(scene.ids().next(), Vec3::ZERO, 1.0, material_id);
        assert!(matches!(
            scene.add_sphere(sphere),
            Err(Error::UnknownMaterial(_))
        ));
        scene
            .add_material(Material::new_metal(material_id, Vec3::ONE, 0.1))
            .unwrap();
        assert!(scene.add_sphere(sphere).is_ok());
        assert_eq!(scene.summary().sphere_count, 1);
    }

    #[test]
    fn registering_after_pack_invalidates_cache() {
        let mut scene = Scene::new();
        let material = Material::new_lambertian(scene.ids().next(), Vec3::ONE);
        scene.add_material(material).unwrap();
        scene.pack();
        assert!(scene.is_packed());

        let other = Material::new_dielectric(scene.ids().next(), 1.5);
        scene.add_material(other).unwrap();
        assert!(!scene.is_packed());
        assert_eq!(scene.pack().materials.len(), 80);
    }
}
