use glam::Mat4;

use crate::geometry::triangle::normal_matrix;
use crate::geometry::{BoundingBox, Triangle};
use crate::scene::bvh::Tree;
use crate::scene::layout::{GpuTriangle, Record};
use crate::scene::MeshId;

/// Triangle storage plus the BVH built over it. The tree keeps ranges
/// into `triangles`, so the two are only ever mutated together.
#[derive(Debug)]
pub struct Mesh {
    id: MeshId,
    triangles: Vec<Triangle>,
    bvh: Tree,
    model: Mat4,
    baked: bool,
}

impl Mesh {
    pub fn new(id: MeshId, mut triangles: Vec<Triangle>) -> Self {
        let mut bvh = Tree::new();
        bvh.build(&mut triangles);
        Self {
            id,
            triangles,
            bvh,
            model: Mat4::IDENTITY,
            baked: false,
        }
    }

    /// Sets the model matrix applied by `bake_world_space`. A baked mesh
    /// keeps its matrix; its triangles are already in world space.
    pub fn with_model(mut self, model: Mat4) -> Self {
        if self.baked {
            log::warn!("{:?} is already baked; model matrix ignored", self.id);
            return self;
        }
        self.model = model;
        self
    }

    /// Moves the triangles into world space and rebuilds the tree over
    /// them. Runs at most once per mesh; later calls are no-ops.
    pub fn bake_world_space(&mut self) {
        if self.baked {
            return;
        }
        self.baked = true;
        if self.model == Mat4::IDENTITY {
            return;
        }
        let normals = normal_matrix(self.model);
        for t in self.triangles.iter_mut() {
            *t = t.transformed(self.model, normals);
        }
        self.bvh.build(&mut self.triangles);
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn model(&self) -> Mat4 {
        self.model
    }

    pub fn is_baked(&self) -> bool {
        self.baked
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn bvh(&self) -> &Tree {
        &self.bvh
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bvh.bounds()
    }

    pub fn size_in_bytes(&self) -> usize {
        self.triangles.len() * GpuTriangle::SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::IdAllocator;
    use glam::{Quat, Vec3};

    fn strip(ids: &mut IdAllocator) -> Mesh {
        let triangles = (0..8)
            .map(|i| {
                let x = i as f32;
                Triangle::flat(
                    Vec3::new(x, 0.0, 0.0),
                    Vec3::new(x + 1.0, 0.0, 0.0),
                    Vec3::new(x, 1.0, 0.0),
                )
            })
            .collect();
        Mesh::new(ids.next(), triangles)
    }

    #[test]
    fn new_mesh_builds_its_tree() {
        let mut ids = IdAllocator::new();
        let mesh = strip(&mut ids);
        assert_eq!(mesh.triangle_count(), 8);
        assert_eq!(mesh.size_in_bytes(), 8 * 128);
        assert!(mesh.bvh().node_count() > 1);
        assert_eq!(mesh.bounds().max, Vec3::new(8.0, 1.0, 0.0));
        assert!(!mesh.is_baked());
    }

    #[test]
    fn bake_applies_model_once_and_refits_tree() {
        let mut ids = IdAllocator::new();
        let model = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Quat::IDENTITY,
            Vec3::new(0.0, 10.0, 0.0),
        );
        let mut mesh = strip(&mut ids).with_model(model);
        mesh.bake_world_space();
        mesh.bake_world_space();

        assert!(mesh.is_baked());
        let bounds = mesh.bounds();
        assert_eq!(bounds.min, Vec3::new(0.0, 10.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(16.0, 12.0, 0.0));
        for leaf in mesh.bvh().leaves() {
            for t in &mesh.triangles()[leaf.triangle_range()] {
                for p in t.positions {
                    assert!(leaf.bounds.contains_point(p));
                }
            }
        }
    }

    #[test]
    fn model_set_after_bake_is_ignored() {
        let mut ids = IdAllocator::new();
        let mut mesh = strip(&mut ids);
        mesh.bake_world_space();
        let before = mesh.triangles().to_vec();

        let mut mesh = mesh.with_model(Mat4::from_translation(Vec3::X));
        assert_eq!(mesh.model(), Mat4::IDENTITY);
        mesh.bake_world_space();
        assert_eq!(mesh.triangles(), before.as_slice());
    }

    #[test]
    fn identity_bake_keeps_triangles() {
        let mut ids = IdAllocator::new();
        let mut mesh = strip(&mut ids);
        let before = mesh.triangles().to_vec();
        mesh.bake_world_space();
        assert!(mesh.is_baked());
        assert_eq!(mesh.triangles(), before.as_slice());
    }
}
