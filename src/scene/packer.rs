use crate::geometry::Mesh;
use crate::scene::layout::{
    write_record, GpuBoundingBox, GpuBvhNode, GpuMaterial, GpuMesh, GpuRenderable,
    GpuSceneSummary, GpuSphere, GpuTransform, GpuTriangle, Record,
};
use crate::scene::Scene;

/// What one mesh contributes to the packed buffers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) struct MeshFootprint {
    triangles: u32,
    bvh_nodes: u32,
}

impl MeshFootprint {
    pub(super) fn of(mesh: &Mesh) -> Self {
        Self {
            triangles: mesh.triangle_count() as u32,
            bvh_nodes: mesh.bvh().node_count() as u32,
        }
    }
}

/// Record counts per buffer, kept up to date as entities are registered.
/// Buffer byte sizes are derived from these counts and the record
/// strides, and the write pass places records by the same counts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BufferSizes {
    pub triangles: u32,
    pub bvh_nodes: u32,
    pub meshes: u32,
    pub bounding_boxes: u32,
    pub materials: u32,
    pub transforms: u32,
    pub spheres: u32,
    pub renderables: u32,
}

impl BufferSizes {
    pub(super) fn add_mesh(&mut self, footprint: MeshFootprint) {
        self.triangles += footprint.triangles;
        self.bvh_nodes += footprint.bvh_nodes;
        self.meshes += 1;
        self.bounding_boxes += 1;
    }

    pub(super) fn replace_mesh(&mut self, old: MeshFootprint, new: MeshFootprint) {
        self.triangles = self.triangles - old.triangles + new.triangles;
        self.bvh_nodes = self.bvh_nodes - old.bvh_nodes + new.bvh_nodes;
    }

    fn bytes<R: Record>(count: u32) -> usize {
        count as usize * R::SIZE
    }

    pub fn triangle_bytes(&self) -> usize {
        Self::bytes::<GpuTriangle>(self.triangles)
    }

    pub fn bvh_node_bytes(&self) -> usize {
        Self::bytes::<GpuBvhNode>(self.bvh_nodes)
    }

    pub fn mesh_bytes(&self) -> usize {
        Self::bytes::<GpuMesh>(self.meshes)
    }

    pub fn bounding_box_bytes(&self) -> usize {
        Self::bytes::<GpuBoundingBox>(self.bounding_boxes)
    }

    pub fn material_bytes(&self) -> usize {
        Self::bytes::<GpuMaterial>(self.materials)
    }

    pub fn transform_bytes(&self) -> usize {
        Self::bytes::<GpuTransform>(self.transforms)
    }

    pub fn sphere_bytes(&self) -> usize {
        Self::bytes::<GpuSphere>(self.spheres)
    }

    pub fn renderable_bytes(&self) -> usize {
        Self::bytes::<GpuRenderable>(self.renderables)
    }

    pub fn total_bytes(&self) -> usize {
        self.triangle_bytes()
            + self.bvh_node_bytes()
            + self.mesh_bytes()
            + self.bounding_box_bytes()
            + self.material_bytes()
            + self.transform_bytes()
            + self.sphere_bytes()
            + self.renderable_bytes()
            + GpuSceneSummary::SIZE
    }
}

/// The flat, byte-exact buffers handed to the compute shader.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SceneBuffers {
    pub summary: GpuSceneSummary,
    pub triangles: Vec<u8>,
    pub bvh_nodes: Vec<u8>,
    pub meshes: Vec<u8>,
    pub bounding_boxes: Vec<u8>,
    pub materials: Vec<u8>,
    pub transforms: Vec<u8>,
    pub spheres: Vec<u8>,
    pub renderables: Vec<u8>,
}

impl SceneBuffers {
    fn allocate(summary: GpuSceneSummary, sizes: &BufferSizes) -> Self {
        Self {
            summary,
            triangles: vec![0; sizes.triangle_bytes()],
            bvh_nodes: vec![0; sizes.bvh_node_bytes()],
            meshes: vec![0; sizes.mesh_bytes()],
            bounding_boxes: vec![0; sizes.bounding_box_bytes()],
            materials: vec![0; sizes.material_bytes()],
            transforms: vec![0; sizes.transform_bytes()],
            spheres: vec![0; sizes.sphere_bytes()],
            renderables: vec![0; sizes.renderable_bytes()],
        }
    }

    pub fn summary_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.summary)
    }

    /// Regions in binding order, labelled for debugging and dumps.
    pub fn regions(&self) -> [Region<'_>; 9] {
        [
            Region::new::<GpuSceneSummary>("summary", self.summary_bytes()),
            Region::new::<GpuTriangle>("triangles", &self.triangles),
            Region::new::<GpuBvhNode>("bvh_nodes", &self.bvh_nodes),
            Region::new::<GpuMesh>("meshes", &self.meshes),
            Region::new::<GpuBoundingBox>("bounding_boxes", &self.bounding_boxes),
            Region::new::<GpuMaterial>("materials", &self.materials),
            Region::new::<GpuTransform>("transforms", &self.transforms),
            Region::new::<GpuSphere>("spheres", &self.spheres),
            Region::new::<GpuRenderable>("renderables", &self.renderables),
        ]
    }

    pub fn total_bytes(&self) -> usize {
        self.regions().iter().map(|r| r.bytes.len()).sum()
    }
}

/// One packed buffer together with the stride of its records.
#[derive(Copy, Clone, Debug)]
pub struct Region<'a> {
    pub name: &'static str,
    pub stride: usize,
    pub bytes: &'a [u8],
}

impl<'a> Region<'a> {
    fn new<R: Record>(name: &'static str, bytes: &'a [u8]) -> Self {
        Self {
            name,
            stride: R::SIZE,
            bytes,
        }
    }

    pub fn record_count(&self) -> usize {
        self.bytes.len() / self.stride
    }
}

/// Where a mesh's records start in the shared buffers.
#[derive(Copy, Clone, Debug, Default)]
struct MeshOffsets {
    first_triangle: u32,
    first_bvh_node: u32,
}

impl Scene {
    /// Second pass of packing: every buffer is allocated once from
    /// `self.sizes`, then records are placed at their computed slots.
    pub(super) fn write_buffers(&self) -> SceneBuffers {
        let sizes = &self.sizes;
        let mut out = SceneBuffers::allocate(self.summary(), sizes);

        for (i, transform) in self.transforms.items.iter().enumerate() {
            write_record(&mut out.transforms, i, &GpuTransform::from(transform.matrix()));
        }

        for (i, sphere) in self.spheres.items.iter().enumerate() {
            // add_sphere checked the material
            let material = self.materials.position(sphere.material).unwrap_or_default();
            write_record(
                &mut out.spheres,
                i,
                &GpuSphere::new(sphere.center, sphere.radius, material),
            );
        }

        let mut offsets = vec![MeshOffsets::default(); self.meshes.len()];

        let mut node_offset = 0;
        for (i, mesh) in self.meshes.items.iter().enumerate() {
            offsets[i].first_bvh_node = node_offset;
            for node in mesh.bvh().nodes() {
                write_record(&mut out.bvh_nodes, node_offset as usize, &GpuBvhNode::from(node));
                node_offset += 1;
            }
            write_record(&mut out.bounding_boxes, i, &GpuBoundingBox::from(&mesh.bounds()));
        }

        let mut triangle_offset = 0;
        for (i, mesh) in self.meshes.items.iter().enumerate() {
            offsets[i].first_triangle = triangle_offset;
            for triangle in mesh.triangles() {
                write_record(
                    &mut out.triangles,
                    triangle_offset as usize,
                    &GpuTriangle::from(triangle),
                );
                triangle_offset += 1;
            }
        }

        for (i, renderable) in self.renderables.items.iter().enumerate() {
            // add_renderable checked all three handles
            let mesh = self.meshes.position(renderable.mesh);
            let material = self.materials.position(renderable.material);
            let transform = self.transforms.position(renderable.transform);
            let record = GpuRenderable {
                mesh_index: mesh.unwrap_or_default(),
                material_index: material.unwrap_or_default(),
                transform_index: transform.unwrap_or_default(),
            };
            write_record(&mut out.renderables, i, &record);
        }

        for (i, material) in self.materials.items.iter().enumerate() {
            write_record(&mut out.materials, i, &material.serialize());
        }

        for (i, mesh) in self.meshes.items.iter().enumerate() {
            let record = GpuMesh {
                bounding_box_index: i as u32,
                first_triangle_index: offsets[i].first_triangle,
                triangle_count: mesh.triangle_count() as u32,
                first_bvh_index: offsets[i].first_bvh_node,
                bvh_node_count: mesh.bvh().node_count() as u32,
            };
            write_record(&mut out.meshes, i, &record);
        }

        debug_assert_eq!(node_offset, sizes.bvh_nodes);
        debug_assert_eq!(triangle_offset, sizes.triangles);

        log::info!(
            "packed scene: {} meshes, {} triangles, {} BVH nodes, {} materials, {} transforms, {} spheres, {} renderables ({} bytes)",
            sizes.meshes,
            sizes.triangles,
            sizes.bvh_nodes,
            sizes.materials,
            sizes.transforms,
            sizes.spheres,
            sizes.renderables,
            out.total_bytes(),
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Material, Renderable, Transform};
    use glam::Vec3;

    #[test]
    fn byte_sizes_follow_record_strides() {
        let sizes = BufferSizes {
            triangles: 3,
            bvh_nodes: 5,
            meshes: 2,
            bounding_boxes: 2,
            materials: 1,
            transforms: 4,
            spheres: 2,
            renderables: 3,
        };
        assert_eq!(sizes.triangle_bytes(), 3 * 128);
        assert_eq!(sizes.bvh_node_bytes(), 5 * 48);
        assert_eq!(sizes.mesh_bytes(), 2 * 20);
        assert_eq!(sizes.bounding_box_bytes(), 2 * 32);
        assert_eq!(sizes.material_bytes(), 40);
        assert_eq!(sizes.transform_bytes(), 4 * 128);
        assert_eq!(sizes.sphere_bytes(), 2 * 32);
        assert_eq!(sizes.renderable_bytes(), 3 * 12);
        assert_eq!(
            sizes.total_bytes(),
            384 + 240 + 40 + 64 + 40 + 512 + 64 + 36 + 16
        );
    }

    #[test]
    fn allocated_buffers_match_written_sizes() {
        let mut scene = Scene::new();
        let mesh = Mesh::cube(scene.ids().next(), 2, 2, 2);
        let material = Material::new_lambertian(scene.ids().next(), Vec3::ONE);
        let transform = Transform::new(scene.ids().next());
        let renderable_id = scene.ids().next();
        let renderable = Renderable::new(renderable_id, mesh.id(), material.id(), transform.id());
        scene.add_mesh(mesh).unwrap();
        scene.add_material(material).unwrap();
        scene.add_transform(transform).unwrap();
        scene.add_renderable(renderable).unwrap();

        let sizes = *scene.sizes();
        let buffers = scene.pack().clone();
        assert_eq!(buffers.triangles.len(), sizes.triangle_bytes());
        assert_eq!(buffers.bvh_nodes.len(), sizes.bvh_node_bytes());
        assert_eq!(buffers.total_bytes(), sizes.total_bytes());
        assert_eq!(buffers.summary.triangle_count, 48);
    }
}
