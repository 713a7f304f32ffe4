//! Fixed-stride records shared with the compute shader. Field offsets are
//! part of the shader interface and must not move.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use static_assertions::assert_eq_size;
use std::mem::size_of;

use crate::geometry::{BoundingBox, Triangle};
use crate::scene::bvh::Node;

#[cfg(target_endian = "big")]
compile_error!("packed scene buffers are little-endian");

/// A plain-old-data record with a fixed stride in its buffer.
pub trait Record: Pod {
    const SIZE: usize = size_of::<Self>();
}

/// Copies `record` into slot `index` of a pre-sized buffer.
pub fn write_record<R: Record>(buffer: &mut [u8], index: usize, record: &R) {
    let offset = index * R::SIZE;
    buffer[offset..offset + R::SIZE].copy_from_slice(bytemuck::bytes_of(record));
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct GpuTriangle {
    pub pos_a: [f32; 3],
    _pad0: u32,
    pub pos_b: [f32; 3],
    _pad1: u32,
    pub pos_c: [f32; 3],
    _pad2: u32,
    pub normal_a: [f32; 3],
    _pad3: u32,
    pub normal_b: [f32; 3],
    _pad4: u32,
    pub normal_c: [f32; 3],
    pub material_index: u32,
    pub uv_a: [f32; 2],
    pub uv_b: [f32; 2],
    pub uv_c: [f32; 2],
    _pad5: [u32; 2],
}

impl Record for GpuTriangle {}

impl From<&Triangle> for GpuTriangle {
    fn from(t: &Triangle) -> Self {
        let [pos_a, pos_b, pos_c] = t.positions.map(|p| p.to_array());
        let [normal_a, normal_b, normal_c] = t.normals.map(|n| n.to_array());
        let [uv_a, uv_b, uv_c] = t.uvs.map(|uv| uv.to_array());
        Self {
            pos_a,
            pos_b,
            pos_c,
            normal_a,
            normal_b,
            normal_c,
            material_index: t.material_index,
            uv_a,
            uv_b,
            uv_c,
            ..Self::zeroed()
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct GpuBvhNode {
    pub min: [f32; 3],
    _pad0: u32,
    pub max: [f32; 3],
    pub left_child_index: u32,
    pub first_triangle_index: u32,
    pub triangle_count: u32,
    _pad1: [u32; 2],
}

impl Record for GpuBvhNode {}

impl From<&Node> for GpuBvhNode {
    fn from(node: &Node) -> Self {
        Self {
            min: node.bounds.min.to_array(),
            max: node.bounds.max.to_array(),
            left_child_index: node.left_child,
            first_triangle_index: node.first_triangle,
            triangle_count: node.triangle_count,
            ..Self::zeroed()
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct GpuBoundingBox {
    pub min: [f32; 3],
    _pad0: u32,
    pub max: [f32; 3],
    _pad1: u32,
}

impl Record for GpuBoundingBox {}

impl From<&BoundingBox> for GpuBoundingBox {
    fn from(bb: &BoundingBox) -> Self {
        Self {
            min: bb.min.to_array(),
            max: bb.max.to_array(),
            ..Self::zeroed()
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct GpuMaterial {
    pub attenuation: [f32; 3],
    pub metallic_fuzz: f32,
    pub emissive_color: [f32; 3],
    pub emissive_strength: f32,
    pub material_flag: u32,
    pub refractive_index: f32,
}

impl Record for GpuMaterial {}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct GpuMesh {
    pub bounding_box_index: u32,
    pub first_triangle_index: u32,
    pub triangle_count: u32,
    pub first_bvh_index: u32,
    pub bvh_node_count: u32,
}

impl Record for GpuMesh {}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct GpuRenderable {
    pub mesh_index: u32,
    pub material_index: u32,
    pub transform_index: u32,
}

impl Record for GpuRenderable {}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct GpuTransform {
    pub model: Mat4,
    pub inverse_model: Mat4,
}

impl Record for GpuTransform {}

impl From<Mat4> for GpuTransform {
    fn from(model: Mat4) -> Self {
        Self {
            model,
            inverse_model: model.inverse(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct GpuSphere {
    pub center: [f32; 3],
    pub radius: f32,
    pub material_index: u32,
    _pad: [u32; 3],
}

impl Record for GpuSphere {}

impl GpuSphere {
    pub fn new(center: Vec3, radius: f32, material_index: u32) -> Self {
        Self {
            center: center.to_array(),
            radius,
            material_index,
            _pad: [0; 3],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct GpuSceneSummary {
    pub sphere_count: u32,
    pub mesh_count: u32,
    pub triangle_count: u32,
    pub renderable_count: u32,
}

impl Record for GpuSceneSummary {}

assert_eq_size!(GpuTriangle, [u8; 128]);
assert_eq_size!(GpuBvhNode, [u8; 48]);
assert_eq_size!(GpuBoundingBox, [u8; 32]);
assert_eq_size!(GpuMaterial, [u8; 40]);
assert_eq_size!(GpuMesh, [u8; 20]);
assert_eq_size!(GpuRenderable, [u8; 12]);
assert_eq_size!(GpuTransform, [u8; 128]);
assert_eq_size!(GpuSphere, [u8; 32]);
assert_eq_size!(GpuSceneSummary, [u8; 16]);

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use std::mem::offset_of;

    fn f32_at(bytes: &[u8], offset: usize) -> f32 {
        f32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn triangle_field_offsets() {
        assert_eq!(offset_of!(GpuTriangle, pos_a), 0);
        assert_eq!(offset_of!(GpuTriangle, pos_b), 16);
        assert_eq!(offset_of!(GpuTriangle, pos_c), 32);
        assert_eq!(offset_of!(GpuTriangle, normal_a), 48);
        assert_eq!(offset_of!(GpuTriangle, normal_b), 64);
        assert_eq!(offset_of!(GpuTriangle, normal_c), 80);
        assert_eq!(offset_of!(GpuTriangle, material_index), 92);
        assert_eq!(offset_of!(GpuTriangle, uv_a), 96);
        assert_eq!(offset_of!(GpuTriangle, uv_b), 104);
        assert_eq!(offset_of!(GpuTriangle, uv_c), 112);
    }

    #[test]
    fn node_material_and_box_offsets() {
        assert_eq!(offset_of!(GpuBvhNode, min), 0);
        assert_eq!(offset_of!(GpuBvhNode, max), 16);
        assert_eq!(offset_of!(GpuBvhNode, left_child_index), 28);
        assert_eq!(offset_of!(GpuBvhNode, first_triangle_index), 32);
        assert_eq!(offset_of!(GpuBvhNode, triangle_count), 36);

        assert_eq!(offset_of!(GpuMaterial, metallic_fuzz), 12);
        assert_eq!(offset_of!(GpuMaterial, emissive_color), 16);
        assert_eq!(offset_of!(GpuMaterial, emissive_strength), 28);
        assert_eq!(offset_of!(GpuMaterial, material_flag), 32);
        assert_eq!(offset_of!(GpuMaterial, refractive_index), 36);

        assert_eq!(offset_of!(GpuBoundingBox, max), 16);
        assert_eq!(offset_of!(GpuTransform, inverse_model), 64);
        assert_eq!(offset_of!(GpuSphere, material_index), 16);
    }

    #[test]
    fn triangle_bytes_are_little_endian_at_fixed_offsets() {
        let t = Triangle::new(
            [Vec3::new(1.0, 2.0, 3.0), Vec3::X, Vec3::Y],
            [Vec3::Z, Vec3::Z, Vec3::new(0.0, -1.0, 0.0)],
            [Vec2::new(0.25, 0.5), Vec2::ONE, Vec2::ZERO],
        )
        .with_material_index(7);
        let mut buffer = vec![0xffu8; 2 * GpuTriangle::SIZE];
        write_record(&mut buffer, 1, &GpuTriangle::from(&t));

        assert!(buffer[..128].iter().all(|&b| b == 0xff));
        let rec = &buffer[128..];
        assert_eq!(f32_at(rec, 0), 1.0);
        assert_eq!(f32_at(rec, 8), 3.0);
        assert_eq!(u32_at(rec, 12), 0);
        assert_eq!(f32_at(rec, 84), -1.0);
        assert_eq!(u32_at(rec, 92), 7);
        assert_eq!(f32_at(rec, 96), 0.25);
        assert_eq!(f32_at(rec, 100), 0.5);
        assert_eq!(f32_at(rec, 104), 1.0);
    }

    #[test]
    fn node_record_carries_tree_indices() {
        let mut node = Node::new(6, 2, 3);
        node.left_child = 9;
        node.bounds = BoundingBox::from_points([Vec3::ZERO, Vec3::ONE]);
        let rec = GpuBvhNode::from(&node);
        let bytes = bytemuck::bytes_of(&rec);
        assert_eq!(f32_at(bytes, 16), 1.0);
        assert_eq!(u32_at(bytes, 28), 9);
        assert_eq!(u32_at(bytes, 32), 6);
        assert_eq!(u32_at(bytes, 36), 2);
    }
}
