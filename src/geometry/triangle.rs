use glam::{Mat3, Mat4, Vec2, Vec3};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Triangle {
    pub positions: [Vec3; 3],
    pub normals: [Vec3; 3],
    pub uvs: [Vec2; 3],
    pub material_index: u32,
    centroid: Vec3,
}

impl Triangle {
    pub fn new(positions: [Vec3; 3], normals: [Vec3; 3], uvs: [Vec2; 3]) -> Self {
        Self {
            positions,
            normals,
            uvs,
            material_index: 0,
            centroid: centroid_of(&positions),
        }
    }

    /// Triangle with the geometric normal on every vertex and zero UVs.
    pub fn flat(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let normal = (b - a).cross(c - a).normalize_or_zero();
        Self::new([a, b, c], [normal; 3], [Vec2::ZERO; 3])
    }

    pub fn with_material_index(mut self, material_index: u32) -> Self {
        self.material_index = material_index;
        self
    }

    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    /// Moves the triangle into world space. Normals go through the
    /// inverse-transpose so non-uniform scales keep them perpendicular.
    pub fn transformed(&self, model: Mat4, normal_matrix: Mat3) -> Self {
        let positions = self.positions.map(|p| model.transform_point3(p));
        let normals = self.normals.map(|n| (normal_matrix * n).normalize_or_zero());
        Self {
            positions,
            normals,
            uvs: self.uvs,
            material_index: self.material_index,
            centroid: centroid_of(&positions),
        }
    }
}

fn centroid_of(positions: &[Vec3; 3]) -> Vec3 {
    (positions[0] + positions[1] + positions[2]) / 3.0
}

pub fn normal_matrix(model: Mat4) -> Mat3 {
    Mat3::from_mat4(model).inverse().transpose()
}
