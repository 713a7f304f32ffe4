use glam::{Vec2, Vec3};

use crate::geometry::{Mesh, Triangle};
use crate::scene::MeshId;

/// Emits two triangles per cell of a `segments_u` x `segments_v` grid.
/// `point` and `uv` map grid coordinates in `[0, 1]` onto the face.
fn push_grid(
    triangles: &mut Vec<Triangle>,
    segments_u: u32,
    segments_v: u32,
    normal: Vec3,
    point: impl Fn(f32, f32) -> Vec3,
    uv: impl Fn(f32, f32) -> Vec2,
) {
    let du = 1.0 / segments_u as f32;
    let dv = 1.0 / segments_v as f32;
    let vertex = |i: u32, j: u32| {
        let (u, v) = (i as f32 * du, j as f32 * dv);
        (point(u, v), uv(u, v))
    };
    for i in 0..segments_u {
        for j in 0..segments_v {
            let (p00, t00) = vertex(i, j);
            let (p01, t01) = vertex(i, j + 1);
            let (p11, t11) = vertex(i + 1, j + 1);
            let (p10, t10) = vertex(i + 1, j);
            triangles.push(Triangle::new([p00, p01, p11], [normal; 3], [t00, t01, t11]));
            triangles.push(Triangle::new([p11, p10, p00], [normal; 3], [t11, t10, t00]));
        }
    }
}

fn segments(name: &str, n: u32) -> u32 {
    if n == 0 {
        log::warn!("{name} has zero segments; using 1");
        return 1;
    }
    n
}

impl Mesh {
    /// Unit cube centred on the origin. Each face is split into a grid of
    /// the given segment counts, two triangles per cell.
    pub fn cube(id: MeshId, width: u32, height: u32, depth: u32) -> Self {
        let w = segments("cube width", width);
        let h = segments("cube height", height);
        let d = segments("cube depth", depth);
        let mut triangles = Vec::with_capacity((4 * (w * h + h * d + w * d)) as usize);

        // front, back
        push_grid(
            &mut triangles,
            w,
            h,
            Vec3::NEG_Z,
            |u, v| Vec3::new(-0.5 + u, -0.5 + v, -0.5),
            |u, v| Vec2::new(u, v),
        );
        push_grid(
            &mut triangles,
            w,
            h,
            Vec3::Z,
            |u, v| Vec3::new(0.5 - u, -0.5 + v, 0.5),
            |u, v| Vec2::new(u, v),
        );
        // right, left
        push_grid(
            &mut triangles,
            h,
            d,
            Vec3::X,
            |u, v| Vec3::new(0.5, -0.5 + u, -0.5 + v),
            |u, v| Vec2::new(v, u),
        );
        push_grid(
            &mut triangles,
            h,
            d,
            Vec3::NEG_X,
            |u, v| Vec3::new(-0.5, 0.5 - u, -0.5 + v),
            |u, v| Vec2::new(1.0 - v, 1.0 - u),
        );
        // top, bottom
        push_grid(
            &mut triangles,
            w,
            d,
            Vec3::Y,
            |u, v| Vec3::new(-0.5 + u, 0.5, -0.5 + v),
            |u, v| Vec2::new(u, v),
        );
        push_grid(
            &mut triangles,
            w,
            d,
            Vec3::NEG_Y,
            |u, v| Vec3::new(0.5 - u, -0.5, -0.5 + v),
            |u, v| Vec2::new(1.0 - u, 1.0 - v),
        );

        Self::new(id, triangles)
    }

    /// Unit quad in the z = 0 plane facing -Z.
    pub fn plane(id: MeshId, width: u32, height: u32) -> Self {
        let w = segments("plane width", width);
        let h = segments("plane height", height);
        let mut triangles = Vec::with_capacity((2 * w * h) as usize);
        push_grid(
            &mut triangles,
            w,
            h,
            Vec3::NEG_Z,
            |u, v| Vec3::new(-0.5 + u, -0.5 + v, 0.0),
            |u, v| Vec2::new(u, v),
        );
        Self::new(id, triangles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::IdAllocator;

    #[test]
    fn unit_cube_has_twelve_triangles() {
        let mut ids = IdAllocator::new();
        let cube = Mesh::cube(ids.next(), 1, 1, 1);
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.bounds().min, Vec3::splat(-0.5));
        assert_eq!(cube.bounds().max, Vec3::splat(0.5));
        let total: u32 = cube.bvh().leaves().map(|l| l.triangle_count).sum();
        assert_eq!(total, 12);
    }

    #[test]
    fn segmented_cube_counts_every_face() {
        let mut ids = IdAllocator::new();
        let cube = Mesh::cube(ids.next(), 2, 3, 4);
        assert_eq!(cube.triangle_count(), 2 * 2 * (2 * 3 + 3 * 4 + 2 * 4));
        for t in cube.triangles() {
            let n = t.normals[0];
            for p in t.positions {
                // every vertex sits on the face its normal points out of
                assert!((p.dot(n) - 0.5).abs() < 1e-6);
            }
            for uv in t.uvs {
                assert!(uv.cmpge(Vec2::ZERO).all() && uv.cmple(Vec2::ONE).all());
            }
        }
    }

    #[test]
    fn plane_lies_in_z_zero() {
        let mut ids = IdAllocator::new();
        let plane = Mesh::plane(ids.next(), 3, 2);
        assert_eq!(plane.triangle_count(), 12);
        assert!(plane
            .triangles()
            .iter()
            .all(|t| t.positions.iter().all(|p| p.z == 0.0)));
        assert!(plane.triangles().iter().all(|t| t.normals[0] == Vec3::NEG_Z));
    }

    #[test]
    fn zero_segments_are_clamped() {
        let mut ids = IdAllocator::new();
        assert_eq!(Mesh::plane(ids.next(), 0, 0).triangle_count(), 2);
        assert_eq!(Mesh::cube(ids.next(), 0, 1, 0).triangle_count(), 12);
    }
}
