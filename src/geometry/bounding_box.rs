use glam::Vec3;

use super::Triangle;

/// Axis-aligned box. A fresh box is inverted (`min = +inf`, `max = -inf`)
/// so growing it by any point yields that point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::EMPTY, |mut bb, p| {
            bb.grow(p);
            bb
        })
    }

    pub fn from_triangles<'a>(triangles: impl IntoIterator<Item = &'a Triangle>) -> Self {
        let mut bb = Self::EMPTY;
        for t in triangles {
            bb.add_triangle(t);
        }
        bb
    }

    pub fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn add_triangle(&mut self, triangle: &Triangle) {
        for p in triangle.positions {
            self.grow(p);
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// False for the sentinel box and for boxes poisoned by NaN.
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        self.min.cmple(p).all() && p.cmple(self.max).all()
    }

    pub fn contains(&self, other: &Self) -> bool {
        self.min.cmple(other.min).all() && other.max.cmple(self.max).all()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_is_inverted() {
        let bb = BoundingBox::default();
        assert!(!bb.is_valid());
        assert_eq!(bb.min, Vec3::splat(f32::INFINITY));
        assert_eq!(bb.max, Vec3::splat(f32::NEG_INFINITY));
    }

    #[test]
    fn grow_from_empty() {
        let bb = BoundingBox::from_points([Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 4.0, 0.5)]);
        assert!(bb.is_valid());
        assert_eq!(bb.min, Vec3::new(-1.0, -2.0, 0.5));
        assert_eq!(bb.max, Vec3::new(1.0, 4.0, 3.0));
        assert_eq!(bb.extent(), Vec3::new(2.0, 6.0, 2.5));
        assert!(bb.contains_point(Vec3::ZERO));
        assert!(!bb.contains_point(Vec3::new(0.0, 5.0, 1.0)));
    }

    #[test]
    fn union_with_empty_is_identity() {
        let bb = BoundingBox::from_points([Vec3::ONE, Vec3::splat(2.0)]);
        assert_eq!(bb.union(&BoundingBox::EMPTY), bb);
        assert!(bb.contains(&bb));
    }
}
