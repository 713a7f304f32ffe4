use crate::geometry::BoundingBox;

/// A node of the packed binary tree. The right child always lives at
/// `left_child + 1`, so only one child index is stored.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Node {
    pub bounds: BoundingBox,
    pub left_child: u32,
    pub first_triangle: u32,
    pub triangle_count: u32,
    pub depth: u32,
}

impl Node {
    pub fn new(first_triangle: u32, triangle_count: u32, depth: u32) -> Self {
        Self {
            bounds: BoundingBox::EMPTY,
            left_child: 0,
            first_triangle,
            triangle_count,
            depth,
        }
    }

    /// Children are always appended after their parent, so index 0 can
    /// never be a left child. Internal nodes also have their count cleared.
    pub fn is_leaf(&self) -> bool {
        self.left_child == 0
    }

    pub fn right_child(&self) -> u32 {
        self.left_child + 1
    }

    pub fn triangle_range(&self) -> std::ops::Range<usize> {
        let first = self.first_triangle as usize;
        first..first + self.triangle_count as usize
    }
}
