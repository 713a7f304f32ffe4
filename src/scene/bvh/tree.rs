use glam::Vec3;

use crate::geometry::{BoundingBox, Triangle};
use crate::scene::bvh::Node;
use crate::scene::layout::{GpuBvhNode, Record};

/// Depth and occupancy statistics over the leaves of a built tree.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LeafStats {
    pub leaf_count: u32,
    pub min_depth: u32,
    pub max_depth: u32,
    pub mean_depth: f64,
    pub min_triangles: u32,
    pub max_triangles: u32,
    pub mean_triangles: f64,
}

impl LeafStats {
    fn record(&mut self, node: &Node) {
        if self.leaf_count == 0 {
            self.min_depth = node.depth;
            self.min_triangles = node.triangle_count;
        } else {
            self.min_depth = self.min_depth.min(node.depth);
            self.min_triangles = self.min_triangles.min(node.triangle_count);
        }
        self.leaf_count += 1;
        self.max_depth = self.max_depth.max(node.depth);
        self.max_triangles = self.max_triangles.max(node.triangle_count);
        // sums until finalize()
        self.mean_depth += node.depth as f64;
        self.mean_triangles += node.triangle_count as f64;
    }

    fn finalize(&mut self) {
        if self.leaf_count > 0 {
            self.mean_depth /= self.leaf_count as f64;
            self.mean_triangles /= self.leaf_count as f64;
        }
    }
}

/// Bounding volume hierarchy over a triangle slice. The root is always
/// node 0; nodes refer to contiguous runs of the slice the tree was
/// built from, which `build` reorders in place.
#[derive(Debug, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    stats: LeafStats,
}

impl Tree {
    /// Nodes holding this many triangles or fewer are never split.
    pub const MAX_LEAF_TRIANGLES: usize = 2;

    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            stats: LeafStats::default(),
        }
    }

    /// Rebuilds the tree from scratch, permuting `triangles` so that every
    /// leaf's range is exactly its primitive set.
    pub fn build(&mut self, triangles: &mut [Triangle]) {
        self.nodes.clear();
        self.stats = LeafStats::default();
        if triangles.is_empty() {
            log::warn!("building BVH over an empty triangle list");
        }
        self.nodes.reserve((2 * triangles.len()).saturating_sub(1).max(1));
        self.nodes.push(Node::new(0, triangles.len() as u32, 0));
        self.update_bounds(triangles, 0);
        self.subdivide(triangles, 0);
        self.stats.finalize();
        log::debug!(
            "built BVH: {} triangles, {} nodes, {} leaves, depth {}..{} (mean {:.2}), leaf size {}..{} (mean {:.2})",
            triangles.len(),
            self.nodes.len(),
            self.stats.leaf_count,
            self.stats.min_depth,
            self.stats.max_depth,
            self.stats.mean_depth,
            self.stats.min_triangles,
            self.stats.max_triangles,
            self.stats.mean_triangles,
        );
    }

    fn update_bounds(&mut self, triangles: &[Triangle], index: usize) {
        let range = self.nodes[index].triangle_range();
        self.nodes[index].bounds = BoundingBox::from_triangles(&triangles[range]);
    }

    fn subdivide(&mut self, triangles: &mut [Triangle], index: usize) {
        let node = self.nodes[index];
        let count = node.triangle_count as usize;
        if count <= Self::MAX_LEAF_TRIANGLES {
            self.stats.record(&node);
            return;
        }

        let extent = node.bounds.extent();
        let axis = split_axis(extent);
        let split = node.bounds.min[axis] + extent[axis] * 0.5;

        let left_count = partition(&mut triangles[node.triangle_range()], axis, split);
        if left_count == 0 || left_count == count {
            // every centroid on one side; splitting again would not terminate
            self.stats.record(&node);
            return;
        }

        let left = self.nodes.len();
        let left_count = left_count as u32;
        self.nodes.push(Node::new(node.first_triangle, left_count, node.depth + 1));
        self.nodes.push(Node::new(
            node.first_triangle + left_count,
            node.triangle_count - left_count,
            node.depth + 1,
        ));
        self.nodes[index].left_child = left as u32;
        self.nodes[index].triangle_count = 0;

        self.update_bounds(triangles, left);
        self.update_bounds(triangles, left + 1);
        self.subdivide(triangles, left);
        self.subdivide(triangles, left + 1);
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn bounds(&self) -> BoundingBox {
        self.root().map(|n| n.bounds).unwrap_or_default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.stats.leaf_count as usize
    }

    pub fn stats(&self) -> &LeafStats {
        &self.stats
    }

    pub fn leaves(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_leaf())
    }

    pub fn size_in_bytes(&self) -> usize {
        self.nodes.len() * GpuBvhNode::SIZE
    }
}

/// Largest extent wins; a later axis only takes over on a strictly
/// greater extent, so ties resolve towards x, then y.
fn split_axis(extent: Vec3) -> usize {
    let mut axis = 0;
    if extent.y > extent.x {
        axis = 1;
    }
    if extent.z > extent[axis] {
        axis = 2;
    }
    axis
}

/// Two-pointer partition: centroids below `split` end up in front.
/// Returns the size of the front half. Not stable.
fn partition(triangles: &mut [Triangle], axis: usize, split: f32) -> usize {
    let mut i = 0;
    let mut j = triangles.len();
    while i < j {
        if triangles[i].centroid()[axis] < split {
            i += 1;
        } else {
            j -= 1;
            triangles.swap(i, j);
        }
    }
    i
}
