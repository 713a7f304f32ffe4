pub mod node;
pub mod tree;
pub use node::Node;
pub use tree::{LeafStats, Tree};
