mod bounding_box;
mod mesh;
mod obj;
mod primitives;
pub mod triangle;
pub use bounding_box::BoundingBox;
pub use mesh::Mesh;
pub use triangle::Triangle;
