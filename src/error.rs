//! Error types for mesh loading and scene registration.

use std::path::PathBuf;
use thiserror::Error;

use crate::scene::{MaterialId, MeshId, TransformId};

#[derive(Error, Debug)]
pub enum Error {
    /// OBJ source could not be parsed
    #[error("Failed to load OBJ: {0}")]
    Obj(#[from] tobj::LoadError),

    /// OBJ file does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Loaded geometry contained no triangles
    #[error("Mesh has no triangles")]
    EmptyMesh,

    /// Renderable or sphere refers to a mesh that was never registered
    #[error("Unknown mesh: {0:?}")]
    UnknownMesh(MeshId),

    /// Renderable or sphere refers to a material that was never registered
    #[error("Unknown material: {0:?}")]
    UnknownMaterial(MaterialId),

    /// Renderable refers to a transform that was never registered
    #[error("Unknown transform: {0:?}")]
    UnknownTransform(TransformId),

    /// A different entity is already registered under this id
    #[error("Duplicate {kind} id {id}: already registered to a different {kind}")]
    DuplicateId { kind: &'static str, id: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
