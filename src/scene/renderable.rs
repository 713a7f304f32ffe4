use crate::scene::ids::{MaterialId, MeshId, RenderableId, TransformId};

/// Pairs a mesh with a material and a transform. Several renderables may
/// share one mesh; the mesh is packed once and referenced by index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Renderable {
    id: RenderableId,
    pub mesh: MeshId,
    pub material: MaterialId,
    pub transform: TransformId,
}

impl Renderable {
    pub fn new(
        id: RenderableId,
        mesh: MeshId,
        material: MaterialId,
        transform: TransformId,
    ) -> Self {
        Self {
            id,
            mesh,
            material,
            transform,
        }
    }

    pub fn id(&self) -> RenderableId {
        self.id
    }
}
