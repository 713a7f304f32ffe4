use glam::{Vec2, Vec3};
use std::io::BufReader;
use std::path::Path;

use crate::error::{Error, Result};
use crate::geometry::{Mesh, Triangle};
use crate::scene::MeshId;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    }
}

fn vec3_at(data: &[f32], index: usize) -> Option<Vec3> {
    data.get(index * 3..index * 3 + 3).map(Vec3::from_slice)
}

fn vec2_at(data: &[f32], index: usize) -> Option<Vec2> {
    data.get(index * 2..index * 2 + 2).map(Vec2::from_slice)
}

fn triangles_from_models(models: &[tobj::Model]) -> Vec<Triangle> {
    let mut triangles = Vec::new();
    for model in models {
        let mesh = &model.mesh;
        let material = mesh.material_id.unwrap_or(0) as u32;
        for face in mesh.indices.chunks_exact(3) {
            let idx = [face[0] as usize, face[1] as usize, face[2] as usize];
            let Some(positions) = idx
                .iter()
                .map(|&i| vec3_at(&mesh.positions, i))
                .collect::<Option<Vec<_>>>()
            else {
                log::warn!("{}: face refers to a missing vertex, skipped", model.name);
                continue;
            };
            let [a, b, c] = [positions[0], positions[1], positions[2]];
            let mut triangle = Triangle::flat(a, b, c);
            if let (Some(na), Some(nb), Some(nc)) = (
                vec3_at(&mesh.normals, idx[0]),
                vec3_at(&mesh.normals, idx[1]),
                vec3_at(&mesh.normals, idx[2]),
            ) {
                triangle.normals = [na, nb, nc];
            }
            if let (Some(ta), Some(tb), Some(tc)) = (
                vec2_at(&mesh.texcoords, idx[0]),
                vec2_at(&mesh.texcoords, idx[1]),
                vec2_at(&mesh.texcoords, idx[2]),
            ) {
                triangle.uvs = [ta, tb, tc];
            }
            triangles.push(triangle.with_material_index(material));
        }
    }
    triangles
}

fn mesh_from_models(id: MeshId, models: &[tobj::Model]) -> Result<Mesh> {
    let triangles = triangles_from_models(models);
    if triangles.is_empty() {
        return Err(Error::EmptyMesh);
    }
    log::info!("loaded OBJ: {} models, {} triangles", models.len(), triangles.len());
    Ok(Mesh::new(id, triangles))
}

impl Mesh {
    /// Parses OBJ source held in memory. Material libraries are not
    /// resolved; each face keeps the index of its `usemtl` group.
    pub fn load_obj(id: MeshId, source: &[u8]) -> Result<Self> {
        let mut reader = BufReader::new(source);
        let (models, _materials) = tobj::load_obj_buf(&mut reader, &load_options(), |_matpath| {
            Err(tobj::LoadError::GenericFailure)
        })?;
        mesh_from_models(id, &models)
    }

    pub fn load_obj_file(id: MeshId, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let (models, _materials) = tobj::load_obj(path, &load_options())?;
        mesh_from_models(id, &models)
    }
}
