use crate::core::color::Color;
use crate::core::geometry::Vertex;
use crate::scene::material::{Material, MaterialData};
use crate::scene::mesh::Mesh;
use crate::scene::model::{MeshData, Model};
use log::{info, warn};
use nalgebra::{Point3, Vector2, Vector3};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to load OBJ {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("OBJ {} contains no meshes", path.display())]
    Empty { path: PathBuf },
}

/// Imports an OBJ file (and its MTL library, if any) as a [`Model`].
///
/// Every OBJ object becomes its own mesh bound to its MTL material. Texture
/// references keep only their file name so the model can be written next to
/// its textures.
pub fn import_obj(path: impl AsRef<Path>) -> Result<Model, ImportError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ImportError::NotFound {
            path: path.to_path_buf(),
        });
    }

    info!("Importing OBJ file: {}", path.display());

    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true, // Position/normal/uv share one index
        ..Default::default()
    };

    let (obj_models, obj_materials) =
        tobj::load_obj(path, &load_options).map_err(|source| ImportError::Load {
            path: path.to_path_buf(),
            source,
        })?;

    if obj_models.is_empty() {
        return Err(ImportError::Empty {
            path: path.to_path_buf(),
        });
    }

    let material_data = match obj_materials {
        Ok(materials) => materials.iter().map(convert_material).collect(),
        Err(e) => {
            warn!("No usable MTL for '{}': {}", path.display(), e);
            Vec::new()
        }
    };

    let mesh_data: Vec<MeshData> = obj_models
        .iter()
        .map(|obj| {
            let material_index = obj.mesh.material_id.map_or(-1, |id| id as i32);
            MeshData::new(convert_mesh(&obj.name, &obj.mesh), material_index)
        })
        .collect();

    let model = Model::new(mesh_data, material_data);
    info!(
        "OBJ imported: {} meshes, {} materials, {} vertices, {} indices",
        model.mesh_data.len(),
        model.material_data.len(),
        model.vertex_count(),
        model.index_count()
    );
    Ok(model)
}

fn convert_mesh(name: &str, mesh: &tobj::Mesh) -> Mesh {
    let num_vertices = mesh.positions.len() / 3;
    let has_normals = mesh.normals.len() >= num_vertices * 3;
    let has_texcoords = mesh.texcoords.len() >= num_vertices * 2;

    if !has_normals {
        warn!("Mesh '{}' is missing normals. Using default (0, 1, 0).", name);
    }

    let mut vertices: Vec<Vertex> = (0..num_vertices)
        .map(|i| {
            let position = Point3::new(
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            );
            let normal = if has_normals {
                Vector3::new(
                    mesh.normals[i * 3],
                    mesh.normals[i * 3 + 1],
                    mesh.normals[i * 3 + 2],
                )
            } else {
                Vector3::y()
            };
            let uv = if has_texcoords {
                Vector2::new(mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1])
            } else {
                Vector2::zeros()
            };
            Vertex::new(position, normal, uv)
        })
        .collect();

    let indices = mesh.indices.clone();
    if has_texcoords {
        compute_tangents(&mut vertices, &indices);
    }

    let mesh = Mesh::new(vertices, indices);
    if !mesh.has_valid_indices() {
        warn!("Mesh '{}' has indices past its {} vertices", name, num_vertices);
    }
    mesh
}

/// Per-vertex tangents from UV gradients, averaged over the triangles that
/// share a vertex and made orthogonal to its normal. Vertices without a
/// usable UV gradient keep a zero tangent.
pub fn compute_tangents(vertices: &mut [Vertex], indices: &[u32]) {
    let mut accum = vec![Vector3::<f32>::zeros(); vertices.len()];

    for tri in indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(v0), Some(v1), Some(v2)) =
            (vertices.get(i0), vertices.get(i1), vertices.get(i2))
        else {
            continue;
        };

        let edge1 = v1.position - v0.position;
        let edge2 = v2.position - v0.position;
        let duv1 = v1.uv - v0.uv;
        let duv2 = v2.uv - v0.uv;

        let det = duv1.x * duv2.y - duv2.x * duv1.y;
        if det.abs() < 1e-8 {
            continue;
        }
        let tangent = (edge1 * duv2.y - edge2 * duv1.y) / det;

        for i in [i0, i1, i2] {
            accum[i] += tangent;
        }
    }

    for (vertex, t) in vertices.iter_mut().zip(accum) {
        // Gram-Schmidt against the normal
        let n = vertex.normal;
        let orthogonal = t - n * n.dot(&t);
        vertex.tangent = orthogonal.try_normalize(1e-6).unwrap_or_else(Vector3::zeros);
    }
}

fn convert_material(mtl: &tobj::Material) -> MaterialData {
    let alpha = mtl.dissolve.unwrap_or(1.0);
    let color = |rgb: Option<[f32; 3]>, fallback: Color| {
        rgb.map_or(fallback, |[r, g, b]| Color::new(r, g, b, alpha))
    };

    let defaults = Material::default();
    let material = Material {
        ambient: color(mtl.ambient, defaults.ambient),
        diffuse: color(mtl.diffuse, defaults.diffuse),
        specular: color(mtl.specular, defaults.specular),
        emissive: defaults.emissive,
        power: mtl.shininess.unwrap_or(defaults.power),
    };

    let mut data = MaterialData::new(material);
    data.diffuse_map_name = texture_file_name(mtl.diffuse_texture.as_deref());
    data.specular_map_name = texture_file_name(mtl.specular_texture.as_deref());
    data.displ_map_name = texture_file_name(mtl.unknown_param.get("disp").map(String::as_str));
    data.normal_map_name = texture_file_name(mtl.normal_texture.as_deref());
    data
}

fn texture_file_name(texture: Option<&str>) -> String {
    texture
        .and_then(|t| Path::new(t.trim()).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
