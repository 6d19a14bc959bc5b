use crate::scene::material::MaterialData;
use crate::scene::mesh::Mesh;

/// One mesh together with the index of the material it is drawn with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub mesh: Mesh,
    /// Index into [`Model::material_data`]. Not bounds-checked on load.
    pub material_index: i32,
}

impl MeshData {
    pub fn new(mesh: Mesh, material_index: i32) -> Self {
        Self {
            mesh,
            material_index,
        }
    }

    /// The bound material, if `material_index` resolves inside `model`.
    pub fn material<'a>(&self, model: &'a Model) -> Option<&'a MaterialData> {
        usize::try_from(self.material_index)
            .ok()
            .and_then(|i| model.material_data.get(i))
    }
}

/// A Model represents a complete 3D object.
/// It consists of one or more meshes and a list of materials.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub mesh_data: Vec<MeshData>,
    pub material_data: Vec<MaterialData>,
}

impl Model {
    pub fn new(mesh_data: Vec<MeshData>, material_data: Vec<MaterialData>) -> Self {
        Self {
            mesh_data,
            material_data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mesh_data.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh_data.iter().map(|m| m.mesh.vertices.len()).sum()
    }

    pub fn index_count(&self) -> usize {
        self.mesh_data.iter().map(|m| m.mesh.indices.len()).sum()
    }
}
