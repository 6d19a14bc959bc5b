use crate::io::model_io::{self, ModelIoError};
use crate::scene::model::Model;
use log::info;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Handle to a model owned by a [`ModelCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(usize);

/// Owns loaded models and hands out stable ids.
///
/// Each path is read once; loading the same path again returns the id of
/// the first load.
#[derive(Debug, Default)]
pub struct ModelCache {
    models: Vec<Model>,
    by_path: HashMap<PathBuf, ModelId>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `path` and its material sidecar. A missing sidecar is not an
    /// error; the model then has no materials.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<ModelId, ModelIoError> {
        let path = path.as_ref();
        if let Some(&id) = self.by_path.get(path) {
            return Ok(id);
        }

        let mut model = Model::default();
        model_io::load_model(path, &mut model)?;
        match model_io::load_material(path, &mut model) {
            Ok(()) => {}
            Err(e) if e.is_skip() => {
                info!("Model '{}' has no material sidecar", path.display())
            }
            Err(e) => return Err(e),
        }

        info!(
            "Loaded model '{}': {} meshes, {} materials, {} vertices",
            path.display(),
            model.mesh_data.len(),
            model.material_data.len(),
            model.vertex_count()
        );

        let id = self.insert(model);
        self.by_path.insert(path.to_path_buf(), id);
        Ok(id)
    }

    /// Adds a model built in memory.
    pub fn insert(&mut self, model: Model) -> ModelId {
        let id = ModelId(self.models.len());
        self.models.push(model);
        id
    }

    pub fn get(&self, id: ModelId) -> Option<&Model> {
        self.models.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
