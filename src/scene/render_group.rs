use crate::scene::camera::{BackBuffer, Camera};
use crate::scene::material::Material;
use crate::scene::model::Model;
use crate::scene::model_cache::{ModelCache, ModelId};
use log::{trace, warn};
use nalgebra::{Matrix4, Point3};
use std::path::PathBuf;

/// Skeletal animation source driving a render group.
pub trait Animator {
    fn update(&mut self, delta_time: f32);

    /// Skinning palette for the current pose, if the model is skinned.
    fn bone_transforms(&self) -> Option<&[Matrix4<f32>]>;
}

/// Draw backend. Receives the frame's camera matrices once, then every
/// object to draw.
pub trait Effect {
    fn begin(&mut self, frame: &FrameTransforms);
    fn draw(&mut self, object: &RenderObject, bone_transforms: Option<&[Matrix4<f32>]>);
    fn end(&mut self);
}

/// Camera state captured for one frame of drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransforms {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub view_projection: Matrix4<f32>,
    pub camera_position: Point3<f32>,
}

impl FrameTransforms {
    pub fn from_camera(camera: &Camera, back_buffer: &impl BackBuffer) -> Self {
        let view = camera.view_matrix();
        let projection = camera.projection_matrix(back_buffer);
        Self {
            view,
            projection,
            view_projection: projection * view,
            camera_position: *camera.position(),
        }
    }
}

/// One drawable mesh of a model with its resolved material.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderObject {
    pub model_id: ModelId,
    pub mesh_index: usize,
    pub index_count: usize,
    pub material: Material,
    pub diffuse_map: Option<PathBuf>,
    pub specular_map: Option<PathBuf>,
    pub displ_map: Option<PathBuf>,
    pub normal_map: Option<PathBuf>,
    pub transform: Matrix4<f32>,
}

/// All meshes of one model, optionally driven by an animator.
pub struct RenderGroup {
    model_id: ModelId,
    objects: Vec<RenderObject>,
    animator: Option<Box<dyn Animator>>,
}

impl RenderGroup {
    pub fn new(model_id: ModelId, model: &Model, animator: Option<Box<dyn Animator>>) -> Self {
        let objects = model
            .mesh_data
            .iter()
            .enumerate()
            .map(|(mesh_index, mesh_data)| {
                let mut object = RenderObject {
                    model_id,
                    mesh_index,
                    index_count: mesh_data.mesh.indices.len(),
                    material: Material::default(),
                    diffuse_map: None,
                    specular_map: None,
                    displ_map: None,
                    normal_map: None,
                    transform: Matrix4::identity(),
                };

                match mesh_data.material(model) {
                    Some(data) => {
                        object.material = data.material;
                        object.diffuse_map = texture(&data.diffuse_map_name);
                        object.specular_map = texture(&data.specular_map_name);
                        object.displ_map = texture(&data.displ_map_name);
                        object.normal_map = texture(&data.normal_map_name);
                    }
                    None if !model.material_data.is_empty() => warn!(
                        "Mesh {} refers to material {} of {}; using default material",
                        mesh_index,
                        mesh_data.material_index,
                        model.material_data.len()
                    ),
                    None => {}
                }
                object
            })
            .collect();

        Self {
            model_id,
            objects,
            animator,
        }
    }

    /// Builds the group for a cached model, or `None` for an unknown id.
    pub fn from_cache(
        cache: &ModelCache,
        model_id: ModelId,
        animator: Option<Box<dyn Animator>>,
    ) -> Option<Self> {
        cache
            .get(model_id)
            .map(|model| Self::new(model_id, model, animator))
    }

    pub fn model_id(&self) -> ModelId {
        self.model_id
    }

    pub fn objects(&self) -> &[RenderObject] {
        &self.objects
    }

    pub fn set_transform(&mut self, transform: Matrix4<f32>) {
        for object in &mut self.objects {
            object.transform = transform;
        }
    }

    pub fn animator_mut(&mut self) -> Option<&mut (dyn Animator + 'static)> {
        self.animator.as_deref_mut()
    }

    pub fn update(&mut self, delta_time: f32) {
        if let Some(animator) = self.animator.as_mut() {
            animator.update(delta_time);
        }
    }

    /// Submits every object. Call between `Effect::begin` and `Effect::end`.
    pub fn draw(&self, effect: &mut dyn Effect) {
        let bones = self.animator.as_ref().and_then(|a| a.bone_transforms());
        for object in &self.objects {
            effect.draw(object, bones);
        }
    }
}

fn texture(name: &str) -> Option<PathBuf> {
    (!name.is_empty()).then(|| PathBuf::from(name))
}

/// Effect that only counts what it is asked to draw.
#[derive(Debug, Default, Clone)]
pub struct DrawStats {
    pub frames: u64,
    pub draw_calls: u64,
    pub indices: u64,
    pub skinned_draws: u64,
    pub last_frame: Option<FrameTransforms>,
    in_frame: bool,
}

impl Effect for DrawStats {
    fn begin(&mut self, frame: &FrameTransforms) {
        self.in_frame = true;
        self.last_frame = Some(*frame);
    }

    fn draw(&mut self, object: &RenderObject, bone_transforms: Option<&[Matrix4<f32>]>) {
        if !self.in_frame {
            warn!("DrawStats: draw outside begin/end");
        }
        trace!(
            "draw mesh {} ({} indices, skinned: {})",
            object.mesh_index,
            object.index_count,
            bone_transforms.is_some()
        );
        self.draw_calls += 1;
        self.indices += object.index_count as u64;
        if bone_transforms.is_some() {
            self.skinned_draws += 1;
        }
    }

    fn end(&mut self) {
        self.in_frame = false;
        self.frames += 1;
    }
}
