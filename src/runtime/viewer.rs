use crate::core::math::transform::TransformFactory;
use crate::io::config::{Config, ProjectionConfig};
use crate::runtime::app::{AppControl, AppState};
use crate::scene::camera::{Camera, ProjectionMode, Viewport};
use crate::scene::material::{Material, MaterialData};
use crate::scene::mesh::Mesh;
use crate::scene::model::{MeshData, Model};
use crate::scene::model_cache::{ModelCache, ModelId};
use crate::scene::render_group::{DrawStats, Effect, FrameTransforms, RenderGroup};
use crate::ui::input::{CameraController, InputSnapshot, Key};
use log::{info, trace, warn};
use nalgebra::{Matrix4, Point3, Vector3};
use std::path::PathBuf;

/// Shows one model under a fly camera and counts what would be drawn.
pub struct ViewerState {
    camera: Camera,
    controller: CameraController,
    cache: ModelCache,
    fallback: Option<ModelId>,
    group: Option<RenderGroup>,
    stats: DrawStats,
    model_path: Option<PathBuf>,
    model_transform: Matrix4<f32>,
}

impl ViewerState {
    pub fn from_config(config: &Config) -> Self {
        let cam = &config.camera;
        let position = Point3::from(cam.position);

        let mut camera = Camera::default();
        camera.set_position(position);
        camera.set_look_at(Point3::from(cam.look_at));
        camera.set_fov(cam.fov.to_radians());
        camera.set_clip_planes(cam.near, cam.far);
        camera.set_size(cam.ortho_width, cam.ortho_height);
        camera.set_mode(match cam.projection {
            ProjectionConfig::Perspective => ProjectionMode::Perspective,
            ProjectionConfig::Orthographic => ProjectionMode::Orthographic,
        });

        let controls = &config.controls;
        let controller = CameraController::new(
            controls.move_speed,
            controls.boost_speed,
            controls.turn_speed,
            controls.zoom_speed.to_radians(),
        );

        let model = &config.model;
        let translation = TransformFactory::translation(&Vector3::from(model.position));
        let rotation = TransformFactory::rotation_x(model.rotation[0].to_radians())
            * TransformFactory::rotation_y(model.rotation[1].to_radians())
            * TransformFactory::rotation_z(model.rotation[2].to_radians());
        let scale = TransformFactory::scaling_nonuniform(&Vector3::from(model.scale));

        Self {
            camera,
            controller,
            cache: ModelCache::new(),
            fallback: None,
            group: None,
            stats: DrawStats::default(),
            model_path: model.path.clone(),
            model_transform: translation * rotation * scale,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn stats(&self) -> &DrawStats {
        &self.stats
    }

    pub fn group(&self) -> Option<&RenderGroup> {
        self.group.as_ref()
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }
}

fn ground_plane() -> Model {
    Model::new(
        vec![MeshData::new(Mesh::create_ground_plane(10, 10, 1.0), 0)],
        vec![MaterialData::new(Material::default())],
    )
}

impl AppState for ViewerState {
    fn initialize(&mut self) {
        let loaded = match &self.model_path {
            Some(path) => match self.cache.load(path) {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!("Falling back to ground plane: {e}");
                    None
                }
            },
            None => None,
        };
        let id = match loaded {
            Some(id) => id,
            None => *self
                .fallback
                .get_or_insert_with(|| self.cache.insert(ground_plane())),
        };

        self.group = RenderGroup::from_cache(&self.cache, id, None);
        if let Some(group) = self.group.as_mut() {
            group.set_transform(self.model_transform);
            info!("Viewer ready: {} render objects", group.objects().len());
        }
    }

    fn terminate(&mut self) {
        info!(
            "Viewer drew {} frames, {} draw calls, {} indices",
            self.stats.frames, self.stats.draw_calls, self.stats.indices
        );
        self.group = None;
    }

    fn update(&mut self, delta_time: f32, input: &InputSnapshot, control: &mut AppControl) {
        if input.is_key_held(Key::Escape) {
            control.quit();
        }

        self.controller.update(&mut self.camera, input, delta_time);
        if let Some(group) = self.group.as_mut() {
            group.update(delta_time);
        }
    }

    fn draw(&mut self, viewport: &Viewport) {
        let frame = FrameTransforms::from_camera(&self.camera, viewport);
        self.stats.begin(&frame);
        if let Some(group) = &self.group {
            group.draw(&mut self.stats);
        }
        self.stats.end();
    }

    fn debug_ui(&mut self) {
        let p = self.camera.position();
        trace!(
            "camera at ({:.2}, {:.2}, {:.2}), fov {:.1} deg",
            p.x,
            p.y,
            p.z,
            self.camera.fov().to_degrees()
        );
    }
}
