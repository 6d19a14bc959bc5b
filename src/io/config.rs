use crate::ui::input::InputSnapshot;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub controls: ControlsConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub headless: HeadlessConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Frames slower than this (seconds) skip their update step.
    #[serde(default = "default_max_frame_time")]
    pub max_frame_time: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            width: default_width(),
            height: default_height(),
            max_frame_time: default_max_frame_time(),
        }
    }
}

fn default_app_name() -> String {
    "Xeph".to_string()
}
fn default_width() -> u32 {
    1280
}
fn default_height() -> u32 {
    720
}
fn default_max_frame_time() -> f32 {
    0.5
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionConfig {
    #[default]
    Perspective,
    Orthographic,
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    #[serde(default)]
    pub look_at: [f32; 3],
    /// Degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default)]
    pub projection: ProjectionConfig,
    /// Orthographic view size; 0 follows the back buffer.
    #[serde(default)]
    pub ortho_width: f32,
    #[serde(default)]
    pub ortho_height: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            look_at: [0.0, 0.0, 0.0],
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
            projection: ProjectionConfig::default(),
            ortho_width: 0.0,
            ortho_height: 0.0,
        }
    }
}

fn default_camera_position() -> [f32; 3] {
    [0.0, 1.0, -5.0]
}
fn default_fov() -> f32 {
    60.0
}
fn default_near() -> f32 {
    0.01
}
fn default_far() -> f32 {
    10000.0
}

#[derive(Debug, Deserialize)]
pub struct ControlsConfig {
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    #[serde(default = "default_boost_speed")]
    pub boost_speed: f32,
    #[serde(default = "default_turn_speed")]
    pub turn_speed: f32,
    /// Degrees of fov per scroll notch.
    #[serde(default = "default_zoom_speed")]
    pub zoom_speed: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            move_speed: default_move_speed(),
            boost_speed: default_boost_speed(),
            turn_speed: default_turn_speed(),
            zoom_speed: default_zoom_speed(),
        }
    }
}

fn default_move_speed() -> f32 {
    2.0
}
fn default_boost_speed() -> f32 {
    10.0
}
fn default_turn_speed() -> f32 {
    0.1
}
fn default_zoom_speed() -> f32 {
    2.0
}

#[derive(Debug, Deserialize)]
pub struct ModelConfig {
    /// `.model` file to show. Without one a ground plane is shown instead.
    pub path: Option<PathBuf>,

    // --- Transform ---
    #[serde(default)]
    pub position: [f32; 3],
    /// Degrees around X, Y, Z.
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: None,
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: default_scale(),
        }
    }
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// A run of identical input frames in a headless script.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptedInput {
    pub frames: u32,
    #[serde(flatten)]
    pub input: InputSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct HeadlessConfig {
    #[serde(default = "default_frames")]
    pub frames: u32,
    /// Seconds per simulated frame.
    #[serde(default = "default_delta_time")]
    pub delta_time: f32,
    #[serde(default)]
    pub input: Vec<ScriptedInput>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            frames: default_frames(),
            delta_time: default_delta_time(),
            input: Vec::new(),
        }
    }
}

impl HeadlessConfig {
    /// Input for the zero-based `frame`; no input once the script runs out.
    pub fn input_for_frame(&self, frame: u32) -> InputSnapshot {
        let mut start = 0u32;
        for step in &self.input {
            let end = start.saturating_add(step.frames);
            if frame < end {
                return step.input.clone();
            }
            start = end;
        }
        InputSnapshot::default()
    }
}

fn default_frames() -> u32 {
    120
}
fn default_delta_time() -> f32 {
    1.0 / 60.0
}
