use crate::scene::camera::Camera;
use nalgebra::{Vector2, Vector3};
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    LeftShift,
    Escape,
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Input state for one frame, as polled from the platform.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputSnapshot {
    pub keys: HashSet<Key>,
    pub mouse_buttons: HashSet<MouseButton>,
    /// Cursor movement since the last frame, in pixels. +y is screen-down.
    pub mouse_delta: [f32; 2],
    /// Scroll wheel movement since the last frame. +1 per notch away from the user.
    pub scroll: f32,
}

impl InputSnapshot {
    pub fn is_key_held(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    pub fn mouse_delta(&self) -> Vector2<f32> {
        Vector2::from(self.mouse_delta)
    }

    /// -1, 0 or +1 from a pair of opposing keys. `negative` wins when both
    /// are held.
    pub fn axis(&self, negative: Key, positive: Key) -> f32 {
        if self.is_key_held(negative) {
            -1.0
        } else if self.is_key_held(positive) {
            1.0
        } else {
            0.0
        }
    }
}

/// Fly-camera controls: W/S walk, A/D strafe, Q/E lower and raise, hold the
/// right mouse button to look around, scroll to zoom. Left shift moves faster.
#[derive(Debug, Clone)]
pub struct CameraController {
    /// Units per second.
    pub move_speed: f32,
    /// Units per second while left shift is held.
    pub boost_speed: f32,
    /// Radians per pixel per second.
    pub turn_speed: f32,
    /// Radians of fov per scroll notch.
    pub zoom_speed: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            move_speed: 2.0,
            boost_speed: 10.0,
            turn_speed: 0.1,
            zoom_speed: 2.0_f32.to_radians(),
        }
    }
}

impl CameraController {
    pub fn new(move_speed: f32, boost_speed: f32, turn_speed: f32, zoom_speed: f32) -> Self {
        Self {
            move_speed,
            boost_speed,
            turn_speed,
            zoom_speed,
        }
    }

    pub fn update(&self, camera: &mut Camera, input: &InputSnapshot, dt: f32) {
        // --- 1. Mouse look (Right button held) ---
        if input.is_mouse_held(MouseButton::Right) {
            let delta = input.mouse_delta();
            // Dragging right turns right (clockwise from above), dragging down looks down
            camera.yaw(-delta.x * self.turn_speed * dt);
            camera.pitch(-delta.y * self.turn_speed * dt);
        }

        // --- 2. Scroll to zoom ---
        if input.scroll != 0.0 {
            camera.zoom(input.scroll * self.zoom_speed);
        }

        // --- 3. Keyboard movement ---
        let move_axis = Vector3::new(
            input.axis(Key::A, Key::D),
            input.axis(Key::Q, Key::E),
            input.axis(Key::S, Key::W),
        );
        if move_axis == Vector3::zeros() {
            return;
        }

        let speed = if input.is_key_held(Key::LeftShift) {
            self.boost_speed
        } else {
            self.move_speed
        };
        let step = move_axis.normalize() * speed * dt;

        camera.walk(step.z);
        camera.strafe(step.x);
        camera.rise(step.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn holding(keys: &[Key]) -> InputSnapshot {
        InputSnapshot {
            keys: keys.iter().copied().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn walk_forward_at_move_speed() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        controller.update(&mut camera, &holding(&[Key::W]), 0.5);
        assert_relative_eq!(camera.position().z, 1.0);
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        controller.update(&mut camera, &holding(&[Key::W, Key::D, Key::LeftShift]), 1.0);
        assert_relative_eq!(camera.position().coords.norm(), 10.0, epsilon = 1e-5);
        // Right of +Z is -X
        assert!(camera.position().x < 0.0);
    }

    #[test]
    fn mouse_look_requires_right_button() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        let mut input = InputSnapshot {
            mouse_delta: [10.0, 0.0],
            ..Default::default()
        };
        controller.update(&mut camera, &input, 1.0);
        assert_eq!(*camera.direction(), Vector3::z());

        input.mouse_buttons.insert(MouseButton::Right);
        controller.update(&mut camera, &input, 1.0);
        // Dragging right turns toward the camera's right (-X)
        assert!(camera.direction().x < 0.0);
    }

    #[test]
    fn mouse_down_looks_down() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        let input = InputSnapshot {
            mouse_buttons: [MouseButton::Right].into_iter().collect(),
            mouse_delta: [0.0, 5.0],
            ..Default::default()
        };
        controller.update(&mut camera, &input, 1.0);
        assert!(camera.direction().y < 0.0);
    }

    #[test]
    fn opposing_keys_resolve_to_backward() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        controller.update(&mut camera, &holding(&[Key::W, Key::S]), 1.0);
        assert_relative_eq!(camera.position().z, -2.0);
    }

    #[test]
    fn scroll_zooms_in() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        let fov = camera.fov();
        let input = InputSnapshot {
            scroll: 1.0,
            ..Default::default()
        };
        controller.update(&mut camera, &input, 1.0);
        assert!(camera.fov() < fov);
    }
}
