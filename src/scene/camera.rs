use crate::core::math::transform::{TransformFactory, elevation, rotate_vector};
use log::warn;
use nalgebra::{Matrix4, Point3, Vector3};

/// The camera's up axis. Directions are kept away from it.
pub const WORLD_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

/// Largest angle, in degrees, the view direction may make with the XZ plane.
pub const MAX_ELEVATION_DEG: f32 = 89.0;

/// Field of view limits for `zoom` and `set_fov`, in degrees.
pub const MIN_FOV_DEG: f32 = 10.0;
pub const MAX_FOV_DEG: f32 = 170.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

/// Supplies the render target size that zero-valued camera parameters
/// fall back to.
pub trait BackBuffer {
    /// (width, height) in pixels.
    fn back_buffer_size(&self) -> (u32, u32);
}

/// Fixed-size render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl BackBuffer for Viewport {
    fn back_buffer_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Free-fly camera with Y as the up axis.
///
/// Matrices are derived on demand from the current state. The view direction
/// is always unit length and never closer than [`MAX_ELEVATION_DEG`] to
/// straight up or straight down, so the view basis is always well defined.
#[derive(Debug, Clone)]
pub struct Camera {
    mode: ProjectionMode,

    position: Point3<f32>,
    direction: Vector3<f32>,

    /// Vertical field of view in radians.
    fov: f32,
    /// 0 = use the back buffer's aspect ratio.
    aspect_ratio: f32,

    /// Orthographic view volume. 0 = use the back buffer dimension.
    width: f32,
    height: f32,

    near_plane: f32,
    far_plane: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            mode: ProjectionMode::Perspective,
            position: Point3::origin(),
            direction: Vector3::z(),
            fov: 60.0_f32.to_radians(),
            aspect_ratio: 0.0,
            width: 0.0,
            height: 0.0,
            near_plane: 0.01,
            far_plane: 10000.0,
        }
    }
}

impl Camera {
    pub fn new(position: Point3<f32>, direction: Vector3<f32>) -> Self {
        let mut camera = Self::default();
        camera.set_position(position);
        camera.set_direction(direction);
        camera
    }

    // ============ State ============

    pub fn set_mode(&mut self, mode: ProjectionMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn set_position(&mut self, position: Point3<f32>) {
        if !position.iter().all(|v| v.is_finite()) {
            warn!("Camera: ignoring non-finite position {:?}", position);
            return;
        }
        self.position = position;
    }

    /// Points the camera along `direction`. Zero-length input is ignored;
    /// directions steeper than the elevation limit are pulled back to it.
    pub fn set_direction(&mut self, direction: Vector3<f32>) {
        match constrain_direction(&direction, &self.direction) {
            Some(d) => self.direction = d,
            None => warn!("Camera: ignoring degenerate direction {:?}", direction),
        }
    }

    /// Points the camera at `target`. A target at the camera position is ignored.
    pub fn set_look_at(&mut self, target: Point3<f32>) {
        self.set_direction(target - self.position);
    }

    pub fn set_fov(&mut self, fov: f32) {
        if !fov.is_finite() {
            warn!("Camera: ignoring non-finite fov");
            return;
        }
        self.fov = fov.clamp(MIN_FOV_DEG.to_radians(), MAX_FOV_DEG.to_radians());
    }

    /// 0 selects the back buffer aspect ratio.
    pub fn set_aspect_ratio(&mut self, ratio: f32) {
        if !(ratio >= 0.0 && ratio.is_finite()) {
            warn!("Camera: ignoring aspect ratio {ratio}");
            return;
        }
        self.aspect_ratio = ratio;
    }

    /// Orthographic view volume size. 0 in either dimension selects the back
    /// buffer dimension.
    pub fn set_size(&mut self, width: f32, height: f32) {
        if !(width >= 0.0 && height >= 0.0 && width.is_finite() && height.is_finite()) {
            warn!("Camera: ignoring orthographic size {width}x{height}");
            return;
        }
        self.width = width;
        self.height = height;
    }

    /// Rejected unless `0 < near < far`.
    pub fn set_near_plane(&mut self, near_plane: f32) {
        if !(near_plane > 0.0 && near_plane < self.far_plane) {
            warn!(
                "Camera: near plane {near_plane} outside (0, {})",
                self.far_plane
            );
            return;
        }
        self.near_plane = near_plane;
    }

    /// Rejected unless `far > near`.
    pub fn set_far_plane(&mut self, far_plane: f32) {
        if !(far_plane > self.near_plane && far_plane.is_finite()) {
            warn!(
                "Camera: far plane {far_plane} not beyond near plane {}",
                self.near_plane
            );
            return;
        }
        self.far_plane = far_plane;
    }

    /// Sets both clip planes at once, so a move past the old range on either
    /// side is not rejected half way.
    pub fn set_clip_planes(&mut self, near_plane: f32, far_plane: f32) {
        if !(near_plane > 0.0 && far_plane > near_plane && far_plane.is_finite()) {
            warn!("Camera: invalid clip planes [{near_plane}, {far_plane}]");
            return;
        }
        self.near_plane = near_plane;
        self.far_plane = far_plane;
    }

    pub fn position(&self) -> &Point3<f32> {
        &self.position
    }

    /// Unit view direction.
    pub fn direction(&self) -> &Vector3<f32> {
        &self.direction
    }

    /// Unit vector to the camera's right.
    pub fn right(&self) -> Vector3<f32> {
        self.direction.cross(&WORLD_UP).normalize()
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn near_plane(&self) -> f32 {
        self.near_plane
    }

    pub fn far_plane(&self) -> f32 {
        self.far_plane
    }

    /// The configured aspect ratio, or the back buffer's when it is 0.
    pub fn aspect_ratio(&self, back_buffer: &impl BackBuffer) -> f32 {
        if self.aspect_ratio > 0.0 {
            return self.aspect_ratio;
        }
        let (width, height) = back_buffer.back_buffer_size();
        if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }

    // ============ Translation ============

    /// Moves along the view direction.
    pub fn walk(&mut self, distance: f32) {
        self.translate(self.direction * distance);
    }

    /// Moves along the right vector; negative goes left.
    pub fn strafe(&mut self, distance: f32) {
        self.translate(self.right() * distance);
    }

    /// Moves along the world up axis.
    pub fn rise(&mut self, distance: f32) {
        self.translate(WORLD_UP * distance);
    }

    fn translate(&mut self, offset: Vector3<f32>) {
        let moved = self.position + offset;
        if !moved.iter().all(|v| v.is_finite()) {
            warn!("Camera: ignoring move by {:?}", offset);
            return;
        }
        self.position = moved;
    }

    // ============ Rotation ============

    /// Turns around the world up axis. Positive is counter-clockwise seen
    /// from above.
    pub fn yaw(&mut self, radian: f32) {
        if !radian.is_finite() {
            return;
        }
        self.direction = rotate_vector(&self.direction, &WORLD_UP, radian).normalize();
    }

    /// Tilts around the right axis. Positive looks up. The resulting
    /// elevation is clamped to ±[`MAX_ELEVATION_DEG`].
    pub fn pitch(&mut self, radian: f32) {
        if !radian.is_finite() {
            return;
        }
        let limit = MAX_ELEVATION_DEG.to_radians();
        let current = elevation(&self.direction);
        let delta = (current + radian).clamp(-limit, limit) - current;
        if delta == 0.0 {
            return;
        }
        let right = self.right();
        self.direction = rotate_vector(&self.direction, &right, delta).normalize();
    }

    /// Narrows the field of view by `amount` radians (negative widens it).
    pub fn zoom(&mut self, amount: f32) {
        if !amount.is_finite() {
            return;
        }
        self.fov = (self.fov - amount).clamp(MIN_FOV_DEG.to_radians(), MAX_FOV_DEG.to_radians());
    }

    // ============ Matrices ============

    pub fn view_matrix(&self) -> Matrix4<f32> {
        TransformFactory::look_to(&self.position, &self.direction, &WORLD_UP)
    }

    pub fn projection_matrix(&self, back_buffer: &impl BackBuffer) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => self.perspective_matrix(back_buffer),
            ProjectionMode::Orthographic => self.orthographic_matrix(back_buffer),
        }
    }

    pub fn perspective_matrix(&self, back_buffer: &impl BackBuffer) -> Matrix4<f32> {
        TransformFactory::perspective(
            self.aspect_ratio(back_buffer),
            self.fov,
            self.near_plane,
            self.far_plane,
        )
    }

    pub fn orthographic_matrix(&self, back_buffer: &impl BackBuffer) -> Matrix4<f32> {
        let (bb_width, bb_height) = back_buffer.back_buffer_size();
        let width = extent_or(self.width, bb_width);
        let height = extent_or(self.height, bb_height);
        TransformFactory::orthographic(
            -width / 2.0,
            width / 2.0,
            -height / 2.0,
            height / 2.0,
            self.near_plane,
            self.far_plane,
        )
    }
}

/// `value` when set, else the back buffer dimension, else 1.
fn extent_or(value: f32, fallback: u32) -> f32 {
    if value > 0.0 {
        value
    } else if fallback > 0 {
        fallback as f32
    } else {
        1.0
    }
}

/// Normalizes `direction` and pulls its elevation inside the allowed range,
/// keeping its heading. A straight vertical input borrows the heading of
/// `previous`. Returns `None` for zero-length or non-finite input.
fn constrain_direction(direction: &Vector3<f32>, previous: &Vector3<f32>) -> Option<Vector3<f32>> {
    let length = direction.norm();
    if !(length > 1e-6 && length.is_finite()) {
        return None;
    }
    let d = direction / length;

    let limit = MAX_ELEVATION_DEG.to_radians();
    let current = elevation(&d);
    if current.abs() <= limit {
        return Some(d);
    }

    let heading = horizontal(&d)
        .or_else(|| horizontal(previous))
        .unwrap_or_else(Vector3::z);
    let clamped = current.clamp(-limit, limit);
    Some(heading * clamped.cos() + WORLD_UP * clamped.sin())
}

fn horizontal(v: &Vector3<f32>) -> Option<Vector3<f32>> {
    let flat = Vector3::new(v.x, 0.0, v.z);
    let length = flat.norm();
    (length > 1e-6).then(|| flat / length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    const SCREEN: Viewport = Viewport {
        width: 1280,
        height: 720,
    };

    #[test]
    fn defaults() {
        let camera = Camera::default();
        assert_eq!(camera.mode(), ProjectionMode::Perspective);
        assert_eq!(*camera.position(), Point3::origin());
        assert_eq!(*camera.direction(), Vector3::z());
        assert_relative_eq!(camera.fov(), 60.0_f32.to_radians());
        assert_relative_eq!(camera.near_plane(), 0.01);
        assert_relative_eq!(camera.far_plane(), 10000.0);
    }

    #[test]
    fn walk_strafe_rise_directions() {
        let mut camera = Camera::default();
        camera.walk(2.0);
        assert_relative_eq!(camera.position().coords, Vector3::new(0.0, 0.0, 2.0));

        // Looking down +Z in a right-handed frame, right is -X
        camera.strafe(1.0);
        assert_relative_eq!(camera.position().coords, Vector3::new(-1.0, 0.0, 2.0));

        camera.rise(-0.5);
        assert_relative_eq!(camera.position().coords, Vector3::new(-1.0, -0.5, 2.0));

        camera.walk(-2.0);
        assert_relative_eq!(camera.position().coords, Vector3::new(-1.0, -0.5, 0.0));
    }

    #[test]
    fn non_finite_moves_are_ignored() {
        let mut camera = Camera::default();
        camera.set_position(Point3::new(1.0, 2.0, 3.0));
        camera.walk(f32::NAN);
        camera.strafe(f32::INFINITY);
        camera.rise(f32::NEG_INFINITY);
        camera.set_position(Point3::new(0.0, f32::NAN, 0.0));

        assert_eq!(*camera.position(), Point3::new(1.0, 2.0, 3.0));
        assert!(camera.view_matrix().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn yaw_quarter_turn() {
        let mut camera = Camera::default();
        camera.yaw(FRAC_PI_2);
        assert_relative_eq!(*camera.direction(), Vector3::x(), epsilon = 1e-6);
        camera.yaw(-PI);
        assert_relative_eq!(*camera.direction(), -Vector3::x(), epsilon = 1e-6);
    }

    #[test]
    fn pitch_up_is_positive_and_clamped() {
        let mut camera = Camera::default();
        camera.pitch(0.25);
        assert!(camera.direction().y > 0.0);
        assert_relative_eq!(elevation(camera.direction()), 0.25, epsilon = 1e-5);

        camera.pitch(10.0);
        assert_relative_eq!(
            elevation(camera.direction()),
            MAX_ELEVATION_DEG.to_radians(),
            epsilon = 1e-4
        );
        // Heading survives the clamp
        assert!(camera.direction().z > 0.0);
        assert_relative_eq!(camera.direction().x, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn look_at_self_keeps_direction() {
        let mut camera = Camera::default();
        camera.set_position(Point3::new(1.0, 2.0, 3.0));
        camera.set_look_at(Point3::new(1.0, 2.0, 3.0));
        assert_eq!(*camera.direction(), Vector3::z());
    }

    #[test]
    fn look_at_normalizes() {
        let mut camera = Camera::default();
        camera.set_position(Point3::new(0.0, 1.0, -5.0));
        camera.set_look_at(Point3::origin());
        assert_relative_eq!(camera.direction().norm(), 1.0, epsilon = 1e-6);
        assert!(camera.direction().z > 0.0 && camera.direction().y < 0.0);
    }

    #[test]
    fn vertical_direction_is_pulled_off_the_pole() {
        let mut camera = Camera::default();
        camera.set_direction(Vector3::new(0.0, 5.0, 0.0));
        let d = *camera.direction();
        assert_relative_eq!(elevation(&d), MAX_ELEVATION_DEG.to_radians(), epsilon = 1e-4);
        // Borrowed the previous +Z heading
        assert!(d.z > 0.0);
    }

    #[test]
    fn projection_follows_mode() {
        let mut camera = Camera::default();
        assert_eq!(
            camera.projection_matrix(&SCREEN),
            camera.perspective_matrix(&SCREEN)
        );
        camera.set_mode(ProjectionMode::Orthographic);
        assert_eq!(
            camera.projection_matrix(&SCREEN),
            camera.orthographic_matrix(&SCREEN)
        );
    }

    #[test]
    fn zero_parameters_use_back_buffer() {
        let mut camera = Camera::default();
        assert_relative_eq!(camera.aspect_ratio(&SCREEN), 1280.0 / 720.0);

        let ortho = camera.orthographic_matrix(&SCREEN);
        assert_relative_eq!(ortho[(0, 0)], 2.0 / 1280.0);
        assert_relative_eq!(ortho[(1, 1)], 2.0 / 720.0);

        camera.set_aspect_ratio(2.0);
        camera.set_size(10.0, 5.0);
        assert_relative_eq!(camera.aspect_ratio(&SCREEN), 2.0);
        let ortho = camera.orthographic_matrix(&SCREEN);
        assert_relative_eq!(ortho[(0, 0)], 0.2);
        assert_relative_eq!(ortho[(1, 1)], 0.4);
    }

    #[test]
    fn empty_back_buffer_falls_back_to_unit() {
        let camera = Camera::default();
        let empty = Viewport::new(0, 0);
        assert_relative_eq!(camera.aspect_ratio(&empty), 1.0);
        let ortho = camera.orthographic_matrix(&empty);
        assert!(ortho.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn invalid_clip_planes_are_rejected() {
        let mut camera = Camera::default();
        camera.set_near_plane(-1.0);
        camera.set_near_plane(20000.0);
        camera.set_far_plane(0.001);
        assert_relative_eq!(camera.near_plane(), 0.01);
        assert_relative_eq!(camera.far_plane(), 10000.0);

        camera.set_clip_planes(20000.0, 30000.0);
        assert_relative_eq!(camera.near_plane(), 20000.0);
        assert_relative_eq!(camera.far_plane(), 30000.0);
    }

    #[test]
    fn zoom_narrows_and_clamps() {
        let mut camera = Camera::default();
        camera.zoom(10.0_f32.to_radians());
        assert_relative_eq!(camera.fov(), 50.0_f32.to_radians(), epsilon = 1e-6);
        camera.zoom(10.0);
        assert_relative_eq!(camera.fov(), MIN_FOV_DEG.to_radians());
        camera.zoom(-10.0);
        assert_relative_eq!(camera.fov(), MAX_FOV_DEG.to_radians());
    }
}
