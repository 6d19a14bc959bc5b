use nalgebra::{Matrix4, Point3, Vector3};

//=================================
// Transform Matrix Factory
//=================================

/// Factory for the transformation matrices used by the engine.
/// Written out by hand to pin the coordinate system down (Right-Handed,
/// view space looks down -Z, clip depth in [-1, 1]).
pub struct TransformFactory;

#[rustfmt::skip]
impl TransformFactory {
    /// Creates a rotation matrix around an arbitrary axis using Rodrigues' rotation formula.
    pub fn rotation(axis: &Vector3<f32>, angle_rad: f32) -> Matrix4<f32> {
        let axis_unit = axis.normalize();
        let x = axis_unit.x;
        let y = axis_unit.y;
        let z = axis_unit.z;
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        let t = 1.0 - c;

        Matrix4::new(
            t * x * x + c,     t * x * y - z * s, t * x * z + y * s, 0.0,
            t * x * y + z * s, t * y * y + c,     t * y * z - x * s, 0.0,
            t * x * z - y * s, t * y * z + x * s, t * z * z + c,     0.0,
            0.0,               0.0,               0.0,               1.0,
        )
    }

    /// Creates a rotation matrix around the X-axis.
    pub fn rotation_x(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c,  -s,   0.0,
            0.0, s,   c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a rotation matrix around the Y-axis.
    pub fn rotation_y(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            c,   0.0, s,   0.0,
            0.0, 1.0, 0.0, 0.0,
           -s,   0.0, c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a rotation matrix around the Z-axis.
    pub fn rotation_z(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            c,  -s,   0.0, 0.0,
            s,   c,   0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a translation matrix.
    pub fn translation(translation: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            1.0, 0.0, 0.0, translation.x,
            0.0, 1.0, 0.0, translation.y,
            0.0, 0.0, 1.0, translation.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a non-uniform scaling matrix.
    pub fn scaling_nonuniform(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            scale.x, 0.0,     0.0,     0.0,
            0.0,     scale.y, 0.0,     0.0,
            0.0,     0.0,     scale.z, 0.0,
            0.0,     0.0,     0.0,     1.0,
        )
    }

    /// Creates a View matrix from an eye position and a forward direction.
    ///
    /// `forward` must not be parallel to `up`; the caller keeps that invariant.
    pub fn look_to(eye: &Point3<f32>, forward: &Vector3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
        // In RHS the camera looks down -Z, so +Z points back at the viewer
        let z_axis = -forward.normalize();
        let x_axis = up.cross(&z_axis).normalize();
        let y_axis = z_axis.cross(&x_axis);

        // Rotation matrix from world to view
        let rotation = Matrix4::new(
            x_axis.x, x_axis.y, x_axis.z, 0.0,
            y_axis.x, y_axis.y, y_axis.z, 0.0,
            z_axis.x, z_axis.y, z_axis.z, 0.0,
            0.0,      0.0,      0.0,      1.0,
        );

        // Translation matrix to move camera to origin
        let translation = Self::translation(&-eye.coords);

        rotation * translation
    }

    /// Creates a View matrix (Look-At, Right-Handed).
    pub fn view(eye: &Point3<f32>, target: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
        Self::look_to(eye, &(target - eye), up)
    }

    /// Creates a Perspective Projection matrix (Right-Handed).
    /// Maps view frustum to NDC [-1, 1].
    pub fn perspective(aspect_ratio: f32, fov_y_rad: f32, near: f32, far: f32) -> Matrix4<f32> {
        let f = 1.0 / (fov_y_rad / 2.0).tan();
        let nf = 1.0 / (near - far);

        Matrix4::new(
            f / aspect_ratio, 0.0, 0.0,                          0.0,
            0.0,              f,   0.0,                          0.0,
            0.0,              0.0, (far + near) * nf,            2.0 * far * near * nf,
            0.0,              0.0, -1.0,                         0.0,
        )
    }

    /// Creates an Orthographic Projection matrix (Right-Handed).
    pub fn orthographic(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Matrix4<f32> {
        let rl = 1.0 / (right - left);
        let tb = 1.0 / (top - bottom);
        let nf = 1.0 / (near - far);

        Matrix4::new(
            2.0 * rl,      0.0,           0.0,          -(right + left) * rl,
            0.0,           2.0 * tb,      0.0,          -(top + bottom) * tb,
            0.0,           0.0,           2.0 * nf,     (far + near) * nf,
            0.0,           0.0,           0.0,          1.0,
        )
    }
}

//=================================
// Direction helpers
//=================================

/// Rotates a direction vector around `axis` by `angle_rad`.
#[inline]
pub fn rotate_vector(v: &Vector3<f32>, axis: &Vector3<f32>, angle_rad: f32) -> Vector3<f32> {
    TransformFactory::rotation(axis, angle_rad).transform_vector(v)
}

/// Elevation of a direction above the XZ plane, in radians.
#[inline]
pub fn elevation(direction: &Vector3<f32>) -> f32 {
    let n = direction.normalize();
    n.y.clamp(-1.0, 1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn look_to_maps_eye_to_origin() {
        let eye = Point3::new(1.0, 2.0, 3.0);
        let view = TransformFactory::look_to(&eye, &Vector3::z(), &Vector3::y());
        let p = view.transform_point(&eye);
        assert_relative_eq!(p.coords, Vector3::zeros(), epsilon = 1e-6);
    }

    #[test]
    fn look_to_puts_forward_on_negative_z() {
        let view = TransformFactory::look_to(&Point3::origin(), &Vector3::z(), &Vector3::y());
        let ahead = view.transform_point(&Point3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(ahead.z, -5.0, epsilon = 1e-6);
        assert_relative_eq!(view.determinant(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn view_matches_look_to() {
        let eye = Point3::new(0.0, 1.0, -5.0);
        let target = Point3::origin();
        let a = TransformFactory::view(&eye, &target, &Vector3::y());
        let b = TransformFactory::look_to(&eye, &(target - eye), &Vector3::y());
        assert_relative_eq!(a, b, epsilon = 1e-6);
    }

    #[test]
    fn rotate_vector_about_y() {
        let v = rotate_vector(&Vector3::z(), &Vector3::y(), FRAC_PI_2);
        assert_relative_eq!(v, Vector3::x(), epsilon = 1e-6);
    }

    #[test]
    fn perspective_maps_near_and_far_planes() {
        let proj = TransformFactory::perspective(1.0, FRAC_PI_2, 1.0, 10.0);
        let near = proj * nalgebra::Vector4::new(0.0, 0.0, -1.0, 1.0);
        let far = proj * nalgebra::Vector4::new(0.0, 0.0, -10.0, 1.0);
        assert_relative_eq!(near.z / near.w, -1.0, epsilon = 1e-5);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn orthographic_maps_box_corners() {
        let proj = TransformFactory::orthographic(-2.0, 2.0, -1.0, 1.0, 0.5, 5.0);
        let corner = proj.transform_point(&Point3::new(2.0, 1.0, -5.0));
        assert_relative_eq!(corner.coords, Vector3::new(1.0, 1.0, 1.0), epsilon = 1e-6);
    }
}
