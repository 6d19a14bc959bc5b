use nalgebra::{Point3, Vector2, Vector3};

/// Represents a single vertex in 3D space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in local object space.
    pub position: Point3<f32>,
    /// Normal vector for lighting calculations.
    pub normal: Vector3<f32>,
    /// Tangent vector (xyz) for normal mapping.
    pub tangent: Vector3<f32>,
    /// Texture coordinates (UV).
    pub uv: Vector2<f32>,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            normal: Vector3::zeros(),
            tangent: Vector3::zeros(),
            uv: Vector2::zeros(),
        }
    }
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, uv: Vector2<f32>) -> Self {
        Self {
            position,
            normal,
            tangent: Vector3::zeros(),
            uv,
        }
    }

    pub fn with_tangent(mut self, tangent: Vector3<f32>) -> Self {
        self.tangent = tangent;
        self
    }

    /// The eleven scalars in storage order: position, normal, tangent, uv.
    pub fn to_array(&self) -> [f32; 11] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.normal.x,
            self.normal.y,
            self.normal.z,
            self.tangent.x,
            self.tangent.y,
            self.tangent.z,
            self.uv.x,
            self.uv.y,
        ]
    }

    /// Inverse of [`Vertex::to_array`].
    pub fn from_array(v: &[f32; 11]) -> Self {
        Self {
            position: Point3::new(v[0], v[1], v[2]),
            normal: Vector3::new(v[3], v[4], v[5]),
            tangent: Vector3::new(v[6], v[7], v[8]),
            uv: Vector2::new(v[9], v[10]),
        }
    }
}
