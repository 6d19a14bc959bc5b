use crate::core::geometry::Vertex;
use nalgebra::{Point3, Vector2, Vector3};

/// A collection of vertices and indices representing a 3D object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// List of vertices. Insertion order is render order.
    pub vertices: Vec<Vertex>,
    /// Indices into `vertices`, 3 per triangle.
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Windowed triangle dump: one triple per index position from the third
    /// index on, made of that index and the two before it.
    ///
    /// This is *not* a partition of the index buffer into triangles. A mesh
    /// with `n >= 2` indices yields `n - 2` overlapping windows; this is the
    /// triangle line layout of the `.model` format and must stay this way for
    /// files to keep loading.
    pub fn triangle_windows(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.windows(3).map(|w| [w[0], w[1], w[2]])
    }

    /// Number of triangles in the index buffer read as a flat triangle list.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when every index refers to an existing vertex.
    pub fn has_valid_indices(&self) -> bool {
        let count = self.vertices.len();
        self.indices.iter().all(|&i| (i as usize) < count)
    }

    /// Creates a simple triangle mesh for testing purposes.
    ///
    /// Vertices are arranged in Counter-Clockwise (CCW) order.
    pub fn create_test_triangle() -> Self {
        let normal = Vector3::new(0.0, 0.0, 1.0); // Facing Z+
        let vertices = vec![
            Vertex::new(Point3::new(0.0, 0.5, 0.0), normal, Vector2::new(0.5, 1.0)),
            Vertex::new(Point3::new(-0.5, -0.5, 0.0), normal, Vector2::new(0.0, 0.0)),
            Vertex::new(Point3::new(0.5, -0.5, 0.0), normal, Vector2::new(1.0, 0.0)),
        ];

        Self::new(vertices, vec![0, 1, 2])
    }

    /// Creates a `size` x `size` quad in the XY plane, centered on the origin.
    pub fn create_quad(size: f32) -> Self {
        let h = size * 0.5;
        let normal = Vector3::new(0.0, 0.0, -1.0);
        let tangent = Vector3::new(1.0, 0.0, 0.0);
        let vertices = vec![
            Vertex::new(Point3::new(-h, h, 0.0), normal, Vector2::new(0.0, 0.0)).with_tangent(tangent),
            Vertex::new(Point3::new(h, h, 0.0), normal, Vector2::new(1.0, 0.0)).with_tangent(tangent),
            Vertex::new(Point3::new(h, -h, 0.0), normal, Vector2::new(1.0, 1.0)).with_tangent(tangent),
            Vertex::new(Point3::new(-h, -h, 0.0), normal, Vector2::new(0.0, 1.0)).with_tangent(tangent),
        ];

        Self::new(vertices, vec![0, 1, 2, 0, 2, 3])
    }

    /// Creates a flat grid on the XZ plane with `rows` x `cols` cells.
    pub fn create_ground_plane(rows: u32, cols: u32, spacing: f32) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let width = cols as f32 * spacing;
        let depth = rows as f32 * spacing;
        let normal = Vector3::y();
        let tangent = Vector3::x();

        let mut vertices = Vec::with_capacity(((rows + 1) * (cols + 1)) as usize);
        for r in 0..=rows {
            for c in 0..=cols {
                let u = c as f32 / cols as f32;
                let v = r as f32 / rows as f32;
                let position = Point3::new(-0.5 * width + u * width, 0.0, 0.5 * depth - v * depth);
                vertices.push(Vertex::new(position, normal, Vector2::new(u, v)).with_tangent(tangent));
            }
        }

        let stride = cols + 1;
        let mut indices = Vec::with_capacity((rows * cols * 6) as usize);
        for r in 0..rows {
            for c in 0..cols {
                let i0 = r * stride + c;
                let i1 = i0 + 1;
                let i2 = i0 + stride;
                let i3 = i2 + 1;
                indices.extend_from_slice(&[i0, i2, i3, i0, i3, i1]);
            }
        }

        Self::new(vertices, indices)
    }
}
