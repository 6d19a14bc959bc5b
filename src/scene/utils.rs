use crate::scene::model::Model;
use nalgebra::Point3;

/// Axis-aligned bounds of every vertex in the model, or `None` when the
/// model has no vertices.
pub fn bounding_box(model: &Model) -> Option<(Point3<f32>, Point3<f32>)> {
    let mut positions = model
        .mesh_data
        .iter()
        .flat_map(|m| m.mesh.vertices.iter().map(|v| v.position));

    let first = positions.next()?;
    Some(positions.fold((first, first), |(min, max), p| {
        (min.inf(&p), max.sup(&p))
    }))
}

/// Analyzes the model's bounding box and transforms all vertices
/// so that the model is centered at (0,0,0) and fits within [-1, 1].
///
/// Returns the original center and the scaling factor used.
pub fn normalize_and_center_model(model: &mut Model) -> (Point3<f32>, f32) {
    let Some((min_bound, max_bound)) = bounding_box(model) else {
        return (Point3::origin(), 1.0);
    };

    let center = nalgebra::center(&min_bound, &max_bound);
    let extent = max_bound - min_bound;
    let max_dimension = extent.x.max(extent.y).max(extent.z);

    // Scale to fit in [-1, 1] (size 2.0), with a little padding (1.8)
    let scale_factor = if max_dimension > 1e-6 {
        1.8 / max_dimension
    } else {
        1.0
    };

    for mesh_data in &mut model.mesh_data {
        for vertex in &mut mesh_data.mesh.vertices {
            let centered = vertex.position - center;
            vertex.position = Point3::from(centered * scale_factor);
        }
    }

    (center, scale_factor)
}
