use approx::assert_relative_eq;
use nalgebra::{Point3, Vector2, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use xeph::core::color::rgba;
use xeph::core::geometry::Vertex;
use xeph::io::model_io::{self, ModelIoError, material_path};
use xeph::scene::material::{Material, MaterialData};
use xeph::scene::mesh::Mesh;
use xeph::scene::model::{MeshData, Model};

fn triangle_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            fields.len() == 3 && fields.iter().all(|f| f.parse::<u32>().is_ok())
        })
        .map(str::to_string)
        .collect()
}

fn random_vertex(rng: &mut StdRng) -> Vertex {
    let mut v = || rng.random_range(-100.0f32..100.0);
    Vertex::new(
        Point3::new(v(), v(), v()),
        Vector3::new(v(), v(), v()),
        Vector2::new(v(), v()),
    )
    .with_tangent(Vector3::new(v(), v(), v()))
}

fn random_model(rng: &mut StdRng) -> Model {
    let mesh_count = rng.random_range(1..5);
    let mesh_data = (0..mesh_count)
        .map(|_| {
            let vertex_count = rng.random_range(1..20);
            let vertices = (0..vertex_count).map(|_| random_vertex(rng)).collect();
            let index_count = rng.random_range(3..40);
            let indices = (0..index_count)
                .map(|_| rng.random_range(0..vertex_count as u32))
                .collect();
            MeshData::new(Mesh::new(vertices, indices), rng.random_range(-1..4))
        })
        .collect();
    Model::new(mesh_data, vec![])
}

#[test]
fn quad_round_trip_keeps_the_windowed_dump() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quad.model");
    let model = Model::new(vec![MeshData::new(Mesh::create_quad(1.0), 0)], vec![]);

    model_io::save_model(&path, &model).unwrap();
    assert_eq!(
        triangle_lines(&path),
        ["0 1 2", "1 2 0", "2 0 2", "0 2 3"]
    );

    let mut loaded = Model::default();
    model_io::load_model(&path, &mut loaded).unwrap();

    let mesh_data = &loaded.mesh_data[0];
    assert_eq!(mesh_data.material_index, 0);
    for (a, b) in mesh_data.mesh.vertices.iter().zip(&model.mesh_data[0].mesh.vertices) {
        assert_relative_eq!(a.position, b.position, epsilon = 1e-5);
    }
    let windows: Vec<[u32; 3]> = mesh_data.mesh.triangle_windows().collect();
    assert_eq!(windows, [[0, 1, 2], [1, 2, 0], [2, 0, 2], [0, 2, 3]]);
}

#[test]
fn random_models_round_trip_exactly() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let dir = tempdir().unwrap();

    for i in 0..20 {
        let path = dir.path().join(format!("random_{i}.model"));
        let model = random_model(&mut rng);
        model_io::save_model(&path, &model).unwrap();

        let mut loaded = Model::default();
        model_io::load_model(&path, &mut loaded).unwrap();
        assert_eq!(loaded.mesh_data.len(), model.mesh_data.len());

        for (a, b) in loaded.mesh_data.iter().zip(&model.mesh_data) {
            assert_eq!(a.material_index, b.material_index);
            assert_eq!(a.mesh.vertices, b.mesh.vertices);
            assert!(a.mesh.triangle_windows().eq(b.mesh.triangle_windows()));
        }

        // Saving what was loaded gives the same file
        let again = dir.path().join(format!("random_{i}_again.model"));
        model_io::save_model(&again, &loaded).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), fs::read_to_string(&again).unwrap());
    }
}

#[test]
fn material_round_trip_resolves_textures_next_to_the_sidecar() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crate.model");

    let mut textured = MaterialData::new(Material {
        ambient: rgba(0.1, 0.2, 0.3, 1.0),
        diffuse: rgba(0.8, 0.7, 0.6, 0.5),
        specular: rgba(0.25, 0.25, 0.25, 1.0),
        emissive: rgba(0.0, 0.0, 0.0, 1.0),
        power: 12.5,
    });
    textured.diffuse_map_name = "crate_diffuse.png".to_string();
    textured.normal_map_name = "crate_normal.png".to_string();
    let plain = MaterialData::new(Material::default());
    let model = Model::new(vec![], vec![textured.clone(), plain.clone()]);

    model_io::save_material(&path, &model).unwrap();
    let text = fs::read_to_string(material_path(&path)).unwrap();
    assert!(text.starts_with("Material Count: 2\n"));
    assert_eq!(text.matches("<none>").count(), 2 + 4);

    let mut loaded = Model::default();
    model_io::load_material(&path, &mut loaded).unwrap();
    assert_eq!(loaded.material_data.len(), 2);

    let first = &loaded.material_data[0];
    assert_eq!(first.material, textured.material);
    assert_eq!(
        Path::new(&first.diffuse_map_name),
        dir.path().join("crate_diffuse.png")
    );
    assert_eq!(
        Path::new(&first.normal_map_name),
        dir.path().join("crate_normal.png")
    );
    assert!(first.specular_map_name.is_empty());
    assert!(first.displ_map_name.is_empty());
    assert_eq!(loaded.material_data[1], plain);
}

#[test]
fn empty_saves_create_no_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.model");
    let model = Model::default();

    let err = model_io::save_model(&path, &model).unwrap_err();
    assert!(matches!(err, ModelIoError::NoMeshData));
    let err = model_io::save_material(&path, &model).unwrap_err();
    assert!(matches!(err, ModelIoError::NoMaterialData));

    assert!(!path.exists());
    assert!(!material_path(&path).exists());
}

#[test]
fn texture_names_with_whitespace_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("spaced.model");
    let mut data = MaterialData::new(Material::default());
    data.specular_map_name = "old brick.png".to_string();
    let model = Model::new(vec![], vec![MaterialData::new(Material::default()), data]);

    let err = model_io::save_material(&path, &model).unwrap_err();
    assert!(matches!(err, ModelIoError::InvalidTextureName { ref name } if name == "old brick.png"));
    assert!(!err.is_skip());
    assert!(!material_path(&path).exists());
}

#[test]
fn empty_save_leaves_existing_file_alone() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("keep.model");
    fs::write(&path, "precious").unwrap();

    assert!(model_io::save_model(&path, &Model::default()).unwrap_err().is_skip());
    assert_eq!(fs::read_to_string(&path).unwrap(), "precious");
}

#[test]
fn missing_files_leave_the_model_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.model");
    let mut model = Model::new(
        vec![MeshData::new(Mesh::create_test_triangle(), 3)],
        vec![MaterialData::new(Material::default())],
    );
    let before = model.clone();

    let err = model_io::load_model(&path, &mut model).unwrap_err();
    assert!(matches!(err, ModelIoError::NotFound { .. }));
    let err = model_io::load_material(&path, &mut model).unwrap_err();
    assert!(err.is_skip());

    assert_eq!(model, before);
}

#[test]
fn load_model_keeps_materials() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tri.model");
    let source = Model::new(vec![MeshData::new(Mesh::create_test_triangle(), 0)], vec![]);
    model_io::save_model(&path, &source).unwrap();

    let mut target = Model::new(
        vec![MeshData::default(); 5],
        vec![MaterialData::new(Material::default())],
    );
    model_io::load_model(&path, &mut target).unwrap();
    assert_eq!(target.mesh_data, source.mesh_data);
    assert_eq!(target.material_data.len(), 1);
}

#[test]
fn malformed_files_load_bounded_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.model");
    fs::write(
        &path,
        "MeshCount: 4000000000\nMaterial Index: 7\nVertexCount: 2\n1 2 3\n",
    )
    .unwrap();

    let mut model = Model::default();
    model_io::load_model(&path, &mut model).unwrap();

    // The mesh count takes every token of the file, nothing is left for vertices
    assert_eq!(model.mesh_data.len(), 10);
    let first = &model.mesh_data[0];
    assert_eq!(first.material_index, 7);
    assert!(first.mesh.vertices.is_empty());
    assert!(first.mesh.indices.is_empty());
    assert!(model.mesh_data[1..].iter().all(|m| *m == MeshData::default()));
}

#[test]
fn short_vertex_lines_keep_zero_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short_vertices.model");
    fs::write(&path, "MeshCount: 1\nMaterial Index: 7\nVertexCount: 2\n1 2 3\n").unwrap();

    let mut model = Model::default();
    model_io::load_model(&path, &mut model).unwrap();

    let first = &model.mesh_data[0];
    assert_eq!(first.material_index, 7);
    assert_eq!(first.mesh.vertices.len(), 2);
    assert_eq!(first.mesh.vertices[0].position, Point3::new(1.0, 2.0, 3.0));
    assert_eq!(first.mesh.vertices[1], Vertex::default());
    assert!(first.mesh.indices.is_empty());
}

#[test]
fn repeated_huge_counts_allocate_linearly() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bloated.model");
    let mut text = String::from("MeshCount: 2000\n");
    for _ in 0..2000 {
        text.push_str("VertexCount: 99999999\n");
    }
    fs::write(&path, &text).unwrap();
    let token_count = text.split_whitespace().count();

    let mut model = Model::default();
    model_io::load_model(&path, &mut model).unwrap();

    assert_eq!(model.mesh_data.len(), 2000);
    assert!(model.mesh_data.len() + model.vertex_count() + model.index_count() <= token_count);
}

#[test]
fn huge_material_count_is_bounded() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bloated.model");
    fs::write(material_path(&path), "Material Count: 99999999\n1 0 0 1\n").unwrap();

    let mut model = Model::default();
    model_io::load_material(&path, &mut model).unwrap();
    assert_eq!(model.material_data.len(), 7);
    assert_eq!(model.material_data[0].material.ambient, rgba(1.0, 0.0, 0.0, 1.0));
}

#[test]
fn unparsable_field_stalls_the_rest_of_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stalled.model");
    fs::write(&path, "MeshCount: 2\nMaterial Index: seven\nVertexCount: 3\n").unwrap();

    let mut model = Model::default();
    model_io::load_model(&path, &mut model).unwrap();
    assert_eq!(model.mesh_data, vec![MeshData::default(); 2]);
}

#[test]
fn short_index_buffers_reload_as_zeros() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.model");
    let mut mesh = Mesh::create_test_triangle();
    mesh.indices = vec![2, 1];
    model_io::save_model(&path, &Model::new(vec![MeshData::new(mesh, 0)], vec![])).unwrap();
    assert!(triangle_lines(&path).is_empty());

    let mut loaded = Model::default();
    model_io::load_model(&path, &mut loaded).unwrap();
    assert_eq!(loaded.mesh_data[0].mesh.indices, [0, 0]);
}
