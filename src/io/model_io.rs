use crate::core::color::Color;
use crate::core::geometry::Vertex;
use crate::scene::material::MaterialData;
use crate::scene::model::{MeshData, Model};
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Extension of the material sidecar written next to a `.model` file.
pub const MATERIAL_EXTENSION: &str = "material";

/// Token written for an absent texture reference.
pub const NO_TEXTURE: &str = "<none>";

/// Errors that can occur while reading or writing model assets.
///
/// None of these leave a model half-written: a load that fails to open its
/// file does not touch the target, and an empty save never creates a file.
#[derive(Debug, Error)]
pub enum ModelIoError {
    #[error("model has no mesh data to save")]
    NoMeshData,

    #[error("model has no material data to save")]
    NoMaterialData,

    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("texture name '{name}' contains whitespace")]
    InvalidTextureName { name: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ModelIoError {
    fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            ModelIoError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ModelIoError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// True for the "nothing happened" outcomes: no data to save, or no file
    /// to load. Callers treating sidecar assets as optional ignore these.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            ModelIoError::NoMeshData | ModelIoError::NoMaterialData | ModelIoError::NotFound { .. }
        )
    }
}

/// Path of the material sidecar belonging to `model_path`.
pub fn material_path(model_path: impl AsRef<Path>) -> PathBuf {
    model_path.as_ref().with_extension(MATERIAL_EXTENSION)
}

//=================================
// Model
//=================================

/// Writes the meshes of `model` to `path` in the line-oriented model format:
///
/// ```text
/// MeshCount: <uint>
/// Material Index: <int>
/// VertexCount: <uint>
/// px py pz nx ny nz tx ty tz u v        (one line per vertex)
/// Index Count: <uint>
/// i[n-2] i[n-1] i[n]                    (one line per n in 2..Index Count)
/// ```
///
/// The mesh block repeats `MeshCount` times. Triangle lines are the windowed
/// dump from [`crate::scene::mesh::Mesh::triangle_windows`], not a partition
/// of the index buffer.
pub fn save_model(path: impl AsRef<Path>, model: &Model) -> Result<(), ModelIoError> {
    let path = path.as_ref();
    if model.mesh_data.is_empty() {
        info!("save_model: no model data found for '{}'", path.display());
        return Err(ModelIoError::NoMeshData);
    }

    write_file(path, |w| {
        writeln!(w, "MeshCount: {}", model.mesh_data.len())?;
        for mesh_data in &model.mesh_data {
            writeln!(w, "Material Index: {}", mesh_data.material_index)?;

            let mesh = &mesh_data.mesh;
            writeln!(w, "VertexCount: {}", mesh.vertices.len())?;
            for v in &mesh.vertices {
                write_floats(w, &v.to_array())?;
            }

            writeln!(w, "Index Count: {}", mesh.indices.len())?;
            for [a, b, c] in mesh.triangle_windows() {
                writeln!(w, "{a} {b} {c}")?;
            }
        }
        Ok(())
    })?;

    debug!(
        "save_model: wrote {} meshes to '{}'",
        model.mesh_data.len(),
        path.display()
    );
    Ok(())
}

/// Reads meshes written by [`save_model`] into `model.mesh_data`.
///
/// The mesh list is replaced by `MeshCount` fresh entries; materials are left
/// alone. Malformed content never fails the load: fields that cannot be read
/// keep their zero default.
pub fn load_model(path: impl AsRef<Path>, model: &mut Model) -> Result<(), ModelIoError> {
    let path = path.as_ref();
    let text = read_file(path)?;
    let mut scan = Scanner::new(&text);

    let mesh_count = scan.count("MeshCount:");
    let mut mesh_data = vec![MeshData::default(); mesh_count];

    for entry in &mut mesh_data {
        if let Some(index) = scan.labeled::<i32>("Material Index:") {
            entry.material_index = index;
        }

        let mesh = &mut entry.mesh;
        let vertex_count = scan.count("VertexCount:");
        mesh.vertices = vec![Vertex::default(); vertex_count];
        for vertex in &mut mesh.vertices {
            let mut values = [0.0f32; 11];
            scan.fill(&mut values);
            *vertex = Vertex::from_array(&values);
        }

        let index_count = scan.count("Index Count:");
        mesh.indices = vec![0; index_count];
        for n in 2..index_count {
            scan.fill(&mut mesh.indices[n - 2..=n]);
        }
    }

    if !scan.is_exhausted() {
        debug!(
            "load_model: '{}' has {} unread tokens",
            path.display(),
            scan.remaining()
        );
    }

    model.mesh_data = mesh_data;
    Ok(())
}

//=================================
// Material
//=================================

/// Writes the materials of `model` to the sidecar of `path` (same name,
/// `.material` extension):
///
/// ```text
/// Material Count: <uint>
/// r g b a        (ambient)
/// r g b a        (diffuse)
/// r g b a        (specular)
/// r g b a        (emissive)
/// Power; <float>
/// <diffuse map | <none>>
/// <specular map | <none>>
/// <displacement map | <none>>
/// <normal map | <none>>
/// ```
pub fn save_material(path: impl AsRef<Path>, model: &Model) -> Result<(), ModelIoError> {
    let path = material_path(path);
    if model.material_data.is_empty() {
        info!("save_material: no material data found for '{}'", path.display());
        return Err(ModelIoError::NoMaterialData);
    }

    // Names are single tokens on disk
    let spaced = model
        .material_data
        .iter()
        .flat_map(|data| data.texture_names())
        .find(|name| name.contains(char::is_whitespace));
    if let Some(name) = spaced {
        warn!("save_material: texture name '{name}' contains whitespace");
        return Err(ModelIoError::InvalidTextureName {
            name: name.to_string(),
        });
    }

    write_file(&path, |w| {
        writeln!(w, "Material Count: {}", model.material_data.len())?;
        for data in &model.material_data {
            let m = &data.material;
            for color in [&m.ambient, &m.diffuse, &m.specular, &m.emissive] {
                write_floats(w, color.as_slice())?;
            }
            writeln!(w, "Power; {}", m.power)?;

            for name in data.texture_names() {
                writeln!(w, "{}", if name.is_empty() { NO_TEXTURE } else { name })?;
            }
        }
        Ok(())
    })?;

    debug!(
        "save_material: wrote {} materials to '{}'",
        model.material_data.len(),
        path.display()
    );
    Ok(())
}

/// Reads the material sidecar of `path` into `model.material_data`.
///
/// Texture names are resolved against the sidecar's own directory; `<none>`
/// becomes an empty name.
pub fn load_material(path: impl AsRef<Path>, model: &mut Model) -> Result<(), ModelIoError> {
    let path = material_path(path);
    let text = read_file(&path)?;
    let mut scan = Scanner::new(&text);

    let material_count = scan.count("Material Count:");
    let mut material_data = vec![MaterialData::default(); material_count];

    for data in &mut material_data {
        let m = &mut data.material;
        for color in [&mut m.ambient, &mut m.diffuse, &mut m.specular, &mut m.emissive] {
            *color = read_color(&mut scan);
        }
        m.power = scan.labeled::<f32>("Power;").unwrap_or(0.0);

        for name in data.texture_names_mut() {
            *name = match scan.word() {
                Some(NO_TEXTURE) | None => String::new(),
                Some(file_name) => path.with_file_name(file_name).to_string_lossy().into_owned(),
            };
        }
    }

    model.material_data = material_data;
    Ok(())
}

fn read_color(scan: &mut Scanner<'_>) -> Color {
    let mut rgba = [0.0f32; 4];
    scan.fill(&mut rgba);
    Color::from(rgba)
}

//=================================
// File helpers
//=================================

fn read_file(path: &Path) -> Result<String, ModelIoError> {
    fs::read_to_string(path).map_err(|e| {
        let err = ModelIoError::io(path, e);
        match &err {
            ModelIoError::NotFound { .. } => debug!("skip load: {err}"),
            _ => warn!("{err}"),
        }
        err
    })
}

fn write_file<F>(path: &Path, body: F) -> Result<(), ModelIoError>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let wrap = |e: io::Error| {
        let err = ModelIoError::io(path, e);
        warn!("{err}");
        err
    };

    let file = File::create(path).map_err(wrap)?;
    let mut writer = BufWriter::new(file);
    body(&mut writer).map_err(wrap)?;
    writer.flush().map_err(wrap)
}

/// One line of space-separated floats. `f32`'s `Display` is the shortest
/// text that parses back to the same value.
fn write_floats<W: Write>(w: &mut W, values: &[f32]) -> io::Result<()> {
    let mut first = true;
    for value in values {
        if !first {
            w.write_all(b" ")?;
        }
        write!(w, "{value}")?;
        first = false;
    }
    writeln!(w)
}

//=================================
// Token scanner
//=================================

/// Whitespace token reader with `fscanf`-like matching.
///
/// A literal or value that does not match is left unconsumed, so the next
/// read tries the same token again. Reads past the end return `None`.
struct Scanner<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
    // Elements all counts of one file may still allocate
    budget: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        let tokens: Vec<&'a str> = text.split_whitespace().collect();
        Self {
            budget: tokens.len(),
            tokens,
            pos: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.tokens.len() - self.pos
    }

    fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Consumes `label` (possibly several words) if it is next in the input.
    fn expect(&mut self, label: &str) -> bool {
        let words: Vec<&str> = label.split_whitespace().collect();
        let end = self.pos + words.len();
        if end <= self.tokens.len() && self.tokens[self.pos..end] == words[..] {
            self.pos = end;
            true
        } else {
            if let Some(found) = self.tokens.get(self.pos) {
                debug!("expected '{label}', found '{found}'");
            }
            false
        }
    }

    fn value<T: FromStr>(&mut self) -> Option<T> {
        let parsed = self.tokens.get(self.pos)?.parse().ok()?;
        self.pos += 1;
        Some(parsed)
    }

    fn labeled<T: FromStr>(&mut self, label: &str) -> Option<T> {
        if self.expect(label) { self.value() } else { None }
    }

    /// A labeled element count, charged against a budget shared by every
    /// count in the input. The budget starts at the input's token count, so
    /// all counts together stay linear in the file size.
    fn count(&mut self, label: &str) -> usize {
        let declared = self.labeled::<u32>(label).unwrap_or(0) as usize;
        let granted = declared.min(self.budget);
        if granted < declared {
            debug!(
                "'{label}' declares {declared} entries, {} left of a {} token file",
                self.budget,
                self.tokens.len()
            );
        }
        self.budget -= granted;
        granted
    }

    /// Reads values into `slots` in order, stopping at the first token that
    /// does not parse. Unfilled slots keep their current value.
    fn fill<T: FromStr>(&mut self, slots: &mut [T]) {
        for slot in slots {
            match self.value() {
                Some(v) => *slot = v,
                None => break,
            }
        }
    }

    fn word(&mut self) -> Option<&'a str> {
        let word = self.tokens.get(self.pos).copied()?;
        self.pos += 1;
        Some(word)
    }
}
