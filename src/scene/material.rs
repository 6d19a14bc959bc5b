use crate::core::color::{BLACK, Color, WHITE};

/// Phong-style surface description shared by every mesh bound to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub emissive: Color,
    /// Specular exponent.
    pub power: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: WHITE,
            diffuse: WHITE,
            specular: WHITE,
            emissive: BLACK,
            power: 1.0,
        }
    }
}

/// A material plus the textures it samples.
///
/// Texture references are file names; an empty string means "no texture".
/// After loading from disk they are paths next to the material file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialData {
    pub material: Material,
    pub diffuse_map_name: String,
    pub specular_map_name: String,
    pub displ_map_name: String,
    pub normal_map_name: String,
}

impl MaterialData {
    pub fn new(material: Material) -> Self {
        Self {
            material,
            ..Default::default()
        }
    }

    /// The four texture references in file order: diffuse, specular,
    /// displacement, normal.
    pub fn texture_names(&self) -> [&str; 4] {
        [
            &self.diffuse_map_name,
            &self.specular_map_name,
            &self.displ_map_name,
            &self.normal_map_name,
        ]
    }

    /// Mutable access to the four texture references, same order as
    /// [`MaterialData::texture_names`].
    pub fn texture_names_mut(&mut self) -> [&mut String; 4] {
        [
            &mut self.diffuse_map_name,
            &mut self.specular_map_name,
            &mut self.displ_map_name,
            &mut self.normal_map_name,
        ]
    }
}
