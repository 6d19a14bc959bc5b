use nalgebra::Vector4;

/// Linear RGBA colour. Components are stored as x = r, y = g, z = b, w = a.
pub type Color = Vector4<f32>;

pub const WHITE: Color = Vector4::new(1.0, 1.0, 1.0, 1.0);
pub const BLACK: Color = Vector4::new(0.0, 0.0, 0.0, 1.0);

/// Builds a colour from its four channels.
#[inline]
pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Color {
    Vector4::new(r, g, b, a)
}
