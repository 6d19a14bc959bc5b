pub mod camera;
pub mod material;
pub mod mesh;
pub mod model;
pub mod model_cache;
pub mod render_group;
pub mod utils;
