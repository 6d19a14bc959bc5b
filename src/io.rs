pub mod config;
pub mod model_io;
pub mod obj_import;
