pub mod core;
pub mod io;
pub mod runtime;
pub mod scene;
pub mod ui;
