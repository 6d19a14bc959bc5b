use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use xeph::io::config::Config;
use xeph::io::model_io::{self, ModelIoError};
use xeph::io::obj_import::import_obj;
use xeph::runtime::app::App;
use xeph::runtime::headless::HeadlessPlatform;
use xeph::runtime::viewer::ViewerState;
use xeph::scene::camera::Viewport;
use xeph::scene::model::Model;
use xeph::scene::utils::{bounding_box, normalize_and_center_model};

#[derive(Parser, Debug)]
#[command(name = "xeph")]
#[command(about = "Model/material converter and headless scene runner")]
struct Cli {
    /// Log filter (env_logger syntax) when RUST_LOG is not set
    #[arg(long, global = true, value_name = "FILTER", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of a .model file and its .material sidecar
    Info {
        #[arg(value_name = "MODEL")]
        model: PathBuf,
    },

    /// Convert an OBJ file into .model/.material files
    Import {
        #[arg(value_name = "OBJ")]
        obj: PathBuf,

        /// Output .model path; the material is written next to it
        #[arg(value_name = "OUT")]
        out: PathBuf,

        /// Center the model and fit it into [-1, 1]
        #[arg(long)]
        normalize: bool,
    },

    /// Run the viewer headless for a number of frames
    Run {
        /// Scene configuration (TOML)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Overrides headless.frames from the config
        #[arg(long)]
        frames: Option<u32>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .parse_filters(&cli.log_level)
        .parse_default_env()
        .format_timestamp(None)
        .format_level(true)
        .init();

    let result = match cli.command {
        Command::Info { model } => print_info(&model),
        Command::Import {
            obj,
            out,
            normalize,
        } => import_model(&obj, &out, normalize),
        Command::Run { config, frames } => run_headless(config, frames),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn print_info(path: &Path) -> Result<(), String> {
    let mut model = Model::default();
    model_io::load_model(path, &mut model).map_err(|e| e.to_string())?;
    match model_io::load_material(path, &mut model) {
        Ok(()) => {}
        Err(e) if e.is_skip() => info!("No material sidecar for '{}'", path.display()),
        Err(e) => return Err(e.to_string()),
    }

    println!("{}", path.display());
    println!(
        "  meshes: {}  vertices: {}  indices: {}",
        model.mesh_data.len(),
        model.vertex_count(),
        model.index_count()
    );
    for (i, mesh_data) in model.mesh_data.iter().enumerate() {
        println!(
            "  mesh {i}: {} vertices, {} indices, material {}{}",
            mesh_data.mesh.vertices.len(),
            mesh_data.mesh.indices.len(),
            mesh_data.material_index,
            if mesh_data.mesh.has_valid_indices() {
                ""
            } else {
                " (indices out of range)"
            }
        );
    }

    println!("  materials: {}", model.material_data.len());
    for (i, data) in model.material_data.iter().enumerate() {
        let m = &data.material;
        println!(
            "  material {i}: diffuse ({:.3}, {:.3}, {:.3}, {:.3}) power {}",
            m.diffuse.x, m.diffuse.y, m.diffuse.z, m.diffuse.w, m.power
        );
        for name in data.texture_names().iter().filter(|n| !n.is_empty()) {
            println!("    texture: {name}");
        }
    }

    if let Some((min, max)) = bounding_box(&model) {
        println!(
            "  bounds: ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }
    Ok(())
}

fn import_model(obj: &Path, out: &Path, normalize: bool) -> Result<(), String> {
    let mut model = import_obj(obj).map_err(|e| e.to_string())?;

    if normalize {
        let (center, scale) = normalize_and_center_model(&mut model);
        info!(
            "Model normalized. Center: ({:.3}, {:.3}, {:.3}), Scale: {:.4}",
            center.x, center.y, center.z, scale
        );
    }

    model_io::save_model(out, &model).map_err(|e| e.to_string())?;
    match model_io::save_material(out, &model) {
        Ok(()) => {}
        Err(ModelIoError::NoMaterialData) => info!("OBJ has no materials; no sidecar written"),
        Err(e) => return Err(e.to_string()),
    }

    info!("Wrote '{}'", out.display());
    Ok(())
}

fn run_headless(config_path: Option<PathBuf>, frames: Option<u32>) -> Result<(), String> {
    let mut config = match &config_path {
        Some(path) => {
            info!("Loading config: {}", path.display());
            Config::load(path).map_err(|e| e.to_string())?
        }
        None => {
            info!("Using default settings");
            Config::default()
        }
    };
    if let Some(frames) = frames {
        config.headless.frames = frames;
    }

    let viewport = Viewport::new(config.app.width, config.app.height);
    let viewer = ViewerState::from_config(&config);

    let mut app = App::new(config.app.name.clone()).with_max_frame_time(config.app.max_frame_time);
    app.add_state("viewer", viewer);

    let mut platform = HeadlessPlatform::new(viewport, config.headless);
    let summary = app.run(&mut platform);

    println!(
        "{} frames, {} updates, {} skipped",
        summary.frames, summary.updates, summary.skipped_updates
    );
    Ok(())
}
