use std::path::PathBuf;

use clap::Parser;
use mayhem_core::state::GameState;

mod audio;
mod backend;
mod config;
mod disk_path;
mod emulator;
mod error;
mod input;
mod overlay;
mod screenshot;
mod video;

use crate::config::AppConfig;
use crate::error::AppError;

#[derive(Parser, Debug)]
#[command(name = "mayhem", version, about = "Desktop host for the Mayhem C64 game shell")]
struct Args {
    /// Emulator backend to run
    #[arg(long, default_value = "sim")]
    backend: String,

    /// Disk image, directory or ZIP archive to autostart
    #[arg(long)]
    disk: Option<PathBuf>,

    /// Configuration file (defaults to <config dir>/mayhem/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Window scale factor
    #[arg(long)]
    scale: Option<u32>,

    /// Print the available backends and exit
    #[arg(long)]
    list_backends: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if args.list_backends {
        for entry in backend::all() {
            println!("{:<8} {}", entry.name, entry.description);
        }
        return;
    }

    if let Err(e) = run(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(scale) = args.scale {
        config.display.scale = scale;
    }
    if let Some(disk) = &args.disk {
        config.shell.boot.disk = Some(disk_path::resolve(disk)?);
    }

    let entry = backend::find(&args.backend).ok_or_else(|| AppError::UnknownBackend {
        name: args.backend.clone(),
        available: backend::all()
            .iter()
            .map(|e| e.name)
            .collect::<Vec<_>>()
            .join(", "),
    })?;
    log::info!("starting backend {}", entry.name);
    let ctx = (entry.create)(&config.shell.boot)?;

    let data_dir = data_dir();
    let state = GameState::load(&data_dir);
    log::info!("high score {}", state.high_score);

    emulator::run(ctx, &config)?;

    state.save(&data_dir)?;
    Ok(())
}

/// `<data dir>/mayhem`, where the persisted game state lives.
fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("mayhem")
}
