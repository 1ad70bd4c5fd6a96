//! Solaris: an animated sun, earth and moon.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI
//! flags, e.g. `solaris --resolution 48 --time-scale 4`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use solaris_app::{PlatformDirs, run_with_config};
use solaris_config::{CliArgs, Config};
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let dirs = match args.config.clone() {
        Some(dir) => PlatformDirs::from_config_dir(dir),
        None => PlatformDirs::resolve().unwrap_or_else(|e| {
            eprintln!("{e}, using the current directory");
            PlatformDirs::from_config_dir(PathBuf::from("."))
        }),
    };
    if let Err(e) = dirs.create_dirs() {
        eprintln!("Failed to create {}: {e}", dirs.config_dir.display());
    }

    let mut config = Config::load_or_create(&dirs.config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    solaris_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!("Config directory: {}", dirs.config_dir.display());

    match run_with_config(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Solaris exited with an error: {e}");
            ExitCode::FAILURE
        }
    }
}
