//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Solaris command-line arguments.
///
/// Any value given here wins over the one loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "solaris", about = "Animated sun, earth and moon")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Sphere tessellation resolution (samples per angle, at least 2).
    #[arg(long)]
    pub resolution: Option<u32>,

    /// Simulation speed multiplier.
    #[arg(long)]
    pub time_scale: Option<f64>,

    /// Start in wireframe mode.
    #[arg(long)]
    pub wireframe: Option<bool>,

    /// Directory containing sun.jpg, earth.jpg and moon.jpg.
    #[arg(long)]
    pub media_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(res) = args.resolution {
            self.render.sphere_resolution = res;
        }
        if let Some(scale) = args.time_scale {
            self.scene.time_scale = scale;
        }
        if let Some(wf) = args.wireframe {
            self.render.wireframe = wf;
        }
        if let Some(ref dir) = args.media_dir {
            self.scene.media_dir = dir.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
