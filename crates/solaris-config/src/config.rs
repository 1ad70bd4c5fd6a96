//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Rendering and tessellation settings.
    pub render: RenderConfig,
    /// Camera placement and lens.
    pub camera: CameraConfig,
    /// Bodies, textures and simulation speed.
    pub scene: SceneConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in borderless fullscreen.
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    pub title: String,
}

/// How the sphere tessellation closes the rows that land on the poles.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PoleClosureMode {
    /// Drop the zero-area triangles at the poles.
    #[default]
    Pinched,
    /// Emit every grid quad plus degenerate fan triples into the last vertex.
    Collapsed,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per angular parameter when tessellating bodies.
    pub sphere_resolution: u32,
    pub pole_closure: PoleClosureMode,
    /// Start in wireframe mode (toggled at runtime with W/F).
    pub wireframe: bool,
    /// Linear RGB background colour.
    pub clear_color: [f64; 3],
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye position in world space.
    pub position: [f32; 3],
    /// Point the camera looks at.
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

/// A single body of the solar system.
///
/// Periods are in seconds of simulation time; a period of zero leaves the
/// body still on that axis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BodyConfig {
    /// Sphere radius in world units.
    pub radius: f32,
    /// Distance from the parent's centre.
    pub orbit_radius: f32,
    /// Seconds per revolution around the parent.
    pub orbit_period: f32,
    /// Seconds per revolution around the body's own axis.
    pub spin_period: f32,
    /// Tilt of the spin axis in degrees.
    pub axial_tilt: f32,
    /// Texture file name, resolved against [`SceneConfig::media_dir`].
    pub texture: Option<String>,
    /// Emissive bodies ignore lighting.
    pub emissive: bool,
}

/// Scene configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Multiplier applied to wall-clock time.
    pub time_scale: f64,
    /// Directory holding body textures.
    pub media_dir: PathBuf,
    pub sun: BodyConfig,
    pub earth: BodyConfig,
    pub moon: BodyConfig,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter override (e.g. "debug", "info,solaris_render=trace").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            fullscreen: false,
            vsync: true,
            title: "Solaris - Simple Solar System".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sphere_resolution: 24,
            pole_closure: PoleClosureMode::default(),
            wireframe: false,
            clear_color: [0.7, 0.7, 0.7],
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 8.0, 30.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 45.0,
            near: 0.1,
            far: 80.1,
        }
    }
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            orbit_radius: 0.0,
            orbit_period: 0.0,
            spin_period: 0.0,
            axial_tilt: 0.0,
            texture: None,
            emissive: false,
        }
    }
}

impl BodyConfig {
    /// Degrees per second for a revolution of `period` seconds; zero when still.
    pub fn rate_for_period(period: f32) -> f32 {
        if period == 0.0 { 0.0 } else { 360.0 / period }
    }

    /// Orbit rate in degrees per second.
    pub fn orbit_rate(&self) -> f32 {
        Self::rate_for_period(self.orbit_period)
    }

    /// Spin rate in degrees per second.
    pub fn spin_rate(&self) -> f32 {
        Self::rate_for_period(self.spin_period)
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            media_dir: PathBuf::from("media"),
            sun: BodyConfig {
                radius: 1.0,
                texture: Some("sun.jpg".to_string()),
                emissive: true,
                ..BodyConfig::default()
            },
            earth: BodyConfig {
                radius: 0.5,
                orbit_radius: 10.0,
                orbit_period: 10.0,
                spin_period: 5.0,
                axial_tilt: 23.5,
                texture: Some("earth.jpg".to_string()),
                emissive: false,
            },
            moon: BodyConfig {
                radius: 0.25,
                orbit_radius: 2.0,
                orbit_period: 2.5,
                spin_period: 2.5,
                axial_tilt: 0.0,
                texture: Some("moon.jpg".to_string()),
                emissive: false,
            },
        }
    }
}

impl SceneConfig {
    /// Full path of a body's texture, if it has one.
    pub fn texture_path(&self, body: &BodyConfig) -> Option<PathBuf> {
        body.texture.as_ref().map(|name| self.media_dir.join(name))
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join("config.ron"), serialized)
            .map_err(ConfigError::WriteError)?;
        Ok(())
    }
}
