//! Desktop configuration: the core [`ShellConfig`] plus window settings,
//! read from a TOML file.

use std::path::{Path, PathBuf};

use mayhem_core::config::ShellConfig;
use serde::Deserialize;

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "cannot read {}: {e}", path.display()),
            ConfigError::Parse(path, e) => write!(f, "invalid config {}: {e}", path.display()),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(_, e) => Some(e),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Window size before scaling.
    pub width: u32,
    pub height: u32,
    pub scale: u32,
    /// Screen size the overlay layout was designed on.
    pub reference_width: u32,
    pub reference_height: u32,
    pub show_fps: bool,
    pub show_buttons: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 480,
            height: 270,
            scale: 2,
            reference_width: 1920,
            reference_height: 1080,
            show_fps: true,
            show_buttons: true,
        }
    }
}

impl DisplayConfig {
    pub fn window_size(&self) -> (u32, u32) {
        let scale = self.scale.max(1);
        (self.width * scale, self.height * scale)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(flatten)]
    pub shell: ShellConfig,
    pub display: DisplayConfig,
}

impl AppConfig {
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(origin.to_path_buf(), e))
    }

    /// Load from `explicit` if given (it must exist), otherwise from the
    /// per-user config file if there is one, otherwise use defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_path() {
                Some(path) if path.is_file() => path,
                _ => {
                    log::debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };
        let text =
            std::fs::read_to_string(&path).map_err(|e| ConfigError::Io(path.clone(), e))?;
        let config = Self::parse(&text, &path)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }
}

/// `<config dir>/mayhem/config.toml`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mayhem").join("config.toml"))
}
