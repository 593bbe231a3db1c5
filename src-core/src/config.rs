//! Configuration management for picam.
//!
//! Loaded from the platform-standard config directory:
//! - Linux: `~/.config/picam/config.json`
//! - macOS: `~/Library/Application Support/picam/config.json`

use crate::error::{CameraError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// An external program plus arguments placed before the rendered argv.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Program name without directories, used in logs and errors.
    pub fn display_name(&self) -> &str {
        Path::new(&self.program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.program)
    }
}

/// The three capture tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_still")]
    pub still: ToolCommand,
    #[serde(default = "default_video")]
    pub video: ToolCommand,
    #[serde(default = "default_hello")]
    pub hello: ToolCommand,
}

fn default_still() -> ToolCommand {
    ToolCommand::new("rpicam-still")
}

fn default_video() -> ToolCommand {
    ToolCommand::new("rpicam-vid")
}

fn default_hello() -> ToolCommand {
    ToolCommand::new("rpicam-hello")
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            still: default_still(),
            video: default_video(),
            hello: default_hello(),
        }
    }
}

/// Per-camera behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Hold a reservation whenever the camera is idle.
    #[serde(default)]
    pub auto_reserve: bool,
    /// How long to wait for the reservation holder to exit before a capture.
    #[serde(default = "default_release_timeout_ms")]
    pub release_timeout_ms: u64,
    #[serde(default)]
    pub tools: ToolConfig,
}

fn default_release_timeout_ms() -> u64 {
    2000
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            auto_reserve: false,
            release_timeout_ms: default_release_timeout_ms(),
            tools: ToolConfig::default(),
        }
    }
}

/// Get the path to the config file.
pub fn config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "picam")
        .ok_or_else(|| CameraError::Config("Could not determine config directory".into()))?;
    Ok(proj_dirs.config_dir().join("config.json"))
}

/// Load configuration from the default location.
/// Returns default config if the file doesn't exist or is invalid.
pub fn load_config() -> CameraConfig {
    match config_path() {
        Ok(path) => load_config_from(&path),
        Err(e) => {
            warn!("Failed to get config path: {}", e);
            CameraConfig::default()
        }
    }
}

/// Load configuration from an explicit path, with the same fallback rules.
pub fn load_config_from(path: &Path) -> CameraConfig {
    if !path.exists() {
        debug!("No config file at {:?}, using defaults", path);
        return CameraConfig::default();
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<CameraConfig>(&contents) {
            Ok(config) => {
                info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("Failed to parse config file: {}. Using defaults.", e);
                CameraConfig::default()
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}. Using defaults.", e);
            CameraConfig::default()
        }
    }
}

/// Save configuration to `path`, creating parent directories as needed.
pub fn save_config_to(config: &CameraConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CameraError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| CameraError::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(path, json)
        .map_err(|e| CameraError::Config(format!("Failed to write config file: {}", e)))?;

    info!("Saved config to {:?}", path);
    Ok(())
}

/// Save configuration to the default location.
pub fn save_config(config: &CameraConfig) -> Result<()> {
    save_config_to(config, &config_path()?)
}
