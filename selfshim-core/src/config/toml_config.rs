//! TOML configuration file I/O
//!
//! Handles loading and saving the shim configuration to/from TOML files
//! in the user's configuration directory.

use crate::config::{BindingSettings, LaunchSettings};
use crate::error::{ConfigError, ShimError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Complete TOML configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShimConfig {
    /// Values the launch configuration is built from
    #[serde(default)]
    pub launch: LaunchSettings,

    /// Native binding selection
    #[serde(default)]
    pub binding: BindingSettings,
}

impl ShimConfig {
    /// Validate both sections
    pub fn validate(&self) -> Result<(), ShimError> {
        self.launch
            .validate()
            .and_then(|_| self.binding.validate())
            .map_err(|message| ShimError::Config(ConfigError::ValidationError { message }))
    }

    /// Render the configuration as pretty TOML
    pub fn to_toml(&self) -> Result<String, ShimError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Default configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the default configuration directory
///
/// Returns ~/.config/selfshim, or SELFSHIM_CONFIG_DIR if set
pub fn get_config_dir() -> Result<PathBuf, ShimError> {
    if let Ok(config_dir) = std::env::var("SELFSHIM_CONFIG_DIR") {
        return Ok(PathBuf::from(config_dir));
    }

    let home = std::env::var("HOME").map_err(|_| {
        ShimError::Config(ConfigError::IoError {
            message: "HOME environment variable not set".to_string(),
        })
    })?;

    Ok(PathBuf::from(home).join(".config").join("selfshim"))
}

/// Get the default configuration file path
pub fn get_config_path() -> Result<PathBuf, ShimError> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load configuration from the default TOML file
pub fn load_config() -> Result<ShimConfig, ShimError> {
    let config_path = get_config_path()?;
    load_config_or_default(&config_path)
}

/// Load configuration from a path, falling back to defaults if it does not exist
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<ShimConfig, ShimError> {
    if !path.as_ref().exists() {
        debug!(
            "No config file at {}, using defaults",
            path.as_ref().display()
        );
        return Ok(ShimConfig::default());
    }

    load_config_from_path(path)
}

/// Load configuration from a specific TOML file
pub fn load_config_from_path<P: AsRef<Path>>(path: P) -> Result<ShimConfig, ShimError> {
    let contents = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ShimError::Config(ConfigError::LoadFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        }),
        _ => ShimError::Config(ConfigError::IoError {
            message: format!("Failed to read config file: {}", e),
        }),
    })?;

    let config: ShimConfig = toml::from_str(&contents).map_err(|e| {
        ShimError::Config(ConfigError::ValidationError {
            message: format!("Failed to parse config file: {}", e),
        })
    })?;

    config.validate()?;

    info!(
        "Loaded configuration from {} (binding: {})",
        path.as_ref().display(),
        config.binding.kind.as_str()
    );

    Ok(config)
}

/// Save configuration to a specific TOML file
pub fn save_config_to_path<P: AsRef<Path>>(config: &ShimConfig, path: P) -> Result<(), ShimError> {
    config.validate()?;

    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ShimError::Config(ConfigError::IoError {
                message: format!("Failed to create config directory: {}", e),
            })
        })?;
    }

    let contents = config.to_toml()?;

    std::fs::write(&path, contents).map_err(|_| {
        ShimError::Config(ConfigError::SaveFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        })
    })?;

    info!("Saved configuration to {}", path.as_ref().display());
    Ok(())
}
