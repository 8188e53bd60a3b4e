//! CLI command implementations
//!
//! This module contains the implementation of all CLI subcommands.

use std::path::PathBuf;

use selfshim_core::binding::{open_binding, NativeBinding};
use selfshim_core::config::toml_config::{self, ShimConfig};
use selfshim_core::config::BindingKind;
use selfshim_core::error::ShimError;
use selfshim_core::Supervisor;

pub mod config;
pub mod lifecycle;

/// Options shared by every subcommand
pub struct Options {
    pub config_path: Option<PathBuf>,
    pub binding: Option<BindingKind>,
}

impl Options {
    /// Resolve the configuration file path
    pub fn config_path(&self) -> Result<PathBuf, ShimError> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => toml_config::get_config_path(),
        }
    }

    /// Load the configuration and apply command-line overrides
    ///
    /// An explicitly given file must exist; the default location falls back
    /// to built-in defaults.
    pub fn load_config(&self) -> Result<ShimConfig, ShimError> {
        let mut config = match &self.config_path {
            Some(path) => toml_config::load_config_from_path(path)?,
            None => toml_config::load_config()?,
        };

        if let Some(kind) = self.binding {
            config.binding.kind = kind;
            config.validate()?;
        }

        Ok(config)
    }

    /// Build a supervisor over the configured binding
    pub fn open_supervisor(&self) -> Result<Supervisor<Box<dyn NativeBinding>>, ShimError> {
        let config = self.load_config()?;
        let binding = open_binding(&config.binding)?;
        Ok(Supervisor::new(binding, config.launch))
    }
}
