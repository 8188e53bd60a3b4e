//! Configuration commands

use selfshim_core::config::toml_config::{self, ShimConfig};
use selfshim_core::error::{ConfigError, ShimError};

use super::Options;

/// Print the effective configuration as TOML
pub fn run_config_show(options: &Options) -> Result<i32, ShimError> {
    let path = options.config_path()?;
    let config = options.load_config()?;

    if path.exists() {
        println!("# {}", path.display());
    } else {
        println!("# {} (not present, showing defaults)", path.display());
    }
    print!("{}", config.to_toml()?);
    Ok(0)
}

/// Write the default configuration file
pub fn run_config_init(options: &Options, force: bool) -> Result<i32, ShimError> {
    let path = options.config_path()?;

    if path.exists() && !force {
        return Err(ShimError::Config(ConfigError::IoError {
            message: format!(
                "{} already exists, use --force to overwrite",
                path.display()
            ),
        }));
    }

    let mut config = ShimConfig::default();
    if let Some(kind) = options.binding {
        config.binding.kind = kind;
    }

    toml_config::save_config_to_path(&config, &path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(0)
}
