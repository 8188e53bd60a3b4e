//! Configuration module
//!
//! Holds the values the launch configuration is built from and the choice
//! of native binding. Loading and saving live in [`toml_config`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::types::LaunchConfiguration;

pub mod toml_config;

/// Settings the launch configuration is built from
///
/// Defaults reproduce the stock Android install:
/// `self_instance -s /sdcard/self/etc/ -i /sdcard/self/ -f 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchSettings {
    /// Name of the managed instance, passed as argument 0
    pub instance_name: String,

    /// Static data directory (`-s`)
    pub static_dir: String,

    /// Instance data directory (`-i`)
    pub instance_dir: String,

    /// Opaque value passed after `-f`
    pub flag: String,
}

impl LaunchSettings {
    /// Build the ordered argument sequence for the start call
    pub fn launch_configuration(&self) -> LaunchConfiguration {
        LaunchConfiguration::new(vec![
            self.instance_name.clone(),
            "-s".to_string(),
            self.static_dir.clone(),
            "-i".to_string(),
            self.instance_dir.clone(),
            "-f".to_string(),
            self.flag.clone(),
        ])
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        if self.instance_name.is_empty() {
            return Err("Instance name cannot be empty".to_string());
        }

        if self.static_dir.is_empty() {
            return Err("Static directory cannot be empty".to_string());
        }

        if self.instance_dir.is_empty() {
            return Err("Instance directory cannot be empty".to_string());
        }

        if self.flag.is_empty() {
            return Err("Flag cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            instance_name: "self_instance".to_string(),
            static_dir: "/sdcard/self/etc/".to_string(),
            instance_dir: "/sdcard/self/".to_string(),
            flag: "0".to_string(),
        }
    }
}

/// Which native binding backs the supervisor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    /// Spawn the managed instance as a detached child process
    #[default]
    Process,
    /// Call into the native shared library in-process
    Library,
}

impl BindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingKind::Process => "process",
            BindingKind::Library => "library",
        }
    }
}

impl std::str::FromStr for BindingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "process" => Ok(BindingKind::Process),
            "library" => Ok(BindingKind::Library),
            other => Err(format!(
                "Unknown binding kind '{}', expected 'process' or 'library'",
                other
            )),
        }
    }
}

/// Settings for the native binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingSettings {
    pub kind: BindingKind,

    /// Library name without platform prefix/suffix (`self_android` loads `libself_android.so`),
    /// or a path / `.so` file name used as given
    pub library: String,

    /// Executable spawned by the process binding, a path or a name looked up on `PATH`
    pub executable: String,

    /// Instance record written by the process binding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,

    /// Seconds between SIGTERM and SIGKILL when stopping
    pub stop_grace_secs: u64,
}

impl BindingSettings {
    pub fn stop_grace(&self) -> Duration {
        Duration::from_secs(self.stop_grace_secs)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        match self.kind {
            BindingKind::Library if self.library.is_empty() => {
                Err("Library name cannot be empty".to_string())
            }
            BindingKind::Process if self.executable.is_empty() => {
                Err("Executable cannot be empty".to_string())
            }
            _ => Ok(()),
        }
    }
}

impl Default for BindingSettings {
    fn default() -> Self {
        Self {
            kind: BindingKind::default(),
            library: "self_android".to_string(),
            executable: "self_instance".to_string(),
            state_file: None,
            stop_grace_secs: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_launch_configuration() {
        let args = LaunchSettings::default().launch_configuration();
        assert_eq!(
            args.args(),
            &[
                "self_instance",
                "-s",
                "/sdcard/self/etc/",
                "-i",
                "/sdcard/self/",
                "-f",
                "0"
            ]
        );
    }

    #[test]
    fn test_flag_is_passed_through_verbatim() {
        let settings = LaunchSettings {
            flag: "not-a-number".to_string(),
            ..LaunchSettings::default()
        };
        let config = settings.launch_configuration();
        assert_eq!(config.args().last().map(String::as_str), Some("not-a-number"));
    }

    #[test]
    fn test_launch_validation() {
        assert!(LaunchSettings::default().validate().is_ok());

        let settings = LaunchSettings {
            static_dir: String::new(),
            ..LaunchSettings::default()
        };
        assert_eq!(
            settings.validate().unwrap_err(),
            "Static directory cannot be empty"
        );
    }

    #[test]
    fn test_binding_kind_parsing() {
        assert_eq!("process".parse::<BindingKind>(), Ok(BindingKind::Process));
        assert_eq!("LIBRARY".parse::<BindingKind>(), Ok(BindingKind::Library));
        assert!("jni".parse::<BindingKind>().is_err());
    }

    #[test]
    fn test_binding_validation_checks_selected_kind_only() {
        let settings = BindingSettings {
            library: String::new(),
            ..BindingSettings::default()
        };
        assert!(settings.validate().is_ok());

        let settings = BindingSettings {
            kind: BindingKind::Library,
            library: String::new(),
            ..BindingSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
