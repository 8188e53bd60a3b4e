//! Error types for selfshim
//!
//! A failed start is not an error here: it is reported to the user as a
//! status message. These types cover configuration, binding acquisition
//! and lifecycle misuse.

use thiserror::Error;

use crate::types::ShimState;

/// Main error type for the shim
#[derive(Error, Debug)]
pub enum ShimError {
    /// Errors related to configuration loading/parsing
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors raised while acquiring or driving a native binding
    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),

    /// A lifecycle callback arrived in a state that does not accept it
    #[error("Invalid lifecycle transition: cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: ShimState,
    },

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {path}")]
    LoadFailed { path: String },

    #[error("Failed to save configuration file: {path}")]
    SaveFailed { path: String },

    #[error("Configuration validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}

/// Native binding errors
///
/// Only acquiring a binding is fallible. Once a binding exists its three
/// operations report through integer status codes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("Failed to load native library {library}: {reason}")]
    LibraryLoad { library: String, reason: String },

    #[error("Native library {library} does not export {symbol}")]
    MissingSymbol { library: String, symbol: String },

    #[error("Managed executable not found: {name}")]
    ExecutableNotFound { name: String },

    #[error("Invalid launch argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Failed to spawn managed process: {reason}")]
    SpawnFailed { reason: String },

    #[error("Instance state file error: {reason}")]
    StateFile { reason: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ShimError>;
