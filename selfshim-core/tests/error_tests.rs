//! Unit tests for error types and conversions

use selfshim_core::error::{BindingError, ConfigError, ShimError};
use selfshim_core::types::ShimState;

#[test]
fn test_config_error_display() {
    let error = ConfigError::ValidationError {
        message: "Flag cannot be empty".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Configuration validation error: Flag cannot be empty"
    );
}

#[test]
fn test_binding_error_display() {
    let error = BindingError::MissingSymbol {
        library: "self_android".to_string(),
        symbol: "self_start".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Native library self_android does not export self_start"
    );
}

#[test]
fn test_invalid_transition_display() {
    let error = ShimError::InvalidTransition {
        action: "activate",
        state: ShimState::Destroyed,
    };
    assert_eq!(
        error.to_string(),
        "Invalid lifecycle transition: cannot activate while destroyed"
    );
}

#[test]
fn test_shim_error_from_binding() {
    let binding_error = BindingError::ExecutableNotFound {
        name: "self_instance".to_string(),
    };
    let shim_error: ShimError = binding_error.into();
    assert!(matches!(shim_error, ShimError::Binding(_)));
    assert_eq!(
        shim_error.to_string(),
        "Binding error: Managed executable not found: self_instance"
    );
}

#[test]
fn test_shim_error_from_config() {
    let config_error = ConfigError::LoadFailed {
        path: "/tmp/config.toml".to_string(),
    };
    let shim_error: ShimError = config_error.into();
    assert!(matches!(shim_error, ShimError::Config(_)));
}

#[test]
fn test_shim_error_from_io() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let shim_error: ShimError = io_error.into();
    assert!(matches!(shim_error, ShimError::Io(_)));
}
