//! Shared type definitions
//!
//! The launch configuration handed to the native start call, the status
//! messages shown to the user, and the lifecycle states of the shim.

use serde::{Deserialize, Serialize};

/// Ordered argument sequence passed to the native start operation
///
/// Built once per activation and handed over unmodified. The shim never
/// parses or validates the individual arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchConfiguration(Vec<String>);

impl LaunchConfiguration {
    /// Wrap an already ordered argument list
    pub fn new(args: Vec<String>) -> Self {
        Self(args)
    }

    /// Borrow the arguments in order
    pub fn args(&self) -> &[String] {
        &self.0
    }
}

/// Status reported to the user after activation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusMessage {
    /// The managed process was started by this activation
    Running,
    /// The start call returned a non-zero status
    FailedToStart,
    /// The managed process was already running, start was skipped
    AlreadyRunning,
}

impl StatusMessage {
    /// Text rendered on the visible status surface
    pub fn text(&self) -> &'static str {
        match self {
            StatusMessage::Running => "Self running...",
            StatusMessage::FailedToStart => "Failed to start self...",
            StatusMessage::AlreadyRunning => "Self already running...",
        }
    }

    /// Whether the managed process is expected to be up after this status
    pub fn is_success(&self) -> bool {
        !matches!(self, StatusMessage::FailedToStart)
    }
}

impl std::fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// Lifecycle state of the shim
///
/// `Created` is initial, `Destroyed` is terminal.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShimState {
    #[default]
    Created,
    Active,
    Destroyed,
}

impl std::fmt::Display for ShimState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShimState::Created => write!(f, "created"),
            ShimState::Active => write!(f, "active"),
            ShimState::Destroyed => write!(f, "destroyed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text_matches_display() {
        for status in [
            StatusMessage::Running,
            StatusMessage::FailedToStart,
            StatusMessage::AlreadyRunning,
        ] {
            assert_eq!(status.to_string(), status.text());
        }
    }

    #[test]
    fn test_only_failed_start_is_unsuccessful() {
        assert!(StatusMessage::Running.is_success());
        assert!(StatusMessage::AlreadyRunning.is_success());
        assert!(!StatusMessage::FailedToStart.is_success());
    }
}
