//! Lifecycle state machine
//!
//! Maps the host's activation and deactivation callbacks onto native binding
//! calls. Each callback performs exactly one pass: one `is_running` query,
//! then at most one `start` or `stop`. Nothing is retried or cached.

use tracing::{debug, info, warn};

use crate::binding::{NativeBinding, NOT_RUNNING, START_OK};
use crate::config::LaunchSettings;
use crate::error::ShimError;
use crate::types::{ShimState, StatusMessage};

/// Supervises the managed process over one host lifecycle
pub struct Supervisor<B: NativeBinding> {
    binding: B,
    launch: LaunchSettings,
    state: ShimState,
}

impl<B: NativeBinding> Supervisor<B> {
    /// Create a supervisor in the `Created` state
    pub fn new(binding: B, launch: LaunchSettings) -> Self {
        Self {
            binding,
            launch,
            state: ShimState::Created,
        }
    }

    pub fn state(&self) -> ShimState {
        self.state
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    /// Consume the supervisor, returning the binding
    pub fn into_binding(self) -> B {
        self.binding
    }

    /// Handle activation
    ///
    /// Starts the managed process unless it is already running and returns
    /// the status to render. Valid from `Created` and `Active`.
    pub fn on_activate(&mut self) -> Result<StatusMessage, ShimError> {
        if self.state == ShimState::Destroyed {
            return Err(ShimError::InvalidTransition {
                action: "activate",
                state: self.state,
            });
        }

        let config = self.launch.launch_configuration();

        let running = self.binding.is_running();
        debug!("is_running returned {}", running);

        let status = if running == NOT_RUNNING {
            info!("Starting managed instance: {:?}", config.args());
            let result = self.binding.start(config.args());
            debug!("start returned {}", result);

            if result == START_OK {
                StatusMessage::Running
            } else {
                warn!("Managed instance failed to start (status {})", result);
                StatusMessage::FailedToStart
            }
        } else {
            info!("Managed instance already running, not starting");
            StatusMessage::AlreadyRunning
        };

        self.state = ShimState::Active;
        Ok(status)
    }

    /// Handle deactivation
    ///
    /// Stops the managed process if it is running. Returns whether a stop was
    /// requested. Valid from `Created` and `Active`; the shim is `Destroyed`
    /// afterwards.
    pub fn on_deactivate(&mut self) -> Result<bool, ShimError> {
        if self.state == ShimState::Destroyed {
            return Err(ShimError::InvalidTransition {
                action: "deactivate",
                state: self.state,
            });
        }

        let running = self.binding.is_running();
        debug!("is_running returned {}", running);

        let stopped = if running != NOT_RUNNING {
            info!("Stopping managed instance");
            let result = self.binding.stop();
            // Result is informational only
            debug!("stop returned {}", result);
            true
        } else {
            debug!("Managed instance not running, nothing to stop");
            false
        };

        self.state = ShimState::Destroyed;
        Ok(stopped)
    }
}
