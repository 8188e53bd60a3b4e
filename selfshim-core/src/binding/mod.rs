//! Native binding capability
//!
//! The three operations the shim needs but does not implement. Status codes
//! follow the native contract: `is_running` returns 0 for "not running",
//! `start` returns 0 on success, and `stop` is best-effort.

use tracing::info;

use crate::config::{BindingKind, BindingSettings};
use crate::error::ShimError;

pub mod library;
pub mod process;
pub mod recording;

pub use library::LibraryBinding;
pub use process::ProcessBinding;
pub use recording::RecordingBinding;

/// Status code returned by `start` on success
pub const START_OK: i32 = 0;

/// Status code returned by `is_running` when nothing is running
pub const NOT_RUNNING: i32 = 0;

/// External collaborator that owns the managed process
pub trait NativeBinding {
    /// Query whether the managed process is active (0 = not running)
    fn is_running(&mut self) -> i32;

    /// Launch the managed process with the given arguments (0 = success)
    fn start(&mut self, args: &[String]) -> i32;

    /// Request termination of the managed process
    ///
    /// Callers do not inspect the result.
    fn stop(&mut self) -> i32;
}

impl<B: NativeBinding + ?Sized> NativeBinding for Box<B> {
    fn is_running(&mut self) -> i32 {
        (**self).is_running()
    }

    fn start(&mut self, args: &[String]) -> i32 {
        (**self).start(args)
    }

    fn stop(&mut self) -> i32 {
        (**self).stop()
    }
}

/// Acquire the binding selected by the settings
///
/// Failing to load the native library or to locate the executable is an
/// error here rather than at the first native call.
pub fn open_binding(settings: &BindingSettings) -> Result<Box<dyn NativeBinding>, ShimError> {
    info!("Opening {} binding", settings.kind.as_str());

    let binding: Box<dyn NativeBinding> = match settings.kind {
        BindingKind::Library => Box::new(LibraryBinding::open(&settings.library)?),
        BindingKind::Process => Box::new(ProcessBinding::from_settings(settings)?),
    };

    Ok(binding)
}
