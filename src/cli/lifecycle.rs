//! Lifecycle commands
//!
//! Each command performs one pass of the corresponding supervisor callback
//! and prints the outcome.

use colored::Colorize;
use selfshim_core::binding::{open_binding, NativeBinding, NOT_RUNNING};
use selfshim_core::error::ShimError;
use selfshim_core::types::StatusMessage;
use tracing::{info, warn};

use super::Options;

/// Exit code when a start was attempted and failed
const EXIT_START_FAILED: i32 = 1;

/// Exit code for `status` when the instance is not running
const EXIT_NOT_RUNNING: i32 = 3;

fn print_status(status: StatusMessage) {
    let text = match status {
        StatusMessage::Running => status.text().green(),
        StatusMessage::AlreadyRunning => status.text().yellow(),
        StatusMessage::FailedToStart => status.text().red(),
    };
    println!("{}", text);
}

fn exit_code_for(status: StatusMessage) -> i32 {
    if status.is_success() {
        0
    } else {
        EXIT_START_FAILED
    }
}

/// Run the activate command
pub fn run_activate(options: &Options) -> Result<i32, ShimError> {
    let mut supervisor = options.open_supervisor()?;
    let status = supervisor.on_activate()?;
    print_status(status);
    Ok(exit_code_for(status))
}

/// Run the deactivate command
pub fn run_deactivate(options: &Options) -> Result<i32, ShimError> {
    let mut supervisor = options.open_supervisor()?;
    if supervisor.on_deactivate()? {
        println!("Self stopped");
    } else {
        println!("Self not running");
    }
    Ok(0)
}

/// Run activation, block until a shutdown signal, then deactivate
pub fn run_foreground(options: &Options) -> Result<i32, ShimError> {
    run_until(options, block_until_shutdown)
}

/// Activate, call `wait` while the instance runs, then deactivate
///
/// Deactivation happens even when `wait` fails; its error is returned after.
fn run_until<W>(options: &Options, wait: W) -> Result<i32, ShimError>
where
    W: FnOnce() -> std::io::Result<()>,
{
    let mut supervisor = options.open_supervisor()?;

    let status = supervisor.on_activate()?;
    print_status(status);

    let wait_result = if status.is_success() {
        info!("Waiting for shutdown signal");
        println!("Press Ctrl+C to stop");
        let result = wait();
        match &result {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => warn!("Failed to wait for shutdown signal: {}", e),
        }
        result
    } else {
        Ok(())
    };

    if supervisor.on_deactivate()? {
        println!("Self stopped");
    }

    wait_result?;
    Ok(exit_code_for(status))
}

fn block_until_shutdown() -> std::io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(wait_for_shutdown())
}

async fn wait_for_shutdown() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = sigterm.recv() => {}
    }
    Ok(())
}

/// Run the status command
pub fn run_status(options: &Options) -> Result<i32, ShimError> {
    let config = options.load_config()?;
    let mut binding = open_binding(&config.binding)?;

    if binding.is_running() != NOT_RUNNING {
        println!("Status: {}", "running".green());
        Ok(0)
    } else {
        println!("Status: {}", "not running".red());
        Ok(EXIT_NOT_RUNNING)
    }
}
