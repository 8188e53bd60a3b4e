//! Core library for the selfshim lifecycle shim
//!
//! This crate provides the launch configuration, the native binding
//! capability and the supervisor state machine that decides when the
//! managed Self instance is started and stopped.

pub mod error;
pub mod types;

pub mod binding;
pub mod config;
pub mod supervisor;

pub use supervisor::Supervisor;

/// Initialize logging infrastructure
///
/// Sets up tracing with systemd journal logging when running under systemd.
/// Otherwise logs to stderr with pretty formatting.
pub fn init_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    #[cfg(target_os = "linux")]
    {
        if std::env::var("JOURNAL_STREAM").is_ok() {
            let journal_layer = tracing_journald::layer()?;
            tracing_subscriber::registry()
                .with(journal_layer)
                .with(level)
                .init();
            return Ok(());
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(std::io::stderr),
        )
        .with(level)
        .init();

    Ok(())
}
