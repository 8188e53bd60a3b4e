//! selfshim - lifecycle shim for the Self background instance
//!
//! Stands in for the host lifecycle: each subcommand delivers one
//! activation or deactivation callback to the supervisor.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use selfshim_core::{config::BindingKind, error::ShimError, init_logging};

mod cli;

#[derive(Parser)]
#[command(name = "selfshim")]
#[command(about = "Start, query and stop the Self background instance")]
struct Cli {
    /// Configuration file (default: ~/.config/selfshim/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured binding (process or library)
    #[arg(long, global = true)]
    binding: Option<BindingKind>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the instance unless it is already running
    Activate,
    /// Stop the instance if it is running
    Deactivate,
    /// Activate, wait for Ctrl+C or SIGTERM, then deactivate
    Run,
    /// Show whether the instance is running
    Status,
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    let options = cli::Options {
        config_path: cli.config,
        binding: cli.binding,
    };

    let result = match cli.command {
        Commands::Activate => cli::lifecycle::run_activate(&options),
        Commands::Deactivate => cli::lifecycle::run_deactivate(&options),
        Commands::Run => cli::lifecycle::run_foreground(&options),
        Commands::Status => cli::lifecycle::run_status(&options),
        Commands::Config { action } => match action {
            ConfigCommands::Show => cli::config::run_config_show(&options),
            ConfigCommands::Init { force } => cli::config::run_config_init(&options, force),
        },
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let exit_code = match e {
                // Configuration errors (exit code 2)
                ShimError::Config(_) | ShimError::TomlSerialize(_) => 2,
                // Binding unavailable, lifecycle misuse, I/O (exit code 1 - runtime)
                ShimError::Binding(_) | ShimError::InvalidTransition { .. } | ShimError::Io(_) => 1,
            };

            eprintln!("{}", e);
            std::process::exit(exit_code);
        }
    }
}
