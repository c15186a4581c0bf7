// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! DHIS2 Toolbox CLI - tool releases versus installed apps.
//!
//! # Examples
//!
//! ```bash
//! # Show tools (cached release data when available)
//! toolbox
//!
//! # Fetch fresh release data and update the shared cache
//! toolbox refresh
//!
//! # Store a GitHub key (prompted on stdin when omitted)
//! toolbox key set ghp_xxxxx
//!
//! # JSON output
//! toolbox --format json --pretty
//! ```

mod commands;
mod installed;
mod output;
mod wiring;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use toolbox_store::LogLevel;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{config, key, show};

// ============================================================================
// CLI Definition
// ============================================================================

/// DHIS2 Toolbox CLI.
#[derive(Parser)]
#[command(name = "toolbox")]
#[command(about = "Latest DHIS2 tool releases compared with installed apps")]
#[command(long_about = r#"
Lists the latest releases of the DHIS2 tools published on GitHub and
compares them with the apps installed on your DHIS2 instance.

Release data is kept in a shared cache; run `toolbox refresh` to update it.

Examples:
  toolbox                        # Show tools
  toolbox refresh                # Fetch fresh release data
  toolbox key set                # Store a GitHub key (read from stdin)
  toolbox --format json          # JSON output
"#)]
#[command(version)]
#[command(author = "DHIS2 Toolbox Contributors")]
pub struct Cli {
    /// Subcommand to run. If none, runs 'show' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Settings file (defaults to the platform config directory).
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show tools (default if no command specified).
    #[command(visible_alias = "s")]
    Show,

    /// Fetch fresh release data and update the shared cache.
    #[command(visible_alias = "r")]
    Refresh,

    /// Manage the GitHub key.
    Key(key::KeyArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// A GitHub key is missing or was rejected.
    CredentialRequired = 2,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(directives: Option<String>) {
    let Some(directives) = directives else {
        return;
    };
    let filter = EnvFilter::new(directives);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match wiring::load_settings(&cli).await {
        Ok(store) => store.get().await.log_level,
        Err(_) => LogLevel::default(),
    };
    setup_logging(wiring::log_filter(cli.verbose, cli.quiet, log_level));

    let result = match &cli.command {
        Some(Commands::Show) | None => show::run(&cli, false).await,
        Some(Commands::Refresh) => show::run(&cli, true).await,
        Some(Commands::Key(args)) => key::run(args, &cli).await,
        Some(Commands::Config(args)) => config::run(args, &cli).await,
    };

    match result {
        Ok(code) => {
            if !matches!(code, ExitCode::Success) {
                std::process::exit(code as i32);
            }
        }
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            std::process::exit(ExitCode::Error as i32);
        }
    }

    Ok(())
}
