//! Config command - inspect and change configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use toolbox_store::{LogLevel, default_config_dir, default_data_store_dir, default_settings_path};
use tracing::info;

use crate::output::JsonFormatter;
use crate::wiring::load_settings;
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Set the default log level.
    LogLevel {
        /// Level: error, warn, info, debug, trace.
        level: String,
    },

    /// Set the deadline for each upstream call.
    Timeout {
        /// Seconds (at least 1).
        seconds: u64,
    },
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<ExitCode> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await?,
        ConfigAction::Path => show_paths(cli)?,
        ConfigAction::LogLevel { level } => set_log_level(level, cli).await?,
        ConfigAction::Timeout { seconds } => set_timeout(*seconds, cli).await?,
    }
    Ok(ExitCode::Success)
}

async fn show_config(cli: &Cli) -> Result<()> {
    let store = load_settings(cli).await?;
    let settings = store.get().await;

    match cli.format {
        OutputFormat::Text => {
            println!("DHIS2 Toolbox Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Settings file:   {}", store.path().display());
            println!("GitHub API:      {}", settings.github.api_base_url);
            println!("Request timeout: {}s", settings.github.request_timeout_secs);
            println!("Release cache:   {:?}", settings.cache);
            println!("Installed tools: {:?}", settings.installed_tools);
            println!(
                "DHIS2 instance:  {}",
                settings.dhis2.base_url.as_deref().unwrap_or("(not set)")
            );
            println!("Log level:       {}", settings.log_level);
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&settings)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = cli.settings.clone().unwrap_or_else(default_settings_path);
    let cache_dir = default_data_store_dir();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", settings_path.display());
            println!("Cache dir:     {}", cache_dir.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": settings_path.display().to_string(),
                "cache_dir": cache_dir.display().to_string(),
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&paths)?);
        }
    }

    Ok(())
}

fn parse_log_level(level: &str) -> Result<LogLevel> {
    Ok(match level.to_lowercase().as_str() {
        "error" => LogLevel::Error,
        "warn" | "warning" => LogLevel::Warn,
        "info" => LogLevel::Info,
        "debug" => LogLevel::Debug,
        "trace" => LogLevel::Trace,
        _ => anyhow::bail!("Unknown log level: {level}. Use: error, warn, info, debug, trace"),
    })
}

async fn set_log_level(level: &str, cli: &Cli) -> Result<()> {
    let level = parse_log_level(level)?;

    let store = load_settings(cli).await?;
    store.update(|s| s.log_level = level).await;
    store.save().await?;

    info!(level = %level, "Log level updated");
    println!("Log level set to: {level}");
    Ok(())
}

async fn set_timeout(seconds: u64, cli: &Cli) -> Result<()> {
    if seconds == 0 {
        anyhow::bail!("Timeout must be at least 1 second");
    }

    let store = load_settings(cli).await?;
    store.update(|s| s.github.request_timeout_secs = seconds).await;
    store.save().await?;

    info!(seconds, "Request timeout updated");
    println!("Request timeout set to: {seconds}s");
    Ok(())
}
