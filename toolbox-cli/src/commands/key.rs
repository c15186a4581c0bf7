//! Key command - manage the GitHub key.

use std::io::{BufRead, IsTerminal};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use serde::Serialize;
use toolbox_core::CredentialValidator;
use toolbox_fetch::{FetchContext, GitHubCredentialValidator};
use toolbox_store::{CREDENTIAL_KEY, CredentialStore, NAMESPACE, SessionState};

use super::show::presenter;
use crate::output::JsonFormatter;
use crate::wiring::{build_session, fetch_settings, load_settings};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the key command.
#[derive(Args)]
pub struct KeyArgs {
    #[command(subcommand)]
    pub action: KeyAction,
}

/// Key subcommands.
#[derive(Subcommand)]
pub enum KeyAction {
    /// Store a GitHub personal access token and show tools.
    Set {
        /// Token to store. Read from stdin when omitted.
        token: Option<String>,
    },

    /// Remove the stored token.
    Clear,

    /// Report whether a token is stored and accepted.
    Status,
}

/// Key status as emitted in JSON mode.
#[derive(Debug, Serialize)]
struct KeyStatus {
    namespace: &'static str,
    key: &'static str,
    stored: bool,
    valid: Option<bool>,
}

/// Runs the key command.
pub async fn run(args: &KeyArgs, cli: &Cli) -> Result<ExitCode> {
    match &args.action {
        KeyAction::Set { token } => set_key(token.as_deref(), cli).await,
        KeyAction::Clear => clear_key(cli).await,
        KeyAction::Status => key_status(cli).await,
    }
}

fn read_token_from_stdin() -> Result<String> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprintln!("Paste a GitHub personal access token and press Enter:");
    }
    let mut line = String::new();
    stdin
        .lock()
        .read_line(&mut line)
        .context("Failed to read token from stdin")?;
    Ok(line.trim().to_string())
}

async fn set_key(token: Option<&str>, cli: &Cli) -> Result<ExitCode> {
    let token = match token {
        Some(token) => token.trim().to_string(),
        None => read_token_from_stdin()?,
    };
    if token.is_empty() {
        bail!("No token given");
    }

    let settings = load_settings(cli).await?.get().await;
    let presenter = presenter(cli);
    let mut session = build_session(&settings, presenter.clone())?;

    match session.save_credential(&token).await? {
        SessionState::Rendered => {
            presenter.flush()?;
            Ok(ExitCode::Success)
        }
        _ => Ok(ExitCode::CredentialRequired),
    }
}

async fn clear_key(cli: &Cli) -> Result<ExitCode> {
    let settings = load_settings(cli).await?.get().await;
    let mut session = build_session(&settings, presenter(cli))?;
    session.clear_credential().await?;
    Ok(ExitCode::Success)
}

async fn key_status(cli: &Cli) -> Result<ExitCode> {
    let settings = load_settings(cli).await?.get().await;
    let ctx = FetchContext::new(fetch_settings(&settings))?;
    let store = CredentialStore::new(ctx.keychain.clone());

    let credential = store.get().await?;
    let valid = match &credential {
        Some(credential) => {
            let validator = GitHubCredentialValidator::new(Arc::clone(&ctx.github));
            Some(validator.is_valid(credential).await)
        }
        None => None,
    };

    let status = KeyStatus {
        namespace: NAMESPACE,
        key: CREDENTIAL_KEY,
        stored: credential.is_some(),
        valid,
    };

    match cli.format {
        OutputFormat::Text => {
            let line = match status.valid {
                None => "No GitHub key stored.",
                Some(true) => "GitHub key stored and accepted.",
                Some(false) => "GitHub key stored but rejected.",
            };
            println!("{line}");
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&status)?);
        }
    }

    Ok(if status.valid == Some(true) {
        ExitCode::Success
    } else {
        ExitCode::CredentialRequired
    })
}
