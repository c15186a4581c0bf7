//! Show and refresh commands.

use std::sync::Arc;

use anyhow::Result;
use toolbox_store::SessionState;
use tracing::info;

use crate::output::CliPresenter;
use crate::wiring::{build_session, load_settings};
use crate::{Cli, ExitCode};

/// Builds a presenter from the global flags.
pub fn presenter(cli: &Cli) -> Arc<CliPresenter> {
    Arc::new(CliPresenter::new(cli.format, !cli.no_color, cli.pretty, cli.quiet))
}

/// Activates a session, refreshing afterwards when asked to and the view
/// came from the shared cache.
pub async fn run(cli: &Cli, refresh: bool) -> Result<ExitCode> {
    let settings = load_settings(cli).await?.get().await;
    let presenter = presenter(cli);
    let mut session = build_session(&settings, presenter.clone())?;

    let state = session.activate().await?;
    if let SessionState::AwaitingCredential(reason) = state {
        info!(?reason, "Stopped at credential prompt");
        return Ok(ExitCode::CredentialRequired);
    }

    if refresh && !session.refresh_if_cached().await? {
        info!("Activation fetched fresh release data");
    }

    presenter.flush()?;
    Ok(ExitCode::Success)
}
