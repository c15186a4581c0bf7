//! Builds the session and its collaborators from settings.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use toolbox_core::{InstalledToolsProvider, Presenter, StaticInstalledTools};
use toolbox_fetch::{
    Dhis2AppsProvider, Dhis2Auth, Dhis2Client, FetchContext, FetchSettings,
    GitHubCredentialValidator, ReleaseFetcher,
};
use toolbox_store::{
    CacheSettings, CredentialStore, DataStore, Dhis2DataStore, FileDataStore,
    InstalledToolsSource, LogLevel, Settings, SettingsStore, SnapshotCache, ToolboxSession,
};
use tracing::debug;

use crate::Cli;
use crate::installed::JsonFileInstalledTools;

/// Loads settings from `--settings` or the default location.
pub async fn load_settings(cli: &Cli) -> Result<SettingsStore> {
    let store = match &cli.settings {
        Some(path) => SettingsStore::load(path.clone()).await?,
        None => SettingsStore::load_default().await?,
    };
    Ok(store)
}

/// Log filter directives. `--quiet` disables logging, `--verbose` wins
/// over the configured level.
pub fn log_filter(verbose: bool, quiet: bool, configured: LogLevel) -> Option<String> {
    if quiet {
        None
    } else if verbose {
        Some("toolbox=debug,info".to_string())
    } else {
        Some(format!("toolbox={configured}"))
    }
}

/// Upstream settings derived from user settings.
pub fn fetch_settings(settings: &Settings) -> FetchSettings {
    FetchSettings::default()
        .with_api_base_url(settings.github.api_base_url.clone())
        .with_timeout(settings.github.request_timeout())
}

/// Connects to the configured DHIS2 instance, if any.
pub fn dhis2_client(settings: &Settings) -> Result<Option<Arc<Dhis2Client>>> {
    let Some(base_url) = &settings.dhis2.base_url else {
        return Ok(None);
    };

    let auth = match (&settings.dhis2.username, settings.dhis2.password()) {
        (Some(username), Some(password)) => Some(Dhis2Auth {
            username: username.clone(),
            password,
        }),
        (Some(_), None) => bail!(
            "DHIS2 username is set but ${} is empty",
            settings.dhis2.password_env
        ),
        _ => None,
    };

    let client = Dhis2Client::new(base_url, auth, settings.github.request_timeout())
        .with_context(|| format!("Invalid DHIS2 base URL: {base_url}"))?;
    Ok(Some(Arc::new(client)))
}

fn require_dhis2(client: Option<&Arc<Dhis2Client>>, purpose: &str) -> Result<Arc<Dhis2Client>> {
    client
        .cloned()
        .with_context(|| format!("{purpose} uses DHIS2 but dhis2.base_url is not set"))
}

/// Shared cache backend.
pub fn data_store(settings: &Settings, dhis2: Option<&Arc<Dhis2Client>>) -> Result<Arc<dyn DataStore>> {
    Ok(match &settings.cache {
        CacheSettings::File { directory: Some(dir) } => Arc::new(FileDataStore::new(dir.clone())),
        CacheSettings::File { directory: None } => Arc::new(FileDataStore::at_default_location()),
        CacheSettings::Dhis2 => Arc::new(Dhis2DataStore::new(require_dhis2(dhis2, "The release cache")?)),
    })
}

/// Installed-tools provider.
pub fn installed_tools(
    settings: &Settings,
    dhis2: Option<&Arc<Dhis2Client>>,
) -> Result<Arc<dyn InstalledToolsProvider>> {
    Ok(match &settings.installed_tools {
        InstalledToolsSource::Dhis2 => {
            Arc::new(Dhis2AppsProvider::new(require_dhis2(dhis2, "The installed-tools listing")?))
        }
        InstalledToolsSource::File { path } => Arc::new(JsonFileInstalledTools::new(path.clone())),
        InstalledToolsSource::None => Arc::new(StaticInstalledTools::default()),
    })
}

/// Builds a session over the system keychain.
pub fn build_session(settings: &Settings, presenter: Arc<dyn Presenter>) -> Result<ToolboxSession> {
    let ctx = FetchContext::new(fetch_settings(settings))?;
    debug!(?ctx, "Fetch context ready");

    let dhis2 = dhis2_client(settings)?;
    let store = data_store(settings, dhis2.as_ref())?;
    let installed = installed_tools(settings, dhis2.as_ref())?;

    let session = ToolboxSession::builder()
        .credentials(CredentialStore::new(ctx.keychain.clone()))
        .cache(SnapshotCache::new(store))
        .source(Arc::new(ReleaseFetcher::new(ctx.github.clone())))
        .validator(Arc::new(GitHubCredentialValidator::new(ctx.github.clone())))
        .installed(installed)
        .presenter(presenter)
        .build()?;
    Ok(session)
}
