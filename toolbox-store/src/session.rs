//! Sync session.
//!
//! Runs the activation procedure: check the credential, validate it, then
//! serve the shared cached snapshot or fetch a fresh one, merge it with the
//! host's installed tools and hand the result to the presenter.
//!
//! ```text
//! Start -> CredentialCheck -> Validate -> LoadCache -> Decide -> Render
//!              |                 |
//!              +-----------------+--> AwaitingCredential
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use toolbox_core::{
    Credential, CredentialValidator, InstalledTool, InstalledToolsProvider, Notice, Presenter,
    PromptReason, ReleaseSnapshot, ReleaseSource, ToolRepository, ToolboxView,
};
use tracing::{debug, info, instrument, warn};

use crate::credential_store::CredentialStore;
use crate::error::{StoreError, SyncError};
use crate::snapshot_cache::SnapshotCache;

// ============================================================================
// Session State
// ============================================================================

/// Where the session stands after its last operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not activated yet.
    Idle,
    /// Halted until the user supplies a credential.
    AwaitingCredential(PromptReason),
    /// A view has been rendered.
    Rendered,
}

// ============================================================================
// Session
// ============================================================================

/// One user's toolbox session.
pub struct ToolboxSession {
    credentials: CredentialStore,
    cache: SnapshotCache,
    source: Arc<dyn ReleaseSource>,
    validator: Arc<dyn CredentialValidator>,
    installed: Arc<dyn InstalledToolsProvider>,
    presenter: Arc<dyn Presenter>,
    repositories: Vec<ToolRepository>,

    state: SessionState,
    credential: Option<Credential>,
    latest_releases: Option<ReleaseSnapshot>,
    installed_tools: Vec<InstalledTool>,
    last_written: Option<DateTime<Utc>>,
    served_from_cache: bool,
}

impl std::fmt::Debug for ToolboxSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolboxSession")
            .field("state", &self.state)
            .field("repositories", &self.repositories.len())
            .field("installed_tools", &self.installed_tools.len())
            .finish_non_exhaustive()
    }
}

impl ToolboxSession {
    /// Creates a builder.
    pub fn builder() -> ToolboxSessionBuilder {
        ToolboxSessionBuilder::default()
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Snapshot behind the last render.
    pub fn latest_releases(&self) -> Option<&ReleaseSnapshot> {
        self.latest_releases.as_ref()
    }

    /// Installed tools used by the last render.
    pub fn installed_tools(&self) -> &[InstalledTool] {
        &self.installed_tools
    }

    /// Tracked repositories.
    pub fn repositories(&self) -> &[ToolRepository] {
        &self.repositories
    }

    /// Whether the last render came from the shared cache.
    pub fn served_from_cache(&self) -> bool {
        self.served_from_cache
    }

    /// Credential store backing this session.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Runs activation from the start.
    ///
    /// Network fetches happen here only when the shared cache is empty or
    /// unreadable.
    ///
    /// # Errors
    ///
    /// Returns an error only if the credential store itself fails.
    #[instrument(skip(self))]
    pub async fn activate(&mut self) -> Result<SessionState, SyncError> {
        let Some(credential) = self.credentials.get().await? else {
            info!("No credential stored");
            return Ok(self.await_credential(PromptReason::Missing));
        };

        if !self.validator.is_valid(&credential).await {
            warn!("Stored credential was rejected");
            self.presenter.notify(&Notice::error(
                "The stored GitHub key was rejected. Enter a new key to continue.",
            ));
            return Ok(self.await_credential(PromptReason::Invalid));
        }
        self.credential = Some(credential.clone());

        self.installed_tools = self.load_installed_tools().await;

        let cached = match self.cache.read().await {
            Ok(cached) => cached,
            Err(e) => {
                warn!(error = %e, "Failed to read shared cache, fetching fresh data");
                None
            }
        };

        let (snapshot, from_cache) = match cached {
            Some(snapshot) => {
                debug!(fetched_at = %snapshot.fetched_at, "Serving cached snapshot");
                (snapshot, true)
            }
            None => (self.fetch_and_store(&credential).await, false),
        };

        self.render(snapshot, from_cache);
        Ok(self.state)
    }

    /// Fetches fresh release data regardless of the cache and re-renders.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::NotReady` unless the session is rendered.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<(), SyncError> {
        if self.state != SessionState::Rendered {
            return Err(SyncError::NotReady);
        }
        let credential = self.credential.clone().ok_or(SyncError::NotReady)?;

        let snapshot = self.fetch_and_store(&credential).await;
        self.render(snapshot, false);
        Ok(())
    }

    /// Refreshes only if the last render was served from the shared cache.
    ///
    /// Returns whether a fetch happened. A view that activation just fetched
    /// is already fresh.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::NotReady` unless the session is rendered.
    pub async fn refresh_if_cached(&mut self) -> Result<bool, SyncError> {
        if self.state != SessionState::Rendered {
            return Err(SyncError::NotReady);
        }
        if !self.served_from_cache {
            debug!("View is already fresh, skipping refresh");
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }

    /// Stores a credential and restarts activation.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential is empty or cannot be stored.
    pub async fn save_credential(&mut self, token: &str) -> Result<SessionState, SyncError> {
        self.credentials.upsert(&Credential::new(token)).await?;
        self.presenter.notify(&Notice::info("GitHub key saved."));
        self.activate().await
    }

    /// Removes the stored credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the keychain cannot be accessed.
    pub async fn clear_credential(&mut self) -> Result<SessionState, SyncError> {
        match self.credentials.delete().await {
            Ok(()) => self.presenter.notify(&Notice::info("GitHub key removed.")),
            Err(StoreError::NotFound(_)) => debug!("No credential to remove"),
            Err(e) => return Err(e.into()),
        }
        Ok(self.await_credential(PromptReason::Missing))
    }

    fn await_credential(&mut self, reason: PromptReason) -> SessionState {
        self.credential = None;
        self.presenter.prompt_credential(reason);
        self.state = SessionState::AwaitingCredential(reason);
        self.state
    }

    async fn load_installed_tools(&self) -> Vec<InstalledTool> {
        match self.installed.installed_tools().await {
            Ok(tools) => {
                debug!(count = tools.len(), "Installed tools loaded");
                tools
            }
            Err(e) => {
                warn!(error = %e, "Installed tools unavailable, treating as none");
                Vec::new()
            }
        }
    }

    /// Fetches, sorts and persists a snapshot. A failed write is reported
    /// as a warning; the snapshot is still returned.
    async fn fetch_and_store(&mut self, credential: &Credential) -> ReleaseSnapshot {
        let mut snapshot = self.source.fetch_all(&self.repositories, credential).await;
        snapshot.sort_by_name();

        let floor = self
            .last_written
            .into_iter()
            .chain(self.latest_releases.as_ref().map(|s| s.fetched_at))
            .max();
        if let Some(floor) = floor {
            if snapshot.fetched_at < floor {
                debug!(%floor, "Clamping fetched_at to previous snapshot");
                snapshot.fetched_at = floor;
            }
        }

        match self.cache.replace(&snapshot).await {
            Ok(()) => self.last_written = Some(snapshot.fetched_at),
            Err(e) => {
                warn!(error = %e, "Failed to store snapshot");
                self.presenter.notify(&Notice::warning(format!(
                    "Release data could not be saved to the shared cache: {e}"
                )));
            }
        }

        snapshot
    }

    fn render(&mut self, snapshot: ReleaseSnapshot, from_cache: bool) {
        let view = ToolboxView::build(&snapshot, &self.installed_tools, from_cache);
        info!(
            tools = view.tools.len(),
            installed = view.installed_count(),
            from_cache,
            "Rendering toolbox"
        );
        self.presenter.render(&view);
        self.latest_releases = Some(snapshot);
        self.served_from_cache = from_cache;
        self.state = SessionState::Rendered;
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ToolboxSession`].
#[derive(Default)]
pub struct ToolboxSessionBuilder {
    credentials: Option<CredentialStore>,
    cache: Option<SnapshotCache>,
    source: Option<Arc<dyn ReleaseSource>>,
    validator: Option<Arc<dyn CredentialValidator>>,
    installed: Option<Arc<dyn InstalledToolsProvider>>,
    presenter: Option<Arc<dyn Presenter>>,
    repositories: Option<Vec<ToolRepository>>,
}

impl ToolboxSessionBuilder {
    /// Sets the credential store.
    #[must_use]
    pub fn credentials(mut self, credentials: CredentialStore) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the shared snapshot cache.
    #[must_use]
    pub fn cache(mut self, cache: SnapshotCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the release source.
    #[must_use]
    pub fn source(mut self, source: Arc<dyn ReleaseSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the credential validator.
    #[must_use]
    pub fn validator(mut self, validator: Arc<dyn CredentialValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Sets the installed-tools provider.
    #[must_use]
    pub fn installed(mut self, installed: Arc<dyn InstalledToolsProvider>) -> Self {
        self.installed = Some(installed);
        self
    }

    /// Sets the presenter.
    #[must_use]
    pub fn presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Overrides the tracked repositories.
    #[must_use]
    pub fn repositories(mut self, repositories: Vec<ToolRepository>) -> Self {
        self.repositories = Some(repositories);
        self
    }

    /// Builds the session.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Other` naming the first missing collaborator.
    pub fn build(self) -> Result<ToolboxSession, SyncError> {
        fn required<T>(value: Option<T>, name: &str) -> Result<T, SyncError> {
            value.ok_or_else(|| SyncError::Other(format!("session is missing its {name}")))
        }

        Ok(ToolboxSession {
            credentials: required(self.credentials, "credential store")?,
            cache: required(self.cache, "snapshot cache")?,
            source: required(self.source, "release source")?,
            validator: required(self.validator, "credential validator")?,
            installed: required(self.installed, "installed-tools provider")?,
            presenter: required(self.presenter, "presenter")?,
            repositories: self.repositories.unwrap_or_else(ToolRepository::tracked),
            state: SessionState::Idle,
            credential: None,
            latest_releases: None,
            installed_tools: Vec::new(),
            last_written: None,
            served_from_cache: false,
        })
    }
}
