//! GitHub REST API client.
//!
//! Covers the three reads the toolbox needs: a repository's release list,
//! its root file listing, and a file download by URL.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use toolbox_core::{Credential, ToolRepository};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::context::FetchSettings;
use crate::error::{FetchError, HttpError};
use crate::host::http::{HttpClient, with_deadline};

// ============================================================================
// Constants
// ============================================================================

/// GitHub API version header value.
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Media type for GitHub REST responses.
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Name of the manifest file looked up in each repository.
pub const MANIFEST_FILE: &str = "package.json";

/// Hosts that serve raw file downloads.
const DOWNLOAD_DOMAINS: &[&str] = &["githubusercontent.com", "github.com"];

// ============================================================================
// API Response Types
// ============================================================================

/// A published release.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    /// Git tag of the release.
    #[serde(default)]
    pub tag_name: Option<String>,

    /// Publish time (null for drafts).
    #[serde(default)]
    pub published_at: Option<String>,

    /// Downloadable assets.
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

impl GitHubRelease {
    /// Download URL of the first asset.
    pub fn first_download_url(&self) -> Option<&str> {
        self.assets.first().map(|a| a.browser_download_url.as_str())
    }
}

/// A release asset.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubAsset {
    /// Asset file name.
    #[serde(default)]
    pub name: Option<String>,

    /// Public download URL.
    pub browser_download_url: String,
}

/// An entry of a repository file listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    /// File or directory name.
    pub name: String,

    /// Entry type ("file", "dir", ...).
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    /// Raw download URL (null for directories).
    #[serde(default)]
    pub download_url: Option<String>,
}

/// The parts of `package.json` the toolbox reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    /// npm package name.
    #[serde(default)]
    pub name: Option<String>,

    /// Package version.
    #[serde(default)]
    pub version: Option<String>,

    /// Embedded DHIS2 web app manifest.
    #[serde(rename = "manifest.webapp", default)]
    pub webapp: Option<WebappManifest>,
}

/// The embedded DHIS2 web app manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebappManifest {
    /// App display name.
    #[serde(default)]
    pub name: Option<String>,
}

impl PackageManifest {
    /// Display name: the web app name, else the package name.
    pub fn display_name(&self) -> Option<&str> {
        self.webapp
            .as_ref()
            .and_then(|w| w.name.as_deref())
            .or(self.name.as_deref())
            .filter(|n| !n.trim().is_empty())
    }

    /// Package version, if non-empty.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref().filter(|v| !v.trim().is_empty())
    }
}

// ============================================================================
// API Client
// ============================================================================

/// GitHub API client authenticated per call with a bearer credential.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: HttpClient,
    api_base: String,
    timeout: Duration,
}

impl GitHubClient {
    /// Creates a client restricted to the API host and GitHub download hosts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let http = HttpClient::with_timeout(settings.timeout)?
            .with_allowed_domains(allowed_domains(&settings.api_base_url));
        Ok(Self {
            http,
            api_base: settings.api_base_url.trim_end_matches('/').to_string(),
            timeout: settings.timeout,
        })
    }

    /// Returns the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build request headers.
    fn build_headers(credential: &Credential) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();

        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
            .map_err(|e| HttpError::InvalidHeader(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        Ok(headers)
    }

    /// Maps a response status to an error.
    fn check_status(status: StatusCode, url: &str) -> Result<(), FetchError> {
        if status.is_success() {
            Ok(())
        } else if status == StatusCode::UNAUTHORIZED {
            Err(FetchError::AuthenticationFailed("Token rejected".to_string()))
        } else if status == StatusCode::NOT_FOUND {
            Err(FetchError::NotFound(url.to_string()))
        } else {
            Err(FetchError::InvalidResponse(format!("HTTP {status}")))
        }
    }

    /// Authenticated GET decoded as JSON, under the call deadline.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        credential: &Credential,
    ) -> Result<T, FetchError> {
        with_deadline(self.timeout, async {
            let request = self
                .http
                .request(Method::GET, url)?
                .headers(Self::build_headers(credential)?);
            let response = self.http.send(request).await?;
            Self::check_status(response.status(), url)?;

            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                warn!(url = %url, error = %e, "Failed to parse response");
                FetchError::Json(e)
            })
        })
        .await
    }

    /// Lists releases of a repository, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, invalid
    /// JSON, or deadline breach.
    #[instrument(skip(self, credential), fields(repo = %repo))]
    pub async fn releases(
        &self,
        repo: &ToolRepository,
        credential: &Credential,
    ) -> Result<Vec<GitHubRelease>, FetchError> {
        debug!("Fetching releases");
        let url = format!("{}/repos/{}/releases", self.api_base, repo);
        self.get_json(&url, credential).await
    }

    /// Returns the most recent release, if any.
    ///
    /// # Errors
    ///
    /// See [`GitHubClient::releases`].
    pub async fn latest_release(
        &self,
        repo: &ToolRepository,
        credential: &Credential,
    ) -> Result<Option<GitHubRelease>, FetchError> {
        Ok(self.releases(repo, credential).await?.into_iter().next())
    }

    /// Lists the repository's root files.
    ///
    /// # Errors
    ///
    /// See [`GitHubClient::releases`].
    #[instrument(skip(self, credential), fields(repo = %repo))]
    pub async fn contents(
        &self,
        repo: &ToolRepository,
        credential: &Credential,
    ) -> Result<Vec<ContentEntry>, FetchError> {
        debug!("Fetching file listing");
        let url = format!("{}/repos/{}/contents", self.api_base, repo);
        self.get_json(&url, credential).await
    }

    /// Locates and downloads the repository's `package.json`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::NotFound` if the listing has no downloadable
    /// `package.json`, otherwise see [`GitHubClient::releases`].
    #[instrument(skip(self, credential), fields(repo = %repo))]
    pub async fn package_manifest(
        &self,
        repo: &ToolRepository,
        credential: &Credential,
    ) -> Result<PackageManifest, FetchError> {
        let listing = self.contents(repo, credential).await?;
        let download_url = listing
            .into_iter()
            .find(|entry| entry.name == MANIFEST_FILE)
            .and_then(|entry| entry.download_url)
            .ok_or_else(|| FetchError::NotFound(format!("{repo}/{MANIFEST_FILE}")))?;

        debug!(url = %download_url, "Downloading manifest");
        self.get_json(&download_url, credential).await
    }

    /// Authenticated request against the API root.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential is rejected, the upstream answers
    /// with a non-success status, or the call fails or times out.
    #[instrument(skip(self, credential))]
    pub async fn probe(&self, credential: &Credential) -> Result<(), FetchError> {
        let url = format!("{}/", self.api_base);
        with_deadline(self.timeout, async {
            let request = self
                .http
                .request(Method::GET, &url)?
                .headers(Self::build_headers(credential)?);
            let response = self.http.send(request).await?;
            Self::check_status(response.status(), &url)
        })
        .await
    }
}

/// Domains the client may contact for a given API base.
fn allowed_domains(api_base: &str) -> Vec<String> {
    let mut domains: Vec<String> = DOWNLOAD_DOMAINS.iter().map(ToString::to_string).collect();
    if let Some(host) = Url::parse(api_base)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
    {
        domains.push(host);
    }
    domains
}

// ============================================================================
// Tests
// ============================================================================
