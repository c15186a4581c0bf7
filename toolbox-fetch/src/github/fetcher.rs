//! Latest-release fetcher.
//!
//! Fans out over all repositories at once; per repository, the release list
//! and the manifest are fetched concurrently. Any per-repository failure is
//! folded into `UNKNOWN` sentinel fields so the batch always yields one
//! record per input repository.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use toolbox_core::{Credential, ReleaseRecord, ReleaseSnapshot, ReleaseSource, ToolRepository, UNKNOWN};
use tracing::{debug, info, instrument, warn};

use super::api::{GitHubClient, GitHubRelease, PackageManifest};
use crate::error::FetchError;

/// Fetches latest releases and manifests from GitHub.
#[derive(Debug, Clone)]
pub struct ReleaseFetcher {
    client: Arc<GitHubClient>,
}

impl ReleaseFetcher {
    /// Creates a fetcher over a GitHub client.
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }

    /// Builds the record for one repository. Never fails.
    #[instrument(skip(self, credential), fields(repo = %repo))]
    pub async fn fetch_one(&self, repo: &ToolRepository, credential: &Credential) -> ReleaseRecord {
        let (release, manifest) = futures::join!(
            self.client.latest_release(repo, credential),
            self.client.package_manifest(repo, credential),
        );

        let mut record = ReleaseRecord::unknown(repo.clone());
        apply_release(&mut record, release);
        apply_manifest(&mut record, manifest);
        record
    }
}

/// Copies publish time and download URL from the latest release.
///
/// A missing release, or a release without assets, leaves both fields as
/// `UNKNOWN`.
fn apply_release(record: &mut ReleaseRecord, release: Result<Option<GitHubRelease>, FetchError>) {
    match release {
        Ok(Some(release)) => match release.first_download_url() {
            Some(url) => {
                record.download_url = url.to_string();
                record.published_at = release
                    .published_at
                    .clone()
                    .unwrap_or_else(|| UNKNOWN.to_string());
            }
            None => debug!(repo = %record.repo, "Latest release has no assets"),
        },
        Ok(None) => debug!(repo = %record.repo, "No releases published"),
        Err(e) => warn!(repo = %record.repo, error = %e, "Failed to fetch releases"),
    }
}

/// Copies display name and version from the manifest.
fn apply_manifest(record: &mut ReleaseRecord, manifest: Result<PackageManifest, FetchError>) {
    match manifest {
        Ok(manifest) => {
            if let Some(name) = manifest.display_name() {
                record.name = name.to_string();
            }
            if let Some(version) = manifest.version() {
                record.version = version.to_string();
            }
        }
        Err(e) => warn!(repo = %record.repo, error = %e, "Failed to read manifest"),
    }
}

#[async_trait]
impl ReleaseSource for ReleaseFetcher {
    async fn fetch_all(
        &self,
        repositories: &[ToolRepository],
        credential: &Credential,
    ) -> ReleaseSnapshot {
        info!(count = repositories.len(), "Fetching latest releases");

        let records = join_all(
            repositories
                .iter()
                .map(|repo| self.fetch_one(repo, credential)),
        )
        .await;

        let unknown = records.iter().filter(|r| !r.has_download()).count();
        debug!(count = records.len(), without_download = unknown, "Release fetch complete");

        ReleaseSnapshot::new(records)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::context::FetchSettings;

    fn fetcher_for(server: &MockServer, timeout: Duration) -> ReleaseFetcher {
        let settings = FetchSettings::default()
            .with_api_base_url(server.uri())
            .with_timeout(timeout);
        ReleaseFetcher::new(Arc::new(GitHubClient::new(&settings).unwrap()))
    }

    fn repo(id: &str) -> ToolRepository {
        ToolRepository::parse(id).unwrap()
    }

    async fn mount_releases(server: &MockServer, repo: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/repos/{repo}/releases")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn mount_manifest(server: &MockServer, repo: &str, manifest: serde_json::Value) {
        let raw_path = format!("/raw/{repo}/package.json");
        Mock::given(method("GET"))
            .and(path(format!("/repos/{repo}/contents")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "README.md", "type": "file", "download_url": format!("{}/raw/{repo}/README.md", server.uri())},
                {"name": "src", "type": "dir", "download_url": null},
                {"name": "package.json", "type": "file", "download_url": format!("{}{raw_path}", server.uri())}
            ])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(raw_path))
            .respond_with(ResponseTemplate::new(200).set_body_json(manifest))
            .mount(server)
            .await;
    }

    fn release_json(published: &str, url: &str) -> serde_json::Value {
        json!([
            {"tag_name": "v2", "published_at": published, "assets": [{"name": "app.zip", "browser_download_url": url}]},
            {"tag_name": "v1", "published_at": "2020-01-01T00:00:00Z", "assets": [{"name": "old.zip", "browser_download_url": "https://old"}]}
        ])
    }

    #[tokio::test]
    async fn test_fetch_one_full_record() {
        let server = MockServer::start().await;
        mount_releases(
            &server,
            "dhis2/tool-option-sorter",
            release_json("2024-05-02T08:30:00Z", "https://dl/app.zip"),
        )
        .await;
        mount_manifest(
            &server,
            "dhis2/tool-option-sorter",
            json!({"name": "tool-option-sorter", "version": "1.4.0", "manifest.webapp": {"name": "Option Sorter"}}),
        )
        .await;

        let fetcher = fetcher_for(&server, Duration::from_secs(5));
        let record = fetcher
            .fetch_one(&repo("dhis2/tool-option-sorter"), &Credential::new("t"))
            .await;

        assert_eq!(record.name, "Option Sorter");
        assert_eq!(record.version, "1.4.0");
        assert_eq!(record.published_at, "2024-05-02T08:30:00Z");
        assert_eq!(record.download_url, "https://dl/app.zip");
    }

    #[tokio::test]
    async fn test_empty_release_list_yields_sentinels() {
        let server = MockServer::start().await;
        mount_releases(&server, "dhis2/a", json!([])).await;
        mount_manifest(&server, "dhis2/a", json!({"name": "a", "version": "0.1.0"})).await;

        let fetcher = fetcher_for(&server, Duration::from_secs(5));
        let snapshot = fetcher
            .fetch_all(&[repo("dhis2/a")], &Credential::new("t"))
            .await;

        assert_eq!(snapshot.len(), 1);
        let record = &snapshot.releases[0];
        assert_eq!(record.published_at, UNKNOWN);
        assert_eq!(record.download_url, UNKNOWN);
        assert_eq!(record.version, "0.1.0");
    }

    #[tokio::test]
    async fn test_release_without_assets_yields_sentinels() {
        let server = MockServer::start().await;
        mount_releases(
            &server,
            "dhis2/a",
            json!([{"tag_name": "v1", "published_at": "2024-01-01T00:00:00Z", "assets": []}]),
        )
        .await;

        let fetcher = fetcher_for(&server, Duration::from_secs(5));
        let record = fetcher.fetch_one(&repo("dhis2/a"), &Credential::new("t")).await;

        assert_eq!(record.published_at, UNKNOWN);
        assert_eq!(record.download_url, UNKNOWN);
        // No contents mock mounted: the manifest read fails too.
        assert_eq!(record.name, UNKNOWN);
    }

    #[tokio::test]
    async fn test_partial_failures_keep_one_record_per_repo() {
        let server = MockServer::start().await;

        mount_releases(&server, "dhis2/ok", release_json("2024-01-01T00:00:00Z", "https://dl/ok.zip")).await;
        mount_manifest(&server, "dhis2/ok", json!({"name": "ok", "version": "1.0.0"})).await;

        Mock::given(method("GET"))
            .and(path("/repos/dhis2/broken/releases"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_manifest(&server, "dhis2/broken", json!({"name": "broken", "version": "2.0.0"})).await;

        mount_releases(&server, "dhis2/nomanifest", release_json("2024-02-01T00:00:00Z", "https://dl/nm.zip")).await;
        Mock::given(method("GET"))
            .and(path("/repos/dhis2/nomanifest/contents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "README.md", "download_url": "x"}])))
            .mount(&server)
            .await;

        let repos = vec![repo("dhis2/ok"), repo("dhis2/broken"), repo("dhis2/nomanifest"), repo("dhis2/missing")];
        let fetcher = fetcher_for(&server, Duration::from_secs(5));
        let snapshot = fetcher.fetch_all(&repos, &Credential::new("t")).await;

        assert_eq!(snapshot.len(), repos.len());
        let order: Vec<&ToolRepository> = snapshot.releases.iter().map(|r| &r.repo).collect();
        assert_eq!(order, repos.iter().collect::<Vec<_>>());

        assert_eq!(snapshot.releases[0].download_url, "https://dl/ok.zip");
        assert_eq!(snapshot.releases[1].download_url, UNKNOWN);
        assert_eq!(snapshot.releases[1].name, "broken");
        assert_eq!(snapshot.releases[2].name, UNKNOWN);
        assert_eq!(snapshot.releases[2].download_url, "https://dl/nm.zip");
        assert_eq!(snapshot.releases[3], ReleaseRecord::unknown(repo("dhis2/missing")));
    }

    #[tokio::test]
    async fn test_slow_repository_hits_deadline_only_for_itself() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/dhis2/slow/releases"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(release_json("2024-01-01T00:00:00Z", "https://dl/slow.zip"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;
        mount_releases(&server, "dhis2/fast", release_json("2024-01-01T00:00:00Z", "https://dl/fast.zip")).await;

        let fetcher = fetcher_for(&server, Duration::from_millis(300));
        let snapshot = fetcher
            .fetch_all(&[repo("dhis2/slow"), repo("dhis2/fast")], &Credential::new("t"))
            .await;

        assert_eq!(snapshot.releases[0].download_url, UNKNOWN);
        assert_eq!(snapshot.releases[1].download_url, "https://dl/fast.zip");
    }

    #[tokio::test]
    async fn test_requests_carry_bearer_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/dhis2/a/releases"))
            .and(header("authorization", "Bearer ghp_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server, Duration::from_secs(5));
        fetcher.fetch_one(&repo("dhis2/a"), &Credential::new("ghp_token")).await;
    }
}
