//! DHIS2 instance client.
//!
//! The host side of the toolbox: the installed-apps listing and the
//! namespace-scoped `dataStore` used as the shared release cache.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use toolbox_core::{CoreError, InstalledTool, InstalledToolsProvider, UNKNOWN};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{FetchError, HttpError};
use crate::host::http::{HttpClient, with_deadline};

// ============================================================================
// Auth
// ============================================================================

/// Basic-auth credentials for a DHIS2 instance.
#[derive(Clone)]
pub struct Dhis2Auth {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

impl fmt::Debug for Dhis2Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dhis2Auth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// App Listing
// ============================================================================

/// One row of `/api/apps`. Only the fields the toolbox reads.
#[derive(Debug, Deserialize)]
struct AppRow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    key: Option<String>,
}

impl AppRow {
    fn into_installed(self) -> Option<InstalledTool> {
        let name = self.name.filter(|n| !n.trim().is_empty())?;
        Some(InstalledTool {
            name,
            version: self
                .version
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            key: self.key,
        })
    }
}

/// Decodes the app listing row by row; malformed or unnamed rows are skipped.
fn parse_apps(rows: Vec<Value>) -> Vec<InstalledTool> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<AppRow>(row) {
            Ok(app) => {
                let key = app.key.clone();
                let tool = app.into_installed();
                if tool.is_none() {
                    warn!(key = ?key, "Skipping app without a name");
                }
                tool
            }
            Err(e) => {
                warn!(error = %e, "Skipping malformed app entry");
                None
            }
        })
        .collect()
}

// ============================================================================
// Client
// ============================================================================

/// Client for the DHIS2 Web API.
#[derive(Debug, Clone)]
pub struct Dhis2Client {
    http: HttpClient,
    base_url: String,
    auth: Option<Dhis2Auth>,
    timeout: Duration,
}

impl Dhis2Client {
    /// Creates a client restricted to the instance's host.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(base_url: &str, auth: Option<Dhis2Auth>, timeout: Duration) -> Result<Self, FetchError> {
        let host = Url::parse(base_url)
            .ok()
            .and_then(|u| u.host_str().map(ToString::to_string))
            .ok_or_else(|| HttpError::InvalidUrl(base_url.to_string()))?;
        let http = HttpClient::with_timeout(timeout)?.with_allowed_domains(vec![host]);

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            timeout,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn data_store_url(namespace: &str, key: &str) -> String {
        format!("dataStore/{namespace}/{key}")
    }

    fn request(&self, method: Method, url: &str) -> Result<RequestBuilder, FetchError> {
        let request = self.http.request(method, url)?;
        Ok(match &self.auth {
            Some(auth) => request.basic_auth(&auth.username, Some(&auth.password)),
            None => request,
        })
    }

    fn check_status(status: StatusCode, url: &str) -> Result<(), FetchError> {
        if status.is_success() {
            Ok(())
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(FetchError::AuthenticationFailed(format!("HTTP {status}")))
        } else if status == StatusCode::NOT_FOUND {
            Err(FetchError::NotFound(url.to_string()))
        } else if status == StatusCode::CONFLICT {
            Err(FetchError::Conflict(url.to_string()))
        } else {
            Err(FetchError::InvalidResponse(format!("HTTP {status}")))
        }
    }

    /// Lists the apps installed on the instance.
    ///
    /// Apps without a version are listed with an unknown version; entries
    /// that are not objects or have no name are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, a body
    /// that is not a JSON array, or deadline breach.
    #[instrument(skip(self))]
    pub async fn apps(&self) -> Result<Vec<InstalledTool>, FetchError> {
        let url = self.api_url("apps");
        with_deadline(self.timeout, async {
            let response = self.http.send(self.request(Method::GET, &url)?).await?;
            Self::check_status(response.status(), &url)?;
            let body = response.text().await?;
            let rows: Vec<Value> = serde_json::from_str(&body)?;
            let tools = parse_apps(rows);
            debug!(count = tools.len(), "Apps listed");
            Ok(tools)
        })
        .await
    }

    /// Reads a `dataStore` entry. A missing entry is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error for failures other than "not found".
    #[instrument(skip(self))]
    pub async fn data_store_get(&self, namespace: &str, key: &str) -> Result<Option<Value>, FetchError> {
        let url = self.api_url(&Self::data_store_url(namespace, key));
        let result = with_deadline(self.timeout, async {
            let response = self.http.send(self.request(Method::GET, &url)?).await?;
            Self::check_status(response.status(), &url)?;
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        })
        .await;

        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => {
                debug!(namespace, key, "dataStore entry not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Creates a `dataStore` entry.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Conflict` if the entry already exists.
    #[instrument(skip(self, value))]
    pub async fn data_store_create(&self, namespace: &str, key: &str, value: &Value) -> Result<(), FetchError> {
        let url = self.api_url(&Self::data_store_url(namespace, key));
        with_deadline(self.timeout, async {
            let request = self.request(Method::POST, &url)?.json(value);
            let response = self.http.send(request).await?;
            Self::check_status(response.status(), &url)
        })
        .await
    }

    /// Deletes a `dataStore` entry.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::NotFound` if there was nothing to delete.
    #[instrument(skip(self))]
    pub async fn data_store_delete(&self, namespace: &str, key: &str) -> Result<(), FetchError> {
        let url = self.api_url(&Self::data_store_url(namespace, key));
        with_deadline(self.timeout, async {
            let response = self.http.send(self.request(Method::DELETE, &url)?).await?;
            Self::check_status(response.status(), &url)
        })
        .await
    }
}

// ============================================================================
// Installed Apps Provider
// ============================================================================

/// Installed-tools provider reading the instance's app listing.
#[derive(Debug, Clone)]
pub struct Dhis2AppsProvider {
    client: Arc<Dhis2Client>,
}

impl Dhis2AppsProvider {
    /// Creates a provider over a DHIS2 client.
    pub fn new(client: Arc<Dhis2Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InstalledToolsProvider for Dhis2AppsProvider {
    async fn installed_tools(&self) -> Result<Vec<InstalledTool>, CoreError> {
        self.client
            .apps()
            .await
            .map_err(|e| CoreError::Unavailable(format!("DHIS2 apps: {e}")))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> Dhis2Client {
        let auth = Dhis2Auth {
            username: "admin".to_string(),
            password: "district".to_string(),
        };
        Dhis2Client::new(&server.uri(), Some(auth), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_apps_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/apps"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"key": "option-sorter", "name": "Option Sorter", "version": "1.3.0", "appType": "APP"}
            ])))
            .mount(&server)
            .await;

        let provider = Dhis2AppsProvider::new(Arc::new(client_for(&server)));
        let tools = provider.installed_tools().await.unwrap();
        assert_eq!(tools, vec![InstalledTool {
            name: "Option Sorter".to_string(),
            version: "1.3.0".to_string(),
            key: Some("option-sorter".to_string()),
        }]);
    }

    #[tokio::test]
    async fn test_apps_listing_tolerates_incomplete_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/apps"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "Option Sorter", "version": "1.3.0"},
                {"key": "legacy", "name": "Legacy App"},
                {"key": "nameless", "version": "0.1.0"},
                "not an app"
            ])))
            .mount(&server)
            .await;

        let provider = Dhis2AppsProvider::new(Arc::new(client_for(&server)));
        let tools = provider.installed_tools().await.unwrap();
        assert_eq!(tools, vec![
            InstalledTool::new("Option Sorter", "1.3.0"),
            InstalledTool {
                name: "Legacy App".to_string(),
                version: UNKNOWN.to_string(),
                key: Some("legacy".to_string()),
            },
        ]);
    }

    #[tokio::test]
    async fn test_apps_failure_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/apps"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider = Dhis2AppsProvider::new(Arc::new(client_for(&server)));
        assert!(matches!(
            provider.installed_tools().await,
            Err(CoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_data_store_get_missing_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/dataStore/dhis2-toolbox/latest_releases"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let value = client
            .data_store_get("dhis2-toolbox", "latest_releases")
            .await
            .unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_data_store_create_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/dataStore/dhis2-toolbox/latest_releases"))
            .and(body_json(json!({"releases": []})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client
            .data_store_create("dhis2-toolbox", "latest_releases", &json!({"releases": []}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_data_store_create_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.data_store_create("ns", "key", &json!(1)).await;
        assert!(matches!(result, Err(FetchError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_data_store_delete_missing_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.data_store_delete("ns", "key").await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn test_auth_debug_is_redacted() {
        let auth = Dhis2Auth {
            username: "admin".to_string(),
            password: "district".to_string(),
        };
        assert!(!format!("{auth:?}").contains("district"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(Dhis2Client::new("not a url", None, Duration::from_secs(1)).is_err());
    }
}
