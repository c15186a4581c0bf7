//! HTTP client with tracing, deadlines, and domain allowlist.
//!
//! This module provides a wrapped HTTP client that adds:
//! - Request/response tracing
//! - Domain allowlist for security
//! - An explicit per-call deadline helper

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{FetchError, HttpError};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// User agent string for the toolbox.
const USER_AGENT: &str = concat!("dhis2-toolbox/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with tracing and domain allowlist.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    allowed_domains: Option<Vec<String>>,
}

impl HttpClient {
    /// Creates a new HTTP client with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            inner: client,
            allowed_domains: None,
        })
    }

    /// Restricts requests to the given domains (and their subdomains).
    #[must_use]
    pub fn with_allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = Some(domains);
        self
    }

    /// Checks if a URL's domain is allowed.
    fn is_domain_allowed(&self, url: &str) -> Result<(), HttpError> {
        let Some(ref allowed) = self.allowed_domains else {
            return Ok(()); // No restrictions
        };

        let parsed = Url::parse(url).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| HttpError::InvalidUrl("No host in URL".to_string()))?;

        let allowed = allowed
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

        if allowed {
            Ok(())
        } else {
            Err(HttpError::DomainNotAllowed(host.to_string()))
        }
    }

    /// Starts a request after checking the allowlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or its domain is not allowed.
    pub fn request(&self, method: Method, url: &str) -> Result<RequestBuilder, HttpError> {
        self.is_domain_allowed(url)?;
        Ok(self.inner.request(method, url))
    }

    /// Sends a prepared request.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    #[instrument(skip(self, request))]
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, HttpError> {
        let response = request.send().await?;
        debug!(url = %response.url(), status = %response.status(), "Response received");
        Ok(response)
    }
}

// ============================================================================
// Deadlines
// ============================================================================

/// Runs an upstream call under an explicit deadline.
///
/// A breach is reported as [`FetchError::Timeout`] and the call is dropped.
///
/// # Errors
///
/// Returns the call's own error, or `Timeout` if the deadline passes first.
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    if let Ok(result) = tokio::time::timeout(deadline, call).await {
        result
    } else {
        warn!(deadline_secs = deadline.as_secs(), "Upstream call exceeded deadline");
        Err(FetchError::Timeout(deadline.as_secs()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_allowlist() {
        let client = HttpClient::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .unwrap()
            .with_allowed_domains(vec![
                "api.github.com".to_string(),
                "githubusercontent.com".to_string(),
            ]);

        assert!(client.is_domain_allowed("https://api.github.com/repos/dhis2/x").is_ok());
        assert!(client
            .is_domain_allowed("https://raw.githubusercontent.com/dhis2/x/master/package.json")
            .is_ok());
        assert!(client.is_domain_allowed("https://evil.com/steal").is_err());
    }

    #[test]
    fn test_no_domain_restrictions() {
        let client = HttpClient::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS)).unwrap();
        assert!(client.is_domain_allowed("https://any.domain.com").is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let client = HttpClient::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .unwrap()
            .with_allowed_domains(vec!["example.com".to_string()]);
        assert!(client.is_domain_allowed("not-a-valid-url").is_err());
    }

    #[tokio::test]
    async fn test_deadline_breach_is_timeout() {
        let result: Result<(), FetchError> = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(FetchError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_deadline_passes_result_through() {
        let result = with_deadline(Duration::from_secs(1), async { Ok::<_, FetchError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
