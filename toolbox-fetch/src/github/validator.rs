//! Credential validation against the GitHub API root.

use std::sync::Arc;

use async_trait::async_trait;
use toolbox_core::{Credential, CredentialValidator};
use tracing::{debug, warn};

use super::api::GitHubClient;

/// Validates a credential with an authenticated probe of the API root.
#[derive(Debug, Clone)]
pub struct GitHubCredentialValidator {
    client: Arc<GitHubClient>,
}

impl GitHubCredentialValidator {
    /// Creates a validator over a GitHub client.
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CredentialValidator for GitHubCredentialValidator {
    async fn is_valid(&self, credential: &Credential) -> bool {
        if credential.is_empty() {
            return false;
        }
        match self.client.probe(credential).await {
            Ok(()) => {
                debug!("Credential accepted");
                true
            }
            Err(e) => {
                warn!(error = %e, "Credential rejected or probe failed");
                false
            }
        }
    }
}
