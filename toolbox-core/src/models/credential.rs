//! Upstream access credential.

use std::fmt;

/// Opaque upstream API access token, one per user.
///
/// `Debug` output never contains the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a secret. Surrounding whitespace is trimmed.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into().trim().to_string())
    }

    /// Returns the secret for use in an authorization header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let cred = Credential::new("ghp_secret123");
        let debug = format!("{cred:?}");
        assert!(!debug.contains("ghp_secret123"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_trims_whitespace() {
        let cred = Credential::new("  ghp_abc\n");
        assert_eq!(cred.expose(), "ghp_abc");
        assert!(Credential::new("   ").is_empty());
    }
}
