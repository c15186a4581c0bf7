//! GitHub upstream: API client, release fetcher, credential validator.

pub mod api;
pub mod fetcher;
pub mod validator;

pub use api::{ContentEntry, GitHubAsset, GitHubClient, GitHubRelease, PackageManifest};
pub use fetcher::ReleaseFetcher;
pub use validator::GitHubCredentialValidator;
