//! Host APIs for the toolbox.
//!
//! - [`keychain`] - User-scoped secret storage (system keychain)
//! - [`http`] - HTTP client with tracing, deadlines and domain allowlist

pub mod http;
pub mod keychain;

pub use http::{HttpClient, with_deadline};
pub use keychain::{KeychainApi, MemoryKeychain, SystemKeychain};
