//! Remote authority clients
//!
//! - [`RestRecordClient`]: REST CRUD service; supports per-record writes
//! - [`GitHubBlobClient`]: one JSON file in a GitHub repository, versioned
//!   by its blob sha

pub mod errors;
pub mod github;
pub mod rest;

pub use errors::{RemoteError, RemoteErrorCategory};
pub use github::GitHubBlobClient;
pub use rest::{content_version, RestRecordClient};
