//! # Timesheet Infrastructure
//!
//! Infrastructure implementations of core sync ports.
//!
//! This crate contains:
//! - Local stores (SQLite via r2d2, in-memory)
//! - HTTP client with retry/backoff
//! - Remote authorities (REST CRUD service, GitHub contents API)
//! - Tokio-backed job scheduler
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `timesheet-core`
//! - Depends on `timesheet-common`, `timesheet-domain` and `timesheet-core`
//! - Contains all "impure" code (I/O, network, timers)

pub mod config;
pub mod errors;
pub mod http;
pub mod remote;
pub mod scheduling;
pub mod storage;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder, RetryPolicy};
pub use remote::{GitHubBlobClient, RemoteError, RestRecordClient};
pub use scheduling::{SchedulerError, TokioScheduler};
pub use storage::{InMemoryLocalStore, SqliteLocalStore};
