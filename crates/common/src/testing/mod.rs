//! Testing utilities and helpers
//!
//! - **[`async_utils`]**: polling and timeout helpers for async tests
//! - **[`temp`]**: temporary directory helper
//!
//! Clock mocking lives in [`crate::time::MockClock`].

pub mod async_utils;
pub mod temp;

pub use async_utils::{poll_until, timeout_ok};
pub use temp::TempDir;
