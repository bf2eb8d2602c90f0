//! Remote-specific error types
//!
//! Provides error classification for remote calls with retry metadata, and
//! the mapping from HTTP responses into it.

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use timesheet_domain::TimesheetError;

use crate::http::client::is_rate_limited;

/// Categories of remote errors for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorCategory {
    /// Credentials rejected (401, 403) - non-retryable until reconfigured
    Authentication,
    /// Version token mismatch - re-fetch, then retry
    Conflict,
    /// Record or document absent (404)
    Missing,
    /// Request rejected as malformed (400, 422) - non-retryable
    Client,
    /// Server errors (5xx) and rate limiting - retryable
    Server,
    /// Network/connection errors and timeouts - retryable
    Network,
    /// Unreadable response body - non-retryable
    Decode,
}

/// Remote operation errors
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Version conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rejected by remote: {0}")]
    Validation(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Unreadable response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Get the error category for this error
    pub const fn category(&self) -> RemoteErrorCategory {
        match self {
            Self::Auth(_) => RemoteErrorCategory::Authentication,
            Self::Conflict(_) => RemoteErrorCategory::Conflict,
            Self::NotFound(_) => RemoteErrorCategory::Missing,
            Self::Validation(_) => RemoteErrorCategory::Client,
            Self::RateLimit(_) | Self::Server(_) => RemoteErrorCategory::Server,
            Self::Network(_) | Self::Timeout(_) => RemoteErrorCategory::Network,
            Self::Decode(_) => RemoteErrorCategory::Decode,
        }
    }

    /// Check if this error should be retried by a background task
    pub const fn should_retry(&self) -> bool {
        matches!(
            self.category(),
            RemoteErrorCategory::Server
                | RemoteErrorCategory::Network
                | RemoteErrorCategory::Conflict
        )
    }

    /// Get suggested retry delay in seconds
    pub const fn retry_delay_secs(&self) -> u64 {
        match self {
            Self::RateLimit(_) => 60,
            Self::Server(_) => 10,
            Self::Network(_) | Self::Timeout(_) => 5,
            _ => 0,
        }
    }

    /// Classify a non-success status with the body's error message.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            status.canonical_reason().unwrap_or("unknown status").to_string()
        } else {
            message
        };
        let detail = format!("HTTP {}: {message}", status.as_u16());

        match status.as_u16() {
            401 | 403 => Self::Auth(detail),
            404 => Self::NotFound(detail),
            409 | 412 => Self::Conflict(detail),
            400 | 422 => Self::Validation(detail),
            429 => Self::RateLimit(detail),
            _ => Self::Server(detail),
        }
    }

    /// Turn a non-success response into an error, reading its body for an
    /// `{"error": ..}` or `{"message": ..}` explanation.
    ///
    /// A 403 carrying rate-limit headers is GitHub's secondary rate limit,
    /// not a credential problem.
    pub async fn from_response(response: Response) -> Self {
        let status = response.status();
        let rate_limited = is_rate_limited(status, response.headers());
        let body = response.text().await.unwrap_or_default();
        if rate_limited {
            return Self::RateLimit(format!("HTTP {}: {}", status.as_u16(), error_message(&body)));
        }
        Self::from_status(status, error_message(&body))
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}

impl From<RemoteError> for TimesheetError {
    fn from(err: RemoteError) -> Self {
        let message = err.to_string();
        match err {
            RemoteError::Auth(_) => Self::Auth(message),
            RemoteError::Conflict(_) => Self::Conflict(message),
            RemoteError::NotFound(_) => Self::NotFound(message),
            RemoteError::Validation(_) => Self::InvalidInput(message),
            RemoteError::RateLimit(_)
            | RemoteError::Server(_)
            | RemoteError::Network(_)
            | RemoteError::Timeout(_) => Self::Network(message),
            RemoteError::Decode(_) => Self::Serialization(message),
        }
    }
}
