//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Timesheet
///
/// The variants map onto the failure kinds the sync engine reacts to:
/// `Network` is a transport failure (retried or rolled back), `Conflict` is a
/// version token mismatch, `NotFound` is an absent remote record and
/// `InvalidInput` is rejected before any mutation happens.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum TimesheetError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TimesheetError {
    /// Short, stable label for logs and metrics.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::Storage(_) => "storage",
            Self::Serialization(_) => "serialization",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether a later attempt may succeed without any change in input.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Conflict(_))
    }
}

impl From<serde_json::Error> for TimesheetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for Timesheet operations
pub type Result<T> = std::result::Result<T, TimesheetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = TimesheetError::Conflict("stale token".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Conflict");
        assert_eq!(json["message"], "stale token");
    }

    #[test]
    fn transient_kinds() {
        assert!(TimesheetError::Network("down".into()).is_transient());
        assert!(TimesheetError::Conflict("v1".into()).is_transient());
        assert!(!TimesheetError::NotFound("x".into()).is_transient());
        assert!(!TimesheetError::InvalidInput("x".into()).is_transient());
    }

    #[test]
    fn json_errors_become_serialization() {
        let err: TimesheetError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.label(), "serialization");
    }
}
