//! Sync status surfaced to callers

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Connectivity of the engine to its remote authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// No remote configured; local store only.
    Unconfigured,
    /// Last remote interaction succeeded.
    Online,
    /// Remote configured but unreachable or failing.
    Offline,
}

impl_domain_status_conversions!(SyncMode {
    Unconfigured => "unconfigured",
    Online => "online",
    Offline => "offline",
});

/// Observable sync state. Errors recorded here are non-fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub mode: SyncMode,
    /// Local changes not yet confirmed by the remote.
    pub pending: bool,
    /// A remote push or resync is in flight.
    pub syncing: bool,
    pub last_sync_time: Option<i64>,
    pub last_error: Option<String>,
}

impl SyncStatus {
    pub const fn new(mode: SyncMode) -> Self {
        Self { mode, pending: false, syncing: false, last_sync_time: None, last_error: None }
    }

    pub const fn is_configured(&self) -> bool {
        !matches!(self.mode, SyncMode::Unconfigured)
    }
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self::new(SyncMode::Unconfigured)
    }
}
