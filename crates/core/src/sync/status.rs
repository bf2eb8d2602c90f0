//! Observable sync status

use timesheet_domain::{SyncMode, SyncStatus, TimesheetError};
use tokio::sync::watch;

/// Shared, watchable [`SyncStatus`].
///
/// Strategies write to it; callers read a copy or subscribe for changes.
#[derive(Debug)]
pub struct StatusCell {
    tx: watch::Sender<SyncStatus>,
}

impl StatusCell {
    /// Cell starting in `mode` with nothing pending.
    pub fn new(mode: SyncMode) -> Self {
        let (tx, _rx) = watch::channel(SyncStatus::new(mode));
        Self { tx }
    }

    /// Copy of the current status.
    pub fn current(&self) -> SyncStatus {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.tx.subscribe()
    }

    /// Apply `f` and notify subscribers.
    pub fn modify(&self, f: impl FnOnce(&mut SyncStatus)) {
        self.tx.send_modify(f);
    }

    /// Mark a remote round trip as started or finished.
    pub fn set_syncing(&self, syncing: bool) {
        self.modify(|s| s.syncing = syncing);
    }

    /// Mark whether local changes await a push.
    pub fn set_pending(&self, pending: bool) {
        self.modify(|s| s.pending = pending);
    }

    /// A remote interaction succeeded at `now`.
    pub fn record_success(&self, now: i64) {
        self.modify(|s| {
            s.mode = SyncMode::Online;
            s.syncing = false;
            s.last_sync_time = Some(now);
            s.last_error = None;
        });
    }

    /// A remote interaction failed. Transport failures flip the mode to
    /// offline; other failures keep the mode and only record the message.
    pub fn record_failure(&self, err: &TimesheetError) {
        let offline = matches!(err, TimesheetError::Network(_) | TimesheetError::Auth(_));
        self.modify(|s| {
            if offline && s.mode != SyncMode::Unconfigured {
                s.mode = SyncMode::Offline;
            }
            s.syncing = false;
            s.last_error = Some(err.to_string());
        });
    }
}
