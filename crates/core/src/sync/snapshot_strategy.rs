//! Whole-snapshot propagation for blob-style remotes

use std::sync::Arc;

use async_trait::async_trait;
use timesheet_domain::Result;
use tracing::debug;

use super::mutation::Change;
use super::push::PushCoordinator;
use super::strategy::SyncStrategy;

/// Fire-and-forget propagation: every change marks the snapshot dirty and the
/// [`PushCoordinator`] delivers it with debounce, periodic retry and conflict
/// resolution. Local changes are never rolled back.
pub struct SnapshotSyncStrategy {
    coordinator: Arc<PushCoordinator>,
}

impl SnapshotSyncStrategy {
    /// Strategy delegating every push to `coordinator`.
    pub const fn new(coordinator: Arc<PushCoordinator>) -> Self {
        Self { coordinator }
    }

    /// The coordinator owning the pending flag and push tasks.
    pub const fn coordinator(&self) -> &Arc<PushCoordinator> {
        &self.coordinator
    }
}

#[async_trait]
impl SyncStrategy for SnapshotSyncStrategy {
    fn name(&self) -> &'static str {
        "snapshot_push"
    }

    fn rolls_back(&self) -> bool {
        false
    }

    async fn reconcile(&self) {
        self.coordinator.reconcile().await;
    }

    async fn propagate(&self, change: &Change) -> Result<()> {
        debug!(change = change.kind(), "snapshot marked dirty");
        self.coordinator.mark_dirty();
        Ok(())
    }

    async fn sync_now(&self) -> Result<()> {
        self.coordinator.sync_now().await.map(|_| ())
    }

    async fn shutdown(&self) {
        self.coordinator.shutdown().await;
    }
}
