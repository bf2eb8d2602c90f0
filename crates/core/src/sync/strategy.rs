//! Propagation policy seam between the engine and a remote backend

use async_trait::async_trait;
use timesheet_domain::Result;
use tracing::debug;

use super::mutation::Change;

/// How committed local changes reach the remote authority.
///
/// The engine never branches on backend identity; it applies a mutation
/// locally, hands the [`Change`] to the strategy and, when
/// [`SyncStrategy::rolls_back`] is true, restores the prior snapshot if
/// propagation fails.
#[async_trait]
pub trait SyncStrategy: Send + Sync {
    /// Strategy name for logs
    fn name(&self) -> &'static str;

    /// Whether a failed [`SyncStrategy::propagate`] must undo the local change
    fn rolls_back(&self) -> bool;

    /// Whether reconcile and sync overwrite local state wholesale and so must
    /// not overlap a mutation.
    fn sync_replaces_state(&self) -> bool {
        false
    }

    /// Startup reconciliation with the remote. Failures are recorded in the
    /// sync status and leave local state authoritative; they are not returned.
    async fn reconcile(&self);

    /// Push a committed change toward the remote
    async fn propagate(&self, change: &Change) -> Result<()>;

    /// Caller-triggered sync: resync from the remote or flush pending pushes
    async fn sync_now(&self) -> Result<()>;

    /// Stop background work, flushing what can be flushed
    async fn shutdown(&self);
}

/// No remote configured: the local store is the only authority.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalOnlyStrategy;

#[async_trait]
impl SyncStrategy for LocalOnlyStrategy {
    fn name(&self) -> &'static str {
        "local_only"
    }

    fn rolls_back(&self) -> bool {
        false
    }

    async fn reconcile(&self) {
        debug!("remote sync disabled; using local store only");
    }

    async fn propagate(&self, _change: &Change) -> Result<()> {
        Ok(())
    }

    async fn sync_now(&self) -> Result<()> {
        Ok(())
    }

    async fn shutdown(&self) {}
}
