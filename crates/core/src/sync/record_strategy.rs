//! Per-record propagation for CRUD remotes

use std::sync::Arc;

use async_trait::async_trait;
use timesheet_domain::{EntryFilter, Result, Snapshot};
use tracing::{info, instrument, warn};

use super::mutation::Change;
use super::ports::RecordRemote;
use super::state::LocalState;
use super::status::StatusCell;
use super::strategy::SyncStrategy;

/// Replays each change as the matching remote create/update/delete.
///
/// A failed call is returned to the engine, which restores the prior
/// snapshot. [`RecordSyncStrategy::resync`] replaces local state with the
/// remote's full project and entry lists.
pub struct RecordSyncStrategy {
    remote: Arc<dyn RecordRemote>,
    state: Arc<LocalState>,
    status: Arc<StatusCell>,
}

impl RecordSyncStrategy {
    /// Strategy over `remote`, writing resynced lists into `state`.
    pub fn new(
        remote: Arc<dyn RecordRemote>,
        state: Arc<LocalState>,
        status: Arc<StatusCell>,
    ) -> Self {
        Self { remote, state, status }
    }

    /// Re-fetch everything and replace local state wholesale.
    #[instrument(skip(self), fields(backend = self.remote.backend()))]
    pub async fn resync(&self) -> Result<()> {
        self.status.set_syncing(true);
        let filter = EntryFilter::default();
        let fetched =
            futures::try_join!(self.remote.list_projects(), self.remote.list_entries(&filter));

        let (projects, entries) = match fetched {
            Ok(lists) => lists,
            Err(err) => {
                self.status.record_failure(&err);
                return Err(err);
            }
        };

        let now = self.state.clock().now_millis();
        info!(projects = projects.len(), entries = entries.len(), "resynced from remote");
        self.state.replace(Snapshot { projects, entries, last_modified: now })?;
        self.status.record_success(now);
        Ok(())
    }

    async fn probe_and_resync(&self) -> Result<()> {
        if let Err(err) = self.remote.health_check().await {
            self.status.record_failure(&err);
            return Err(err);
        }
        self.resync().await
    }

    async fn replay(&self, change: &Change) -> Result<()> {
        match change {
            Change::ProjectCreated(project) => {
                self.remote.create_project(project).await.map(|_| ())
            }
            Change::ProjectUpdated { project, patch } => {
                self.remote.update_project(project.id, patch).await.map(|_| ())
            }
            Change::ProjectDeleted { id, .. } => self.remote.delete_project(*id).await,
            Change::EntryCreated(entry) => self.remote.create_entry(entry).await.map(|_| ()),
            Change::EntryUpdated { entry, patch } => {
                self.remote.update_entry(entry.id, patch).await.map(|_| ())
            }
            Change::EntryDeleted(id) => self.remote.delete_entry(*id).await,
        }
    }
}

#[async_trait]
impl SyncStrategy for RecordSyncStrategy {
    fn name(&self) -> &'static str {
        "record_write"
    }

    fn rolls_back(&self) -> bool {
        true
    }

    fn sync_replaces_state(&self) -> bool {
        true
    }

    async fn reconcile(&self) {
        if let Err(err) = self.probe_and_resync().await {
            warn!(error = %err, "remote unavailable at startup; continuing with local data");
        }
    }

    async fn propagate(&self, change: &Change) -> Result<()> {
        match self.replay(change).await {
            Ok(()) => {
                self.status.record_success(self.state.clock().now_millis());
                Ok(())
            }
            Err(err) => {
                self.status.record_failure(&err);
                Err(err)
            }
        }
    }

    async fn sync_now(&self) -> Result<()> {
        self.probe_and_resync().await
    }

    async fn shutdown(&self) {}
}
