//! Sync engine: the single entry point for reads and mutations

use std::sync::Arc;

use timesheet_domain::{
    ActiveTimer, NewProject, NewTimeEntry, Project, ProjectPatch, Result, Snapshot, SyncStatus,
    TimeEntry, TimeEntryPatch, TimesheetError,
};
use tokio::sync::{watch, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::mutation::{apply, Change, Mutation};
use super::state::LocalState;
use super::status::StatusCell;
use super::strategy::SyncStrategy;

/// Applies mutations locally and hands them to the configured
/// [`SyncStrategy`].
///
/// Mutations are serialized by an async gate so a rollback always restores
/// exactly the snapshot its own mutation replaced. Reconciliation only takes
/// the gate when the strategy replaces local state wholesale; otherwise remote
/// I/O runs beside local mutations.
pub struct SyncEngine {
    state: Arc<LocalState>,
    strategy: Arc<dyn SyncStrategy>,
    status: Arc<StatusCell>,
    gate: Mutex<()>,
}

impl SyncEngine {
    /// Wire an engine over loaded state and the strategy chosen for the remote.
    pub fn new(
        state: Arc<LocalState>,
        strategy: Arc<dyn SyncStrategy>,
        status: Arc<StatusCell>,
    ) -> Self {
        Self { state, strategy, status, gate: Mutex::new(()) }
    }

    /// Startup reconciliation with the remote.
    #[instrument(skip(self), fields(strategy = self.strategy.name()))]
    pub async fn initialize(&self) {
        let _gate = self.sync_gate().await;
        self.strategy.reconcile().await;
        let status = self.status.current();
        info!(mode = %status.mode, pending = status.pending, "sync engine initialized");
    }

    /// Create a project with a fresh id.
    pub async fn add_project(&self, input: NewProject) -> Result<Project> {
        match self.execute(Mutation::AddProject(input)).await? {
            Change::ProjectCreated(project) => Ok(project),
            other => Err(unexpected(&other)),
        }
    }

    /// Rename or recolor a project.
    pub async fn update_project(&self, id: Uuid, patch: ProjectPatch) -> Result<Project> {
        match self.execute(Mutation::UpdateProject { id, patch }).await? {
            Change::ProjectUpdated { project, .. } => Ok(project),
            other => Err(unexpected(&other)),
        }
    }

    /// Delete a project and every entry booked against it.
    ///
    /// A running timer on that project is discarded with it.
    pub async fn delete_project(&self, id: Uuid) -> Result<()> {
        self.execute(Mutation::DeleteProject(id)).await?;
        if self.state.timer().is_some_and(|timer| timer.project_id == id) {
            info!(project = %id, "discarding running timer of deleted project");
            self.state.set_timer(None)?;
        }
        Ok(())
    }

    /// Book a time entry against an existing project.
    pub async fn add_entry(&self, input: NewTimeEntry) -> Result<TimeEntry> {
        match self.execute(Mutation::AddEntry(input)).await? {
            Change::EntryCreated(entry) => Ok(entry),
            other => Err(unexpected(&other)),
        }
    }

    /// Apply a partial update to a time entry.
    pub async fn update_entry(&self, id: Uuid, patch: TimeEntryPatch) -> Result<TimeEntry> {
        match self.execute(Mutation::UpdateEntry { id, patch }).await? {
            Change::EntryUpdated { entry, .. } => Ok(entry),
            other => Err(unexpected(&other)),
        }
    }

    /// Delete one time entry.
    pub async fn delete_entry(&self, id: Uuid) -> Result<()> {
        self.execute(Mutation::DeleteEntry(id)).await.map(|_| ())
    }

    /// Caller-triggered sync.
    #[instrument(skip(self), fields(strategy = self.strategy.name()))]
    pub async fn sync_now(&self) -> Result<()> {
        let _gate = self.sync_gate().await;
        self.strategy.sync_now().await
    }

    /// Stop background sync work and flush what can be flushed.
    pub async fn shutdown(&self) {
        let _gate = self.sync_gate().await;
        self.strategy.shutdown().await;
        debug!(strategy = self.strategy.name(), "sync engine stopped");
    }

    /// Current in-memory snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    /// All projects.
    pub fn projects(&self) -> Vec<Project> {
        self.state.snapshot().projects
    }

    /// All time entries.
    pub fn entries(&self) -> Vec<TimeEntry> {
        self.state.snapshot().entries
    }

    /// Latest sync status.
    pub fn status(&self) -> SyncStatus {
        self.status.current()
    }

    /// Receiver that observes every sync status change.
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// The running timer, if any.
    pub fn timer(&self) -> Option<ActiveTimer> {
        self.state.timer()
    }

    /// Shared local state.
    pub const fn state(&self) -> &Arc<LocalState> {
        &self.state
    }

    /// Name of the active sync strategy, for logs.
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    async fn sync_gate(&self) -> Option<MutexGuard<'_, ()>> {
        if self.strategy.sync_replaces_state() {
            Some(self.gate.lock().await)
        } else {
            None
        }
    }

    async fn execute(&self, mutation: Mutation) -> Result<Change> {
        let _gate = self.gate.lock().await;
        let kind = mutation.kind();
        let now = self.state.clock().now_millis();

        let (prior, change) =
            self.state.update(|prior| apply(prior, mutation, now, Uuid::new_v4))?;
        debug!(mutation = kind, "applied locally");

        if let Err(err) = self.strategy.propagate(&change).await {
            if self.strategy.rolls_back() {
                warn!(mutation = kind, error = %err, "remote rejected change; rolling back");
                self.state.replace(prior)?;
                return Err(err);
            }
            warn!(mutation = kind, error = %err, "propagation failed; keeping local change");
        }
        Ok(change)
    }
}

fn unexpected(change: &Change) -> TimesheetError {
    TimesheetError::Internal(format!("unexpected change kind {}", change.kind()))
}
