//! Port interfaces for sync operations

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use timesheet_domain::types::entry::EntryFilter;
use timesheet_domain::{
    Project, ProjectPatch, Result, Snapshot, TimeEntry, TimeEntryPatch, VersionToken,
    VersionedSnapshot,
};
use uuid::Uuid;

/// Durable on-device key-value persistence.
///
/// Calls are synchronous: every local mutation is written through before the
/// engine returns to the caller.
pub trait LocalStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Remote endpoint that stores the whole snapshot under a version token.
#[async_trait]
pub trait RemoteAuthority: Send + Sync {
    /// Short backend name for logs
    fn backend(&self) -> &'static str;

    /// Lightweight reachability probe
    async fn health_check(&self) -> Result<()>;

    /// Fetch the remote snapshot, or `None` when no remote data exists yet
    async fn fetch_snapshot(&self) -> Result<Option<VersionedSnapshot>>;

    /// Replace the remote snapshot.
    ///
    /// `expected` is the optimistic-concurrency precondition: the write fails
    /// with `TimesheetError::Conflict` when the remote revision differs. `None`
    /// means "create"; it conflicts if remote data already exists.
    async fn write_snapshot(
        &self,
        snapshot: &Snapshot,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken>;
}

/// Remote authority that additionally accepts per-record writes.
#[async_trait]
pub trait RecordRemote: RemoteAuthority {
    /// List every project
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// List entries matching `filter`
    async fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<TimeEntry>>;

    /// Create a project with a client-assigned id
    async fn create_project(&self, project: &Project) -> Result<Project>;

    /// Apply a partial update to a project
    async fn update_project(&self, id: Uuid, patch: &ProjectPatch) -> Result<Project>;

    /// Delete a project; the remote cascades to its entries
    async fn delete_project(&self, id: Uuid) -> Result<()>;

    /// Create an entry with a client-assigned id
    async fn create_entry(&self, entry: &TimeEntry) -> Result<TimeEntry>;

    /// Apply a partial update to an entry
    async fn update_entry(&self, id: Uuid, patch: &TimeEntryPatch) -> Result<TimeEntry>;

    /// Delete an entry
    async fn delete_entry(&self, id: Uuid) -> Result<()>;
}

/// Work scheduled on a [`Scheduler`]. Invoked once per firing.
pub type ScheduledJob = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Handle to a scheduled job
pub trait TaskHandle: Send + Sync {
    /// Stop any future firing. Idempotent.
    fn cancel(&self);

    /// Whether the job may still fire
    fn is_active(&self) -> bool;
}

/// Cancellable delayed and recurring jobs.
///
/// Production code runs on tokio timers; tests drive a virtual clock.
pub trait Scheduler: Send + Sync {
    /// Run `job` once after `delay`
    fn schedule_once(&self, delay: Duration, job: ScheduledJob) -> Box<dyn TaskHandle>;

    /// Run `job` every `interval`, first firing one interval from now
    fn schedule_repeating(&self, interval: Duration, job: ScheduledJob) -> Box<dyn TaskHandle>;
}
