//! In-memory remote authorities

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use timesheet_core::sync::{RecordRemote, RemoteAuthority};
use timesheet_domain::{
    EntryFilter, Project, ProjectPatch, Result as DomainResult, Snapshot, TimeEntry,
    TimeEntryPatch, TimesheetError, VersionToken, VersionedSnapshot,
};
use uuid::Uuid;

#[derive(Default)]
struct Blob {
    snapshot: Option<Snapshot>,
    revision: u64,
    writes: Vec<Snapshot>,
    fetches: usize,
    offline: bool,
    forced_conflicts: u32,
}

impl Blob {
    fn token(&self) -> Option<VersionToken> {
        self.snapshot.as_ref().map(|_| VersionToken::new(format!("v{}", self.revision)))
    }
}

/// Versioned single-document remote, like a file in a git repository.
///
/// Tokens are `v1`, `v2`, ... and change on every successful write.
#[derive(Default)]
pub struct FakeBlobRemote {
    blob: Mutex<Blob>,
}

impl FakeBlobRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let remote = Self::new();
        remote.put(snapshot);
        remote
    }

    /// Another client wrote `snapshot`.
    pub fn put(&self, snapshot: Snapshot) -> VersionToken {
        let mut blob = self.blob.lock();
        blob.revision += 1;
        blob.snapshot = Some(snapshot);
        VersionToken::new(format!("v{}", blob.revision))
    }

    pub fn set_offline(&self, offline: bool) {
        self.blob.lock().offline = offline;
    }

    /// The next `n` writes fail with a conflict whatever token they carry.
    pub fn force_conflicts(&self, n: u32) {
        self.blob.lock().forced_conflicts = n;
    }

    pub fn current(&self) -> Option<Snapshot> {
        self.blob.lock().snapshot.clone()
    }

    pub fn token(&self) -> Option<VersionToken> {
        self.blob.lock().token()
    }

    pub fn writes(&self) -> Vec<Snapshot> {
        self.blob.lock().writes.clone()
    }

    pub fn write_count(&self) -> usize {
        self.blob.lock().writes.len()
    }

    pub fn fetch_count(&self) -> usize {
        self.blob.lock().fetches
    }
}

fn offline() -> TimesheetError {
    TimesheetError::Network("remote unreachable".into())
}

#[async_trait]
impl RemoteAuthority for FakeBlobRemote {
    fn backend(&self) -> &'static str {
        "fake_blob"
    }

    async fn health_check(&self) -> DomainResult<()> {
        if self.blob.lock().offline {
            return Err(offline());
        }
        Ok(())
    }

    async fn fetch_snapshot(&self) -> DomainResult<Option<VersionedSnapshot>> {
        let mut blob = self.blob.lock();
        if blob.offline {
            return Err(offline());
        }
        blob.fetches += 1;
        let token = blob.token();
        Ok(blob
            .snapshot
            .clone()
            .zip(token)
            .map(|(snapshot, version)| VersionedSnapshot { snapshot, version }))
    }

    async fn write_snapshot(
        &self,
        snapshot: &Snapshot,
        expected: Option<&VersionToken>,
    ) -> DomainResult<VersionToken> {
        let mut blob = self.blob.lock();
        if blob.offline {
            return Err(offline());
        }
        if blob.forced_conflicts > 0 {
            blob.forced_conflicts -= 1;
            return Err(TimesheetError::Conflict("forced".into()));
        }
        if blob.token().as_ref() != expected {
            return Err(TimesheetError::Conflict(format!(
                "expected {:?}, remote at {:?}",
                expected.map(VersionToken::as_str),
                blob.token().map(|t| t.to_string())
            )));
        }
        blob.revision += 1;
        blob.snapshot = Some(snapshot.clone());
        blob.writes.push(snapshot.clone());
        Ok(VersionToken::new(format!("v{}", blob.revision)))
    }
}

/// Remote whose snapshot calls never complete, like a stalled connection.
#[derive(Default)]
pub struct HangingRemote;

#[async_trait]
impl RemoteAuthority for HangingRemote {
    fn backend(&self) -> &'static str {
        "hanging"
    }

    async fn health_check(&self) -> DomainResult<()> {
        std::future::pending().await
    }

    async fn fetch_snapshot(&self) -> DomainResult<Option<VersionedSnapshot>> {
        std::future::pending().await
    }

    async fn write_snapshot(
        &self,
        _snapshot: &Snapshot,
        _expected: Option<&VersionToken>,
    ) -> DomainResult<VersionToken> {
        std::future::pending().await
    }
}

/// [`FakeBlobRemote`] whose writes wait for [`GatedRemote::release`].
pub struct GatedRemote {
    inner: FakeBlobRemote,
    gate: Semaphore,
    writing: AtomicUsize,
    max_writing: AtomicUsize,
}

impl GatedRemote {
    pub fn new() -> Self {
        Self {
            inner: FakeBlobRemote::new(),
            gate: Semaphore::new(0),
            writing: AtomicUsize::new(0),
            max_writing: AtomicUsize::new(0),
        }
    }

    /// Let `n` parked writes through.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn inner(&self) -> &FakeBlobRemote {
        &self.inner
    }

    pub fn writes_in_flight(&self) -> usize {
        self.writing.load(Ordering::SeqCst)
    }

    pub fn max_concurrent_writes(&self) -> usize {
        self.max_writing.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteAuthority for GatedRemote {
    fn backend(&self) -> &'static str {
        "gated_blob"
    }

    async fn health_check(&self) -> DomainResult<()> {
        self.inner.health_check().await
    }

    async fn fetch_snapshot(&self) -> DomainResult<Option<VersionedSnapshot>> {
        self.inner.fetch_snapshot().await
    }

    async fn write_snapshot(
        &self,
        snapshot: &Snapshot,
        expected: Option<&VersionToken>,
    ) -> DomainResult<VersionToken> {
        let now = self.writing.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_writing.fetch_max(now, Ordering::SeqCst);
        let permit = self.gate.acquire().await;
        let result = match permit {
            Ok(permit) => {
                permit.forget();
                self.inner.write_snapshot(snapshot, expected).await
            }
            Err(_) => Err(TimesheetError::Internal("gate closed".into())),
        };
        self.writing.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[derive(Default)]
struct Records {
    projects: Vec<Project>,
    entries: Vec<TimeEntry>,
    calls: Vec<String>,
    failure: Option<TimesheetError>,
}

/// Per-record remote with a call log and switchable failures.
#[derive(Default)]
pub struct FakeRecordRemote {
    records: Mutex<Records>,
}

impl FakeRecordRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, projects: Vec<Project>, entries: Vec<TimeEntry>) {
        let mut records = self.records.lock();
        records.projects = projects;
        records.entries = entries;
    }

    /// Every following call fails with `err` until cleared with `None`.
    pub fn fail_with(&self, err: Option<TimesheetError>) {
        self.records.lock().failure = err;
    }

    pub fn calls(&self) -> Vec<String> {
        self.records.lock().calls.clone()
    }

    pub fn projects(&self) -> Vec<Project> {
        self.records.lock().projects.clone()
    }

    pub fn entries(&self) -> Vec<TimeEntry> {
        self.records.lock().entries.clone()
    }

    fn enter(&self, call: &str) -> DomainResult<parking_lot::MutexGuard<'_, Records>> {
        let mut records = self.records.lock();
        records.calls.push(call.to_string());
        if let Some(err) = records.failure.clone() {
            return Err(err);
        }
        Ok(records)
    }
}

#[async_trait]
impl RemoteAuthority for FakeRecordRemote {
    fn backend(&self) -> &'static str {
        "fake_records"
    }

    async fn health_check(&self) -> DomainResult<()> {
        self.enter("health").map(|_| ())
    }

    async fn fetch_snapshot(&self) -> DomainResult<Option<VersionedSnapshot>> {
        let records = self.enter("fetch_snapshot")?;
        Ok(Some(VersionedSnapshot {
            snapshot: Snapshot {
                projects: records.projects.clone(),
                entries: records.entries.clone(),
                last_modified: 0,
            },
            version: VersionToken::new("records"),
        }))
    }

    async fn write_snapshot(
        &self,
        _snapshot: &Snapshot,
        _expected: Option<&VersionToken>,
    ) -> DomainResult<VersionToken> {
        Err(TimesheetError::Internal("snapshot writes unsupported".into()))
    }
}

#[async_trait]
impl RecordRemote for FakeRecordRemote {
    async fn list_projects(&self) -> DomainResult<Vec<Project>> {
        Ok(self.enter("list_projects")?.projects.clone())
    }

    async fn list_entries(&self, filter: &EntryFilter) -> DomainResult<Vec<TimeEntry>> {
        let records = self.enter("list_entries")?;
        Ok(records.entries.iter().filter(|e| filter.matches(e)).cloned().collect())
    }

    async fn create_project(&self, project: &Project) -> DomainResult<Project> {
        let mut records = self.enter("create_project")?;
        records.projects.push(project.clone());
        Ok(project.clone())
    }

    async fn update_project(&self, id: Uuid, patch: &ProjectPatch) -> DomainResult<Project> {
        let mut records = self.enter("update_project")?;
        let slot = records
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| TimesheetError::NotFound(format!("project {id}")))?;
        *slot = patch.apply_to(slot);
        Ok(slot.clone())
    }

    async fn delete_project(&self, id: Uuid) -> DomainResult<()> {
        let mut records = self.enter("delete_project")?;
        let before = records.projects.len();
        records.projects.retain(|p| p.id != id);
        if records.projects.len() == before {
            return Err(TimesheetError::NotFound(format!("project {id}")));
        }
        records.entries.retain(|e| e.project_id != id);
        Ok(())
    }

    async fn create_entry(&self, entry: &TimeEntry) -> DomainResult<TimeEntry> {
        let mut records = self.enter("create_entry")?;
        records.entries.push(entry.clone());
        Ok(entry.clone())
    }

    async fn update_entry(&self, id: Uuid, patch: &TimeEntryPatch) -> DomainResult<TimeEntry> {
        let mut records = self.enter("update_entry")?;
        let slot = records
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| TimesheetError::NotFound(format!("entry {id}")))?;
        *slot = patch.apply_to(slot);
        Ok(slot.clone())
    }

    async fn delete_entry(&self, id: Uuid) -> DomainResult<()> {
        let mut records = self.enter("delete_entry")?;
        let before = records.entries.len();
        records.entries.retain(|e| e.id != id);
        if records.entries.len() == before {
            return Err(TimesheetError::NotFound(format!("entry {id}")));
        }
        Ok(())
    }
}
