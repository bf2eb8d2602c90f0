//! Shared test helpers for `timesheet-core` integration tests.
//!
//! In-memory fakes for every core port plus a virtual-time scheduler, so
//! sync behaviour can be driven step by step without I/O or real timers.

#![allow(dead_code)]

pub mod remotes;
pub mod scheduler;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use timesheet_common::time::MockClock;
use timesheet_core::sync::{
    LocalState, LocalStore, PushCoordinator, PushSettings, RecordRemote, RecordSyncStrategy,
    RemoteAuthority, SnapshotSyncStrategy, StatusCell, SyncEngine, SyncStrategy,
};
use timesheet_core::LocalOnlyStrategy;
use timesheet_domain::constants::SNAPSHOT_KEY;
use timesheet_domain::{Result as DomainResult, Snapshot, SyncMode};

pub use remotes::{FakeBlobRemote, FakeRecordRemote, GatedRemote, HangingRemote};
pub use scheduler::ManualScheduler;

/// `LocalStore` over a shared map. Clones see the same data.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    values: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_json<T: serde::Serialize>(&self, key: &str, value: &T) {
        let raw = serde_json::to_vec(value).unwrap();
        self.values.lock().insert(key.to_string(), raw);
    }

    pub fn put_raw(&self, key: &str, raw: &[u8]) {
        self.values.lock().insert(key.to_string(), raw.to_vec());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.lock().contains_key(key)
    }

    /// The snapshot as persisted, decoded.
    pub fn stored_snapshot(&self) -> Snapshot {
        let raw = self.values.lock().get(SNAPSHOT_KEY).cloned().unwrap();
        serde_json::from_slice(&raw).unwrap()
    }
}

impl LocalStore for InMemoryStore {
    fn get(&self, key: &str) -> DomainResult<Option<Vec<u8>>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> DomainResult<()> {
        self.values.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> DomainResult<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Short timings so tests read in whole seconds.
pub fn fast_settings() -> PushSettings {
    PushSettings {
        debounce: std::time::Duration::from_secs(2),
        interval: std::time::Duration::from_secs(30),
        max_conflict_retries: 3,
    }
}

pub fn load_state(store: &InMemoryStore, clock: &MockClock) -> Arc<LocalState> {
    Arc::new(LocalState::load(Arc::new(store.clone()), Arc::new(clock.clone())).unwrap())
}

/// Engine wired to the snapshot strategy over `remote`.
pub struct BlobHarness {
    pub store: InMemoryStore,
    pub clock: MockClock,
    pub remote: Arc<FakeBlobRemote>,
    pub scheduler: Arc<ManualScheduler>,
    pub coordinator: Arc<PushCoordinator>,
    pub engine: Arc<SyncEngine>,
}

impl BlobHarness {
    pub fn new(store: InMemoryStore, clock: MockClock, remote: Arc<FakeBlobRemote>) -> Self {
        Self::with_settings(store, clock, remote, fast_settings())
    }

    pub fn with_settings(
        store: InMemoryStore,
        clock: MockClock,
        remote: Arc<FakeBlobRemote>,
        settings: PushSettings,
    ) -> Self {
        let state = load_state(&store, &clock);
        let status = Arc::new(StatusCell::new(SyncMode::Offline));
        let scheduler = Arc::new(ManualScheduler::new());
        let coordinator = PushCoordinator::new(
            remote.clone() as Arc<dyn RemoteAuthority>,
            state.clone(),
            status.clone(),
            scheduler.clone(),
            settings,
        );
        let strategy: Arc<dyn SyncStrategy> =
            Arc::new(SnapshotSyncStrategy::new(coordinator.clone()));
        let engine = Arc::new(SyncEngine::new(state, strategy, status));
        Self { store, clock, remote, scheduler, coordinator, engine }
    }
}

/// Snapshot-strategy engine over any remote, on a manual scheduler.
pub fn snapshot_engine(
    store: &InMemoryStore,
    clock: &MockClock,
    remote: Arc<dyn RemoteAuthority>,
) -> (Arc<PushCoordinator>, Arc<SyncEngine>) {
    let state = load_state(store, clock);
    let status = Arc::new(StatusCell::new(SyncMode::Offline));
    let coordinator = PushCoordinator::new(
        remote,
        state.clone(),
        status.clone(),
        Arc::new(ManualScheduler::new()),
        fast_settings(),
    );
    let strategy: Arc<dyn SyncStrategy> = Arc::new(SnapshotSyncStrategy::new(coordinator.clone()));
    (coordinator, Arc::new(SyncEngine::new(state, strategy, status)))
}

/// Engine wired to the record strategy over `remote`.
pub fn record_engine(
    store: &InMemoryStore,
    clock: &MockClock,
    remote: Arc<FakeRecordRemote>,
) -> Arc<SyncEngine> {
    let state = load_state(store, clock);
    let status = Arc::new(StatusCell::new(SyncMode::Offline));
    let strategy: Arc<dyn SyncStrategy> = Arc::new(RecordSyncStrategy::new(
        remote as Arc<dyn RecordRemote>,
        state.clone(),
        status.clone(),
    ));
    Arc::new(SyncEngine::new(state, strategy, status))
}

/// Engine with no remote at all.
pub fn local_engine(store: &InMemoryStore, clock: &MockClock) -> Arc<SyncEngine> {
    let state = load_state(store, clock);
    let status = Arc::new(StatusCell::new(SyncMode::Unconfigured));
    Arc::new(SyncEngine::new(state, Arc::new(LocalOnlyStrategy), status))
}
