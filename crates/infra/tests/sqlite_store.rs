//! Engine state persisted through the SQLite local store

mod support;

use std::sync::Arc;

use chrono::NaiveDate;
use support::TestStore;
use timesheet_common::time::{Clock, MockClock};
use timesheet_core::sync::{LocalState, StatusCell, SyncEngine};
use timesheet_core::{LocalOnlyStrategy, LocalStore, TimerService};
use timesheet_domain::constants::SNAPSHOT_KEY;
use timesheet_domain::{NewProject, NewTimeEntry, SyncMode};

fn engine_on(store: Arc<dyn LocalStore>, clock: &MockClock) -> Arc<SyncEngine> {
    let clock: Arc<dyn Clock> = Arc::new(clock.clone());
    let state = Arc::new(LocalState::load(store, clock).unwrap());
    let status = Arc::new(StatusCell::new(SyncMode::Unconfigured));
    Arc::new(SyncEngine::new(state, Arc::new(LocalOnlyStrategy), status))
}

#[tokio::test]
async fn snapshot_and_timer_survive_reopen() {
    let db = TestStore::new();
    let clock = MockClock::at(1_000);

    let engine = engine_on(db.store.clone(), &clock);
    let dev = engine.add_project(NewProject::new("Dev", "#3b82f6")).await.unwrap();
    let day = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
    engine.add_entry(NewTimeEntry::manual(dev.id, "review", day, 2.5)).await.unwrap();
    let running = TimerService::new(engine.clone()).start(dev.id, "pairing").unwrap();
    let before = engine.snapshot();
    drop(engine);

    let reopened = engine_on(db.reopen(), &clock);
    assert_eq!(reopened.snapshot(), before);
    assert_eq!(reopened.timer(), Some(running));
}

#[tokio::test]
async fn corrupt_snapshot_falls_back_to_empty_state() {
    let db = TestStore::new();
    db.store.set(SNAPSHOT_KEY, b"not json at all").unwrap();
    let clock = MockClock::at(42_000);

    let engine = engine_on(db.store.clone(), &clock);

    assert!(engine.projects().is_empty());
    assert!(engine.entries().is_empty());
    // the replacement is written back so the next start is clean
    let raw = db.reopen().get(SNAPSHOT_KEY).unwrap().unwrap();
    assert!(serde_json::from_slice::<serde_json::Value>(&raw).is_ok());
}
