//! Engine behaviour with the local-only and per-record strategies

mod support;

use std::sync::Arc;

use support::{day, local_engine, record_engine, FakeRecordRemote, InMemoryStore};
use timesheet_common::time::MockClock;
use timesheet_domain::{
    NewProject, NewTimeEntry, ProjectPatch, SyncMode, TimeEntryPatch, TimesheetError,
};
use uuid::Uuid;

#[tokio::test]
async fn local_store_matches_memory_after_every_mutation() {
    let store = InMemoryStore::new();
    let clock = MockClock::at(1_000);
    let engine = local_engine(&store, &clock);
    engine.initialize().await;

    let dev = engine.add_project(NewProject::new("Dev", "#3b82f6")).await.unwrap();
    assert_eq!(store.stored_snapshot(), engine.snapshot());

    clock.advance_millis(10);
    let entry = engine
        .add_entry(NewTimeEntry::manual(dev.id, "review", day(2024, 5, 6), 1.25))
        .await
        .unwrap();
    assert_eq!(store.stored_snapshot(), engine.snapshot());

    clock.advance_millis(10);
    engine.update_entry(entry.id, TimeEntryPatch::default().hours(2.0)).await.unwrap();
    engine.update_project(dev.id, ProjectPatch::default().name("Development")).await.unwrap();
    assert_eq!(store.stored_snapshot(), engine.snapshot());
    assert_eq!(engine.snapshot().last_modified, 1_020);

    engine.delete_entry(entry.id).await.unwrap();
    assert_eq!(store.stored_snapshot(), engine.snapshot());
    assert!(engine.entries().is_empty());
    assert_eq!(engine.status().mode, SyncMode::Unconfigured);
}

#[tokio::test]
async fn deleting_a_project_removes_exactly_its_entries() {
    let store = InMemoryStore::new();
    let clock = MockClock::at(1_000);
    let engine = local_engine(&store, &clock);

    let a = engine.add_project(NewProject::new("A", "#111111")).await.unwrap();
    let b = engine.add_project(NewProject::new("B", "#222222")).await.unwrap();
    for (project, task) in [(&a, "a1"), (&b, "b1"), (&a, "a2")] {
        engine
            .add_entry(NewTimeEntry::manual(project.id, task, day(2024, 5, 6), 1.0))
            .await
            .unwrap();
    }

    engine.delete_project(a.id).await.unwrap();

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.projects, vec![b.clone()]);
    assert_eq!(snapshot.entries.len(), 1);
    assert!(snapshot.entries.iter().all(|e| e.project_id == b.id));
    assert_eq!(store.stored_snapshot(), snapshot);
}

#[tokio::test]
async fn invalid_input_touches_nothing() {
    let store = InMemoryStore::new();
    let clock = MockClock::at(1_000);
    let remote = Arc::new(FakeRecordRemote::new());
    let engine = record_engine(&store, &clock, remote.clone());
    let before = engine.snapshot();

    let err = engine.add_project(NewProject::new("Dev", "blue")).await.unwrap_err();
    assert!(matches!(err, TimesheetError::InvalidInput(_)));

    let err = engine
        .add_entry(NewTimeEntry::manual(Uuid::new_v4(), "x", day(2024, 5, 6), 1.0))
        .await
        .unwrap_err();
    assert!(matches!(err, TimesheetError::InvalidInput(_)));

    assert_eq!(engine.snapshot(), before);
    assert_eq!(store.stored_snapshot(), before);
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn record_failure_restores_the_prior_snapshot() {
    let store = InMemoryStore::new();
    let clock = MockClock::at(1_000);
    let remote = Arc::new(FakeRecordRemote::new());
    let engine = record_engine(&store, &clock, remote.clone());
    engine.initialize().await;

    let dev = engine.add_project(NewProject::new("Dev", "#3b82f6")).await.unwrap();
    assert_eq!(remote.projects(), vec![dev.clone()]);
    let before = engine.snapshot();

    remote.fail_with(Some(TimesheetError::Network("connection refused".into())));
    clock.advance_millis(500);

    let err = engine.update_project(dev.id, ProjectPatch::default().color("#000000")).await;
    assert!(matches!(err, Err(TimesheetError::Network(_))));
    let err = engine.add_project(NewProject::new("Ops", "#ef4444")).await;
    assert!(err.is_err());

    assert_eq!(engine.snapshot(), before);
    assert_eq!(store.stored_snapshot(), before);

    let status = engine.status();
    assert_eq!(status.mode, SyncMode::Offline);
    assert!(status.last_error.unwrap().contains("connection refused"));
}

#[tokio::test]
async fn remote_not_found_rolls_back_the_delete() {
    let store = InMemoryStore::new();
    let clock = MockClock::at(1_000);
    let remote = Arc::new(FakeRecordRemote::new());
    let engine = record_engine(&store, &clock, remote.clone());

    let dev = engine.add_project(NewProject::new("Dev", "#3b82f6")).await.unwrap();
    let entry = engine
        .add_entry(NewTimeEntry::manual(dev.id, "x", day(2024, 5, 6), 1.0))
        .await
        .unwrap();

    // removed behind our back
    remote.seed(vec![dev], Vec::new());

    let err = engine.delete_entry(entry.id).await.unwrap_err();
    assert!(matches!(err, TimesheetError::NotFound(_)));
    assert_eq!(engine.entries(), vec![entry]);
    assert_eq!(engine.status().mode, SyncMode::Online);
}

#[tokio::test]
async fn record_changes_replay_as_matching_calls() {
    let store = InMemoryStore::new();
    let clock = MockClock::at(1_000);
    let remote = Arc::new(FakeRecordRemote::new());
    let engine = record_engine(&store, &clock, remote.clone());

    let dev = engine.add_project(NewProject::new("Dev", "#3b82f6")).await.unwrap();
    let entry = engine
        .add_entry(NewTimeEntry::manual(dev.id, "x", day(2024, 5, 6), 1.0))
        .await
        .unwrap();
    engine.update_entry(entry.id, TimeEntryPatch::default().task("y")).await.unwrap();
    engine.delete_project(dev.id).await.unwrap();

    assert_eq!(
        remote.calls(),
        vec!["create_project", "create_entry", "update_entry", "delete_project"]
    );
    assert!(remote.entries().is_empty());
    assert!(engine.entries().is_empty());
}

#[tokio::test]
async fn startup_resync_replaces_local_state() {
    let store = InMemoryStore::new();
    let clock = MockClock::at(5_000);

    let local_only = local_engine(&store, &clock);
    local_only.add_project(NewProject::new("Stale", "#111111")).await.unwrap();
    drop(local_only);

    let remote = Arc::new(FakeRecordRemote::new());
    let fresh = NewProject::new("Fresh", "#222222").into_project(Uuid::new_v4());
    let booked =
        NewTimeEntry::manual(fresh.id, "t", day(2024, 5, 6), 3.0).into_entry(Uuid::new_v4());
    remote.seed(vec![fresh.clone()], vec![booked.clone()]);

    let engine = record_engine(&store, &clock, remote.clone());
    engine.initialize().await;

    assert_eq!(engine.projects(), vec![fresh]);
    assert_eq!(engine.entries(), vec![booked]);
    assert_eq!(store.stored_snapshot(), engine.snapshot());
    assert_eq!(engine.status().mode, SyncMode::Online);
    assert_eq!(engine.status().last_sync_time, Some(5_000));
}

#[tokio::test]
async fn unreachable_remote_at_startup_keeps_local_data() {
    let store = InMemoryStore::new();
    let clock = MockClock::at(5_000);
    let remote = Arc::new(FakeRecordRemote::new());
    remote.fail_with(Some(TimesheetError::Network("timeout".into())));

    let engine = record_engine(&store, &clock, remote.clone());
    let before = engine.snapshot();
    engine.initialize().await;

    assert_eq!(engine.snapshot(), before);
    assert_eq!(engine.status().mode, SyncMode::Offline);
    assert_eq!(remote.calls(), vec!["health"]);

    remote.fail_with(None);
    engine.sync_now().await.unwrap();
    assert_eq!(engine.status().mode, SyncMode::Online);
}
