//! Hybrid sync engine
//!
//! The local store is authoritative for reads. Every mutation is applied
//! locally first and then handed to a [`SyncStrategy`]:
//! - [`RecordSyncStrategy`] replays it as a per-record remote call and rolls
//!   back on failure
//! - [`SnapshotSyncStrategy`] marks the snapshot dirty; [`PushCoordinator`]
//!   delivers it later with debounce and periodic retry
//! - [`LocalOnlyStrategy`] keeps everything local

pub mod engine;
pub mod mutation;
pub mod ports;
pub mod push;
pub mod record_strategy;
pub mod snapshot_strategy;
pub mod state;
pub mod status;
pub mod strategy;

pub use engine::SyncEngine;
pub use mutation::{apply, Change, Mutation};
pub use ports::{LocalStore, RecordRemote, RemoteAuthority, ScheduledJob, Scheduler, TaskHandle};
pub use push::{PushCoordinator, PushOutcome, PushSettings};
pub use record_strategy::RecordSyncStrategy;
pub use snapshot_strategy::SnapshotSyncStrategy;
pub use state::LocalState;
pub use status::StatusCell;
pub use strategy::{LocalOnlyStrategy, SyncStrategy};
