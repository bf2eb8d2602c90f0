//! # Timesheet Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The sync engine: local-first mutations, remote propagation strategies,
//!   startup reconciliation and debounced snapshot pushes
//! - Port interfaces (traits) for the local store, remote authorities and
//!   the task scheduler
//! - The active timer service
//! - Report aggregation over projects and entries
//!
//! ## Architecture Principles
//! - Only depends on `timesheet-common` and `timesheet-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod reports;
pub mod sync;
pub mod timer;

pub use reports::{ProjectSummary, WeeklyTimesheet};
pub use sync::{
    LocalOnlyStrategy, LocalState, LocalStore, PushCoordinator, PushSettings, RecordRemote,
    RecordSyncStrategy, RemoteAuthority, Scheduler, SnapshotSyncStrategy, StatusCell, SyncEngine,
    SyncStrategy,
};
pub use timer::TimerService;
