//! Domain types and models
//!
//! Every type here serializes with camelCase field names; it is the format
//! written to the local store and exchanged with both remote backends.

pub mod entry;
pub mod project;
pub mod snapshot;
pub mod sync;
pub mod timer;

pub use entry::{EntryFilter, NewTimeEntry, TimeEntry, TimeEntryPatch};
pub use project::{NewProject, Project, ProjectPatch};
pub use snapshot::{Snapshot, VersionToken, VersionedSnapshot};
pub use sync::{SyncMode, SyncStatus};
pub use timer::ActiveTimer;
