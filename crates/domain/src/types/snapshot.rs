//! Snapshot: the unit of remote synchronization

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Project, TimeEntry};

/// Full dataset synced as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub entries: Vec<TimeEntry>,
    /// Epoch milliseconds of the last project or entry mutation.
    #[serde(default)]
    pub last_modified: i64,
}

impl Snapshot {
    /// First-run snapshot.
    pub const fn empty(now: i64) -> Self {
        Self { projects: Vec::new(), entries: Vec::new(), last_modified: now }
    }

    pub fn project(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn has_project(&self, id: Uuid) -> bool {
        self.project(id).is_some()
    }

    pub fn entry(&self, id: Uuid) -> Option<&TimeEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries booked against `project_id`.
    pub fn entries_for(&self, project_id: Uuid) -> impl Iterator<Item = &TimeEntry> {
        self.entries.iter().filter(move |e| e.project_id == project_id)
    }

    /// Same records, ignoring `last_modified`.
    pub fn same_records(&self, other: &Self) -> bool {
        self.projects == other.projects && self.entries == other.entries
    }
}

/// Opaque revision identifier issued by a remote authority.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fetched snapshot together with the token it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedSnapshot {
    pub snapshot: Snapshot,
    pub version: VersionToken,
}
