//! Project records

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A project that time entries are booked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    /// Hex RGB color, `#RRGGBB`.
    pub color: String,
}

/// Input for creating a project. The id is assigned on apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub color: String,
}

impl NewProject {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self { name: name.into(), color: color.into() }
    }

    /// Materialize the project under `id`.
    pub fn into_project(self, id: Uuid) -> Project {
        Project { id, name: self.name, color: self.color }
    }
}

/// Partial update of a project. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ProjectPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none()
    }

    /// Return `project` with this patch applied.
    pub fn apply_to(&self, project: &Project) -> Project {
        Project {
            id: project.id,
            name: self.name.clone().unwrap_or_else(|| project.name.clone()),
            color: self.color.clone().unwrap_or_else(|| project.color.clone()),
        }
    }
}
