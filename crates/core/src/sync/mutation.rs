//! Pure snapshot transformations
//!
//! [`apply`] computes the next snapshot from the prior one and a mutation.
//! It performs every validation up front, so a rejected mutation never
//! reaches the local store or the remote.

use timesheet_domain::validation::{
    validate_entry_patch, validate_new_entry, validate_new_project, validate_project_patch,
};
use timesheet_domain::{
    NewProject, NewTimeEntry, Project, ProjectPatch, Result, Snapshot, TimeEntry, TimeEntryPatch,
    TimesheetError,
};
use uuid::Uuid;

/// A caller's intent to change projects or entries
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddProject(NewProject),
    UpdateProject { id: Uuid, patch: ProjectPatch },
    DeleteProject(Uuid),
    AddEntry(NewTimeEntry),
    UpdateEntry { id: Uuid, patch: TimeEntryPatch },
    DeleteEntry(Uuid),
}

impl Mutation {
    /// Stable name for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AddProject(_) => "add_project",
            Self::UpdateProject { .. } => "update_project",
            Self::DeleteProject(_) => "delete_project",
            Self::AddEntry(_) => "add_entry",
            Self::UpdateEntry { .. } => "update_entry",
            Self::DeleteEntry(_) => "delete_entry",
        }
    }
}

/// What a mutation did, in the shape a per-record remote needs to replay it
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    ProjectCreated(Project),
    ProjectUpdated { project: Project, patch: ProjectPatch },
    ProjectDeleted { id: Uuid, removed_entries: usize },
    EntryCreated(TimeEntry),
    EntryUpdated { entry: TimeEntry, patch: TimeEntryPatch },
    EntryDeleted(Uuid),
}

impl Change {
    /// Stable name for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ProjectCreated(_) => "project_created",
            Self::ProjectUpdated { .. } => "project_updated",
            Self::ProjectDeleted { .. } => "project_deleted",
            Self::EntryCreated(_) => "entry_created",
            Self::EntryUpdated { .. } => "entry_updated",
            Self::EntryDeleted(_) => "entry_deleted",
        }
    }
}

/// Compute the snapshot that results from `mutation`.
///
/// `new_id` is called once for creates. `lastModified` becomes `now`, never
/// moving backwards from the prior value.
pub fn apply(
    prior: &Snapshot,
    mutation: Mutation,
    now: i64,
    new_id: impl FnOnce() -> Uuid,
) -> Result<(Snapshot, Change)> {
    let mut next = prior.clone();
    next.last_modified = now.max(prior.last_modified);

    let change = match mutation {
        Mutation::AddProject(input) => {
            validate_new_project(&input)?;
            let project = input.into_project(new_id());
            next.projects.push(project.clone());
            Change::ProjectCreated(project)
        }
        Mutation::UpdateProject { id, patch } => {
            validate_project_patch(&patch)?;
            let slot = next
                .projects
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| project_not_found(id))?;
            *slot = patch.apply_to(slot);
            Change::ProjectUpdated { project: slot.clone(), patch }
        }
        Mutation::DeleteProject(id) => {
            if !prior.has_project(id) {
                return Err(project_not_found(id));
            }
            next.projects.retain(|p| p.id != id);
            let before = next.entries.len();
            next.entries.retain(|e| e.project_id != id);
            Change::ProjectDeleted { id, removed_entries: before - next.entries.len() }
        }
        Mutation::AddEntry(input) => {
            validate_new_entry(&input)?;
            require_project(prior, input.project_id)?;
            let entry = input.into_entry(new_id());
            next.entries.push(entry.clone());
            Change::EntryCreated(entry)
        }
        Mutation::UpdateEntry { id, patch } => {
            validate_entry_patch(&patch)?;
            if let Some(project_id) = patch.project_id {
                require_project(prior, project_id)?;
            }
            let slot = next
                .entries
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| entry_not_found(id))?;
            let updated = patch.apply_to(slot);
            if let (Some(start), Some(end)) = (updated.start_time, updated.end_time) {
                if end < start {
                    return Err(TimesheetError::InvalidInput(format!(
                        "endTime {end} precedes startTime {start}"
                    )));
                }
            }
            *slot = updated;
            Change::EntryUpdated { entry: slot.clone(), patch }
        }
        Mutation::DeleteEntry(id) => {
            if prior.entry(id).is_none() {
                return Err(entry_not_found(id));
            }
            next.entries.retain(|e| e.id != id);
            Change::EntryDeleted(id)
        }
    };

    Ok((next, change))
}

fn require_project(snapshot: &Snapshot, id: Uuid) -> Result<()> {
    if snapshot.has_project(id) {
        Ok(())
    } else {
        Err(TimesheetError::InvalidInput(format!("project {id} does not exist")))
    }
}

fn project_not_found(id: Uuid) -> TimesheetError {
    TimesheetError::NotFound(format!("project {id}"))
}

fn entry_not_found(id: Uuid) -> TimesheetError {
    TimesheetError::NotFound(format!("entry {id}"))
}
