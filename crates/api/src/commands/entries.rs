//! Time entry commands

use timesheet_domain::{EntryFilter, NewTimeEntry, Result, TimeEntry, TimeEntryPatch};
use uuid::Uuid;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Entries matching `filter`, newest date first
pub async fn list_entries(ctx: &AppContext, filter: &EntryFilter) -> Result<Vec<TimeEntry>> {
    execute_command(ctx, "entries::list_entries", || async move {
        let mut entries: Vec<TimeEntry> =
            ctx.engine.entries().into_iter().filter(|e| filter.matches(e)).collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    })
    .await
}

pub async fn add_entry(ctx: &AppContext, input: NewTimeEntry) -> Result<TimeEntry> {
    execute_command(ctx, "entries::add_entry", || ctx.engine.add_entry(input)).await
}

pub async fn update_entry(ctx: &AppContext, id: Uuid, patch: TimeEntryPatch) -> Result<TimeEntry> {
    execute_command(ctx, "entries::update_entry", || ctx.engine.update_entry(id, patch)).await
}

pub async fn delete_entry(ctx: &AppContext, id: Uuid) -> Result<()> {
    execute_command(ctx, "entries::delete_entry", || ctx.engine.delete_entry(id)).await
}
