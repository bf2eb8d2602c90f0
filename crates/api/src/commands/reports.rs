//! Report commands

use timesheet_core::reports::{project_breakdown, weekly_timesheet};
use timesheet_core::{ProjectSummary, WeeklyTimesheet};
use timesheet_domain::Result;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Timesheet for the week `offset` weeks from the current one
pub async fn weekly_report(ctx: &AppContext, offset: i64) -> Result<WeeklyTimesheet> {
    execute_command(ctx, "reports::weekly_report", || async move {
        let snapshot = ctx.engine.snapshot();
        let today = ctx.clock().today();
        weekly_timesheet(&snapshot.projects, &snapshot.entries, today, offset)
    })
    .await
}

/// Hours per project across all entries
pub async fn project_summary(ctx: &AppContext) -> Result<Vec<ProjectSummary>> {
    execute_command(ctx, "reports::project_summary", || async move {
        let snapshot = ctx.engine.snapshot();
        Ok(project_breakdown(&snapshot.projects, &snapshot.entries))
    })
    .await
}
