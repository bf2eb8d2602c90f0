//! Active timer commands

use serde::Serialize;
use timesheet_common::time::format_clock;
use timesheet_domain::{ActiveTimer, Result, TimeEntry};
use uuid::Uuid;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Running timer with its elapsed time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub timer: Option<ActiveTimer>,
    pub elapsed_seconds: Option<u64>,
    /// `HH:MM:SS`
    pub elapsed: Option<String>,
}

pub async fn get_timer(ctx: &AppContext) -> Result<TimerView> {
    execute_command(ctx, "timer::get_timer", || async move {
        let elapsed_seconds = ctx.timer.elapsed_seconds();
        Ok(TimerView {
            timer: ctx.timer.current(),
            elapsed_seconds,
            elapsed: elapsed_seconds.map(format_clock),
        })
    })
    .await
}

/// Start a timer, replacing any running one without booking it
pub async fn start_timer(ctx: &AppContext, project_id: Uuid, task: String) -> Result<ActiveTimer> {
    execute_command(ctx, "timer::start_timer", || async move {
        ctx.timer.start(project_id, task)
    })
    .await
}

/// Stop the timer and book the elapsed time; `None` when nothing was running
pub async fn stop_timer(ctx: &AppContext) -> Result<Option<TimeEntry>> {
    execute_command(ctx, "timer::stop_timer", || ctx.timer.stop()).await
}

/// Discard the running timer without booking
pub async fn clear_timer(ctx: &AppContext) -> Result<()> {
    execute_command(ctx, "timer::clear_timer", || async move { ctx.timer.clear() }).await
}
