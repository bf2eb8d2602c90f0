//! Command-line surface of the `timesheet` binary
//!
//! Arguments are parsed by clap into a [`CliCommand`] and dispatched to the
//! command facade; results are returned as JSON values for the binary to
//! print.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use timesheet_domain::{
    EntryFilter, NewProject, NewTimeEntry, ProjectPatch, Result, TimesheetError,
};
use uuid::Uuid;

use crate::commands;
use crate::context::AppContext;

#[derive(Debug, Parser)]
#[command(name = "timesheet", version, about = "Headless time tracking with remote sync")]
pub struct Cli {
    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

impl Cli {
    pub fn into_command(self) -> CliCommand {
        self.command.unwrap_or(CliCommand::Serve)
    }
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum CliCommand {
    /// Keep syncing until interrupted
    Serve,
    /// Show sync status
    Status,
    /// Sync with the remote now
    Sync,
    /// List projects
    Projects,
    /// Create a project
    AddProject {
        name: String,
        /// Hex color such as #3b82f6
        color: String,
    },
    /// Rename or recolor a project
    UpdateProject {
        id: Uuid,
        #[arg(long, required_unless_present = "color")]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a project and its entries
    DeleteProject { id: Uuid },
    /// List entries, newest first
    Entries {
        #[arg(long = "project")]
        project_id: Option<Uuid>,
    },
    /// Book hours manually
    Log {
        project_id: Uuid,
        /// YYYY-MM-DD
        date: NaiveDate,
        hours: f64,
        #[arg(required = true, num_args = 1..)]
        task: Vec<String>,
    },
    /// Delete one entry
    DeleteEntry { id: Uuid },
    /// Start the timer on a project
    Start {
        project_id: Uuid,
        #[arg(num_args = 0..)]
        task: Vec<String>,
    },
    /// Stop the timer and book the elapsed time
    Stop,
    /// Show the running timer
    Timer,
    /// Discard the running timer
    ClearTimer,
    /// Weekly timesheet
    Week {
        /// Weeks from the current one; negative looks back
        #[arg(default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,
    },
    /// Hours per project
    Summary,
}

impl CliCommand {
    /// Whether the command needs startup reconciliation before it runs
    pub const fn needs_remote(&self) -> bool {
        !matches!(self, Self::Timer | Self::ClearTimer)
    }
}

/// Run a one-shot command. `Serve` is handled by the binary.
pub async fn execute(ctx: &AppContext, command: CliCommand) -> Result<Value> {
    match command {
        CliCommand::Serve => {
            Err(TimesheetError::InvalidInput("serve is not a one-shot command".into()))
        }
        CliCommand::Status => to_json(&commands::get_sync_status(ctx).await?),
        CliCommand::Sync => to_json(&commands::sync_now(ctx).await?),
        CliCommand::Projects => to_json(&commands::list_projects(ctx).await?),
        CliCommand::AddProject { name, color } => {
            to_json(&commands::add_project(ctx, NewProject::new(name, color)).await?)
        }
        CliCommand::UpdateProject { id, name, color } => {
            let mut patch = ProjectPatch::default();
            if let Some(name) = name {
                patch = patch.name(name);
            }
            if let Some(color) = color {
                patch = patch.color(color);
            }
            to_json(&commands::update_project(ctx, id, patch).await?)
        }
        CliCommand::DeleteProject { id } => to_json(&commands::delete_project(ctx, id).await?),
        CliCommand::Entries { project_id } => {
            let filter = project_id.map_or_else(EntryFilter::default, |id| {
                EntryFilter::default().for_project(id)
            });
            to_json(&commands::list_entries(ctx, &filter).await?)
        }
        CliCommand::Log { project_id, date, hours, task } => {
            let input = NewTimeEntry::manual(project_id, task.join(" "), date, hours);
            to_json(&commands::add_entry(ctx, input).await?)
        }
        CliCommand::DeleteEntry { id } => to_json(&commands::delete_entry(ctx, id).await?),
        CliCommand::Start { project_id, task } => {
            to_json(&commands::start_timer(ctx, project_id, task.join(" ")).await?)
        }
        CliCommand::Stop => to_json(&commands::stop_timer(ctx).await?),
        CliCommand::Timer => to_json(&commands::get_timer(ctx).await?),
        CliCommand::ClearTimer => to_json(&commands::clear_timer(ctx).await?),
        CliCommand::Week { offset } => to_json(&commands::weekly_report(ctx, offset).await?),
        CliCommand::Summary => to_json(&commands::project_summary(ctx).await?),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}
