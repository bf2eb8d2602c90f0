//! Project management commands

use timesheet_domain::{NewProject, Project, ProjectPatch, Result};
use uuid::Uuid;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// All projects, in insertion order
pub async fn list_projects(ctx: &AppContext) -> Result<Vec<Project>> {
    execute_command(ctx, "projects::list_projects", || async move {
        Ok(ctx.engine.projects())
    })
    .await
}

pub async fn add_project(ctx: &AppContext, input: NewProject) -> Result<Project> {
    execute_command(ctx, "projects::add_project", || ctx.engine.add_project(input)).await
}

pub async fn update_project(ctx: &AppContext, id: Uuid, patch: ProjectPatch) -> Result<Project> {
    execute_command(ctx, "projects::update_project", || ctx.engine.update_project(id, patch)).await
}

/// Delete a project together with its entries
pub async fn delete_project(ctx: &AppContext, id: Uuid) -> Result<()> {
    execute_command(ctx, "projects::delete_project", || ctx.engine.delete_project(id)).await
}
