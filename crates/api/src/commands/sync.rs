//! Sync status and manual sync

use timesheet_domain::{Result, SyncStatus};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

pub async fn get_sync_status(ctx: &AppContext) -> Result<SyncStatus> {
    execute_command(ctx, "sync::get_sync_status", || async move { Ok(ctx.engine.status()) }).await
}

/// Sync with the remote now and report the resulting status.
///
/// The error is returned as-is; the status keeps a copy in `last_error`.
pub async fn sync_now(ctx: &AppContext) -> Result<SyncStatus> {
    execute_command(ctx, "sync::sync_now", || async move {
        ctx.engine.sync_now().await?;
        Ok(ctx.engine.status())
    })
    .await
}
