//! Command execution helpers
//!
//! Provides utilities to reduce boilerplate when implementing commands with
//! timing and structured logging.

use std::future::Future;
use std::time::Instant;

use timesheet_domain::Result as DomainResult;

use crate::context::AppContext;
use crate::utils::logging::{error_label, log_command_execution};

/// Execute a command, timing it and logging the outcome.
///
/// # Example
///
/// ```rust,ignore
/// pub async fn list_projects(ctx: &AppContext) -> Result<Vec<Project>> {
///     execute_command(ctx, "projects::list_projects", || async {
///         Ok(ctx.engine.projects())
///     })
///     .await
/// }
/// ```
pub async fn execute_command<F, Fut, T>(
    ctx: &AppContext,
    command_name: &str,
    command_fn: F,
) -> DomainResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();

    let result = command_fn().await;

    let error_type = result.as_ref().err().map(error_label);
    log_command_execution(command_name, ctx.engine.strategy_name(), start.elapsed(), error_type);

    result
}
