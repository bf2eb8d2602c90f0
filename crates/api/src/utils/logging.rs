use std::time::Duration;

use timesheet_domain::TimesheetError;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable selecting the log output format (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "TIMESHEET_LOG_FORMAT";

/// Install the global tracing subscriber.
///
/// Filtering follows `RUST_LOG` and defaults to `info`. Calling this more
/// than once is harmless; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let result = if json {
        fmt().with_env_filter(filter).json().with_current_span(false).try_init()
    } else {
        fmt().with_env_filter(filter).with_target(false).try_init()
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Log the outcome of a command execution with structured fields.
///
/// # Parameters
/// * `command` - Logical command identifier (e.g. `"projects::add_project"`).
/// * `backend` - Sync strategy in use (`"local_only"`, `"record_write"`, ...).
/// * `elapsed` - Duration the command execution took.
/// * `error_type` - Stable error label when the command failed.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(
    command: &str,
    backend: &str,
    elapsed: Duration,
    error_type: Option<&'static str>,
) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match error_type {
        None => info!(command, backend, duration_ms, "command_execution_success"),
        Some(error_type) => {
            warn!(command, backend, duration_ms, error_type, "command_execution_failure");
        }
    }
}

/// Convert a `TimesheetError` into a stable label suitable for logging.
#[inline]
pub const fn error_label(error: &TimesheetError) -> &'static str {
    error.label()
}
