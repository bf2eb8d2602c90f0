//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use timesheet_domain::TimesheetError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub TimesheetError);

impl From<InfraError> for TimesheetError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<TimesheetError> for InfraError {
    fn from(value: TimesheetError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoTimesheetError {
    fn into_timesheet(self) -> TimesheetError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → TimesheetError */
/* -------------------------------------------------------------------------- */

impl IntoTimesheetError for SqlError {
    fn into_timesheet(self) -> TimesheetError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => TimesheetError::Storage("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        TimesheetError::Storage("database is locked".into())
                    }
                    ErrorCode::NotADatabase => {
                        TimesheetError::Storage("file is not a sqlite database".into())
                    }
                    ErrorCode::ReadOnly => TimesheetError::Storage("database is read-only".into()),
                    ErrorCode::DiskFull => TimesheetError::Storage("disk is full".into()),
                    _ => TimesheetError::Storage(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => TimesheetError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                TimesheetError::Storage(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                TimesheetError::Storage(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => TimesheetError::Storage(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => TimesheetError::Storage(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_timesheet())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → TimesheetError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(TimesheetError::Storage(format!("connection pool: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TimesheetError */
/* -------------------------------------------------------------------------- */

impl IntoTimesheetError for HttpError {
    fn into_timesheet(self) -> TimesheetError {
        if self.is_timeout() {
            return TimesheetError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return TimesheetError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return TimesheetError::Serialization(format!("HTTP response body: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => TimesheetError::Auth(message),
                404 => TimesheetError::NotFound(message),
                409 | 412 => TimesheetError::Conflict(message),
                429 => TimesheetError::Network(message),
                400..=499 => TimesheetError::InvalidInput(message),
                _ => TimesheetError::Network(message),
            };
        }

        TimesheetError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_timesheet())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / io → TimesheetError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(TimesheetError::from(value))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(TimesheetError::Storage(format!("io: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
