//! Input validation rules
//!
//! Run before any local or remote mutation. Referential checks (an entry's
//! project must exist) need the current snapshot and live in the mutation
//! layer of `timesheet-core`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{NewProject, NewTimeEntry, ProjectPatch, Result, TimeEntryPatch, TimesheetError};

static HEX_COLOR: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").ok());

/// Project names must contain something other than whitespace.
pub fn validate_project_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TimesheetError::InvalidInput("project name must not be empty".into()));
    }
    Ok(())
}

/// Colors are `#RRGGBB` hex strings.
pub fn validate_color(color: &str) -> Result<()> {
    let matches = HEX_COLOR.as_ref().is_some_and(|re| re.is_match(color));
    if !matches {
        return Err(TimesheetError::InvalidInput(format!(
            "color must be a hex RGB value like #3b82f6, got {color:?}"
        )));
    }
    Ok(())
}

/// Hours must be a finite, non-negative number.
pub fn validate_hours(hours: f64) -> Result<()> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(TimesheetError::InvalidInput(format!(
            "hours must be a non-negative number, got {hours}"
        )));
    }
    Ok(())
}

fn validate_interval(start: Option<i64>, end: Option<i64>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(TimesheetError::InvalidInput(format!(
                "endTime {end} precedes startTime {start}"
            )));
        }
    }
    Ok(())
}

pub fn validate_new_project(input: &NewProject) -> Result<()> {
    validate_project_name(&input.name)?;
    validate_color(&input.color)
}

pub fn validate_project_patch(patch: &ProjectPatch) -> Result<()> {
    if patch.is_empty() {
        return Err(TimesheetError::InvalidInput("at least one field is required to update".into()));
    }
    if let Some(name) = &patch.name {
        validate_project_name(name)?;
    }
    if let Some(color) = &patch.color {
        validate_color(color)?;
    }
    Ok(())
}

pub fn validate_new_entry(input: &NewTimeEntry) -> Result<()> {
    validate_hours(input.hours)?;
    validate_interval(input.start_time, input.end_time)
}

pub fn validate_entry_patch(patch: &TimeEntryPatch) -> Result<()> {
    if patch.is_empty() {
        return Err(TimesheetError::InvalidInput("at least one field is required to update".into()));
    }
    if let Some(hours) = patch.hours {
        validate_hours(hours)?;
    }
    Ok(())
}
