//! Report aggregation over projects and entries
//!
//! Pure functions; callers pass a snapshot's lists and the local date.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, TimeDelta};
use serde::Serialize;
use timesheet_domain::{Project, Result, TimeEntry, TimesheetError};
use uuid::Uuid;

pub use timesheet_common::time::{format_clock, format_hours as format_duration};

/// Monday and Sunday of the week `offset` weeks from the one containing
/// `today`.
///
/// # Errors
/// `TimesheetError::InvalidInput` when that week lies outside the
/// representable calendar.
pub fn week_range(today: NaiveDate, offset: i64) -> Result<(NaiveDate, NaiveDate)> {
    let out_of_range =
        || TimesheetError::InvalidInput(format!("week offset {offset} is out of range"));
    let since_monday = TimeDelta::days(i64::from(today.weekday().num_days_from_monday()));
    let shift = TimeDelta::try_weeks(offset).ok_or_else(out_of_range)?;

    let monday = today
        .checked_sub_signed(since_monday)
        .and_then(|d| d.checked_add_signed(shift))
        .ok_or_else(out_of_range)?;
    let sunday = monday.checked_add_signed(TimeDelta::days(6)).ok_or_else(out_of_range)?;
    Ok((monday, sunday))
}

/// The seven dates of that week, Monday first.
pub fn week_days(today: NaiveDate, offset: i64) -> Result<Vec<NaiveDate>> {
    let (monday, _) = week_range(today, offset)?;
    Ok((0..7).map(|d| monday + TimeDelta::days(d)).collect())
}

pub fn group_by_project(entries: &[TimeEntry]) -> HashMap<Uuid, Vec<&TimeEntry>> {
    let mut groups: HashMap<Uuid, Vec<&TimeEntry>> = HashMap::new();
    for entry in entries {
        groups.entry(entry.project_id).or_default().push(entry);
    }
    groups
}

pub fn total_hours<'a>(entries: impl IntoIterator<Item = &'a TimeEntry>) -> f64 {
    entries.into_iter().map(|e| e.hours).sum()
}

/// Hours booked against one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub project: Project,
    pub hours: f64,
    pub entry_count: usize,
    /// Share of the total, 0..=100.
    pub percentage: f64,
}

/// Per-project totals. Projects without hours are dropped; the rest are
/// sorted by hours, largest first.
pub fn project_breakdown(projects: &[Project], entries: &[TimeEntry]) -> Vec<ProjectSummary> {
    let groups = group_by_project(entries);
    let total = total_hours(entries);

    let mut summaries: Vec<ProjectSummary> = projects
        .iter()
        .filter_map(|project| {
            let booked = groups.get(&project.id)?;
            let hours = total_hours(booked.iter().copied());
            if hours <= 0.0 {
                return None;
            }
            let percentage = if total > 0.0 { hours / total * 100.0 } else { 0.0 };
            Some(ProjectSummary {
                project: project.clone(),
                hours,
                entry_count: booked.len(),
                percentage,
            })
        })
        .collect();

    summaries.sort_by(|a, b| b.hours.total_cmp(&a.hours));
    summaries
}

/// One day column of a weekly timesheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub entries: Vec<TimeEntry>,
    pub total: f64,
}

/// One project row: hours per weekday, Monday first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRow {
    pub project: Project,
    pub daily_hours: [f64; 7],
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTimesheet {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<DaySummary>,
    pub rows: Vec<ProjectRow>,
    pub total: f64,
}

pub fn weekly_timesheet(
    projects: &[Project],
    entries: &[TimeEntry],
    today: NaiveDate,
    offset: i64,
) -> Result<WeeklyTimesheet> {
    let (start, end) = week_range(today, offset)?;
    let in_week: Vec<&TimeEntry> =
        entries.iter().filter(|e| e.date >= start && e.date <= end).collect();

    let days = week_days(today, offset)?
        .into_iter()
        .map(|date| {
            let entries: Vec<TimeEntry> =
                in_week.iter().filter(|e| e.date == date).map(|e| (*e).clone()).collect();
            let total = total_hours(&entries);
            DaySummary { date, entries, total }
        })
        .collect();

    let rows = projects
        .iter()
        .filter_map(|project| {
            let mut daily_hours = [0.0; 7];
            let mut any = false;
            for entry in in_week.iter().filter(|e| e.project_id == project.id) {
                let slot = (entry.date - start).num_days() as usize;
                daily_hours[slot] += entry.hours;
                any = true;
            }
            any.then(|| ProjectRow {
                project: project.clone(),
                total: daily_hours.iter().sum(),
                daily_hours,
            })
        })
        .collect();

    Ok(WeeklyTimesheet { start, end, days, rows, total: total_hours(in_week.iter().copied()) })
}
