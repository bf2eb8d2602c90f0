//! Time entry records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hours booked on a project for one day.
///
/// `date` serializes as `YYYY-MM-DD`. Entries produced by the timer carry the
/// epoch-millisecond `startTime`/`endTime` they were measured from; manual
/// entries omit them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: Uuid,
    pub project_id: Uuid,
    #[serde(default)]
    pub task: String,
    pub date: NaiveDate,
    pub hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}

/// Input for creating an entry. The id is assigned on apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimeEntry {
    pub project_id: Uuid,
    #[serde(default)]
    pub task: String,
    pub date: NaiveDate,
    pub hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}

impl NewTimeEntry {
    /// Manual entry without timer timestamps.
    pub fn manual(project_id: Uuid, task: impl Into<String>, date: NaiveDate, hours: f64) -> Self {
        Self { project_id, task: task.into(), date, hours, start_time: None, end_time: None }
    }

    /// Attach the measured interval.
    pub fn with_interval(mut self, start_time: i64, end_time: i64) -> Self {
        self.start_time = Some(start_time);
        self.end_time = Some(end_time);
        self
    }

    pub fn into_entry(self, id: Uuid) -> TimeEntry {
        TimeEntry {
            id,
            project_id: self.project_id,
            task: self.task,
            date: self.date,
            hours: self.hours,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// Partial update of an entry. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}

impl TimeEntryPatch {
    pub fn project_id(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn hours(mut self, hours: f64) -> Self {
        self.hours = Some(hours);
        self
    }

    pub const fn is_empty(&self) -> bool {
        self.project_id.is_none()
            && self.task.is_none()
            && self.date.is_none()
            && self.hours.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
    }

    /// Return `entry` with this patch applied.
    pub fn apply_to(&self, entry: &TimeEntry) -> TimeEntry {
        TimeEntry {
            id: entry.id,
            project_id: self.project_id.unwrap_or(entry.project_id),
            task: self.task.clone().unwrap_or_else(|| entry.task.clone()),
            date: self.date.unwrap_or(entry.date),
            hours: self.hours.unwrap_or(entry.hours),
            start_time: self.start_time.or(entry.start_time),
            end_time: self.end_time.or(entry.end_time),
        }
    }
}

/// Server-side entry query. Every bound is optional and inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
}

impl EntryFilter {
    /// Entries dated within `start..=end`.
    pub const fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start_date: Some(start), end_date: Some(end), project_id: None }
    }

    pub fn for_project(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn matches(&self, entry: &TimeEntry) -> bool {
        self.start_date.map_or(true, |start| entry.date >= start)
            && self.end_date.map_or(true, |end| entry.date <= end)
            && self.project_id.map_or(true, |id| entry.project_id == id)
    }

    /// Query pairs in the order the REST API documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(start) = self.start_date {
            pairs.push(("startDate", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("endDate", end.format("%Y-%m-%d").to_string()));
        }
        if let Some(id) = self.project_id {
            pairs.push(("projectId", id.to_string()));
        }
        pairs
    }
}
