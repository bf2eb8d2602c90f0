//! Active timer value

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The single running stopwatch. Persisted locally only, never synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTimer {
    pub project_id: Uuid,
    pub task: String,
    /// Epoch milliseconds.
    pub start_time: i64,
}

impl ActiveTimer {
    pub fn new(project_id: Uuid, task: impl Into<String>, start_time: i64) -> Self {
        Self { project_id, task: task.into(), start_time }
    }

    /// Elapsed milliseconds at `now`, clamped at zero for clock skew.
    pub const fn elapsed_millis(&self, now: i64) -> i64 {
        let elapsed = now - self.start_time;
        if elapsed < 0 {
            0
        } else {
            elapsed
        }
    }
}
