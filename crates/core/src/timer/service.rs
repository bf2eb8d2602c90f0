//! Start/stop stopwatch that books a time entry when stopped

use std::sync::Arc;

use timesheet_domain::constants::MS_PER_HOUR;
use timesheet_domain::{ActiveTimer, NewTimeEntry, Result, TimeEntry, TimesheetError};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::sync::{LocalState, SyncEngine};

/// Hours between two epoch-millisecond instants, rounded to two decimals.
pub fn hours_between(start: i64, end: i64) -> f64 {
    let elapsed = (end - start).max(0) as f64;
    (elapsed / MS_PER_HOUR * 100.0).round() / 100.0
}

/// The single active timer.
///
/// The timer lives in the local store only. Stopping it creates an entry
/// through the [`SyncEngine`], so the entry syncs like any other.
pub struct TimerService {
    engine: Arc<SyncEngine>,
}

impl TimerService {
    pub const fn new(engine: Arc<SyncEngine>) -> Self {
        Self { engine }
    }

    pub fn current(&self) -> Option<ActiveTimer> {
        self.state().timer()
    }

    /// Start timing `task` on `project_id`, replacing any running timer.
    #[instrument(skip(self, task))]
    pub fn start(&self, project_id: Uuid, task: impl Into<String>) -> Result<ActiveTimer> {
        let state = self.state();
        if !state.snapshot().has_project(project_id) {
            return Err(TimesheetError::InvalidInput(format!(
                "cannot start timer: project {project_id} does not exist"
            )));
        }

        let timer = ActiveTimer::new(project_id, task, state.clock().now_millis());
        if let Some(previous) = state.timer() {
            info!(previous_project = %previous.project_id, "replacing running timer");
        }
        state.set_timer(Some(timer.clone()))?;
        Ok(timer)
    }

    /// Stop the timer and book the elapsed time as an entry dated today.
    ///
    /// Returns `None` when no timer is running. The timer is cleared only
    /// after the entry was created.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<Option<TimeEntry>> {
        let state = self.state();
        let Some(timer) = state.timer() else {
            return Ok(None);
        };

        let clock = state.clock();
        let now = clock.now_millis();
        let input = NewTimeEntry::manual(
            timer.project_id,
            timer.task.clone(),
            clock.today(),
            hours_between(timer.start_time, now),
        )
        .with_interval(timer.start_time, now.max(timer.start_time));

        let entry = self.engine.add_entry(input).await?;
        state.set_timer(None)?;
        info!(entry = %entry.id, hours = entry.hours, "timer stopped");
        Ok(Some(entry))
    }

    /// Discard the running timer without booking anything.
    pub fn clear(&self) -> Result<()> {
        self.state().set_timer(None)
    }

    /// Whole seconds elapsed on the running timer.
    pub fn elapsed_seconds(&self) -> Option<u64> {
        let state = self.state();
        let now = state.clock().now_millis();
        state.timer().map(|timer| (timer.elapsed_millis(now) / 1000) as u64)
    }

    fn state(&self) -> &Arc<LocalState> {
        self.engine.state()
    }
}
