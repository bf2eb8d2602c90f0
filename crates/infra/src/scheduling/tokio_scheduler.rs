//! Tokio-backed implementation of the core `Scheduler` port

use std::time::Duration;

use futures::future::join_all;
use parking_lot::Mutex;
use timesheet_core::sync::{ScheduledJob, Scheduler, TaskHandle};
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::error::{SchedulerError, SchedulerResult};

/// Runs delayed and recurring jobs on the current tokio runtime.
///
/// Must be used from within a runtime; jobs are spawned with `tokio::spawn`.
pub struct TokioScheduler {
    root: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self { root: CancellationToken::new(), tasks: Mutex::new(Vec::new()) }
    }

    /// Number of spawned jobs that have not finished
    pub fn active_tasks(&self) -> usize {
        self.tasks.lock().iter().filter(|h| !h.is_finished()).count()
    }

    pub fn is_shut_down(&self) -> bool {
        self.root.is_cancelled()
    }

    /// Cancel every job and wait up to `timeout` for them to exit.
    ///
    /// A job that is mid-run finishes its current firing first. Jobs
    /// scheduled after shutdown never fire.
    #[instrument(skip(self))]
    pub async fn shutdown(&self, timeout: Duration) -> SchedulerResult<()> {
        self.root.cancel();
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock());
        let pending = handles.iter().filter(|h| !h.is_finished()).count();
        info!(pending, "stopping scheduler");

        let aborts: Vec<AbortHandle> = handles.iter().map(JoinHandle::abort_handle).collect();
        let Ok(results) = tokio::time::timeout(timeout, join_all(handles)).await else {
            let still_running = aborts.iter().filter(|a| !a.is_finished()).count();
            for abort in &aborts {
                abort.abort();
            }
            warn!(still_running, "scheduler shutdown timed out; aborting jobs");
            return Err(SchedulerError::Timeout {
                seconds: timeout.as_secs(),
                pending: still_running,
            });
        };

        for result in results {
            if let Err(err) = result {
                if err.is_panic() {
                    return Err(SchedulerError::TaskJoinFailed(err.to_string()));
                }
            }
        }
        debug!("scheduler stopped");
        Ok(())
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut tasks = self.tasks.lock();
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, delay: Duration, job: ScheduledJob) -> Box<dyn TaskHandle> {
        let token = self.root.child_token();
        let cancel = token.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(delay) => job().await,
            }
        });
        let abort = handle.abort_handle();
        self.track(handle);
        Box::new(TokioTaskHandle { token, abort })
    }

    fn schedule_repeating(&self, interval: Duration, job: ScheduledJob) -> Box<dyn TaskHandle> {
        let token = self.root.child_token();
        let cancel = token.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => job().await,
                }
            }
        });
        let abort = handle.abort_handle();
        self.track(handle);
        Box::new(TokioTaskHandle { token, abort })
    }
}

/// Cancellation handle for one scheduled job
pub struct TokioTaskHandle {
    token: CancellationToken,
    abort: AbortHandle,
}

impl TaskHandle for TokioTaskHandle {
    fn cancel(&self) {
        self.token.cancel();
    }

    fn is_active(&self) -> bool {
        !self.token.is_cancelled() && !self.abort.is_finished()
    }
}
