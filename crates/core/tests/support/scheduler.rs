//! Virtual-time scheduler
//!
//! Jobs only run inside [`ManualScheduler::advance`], in due order, each one
//! awaited to completion before the next is considered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use timesheet_core::sync::{ScheduledJob, Scheduler, TaskHandle};

struct Task {
    seq: u64,
    due: Duration,
    every: Option<Duration>,
    job: ScheduledJob,
    active: Arc<AtomicBool>,
}

#[derive(Default)]
struct Timeline {
    now: Duration,
    next_seq: u64,
    tasks: Vec<Task>,
}

#[derive(Default)]
pub struct ManualScheduler {
    timeline: Mutex<Timeline>,
}

struct ManualHandle(Arc<AtomicBool>);

impl TaskHandle for ManualHandle {
    fn cancel(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.timeline.lock().now
    }

    /// Number of live (not cancelled, not yet fired one-shot) tasks.
    pub fn active_tasks(&self) -> usize {
        self.timeline.lock().tasks.iter().filter(|t| t.active.load(Ordering::SeqCst)).count()
    }

    /// Move virtual time forward, running every job that falls due.
    pub async fn advance(&self, by: Duration) {
        let target = self.now() + by;
        while let Some(job) = self.next_due(target) {
            job().await;
        }
        self.timeline.lock().now = target;
    }

    fn next_due(&self, target: Duration) -> Option<ScheduledJob> {
        let mut timeline = self.timeline.lock();
        timeline.tasks.retain(|t| t.active.load(Ordering::SeqCst));

        let index = timeline
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= target)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)?;

        let due = timeline.tasks[index].due;
        timeline.now = due;
        let task = &mut timeline.tasks[index];
        let job = task.job.clone();
        match task.every {
            Some(every) => task.due = due + every,
            None => {
                task.active.store(false, Ordering::SeqCst);
            }
        }
        Some(job)
    }

    fn push(
        &self,
        delay: Duration,
        every: Option<Duration>,
        job: ScheduledJob,
    ) -> Box<dyn TaskHandle> {
        let active = Arc::new(AtomicBool::new(true));
        let mut timeline = self.timeline.lock();
        let seq = timeline.next_seq;
        timeline.next_seq += 1;
        let due = timeline.now + delay;
        timeline.tasks.push(Task { seq, due, every, job, active: active.clone() });
        Box::new(ManualHandle(active))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration, job: ScheduledJob) -> Box<dyn TaskHandle> {
        self.push(delay, None, job)
    }

    fn schedule_repeating(&self, interval: Duration, job: ScheduledJob) -> Box<dyn TaskHandle> {
        self.push(interval, Some(interval), job)
    }
}
