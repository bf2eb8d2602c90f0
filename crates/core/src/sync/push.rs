//! Debounced and periodic snapshot pushes
//!
//! ## Lifecycle
//! - [`PushCoordinator::mark_dirty`] sets the pending flag and restarts the
//!   debounce timer
//! - the debounce timer and the periodic timer both call
//!   [`PushCoordinator::push_if_pending`]
//! - a push is skipped while another one is in flight; the pending flag keeps
//!   the change for the next cycle
//! - a successful push clears pending only if no mutation landed after the
//!   snapshot was read (tracked with a generation counter)
//!
//! ## Conflicts
//! A version mismatch triggers a re-fetch. A strictly newer remote snapshot is
//! adopted (last writer wins); otherwise the write is retried with the fresh
//! token. Re-fetches are bounded by `max_conflict_retries`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;
use timesheet_domain::{Result, SyncConfig, TimesheetError, VersionToken};
use tracing::{debug, info, instrument, warn};

use super::ports::{RemoteAuthority, ScheduledJob, Scheduler, TaskHandle};
use super::state::LocalState;
use super::status::StatusCell;

/// Timing and retry knobs for [`PushCoordinator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushSettings {
    /// Quiet period after the last change before pushing.
    pub debounce: Duration,
    /// Period of the background retry task.
    pub interval: Duration,
    /// Re-fetches allowed when a write conflicts.
    pub max_conflict_retries: u32,
}

impl From<&SyncConfig> for PushSettings {
    fn from(config: &SyncConfig) -> Self {
        Self {
            debounce: config.debounce(),
            interval: config.periodic_interval(),
            max_conflict_retries: config.max_conflict_retries,
        }
    }
}

impl Default for PushSettings {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

/// Result of a push or pull cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Local snapshot written to the remote
    Pushed,
    /// Remote snapshot was newer and replaced local state
    AdoptedRemote,
    /// Remote and local agree; nothing to write
    UpToDate,
    /// Nothing pending, or another push was in flight
    Skipped,
}

#[derive(Debug, Default)]
struct Pending {
    dirty: bool,
    generation: u64,
}

/// Owns the pending flag and the debounce/periodic tasks for one remote.
pub struct PushCoordinator {
    remote: Arc<dyn RemoteAuthority>,
    state: Arc<LocalState>,
    status: Arc<StatusCell>,
    scheduler: Arc<dyn Scheduler>,
    settings: PushSettings,
    pending: Mutex<Pending>,
    in_flight: tokio::sync::Mutex<()>,
    debounce_task: Mutex<Option<Box<dyn TaskHandle>>>,
    periodic_task: Mutex<Option<Box<dyn TaskHandle>>>,
    stopped: AtomicBool,
    this: Weak<Self>,
}

impl PushCoordinator {
    /// Coordinator for `remote`. Background tasks start with [`PushCoordinator::start`].
    pub fn new(
        remote: Arc<dyn RemoteAuthority>,
        state: Arc<LocalState>,
        status: Arc<StatusCell>,
        scheduler: Arc<dyn Scheduler>,
        settings: PushSettings,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            remote,
            state,
            status,
            scheduler,
            settings,
            pending: Mutex::new(Pending::default()),
            in_flight: tokio::sync::Mutex::new(()),
            debounce_task: Mutex::new(None),
            periodic_task: Mutex::new(None),
            stopped: AtomicBool::new(false),
            this: this.clone(),
        })
    }

    /// Whether local changes await a push.
    pub fn is_pending(&self) -> bool {
        self.pending.lock().dirty
    }

    /// Timing and retry settings.
    pub const fn settings(&self) -> &PushSettings {
        &self.settings
    }

    /// Record a local change and (re)start the debounce timer.
    pub fn mark_dirty(&self) {
        {
            let mut pending = self.pending.lock();
            pending.dirty = true;
            pending.generation += 1;
        }
        self.status.set_pending(true);
        self.arm_debounce();
    }

    /// Start the periodic retry task. Idempotent.
    pub fn start(&self) {
        self.stopped.store(false, Ordering::SeqCst);
        let mut slot = self.periodic_task.lock();
        if slot.as_ref().is_some_and(|task| task.is_active()) {
            return;
        }
        debug!(interval_ms = self.settings.interval.as_millis() as u64, "starting periodic push");
        *slot = Some(self.scheduler.schedule_repeating(self.settings.interval, self.job()));
    }

    /// Cancel the debounce and periodic tasks.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        if let Some(task) = self.debounce_task.lock().take() {
            task.cancel();
        }
        if let Some(task) = self.periodic_task.lock().take() {
            task.cancel();
        }
    }

    /// Push if something is pending; the body of both scheduled tasks.
    pub async fn push_if_pending(&self) -> Result<PushOutcome> {
        if !self.is_pending() {
            return Ok(PushOutcome::Skipped);
        }
        self.push().await
    }

    /// Push the stored snapshot now, unless a push is already in flight.
    #[instrument(skip(self), fields(backend = self.remote.backend()))]
    pub async fn push(&self) -> Result<PushOutcome> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("push already in flight; leaving changes pending");
            return Ok(PushOutcome::Skipped);
        };
        self.status.set_syncing(true);
        let result = self.push_locked().await;
        self.finish(result)
    }

    /// Pull the remote snapshot, then push if local changes remain.
    ///
    /// Waits for an in-flight push instead of skipping.
    #[instrument(skip(self), fields(backend = self.remote.backend()))]
    pub async fn sync_now(&self) -> Result<PushOutcome> {
        let _guard = self.in_flight.lock().await;
        self.status.set_syncing(true);
        let result = match self.pull_locked().await {
            Ok(PushOutcome::AdoptedRemote) => Ok(PushOutcome::AdoptedRemote),
            Ok(_) if self.is_pending() => self.push_locked().await,
            other => other,
        };
        self.finish(result)
    }

    /// Startup reconciliation. Never fails: a transport error degrades to
    /// offline mode with changes pending for the periodic task.
    pub async fn reconcile(&self) {
        let result = {
            let _guard = self.in_flight.lock().await;
            self.status.set_syncing(true);
            let result = self.pull_locked().await;
            self.finish(result)
        };

        if let Err(err) = result {
            warn!(error = %err, "startup reconciliation failed; continuing offline");
            self.mark_dirty();
        }
        self.start();
    }

    /// Stop background tasks and make a final push attempt.
    pub async fn shutdown(&self) {
        self.stop();
        if self.is_pending() {
            match self.push().await {
                Ok(outcome) => debug!(?outcome, "final push on shutdown"),
                Err(err) => {
                    warn!(error = %err, "final push on shutdown failed; changes stay local");
                }
            }
        }
    }

    async fn pull_locked(&self) -> Result<PushOutcome> {
        let generation = self.generation();
        let Some(remote) = self.remote.fetch_snapshot().await? else {
            info!("no remote snapshot yet; scheduling initial push");
            self.mark_dirty();
            return Ok(PushOutcome::UpToDate);
        };

        let remote_modified = remote.snapshot.last_modified;
        let token = remote.version.clone();
        if self.state.adopt_if_newer(remote)? {
            info!(remote_modified, version = %token, "remote snapshot is newer; adopted");
            self.clear_pending(generation);
            return Ok(PushOutcome::AdoptedRemote);
        }

        self.state.set_version(Some(token))?;
        let local_modified = self.state.last_modified();
        if local_modified > remote_modified {
            debug!(local_modified, remote_modified, "local snapshot is newer; push pending");
            self.mark_dirty();
        }
        Ok(PushOutcome::UpToDate)
    }

    async fn push_locked(&self) -> Result<PushOutcome> {
        let mut expected: Option<VersionToken> = self.state.version();
        let mut refetches = 0u32;

        loop {
            let generation = self.generation();
            let snapshot = self.state.stored_snapshot();

            match self.remote.write_snapshot(&snapshot, expected.as_ref()).await {
                Ok(token) => {
                    info!(
                        version = %token,
                        projects = snapshot.projects.len(),
                        entries = snapshot.entries.len(),
                        "snapshot pushed"
                    );
                    self.state.set_version(Some(token))?;
                    self.clear_pending(generation);
                    return Ok(PushOutcome::Pushed);
                }
                Err(TimesheetError::Conflict(reason)) => {
                    if refetches >= self.settings.max_conflict_retries {
                        return Err(TimesheetError::Conflict(format!(
                            "{reason}; gave up after {refetches} re-fetches"
                        )));
                    }
                    refetches += 1;
                    warn!(
                        attempt = refetches,
                        %reason,
                        "remote changed since last fetch; re-fetching"
                    );

                    match self.remote.fetch_snapshot().await? {
                        Some(remote) => {
                            let token = remote.version.clone();
                            if self.state.adopt_if_newer(remote)? {
                                info!(version = %token, "remote snapshot is newer; adopted");
                                self.clear_pending(generation);
                                return Ok(PushOutcome::AdoptedRemote);
                            }
                            expected = Some(token);
                        }
                        None => expected = None,
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn finish(&self, result: Result<PushOutcome>) -> Result<PushOutcome> {
        match &result {
            Ok(_) => self.status.record_success(self.state.clock().now_millis()),
            Err(err) => {
                warn!(error = %err, "remote sync failed; changes stay pending");
                self.status.record_failure(err);
            }
        }

        let still_pending = self.is_pending();
        self.status.set_pending(still_pending);
        if result.is_ok() && still_pending {
            self.arm_debounce();
        }
        result
    }

    fn generation(&self) -> u64 {
        self.pending.lock().generation
    }

    fn clear_pending(&self, generation: u64) {
        let mut pending = self.pending.lock();
        if pending.generation == generation {
            pending.dirty = false;
        }
    }

    fn arm_debounce(&self) {
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }
        let mut slot = self.debounce_task.lock();
        if let Some(previous) = slot.take() {
            previous.cancel();
        }
        *slot = Some(self.scheduler.schedule_once(self.settings.debounce, self.job()));
    }

    fn job(&self) -> ScheduledJob {
        let this = self.this.clone();
        Arc::new(move || {
            let this = this.clone();
            async move {
                if let Some(coordinator) = this.upgrade() {
                    if let Err(err) = coordinator.push_if_pending().await {
                        debug!(error = %err, "scheduled push failed");
                    }
                }
            }
            .boxed()
        })
    }
}

impl Drop for PushCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}
