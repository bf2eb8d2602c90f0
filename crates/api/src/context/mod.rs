//! Application context - dependency injection container
//!
//! [`AppContext`] owns every long-lived service and is passed explicitly to
//! commands. Lifecycle: [`AppContext::new`] wires services without touching
//! the network, [`AppContext::initialize`] runs startup reconciliation and
//! [`AppContext::shutdown`] flushes pending pushes and stops background jobs.

use std::sync::Arc;
use std::time::Duration;

use timesheet_common::time::{Clock, SystemClock};
use timesheet_core::sync::{
    LocalState, PushCoordinator, PushSettings, RecordRemote, RecordSyncStrategy, RemoteAuthority,
    Scheduler, SnapshotSyncStrategy, StatusCell, SyncEngine, SyncStrategy,
};
use timesheet_core::{LocalOnlyStrategy, LocalStore, TimerService};
use timesheet_domain::{Config, RemoteConfig, Result, StorageConfig, SyncMode, TimesheetError};
use timesheet_infra::{
    GitHubBlobClient, InMemoryLocalStore, RestRecordClient, SqliteLocalStore, TokioScheduler,
};
use tracing::{info, instrument, warn};

/// Store path that selects a volatile in-memory store
pub const MEMORY_STORE_PATH: &str = ":memory:";

/// Budget for background jobs to exit during shutdown
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub engine: Arc<SyncEngine>,
    pub timer: TimerService,
    scheduler: Arc<TokioScheduler>,
}

impl AppContext {
    /// Wire services for `config` on the system clock.
    ///
    /// # Errors
    /// Fails when the local store cannot be opened or a remote client cannot
    /// be constructed (e.g. malformed base URL).
    pub fn new(config: Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let store = open_store(&config.storage)?;
        let state = Arc::new(LocalState::load(store, clock.clone())?);

        let mode =
            if config.remote.is_configured() { SyncMode::Offline } else { SyncMode::Unconfigured };
        let status = Arc::new(StatusCell::new(mode));
        let scheduler = Arc::new(TokioScheduler::new());

        let strategy = build_strategy(&config, &state, &status, &scheduler, clock)?;
        let engine = Arc::new(SyncEngine::new(state, strategy, status));
        let timer = TimerService::new(engine.clone());

        info!(
            backend = config.remote.backend(),
            strategy = engine.strategy_name(),
            store = %config.storage.path,
            "application context created"
        );

        Ok(Self { config, engine, timer, scheduler })
    }

    /// Startup reconciliation with the remote. Never fails; an unreachable
    /// remote leaves the engine offline with local data intact.
    #[instrument(skip(self), fields(backend = self.config.remote.backend()))]
    pub async fn initialize(&self) {
        self.engine.initialize().await;
        let status = self.engine.status();
        info!(mode = %status.mode, pending = status.pending, "application initialized");
    }

    /// Flush pending changes and stop background jobs.
    ///
    /// # Errors
    /// Returns an error when background jobs do not stop in time.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<()> {
        self.engine.shutdown().await;
        self.scheduler.shutdown(SHUTDOWN_TIMEOUT).await.map_err(TimesheetError::from)?;
        info!("application shut down");
        Ok(())
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        self.engine.state().clock()
    }

    /// Background jobs currently scheduled
    pub fn active_jobs(&self) -> usize {
        self.scheduler.active_tasks()
    }
}

fn open_store(config: &StorageConfig) -> Result<Arc<dyn LocalStore>> {
    if config.path == MEMORY_STORE_PATH {
        warn!("using in-memory local store; data is lost on exit");
        return Ok(Arc::new(InMemoryLocalStore::new()));
    }
    Ok(Arc::new(SqliteLocalStore::open(&config.path, config.pool_size)?))
}

fn build_strategy(
    config: &Config,
    state: &Arc<LocalState>,
    status: &Arc<StatusCell>,
    scheduler: &Arc<TokioScheduler>,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn SyncStrategy>> {
    let strategy: Arc<dyn SyncStrategy> = match &config.remote {
        RemoteConfig::Unconfigured => Arc::new(LocalOnlyStrategy),
        RemoteConfig::Rest(rest) => {
            let remote: Arc<dyn RecordRemote> = Arc::new(RestRecordClient::new(rest, clock)?);
            Arc::new(RecordSyncStrategy::new(remote, state.clone(), status.clone()))
        }
        RemoteConfig::Github(github) => {
            let remote: Arc<dyn RemoteAuthority> =
                Arc::new(GitHubBlobClient::new(github.clone(), clock)?);
            let scheduler: Arc<dyn Scheduler> = scheduler.clone();
            let coordinator = PushCoordinator::new(
                remote,
                state.clone(),
                status.clone(),
                scheduler,
                PushSettings::from(&config.sync),
            );
            Arc::new(SnapshotSyncStrategy::new(coordinator))
        }
    };
    Ok(strategy)
}
