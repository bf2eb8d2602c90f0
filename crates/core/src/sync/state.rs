//! In-memory state backed by the local store
//!
//! `LocalState` is the only writer of the snapshot keys and the timer key.
//! Every update persists first and then swaps memory while holding the write
//! lock, so the store and memory never drift apart.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use timesheet_common::time::Clock;
use timesheet_domain::constants::{
    ACTIVE_TIMER_KEY, LAST_MODIFIED_KEY, SNAPSHOT_KEY, VERSION_TOKEN_KEY,
};
use timesheet_domain::{
    ActiveTimer, Result, Snapshot, TimesheetError, VersionToken, VersionedSnapshot,
};
use tracing::{debug, info, warn};

use super::ports::LocalStore;

#[derive(Debug, Clone)]
struct Inner {
    snapshot: Snapshot,
    last_modified: i64,
    version: Option<VersionToken>,
    timer: Option<ActiveTimer>,
}

/// Shared local state: snapshot, its timestamp, version token and timer.
pub struct LocalState {
    store: Arc<dyn LocalStore>,
    clock: Arc<dyn Clock>,
    inner: RwLock<Inner>,
}

impl LocalState {
    /// Load state from `store`.
    ///
    /// A missing snapshot creates an empty one stamped `now` and writes it
    /// through. A corrupt snapshot is treated as missing. A corrupt timer value
    /// is removed.
    pub fn load(store: Arc<dyn LocalStore>, clock: Arc<dyn Clock>) -> Result<Self> {
        let stored: Option<Snapshot> = tolerate_corrupt(read_json(store.as_ref(), SNAPSHOT_KEY))?;
        let first_run = stored.is_none();
        let snapshot = stored.unwrap_or_else(|| Snapshot::empty(clock.now_millis()));

        let last_modified = tolerate_corrupt(read_json::<i64>(store.as_ref(), LAST_MODIFIED_KEY))?
            .unwrap_or(snapshot.last_modified);

        let version = store
            .get(VERSION_TOKEN_KEY)?
            .and_then(|raw| String::from_utf8(raw).ok())
            .filter(|token| !token.is_empty())
            .map(VersionToken::new);

        let timer = match read_json::<ActiveTimer>(store.as_ref(), ACTIVE_TIMER_KEY) {
            Ok(timer) => timer,
            Err(err @ TimesheetError::Serialization(_)) => {
                warn!(error = %err, "discarding unreadable active timer");
                store.remove(ACTIVE_TIMER_KEY)?;
                None
            }
            Err(err) => return Err(err),
        };

        if first_run {
            info!("no local snapshot found; starting with an empty dataset");
            write_json(store.as_ref(), SNAPSHOT_KEY, &snapshot)?;
            write_json(store.as_ref(), LAST_MODIFIED_KEY, &snapshot.last_modified)?;
        }

        debug!(
            projects = snapshot.projects.len(),
            entries = snapshot.entries.len(),
            last_modified,
            has_version = version.is_some(),
            timer_running = timer.is_some(),
            "local state loaded"
        );

        Ok(Self {
            store,
            clock,
            inner: RwLock::new(Inner { snapshot, last_modified, version, timer }),
        })
    }

    /// Clock used for every local timestamp.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Current in-memory snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.inner.read().snapshot.clone()
    }

    /// Snapshot as persisted in the local store, falling back to memory when
    /// the stored value is missing or unreadable.
    pub fn stored_snapshot(&self) -> Snapshot {
        match read_json::<Snapshot>(self.store.as_ref(), SNAPSHOT_KEY) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => self.snapshot(),
            Err(err) => {
                warn!(error = %err, "stored snapshot unreadable; using in-memory copy");
                self.snapshot()
            }
        }
    }

    /// Timestamp of the last local mutation, tracked under its own key
    pub fn last_modified(&self) -> i64 {
        self.inner.read().last_modified
    }

    /// Last version token fetched from or issued by the remote
    pub fn version(&self) -> Option<VersionToken> {
        self.inner.read().version.clone()
    }

    /// The persisted active timer, if any.
    pub fn timer(&self) -> Option<ActiveTimer> {
        self.inner.read().timer.clone()
    }

    /// Atomically derive and commit a new snapshot from the current one.
    ///
    /// `f` receives the prior snapshot; its returned snapshot is persisted and
    /// installed. Returns the prior snapshot alongside `f`'s output so callers
    /// can restore it exactly.
    pub fn update<T, F>(&self, f: F) -> Result<(Snapshot, T)>
    where
        F: FnOnce(&Snapshot) -> Result<(Snapshot, T)>,
    {
        let mut inner = self.inner.write();
        let (next, output) = f(&inner.snapshot)?;
        self.persist_snapshot(&next)?;
        let prior = std::mem::replace(&mut inner.snapshot, next);
        inner.last_modified = inner.snapshot.last_modified;
        Ok((prior, output))
    }

    /// Replace the snapshot wholesale, keeping its own `last_modified`.
    pub fn replace(&self, snapshot: Snapshot) -> Result<()> {
        let mut inner = self.inner.write();
        self.persist_snapshot(&snapshot)?;
        inner.last_modified = snapshot.last_modified;
        inner.snapshot = snapshot;
        Ok(())
    }

    /// Adopt a remote snapshot iff it is strictly newer than local state.
    ///
    /// The comparison and the write happen under one lock, so a local
    /// mutation racing the fetch is never overwritten. Returns whether the
    /// remote snapshot was adopted.
    pub fn adopt_if_newer(&self, remote: VersionedSnapshot) -> Result<bool> {
        let mut inner = self.inner.write();
        if remote.snapshot.last_modified <= inner.last_modified {
            return Ok(false);
        }
        self.persist_snapshot(&remote.snapshot)?;
        self.store.set(VERSION_TOKEN_KEY, remote.version.as_str().as_bytes())?;
        inner.last_modified = remote.snapshot.last_modified;
        inner.snapshot = remote.snapshot;
        inner.version = Some(remote.version);
        Ok(true)
    }

    /// Record the remote revision the local snapshot corresponds to.
    pub fn set_version(&self, version: Option<VersionToken>) -> Result<()> {
        let mut inner = self.inner.write();
        match &version {
            Some(token) => self.store.set(VERSION_TOKEN_KEY, token.as_str().as_bytes())?,
            None => self.store.remove(VERSION_TOKEN_KEY)?,
        }
        inner.version = version;
        Ok(())
    }

    /// Persist or clear the active timer.
    pub fn set_timer(&self, timer: Option<ActiveTimer>) -> Result<()> {
        let mut inner = self.inner.write();
        match &timer {
            Some(value) => write_json(self.store.as_ref(), ACTIVE_TIMER_KEY, value)?,
            None => self.store.remove(ACTIVE_TIMER_KEY)?,
        }
        inner.timer = timer;
        Ok(())
    }

    fn persist_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        write_json(self.store.as_ref(), SNAPSHOT_KEY, snapshot)?;
        write_json(self.store.as_ref(), LAST_MODIFIED_KEY, &snapshot.last_modified)
    }
}

fn read_json<T: DeserializeOwned>(store: &dyn LocalStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    Ok(Some(serde_json::from_slice(&raw)?))
}

/// Treat an undecodable value as absent; store failures still propagate.
fn tolerate_corrupt<T>(read: Result<Option<T>>) -> Result<Option<T>> {
    match read {
        Err(TimesheetError::Serialization(reason)) => {
            warn!(%reason, "ignoring corrupt local value");
            Ok(None)
        }
        other => other,
    }
}

fn write_json<T: Serialize + ?Sized>(store: &dyn LocalStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_vec(value)?;
    store.set(key, &raw)
}
