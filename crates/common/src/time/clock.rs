//! Wall clock abstraction for testability
//!
//! Everything that stamps data (`lastModified`, timer start/stop) reads time
//! through [`Clock`] so tests can pin and advance it deterministically.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveDate, TimeZone, Utc};

/// Source of wall clock time in epoch milliseconds.
pub trait Clock: Send + Sync {
    /// Milliseconds since the UNIX epoch.
    fn now_millis(&self) -> i64;

    /// Calendar date in the local timezone for the current instant.
    fn today(&self) -> NaiveDate {
        local_date(self.now_millis())
    }
}

/// Real system clock implementation. Use this in production code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Mock clock for deterministic testing.
///
/// Clones share the same underlying instant, so a clock handed to a service
/// can still be advanced from the test body.
///
/// ```
/// use timesheet_common::time::{Clock, MockClock};
///
/// let clock = MockClock::at(1_000);
/// let shared = clock.clone();
/// clock.advance_millis(500);
/// assert_eq!(shared.now_millis(), 1_500);
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    millis: Arc<AtomicI64>,
}

impl MockClock {
    /// Create a clock pinned at `millis`.
    pub fn at(millis: i64) -> Self {
        Self { millis: Arc::new(AtomicI64::new(millis)) }
    }

    /// Advance the clock by `delta` milliseconds.
    pub fn advance_millis(&self, delta: i64) {
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }

    /// Jump to an absolute instant.
    pub fn set_millis(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::at(Utc::now().timestamp_millis())
    }
}

impl Clock for MockClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Local calendar date of an epoch-millisecond instant.
///
/// Out-of-range instants fall back to the UTC epoch date.
pub fn local_date(millis: i64) -> NaiveDate {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.date_naive())
        .unwrap_or_default()
}
