//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Local store keys
pub const SNAPSHOT_KEY: &str = "timesheet-data";
pub const LAST_MODIFIED_KEY: &str = "timesheet-last-modified";
pub const VERSION_TOKEN_KEY: &str = "timesheet-version";
pub const ACTIVE_TIMER_KEY: &str = "timesheet-active-timer";

// Push scheduling
pub const DEFAULT_DEBOUNCE_MS: u64 = 2_000;
pub const DEFAULT_PERIODIC_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;

// Timer math
pub const MS_PER_HOUR: f64 = 3_600_000.0;

// Remote defaults
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";
pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_BRANCH: &str = "main";
pub const DEFAULT_GITHUB_DATA_PATH: &str = "data/timesheet.json";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// Local storage defaults
pub const DEFAULT_STORE_FILE: &str = "timesheet.db";
