//! Configuration structures
//!
//! Loaded by `timesheet-infra::config::loader` from the environment or a
//! JSON/TOML file. A missing or incomplete remote section leaves the app in
//! unconfigured (local-only) mode; it is never an error.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_DEBOUNCE_MS, DEFAULT_GITHUB_API_BASE, DEFAULT_GITHUB_BRANCH,
    DEFAULT_GITHUB_DATA_PATH, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MAX_CONFLICT_RETRIES,
    DEFAULT_PERIODIC_INTERVAL_SECS, DEFAULT_STORE_FILE,
};

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Local store location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { path: default_store_path(), pool_size: default_pool_size() }
    }
}

/// Which remote authority to synchronize with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum RemoteConfig {
    /// Local store only
    #[default]
    Unconfigured,
    /// REST CRUD service; per-record writes with rollback
    Rest(RestConfig),
    /// Versioned file in a GitHub repository; debounced snapshot pushes
    Github(GitHubConfig),
}

impl RemoteConfig {
    pub const fn is_configured(&self) -> bool {
        !matches!(self, Self::Unconfigured)
    }

    /// Backend label for logs.
    pub const fn backend(&self) -> &'static str {
        match self {
            Self::Unconfigured => "unconfigured",
            Self::Rest(_) => "rest",
            Self::Github(_) => "github",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RestConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), token: None, timeout_secs: default_timeout_secs() }
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubConfig {
    pub owner: String,
    pub repo: String,
    pub token: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_data_path")]
    pub data_path: String,
    #[serde(default = "default_github_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GitHubConfig {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
            branch: default_branch(),
            data_path: default_data_path(),
            api_base: default_github_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &"<redacted>")
            .field("branch", &self.branch)
            .field("data_path", &self.data_path)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Push scheduling knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_periodic_interval_secs")]
    pub periodic_interval_secs: u64,
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,
}

impl SyncConfig {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub const fn periodic_interval(&self) -> Duration {
        Duration::from_secs(self.periodic_interval_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            periodic_interval_secs: default_periodic_interval_secs(),
            max_conflict_retries: default_max_conflict_retries(),
        }
    }
}

fn default_store_path() -> String {
    DEFAULT_STORE_FILE.to_string()
}

const fn default_pool_size() -> u32 {
    4
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_branch() -> String {
    DEFAULT_GITHUB_BRANCH.to_string()
}

fn default_data_path() -> String {
    DEFAULT_GITHUB_DATA_PATH.to_string()
}

fn default_github_api_base() -> String {
    DEFAULT_GITHUB_API_BASE.to_string()
}

const fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

const fn default_periodic_interval_secs() -> u64 {
    DEFAULT_PERIODIC_INTERVAL_SECS
}

const fn default_max_conflict_retries() -> u32 {
    DEFAULT_MAX_CONFLICT_RETRIES
}
