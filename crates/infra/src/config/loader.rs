//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If any `TIMESHEET_*` variable is set, configuration comes from the
//!    environment
//! 2. Otherwise probes multiple paths for a config file (JSON or TOML)
//! 3. With neither, defaults apply: local store only, no remote
//!
//! A missing remote section is never an error; the app runs unconfigured.
//!
//! ## Environment Variables
//! - `TIMESHEET_STORE_PATH`: Local store file (`:memory:` for a volatile store)
//! - `TIMESHEET_SYNC_DEBOUNCE_MS`: Push debounce window
//! - `TIMESHEET_SYNC_INTERVAL_SECS`: Periodic push interval
//! - `TIMESHEET_SYNC_MAX_CONFLICT_RETRIES`: Conflict re-fetch bound
//! - `TIMESHEET_API_URL` / `TIMESHEET_API_TOKEN`: REST backend
//! - `TIMESHEET_GITHUB_OWNER`, `TIMESHEET_GITHUB_REPO`, `TIMESHEET_GITHUB_TOKEN`:
//!   GitHub backend (all three required)
//! - `TIMESHEET_GITHUB_BRANCH`, `TIMESHEET_GITHUB_DATA_PATH`,
//!   `TIMESHEET_GITHUB_API_BASE`: optional GitHub overrides
//!
//! GitHub wins when both backends are fully configured.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./timesheet.{json,toml}` then `./config.{json,toml}`
//! 2. The same names one and two directories up
//! 3. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use timesheet_domain::{
    Config, GitHubConfig, RemoteConfig, RestConfig, Result, StorageConfig, SyncConfig,
    TimesheetError,
};

const ENV_PREFIX: &str = "TIMESHEET_";
const CONFIG_STEMS: [&str; 2] = ["timesheet", "config"];
const CONFIG_EXTENSIONS: [&str; 2] = ["json", "toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `TimesheetError::Config` only when a config file exists but
/// cannot be read or parsed.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!(
                backend = config.remote.backend(),
                "Configuration loaded from environment variables"
            );
            return Ok(config);
        }
        Err(e) => tracing::debug!(error = %e, "Environment configuration unavailable, trying file"),
    }

    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("No configuration found; running with local storage only");
            Ok(Config::default())
        }
    }
}

/// Load configuration from environment variables
///
/// Unset variables take their defaults.
///
/// # Errors
/// Returns `TimesheetError::Config` when no `TIMESHEET_*` variable is set or a
/// numeric variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let any_set = std::env::vars().any(|(key, _)| key.starts_with(ENV_PREFIX));
    if !any_set {
        return Err(TimesheetError::Config("No TIMESHEET_* environment variables set".to_string()));
    }

    let mut storage = StorageConfig::default();
    if let Some(path) = env_opt("TIMESHEET_STORE_PATH") {
        storage.path = path;
    }

    let mut sync = SyncConfig::default();
    if let Some(ms) = env_parse("TIMESHEET_SYNC_DEBOUNCE_MS")? {
        sync.debounce_ms = ms;
    }
    if let Some(secs) = env_parse("TIMESHEET_SYNC_INTERVAL_SECS")? {
        sync.periodic_interval_secs = secs;
    }
    if let Some(retries) = env_parse("TIMESHEET_SYNC_MAX_CONFLICT_RETRIES")? {
        sync.max_conflict_retries = retries;
    }

    Ok(Config { storage, remote: remote_from_env(), sync })
}

fn remote_from_env() -> RemoteConfig {
    let owner = env_opt("TIMESHEET_GITHUB_OWNER");
    let repo = env_opt("TIMESHEET_GITHUB_REPO");
    let token = env_opt("TIMESHEET_GITHUB_TOKEN");

    if let (Some(owner), Some(repo), Some(token)) = (owner, repo, token) {
        let mut github = GitHubConfig::new(owner, repo, token);
        if let Some(branch) = env_opt("TIMESHEET_GITHUB_BRANCH") {
            github.branch = branch;
        }
        if let Some(data_path) = env_opt("TIMESHEET_GITHUB_DATA_PATH") {
            github.data_path = data_path;
        }
        if let Some(api_base) = env_opt("TIMESHEET_GITHUB_API_BASE") {
            github.api_base = api_base;
        }
        return RemoteConfig::Github(github);
    }

    if let Some(url) = env_opt("TIMESHEET_API_URL") {
        let mut rest = RestConfig::new(url);
        rest.token = env_opt("TIMESHEET_API_TOKEN");
        return RemoteConfig::Rest(rest);
    }

    RemoteConfig::Unconfigured
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `TimesheetError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(TimesheetError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            TimesheetError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| TimesheetError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration; format is detected by file extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| TimesheetError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| TimesheetError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(TimesheetError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Returns the first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    ["", "..", "../.."]
        .iter()
        .flat_map(|up| {
            CONFIG_STEMS.iter().flat_map(move |stem| {
                CONFIG_EXTENSIONS.iter().map(move |ext| dir.join(up).join(format!("{stem}.{ext}")))
            })
        })
        .collect()
}

/// Non-empty environment variable
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| TimesheetError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::Builder;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 12] = [
        "TIMESHEET_STORE_PATH",
        "TIMESHEET_SYNC_DEBOUNCE_MS",
        "TIMESHEET_SYNC_INTERVAL_SECS",
        "TIMESHEET_SYNC_MAX_CONFLICT_RETRIES",
        "TIMESHEET_API_URL",
        "TIMESHEET_API_TOKEN",
        "TIMESHEET_GITHUB_OWNER",
        "TIMESHEET_GITHUB_REPO",
        "TIMESHEET_GITHUB_TOKEN",
        "TIMESHEET_GITHUB_BRANCH",
        "TIMESHEET_GITHUB_DATA_PATH",
        "TIMESHEET_GITHUB_API_BASE",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_env_requires_at_least_one_variable() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, TimesheetError::Config(_)));
    }

    #[test]
    fn test_env_rest_backend_with_sync_overrides() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("TIMESHEET_API_URL", "http://localhost:4000/api");
        std::env::set_var("TIMESHEET_API_TOKEN", "secret");
        std::env::set_var("TIMESHEET_SYNC_DEBOUNCE_MS", "500");
        std::env::set_var("TIMESHEET_STORE_PATH", ":memory:");

        let config = load_from_env().unwrap();
        clear_env();

        let RemoteConfig::Rest(rest) = config.remote else {
            panic!("expected rest backend, got {:?}", config.remote);
        };
        assert_eq!(rest.base_url, "http://localhost:4000/api");
        assert_eq!(rest.token.as_deref(), Some("secret"));
        assert_eq!(config.sync.debounce_ms, 500);
        assert_eq!(config.sync.periodic_interval_secs, 30);
        assert_eq!(config.storage.path, ":memory:");
    }

    #[test]
    fn test_env_github_wins_over_rest() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("TIMESHEET_API_URL", "http://localhost:4000/api");
        std::env::set_var("TIMESHEET_GITHUB_OWNER", "me");
        std::env::set_var("TIMESHEET_GITHUB_REPO", "hours");
        std::env::set_var("TIMESHEET_GITHUB_TOKEN", "ghp_x");
        std::env::set_var("TIMESHEET_GITHUB_BRANCH", "data");

        let config = load_from_env().unwrap();
        clear_env();

        let RemoteConfig::Github(github) = config.remote else {
            panic!("expected github backend");
        };
        assert_eq!(github.repo, "hours");
        assert_eq!(github.branch, "data");
        assert_eq!(github.data_path, "data/timesheet.json");
    }

    #[test]
    fn test_env_incomplete_github_is_unconfigured() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("TIMESHEET_GITHUB_OWNER", "me");
        std::env::set_var("TIMESHEET_GITHUB_REPO", "hours");
        std::env::set_var("TIMESHEET_GITHUB_TOKEN", "  ");

        let config = load_from_env().unwrap();
        clear_env();

        assert_eq!(config.remote, RemoteConfig::Unconfigured);
    }

    #[test]
    fn test_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("TIMESHEET_SYNC_INTERVAL_SECS", "soon");

        let result = load_from_env();
        clear_env();

        assert!(matches!(
            result,
            Err(TimesheetError::Config(msg)) if msg.contains("TIMESHEET_SYNC_INTERVAL_SECS")
        ));
    }

    #[test]
    fn test_load_from_file_json() {
        let file = write_config(
            ".json",
            r#"{
                "storage": { "path": "/tmp/hours.db" },
                "remote": { "backend": "rest", "base_url": "http://api.local" },
                "sync": { "debounce_ms": 1000 }
            }"#,
        );

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.storage.path, "/tmp/hours.db");
        assert_eq!(config.storage.pool_size, 4);
        assert!(matches!(
            config.remote,
            RemoteConfig::Rest(ref r) if r.base_url == "http://api.local"
        ));
        assert_eq!(config.sync.debounce_ms, 1000);
        assert_eq!(config.sync.max_conflict_retries, 3);
    }

    #[test]
    fn test_load_from_file_toml() {
        let file = write_config(
            ".toml",
            r#"
[remote]
backend = "github"
owner = "me"
repo = "hours"
token = "ghp_x"
data_path = "timesheet.json"

[sync]
periodic_interval_secs = 60
"#,
        );

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        let RemoteConfig::Github(github) = config.remote else {
            panic!("expected github backend");
        };
        assert_eq!(github.data_path, "timesheet.json");
        assert_eq!(github.branch, "main");
        assert_eq!(config.sync.periodic_interval_secs, 60);
    }

    #[test]
    fn test_file_without_remote_is_unconfigured() {
        let file = write_config(".toml", "[storage]\npath = \"local.db\"\n");

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.remote, RemoteConfig::Unconfigured);
        assert!(!config.remote.is_configured());
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/timesheet.json")));
        assert!(matches!(result, Err(TimesheetError::Config(_))));
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let file = write_config(".json", r#"{ "storage": "#);

        let result = load_from_file(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(TimesheetError::Config(msg)) if msg.contains("JSON")));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("remote: {}", &PathBuf::from("timesheet.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_probe_candidates_prefer_timesheet_name() {
        let candidates = candidates_in(Path::new("/srv/app"));
        assert_eq!(candidates[0], PathBuf::from("/srv/app/timesheet.json"));
        assert_eq!(candidates[3], PathBuf::from("/srv/app/config.toml"));
        assert_eq!(candidates.len(), 12);
    }
}
