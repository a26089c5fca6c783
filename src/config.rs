// Application configuration.
// Resolves API endpoint, storage locations and timing knobs from the environment.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use crate::cache::RetryPolicy;
use crate::error::{PlacardError, Result};

pub const DEFAULT_API_BASE: &str = "https://jsonplaceholder.typicode.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST API.
    pub api_base: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Quiet period before a search query is committed.
    pub debounce: Duration,
    /// Directory holding persisted preferences.
    pub data_dir: PathBuf,
    /// Directory holding the log file.
    pub log_dir: PathBuf,
    /// tracing filter directive.
    pub log_filter: String,
    /// Retry policy for reads.
    pub retry: RetryPolicy,
}

impl Config {
    /// Build configuration from `PLACARD_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "placard");

        let data_dir = match lookup("PLACARD_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs
                .as_ref()
                .map(|d| d.data_dir().to_path_buf())
                .ok_or_else(|| PlacardError::Config("no home directory found".into()))?,
        };
        let log_dir = dirs
            .as_ref()
            .map(|d| d.cache_dir().to_path_buf())
            .unwrap_or_else(|| data_dir.clone());

        let request_timeout = match lookup("PLACARD_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_number("PLACARD_TIMEOUT_SECS", &v)?),
            None => DEFAULT_TIMEOUT,
        };
        let debounce = match lookup("PLACARD_DEBOUNCE_MS") {
            Some(v) => Duration::from_millis(parse_number("PLACARD_DEBOUNCE_MS", &v)?),
            None => DEFAULT_DEBOUNCE,
        };

        Ok(Self {
            api_base: lookup("PLACARD_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            request_timeout,
            debounce,
            data_dir,
            log_dir,
            log_filter: lookup("PLACARD_LOG").unwrap_or_else(|| "info".to_string()),
            retry: RetryPolicy::default(),
        })
    }

    /// Path of the log file.
    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join("placard.log")
    }
}

fn parse_number(name: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| PlacardError::Config(format!("{} must be a number, got {:?}", name, value)))
}
