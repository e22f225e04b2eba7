//! Settings structures for cse-rs configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Main settings structure, as read from `cse.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub storage: StorageSettings,
    pub quota: QuotaSettings,
    pub search: SearchSettings,
    pub outgoing: OutgoingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Merge with environment variables (CSE_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("CSE_DAILY_LIMIT") {
            if let Ok(limit) = val.parse() {
                self.quota.daily_limit = limit;
            }
        }
        if let Ok(val) = std::env::var("CSE_PACING_MS") {
            if let Ok(ms) = val.parse() {
                self.search.pacing_ms = ms;
            }
        }
        if let Ok(val) = std::env::var("CSE_ENDPOINT") {
            self.search.endpoint = val;
        }
        if let Ok(val) = std::env::var("CSE_USAGE_FILE") {
            self.storage.usage_file = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("CSE_CREDENTIALS_FILE") {
            self.storage.credentials_file = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("CSE_QUERIES_FILE") {
            self.storage.queries_file = PathBuf::from(val);
        }
    }

    /// Reject values the executor cannot work with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.quota.daily_limit == 0 {
            return Err(SettingsError::Invalid {
                key: "quota.daily_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.quota.window_secs == 0 {
            return Err(SettingsError::Invalid {
                key: "quota.window_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(1..=10).contains(&self.search.page_size) {
            return Err(SettingsError::Invalid {
                key: "search.page_size",
                reason: format!("{} is outside 1..=10", self.search.page_size),
            });
        }
        let timeout = self.outgoing.request_timeout;
        if !(timeout > 0.0 && timeout <= MAX_REQUEST_TIMEOUT_SECS) {
            return Err(SettingsError::Invalid {
                key: "outgoing.request_timeout",
                reason: format!(
                    "{} is outside (0, {}] seconds",
                    timeout, MAX_REQUEST_TIMEOUT_SECS
                ),
            });
        }
        Ok(())
    }
}

/// Locations of the files the tool reads and writes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Profile -> API key / engine id
    pub credentials_file: PathBuf,
    /// Saved query list
    pub queries_file: PathBuf,
    /// Daily usage counter
    pub usage_file: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            credentials_file: PathBuf::from(".credentials.yml"),
            queries_file: PathBuf::from("queries.json"),
            usage_file: PathBuf::from(".api_usage.json"),
        }
    }
}

/// Daily request quota
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaSettings {
    /// Requests allowed per window
    pub daily_limit: u32,
    /// Length of the rolling window in seconds
    pub window_secs: u64,
}

impl QuotaSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for QuotaSettings {
    fn default() -> Self {
        Self {
            daily_limit: crate::DEFAULT_DAILY_LIMIT,
            window_secs: 24 * 60 * 60,
        }
    }
}

/// Search API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Custom Search JSON API endpoint
    pub endpoint: String,
    /// Items requested per call (the API caps this at 10)
    pub page_size: u32,
    /// Minimum spacing between consecutive calls, in milliseconds
    pub pacing_ms: u64,
}

impl SearchSettings {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://www.googleapis.com/customsearch/v1".to_string(),
            page_size: crate::PAGE_SIZE,
            pacing_ms: 1000,
        }
    }
}

/// Longest accepted request timeout, in seconds
pub const MAX_REQUEST_TIMEOUT_SECS: f64 = 3600.0;

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Request timeout in seconds
    pub request_timeout: f64,
    /// Proxy for all outgoing requests
    pub proxy: Option<String>,
    /// User agent override
    pub user_agent: Option<String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: crate::DEFAULT_TIMEOUT as f64,
            proxy: None,
            user_agent: None,
        }
    }
}
