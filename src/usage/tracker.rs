//! File-backed daily quota tracker

use super::record::{format_hm, now_epoch_secs, UsageRecord};
use super::UsageError;
use crate::config::QuotaSettings;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Another call may be made
    Granted,
    /// The window's quota is used up
    Exhausted {
        used: u32,
        limit: u32,
        resets_in: Duration,
    },
}

/// Read-only snapshot of the quota
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageStatus {
    pub used: u32,
    pub limit: u32,
    pub remaining: i64,
    pub resets_in: Duration,
}

/// Tracks API calls against a daily limit, persisted to a JSON file.
///
/// Every operation reads the file, and every mutation writes it back
/// immediately. There is no locking: two processes sharing one file race.
#[derive(Debug, Clone)]
pub struct UsageTracker {
    path: PathBuf,
    limit: u32,
    window: Duration,
}

impl UsageTracker {
    /// Create a tracker for `path` using the configured limit and window
    pub fn new(path: impl Into<PathBuf>, quota: &QuotaSettings) -> Self {
        Self {
            path: path.into(),
            limit: quota.daily_limit,
            window: quota.window(),
        }
    }

    /// Create a tracker with the default 24-hour window
    pub fn with_limit(path: impl Into<PathBuf>, limit: u32) -> Self {
        Self::new(
            path,
            &QuotaSettings {
                daily_limit: limit,
                ..QuotaSettings::default()
            },
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Load the stored record, falling back to a fresh one when the file is
    /// missing or cannot be parsed.
    pub fn load(&self) -> UsageRecord {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return UsageRecord::fresh(),
            Err(e) => {
                warn!("Cannot read usage file {}: {}", self.path.display(), e);
                return UsageRecord::fresh();
            }
        };

        match UsageRecord::parse(&text) {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    "Usage file {} is corrupt ({}), starting a fresh window",
                    self.path.display(),
                    e
                );
                UsageRecord::fresh()
            }
        }
    }

    /// Overwrite the stored record
    pub fn save(&self, record: &UsageRecord) -> Result<(), UsageError> {
        let json = serde_json::to_string(record).map_err(UsageError::Serialize)?;
        std::fs::write(&self.path, json).map_err(|source| UsageError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Calls left in the current window. An elapsed window counts as the
    /// full limit, but the reset is not written back.
    pub fn remaining(&self) -> i64 {
        let record = self.load();
        if record.window_elapsed(now_epoch_secs(), self.window) {
            return i64::from(self.limit);
        }
        i64::from(self.limit) - i64::from(record.requests_made)
    }

    /// Check whether another call may be made, resetting an elapsed window
    /// first. Never increments the counter.
    pub fn admit(&self) -> Result<Admission, UsageError> {
        let mut record = self.load();
        let now = now_epoch_secs();

        if record.window_elapsed(now, self.window) {
            info!("Quota window has passed, resetting API request count");
            record.reset(now);
            self.save(&record)?;
        }

        if record.requests_made >= self.limit {
            let resets_in = record.resets_in(now, self.window);
            warn!(
                "API limit reached ({}/{}), resets in {}",
                record.requests_made,
                self.limit,
                format_hm(resets_in)
            );
            return Ok(Admission::Exhausted {
                used: record.requests_made,
                limit: self.limit,
                resets_in,
            });
        }

        Ok(Admission::Granted)
    }

    /// Count one successful API call. Returns the new total.
    pub fn record_call(&self) -> Result<u32, UsageError> {
        let mut record = self.load();
        record.requests_made = record.requests_made.saturating_add(1);
        self.save(&record)?;
        debug!("API usage: {}/{}", record.requests_made, self.limit);
        Ok(record.requests_made)
    }

    /// Snapshot of the quota without touching the stored record
    pub fn status(&self) -> UsageStatus {
        let record = self.load();
        let now = now_epoch_secs();

        if record.window_elapsed(now, self.window) {
            return UsageStatus {
                used: 0,
                limit: self.limit,
                remaining: i64::from(self.limit),
                resets_in: self.window,
            };
        }

        UsageStatus {
            used: record.requests_made,
            limit: self.limit,
            remaining: i64::from(self.limit) - i64::from(record.requests_made),
            resets_in: record.resets_in(now, self.window),
        }
    }
}
