//! Persisted usage record

use super::UsageError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counter of API calls made in the current quota window.
///
/// Serialized as `{"last_reset_timestamp": <epoch seconds>, "requests_made": <n>}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Start of the current window, in seconds since the Unix epoch
    #[serde(rename = "last_reset_timestamp")]
    pub window_start: f64,
    /// Calls made since `window_start`
    pub requests_made: u32,
}

impl UsageRecord {
    /// A zeroed record whose window starts now
    pub fn fresh() -> Self {
        Self::starting_at(now_epoch_secs())
    }

    /// A zeroed record whose window starts at `window_start`
    pub fn starting_at(window_start: f64) -> Self {
        Self {
            window_start,
            requests_made: 0,
        }
    }

    /// Parse a stored record
    pub fn parse(text: &str) -> Result<Self, UsageError> {
        let record: UsageRecord = serde_json::from_str(text).map_err(UsageError::Parse)?;
        if !record.window_start.is_finite() {
            return Err(UsageError::InvalidTimestamp(record.window_start));
        }
        Ok(record)
    }

    /// Seconds elapsed between the window start and `now`
    pub fn elapsed(&self, now: f64) -> f64 {
        now - self.window_start
    }

    /// Whether more than `window` has passed since the window started
    pub fn window_elapsed(&self, now: f64, window: Duration) -> bool {
        self.elapsed(now) > window.as_secs_f64()
    }

    /// Time left until the window resets, never negative
    pub fn resets_in(&self, now: f64, window: Duration) -> Duration {
        let left = window.as_secs_f64() - self.elapsed(now);
        Duration::from_secs_f64(left.max(0.0))
    }

    /// Restart the window at `now` with a zero counter
    pub fn reset(&mut self, now: f64) {
        self.window_start = now;
        self.requests_made = 0;
    }
}

/// Current time as fractional seconds since the Unix epoch
pub fn now_epoch_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Render a duration as `Xh Ym`
pub fn format_hm(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
}
