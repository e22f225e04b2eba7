//! Daily API quota tracking
//!
//! A single JSON file holds the number of calls made in the current
//! rolling window. The tracker re-reads it on every check so that usage
//! carries over between runs.

mod record;
mod tracker;

pub use record::{format_hm, now_epoch_secs, UsageRecord};
pub use tracker::{Admission, UsageStatus, UsageTracker};

use std::path::PathBuf;
use thiserror::Error;

/// Usage tracking errors
#[derive(Error, Debug)]
pub enum UsageError {
    #[error("failed to write usage file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed usage record: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("usage record has a non-finite timestamp: {0}")]
    InvalidTimestamp(f64),

    #[error("failed to serialize usage record: {0}")]
    Serialize(#[source] serde_json::Error),
}
