//! cse-rs: a quota-aware client for the Google Custom Search JSON API
//!
//! Saved queries are run page by page against the API while a file-backed
//! tracker keeps the calls within the daily quota. Result links are reduced
//! to hosts (or kept as full URLs), deduplicated across all queries and
//! written out as a sorted JSON array.

pub mod config;
pub mod credentials;
pub mod engines;
pub mod network;
pub mod queries;
pub mod results;
pub mod search;
pub mod usage;

pub use config::Settings;
pub use credentials::{CredentialStore, Credentials};
pub use engines::Engine;
pub use queries::QueryStore;
pub use results::ResultSet;
pub use search::{RunRequest, RunSummary, Search};
pub use usage::UsageTracker;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default timeout for API requests in seconds
pub const DEFAULT_TIMEOUT: u64 = 10;

/// Free-tier daily request limit of the Custom Search JSON API
pub const DEFAULT_DAILY_LIMIT: u32 = 100;

/// Items the API returns per call at most
pub const PAGE_SIZE: u32 = 10;
