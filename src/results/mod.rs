//! Result keys and the run-wide result set
//!
//! Links returned by the API are reduced to a dedup key (host or full URL)
//! and collected into a sorted set that is written out at the end of a run.

mod container;
mod types;

pub use container::ResultSet;
pub use types::*;
