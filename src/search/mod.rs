//! Search orchestration module
//!
//! Turns a run request into paginated API calls under the daily quota,
//! collects deduplicated results and writes them out.

mod confirm;
mod executor;
mod models;

pub use confirm::{Confirm, FixedAnswer};
pub use executor::{Search, SearchError};
pub use models::*;
