//! Search engine module
//!
//! Defines the Engine trait and the Google Custom Search implementation.

mod traits;

pub mod google_cse;

pub use google_cse::GoogleCse;
pub use traits::*;
