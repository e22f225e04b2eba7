//! Run request and report data models

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest number of results that may be requested per query
pub const MAX_RESULTS_PER_QUERY: u32 = 100;

/// Number of page calls needed for `results_per_query_cap` results when each
/// call returns at most `page_size` items
pub fn pages_for(results_per_query_cap: u32, page_size: u32) -> u32 {
    results_per_query_cap.div_ceil(page_size.max(1))
}

/// Number of API calls per query at the API's page size of 10
pub fn calls_per_query(results_per_query_cap: u32) -> u32 {
    pages_for(results_per_query_cap, crate::PAGE_SIZE)
}

/// Validated input to one search run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    /// Queries, executed in order
    pub queries: Vec<String>,
    /// Results wanted per query (1..=100)
    pub results_per_query_cap: u32,
    /// Where the JSON array of results is written
    pub output: PathBuf,
    /// Keep full URLs instead of hosts
    pub full_url_mode: bool,
    /// Skip every quota check and do not count calls
    pub bypass_quota: bool,
}

impl RunRequest {
    pub fn new(queries: Vec<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            queries,
            results_per_query_cap: 10,
            output: output.into(),
            full_url_mode: false,
            bypass_quota: false,
        }
    }

    pub fn with_results_per_query(mut self, cap: u32) -> Self {
        self.results_per_query_cap = cap;
        self
    }

    pub fn with_full_url(mut self, full_url: bool) -> Self {
        self.full_url_mode = full_url;
        self
    }

    pub fn with_bypass_quota(mut self, bypass: bool) -> Self {
        self.bypass_quota = bypass;
        self
    }

    /// Check the request can be executed
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_RESULTS_PER_QUERY).contains(&self.results_per_query_cap) {
            return Err(format!(
                "results per query must be between 1 and {}, got {}",
                MAX_RESULTS_PER_QUERY, self.results_per_query_cap
            ));
        }
        if let Some(i) = self.queries.iter().position(|q| q.trim().is_empty()) {
            return Err(format!("query #{} is empty", i));
        }
        Ok(())
    }
}

/// Pre-flight comparison of the calls a run may need against the quota left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaEstimate {
    pub required: u32,
    pub remaining: i64,
}

impl QuotaEstimate {
    pub fn is_sufficient(&self) -> bool {
        self.remaining >= i64::from(self.required)
    }
}

/// Why a query's pagination ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStop {
    /// All planned pages were fetched
    Completed,
    /// The API returned a page without items
    EndOfResults,
    /// The quota ran out before the next page
    QuotaExhausted,
    /// A request failed; remaining pages were abandoned
    TransportError,
    /// The usage file could not be updated
    UsageUnavailable,
}

/// What happened to one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryReport {
    pub query: String,
    /// Successful page calls
    pub pages_fetched: u32,
    /// Result keys this query added to the run-wide set
    pub new_results: usize,
    pub stop: QueryStop,
}

/// How the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every query was attempted
    Completed,
    /// The quota ran out after a query; later queries were skipped
    QuotaExhausted,
    /// The pre-flight confirmation was refused; nothing was written
    Declined,
    /// The usage file could not be updated; later queries were skipped
    UsageUnavailable,
}

/// Result of a search run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    /// Sorted, deduplicated result keys
    pub results: Vec<String>,
    /// Successful API calls made
    pub calls_made: u32,
    pub queries: Vec<QueryReport>,
    /// Queries never started because of a run-level stop
    pub queries_skipped: usize,
}

impl RunSummary {
    pub(crate) fn empty(outcome: RunOutcome) -> Self {
        Self {
            outcome,
            results: Vec::new(),
            calls_made: 0,
            queries: Vec::new(),
            queries_skipped: 0,
        }
    }

    /// Whether the output file was written
    pub fn wrote_output(&self) -> bool {
        self.outcome != RunOutcome::Declined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calls_per_query() {
        assert_eq!(calls_per_query(1), 1);
        assert_eq!(calls_per_query(10), 1);
        assert_eq!(calls_per_query(11), 2);
        assert_eq!(calls_per_query(25), 3);
        assert_eq!(calls_per_query(100), 10);

        for n in 1..=100u32 {
            assert_eq!(calls_per_query(n), (n as f64 / 10.0).ceil() as u32);
        }
    }

    #[test]
    fn test_pages_for_other_page_sizes() {
        assert_eq!(pages_for(10, 5), 2);
        assert_eq!(pages_for(7, 1), 7);
    }

    #[test]
    fn test_request_builder_and_validation() {
        let request = RunRequest::new(vec!["rust".to_string()], "out.json")
            .with_results_per_query(25)
            .with_full_url(true)
            .with_bypass_quota(true);

        assert_eq!(request.results_per_query_cap, 25);
        assert!(request.full_url_mode);
        assert!(request.bypass_quota);
        assert!(request.validate().is_ok());

        assert!(request.clone().with_results_per_query(0).validate().is_err());
        assert!(request.clone().with_results_per_query(101).validate().is_err());

        let blank = RunRequest::new(vec!["ok".to_string(), " ".to_string()], "out.json");
        assert!(blank.validate().unwrap_err().contains("#1"));
    }

    #[test]
    fn test_quota_estimate() {
        assert!(QuotaEstimate { required: 10, remaining: 10 }.is_sufficient());
        assert!(!QuotaEstimate { required: 10, remaining: 9 }.is_sufficient());
        assert!(!QuotaEstimate { required: 1, remaining: -3 }.is_sufficient());
    }
}
