//! Search execution and orchestration

use super::confirm::Confirm;
use super::models::*;
use crate::config::Settings;
use crate::credentials::Credentials;
use crate::engines::{Engine, GoogleCse, RequestParams};
use crate::network::HttpClient;
use crate::results::{DedupMode, ResultSet};
use crate::usage::{Admission, UsageTracker};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that end a run. Quota exhaustion, failed requests and an
/// unwritable usage file are not errors; they only cut the affected query or
/// run short.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("invalid run request: {0}")]
    InvalidRequest(String),

    #[error("failed to write results to '{path}': {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Runs a list of queries page by page against one engine, charging every
/// successful call to the usage tracker.
///
/// Everything happens in sequence: one request at a time, with at least the
/// pacing interval between consecutive requests.
pub struct Search {
    /// HTTP client for making requests
    client: HttpClient,
    /// Engine that builds and parses requests
    engine: Arc<dyn Engine>,
    /// Items requested per call
    page_size: u32,
    /// Spacing between calls; `None` disables pacing
    pacer: Option<DefaultDirectRateLimiter>,
}

impl Search {
    /// Create a new search executor
    pub fn new(client: HttpClient, engine: Arc<dyn Engine>) -> Self {
        let page_size = engine.results_per_page();
        Self {
            client,
            engine,
            page_size,
            pacer: None,
        }
        .with_pacing(Duration::from_secs(1))
    }

    /// Build an executor for the Google engine from settings
    pub fn from_settings(settings: &Settings, credentials: &Credentials) -> anyhow::Result<Self> {
        let client = HttpClient::with_settings(&settings.outgoing)?;
        let engine = Arc::new(GoogleCse::new(&settings.search.endpoint, credentials));
        Ok(Self::new(client, engine)
            .with_page_size(settings.search.page_size)
            .with_pacing(settings.search.pacing()))
    }

    /// Set the minimum spacing between calls. Zero disables pacing.
    pub fn with_pacing(mut self, interval: Duration) -> Self {
        self.pacer = Quota::with_period(interval).map(RateLimiter::direct);
        self
    }

    /// Set items requested per call, capped by the engine's page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, self.engine.results_per_page());
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Execute a run.
    ///
    /// Unless the quota is bypassed, a pre-flight estimate is compared to the
    /// remaining quota and `confirm` decides whether to continue when it
    /// falls short. The result set is written to the output path once, at the
    /// end, unless the run was declined.
    pub async fn execute(
        &self,
        request: &RunRequest,
        tracker: &UsageTracker,
        confirm: &mut dyn Confirm,
    ) -> Result<RunSummary, SearchError> {
        request.validate().map_err(SearchError::InvalidRequest)?;

        let pages = pages_for(request.results_per_query_cap, self.page_size);
        info!(
            "Starting search for {} queries on {} ({} call(s) per query)",
            request.queries.len(),
            self.engine.name(),
            pages
        );

        if !request.bypass_quota && !request.queries.is_empty() {
            let estimate = QuotaEstimate {
                required: (request.queries.len() as u32).saturating_mul(pages),
                remaining: tracker.remaining(),
            };
            if !estimate.is_sufficient() {
                warn!(
                    "Not enough API requests remaining for a full run (required ~{}, remaining {})",
                    estimate.required, estimate.remaining
                );
                if !confirm.confirm(&estimate) {
                    info!("Aborting search");
                    return Ok(RunSummary::empty(RunOutcome::Declined));
                }
            }
        }

        let mut results = ResultSet::new(DedupMode::from_full_url_flag(request.full_url_mode));
        let mut summary = RunSummary::empty(RunOutcome::Completed);

        for (index, query) in request.queries.iter().enumerate() {
            info!("Running query: '{}'", query);
            let report = self
                .run_query(query, pages, request.bypass_quota, tracker, &mut results)
                .await;
            debug!(
                "Query '{}' ended with {:?} after {} page(s), {} new result(s)",
                query, report.stop, report.pages_fetched, report.new_results
            );
            let run_stop = if report.stop == QueryStop::UsageUnavailable {
                Some(RunOutcome::UsageUnavailable)
            } else if request.bypass_quota {
                None
            } else {
                match tracker.admit() {
                    Ok(Admission::Granted) => None,
                    Ok(Admission::Exhausted { .. }) => {
                        warn!("Stopping all searches due to API limit");
                        Some(RunOutcome::QuotaExhausted)
                    }
                    Err(e) => {
                        error!("Failed to update usage file: {}", e);
                        Some(RunOutcome::UsageUnavailable)
                    }
                }
            };

            summary.calls_made += report.pages_fetched;
            summary.queries.push(report);

            if let Some(outcome) = run_stop {
                summary.outcome = outcome;
                summary.queries_skipped = request.queries.len() - index - 1;
                break;
            }
        }

        results
            .write_json(&request.output)
            .map_err(|source| SearchError::Output {
                path: request.output.clone(),
                source,
            })?;

        summary.results = results.to_sorted_vec();
        info!(
            "Found {} unique results, saved to '{}'",
            summary.results.len(),
            request.output.display()
        );

        Ok(summary)
    }

    /// Fetch up to `pages` pages for one query. A page whose call could not
    /// be recorded is still kept, but ends the query.
    async fn run_query(
        &self,
        query: &str,
        pages: u32,
        bypass_quota: bool,
        tracker: &UsageTracker,
        results: &mut ResultSet,
    ) -> QueryReport {
        let mut report = QueryReport {
            query: query.to_string(),
            pages_fetched: 0,
            new_results: 0,
            stop: QueryStop::Completed,
        };

        let mut usage_failed = false;

        for page in 0..pages {
            if !bypass_quota {
                match tracker.admit() {
                    Ok(Admission::Granted) => {}
                    Ok(Admission::Exhausted { used, limit, .. }) => {
                        debug!("Quota exhausted ({}/{}), skipping rest of '{}'", used, limit, query);
                        report.stop = QueryStop::QuotaExhausted;
                        break;
                    }
                    Err(e) => {
                        error!("Failed to update usage file: {}", e);
                        usage_failed = true;
                        break;
                    }
                }
            }

            if let Some(ref pacer) = self.pacer {
                pacer.until_ready().await;
            }

            let params = RequestParams::page(query, page, self.page_size);
            let engine_request = match self.engine.request(&params) {
                Ok(req) => req,
                Err(e) => {
                    error!("Failed to build request for '{}': {}", query, e);
                    report.stop = QueryStop::TransportError;
                    break;
                }
            };

            let response = match self.client.execute(engine_request).await {
                Ok(response) => response,
                Err(e) => {
                    error!("Network error on '{}' (start={}): {}", query, params.start, e);
                    report.stop = QueryStop::TransportError;
                    break;
                }
            };

            if response.is_success() {
                report.pages_fetched += 1;
                if !bypass_quota {
                    match tracker.record_call() {
                        Ok(used) => info!("API usage: {}/{}", used, tracker.limit()),
                        Err(e) => {
                            error!("Failed to record API call for '{}': {}", query, e);
                            usage_failed = true;
                        }
                    }
                }
            }

            let page_results = match self.engine.response(response) {
                Ok(page_results) => page_results,
                Err(e) => {
                    error!("Request failed on '{}' (start={}): {}", query, params.start, e);
                    report.stop = QueryStop::TransportError;
                    break;
                }
            };

            if page_results.is_empty() {
                debug!("No more results for '{}' at start={}", query, params.start);
                report.stop = QueryStop::EndOfResults;
                break;
            }

            report.new_results += results.extend_links(page_results.links());
            if usage_failed {
                break;
            }
        }

        if usage_failed {
            report.stop = QueryStop::UsageUnavailable;
        }
        report
    }
}
