//! Engine traits and types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One item returned by a search API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    /// Result URL, when the API provided one
    #[serde(default)]
    pub link: Option<String>,
    /// Result title
    #[serde(default)]
    pub title: Option<String>,
}

/// Result of a single page request
#[derive(Debug, Clone, Default)]
pub struct EngineResults {
    /// Items on this page
    pub items: Vec<ResultItem>,
}

impl EngineResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<ResultItem>) -> Self {
        Self { items }
    }

    /// An empty page marks the end of the results for a query
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Links of all items that carry one
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| item.link.as_deref())
    }
}

/// Parameters for building a page request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParams {
    /// Search query string
    pub query: String,
    /// 1-based index of the first result on the page
    pub start: u32,
    /// Number of results requested
    pub num: u32,
}

impl RequestParams {
    /// Parameters for the zero-based page `page` of `page_size` results
    pub fn page(query: impl Into<String>, page: u32, page_size: u32) -> Self {
        Self {
            query: query.into(),
            start: page * page_size + 1,
            num: page_size,
        }
    }
}

/// HTTP GET request to be made for an engine
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// URL to request
    pub url: String,
    /// Request headers
    pub headers: BTreeMap<String, String>,
    /// Query parameters
    pub params: BTreeMap<String, String>,
}

impl EngineRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            params: BTreeMap::new(),
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// HTTP response from engine request
#[derive(Debug)]
pub struct EngineResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
}

impl EngineResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> anyhow::Result<T> {
        Ok(serde_json::from_str(&self.text)?)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if response indicates rate limiting
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// A paginated search API
pub trait Engine: Send + Sync {
    /// Engine name
    fn name(&self) -> &str;

    /// Largest page the API will return
    fn results_per_page(&self) -> u32 {
        10
    }

    /// Build the HTTP request for one page
    fn request(&self, params: &RequestParams) -> anyhow::Result<EngineRequest>;

    /// Parse a successful HTTP response into results
    fn response(&self, response: EngineResponse) -> anyhow::Result<EngineResults>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offsets() {
        assert_eq!(RequestParams::page("q", 0, 10).start, 1);
        assert_eq!(RequestParams::page("q", 1, 10).start, 11);
        assert_eq!(RequestParams::page("q", 9, 10).start, 91);
    }

    #[test]
    fn test_links_skip_items_without_link() {
        let results = EngineResults::with_items(vec![
            ResultItem {
                link: Some("https://a.com/".to_string()),
                title: None,
            },
            ResultItem::default(),
        ]);

        assert_eq!(results.links().collect::<Vec<_>>(), vec!["https://a.com/"]);
        assert!(!results.is_empty());
        assert!(EngineResults::new().is_empty());
    }
}
