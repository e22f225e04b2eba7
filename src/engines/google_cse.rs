//! Google Custom Search JSON API engine

use super::traits::*;
use crate::credentials::Credentials;
use anyhow::Result as AnyhowResult;
use serde::Deserialize;

/// Response body of the Custom Search JSON API. Only `items` is used;
/// its absence means there are no more results.
#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Option<Vec<ResultItem>>,
}

#[derive(Debug, Deserialize)]
struct CseErrorBody {
    error: CseError,
}

#[derive(Debug, Deserialize)]
struct CseError {
    #[serde(default)]
    message: String,
}

/// Google Programmable Search Engine, queried through the official API
pub struct GoogleCse {
    base_url: String,
    api_key: String,
    search_engine_id: String,
}

impl GoogleCse {
    pub fn new(base_url: impl Into<String>, credentials: &Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: credentials.api_key.clone(),
            search_engine_id: credentials.search_engine_id.clone(),
        }
    }

    /// Pull the human-readable message out of an API error body
    fn error_message(text: &str) -> Option<String> {
        serde_json::from_str::<CseErrorBody>(text)
            .ok()
            .map(|body| body.error.message)
            .filter(|m| !m.is_empty())
    }
}

impl Engine for GoogleCse {
    fn name(&self) -> &str {
        "google_cse"
    }

    fn request(&self, params: &RequestParams) -> AnyhowResult<EngineRequest> {
        let num = params.num.clamp(1, self.results_per_page());

        Ok(EngineRequest::get(&self.base_url)
            .header("Accept", "application/json")
            .param("q", params.query.as_str())
            .param("key", self.api_key.as_str())
            .param("cx", self.search_engine_id.as_str())
            .param("num", num.to_string())
            .param("start", params.start.to_string()))
    }

    fn response(&self, response: EngineResponse) -> AnyhowResult<EngineResults> {
        if !response.is_success() {
            let detail = Self::error_message(&response.text).unwrap_or_default();
            if response.is_rate_limited() {
                return Err(anyhow::anyhow!("HTTP error: 429 rate limited {}", detail));
            }
            return Err(anyhow::anyhow!("HTTP error: {} {}", response.status, detail));
        }

        let body: CseResponse = response.json()?;
        Ok(EngineResults::with_items(body.items.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> GoogleCse {
        GoogleCse::new(
            "https://www.googleapis.com/customsearch/v1",
            &Credentials::new("k3y", "cx1"),
        )
    }

    fn ok(text: &str) -> EngineResponse {
        EngineResponse {
            status: 200,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_request_params() {
        let request = engine()
            .request(&RequestParams::page("rust programming", 2, 10))
            .unwrap();

        assert!(request.url.contains("googleapis.com"));
        assert_eq!(request.params["q"], "rust programming");
        assert_eq!(request.params["key"], "k3y");
        assert_eq!(request.params["cx"], "cx1");
        assert_eq!(request.params["num"], "10");
        assert_eq!(request.params["start"], "21");
    }

    #[test]
    fn test_num_is_capped() {
        let params = RequestParams {
            query: "q".to_string(),
            start: 1,
            num: 50,
        };
        let request = engine().request(&params).unwrap();
        assert_eq!(request.params["num"], "10");
    }

    #[test]
    fn test_response_items() {
        let results = engine()
            .response(ok(r#"{"items": [{"link": "https://a.com/x", "title": "A"}, {"title": "no link"}]}"#))
            .unwrap();

        assert_eq!(results.items.len(), 2);
        assert_eq!(results.links().collect::<Vec<_>>(), vec!["https://a.com/x"]);
    }

    #[test]
    fn test_missing_items_is_empty_page() {
        let results = engine()
            .response(ok(r#"{"kind": "customsearch#search", "searchInformation": {"totalResults": "0"}}"#))
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_error_status_is_an_error() {
        let response = EngineResponse {
            status: 403,
            text: r#"{"error": {"code": 403, "message": "API key not valid"}}"#.to_string(),
        };

        let err = engine().response(response).unwrap_err();
        assert!(err.to_string().contains("403"));
        assert!(err.to_string().contains("API key not valid"));
    }

    #[test]
    fn test_unparseable_body_is_an_error() {
        assert!(engine().response(ok("<html>oops</html>")).is_err());
    }
}
