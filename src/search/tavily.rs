//! Tavily search provider implementation.
//!
//! Calls the Tavily REST API (`POST /search`) over `reqwest` with a JSON
//! body. Compatible with any endpoint that follows the same request and
//! response shape via the base URL override.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SearchDepth, SearchOptions, SearchProvider, SearchRecord};
use crate::error::ResearchError;

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Request body for the Tavily `/search` endpoint.
#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: SearchDepth,
    max_results: usize,
}

/// Response body from the Tavily `/search` endpoint.
#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchRecord>,
}

/// Tavily-backed [`SearchProvider`].
pub struct TavilyClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TavilyClient {
    /// Creates a new client for the public Tavily endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::Config`] if the HTTP client cannot be
    /// constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ResearchError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Creates a new client against a custom base URL (proxies, tests).
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::Config`] if the HTTP client cannot be
    /// constructed.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ResearchError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ResearchError::Config {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl std::fmt::Debug for TavilyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    fn name(&self) -> &'static str {
        "tavily"
    }

    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchRecord>, ResearchError> {
        let body = TavilyRequest {
            api_key: &self.api_key,
            query,
            search_depth: options.depth,
            max_results: options.max_results,
        };

        let response = self
            .http
            .post(format!("{}/search", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ResearchError::Search {
                message: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResearchError::Search {
                message: format!("provider returned HTTP {status}"),
            });
        }

        let parsed: TavilyResponse =
            response.json().await.map_err(|e| ResearchError::Search {
                message: format!("malformed response body: {e}"),
            })?;

        debug!(
            query,
            result_count = parsed.results.len(),
            "search completed"
        );

        Ok(parsed.results)
    }
}
