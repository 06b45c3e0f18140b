//! Web search collaborator layer.
//!
//! Defines the provider-agnostic [`SearchProvider`] trait the query
//! executor dispatches to, plus the Tavily-backed implementation.

pub mod tavily;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ResearchError;

pub use tavily::TavilyClient;

/// Search depth requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    /// Fast, shallow retrieval.
    Basic,
    /// Slower retrieval with fuller page content.
    Advanced,
}

/// Options for a single search call.
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// Maximum number of results to return.
    pub max_results: usize,
    /// Retrieval depth.
    pub depth: SearchDepth,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 5,
            depth: SearchDepth::Advanced,
        }
    }
}

/// A single search result record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRecord {
    /// Result title.
    #[serde(default)]
    pub title: String,
    /// Result URL.
    #[serde(default)]
    pub url: String,
    /// Extracted page content or snippet.
    #[serde(default)]
    pub content: String,
    /// Provider relevance score, when available.
    #[serde(default)]
    pub score: Option<f64>,
}

/// Trait for web search backends.
///
/// Implementations handle the transport layer for a specific search API
/// while presenting a uniform interface to the query executor.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name (e.g., `"tavily"`).
    fn name(&self) -> &'static str;

    /// Executes one search and returns the ordered result records.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::Search`] on provider failure or timeout.
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchRecord>, ResearchError>;
}
