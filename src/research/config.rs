//! Research configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::time::Duration;

use crate::error::ResearchError;
use crate::search::SearchDepth;

/// Default depth bound for a session.
const DEFAULT_MAX_DEPTH: usize = 2;
/// Default concurrency limit (fully serial).
const DEFAULT_CONCURRENCY: usize = 1;
/// Default reasoning attempts per query item.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default per-call reasoning deadline in seconds.
const DEFAULT_REASONING_TIMEOUT_SECS: u64 = 60;
/// Default result cap per search call.
const DEFAULT_SEARCH_MAX_RESULTS: usize = 5;
/// Default analyst max tokens. Set high enough for a full thinking block
/// plus the tagged JSON output.
const DEFAULT_ANALYST_MAX_TOKENS: u32 = 4096;
/// Default reporter max tokens.
const DEFAULT_REPORTER_MAX_TOKENS: u32 = 8192;

/// Configuration for a research session.
#[derive(Debug, Clone)]
pub struct ResearchConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the LLM provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model for the analyst (per-query reasoning) agent.
    pub analyst_model: String,
    /// Model for the reporter (final synthesis) agent.
    pub reporter_model: String,
    /// Maximum tokens for analyst responses.
    pub analyst_max_tokens: u32,
    /// Maximum tokens for reporter responses.
    pub reporter_max_tokens: u32,
    /// Depth bound for the session. Must be at least 1.
    pub max_depth: usize,
    /// Maximum query items simultaneously in flight. Must be at least 1.
    pub concurrency: usize,
    /// Reasoning attempts per query item (retry bound). Must be at least 1.
    pub max_attempts: u32,
    /// Per-call deadline for reasoning calls.
    pub reasoning_timeout: Duration,
    /// Result cap requested from the search provider per query.
    pub search_max_results: usize,
    /// Retrieval depth requested from the search provider.
    pub search_depth: SearchDepth,
}

impl ResearchConfig {
    /// Creates a new builder for `ResearchConfig`.
    #[must_use]
    pub fn builder() -> ResearchConfigBuilder {
        ResearchConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, ResearchError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`ResearchConfig`].
#[derive(Debug, Clone, Default)]
pub struct ResearchConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    analyst_model: Option<String>,
    reporter_model: Option<String>,
    analyst_max_tokens: Option<u32>,
    reporter_max_tokens: Option<u32>,
    max_depth: Option<usize>,
    concurrency: Option<usize>,
    max_attempts: Option<u32>,
    reasoning_timeout: Option<Duration>,
    search_max_results: Option<usize>,
    search_depth: Option<SearchDepth>,
}

impl ResearchConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("FATHOM_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY")
                .or_else(|_| std::env::var("FATHOM_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL")
                .or_else(|_| std::env::var("FATHOM_BASE_URL"))
                .ok();
        }
        if self.analyst_model.is_none() {
            self.analyst_model = std::env::var("FATHOM_ANALYST_MODEL").ok();
        }
        if self.reporter_model.is_none() {
            self.reporter_model = std::env::var("FATHOM_REPORTER_MODEL").ok();
        }
        if self.max_depth.is_none() {
            self.max_depth = std::env::var("FATHOM_MAX_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.concurrency.is_none() {
            self.concurrency = std::env::var("FATHOM_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.max_attempts.is_none() {
            self.max_attempts = std::env::var("FATHOM_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the analyst model.
    #[must_use]
    pub fn analyst_model(mut self, model: impl Into<String>) -> Self {
        self.analyst_model = Some(model.into());
        self
    }

    /// Sets the reporter model.
    #[must_use]
    pub fn reporter_model(mut self, model: impl Into<String>) -> Self {
        self.reporter_model = Some(model.into());
        self
    }

    /// Sets the analyst max tokens.
    #[must_use]
    pub const fn analyst_max_tokens(mut self, n: u32) -> Self {
        self.analyst_max_tokens = Some(n);
        self
    }

    /// Sets the reporter max tokens.
    #[must_use]
    pub const fn reporter_max_tokens(mut self, n: u32) -> Self {
        self.reporter_max_tokens = Some(n);
        self
    }

    /// Sets the depth bound.
    #[must_use]
    pub const fn max_depth(mut self, n: usize) -> Self {
        self.max_depth = Some(n);
        self
    }

    /// Sets the concurrency limit.
    #[must_use]
    pub const fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = Some(n);
        self
    }

    /// Sets the reasoning attempt bound.
    #[must_use]
    pub const fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = Some(n);
        self
    }

    /// Sets the per-call reasoning deadline.
    #[must_use]
    pub const fn reasoning_timeout(mut self, duration: Duration) -> Self {
        self.reasoning_timeout = Some(duration);
        self
    }

    /// Sets the search result cap.
    #[must_use]
    pub const fn search_max_results(mut self, n: usize) -> Self {
        self.search_max_results = Some(n);
        self
    }

    /// Sets the search retrieval depth.
    #[must_use]
    pub const fn search_depth(mut self, depth: SearchDepth) -> Self {
        self.search_depth = Some(depth);
        self
    }

    /// Builds the [`ResearchConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::ApiKeyMissing`] if no API key was set, or
    /// [`ResearchError::Config`] if a bound is zero (`max_depth`,
    /// `concurrency`, `max_attempts`, `reasoning_timeout`).
    pub fn build(self) -> Result<ResearchConfig, ResearchError> {
        let api_key = self.api_key.ok_or(ResearchError::ApiKeyMissing)?;

        let config = ResearchConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key,
            base_url: self.base_url,
            analyst_model: self
                .analyst_model
                .unwrap_or_else(|| "gpt-5-mini-2025-08-07".to_string()),
            reporter_model: self
                .reporter_model
                .unwrap_or_else(|| "gpt-5.2-2025-12-11".to_string()),
            analyst_max_tokens: self.analyst_max_tokens.unwrap_or(DEFAULT_ANALYST_MAX_TOKENS),
            reporter_max_tokens: self
                .reporter_max_tokens
                .unwrap_or(DEFAULT_REPORTER_MAX_TOKENS),
            max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
            concurrency: self.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
            max_attempts: self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            reasoning_timeout: self
                .reasoning_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_REASONING_TIMEOUT_SECS)),
            search_max_results: self.search_max_results.unwrap_or(DEFAULT_SEARCH_MAX_RESULTS),
            search_depth: self.search_depth.unwrap_or(SearchDepth::Advanced),
        };

        if config.max_depth == 0 {
            return Err(ResearchError::Config {
                message: "max_depth must be at least 1".to_string(),
            });
        }
        if config.concurrency == 0 {
            return Err(ResearchError::Config {
                message: "concurrency must be at least 1".to_string(),
            });
        }
        if config.max_attempts == 0 {
            return Err(ResearchError::Config {
                message: "max_attempts must be at least 1".to_string(),
            });
        }
        if config.reasoning_timeout.is_zero() {
            return Err(ResearchError::Config {
                message: "reasoning_timeout must be non-zero".to_string(),
            });
        }

        Ok(config)
    }
}
