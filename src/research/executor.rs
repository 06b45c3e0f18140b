//! Per-item query execution.
//!
//! One [`QueryExecutor::execute`] call carries a single frontier item
//! end-to-end: search, retried reasoning, structured-output parsing, and
//! learning/follow-up extraction. The executor returns its own
//! contribution; it never writes to shared session state; the
//! orchestrator merges contributions after the depth's join.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::config::ResearchConfig;
use super::parser::parse_analysis;
use super::retry::RetryPolicy;
use super::state::{QueryItem, Research};
use crate::agent::prompt::build_analysis_prompt;
use crate::agent::traits::Agent;
use crate::agent::{AnalystAgent, LlmProvider, TokenUsage};
use crate::error::ResearchError;
use crate::search::{SearchOptions, SearchProvider};

/// Position of an item's depth within the session's bound.
#[derive(Debug, Clone, Copy)]
pub struct DepthInfo {
    /// Depth the item executes at (1-based).
    pub current: usize,
    /// The session's depth bound.
    pub max: usize,
}

impl DepthInfo {
    /// Whether items at this depth may still expand the frontier.
    #[must_use]
    pub const fn below_ceiling(&self) -> bool {
        self.current < self.max
    }
}

/// One item's contribution to the session.
#[derive(Debug, Clone, Default)]
pub struct QueryReport {
    /// Facts extracted from this item's search results.
    pub learnings: Vec<String>,
    /// Successor items for the next depth. Empty when the item executed
    /// at the depth ceiling.
    pub follow_ups: Vec<QueryItem>,
    /// Token usage of the successful reasoning call.
    pub usage: TokenUsage,
}

/// Executes one query item end-to-end.
pub struct QueryExecutor {
    search: Arc<dyn SearchProvider>,
    provider: Arc<dyn LlmProvider>,
    analyst: AnalystAgent,
    retry: RetryPolicy,
    reasoning_timeout: Duration,
    search_options: SearchOptions,
}

impl QueryExecutor {
    /// Creates an executor from the session's collaborators and config.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::Config`] if the retry bound is zero.
    pub fn new(
        search: Arc<dyn SearchProvider>,
        provider: Arc<dyn LlmProvider>,
        config: &ResearchConfig,
    ) -> Result<Self, ResearchError> {
        Ok(Self {
            search,
            provider,
            analyst: AnalystAgent::new(config),
            retry: RetryPolicy::new(config.max_attempts)?,
            reasoning_timeout: config.reasoning_timeout,
            search_options: SearchOptions {
                max_results: config.search_max_results,
                depth: config.search_depth,
            },
        })
    }

    /// Runs the item's pipeline: search, then the retried reasoning and
    /// parse block.
    ///
    /// The search call is NOT covered by the retry policy: a search
    /// failure fails the item immediately. Timeouts and parse failures
    /// inside the reasoning block each count as one failed attempt.
    ///
    /// # Errors
    ///
    /// Any error here marks this item failed; the orchestrator contains
    /// it at the item boundary and the batch continues.
    pub async fn execute(
        &self,
        item: &QueryItem,
        research: &Research,
        depth: DepthInfo,
    ) -> Result<QueryReport, ResearchError> {
        let results = self.search.search(&item.query, &self.search_options).await?;
        debug!(
            query = item.query,
            result_count = results.len(),
            depth = depth.current,
            "search step complete"
        );

        let timeout_secs = self.reasoning_timeout.as_secs();
        let (output, usage) = self
            .retry
            .attempt("analysis", || {
                let prompt = build_analysis_prompt(research, &item.goal, &item.query, &results);
                async move {
                    let response = tokio::time::timeout(
                        self.reasoning_timeout,
                        self.analyst.execute(&*self.provider, &prompt),
                    )
                    .await
                    .map_err(|_| ResearchError::Timeout {
                        seconds: timeout_secs,
                    })??;

                    let parsed = parse_analysis(&response.content)?;
                    Ok((parsed, response.usage))
                }
            })
            .await?;

        let learnings: Vec<String> = output.learnings.into_iter().map(|l| l.content).collect();
        let follow_ups = if depth.below_ceiling() {
            output.follow_up_queries
        } else {
            Vec::new()
        };

        debug!(
            query = item.query,
            learnings = learnings.len(),
            follow_ups = follow_ups.len(),
            "query item complete"
        );

        Ok(QueryReport {
            learnings,
            follow_ups,
            usage,
        })
    }
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("search", &self.search.name())
            .field("provider", &self.provider.name())
            .field("retry", &self.retry)
            .field("reasoning_timeout", &self.reasoning_timeout)
            .finish()
    }
}
