//! Analyst agent for per-query reasoning.
//!
//! Reads one query's raw search results against the research context and
//! emits a tagged `<output>` block with learnings and follow-up queries.
//! The query executor parses that block and retries this agent on parse
//! failures.

use async_trait::async_trait;

use super::traits::Agent;
use crate::research::config::ResearchConfig;

/// Thinking-block prefill shared by both reasoning roles.
pub const THINK_PREFILL: &str = "<think>";

/// Agent that analyzes one query's search results.
///
/// Each frontier item gets its own analyst invocation; the orchestrator
/// fans out many of these concurrently under the limiter.
pub struct AnalystAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl AnalystAgent {
    /// Creates a new analyst agent from the research configuration.
    #[must_use]
    pub fn new(config: &ResearchConfig) -> Self {
        Self {
            model: config.analyst_model.clone(),
            max_tokens: config.analyst_max_tokens,
            system_prompt: super::prompt::ANALYST_SYSTEM_PROMPT.to_string(),
        }
    }
}

#[async_trait]
impl Agent for AnalystAgent {
    fn name(&self) -> &'static str {
        "analyst"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn temperature(&self) -> f32 {
        0.0
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn response_prefill(&self) -> Option<&str> {
        Some(THINK_PREFILL)
    }
}
