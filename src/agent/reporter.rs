//! Reporter agent for final report synthesis.
//!
//! Takes the full accumulated research record and produces the final
//! markdown report. Runs exactly once per session; its failure is the
//! only terminal error of the pipeline.

use async_trait::async_trait;

use super::analyst::THINK_PREFILL;
use super::traits::Agent;
use crate::research::config::ResearchConfig;

/// Agent that synthesizes the final research report.
pub struct ReporterAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl ReporterAgent {
    /// Creates a new reporter agent from the research configuration.
    #[must_use]
    pub fn new(config: &ResearchConfig) -> Self {
        Self {
            model: config.reporter_model.clone(),
            max_tokens: config.reporter_max_tokens,
            system_prompt: super::prompt::REPORTER_SYSTEM_PROMPT.to_string(),
        }
    }
}

#[async_trait]
impl Agent for ReporterAgent {
    fn name(&self) -> &'static str {
        "reporter"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn temperature(&self) -> f32 {
        0.1
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn response_prefill(&self) -> Option<&str> {
        Some(THINK_PREFILL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_properties() {
        let config = ResearchConfig::builder()
            .api_key("test")
            .reporter_model("gpt-5.2-2025-12-11")
            .reporter_max_tokens(8192)
            .build()
            .unwrap_or_else(|_| unreachable!());
        let agent = ReporterAgent::new(&config);
        assert_eq!(agent.name(), "reporter");
        assert_eq!(agent.model(), "gpt-5.2-2025-12-11");
        assert!((agent.temperature() - 0.1).abs() < f32::EPSILON);
        assert_eq!(agent.max_tokens(), 8192);
        assert_eq!(agent.response_prefill(), Some("<think>"));
    }
}
