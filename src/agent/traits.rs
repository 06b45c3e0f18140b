//! Agent trait definition.
//!
//! Both agents (analyst, reporter) implement this trait, which provides
//! a uniform interface for the research pipeline.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse, assistant_prefill, system_message, user_message};
use super::provider::LlmProvider;
use crate::error::ResearchError;

/// Response from an agent execution.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The agent's text output. When the agent declares a response
    /// prefill, the prefill is prepended so downstream parsing sees the
    /// full tagged text.
    pub content: String,
    /// Token usage for this call.
    pub usage: super::message::TokenUsage,
    /// Why the model stopped generating (e.g. `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
}

/// Trait implemented by the agents in the system.
///
/// Agents encapsulate a specific role (per-query analysis, report
/// synthesis) with a fixed system prompt and model configuration. The
/// pipeline calls [`Agent::execute`] to run the agent against a provider.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name for logging and identification.
    fn name(&self) -> &'static str;

    /// Model identifier to use for this agent.
    fn model(&self) -> &str;

    /// System prompt that defines the agent's role and behavior.
    fn system_prompt(&self) -> &str;

    /// Sampling temperature (0.0 = deterministic, higher = more creative).
    fn temperature(&self) -> f32 {
        0.0
    }

    /// Maximum tokens for the response.
    fn max_tokens(&self) -> u32 {
        2048
    }

    /// Text to prefill the assistant turn with.
    ///
    /// Both reasoning roles open the response with `<think>` so the model
    /// continues inside the thinking block; the prefill is prepended to
    /// the returned content.
    fn response_prefill(&self) -> Option<&str> {
        None
    }

    /// Executes the agent with the given user message.
    ///
    /// Builds a [`ChatRequest`] from the agent's configuration and
    /// delegates to the provider.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError`] on API failures.
    async fn execute(
        &self,
        provider: &dyn LlmProvider,
        user_msg: &str,
    ) -> Result<AgentResponse, ResearchError> {
        let mut messages = vec![system_message(self.system_prompt()), user_message(user_msg)];
        if let Some(prefill) = self.response_prefill() {
            messages.push(assistant_prefill(prefill));
        }

        let request = ChatRequest {
            model: self.model().to_string(),
            messages,
            temperature: Some(self.temperature()),
            max_tokens: Some(self.max_tokens()),
        };

        let response: ChatResponse = provider.chat(&request).await?;

        let content = self.response_prefill().map_or_else(
            || response.content.clone(),
            |prefill| format!("{prefill}{}", response.content),
        );

        Ok(AgentResponse {
            content,
            usage: response.usage,
            finish_reason: response.finish_reason,
        })
    }
}
