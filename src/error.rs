//! Error types for the research engine.
//!
//! The taxonomy mirrors the failure boundaries of the pipeline: per-item
//! errors (search, parse, timeout, transport) are contained at the item
//! that raised them, while [`ResearchError::Synthesis`] is the only error
//! that terminates a whole session.

use thiserror::Error;

/// Errors produced by the research engine and its collaborators.
#[derive(Debug, Error)]
pub enum ResearchError {
    /// The search provider failed or timed out.
    ///
    /// Search failures are never retried; the owning query item is marked
    /// failed and the rest of the batch continues.
    #[error("Search failed: {message}")]
    Search {
        /// Description of the provider failure.
        message: String,
    },

    /// The reasoning response lacked the expected structured segment or
    /// the segment was malformed. Retried up to the configured attempt
    /// limit before the item is marked failed.
    #[error("Response parse failed: {message}")]
    ResponseParse {
        /// Description of the parse failure.
        message: String,
        /// The raw response content that failed to parse.
        content: String,
    },

    /// A reasoning call exceeded its per-call deadline. Counted as a
    /// failed attempt inside the retry block.
    #[error("Reasoning call timed out after {seconds}s")]
    Timeout {
        /// The deadline that was exceeded, in seconds.
        seconds: u64,
    },

    /// The LLM provider returned a transport or API error.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Error detail from the provider.
        message: String,
        /// HTTP status code, when one was received.
        status: Option<u16>,
    },

    /// The final report call failed or its output lacked the
    /// reasoning-complete marker. This is the only terminal error: it
    /// propagates out of the whole session.
    #[error("Report synthesis failed: {message}")]
    Synthesis {
        /// Description of the synthesis failure.
        message: String,
    },

    /// Internal engine failure (task join, closed semaphore).
    #[error("Orchestration error: {message}")]
    Orchestration {
        /// Description of the failure.
        message: String,
    },

    /// Invalid configuration (zero depth, zero retry attempts, zero
    /// concurrency). Surfaced before a session starts.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Description of the invalid setting.
        message: String,
    },

    /// No API key was provided for the LLM provider.
    #[error("No API key found. Set OPENAI_API_KEY or FATHOM_API_KEY")]
    ApiKeyMissing,

    /// The configured provider name is not supported.
    #[error("Unsupported provider: {name}")]
    UnsupportedProvider {
        /// The unrecognized provider name.
        name: String,
    },
}

/// Convenience alias for results in this crate.
pub type Result<T> = std::result::Result<T, ResearchError>;
