//! # fathom-rs
//!
//! An iterative, depth-bounded research orchestrator. Given a seed set
//! of query/goal pairs, fathom repeatedly dispatches each pending query
//! to a web search step and an LLM reasoning step under bounded
//! concurrency, accumulates the discovered learnings, harvests follow-up
//! queries to expand the next depth level, and terminates by depth bound
//! or frontier exhaustion with a single synthesized report.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use fathom_rs::agent::create_provider;
//! use fathom_rs::research::{QueryItem, Research, ResearchConfig, ResearchOrchestrator};
//! use fathom_rs::search::TavilyClient;
//!
//! # async fn example() -> Result<(), fathom_rs::error::ResearchError> {
//! let config = ResearchConfig::from_env()?;
//! let search = Arc::new(TavilyClient::new("tavily-key")?);
//! let provider = create_provider(&config)?;
//! let orchestrator = ResearchOrchestrator::new(search, provider, config)?;
//!
//! let mut research = Research::new(
//!     "rt-1",
//!     "async runtimes",
//!     vec![QueryItem::new("tokio vs smol", "compare the major runtimes")],
//!     vec!["Which runtime fits embedded targets?".to_string()],
//! );
//! let outcome = orchestrator.run(&mut research, None).await?;
//! # let _ = outcome.report;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod error;
pub mod research;
pub mod search;

pub use error::{ResearchError, Result};
pub use research::{
    Research, ResearchConfig, ResearchOrchestrator, ResearchOutcome, ResearchProgress,
};
