//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

// Allow certain patterns that improve readability in CLI output formatting
#![allow(clippy::uninlined_format_args)]

use std::io::{self, Write as IoWrite};
use std::sync::Arc;

use anyhow::{Context, bail};

use crate::agent::create_provider;
use crate::cli::parser::{Cli, Commands};
use crate::research::{
    ProgressObserver, QueryItem, Research, ResearchConfig, ResearchOrchestrator,
};
use crate::search::TavilyClient;

/// Executes the parsed CLI command.
///
/// # Errors
///
/// Returns an error on invalid arguments, missing credentials, or a
/// terminal session failure (report synthesis).
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run {
            name,
            queries,
            goals,
            questions,
            depth,
            concurrency,
            progress,
        } => {
            run_research(name, queries, goals, questions, depth, concurrency, progress).await
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_research(
    name: String,
    queries: Vec<String>,
    goals: Vec<String>,
    questions: Vec<String>,
    depth: usize,
    concurrency: usize,
    progress: bool,
) -> anyhow::Result<()> {
    if queries.len() != goals.len() {
        bail!(
            "each --query needs a matching --goal ({} queries, {} goals)",
            queries.len(),
            goals.len()
        );
    }

    let config = ResearchConfig::builder()
        .from_env()
        .max_depth(depth)
        .concurrency(concurrency)
        .build()
        .context("building research configuration")?;

    let tavily_key =
        std::env::var("TAVILY_API_KEY").context("TAVILY_API_KEY is not set")?;
    let search = Arc::new(TavilyClient::new(tavily_key)?);
    let provider = create_provider(&config)?;
    let orchestrator = ResearchOrchestrator::new(search, provider, config)?;

    let seeds: Vec<QueryItem> = queries
        .into_iter()
        .zip(goals)
        .map(|(query, goal)| QueryItem::new(query, goal))
        .collect();
    let mut research = Research::new(session_id(&name), name, seeds, questions);

    let observer: Option<ProgressObserver> = progress.then(|| {
        Box::new(|snapshot: &crate::research::ResearchProgress| {
            let mut stderr = io::stderr().lock();
            let _ = writeln!(
                stderr,
                "[depth {}/{}] {}/{} queries{}",
                snapshot.current_depth,
                snapshot.total_depth,
                snapshot.completed_queries,
                snapshot.total_queries,
                snapshot
                    .current_query
                    .as_deref()
                    .map(|q| format!(" — {}", q))
                    .unwrap_or_default(),
            );
        }) as ProgressObserver
    });

    let outcome = orchestrator.run(&mut research, observer).await?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", outcome.report)?;
    writeln!(stdout)?;
    writeln!(
        stdout,
        "---\n{} learnings from {} queries ({} failed), {} depths, {} tokens, {:.1}s",
        outcome.learnings_count,
        outcome.queries_dispatched,
        outcome.queries_failed,
        outcome.depths_completed,
        outcome.total_tokens,
        outcome.elapsed.as_secs_f64(),
    )?;

    Ok(())
}

/// Derives a stable session id from the name.
fn session_id(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    format!("research-{}", slug.trim_matches('-'))
}
