//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};

/// fathom-rs: iterative depth-bounded research from the command line.
///
/// Seeds a research session from query/goal pairs, expands it depth by
/// depth through web search and LLM reasoning, and prints the final
/// synthesized report.
#[derive(Parser, Debug)]
#[command(name = "fathom-rs")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a research session to completion.
    #[command(after_help = r#"Examples:
  fathom-rs run -n "async runtimes" -q "tokio vs smol" -g "compare the major runtimes"
  fathom-rs run -n "rust wasm" -q "wasm runtimes" -g "survey" -q "wasi support" -g "status" --depth 3
  fathom-rs run -n "topic" -q "q" -g "g" --concurrency 4 --progress

Environment:
  OPENAI_API_KEY / FATHOM_API_KEY    LLM provider key (required)
  TAVILY_API_KEY                     search provider key (required)
  FATHOM_ANALYST_MODEL, FATHOM_REPORTER_MODEL, FATHOM_MAX_DEPTH, ...
"#)]
    Run {
        /// Session name.
        #[arg(short, long)]
        name: String,

        /// Seed query; repeat to seed several. Paired with --goal by
        /// position.
        #[arg(short, long = "query", required = true)]
        queries: Vec<String>,

        /// Goal for the seed query at the same position.
        #[arg(short, long = "goal", required = true)]
        goals: Vec<String>,

        /// Question the research should answer; repeatable.
        #[arg(short = 'Q', long = "question")]
        questions: Vec<String>,

        /// Depth bound for frontier expansion.
        #[arg(short, long, env = "FATHOM_MAX_DEPTH", default_value = "2")]
        depth: usize,

        /// Maximum query items in flight at once.
        #[arg(short, long, env = "FATHOM_CONCURRENCY", default_value = "1")]
        concurrency: usize,

        /// Print progress updates to stderr while running.
        #[arg(short, long)]
        progress: bool,
    },
}
