//! CLI layer for fathom-rs.
//!
//! Provides the command-line interface using clap, with a `run` command
//! that seeds a research session from flags and prints the final report.

pub mod commands;
pub mod parser;

pub use commands::execute;
pub use parser::{Cli, Commands};
