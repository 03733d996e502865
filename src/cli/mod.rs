//! Command-line interface for utmb-enricher.
//!
//! Parses flags, resolves configuration and runs the enrichment pipeline.

mod commands;

pub use commands::{Cli, run_command};
