//! UTMB Enricher - matches a race start list against the UTMB runner database.
//!
//! Reads a roster, normalizes every participant, looks each one up on the
//! UTMB runner search and writes sorted per-race and aggregate CSV/JSON
//! exports.

pub mod cli;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod roster;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging on stderr, stdout carries the run summary
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("utmb_enricher=info".parse()?))
        .init();

    cli::run_command(&args)
}
