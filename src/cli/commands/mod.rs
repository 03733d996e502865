//! CLI argument definitions and dispatch.
//!
//! Flags override the matching configuration keys:
//! - `--data-dir` → `paths.data_dir`
//! - `--concurrency` → `enrichment.max_concurrent_requests`
//! - `--search-url` → `enrichment.search_url`

mod enrich;

use clap::Parser;
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{self, Config};

pub use enrich::cmd_enrich;

/// Enrich a race start list with UTMB runner profiles
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the roster and alias tables; exports are written here
    #[arg(short, long, env = "UTMB_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file (default: <config dir>/utmb-enricher/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum lookups in flight per batch
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Runner search endpoint
    #[arg(long, env = "UTMB_SEARCH_URL")]
    pub search_url: Option<String>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    /// Load the configuration and apply flag overrides.
    pub fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = config::load(self.config.as_deref())?;
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.data_dir {
            config.paths.data_dir = dir.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.enrichment.max_concurrent_requests = concurrency;
        }
        if let Some(url) = &self.search_url {
            config.enrichment.search_url = url.clone();
        }
    }
}

/// Run the enrichment with the parsed arguments.
///
/// One runtime is built here and shared by every batch of the run.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.resolve_config()?;
    let rt = Runtime::new()?;
    cmd_enrich(&rt, config, !cli.no_progress)
}
