//! Start-list enrichment command.

use tokio::runtime::Runtime;

use crate::config::Config;
use crate::pipeline::{self, Pipeline};

/// Enrich the configured roster and write every export
pub fn cmd_enrich(rt: &Runtime, config: Config, show_progress: bool) -> anyhow::Result<()> {
    let data_dir = config.paths.data_dir.clone();
    let mut pipeline = Pipeline::from_config(config)?;
    if show_progress {
        pipeline = pipeline.with_progress(pipeline::progress_bar(0));
    }

    let summary = rt.block_on(pipeline.run())?;

    println!(
        "✓ Enriched {} participants across {} races in {}s",
        summary.participants,
        summary.races,
        summary.elapsed().num_seconds()
    );
    println!("  Matched:       {}", summary.matched);
    println!("  Unmatched:     {}", summary.participants - summary.matched);
    println!("  Files written: {} (in {:?})", summary.files_written, data_dir);
    Ok(())
}
