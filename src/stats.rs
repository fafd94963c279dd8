//! The `stats` command: local-only corpus summary.
//!
//! Scans and chunks the document folder without calling any provider,
//! so it works with no API key configured. Useful for checking what a
//! knowledge-base build would index.

use anyhow::Result;

use crate::config::Config;
use crate::embedding::MAX_BATCH_ITEMS;
use crate::kb;

pub fn run_stats(config: &Config) -> Result<()> {
    let stats = kb::corpus_stats(&config.data.folder, config.chunking.chunk_size)?;

    println!("stats {}", config.data.folder.display());
    println!("  documents: {}", stats.documents);
    println!("  chunks: {}", stats.chunks);

    if stats.chunks == 0 {
        println!("  no knowledge base");
        return Ok(());
    }

    let batches = stats.chunks.div_ceil(MAX_BATCH_ITEMS);
    println!("  embedding batches: {}", batches);
    println!("ok");

    Ok(())
}
