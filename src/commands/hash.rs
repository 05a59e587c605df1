use std::path::Path;

use anyhow::{Context, Result};
use showsync_core::DraftSnapshot;
use tracing::info;

/// Stamp a draft snapshot and print the result for use with `plan`.
pub fn run(file: &Path) -> Result<()> {
    let snapshot = DraftSnapshot::load(file)?
        .stamp()
        .with_context(|| format!("Failed to stamp {}", file.display()))?;

    info!(
        scheduler = snapshot.scheduler.len(),
        calendar = snapshot.calendar.len(),
        "stamped snapshot"
    );
    println!("{}", snapshot.to_json_pretty()?);
    Ok(())
}
