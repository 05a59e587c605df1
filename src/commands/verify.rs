use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use showsync_core::Snapshot;

pub fn run(file: &Path) -> Result<()> {
    let set = match Snapshot::load(file)?.into_event_set(true) {
        Ok(set) => set,
        Err(e) => {
            println!("{} {}", "✗".red(), e.to_string().red());
            anyhow::bail!("{} failed verification", file.display());
        }
    };

    println!(
        "{} {} events verified in {}",
        "✓".green(),
        set.len(),
        file.display()
    );
    Ok(())
}
