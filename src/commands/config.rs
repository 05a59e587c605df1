use anyhow::Result;
use owo_colors::OwoColorize;
use showsync_core::ReconcilePolicy;

pub fn run(init: bool) -> Result<()> {
    let config_path = ReconcilePolicy::config_path()?;

    if init {
        if config_path.exists() {
            anyhow::bail!("Config already exists at {}", config_path.display());
        }
        ReconcilePolicy::create_default_config(&config_path)?;
        println!("Created {}", config_path.display());
        return Ok(());
    }

    let policy = ReconcilePolicy::load_default()?;

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    if !config_path.exists() {
        println!("  {}", "(not found, using defaults)".dimmed());
    }
    println!();
    println!("{}", "Policy".bold());
    for line in policy.to_toml()?.lines() {
        println!("  {line}");
    }

    Ok(())
}
