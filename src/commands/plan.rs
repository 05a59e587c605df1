use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use showsync_core::{Controller, ReconcilePolicy, Snapshot, plan_pass};

use crate::render::{PlanRender, Render};

pub fn run(
    current: &Path,
    desired: &Path,
    policy: &ReconcilePolicy,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let current = Snapshot::load(current)?
        .into_event_set(true)
        .with_context(|| format!("Current snapshot {} is invalid", current.display()))?;
    let desired = Snapshot::load(desired)?
        .into_event_set(true)
        .with_context(|| format!("Desired snapshot {} is invalid", desired.display()))?;

    // A fatal error leaves nothing on stdout, so nothing can be applied.
    let plan = plan_pass(&current, &desired, policy)?;

    if json {
        println!("{}", plan.to_json()?);
        return Ok(());
    }

    for (i, target) in Controller::ALL.into_iter().enumerate() {
        println!("{}", target.render());
        println!("{}", plan.render_for(target, verbose));
        if i < Controller::ALL.len() - 1 {
            println!();
        }
    }

    if !plan.skipped.is_empty() {
        println!();
        println!("{}", "Skipped".bold());
        for skipped in &plan.skipped {
            println!("   {}", skipped.render());
        }
    }

    Ok(())
}
