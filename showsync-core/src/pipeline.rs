//! One read-to-plan pass.

use tracing::info;

use crate::config::ReconcilePolicy;
use crate::diff::{Plan, reconcile};
use crate::error::SyncResult;
use crate::manifest::EventSet;
use crate::shadow::resolve_overrides;

/// Diff `current` against `desired`, then rewrite calendar writes so
/// recurring bases do not double-book with their overrides.
///
/// Callers must not run two passes against the same manifest and target pair
/// concurrently; the plan assumes nothing changes until it is applied.
pub fn plan_pass(
    current: &EventSet,
    desired: &EventSet,
    policy: &ReconcilePolicy,
) -> SyncResult<Plan> {
    let Plan { actions, skipped } = reconcile(current, desired, policy)?;

    let actions = resolve_overrides(actions, policy);
    let diagnostics: usize = actions.iter().map(|a| a.diagnostics.len()).sum();
    if diagnostics > 0 {
        info!(diagnostics, "override resolution reported diagnostics");
    }

    Ok(Plan { actions, skipped })
}
