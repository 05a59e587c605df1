//! Diff / reconciliation engine.
//!
//! Compares a current and a desired event set by identity and produces an
//! ordered list of create/update/delete actions.

mod action;
mod action_kind;
mod decision;
mod engine;
mod plan;

pub use action::{ActionReason, Diagnostic, ReconciliationAction, Side, SkipReason, SkippedAction};
pub use action_kind::ActionKind;
pub use decision::{Decision, decide};
pub use engine::reconcile;
pub use plan::{ActionCounts, Plan};
