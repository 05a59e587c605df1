//! Planned actions and the reasons attached to them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diff::ActionKind;
use crate::event::ManifestEvent;
use crate::hash::Digest;
use crate::schema::Controller;

/// Which input set an event version came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Current,
    Desired,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Current => Side::Desired,
            Side::Desired => Side::Current,
        }
    }
}

/// Why an action was emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ActionReason {
    /// The event is wanted but the target system has no copy.
    MissingOnTarget,
    /// The event is no longer wanted; the target holds a stale copy.
    RemovedUpstream,
    /// Sub-event state differs; `winner` supplied the surviving version.
    StateChanged { winner: Side, tie: bool },
}

impl fmt::Display for ActionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionReason::MissingOnTarget => write!(f, "missing on target"),
            ActionReason::RemovedUpstream => write!(f, "removed upstream"),
            ActionReason::StateChanged { winner, tie: false } => {
                write!(f, "changed ({winner:?} is newer)")
            }
            ActionReason::StateChanged { winner, tie: true } => {
                write!(f, "changed ({winner:?} wins tie)")
            }
        }
    }
}

/// Non-fatal findings attached to an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A sub-event overlaps the recurring base without being contained in it,
    /// so it cannot shadow any of the base's dates.
    GroupingAmbiguity { base: usize, candidate: usize },
    /// A sub-event's dates are still symbolic, so it was left out of override
    /// grouping.
    UnresolvedDates { sub_event: usize },
}

impl Diagnostic {
    /// Produced by override grouping, and recomputed on every resolution.
    pub fn is_grouping(&self) -> bool {
        matches!(
            self,
            Diagnostic::GroupingAmbiguity { .. } | Diagnostic::UnresolvedDates { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::GroupingAmbiguity { base, candidate } => write!(
                f,
                "sub-event {candidate} partially overlaps base {base}; not shadowed"
            ),
            Diagnostic::UnresolvedDates { sub_event } => {
                write!(f, "sub-event {sub_event} has unresolved dates; not grouped")
            }
        }
    }
}

/// One mutation for the apply layer to execute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationAction {
    pub kind: ActionKind,
    pub target: Controller,
    pub authority: Controller,
    pub identity_hash: Digest,
    /// The event version to write (create/update) or remove (delete).
    pub event: ManifestEvent,
    pub reason: ActionReason,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl ReconciliationAction {
    pub fn new(
        kind: ActionKind,
        target: Controller,
        event: &ManifestEvent,
        reason: ActionReason,
    ) -> Self {
        ReconciliationAction {
            kind,
            target,
            authority: event.authority,
            identity_hash: event.identity_hash,
            event: event.clone(),
            reason,
            diagnostics: Vec::new(),
        }
    }

    /// Total execution order within one pass.
    pub fn sort_key(&self) -> (Controller, ActionKind, Digest) {
        (self.target, self.kind, self.identity_hash)
    }
}

impl fmt::Display for ReconciliationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind, self.target, self.event)
    }
}

/// Why an action was withheld.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The side that would be overwritten is locked.
    Locked,
    /// The event is not managed by sync and is never deleted.
    Unmanaged,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Locked => write!(f, "locked"),
            SkipReason::Unmanaged => write!(f, "unmanaged"),
        }
    }
}

/// An action the engine would have emitted but deliberately withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedAction {
    pub kind: ActionKind,
    pub target: Controller,
    pub identity_hash: Digest,
    pub summary: String,
    pub reason: SkipReason,
}

impl SkippedAction {
    pub fn new(kind: ActionKind, target: Controller, event: &ManifestEvent, reason: SkipReason) -> Self {
        SkippedAction {
            kind,
            target,
            identity_hash: event.identity_hash,
            summary: event.to_string(),
            reason,
        }
    }

    pub fn sort_key(&self) -> (Controller, ActionKind, Digest) {
        (self.target, self.kind, self.identity_hash)
    }
}
