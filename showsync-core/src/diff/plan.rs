//! Ordered output of one reconciliation pass.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::diff::{ActionKind, ReconciliationAction, SkippedAction};
use crate::error::SyncResult;
use crate::schema::Controller;

/// Created/updated/deleted counts per target system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionCounts(pub BTreeMap<Controller, (usize, usize, usize)>);

impl ActionCounts {
    pub fn for_target(&self, target: Controller) -> (usize, usize, usize) {
        self.0.get(&target).copied().unwrap_or_default()
    }

    pub fn totals(&self) -> (usize, usize, usize) {
        self.0.values().fold((0, 0, 0), |(c, u, d), (c2, u2, d2)| {
            (c + c2, u + u2, d + d2)
        })
    }
}

/// Actions for the apply layer, plus the ones deliberately withheld.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub actions: Vec<ReconciliationAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedAction>,
}

impl Plan {
    /// No mutations to apply. Skipped actions do not count.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn counts(&self) -> ActionCounts {
        let mut counts: BTreeMap<Controller, (usize, usize, usize)> = BTreeMap::new();

        for action in &self.actions {
            let (created, updated, deleted) = counts.entry(action.target).or_default();
            match action.kind {
                ActionKind::Create => *created += 1,
                ActionKind::Update => *updated += 1,
                ActionKind::Delete => *deleted += 1,
            }
        }

        ActionCounts(counts)
    }

    /// Actions bound for one system, in execution order.
    pub fn for_target(&self, target: Controller) -> impl Iterator<Item = &ReconciliationAction> {
        self.actions.iter().filter(move |a| a.target == target)
    }

    /// Stable JSON rendering; identical inputs produce identical bytes.
    pub fn to_json(&self) -> SyncResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
