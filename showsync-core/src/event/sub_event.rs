//! Materialized occurrence windows.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SyncResult;
use crate::event::timing::Timing;
use crate::hash::{Digest, state_hash};

/// Opaque execution target (playlist options, command arguments, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(pub serde_json::Value);

impl Payload {
    pub fn new(value: serde_json::Value) -> Self {
        Payload(value)
    }
}

/// What happens when the playlist or sequence reaches its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RepeatPolicy {
    #[default]
    None,
    Immediate,
    Every { minutes: u32 },
}

/// How a running item is stopped when its window closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopPolicy {
    #[default]
    Graceful,
    GracefulLoop,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Behavior {
    pub enabled: bool,
    #[serde(default)]
    pub repeat: RepeatPolicy,
    #[serde(default)]
    pub stop: StopPolicy,
}

impl Default for Behavior {
    fn default() -> Self {
        Behavior {
            enabled: true,
            repeat: RepeatPolicy::None,
            stop: StopPolicy::Graceful,
        }
    }
}

/// A sub-event as delivered by ingestion, before it is stamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubEventDraft {
    pub timing: Timing,
    #[serde(default)]
    pub payload: Payload,
    #[serde(default)]
    pub behavior: Behavior,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_order: Option<u32>,
}

impl SubEventDraft {
    pub fn new(timing: Timing) -> Self {
        SubEventDraft {
            timing,
            payload: Payload::default(),
            behavior: Behavior::default(),
            execution_order: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Payload(payload);
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_execution_order(mut self, rank: u32) -> Self {
        self.execution_order = Some(rank);
        self
    }

    /// Validate and compute the state hash.
    pub fn stamp(self) -> SyncResult<SubEvent> {
        self.timing.validate()?;
        let state_hash = state_hash(&self.timing, &self.payload, &self.behavior)?;
        Ok(SubEvent {
            timing: self.timing,
            payload: self.payload,
            behavior: self.behavior,
            execution_order: self.execution_order,
            state_hash,
            exclusions: BTreeSet::new(),
        })
    }
}

/// One occurrence window under a logical event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubEvent {
    pub timing: Timing,
    pub payload: Payload,
    pub behavior: Behavior,
    /// Explicit precedence among siblings; a lower rank wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_order: Option<u32>,
    pub state_hash: Digest,
    /// Dates on which the calendar entry is suppressed because an override
    /// covers them. Derived on every pass, never part of the state hash.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub exclusions: BTreeSet<NaiveDate>,
}

impl SubEvent {
    /// Drop the stored hash and derived data.
    pub fn to_draft(&self) -> SubEventDraft {
        SubEventDraft {
            timing: self.timing.clone(),
            payload: self.payload.clone(),
            behavior: self.behavior,
            execution_order: self.execution_order,
        }
    }
}
