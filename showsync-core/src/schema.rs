//! Canonical field registry.
//!
//! Every name that participates in hashing or in the snapshot document lives
//! here, so ingestion never matches on scattered string literals.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Version of the canonical field set. Part of every hash preimage, so a bump
/// invalidates all stored identity and state hashes.
pub const SCHEMA_VERSION: u32 = 1;

/// Prefix for serialized digests (e.g. `sha256:deadbeef...`).
pub const HASH_PREFIX: &str = "sha256:";

/// Fields that define "the same logical event". Calendar dates never appear here.
pub const IDENTITY_FIELDS: [&str; 5] = ["type", "target", "days", "start_time", "end_time"];

/// Fields that make up the observable state of one sub-event.
pub const STATE_FIELDS: [&str; 3] = ["timing", "payload", "behavior"];

/// Key carrying the schema version inside hash preimages and snapshot documents.
pub const KEY_SCHEMA_VERSION: &str = "schema_version";

/// Snapshot document key holding scheduler-origin events.
pub const KEY_SCHEDULER_EVENTS: &str = "scheduler";

/// Snapshot document key holding calendar-origin events.
pub const KEY_CALENDAR_EVENTS: &str = "calendar";

/// A system that can own or hold a copy of an event.
///
/// Ordering is significant: actions are sorted by target, scheduler first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Controller {
    /// The local show-control scheduler.
    Scheduler,
    /// The cloud calendar service.
    Calendar,
}

impl Controller {
    pub const ALL: [Controller; 2] = [Controller::Scheduler, Controller::Calendar];

    /// The other system in the mirror pair.
    pub fn counterpart(self) -> Controller {
        match self {
            Controller::Scheduler => Controller::Calendar,
            Controller::Calendar => Controller::Scheduler,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Controller::Scheduler => "scheduler",
            Controller::Calendar => "calendar",
        }
    }
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Controller {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduler" => Ok(Controller::Scheduler),
            "calendar" => Ok(Controller::Calendar),
            other => Err(SyncError::manifest(format!(
                "unknown controller '{other}' (expected 'scheduler' or 'calendar')"
            ))),
        }
    }
}
