//! Event sets keyed by identity, and the snapshot documents they load from.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::event::{EventDraft, ManifestEvent};
use crate::hash::{Digest, verify_event};
use crate::schema::{Controller, SCHEMA_VERSION};

/// A validated set of events, at most one per identity hash.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSet {
    events: BTreeMap<Digest, ManifestEvent>,
}

impl EventSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set, rejecting structurally invalid events and duplicate identities.
    pub fn from_events(events: impl IntoIterator<Item = ManifestEvent>) -> SyncResult<Self> {
        let mut set = EventSet::new();
        for event in events {
            set.insert(event)?;
        }
        Ok(set)
    }

    /// Merge a scheduler-origin list with a calendar-origin list. Every event
    /// must claim the authority of the list it arrived in.
    pub fn merge(
        scheduler: impl IntoIterator<Item = ManifestEvent>,
        calendar: impl IntoIterator<Item = ManifestEvent>,
    ) -> SyncResult<Self> {
        let mut set = EventSet::new();
        let origins = [
            (Controller::Scheduler, scheduler.into_iter().collect::<Vec<_>>()),
            (Controller::Calendar, calendar.into_iter().collect::<Vec<_>>()),
        ];

        for (origin, events) in origins {
            for event in events {
                if event.authority != origin {
                    return Err(SyncError::manifest(format!(
                        "event {} arrived in the {origin} list but claims {} authority",
                        event.identity, event.authority
                    )));
                }
                set.insert(event)?;
            }
        }

        Ok(set)
    }

    pub fn insert(&mut self, event: ManifestEvent) -> SyncResult<()> {
        event.validate()?;
        match self.events.entry(event.identity_hash) {
            btree_map::Entry::Occupied(existing) => Err(SyncError::manifest(format!(
                "duplicate identity {} ({} and {})",
                existing.key().short(),
                existing.get().identity,
                event.identity
            ))),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(event);
                Ok(())
            }
        }
    }

    pub fn get(&self, identity_hash: &Digest) -> Option<&ManifestEvent> {
        self.events.get(identity_hash)
    }

    pub fn contains(&self, identity_hash: &Digest) -> bool {
        self.events.contains_key(identity_hash)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Digest> {
        self.events.keys()
    }

    /// Events in identity-hash order.
    pub fn iter(&self) -> impl Iterator<Item = &ManifestEvent> {
        self.events.values()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Recompute every stored hash.
    pub fn verify(&self) -> SyncResult<()> {
        self.iter().try_for_each(verify_event)
    }

    /// Split back into scheduler-origin and calendar-origin lists.
    pub fn into_snapshot(self) -> Snapshot {
        let (scheduler, calendar): (Vec<_>, Vec<_>) = self
            .events
            .into_values()
            .partition(|e| e.authority == Controller::Scheduler);
        Snapshot {
            schema_version: SCHEMA_VERSION,
            scheduler,
            calendar,
        }
    }
}

fn current_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// On-disk form of an event set: one list per origin system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "current_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub scheduler: Vec<ManifestEvent>,
    #[serde(default)]
    pub calendar: Vec<ManifestEvent>,
}

impl Snapshot {
    pub fn load(path: &Path) -> SyncResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| {
            SyncError::Serialization(format!("{}: {e}", path.display()))
        })?;
        Ok(snapshot)
    }

    /// Merge both lists into a set. With `verify`, every stored hash is
    /// recomputed first.
    ///
    /// Stored exclusions are dropped: they are derived on every pass.
    pub fn into_event_set(mut self, verify: bool) -> SyncResult<EventSet> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(SyncError::manifest(format!(
                "snapshot schema version {} does not match {SCHEMA_VERSION}; rehash required",
                self.schema_version
            )));
        }
        for event in self.scheduler.iter_mut().chain(self.calendar.iter_mut()) {
            for sub in &mut event.sub_events {
                sub.exclusions.clear();
            }
        }
        let set = EventSet::merge(self.scheduler, self.calendar)?;
        if verify {
            set.verify()?;
        }
        Ok(set)
    }

    pub fn to_json_pretty(&self) -> SyncResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Ingestion-side document: events without hashes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    #[serde(default)]
    pub scheduler: Vec<EventDraft>,
    #[serde(default)]
    pub calendar: Vec<EventDraft>,
}

impl DraftSnapshot {
    pub fn load(path: &Path) -> SyncResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| SyncError::Serialization(format!("{}: {e}", path.display())))
    }

    /// Stamp every draft. Fails on the first invalid event.
    pub fn stamp(self) -> SyncResult<Snapshot> {
        let stamp_all = |drafts: Vec<EventDraft>| {
            drafts
                .into_iter()
                .map(EventDraft::stamp)
                .collect::<SyncResult<Vec<_>>>()
        };
        Ok(Snapshot {
            schema_version: SCHEMA_VERSION,
            scheduler: stamp_all(self.scheduler)?,
            calendar: stamp_all(self.calendar)?,
        })
    }
}
