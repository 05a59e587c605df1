//! Logical scheduled items.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::event::identity::Identity;
use crate::event::sub_event::{SubEvent, SubEventDraft};
use crate::hash::{Digest, identity_hash};
use crate::schema::Controller;

fn default_managed() -> bool {
    true
}

/// Who manages an event and whether sync may touch it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    /// Whether this event is managed by sync. Unmanaged events are mirrored
    /// but never deleted.
    #[serde(default = "default_managed")]
    pub managed: bool,
    /// The system the event is native to.
    pub controller: Controller,
    /// A locked event is never overwritten.
    #[serde(default)]
    pub locked: bool,
}

impl Ownership {
    pub fn managed_by(controller: Controller) -> Self {
        Ownership {
            managed: true,
            controller,
            locked: false,
        }
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn unmanaged(mut self) -> Self {
        self.managed = false;
        self
    }
}

/// An event as delivered by ingestion, before hashes are stamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub identity: Identity,
    pub sub_events: Vec<SubEventDraft>,
    pub ownership: Ownership,
    pub authority: Controller,
    pub source_updated_at: DateTime<Utc>,
}

impl EventDraft {
    pub fn stamp(self) -> SyncResult<ManifestEvent> {
        ManifestEvent::new(
            self.identity,
            self.sub_events,
            self.ownership,
            self.authority,
            self.source_updated_at,
        )
    }
}

/// One logical scheduled item, with hashes stamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEvent {
    pub identity: Identity,
    pub identity_hash: Digest,
    pub sub_events: Vec<SubEvent>,
    pub ownership: Ownership,
    /// The system that currently owns truth for this event.
    pub authority: Controller,
    /// Last update time reported by the authoritative system.
    pub source_updated_at: DateTime<Utc>,
}

impl ManifestEvent {
    pub fn new(
        identity: Identity,
        sub_events: Vec<SubEventDraft>,
        ownership: Ownership,
        authority: Controller,
        source_updated_at: DateTime<Utc>,
    ) -> SyncResult<Self> {
        let identity = identity.canonical();
        let identity_hash = identity_hash(&identity)?;
        let sub_events = sub_events
            .into_iter()
            .map(SubEventDraft::stamp)
            .collect::<SyncResult<Vec<_>>>()?;

        let event = ManifestEvent {
            identity,
            identity_hash,
            sub_events,
            ownership,
            authority,
            source_updated_at,
        };
        event.validate()?;
        Ok(event)
    }

    /// Structural checks every event must pass before it enters a set.
    pub fn validate(&self) -> SyncResult<()> {
        self.identity.validate()?;

        if self.sub_events.is_empty() {
            return Err(SyncError::manifest(format!(
                "event {} ({}) has no sub-events",
                self.identity,
                self.identity_hash.short()
            )));
        }

        if !self.ownership.managed && self.ownership.controller != self.authority {
            return Err(SyncError::manifest(format!(
                "unmanaged event {} is native to {} but claims {} authority",
                self.identity, self.ownership.controller, self.authority
            )));
        }

        Ok(())
    }

    /// Sub-event state hashes in sorted order.
    pub fn state_hashes(&self) -> Vec<Digest> {
        let mut hashes: Vec<Digest> = self.sub_events.iter().map(|s| s.state_hash).collect();
        hashes.sort();
        hashes
    }

    /// Whether both events have the same sub-event states, in any order.
    pub fn same_state(&self, other: &ManifestEvent) -> bool {
        self.state_hashes() == other.state_hashes()
    }

    /// One digest over every sub-event state.
    pub fn state_digest(&self) -> SyncResult<Digest> {
        Digest::of_canonical(&self.state_hashes())
    }

    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            identity: self.identity.clone(),
            sub_events: self.sub_events.iter().map(SubEvent::to_draft).collect(),
            ownership: self.ownership,
            authority: self.authority,
            source_updated_at: self.source_updated_at,
        }
    }
}

impl fmt::Display for ManifestEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_range::DateSpan;
    use crate::event::{DaySet, EventKind, Timing};
    use chrono::{NaiveTime, TimeZone};

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn identity() -> Identity {
        Identity::new(EventKind::Playlist, "Main Show", DaySet::everyday(), t(18), t(22)).unwrap()
    }

    fn sub(start: &str, end: &str) -> SubEventDraft {
        let span = DateSpan::parse(start, end).unwrap();
        SubEventDraft::new(Timing::timed(span, t(18), t(22), DaySet::everyday()))
    }

    fn updated() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn zero_sub_events_is_fatal() {
        let err = ManifestEvent::new(
            identity(),
            vec![],
            Ownership::managed_by(Controller::Calendar),
            Controller::Calendar,
            updated(),
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::ManifestInvariantViolation(_)));
    }

    #[test]
    fn unmanaged_event_cannot_be_owned_by_the_other_side() {
        let err = ManifestEvent::new(
            identity(),
            vec![sub("2024-12-01", "2024-12-31")],
            Ownership::managed_by(Controller::Scheduler).unmanaged(),
            Controller::Calendar,
            updated(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unmanaged"));
    }

    #[test]
    fn same_state_ignores_sub_event_order() {
        let a = ManifestEvent::new(
            identity(),
            vec![sub("2024-12-01", "2024-12-31"), sub("2024-12-24", "2024-12-26")],
            Ownership::managed_by(Controller::Calendar),
            Controller::Calendar,
            updated(),
        )
        .unwrap();
        let b = ManifestEvent::new(
            identity(),
            vec![sub("2024-12-24", "2024-12-26"), sub("2024-12-01", "2024-12-31")],
            Ownership::managed_by(Controller::Calendar),
            Controller::Calendar,
            updated(),
        )
        .unwrap();
        assert!(a.same_state(&b));
        assert_eq!(a.state_digest().unwrap(), b.state_digest().unwrap());
    }

    #[test]
    fn draft_round_trip_restamps_identically() {
        let event = ManifestEvent::new(
            identity(),
            vec![sub("2024-12-01", "2024-12-31")],
            Ownership::managed_by(Controller::Scheduler),
            Controller::Scheduler,
            updated(),
        )
        .unwrap();
        assert_eq!(event.to_draft().stamp().unwrap(), event);
    }
}
