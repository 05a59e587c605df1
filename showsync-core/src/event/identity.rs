//! Logical event identity.

use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::event::days::DaySet;
use crate::event::timing::{DualTime, Timing};

/// What kind of thing the scheduler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Playlist,
    Sequence,
    Command,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Playlist => write!(f, "playlist"),
            EventKind::Sequence => write!(f, "sequence"),
            EventKind::Command => write!(f, "command"),
        }
    }
}

/// The fields that make two records "the same logical event".
///
/// Dates are deliberately absent: the same weekly show in 2024 and 2025 has
/// one identity. Times are clock times only; symbolic tokens never get here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub target: String,
    pub days: DaySet,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl Identity {
    pub fn new(
        kind: EventKind,
        target: &str,
        days: DaySet,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> SyncResult<Self> {
        let identity = Identity {
            kind,
            target: target.trim().to_string(),
            days,
            start_time,
            end_time,
        };
        identity.validate()?;
        Ok(identity)
    }

    /// Derive an identity from a sub-event's timing. Both clock times must
    /// already be resolved to hard values.
    pub fn from_timing(kind: EventKind, target: &str, timing: &Timing) -> SyncResult<Self> {
        let start = hard_time(&timing.start_time, "start_time")?;
        let end = hard_time(&timing.end_time, "end_time")?;
        Identity::new(kind, target, timing.days, start, end)
    }

    pub fn validate(&self) -> SyncResult<()> {
        if self.target.trim().is_empty() {
            return Err(SyncError::identity("identity has an empty target"));
        }
        if self.days.is_empty() {
            return Err(SyncError::identity(format!(
                "identity for '{}' has an empty day set",
                self.target
            )));
        }
        Ok(())
    }

    /// Form used for hashing and comparison.
    pub fn canonical(&self) -> Identity {
        Identity {
            target: self.target.trim().to_string(),
            ..self.clone()
        }
    }
}

fn hard_time(value: &DualTime, field: &str) -> SyncResult<NaiveTime> {
    value.hard.ok_or_else(|| {
        let token = value.symbolic.as_deref().unwrap_or("<missing>");
        SyncError::identity(format!(
            "{field} is unresolved ('{token}'); identity needs a clock time"
        ))
    })
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' {} {}-{}",
            self.kind,
            self.target,
            self.days,
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_range::DateSpan;
    use chrono::Weekday;

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn rejects_blank_target_and_empty_days() {
        let err = Identity::new(EventKind::Playlist, "  ", DaySet::everyday(), t(18), t(22));
        assert!(matches!(err, Err(SyncError::IdentityInvariantViolation(_))));

        let err = Identity::new(EventKind::Playlist, "Show", DaySet::default(), t(18), t(22));
        assert!(matches!(err, Err(SyncError::IdentityInvariantViolation(_))));
    }

    #[test]
    fn from_timing_requires_clock_times() {
        let span = DateSpan::parse("2024-12-01", "2024-12-31").unwrap();
        let mut timing = Timing::timed(span, t(18), t(22), DaySet::new([Weekday::Mon]));
        let identity = Identity::from_timing(EventKind::Sequence, " Wizards ", &timing).unwrap();
        assert_eq!(identity.target, "Wizards");
        assert_eq!(identity.start_time, t(18));

        timing.start_time = DualTime::symbolic("dusk", None);
        let err = Identity::from_timing(EventKind::Sequence, "Wizards", &timing).unwrap_err();
        assert!(err.to_string().contains("dusk"));
    }

    #[test]
    fn serializes_kind_as_type() {
        let identity =
            Identity::new(EventKind::Command, "Lights Off", DaySet::weekends(), t(23), t(23))
                .unwrap();
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["type"], "command");
        assert_eq!(json["days"], serde_json::json!(["sa", "su"]));
    }
}
