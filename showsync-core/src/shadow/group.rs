//! Grouping key for sibling sub-events.

use serde::{Deserialize, Serialize};

use crate::event::{DaySet, SubEvent};
use crate::schema::Controller;

/// Sub-events merge only with siblings that share every field of this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    pub target: Controller,
    pub all_day: bool,
    pub timezone: Option<String>,
    pub days: DaySet,
}

impl GroupKey {
    /// Key for `sub` as written to `target`. A sub-event without a timezone
    /// is placed in `default_timezone`.
    pub fn for_sub_event(target: Controller, sub: &SubEvent, default_timezone: Option<&str>) -> Self {
        let timezone = sub
            .timing
            .timezone
            .as_deref()
            .or(default_timezone)
            .map(|tz| tz.trim().to_string());

        GroupKey {
            target,
            all_day: sub.timing.all_day,
            timezone,
            days: sub.timing.days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_range::DateSpan;
    use crate::event::{SubEventDraft, Timing};
    use chrono::NaiveTime;

    fn sub(timezone: Option<&str>, all_day: bool) -> SubEvent {
        let span = DateSpan::parse("2024-12-01", "2024-12-31").unwrap();
        let mut timing = if all_day {
            Timing::all_day(span, DaySet::everyday())
        } else {
            let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
            Timing::timed(span, t(18), t(22), DaySet::everyday())
        };
        timing.timezone = timezone.map(String::from);
        SubEventDraft::new(timing).stamp().unwrap()
    }

    #[test]
    fn default_timezone_fills_gaps_only() {
        let implicit = GroupKey::for_sub_event(Controller::Calendar, &sub(None, false), Some("UTC"));
        let explicit = GroupKey::for_sub_event(Controller::Calendar, &sub(Some("UTC"), false), None);
        assert_eq!(implicit, explicit);

        let other = GroupKey::for_sub_event(
            Controller::Calendar,
            &sub(Some("America/Denver"), false),
            Some("UTC"),
        );
        assert_ne!(implicit, other);
    }

    #[test]
    fn all_day_flag_splits_groups() {
        let timed = GroupKey::for_sub_event(Controller::Calendar, &sub(None, false), None);
        let all_day = GroupKey::for_sub_event(Controller::Calendar, &sub(None, true), None);
        assert_ne!(timed, all_day);
    }
}
