//! Authority decision table.
//!
//! | current | desired | state   | losing side locked | decision                  |
//! |---------|---------|---------|--------------------|---------------------------|
//! | -       | -       |         |                    | `BothAbsent`              |
//! | -       | yes     |         |                    | `OnlyDesired`             |
//! | yes     | -       |         |                    | `OnlyCurrent`             |
//! | yes     | yes     | equal   |                    | `Equal`                   |
//! | yes     | yes     | differs | no                 | `ConflictingAuthoritative`|
//! | yes     | yes     | differs | yes                | `ConflictingLocked`       |
//!
//! The winner of a conflict is the side with the later `source_updated_at`.
//! On a tie the side whose authority matches `ReconcilePolicy::tie_authority`
//! wins; if both or neither match, the desired side wins.

use std::cmp::Ordering;

use crate::config::ReconcilePolicy;
use crate::diff::Side;
use crate::event::ManifestEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    BothAbsent,
    OnlyDesired,
    OnlyCurrent,
    Equal,
    ConflictingAuthoritative { winner: Side, tie: bool },
    ConflictingLocked { winner: Side, tie: bool },
}

pub fn decide(
    current: Option<&ManifestEvent>,
    desired: Option<&ManifestEvent>,
    policy: &ReconcilePolicy,
) -> Decision {
    match (current, desired) {
        (None, None) => Decision::BothAbsent,
        (None, Some(_)) => Decision::OnlyDesired,
        (Some(_), None) => Decision::OnlyCurrent,
        (Some(current), Some(desired)) => {
            if current.same_state(desired) {
                return Decision::Equal;
            }

            let (winner, tie) = pick_winner(current, desired, policy);
            let loser = match winner {
                Side::Current => desired,
                Side::Desired => current,
            };

            if loser.ownership.locked {
                Decision::ConflictingLocked { winner, tie }
            } else {
                Decision::ConflictingAuthoritative { winner, tie }
            }
        }
    }
}

fn pick_winner(
    current: &ManifestEvent,
    desired: &ManifestEvent,
    policy: &ReconcilePolicy,
) -> (Side, bool) {
    match current.source_updated_at.cmp(&desired.source_updated_at) {
        Ordering::Greater => (Side::Current, false),
        Ordering::Less => (Side::Desired, false),
        Ordering::Equal => {
            let preferred = policy.tie_authority;
            let winner = match (
                current.authority == preferred,
                desired.authority == preferred,
            ) {
                (true, false) => Side::Current,
                _ => Side::Desired,
            };
            (winner, true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_range::DateSpan;
    use crate::event::{DaySet, EventKind, Identity, Ownership, SubEventDraft, Timing};
    use crate::schema::Controller;
    use chrono::{NaiveTime, TimeZone, Utc};

    fn event(authority: Controller, day: u32, end: u32, locked: bool) -> ManifestEvent {
        let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        let span = DateSpan::parse("2024-12-01", "2024-12-31").unwrap();
        let ownership = Ownership {
            managed: true,
            controller: authority,
            locked,
        };
        ManifestEvent::new(
            Identity::new(EventKind::Playlist, "Show", DaySet::everyday(), t(18), t(22)).unwrap(),
            vec![SubEventDraft::new(Timing::timed(span, t(18), t(end), DaySet::everyday()))],
            ownership,
            authority,
            Utc.with_ymd_and_hms(2024, 11, day, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn presence_rows() {
        let policy = ReconcilePolicy::default();
        let e = event(Controller::Calendar, 1, 22, false);
        assert_eq!(decide(None, None, &policy), Decision::BothAbsent);
        assert_eq!(decide(None, Some(&e), &policy), Decision::OnlyDesired);
        assert_eq!(decide(Some(&e), None, &policy), Decision::OnlyCurrent);
        assert_eq!(decide(Some(&e), Some(&e), &policy), Decision::Equal);
    }

    #[test]
    fn equal_state_ignores_timestamps_and_authority() {
        let policy = ReconcilePolicy::default();
        let a = event(Controller::Calendar, 1, 22, false);
        let b = event(Controller::Scheduler, 9, 22, true);
        assert_eq!(decide(Some(&a), Some(&b), &policy), Decision::Equal);
    }

    #[test]
    fn later_side_wins() {
        let policy = ReconcilePolicy::default();
        let older = event(Controller::Scheduler, 1, 22, false);
        let newer = event(Controller::Calendar, 2, 23, false);
        assert_eq!(
            decide(Some(&older), Some(&newer), &policy),
            Decision::ConflictingAuthoritative {
                winner: Side::Desired,
                tie: false
            }
        );
        assert_eq!(
            decide(Some(&newer), Some(&older), &policy),
            Decision::ConflictingAuthoritative {
                winner: Side::Current,
                tie: false
            }
        );
    }

    #[test]
    fn locked_loser_blocks_overwrite() {
        let policy = ReconcilePolicy::default();
        let older_locked = event(Controller::Scheduler, 1, 22, true);
        let newer = event(Controller::Calendar, 2, 23, false);
        assert_eq!(
            decide(Some(&older_locked), Some(&newer), &policy),
            Decision::ConflictingLocked {
                winner: Side::Desired,
                tie: false
            }
        );
    }

    #[test]
    fn locked_winner_still_overwrites_unlocked_loser() {
        let policy = ReconcilePolicy::default();
        let older = event(Controller::Scheduler, 1, 22, false);
        let newer_locked = event(Controller::Calendar, 2, 23, true);
        assert_eq!(
            decide(Some(&older), Some(&newer_locked), &policy),
            Decision::ConflictingAuthoritative {
                winner: Side::Desired,
                tie: false
            }
        );
    }

    #[test]
    fn tie_follows_policy() {
        let scheduler = event(Controller::Scheduler, 1, 22, false);
        let calendar = event(Controller::Calendar, 1, 23, false);

        let default_policy = ReconcilePolicy::default();
        assert_eq!(
            decide(Some(&scheduler), Some(&calendar), &default_policy),
            Decision::ConflictingAuthoritative {
                winner: Side::Current,
                tie: true
            }
        );

        let calendar_policy = ReconcilePolicy {
            tie_authority: Controller::Calendar,
            ..ReconcilePolicy::default()
        };
        assert_eq!(
            decide(Some(&scheduler), Some(&calendar), &calendar_policy),
            Decision::ConflictingAuthoritative {
                winner: Side::Desired,
                tie: true
            }
        );
    }

    #[test]
    fn tie_between_same_authority_goes_to_desired() {
        let policy = ReconcilePolicy::default();
        let a = event(Controller::Scheduler, 1, 22, false);
        let b = event(Controller::Scheduler, 1, 23, false);
        assert_eq!(
            decide(Some(&a), Some(&b), &policy),
            Decision::ConflictingAuthoritative {
                winner: Side::Desired,
                tie: true
            }
        );
    }
}
