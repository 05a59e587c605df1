//! Reconciliation pass.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::config::ReconcilePolicy;
use crate::diff::{
    ActionKind, ActionReason, Decision, Plan, ReconciliationAction, Side, SkipReason,
    SkippedAction, decide,
};
use crate::error::{SyncError, SyncResult};
use crate::event::ManifestEvent;
use crate::hash::Digest;
use crate::manifest::EventSet;

/// Compare `current` against `desired` and produce an ordered plan.
///
/// - Identity only in `desired` → create on the counterpart of its authority.
/// - Identity only in `current` → delete the stale mirror copy.
/// - Identity in both with differing state → update the counterpart of the
///   winner's authority with the winner's version, unless the losing side is
///   locked.
///
/// Any invariant violation aborts the pass with no plan.
pub fn reconcile(
    current: &EventSet,
    desired: &EventSet,
    policy: &ReconcilePolicy,
) -> SyncResult<Plan> {
    let keys: BTreeSet<&Digest> = current.keys().chain(desired.keys()).collect();

    let mut actions = Vec::new();
    let mut skipped = Vec::new();

    for key in keys {
        let current_event = current.get(key);
        let desired_event = desired.get(key);

        if let (Some(c), Some(d)) = (current_event, desired_event) {
            check_same_identity(key, c, d)?;
        }

        let decision = decide(current_event, desired_event, policy);
        debug!(identity = %key.short(), ?decision, "reconcile decision");

        match (decision, current_event, desired_event) {
            (Decision::OnlyDesired, _, Some(desired)) => {
                actions.push(ReconciliationAction::new(
                    ActionKind::Create,
                    desired.authority.counterpart(),
                    desired,
                    ActionReason::MissingOnTarget,
                ));
            }
            (Decision::OnlyCurrent, Some(stale), _) => {
                let target = stale.authority.counterpart();
                if stale.ownership.locked {
                    warn!(event = %stale, %target, "not deleting locked event");
                    skipped.push(SkippedAction::new(
                        ActionKind::Delete,
                        target,
                        stale,
                        SkipReason::Locked,
                    ));
                } else if !stale.ownership.managed {
                    debug!(event = %stale, %target, "leaving unmanaged event in place");
                    skipped.push(SkippedAction::new(
                        ActionKind::Delete,
                        target,
                        stale,
                        SkipReason::Unmanaged,
                    ));
                } else {
                    actions.push(ReconciliationAction::new(
                        ActionKind::Delete,
                        target,
                        stale,
                        ActionReason::RemovedUpstream,
                    ));
                }
            }
            (Decision::ConflictingAuthoritative { winner, tie }, Some(c), Some(d)) => {
                let source = pick(winner, c, d);
                actions.push(ReconciliationAction::new(
                    ActionKind::Update,
                    source.authority.counterpart(),
                    source,
                    ActionReason::StateChanged { winner, tie },
                ));
            }
            (Decision::ConflictingLocked { winner, .. }, Some(c), Some(d)) => {
                let source = pick(winner, c, d);
                let loser = pick(winner.other(), c, d);
                let target = source.authority.counterpart();
                warn!(event = %loser, %target, "skipping update of locked event");
                skipped.push(SkippedAction::new(
                    ActionKind::Update,
                    target,
                    loser,
                    SkipReason::Locked,
                ));
            }
            (Decision::Equal, _, _) | (Decision::BothAbsent, _, _) => {}
            (decision, _, _) => {
                return Err(SyncError::manifest(format!(
                    "decision {decision:?} for {} does not match its inputs",
                    key.short()
                )));
            }
        }
    }

    actions.sort_by_key(ReconciliationAction::sort_key);
    skipped.sort_by_key(SkippedAction::sort_key);

    let plan = Plan { actions, skipped };
    let (created, updated, deleted) = plan.counts().totals();
    info!(
        current = current.len(),
        desired = desired.len(),
        created,
        updated,
        deleted,
        skipped = plan.skipped.len(),
        "reconciliation pass planned"
    );

    Ok(plan)
}

fn pick<'a>(side: Side, current: &'a ManifestEvent, desired: &'a ManifestEvent) -> &'a ManifestEvent {
    match side {
        Side::Current => current,
        Side::Desired => desired,
    }
}

fn check_same_identity(key: &Digest, current: &ManifestEvent, desired: &ManifestEvent) -> SyncResult<()> {
    if current.identity.canonical() != desired.identity.canonical() {
        return Err(SyncError::IdentityInvariantViolation(format!(
            "identity hash {} maps to different identities: '{}' and '{}'",
            key.short(),
            current.identity,
            desired.identity
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_range::DateSpan;
    use crate::event::{DaySet, EventKind, Identity, Ownership, SubEventDraft, Timing};
    use crate::schema::Controller;
    use chrono::{NaiveTime, TimeZone, Utc, Weekday};

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    struct Fixture {
        target: &'static str,
        authority: Controller,
        updated_day: u32,
        end: u32,
        ownership: Ownership,
    }

    impl Fixture {
        fn new(target: &'static str, authority: Controller) -> Self {
            Fixture {
                target,
                authority,
                updated_day: 1,
                end: 22,
                ownership: Ownership::managed_by(authority),
            }
        }

        fn build(self) -> ManifestEvent {
            let days = DaySet::new([Weekday::Mon, Weekday::Wed, Weekday::Fri]);
            let span = DateSpan::parse("2024-12-01", "2024-12-31").unwrap();
            ManifestEvent::new(
                Identity::new(EventKind::Playlist, self.target, days, t(18), t(22)).unwrap(),
                vec![SubEventDraft::new(Timing::timed(span, t(18), t(self.end), days))],
                self.ownership,
                self.authority,
                Utc.with_ymd_and_hms(2024, 11, self.updated_day, 0, 0, 0).unwrap(),
            )
            .unwrap()
        }
    }

    fn set(events: Vec<ManifestEvent>) -> EventSet {
        EventSet::from_events(events).unwrap()
    }

    #[test]
    fn create_then_rerun_is_empty() {
        let policy = ReconcilePolicy::default();
        let event_a = Fixture::new("Event A", Controller::Calendar).build();

        let plan = reconcile(&EventSet::new(), &set(vec![event_a.clone()]), &policy).unwrap();
        assert_eq!(plan.actions.len(), 1);
        let create = &plan.actions[0];
        assert_eq!(create.kind, ActionKind::Create);
        assert_eq!(create.target, Controller::Scheduler);
        assert_eq!(create.authority, Controller::Calendar);
        assert_eq!(create.reason, ActionReason::MissingOnTarget);

        let plan = reconcile(&set(vec![event_a.clone()]), &set(vec![event_a]), &policy).unwrap();
        assert!(plan.is_empty());
        assert!(plan.skipped.is_empty());
    }

    #[test]
    fn stale_event_deletes_mirror_copy() {
        let policy = ReconcilePolicy::default();
        let stale = Fixture::new("Old", Controller::Scheduler).build();
        let plan = reconcile(&set(vec![stale]), &EventSet::new(), &policy).unwrap();
        assert_eq!(plan.actions.len(), 1);
        assert_eq!(plan.actions[0].kind, ActionKind::Delete);
        assert_eq!(plan.actions[0].target, Controller::Calendar);
    }

    #[test]
    fn locked_and_unmanaged_events_are_not_deleted() {
        let policy = ReconcilePolicy::default();
        let mut locked = Fixture::new("Locked", Controller::Calendar);
        locked.ownership = locked.ownership.locked();
        let mut unmanaged = Fixture::new("Native", Controller::Scheduler);
        unmanaged.ownership = unmanaged.ownership.unmanaged();

        let plan = reconcile(
            &set(vec![locked.build(), unmanaged.build()]),
            &EventSet::new(),
            &policy,
        )
        .unwrap();
        assert!(plan.is_empty());
        let reasons: Vec<_> = plan.skipped.iter().map(|s| s.reason).collect();
        // Scheduler target sorts first: the locked calendar event's mirror.
        assert_eq!(reasons, vec![SkipReason::Locked, SkipReason::Unmanaged]);
    }

    #[test]
    fn newer_side_overwrites_counterpart() {
        let policy = ReconcilePolicy::default();
        let current = Fixture::new("Show", Controller::Scheduler).build();
        let mut newer = Fixture::new("Show", Controller::Calendar);
        newer.updated_day = 5;
        newer.end = 23;
        let newer = newer.build();

        let plan = reconcile(&set(vec![current]), &set(vec![newer.clone()]), &policy).unwrap();
        assert_eq!(plan.actions.len(), 1);
        let update = &plan.actions[0];
        assert_eq!(update.kind, ActionKind::Update);
        assert_eq!(update.authority, Controller::Calendar);
        assert_eq!(update.target, Controller::Scheduler);
        assert_eq!(update.event, newer);
    }

    #[test]
    fn locked_loser_produces_no_update() {
        let policy = ReconcilePolicy::default();
        let mut current = Fixture::new("Show", Controller::Scheduler);
        current.ownership = current.ownership.locked();
        let mut newer = Fixture::new("Show", Controller::Calendar);
        newer.updated_day = 5;
        newer.end = 23;

        let plan = reconcile(&set(vec![current.build()]), &set(vec![newer.build()]), &policy).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(plan.skipped[0].reason, SkipReason::Locked);
        assert_eq!(plan.skipped[0].target, Controller::Scheduler);
    }

    #[test]
    fn mismatched_identity_behind_one_hash_is_fatal() {
        let policy = ReconcilePolicy::default();
        let a = Fixture::new("Show", Controller::Calendar).build();
        let mut forged = Fixture::new("Other", Controller::Calendar).build();
        forged.identity_hash = a.identity_hash;

        let err = reconcile(&set(vec![a]), &set(vec![forged]), &policy).unwrap_err();
        assert!(matches!(err, SyncError::IdentityInvariantViolation(_)));
    }

    #[test]
    fn deletes_precede_creates_on_same_target() {
        let policy = ReconcilePolicy::default();
        let stale = Fixture::new("Old", Controller::Scheduler).build();
        let fresh = Fixture::new("New", Controller::Scheduler).build();

        let plan = reconcile(&set(vec![stale]), &set(vec![fresh]), &policy).unwrap();
        let kinds: Vec<_> = plan.actions.iter().map(|a| (a.target, a.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (Controller::Calendar, ActionKind::Delete),
                (Controller::Calendar, ActionKind::Create)
            ]
        );
    }
}
