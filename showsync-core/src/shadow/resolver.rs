//! Override shadow resolution.
//!
//! A recurring calendar entry can have narrower date-bounded overrides inside
//! it (a holiday show inside a nightly schedule). Writing both as-is makes the
//! calendar show two overlapping entries on the override's dates. The
//! resolver keeps one recurring base entry and excludes every date a
//! qualifying override covers; the overrides themselves stay untouched.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::config::{ReconcilePolicy, ShadowPrecedence};
use crate::date_range::{DateSpan, SpanRelation};
use crate::diff::{ActionKind, Diagnostic, ReconciliationAction};
use crate::event::SubEvent;
use crate::schema::Controller;
use crate::shadow::GroupKey;

/// Groups smaller than this are never rewritten.
const MIN_GROUP_SIZE: usize = 2;

#[derive(Debug, Clone, Copy)]
struct Member {
    index: usize,
    span: DateSpan,
}

/// Rewrite calendar-bound create/update actions so each recurring base
/// excludes the dates its overrides cover. Other actions pass through.
pub fn resolve_overrides(
    actions: Vec<ReconciliationAction>,
    policy: &ReconcilePolicy,
) -> Vec<ReconciliationAction> {
    actions
        .into_iter()
        .map(|action| {
            if is_calendar_write(&action) {
                resolve_action(action, policy)
            } else {
                action
            }
        })
        .collect()
}

fn is_calendar_write(action: &ReconciliationAction) -> bool {
    action.target == Controller::Calendar && action.kind != ActionKind::Delete
}

/// Resolve the sub-events of a single action.
pub fn resolve_action(
    mut action: ReconciliationAction,
    policy: &ReconcilePolicy,
) -> ReconciliationAction {
    // Exclusions and grouping diagnostics belong to this pass only.
    for sub in &mut action.event.sub_events {
        sub.exclusions.clear();
    }
    action.diagnostics.retain(|d| !d.is_grouping());

    if action.event.sub_events.len() < MIN_GROUP_SIZE {
        return action;
    }

    let mut diagnostics = Vec::new();
    let mut groups: BTreeMap<GroupKey, Vec<Member>> = BTreeMap::new();

    for (index, sub) in action.event.sub_events.iter().enumerate() {
        match sub.timing.hard_span() {
            Some(span) => {
                let key =
                    GroupKey::for_sub_event(action.target, sub, policy.default_timezone.as_deref());
                groups.entry(key).or_default().push(Member { index, span });
            }
            None => diagnostics.push(Diagnostic::UnresolvedDates { sub_event: index }),
        }
    }

    let mut rewrites: Vec<(usize, BTreeSet<NaiveDate>)> = Vec::new();

    for (key, members) in &groups {
        if members.len() < MIN_GROUP_SIZE {
            continue;
        }

        let base = select_base(members);
        let base_sub = &action.event.sub_events[base.index];
        let mut exclusions = BTreeSet::new();

        for candidate in members.iter().filter(|m| m.index != base.index) {
            match base.span.relation_to(&candidate.span) {
                SpanRelation::Disjoint => continue,
                SpanRelation::PartialOverlap => {
                    warn!(
                        event = %action.event,
                        base = %base.span,
                        candidate = %candidate.span,
                        "override partially overlaps its base; not shadowing"
                    );
                    diagnostics.push(Diagnostic::GroupingAmbiguity {
                        base: base.index,
                        candidate: candidate.index,
                    });
                    continue;
                }
                SpanRelation::Contains => {}
            }

            let candidate_sub = &action.event.sub_events[candidate.index];

            if !outranks(candidate, candidate_sub, &base, base_sub, policy.shadow_precedence) {
                debug!(candidate = %candidate.span, "override does not outrank base");
                continue;
            }
            if !covers_window(candidate_sub, base_sub) {
                debug!(candidate = %candidate.span, "override does not cover base time window");
                continue;
            }

            exclusions.extend(candidate.span.dates().filter(|d| key.days.matches(*d)));
        }

        rewrites.push((base.index, exclusions));
    }

    for (index, exclusions) in rewrites {
        if !exclusions.is_empty() {
            debug!(
                event = %action.event,
                base = index,
                excluded = exclusions.len(),
                "shadowing base dates"
            );
        }
        action.event.sub_events[index].exclusions = exclusions;
    }
    action.diagnostics.extend(diagnostics);

    action
}

/// Widest span wins; ties go to the earliest start, then the earliest entry.
fn select_base(members: &[Member]) -> Member {
    members
        .iter()
        .copied()
        .max_by_key(|m| (m.span.days(), Reverse(m.span.start), Reverse(m.index)))
        .unwrap_or(members[0])
}

/// Whether `candidate` takes precedence over `base`. Explicit execution
/// order decides when both carry one; otherwise the configured heuristic does.
fn outranks(
    candidate: &Member,
    candidate_sub: &SubEvent,
    base: &Member,
    base_sub: &SubEvent,
    precedence: ShadowPrecedence,
) -> bool {
    match (candidate_sub.execution_order, base_sub.execution_order) {
        (Some(c), Some(b)) => c < b,
        _ => match precedence {
            ShadowPrecedence::NarrowerSpan => candidate.span.days() < base.span.days(),
            ShadowPrecedence::InputOrder => candidate.index < base.index,
        },
    }
}

/// Whether the candidate's time-of-day window covers the base's.
fn covers_window(candidate: &SubEvent, base: &SubEvent) -> bool {
    if base.timing.all_day {
        return candidate.timing.all_day;
    }
    if candidate.timing.all_day {
        return true;
    }

    match (candidate.timing.hard_window(), base.timing.hard_window()) {
        (Some((cand_start, cand_end)), Some((base_start, base_end))) => {
            cand_start <= base_start && cand_end >= base_end
        }
        // Unresolved symbolic bounds only cover an identical window.
        _ => {
            let candidate = candidate.timing.canonical();
            let base = base.timing.canonical();
            candidate.start_time == base.start_time && candidate.end_time == base.end_time
        }
    }
}
