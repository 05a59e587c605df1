//! Terminal rendering for plans.
//!
//! Extension traits that add colored output to showsync-core types using
//! owo_colors.

use owo_colors::OwoColorize;
use showsync_core::diff::{ActionReason, SkippedAction};
use showsync_core::{ActionKind, Controller, Plan, ReconciliationAction};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for ActionKind {
    fn render(&self) -> String {
        colorize(*self, self.symbol())
    }
}

fn colorize(kind: ActionKind, text: &str) -> String {
    match kind {
        ActionKind::Create => text.green().to_string(),
        ActionKind::Update => text.yellow().to_string(),
        ActionKind::Delete => text.red().to_string(),
    }
}

impl Render for Controller {
    fn render(&self) -> String {
        match self {
            Controller::Scheduler => format!("🎛  {}", "scheduler".bold()),
            Controller::Calendar => format!("📅 {}", "calendar".bold()),
        }
    }
}

impl Render for ReconciliationAction {
    fn render(&self) -> String {
        let summary = colorize(self.kind, &self.event.to_string());
        let reason = match &self.reason {
            ActionReason::MissingOnTarget => "new".to_string(),
            ActionReason::RemovedUpstream => "removed".to_string(),
            ActionReason::StateChanged { tie: true, .. } => {
                format!("{} wins tie", self.authority)
            }
            ActionReason::StateChanged { .. } => format!("newer on {}", self.authority),
        };

        format!("{} {} {}", self.kind.render(), summary, reason.dimmed())
    }
}

impl Render for SkippedAction {
    fn render(&self) -> String {
        format!(
            "{} {} {}",
            self.kind.symbol().dimmed(),
            self.summary,
            format!("({} on {}, {})", self.kind, self.target, self.reason).dimmed()
        )
    }
}

/// Above this many actions per target, show counts unless verbose.
const COMPACT_THRESHOLD: usize = 5;

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

fn render_details(action: &ReconciliationAction, lines: &mut Vec<String>) {
    for (i, sub) in action.event.sub_events.iter().enumerate() {
        if sub.exclusions.is_empty() {
            continue;
        }
        let dates: Vec<String> = sub.exclusions.iter().map(|d| d.to_string()).collect();
        lines.push(format!(
            "      {} {}",
            format!("sub-event {i} skips").dimmed(),
            dates.join(", ")
        ));
    }
    for diagnostic in &action.diagnostics {
        lines.push(format!("      {} {}", "!".yellow(), diagnostic.to_string().yellow()));
    }
}

pub trait PlanRender {
    fn render_for(&self, target: Controller, verbose: bool) -> String;
}

impl PlanRender for Plan {
    fn render_for(&self, target: Controller, verbose: bool) -> String {
        let actions: Vec<_> = self.for_target(target).collect();
        if actions.is_empty() {
            return "   No changes".dimmed().to_string();
        }

        let mut lines = Vec::new();

        if verbose || actions.len() <= COMPACT_THRESHOLD {
            for action in actions {
                lines.push(format!("   {}", action.render()));
                render_details(action, &mut lines);
            }
        } else {
            let (created, updated, deleted) = self.counts().for_target(target);
            let rows = [
                (ActionKind::Delete, deleted, "deleted"),
                (ActionKind::Update, updated, "changed"),
                (ActionKind::Create, created, "new"),
            ];
            for (kind, count, label) in rows {
                if count > 0 {
                    let text = format!("({count} {label} {})", pluralize("event", count));
                    lines.push(format!("   {} {}", kind.render(), colorize(kind, &text)));
                }
            }
            let diagnostics: usize = actions.iter().map(|a| a.diagnostics.len()).sum();
            if diagnostics > 0 {
                let text = format!("({diagnostics} {})", pluralize("warning", diagnostics));
                lines.push(format!("   {} {}", "!".yellow(), text.yellow()));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pluralizes_counts() {
        assert_eq!(pluralize("event", 1), "event");
        assert_eq!(pluralize("event", 3), "events");
    }

    #[test]
    fn empty_plan_says_no_changes() {
        let rendered = Plan::default().render_for(Controller::Calendar, false);
        assert!(rendered.contains("No changes"));
    }
}
