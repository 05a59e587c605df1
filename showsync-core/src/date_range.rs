//! Inclusive calendar-date spans.

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// An inclusive range of calendar dates (`start..=end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// How one span sits relative to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanRelation {
    /// Every date of the other span lies inside this one.
    Contains,
    /// The spans share some dates but neither contains the other's extent.
    PartialOverlap,
    /// No shared dates.
    Disjoint,
}

impl DateSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> SyncResult<Self> {
        if end < start {
            return Err(SyncError::manifest(format!(
                "date range ends before it starts ({start} > {end})"
            )));
        }
        Ok(DateSpan { start, end })
    }

    /// Parse two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> SyncResult<Self> {
        DateSpan::new(parse_date(start)?, parse_date(end)?)
    }

    /// Number of days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn contains(&self, other: &DateSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn overlaps(&self, other: &DateSpan) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Classify `other` relative to `self`.
    pub fn relation_to(&self, other: &DateSpan) -> SpanRelation {
        if self.contains(other) {
            SpanRelation::Contains
        } else if self.overlaps(other) {
            SpanRelation::PartialOverlap
        } else {
            SpanRelation::Disjoint
        }
    }

    /// Every date in the span, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.days()).map(move |offset| self.start + Duration::days(offset))
    }
}

impl fmt::Display for DateSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

fn parse_date(s: &str) -> SyncResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        SyncError::manifest(format!("invalid date format '{s}'. Expected YYYY-MM-DD"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(a: &str, b: &str) -> DateSpan {
        DateSpan::parse(a, b).unwrap()
    }

    #[test]
    fn days_are_inclusive() {
        assert_eq!(span("2024-12-01", "2024-12-31").days(), 31);
        assert_eq!(span("2024-12-25", "2024-12-25").days(), 1);
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(DateSpan::parse("2024-12-31", "2024-12-01").is_err());
        assert!(DateSpan::parse("2024-13-01", "2024-12-01").is_err());
    }

    #[test]
    fn classifies_relations() {
        let base = span("2024-12-01", "2024-12-31");
        assert_eq!(
            base.relation_to(&span("2024-12-24", "2024-12-26")),
            SpanRelation::Contains
        );
        assert_eq!(
            base.relation_to(&span("2024-12-30", "2025-01-02")),
            SpanRelation::PartialOverlap
        );
        assert_eq!(
            base.relation_to(&span("2025-01-05", "2025-01-06")),
            SpanRelation::Disjoint
        );
        assert_eq!(base.relation_to(&base), SpanRelation::Contains);
    }

    #[test]
    fn dates_cross_year_boundary() {
        let dates: Vec<_> = span("2024-12-30", "2025-01-02").dates().collect();
        assert_eq!(dates.len(), 4);
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }
}
