//! Dual hard/symbolic timing.
//!
//! Every date and time boundary carries both a hard value (a concrete date or
//! clock time) and an optional symbolic token (`"thanksgiving"`, `"dusk"`)
//! with an offset. Upstream ingestion resolves tokens to hard values wherever
//! it can; the token is kept alongside so the pair round-trips losslessly.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::date_range::DateSpan;
use crate::error::{SyncError, SyncResult};
use crate::event::days::DaySet;

/// One boundary in dual representation.
///
/// `offset` is in days for dates and minutes for times, and applies to the
/// symbolic token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dual<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbolic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i32>,
}

pub type DualDate = Dual<NaiveDate>;
pub type DualTime = Dual<NaiveTime>;

impl<T> Dual<T> {
    pub fn hard(value: T) -> Self {
        Dual {
            hard: Some(value),
            symbolic: None,
            offset: None,
        }
    }

    /// A boundary known only by its token (e.g. sunset before a locale is known).
    pub fn symbolic(token: &str, offset: Option<i32>) -> Self {
        Dual {
            hard: None,
            symbolic: Some(normalize_token(token)),
            offset,
        }
    }

    /// A resolved boundary that remembers the token it came from.
    pub fn resolved(value: T, token: &str, offset: Option<i32>) -> Self {
        Dual {
            hard: Some(value),
            symbolic: Some(normalize_token(token)),
            offset,
        }
    }

    pub fn is_symbolic_only(&self) -> bool {
        self.hard.is_none() && self.symbolic.is_some()
    }

    fn validate(&self, field: &str) -> SyncResult<()> {
        match (&self.hard, &self.symbolic) {
            (None, None) => Err(SyncError::manifest(format!(
                "{field} has neither a hard value nor a symbolic token"
            ))),
            (_, Some(token)) if token.trim().is_empty() => Err(SyncError::manifest(format!(
                "{field} has an empty symbolic token"
            ))),
            _ => Ok(()),
        }
    }
}

impl<T: Clone> Dual<T> {
    fn canonical(&self) -> Self {
        Dual {
            hard: self.hard.clone(),
            symbolic: self.symbolic.as_deref().map(normalize_token),
            offset: self.offset.filter(|o| *o != 0),
        }
    }
}

fn normalize_token(token: &str) -> String {
    token.trim().to_ascii_lowercase()
}

/// The full timing of one sub-event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    pub start_date: DualDate,
    pub end_date: DualDate,
    pub start_time: DualTime,
    pub end_time: DualTime,
    pub days: DaySet,
    #[serde(default)]
    pub all_day: bool,
    /// IANA timezone name; `None` means the scheduler's local zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Timing {
    /// Timed window on hard dates and clock times.
    pub fn timed(span: DateSpan, start: NaiveTime, end: NaiveTime, days: DaySet) -> Self {
        Timing {
            start_date: Dual::hard(span.start),
            end_date: Dual::hard(span.end),
            start_time: Dual::hard(start),
            end_time: Dual::hard(end),
            days,
            all_day: false,
            timezone: None,
        }
    }

    /// All-day window on hard dates.
    pub fn all_day(span: DateSpan, days: DaySet) -> Self {
        let midnight = NaiveTime::MIN;
        Timing {
            all_day: true,
            ..Timing::timed(span, midnight, midnight, days)
        }
    }

    pub fn with_timezone(mut self, tz: &str) -> Self {
        self.timezone = Some(tz.to_string());
        self
    }

    /// The hard date span, if both dates are resolved.
    pub fn hard_span(&self) -> Option<DateSpan> {
        match (self.start_date.hard, self.end_date.hard) {
            (Some(start), Some(end)) if start <= end => Some(DateSpan { start, end }),
            _ => None,
        }
    }

    /// The hard time-of-day window in minutes from midnight. A window that ends
    /// at or before its start runs past midnight, so its end is pushed a day out.
    pub fn hard_window(&self) -> Option<(u32, u32)> {
        let start = minutes_of(self.start_time.hard?);
        let mut end = minutes_of(self.end_time.hard?);
        if end <= start {
            end += 24 * 60;
        }
        Some((start, end))
    }

    pub fn validate(&self) -> SyncResult<()> {
        self.start_date.validate("start_date")?;
        self.end_date.validate("end_date")?;
        self.start_time.validate("start_time")?;
        self.end_time.validate("end_time")?;

        if self.days.is_empty() {
            return Err(SyncError::manifest("timing has an empty day set"));
        }
        if let (Some(start), Some(end)) = (self.start_date.hard, self.end_date.hard) {
            if end < start {
                return Err(SyncError::manifest(format!(
                    "timing ends before it starts ({start} > {end})"
                )));
            }
        }
        if let Some(tz) = &self.timezone {
            tz.parse::<chrono_tz::Tz>()
                .map_err(|_| SyncError::manifest(format!("unknown timezone '{tz}'")))?;
        }
        Ok(())
    }

    /// Form used for hashing: tokens lower-cased, zero offsets dropped,
    /// timezone trimmed.
    pub fn canonical(&self) -> Timing {
        Timing {
            start_date: self.start_date.canonical(),
            end_date: self.end_date.canonical(),
            start_time: self.start_time.canonical(),
            end_time: self.end_time.canonical(),
            days: self.days,
            all_day: self.all_day,
            timezone: self.timezone.as_deref().map(|tz| tz.trim().to_string()),
        }
    }
}

fn minutes_of(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}
