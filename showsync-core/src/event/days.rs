//! Canonical weekday set.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

const CODES: [&str; 7] = ["mo", "tu", "we", "th", "fr", "sa", "su"];

/// Set of weekdays an event runs on.
///
/// Stored as a Monday-first bitmask, so two sets built from the same days in
/// any order are equal and serialize identically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DaySet(u8);

impl DaySet {
    pub fn new(days: impl IntoIterator<Item = Weekday>) -> Self {
        days.into_iter().fold(DaySet(0), |set, day| set.with(day))
    }

    pub fn everyday() -> Self {
        DaySet(0b0111_1111)
    }

    pub fn weekdays() -> Self {
        DaySet(0b0001_1111)
    }

    pub fn weekends() -> Self {
        DaySet(0b0110_0000)
    }

    pub fn with(self, day: Weekday) -> Self {
        DaySet(self.0 | bit(day))
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & bit(day) != 0
    }

    /// Whether the event runs on the weekday of `date`.
    pub fn matches(&self, date: NaiveDate) -> bool {
        self.contains(date.weekday())
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Days in canonical (Monday-first) order.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        (0..7u8)
            .filter(move |i| self.0 & (1 << i) != 0)
            .map(weekday_from_index)
    }

    fn parse_code(s: &str) -> Option<Weekday> {
        let lower = s.trim().to_ascii_lowercase();
        if let Some(i) = CODES.iter().position(|c| *c == lower) {
            return Some(weekday_from_index(i as u8));
        }
        lower.parse::<Weekday>().ok()
    }
}

fn bit(day: Weekday) -> u8 {
    1 << day.num_days_from_monday()
}

fn weekday_from_index(i: u8) -> Weekday {
    match i {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}

impl FromIterator<Weekday> for DaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        DaySet::new(iter)
    }
}

impl fmt::Display for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == DaySet::everyday() {
            return f.write_str("daily");
        }
        let codes: Vec<&str> = self
            .iter()
            .map(|d| CODES[d.num_days_from_monday() as usize])
            .collect();
        f.write_str(&codes.join(","))
    }
}

impl Serialize for DaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for day in self.iter() {
            seq.serialize_element(CODES[day.num_days_from_monday() as usize])?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for DaySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.iter()
            .map(|s| {
                DaySet::parse_code(s)
                    .ok_or_else(|| de::Error::custom(format!("unknown weekday '{s}'")))
            })
            .collect()
    }
}
