//! Active-hours schedule for a geofence.

use std::collections::BTreeSet;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Day of week, `0` = Sunday through `6` = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const SUNDAY: DayOfWeek = DayOfWeek(0);
    pub const MONDAY: DayOfWeek = DayOfWeek(1);
    pub const TUESDAY: DayOfWeek = DayOfWeek(2);
    pub const WEDNESDAY: DayOfWeek = DayOfWeek(3);
    pub const THURSDAY: DayOfWeek = DayOfWeek(4);
    pub const FRIDAY: DayOfWeek = DayOfWeek(5);
    pub const SATURDAY: DayOfWeek = DayOfWeek(6);

    pub fn new(day: u8) -> Option<Self> {
        (day <= 6).then_some(Self(day))
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// Monday through Friday.
    pub fn weekdays() -> BTreeSet<DayOfWeek> {
        (1..=5).map(DayOfWeek).collect()
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = String;

    fn try_from(day: u8) -> Result<Self, Self::Error> {
        DayOfWeek::new(day).ok_or_else(|| format!("day of week must be 0-6, got {}", day))
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.0
    }
}

/// Formats a time of day as `HH:MM`.
pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Parses an `HH:MM` time of day.
pub fn parse_hhmm(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| format!("invalid time '{}', expected HH:MM: {}", s, e))
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.serialize_str(&super::format_hhmm(*t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|s| super::parse_hhmm(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// When a geofence's alerts are armed.
///
/// An inactive schedule means always on. An active schedule restricts alerts
/// to the listed days between `start_time` and `end_time`; a window whose end
/// is before its start runs overnight.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub active: bool,
    #[serde(default)]
    pub days_of_week: BTreeSet<DayOfWeek>,
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
}

impl Schedule {
    pub fn always_on() -> Self {
        Self::default()
    }

    /// Active schedule for the given days and window.
    pub fn window(days: BTreeSet<DayOfWeek>, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            active: true,
            days_of_week: days,
            start_time: Some(start),
            end_time: Some(end),
        }
    }

    pub fn is_always_on(&self) -> bool {
        !self.active
    }

    pub fn toggle_day(&mut self, day: DayOfWeek) {
        if !self.days_of_week.remove(&day) {
            self.days_of_week.insert(day);
        }
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if !self.active {
            return errors;
        }

        if self.days_of_week.is_empty() {
            errors.push(ValidationError::ScheduleWithoutDays);
        }

        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if start == end => {
                errors.push(ValidationError::EmptyScheduleWindow)
            }
            (Some(_), Some(_)) => {}
            _ => errors.push(ValidationError::IncompleteScheduleWindow),
        }

        errors
    }
}
