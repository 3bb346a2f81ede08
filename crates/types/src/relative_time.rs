//! Relative time expressions for timers and date-bound activities.
//!
//! A [`RelativeTime`] is either *after* a signed duration ("5 days", "-2 hours")
//! or the *next* occurrence of a calendar unit ("next Monday"). Both variants
//! share an optional `base` binding (the instant the expression is relative to,
//! "now" when unbound) and an optional time-of-day `at` that replaces the
//! resolved time-of-day.
//!
//! Expressions are immutable once built. [`RelativeTime::resolve`] takes the base
//! instant explicitly and returns a new timestamp, so resolution never depends on
//! the wall clock.
//!
//! ## Serialized shape
//!
//! JSON and attribute forms share the same field names:
//!
//! ```text
//! type: after | next        (absent: legacy `after: "<n> <unit>"` string)
//! duration, durationUnit    (after)
//! index, indexUnit          (next)
//! base                      (binding)
//! at                        ("H:MM")
//! ```

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{AttributeReader, AttributeWriter, Binding, RelativeTimeError};

pub const AFTER: &str = "after";
pub const NEXT: &str = "next";

/// Units accepted by *after* expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl DurationUnit {
    pub const ALL: [DurationUnit; 7] = [
        DurationUnit::Seconds,
        DurationUnit::Minutes,
        DurationUnit::Hours,
        DurationUnit::Days,
        DurationUnit::Weeks,
        DurationUnit::Months,
        DurationUnit::Years,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DurationUnit::Seconds => "seconds",
            DurationUnit::Minutes => "minutes",
            DurationUnit::Hours => "hours",
            DurationUnit::Days => "days",
            DurationUnit::Weeks => "weeks",
            DurationUnit::Months => "months",
            DurationUnit::Years => "years",
        }
    }

    /// Adds `amount` of this unit to `base`. Months and years clamp to the end of
    /// shorter months; everything else is fixed-length.
    fn add_to(self, base: NaiveDateTime, amount: i64) -> Option<NaiveDateTime> {
        let fixed = match self {
            DurationUnit::Seconds => TimeDelta::try_seconds(amount),
            DurationUnit::Minutes => TimeDelta::try_minutes(amount),
            DurationUnit::Hours => TimeDelta::try_hours(amount),
            DurationUnit::Days => TimeDelta::try_days(amount),
            DurationUnit::Weeks => TimeDelta::try_weeks(amount),
            DurationUnit::Months => return add_months(base, amount),
            DurationUnit::Years => return amount.checked_mul(12).and_then(|months| add_months(base, months)),
        };
        fixed.and_then(|delta| base.checked_add_signed(delta))
    }
}

impl FromStr for DurationUnit {
    type Err = RelativeTimeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        DurationUnit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == value)
            .ok_or_else(|| RelativeTimeError::InvalidArgument(format!("unknown duration unit '{}'", value)))
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn add_months(base: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        base.checked_add_months(magnitude)
    } else {
        base.checked_sub_months(magnitude)
    }
}

/// Calendar units addressed by *next* expressions, each with its own index range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NextUnit {
    /// Index 0..=23; resolves to the next `HH:00:00`.
    HourInDay,
    /// Index 1 (Monday) ..= 7 (Sunday).
    DayInWeek,
    /// Index 1..=31; months without that day are skipped.
    DayInMonth,
    /// Index 1..=12; resolves to the first day of the month.
    MonthInYear,
}

impl NextUnit {
    pub const ALL: [NextUnit; 4] = [NextUnit::HourInDay, NextUnit::DayInWeek, NextUnit::DayInMonth, NextUnit::MonthInYear];

    pub fn as_str(self) -> &'static str {
        match self {
            NextUnit::HourInDay => "hourInDay",
            NextUnit::DayInWeek => "dayInWeek",
            NextUnit::DayInMonth => "dayInMonth",
            NextUnit::MonthInYear => "monthInYear",
        }
    }

    pub fn index_range(self) -> RangeInclusive<u32> {
        match self {
            NextUnit::HourInDay => 0..=23,
            NextUnit::DayInWeek => 1..=7,
            NextUnit::DayInMonth => 1..=31,
            NextUnit::MonthInYear => 1..=12,
        }
    }

    /// First occurrence strictly after `base`; `base` itself is never returned.
    fn next_after(self, base: NaiveDateTime, index: u32) -> Option<NaiveDateTime> {
        let base_date = base.date();
        match self {
            NextUnit::HourInDay => {
                let candidate = base_date.and_hms_opt(index, 0, 0)?;
                if candidate > base {
                    Some(candidate)
                } else {
                    candidate.checked_add_signed(TimeDelta::try_days(1)?)
                }
            }
            NextUnit::DayInWeek => {
                let current = base_date.weekday().number_from_monday();
                let days_ahead = match (index + 7 - current) % 7 {
                    0 => 7,
                    other => other,
                };
                base.checked_add_signed(TimeDelta::try_days(i64::from(days_ahead))?)
            }
            NextUnit::DayInMonth => {
                // Day 31 is at most two months away, so a year of lookahead is plenty.
                (0..=12u32).find_map(|offset| {
                    let first_of_month = NaiveDate::from_ymd_opt(base_date.year(), base_date.month(), 1)?.checked_add_months(Months::new(offset))?;
                    let candidate = first_of_month.with_day(index)?;
                    (candidate > base_date).then(|| candidate.and_time(base.time()))
                })
            }
            NextUnit::MonthInYear => {
                let year = if index > base_date.month() { base_date.year() } else { base_date.year() + 1 };
                NaiveDate::from_ymd_opt(year, index, 1).map(|date| date.and_time(base.time()))
            }
        }
    }
}

impl FromStr for NextUnit {
    type Err = RelativeTimeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        NextUnit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == value)
            .ok_or_else(|| RelativeTimeError::InvalidArgument(format!("unknown calendar unit '{}'", value)))
    }
}

impl fmt::Display for NextUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hour and minutes of a day, written as `H:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeInDay {
    pub hour: u32,
    pub minutes: u32,
}

impl TimeInDay {
    pub fn new(hour: u32, minutes: u32) -> Self {
        Self { hour, minutes }
    }

    pub fn is_valid(&self) -> bool {
        self.hour <= 23 && self.minutes <= 59
    }

    /// Parses the `at` attribute.
    ///
    /// The text is split on the first colon. Text without a colon, or whose colon
    /// is the final character (`"9:"`), carries no time-of-day and yields `Ok(None)`.
    pub fn parse_attribute(text: &str) -> Result<Option<Self>, RelativeTimeError> {
        let Some(colon_index) = text.find(':') else {
            return Ok(None);
        };
        if colon_index == text.len() - 1 {
            return Ok(None);
        }
        let (hour_text, minutes_text) = (&text[..colon_index], &text[colon_index + 1..]);
        let hour = parse_number(hour_text, "hour", text)?;
        let minutes = parse_number(minutes_text, "minutes", text)?;
        Ok(Some(Self { hour, minutes }))
    }
}

fn parse_number<T: FromStr>(text: &str, label: &str, original: &str) -> Result<T, RelativeTimeError> {
    text.parse()
        .map_err(|_| RelativeTimeError::InvalidArgument(format!("invalid {} '{}' in time of day '{}'", label, text, original)))
}

impl fmt::Display for TimeInDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour, self.minutes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AfterRelativeTime {
    pub duration: Option<i64>,
    /// Kept as authored so unrecognised units surface through `valid()` instead of failing to load.
    pub duration_unit: Option<String>,
}

impl AfterRelativeTime {
    pub fn unit(&self) -> Option<DurationUnit> {
        self.duration_unit.as_deref()?.parse().ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NextRelativeTime {
    pub index: Option<u32>,
    pub index_unit: Option<String>,
}

impl NextRelativeTime {
    pub fn unit(&self) -> Option<NextUnit> {
        self.index_unit.as_deref()?.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelativeTimeKind {
    After(AfterRelativeTime),
    Next(NextRelativeTime),
}

impl RelativeTimeKind {
    pub fn discriminator(&self) -> &'static str {
        match self {
            RelativeTimeKind::After(_) => AFTER,
            RelativeTimeKind::Next(_) => NEXT,
        }
    }
}

type VariantConstructor = fn() -> RelativeTimeKind;

fn new_after() -> RelativeTimeKind {
    RelativeTimeKind::After(AfterRelativeTime::default())
}

fn new_next() -> RelativeTimeKind {
    RelativeTimeKind::Next(NextRelativeTime::default())
}

/// Discriminator table used by the polymorphic readers.
const VARIANTS: [(&str, VariantConstructor); 2] = [(AFTER, new_after), (NEXT, new_next)];

fn variant_for(discriminator: &str) -> Result<RelativeTimeKind, RelativeTimeError> {
    VARIANTS
        .iter()
        .find(|(name, _)| *name == discriminator)
        .map(|(_, constructor)| constructor())
        .ok_or_else(|| RelativeTimeError::UnsupportedDiscriminator(discriminator.to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRelativeTime", into = "RawRelativeTime")]
pub struct RelativeTime {
    pub kind: RelativeTimeKind,
    pub base: Option<Binding>,
    pub at: Option<TimeInDay>,
}

impl RelativeTime {
    pub fn after(duration: i64, unit: DurationUnit) -> Self {
        Self::from_kind(RelativeTimeKind::After(AfterRelativeTime {
            duration: Some(duration),
            duration_unit: Some(unit.as_str().to_string()),
        }))
    }

    pub fn next(unit: NextUnit, index: u32) -> Self {
        Self::from_kind(RelativeTimeKind::Next(NextRelativeTime {
            index: Some(index),
            index_unit: Some(unit.as_str().to_string()),
        }))
    }

    pub fn seconds(seconds: i64) -> Self {
        Self::after(seconds, DurationUnit::Seconds)
    }

    pub fn minutes(minutes: i64) -> Self {
        Self::after(minutes, DurationUnit::Minutes)
    }

    pub fn hours(hours: i64) -> Self {
        Self::after(hours, DurationUnit::Hours)
    }

    pub fn days(days: i64) -> Self {
        Self::after(days, DurationUnit::Days)
    }

    pub fn weeks(weeks: i64) -> Self {
        Self::after(weeks, DurationUnit::Weeks)
    }

    pub fn months(months: i64) -> Self {
        Self::after(months, DurationUnit::Months)
    }

    pub fn years(years: i64) -> Self {
        Self::after(years, DurationUnit::Years)
    }

    pub fn from_kind(kind: RelativeTimeKind) -> Self {
        Self { kind, base: None, at: None }
    }

    pub fn at(mut self, hour: u32, minutes: u32) -> Self {
        self.at = Some(TimeInDay::new(hour, minutes));
        self
    }

    pub fn base(mut self, base: Binding) -> Self {
        self.base = Some(base);
        self
    }

    /// Parses the legacy `"<integer> <unit>"` form, e.g. `"5 days"` or `"-2 hours"`.
    pub fn parse_backwards_compatible_string(value: &str) -> Result<Self, RelativeTimeError> {
        let parts: Vec<&str> = value.trim().split(' ').collect();
        if parts.len() != 2 {
            return Err(RelativeTimeError::InvalidArgument(format!(
                "Cannot parse relative time from value '{}'",
                value
            )));
        }
        let duration: i64 = parts[0]
            .parse()
            .map_err(|_| RelativeTimeError::InvalidArgument(format!("Invalid time value in relative time '{}'", value)))?;

        let relative_time = Self::from_kind(RelativeTimeKind::After(AfterRelativeTime {
            duration: Some(duration),
            duration_unit: Some(parts[1].to_string()),
        }));
        if !relative_time.valid() {
            return Err(RelativeTimeError::InvalidArgument(format!(
                "Invalid time unit in relative time '{}'",
                value
            )));
        }
        Ok(relative_time)
    }

    /// True when the unit is recognised, the variant's amount is present and in
    /// range, and any time-of-day is within a day.
    pub fn valid(&self) -> bool {
        let at_valid = self.at.is_none_or(|at| at.is_valid());
        let kind_valid = match &self.kind {
            RelativeTimeKind::After(after) => after.duration.is_some() && after.unit().is_some(),
            RelativeTimeKind::Next(next) => match (next.unit(), next.index) {
                (Some(unit), Some(index)) => unit.index_range().contains(&index),
                _ => false,
            },
        };
        at_valid && kind_valid
    }

    /// Resolves this expression against `base`.
    ///
    /// Callers are expected to check [`valid`](Self::valid) at definition time;
    /// resolving an invalid expression fails with [`RelativeTimeError::Invalid`].
    pub fn resolve(&self, base: NaiveDateTime) -> Result<NaiveDateTime, RelativeTimeError> {
        if !self.valid() {
            return Err(RelativeTimeError::Invalid(self.to_string()));
        }
        let out_of_range = || RelativeTimeError::OutOfRange(self.to_string());

        let resolved = match &self.kind {
            RelativeTimeKind::After(after) => match (after.unit(), after.duration) {
                (Some(unit), Some(duration)) => unit.add_to(base, duration),
                _ => None,
            },
            RelativeTimeKind::Next(next) => match (next.unit(), next.index) {
                (Some(unit), Some(index)) => unit.next_after(base, index),
                _ => None,
            },
        }
        .ok_or_else(out_of_range)?;

        match self.at {
            Some(at) => resolved.date().and_hms_opt(at.hour, at.minutes, 0).ok_or_else(out_of_range),
            None => Ok(resolved),
        }
    }

    /// Polymorphic JSON read. `Ok(None)` for `null` or when neither a discriminator nor the legacy field is present.
    pub fn read_json(value: &JsonValue) -> Result<Option<Self>, RelativeTimeError> {
        if value.is_null() {
            return Ok(None);
        }
        let raw: RawRelativeTime = serde_json::from_value(value.clone())
            .map_err(|error| RelativeTimeError::InvalidArgument(format!("malformed relative time: {}", error)))?;
        Self::decode(raw)
    }

    /// Polymorphic attribute read. `Ok(None)` when neither `type` nor the legacy `after` attribute is present.
    pub fn read_attributes(reader: &dyn AttributeReader) -> Result<Option<Self>, RelativeTimeError> {
        let raw = RawRelativeTime {
            kind: reader.read_string("type").map(str::to_string),
            after: reader.read_string(AFTER).map(str::to_string),
            duration: read_number_attribute(reader, "duration")?,
            duration_unit: reader.read_string("durationUnit").map(str::to_string),
            index: read_number_attribute(reader, "index")?,
            index_unit: reader.read_string("indexUnit").map(str::to_string),
            base: reader.read_binding("base"),
            at: reader.read_string("at").map(str::to_string),
        };
        Self::decode(raw)
    }

    pub fn write_attributes(&self, writer: &mut dyn AttributeWriter) {
        writer.write_string("type", self.kind.discriminator().to_string());
        match &self.kind {
            RelativeTimeKind::After(after) => {
                if let Some(duration) = after.duration {
                    writer.write_string("duration", duration.to_string());
                }
                if let Some(unit) = &after.duration_unit {
                    writer.write_string("durationUnit", unit.clone());
                }
            }
            RelativeTimeKind::Next(next) => {
                if let Some(index) = next.index {
                    writer.write_string("index", index.to_string());
                }
                if let Some(unit) = &next.index_unit {
                    writer.write_string("indexUnit", unit.clone());
                }
            }
        }
        writer.write_binding("base", self.base.as_ref());
        if let Some(at) = self.at {
            writer.write_string("at", at.to_string());
        }
    }

    fn decode(raw: RawRelativeTime) -> Result<Option<Self>, RelativeTimeError> {
        let Some(discriminator) = raw.kind.as_deref() else {
            return raw.after.as_deref().map(Self::parse_backwards_compatible_string).transpose();
        };

        let mut kind = variant_for(discriminator)?;
        match &mut kind {
            RelativeTimeKind::After(after) => {
                after.duration = raw.duration;
                after.duration_unit = raw.duration_unit;
            }
            RelativeTimeKind::Next(next) => {
                next.index = raw.index;
                next.index_unit = raw.index_unit;
            }
        }
        let at = match raw.at.as_deref() {
            Some(text) => TimeInDay::parse_attribute(text)?,
            None => None,
        };

        Ok(Some(Self { kind, base: raw.base, at }))
    }
}

fn read_number_attribute<T: FromStr>(reader: &dyn AttributeReader, name: &str) -> Result<Option<T>, RelativeTimeError> {
    reader
        .read_string(name)
        .map(|text| {
            text.trim()
                .parse()
                .map_err(|_| RelativeTimeError::InvalidArgument(format!("attribute '{}' must be an integer, but was '{}'", name, text)))
        })
        .transpose()
}

impl fmt::Display for RelativeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let missing = "?";
        match &self.kind {
            RelativeTimeKind::After(after) => {
                match after.duration {
                    Some(duration) => write!(f, "{}", duration)?,
                    None => f.write_str(missing)?,
                }
                write!(f, " {}", after.duration_unit.as_deref().unwrap_or(missing))?;
            }
            RelativeTimeKind::Next(next) => {
                write!(f, "next {}", next.index_unit.as_deref().unwrap_or(missing))?;
                match next.index {
                    Some(index) => write!(f, " {}", index)?,
                    None => write!(f, " {}", missing)?,
                }
            }
        }
        if let Some(at) = self.at {
            write!(f, " at {}", at)?;
        }
        Ok(())
    }
}

/// Flat wire shape shared by every variant.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRelativeTime {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    index_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base: Option<Binding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    at: Option<String>,
}

impl TryFrom<RawRelativeTime> for RelativeTime {
    type Error = RelativeTimeError;

    fn try_from(raw: RawRelativeTime) -> Result<Self, Self::Error> {
        RelativeTime::decode(raw)?
            .ok_or_else(|| RelativeTimeError::InvalidArgument("relative time requires a 'type' or a legacy 'after' value".to_string()))
    }
}

impl From<RelativeTime> for RawRelativeTime {
    fn from(relative_time: RelativeTime) -> Self {
        let mut raw = RawRelativeTime {
            kind: Some(relative_time.kind.discriminator().to_string()),
            base: relative_time.base,
            at: relative_time.at.map(|at| at.to_string()),
            ..RawRelativeTime::default()
        };
        match relative_time.kind {
            RelativeTimeKind::After(after) => {
                raw.duration = after.duration;
                raw.duration_unit = after.duration_unit;
            }
            RelativeTimeKind::Next(next) => {
                raw.index = next.index;
                raw.index_unit = next.index_unit;
            }
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AttributeMap;
    use serde_json::json;

    fn datetime(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").expect("valid datetime literal")
    }

    #[test]
    fn parses_legacy_string() {
        let relative_time = RelativeTime::parse_backwards_compatible_string("5 days").expect("parse");
        assert!(relative_time.valid());
        match &relative_time.kind {
            RelativeTimeKind::After(after) => {
                assert_eq!(after.duration, Some(5));
                assert_eq!(after.duration_unit.as_deref(), Some("days"));
                assert_eq!(after.unit(), Some(DurationUnit::Days));
            }
            other => panic!("expected after variant, got {:?}", other),
        }
    }

    #[test]
    fn legacy_string_accepts_signs_and_surrounding_whitespace() {
        let negative = RelativeTime::parse_backwards_compatible_string("  -2 hours ").expect("parse");
        assert_eq!(negative, RelativeTime::hours(-2));
        let positive = RelativeTime::parse_backwards_compatible_string("+3 weeks").expect("parse");
        assert_eq!(positive, RelativeTime::weeks(3));
    }

    #[test]
    fn legacy_string_rejects_malformed_input() {
        for input in ["5", "five days", "5 fortnights", "5  days", "1 2 3", ""] {
            let error = RelativeTime::parse_backwards_compatible_string(input).expect_err(input);
            assert!(matches!(error, RelativeTimeError::InvalidArgument(_)), "{input}: {error:?}");
        }
        let error = RelativeTime::parse_backwards_compatible_string("five days").unwrap_err();
        assert!(error.to_string().contains("five days"));
    }

    #[test]
    fn month_arithmetic_clamps_to_month_end() {
        let plus_one_month = RelativeTime::months(1);
        assert_eq!(plus_one_month.resolve(datetime("2023-01-31 08:15:00")).unwrap(), datetime("2023-02-28 08:15:00"));
        assert_eq!(plus_one_month.resolve(datetime("2024-01-31 08:15:00")).unwrap(), datetime("2024-02-29 08:15:00"));

        let minus_one_year = RelativeTime::years(-1);
        assert_eq!(minus_one_year.resolve(datetime("2024-02-29 00:00:00")).unwrap(), datetime("2023-02-28 00:00:00"));
    }

    #[test]
    fn fixed_units_add_exact_lengths() {
        let base = datetime("2024-03-10 23:30:00");
        assert_eq!(RelativeTime::seconds(45).resolve(base).unwrap(), datetime("2024-03-10 23:30:45"));
        assert_eq!(RelativeTime::minutes(45).resolve(base).unwrap(), datetime("2024-03-11 00:15:00"));
        assert_eq!(RelativeTime::hours(-24).resolve(base).unwrap(), datetime("2024-03-09 23:30:00"));
        assert_eq!(RelativeTime::weeks(2).resolve(base).unwrap(), datetime("2024-03-24 23:30:00"));
    }

    #[test]
    fn at_replaces_time_of_day_after_arithmetic() {
        let relative_time = RelativeTime::days(2).at(9, 5);
        assert_eq!(relative_time.resolve(datetime("2024-01-30 17:45:12")).unwrap(), datetime("2024-02-01 09:05:00"));
    }

    #[test]
    fn next_day_in_week_never_returns_base() {
        let next_monday = RelativeTime::next(NextUnit::DayInWeek, 1);
        // 2024-01-01 is a Monday.
        assert_eq!(next_monday.resolve(datetime("2024-01-01 10:00:00")).unwrap(), datetime("2024-01-08 10:00:00"));
        assert_eq!(next_monday.resolve(datetime("2024-01-03 10:00:00")).unwrap(), datetime("2024-01-08 10:00:00"));
        assert_eq!(next_monday.at(9, 0).resolve(datetime("2024-01-07 23:00:00")).unwrap(), datetime("2024-01-08 09:00:00"));
    }

    #[test]
    fn next_hour_in_day_is_strictly_after_base() {
        let next_nine = RelativeTime::next(NextUnit::HourInDay, 9);
        assert_eq!(next_nine.resolve(datetime("2024-05-01 09:00:00")).unwrap(), datetime("2024-05-02 09:00:00"));
        assert_eq!(next_nine.resolve(datetime("2024-05-01 08:59:59")).unwrap(), datetime("2024-05-01 09:00:00"));
    }

    #[test]
    fn next_day_in_month_skips_short_months() {
        let next_31st = RelativeTime::next(NextUnit::DayInMonth, 31);
        assert_eq!(next_31st.resolve(datetime("2024-01-31 12:00:00")).unwrap(), datetime("2024-03-31 12:00:00"));
        let next_15th = RelativeTime::next(NextUnit::DayInMonth, 15);
        assert_eq!(next_15th.resolve(datetime("2024-12-15 12:00:00")).unwrap(), datetime("2025-01-15 12:00:00"));
    }

    #[test]
    fn next_month_in_year_starts_the_month() {
        let next_march = RelativeTime::next(NextUnit::MonthInYear, 3);
        assert_eq!(next_march.resolve(datetime("2024-02-10 07:00:00")).unwrap(), datetime("2024-03-01 07:00:00"));
        assert_eq!(next_march.resolve(datetime("2024-03-01 07:00:00")).unwrap(), datetime("2025-03-01 07:00:00"));
    }

    #[test]
    fn invalid_expressions_are_rejected_before_resolution() {
        let out_of_range = RelativeTime::next(NextUnit::DayInWeek, 8);
        assert!(!out_of_range.valid());
        assert!(matches!(
            out_of_range.resolve(datetime("2024-01-01 00:00:00")),
            Err(RelativeTimeError::Invalid(_))
        ));
        assert!(!RelativeTime::days(1).at(24, 0).valid());
        assert!(!RelativeTime::from_kind(RelativeTimeKind::After(AfterRelativeTime::default())).valid());
    }

    #[test]
    fn time_in_day_parsing_is_lenient_about_missing_minutes() {
        assert_eq!(TimeInDay::parse_attribute("9:").unwrap(), None);
        assert_eq!(TimeInDay::parse_attribute("9").unwrap(), None);
        assert_eq!(TimeInDay::parse_attribute("9:30").unwrap(), Some(TimeInDay::new(9, 30)));
        assert_eq!(TimeInDay::parse_attribute("17:05").unwrap(), Some(TimeInDay::new(17, 5)));
        assert!(TimeInDay::parse_attribute("nine:30").is_err());
        assert!(TimeInDay::parse_attribute(":30").is_err());
    }

    #[test]
    fn json_read_dispatches_on_discriminator() {
        let after = RelativeTime::read_json(&json!({
            "type": "after", "duration": 3, "durationUnit": "days",
            "base": {"expression": "invoiceDate"}, "at": "9:30"
        }))
        .unwrap()
        .expect("present");
        assert_eq!(after, RelativeTime::days(3).base(Binding::expression("invoiceDate")).at(9, 30));

        let next = RelativeTime::read_json(&json!({"type": "next", "index": 1, "indexUnit": "dayInWeek", "at": "9:"}))
            .unwrap()
            .expect("present");
        assert_eq!(next, RelativeTime::next(NextUnit::DayInWeek, 1));
    }

    #[test]
    fn json_read_falls_back_to_legacy_field() {
        let legacy = RelativeTime::read_json(&json!({"after": "5 days"})).unwrap();
        assert_eq!(legacy, Some(RelativeTime::days(5)));
        assert_eq!(RelativeTime::read_json(&json!({})).unwrap(), None);
        assert_eq!(RelativeTime::read_json(&json!(null)).unwrap(), None);
    }

    #[test]
    fn unknown_discriminator_is_reported() {
        let error = RelativeTime::read_json(&json!({"type": "before", "duration": 1})).unwrap_err();
        assert_eq!(error, RelativeTimeError::UnsupportedDiscriminator("before".to_string()));
    }

    #[test]
    fn serde_uses_flat_wire_shape() {
        let relative_time = RelativeTime::months(1).at(8, 0);
        let encoded = serde_json::to_value(&relative_time).expect("serialize");
        assert_eq!(encoded, json!({"type": "after", "duration": 1, "durationUnit": "months", "at": "8:00"}));
        let decoded: RelativeTime = serde_json::from_value(encoded).expect("deserialize");
        assert_eq!(decoded, relative_time);

        let legacy: RelativeTime = serde_yaml::from_str("after: 2 weeks").expect("legacy yaml");
        assert_eq!(legacy, RelativeTime::weeks(2));
    }

    #[test]
    fn attributes_round_trip() {
        let relative_time = RelativeTime::next(NextUnit::MonthInYear, 6).base(Binding::expression("contractStart")).at(7, 45);
        let mut attributes = AttributeMap::new();
        relative_time.write_attributes(&mut attributes);

        assert_eq!(attributes.read_string("type"), Some("next"));
        assert_eq!(attributes.read_string("base"), Some("${{ contractStart }}"));
        assert_eq!(attributes.read_string("at"), Some("7:45"));
        assert_eq!(RelativeTime::read_attributes(&attributes).unwrap(), Some(relative_time));
    }

    #[test]
    fn attribute_read_handles_legacy_and_absent_values() {
        let legacy = AttributeMap::new().with("after", "10 minutes");
        assert_eq!(RelativeTime::read_attributes(&legacy).unwrap(), Some(RelativeTime::minutes(10)));
        assert_eq!(RelativeTime::read_attributes(&AttributeMap::new()).unwrap(), None);

        let bad_duration = AttributeMap::new().with("type", "after").with("duration", "soon");
        assert!(matches!(
            RelativeTime::read_attributes(&bad_duration),
            Err(RelativeTimeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn display_matches_legacy_form() {
        assert_eq!(RelativeTime::days(5).to_string(), "5 days");
        assert_eq!(RelativeTime::days(5).at(9, 30).to_string(), "5 days at 9:30");
        assert_eq!(RelativeTime::next(NextUnit::DayInWeek, 1).to_string(), "next dayInWeek 1");
    }
}
