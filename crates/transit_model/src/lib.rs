use std::fmt;

use chrono::{NaiveTime, Timelike};
use compact_str::CompactString;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Text written for a canonical field whose value is unknown.
pub const MISSING_VALUE: &str = "";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("invalid time format: {0}")]
    InvalidFormat(String),
    #[error("invalid time value: {0}")]
    InvalidValue(String),
}

/// A wall-clock time of day with minute precision, always within `00:00..=23:59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeOfDay {
    minutes: u16,
}

impl TimeOfDay {
    pub fn from_hm(hours: u32, minutes: u32) -> Option<Self> {
        if hours > 23 || minutes > 59 {
            return None;
        }
        Some(Self {
            minutes: (hours * 60 + minutes) as u16,
        })
    }

    /// Strict `HH:MM` parsing: exactly two `:`-separated numeric groups,
    /// hour in 0..=23 and minute in 0..=59.
    pub fn parse(value: &str) -> Result<Self, TimeParseError> {
        let trimmed = value.trim();
        let mut parts = trimmed.split(':');
        let (Some(hours), Some(minutes), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(TimeParseError::InvalidFormat(value.to_string()));
        };
        if hours.is_empty()
            || minutes.len() != 2
            || !hours.chars().all(|ch| ch.is_ascii_digit())
            || !minutes.chars().all(|ch| ch.is_ascii_digit())
        {
            return Err(TimeParseError::InvalidFormat(value.to_string()));
        }

        let hours: u32 = hours
            .parse()
            .map_err(|_| TimeParseError::InvalidFormat(value.to_string()))?;
        let minutes: u32 = minutes
            .parse()
            .map_err(|_| TimeParseError::InvalidFormat(value.to_string()))?;

        Self::from_hm(hours, minutes).ok_or_else(|| TimeParseError::InvalidValue(value.to_string()))
    }

    pub fn minutes_since_midnight(&self) -> i64 {
        i64::from(self.minutes)
    }

    pub fn hours(&self) -> u32 {
        u32::from(self.minutes / 60)
    }

    pub fn minutes(&self) -> u32 {
        u32::from(self.minutes % 60)
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        Self {
            minutes: (time.hour() * 60 + time.minute()) as u16,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours(), self.minutes())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TimeOfDayVisitor;

        impl<'de> Visitor<'de> for TimeOfDayVisitor {
            type Value = TimeOfDay;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a time of day in HH:MM format")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<TimeOfDay, E> {
                TimeOfDay::parse(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TimeOfDayVisitor)
    }
}

/// A normalized arrival or departure time.
///
/// `Unparsable` keeps the rejected source text so rules can tell a malformed
/// cell apart from an empty one; everywhere a canonical value is rendered it
/// reads as missing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TimeValue {
    Time(TimeOfDay),
    #[default]
    Missing,
    Unparsable(String),
}

impl TimeValue {
    /// The canonical value: a time, or `None` for the missing value.
    pub fn time(&self) -> Option<TimeOfDay> {
        match self {
            TimeValue::Time(time) => Some(*time),
            TimeValue::Missing | TimeValue::Unparsable(_) => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.time().is_none()
    }

    pub fn is_unparsable(&self) -> bool {
        matches!(self, TimeValue::Unparsable(_))
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.time() {
            Some(time) => time.fmt(f),
            None => f.write_str(MISSING_VALUE),
        }
    }
}

impl Serialize for TimeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    RouteId,
    StopName,
    ArrivalTime,
    DepartureTime,
    TravelTimeMinutes,
}

impl CanonicalField {
    /// The four fields every record carries, in output column order.
    pub const SCHEMA: [CanonicalField; 4] = [
        CanonicalField::RouteId,
        CanonicalField::StopName,
        CanonicalField::ArrivalTime,
        CanonicalField::DepartureTime,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::RouteId => "route_id",
            CanonicalField::StopName => "stop_name",
            CanonicalField::ArrivalTime => "arrival_time",
            CanonicalField::DepartureTime => "departure_time",
            CanonicalField::TravelTimeMinutes => "travel_time_minutes",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "route_id" => Some(CanonicalField::RouteId),
            "stop_name" => Some(CanonicalField::StopName),
            "arrival_time" => Some(CanonicalField::ArrivalTime),
            "departure_time" => Some(CanonicalField::DepartureTime),
            "travel_time_minutes" => Some(CanonicalField::TravelTimeMinutes),
            _ => None,
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key used to detect duplicate records: `(route_id, stop_name, arrival_time, departure_time)`.
pub type NaturalKey<'a> = (
    Option<&'a str>,
    Option<&'a str>,
    Option<TimeOfDay>,
    Option<TimeOfDay>,
);

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TimetableRecord {
    pub route_id: Option<CompactString>,
    pub stop_name: Option<CompactString>,
    pub arrival_time: TimeValue,
    pub departure_time: TimeValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_time_minutes: Option<i64>,
}

impl TimetableRecord {
    pub fn natural_key(&self) -> NaturalKey<'_> {
        (
            self.route_id.as_deref(),
            self.stop_name.as_deref(),
            self.arrival_time.time(),
            self.departure_time.time(),
        )
    }

    pub fn is_missing(&self, field: CanonicalField) -> bool {
        match field {
            CanonicalField::RouteId => self.route_id.is_none(),
            CanonicalField::StopName => self.stop_name.is_none(),
            CanonicalField::ArrivalTime => self.arrival_time.is_missing(),
            CanonicalField::DepartureTime => self.departure_time.is_missing(),
            CanonicalField::TravelTimeMinutes => self.travel_time_minutes.is_none(),
        }
    }

    /// The four canonical columns as output text.
    pub fn to_row(&self) -> [String; 4] {
        [
            self.route_id.as_deref().unwrap_or(MISSING_VALUE).to_string(),
            self.stop_name.as_deref().unwrap_or(MISSING_VALUE).to_string(),
            self.arrival_time.to_string(),
            self.departure_time.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_strict_hh_mm() {
        let time = TimeOfDay::parse("09:05").unwrap();
        assert_eq!(time.minutes_since_midnight(), 545);
        assert_eq!(time.to_string(), "09:05");
        assert_eq!(TimeOfDay::parse(" 7:30 ").unwrap().to_string(), "07:30");
    }

    #[test]
    fn rejects_out_of_range_and_malformed_times() {
        assert_eq!(
            TimeOfDay::parse("25:99"),
            Err(TimeParseError::InvalidValue("25:99".to_string()))
        );
        assert_eq!(
            TimeOfDay::parse("24:00"),
            Err(TimeParseError::InvalidValue("24:00".to_string()))
        );
        for value in ["09:05:00", "0905", "9:5", "ab:cd", ":30", "-1:30", ""] {
            assert!(
                matches!(TimeOfDay::parse(value), Err(TimeParseError::InvalidFormat(_))),
                "{value:?} should be rejected as malformed"
            );
        }
    }

    #[test]
    fn unparsable_time_reads_as_missing() {
        let value = TimeValue::Unparsable("noon-ish".to_string());
        assert!(value.is_missing());
        assert!(value.is_unparsable());
        assert_eq!(value.to_string(), MISSING_VALUE);
        assert_eq!(serde_json::to_string(&value).unwrap(), "\"\"");
    }

    #[test]
    fn natural_key_ignores_travel_time_and_raw_rejects() {
        let first = TimetableRecord {
            route_id: Some("42B".into()),
            stop_name: Some("Central".into()),
            arrival_time: TimeValue::Unparsable("25:99".to_string()),
            departure_time: TimeValue::Time(TimeOfDay::from_hm(9, 5).unwrap()),
            travel_time_minutes: Some(10),
        };
        let second = TimetableRecord {
            arrival_time: TimeValue::Missing,
            travel_time_minutes: None,
            ..first.clone()
        };
        assert_eq!(first.natural_key(), second.natural_key());
    }

    #[test]
    fn round_trips_time_of_day_through_serde() {
        let time: TimeOfDay = serde_json::from_str("\"23:59\"").unwrap();
        assert_eq!(time, TimeOfDay::from_hm(23, 59).unwrap());
        assert!(serde_json::from_str::<TimeOfDay>("\"23:60\"").is_err());
    }
}
