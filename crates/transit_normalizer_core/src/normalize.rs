use chrono::{NaiveDateTime, NaiveTime};
use compact_str::CompactString;
use transit_norm_model::{TimeOfDay, TimeValue, TimetableRecord};

use crate::reconcile::{Reconciled, ReconciledRecord};
use crate::timetable::Timetable;
use crate::{NoticeContainer, NoticeSeverity, ValidationNotice};

/// Time-only formats tried after strict `HH:MM`, in order.
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%I:%M %p", "%I:%M%p", "%I:%M:%S %p"];

/// Date-time formats whose time part is kept.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Coerces a raw time cell into canonical form. Total: every input maps to a
/// time, the missing value, or an unparsable marker; nothing here fails.
pub fn normalize_time(raw: Option<&str>) -> TimeValue {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return TimeValue::Missing;
    };

    if let Ok(time) = TimeOfDay::parse(raw) {
        return TimeValue::Time(time);
    }

    let upper = raw.to_ascii_uppercase();
    for format in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(&upper, format) {
            return TimeValue::Time(time.into());
        }
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(date_time) = NaiveDateTime::parse_from_str(raw, format) {
            return TimeValue::Time(date_time.time().into());
        }
    }

    TimeValue::Unparsable(raw.to_string())
}

/// Largest travel time, in either direction, still taken at face value.
pub const MAX_TRAVEL_TIME_MINUTES: i64 = 7 * 24 * 60;

/// Whole minutes from a travel-time cell; accepts integers and integral
/// decimals such as `12.0` within `MAX_TRAVEL_TIME_MINUTES`.
pub fn parse_travel_time(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let minutes = match trimmed.parse::<i64>() {
        Ok(minutes) => minutes,
        Err(_) => match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e12 => {
                value as i64
            }
            _ => return None,
        },
    };
    (minutes.unsigned_abs() <= MAX_TRAVEL_TIME_MINUTES as u64).then_some(minutes)
}

pub fn normalize_record(record: &ReconciledRecord) -> TimetableRecord {
    TimetableRecord {
        route_id: record.route_id.as_deref().map(CompactString::from),
        stop_name: record.stop_name.as_deref().map(CompactString::from),
        arrival_time: normalize_time(record.arrival_time.as_deref()),
        departure_time: normalize_time(record.departure_time.as_deref()),
        travel_time_minutes: record
            .travel_time_minutes
            .as_deref()
            .and_then(parse_travel_time),
    }
}

/// Builds the canonical timetable. Travel-time cells that are not plausible
/// whole minutes are dropped with an `invalid_travel_time` notice.
pub fn normalize(reconciled: &Reconciled, notices: &mut NoticeContainer) -> Timetable {
    let records: Vec<TimetableRecord> = reconciled.records.iter().map(normalize_record).collect();
    let timetable = Timetable {
        files: reconciled.files.clone(),
        records,
        origins: reconciled.origins.clone(),
    };

    for (index, (raw, record)) in reconciled.records.iter().zip(&timetable.records).enumerate() {
        if let (Some(value), None) = (raw.travel_time_minutes.as_deref(), record.travel_time_minutes) {
            notices.push(invalid_travel_time_notice(&timetable, index, value));
        }
    }
    timetable
}

fn invalid_travel_time_notice(timetable: &Timetable, index: usize, value: &str) -> ValidationNotice {
    let mut notice = ValidationNotice::new(
        "invalid_travel_time",
        NoticeSeverity::Warning,
        "travel time is not a plausible whole number of minutes and is ignored",
    );
    notice.record_index = Some(index);
    notice.set_location(
        timetable.file_name(index),
        "travel_time_minutes",
        timetable.row_number(index),
    );
    notice.insert_context_field("csvRowNumber", timetable.row_number(index));
    notice.insert_context_field("fieldValue", value);
    notice.insert_context_field("filename", timetable.file_name(index));
    notice
}
