use crate::{NoticeContainer, Timetable, ValidationFlag, ValidationNotice, Validator};

/// Compares the supplied travel time with the gap between departure and
/// arrival; only records carrying a travel time and two valid times are checked.
#[derive(Debug)]
pub struct DurationMismatchValidator {
    tolerance_minutes: i64,
}

impl DurationMismatchValidator {
    pub fn new(tolerance_minutes: i64) -> Self {
        Self { tolerance_minutes }
    }
}

impl Default for DurationMismatchValidator {
    fn default() -> Self {
        Self::new(crate::options::DEFAULT_DURATION_TOLERANCE_MINUTES)
    }
}

impl Validator for DurationMismatchValidator {
    fn name(&self) -> &'static str {
        "duration_mismatch"
    }

    fn validate(&self, timetable: &Timetable, notices: &mut NoticeContainer) {
        for (index, record) in timetable.records.iter().enumerate() {
            let (Some(travel), Some(arrival), Some(departure)) = (
                record.travel_time_minutes,
                record.arrival_time.time(),
                record.departure_time.time(),
            ) else {
                continue;
            };
            let elapsed = arrival.minutes_since_midnight() - departure.minutes_since_midnight();
            if elapsed.abs_diff(travel) > self.tolerance_minutes.unsigned_abs() {
                notices.push(
                    ValidationNotice::flagged(
                        ValidationFlag::DurationMismatch,
                        timetable,
                        index,
                        "travel_time_minutes",
                        "travel time disagrees with arrival and departure times",
                    )
                    .with_context_field("elapsedMinutes", elapsed)
                    .with_context_field("travelTimeMinutes", travel)
                    .with_context_field("toleranceMinutes", self.tolerance_minutes),
                );
            }
        }
    }
}
