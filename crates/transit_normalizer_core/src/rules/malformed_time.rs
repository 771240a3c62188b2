use transit_norm_model::{CanonicalField, TimeValue};

use crate::{NoticeContainer, Timetable, ValidationFlag, ValidationNotice, Validator};

/// Flags arrival or departure cells that do not hold a valid time of day,
/// whether the cell was unreadable or empty.
#[derive(Debug, Default)]
pub struct MalformedTimeValidator;

impl Validator for MalformedTimeValidator {
    fn name(&self) -> &'static str {
        "malformed_time"
    }

    fn validate(&self, timetable: &Timetable, notices: &mut NoticeContainer) {
        for (index, record) in timetable.records.iter().enumerate() {
            let cells = [
                (CanonicalField::ArrivalTime, &record.arrival_time),
                (CanonicalField::DepartureTime, &record.departure_time),
            ];
            for (field, value) in cells {
                let raw = match value {
                    TimeValue::Time(_) => continue,
                    TimeValue::Missing => "",
                    TimeValue::Unparsable(raw) => raw.as_str(),
                };
                notices.push(
                    ValidationNotice::flagged(
                        ValidationFlag::MalformedTime,
                        timetable,
                        index,
                        field.name(),
                        format!("{} is not a valid HH:MM time", field),
                    )
                    .with_context_field("fieldValue", raw),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{record, timetable};

    #[test]
    fn flags_unparsable_and_empty_times() {
        let timetable = timetable(vec![
            record("1", "A", "25:99", "09:50"),
            record("1", "B", "09:00", "9 o'clock"),
            record("1", "C", "", "09:50"),
            record("1", "D", "10:00", "09:50"),
        ]);
        let mut notices = NoticeContainer::new();
        MalformedTimeValidator.validate(&timetable, &mut notices);

        let located: Vec<_> = notices
            .iter()
            .map(|notice| (notice.record_index, notice.field.as_deref()))
            .collect();
        assert_eq!(
            located,
            vec![
                (Some(0), Some("arrival_time")),
                (Some(1), Some("departure_time")),
                (Some(2), Some("arrival_time")),
            ]
        );
        let first = notices.iter().next().unwrap();
        assert_eq!(first.context["fieldValue"], "25:99");
        let empty = notices.iter().nth(2).unwrap();
        assert_eq!(empty.context["fieldValue"], "");
    }
}
