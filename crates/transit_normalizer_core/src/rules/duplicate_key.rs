use crate::dedup::find_duplicates;
use crate::{NoticeContainer, Timetable, ValidationFlag, ValidationNotice, Validator};

#[derive(Debug, Default)]
pub struct DuplicateKeyValidator;

impl Validator for DuplicateKeyValidator {
    fn name(&self) -> &'static str {
        "duplicate_key"
    }

    fn validate(&self, timetable: &Timetable, notices: &mut NoticeContainer) {
        for duplicate in find_duplicates(&timetable.records) {
            notices.push(
                ValidationNotice::flagged(
                    ValidationFlag::Duplicate,
                    timetable,
                    duplicate.index,
                    "route_id",
                    "record repeats an earlier route_id, stop_name, arrival_time and departure_time",
                )
                .with_context_field("prevCsvRowNumber", timetable.row_number(duplicate.first_index))
                .with_context_field("prevFilename", timetable.file_name(duplicate.first_index)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{record, timetable};

    #[test]
    fn flags_later_occurrences_with_reference_to_the_first() {
        let timetable = timetable(vec![
            record("42B", "Central", "09:15", "09:05"),
            record("42B", "Central", "09:15", "09:05"),
        ]);
        let mut notices = NoticeContainer::new();
        DuplicateKeyValidator.validate(&timetable, &mut notices);

        assert_eq!(notices.len(), 1);
        let notice = notices.iter().next().unwrap();
        assert_eq!(notice.record_index, Some(1));
        assert_eq!(notice.context["prevCsvRowNumber"], 2);
        assert_eq!(notice.context["csvRowNumber"], 3);
    }
}
