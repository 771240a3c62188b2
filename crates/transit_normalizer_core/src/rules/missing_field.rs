use transit_norm_model::CanonicalField;

use crate::{NoticeContainer, Timetable, ValidationFlag, ValidationNotice, Validator};

#[derive(Debug, Default)]
pub struct MissingFieldValidator;

impl Validator for MissingFieldValidator {
    fn name(&self) -> &'static str {
        "missing_field"
    }

    fn validate(&self, timetable: &Timetable, notices: &mut NoticeContainer) {
        for (index, record) in timetable.records.iter().enumerate() {
            for field in CanonicalField::SCHEMA {
                if record.is_missing(field) {
                    notices.push(ValidationNotice::flagged(
                        ValidationFlag::MissingField,
                        timetable,
                        index,
                        field.name(),
                        format!("{} has no value", field),
                    ));
                }
            }
        }
    }
}
