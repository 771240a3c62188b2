use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Timetable;

pub const NOTICE_CODE_RUNTIME_EXCEPTION: &str = "runtime_exception_in_validator_error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeSeverity {
    Error,
    Warning,
    Info,
}

/// Row-level annotation produced by the validation rules. A record may carry
/// any number of flags; flags never change the record itself.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFlag {
    MissingField,
    MalformedTime,
    ArrivalBeforeDeparture,
    DurationMismatch,
    Duplicate,
}

impl ValidationFlag {
    pub const ALL: [ValidationFlag; 5] = [
        ValidationFlag::MissingField,
        ValidationFlag::MalformedTime,
        ValidationFlag::ArrivalBeforeDeparture,
        ValidationFlag::DurationMismatch,
        ValidationFlag::Duplicate,
    ];

    pub fn code(self) -> &'static str {
        match self {
            ValidationFlag::MissingField => "missing_field",
            ValidationFlag::MalformedTime => "malformed_time",
            ValidationFlag::ArrivalBeforeDeparture => "arrival_before_departure",
            ValidationFlag::DurationMismatch => "duration_mismatch",
            ValidationFlag::Duplicate => "duplicate",
        }
    }

    pub fn severity(self) -> NoticeSeverity {
        match self {
            ValidationFlag::MissingField | ValidationFlag::MalformedTime => NoticeSeverity::Error,
            ValidationFlag::ArrivalBeforeDeparture
            | ValidationFlag::DurationMismatch
            | ValidationFlag::Duplicate => NoticeSeverity::Warning,
        }
    }
}

impl fmt::Display for ValidationFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationNotice {
    pub code: String,
    pub severity: NoticeSeverity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<ValidationFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_index: Option<usize>,
    pub file: Option<String>,
    pub row: Option<u64>,
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_order: Vec<String>,
}

impl ValidationNotice {
    pub fn new(
        code: impl Into<String>,
        severity: NoticeSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            flag: None,
            record_index: None,
            file: None,
            row: None,
            field: None,
            context: BTreeMap::new(),
            field_order: Vec::new(),
        }
    }

    /// A notice that flags record `index` of `timetable`, located at the
    /// record's source file and CSV row.
    pub fn flagged(
        flag: ValidationFlag,
        timetable: &Timetable,
        index: usize,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut notice = ValidationNotice::new(flag.code(), flag.severity(), message);
        notice.flag = Some(flag);
        notice.record_index = Some(index);
        notice.set_location(timetable.file_name(index), field, timetable.row_number(index));
        notice.insert_context_field("filename", timetable.file_name(index));
        notice.insert_context_field("csvRowNumber", timetable.row_number(index));
        notice
    }

    pub fn insert_context_field<V: Serialize>(&mut self, name: impl Into<String>, value: V) {
        let key = name.into();
        let serialized = serde_json::to_value(value).unwrap_or(Value::Null);
        if !self.field_order.iter().any(|item| item == &key) {
            self.field_order.push(key.clone());
        }
        self.context.insert(key, serialized);
    }

    pub fn with_context_field<V: Serialize>(mut self, name: impl Into<String>, value: V) -> Self {
        self.insert_context_field(name, value);
        self
    }

    pub fn set_location(&mut self, file: impl Into<String>, field: impl Into<String>, row: u64) {
        self.file = Some(file.into());
        self.field = Some(field.into());
        self.row = Some(row);
    }
}

#[derive(Debug, Default)]
pub struct NoticeContainer {
    notices: Vec<ValidationNotice>,
}

impl NoticeContainer {
    pub fn new() -> Self {
        Self {
            notices: Vec::new(),
        }
    }

    pub fn push(&mut self, notice: ValidationNotice) {
        self.notices.push(notice);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationNotice> {
        self.notices.iter()
    }

    /// Notices that annotate a record with a validation flag.
    pub fn flagged(&self) -> impl Iterator<Item = &ValidationNotice> {
        self.notices
            .iter()
            .filter(|notice| notice.flag.is_some() && notice.record_index.is_some())
    }

    pub fn count_code(&self, code: &str) -> usize {
        self.notices
            .iter()
            .filter(|notice| notice.code == code)
            .count()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn merge(&mut self, other: NoticeContainer) {
        self.notices.extend(other.notices);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_fields_keep_insertion_order_without_duplicates() {
        let notice = ValidationNotice::new("unknown_column", NoticeSeverity::Info, "dropped")
            .with_context_field("filename", "mumbai_buses.csv")
            .with_context_field("fieldName", "platform")
            .with_context_field("filename", "pune_buses.csv");

        assert_eq!(notice.field_order, vec!["filename", "fieldName"]);
        assert_eq!(notice.context["filename"], "pune_buses.csv");
    }

    #[test]
    fn flag_codes_match_serialized_names() {
        for flag in ValidationFlag::ALL {
            let json = serde_json::to_value(flag).unwrap();
            assert_eq!(json, flag.code());
        }
    }
}
