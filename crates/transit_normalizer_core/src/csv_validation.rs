use transit_norm_model::CanonicalField;

use crate::input::RawTable;
use crate::reconcile::ColumnMapping;
use crate::synonyms::SynonymTable;
use crate::{NoticeContainer, NoticeSeverity, ValidationNotice};

/// Reports header-level observations for one source table. These never block
/// a run: they explain which columns were used, dropped or overridden.
pub fn validate_headers(table: &RawTable, synonyms: &SynonymTable, notices: &mut NoticeContainer) {
    let mapping = ColumnMapping::resolve(&table.headers, synonyms);
    let file = table.file.as_str();

    for (index, (header, field)) in table.headers.iter().zip(&mapping.columns).enumerate() {
        if header.trim().is_empty() {
            notices.push(empty_column_name_notice(file, index));
        } else if field.is_none() {
            notices.push(unknown_column_notice(file, header.trim(), index));
        }
    }

    let sources = mapping.sources();
    for (field, columns) in &sources {
        if let Some((winner, overwritten)) = columns.split_last() {
            for &column in overwritten {
                notices.push(conflicting_canonical_columns_notice(
                    file,
                    *field,
                    &table.headers[column],
                    &table.headers[*winner],
                ));
            }
        }
    }

    for field in CanonicalField::SCHEMA {
        if !sources.contains_key(&field) {
            notices.push(missing_canonical_column_notice(file, field));
        }
    }
}

fn empty_column_name_notice(file: &str, index: usize) -> ValidationNotice {
    let mut notice = ValidationNotice::new(
        "empty_column_name",
        NoticeSeverity::Warning,
        "column name is empty",
    );
    notice.file = Some(file.to_string());
    notice.insert_context_field("filename", file);
    notice.insert_context_field("index", index);
    notice
}

fn unknown_column_notice(file: &str, field_name: &str, index: usize) -> ValidationNotice {
    let mut notice = ValidationNotice::new(
        "unknown_column",
        NoticeSeverity::Info,
        "column does not map to any canonical field and is dropped",
    );
    notice.file = Some(file.to_string());
    notice.insert_context_field("fieldName", field_name);
    notice.insert_context_field("filename", file);
    notice.insert_context_field("index", index);
    notice
}

fn conflicting_canonical_columns_notice(
    file: &str,
    field: CanonicalField,
    overwritten: &str,
    winning: &str,
) -> ValidationNotice {
    let mut notice = ValidationNotice::new(
        "conflicting_canonical_columns",
        NoticeSeverity::Warning,
        "several columns map to the same canonical field; the right-most column is used",
    );
    notice.file = Some(file.to_string());
    notice.field = Some(field.name().to_string());
    notice.insert_context_field("canonicalField", field);
    notice.insert_context_field("filename", file);
    notice.insert_context_field("overwrittenColumn", overwritten.trim());
    notice.insert_context_field("winningColumn", winning.trim());
    notice
}

fn missing_canonical_column_notice(file: &str, field: CanonicalField) -> ValidationNotice {
    let mut notice = ValidationNotice::new(
        "missing_canonical_column",
        NoticeSeverity::Warning,
        "no column maps to this canonical field; every row gets the missing value",
    );
    notice.file = Some(file.to_string());
    notice.field = Some(field.name().to_string());
    notice.insert_context_field("canonicalField", field);
    notice.insert_context_field("filename", file);
    notice
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(notices: &NoticeContainer) -> Vec<&str> {
        notices.iter().map(|notice| notice.code.as_str()).collect()
    }

    #[test]
    fn reports_dropped_conflicting_and_missing_columns() {
        let table = RawTable::new(
            "pune.csv",
            ["route", "Bus Num", "platform", "", "arr_time", "dep_time"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            Vec::new(),
        );
        let mut notices = NoticeContainer::new();
        validate_headers(&table, &SynonymTable::default(), &mut notices);

        assert_eq!(
            codes(&notices),
            vec![
                "unknown_column",
                "empty_column_name",
                "conflicting_canonical_columns",
                "missing_canonical_column",
            ]
        );
        let conflict = notices
            .iter()
            .find(|notice| notice.code == "conflicting_canonical_columns")
            .unwrap();
        assert_eq!(conflict.context["overwrittenColumn"], "route");
        assert_eq!(conflict.context["winningColumn"], "Bus Num");
        let missing = notices
            .iter()
            .find(|notice| notice.code == "missing_canonical_column")
            .unwrap();
        assert_eq!(missing.field.as_deref(), Some("stop_name"));
    }

    #[test]
    fn canonical_headers_produce_no_notices() {
        let table = RawTable::new(
            "bangalore.csv",
            ["route_id", "stop_name", "arrival_time", "departure_time"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            Vec::new(),
        );
        let mut notices = NoticeContainer::new();
        validate_headers(&table, &SynonymTable::default(), &mut notices);
        assert!(notices.is_empty());
    }
}
