use std::collections::BTreeMap;

use tracing::debug;
use transit_norm_model::CanonicalField;

use crate::input::{RawTable, TimetableInputError};
use crate::synonyms::{normalize_header, SynonymTable};
use crate::timetable::RecordOrigin;

/// A source row mapped onto the canonical fields, values still raw text.
/// `None` is the missing value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconciledRecord {
    pub route_id: Option<String>,
    pub stop_name: Option<String>,
    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,
    pub travel_time_minutes: Option<String>,
}

impl ReconciledRecord {
    fn slot_mut(&mut self, field: CanonicalField) -> &mut Option<String> {
        match field {
            CanonicalField::RouteId => &mut self.route_id,
            CanonicalField::StopName => &mut self.stop_name,
            CanonicalField::ArrivalTime => &mut self.arrival_time,
            CanonicalField::DepartureTime => &mut self.departure_time,
            CanonicalField::TravelTimeMinutes => &mut self.travel_time_minutes,
        }
    }
}

/// Canonical field resolved for each source column of one table.
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    pub columns: Vec<Option<CanonicalField>>,
}

impl ColumnMapping {
    pub fn resolve(headers: &[String], synonyms: &SynonymTable) -> Self {
        Self {
            columns: headers
                .iter()
                .map(|header| synonyms.resolve(&normalize_header(header)))
                .collect(),
        }
    }

    /// Source column indices per canonical field, in column order. The last
    /// index is the column whose value a record ends up with.
    pub fn sources(&self) -> BTreeMap<CanonicalField, Vec<usize>> {
        let mut sources: BTreeMap<CanonicalField, Vec<usize>> = BTreeMap::new();
        for (index, field) in self.columns.iter().enumerate() {
            if let Some(field) = field {
                sources.entry(*field).or_default().push(index);
            }
        }
        sources
    }

    pub fn resolves_schema_field(&self) -> bool {
        self.columns
            .iter()
            .flatten()
            .any(|field| CanonicalField::SCHEMA.contains(field))
    }
}

/// The reconciled batch: every source table's rows, concatenated in input order.
#[derive(Debug, Clone, Default)]
pub struct Reconciled {
    pub files: Vec<String>,
    pub records: Vec<ReconciledRecord>,
    pub origins: Vec<RecordOrigin>,
}

/// Maps one table's rows onto the canonical fields.
///
/// Columns are applied left to right and each write replaces the field's
/// previous value, so when several columns resolve to the same field the
/// right-most column wins, including when its cell is empty. Columns without a
/// synonym are dropped.
pub fn reconcile_table(
    table: &RawTable,
    synonyms: &SynonymTable,
) -> Result<Vec<ReconciledRecord>, TimetableInputError> {
    let mapping = ColumnMapping::resolve(&table.headers, synonyms);
    if !mapping.resolves_schema_field() {
        return Err(TimetableInputError::Schema {
            file: table.file.clone(),
            headers: table.headers.clone(),
        });
    }

    let mut records = Vec::with_capacity(table.rows.len());
    for (row_index, row) in table.rows.iter().enumerate() {
        if row.len() != table.headers.len() {
            return Err(TimetableInputError::MalformedRow {
                file: table.file.clone(),
                row_index,
                csv_row_number: table.row_number(row_index),
                expected: table.headers.len(),
                found: row.len(),
            });
        }

        let mut record = ReconciledRecord::default();
        for (value, field) in row.iter().zip(&mapping.columns) {
            let Some(field) = field else {
                continue;
            };
            let value = value.trim();
            *record.slot_mut(*field) = (!value.is_empty()).then(|| value.to_string());
        }
        records.push(record);
    }
    Ok(records)
}

/// Reconciles every table of the batch; the first structural error aborts the run.
pub fn reconcile(
    tables: &[RawTable],
    synonyms: &SynonymTable,
) -> Result<Reconciled, TimetableInputError> {
    let mut reconciled = Reconciled::default();
    for (table_index, table) in tables.iter().enumerate() {
        let records = reconcile_table(table, synonyms)?;
        debug!(file = %table.file, records = records.len(), "reconciled table");
        reconciled
            .origins
            .extend((0..records.len()).map(|row_index| RecordOrigin {
                table: table_index,
                row_number: table.row_number(row_index),
            }));
        reconciled.records.extend(records);
        reconciled.files.push(table.file.clone());
    }
    Ok(reconciled)
}
