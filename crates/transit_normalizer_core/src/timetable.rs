use transit_norm_model::TimetableRecord;

/// Where a record came from: the index of its source table and its CSV row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOrigin {
    pub table: usize,
    pub row_number: u64,
}

/// The canonical record sequence of one batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    pub files: Vec<String>,
    pub records: Vec<TimetableRecord>,
    pub origins: Vec<RecordOrigin>,
}

impl Timetable {
    /// A single-source timetable; row numbers start at 2 as if read from CSV.
    pub fn from_records(file: impl Into<String>, records: Vec<TimetableRecord>) -> Self {
        let origins = (0..records.len())
            .map(|index| RecordOrigin {
                table: 0,
                row_number: index as u64 + 2,
            })
            .collect();
        Self {
            files: vec![file.into()],
            records,
            origins,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn file_name(&self, index: usize) -> &str {
        self.origins
            .get(index)
            .and_then(|origin| self.files.get(origin.table))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn row_number(&self, index: usize) -> u64 {
        self.origins
            .get(index)
            .map(|origin| origin.row_number)
            .unwrap_or(index as u64 + 2)
    }
}
