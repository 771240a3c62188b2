use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::progress::ProgressHandler;

#[derive(Debug, thiserror::Error)]
pub enum TimetableInputError {
    #[error("input not found: {0}")]
    InputNotFound(PathBuf),
    #[error("no timetable column could be reconciled in {file} (headers: {headers:?})")]
    Schema { file: String, headers: Vec<String> },
    #[error(
        "malformed row {row_index} in {file} (csv row {csv_row_number}): expected {expected} fields, found {found}"
    )]
    MalformedRow {
        file: String,
        row_index: usize,
        csv_row_number: u64,
        expected: usize,
        found: usize,
    },
    #[error("csv error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One source export as read from disk: raw header names and raw cell text.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub file: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub row_numbers: Vec<u64>,
}

impl RawTable {
    /// Builds a table from in-memory rows; row numbers follow CSV line numbering
    /// with the header on line 1.
    pub fn new(file: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let row_numbers = (0..rows.len()).map(|index| index as u64 + 2).collect();
        Self {
            file: file.into(),
            headers,
            rows,
            row_numbers,
        }
    }

    pub fn from_bytes(file: impl Into<String>, data: &[u8]) -> Result<Self, TimetableInputError> {
        let file = file.into();
        let data = strip_utf8_bom(data);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(data);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|source| TimetableInputError::Csv {
                file: file.clone(),
                source,
            })?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        let mut row_numbers = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|source| TimetableInputError::Csv {
                file: file.clone(),
                source,
            })?;
            let row_number = record
                .position()
                .map(|pos| pos.line())
                .unwrap_or(index as u64 + 2);
            rows.push(record.iter().map(str::to_string).collect());
            row_numbers.push(row_number);
        }

        Ok(Self {
            file,
            headers,
            rows,
            row_numbers,
        })
    }

    pub fn from_reader<R: Read>(
        file: impl Into<String>,
        mut reader: R,
    ) -> Result<Self, TimetableInputError> {
        let file = file.into();
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|source| TimetableInputError::Io {
                path: PathBuf::from(&file),
                source,
            })?;
        Self::from_bytes(file, &data)
    }

    pub fn row_number(&self, index: usize) -> u64 {
        self.row_numbers
            .get(index)
            .copied()
            .unwrap_or(index as u64 + 2)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The set of CSV exports making up one batch, in the order they are concatenated.
#[derive(Debug, Clone)]
pub struct TimetableInput {
    sources: Vec<PathBuf>,
}

impl TimetableInput {
    /// Each path is either a CSV file or a directory whose `*.csv` files are
    /// taken in lexicographic order.
    pub fn from_paths<I, P>(paths: I) -> Result<Self, TimetableInputError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut sources = Vec::new();
        let mut first_path = None;
        for path in paths {
            let path = path.as_ref();
            first_path.get_or_insert_with(|| path.to_path_buf());
            if !path.exists() {
                return Err(TimetableInputError::InputNotFound(path.to_path_buf()));
            }
            if path.is_dir() {
                sources.extend(csv_files_in(path)?);
            } else {
                sources.push(path.to_path_buf());
            }
        }

        if sources.is_empty() {
            return Err(TimetableInputError::InputNotFound(
                first_path.unwrap_or_else(|| PathBuf::from(".")),
            ));
        }
        Ok(Self { sources })
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn read_tables(
        &self,
        progress: &dyn ProgressHandler,
    ) -> Result<Vec<RawTable>, TimetableInputError> {
        progress.set_total_tables(self.sources.len());
        let mut tables = Vec::with_capacity(self.sources.len());
        for path in &self.sources {
            let name = path.display().to_string();
            progress.on_start_table(&name);
            let file = File::open(path).map_err(|source| TimetableInputError::Io {
                path: path.clone(),
                source,
            })?;
            let table = RawTable::from_reader(name.clone(), BufReader::new(file))?;
            debug!(file = %name, rows = table.len(), "read source table");
            progress.on_finish_table(&name, table.len());
            tables.push(table);
        }
        Ok(tables)
    }
}

fn csv_files_in(dir: &Path) -> Result<Vec<PathBuf>, TimetableInputError> {
    let entries = fs::read_dir(dir).map_err(|source| TimetableInputError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| TimetableInputError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn strip_utf8_bom(data: &[u8]) -> &[u8] {
    if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &data[3..]
    } else {
        data
    }
}
