mod json;
mod output;
mod summary;

pub use json::{ReportContext, ValidationReport};
pub use output::{
    side_file_name, write_outputs, OutputFiles, ACCEPTED_FILE, REPORT_JSON_FILE, SUMMARY_FILE,
};
pub use summary::{FlagCounts, SummaryReport};
