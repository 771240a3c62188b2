use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;
use transit_norm_core::{PipelineOutcome, ValidationFlag};
use transit_norm_model::{CanonicalField, TimeValue};

use crate::{SummaryReport, ValidationReport};

pub const ACCEPTED_FILE: &str = "clean_timetable.csv";
pub const SUMMARY_FILE: &str = "analytics_report.csv";
pub const REPORT_JSON_FILE: &str = "report.json";

const STAGING_SUFFIX: &str = ".tmp";

const SIDE_FILE_COLUMNS: &[&str] = &[
    "source_file",
    "csv_row_number",
    "route_id",
    "stop_name",
    "arrival_time",
    "departure_time",
    "travel_time_minutes",
    "flags",
];

/// Side file listing every record that carries `flag`.
pub fn side_file_name(flag: ValidationFlag) -> &'static str {
    match flag {
        ValidationFlag::MissingField => "missing_field_entries.csv",
        ValidationFlag::MalformedTime => "invalid_time_entries.csv",
        ValidationFlag::ArrivalBeforeDeparture => "invalid_order_entries.csv",
        ValidationFlag::DurationMismatch => "invalid_duration_entries.csv",
        ValidationFlag::Duplicate => "duplicate_entries.csv",
    }
}

/// Paths of the files a run left in the output directory.
#[derive(Debug, Clone, Default)]
pub struct OutputFiles {
    pub accepted: PathBuf,
    pub summary: PathBuf,
    pub report: PathBuf,
    pub side_files: Vec<(ValidationFlag, PathBuf)>,
}

/// Writes every sink for a finished run.
///
/// Files are first written next to their targets with a `.tmp` suffix and only
/// renamed into place once all of them were written, so a failure leaves the
/// previous run's files untouched. Side files of flags no record carries are
/// removed so the directory describes a single run.
pub fn write_outputs(
    dir: &Path,
    outcome: &PipelineOutcome,
    summary: &SummaryReport,
    report: &ValidationReport,
    pretty: bool,
) -> anyhow::Result<OutputFiles> {
    fs::create_dir_all(dir).with_context(|| format!("create output dir {}", dir.display()))?;

    let mut staged: Vec<PathBuf> = Vec::new();
    let result = stage_outputs(dir, outcome, summary, report, pretty, &mut staged);
    let files = match result {
        Ok(files) => files,
        Err(err) => {
            for path in &staged {
                fs::remove_file(staging_path(path)).ok();
            }
            return Err(err);
        }
    };

    // Renames are per file: a rename failing part way leaves earlier targets
    // already replaced. Staging failures, the common case, touch nothing.
    for path in &staged {
        fs::rename(staging_path(path), path)
            .with_context(|| format!("move {} into place", path.display()))?;
    }
    for flag in ValidationFlag::ALL {
        if outcome.flags.count(flag) == 0 {
            let stale = dir.join(side_file_name(flag));
            if stale.exists() {
                fs::remove_file(&stale)
                    .with_context(|| format!("remove stale {}", stale.display()))?;
            }
        }
    }

    info!(
        dir = %dir.display(),
        accepted = outcome.accepted.len(),
        side_files = files.side_files.len(),
        "outputs written"
    );
    Ok(files)
}

fn stage_outputs(
    dir: &Path,
    outcome: &PipelineOutcome,
    summary: &SummaryReport,
    report: &ValidationReport,
    pretty: bool,
    staged: &mut Vec<PathBuf>,
) -> anyhow::Result<OutputFiles> {
    let accepted = dir.join(ACCEPTED_FILE);
    staged.push(accepted.clone());
    write_accepted(&staging_path(&accepted), outcome)?;

    let mut side_files = Vec::new();
    for flag in ValidationFlag::ALL {
        let indices = outcome.flagged_indices(flag);
        if indices.is_empty() {
            continue;
        }
        let path = dir.join(side_file_name(flag));
        staged.push(path.clone());
        write_side_file(&staging_path(&path), outcome, &indices)?;
        side_files.push((flag, path));
    }

    let summary_path = dir.join(SUMMARY_FILE);
    staged.push(summary_path.clone());
    write_summary(&staging_path(&summary_path), summary)?;

    let report_path = dir.join(REPORT_JSON_FILE);
    staged.push(report_path.clone());
    let json = report.to_json(pretty).context("serialize validation report")?;
    fs::write(staging_path(&report_path), format!("{}\n", json))
        .with_context(|| format!("write {}", report_path.display()))?;

    Ok(OutputFiles {
        accepted,
        summary: summary_path,
        report: report_path,
        side_files,
    })
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(STAGING_SUFFIX);
    PathBuf::from(name)
}

fn write_accepted(path: &Path, outcome: &PipelineOutcome) -> anyhow::Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    writer.write_record(CanonicalField::SCHEMA.iter().map(|field| field.name()))?;
    for record in outcome.accepted_records() {
        writer.write_record(record.to_row())?;
    }
    writer
        .flush()
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Times are written as found in the source so operators can see what was rejected.
fn review_time(value: &TimeValue) -> String {
    match value {
        TimeValue::Unparsable(raw) => raw.clone(),
        other => other.to_string(),
    }
}

fn write_side_file(path: &Path, outcome: &PipelineOutcome, indices: &[usize]) -> anyhow::Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    writer.write_record(SIDE_FILE_COLUMNS)?;
    let timetable = &outcome.timetable;
    for &index in indices {
        let record = &timetable.records[index];
        let flags = outcome
            .flags
            .flags(index)
            .map(|flags| {
                flags
                    .iter()
                    .map(|flag| flag.code())
                    .collect::<Vec<_>>()
                    .join(";")
            })
            .unwrap_or_default();
        writer.write_record([
            timetable.file_name(index).to_string(),
            timetable.row_number(index).to_string(),
            record.route_id.as_deref().unwrap_or_default().to_string(),
            record.stop_name.as_deref().unwrap_or_default().to_string(),
            review_time(&record.arrival_time),
            review_time(&record.departure_time),
            record
                .travel_time_minutes
                .map(|minutes| minutes.to_string())
                .unwrap_or_default(),
            flags,
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn write_summary(path: &Path, summary: &SummaryReport) -> anyhow::Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    writer.write_record(SummaryReport::csv_headers())?;
    writer.write_record(summary.csv_values())?;
    writer
        .flush()
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
