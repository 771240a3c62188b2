use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use transit_norm_core::{
    run_pipeline, NoOpProgressHandler, PipelineOptions, PipelineOutcome, TimetableInput,
    ValidationFlag,
};
use transit_norm_report::{
    side_file_name, write_outputs, ReportContext, SummaryReport, ValidationReport, ACCEPTED_FILE,
    REPORT_JSON_FILE, SUMMARY_FILE,
};

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent() // crates/
        .unwrap()
        .parent() // root
        .unwrap()
        .join("test-timetables")
}

fn temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time")
        .as_nanos();
    std::env::temp_dir().join(format!("{}_{}_{}", prefix, std::process::id(), nanos))
}

fn batch_outcome() -> PipelineOutcome {
    let input = TimetableInput::from_paths([fixtures_root().join("batch")]).expect("batch input");
    run_pipeline(&input, &PipelineOptions::default(), &NoOpProgressHandler).expect("batch runs")
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).expect("open csv");
    reader
        .records()
        .map(|record| record.expect("row").iter().map(str::to_string).collect())
        .collect()
}

fn write_batch(dir: &Path) -> transit_norm_report::OutputFiles {
    let outcome = batch_outcome();
    let summary = SummaryReport::from_outcome(&outcome);
    let report = ValidationReport::new(
        ReportContext::new()
            .with_output_directory(dir)
            .with_validated_at("2026-01-01T00:00:00Z"),
        summary.clone(),
        &outcome.notices,
    );
    write_outputs(dir, &outcome, &summary, &report, true).expect("outputs written")
}

#[test]
fn test_writes_accepted_summary_and_report() {
    let dir = temp_dir("timetable_outputs");
    let files = write_batch(&dir);

    assert_eq!(files.accepted, dir.join(ACCEPTED_FILE));
    let mut reader = csv::Reader::from_path(&files.accepted).expect("open accepted");
    let headers: Vec<_> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(
        headers,
        vec!["route_id", "stop_name", "arrival_time", "departure_time"]
    );
    let rows = read_rows(&files.accepted);
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[4], vec!["42B", "Dadar", "", "09:30"]);

    let summary = read_rows(&dir.join(SUMMARY_FILE));
    assert_eq!(
        summary[0],
        vec!["6", "3", "6", "1", "0", "3", "1", "1", "0", "1"]
    );

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.join(REPORT_JSON_FILE)).unwrap()).unwrap();
    assert_eq!(json["summary"]["total_rows"], 6);
    assert_eq!(json["context"]["validatedAt"], "2026-01-01T00:00:00Z");

    let leftovers = fs::read_dir(&dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .count();
    assert_eq!(leftovers, 0);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_side_files_keep_raw_text_and_source_rows() {
    let dir = temp_dir("timetable_side_files");
    let files = write_batch(&dir);

    let flags: Vec<_> = files.side_files.iter().map(|(flag, _)| *flag).collect();
    assert_eq!(
        flags,
        vec![
            ValidationFlag::MissingField,
            ValidationFlag::MalformedTime,
            ValidationFlag::ArrivalBeforeDeparture,
            ValidationFlag::Duplicate,
        ]
    );

    let invalid_times = read_rows(&dir.join(side_file_name(ValidationFlag::MalformedTime)));
    assert_eq!(invalid_times.len(), 1);
    let row = &invalid_times[0];
    assert!(row[0].ends_with("mumbai_buses.csv"));
    assert_eq!(row[1], "3");
    assert_eq!(row[4], "25:99");
    assert_eq!(row[7], "missing_field;malformed_time");

    let missing = read_rows(&dir.join(side_file_name(ValidationFlag::MissingField)));
    assert_eq!(missing.len(), 3);

    let duplicates = read_rows(&dir.join(side_file_name(ValidationFlag::Duplicate)));
    assert_eq!(duplicates[0][1], "4");
    assert!(duplicates[0][0].ends_with("bangalore_buses.csv"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_stale_side_files_are_removed() {
    let dir = temp_dir("timetable_stale");
    fs::create_dir_all(&dir).unwrap();
    let stale = dir.join(side_file_name(ValidationFlag::DurationMismatch));
    fs::write(&stale, "left over from an earlier run\n").unwrap();

    write_batch(&dir);

    assert!(!stale.exists());
    assert!(dir.join(side_file_name(ValidationFlag::Duplicate)).exists());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_failed_staging_keeps_previous_outputs() {
    let dir = temp_dir("timetable_failed_staging");
    fs::create_dir_all(&dir).unwrap();
    let previous = "route_id,stop_name,arrival_time,departure_time\n1,A,09:00,08:55\n";
    fs::write(dir.join(ACCEPTED_FILE), previous).unwrap();
    // A directory where the summary's staging file should go makes that write fail.
    fs::create_dir_all(dir.join(format!("{}.tmp", SUMMARY_FILE))).unwrap();

    let outcome = batch_outcome();
    let summary = SummaryReport::from_outcome(&outcome);
    let report = ValidationReport::new(ReportContext::new(), summary.clone(), &outcome.notices);
    assert!(write_outputs(&dir, &outcome, &summary, &report, false).is_err());

    assert_eq!(fs::read_to_string(dir.join(ACCEPTED_FILE)).unwrap(), previous);
    assert!(!dir.join(REPORT_JSON_FILE).exists());
    assert!(!dir.join(format!("{}.tmp", ACCEPTED_FILE)).exists());
    assert!(!dir.join(side_file_name(ValidationFlag::Duplicate)).exists());

    fs::remove_dir_all(&dir).ok();
}
