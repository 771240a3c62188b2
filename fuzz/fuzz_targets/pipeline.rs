#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use transit_norm_core::{process_tables, NoOpProgressHandler, PipelineOptions, RawTable};

#[derive(Debug, Arbitrary)]
struct Row {
    route: String,
    stop: String,
    arrival: String,
    departure: String,
    travel: String,
}

fuzz_target!(|rows: Vec<Row>| {
    let headers = ["route", "stop", "arrival", "departure", "travel_time"]
        .iter()
        .map(|name| name.to_string())
        .collect();
    let rows = rows
        .into_iter()
        .map(|row| vec![row.route, row.stop, row.arrival, row.departure, row.travel])
        .collect();
    let table = RawTable::new("fuzz.csv", headers, rows);
    let outcome = process_tables(&[table], &PipelineOptions::default(), &NoOpProgressHandler)
        .expect("well-formed rows never fail");

    assert_eq!(
        outcome.accepted.len() + outcome.excluded.len(),
        outcome.timetable.len()
    );
    for record in outcome.accepted_records() {
        assert!(record.route_id.is_some());
        assert!(record.stop_name.is_some());
    }
});
