use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use transit_norm_core::{PipelineOutcome, ValidationFlag};

/// Number of records carrying each flag, over the full annotated batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlagCounts {
    pub missing_field: usize,
    pub malformed_time: usize,
    pub arrival_before_departure: usize,
    pub duration_mismatch: usize,
    pub duplicate: usize,
}

impl FlagCounts {
    pub fn get(&self, flag: ValidationFlag) -> usize {
        match flag {
            ValidationFlag::MissingField => self.missing_field,
            ValidationFlag::MalformedTime => self.malformed_time,
            ValidationFlag::ArrivalBeforeDeparture => self.arrival_before_departure,
            ValidationFlag::DurationMismatch => self.duration_mismatch,
            ValidationFlag::Duplicate => self.duplicate,
        }
    }

    fn set(&mut self, flag: ValidationFlag, count: usize) {
        let slot = match flag {
            ValidationFlag::MissingField => &mut self.missing_field,
            ValidationFlag::MalformedTime => &mut self.malformed_time,
            ValidationFlag::ArrivalBeforeDeparture => &mut self.arrival_before_departure,
            ValidationFlag::DurationMismatch => &mut self.duration_mismatch,
            ValidationFlag::Duplicate => &mut self.duplicate,
        };
        *slot = count;
    }
}

/// Aggregate figures for one run. Row, route, stop and missing-time figures
/// describe the accepted set; flag counts describe everything that was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub total_rows: usize,
    pub unique_routes: usize,
    pub unique_stops: usize,
    pub missing_arrival_times: usize,
    pub missing_departure_times: usize,
    pub flag_counts: FlagCounts,
}

impl SummaryReport {
    pub fn from_outcome(outcome: &PipelineOutcome) -> Self {
        let mut routes = FxHashSet::default();
        let mut stops = FxHashSet::default();
        let mut missing_arrival_times = 0;
        let mut missing_departure_times = 0;
        for record in outcome.accepted_records() {
            if let Some(route) = record.route_id.as_deref() {
                routes.insert(route);
            }
            if let Some(stop) = record.stop_name.as_deref() {
                stops.insert(stop);
            }
            if record.arrival_time.is_missing() {
                missing_arrival_times += 1;
            }
            if record.departure_time.is_missing() {
                missing_departure_times += 1;
            }
        }

        let mut flag_counts = FlagCounts::default();
        for flag in ValidationFlag::ALL {
            flag_counts.set(flag, outcome.flags.count(flag));
        }

        Self {
            total_rows: outcome.accepted.len(),
            unique_routes: routes.len(),
            unique_stops: stops.len(),
            missing_arrival_times,
            missing_departure_times,
            flag_counts,
        }
    }

    pub fn csv_headers() -> Vec<&'static str> {
        let mut headers = vec![
            "total_rows",
            "unique_routes",
            "unique_stops",
            "missing_arrival_times",
            "missing_departure_times",
        ];
        headers.extend(ValidationFlag::ALL.iter().map(|flag| flag.code()));
        headers
    }

    pub fn csv_values(&self) -> Vec<String> {
        let mut values = vec![
            self.total_rows,
            self.unique_routes,
            self.unique_stops,
            self.missing_arrival_times,
            self.missing_departure_times,
        ];
        values.extend(ValidationFlag::ALL.iter().map(|flag| self.flag_counts.get(*flag)));
        values.iter().map(usize::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transit_norm_core::{process_tables, NoOpProgressHandler, PipelineOptions, RawTable};

    fn outcome(rows: &[&[&str]]) -> PipelineOutcome {
        let table = RawTable::new(
            "city.csv",
            ["route", "stop", "arrival", "departure"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
        );
        process_tables(&[table], &PipelineOptions::default(), &NoOpProgressHandler).unwrap()
    }

    #[test]
    fn counts_accepted_rows_and_all_flags() {
        let outcome = outcome(&[
            &["1", "A", "09:00", "08:55"],
            &["1", "A", "09:00", "08:55"],
            &["1", "B", "", "09:10"],
            &["2", "", "10:00", "09:50"],
        ]);
        let summary = SummaryReport::from_outcome(&outcome);

        assert_eq!(summary.total_rows, 2);
        assert_eq!(summary.unique_routes, 1);
        assert_eq!(summary.unique_stops, 2);
        assert_eq!(summary.missing_arrival_times, 1);
        assert_eq!(summary.missing_departure_times, 0);
        assert_eq!(
            summary.flag_counts,
            FlagCounts {
                missing_field: 2,
                malformed_time: 1,
                duplicate: 1,
                ..FlagCounts::default()
            }
        );
    }

    #[test]
    fn csv_columns_line_up_with_values() {
        let outcome = outcome(&[&["1", "A", "09:00", "08:55"]]);
        let summary = SummaryReport::from_outcome(&outcome);

        let headers = SummaryReport::csv_headers();
        let values = summary.csv_values();
        assert_eq!(headers.len(), values.len());
        assert_eq!(headers[0], "total_rows");
        assert_eq!(headers[9], "duplicate");
        assert_eq!(values[0], "1");
    }
}
