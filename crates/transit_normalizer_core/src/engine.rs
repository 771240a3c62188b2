use tracing::{info, warn};
use transit_norm_model::TimetableRecord;

use crate::csv_validation::validate_headers;
use crate::flags::FlagIndex;
use crate::input::{RawTable, TimetableInput, TimetableInputError};
use crate::normalize::normalize;
use crate::policy::{AcceptancePolicy, Exclusion};
use crate::progress::ProgressHandler;
use crate::reconcile::reconcile;
use crate::rules::default_runner;
use crate::{NoticeContainer, PipelineOptions, Timetable, ValidationFlag};

/// Everything one run produced. The timetable holds every normalized record;
/// `accepted` and `excluded` partition its indices.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub timetable: Timetable,
    pub flags: FlagIndex,
    pub accepted: Vec<usize>,
    pub excluded: Vec<(usize, Exclusion)>,
    pub notices: NoticeContainer,
}

impl PipelineOutcome {
    pub fn accepted_records(&self) -> impl Iterator<Item = &TimetableRecord> + '_ {
        self.accepted
            .iter()
            .map(move |&index| &self.timetable.records[index])
    }

    /// Indices of every record carrying `flag`, accepted or not.
    pub fn flagged_indices(&self, flag: ValidationFlag) -> Vec<usize> {
        self.flags.indices_with(flag).collect()
    }
}

/// Reads every source of `input` and runs the pipeline over the batch.
pub fn run_pipeline(
    input: &TimetableInput,
    options: &PipelineOptions,
    progress: &dyn ProgressHandler,
) -> Result<PipelineOutcome, TimetableInputError> {
    let tables = input.read_tables(progress)?;
    process_tables(&tables, options, progress)
}

/// Reconcile, normalize, validate, deduplicate and partition. Structural
/// problems abort with an error before anything is produced; everything else
/// ends up as notices and flags.
pub fn process_tables(
    tables: &[RawTable],
    options: &PipelineOptions,
    progress: &dyn ProgressHandler,
) -> Result<PipelineOutcome, TimetableInputError> {
    let mut notices = NoticeContainer::new();
    for table in tables {
        validate_headers(table, &options.synonyms, &mut notices);
    }

    let reconciled = reconcile(tables, &options.synonyms)?;
    info!(
        tables = tables.len(),
        records = reconciled.records.len(),
        "reconciled source tables"
    );

    let timetable = normalize(&reconciled, &mut notices);

    let runner = default_runner(options);
    runner.run_with(&timetable, &mut notices, progress);

    let flags = FlagIndex::from_notices(timetable.len(), &notices);
    for flag in ValidationFlag::ALL {
        let count = flags.count(flag);
        if count > 0 {
            warn!(flag = flag.code(), records = count, "flagged records");
        }
    }

    let policy = AcceptancePolicy {
        duration_mismatch_disqualifies: options.duration_mismatch_disqualifies,
    };
    let mut accepted = Vec::with_capacity(timetable.len());
    let mut excluded = Vec::new();
    for (index, record) in timetable.records.iter().enumerate() {
        let exclusion = flags
            .flags(index)
            .and_then(|record_flags| policy.exclusion(record, record_flags));
        match exclusion {
            Some(reason) => excluded.push((index, reason)),
            None => accepted.push(index),
        }
    }
    info!(
        accepted = accepted.len(),
        excluded = excluded.len(),
        "partitioned records"
    );

    Ok(PipelineOutcome {
        timetable,
        flags,
        accepted,
        excluded,
        notices,
    })
}
