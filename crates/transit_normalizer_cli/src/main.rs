use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use transit_norm_core::options::DEFAULT_DURATION_TOLERANCE_MINUTES;
use transit_norm_core::{
    run_pipeline, NoOpProgressHandler, OrderingRule, PipelineOptions, ProgressHandler,
    SynonymTable, TimetableInput,
};
use transit_norm_report::{write_outputs, ReportContext, SummaryReport, ValidationReport};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Ordering {
    /// Flag records whose departure is after their arrival.
    DepartureNotAfterArrival,
    /// Flag records whose arrival is after their departure.
    ArrivalNotAfterDeparture,
}

impl From<Ordering> for OrderingRule {
    fn from(value: Ordering) -> Self {
        match value {
            Ordering::DepartureNotAfterArrival => OrderingRule::DepartureNotAfterArrival,
            Ordering::ArrivalNotAfterDeparture => OrderingRule::ArrivalNotAfterDeparture,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "transit-norm")]
#[command(about = "Normalize, validate and deduplicate transit timetable exports")]
struct Args {
    /// CSV file or directory of CSV files; may be repeated.
    #[arg(short = 'i', long = "input", default_value = "data/raw")]
    input: Vec<PathBuf>,

    #[arg(short = 'o', long = "output", default_value = "data/validated")]
    output: PathBuf,

    #[arg(long = "ordering", value_enum, default_value_t = Ordering::DepartureNotAfterArrival)]
    ordering: Ordering,

    /// Allowed difference in minutes between the stated travel time and the
    /// arrival/departure gap.
    #[arg(long = "duration-tolerance", default_value_t = DEFAULT_DURATION_TOLERANCE_MINUTES)]
    duration_tolerance: i64,

    /// Exclude records flagged duration_mismatch from the accepted set.
    #[arg(long = "strict-duration")]
    strict_duration: bool,

    /// JSON file extending the built-in header synonyms.
    #[arg(long = "synonyms")]
    synonyms: Option<PathBuf>,

    #[arg(short = 'p', long = "pretty")]
    pretty: bool,

    #[arg(long = "progress")]
    progress: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let synonyms = match args.synonyms.as_deref() {
        Some(path) => SynonymTable::load_extensions(path)?,
        None => SynonymTable::default(),
    };
    let options = pipeline_options(&args, synonyms);

    let input = TimetableInput::from_paths(&args.input).context("resolve timetable inputs")?;
    info!("{} source file(s) detected", input.sources().len());

    let started_at = Instant::now();
    let progress: Box<dyn ProgressHandler> = if args.progress {
        Box::new(IndicatifHandler::new())
    } else {
        Box::new(NoOpProgressHandler)
    };
    let outcome = run_pipeline(&input, &options, progress.as_ref())
        .context("timetable batch rejected; no outputs written")?;
    drop(progress);
    let elapsed = started_at.elapsed();

    let summary = SummaryReport::from_outcome(&outcome);
    let context = report_context(&args, input.sources(), &options);
    let report = ValidationReport::new(context, summary.clone(), &outcome.notices);

    let files = write_outputs(&args.output, &outcome, &summary, &report, args.pretty)?;

    info!(
        "accepted {} of {} records in {:.2?}",
        outcome.accepted.len(),
        outcome.timetable.len(),
        elapsed
    );
    if !outcome.excluded.is_empty() {
        warn!("{} record(s) excluded", outcome.excluded.len());
    }
    info!("accepted timetable written to {}", files.accepted.display());
    for (flag, path) in &files.side_files {
        info!("{} entries written to {}", flag, path.display());
    }
    info!("summary written to {}", files.summary.display());
    info!("report written to {}", files.report.display());
    Ok(())
}

fn pipeline_options(args: &Args, synonyms: SynonymTable) -> PipelineOptions {
    PipelineOptions::new()
        .with_synonyms(synonyms)
        .with_ordering(args.ordering.into())
        .with_duration_tolerance_minutes(args.duration_tolerance)
        .with_duration_mismatch_disqualifying(args.strict_duration)
}

/// Run metadata as the pipeline applied it, not as it was typed.
fn report_context(args: &Args, sources: &[PathBuf], options: &PipelineOptions) -> ReportContext {
    ReportContext::new()
        .with_inputs(sources)
        .with_output_directory(&args.output)
        .with_validator_version(env!("CARGO_PKG_VERSION"))
        .with_ordering_rule(options.ordering.description())
        .with_duration_tolerance_minutes(options.duration_tolerance_minutes)
}

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {percent}% {msg}";

struct IndicatifHandler {
    _multi: MultiProgress,
    loading_pb: ProgressBar,
    validation_pb: ProgressBar,
}

impl IndicatifHandler {
    fn new() -> Self {
        let multi = MultiProgress::new();
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let loading_pb = multi.add(ProgressBar::new(0));
        loading_pb.set_style(style.clone());
        loading_pb.set_message("Waiting to read files...");

        let validation_pb = multi.add(ProgressBar::new(0));
        validation_pb.set_style(style);
        validation_pb.set_message("Waiting to validate...");

        Self {
            _multi: multi,
            loading_pb,
            validation_pb,
        }
    }
}

impl ProgressHandler for IndicatifHandler {
    fn on_start_table(&self, file: &str) {
        self.loading_pb.set_message(format!("Reading {}", file));
    }

    fn on_finish_table(&self, _file: &str, _rows: usize) {
        self.loading_pb.inc(1);
    }

    fn on_start_rule(&self, rule_name: &str) {
        self.validation_pb
            .set_message(format!("Running {}", rule_name));
    }

    fn on_finish_rule(&self, _rule_name: &str) {
        self.validation_pb.inc(1);
    }

    fn set_total_tables(&self, count: usize) {
        self.loading_pb.set_length(count as u64);
    }

    fn set_total_rules(&self, count: usize) {
        self.validation_pb.set_length(count as u64);
    }
}

impl Drop for IndicatifHandler {
    fn drop(&mut self) {
        self.loading_pb.finish_with_message("Files read");
        self.validation_pb.finish_with_message("Validation done");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_directory_conventions() {
        let args = Args::try_parse_from(["transit-norm"]).unwrap();
        assert_eq!(args.input, vec![PathBuf::from("data/raw")]);
        assert_eq!(args.output, PathBuf::from("data/validated"));
        assert_eq!(args.duration_tolerance, DEFAULT_DURATION_TOLERANCE_MINUTES);
        assert_eq!(
            OrderingRule::from(args.ordering),
            OrderingRule::DepartureNotAfterArrival
        );
        assert!(!args.strict_duration);
    }

    #[test]
    fn accepts_repeated_inputs_and_alternate_ordering() {
        let args = Args::try_parse_from([
            "transit-norm",
            "-i",
            "bangalore.csv",
            "--input",
            "mumbai",
            "--ordering",
            "arrival-not-after-departure",
            "--strict-duration",
        ])
        .unwrap();
        assert_eq!(args.input.len(), 2);
        assert_eq!(
            OrderingRule::from(args.ordering),
            OrderingRule::ArrivalNotAfterDeparture
        );
        assert!(args.strict_duration);
    }

    #[test]
    fn report_records_the_tolerance_in_effect() {
        let args = Args::try_parse_from(["transit-norm", "--duration-tolerance=-3"]).unwrap();
        let options = pipeline_options(&args, SynonymTable::default());
        let context = report_context(&args, &[PathBuf::from("data/raw/city.csv")], &options);

        assert_eq!(options.duration_tolerance_minutes, 3);
        assert_eq!(context.duration_tolerance_minutes, Some(3));
        assert_eq!(
            context.ordering_rule.as_deref(),
            Some(OrderingRule::DepartureNotAfterArrival.description())
        );
    }
}
