pub mod arrival_departure_order;
pub mod duplicate_key;
pub mod duration_mismatch;
pub mod malformed_time;
pub mod missing_field;

pub use arrival_departure_order::ArrivalDepartureOrderValidator;
pub use duplicate_key::DuplicateKeyValidator;
pub use duration_mismatch::DurationMismatchValidator;
pub use malformed_time::MalformedTimeValidator;
pub use missing_field::MissingFieldValidator;

use crate::{PipelineOptions, ValidatorRunner};

/// Every row-level rule, configured from `options`.
pub fn default_runner(options: &PipelineOptions) -> ValidatorRunner {
    let mut runner = ValidatorRunner::new();
    runner.register(MissingFieldValidator);
    runner.register(MalformedTimeValidator);
    runner.register(ArrivalDepartureOrderValidator::new(options.ordering));
    runner.register(DurationMismatchValidator::new(
        options.duration_tolerance_minutes,
    ));
    runner.register(DuplicateKeyValidator);
    runner
}
