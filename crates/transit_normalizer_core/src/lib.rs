pub mod csv_validation;
pub mod dedup;
pub mod engine;
pub mod flags;
pub mod input;
pub mod normalize;
pub mod notice;
pub mod options;
pub mod policy;
pub mod progress;
pub mod reconcile;
pub mod rules;
pub mod synonyms;
pub mod timetable;
pub mod validator;

pub use dedup::{find_duplicates, DuplicateOf};
pub use engine::{process_tables, run_pipeline, PipelineOutcome};
pub use flags::FlagIndex;
pub use input::{RawTable, TimetableInput, TimetableInputError};
pub use normalize::{normalize, normalize_time};
pub use notice::{NoticeContainer, NoticeSeverity, ValidationFlag, ValidationNotice};
pub use options::{OrderingRule, PipelineOptions};
pub use policy::{AcceptancePolicy, Exclusion};
pub use progress::{NoOpProgressHandler, ProgressHandler};
pub use reconcile::{reconcile, ReconciledRecord};
pub use rules::default_runner;
pub use synonyms::SynonymTable;
pub use timetable::{RecordOrigin, Timetable};
pub use validator::{Validator, ValidatorRunner};

pub use transit_norm_model as model;
