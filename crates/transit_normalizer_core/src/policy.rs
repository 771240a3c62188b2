use std::collections::BTreeSet;

use serde::Serialize;
use transit_norm_model::{CanonicalField, TimetableRecord};

use crate::ValidationFlag;

/// Why a record was left out of the accepted set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    Duplicate,
    MissingIdentifier(CanonicalField),
    DurationMismatch,
}

/// Decides, once all flags are known, which flags disqualify a record.
///
/// Duplicates and records without a `route_id` or `stop_name` are always
/// excluded; a duration mismatch only when configured. Every other flag is
/// advisory.
///
/// Duplicate status is decided on the natural key alone, before this policy
/// runs. When a first occurrence is excluded for a duration mismatch its later
/// copies stay excluded as duplicates, so that key has no accepted record.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptancePolicy {
    pub duration_mismatch_disqualifies: bool,
}

impl AcceptancePolicy {
    pub fn exclusion(
        &self,
        record: &TimetableRecord,
        flags: &BTreeSet<ValidationFlag>,
    ) -> Option<Exclusion> {
        if flags.contains(&ValidationFlag::Duplicate) {
            return Some(Exclusion::Duplicate);
        }
        if flags.contains(&ValidationFlag::MissingField) {
            for field in [CanonicalField::RouteId, CanonicalField::StopName] {
                if record.is_missing(field) {
                    return Some(Exclusion::MissingIdentifier(field));
                }
            }
        }
        if self.duration_mismatch_disqualifies && flags.contains(&ValidationFlag::DurationMismatch)
        {
            return Some(Exclusion::DurationMismatch);
        }
        None
    }
}
