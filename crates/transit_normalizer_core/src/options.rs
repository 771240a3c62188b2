use transit_norm_model::TimeOfDay;

use crate::synonyms::SynonymTable;

pub const DEFAULT_DURATION_TOLERANCE_MINUTES: i64 = 5;

/// Which arrival/departure ordering counts as an anomaly.
///
/// Source exports disagree on this, so the comparison lives here and every
/// rule that orders times goes through [`OrderingRule::is_violated`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingRule {
    /// A stop's departure must not be after its arrival; flags
    /// `arrival < departure`.
    #[default]
    DepartureNotAfterArrival,
    /// A stop's arrival must not be after its departure; flags
    /// `arrival > departure`.
    ArrivalNotAfterDeparture,
}

impl OrderingRule {
    pub fn is_violated(self, arrival: TimeOfDay, departure: TimeOfDay) -> bool {
        let arrival = arrival.minutes_since_midnight();
        let departure = departure.minutes_since_midnight();
        match self {
            OrderingRule::DepartureNotAfterArrival => departure > arrival,
            OrderingRule::ArrivalNotAfterDeparture => arrival > departure,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            OrderingRule::DepartureNotAfterArrival => "departure_time is after arrival_time",
            OrderingRule::ArrivalNotAfterDeparture => "arrival_time is after departure_time",
        }
    }
}

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub synonyms: SynonymTable,
    pub ordering: OrderingRule,
    pub duration_tolerance_minutes: i64,
    pub duration_mismatch_disqualifies: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            synonyms: SynonymTable::default(),
            ordering: OrderingRule::default(),
            duration_tolerance_minutes: DEFAULT_DURATION_TOLERANCE_MINUTES,
            duration_mismatch_disqualifies: false,
        }
    }
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_synonyms(mut self, synonyms: SynonymTable) -> Self {
        self.synonyms = synonyms;
        self
    }

    pub fn with_ordering(mut self, ordering: OrderingRule) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_duration_tolerance_minutes(mut self, minutes: i64) -> Self {
        self.duration_tolerance_minutes = minutes.saturating_abs();
        self
    }

    pub fn with_duration_mismatch_disqualifying(mut self, disqualifies: bool) -> Self {
        self.duration_mismatch_disqualifies = disqualifies;
        self
    }
}
