use std::collections::BTreeMap;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use transit_norm_core::{NoticeContainer, NoticeSeverity, ValidationNotice};

use crate::SummaryReport;

/// Run metadata recorded at the top of the JSON report.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportContext {
    pub inputs: Vec<String>,
    pub output_directory: Option<String>,
    pub validated_at: Option<String>,
    pub validator_version: Option<String>,
    pub ordering_rule: Option<String>,
    pub duration_tolerance_minutes: Option<i64>,
}

impl ReportContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inputs<I, P>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.inputs = inputs
            .into_iter()
            .map(|path| path.as_ref().display().to_string())
            .collect();
        self
    }

    pub fn with_output_directory(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_directory = Some(dir.as_ref().display().to_string());
        self
    }

    pub fn with_validated_at(mut self, validated_at: impl Into<String>) -> Self {
        self.validated_at = Some(validated_at.into());
        self
    }

    pub fn with_validator_version(mut self, version: impl Into<String>) -> Self {
        self.validator_version = Some(version.into());
        self
    }

    pub fn with_ordering_rule(mut self, rule: impl Into<String>) -> Self {
        self.ordering_rule = Some(rule.into());
        self
    }

    pub fn with_duration_tolerance_minutes(mut self, minutes: i64) -> Self {
        self.duration_tolerance_minutes = Some(minutes);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeCount {
    pub code: String,
    pub severity: NoticeSeverity,
    pub total_notices: usize,
}

/// Every notice of a run together with the summary, as written to `report.json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub context: ReportContext,
    pub summary: SummaryReport,
    pub notice_counts: Vec<NoticeCount>,
    pub notices: Vec<ValidationNotice>,
}

impl ValidationReport {
    pub fn new(mut context: ReportContext, summary: SummaryReport, notices: &NoticeContainer) -> Self {
        if context.validated_at.is_none() {
            context.validated_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }

        let mut counts: BTreeMap<&str, (NoticeSeverity, usize)> = BTreeMap::new();
        for notice in notices.iter() {
            counts
                .entry(notice.code.as_str())
                .or_insert((notice.severity, 0))
                .1 += 1;
        }

        Self {
            context,
            summary,
            notice_counts: counts
                .into_iter()
                .map(|(code, (severity, total_notices))| NoticeCount {
                    code: code.to_string(),
                    severity,
                    total_notices,
                })
                .collect(),
            notices: notices.iter().cloned().collect(),
        }
    }

    pub fn to_json(&self, pretty: bool) -> anyhow::Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlagCounts;

    fn summary() -> SummaryReport {
        SummaryReport {
            total_rows: 1,
            unique_routes: 1,
            unique_stops: 1,
            missing_arrival_times: 0,
            missing_departure_times: 0,
            flag_counts: FlagCounts::default(),
        }
    }

    #[test]
    fn groups_notice_counts_by_code() {
        let mut notices = NoticeContainer::new();
        for _ in 0..2 {
            notices.push(ValidationNotice::new(
                "unknown_column",
                NoticeSeverity::Info,
                "dropped",
            ));
        }
        notices.push(ValidationNotice::new(
            "invalid_travel_time",
            NoticeSeverity::Warning,
            "ignored",
        ));

        let report = ValidationReport::new(
            ReportContext::new().with_validated_at("2026-01-01T00:00:00Z"),
            summary(),
            &notices,
        );
        let json: serde_json::Value = serde_json::from_str(&report.to_json(false).unwrap()).unwrap();

        assert_eq!(json["context"]["validatedAt"], "2026-01-01T00:00:00Z");
        assert_eq!(json["noticeCounts"][0]["code"], "invalid_travel_time");
        assert_eq!(json["noticeCounts"][1]["totalNotices"], 2);
        assert_eq!(json["summary"]["flag_counts"]["duplicate"], 0);
        assert_eq!(json["notices"].as_array().unwrap().len(), 3);
    }
}
