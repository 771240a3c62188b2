use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context};
use transit_norm_model::CanonicalField;

const ROUTE_ID_SYNONYMS: &[&str] = &["route_id", "bus_number", "bus_num", "route"];
const STOP_NAME_SYNONYMS: &[&str] = &["stop_name", "station", "stop"];
const ARRIVAL_TIME_SYNONYMS: &[&str] = &["arrival", "arrives_at", "arrival_time", "arr_time"];
const DEPARTURE_TIME_SYNONYMS: &[&str] =
    &["departure", "leaves_at", "departure_time", "dep_time"];
const TRAVEL_TIME_SYNONYMS: &[&str] = &[
    "travel_time_minutes",
    "traveltimeminutes",
    "travel_time",
    "duration_minutes",
];

/// Canonical form of a source column name: trimmed, lower-cased, inner
/// whitespace runs replaced by `_`.
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Case-insensitive synonym sets mapping source column names onto canonical fields.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    entries: Vec<(CanonicalField, Vec<String>)>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        let builtin = [
            (CanonicalField::RouteId, ROUTE_ID_SYNONYMS),
            (CanonicalField::StopName, STOP_NAME_SYNONYMS),
            (CanonicalField::ArrivalTime, ARRIVAL_TIME_SYNONYMS),
            (CanonicalField::DepartureTime, DEPARTURE_TIME_SYNONYMS),
            (CanonicalField::TravelTimeMinutes, TRAVEL_TIME_SYNONYMS),
        ];
        Self {
            entries: builtin
                .into_iter()
                .map(|(field, names)| (field, names.iter().map(|name| name.to_string()).collect()))
                .collect(),
        }
    }
}

impl SynonymTable {
    /// Field a normalized header name maps to. When a name was added to more
    /// than one set, the set listed first wins.
    pub fn resolve(&self, normalized_header: &str) -> Option<CanonicalField> {
        self.entries
            .iter()
            .find(|(_, names)| names.iter().any(|name| name == normalized_header))
            .map(|(field, _)| *field)
    }

    pub fn extend<I, S>(&mut self, field: CanonicalField, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some((_, existing)) = self.entries.iter_mut().find(|(f, _)| *f == field) else {
            return;
        };
        for name in names {
            let name = normalize_header(name.as_ref());
            if !name.is_empty() && !existing.contains(&name) {
                existing.push(name);
            }
        }
    }

    /// Built-in sets extended by a JSON object such as `{"route_id": ["line"]}`.
    pub fn with_json_extensions(json: &str) -> anyhow::Result<Self> {
        let extensions: BTreeMap<String, Vec<String>> =
            serde_json::from_str(json).context("parse synonym extensions")?;
        let mut table = Self::default();
        for (key, names) in extensions {
            let Some(field) = CanonicalField::from_name(&normalize_header(&key)) else {
                bail!("unknown canonical field {key:?} in synonym extensions");
            };
            table.extend(field, names);
        }
        Ok(table)
    }

    pub fn load_extensions(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read synonyms {}", path.display()))?;
        Self::with_json_extensions(&json).with_context(|| format!("load {}", path.display()))
    }
}
