use rustc_hash::FxHashMap;
use transit_norm_model::{NaturalKey, TimetableRecord};

/// A record whose natural key already appeared earlier in the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateOf {
    pub index: usize,
    pub first_index: usize,
}

/// Finds every record repeating an earlier record's natural key. The first
/// occurrence in input order is the one kept; results are in input order.
pub fn find_duplicates(records: &[TimetableRecord]) -> Vec<DuplicateOf> {
    let mut first_seen: FxHashMap<NaturalKey<'_>, usize> = FxHashMap::default();
    let mut duplicates = Vec::new();
    for (index, record) in records.iter().enumerate() {
        match first_seen.get(&record.natural_key()) {
            Some(&first_index) => duplicates.push(DuplicateOf { index, first_index }),
            None => {
                first_seen.insert(record.natural_key(), index);
            }
        }
    }
    duplicates
}
