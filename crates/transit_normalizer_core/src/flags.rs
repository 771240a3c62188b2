use std::collections::BTreeSet;

use crate::{NoticeContainer, ValidationFlag};

/// The flag set of every record, indexed like the timetable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagIndex {
    per_record: Vec<BTreeSet<ValidationFlag>>,
}

impl FlagIndex {
    pub fn from_notices(record_count: usize, notices: &NoticeContainer) -> Self {
        let mut per_record = vec![BTreeSet::new(); record_count];
        for notice in notices.flagged() {
            if let (Some(flag), Some(index)) = (notice.flag, notice.record_index) {
                if let Some(flags) = per_record.get_mut(index) {
                    flags.insert(flag);
                }
            }
        }
        Self { per_record }
    }

    pub fn flags(&self, index: usize) -> Option<&BTreeSet<ValidationFlag>> {
        self.per_record.get(index)
    }

    pub fn has(&self, index: usize, flag: ValidationFlag) -> bool {
        self.flags(index).is_some_and(|flags| flags.contains(&flag))
    }

    pub fn is_clean(&self, index: usize) -> bool {
        self.flags(index).map_or(true, BTreeSet::is_empty)
    }

    /// Number of records carrying `flag`.
    pub fn count(&self, flag: ValidationFlag) -> usize {
        self.per_record
            .iter()
            .filter(|flags| flags.contains(&flag))
            .count()
    }

    pub fn indices_with(&self, flag: ValidationFlag) -> impl Iterator<Item = usize> + '_ {
        self.per_record
            .iter()
            .enumerate()
            .filter(move |(_, flags)| flags.contains(&flag))
            .map(|(index, _)| index)
    }

    pub fn len(&self) -> usize {
        self.per_record.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_record.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{record, timetable};
    use crate::ValidationNotice;

    #[test]
    fn collapses_repeated_flags_per_record() {
        let timetable = timetable(vec![record("", "", "", ""), record("1", "A", "09:00", "08:55")]);
        let mut notices = NoticeContainer::new();
        for field in ["route_id", "stop_name"] {
            notices.push(ValidationNotice::flagged(
                ValidationFlag::MissingField,
                &timetable,
                0,
                field,
                "missing",
            ));
        }

        let index = FlagIndex::from_notices(timetable.len(), &notices);
        assert_eq!(index.count(ValidationFlag::MissingField), 1);
        assert!(index.has(0, ValidationFlag::MissingField));
        assert!(index.is_clean(1));
        assert_eq!(
            index.indices_with(ValidationFlag::MissingField).collect::<Vec<_>>(),
            vec![0]
        );
    }
}
