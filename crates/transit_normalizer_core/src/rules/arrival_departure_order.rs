use crate::{
    NoticeContainer, OrderingRule, Timetable, ValidationFlag, ValidationNotice, Validator,
};

#[derive(Debug, Default)]
pub struct ArrivalDepartureOrderValidator {
    rule: OrderingRule,
}

impl ArrivalDepartureOrderValidator {
    pub fn new(rule: OrderingRule) -> Self {
        Self { rule }
    }
}

impl Validator for ArrivalDepartureOrderValidator {
    fn name(&self) -> &'static str {
        "arrival_departure_order"
    }

    fn validate(&self, timetable: &Timetable, notices: &mut NoticeContainer) {
        for (index, record) in timetable.records.iter().enumerate() {
            let (Some(arrival), Some(departure)) =
                (record.arrival_time.time(), record.departure_time.time())
            else {
                continue;
            };
            if self.rule.is_violated(arrival, departure) {
                notices.push(
                    ValidationNotice::flagged(
                        ValidationFlag::ArrivalBeforeDeparture,
                        timetable,
                        index,
                        "arrival_time",
                        self.rule.description(),
                    )
                    .with_context_field("arrivalTime", arrival)
                    .with_context_field("departureTime", departure),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{record, timetable};

    fn flagged_rows(rule: OrderingRule) -> Vec<usize> {
        let timetable = timetable(vec![
            record("42B", "Central", "09:15", "09:05"),
            record("42B", "Market", "09:00", "09:10"),
            record("42B", "Depot", "09:20", "09:20"),
            record("42B", "Depot", "", "09:20"),
        ]);
        let mut notices = NoticeContainer::new();
        ArrivalDepartureOrderValidator::new(rule).validate(&timetable, &mut notices);
        notices.iter().filter_map(|n| n.record_index).collect()
    }

    #[test]
    fn default_rule_flags_departure_after_arrival() {
        assert_eq!(flagged_rows(OrderingRule::DepartureNotAfterArrival), vec![1]);
    }

    #[test]
    fn alternate_rule_flags_arrival_after_departure() {
        assert_eq!(flagged_rows(OrderingRule::ArrivalNotAfterDeparture), vec![0]);
    }
}
