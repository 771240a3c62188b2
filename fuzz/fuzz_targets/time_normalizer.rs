#![no_main]
use libfuzzer_sys::fuzz_target;
use transit_norm_core::normalize_time;
use transit_norm_model::{TimeOfDay, TimeValue};

fuzz_target!(|input: &str| {
    match normalize_time(Some(input)) {
        TimeValue::Time(time) => {
            let rendered = time.to_string();
            assert_eq!(TimeOfDay::parse(&rendered), Ok(time));
            assert_eq!(normalize_time(Some(&rendered)), TimeValue::Time(time));
        }
        TimeValue::Missing => assert!(input.trim().is_empty()),
        TimeValue::Unparsable(raw) => assert!(!raw.trim().is_empty()),
    }
});
