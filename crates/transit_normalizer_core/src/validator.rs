use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::debug;

use crate::progress::{NoOpProgressHandler, ProgressHandler};
use crate::{NoticeContainer, NoticeSeverity, Timetable, ValidationNotice};
use crate::notice::NOTICE_CODE_RUNTIME_EXCEPTION;

pub trait Validator: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, timetable: &Timetable, notices: &mut NoticeContainer);
}

/// Runs registered rules one after another over the same timetable.
#[derive(Default)]
pub struct ValidatorRunner {
    validators: Vec<Box<dyn Validator>>,
}

impl ValidatorRunner {
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    pub fn register<V>(&mut self, validator: V)
    where
        V: Validator + 'static,
    {
        self.validators.push(Box::new(validator));
    }

    pub fn run(&self, timetable: &Timetable) -> NoticeContainer {
        let mut notices = NoticeContainer::new();
        self.run_with(timetable, &mut notices, &NoOpProgressHandler);
        notices
    }

    pub fn run_with(
        &self,
        timetable: &Timetable,
        notices: &mut NoticeContainer,
        progress: &dyn ProgressHandler,
    ) {
        progress.set_total_rules(self.validators.len());
        for validator in &self.validators {
            progress.on_start_rule(validator.name());
            let mut local_notices = NoticeContainer::new();
            let result = catch_unwind(AssertUnwindSafe(|| {
                validator.validate(timetable, &mut local_notices)
            }));

            if let Err(panic) = result {
                local_notices.push(runtime_exception_in_validator_error_notice(
                    validator.name(),
                    panic_payload_message(&*panic),
                ));
            }
            debug!(rule = validator.name(), notices = local_notices.len(), "rule finished");
            notices.merge(local_notices);
            progress.on_finish_rule(validator.name());
        }
    }
}

fn runtime_exception_in_validator_error_notice(
    validator: &str,
    message: String,
) -> ValidationNotice {
    let mut notice = ValidationNotice::new(
        NOTICE_CODE_RUNTIME_EXCEPTION,
        NoticeSeverity::Error,
        "runtime exception while validating timetable",
    );
    notice.insert_context_field("exception", "panic");
    notice.insert_context_field("message", message);
    notice.insert_context_field("validator", validator);
    notice
}

fn panic_payload_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestValidator;

    impl Validator for TestValidator {
        fn name(&self) -> &'static str {
            "test_validator"
        }

        fn validate(&self, _timetable: &Timetable, notices: &mut NoticeContainer) {
            notices.push(ValidationNotice::new(
                "TEST_NOTICE",
                NoticeSeverity::Info,
                "validator ran",
            ));
        }
    }

    struct PanickingValidator;

    impl Validator for PanickingValidator {
        fn name(&self) -> &'static str {
            "panicking_validator"
        }

        fn validate(&self, _timetable: &Timetable, _notices: &mut NoticeContainer) {
            panic!("rule blew up");
        }
    }

    #[test]
    fn runs_registered_validators() {
        let mut runner = ValidatorRunner::new();
        runner.register(TestValidator);

        let notices = runner.run(&Timetable::default());

        assert_eq!(notices.len(), 1);
        assert_eq!(notices.iter().next().unwrap().code, "TEST_NOTICE");
    }

    #[test]
    fn panicking_rule_becomes_a_notice_and_later_rules_still_run() {
        let mut runner = ValidatorRunner::new();
        runner.register(PanickingValidator);
        runner.register(TestValidator);

        let notices = runner.run(&Timetable::default());

        let codes: Vec<_> = notices.iter().map(|notice| notice.code.as_str()).collect();
        assert_eq!(codes, vec![NOTICE_CODE_RUNTIME_EXCEPTION, "TEST_NOTICE"]);
        let panic_notice = notices.iter().next().unwrap();
        assert_eq!(panic_notice.context["message"], "rule blew up");
        assert_eq!(panic_notice.context["validator"], "panicking_validator");
    }
}
