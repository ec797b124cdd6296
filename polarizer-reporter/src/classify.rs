// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classifying raw invocation outcomes.

use crate::run_results::{Fault, RawInvocation, RawStatus};
use indexmap::IndexSet;
use polarion_xunit::{NonSuccessKind, TestCaseStatus};
use std::{fmt, time::Duration};
use swrite::{SWrite, swrite};

/// Error messages longer than this many characters are truncated.
pub const MAX_ERROR_MESSAGE_LEN: usize = 128;

/// The outcome of an invocation as reported to Polarion.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Classification {
    /// The test passed.
    Pass,

    /// The test failed an assertion.
    Fail,

    /// The test threw something other than an assertion failure.
    Error,

    /// The test did not run.
    Skip,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Pass => write!(f, "PASS"),
            Classification::Fail => write!(f, "FAIL"),
            Classification::Error => write!(f, "ERROR"),
            Classification::Skip => write!(f, "SKIP"),
        }
    }
}

/// A classified invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassifiedResult {
    /// `class.method` of the invocation.
    pub qualified_name: String,

    /// The classification.
    pub classification: Classification,

    /// How long the invocation took.
    pub duration: Duration,

    /// The detail message, if any.
    pub message: Option<String>,

    /// The fault type name, if the invocation threw.
    pub fault_type: Option<String>,

    /// The stack trace, one frame per line.
    pub stack_trace: Option<String>,
}

impl ClassifiedResult {
    /// Converts this result into the status of an XUnit test case.
    pub fn to_status(&self) -> TestCaseStatus {
        let mut status = match self.classification {
            Classification::Pass => return TestCaseStatus::success(),
            Classification::Skip => TestCaseStatus::skipped(),
            Classification::Fail => TestCaseStatus::non_success(NonSuccessKind::Failure),
            Classification::Error => TestCaseStatus::non_success(NonSuccessKind::Error),
        };
        if let Some(message) = &self.message {
            status.set_message(message.as_str());
        }
        if let Some(fault_type) = &self.fault_type {
            status.set_type(fault_type.as_str());
        }
        if let Some(stack_trace) = &self.stack_trace {
            status.set_description(stack_trace.as_str());
        }
        status
    }
}

/// Counters for a suite.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SuiteCounters {
    /// The number of tests.
    pub total: usize,

    /// The number of passed tests.
    pub passes: usize,

    /// The number of failed tests.
    pub fails: usize,

    /// The number of errored tests.
    pub errors: usize,

    /// The number of skipped tests.
    pub skips: usize,
}

impl SuiteCounters {
    /// Returns `fails + errors + skips`.
    pub fn non_passing(&self) -> usize {
        self.fails + self.errors + self.skips
    }

    /// Returns true if `total == passes + fails + errors + skips`.
    pub fn is_consistent(&self) -> bool {
        self.total == self.passes + self.non_passing()
    }
}

impl fmt::Display for SuiteCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total: {}, passes: {}, fails: {}, errors: {}, skips: {}",
            self.total, self.passes, self.fails, self.errors, self.skips
        )
    }
}

/// Classifies the invocations of one suite and keeps its counters.
#[derive(Clone, Debug, Default)]
pub struct StatusClassifier {
    counters: SuiteCounters,
    errored: IndexSet<String>,
}

impl StatusClassifier {
    /// Creates a classifier with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the counters accumulated so far.
    pub fn counters(&self) -> SuiteCounters {
        self.counters
    }

    /// Returns the distinct qualified names that errored, in the order they first errored.
    ///
    /// A parameterized method that errors in several invocations appears once.
    pub fn errored(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.errored.iter().map(String::as_str)
    }

    /// Classifies `invocation` and updates the counters.
    pub fn classify(&mut self, invocation: &RawInvocation) -> ClassifiedResult {
        let qualified_name = invocation.qualified_name();
        let mut result = ClassifiedResult {
            qualified_name,
            classification: Classification::Pass,
            duration: invocation.duration(),
            message: None,
            fault_type: None,
            stack_trace: None,
        };

        self.counters.total += 1;
        match (invocation.status, &invocation.fault) {
            (RawStatus::Success, _) => {
                self.counters.passes += 1;
            }
            (RawStatus::Skip, _) => {
                self.counters.skips += 1;
                result.classification = Classification::Skip;
            }
            (RawStatus::Failure, Some(fault)) if !fault.is_assertion() => {
                self.record_error(&mut result, fault);
            }
            (RawStatus::Failure, fault) => {
                self.counters.fails += 1;
                result.classification = Classification::Fail;
                if let Some(fault) = fault {
                    result.message = fault.message.clone();
                    result.fault_type = Some(fault.type_name.clone());
                    result.stack_trace = format_stack_trace(fault);
                }
            }
            (RawStatus::Other(_), Some(fault)) => {
                self.record_error(&mut result, fault);
            }
            (RawStatus::Other(code), None) => {
                self.counters.skips += 1;
                result.classification = Classification::Skip;
                result.message = Some(format!("unrecognized status code {code}"));
            }
        }

        result
    }

    fn record_error(&mut self, result: &mut ClassifiedResult, fault: &Fault) {
        self.counters.errors += 1;
        self.errored.insert(result.qualified_name.clone());

        result.classification = Classification::Error;
        let message = match &fault.message {
            Some(message) => truncate_message(message),
            None => fault.type_name.clone(),
        };
        result.message = Some(message);
        result.fault_type = Some(fault.type_name.clone());
        result.stack_trace = format_stack_trace(fault);
    }
}

fn truncate_message(message: &str) -> String {
    message.chars().take(MAX_ERROR_MESSAGE_LEN).collect()
}

fn format_stack_trace(fault: &Fault) -> Option<String> {
    if fault.stack_trace.is_empty() {
        return None;
    }
    let mut out = String::new();
    for frame in &fault.stack_trace {
        swrite!(out, "{frame}\n");
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn invocation(status: i32, fault: Option<Fault>) -> RawInvocation {
        RawInvocation {
            class_name: "com.example.T".to_owned(),
            method_name: "m".to_owned(),
            status: RawStatus::from(status),
            fault,
            start_millis: 1_000,
            end_millis: 1_250,
            arguments: vec![],
            is_test: true,
        }
    }

    fn fault(type_name: &str, message: Option<&str>) -> Fault {
        Fault {
            type_name: type_name.to_owned(),
            message: message.map(str::to_owned),
            stack_trace: vec![
                "com.example.T.m(T.java:10)".to_owned(),
                "java.base/java.lang.Thread.run(Thread.java:833)".to_owned(),
            ],
        }
    }

    #[test_case(1, None, Classification::Pass; "success")]
    #[test_case(3, None, Classification::Skip; "skip")]
    #[test_case(2, Some(fault("java.lang.NullPointerException", None)), Classification::Error; "failure with error")]
    #[test_case(2, Some(fault("java.lang.AssertionError", Some("expected"))), Classification::Fail; "failure with assertion")]
    #[test_case(2, None, Classification::Fail; "failure without fault")]
    #[test_case(16, Some(fault("java.lang.IllegalStateException", None)), Classification::Error; "unknown with fault")]
    #[test_case(16, None, Classification::Skip; "unknown without fault")]
    fn classification(status: i32, fault: Option<Fault>, expected: Classification) {
        let mut classifier = StatusClassifier::new();
        let result = classifier.classify(&invocation(status, fault));
        assert_eq!(result.classification, expected);
        assert_eq!(result.duration, Duration::from_millis(250));

        let counters = classifier.counters();
        assert_eq!(counters.total, 1, "every invocation is counted once");
        assert!(counters.is_consistent(), "counters: {counters}");
    }

    #[test]
    fn error_detail() {
        let long_message = "x".repeat(200);
        let mut classifier = StatusClassifier::new();
        let result = classifier.classify(&invocation(
            2,
            Some(fault("java.lang.RuntimeException", Some(&long_message))),
        ));

        assert_eq!(result.message.as_deref().map(str::len), Some(MAX_ERROR_MESSAGE_LEN));
        assert_eq!(
            result.stack_trace.as_deref(),
            Some("com.example.T.m(T.java:10)\njava.base/java.lang.Thread.run(Thread.java:833)\n")
        );

        let status = result.to_status();
        assert!(matches!(
            status,
            TestCaseStatus::NonSuccess {
                kind: NonSuccessKind::Error,
                ..
            }
        ));
        assert_eq!(
            status.description(),
            result.stack_trace.as_deref(),
            "the trace is the element body"
        );
    }

    #[test]
    fn error_without_message_uses_type_name() {
        let mut classifier = StatusClassifier::new();
        let result = classifier.classify(&invocation(
            2,
            Some(fault("java.lang.NullPointerException", None)),
        ));
        assert_eq!(
            result.message.as_deref(),
            Some("java.lang.NullPointerException")
        );
    }

    #[test]
    fn errored_methods_are_deduplicated() {
        let mut classifier = StatusClassifier::new();
        for _ in 0..3 {
            classifier.classify(&invocation(
                2,
                Some(fault("java.lang.NullPointerException", None)),
            ));
        }
        classifier.classify(&invocation(1, None));

        let counters = classifier.counters();
        assert_eq!(counters.errors, 3);
        assert_eq!(counters.passes, 1);
        assert_eq!(counters.total, 4);
        assert_eq!(classifier.errored().collect::<Vec<_>>(), vec!["com.example.T.m"]);
    }

    #[test]
    fn unknown_status_message() {
        let mut classifier = StatusClassifier::new();
        let result = classifier.classify(&invocation(16, None));
        assert_eq!(result.message.as_deref(), Some("unrecognized status code 16"));
        assert!(matches!(result.to_status(), TestCaseStatus::Skipped { .. }));
    }
}
