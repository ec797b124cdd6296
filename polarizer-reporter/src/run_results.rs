// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw results of a completed test run, as reported by the host test framework.

use crate::errors::InputReadError;
use camino::Utf8Path;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The results of a run, grouped by the framework's suites.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RunResults {
    /// The suites that were run.
    pub suites: Vec<RawSuite>,
}

impl RunResults {
    /// Reads run results from a JSON file.
    pub fn from_path(path: &Utf8Path) -> Result<Self, InputReadError> {
        let contents = fs_err::read_to_string(path).map_err(|error| InputReadError::Read {
            path: path.to_owned(),
            error,
        })?;
        serde_json::from_str(&contents).map_err(|error| InputReadError::RunResults {
            path: path.to_owned(),
            error,
        })
    }
}

/// One suite (test context) of a run.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RawSuite {
    /// The name of the suite.
    pub name: String,

    /// When the suite started, in milliseconds since the Unix epoch.
    pub start_millis: i64,

    /// When the suite ended, in milliseconds since the Unix epoch.
    pub end_millis: i64,

    /// The framework's own counts for this suite, if it reports them.
    #[serde(default)]
    pub framework_counts: Option<FrameworkCounts>,

    /// Every method the framework invoked, in invocation order.
    #[serde(default)]
    pub invocations: Vec<RawInvocation>,
}

impl RawSuite {
    /// The wall-clock time the suite took.
    pub fn duration(&self) -> Duration {
        millis_between(self.start_millis, self.end_millis)
    }

    /// The time at which the suite started.
    pub fn start_time(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::from_timestamp_millis(self.start_millis).map(|start| start.fixed_offset())
    }
}

/// Test counts as reported by the host framework for a suite.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct FrameworkCounts {
    /// The number of test methods in the suite.
    pub total: usize,

    /// The number of failed tests, including tests that errored.
    pub failed: usize,

    /// The number of skipped tests.
    pub skipped: usize,
}

/// One invocation of a method.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RawInvocation {
    /// The fully qualified class name.
    pub class_name: String,

    /// The method name.
    pub method_name: String,

    /// The outcome reported by the framework.
    pub status: RawStatus,

    /// What the method threw, if anything.
    #[serde(default)]
    pub fault: Option<Fault>,

    /// When the invocation started, in milliseconds since the Unix epoch.
    #[serde(default)]
    pub start_millis: i64,

    /// When the invocation ended, in milliseconds since the Unix epoch.
    #[serde(default)]
    pub end_millis: i64,

    /// The positional arguments the method was invoked with.
    #[serde(default)]
    pub arguments: Vec<serde_json::Value>,

    /// False for configuration methods (setup and teardown), which are not reported.
    #[serde(default = "default_is_test")]
    pub is_test: bool,
}

impl RawInvocation {
    /// Returns `class_name.method_name`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.class_name, self.method_name)
    }

    /// The wall-clock time the invocation took.
    pub fn duration(&self) -> Duration {
        millis_between(self.start_millis, self.end_millis)
    }
}

fn default_is_test() -> bool {
    true
}

fn millis_between(start: i64, end: i64) -> Duration {
    Duration::from_millis(u64::try_from(end.saturating_sub(start)).unwrap_or(0))
}

/// The status code of an invocation.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(from = "i32", into = "i32")]
pub enum RawStatus {
    /// The invocation passed (code 1).
    Success,

    /// The invocation failed (code 2).
    Failure,

    /// The invocation was skipped (code 3).
    Skip,

    /// Any other code.
    Other(i32),
}

impl RawStatus {
    /// Returns the framework's status code.
    pub fn code(self) -> i32 {
        match self {
            RawStatus::Success => 1,
            RawStatus::Failure => 2,
            RawStatus::Skip => 3,
            RawStatus::Other(code) => code,
        }
    }
}

impl From<i32> for RawStatus {
    fn from(code: i32) -> Self {
        match code {
            1 => RawStatus::Success,
            2 => RawStatus::Failure,
            3 => RawStatus::Skip,
            other => RawStatus::Other(other),
        }
    }
}

impl From<RawStatus> for i32 {
    fn from(status: RawStatus) -> Self {
        status.code()
    }
}

/// What an invocation threw.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Fault {
    /// The fully qualified type name, e.g. `java.lang.NullPointerException`.
    pub type_name: String,

    /// The message, if any.
    #[serde(default)]
    pub message: Option<String>,

    /// Stack frames, innermost first.
    #[serde(default)]
    pub stack_trace: Vec<String>,
}

impl Fault {
    /// Returns true if this fault is an assertion failure rather than an unexpected error.
    pub fn is_assertion(&self) -> bool {
        matches!(
            self.simple_type_name(),
            "AssertionError" | "AssertionFailedError" | "ComparisonFailure"
        )
    }

    /// Returns the type name without its package or enclosing classes.
    pub fn simple_type_name(&self) -> &str {
        self.type_name
            .rsplit(['.', '$'])
            .next()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("java.lang.AssertionError", true)]
    #[test_case("org.opentest4j.AssertionFailedError", true)]
    #[test_case("org.junit.ComparisonFailure", true)]
    #[test_case("java.lang.NullPointerException", false)]
    #[test_case("com.example.Outer$AssertionError", true; "nested class")]
    #[test_case("com.example.MyAssertionErrorHelper", false; "partial match")]
    fn fault_is_assertion(type_name: &str, expected: bool) {
        let fault = Fault {
            type_name: type_name.to_owned(),
            message: None,
            stack_trace: vec![],
        };
        assert_eq!(fault.is_assertion(), expected);
    }

    #[test]
    fn parse_run_results() {
        let json = indoc! {r#"
            {
                "suites": [{
                    "name": "Regression",
                    "start_millis": 1700000000000,
                    "end_millis": 1700000002500,
                    "framework_counts": { "total": 2, "failed": 0, "skipped": 1 },
                    "invocations": [
                        {
                            "class_name": "com.example.T",
                            "method_name": "m",
                            "status": 1,
                            "arguments": [5, null, "text"]
                        },
                        {
                            "class_name": "com.example.T",
                            "method_name": "setUp",
                            "status": 16,
                            "is_test": false
                        }
                    ]
                }]
            }
        "#};

        let results: RunResults = serde_json::from_str(json).expect("results parse");
        let suite = &results.suites[0];
        assert_eq!(suite.duration(), Duration::from_millis(2500));
        assert_eq!(
            suite.start_time().map(|start| start.timestamp_millis()),
            Some(1_700_000_000_000)
        );
        assert_eq!(
            suite.framework_counts,
            Some(FrameworkCounts {
                total: 2,
                failed: 0,
                skipped: 1,
            })
        );

        let [test, setup] = suite.invocations.as_slice() else {
            panic!("expected two invocations");
        };
        assert_eq!(test.qualified_name(), "com.example.T.m");
        assert_eq!(test.status, RawStatus::Success);
        assert!(test.is_test);
        assert_eq!(test.arguments.len(), 3);
        assert_eq!(setup.status, RawStatus::Other(16));
        assert!(!setup.is_test);
        assert_eq!(setup.duration(), Duration::ZERO);
    }
}
