// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folds the invocations of a suite into an XUnit test suite.

use crate::{
    classify::{StatusClassifier, SuiteCounters},
    errors::MappingError,
    ledger::BadTestLedger,
    mapping::MappingTable,
    properties::{PARAMETER_PREFIX, TESTCASE_ID},
    run_results::{RawInvocation, RawSuite},
};
use polarion_xunit::{TestCase, TestSuite};
use serde_json::Value;
use tracing::{debug, warn};

/// A suite built from raw results, along with its counters.
#[derive(Clone, Debug)]
pub struct AggregatedSuite {
    /// The XUnit suite. Its counts are not reconciled yet.
    pub test_suite: TestSuite,

    /// The counters for the suite.
    pub counters: SuiteCounters,
}

/// Builds XUnit suites from raw suites, resolving every test through the mapping table.
#[derive(Debug)]
pub struct SuiteAggregator<'a> {
    project: &'a str,
    mapping: &'a MappingTable,
    ledger: &'a BadTestLedger,
}

impl<'a> SuiteAggregator<'a> {
    /// Creates a new aggregator for `project`.
    pub fn new(project: &'a str, mapping: &'a MappingTable, ledger: &'a BadTestLedger) -> Self {
        Self {
            project,
            mapping,
            ledger,
        }
    }

    /// Aggregates `suite`.
    ///
    /// Tests missing from the mapping table are recorded in the ledger and left out. Returns
    /// `Ok(None)` if no test in the suite could be resolved.
    ///
    /// # Errors
    ///
    /// Fails if an invocation's argument count differs from the parameters declared for it.
    pub fn aggregate(&self, suite: &RawSuite) -> Result<Option<AggregatedSuite>, MappingError> {
        let mut classifier = StatusClassifier::new();
        let mut test_suite = TestSuite::new(suite.name.as_str());

        for invocation in suite.invocations.iter().filter(|inv| inv.is_test) {
            if let Some(test_case) = self.build_test_case(invocation, &mut classifier)? {
                test_suite.add_test_case(test_case);
            }
        }

        if test_suite.test_cases.is_empty() {
            debug!("dropping suite {}: no test was found in the mapping file", suite.name);
            return Ok(None);
        }

        let classified = classifier.counters();
        let errors = classifier.errored().len();
        let counters = match suite.framework_counts {
            Some(framework) => {
                if framework.total != classified.total {
                    debug!(
                        "suite {}: framework reports {} tests, {} were resolved",
                        suite.name, framework.total, classified.total
                    );
                }
                SuiteCounters {
                    total: framework.total,
                    passes: classified.passes,
                    // The framework doesn't tell errors apart from failures.
                    fails: framework.failed.saturating_sub(errors),
                    errors,
                    skips: framework.skipped,
                }
            }
            None => SuiteCounters {
                errors,
                ..classified
            },
        };
        if !counters.is_consistent() {
            warn!(
                "suite {}: total number of tests run != fails + errors + skips + passes ({counters})",
                suite.name
            );
        }

        test_suite.set_time(suite.duration());
        if let Some(start) = suite.start_time() {
            test_suite.set_timestamp(start);
        }

        Ok(Some(AggregatedSuite {
            test_suite,
            counters,
        }))
    }

    fn build_test_case(
        &self,
        invocation: &RawInvocation,
        classifier: &mut StatusClassifier,
    ) -> Result<Option<TestCase>, MappingError> {
        let qualified_name = invocation.qualified_name();
        let id_params = match self.mapping.resolve_with_args(
            &qualified_name,
            self.project,
            invocation.arguments.len(),
        ) {
            Ok(id_params) => id_params,
            Err(error) if error.is_unresolved() => {
                self.ledger.record(&qualified_name, self.project);
                return Ok(None);
            }
            Err(error) => return Err(error),
        };

        let result = classifier.classify(invocation);
        let mut test_case = TestCase::new(invocation.method_name.as_str(), result.to_status());
        test_case
            .set_classname(invocation.class_name.as_str())
            .set_time(result.duration);

        test_case
            .properties
            .insert_if_absent((TESTCASE_ID, id_params.id.as_str()));
        for (name, value) in id_params.parameters.iter().zip(&invocation.arguments) {
            test_case
                .properties
                .insert_if_absent((format!("{PARAMETER_PREFIX}{name}"), stringify_argument(value)));
        }

        Ok(Some(test_case))
    }
}

/// Converts an argument value into a property value.
///
/// Strings are used as is, `null` becomes `"null"`, and anything else is written as compact JSON.
pub fn stringify_argument(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mapping::IdParams,
        run_results::{FrameworkCounts, Fault, RawStatus},
    };
    use camino_tempfile::{Utf8TempDir, tempdir};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    fn invocation(method_name: &str, status: RawStatus, arguments: Vec<Value>) -> RawInvocation {
        RawInvocation {
            class_name: "com.example.T".to_owned(),
            method_name: method_name.to_owned(),
            status,
            fault: None,
            start_millis: 0,
            end_millis: 10,
            arguments,
            is_test: true,
        }
    }

    fn suite(invocations: Vec<RawInvocation>, counts: Option<FrameworkCounts>) -> RawSuite {
        RawSuite {
            name: "Regression".to_owned(),
            start_millis: 1_700_000_000_000,
            end_millis: 1_700_000_001_000,
            framework_counts: counts,
            invocations,
        }
    }

    fn mapping() -> MappingTable {
        let mut mapping = MappingTable::default();
        mapping
            .insert("com.example.T.m", "proj1", IdParams::new("PROJ-1", ["x"]))
            .insert(
                "com.example.T.pair",
                "proj1",
                IdParams::new("PROJ-2", ["left", "right"]),
            )
            .insert("com.example.T.plain", "proj1", IdParams::new("PROJ-3", Vec::<String>::new()));
        mapping
    }

    fn ledger() -> (Utf8TempDir, BadTestLedger) {
        let dir = tempdir().expect("created temp dir");
        let ledger = BadTestLedger::new(dir.path().join("bad-tests.txt"));
        (dir, ledger)
    }

    #[test_case(json!(5), "5"; "number")]
    #[test_case(json!(null), "null"; "null")]
    #[test_case(json!("text"), "text"; "string")]
    #[test_case(json!(true), "true"; "bool")]
    #[test_case(json!([1, "a"]), r#"[1,"a"]"#; "array")]
    fn argument_strings(value: Value, expected: &str) {
        assert_eq!(stringify_argument(&value), expected);
    }

    #[test]
    fn parameters_follow_the_id() {
        let mapping = mapping();
        let (_dir, ledger) = ledger();
        let aggregator = SuiteAggregator::new("proj1", &mapping, &ledger);

        let aggregated = aggregator
            .aggregate(&suite(
                vec![invocation(
                    "pair",
                    RawStatus::Success,
                    vec![json!(null), json!("b")],
                )],
                None,
            ))
            .expect("aggregation succeeds")
            .expect("suite has tests");

        let test_case = &aggregated.test_suite.test_cases[0];
        assert_eq!(
            test_case.properties.iter().collect::<Vec<_>>(),
            vec![
                ("polarion-testcase-id", "PROJ-2"),
                ("polarion-parameter-left", "null"),
                ("polarion-parameter-right", "b"),
            ]
        );
        assert_eq!(test_case.qualified_name(), "com.example.T.pair");
        assert_eq!(aggregated.test_suite.time.map(|t| t.as_millis()), Some(1000));
        assert!(aggregated.test_suite.timestamp.is_some());
    }

    #[test]
    fn unresolved_tests_go_to_the_ledger() {
        let mapping = mapping();
        let (_dir, ledger) = ledger();
        let aggregator = SuiteAggregator::new("proj1", &mapping, &ledger);

        let aggregated = aggregator
            .aggregate(&suite(
                vec![
                    invocation("plain", RawStatus::Success, vec![]),
                    invocation("unknown", RawStatus::Success, vec![]),
                ],
                None,
            ))
            .expect("unresolved tests are not fatal")
            .expect("suite has tests");
        assert_eq!(aggregated.test_suite.test_cases.len(), 1);
        assert_eq!(aggregated.counters.total, 1);

        let ledger_contents = fs_err::read_to_string(ledger.path()).expect("ledger was written");
        assert_eq!(
            ledger_contents,
            "com.example.T.unknown does not exist in mapping file for Project proj1\n"
        );
    }

    #[test]
    fn suites_without_resolved_tests_are_dropped() {
        let mapping = mapping();
        let (_dir, ledger) = ledger();
        let aggregator = SuiteAggregator::new("other-project", &mapping, &ledger);

        let aggregated = aggregator
            .aggregate(&suite(
                vec![invocation("plain", RawStatus::Success, vec![])],
                None,
            ))
            .expect("aggregation succeeds");
        assert!(aggregated.is_none());
    }

    #[test]
    fn configuration_methods_are_ignored() {
        let mapping = mapping();
        let (_dir, ledger) = ledger();
        let aggregator = SuiteAggregator::new("proj1", &mapping, &ledger);

        let mut setup = invocation("setUp", RawStatus::Success, vec![]);
        setup.is_test = false;
        let aggregated = aggregator
            .aggregate(&suite(
                vec![setup, invocation("plain", RawStatus::Success, vec![])],
                None,
            ))
            .expect("aggregation succeeds")
            .expect("suite has tests");
        assert_eq!(aggregated.test_suite.test_cases.len(), 1);
        assert!(!ledger.path().exists(), "configuration methods aren't looked up");
    }

    #[test]
    fn parameter_count_mismatch_is_fatal() {
        let mapping = mapping();
        let (_dir, ledger) = ledger();
        let aggregator = SuiteAggregator::new("proj1", &mapping, &ledger);

        let error = aggregator
            .aggregate(&suite(
                vec![invocation("pair", RawStatus::Success, vec![json!(1)])],
                None,
            ))
            .expect_err("mismatch is fatal");
        assert!(matches!(
            error,
            MappingError::ParameterCountMismatch { actual: 1, .. }
        ));
    }

    #[test]
    fn framework_counts_are_reconciled() {
        let mapping = mapping();
        let (_dir, ledger) = ledger();
        let aggregator = SuiteAggregator::new("proj1", &mapping, &ledger);

        let npe = Fault {
            type_name: "java.lang.NullPointerException".to_owned(),
            message: None,
            stack_trace: vec![],
        };
        let mut first = invocation("m", RawStatus::Failure, vec![json!(1)]);
        first.fault = Some(npe.clone());
        let mut second = invocation("m", RawStatus::Failure, vec![json!(2)]);
        second.fault = Some(npe);
        let passed = invocation("plain", RawStatus::Success, vec![]);

        let aggregated = aggregator
            .aggregate(&suite(
                vec![first, second, passed],
                Some(FrameworkCounts {
                    total: 3,
                    failed: 2,
                    skipped: 0,
                }),
            ))
            .expect("aggregation succeeds")
            .expect("suite has tests");

        // Two errored invocations of the same method count as one error.
        assert_eq!(
            aggregated.counters,
            SuiteCounters {
                total: 3,
                passes: 1,
                fails: 1,
                errors: 1,
                skips: 0,
            }
        );
    }

    #[test]
    fn failures_are_floored_at_zero() {
        let mapping = mapping();
        let (_dir, ledger) = ledger();
        let aggregator = SuiteAggregator::new("proj1", &mapping, &ledger);

        let mut errored = invocation("plain", RawStatus::Failure, vec![]);
        errored.fault = Some(Fault {
            type_name: "java.io.IOException".to_owned(),
            message: Some("disk".to_owned()),
            stack_trace: vec![],
        });

        let aggregated = aggregator
            .aggregate(&suite(
                vec![errored],
                Some(FrameworkCounts {
                    total: 1,
                    failed: 0,
                    skipped: 0,
                }),
            ))
            .expect("aggregation succeeds")
            .expect("suite has tests");
        assert_eq!(aggregated.counters.fails, 0);
        assert_eq!(aggregated.counters.errors, 1);
    }
}
