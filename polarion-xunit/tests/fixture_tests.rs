// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use polarion_xunit::{NonSuccessKind, Report, TestCase, TestCaseStatus, TestSuite};
use pretty_assertions::assert_eq;
use std::time::Duration;

static MULTI_SUITE_XML: &str = include_str!("../../fixtures/xunit-multi.xml");
static SINGLE_SUITE_XML: &str = include_str!("../../fixtures/xunit-single.xml");

#[test]
fn round_trip_preserves_names_counters_and_properties() {
    let report = basic_report();
    let xml = report.to_string().expect("serializing basic_report succeeds");
    let decoded = Report::deserialize_str(&xml).expect("deserializing basic_report succeeds");

    assert_eq!(summarize(&decoded), summarize(&report));
    assert_eq!(
        decoded.properties.iter().collect::<Vec<_>>(),
        report.properties.iter().collect::<Vec<_>>(),
    );
    for (decoded_case, case) in decoded.test_cases().zip(report.test_cases()) {
        assert_eq!(decoded_case.qualified_name(), case.qualified_name());
        assert_eq!(
            decoded_case.properties.iter().collect::<Vec<_>>(),
            case.properties.iter().collect::<Vec<_>>(),
        );
        assert_eq!(decoded_case.status, case.status);
    }
}

#[test]
fn serialized_report_layout() {
    let xml = basic_report()
        .to_string()
        .expect("serializing basic_report succeeds");

    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(xml.ends_with("</testsuites>\n"));
    assert!(xml.contains(
        r#"<testsuites name="polarizer-run" tests="4" failures="1" errors="1" skipped="1" time="42.235">"#
    ));
    assert!(xml.contains(r#"<testcase name="testcase0" classname="com.example.Suite" status="success">"#));
    assert!(xml.contains(r#"<property name="polarion-parameter-x" value="5"/>"#));
    assert!(xml.contains(r#"<skipped message="skipped message"/>"#));

    // Report properties come before the first suite.
    let properties = xml.find("polarion-project-id").expect("project id is serialized");
    let suite = xml.find("<testsuite ").expect("suite is serialized");
    assert!(properties < suite);
}

#[test]
fn multi_suite_fixture() {
    let report = Report::deserialize_str(MULTI_SUITE_XML).expect("fixture parses");

    assert_eq!(
        summarize(&report),
        Summary {
            counts: (5, 1, 1, 1),
            suites: vec![
                ("com.example.LoginTests".to_owned(), (3, 1, 1, 0)),
                ("com.example.SearchTests".to_owned(), (2, 0, 0, 1)),
            ],
        }
    );
    assert_eq!(
        report.properties.names().collect::<Vec<_>>(),
        vec![
            "polarion-user-id",
            "polarion-project-id",
            "polarion-set-testrun-finished",
            "polarion-dry-run",
            "polarion-include-skipped",
        ]
    );

    let error = report
        .test_cases()
        .find(|tc| tc.name == "logout")
        .expect("logout test case exists");
    assert!(matches!(
        error.status,
        TestCaseStatus::NonSuccess {
            kind: NonSuccessKind::Error,
            ..
        }
    ));
    assert_eq!(error.status.message(), Some("java.lang.NullPointerException"));
}

#[test]
fn single_suite_fixture_is_normalized() {
    let report = Report::deserialize_str(SINGLE_SUITE_XML).expect("fixture parses");

    assert_eq!(report.test_suites.len(), 1);
    assert!(report.properties.is_empty());
    assert_eq!(
        summarize(&report),
        Summary {
            counts: (3, 1, 0, 0),
            suites: vec![("com.example.CartTests".to_owned(), (3, 1, 0, 0))],
        }
    );

    let names: Vec<_> = report.test_cases().map(TestCase::qualified_name).collect();
    assert_eq!(
        names,
        vec![
            "com.example.CartTests.addItem",
            "com.example.CartTests.removeItem",
            "com.example.CartTests.checkout",
        ]
    );

    // Re-serializing always produces the multi-suite form.
    let xml = report.to_string().expect("serializing succeeds");
    assert!(xml.contains("<testsuites "));
}

#[derive(Debug, Eq, PartialEq)]
struct Summary {
    counts: (usize, usize, usize, usize),
    suites: Vec<(String, (usize, usize, usize, usize))>,
}

fn summarize(report: &Report) -> Summary {
    Summary {
        counts: (report.tests, report.failures, report.errors, report.skipped),
        suites: report
            .test_suites
            .iter()
            .map(|suite| {
                (
                    suite.name.clone(),
                    (suite.tests, suite.failures, suite.errors, suite.skipped),
                )
            })
            .collect(),
    }
}

fn basic_report() -> Report {
    let mut report = Report::new();
    report
        .set_name("polarizer-run")
        .set_time(Duration::new(42, 234_567_890));
    for (name, value) in [
        ("polarion-user-id", "ci-user"),
        ("polarion-project-id", "PLATTP"),
        ("polarion-set-testrun-finished", "true"),
        ("polarion-dry-run", "false"),
        ("polarion-include-skipped", "false"),
    ] {
        report.properties.insert_if_absent((name, value));
    }

    let mut test_suite = TestSuite::new("com.example.Suite");

    let mut test_case = TestCase::new("testcase0", TestCaseStatus::success());
    test_case.set_classname("com.example.Suite");
    test_case
        .properties
        .insert_if_absent(("polarion-testcase-id", "PLATTP-1"));
    test_case
        .properties
        .insert_if_absent(("polarion-parameter-x", "5"));
    test_case.set_system_out("testcase0-output");
    test_suite.add_test_case(test_case);

    let mut status = TestCaseStatus::non_success(NonSuccessKind::Failure);
    status
        .set_description("this is the failure description")
        .set_message("testcase1-message");
    let mut test_case = TestCase::new("testcase1", status);
    test_case
        .set_classname("com.example.Suite")
        .set_time(Duration::from_millis(4242));
    test_case
        .properties
        .insert_if_absent(("polarion-testcase-id", "PLATTP-2"));
    test_suite.add_test_case(test_case);

    let mut status = TestCaseStatus::non_success(NonSuccessKind::Error);
    status
        .set_description("at com.example.Suite.testcase2(Suite.java:42)")
        .set_message("java.lang.NullPointerException")
        .set_type("java.lang.NullPointerException");
    let mut test_case = TestCase::new("testcase2", status);
    test_case.set_classname("com.example.Suite");
    test_case
        .properties
        .insert_if_absent(("polarion-testcase-id", "PLATTP-3"));
    test_suite.add_test_case(test_case);

    let mut status = TestCaseStatus::skipped();
    status.set_message("skipped message");
    let mut test_case = TestCase::new("testcase3", status);
    test_case.set_classname("com.example.Suite");
    test_case
        .properties
        .insert_if_absent(("polarion-testcase-id", "PLATTP-4"));
    test_suite.add_test_case(test_case);

    report.add_test_suite(test_suite);
    report
}
