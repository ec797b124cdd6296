// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialize a `Report`.

use crate::{
    NonSuccessKind, Output, PropertySet, Report, SerializeError, TestCase, TestCaseStatus,
    TestSuite,
};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::{
    io::{self, Write},
    time::Duration,
};

pub(crate) static TESTSUITES_TAG: &str = "testsuites";
pub(crate) static TESTSUITE_TAG: &str = "testsuite";
pub(crate) static TESTCASE_TAG: &str = "testcase";
pub(crate) static PROPERTIES_TAG: &str = "properties";
pub(crate) static PROPERTY_TAG: &str = "property";
pub(crate) static FAILURE_TAG: &str = "failure";
pub(crate) static ERROR_TAG: &str = "error";
pub(crate) static SKIPPED_TAG: &str = "skipped";
pub(crate) static SYSTEM_OUT_TAG: &str = "system-out";
pub(crate) static SYSTEM_ERR_TAG: &str = "system-err";

pub(crate) static SUCCESS_STATUS: &str = "success";

type Result<T = (), E = SerializeError> = std::result::Result<T, E>;

pub(crate) fn serialize_report(report: &Report, writer: impl io::Write) -> Result {
    let mut writer = Writer::new_with_indent(writer, b' ', 4);

    let decl = BytesDecl::new("1.0", Some("UTF-8"), None);
    writer.write_event(Event::Decl(decl))?;

    serialize_report_impl(report, &mut writer)?;

    // Add a trailing newline.
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

fn serialize_report_impl(report: &Report, writer: &mut Writer<impl io::Write>) -> Result {
    // Use the destructuring syntax to ensure that all fields are handled.
    let Report {
        name,
        timestamp,
        time,
        tests,
        failures,
        errors,
        skipped,
        properties,
        test_suites,
    } = report;

    let mut testsuites_tag = BytesStart::new(TESTSUITES_TAG);
    if let Some(name) = name {
        testsuites_tag.push_attribute(("name", name.as_str()));
    }
    testsuites_tag.push_attribute(("tests", tests.to_string().as_str()));
    testsuites_tag.push_attribute(("failures", failures.to_string().as_str()));
    testsuites_tag.push_attribute(("errors", errors.to_string().as_str()));
    testsuites_tag.push_attribute(("skipped", skipped.to_string().as_str()));
    if let Some(time) = time {
        testsuites_tag.push_attribute(("time", serialize_time(time).as_str()));
    }
    if let Some(timestamp) = timestamp {
        testsuites_tag.push_attribute(("timestamp", format!("{}", timestamp.format("%+")).as_str()));
    }
    writer.write_event(Event::Start(testsuites_tag))?;

    serialize_properties(properties, writer)?;

    for test_suite in test_suites {
        serialize_test_suite(test_suite, writer)?;
    }

    serialize_end_tag(TESTSUITES_TAG, writer)?;
    Ok(())
}

fn serialize_test_suite(test_suite: &TestSuite, writer: &mut Writer<impl io::Write>) -> Result {
    // Use the destructuring syntax to ensure that all fields are handled.
    let TestSuite {
        name,
        tests,
        errors,
        failures,
        skipped,
        timestamp,
        time,
        test_cases,
        properties,
        system_out,
        system_err,
        extra,
    } = test_suite;

    let mut testsuite_tag = BytesStart::new(TESTSUITE_TAG);
    testsuite_tag.push_attribute(("name", name.as_str()));
    testsuite_tag.push_attribute(("tests", tests.to_string().as_str()));
    testsuite_tag.push_attribute(("failures", failures.to_string().as_str()));
    testsuite_tag.push_attribute(("errors", errors.to_string().as_str()));
    testsuite_tag.push_attribute(("skipped", skipped.to_string().as_str()));
    if let Some(time) = time {
        testsuite_tag.push_attribute(("time", serialize_time(time).as_str()));
    }
    if let Some(timestamp) = timestamp {
        testsuite_tag.push_attribute(("timestamp", format!("{}", timestamp.format("%+")).as_str()));
    }
    for (k, v) in extra {
        testsuite_tag.push_attribute((k.as_str(), v.as_str()));
    }
    writer.write_event(Event::Start(testsuite_tag))?;

    serialize_properties(properties, writer)?;

    for test_case in test_cases {
        serialize_test_case(test_case, writer)?;
    }

    if let Some(system_out) = system_out {
        serialize_output(system_out, SYSTEM_OUT_TAG, writer)?;
    }
    if let Some(system_err) = system_err {
        serialize_output(system_err, SYSTEM_ERR_TAG, writer)?;
    }

    serialize_end_tag(TESTSUITE_TAG, writer)?;
    Ok(())
}

fn serialize_properties(properties: &PropertySet, writer: &mut Writer<impl io::Write>) -> Result {
    if properties.is_empty() {
        return Ok(());
    }

    serialize_empty_start_tag(PROPERTIES_TAG, writer)?;
    for (name, value) in properties.iter() {
        let mut property_tag = BytesStart::new(PROPERTY_TAG);
        property_tag.push_attribute(("name", name));
        property_tag.push_attribute(("value", value));
        writer.write_event(Event::Empty(property_tag))?;
    }
    serialize_end_tag(PROPERTIES_TAG, writer)
}

fn serialize_test_case(test_case: &TestCase, writer: &mut Writer<impl io::Write>) -> Result {
    let TestCase {
        name,
        classname,
        time,
        status,
        properties,
        system_out,
        system_err,
        extra,
    } = test_case;

    let mut testcase_tag = BytesStart::new(TESTCASE_TAG);
    testcase_tag.push_attribute(("name", name.as_str()));
    if let Some(classname) = classname {
        testcase_tag.push_attribute(("classname", classname.as_str()));
    }
    if let Some(time) = time {
        testcase_tag.push_attribute(("time", serialize_time(time).as_str()));
    }
    if matches!(status, TestCaseStatus::Success) {
        testcase_tag.push_attribute(("status", SUCCESS_STATUS));
    }
    for (k, v) in extra {
        testcase_tag.push_attribute((k.as_str(), v.as_str()));
    }
    writer.write_event(Event::Start(testcase_tag))?;

    serialize_properties(properties, writer)?;

    match status {
        TestCaseStatus::Success => {}
        TestCaseStatus::NonSuccess {
            kind,
            message,
            ty,
            description,
        } => {
            let tag_name = match kind {
                NonSuccessKind::Failure => FAILURE_TAG,
                NonSuccessKind::Error => ERROR_TAG,
            };
            serialize_status(
                message.as_deref(),
                ty.as_deref(),
                description.as_deref(),
                tag_name,
                writer,
            )?;
        }
        TestCaseStatus::Skipped {
            message,
            ty,
            description,
        } => {
            serialize_status(
                message.as_deref(),
                ty.as_deref(),
                description.as_deref(),
                SKIPPED_TAG,
                writer,
            )?;
        }
    }

    if let Some(system_out) = system_out {
        serialize_output(system_out, SYSTEM_OUT_TAG, writer)?;
    }
    if let Some(system_err) = system_err {
        serialize_output(system_err, SYSTEM_ERR_TAG, writer)?;
    }

    serialize_end_tag(TESTCASE_TAG, writer)
}

fn serialize_status(
    message: Option<&str>,
    ty: Option<&str>,
    description: Option<&str>,
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> Result {
    let mut tag = BytesStart::new(tag_name);
    if let Some(message) = message {
        tag.push_attribute(("message", message));
    }
    if let Some(ty) = ty {
        tag.push_attribute(("type", ty));
    }

    match description {
        Some(description) => {
            writer.write_event(Event::Start(tag))?;
            writer.write_event(Event::Text(BytesText::new(description)))?;
            serialize_end_tag(tag_name, writer)?;
        }
        None => {
            writer.write_event(Event::Empty(tag))?;
        }
    }

    Ok(())
}

fn serialize_output(
    output: &Output,
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> Result {
    serialize_empty_start_tag(tag_name, writer)?;
    writer.write_event(Event::Text(BytesText::new(output.as_str())))?;
    serialize_end_tag(tag_name, writer)
}

fn serialize_empty_start_tag(tag_name: &'static str, writer: &mut Writer<impl io::Write>) -> Result {
    writer.write_event(Event::Start(BytesStart::new(tag_name)))?;
    Ok(())
}

fn serialize_end_tag(tag_name: &'static str, writer: &mut Writer<impl io::Write>) -> Result {
    writer.write_event(Event::End(BytesEnd::new(tag_name)))?;
    Ok(())
}

// Serialize time as seconds with 3 decimal points.
fn serialize_time(time: &Duration) -> String {
    format!("{:.3}", time.as_secs_f64())
}
