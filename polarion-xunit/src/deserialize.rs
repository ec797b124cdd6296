// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deserialize a `Report` from either a `<testsuites>` or a `<testsuite>` document.

use crate::{
    DeserializeError, NonSuccessKind, PropertySet, Report, TestCase, TestCaseStatus, TestSuite,
    serialize::{
        ERROR_TAG, FAILURE_TAG, PROPERTIES_TAG, PROPERTY_TAG, SKIPPED_TAG, SYSTEM_ERR_TAG,
        SYSTEM_OUT_TAG, TESTCASE_TAG, TESTSUITE_TAG, TESTSUITES_TAG,
    },
};
use chrono::DateTime;
use indexmap::IndexMap;
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use std::time::Duration;

type Result<T, E = DeserializeError> = std::result::Result<T, E>;

pub(crate) fn deserialize_report(xml: &str) -> Result<Report> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut state = DeserializeState::default();
    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                state.open(&name, &e, false)?;
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                state.open(&name, &e, true)?;
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                state.close(&name);
            }
            Event::Text(e) => {
                if state.capturing() {
                    state.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if state.capturing() {
                    state.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            _ => {}
        }
        if state.done {
            break;
        }
    }

    state.finish()
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Root {
    Multi,
    Single,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Capture {
    Status,
    SystemOut,
    SystemErr,
}

/// Counts read from attributes. They take precedence over counts computed from children.
#[derive(Copy, Clone, Debug, Default)]
struct DeclaredCounts {
    tests: Option<usize>,
    failures: Option<usize>,
    errors: Option<usize>,
    skipped: Option<usize>,
}

impl DeclaredCounts {
    fn read(attrs: &mut IndexMap<String, String>, element: &'static str) -> Result<Self> {
        let skipped = match parse_count(attrs, element, "skipped")? {
            Some(skipped) => Some(skipped),
            None => parse_count(attrs, element, "disabled")?,
        };
        Ok(Self {
            tests: parse_count(attrs, element, "tests")?,
            failures: parse_count(attrs, element, "failures")?,
            errors: parse_count(attrs, element, "errors")?,
            skipped,
        })
    }
}

#[derive(Debug, Default)]
struct DeserializeState {
    root: Option<Root>,
    report: Report,
    report_counts: DeclaredCounts,
    current_suite: Option<(TestSuite, DeclaredCounts)>,
    current_case: Option<TestCase>,
    capture: Option<Capture>,
    text: String,
    done: bool,
}

impl DeserializeState {
    fn capturing(&self) -> bool {
        self.capture.is_some()
    }

    fn open(&mut self, name: &str, e: &BytesStart<'_>, empty: bool) -> Result<()> {
        if self.root.is_none() {
            return self.open_root(name, e, empty);
        }

        match name {
            n if n == TESTSUITES_TAG => Err(DeserializeError::Misplaced {
                element: TESTSUITES_TAG,
                parent: "the document root",
            }),
            n if n == TESTSUITE_TAG => {
                if self.root == Some(Root::Single) || self.current_suite.is_some() {
                    return Err(DeserializeError::Misplaced {
                        element: TESTSUITE_TAG,
                        parent: TESTSUITES_TAG,
                    });
                }
                self.open_test_suite(e)?;
                if empty {
                    self.close_test_suite();
                }
                Ok(())
            }
            n if n == TESTCASE_TAG => {
                if self.current_suite.is_none() {
                    return Err(DeserializeError::Misplaced {
                        element: TESTCASE_TAG,
                        parent: TESTSUITE_TAG,
                    });
                }
                self.open_test_case(e)?;
                if empty {
                    self.close_test_case();
                }
                Ok(())
            }
            n if n == PROPERTY_TAG => self.add_property(e),
            n if n == FAILURE_TAG || n == ERROR_TAG || n == SKIPPED_TAG => {
                self.set_test_case_status(name, e)?;
                if !empty {
                    self.start_capture(Capture::Status);
                }
                Ok(())
            }
            n if n == SYSTEM_OUT_TAG && !empty => {
                self.start_capture(Capture::SystemOut);
                Ok(())
            }
            n if n == SYSTEM_ERR_TAG && !empty => {
                self.start_capture(Capture::SystemErr);
                Ok(())
            }
            // <properties> is only a container, and unknown elements are ignored.
            _ => Ok(()),
        }
    }

    fn open_root(&mut self, name: &str, e: &BytesStart<'_>, empty: bool) -> Result<()> {
        if name == TESTSUITES_TAG {
            self.root = Some(Root::Multi);
            let mut attrs = collect_attributes(e)?;
            self.report_counts = DeclaredCounts::read(&mut attrs, TESTSUITES_TAG)?;
            self.report.name = attrs.shift_remove("name");
            self.report.time = parse_time(&mut attrs, TESTSUITES_TAG)?;
            if let Some(timestamp) = attrs.shift_remove("timestamp") {
                if let Ok(timestamp) = DateTime::parse_from_rfc3339(&timestamp) {
                    self.report.timestamp = Some(timestamp);
                }
            }
            self.done = empty;
            Ok(())
        } else if name == TESTSUITE_TAG {
            self.root = Some(Root::Single);
            self.open_test_suite(e)?;
            if empty {
                self.close_test_suite();
            }
            Ok(())
        } else {
            Err(DeserializeError::UnexpectedRoot {
                name: name.to_owned(),
            })
        }
    }

    fn close(&mut self, name: &str) {
        match name {
            n if n == TESTSUITES_TAG => self.done = true,
            n if n == TESTSUITE_TAG => self.close_test_suite(),
            n if n == TESTCASE_TAG => self.close_test_case(),
            n if n == FAILURE_TAG || n == ERROR_TAG || n == SKIPPED_TAG => {
                self.finish_capture(Capture::Status)
            }
            n if n == SYSTEM_OUT_TAG => self.finish_capture(Capture::SystemOut),
            n if n == SYSTEM_ERR_TAG => self.finish_capture(Capture::SystemErr),
            n if n == PROPERTIES_TAG => {}
            _ => {}
        }
    }

    fn open_test_suite(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let mut attrs = collect_attributes(e)?;
        let name = attrs
            .shift_remove("name")
            .ok_or(DeserializeError::MissingAttribute {
                element: TESTSUITE_TAG,
                attr: "name",
            })?;
        let counts = DeclaredCounts::read(&mut attrs, TESTSUITE_TAG)?;

        let mut test_suite = TestSuite::new(name);
        test_suite.time = parse_time(&mut attrs, TESTSUITE_TAG)?;
        if let Some(timestamp) = attrs.shift_remove("timestamp") {
            match DateTime::parse_from_rfc3339(&timestamp) {
                Ok(timestamp) => {
                    test_suite.set_timestamp(timestamp);
                }
                Err(_) => {
                    // Keep timestamps in formats we don't understand verbatim.
                    test_suite.extra.insert("timestamp".to_owned(), timestamp);
                }
            }
        }
        test_suite.extra.extend(attrs);

        self.current_suite = Some((test_suite, counts));
        Ok(())
    }

    fn close_test_suite(&mut self) {
        let Some((mut test_suite, counts)) = self.current_suite.take() else {
            return;
        };
        apply_declared_counts(&mut test_suite, counts);
        self.report.add_test_suite(test_suite);
        if self.root == Some(Root::Single) {
            self.done = true;
        }
    }

    fn open_test_case(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let mut attrs = collect_attributes(e)?;
        let name = attrs
            .shift_remove("name")
            .ok_or(DeserializeError::MissingAttribute {
                element: TESTCASE_TAG,
                attr: "name",
            })?;

        let mut test_case = TestCase::new(name, TestCaseStatus::success());
        if let Some(classname) = attrs.shift_remove("classname") {
            test_case.set_classname(classname);
        }
        test_case.time = parse_time(&mut attrs, TESTCASE_TAG)?;
        // The status is derived from the child elements.
        attrs.shift_remove("status");
        test_case.extra = attrs;

        self.current_case = Some(test_case);
        Ok(())
    }

    fn close_test_case(&mut self) {
        if let (Some((test_suite, _)), Some(test_case)) =
            (self.current_suite.as_mut(), self.current_case.take())
        {
            test_suite.add_test_case(test_case);
        }
    }

    fn set_test_case_status(&mut self, name: &str, e: &BytesStart<'_>) -> Result<()> {
        let element = status_element(name);
        let test_case = self
            .current_case
            .as_mut()
            .ok_or(DeserializeError::Misplaced {
                element,
                parent: TESTCASE_TAG,
            })?;

        let mut status = if element == SKIPPED_TAG {
            TestCaseStatus::skipped()
        } else if element == FAILURE_TAG {
            TestCaseStatus::non_success(NonSuccessKind::Failure)
        } else {
            TestCaseStatus::non_success(NonSuccessKind::Error)
        };

        let mut attrs = collect_attributes(e)?;
        if let Some(message) = attrs.shift_remove("message") {
            status.set_message(message);
        }
        if let Some(ty) = attrs.shift_remove("type") {
            status.set_type(ty);
        }

        test_case.status = status;
        Ok(())
    }

    fn add_property(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let mut attrs = collect_attributes(e)?;
        let name = attrs
            .shift_remove("name")
            .ok_or(DeserializeError::MissingAttribute {
                element: PROPERTY_TAG,
                attr: "name",
            })?;
        let value = attrs.shift_remove("value").unwrap_or_default();

        self.innermost_properties().insert_if_absent((name, value));
        Ok(())
    }

    fn innermost_properties(&mut self) -> &mut PropertySet {
        if let Some(test_case) = self.current_case.as_mut() {
            &mut test_case.properties
        } else if let Some((test_suite, _)) = self.current_suite.as_mut() {
            &mut test_suite.properties
        } else {
            &mut self.report.properties
        }
    }

    fn start_capture(&mut self, capture: Capture) {
        self.capture = Some(capture);
        self.text.clear();
    }

    fn finish_capture(&mut self, capture: Capture) {
        if self.capture != Some(capture) {
            return;
        }
        self.capture = None;
        let text = std::mem::take(&mut self.text);
        if text.is_empty() {
            return;
        }

        match capture {
            Capture::Status => {
                if let Some(test_case) = self.current_case.as_mut() {
                    test_case.status.set_description(text);
                }
            }
            Capture::SystemOut => {
                if let Some(test_case) = self.current_case.as_mut() {
                    test_case.set_system_out(text);
                } else if let Some((test_suite, _)) = self.current_suite.as_mut() {
                    test_suite.set_system_out(text);
                }
            }
            Capture::SystemErr => {
                if let Some(test_case) = self.current_case.as_mut() {
                    test_case.set_system_err(text);
                } else if let Some((test_suite, _)) = self.current_suite.as_mut() {
                    test_suite.set_system_err(text);
                }
            }
        }
    }

    fn finish(mut self) -> Result<Report> {
        if self.root.is_none() {
            return Err(DeserializeError::MissingRoot);
        }
        if !self.done {
            let element = if self.current_case.is_some() {
                TESTCASE_TAG
            } else if self.current_suite.is_some() {
                TESTSUITE_TAG
            } else {
                TESTSUITES_TAG
            };
            return Err(DeserializeError::Truncated { element });
        }

        let DeclaredCounts {
            tests,
            failures,
            errors,
            skipped,
        } = self.report_counts;
        let report = &mut self.report;
        report.tests = tests.unwrap_or(report.tests);
        report.failures = failures.unwrap_or(report.failures);
        report.errors = errors.unwrap_or(report.errors);
        report.skipped = skipped.unwrap_or(report.skipped);

        Ok(self.report)
    }
}

fn status_element(name: &str) -> &'static str {
    if name == FAILURE_TAG {
        FAILURE_TAG
    } else if name == ERROR_TAG {
        ERROR_TAG
    } else {
        SKIPPED_TAG
    }
}

fn apply_declared_counts(test_suite: &mut TestSuite, counts: DeclaredCounts) {
    let DeclaredCounts {
        tests,
        failures,
        errors,
        skipped,
    } = counts;
    test_suite.tests = tests.unwrap_or(test_suite.tests);
    test_suite.failures = failures.unwrap_or(test_suite.failures);
    test_suite.errors = errors.unwrap_or(test_suite.errors);
    test_suite.skipped = skipped.unwrap_or(test_suite.skipped);
}

fn collect_attributes(e: &BytesStart<'_>) -> Result<IndexMap<String, String>> {
    let mut attrs = IndexMap::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn parse_count(
    attrs: &mut IndexMap<String, String>,
    element: &'static str,
    attr: &'static str,
) -> Result<Option<usize>> {
    attrs
        .shift_remove(attr)
        .map(|value| {
            value
                .trim()
                .parse::<usize>()
                .map_err(|_| DeserializeError::InvalidAttribute {
                    element,
                    attr,
                    value,
                })
        })
        .transpose()
}

fn parse_time(
    attrs: &mut IndexMap<String, String>,
    element: &'static str,
) -> Result<Option<Duration>> {
    attrs
        .shift_remove("time")
        .map(|value| {
            value
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .ok_or(DeserializeError::InvalidAttribute {
                    element,
                    attr: "time",
                    value,
                })
        })
        .transpose()
}
