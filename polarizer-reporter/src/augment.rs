// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Polarion ids for existing XUnit documents.

use crate::{
    config::XUnitConfig,
    errors::{InputReadError, MappingError},
    mapping::MappingTable,
    properties::{TESTCASE_ID, reconcile, report_properties},
};
use camino::Utf8Path;
use polarion_xunit::{Property, Report};
use tracing::debug;

/// Reads an existing XUnit document. Single-suite documents are normalized into a report.
pub fn read_xunit(path: &Utf8Path) -> Result<Report, InputReadError> {
    let contents = fs_err::read_to_string(path).map_err(|error| InputReadError::Read {
        path: path.to_owned(),
        error,
    })?;
    Report::deserialize_str(&contents).map_err(|error| InputReadError::XUnit {
        path: path.to_owned(),
        error,
    })
}

/// Stamps every test case of `report` with its Polarion id and adds the configured report
/// properties.
///
/// The id from the mapping table replaces any id already present. Counts in the report are left
/// as they are.
///
/// # Errors
///
/// Fails if any test case is missing from the mapping table. `report` may be partially updated
/// in that case.
pub fn augment(
    config: &XUnitConfig,
    mapping: &MappingTable,
    report: &mut Report,
) -> Result<(), MappingError> {
    for test_suite in &mut report.test_suites {
        for test_case in &mut test_suite.test_cases {
            let qualified_name = test_case.qualified_name();
            let id_params = mapping.resolve(&qualified_name, &config.project)?;
            debug!(
                "using mapping file test case id {} for {qualified_name}",
                id_params.id
            );
            reconcile(
                &mut test_case.properties,
                &[Property::new(TESTCASE_ID, id_params.id.as_str())],
            );
        }
    }

    reconcile(&mut report.properties, &report_properties(config));
    Ok(())
}
