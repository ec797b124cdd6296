// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core logic for polarizer: turning test results into XUnit reports for the Polarion importer.
//!
//! Every reported test case carries its Polarion id (`polarion-testcase-id`) and its iteration
//! parameters (`polarion-parameter-<name>`), resolved through a [`MappingTable`]. There are two
//! entry points:
//!
//! * [`ReportGenerator`] builds a report from the raw [`RunResults`] of a run.
//! * [`augment`] stamps the ids onto an existing XUnit document.
//!
//! Both add the report-level properties derived from an [`XUnitConfig`].
//!
//! [`MappingTable`]: mapping::MappingTable
//! [`RunResults`]: run_results::RunResults
//! [`ReportGenerator`]: assembler::ReportGenerator
//! [`augment`]: augment::augment
//! [`XUnitConfig`]: config::XUnitConfig

pub mod aggregator;
pub mod assembler;
pub mod augment;
pub mod classify;
pub mod config;
pub mod errors;
pub mod helpers;
pub mod ledger;
pub mod mapping;
pub mod properties;
pub mod run_results;
