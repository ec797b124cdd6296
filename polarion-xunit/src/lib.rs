// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generate and read XUnit reports accepted by the Polarion XUnit importer.
//!
//! The data model mirrors the usual JUnit/XUnit layout (`<testsuites>`, `<testsuite>`,
//! `<testcase>`), with ordered, name-unique [`PropertySet`]s attached to the report and to each
//! test case. Reports can be serialized with [`Report::serialize`] and read back with
//! [`Report::deserialize_str`], which accepts both multi-suite and single-suite documents.

#![warn(missing_docs)]

mod deserialize;
mod errors;
mod properties;
mod report;
mod serialize;

pub use errors::*;
pub use properties::*;
pub use report::*;
