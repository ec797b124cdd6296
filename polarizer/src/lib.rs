// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generate XUnit reports for the Polarion XUnit importer.
//!
//! `polarizer` either assembles a report from raw run results or stamps Polarion test case ids
//! onto an existing XUnit document. The report logic lives in `polarizer-reporter`; this crate
//! is the command-line front end.

#![warn(missing_docs)]

mod dispatch;
mod errors;
pub mod exit_codes;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::OutputWriter;
