// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `polarizer` failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum PolarizerExitCode {}

impl PolarizerExitCode {
    /// The report was written and its path printed.
    pub const OK: i32 = 0;

    /// The configuration or an input file could not be read, or is invalid.
    pub const SETUP_ERROR: i32 = 96;

    /// A test case could not be resolved through the mapping table, or the table could not be
    /// loaded.
    pub const MAPPING_ERROR: i32 = 97;

    /// An input document could not be parsed.
    pub const XUNIT_PARSE_ERROR: i32 = 98;

    /// Writing the report, or printing its path, failed.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
