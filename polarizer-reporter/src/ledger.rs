// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The bad-test ledger: a text file of tests missing from the mapping file.

use camino::{Utf8Path, Utf8PathBuf};
use std::io::{self, Write};
use tracing::{debug, error, warn};

/// The ledger path used when none is configured.
pub const DEFAULT_LEDGER_PATH: &str = "/tmp/bad-tests.txt";

/// An append-only text file listing tests that couldn't be found in the mapping file.
///
/// The file is opened and closed for every record, and failing to write to it never aborts
/// report generation.
#[derive(Clone, Debug)]
pub struct BadTestLedger {
    path: Utf8PathBuf,
}

impl BadTestLedger {
    /// Creates a ledger that writes to `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the ledger file.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Removes records left over from a previous run.
    pub fn reset(&self) {
        match fs_err::remove_file(&self.path) {
            Ok(()) => debug!("removed previous bad-test ledger {}", self.path),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!("could not reset bad-test ledger: {err}"),
        }
    }

    /// Records that `qualified_name` has no mapping for `project`.
    pub fn record(&self, qualified_name: &str, project: &str) {
        let line = format!("{qualified_name} does not exist in mapping file for Project {project}");
        error!("{line}");
        if let Err(err) = self.append(&line) {
            warn!("could not write to bad-test ledger: {err}");
        }
    }

    fn append(&self, line: &str) -> io::Result<()> {
        let mut file = fs_err::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::tempdir;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_are_appended_and_reset() {
        let dir = tempdir().expect("created temp dir");
        let ledger = BadTestLedger::new(dir.path().join("bad-tests.txt"));

        ledger.reset();
        ledger.record("com.example.T.a", "PROJ");
        ledger.record("com.example.T.b", "PROJ");

        let contents = fs_err::read_to_string(ledger.path()).expect("ledger exists");
        assert_eq!(
            contents,
            "com.example.T.a does not exist in mapping file for Project PROJ\n\
             com.example.T.b does not exist in mapping file for Project PROJ\n"
        );

        ledger.reset();
        assert!(!ledger.path().exists(), "reset removes the ledger");
    }

    #[test]
    fn write_failures_are_swallowed() {
        let dir = tempdir().expect("created temp dir");
        let ledger = BadTestLedger::new(dir.path().join("missing-dir").join("bad-tests.txt"));

        ledger.reset();
        ledger.record("com.example.T.a", "PROJ");
        assert!(!ledger.path().exists());
    }
}
