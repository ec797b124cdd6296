// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Writing reports to disk.

use crate::errors::WriteReportError;
use camino::{Utf8Path, Utf8PathBuf};
use polarion_xunit::Report;
use std::io::{BufWriter, Write};

/// Where a report is written.
#[derive(Clone, Debug)]
pub enum ReportDestination {
    /// Write to exactly this path, replacing any existing file.
    Path(Utf8PathBuf),

    /// Write to a new file named `polarion-xunit-*.xml` in this directory.
    TempFileIn(Utf8PathBuf),
}

/// Writes `report` to `destination` and returns the path written to.
///
/// On Unix, generated temporary files are made readable and writable by their owner and group.
pub fn write_report(
    report: &Report,
    destination: &ReportDestination,
) -> Result<Utf8PathBuf, WriteReportError> {
    let (file, path) = match destination {
        ReportDestination::Path(path) => {
            let file = fs_err::File::create(path).map_err(|error| WriteReportError::Create {
                path: path.clone(),
                error,
            })?;
            (file.into_parts().0, path.clone())
        }
        ReportDestination::TempFileIn(dir) => {
            let (file, path) = create_temp_file(dir)?;
            set_group_permissions(&path)?;
            (file, path)
        }
    };

    let mut writer = BufWriter::new(file);
    report
        .serialize(&mut writer)
        .map_err(|error| WriteReportError::Serialize {
            path: path.clone(),
            error,
        })?;
    writer
        .flush()
        .map_err(|error| WriteReportError::Serialize {
            path: path.clone(),
            error: error.into(),
        })?;

    Ok(path)
}

fn create_temp_file(dir: &Utf8Path) -> Result<(std::fs::File, Utf8PathBuf), WriteReportError> {
    let create_error = |error: std::io::Error| WriteReportError::CreateTemp {
        dir: dir.to_owned(),
        error,
    };
    camino_tempfile::Builder::new()
        .prefix("polarion-xunit-")
        .suffix(".xml")
        .tempfile_in(dir)
        .map_err(create_error)?
        .keep()
        .map_err(|err| create_error(err.error))
}

#[cfg(unix)]
fn set_group_permissions(path: &Utf8Path) -> Result<(), WriteReportError> {
    use std::{fs::Permissions, os::unix::fs::PermissionsExt};

    fs_err::set_permissions(path, Permissions::from_mode(0o660)).map_err(|error| {
        WriteReportError::SetPermissions {
            path: path.to_owned(),
            error,
        }
    })
}

#[cfg(not(unix))]
fn set_group_permissions(_path: &Utf8Path) -> Result<(), WriteReportError> {
    Ok(())
}
