// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    exit_codes::PolarizerExitCode,
    output::{NO_HEADING_TARGET, StderrStyles},
};
use camino::FromPathBufError;
use owo_colors::OwoColorize;
use polarizer_reporter::errors::{
    ConfigParseError, InputReadError, MappingError, WriteReportError,
};
use std::{error::Error, io};
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("mapping error")]
    MappingError {
        #[from]
        err: MappingError,
    },
    #[error("input read error")]
    InputReadError {
        #[from]
        err: InputReadError,
    },
    #[error("temp dir is not valid UTF-8")]
    TempDirInvalidUtf8 {
        #[source]
        err: FromPathBufError,
    },
    #[error("write report error")]
    WriteReportError {
        #[from]
        err: WriteReportError,
    },
    #[error("error writing to output")]
    WriteOutputError {
        #[source]
        err: io::Error,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. } | Self::TempDirInvalidUtf8 { .. } => {
                PolarizerExitCode::SETUP_ERROR
            }
            Self::MappingError { .. } => PolarizerExitCode::MAPPING_ERROR,
            Self::InputReadError { err } => match err {
                InputReadError::Read { .. } => PolarizerExitCode::SETUP_ERROR,
                _ => PolarizerExitCode::XUNIT_PARSE_ERROR,
            },
            Self::WriteReportError { .. } | Self::WriteOutputError { .. } => {
                PolarizerExitCode::WRITE_OUTPUT_ERROR
            }
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::ConfigParseError { err } => {
                error!(
                    "failed to parse polarizer config at `{}`",
                    err.config_file().style(styles.bold)
                );
                Some(err.kind() as &dyn Error)
            }
            Self::MappingError { err } => {
                if err.is_unresolved() {
                    error!("{err}");
                    err.source()
                } else {
                    error!("failed to resolve test cases through the mapping file");
                    Some(err as &dyn Error)
                }
            }
            Self::InputReadError { err } => {
                error!("failed to read input");
                Some(err as &dyn Error)
            }
            Self::TempDirInvalidUtf8 { err } => {
                error!(
                    "system temp dir `{}` is not valid UTF-8 (pass in --output-dir or --output)",
                    err.as_path().display().style(styles.bold)
                );
                None
            }
            Self::WriteReportError { err } => {
                error!("failed to write report");
                Some(err as &dyn Error)
            }
            Self::WriteOutputError { err } => {
                error!("error writing report path to output");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
