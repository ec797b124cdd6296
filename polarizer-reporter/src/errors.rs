// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by polarizer.

use camino::{Utf8Path, Utf8PathBuf};
use config::ConfigError;
use itertools::Itertools;
use polarion_xunit::{DeserializeError, SerializeError};
use std::io;
use thiserror::Error;

/// An error that occurred while loading the reporter configuration.
#[derive(Debug, Error)]
#[error("failed to parse polarizer config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8Path {
        &self.config_file
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while loading the reporter configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// The file extension doesn't name a supported format.
    #[error("unsupported config file extension (expected .yaml, .yml, .json or .toml)")]
    UnknownFormat,

    /// An error occurred while building the config.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// An error occurred while deserializing the config.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),

    /// The configured project is empty.
    #[error("`project` must not be empty")]
    EmptyProject,

    /// No Polarion server is configured.
    #[error("no `servers.polarion` entry found (known servers: {})", .known.iter().join(", "))]
    MissingPolarionServer {
        /// The names of the servers that are configured.
        known: Vec<String>,
    },

    /// The Polarion server has no user.
    #[error("`servers.polarion.user` must not be empty")]
    EmptyPolarionUser,
}

/// An error that occurred while loading or querying the mapping table.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MappingError {
    /// The mapping file doesn't exist.
    #[error("could not find mapping file `{path}`")]
    FileNotFound {
        /// The path to the mapping file.
        path: Utf8PathBuf,
    },

    /// The mapping file couldn't be read.
    #[error("error reading mapping file `{path}`")]
    Read {
        /// The path to the mapping file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The mapping file isn't valid mapping JSON.
    #[error("error parsing mapping file `{path}`")]
    Parse {
        /// The path to the mapping file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },

    /// The qualified name has no entry in the mapping table.
    #[error("{qualified_name} does not exist in mapping file")]
    NameNotFound {
        /// The qualified name that was looked up.
        qualified_name: String,
    },

    /// The qualified name exists, but not for this project.
    #[error("{qualified_name} does not exist in mapping file for Project {project}")]
    ProjectNotFound {
        /// The qualified name that was looked up.
        qualified_name: String,

        /// The project that was looked up.
        project: String,
    },

    /// The number of arguments an invocation was called with differs from the declared
    /// parameters.
    #[error(
        "{qualified_name} was invoked with {actual} argument(s), but the mapping file declares {} \
         parameter(s) for Project {project}: [{}]",
        .parameters.len(),
        .parameters.iter().join(", ")
    )]
    ParameterCountMismatch {
        /// The qualified name of the test.
        qualified_name: String,

        /// The project that was looked up.
        project: String,

        /// The parameter names declared in the mapping table.
        parameters: Vec<String>,

        /// The number of arguments the invocation was called with.
        actual: usize,
    },

    /// The mapping file declares the same parameter name more than once.
    #[error("{qualified_name} declares parameter `{name}` more than once for Project {project}")]
    DuplicateParameter {
        /// The qualified name of the test.
        qualified_name: String,

        /// The project that was looked up.
        project: String,

        /// The repeated parameter name.
        name: String,
    },
}

impl MappingError {
    /// Returns true if this error means that the test's identity couldn't be resolved.
    ///
    /// Such errors are recorded in the bad-test ledger during report generation instead of
    /// aborting the run.
    pub fn is_unresolved(&self) -> bool {
        matches!(
            self,
            MappingError::NameNotFound { .. } | MappingError::ProjectNotFound { .. }
        )
    }
}

/// An error that occurred while reading an input document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InputReadError {
    /// The input file couldn't be read.
    #[error("error reading input file `{path}`")]
    Read {
        /// The path to the input file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The input file is not an XUnit document.
    #[error("error parsing XUnit document `{path}`")]
    XUnit {
        /// The path to the input file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: DeserializeError,
    },

    /// The input file is not a run results document.
    #[error("error parsing run results `{path}`")]
    RunResults {
        /// The path to the input file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },
}

/// An error that occurred while writing a report to disk.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteReportError {
    /// A temporary output file couldn't be created.
    #[error("error creating output file in `{dir}`")]
    CreateTemp {
        /// The directory the file was to be created in.
        dir: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The output file couldn't be created.
    #[error("error creating output file `{path}`")]
    Create {
        /// The path to the output file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// Permissions couldn't be set on the output file.
    #[error("error setting permissions on `{path}`")]
    SetPermissions {
        /// The path to the output file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The report couldn't be serialized into the output file.
    #[error("error writing XUnit report to `{path}`")]
    Serialize {
        /// The path to the output file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: SerializeError,
    },
}
