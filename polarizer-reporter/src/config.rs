// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporter configuration.
//!
//! The configuration is read once and then passed by reference to every component that needs it.
//! It can be written as YAML, JSON or TOML; the format is picked from the file extension.

use crate::{
    errors::{ConfigParseError, ConfigParseErrorKind},
    ledger::DEFAULT_LEDGER_PATH,
};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigError, File, FileFormat};
use debug_ignore::DebugIgnore;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use tracing::warn;

/// The name of the server entry that identifies the Polarion user.
pub const POLARION_SERVER: &str = "polarion";

/// Configuration for generating and augmenting Polarion XUnit reports.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct XUnitConfig {
    /// The Polarion project that test cases are resolved against.
    pub project: String,

    /// The path to the mapping file.
    pub mapping: Utf8PathBuf,

    /// Where to record tests that couldn't be found in the mapping file.
    #[serde(default = "default_ledger_path")]
    pub bad_test_ledger: Utf8PathBuf,

    /// Remote servers, keyed by name. A `polarion` entry is required.
    #[serde(default)]
    pub servers: IndexMap<String, ServerInfo>,

    /// Settings for the generated XUnit document.
    #[serde(default)]
    pub xunit: XUnitInfo,
}

impl XUnitConfig {
    /// Loads and validates the configuration at `config_file`.
    pub fn from_path(config_file: &Utf8Path) -> Result<Self, ConfigParseError> {
        let format = Self::format_for(config_file)
            .ok_or_else(|| ConfigParseError::new(config_file, ConfigParseErrorKind::UnknownFormat))?;
        let builder = Config::builder().add_source(File::new(config_file.as_str(), format));
        let config = builder.build().map_err(|error| {
            ConfigParseError::new(
                config_file,
                ConfigParseErrorKind::BuildError(Box::new(error)),
            )
        })?;

        let (this, unknown) = Self::deserialize_config(config)
            .map_err(|kind| ConfigParseError::new(config_file, kind))?;
        for key in &unknown {
            warn!("ignoring unknown configuration key `{key}` in {config_file}");
        }

        this.validate()
            .map_err(|kind| ConfigParseError::new(config_file, kind))?;
        Ok(this)
    }

    /// Returns the server entry for Polarion, if configured.
    pub fn polarion_server(&self) -> Option<&ServerInfo> {
        self.servers.get(POLARION_SERVER)
    }

    /// Returns the Polarion user id, or an empty string if no Polarion server is configured.
    pub fn user_id(&self) -> &str {
        self.polarion_server()
            .map_or("", |server| server.user.as_str())
    }

    fn format_for(config_file: &Utf8Path) -> Option<FileFormat> {
        match config_file.extension()? {
            "yaml" | "yml" => Some(FileFormat::Yaml),
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }

    /// This returns a tuple of (config, ignored paths).
    fn deserialize_config(
        config: Config,
    ) -> Result<(Self, BTreeSet<String>), ConfigParseErrorKind> {
        let mut ignored = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            ignored.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let this: Self = serde_path_to_error::deserialize(ignored_de).map_err(|error| {
            // The path is tracked by serde_path_to_error, so drop the key from the config error.
            let path = error.path().clone();
            let error = match error.into_inner() {
                ConfigError::At { error, .. } => *error,
                other => other,
            };
            ConfigParseErrorKind::DeserializeError(Box::new(serde_path_to_error::Error::new(
                path, error,
            )))
        })?;

        Ok((this, ignored))
    }

    fn validate(&self) -> Result<(), ConfigParseErrorKind> {
        if self.project.trim().is_empty() {
            return Err(ConfigParseErrorKind::EmptyProject);
        }
        let server =
            self.polarion_server()
                .ok_or_else(|| ConfigParseErrorKind::MissingPolarionServer {
                    known: self.servers.keys().cloned().collect(),
                })?;
        if server.user.trim().is_empty() {
            return Err(ConfigParseErrorKind::EmptyPolarionUser);
        }
        Ok(())
    }
}

fn default_ledger_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_LEDGER_PATH)
}

/// Connection details for a remote server.
///
/// Only the user is consumed while building reports; the rest is carried so a single
/// configuration file can be shared with the importer.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerInfo {
    /// The server URL.
    pub url: String,

    /// The authentication domain, if any.
    #[serde(default)]
    pub domain: Option<String>,

    /// The user name.
    pub user: String,

    /// The password. Never printed.
    #[serde(deserialize_with = "deserialize_secret")]
    pub password: DebugIgnore<String>,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<DebugIgnore<String>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(DebugIgnore)
}

/// The `xunit` section of the configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct XUnitInfo {
    /// Test run identification.
    #[serde(default)]
    pub testrun: TestRunInfo,

    /// The response selector, emitted as `polarion-response-<name>`.
    #[serde(default)]
    pub selector: SelectorInfo,

    /// Custom properties and test suite flags.
    #[serde(default)]
    pub custom: CustomInfo,
}

/// Test run identification. Empty values are not emitted.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestRunInfo {
    /// The test run id.
    #[serde(default)]
    pub id: String,

    /// The test run title.
    #[serde(default)]
    pub title: String,

    /// The test run template id.
    #[serde(default)]
    pub template_id: String,

    /// The test run type id.
    #[serde(default, rename = "type")]
    pub type_id: String,

    /// The group id.
    #[serde(default)]
    pub group_id: String,
}

/// The response selector.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SelectorInfo {
    /// The selector name.
    #[serde(default)]
    pub name: String,

    /// The selector value.
    #[serde(default)]
    pub value: String,
}

/// The `xunit.custom` section.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CustomInfo {
    /// Flags that are always emitted as report properties.
    #[serde(default)]
    pub test_suite: TestSuiteFlags,

    /// Custom fields, emitted as `polarion-custom-<key>` in configuration order.
    #[serde(default)]
    pub properties: IndexMap<String, String>,
}

/// Flags that control how the importer treats the test run.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct TestSuiteFlags {
    /// Whether the import is a dry run.
    #[serde(default)]
    pub dry_run: bool,

    /// Whether the test run is marked as finished after the import.
    #[serde(default = "default_true")]
    pub set_testrun_finished: bool,

    /// Whether skipped tests are included in the test run.
    #[serde(default)]
    pub include_skipped: bool,
}

impl Default for TestSuiteFlags {
    fn default() -> Self {
        Self {
            dry_run: false,
            set_testrun_finished: true,
            include_skipped: false,
        }
    }
}

fn default_true() -> bool {
    true
}
