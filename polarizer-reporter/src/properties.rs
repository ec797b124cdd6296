// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Polarion property names and the reconciliation of configured properties into a report.

use crate::config::XUnitConfig;
use polarion_xunit::{Property, PropertySet};
use tracing::info;

/// The test case property carrying the Polarion id.
pub const TESTCASE_ID: &str = "polarion-testcase-id";

/// The prefix of the test case properties carrying argument values.
pub const PARAMETER_PREFIX: &str = "polarion-parameter-";

/// A kind of report-level property derived from the configuration.
///
/// [`Self::ALL`] lists the kinds in the order their properties appear in the report.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReportPropertyKind {
    /// `polarion-user-id`.
    UserId,
    /// `polarion-project-id`.
    ProjectId,
    /// `polarion-set-testrun-finished`.
    SetTestrunFinished,
    /// `polarion-dry-run`.
    DryRun,
    /// `polarion-include-skipped`.
    IncludeSkipped,
    /// `polarion-response-<selector>`.
    Response,
    /// `polarion-custom-<key>`, one per custom field.
    Custom,
    /// `polarion-testrun-title`.
    TestrunTitle,
    /// `polarion-testrun-id`.
    TestrunId,
    /// `polarion-testrun-template-id`.
    TestrunTemplateId,
    /// `polarion-testrun-type-id`.
    TestrunTypeId,
    /// `polarion-group-id`.
    GroupId,
}

impl ReportPropertyKind {
    /// All kinds, in output order.
    pub const ALL: [Self; 12] = [
        Self::UserId,
        Self::ProjectId,
        Self::SetTestrunFinished,
        Self::DryRun,
        Self::IncludeSkipped,
        Self::Response,
        Self::Custom,
        Self::TestrunTitle,
        Self::TestrunId,
        Self::TestrunTemplateId,
        Self::TestrunTypeId,
        Self::GroupId,
    ];

    /// Returns true if this kind is emitted even when its value is empty.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            Self::UserId
                | Self::ProjectId
                | Self::SetTestrunFinished
                | Self::DryRun
                | Self::IncludeSkipped
        )
    }

    /// Returns the properties of this kind for `config`.
    ///
    /// Conditional kinds with an empty value produce nothing.
    pub fn properties(self, config: &XUnitConfig) -> Vec<Property> {
        let xunit = &config.xunit;
        let flags = &xunit.custom.test_suite;
        let single = |name: &str, value: &str| {
            if self.is_required() || !value.is_empty() {
                vec![Property::new(name, value)]
            } else {
                vec![]
            }
        };

        match self {
            Self::UserId => single("polarion-user-id", config.user_id()),
            Self::ProjectId => single("polarion-project-id", &config.project),
            Self::SetTestrunFinished => single(
                "polarion-set-testrun-finished",
                bool_str(flags.set_testrun_finished),
            ),
            Self::DryRun => single("polarion-dry-run", bool_str(flags.dry_run)),
            Self::IncludeSkipped => {
                single("polarion-include-skipped", bool_str(flags.include_skipped))
            }
            Self::Response => {
                let selector = &xunit.selector;
                if selector.name.is_empty() {
                    return vec![];
                }
                single(
                    &format!("polarion-response-{}", selector.name),
                    &selector.value,
                )
            }
            Self::Custom => xunit
                .custom
                .properties
                .iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(key, value)| Property::new(format!("polarion-custom-{key}"), value))
                .collect(),
            Self::TestrunTitle => single("polarion-testrun-title", &xunit.testrun.title),
            Self::TestrunId => single("polarion-testrun-id", &xunit.testrun.id),
            Self::TestrunTemplateId => {
                single("polarion-testrun-template-id", &xunit.testrun.template_id)
            }
            Self::TestrunTypeId => single("polarion-testrun-type-id", &xunit.testrun.type_id),
            Self::GroupId => single("polarion-group-id", &xunit.testrun.group_id),
        }
    }
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Returns the report-level properties for `config`, in output order.
pub fn report_properties(config: &XUnitConfig) -> Vec<Property> {
    ReportPropertyKind::ALL
        .iter()
        .flat_map(|kind| kind.properties(config))
        .collect()
}

/// Reconciles `batch` into `set`.
///
/// Existing entries whose value differs are overwritten in place, then entries that are still
/// missing are appended in batch order. Applying the same batch twice is a no-op.
pub fn reconcile(set: &mut PropertySet, batch: &[Property]) {
    for property in batch {
        if let Some(previous) = set.overwrite_if_present(property.clone()) {
            info!(
                "overwriting original value {previous} to {} for {}",
                property.value, property.name
            );
        }
    }
    for property in batch {
        if set.insert_if_absent(property.clone()) {
            info!("adding {} = {} to property list", property.name, property.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServerInfo, XUnitInfo};
    use camino::Utf8PathBuf;
    use debug_ignore::DebugIgnore;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn config() -> XUnitConfig {
        let mut servers = IndexMap::new();
        servers.insert(
            "polarion".to_owned(),
            ServerInfo {
                url: "https://polarion.example.com".to_owned(),
                domain: None,
                user: "ci-user".to_owned(),
                password: DebugIgnore("secret".to_owned()),
            },
        );
        XUnitConfig {
            project: "PLATTP".to_owned(),
            mapping: Utf8PathBuf::from("mapping.json"),
            bad_test_ledger: Utf8PathBuf::from("bad-tests.txt"),
            servers,
            xunit: XUnitInfo::default(),
        }
    }

    fn names(properties: &[Property]) -> Vec<&str> {
        properties.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn required_properties_only() {
        let properties = report_properties(&config());
        assert_eq!(
            properties,
            vec![
                Property::new("polarion-user-id", "ci-user"),
                Property::new("polarion-project-id", "PLATTP"),
                Property::new("polarion-set-testrun-finished", "true"),
                Property::new("polarion-dry-run", "false"),
                Property::new("polarion-include-skipped", "false"),
            ]
        );
    }

    #[test]
    fn conditional_properties_in_order() {
        let mut config = config();
        let xunit = &mut config.xunit;
        xunit.testrun.id = "run-1".to_owned();
        xunit.testrun.title = "Nightly".to_owned();
        xunit.testrun.group_id = "smoke".to_owned();
        xunit.selector.name = "rhcert".to_owned();
        xunit.selector.value = "nightly".to_owned();
        xunit
            .custom
            .properties
            .insert("arch".to_owned(), "x86_64".to_owned());
        xunit
            .custom
            .properties
            .insert("empty".to_owned(), String::new());
        xunit
            .custom
            .properties
            .insert("build".to_owned(), "1.2.3".to_owned());

        assert_eq!(
            names(&report_properties(&config)),
            vec![
                "polarion-user-id",
                "polarion-project-id",
                "polarion-set-testrun-finished",
                "polarion-dry-run",
                "polarion-include-skipped",
                "polarion-response-rhcert",
                "polarion-custom-arch",
                "polarion-custom-build",
                "polarion-testrun-title",
                "polarion-testrun-id",
                "polarion-group-id",
            ]
        );
    }

    #[test]
    fn empty_selector_value_is_skipped() {
        let mut config = config();
        config.xunit.selector.name = "rhcert".to_owned();
        assert!(ReportPropertyKind::Response.properties(&config).is_empty());
    }

    #[test]
    fn reconcile_overwrites_then_inserts() {
        let mut set: PropertySet = [
            ("polarion-testrun-title", "operator title"),
            ("polarion-project-id", "OLD"),
            ("unrelated", "kept"),
        ]
        .into_iter()
        .collect();

        let batch = report_properties(&config());
        reconcile(&mut set, &batch);

        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![
                ("polarion-testrun-title", "operator title"),
                ("polarion-project-id", "PLATTP"),
                ("unrelated", "kept"),
                ("polarion-user-id", "ci-user"),
                ("polarion-set-testrun-finished", "true"),
                ("polarion-dry-run", "false"),
                ("polarion-include-skipped", "false"),
            ]
        );

        let once = set.clone();
        reconcile(&mut set, &batch);
        assert_eq!(set, once, "reconciling twice is idempotent");
    }
}
