// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The mapping table: qualified test name to project to Polarion identifier and parameters.
//!
//! The table is read from a JSON file of the form:
//!
//! ```json
//! {
//!     "com.example.LoginTests.login": {
//!         "PLATTP": { "id": "PLATTP-1001", "parameters": ["user", "password"] }
//!     }
//! }
//! ```

use crate::errors::MappingError;
use camino::Utf8Path;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Deserialize;
use std::io;

/// The Polarion identifier of a test and the names of its positional parameters.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct IdParams {
    /// The Polarion test case id.
    pub id: String,

    /// Parameter names, in the order the test receives its arguments.
    #[serde(default)]
    pub parameters: Vec<String>,
}

impl IdParams {
    /// Creates a new `IdParams`.
    pub fn new(id: impl Into<String>, parameters: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            id: id.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }
}

/// A read-only table resolving qualified test names to [`IdParams`], per project.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct MappingTable {
    entries: IndexMap<String, IndexMap<String, IdParams>>,
}

impl MappingTable {
    /// Reads the mapping table at `path`.
    pub fn from_path(path: &Utf8Path) -> Result<Self, MappingError> {
        let contents = match fs_err::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(MappingError::FileNotFound {
                    path: path.to_owned(),
                });
            }
            Err(error) => {
                return Err(MappingError::Read {
                    path: path.to_owned(),
                    error,
                });
            }
        };

        serde_json::from_str(&contents).map_err(|error| MappingError::Parse {
            path: path.to_owned(),
            error,
        })
    }

    /// Adds or replaces the entry for `qualified_name` in `project`.
    pub fn insert(
        &mut self,
        qualified_name: impl Into<String>,
        project: impl Into<String>,
        id_params: IdParams,
    ) -> &mut Self {
        self.entries
            .entry(qualified_name.into())
            .or_default()
            .insert(project.into(), id_params);
        self
    }

    /// Returns the number of qualified names in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the identifier and parameters of `qualified_name` in `project`.
    pub fn resolve(&self, qualified_name: &str, project: &str) -> Result<&IdParams, MappingError> {
        let projects =
            self.entries
                .get(qualified_name)
                .ok_or_else(|| MappingError::NameNotFound {
                    qualified_name: qualified_name.to_owned(),
                })?;
        projects
            .get(project)
            .ok_or_else(|| MappingError::ProjectNotFound {
                qualified_name: qualified_name.to_owned(),
                project: project.to_owned(),
            })
    }

    /// Like [`Self::resolve`], but also checks that an invocation with `arg_count` arguments
    /// matches the declared parameters, and that no parameter name is declared twice.
    pub fn resolve_with_args(
        &self,
        qualified_name: &str,
        project: &str,
        arg_count: usize,
    ) -> Result<&IdParams, MappingError> {
        let id_params = self.resolve(qualified_name, project)?;
        if let Some(name) = id_params.parameters.iter().duplicates().next() {
            return Err(MappingError::DuplicateParameter {
                qualified_name: qualified_name.to_owned(),
                project: project.to_owned(),
                name: name.clone(),
            });
        }
        if id_params.parameters.len() != arg_count {
            return Err(MappingError::ParameterCountMismatch {
                qualified_name: qualified_name.to_owned(),
                project: project.to_owned(),
                parameters: id_params.parameters.clone(),
                actual: arg_count,
            });
        }
        Ok(id_params)
    }
}
