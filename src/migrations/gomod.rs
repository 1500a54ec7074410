//! Go module descriptor as printed by `go mod edit -json`
//!
//! The descriptor is only read; every change to `go.mod` goes back through
//! `go mod edit`.

use crate::error::MigrateError;
use crate::operations::run_checked;
use crate::system::{CommandSpec, System};
use anyhow::{Context as _, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Module {
    pub path: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ModPath {
    pub path: String,
    pub deprecated: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Requirement {
    pub path: String,
    pub version: String,
    pub indirect: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Replace {
    pub old: Module,
    pub new: Module,
}

impl Replace {
    /// Left-hand side as accepted by `go mod edit -replace`
    #[must_use]
    pub fn old_spec(&self) -> String {
        if self.old.version.is_empty() {
            self.old.path.clone()
        } else {
            format!("{}@{}", self.old.path, self.old.version)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Retract {
    pub low: String,
    pub high: String,
    pub rationale: String,
}

/// Structured projection of a `go.mod` file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GoMod {
    pub module: ModPath,
    pub go: String,
    pub toolchain: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub require: Vec<Requirement>,
    #[serde(deserialize_with = "null_as_empty")]
    pub exclude: Vec<Module>,
    #[serde(deserialize_with = "null_as_empty")]
    pub replace: Vec<Replace>,
    #[serde(deserialize_with = "null_as_empty")]
    pub retract: Vec<Retract>,
}

impl GoMod {
    /// Parse the JSON printed by `go mod edit -json`
    ///
    /// # Errors
    ///
    /// Returns `MigrateError::Parse` for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| MigrateError::parse(format!("reading go.mod: {err}")).into())
    }

    /// Run `go mod edit -json <file>` inside `dir` and parse the output
    ///
    /// # Errors
    ///
    /// Returns an error when the command fails or prints malformed JSON.
    pub fn load(system: &dyn System, dir: &Path, file: &str) -> Result<Self> {
        let output = run_checked(
            system,
            &CommandSpec::new("go", dir).args(["mod", "edit", "-json", file]),
        )
        .with_context(|| format!("exporting {file}"))?;
        Self::from_json(&output.stdout)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
