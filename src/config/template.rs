//! Template kinds a provider repository can be generated from

use crate::error::MigrateError;
use std::fmt;
use std::str::FromStr;

/// The template set a repository was rendered with
///
/// Migration units use it to decide whether they apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TemplateKind {
    /// A Terraform-bridged provider living in the `pulumi` organization
    #[default]
    BridgedProvider,
    /// A Terraform-bridged provider maintained outside the `pulumi` organization
    ExternalBridgedProvider,
    /// A native provider with no bridge
    Generic,
}

impl TemplateKind {
    pub const ALL: [Self; 3] = [
        Self::BridgedProvider,
        Self::ExternalBridgedProvider,
        Self::Generic,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BridgedProvider => "bridged-provider",
            Self::ExternalBridgedProvider => "external-bridged-provider",
            Self::Generic => "generic",
        }
    }

    /// Whether this is one of the bridged template kinds
    #[must_use]
    pub const fn is_bridged(self) -> bool {
        matches!(self, Self::BridgedProvider | Self::ExternalBridgedProvider)
    }
}

impl FromStr for TemplateKind {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|kind| kind.as_str()).collect();
                MigrateError::configuration(format!(
                    "Unknown template '{s}'. Expected one of: {}",
                    known.join(", ")
                ))
            })
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
