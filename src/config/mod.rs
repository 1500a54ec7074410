//! Configuration management module
//!
//! Loads `.ci-mgmt.yaml` and resolves the template a repository was
//! generated from.

pub mod template;
pub mod yaml;

pub use template::TemplateKind;

use crate::system::System;
use serde::Deserialize;
use std::path::Path;

/// Name of the ci-mgmt configuration file at the repository root
pub const CI_MGMT_FILE: &str = ".ci-mgmt.yaml";

/// The subset of `.ci-mgmt.yaml` the migration engine reads
///
/// Every other key is kept in `extra` untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CiMgmtConfig {
    pub template: Option<String>,
    pub repository: Option<String>,
    pub provider: Option<String>,
    pub organization: Option<String>,

    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

impl CiMgmtConfig {
    /// Load configuration from file, or `None` when the file does not exist
    pub fn load_optional(system: &dyn System, path: &Path) -> anyhow::Result<Option<Self>> {
        yaml::load_config(system, path)
    }

    /// Pick the template: explicit override, then the config file, then
    /// `bridged-provider`
    pub fn resolve_template(
        config: Option<&Self>,
        override_name: Option<&str>,
    ) -> anyhow::Result<TemplateKind> {
        let name = override_name.or_else(|| config.and_then(|c| c.template.as_deref()));
        match name {
            Some(name) => Ok(name.parse()?),
            None => Ok(TemplateKind::default()),
        }
    }
}
