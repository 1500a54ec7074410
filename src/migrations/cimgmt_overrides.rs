//! Moves `.ci-mgmt.yaml` `toolVersions` overrides to the root `mise.toml`

use super::Migration;
use crate::config::{CI_MGMT_FILE, TemplateKind};
use crate::edit::{SectionEntry, TomlDocument, YamlDocument};
use crate::system::System;
use anyhow::{Context as _, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Content of a root `mise.toml` created by this migration
const OVERRIDE_HEADER: &str = "# Overwrites mise configuration at .config/mise.toml\n[tools]\n";

/// Translate `toolVersions` into mise tool pins
///
/// Go is pinned by the managed configuration and is dropped. Wildcard
/// `.x` suffixes are removed and Java maps to the Corretto distribution.
#[must_use]
pub fn override_entries(tool_versions: &BTreeMap<String, String>) -> Vec<SectionEntry> {
    tool_versions
        .iter()
        .filter(|(tool, _)| tool.as_str() != "go")
        .map(|(tool, version)| {
            let version = version.strip_suffix(".x").unwrap_or(version);
            let version = if tool == "java" {
                format!("corretto-{version}")
            } else {
                version.to_owned()
            };
            SectionEntry::new(tool.clone(), version)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MigrateCimgmtOverrides;

impl Migration for MigrateCimgmtOverrides {
    fn name(&self) -> &'static str {
        "Migrate entries from .ci-mgmt.yml to the top level mise.toml override file"
    }

    fn should_run(&self, _template: TemplateKind) -> bool {
        true
    }

    fn migrate(&self, system: &dyn System, _template: TemplateKind, out_dir: &Path) -> Result<()> {
        let Some(mut ci_mgmt) = YamlDocument::load_optional(system, &out_dir.join(CI_MGMT_FILE))?
        else {
            debug!("No {CI_MGMT_FILE} in {}", out_dir.display());
            return Ok(());
        };
        if ci_mgmt.get_field("toolVersions").is_none() {
            return Ok(());
        }

        let tool_versions = ci_mgmt
            .field_to_string_map("toolVersions")
            .unwrap_or_default();
        let entries = override_entries(&tool_versions);

        let mut mise = TomlDocument::load(system, &out_dir.join("mise.toml"))?;
        if !entries.is_empty() {
            if mise.is_empty() {
                mise.set_content(OVERRIDE_HEADER);
            }
            let updated = mise
                .ensure_section_entries("tools", &entries)
                .context("error writing toolVersions to mise.toml")?;
            if updated {
                mise.write(system)?;
            }
        }

        ci_mgmt.delete_field("toolVersions");
        ci_mgmt.write(system)
    }
}
