//! Moves the legacy `plugins` list of `.ci-mgmt.yaml` into mise tool pins

use super::Migration;
use crate::config::{CI_MGMT_FILE, TemplateKind};
use crate::edit::yaml::scalar_to_string;
use crate::edit::{SectionEntry, TomlDocument, YamlDocument};
use crate::system::System;
use anyhow::{Context as _, Result};
use serde_yaml::Value;
use std::path::Path;
use tracing::debug;

/// mise backend that installs Pulumi plugins from GitHub releases
const VFOX_PULUMI_PLUGIN: &str = "vfox-pulumi";
const VFOX_PULUMI_URL: &str = "https://github.com/pulumi/vfox-pulumi";

/// A `{name, version, kind}` item of the legacy `plugins` list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginEntry {
    pub name: String,
    pub version: String,
    pub kind: String,
}

impl PluginEntry {
    /// GitHub organization publishing the plugin
    fn organization(&self) -> &'static str {
        // The time provider is community maintained
        if self.name == "time" {
            "pulumiverse"
        } else {
            "pulumi"
        }
    }

    /// The mise tool key, e.g. `vfox-pulumi:pulumi/pulumi-converter-terraform`
    #[must_use]
    pub fn tool_name(&self) -> String {
        let repo = if self.kind.is_empty() {
            format!("pulumi-{}", self.name)
        } else {
            format!("pulumi-{}-{}", self.kind, self.name)
        };
        format!("{VFOX_PULUMI_PLUGIN}:{}/{repo}", self.organization())
    }
}

/// Read the legacy plugin list; entries that are not mappings are ignored
#[must_use]
pub fn plugin_entries(node: Option<&Value>) -> Vec<PluginEntry> {
    let Some(items) = node.and_then(Value::as_sequence) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_mapping)
        .map(|item| {
            let field = |key: &str| {
                item.get(key)
                    .and_then(scalar_to_string)
                    .unwrap_or_default()
            };
            PluginEntry {
                name: field("name"),
                version: field("version"),
                kind: field("kind"),
            }
        })
        .filter(|plugin| !plugin.name.is_empty())
        .collect()
}

/// Convert plugins to `[tools]` entries
///
/// A plugin listed twice keeps its first position and its last version.
#[must_use]
pub fn tool_entries(plugins: &[PluginEntry]) -> Vec<SectionEntry> {
    let mut entries: Vec<SectionEntry> = Vec::with_capacity(plugins.len());
    for plugin in plugins {
        let key = plugin.tool_name();
        let version = if plugin.version.is_empty() {
            "latest".to_owned()
        } else {
            plugin.version.clone()
        };

        if let Some(existing) = entries.iter_mut().find(|entry| entry.key == key) {
            existing.value = version;
        } else {
            entries.push(SectionEntry::new(key, version));
        }
    }
    entries
}

/// Migrates `.ci-mgmt.yaml` `plugins` to `.config/mise.toml`
#[derive(Debug, Clone, Copy, Default)]
pub struct MigrateCimgmtPlugins;

impl Migration for MigrateCimgmtPlugins {
    fn name(&self) -> &'static str {
        "Migrate ci-mgmt.yml entries to the default .config/mise.toml file"
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
        let Some(plugins) = ci_mgmt.get_field("plugins") else {
            return Ok(());
        };

        let entries = tool_entries(&plugin_entries(Some(plugins)));
        let mut mise = TomlDocument::load(system, &out_dir.join(".config").join("mise.toml"))?;

        let mut updated = false;
        if !entries.is_empty() {
            updated |= mise.ensure_section_entries(
                "plugins",
                &[SectionEntry::new(VFOX_PULUMI_PLUGIN, VFOX_PULUMI_URL)],
            )?;
        }
        updated |= mise
            .ensure_section_entries("tools", &entries)
            .context("error updating mise.toml")?;
        if updated {
            mise.write(system)?;
        }

        ci_mgmt.delete_field("plugins");
        ci_mgmt.write(system)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;

    fn plugin(name: &str, version: &str, kind: &str) -> PluginEntry {
        PluginEntry {
            name: name.to_owned(),
            version: version.to_owned(),
            kind: kind.to_owned(),
        }
    }

    #[test]
    fn tool_names_follow_repository_convention() {
        assert_eq!(
            plugin("aws", "", "").tool_name(),
            "vfox-pulumi:pulumi/pulumi-aws"
        );
        assert_eq!(
            plugin("terraform", "", "converter").tool_name(),
            "vfox-pulumi:pulumi/pulumi-converter-terraform"
        );
        assert_eq!(
            plugin("time", "", "").tool_name(),
            "vfox-pulumi:pulumiverse/pulumi-time"
        );
    }

    #[test]
    fn duplicates_keep_first_position_and_last_version() {
        let entries = tool_entries(&[
            plugin("aws", "6.0.0", ""),
            plugin("random", "", ""),
            plugin("aws", "6.1.0", ""),
        ]);

        assert_eq!(
            entries,
            vec![
                SectionEntry::new("vfox-pulumi:pulumi/pulumi-aws", "6.1.0"),
                SectionEntry::new("vfox-pulumi:pulumi/pulumi-random", "latest"),
            ]
        );
    }

    #[test]
    fn reads_plugin_list_from_yaml() {
        let doc = YamlDocument::parse(
            "/repo/.ci-mgmt.yaml",
            "plugins:\n  - name: aws\n    version: 6.0.0\n  - name: terraform\n    kind: converter\n  - just-a-string\n"
                .to_owned(),
        )
        .unwrap();

        assert_eq!(
            plugin_entries(doc.get_field("plugins")),
            vec![plugin("aws", "6.0.0", ""), plugin("terraform", "", "converter")]
        );
    }
}
