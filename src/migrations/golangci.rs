use super::Migration;
use crate::config::TemplateKind;
use crate::edit::yaml::scalar_to_string;
use crate::error::MigrateError;
use crate::operations::run_soft;
use crate::system::{CommandSpec, System};
use crate::utils::fs::read_optional;
use anyhow::{Context as _, Result};
use serde::Deserialize;
use std::io;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct InstalledTool {
    #[serde(alias = "Version")]
    version: String,
}

#[derive(Debug, Deserialize)]
struct GolangciConfig {
    #[serde(default)]
    version: Option<serde_yaml::Value>,
}

/// Migrates `.golangci.yml` to the v2 format once golangci-lint v2 is pinned
///
/// Every linter failure is logged and leaves the configuration unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaintainGolangciConfig;

impl MaintainGolangciConfig {
    /// Version of golangci-lint pinned through mise, if exactly one is
    fn pinned_version(system: &dyn System, out_dir: &Path) -> Option<String> {
        let output = run_soft(
            system,
            &CommandSpec::new("mise", out_dir).args(["ls", "golangci-lint", "--json", "-c"]),
        )?;

        match serde_json::from_str::<Vec<InstalledTool>>(&output.stdout) {
            Ok(mut tools) if tools.len() == 1 => tools.pop().map(|tool| tool.version),
            Ok(tools) => {
                warn!("Expected one golangci-lint version, found {}", tools.len());
                None
            }
            Err(err) => {
                warn!("Problem parsing golangci-lint version: {err}\n{}", output.stdout);
                None
            }
        }
    }
}

impl Migration for MaintainGolangciConfig {
    fn name(&self) -> &'static str {
        "Maintain golangci-lint config"
    }

    fn should_run(&self, _template: TemplateKind) -> bool {
        true
    }

    fn migrate(&self, system: &dyn System, _template: TemplateKind, out_dir: &Path) -> Result<()> {
        let Some(version) = Self::pinned_version(system, out_dir) else {
            return Ok(());
        };
        if version.starts_with('1') {
            info!("Skipping: we are using golangci-lint {version}");
            return Ok(());
        }

        let config_path = out_dir.join(".golangci.yml");
        let Some(content) = read_optional(system, &config_path)? else {
            info!("Skipping {}: not found", config_path.display());
            return Ok(());
        };
        let config: GolangciConfig = serde_yaml::from_str(&content).map_err(|err| {
            MigrateError::parse(format!("reading {}: {err}", config_path.display()))
        })?;
        if config.version.as_ref().and_then(scalar_to_string).as_deref() == Some("2") {
            return Ok(());
        }

        let migrated = run_soft(
            system,
            &CommandSpec::new("mise", out_dir).args([
                "exec",
                "golangci-lint",
                "--",
                "golangci-lint",
                "migrate",
                "--verbose",
            ]),
        );
        if migrated.is_none() {
            warn!(
                "Problem migrating golangci-lint config {}",
                config_path.display()
            );
            return Ok(());
        }

        let backup = out_dir.join(".golangci.bck.yml");
        match system.remove_file(&backup) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => {
                Err(err).with_context(|| format!("removing {}", backup.display()))
            }
            _ => Ok(()),
        }
    }
}
