//! Units that drive the mise toolchain manager

use super::Migration;
use crate::config::TemplateKind;
use crate::error::MigrateError;
use crate::operations::run_checked;
use crate::system::{CommandSpec, System};
use crate::utils::fs::write_file;
use anyhow::{Context as _, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

const PULUMI_VERSION_VAR: &str = "PULUMI_VERSION_MISE";
const GO_VERSION_VAR: &str = "GO_VERSION_MISE";

/// Exports the mise environment of the repository to every later command
///
/// Runs only when the repository has a mise configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivateMise;

impl Migration for ActivateMise {
    fn name(&self) -> &'static str {
        "Activate mise"
    }

    fn should_run(&self, _template: TemplateKind) -> bool {
        true
    }

    fn migrate(&self, system: &dyn System, _template: TemplateKind, out_dir: &Path) -> Result<()> {
        let mut configured = false;
        for path in [out_dir.join(".config").join("mise.toml"), out_dir.join("mise.toml")] {
            if system.is_file(&path)? {
                configured = true;
                break;
            }
        }
        if !configured {
            debug!("No mise configuration in {}", out_dir.display());
            return Ok(());
        }

        let output = run_checked(
            system,
            &CommandSpec::new("mise", out_dir)
                .args(["env", "--json", "--cd"])
                .arg(out_dir.to_string_lossy()),
        )
        .context("running mise")?;

        let values: BTreeMap<String, String> = serde_json::from_str(&output.stdout)
            .map_err(|err| MigrateError::parse(format!("parsing mise output: {err}")))?;

        debug!("Starting path: {}", system.env_var("PATH").unwrap_or_default());
        for (name, value) in &values {
            system
                .set_env_var(name, value)
                .with_context(|| format!("setting mise env {name}"))?;
        }
        debug!("Final path: {}", system.env_var("PATH").unwrap_or_default());
        Ok(())
    }
}

/// Tool versions reported by `scripts/get-versions.sh`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolVersions {
    pub pulumi: String,
    pub go: String,
}

impl ToolVersions {
    /// Parse `KEY=value` lines; both versions must be present
    ///
    /// # Errors
    ///
    /// Returns `MigrateError::Parse` when a version is missing.
    pub fn parse(output: &str) -> Result<Self> {
        let mut pulumi = String::new();
        let mut go = String::new();
        for (key, value) in output.lines().filter_map(|line| line.split_once('=')) {
            match key.trim() {
                PULUMI_VERSION_VAR => pulumi = value.trim().to_owned(),
                GO_VERSION_VAR => go = value.trim().to_owned(),
                _ => {}
            }
        }

        if pulumi.is_empty() || go.is_empty() {
            return Err(MigrateError::parse(format!(
                "error getting versions: pulumiVersion={pulumi}; goVersion={go}"
            ))
            .into());
        }
        Ok(Self { pulumi, go })
    }
}

/// Keeps `.config/mise.lock` in sync with the pinned tool versions
///
/// The lock file is created when missing, then `mise install` refreshes it
/// with the Pulumi and Go versions the repository's version script reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaintainMiseLock;

impl Migration for MaintainMiseLock {
    fn name(&self) -> &'static str {
        "Update mise.lock"
    }

    fn should_run(&self, _template: TemplateKind) -> bool {
        true
    }

    fn migrate(&self, system: &dyn System, _template: TemplateKind, out_dir: &Path) -> Result<()> {
        let script = out_dir.join("scripts").join("get-versions.sh");
        if !system.is_file(&script)? {
            debug!("No {} to read tool versions from", script.display());
            return Ok(());
        }

        let lock_path = out_dir.join(".config").join("mise.lock");
        if !system.exists(&lock_path)? {
            write_file(system, &lock_path, b"").context("error creating mise.lock")?;
        }

        let output = run_checked(system, &CommandSpec::new(script.to_string_lossy(), out_dir))
            .context("error getting tool versions")?;
        let versions = ToolVersions::parse(&output.stdout)?;
        info!("{PULUMI_VERSION_VAR}: {}", versions.pulumi);
        info!("{GO_VERSION_VAR}: {}", versions.go);

        run_checked(
            system,
            &CommandSpec::new("mise", out_dir)
                .arg("install")
                .env(PULUMI_VERSION_VAR, versions.pulumi.as_str())
                .env(GO_VERSION_VAR, versions.go.as_str()),
        )
        .context("error running mise install")?;
        Ok(())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use crate::system::{CommandOutput, MockSystem};

    #[test]
    fn parses_version_script_output() {
        let versions =
            ToolVersions::parse("noise\nPULUMI_VERSION_MISE=3.150.0\nGO_VERSION_MISE=1.23.6\n")
                .unwrap();

        assert_eq!(
            versions,
            ToolVersions {
                pulumi: "3.150.0".to_owned(),
                go: "1.23.6".to_owned(),
            }
        );
        assert!(ToolVersions::parse("PULUMI_VERSION_MISE=3.150.0\n").is_err());
    }

    #[test]
    fn activation_overrides_environment() {
        let system = MockSystem::new()
            .with_file("/repo/.config/mise.toml", b"[tools]\n")
            .unwrap()
            .with_command_output(
                "mise env",
                CommandOutput::success(r#"{"PATH": "/mise/bin:/usr/bin", "GOFLAGS": "-mod=mod"}"#),
            )
            .unwrap();

        ActivateMise
            .migrate(&system, TemplateKind::Generic, Path::new("/repo"))
            .unwrap();

        assert_eq!(system.env_var("PATH").unwrap(), "/mise/bin:/usr/bin");
        assert_eq!(system.env_var("GOFLAGS").unwrap(), "-mod=mod");
        assert_eq!(
            system.command_lines().unwrap(),
            vec!["mise env --json --cd /repo"]
        );
    }

    #[test]
    fn lock_is_created_and_install_gets_versions() {
        let system = MockSystem::new()
            .with_file("/repo/scripts/get-versions.sh", b"#!/bin/sh\n")
            .unwrap()
            .with_command_output(
                "/repo/scripts/get-versions.sh",
                CommandOutput::success("PULUMI_VERSION_MISE=3.150.0\nGO_VERSION_MISE=1.23.6\n"),
            )
            .unwrap();

        MaintainMiseLock
            .migrate(&system, TemplateKind::Generic, Path::new("/repo"))
            .unwrap();

        assert!(system.is_file(Path::new("/repo/.config/mise.lock")).unwrap());
        let commands = system.commands().unwrap();
        assert_eq!(commands[1].command_line(), "mise install");
        assert_eq!(
            commands[1].env,
            vec![
                ("PULUMI_VERSION_MISE".to_owned(), "3.150.0".to_owned()),
                ("GO_VERSION_MISE".to_owned(), "1.23.6".to_owned()),
            ]
        );
    }
}
