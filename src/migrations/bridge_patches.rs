//! Source patches applied to `provider/resources.go` of bridged providers
//!
//! Patches are embedded in the binary, written to a temporary directory and
//! applied with gopatch. gofumpt then runs twice on every touched file
//! until the output is stable.

use super::Migration;
use crate::config::TemplateKind;
use crate::operations::run_checked;
use crate::system::{CommandSpec, System};
use crate::utils::fs::write_file;
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

const GOPATCH: &str = "github.com/uber-go/gopatch@v0.4.0";
const GOFUMPT: &str = "mvdan.cc/gofumpt@latest";
const RESOURCES_GO: &str = "./provider/resources.go";

const FIXUP_BRIDGE_IMPORTS_PATCH: &str = include_str!("patches/fixup_bridge_imports.patch");
const REMOVE_EXPLICIT_SDK_DEPENDENCY_PATCH: &str =
    include_str!("patches/remove_explicit_sdk_dependency.patch");

fn has_resources_go(system: &dyn System, out_dir: &Path) -> Result<bool> {
    Ok(system.is_file(&out_dir.join("provider").join("resources.go"))?)
}

/// Write `patch` to a temporary file and apply it to `provider/resources.go`
fn apply_patch(system: &dyn System, out_dir: &Path, file_name: &str, patch: &str) -> Result<()> {
    let temp_dir = system
        .create_temp_dir()
        .context("error creating directory for patch file")?;
    let patch_path = temp_dir.path().join(file_name);
    write_file(system, &patch_path, patch.as_bytes()).context("error writing patch file")?;

    run_checked(
        system,
        &CommandSpec::new("go", out_dir)
            .args(["run", GOPATCH, "-p"])
            .arg(patch_path.to_string_lossy())
            .arg(RESOURCES_GO),
    )
    .context("error running gopatch")?;
    Ok(())
}

/// Format `file` with gofumpt, twice
fn format_twice(system: &dyn System, out_dir: &Path, file: &str) -> Result<()> {
    for _ in 0..2 {
        run_checked(
            system,
            &CommandSpec::new("go", out_dir).args(["run", GOFUMPT, "-w", file]),
        )
        .context("error running gofumpt")?;
    }
    Ok(())
}

/// Directories holding a `go.mod`, outside of `upstream/`
fn module_dirs(system: &dyn System, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = system
        .walk_dir(out_dir, &["upstream"])
        .context("error finding go.mod files")?;
    Ok(entries
        .into_iter()
        .filter(|entry| entry.is_file && entry.path.file_name().is_some_and(|n| n == "go.mod"))
        .filter_map(|entry| entry.path.parent().map(Path::to_path_buf))
        .collect())
}

/// Moves experimental bridge token helpers to their stable package
#[derive(Debug, Clone, Copy, Default)]
pub struct FixupBridgeImports;

impl Migration for FixupBridgeImports {
    fn name(&self) -> &'static str {
        "Fixup Bridge Imports"
    }

    fn should_run(&self, template: TemplateKind) -> bool {
        template == TemplateKind::BridgedProvider
    }

    fn migrate(&self, system: &dyn System, _template: TemplateKind, out_dir: &Path) -> Result<()> {
        if !has_resources_go(system, out_dir)? {
            debug!("No {RESOURCES_GO} in {}", out_dir.display());
            return Ok(());
        }

        apply_patch(
            system,
            out_dir,
            "fixupBridgeImports.patch",
            FIXUP_BRIDGE_IMPORTS_PATCH,
        )?;

        for dir in module_dirs(system, out_dir)? {
            run_checked(system, &CommandSpec::new("go", &dir).args(["mod", "tidy"]))
                .context("error running go mod tidy")?;
        }

        let diff = run_checked(
            system,
            &CommandSpec::new("git", out_dir).args(["diff", "--name-only"]),
        )
        .context("error getting changed files")?;
        for file in diff
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| line.ends_with(".go"))
        {
            format_twice(system, out_dir, file)?;
        }
        Ok(())
    }
}

/// Drops explicit Pulumi SDK pins from the language settings in
/// `provider/resources.go`
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveExplicitSdkDependency;

impl Migration for RemoveExplicitSdkDependency {
    fn name(&self) -> &'static str {
        "Remove explicit SDK dependency"
    }

    fn should_run(&self, template: TemplateKind) -> bool {
        template == TemplateKind::BridgedProvider
    }

    fn migrate(&self, system: &dyn System, _template: TemplateKind, out_dir: &Path) -> Result<()> {
        if !has_resources_go(system, out_dir)? {
            debug!("No {RESOURCES_GO} in {}", out_dir.display());
            return Ok(());
        }

        apply_patch(
            system,
            out_dir,
            "removeExplicitSDKDependency.patch",
            REMOVE_EXPLICIT_SDK_DEPENDENCY_PATCH,
        )?;
        format_twice(system, out_dir, RESOURCES_GO)
    }
}
