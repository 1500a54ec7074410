//! Merges the provider, examples and tests Go modules into one root module
//!
//! `provider/go.mod` moves to the repository root. The examples and tests
//! modules are deleted and their requirements come back through the final
//! `go mod tidy`. The SDK module is not touched, so SDK consumers are
//! unaffected.
//!
//! Module paths follow the major version convention:
//!
//! | before                                   | module after                  | provider import after                  |
//! |------------------------------------------|-------------------------------|----------------------------------------|
//! | `github.com/pulumi/pulumi-foo/provider`    | `github.com/pulumi/pulumi-foo`  | unchanged                              |
//! | `github.com/pulumi/pulumi-foo/provider/v6` | `github.com/pulumi/pulumi-foo/v6` | `github.com/pulumi/pulumi-foo/v6/provider` |

use super::Migration;
use super::gomod::{GoMod, Replace};
use crate::config::TemplateKind;
use crate::error::MigrateError;
use crate::operations::{replace_in_tree, run_checked, run_ignoring_failure};
use crate::system::{CommandSpec, System};
use anyhow::{Context as _, Result};
use regex::Regex;
use std::path::Path;
use tracing::{debug, info};

/// Directories never touched by the import rewrite
const REWRITE_EXCLUDED: &[&str] = &["sdk", "upstream", ".git", ".pulumi"];

/// Module files made redundant by the consolidated root module
const REDUNDANT_MODULE_FILES: &[&str] = &[
    "examples/go.mod",
    "examples/go.sum",
    "tests/go.mod",
    "tests/go.sum",
];

/// Module and import paths after consolidation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePaths {
    /// Path of the consolidated root module
    pub module: String,
    /// Import path of the code under `provider/`
    pub provider_import: String,
}

/// Compute the new module path and provider import path for `old_module`
///
/// # Errors
///
/// Returns `MigrateError::Convention` when the path ends in neither
/// `/provider` nor `/provider/vN`.
pub fn consolidated_paths(old_module: &str) -> Result<ModulePaths> {
    let (parent, base) = split_last_segment(old_module);
    if base == "provider" {
        if parent.is_empty() {
            return Err(unconventional(old_module));
        }
        return Ok(ModulePaths {
            module: parent.to_owned(),
            provider_import: old_module.to_owned(),
        });
    }

    let major_version = Regex::new(r"^v[0-9]+$").context("Invalid major version pattern")?;
    let (grandparent, provider_dir) = split_last_segment(parent);
    if !major_version.is_match(base) || provider_dir != "provider" || grandparent.is_empty() {
        return Err(unconventional(old_module));
    }

    let module = format!("{grandparent}/{base}");
    let provider_import = format!("{module}/provider");
    Ok(ModulePaths {
        module,
        provider_import,
    })
}

fn unconventional(old_module: &str) -> anyhow::Error {
    MigrateError::convention(format!(
        "expected a module path ending in /provider or /provider/vN, got {old_module:?}"
    ))
    .into()
}

fn split_last_segment(path: &str) -> (&str, &str) {
    path.rsplit_once('/').unwrap_or(("", path))
}

/// Swap the first `provider` path segment for `scope`
///
/// `github.com/pulumi/pulumi-foo/provider/v6` scoped to `examples` becomes
/// `github.com/pulumi/pulumi-foo/examples/v6`.
#[must_use]
pub fn scoped_import(import: &str, scope: &str) -> String {
    let mut replaced = false;
    import
        .split('/')
        .map(|segment| {
            if !replaced && segment == "provider" {
                replaced = true;
                scope
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Rewrite a relative replace target for a module one directory higher
///
/// Returns `None` when the target does not change.
#[must_use]
pub fn relocated_replace_target(target: &str) -> Option<String> {
    if let Some(rest) = target.strip_prefix("../") {
        Some(format!("./{rest}"))
    } else {
        target
            .strip_prefix("./")
            .map(|rest| format!("./provider/{rest}"))
    }
}

/// Consolidates `provider/go.mod` with the examples and tests modules
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolidateModules;

impl ConsolidateModules {
    fn move_provider_module(system: &dyn System, out_dir: &Path) -> Result<()> {
        for file in ["go.mod", "go.sum"] {
            let from = format!("provider/{file}");
            run_checked(
                system,
                &CommandSpec::new("git", out_dir).args(["mv", "-f", from.as_str(), file]),
            )
            .with_context(|| format!("moving {from}"))?;
        }
        Ok(())
    }

    fn relocate_replaces(system: &dyn System, out_dir: &Path, replaces: &[Replace]) -> Result<()> {
        for replace in replaces {
            let Some(target) = relocated_replace_target(&replace.new.path) else {
                continue;
            };
            let old = replace.old_spec();
            run_checked(
                system,
                &CommandSpec::new("go", out_dir)
                    .args(["mod", "edit"])
                    .arg(format!("-replace={old}={target}")),
            )
            .with_context(|| format!("replacing {old:?}"))?;
        }
        Ok(())
    }

    fn rewrite_imports(system: &dyn System, out_dir: &Path, old: &str, new: &str) -> Result<()> {
        if old == new {
            return Ok(());
        }
        let changed = replace_in_tree(system, out_dir, REWRITE_EXCLUDED, old, new)
            .with_context(|| format!("rewriting {old:?} to {new:?}"))?;
        info!("Rewrote {old} to {new} in {changed} file(s)");
        Ok(())
    }
}

impl Migration for ConsolidateModules {
    fn name(&self) -> &'static str {
        "Consolidate Go modules"
    }

    fn should_run(&self, _template: TemplateKind) -> bool {
        true
    }

    fn migrate(&self, system: &dyn System, _template: TemplateKind, out_dir: &Path) -> Result<()> {
        if !system.is_file(&out_dir.join("provider").join("go.mod"))? {
            debug!("No provider/go.mod in {}", out_dir.display());
            return Ok(());
        }

        // Nothing is moved until the module path is known to be convertible
        let go_mod = GoMod::load(system, &out_dir.join("provider"), "go.mod")?;
        let old_import = go_mod.module.path.as_str();
        let paths = consolidated_paths(old_import)?;

        Self::move_provider_module(system, out_dir)?;
        Self::relocate_replaces(system, out_dir, &go_mod.replace)?;

        for file in REDUNDANT_MODULE_FILES {
            run_ignoring_failure(system, &CommandSpec::new("git", out_dir).args(["rm", *file]));
        }

        run_checked(
            system,
            &CommandSpec::new("go", out_dir)
                .args(["mod", "edit"])
                .arg(format!("-module={}", paths.module)),
        )
        .context("rewriting module name")?;

        let new_import = paths.provider_import.as_str();
        Self::rewrite_imports(system, out_dir, old_import, new_import)?;
        for variant in ["examples", "tests"] {
            Self::rewrite_imports(
                system,
                out_dir,
                &scoped_import(old_import, variant),
                &scoped_import(new_import, variant),
            )?;
        }

        run_checked(system, &CommandSpec::new("go", out_dir).args(["mod", "tidy"]))
            .context("tidying up")?;
        Ok(())
    }
}
