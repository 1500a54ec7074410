//! Post-generation migrations
//!
//! Each unit moves a previously generated provider repository one step
//! closer to the layout the current templates produce. Units are
//! idempotent: running the whole list twice leaves the same result as
//! running it once.

pub mod bridge_patches;
pub mod cimgmt_overrides;
pub mod cimgmt_plugins;
pub mod consolidate_modules;
pub mod dotnet8;
pub mod gitignore;
pub mod go_toolchain;
pub mod golangci;
pub mod gomod;
pub mod mise;
pub mod move_mise_config;

pub use bridge_patches::{FixupBridgeImports, RemoveExplicitSdkDependency};
pub use cimgmt_overrides::MigrateCimgmtOverrides;
pub use cimgmt_plugins::MigrateCimgmtPlugins;
pub use consolidate_modules::ConsolidateModules;
pub use dotnet8::UpdateToDotnet8;
pub use gitignore::GitignoreEntry;
pub use go_toolchain::RemoveGoToolchain;
pub use golangci::MaintainGolangciConfig;
pub use mise::{ActivateMise, MaintainMiseLock};
pub use move_mise_config::MoveMiseConfig;

use crate::config::TemplateKind;
use crate::system::System;
use anyhow::{Context as _, Result};
use std::path::Path;
use tracing::{debug, info};

/// One named, idempotent transformation of a repository checkout
pub trait Migration {
    /// Human readable name used in logs and errors
    fn name(&self) -> &'static str;

    /// Whether the unit applies to repositories generated from `template`
    ///
    /// Conditions on the repository contents are checked inside `migrate`,
    /// which returns early when there is nothing to do.
    fn should_run(&self, template: TemplateKind) -> bool;

    /// Apply the unit to the repository at `out_dir`
    fn migrate(&self, system: &dyn System, template: TemplateKind, out_dir: &Path) -> Result<()>;
}

/// Which units ran and which were skipped, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub ran: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
}

/// Run `migrations` in order against `out_dir`
///
/// Stops at the first failing unit; the error names the unit and keeps the
/// underlying cause.
///
/// # Errors
///
/// Returns the first unit failure, wrapped with the unit's name.
pub fn run_migrations(
    system: &dyn System,
    migrations: &[Box<dyn Migration>],
    template: TemplateKind,
    out_dir: &Path,
) -> Result<MigrationReport> {
    let mut report = MigrationReport::default();

    for (index, migration) in migrations.iter().enumerate() {
        let number = index + 1;
        let name = migration.name();
        if !migration.should_run(template) {
            debug!("Migration {number}: {name}: skipped");
            report.skipped.push(name);
            continue;
        }

        info!("Migration {number}: {name}: running");
        migration
            .migrate(system, template, out_dir)
            .with_context(|| format!("error running migration \"{name}\""))?;
        report.ran.push(name);
    }

    Ok(report)
}

/// The migrations applied after every generation, in execution order
#[must_use]
pub fn default_migrations() -> Vec<Box<dyn Migration>> {
    vec![
        Box::new(FixupBridgeImports),
        Box::new(RemoveExplicitSdkDependency),
        Box::new(GitignoreEntry::ignore_make_dir()),
        Box::new(UpdateToDotnet8),
        Box::new(GitignoreEntry::ignore_mise_local()),
        Box::new(GitignoreEntry::unignore_sdk_schema_go()),
        Box::new(MoveMiseConfig),
        Box::new(MigrateCimgmtPlugins),
        Box::new(MigrateCimgmtOverrides),
        Box::new(ConsolidateModules),
        Box::new(RemoveGoToolchain),
        Box::new(ActivateMise),
        Box::new(MaintainMiseLock),
        Box::new(MaintainGolangciConfig),
    ]
}

/// Run [`default_migrations`] against the repository at `out_dir`
///
/// # Errors
///
/// Returns the first unit failure, wrapped with the unit's name.
pub fn migrate(system: &dyn System, template: TemplateKind, out_dir: &Path) -> Result<MigrationReport> {
    run_migrations(system, &default_migrations(), template, out_dir)
}
