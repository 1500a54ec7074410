//! CLI command implementations

use crate::cli::RepoArgs;
use crate::config::{CiMgmtConfig, TemplateKind};
use crate::error::MigrateError;
use crate::migrations::{self, MigrationReport};
use crate::system::System;
use anyhow::Result;
use tracing::info;

/// Resolve the template for the repository described by `args`
fn resolve_template(system: &dyn System, args: &RepoArgs) -> Result<TemplateKind> {
    let config = CiMgmtConfig::load_optional(system, &args.config_path())?;
    CiMgmtConfig::resolve_template(config.as_ref(), args.template.as_deref())
}

/// Execute the migrate command
///
/// # Errors
///
/// Fails when `out` is not a directory, the template cannot be resolved,
/// or a migration fails.
pub fn execute_migrate(system: &dyn System, args: &RepoArgs) -> Result<MigrationReport> {
    if !system.is_dir(&args.out)? {
        return Err(MigrateError::not_found(&args.out).into());
    }

    let template = resolve_template(system, args)?;
    info!("Migrating {} ({template})", args.out.display());

    let report = migrations::migrate(system, template, &args.out)?;
    info!(
        "Done: {} migrations ran, {} skipped",
        report.ran.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Execute the list-migrations command
///
/// Returns each default migration name with whether it applies to the
/// resolved template.
///
/// # Errors
///
/// Fails when the template cannot be resolved.
pub fn execute_list_migrations(
    system: &dyn System,
    args: &RepoArgs,
) -> Result<Vec<(&'static str, bool)>> {
    let template = resolve_template(system, args)?;
    Ok(migrations::default_migrations()
        .iter()
        .map(|migration| (migration.name(), migration.should_run(template)))
        .collect())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use crate::system::MockSystem;
    use std::path::PathBuf;

    fn repo_args(template: Option<&str>) -> RepoArgs {
        RepoArgs {
            out: PathBuf::from("/repo"),
            template: template.map(str::to_owned),
            config: PathBuf::from(".ci-mgmt.yaml"),
        }
    }

    #[test]
    fn template_comes_from_config() {
        let system = MockSystem::new()
            .with_file("/repo/.ci-mgmt.yaml", b"template: generic\n")
            .unwrap();

        let listed = execute_list_migrations(&system, &repo_args(None)).unwrap();

        assert!(listed.contains(&("Fixup Bridge Imports", false)));
        assert!(listed.contains(&("Consolidate Go modules", true)));
    }

    #[test]
    fn flag_overrides_config() {
        let system = MockSystem::new()
            .with_file("/repo/.ci-mgmt.yaml", b"template: generic\n")
            .unwrap();

        let listed =
            execute_list_migrations(&system, &repo_args(Some("bridged-provider"))).unwrap();

        assert!(listed.iter().all(|(_, runs)| *runs));
    }

    #[test]
    fn missing_out_dir_is_not_found() {
        let system = MockSystem::new();

        let err = execute_migrate(&system, &repo_args(None)).unwrap_err();

        assert!(
            err.downcast_ref::<MigrateError>()
                .is_some_and(MigrateError::is_not_found)
        );
    }
}
