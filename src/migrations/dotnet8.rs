use super::Migration;
use crate::config::TemplateKind;
use crate::operations::{replace_in_file, run_checked};
use crate::system::{CommandSpec, System};
use anyhow::{Context as _, Result};
use std::path::Path;
use tracing::debug;

const NET6_TARGET: &str = "<TargetFramework>net6.0</TargetFramework>";
const NET8_TARGET: &str = "<TargetFramework>net8.0</TargetFramework>";

/// Moves tracked example and test C# projects from .NET 6 to .NET 8
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateToDotnet8;

impl Migration for UpdateToDotnet8 {
    fn name(&self) -> &'static str {
        "Update TargetFramework to net8"
    }

    fn should_run(&self, template: TemplateKind) -> bool {
        template.is_bridged()
    }

    fn migrate(&self, system: &dyn System, _template: TemplateKind, out_dir: &Path) -> Result<()> {
        let output = run_checked(
            system,
            &CommandSpec::new("git", out_dir).args(["ls-files", "examples", "tests"]),
        )
        .context("error getting files")?;

        for file in output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| line.ends_with(".csproj"))
        {
            let path = out_dir.join(file);
            if !system.is_file(&path)? {
                debug!("Skipping {}: not on disk", path.display());
                continue;
            }
            replace_in_file(system, &path, NET6_TARGET, NET8_TARGET)
                .with_context(|| format!("error writing to {}", path.display()))?;
        }
        Ok(())
    }
}
