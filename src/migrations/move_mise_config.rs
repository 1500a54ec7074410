use super::Migration;
use crate::config::TemplateKind;
use crate::system::System;
use crate::utils::fs::create_parent_directories;
use anyhow::{Context as _, Result};
use std::path::Path;
use tracing::debug;

/// Moves `mise.toml` into `.config/`
///
/// A `mise.toml` at the root then acts as a local override of the managed
/// configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveMiseConfig;

impl Migration for MoveMiseConfig {
    fn name(&self) -> &'static str {
        "Move mise.toml to .config directory"
    }

    fn should_run(&self, template: TemplateKind) -> bool {
        template == TemplateKind::BridgedProvider
    }

    fn migrate(&self, system: &dyn System, _template: TemplateKind, out_dir: &Path) -> Result<()> {
        let new_path = out_dir.join(".config").join("mise.toml");
        let old_path = out_dir.join("mise.toml");

        if system.exists(&new_path)? {
            debug!("{} already exists", new_path.display());
            return Ok(());
        }
        if !system.exists(&old_path)? {
            debug!("No {} to move", old_path.display());
            return Ok(());
        }

        create_parent_directories(system, &new_path)?;
        system
            .rename(&old_path, &new_path)
            .with_context(|| format!("error moving {}", old_path.display()))
    }
}
