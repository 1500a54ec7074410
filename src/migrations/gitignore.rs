//! `.gitignore` entries added to generated repositories

use super::Migration;
use crate::config::TemplateKind;
use crate::system::System;
use crate::utils::fs::{read_optional, write_file};
use anyhow::Result;
use std::path::Path;
use tracing::debug;

/// Appends a commented block to `.gitignore` unless its marker is present
///
/// The marker is matched as a substring, so a pattern already added by hand
/// is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GitignoreEntry {
    name: &'static str,
    marker: &'static str,
    block: &'static str,
}

impl GitignoreEntry {
    #[must_use]
    pub const fn ignore_make_dir() -> Self {
        Self {
            name: "Add .make to .gitignore",
            marker: ".make",
            block: "\n\n# Ignore local build tracking directory\n.make\n",
        }
    }

    #[must_use]
    pub const fn ignore_mise_local() -> Self {
        Self {
            name: "Add mise.local.toml to .gitignore",
            marker: "mise.local.toml",
            block: "\n\n# Ignore local mise config\nmise.local.toml\n",
        }
    }

    #[must_use]
    pub const fn unignore_sdk_schema_go() -> Self {
        Self {
            name: "Exclude sdk/go/**/schema.go from .gitignore",
            marker: "sdk/go/**/schema.go",
            block: "\n# Don't ignore schema.go if it's part of the Go SDK\n!sdk/go/**/schema.go\n",
        }
    }
}

impl Migration for GitignoreEntry {
    fn name(&self) -> &'static str {
        self.name
    }

    fn should_run(&self, template: TemplateKind) -> bool {
        template == TemplateKind::BridgedProvider
    }

    fn migrate(&self, system: &dyn System, _template: TemplateKind, out_dir: &Path) -> Result<()> {
        let path = out_dir.join(".gitignore");
        let mut gitignore = read_optional(system, &path)?.unwrap_or_default();
        if gitignore.contains(self.marker) {
            debug!("{} already mentions {}", path.display(), self.marker);
            return Ok(());
        }

        gitignore.push_str(self.block);
        write_file(system, &path, gitignore.as_bytes())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    #[test]
    fn appends_block_once() {
        let system = MockSystem::new()
            .with_file("/repo/.gitignore", b"bin/")
            .unwrap();
        let entry = GitignoreEntry::ignore_make_dir();

        entry
            .migrate(&system, TemplateKind::BridgedProvider, Path::new("/repo"))
            .unwrap();
        entry
            .migrate(&system, TemplateKind::BridgedProvider, Path::new("/repo"))
            .unwrap();

        assert_eq!(
            system.read_to_string(Path::new("/repo/.gitignore")).unwrap(),
            "bin/\n\n# Ignore local build tracking directory\n.make\n"
        );
    }

    #[test]
    fn creates_missing_gitignore() {
        let system = MockSystem::new().with_dir("/repo").unwrap();

        GitignoreEntry::unignore_sdk_schema_go()
            .migrate(&system, TemplateKind::BridgedProvider, Path::new("/repo"))
            .unwrap();

        assert_eq!(
            system.read_to_string(Path::new("/repo/.gitignore")).unwrap(),
            "\n# Don't ignore schema.go if it's part of the Go SDK\n!sdk/go/**/schema.go\n"
        );
    }

    #[test]
    fn only_applies_to_bridged_provider() {
        let entry = GitignoreEntry::ignore_mise_local();

        assert!(entry.should_run(TemplateKind::BridgedProvider));
        assert!(!entry.should_run(TemplateKind::ExternalBridgedProvider));
        assert!(!entry.should_run(TemplateKind::Generic));
    }
}
