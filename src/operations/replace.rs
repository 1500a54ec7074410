//! Literal text replacement across a repository tree

use crate::system::System;
use crate::utils::fs::is_binary_file;
use anyhow::{Context as _, Result};
use regex::bytes::{NoExpand, Regex};
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;

/// Replace every occurrence of `search` with `replacement` in the text files
/// under `root`
///
/// Directories listed in `excluded` (relative to `root`) are not entered and
/// binary files are skipped. Returns the number of files that changed.
///
/// # Errors
///
/// Returns an error if the tree cannot be walked or a file cannot be
/// rewritten.
pub fn replace_in_tree(
    system: &dyn System,
    root: &Path,
    excluded: &[&str],
    search: &str,
    replacement: &str,
) -> Result<usize> {
    if search.is_empty() || search == replacement {
        return Ok(0);
    }

    let entries = system
        .walk_dir(root, excluded)
        .with_context(|| format!("Failed to walk directory: {}", root.display()))?;

    let mut files_changed = 0;
    for entry in entries.iter().filter(|entry| entry.is_file) {
        if replace_in_file(system, &entry.path, search, replacement)? {
            files_changed += 1;
        }
    }

    debug!(
        "Replaced `{}` with `{}` in {} file(s)",
        search, replacement, files_changed
    );
    Ok(files_changed)
}

/// Apply a literal replacement to a single file
///
/// The file is matched as bytes, so text in other encodings than UTF-8 is
/// rewritten too. Returns whether the file was rewritten.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written.
pub fn replace_in_file(
    system: &dyn System,
    file_path: &Path,
    search: &str,
    replacement: &str,
) -> Result<bool> {
    if search.is_empty() || is_binary_file(system, file_path)? {
        return Ok(false);
    }

    let content = system.read(file_path).with_context(|| {
        format!(
            "Failed to read file for text replacement: {}",
            file_path.display()
        )
    })?;

    let pattern = Regex::new(&regex::escape(search)).context("Invalid replacement pattern")?;
    let Cow::Owned(new_content) = pattern.replace_all(&content, NoExpand(replacement.as_bytes()))
    else {
        return Ok(false);
    };

    system.write(file_path, &new_content).with_context(|| {
        format!(
            "Failed to write file after text replacement: {}",
            file_path.display()
        )
    })?;
    Ok(true)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    #[test]
    fn skips_excluded_directories() {
        let system = MockSystem::new()
            .with_file("/repo/provider/main.go", b"import \"example.com/p/provider\"\n")
            .unwrap()
            .with_file("/repo/sdk/go/x.go", b"import \"example.com/p/provider\"\n")
            .unwrap();

        let changed = replace_in_tree(
            &system,
            Path::new("/repo"),
            &["sdk"],
            "example.com/p/provider",
            "example.com/p/v2/provider",
        )
        .unwrap();

        assert_eq!(changed, 1);
        assert_eq!(
            system.read_to_string(Path::new("/repo/sdk/go/x.go")).unwrap(),
            "import \"example.com/p/provider\"\n"
        );
        assert_eq!(
            system
                .read_to_string(Path::new("/repo/provider/main.go"))
                .unwrap(),
            "import \"example.com/p/v2/provider\"\n"
        );
    }

    #[test]
    fn identical_search_and_replacement_is_a_no_op() {
        let system = MockSystem::new()
            .with_file("/repo/main.go", b"example.com/p\n")
            .unwrap();

        let changed =
            replace_in_tree(&system, Path::new("/repo"), &[], "example.com/p", "example.com/p")
                .unwrap();

        assert_eq!(changed, 0);
    }

    #[test]
    fn rewrites_files_that_are_not_utf8() {
        let system = MockSystem::new()
            .with_file("/repo/docs/notes.md", b"Caf\xe9 example.com/p/provider\n")
            .unwrap();

        let changed = replace_in_tree(
            &system,
            Path::new("/repo"),
            &[],
            "example.com/p/provider",
            "example.com/p/v2/provider",
        )
        .unwrap();

        assert_eq!(changed, 1);
        assert_eq!(
            system.read(Path::new("/repo/docs/notes.md")).unwrap(),
            b"Caf\xe9 example.com/p/v2/provider\n"
        );
    }

    #[test]
    fn replacement_is_literal() {
        let system = MockSystem::new()
            .with_file("/repo/main.go", b"a.b $1\n")
            .unwrap();

        assert!(replace_in_file(&system, Path::new("/repo/main.go"), "a.b", "$0x").unwrap());
        assert!(!replace_in_file(&system, Path::new("/repo/main.go"), "a.b", "$0x").unwrap());
        assert_eq!(system.read_to_string(Path::new("/repo/main.go")).unwrap(), "$0x $1\n");
    }
}
