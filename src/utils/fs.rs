//! File system utilities

use crate::system::System;
use anyhow::{Context as _, Result};
use std::io::{self, Read as _};
use std::path::Path;

/// Known text file extensions for binary detection
const TEXT_EXTENSIONS: &[&str] = &[
    "bash",
    "c",
    "cfg",
    "conf",
    "cs",
    "csproj",
    "css",
    "dockerfile",
    "editorconfig",
    "env",
    "gitattributes",
    "gitignore",
    "go",
    "gomod",
    "gradle",
    "html",
    "ini",
    "java",
    "js",
    "json",
    "jsx",
    "lock",
    "makefile",
    "md",
    "mjs",
    "mod",
    "patch",
    "py",
    "rs",
    "sh",
    "sum",
    "tf",
    "toml",
    "ts",
    "tsx",
    "txt",
    "xml",
    "yaml",
    "yml",
];

/// Create parent directories for a file path if they don't exist
pub fn create_parent_directories(system: &dyn System, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent()
        && !system.exists(parent)?
    {
        system.create_dir_all(parent).with_context(|| {
            format!(
                "Failed to create parent directories for: {}",
                file_path.display()
            )
        })?;
    }
    Ok(())
}

/// Read a file, mapping a missing file to `None`
///
/// Any other I/O failure is returned as an error.
pub fn read_optional(system: &dyn System, path: &Path) -> Result<Option<String>> {
    match system.read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Write a file, creating its parent directories first
pub fn write_file(system: &dyn System, path: &Path, contents: &[u8]) -> Result<()> {
    create_parent_directories(system, path)?;
    system
        .write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Check if a file is binary by examining its extension and content
pub fn is_binary_file(system: &dyn System, file_path: &Path) -> Result<bool> {
    // If it's a directory, it's not a binary file
    if !system.is_file(file_path)? {
        return Ok(false);
    }

    // Check if it has a known text file extension
    if let Some(extension) = file_path.extension().and_then(|e| e.to_str()) {
        let ext = extension.to_lowercase();
        if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            return Ok(false);
        }
    }

    // Fallback: check file content
    let mut file = system
        .open(file_path)
        .with_context(|| format!("Failed to open file: {}", file_path.display()))?;

    let mut buffer = vec![0; 8192];
    let bytes_read = file
        .read(&mut buffer)
        .with_context(|| format!("Failed to read from file: {}", file_path.display()))?;

    if bytes_read == 0 {
        return Ok(false); // Empty file is text
    }

    // Check for null bytes - text files don't have them
    if buffer[..bytes_read].contains(&0) {
        return Ok(true);
    }

    // A multi-byte character may be cut at the buffer boundary
    match core::str::from_utf8(&buffer[..bytes_read]) {
        Ok(_) => Ok(false),
        Err(err) => Ok(err.error_len().is_some()),
    }
}
