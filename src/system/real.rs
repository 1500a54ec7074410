//! Real system implementation using `std::env`, `std::fs` and `std::process`

use super::{CommandOutput, CommandSpec, System, TempDirHandle, WalkEntry, is_excluded};
use std::collections::HashMap;
use std::env::VarError;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::{Arc, RwLock};
use tracing::debug;
use walkdir::WalkDir;

/// Production implementation of System trait
///
/// Delegates to the standard library. Environment overrides set through
/// `set_env_var` are kept in memory and passed to every spawned process,
/// so the process environment itself is never mutated.
#[derive(Debug, Clone, Default)]
pub struct RealSystem {
    env_overrides: Arc<RwLock<HashMap<String, String>>>,
}

impl RealSystem {
    /// Create a new `RealSystem` instance
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn overrides(&self) -> io::Result<HashMap<String, String>> {
        let overrides = self
            .env_overrides
            .read()
            .map_err(|e| io::Error::other(e.to_string()))?;
        Ok(overrides.clone())
    }
}

/// Real temporary directory, removed when dropped
struct RealTempDir {
    inner: tempfile::TempDir,
}

impl TempDirHandle for RealTempDir {
    fn path(&self) -> &Path {
        self.inner.path()
    }
}

impl System for RealSystem {
    fn env_var(&self, key: &str) -> Result<String, VarError> {
        if let Ok(overrides) = self.env_overrides.read()
            && let Some(value) = overrides.get(key)
        {
            return Ok(value.clone());
        }
        std::env::var(key)
    }

    fn set_env_var(&self, key: &str, value: &str) -> io::Result<()> {
        let mut overrides = self
            .env_overrides
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        overrides.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn exists(&self, path: &Path) -> io::Result<bool> {
        path.try_exists()
    }

    fn is_file(&self, path: &Path) -> io::Result<bool> {
        Ok(path.is_file())
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        Ok(path.is_dir())
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        let file = fs::File::open(path)?;
        Ok(Box::new(file))
    }

    fn walk_dir(&self, root: &Path, excluded: &[&str]) -> io::Result<Vec<WalkEntry>> {
        let mut entries = Vec::new();
        let walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_excluded(root, entry.path(), excluded));

        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            let file_type = entry.file_type();
            entries.push(WalkEntry {
                path: entry.into_path(),
                is_file: file_type.is_file(),
                is_dir: file_type.is_dir(),
            });
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn create_temp_dir(&self) -> io::Result<Box<dyn TempDirHandle>> {
        let inner = tempfile::Builder::new()
            .prefix("provider-ci-migration-files")
            .tempdir()?;
        Ok(Box::new(RealTempDir { inner }))
    }

    fn run(&self, command: &CommandSpec) -> io::Result<CommandOutput> {
        debug!("Running `{}` in {}", command, command.cwd.display());

        let output = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .envs(self.overrides()?)
            .envs(command.env.iter().cloned())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
