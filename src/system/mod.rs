//! System abstraction for environment, filesystem and process operations
//!
//! This module provides a unified trait for all external system interactions,
//! allowing migrations to be tested with mock implementations.

use std::env::VarError;
use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

pub mod mock;
pub mod real;

pub use mock::MockSystem;
pub use real::RealSystem;

/// Entry from directory walking
#[derive(Debug, Clone)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub is_file: bool,
    pub is_dir: bool,
}

/// Temporary directory handle that cleans up on drop
///
/// For `RealSystem`, this wraps `tempfile::TempDir` and uses real filesystem.
/// For `MockSystem`, this manages an in-memory temporary directory.
pub trait TempDirHandle {
    /// Get the path to the temporary directory
    fn path(&self) -> &Path;
}

/// An external process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Create a command that runs `program` inside `cwd`
    #[must_use]
    pub fn new<S: Into<String>, P: AsRef<Path>>(program: S, cwd: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.as_ref().to_path_buf(),
            env: Vec::new(),
        }
    }

    /// Append a single argument
    #[must_use]
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for this invocation only
    #[must_use]
    pub fn env<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Program and arguments joined by spaces, used for logging and matching
    #[must_use]
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A successful run with the given standard output
    #[must_use]
    pub fn success<S: Into<String>>(stdout: S) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed run with the given exit code and standard error
    #[must_use]
    pub fn failure<S: Into<String>>(code: i32, stderr: S) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Whether the process exited with status zero
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Unified trait for system operations (environment + filesystem + processes)
///
/// # Implementations
/// - `RealSystem`: Production implementation using `std::env`, `std::fs` and `std::process`
/// - `MockSystem`: Test implementation using in-memory storage and scripted command output
pub trait System: Send + Sync {
    // ==================== Environment Operations ====================

    /// Get an environment variable, honouring values set through `set_env_var`
    fn env_var(&self, key: &str) -> Result<String, VarError>;

    /// Override an environment variable for this system and every process it runs
    fn set_env_var(&self, key: &str, value: &str) -> io::Result<()>;

    // ==================== Filesystem Operations ====================

    /// Read entire file contents as bytes
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Read entire file contents as a string
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write bytes to a file, creating it if it doesn't exist
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Recursively create a directory and all parent directories
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and all its contents
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a file
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Rename a file, replacing the destination if it exists
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Check if a path points to a file
    fn is_file(&self, path: &Path) -> io::Result<bool>;

    /// Check if a path points to a directory
    fn is_dir(&self, path: &Path) -> io::Result<bool>;

    /// Open a file for reading (returns a readable stream)
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;

    /// Recursively walk a directory, returning all entries sorted by path
    ///
    /// Directories whose path relative to `root` equals one of `excluded` are
    /// pruned together with everything beneath them. The root itself is not
    /// returned.
    fn walk_dir(&self, root: &Path, excluded: &[&str]) -> io::Result<Vec<WalkEntry>>;

    /// Create a temporary directory that is automatically cleaned up on drop
    fn create_temp_dir(&self) -> io::Result<Box<dyn TempDirHandle>>;

    // ==================== Process Operations ====================

    /// Run an external process to completion, capturing its output
    ///
    /// A process that starts but exits unsuccessfully is reported through
    /// `CommandOutput::code`, not as an `Err`.
    fn run(&self, command: &CommandSpec) -> io::Result<CommandOutput>;
}

/// Whether `path` (relative to `root`) is one of the excluded directories
#[must_use]
pub fn is_excluded(root: &Path, path: &Path, excluded: &[&str]) -> bool {
    path.strip_prefix(root)
        .is_ok_and(|relative| excluded.iter().any(|dir| relative == Path::new(dir)))
}
