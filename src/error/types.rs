//! Custom error types with exit codes

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for provider-ci operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MigrateError {
    /// Configuration Error - missing or invalid configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Not Found Error - a file required by a migration does not exist
    #[error("Not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Command Error - an external tool exited unsuccessfully
    #[error("Command error: {message}")]
    Command { message: String },

    /// Convention Error - the repository does not follow an expected layout
    #[error("Convention error: {message}")]
    Convention { message: String },

    /// Filesystem Error - file operation failed
    #[error("Filesystem error: {message}")]
    Filesystem { message: String },

    /// Parse Error - structured input could not be parsed
    #[error("Parse error: {message}")]
    Parse { message: String },
}

impl MigrateError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::Configuration { .. } => 1,
            Self::NotFound { .. } => 2,
            Self::Command { .. } => 3,
            Self::Convention { .. } => 4,
            Self::Filesystem { .. } => 5,
            Self::Parse { .. } => 6,
        }
    }

    /// Create a configuration error
    #[inline]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a not-found error for a path
    #[inline]
    pub fn not_found<P: AsRef<Path>>(path: P) -> Self {
        Self::NotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a command error
    #[inline]
    pub fn command<S: Into<String>>(message: S) -> Self {
        Self::Command {
            message: message.into(),
        }
    }

    /// Create a convention error
    #[inline]
    pub fn convention<S: Into<String>>(message: S) -> Self {
        Self::Convention {
            message: message.into(),
        }
    }

    /// Create a filesystem error
    #[inline]
    pub fn filesystem<S: Into<String>>(message: S) -> Self {
        Self::Filesystem {
            message: message.into(),
        }
    }

    /// Create a parse error
    #[inline]
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Whether this error reports a missing file
    #[must_use]
    #[inline]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
