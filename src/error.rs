//! Structured error types for configuration loading and access.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Error categories for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed YAML or a document whose root is not a mapping.
    Parse,
    /// A file passed to `load` is missing or unreadable.
    File,
    /// A required folder is absent, or could not be created.
    Config,
    /// Attribute-style access on a key that does not exist.
    UnknownKey,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Parse => write!(f, "parse"),
            ErrorKind::File => write!(f, "file"),
            ErrorKind::Config => write!(f, "config"),
            ErrorKind::UnknownKey => write!(f, "unknown key"),
        }
    }
}

/// Errors raised while loading, merging or querying configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid config file {path}: {reason}")]
    InvalidContent { path: PathBuf, reason: String },

    #[error("folder {path} does not exist")]
    MissingFolder { path: PathBuf },

    #[error("failed to create folder {path}: {source}")]
    CreateFolder {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unknown configuration key: {key}")]
    UnknownKey { key: String },
}

impl ConfigError {
    pub fn unknown_key(key: impl Into<String>) -> Self {
        Self::UnknownKey { key: key.into() }
    }

    pub fn invalid_content(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidContent {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Classify the error for callers that only care about the category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Parse { .. } | ConfigError::InvalidContent { .. } => ErrorKind::Parse,
            ConfigError::File { .. } => ErrorKind::File,
            ConfigError::MissingFolder { .. } | ConfigError::CreateFolder { .. } => {
                ErrorKind::Config
            }
            ConfigError::UnknownKey { .. } => ErrorKind::UnknownKey,
        }
    }

    /// The filesystem path involved, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            ConfigError::File { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::InvalidContent { path, .. }
            | ConfigError::MissingFolder { path }
            | ConfigError::CreateFolder { path, .. } => Some(path),
            ConfigError::UnknownKey { .. } => None,
        }
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
