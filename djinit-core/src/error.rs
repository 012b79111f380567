//! Error types for djinit-core.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// What a validated name is used for; prefixes error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Project,
    App,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameKind::Project => write!(f, "Project name"),
            NameKind::App => write!(f, "App name"),
        }
    }
}

/// The first naming rule a candidate name broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameRule {
    Empty,
    TooShort,
    TooLong,
    InvalidCharacters,
    Keyword(String),
    BuiltinModule(String),
}

impl fmt::Display for NameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameRule::Empty => write!(f, "cannot be empty"),
            NameRule::TooShort => write!(f, "must be at least 2 characters long"),
            NameRule::TooLong => write!(f, "must be less than 50 characters"),
            NameRule::InvalidCharacters => write!(
                f,
                "must start with a letter and contain only letters, numbers, and underscores"
            ),
            NameRule::Keyword(name) => {
                write!(f, "'{name}' is a Python keyword, choose a different name")
            }
            NameRule::BuiltinModule(name) => {
                write!(f, "'{name}' conflicts with a Python builtin module, choose a different name")
            }
        }
    }
}

/// All errors that can arise from core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A project or app name failed validation.
    #[error("{kind} {rule}")]
    InvalidName { kind: NameKind, rule: NameRule },

    /// Unknown `--database` value.
    #[error("unsupported database type '{0}' (expected postgresql, mysql or sqlite)")]
    UnknownDatabase(String),

    /// Underlying I/O failure while reading or writing `.djinit`.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (write/save path).
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// `.djinit` exists but is not valid JSON for [`crate::config::DjinitConfig`].
    #[error("failed to parse djinit config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No `.djinit` file at the expected path.
    #[error("djinit config not found at {path}")]
    ConfigNotFound { path: PathBuf },
}
