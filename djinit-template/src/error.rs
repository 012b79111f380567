//! Error types for djinit-template.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the template loader and context builders.
///
/// Rendering itself never fails; see [`ExprError`] for the recoverable
/// expression failures the interpreter swallows.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No embedded or user template is registered under this name.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// JSON serialization error (building a context).
    #[error("context serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The value passed to `Context::from_serialize` is not a map.
    #[error("context must serialize to a map, got {0}")]
    NotAMap(&'static str),

    /// Filesystem error while loading user templates.
    #[error("template io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to parse or evaluate a template expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("name '{0}' is not defined")]
    UndefinedName(String),

    #[error("key {0} not found")]
    MissingKey(String),

    #[error("'{ty}' object has no attribute '{name}'")]
    MissingAttribute { ty: &'static str, name: String },

    #[error("index {0} out of range")]
    IndexOutOfRange(i64),

    #[error("unsupported operand types for {op}: '{left}' and '{right}'")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("'{0}' object is not iterable")]
    NotIterable(&'static str),
}
