use std::path::PathBuf;
use thiserror::Error;

/// A `Dialect` that cannot work. These are caller bugs, reported when the
/// dialect is built rather than on every resolver call.
#[derive(Error, Debug)]
pub enum DialectError {
    #[error("dialect '{dialect}': {field} must not be empty")]
    EmptyField {
        dialect: String,
        field: &'static str,
    },

    #[error("dialect '{0}' has no block opener rules")]
    NoOpeners(String),

    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("fallback window must cover at least one line")]
    EmptyWindow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("symbol name must not be empty")]
    EmptyName,
}

/// Why a block could not be extracted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("start line {line} is past the end of the source ({len} lines)")]
    StartOutOfRange { line: usize, len: usize },

    #[error("block starting at line {start_line} never closed ({opened} opened, {closed} closed)")]
    Unbalanced {
        start_line: usize,
        opened: usize,
        closed: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("could not find '{name}' in the source")]
    NotFound { name: String },

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("File resolution failed for input '{input}': {message}")]
    ResolutionError { input: String, message: String },

    #[error("no dialect known for {path:?}; pass --dialect brace|keyword")]
    UnsupportedFile { path: PathBuf },

    #[error(transparent)]
    Dialect(#[from] DialectError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
