//! Operational errors for docgraph.
//!
//! Validation problems (dead links, orphans) are findings, not errors.
//! Everything here aborts the run before a report is produced.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocGraphError>;

#[derive(Error, Debug)]
pub enum DocGraphError {
    #[error("Entrypoint not found: {0}")]
    EntrypointNotFound(PathBuf),

    #[error("Entrypoint is not a file: {0}")]
    EntrypointNotAFile(PathBuf),

    #[error("No entrypoints given")]
    NoEntrypoints,

    #[error("Scope directory not found: {0}")]
    ScopeNotFound(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Directory walk failed: {0}")]
    Walk(String),

    #[error("Invalid depth '{0}' (expected a non-negative integer or 'unlimited')")]
    InvalidDepth(String),

    #[error("Invalid external link policy '{0}' (expected validate, warn, error or ignore)")]
    InvalidPolicy(String),

    #[error("Invalid severity '{0}' (expected error, warn or off)")]
    InvalidSeverity(String),

    #[error("Invalid exclusion pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid configuration in {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Invalid filter '{0}' (expected key=value)")]
    InvalidFilter(String),

    #[error("File is not part of the documentation graph: {0}")]
    FileNotInGraph(PathBuf),

    #[error("Worker pool error: {0}")]
    Pool(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocGraphError {
    /// Wrap an I/O error, promoting permission failures to their own variant.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied(path)
        } else {
            Self::Io { path, source }
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EntrypointNotFound(_) => "ENTRYPOINT_NOT_FOUND",
            Self::EntrypointNotAFile(_) => "ENTRYPOINT_NOT_A_FILE",
            Self::NoEntrypoints => "NO_ENTRYPOINTS",
            Self::ScopeNotFound(_) => "SCOPE_NOT_FOUND",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::Io { .. } => "IO_ERROR",
            Self::Walk(_) => "WALK_ERROR",
            Self::InvalidDepth(_) => "INVALID_DEPTH",
            Self::InvalidPolicy(_) => "INVALID_POLICY",
            Self::InvalidSeverity(_) => "INVALID_SEVERITY",
            Self::InvalidPattern { .. } => "INVALID_PATTERN",
            Self::InvalidConfig { .. } => "INVALID_CONFIG",
            Self::InvalidFilter(_) => "INVALID_FILTER",
            Self::FileNotInGraph(_) => "FILE_NOT_IN_GRAPH",
            Self::Pool(_) => "POOL_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }

    /// Process exit code for the CLI.
    ///
    /// `1` is reserved for "validation found errors".
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PermissionDenied(_) | Self::Io { .. } | Self::Walk(_) => 3,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_is_promoted() {
        let err = DocGraphError::io(
            "/root/secret.md",
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        assert_eq!(err.code(), "PERMISSION_DENIED");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_config_errors_are_usage_errors() {
        assert_eq!(DocGraphError::InvalidDepth("x".into()).exit_code(), 2);
        assert_eq!(DocGraphError::InvalidPolicy("x".into()).code(), "INVALID_POLICY");
    }
}
