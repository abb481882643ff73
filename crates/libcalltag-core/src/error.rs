use std::path::PathBuf;

use thiserror::Error;

/// Main error type for calltag operations.
///
/// Only the I/O shell around the pipeline produces these; scanning, hashing
/// and emission never fail.
#[derive(Debug, Error)]
pub enum CallTagError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("generated file is out of date: {}", .0.display())]
    Stale(PathBuf),

    #[error("generation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CallTagError {
    /// Get the error code for JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            CallTagError::InvalidArgs(_) => "invalid_args",
            CallTagError::NotFound(_) => "not_found",
            CallTagError::Stale(_) => "stale",
            CallTagError::Cancelled => "cancelled",
            CallTagError::Io(_) => "io_error",
            CallTagError::TomlParse(_) => "invalid_args",
            CallTagError::TomlSerialize(_) => "internal_error",
            CallTagError::Pattern(_) => "invalid_args",
            CallTagError::Internal(_) => "internal_error",
        }
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            CallTagError::InvalidArgs(_) => 2,
            CallTagError::NotFound(_) => 3,
            CallTagError::Stale(_) => 4,
            CallTagError::Io(_) => 5,
            CallTagError::TomlParse(_) => 2,
            CallTagError::Pattern(_) => 2,
            CallTagError::Cancelled => 130,
            _ => 1,
        }
    }

    /// Get actionable suggestions for fixing the error
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            CallTagError::NotFound(msg) => {
                if msg.contains("Cargo.toml") {
                    vec!["Run calltag from the crate root or pass --root <DIR>"]
                } else {
                    vec![]
                }
            }
            CallTagError::Stale(_) => vec!["Run 'calltag generate' to refresh the dispatch table"],
            CallTagError::TomlParse(_) => vec!["Check calltag.toml and Cargo.toml for syntax errors"],
            CallTagError::Pattern(_) => vec!["Exclude patterns use glob syntax, e.g. 'src/generated/**'"],
            _ => vec![],
        }
    }
}
