//! Error types for worklog
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown or ambiguous task, missing log file)
//! - 3: Integrity error (the log holds an interval or state it should never hold)
//! - 4: Operation failed (IO, encoding, document build)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the worklog CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const INTEGRITY_ERROR: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for worklog operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("No task matching '{fragment}' on {date}")]
    NotFound { fragment: String, date: String },

    #[error("More than one task matches '{fragment}' on {date}: {}", .matches.join(", "))]
    Ambiguous {
        fragment: String,
        date: String,
        matches: Vec<String>,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No work log file given (use --file or WORK_LOG)")]
    MissingLogFile,

    // Integrity errors (exit code 3)
    #[error("Time interval violates day boundary: {0}")]
    TemporalInvariant(String),

    #[error("Invalid task state: {0}")]
    InvalidState(String),

    #[error("Malformed work log {path}: {message}")]
    InvalidLog { path: PathBuf, message: String },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Document build failed: {0}")]
    DocumentBuild(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::NotFound { .. }
            | Error::Ambiguous { .. }
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_)
            | Error::MissingLogFile => exit_codes::USER_ERROR,

            // Integrity errors
            Error::TemporalInvariant(_) | Error::InvalidState(_) | Error::InvalidLog { .. } => {
                exit_codes::INTEGRITY_ERROR
            }

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::DocumentBuild(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for the JSON error envelope
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::NotFound { fragment, date } => Some(serde_json::json!({
                "fragment": fragment,
                "date": date,
            })),
            Error::Ambiguous {
                fragment,
                date,
                matches,
            } => Some(serde_json::json!({
                "fragment": fragment,
                "date": date,
                "matches": matches,
            })),
            Error::InvalidLog { path, message } => Some(serde_json::json!({
                "path": path.to_string_lossy(),
                "message": message,
            })),
            Error::InvalidArgument(message)
            | Error::InvalidConfig(message)
            | Error::TemporalInvariant(message)
            | Error::InvalidState(message) => Some(serde_json::json!({ "message": message })),
            _ => None,
        }
    }
}

/// Result type alias for worklog operations
pub type Result<T> = std::result::Result<T, Error>;
