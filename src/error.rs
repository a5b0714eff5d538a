//! Error types for taskboard.
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad input, unknown task, bad config)
//! - 4: Operation failed (storage could not be read or written)

use thiserror::Error;

/// Exit codes for the `tb` binary.
pub mod exit_codes {
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ambiguous task reference: {0}")]
    Ambiguous(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Could not persist changes: {0}")]
    Persist(String),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_)
            | Error::NotFound(_)
            | Error::Ambiguous(_)
            | Error::InvalidConfig(_)
            | Error::TomlParse(_) => exit_codes::USER_ERROR,

            Error::Io(_) | Error::Json(_) | Error::Persist(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Message suitable for showing to the person at the keyboard.
    ///
    /// Storage failures are collapsed into a retry hint; the underlying cause
    /// is still available through `Display` and the debug log.
    pub fn friendly(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            Error::NotFound(what) => format!("Couldn't find {what}."),
            Error::Ambiguous(msg) => msg.clone(),
            Error::InvalidConfig(msg) => format!("Your configuration has a problem: {msg}"),
            Error::TomlParse(e) => format!("Your configuration file could not be read: {e}"),
            Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                "A file that was needed does not exist.".to_string()
            }
            Error::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                "Permission denied while accessing your task data.".to_string()
            }
            Error::Io(_) | Error::Persist(_) => {
                "Your change could not be saved. Nothing was changed; please try again.".to_string()
            }
            Error::Json(_) => "Your task data is corrupted and could not be read.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for printing errors with `--json`.
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub detail: String,
    pub code: i32,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.friendly(),
            detail: err.to_string(),
            code: err.exit_code(),
        }
    }
}
