//! Error types for result log processing.
//!
//! Almost every field-level problem in a result log degrades to a `None` on the
//! model instead of an error. The variants here cover the few conditions that
//! abort a read.
//!
//! ## Error Categories
//!
//! - **Input rejection**: [`ResultsError::NoData`], [`ResultsError::CannotFindReader`],
//!   [`ResultsError::CannotReadData`]. Raised before any session is built.
//! - **Structural absence**: [`ResultsError::NoSession`],
//!   [`ResultsError::CannotReadSession`]. The format matched but the payload is
//!   missing a required section.
//! - **Helpers**: [`ResultsError::InvalidTime`] and
//!   [`ResultsError::UnknownTimezone`] come from the public helper functions.
//!
//! ```rust
//! use racelog::ResultsError;
//!
//! let error = ResultsError::cannot_read_data("race07", "missing [Header] section");
//! assert!(error.is_input_rejection());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for result log operations.
pub type Result<T, E = ResultsError> = std::result::Result<T, E>;

/// Main error type for result log operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ResultsError {
    #[error("No data to read: input is empty or not readable")]
    NoData,

    #[error("Cannot find a reader for this data")]
    CannotFindReader,

    #[error("Cannot read data as {format}: {reason}")]
    CannotReadData { format: &'static str, reason: String },

    #[error("Session {index} does not exist ({available} sessions available)")]
    NoSession { index: usize, available: usize },

    #[error("Cannot read session data from {format}: {reason}")]
    CannotReadSession { format: &'static str, reason: String },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Result file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse '{input}' as a formatted time")]
    InvalidTime { input: String },

    #[error("Unknown timezone '{name}'")]
    UnknownTimezone { name: String },
}

impl ResultsError {
    /// Returns whether the input was rejected as a whole before parsing started.
    pub fn is_input_rejection(&self) -> bool {
        match self {
            ResultsError::NoData => true,
            ResultsError::CannotFindReader => true,
            ResultsError::CannotReadData { .. } => true,
            ResultsError::File { .. } => true,
            ResultsError::NoSession { .. } => false,
            ResultsError::CannotReadSession { .. } => false,
            ResultsError::Parse { .. } => false,
            ResultsError::InvalidTime { .. } => false,
            ResultsError::UnknownTimezone { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ResultsError::NoData => vec![
                "Check the file is not empty",
                "Verify the path points to a result file and not a directory",
            ],
            ResultsError::CannotFindReader => vec![
                "Verify the file is a supported simulator result log",
                "Check the file was not truncated while the server was writing it",
            ],
            ResultsError::CannotReadData { .. } => vec![
                "Use the factory to select the matching reader",
                "Check the file belongs to the expected simulator",
            ],
            ResultsError::NoSession { .. } => vec![
                "Request a session index within the number of sessions read",
                "Use session numbers starting at 1",
            ],
            ResultsError::CannotReadSession { .. } => vec![
                "Check the log contains at least one completed session",
                "Verify the server finished writing the result file",
            ],
            ResultsError::Parse { .. } => vec![
                "Check the file encoding",
                "Verify source data integrity",
            ],
            ResultsError::File { .. } => {
                vec!["Check file exists and is readable", "Check file permissions"]
            }
            ResultsError::InvalidTime { .. } => {
                vec!["Use a time such as 1:23.4567 or 83.4567", "Include a separator"]
            }
            ResultsError::UnknownTimezone { .. } => {
                vec!["Use an IANA timezone name such as Europe/Amsterdam", "Use UTC"]
            }
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        ResultsError::File { path, source }
    }

    /// Helper constructor for rejected input of a concrete reader.
    pub fn cannot_read_data(format: &'static str, reason: impl Into<String>) -> Self {
        ResultsError::CannotReadData { format, reason: reason.into() }
    }

    /// Helper constructor for a matched format with unusable session data.
    pub fn cannot_read_session(format: &'static str, reason: impl Into<String>) -> Self {
        ResultsError::CannotReadSession { format, reason: reason.into() }
    }

    /// Helper constructor for parse failures.
    pub fn parse(context: impl Into<String>, details: impl Into<String>) -> Self {
        ResultsError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for unparseable time strings.
    pub fn invalid_time(input: impl Into<String>) -> Self {
        ResultsError::InvalidTime { input: input.into() }
    }
}

impl From<std::io::Error> for ResultsError {
    fn from(err: std::io::Error) -> Self {
        ResultsError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}
