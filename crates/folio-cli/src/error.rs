//! CLI-specific error types and mappings.
//!
//! This module provides the error type for the CLI adapter and the mapping
//! from `ReaderError` to exit codes and user-facing messages.

use folio_core::ContentError;
use folio_reader::ReaderError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// The requested book or page does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Speech or content failure.
    #[error("{0}")]
    Reader(String),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow sysexits.h where one fits.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Reader(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::NotFound(_) => 66, // EX_NOINPUT
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<ReaderError> for CliError {
    fn from(err: ReaderError) -> Self {
        match err {
            ReaderError::Content(ContentError::NotFound(what)) => {
                Self::NotFound(format!("Not found: {what}"))
            }
            e @ ReaderError::PageOutOfRange { .. } => Self::NotFound(e.to_string()),
            e @ ReaderError::InvalidAudioSettings(_) => Self::Arguments(e.to_string()),
            e @ (ReaderError::Settings(_) | ReaderError::Preferences(_)) => {
                Self::Config(e.to_string())
            }
            e @ (ReaderError::Content(_) | ReaderError::Playback(_)) => Self::Reader(e.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
