//! Voice error types.

use folio_core::EngineError;

/// Errors building rule tables.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// A rule pattern is not a valid regular expression.
    #[error("Invalid rule pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors that end a playback session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    /// The speech engine rejected or failed the utterance. The controller is
    /// back to idle when this is returned.
    #[error(transparent)]
    Engine(#[from] EngineError),
}
