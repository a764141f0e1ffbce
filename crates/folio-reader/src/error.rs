//! Reader service error types.

use folio_core::{ContentError, PreferenceError, SettingsError};
use folio_voice::PlaybackError;

/// Errors surfaced by [`ReaderService`](crate::ReaderService).
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Preferences(#[from] PreferenceError),

    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    /// The requested page is past the end of the book.
    #[error("Page {index} is out of range for '{content_id}' ({pages} pages)")]
    PageOutOfRange {
        content_id: String,
        index: u32,
        pages: u32,
    },

    /// Audio settings outside their accepted ranges.
    #[error("Invalid audio settings: {0}")]
    InvalidAudioSettings(String),
}
