//! Speech engine port: the synthesis capability the playback controller drives.
//!
//! # Design Rules
//!
//! - The engine is treated as a capability: it accepts text and prosody
//!   parameters and reports progress through an event stream.
//! - `cancel`/`pause`/`resume` act on whatever utterance the engine is
//!   currently playing; the controller guarantees there is at most one.
//! - No audio types cross this boundary.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::{VoiceInfo, VoiceParams};

/// One utterance submitted to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    /// Engine-bound text (may contain prosody markup).
    pub text: String,

    /// Final voice/rate/pitch/volume after expressive factors.
    pub params: VoiceParams,
}

/// Notifications an engine emits for an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The engine reached the next word, at this character offset.
    WordBoundary { char_index: usize },

    /// The utterance finished playing.
    End,

    /// The engine failed mid-utterance.
    Error(String),
}

/// Errors surfaced by a speech engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The engine refused the utterance (bad voice, unsupported params).
    #[error("Speech engine rejected utterance: {0}")]
    Rejected(String),

    /// The engine reported an error while speaking.
    #[error("Speech engine failed: {0}")]
    Failed(String),

    /// The event stream closed without an end or error notification.
    #[error("Speech engine event stream closed unexpectedly")]
    Disconnected,
}

/// Backend-agnostic speech synthesis engine.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Start speaking. Returns the utterance's event stream.
    async fn speak(
        &self,
        request: SpeechRequest,
    ) -> Result<mpsc::UnboundedReceiver<EngineEvent>, EngineError>;

    /// Cancel the current utterance (no-op when idle).
    fn cancel(&self);

    /// Pause the current utterance.
    fn pause(&self);

    /// Resume a paused utterance.
    fn resume(&self);

    /// Voices this engine offers.
    fn voices(&self) -> Vec<VoiceInfo>;

    /// Whether the engine reports its own playback timing.
    ///
    /// When `false` the controller estimates progress itself.
    fn has_native_timing(&self) -> bool {
        false
    }
}
