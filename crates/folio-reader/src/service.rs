//! Reader service: the UI-facing facade over page caching and playback.

use std::num::NonZeroUsize;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use folio_cache::{BookCache, PrefetchConfig, PrefetchCoordinator, PrefetchSummary};
use folio_core::{
    Book, Chunk, ContentSource, DiagnosticSink, PreferenceError, PreferenceStore, Settings,
    SettingsError, SpeechEngine, VoiceInfo, VoiceParams, validate_settings,
};
use folio_voice::{
    PlaybackConfig, PlaybackController, PlaybackEvent, SessionOutcome, TextTransformPipeline,
    estimate_reading_seconds, rank_voices,
};

use crate::error::ReaderError;

/// Preference key under which audio settings are stored as JSON.
pub const AUDIO_SETTINGS_KEY: &str = "audio_settings";

/// Ports the reader service is built from.
#[derive(Clone)]
pub struct ReaderDeps {
    pub content: Arc<dyn ContentSource>,
    pub engine: Arc<dyn SpeechEngine>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub diagnostics: Arc<dyn DiagnosticSink>,
}

/// A page ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub book: Book,
    pub chunk: Chunk,
    /// Estimated reading time for the page, in whole seconds.
    pub reading_seconds: u64,
}

/// What [`ReaderService::play`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// A paused session was resumed; its original `speak` call is still
    /// running.
    Resumed,

    /// A new session was started and has since settled.
    Finished(SessionOutcome),
}

/// Application service for a reading UI.
///
/// Owns the chunk cache, the book cache and the playback controller. Built
/// once by the composition root and shared behind an `Arc`.
pub struct ReaderService {
    chunks: Arc<PrefetchCoordinator>,
    books: BookCache,
    playback: PlaybackController,
    engine: Arc<dyn SpeechEngine>,
    preferences: Arc<dyn PreferenceStore>,
    settings: Settings,
}

impl ReaderService {
    /// Build the service from its ports.
    ///
    /// Returns the service and the receiver for playback events.
    pub fn new(
        deps: ReaderDeps,
        settings: Settings,
    ) -> Result<(Self, mpsc::UnboundedReceiver<PlaybackEvent>), ReaderError> {
        validate_settings(&settings)?;

        let chunks = Arc::new(PrefetchCoordinator::new(
            Arc::clone(&deps.content),
            deps.diagnostics,
            PrefetchConfig::from_settings(&settings)?,
        ));
        let book_capacity = NonZeroUsize::new(settings.book_cache_capacity).ok_or(
            SettingsError::InvalidCacheCapacity {
                name: "books",
                value: settings.book_cache_capacity,
            },
        )?;
        let books = BookCache::new(deps.content, book_capacity);
        let (playback, events) = PlaybackController::new(
            Arc::clone(&deps.engine),
            TextTransformPipeline::default(),
            PlaybackConfig::from_settings(&settings),
        );

        let service = Self {
            chunks,
            books,
            playback,
            engine: deps.engine,
            preferences: deps.preferences,
            settings,
        };
        Ok((service, events))
    }

    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The playback controller, for state queries.
    pub const fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    /// The chunk cache, for introspection.
    pub fn chunks(&self) -> &PrefetchCoordinator {
        &self.chunks
    }

    // ── Content ────────────────────────────────────────────────────

    /// Page text for chunk `index` of `content_id`.
    pub async fn get_chunk(&self, content_id: &str, index: u32) -> Result<Chunk, ReaderError> {
        Ok(self.chunks.fetch_chunk(content_id, index).await?)
    }

    /// Warm the `count` chunks after `from_index` and wait for them.
    pub async fn prefetch(&self, content_id: &str, from_index: u32, count: u32) -> PrefetchSummary {
        self.chunks.prefetch(content_id, from_index, count).await
    }

    /// Book metadata for `id`.
    pub async fn get_book(&self, id: &str) -> Result<Book, ReaderError> {
        Ok(self.books.get_book(id).await?)
    }

    /// Drop every cached chunk and book. In-flight prefetches are unaffected.
    pub fn clear_cache(&self) {
        self.chunks.clear_cache();
        self.books.clear();
        info!("Caches cleared");
    }

    /// Turn to page `index` of `content_id`.
    ///
    /// Stops any speech, loads the page, and starts warming the following
    /// pages in the background. The read-ahead window is clipped to the
    /// book's last page.
    pub async fn change_page(&self, content_id: &str, index: u32) -> Result<PageView, ReaderError> {
        self.playback.stop();

        let book = self.get_book(content_id).await?;
        if !book.has_page(index) {
            return Err(ReaderError::PageOutOfRange {
                content_id: content_id.to_string(),
                index,
                pages: book.pages,
            });
        }

        let chunk = self.get_chunk(content_id, index).await?;

        let remaining = book.pages - index - 1;
        let count = self.settings.prefetch_count.min(remaining);
        if count > 0 {
            // Detached: failures are reported to the diagnostic sink.
            drop(self.chunks.spawn_prefetch(content_id, index, count));
        }

        debug!(content_id, index, prefetch = count, "Changed page");
        let reading_seconds = self.estimate_duration(&chunk.text);
        Ok(PageView {
            book,
            chunk,
            reading_seconds,
        })
    }

    /// Estimated reading time for `text`, in whole seconds.
    pub fn estimate_duration(&self, text: &str) -> u64 {
        estimate_reading_seconds(text, self.settings.words_per_minute)
    }

    // ── Speech ─────────────────────────────────────────────────────

    /// Speak `text` with the stored audio settings, replacing any active
    /// session. Resolves when the session settles.
    pub async fn start_speaking(&self, text: &str) -> Result<SessionOutcome, ReaderError> {
        let mut params = self.audio_settings().await?;

        // A stored voice the engine no longer offers falls back to the
        // engine default.
        if let Some(voice) = &params.voice {
            if !self.engine.voices().iter().any(|v| &v.name == voice) {
                debug!(voice = %voice, "Stored voice unavailable, using engine default");
                params.voice = None;
            }
        }

        Ok(self.playback.speak(text, &params).await?)
    }

    /// Resume a paused session, or start speaking `text` if nothing is
    /// paused.
    pub async fn play(&self, text: &str) -> Result<PlayOutcome, ReaderError> {
        if self.playback.resume() {
            return Ok(PlayOutcome::Resumed);
        }
        self.start_speaking(text).await.map(PlayOutcome::Finished)
    }

    /// Stop speaking. Idempotent.
    pub fn stop_speaking(&self) {
        self.playback.stop();
    }

    /// Pause speaking. Returns `false` if nothing is speaking.
    pub fn pause_speaking(&self) -> bool {
        self.playback.pause()
    }

    /// Resume paused speech. Returns `false` if nothing is paused.
    pub fn resume_speaking(&self) -> bool {
        self.playback.resume()
    }

    /// Engine voices worth offering, best first.
    pub fn voices(&self) -> Vec<VoiceInfo> {
        rank_voices(self.engine.voices(), self.settings.min_voice_score)
    }

    /// Every engine voice, unranked.
    pub fn all_voices(&self) -> Vec<VoiceInfo> {
        self.engine.voices()
    }

    // ── Audio settings ─────────────────────────────────────────────

    /// Stored audio settings, or defaults when none are stored.
    pub async fn audio_settings(&self) -> Result<VoiceParams, ReaderError> {
        let Some(raw) = self.preferences.get(AUDIO_SETTINGS_KEY).await? else {
            return Ok(VoiceParams::default());
        };
        serde_json::from_str(&raw)
            .map_err(|e| PreferenceError::Serialization(e.to_string()).into())
    }

    /// Validate and store audio settings. They apply from the next session.
    pub async fn update_audio_settings(&self, params: &VoiceParams) -> Result<(), ReaderError> {
        validate_audio_settings(params)?;
        let raw = serde_json::to_string(params)
            .map_err(|e| PreferenceError::Serialization(e.to_string()))?;
        self.preferences.set(AUDIO_SETTINGS_KEY, raw).await?;
        info!(voice = ?params.voice, rate = params.rate, "Audio settings updated");
        Ok(())
    }
}

fn validate_audio_settings(params: &VoiceParams) -> Result<(), ReaderError> {
    let in_range = |value: f32, min: f32, max: f32| value.is_finite() && value >= min && value <= max;

    if !in_range(params.rate, 0.1, 10.0) {
        return Err(ReaderError::InvalidAudioSettings(format!(
            "rate must be between 0.1 and 10, got {}",
            params.rate
        )));
    }
    if !in_range(params.pitch, 0.0, 2.0) {
        return Err(ReaderError::InvalidAudioSettings(format!(
            "pitch must be between 0 and 2, got {}",
            params.pitch
        )));
    }
    if !in_range(params.volume, 0.0, 1.0) {
        return Err(ReaderError::InvalidAudioSettings(format!(
            "volume must be between 0 and 1, got {}",
            params.volume
        )));
    }
    Ok(())
}

impl std::fmt::Debug for ReaderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderService")
            .field("chunks", &self.chunks)
            .field("books", &self.books)
            .field("playback", &self.playback)
            .finish_non_exhaustive()
    }
}
